use std::{
    io::{stdin, stdout, Write},
    sync::mpsc,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context};
use log::{debug, info};
use termion::{event::Key, input::TermRead, raw::IntoRawMode};

use crate::{
    drain_events, pos, ClockState, Grid, HashedWorld, Observer, Pos, SimEvent, SimHandle, Stats,
    World,
};

pub use canvas::Canvas;
mod canvas;

pub struct View {
    thread: JoinHandle<anyhow::Result<()>>,
}

impl View {
    pub fn spawn(
        grid: Grid,
        handle: SimHandle<HashedWorld>,
        events: mpsc::Receiver<SimEvent>,
    ) -> Self {
        let thread = thread::spawn(move || view_loop(grid, handle, events));
        Self { thread }
    }

    pub fn join(self) -> anyhow::Result<()> {
        self.thread
            .join()
            .map_err(|_| anyhow!("view thread panicked"))?
    }
}

/// What the user sees of the simulation, kept in sync from its events only.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    cells: HashedWorld,
    generation: u64,
    last_deaths: usize,
    state: ClockState,
    interval: Duration,
}

impl Board {
    pub fn new(grid: Grid, stats: Stats, cells: HashedWorld) -> Self {
        Self {
            grid,
            cells,
            generation: stats.generation,
            last_deaths: 0,
            state: stats.state,
            interval: stats.interval,
        }
    }

    pub fn is_alive(&self, col: i32, row: i32) -> bool {
        self.cells.contains(self.grid.center(col, row))
    }

    pub fn living(&self) -> usize {
        self.cells.len()
    }

    pub fn status(&self) -> String {
        format!(
            "Status: {} | Cycles: {} | Living: {} | Dead: {} | Speed: {}ms",
            self.state,
            self.generation,
            self.living(),
            self.last_deaths,
            self.interval.as_millis()
        )
    }
}

impl Observer for Board {
    fn on_generation_advanced(
        &mut self,
        generation: u64,
        births: &[Pos],
        deaths: &[Pos],
        _alive_count: usize,
    ) {
        // already part of the snapshot the board started from
        if generation <= self.generation {
            return;
        }
        for pos in deaths {
            self.cells.remove(*pos);
        }
        for pos in births {
            self.cells.add(*pos);
        }
        self.generation = generation;
        self.last_deaths = deaths.len();
    }

    fn on_cleared(&mut self) {
        self.cells.clear();
        self.generation = 0;
        self.last_deaths = 0;
    }

    fn on_cell_toggled(&mut self, pos: Pos, alive: bool, _alive_count: usize) {
        if alive {
            self.cells.add(pos);
        } else {
            self.cells.remove(pos);
        }
    }

    fn on_clock_changed(&mut self, state: ClockState, interval: Duration) {
        self.state = state;
        self.interval = interval;
    }
}

/// Cursor and scroll position, both in cell columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    origin: Pos,
    cursor: Pos,
}

impl Camera {
    pub fn new(side: i32) -> Self {
        let center = pos!(side / 2, side / 2);
        Self {
            origin: pos!(0, 0),
            cursor: center,
        }
    }

    pub fn cursor(&self) -> Pos {
        self.cursor
    }

    pub fn origin(&self) -> Pos {
        self.origin
    }

    pub fn move_cursor(&mut self, dir: Dir, side: i32) {
        let delta = match dir {
            Dir::Up => pos!(0, -1),
            Dir::Down => pos!(0, 1),
            Dir::Left => pos!(-1, 0),
            Dir::Right => pos!(1, 0),
        };
        let next = self.cursor + delta;
        self.cursor = pos!(next.x.clamp(0, side - 1), next.y.clamp(0, side - 1));
    }

    /// scrolls just enough for the cursor to be inside a `width` x `height` window.
    pub fn follow(&mut self, width: i32, height: i32) {
        self.origin.x = follow_axis(self.origin.x, self.cursor.x, width);
        self.origin.y = follow_axis(self.origin.y, self.cursor.y, height);
    }
}

fn follow_axis(origin: i32, cursor: i32, span: i32) -> i32 {
    if span <= 0 || cursor < origin {
        cursor
    } else if cursor >= origin + span {
        cursor - span + 1
    } else {
        origin
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug)]
pub enum InputCmd {
    Exit,
    Move(Dir),
    Toggle,
    StartPause,
    Clear,
    Accelerate,
    Decelerate,
}

fn input_loop(sender: mpsc::Sender<InputCmd>) {
    for key in stdin().keys() {
        let Ok(key) = key else { break };
        let command = match key {
            Key::Char('q') | Key::Esc | Key::Ctrl('c') => InputCmd::Exit,
            Key::Up => InputCmd::Move(Dir::Up),
            Key::Down => InputCmd::Move(Dir::Down),
            Key::Left => InputCmd::Move(Dir::Left),
            Key::Right => InputCmd::Move(Dir::Right),
            Key::Char('\n') | Key::Char('t') => InputCmd::Toggle,
            Key::Char(' ') => InputCmd::StartPause,
            Key::Char('c') => InputCmd::Clear,
            Key::Char('+') | Key::Char('=') => InputCmd::Accelerate,
            Key::Char('-') => InputCmd::Decelerate,
            _ => continue,
        };

        if sender.send(command).is_err() {
            break;
        }
    }
}

const VIEW_REFRESH_INTERVAL: Duration = Duration::from_millis(50);

enum Flow {
    Continue,
    Exit,
}

fn view_loop(
    grid: Grid,
    handle: SimHandle<HashedWorld>,
    events: mpsc::Receiver<SimEvent>,
) -> anyhow::Result<()> {
    let mut stdout = stdout()
        .into_raw_mode()
        .context("terminal does not support raw mode")?;
    with_hidden_cursor(&mut stdout, |out| run_view(out, grid, &handle, &events))
}

/// hides the cursor while `f` runs and shows it again whatever `f` returns.
fn with_hidden_cursor<O: Write>(
    out: &mut O,
    f: impl FnOnce(&mut O) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    write!(out, "{}", termion::cursor::Hide)?;
    let result = f(out);
    write!(
        out,
        "{}{}{}",
        termion::clear::All,
        termion::cursor::Goto(1, 1),
        termion::cursor::Show
    )?;
    out.flush()?;
    result
}

fn run_view(
    out: &mut impl Write,
    grid: Grid,
    handle: &SimHandle<HashedWorld>,
    events: &mpsc::Receiver<SimEvent>,
) -> anyhow::Result<()> {
    let (sender, receiver) = mpsc::channel();
    let _input_handle = thread::spawn(|| input_loop(sender));

    // stats first: replaying a generation the snapshot already holds is harmless
    let stats = handle.stats()?;
    let mut board = Board::new(grid, stats, handle.snapshot()?);
    let mut camera = Camera::new(grid.cells_per_side());

    'view: loop {
        while let Ok(cmd) = receiver.try_recv() {
            if let Flow::Exit = handle_input(cmd, handle, &grid, &mut camera)? {
                break 'view;
            }
        }
        drain_events(events, &mut board);
        display_board(out, &board, &mut camera, &grid)?;
        thread::sleep(VIEW_REFRESH_INTERVAL);
    }

    info!("leaving at generation {} with {} cells", board.generation, board.living());
    Ok(())
}

fn handle_input(
    cmd: InputCmd,
    handle: &SimHandle<HashedWorld>,
    grid: &Grid,
    camera: &mut Camera,
) -> anyhow::Result<Flow> {
    debug!("input {cmd:?}");
    match cmd {
        InputCmd::Exit => return Ok(Flow::Exit),
        InputCmd::Move(dir) => camera.move_cursor(dir, grid.cells_per_side()),
        InputCmd::Toggle => {
            let Pos { x: col, y: row } = camera.cursor();
            handle.toggle_cell(grid.center(col, row))?;
        }
        InputCmd::StartPause => {
            if handle.clock_state()? == ClockState::Idle {
                handle.start()?;
            } else {
                handle.toggle_pause()?;
            }
        }
        InputCmd::Clear => handle.reset()?,
        InputCmd::Accelerate => handle.speed_up()?,
        InputCmd::Decelerate => handle.slow_down()?,
    }
    Ok(Flow::Continue)
}

fn display_board(
    out: &mut impl Write,
    board: &Board,
    camera: &mut Camera,
    grid: &Grid,
) -> anyhow::Result<()> {
    let mut canvas = Canvas::from_screen()?;
    render(&mut canvas, board, camera, grid);
    let cursor = camera.cursor();
    let footer = format!("{} | [{}, {}]", board.status(), cursor.x, cursor.y);
    canvas.display(out, &footer)?;
    Ok(())
}

fn render(canvas: &mut Canvas, board: &Board, camera: &mut Camera, grid: &Grid) {
    camera.follow(canvas.width() as i32, canvas.height() as i32);
    let origin = camera.origin();
    let cursor = camera.cursor();
    let side = grid.cells_per_side();

    canvas.layer(|p| {
        let cell = origin + p;
        let on_grid = (0..side).contains(&cell.x) && (0..side).contains(&cell.y);
        if !on_grid {
            return None;
        }
        let alive = board.is_alive(cell.x, cell.y);
        Some(match (cell == cursor, alive) {
            (true, true) => '@',
            (true, false) => '+',
            (false, true) => '#',
            (false, false) => '.',
        })
    });
}

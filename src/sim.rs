use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, info, trace, warn};

use crate::{error::ConfigError, moore_offsets, Config, Grid, Pos, SimError, World};

pub use clock::{Clock, ClockState};
mod clock;

pub use event::{drain_events, Observer, SimEvent};
mod event;

/// Cells that change between two generations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub births: Vec<Pos>,
    pub deaths: Vec<Pos>,
}

#[derive(Debug, Clone)]
pub struct State<W>
where
    W: World,
{
    grid: Grid,
    world: W,
    generation: u64,
}

impl<W> State<W>
where
    W: World,
{
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            world: W::default(),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alive_count(&self) -> usize {
        self.world.len()
    }

    pub fn actives(&self) -> Vec<Pos> {
        self.world.actives()
    }

    pub fn is_cell_alive(&self, pos: Pos) -> bool {
        self.world.contains(pos)
    }

    /// marks `pos` alive, returns false when it is not a cell center.
    pub fn populate(&mut self, pos: Pos) -> bool {
        if !self.grid.contains(pos) {
            return false;
        }
        self.world.add(pos);
        true
    }

    /// flips `pos` and returns its new state.
    pub fn toggle(&mut self, pos: Pos) -> bool {
        if !self.grid.contains(pos) {
            warn!("ignoring toggle of {pos:?}, not a cell center");
            return false;
        }
        if self.world.contains(pos) {
            self.world.remove(pos);
            false
        } else {
            self.world.add(pos);
            true
        }
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.generation = 0;
    }

    pub fn snapshot(&self) -> W {
        self.world.clone()
    }

    pub fn get_neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        let cell_size = self.grid.cell_size();
        moore_offsets()
            .map(move |offset| pos + offset * cell_size)
            .filter(move |p| self.grid.contains(*p))
    }

    pub fn count_neighbors(&self, pos: Pos) -> usize {
        self.get_neighbors(pos)
            .filter(|p| self.is_cell_alive(*p))
            .count()
    }

    /// distance based count: every alive cell within `cell_size * sqrt(2)`.
    /// Linear in the number of alive cells, kept to check the offset form.
    pub fn count_neighbors_geometric(&self, pos: Pos) -> usize {
        let cell_size = self.grid.cell_size() as i64;
        let reach_sq = 2 * cell_size * cell_size;
        self.world
            .actives()
            .into_iter()
            .filter(|other| *other != pos && other.distance_sq(pos) <= reach_sq)
            .count()
    }

    /// dead cells next to at least one alive cell; no other dead cell can be born.
    fn birth_candidates(&self) -> Vec<Pos> {
        let mut candidates: Vec<_> = self
            .world
            .actives()
            .into_iter()
            .flat_map(move |p| self.get_neighbors(p))
            .filter(|p| !self.is_cell_alive(*p))
            .collect();
        candidates.sort_by_key(|p| p.row_major());
        candidates.dedup();
        candidates
    }

    /// computes the next generation from the current one without applying it.
    pub fn advance(&self) -> Delta {
        let deaths = self
            .world
            .actives()
            .into_iter()
            .filter(|p| !matches!(self.count_neighbors(*p), 2 | 3))
            .collect();
        let births = self
            .birth_candidates()
            .into_iter()
            .filter(|p| self.count_neighbors(*p) == 3)
            .collect();
        Delta { births, deaths }
    }

    pub fn apply(&mut self, delta: &Delta) {
        for pos in &delta.deaths {
            self.world.remove(*pos);
        }
        for pos in &delta.births {
            self.world.add(*pos);
        }
        self.generation += 1;
    }

    pub fn step(&mut self) -> Delta {
        let delta = self.advance();
        self.apply(&delta);
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub generation: u64,
    pub alive_count: usize,
    pub interval: Duration,
    pub state: ClockState,
}

pub enum SimCmd<W>
where
    W: World,
{
    Start,
    TogglePause,
    Reset,
    AdjustInterval(i64),
    SpeedUp,
    SlowDown,
    Toggle(Pos, mpsc::Sender<bool>),
    Stats(mpsc::Sender<Stats>),
    Snapshot(mpsc::Sender<W>),
    Shutdown,
}

pub struct SimHandle<W>
where
    W: World,
{
    sender: mpsc::Sender<SimCmd<W>>,
}

impl<W> Clone for SimHandle<W>
where
    W: World,
{
    fn clone(&self) -> Self {
        let sender = self.sender.clone();
        Self { sender }
    }
}

impl<W> SimHandle<W>
where
    W: World,
{
    fn send(&self, cmd: SimCmd<W>) -> Result<(), SimError> {
        self.sender.send(cmd).map_err(|_| SimError::Disconnected)
    }

    fn request<T>(&self, cmd: impl FnOnce(mpsc::Sender<T>) -> SimCmd<W>) -> Result<T, SimError> {
        let (sender, receiver) = mpsc::channel();
        self.send(cmd(sender))?;
        receiver.recv().map_err(|_| SimError::Disconnected)
    }

    pub fn start(&self) -> Result<(), SimError> {
        self.send(SimCmd::Start)
    }

    pub fn toggle_pause(&self) -> Result<(), SimError> {
        self.send(SimCmd::TogglePause)
    }

    pub fn reset(&self) -> Result<(), SimError> {
        self.send(SimCmd::Reset)
    }

    pub fn adjust_interval(&self, delta_ms: i64) -> Result<(), SimError> {
        self.send(SimCmd::AdjustInterval(delta_ms))
    }

    pub fn speed_up(&self) -> Result<(), SimError> {
        self.send(SimCmd::SpeedUp)
    }

    pub fn slow_down(&self) -> Result<(), SimError> {
        self.send(SimCmd::SlowDown)
    }

    pub fn shutdown(&self) -> Result<(), SimError> {
        self.send(SimCmd::Shutdown)
    }

    pub fn toggle_cell(&self, pos: Pos) -> Result<bool, SimError> {
        self.request(|sender| SimCmd::Toggle(pos, sender))
    }

    pub fn stats(&self) -> Result<Stats, SimError> {
        self.request(SimCmd::Stats)
    }

    pub fn alive_count(&self) -> Result<usize, SimError> {
        Ok(self.stats()?.alive_count)
    }

    pub fn current_generation(&self) -> Result<u64, SimError> {
        Ok(self.stats()?.generation)
    }

    pub fn current_interval(&self) -> Result<Duration, SimError> {
        Ok(self.stats()?.interval)
    }

    pub fn clock_state(&self) -> Result<ClockState, SimError> {
        Ok(self.stats()?.state)
    }

    pub fn snapshot(&self) -> Result<W, SimError> {
        self.request(SimCmd::Snapshot)
    }
}

#[derive(Debug)]
pub struct Sim<W>
where
    W: World,
{
    thread: JoinHandle<()>,
    sender: mpsc::Sender<SimCmd<W>>,
}

impl<W> Sim<W>
where
    W: World,
{
    pub fn spawn(
        config: &Config,
        actives: impl IntoIterator<Item = Pos>,
        events: mpsc::Sender<SimEvent>,
    ) -> Result<Self, ConfigError> {
        let mut state: State<W> = State::new(config.grid()?);
        for active in actives.into_iter() {
            if !state.populate(active) {
                warn!("initial cell {active:?} is not on the grid, skipped");
            }
        }
        let clock = Clock::new(config);

        let (sender, receiver) = mpsc::channel();
        let thread = thread::spawn(move || sim_loop(receiver, Publisher::new(events), state, clock));

        Ok(Self { sender, thread })
    }

    pub fn handle(&self) -> SimHandle<W> {
        let sender = self.sender.clone();
        SimHandle { sender }
    }

    pub fn join(self) {
        drop(self.sender);
        if self.thread.join().is_err() {
            error!("simulation thread panicked");
        }
    }
}

struct Publisher {
    sender: mpsc::Sender<SimEvent>,
    closed: bool,
}

impl Publisher {
    fn new(sender: mpsc::Sender<SimEvent>) -> Self {
        Self {
            sender,
            closed: false,
        }
    }

    fn publish(&mut self, event: SimEvent) {
        if self.sender.send(event).is_err() && !self.closed {
            warn!("observer went away, events are now dropped");
            self.closed = true;
        }
    }

    fn clock(&mut self, clock: &Clock) {
        self.publish(SimEvent::Clock {
            state: clock.state(),
            interval: clock.interval(),
        });
    }
}

enum Flow {
    Continue,
    Stop,
}

fn sim_loop<W>(
    receiver: mpsc::Receiver<SimCmd<W>>,
    mut publisher: Publisher,
    mut state: State<W>,
    mut clock: Clock,
) where
    W: World,
{
    info!("simulation thread started with {} cells", state.alive_count());
    let mut last_tick = Instant::now();

    loop {
        let cmd = if clock.is_ticking() {
            let deadline = last_tick + clock.interval();
            let remaining = deadline.saturating_duration_since(Instant::now());
            match receiver.recv_timeout(remaining) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match receiver.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        match cmd {
            Some(cmd) => {
                trace!("woken by a command");
                let was_ticking = clock.is_ticking();
                if let Flow::Stop = handle_cmd(cmd, &mut state, &mut clock, &mut publisher) {
                    break;
                }
                if !was_ticking && clock.is_ticking() {
                    last_tick = Instant::now();
                }
            }
            None => {
                tick(&mut state, &clock, &mut publisher);
                last_tick = Instant::now();
            }
        }
    }

    info!("simulation thread stopped at generation {}", state.generation());
}

fn tick<W>(state: &mut State<W>, clock: &Clock, publisher: &mut Publisher)
where
    W: World,
{
    if clock.state() != ClockState::Running {
        trace!("paused tick, generation stays at {}", state.generation());
        return;
    }
    let Delta { births, deaths } = state.step();
    debug!(
        "generation {}: {} born, {} died, {} alive",
        state.generation(),
        births.len(),
        deaths.len(),
        state.alive_count()
    );
    publisher.publish(SimEvent::Generation {
        generation: state.generation(),
        births,
        deaths,
        alive_count: state.alive_count(),
    });
}

fn handle_cmd<W>(
    cmd: SimCmd<W>,
    state: &mut State<W>,
    clock: &mut Clock,
    publisher: &mut Publisher,
) -> Flow
where
    W: World,
{
    match cmd {
        SimCmd::Start => {
            if clock.start() {
                info!("simulation started every {:?}", clock.interval());
                publisher.clock(clock);
            }
        }
        SimCmd::TogglePause => {
            if clock.toggle_pause() {
                info!("simulation {}", clock.state());
                publisher.clock(clock);
            }
        }
        SimCmd::Reset => {
            clock.reset();
            state.clear();
            info!("simulation reset");
            publisher.publish(SimEvent::Cleared);
            publisher.clock(clock);
        }
        SimCmd::AdjustInterval(delta) => interval_changed(clock.adjust_interval(delta), clock, publisher),
        SimCmd::SpeedUp => interval_changed(clock.speed_up(), clock, publisher),
        SimCmd::SlowDown => interval_changed(clock.slow_down(), clock, publisher),
        SimCmd::Toggle(pos, reply) => {
            let alive = state.toggle(pos);
            publisher.publish(SimEvent::Toggled {
                pos,
                alive,
                alive_count: state.alive_count(),
            });
            let _ = reply.send(alive);
        }
        SimCmd::Stats(reply) => {
            let _ = reply.send(Stats {
                generation: state.generation(),
                alive_count: state.alive_count(),
                interval: clock.interval(),
                state: clock.state(),
            });
        }
        SimCmd::Snapshot(reply) => {
            let _ = reply.send(state.snapshot());
        }
        SimCmd::Shutdown => return Flow::Stop,
    }
    Flow::Continue
}

fn interval_changed(interval: Duration, clock: &Clock, publisher: &mut Publisher) {
    debug!("tick interval is now {interval:?}");
    publisher.clock(clock);
}

#[cfg(test)]
mod tests;

use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use super::*;
use crate::{pattern, pos, HashedWorld, World};

fn grid() -> Grid {
    Grid::new(700, 100)
}

fn state_with(cells: &[(i32, i32)]) -> State<HashedWorld> {
    let grid = grid();
    let mut state = State::new(grid);
    for &(col, row) in cells {
        assert!(state.populate(grid.center(col, row)));
    }
    state
}

#[test]
fn empty_is_a_fixed_point() {
    let mut state = state_with(&[]);
    assert_eq!(state.advance(), Delta::default());
    state.step();
    assert_eq!(state.alive_count(), 0);
    assert_eq!(state.generation(), 1);
}

#[test]
fn lone_cell_dies() {
    let mut state = state_with(&[(40, 40)]);
    let delta = state.step();
    assert_eq!(delta.deaths, vec![grid().center(40, 40)]);
    assert!(delta.births.is_empty());
    assert_eq!(state.alive_count(), 0);
}

#[test]
fn block_is_still() {
    let cells = [(10, 10), (11, 10), (10, 11), (11, 11)];
    let mut state = state_with(&cells);
    for cell in state.actives() {
        assert_eq!(state.count_neighbors(cell), 3);
    }
    let before = state.actives();
    for _ in 0..5 {
        assert_eq!(state.step(), Delta::default());
    }
    assert_eq!(state.actives(), before);
}

#[test]
fn blinker_has_period_two() {
    let grid = grid();
    let mut state = state_with(&[(10, 10), (11, 10), (12, 10)]);
    let start = state.actives();

    let delta = state.step();
    assert_eq!(delta.births, vec![grid.center(11, 9), grid.center(11, 11)]);
    assert_eq!(delta.deaths, vec![grid.center(10, 10), grid.center(12, 10)]);
    assert_eq!(
        state.actives(),
        vec![grid.center(11, 9), grid.center(11, 10), grid.center(11, 11)]
    );

    state.step();
    assert_eq!(state.actives(), start);
    assert_eq!(state.generation(), 2);
}

#[test]
fn births_and_deaths_are_disjoint() {
    let grid = grid();
    let cells = pattern::place(&grid, &pattern::preset("r-pentomino").unwrap(), None).unwrap();
    let mut state: State<HashedWorld> = State::new(grid);
    for cell in cells {
        state.populate(cell);
    }
    for _ in 0..30 {
        let delta = state.step();
        assert!(delta.births.iter().all(|b| !delta.deaths.contains(b)));
    }
}

#[test]
fn neighbor_count_excludes_self_and_is_symmetric() {
    let grid = grid();
    let state = state_with(&[(20, 20), (21, 20), (21, 21), (0, 0), (1, 1)]);

    assert_eq!(state.count_neighbors(grid.center(20, 20)), 2);
    assert_eq!(state.count_neighbors(grid.center(0, 0)), 1);
    assert_eq!(state.get_neighbors(grid.center(0, 0)).count(), 3);
    assert_eq!(state.get_neighbors(grid.center(99, 50)).count(), 5);

    for a in grid.lattice().filter(|p| p.x < 200 && p.y < 200) {
        assert!(state.get_neighbors(a).all(|n| n != a));
        for b in state.get_neighbors(a) {
            assert!(state.get_neighbors(b).any(|n| n == a));
        }
    }
}

#[test]
fn geometric_count_agrees_with_offsets() {
    let grid = grid();
    let mut state: State<HashedWorld> = State::new(grid);
    let glider = pattern::place(&grid, &pattern::preset("glider").unwrap(), Some(pos!(0, 0))).unwrap();
    let pentomino = pattern::place(&grid, &pattern::preset("r-pentomino").unwrap(), None).unwrap();
    for cell in glider.into_iter().chain(pentomino) {
        state.populate(cell);
    }
    for _ in 0..12 {
        state.step();
    }
    for pos in grid.lattice() {
        assert_eq!(state.count_neighbors(pos), state.count_neighbors_geometric(pos), "{pos:?}");
    }
}

#[test]
fn toggle_twice_is_a_noop() {
    let grid = grid();
    let mut state = state_with(&[]);
    let cell = grid.center(5, 6);
    assert!(state.toggle(cell));
    assert!(state.is_cell_alive(cell));
    assert!(!state.toggle(cell));
    assert_eq!(state.alive_count(), 0);

    assert!(!state.toggle(pos!(4, 3)));
    assert_eq!(state.alive_count(), 0);
}

#[test]
fn clear_zeroes_everything() {
    let mut state = state_with(&[(1, 1), (2, 1), (3, 1)]);
    state.step();
    state.clear();
    assert_eq!(state.alive_count(), 0);
    assert_eq!(state.generation(), 0);
}

const WAIT: Duration = Duration::from_secs(2);

fn fast_config() -> Config {
    Config {
        initial_interval: Duration::from_millis(5),
        min_interval: Duration::from_millis(1),
        interval_step: Duration::from_millis(1),
        ..Config::default()
    }
}

fn spawn(cells: &[(i32, i32)]) -> (Sim<HashedWorld>, mpsc::Receiver<SimEvent>) {
    let grid = grid();
    let (sender, receiver) = mpsc::channel();
    let actives: Vec<_> = cells.iter().map(|&(c, r)| grid.center(c, r)).collect();
    let sim = Sim::spawn(&fast_config(), actives, sender).unwrap();
    (sim, receiver)
}

fn next_generation(events: &mpsc::Receiver<SimEvent>) -> (u64, Vec<Pos>, Vec<Pos>, usize) {
    loop {
        match events.recv_timeout(WAIT).unwrap() {
            SimEvent::Generation {
                generation,
                births,
                deaths,
                alive_count,
            } => return (generation, births, deaths, alive_count),
            _ => continue,
        }
    }
}

fn stop(sim: Sim<HashedWorld>) {
    sim.handle().shutdown().unwrap();
    sim.join();
}

#[test]
fn running_clock_publishes_generations() {
    let grid = grid();
    let (sim, events) = spawn(&[(10, 10), (11, 10), (12, 10)]);
    let handle = sim.handle();
    assert_eq!(handle.clock_state().unwrap(), ClockState::Idle);
    assert_eq!(handle.alive_count().unwrap(), 3);

    handle.start().unwrap();
    let (generation, births, deaths, alive_count) = next_generation(&events);
    assert_eq!(generation, 1);
    assert_eq!(births, vec![grid.center(11, 9), grid.center(11, 11)]);
    assert_eq!(deaths, vec![grid.center(10, 10), grid.center(12, 10)]);
    assert_eq!(alive_count, 3);

    let (generation, ..) = next_generation(&events);
    assert_eq!(generation, 2);

    stop(sim);
}

#[test]
fn reset_returns_to_idle() {
    let (sim, events) = spawn(&[(10, 10), (11, 10), (12, 10)]);
    let handle = sim.handle();
    handle.start().unwrap();
    next_generation(&events);

    handle.reset().unwrap();
    let stats = handle.stats().unwrap();
    assert_eq!(stats.alive_count, 0);
    assert_eq!(stats.generation, 0);
    assert_eq!(stats.state, ClockState::Idle);

    let mut seen_cleared = false;
    while let Ok(event) = events.try_recv() {
        match event {
            SimEvent::Cleared => seen_cleared = true,
            SimEvent::Generation { .. } => assert!(!seen_cleared),
            _ => (),
        }
    }
    assert!(seen_cleared);

    thread::sleep(Duration::from_millis(30));
    assert_eq!(handle.current_generation().unwrap(), 0);
    assert!(events
        .try_iter()
        .all(|e| !matches!(e, SimEvent::Generation { .. })));

    stop(sim);
}

#[test]
fn paused_clock_does_not_advance() {
    let (sim, events) = spawn(&[(10, 10), (11, 10), (12, 10)]);
    let handle = sim.handle();
    handle.start().unwrap();
    handle.toggle_pause().unwrap();
    let generation = handle.current_generation().unwrap();
    assert_eq!(handle.clock_state().unwrap(), ClockState::Paused);

    thread::sleep(Duration::from_millis(50));
    assert_eq!(handle.current_generation().unwrap(), generation);

    handle.toggle_pause().unwrap();
    let mut next = next_generation(&events).0;
    while next <= generation {
        next = next_generation(&events).0;
    }
    assert_eq!(next, generation + 1);

    stop(sim);
}

#[test]
fn toggling_through_the_handle() {
    let grid = grid();
    let (sim, events) = spawn(&[]);
    let handle = sim.handle();
    let cell = grid.center(3, 4);

    assert!(handle.toggle_cell(cell).unwrap());
    assert_eq!(handle.alive_count().unwrap(), 1);
    assert!(!handle.toggle_cell(cell).unwrap());
    assert_eq!(handle.alive_count().unwrap(), 0);

    let toggles: Vec<_> = events.try_iter().collect();
    assert_eq!(
        toggles,
        vec![
            SimEvent::Toggled {
                pos: cell,
                alive: true,
                alive_count: 1
            },
            SimEvent::Toggled {
                pos: cell,
                alive: false,
                alive_count: 0
            },
        ]
    );

    stop(sim);
}

#[test]
fn interval_changes_are_clamped() {
    let (sim, _events) = spawn(&[]);
    let handle = sim.handle();
    handle.adjust_interval(-1000).unwrap();
    assert_eq!(handle.current_interval().unwrap(), Duration::from_millis(1));
    handle.slow_down().unwrap();
    handle.slow_down().unwrap();
    assert_eq!(handle.current_interval().unwrap(), Duration::from_millis(3));
    handle.speed_up().unwrap();
    assert_eq!(handle.current_interval().unwrap(), Duration::from_millis(2));
    handle.adjust_interval(1_000_000).unwrap();
    assert_eq!(handle.current_interval().unwrap(), Duration::from_millis(2000));

    stop(sim);
}

#[test]
fn snapshot_reflects_the_registry() {
    let grid = grid();
    let (sim, _events) = spawn(&[(1, 1), (2, 2)]);
    let snapshot = sim.handle().snapshot().unwrap();
    assert_eq!(snapshot.actives(), vec![grid.center(1, 1), grid.center(2, 2)]);
    stop(sim);
}

#[test]
fn handle_outliving_the_thread() {
    let (sim, _events) = spawn(&[]);
    let handle = sim.handle();
    stop(sim);
    assert!(matches!(handle.stats(), Err(SimError::Disconnected)));
    assert!(matches!(handle.start(), Err(SimError::Disconnected)));
}

#[test]
fn off_grid_initial_cells_are_skipped() {
    let (sender, _events) = mpsc::channel();
    let sim: Sim<HashedWorld> =
        Sim::spawn(&fast_config(), [pos!(4, 3), pos!(3, 3)], sender).unwrap();
    assert_eq!(sim.handle().alive_count().unwrap(), 1);
    stop(sim);
}

#[test]
fn keeps_serving_after_the_observer_leaves() {
    let grid = grid();
    let (sim, events) = spawn(&[(10, 10), (11, 10), (12, 10)]);
    drop(events);
    let handle = sim.handle();
    assert!(handle.toggle_cell(grid.center(40, 40)).unwrap());
    handle.start().unwrap();

    let deadline = Instant::now() + WAIT;
    while handle.current_generation().unwrap() < 3 {
        assert!(Instant::now() < deadline, "generations stopped advancing");
        thread::sleep(Duration::from_millis(5));
    }
    let stats = handle.stats().unwrap();
    assert_eq!(stats.state, ClockState::Running);
    assert_eq!(stats.alive_count, 3);

    stop(sim);
}

/// joins on a helper thread so a loop that never ends fails the test instead of hanging it.
fn joins_in_time(sim: Sim<HashedWorld>) -> bool {
    let (done, finished) = mpsc::channel();
    thread::spawn(move || {
        sim.join();
        let _ = done.send(());
    });
    finished.recv_timeout(WAIT).is_ok()
}

#[test]
fn dropping_every_handle_ends_an_idle_loop() {
    let (sim, _events) = spawn(&[(1, 1)]);
    let handle = sim.handle();
    let other = handle.clone();
    assert_eq!(handle.clock_state().unwrap(), ClockState::Idle);
    drop(handle);
    drop(other);
    assert!(joins_in_time(sim));
}

#[test]
fn dropping_every_handle_ends_a_running_loop() {
    let (sim, events) = spawn(&[(10, 10), (11, 10), (12, 10)]);
    let handle = sim.handle();
    handle.start().unwrap();
    next_generation(&events);
    drop(handle);
    assert!(joins_in_time(sim));
}

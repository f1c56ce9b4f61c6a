use std::{sync::mpsc, time::Duration};

use crate::{ClockState, Pos};

/// What the simulation thread publishes to its observer. One message per
/// applied generation, so a generation is never seen half applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Generation {
        generation: u64,
        births: Vec<Pos>,
        deaths: Vec<Pos>,
        alive_count: usize,
    },
    Cleared,
    Toggled {
        pos: Pos,
        alive: bool,
        alive_count: usize,
    },
    Clock {
        state: ClockState,
        interval: Duration,
    },
}

pub trait Observer {
    fn on_generation_advanced(
        &mut self,
        generation: u64,
        births: &[Pos],
        deaths: &[Pos],
        alive_count: usize,
    );

    fn on_cleared(&mut self);

    fn on_cell_toggled(&mut self, _pos: Pos, _alive: bool, _alive_count: usize) {}

    fn on_clock_changed(&mut self, _state: ClockState, _interval: Duration) {}
}

impl SimEvent {
    pub fn dispatch(self, observer: &mut impl Observer) {
        match self {
            SimEvent::Generation {
                generation,
                births,
                deaths,
                alive_count,
            } => observer.on_generation_advanced(generation, &births, &deaths, alive_count),
            SimEvent::Cleared => observer.on_cleared(),
            SimEvent::Toggled {
                pos,
                alive,
                alive_count,
            } => observer.on_cell_toggled(pos, alive, alive_count),
            SimEvent::Clock { state, interval } => observer.on_clock_changed(state, interval),
        }
    }
}

/// hands every pending event to `observer`, returns how many there were.
pub fn drain_events(receiver: &mpsc::Receiver<SimEvent>, observer: &mut impl Observer) -> usize {
    let mut count = 0;
    while let Ok(event) = receiver.try_recv() {
        event.dispatch(observer);
        count += 1;
    }
    count
}

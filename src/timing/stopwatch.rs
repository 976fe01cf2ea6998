//! Fixed-capacity lap recorder backed by the monotonic clock.
//!
//! A [`Stopwatch`] owns one slot per expected lap. Slots are allocated up
//! front so that starting and stopping a lap never allocates while a trial is
//! being timed. Laps are strictly sequential: a new lap can only be started
//! once the previous one has been stopped.
//!
//! A lap that is started but never stopped (for example because the timed
//! step failed) stays open. Open laps are not samples: they are excluded from
//! [`Stopwatch::elapsed`] and from [`Stopwatch::len`].

use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised while recording laps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopwatchError {
    #[error("stopwatch capacity must be greater than zero")]
    ZeroCapacity,

    #[error("stopwatch capacity of {capacity} laps is exhausted")]
    CapacityExhausted { capacity: usize },

    #[error("lap {index} is still running")]
    LapInFlight { index: usize },
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    start: Instant,
    stop: Option<Instant>,
}

/// Handle for a running lap, consumed by [`Stopwatch::stop`].
#[derive(Debug)]
#[must_use = "a lap is only recorded once it is stopped"]
pub struct Lap {
    index: usize,
}

impl Lap {
    /// Slot index of this lap, equal to the number of laps started before it.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Records up to `capacity` start/stop intervals of one phase.
#[derive(Debug)]
pub struct Stopwatch {
    slots: Vec<Slot>,
    capacity: usize,
}

impl Stopwatch {
    pub fn new(capacity: usize) -> Result<Self, StopwatchError> {
        if capacity == 0 {
            return Err(StopwatchError::ZeroCapacity);
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reserve the next slot and stamp its start time.
    pub fn start(&mut self) -> Result<Lap, StopwatchError> {
        if let Some(last) = self.slots.last() {
            if last.stop.is_none() {
                return Err(StopwatchError::LapInFlight {
                    index: self.slots.len() - 1,
                });
            }
        }
        if self.slots.len() == self.capacity {
            return Err(StopwatchError::CapacityExhausted {
                capacity: self.capacity,
            });
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            start: Instant::now(),
            stop: None,
        });
        Ok(Lap { index })
    }

    /// Stamp the stop time of `lap`.
    pub fn stop(&mut self, lap: Lap) {
        let now = Instant::now();
        match self.slots.get_mut(lap.index) {
            Some(slot) => {
                slot.stop.get_or_insert(now);
            }
            None => debug_assert!(false, "lap {} does not belong to this stopwatch", lap.index),
        }
    }

    /// Durations of all completed laps, in start order.
    pub fn elapsed(&self) -> Vec<Duration> {
        self.slots
            .iter()
            .filter_map(|slot| slot.stop.map(|stop| stop.duration_since(slot.start)))
            .collect()
    }

    /// Number of completed laps.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.stop.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every lap from slot `len` on, open or not. Freed slots can be
    /// started again.
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    /// Whether the most recent lap is still open.
    pub fn in_flight(&self) -> bool {
        self.slots.last().is_some_and(|slot| slot.stop.is_none())
    }
}

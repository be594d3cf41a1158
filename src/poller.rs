//! the recurring check that compares the wall clock against the armed alarms.
//! every tick scans the whole list, alarm counts are small enough that a
//! queue ordered by next fire time isn't worth it

use std::time::{Duration, Instant};

use chrono::NaiveTime;

use crate::{alarm::AlarmId, audio::AudioOutput, Clock};

/// where the current wall clock time comes from
pub trait TimeSource {
    fn now(&self) -> NaiveTime;
}

/// local time of the machine, no timezone conversion
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().naive_local().time()
    }
}

impl<F: Fn() -> NaiveTime> TimeSource for F {
    fn now(&self) -> NaiveTime {
        self()
    }
}

/// ticks at a fixed period, the caller decides how to wait (see [`Poller::time_until_tick`])
#[derive(Debug)]
pub struct Poller<T> {
    source: T,
    interval: Duration,
    last_tick: Option<Instant>,
}

impl<T: TimeSource> Poller<T> {
    pub const fn new(source: T, interval: Duration) -> Self {
        Self {
            source,
            interval,
            last_tick: None,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// the first tick is due straight away
    #[must_use]
    pub fn is_due(&self, at: Instant) -> bool {
        self.last_tick
            .map_or(true, |last| at.saturating_duration_since(last) >= self.interval)
    }

    #[must_use]
    pub fn time_until_tick(&self, at: Instant) -> Duration {
        self.last_tick.map_or(Duration::ZERO, |last| {
            self.interval.saturating_sub(at.saturating_duration_since(last))
        })
    }

    /// reads the time source and fires every alarm due now, returns the ids that fired
    pub fn tick<A: AudioOutput>(&mut self, at: Instant, clock: &mut Clock<A>) -> Vec<AlarmId> {
        self.last_tick = Some(at);
        clock.check_alarms(self.source.now())
    }

    /// ticks only if a full interval has passed since the last tick
    pub fn poll<A: AudioOutput>(&mut self, at: Instant, clock: &mut Clock<A>) -> Vec<AlarmId> {
        if self.is_due(at) {
            self.tick(at, clock)
        } else {
            Vec::new()
        }
    }
}

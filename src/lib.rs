#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use alarm::{Alarm, AlarmId, AlarmStore};
use audio::AudioOutput;
use chrono::NaiveTime;
use error::AlarmError;
use log::warn;
use ringer::{Ringer, RingingState};

pub mod alarm;
pub mod audio;
pub mod communication;
pub mod config;
pub mod error;
pub mod poller;
pub mod ringer;

/// the alarm list and the ringer, everything a front end reads or changes goes through here
pub struct Clock<A: AudioOutput> {
    alarms: AlarmStore,
    ringer: Ringer<A>,
}

impl<A: AudioOutput> Clock<A> {
    pub fn new(output: A) -> Self {
        Self {
            alarms: AlarmStore::new(),
            ringer: Ringer::new(output),
        }
    }

    #[must_use]
    pub const fn alarms(&self) -> &AlarmStore {
        &self.alarms
    }

    #[must_use]
    pub const fn ringing(&self) -> &RingingState {
        self.ringer.state()
    }

    pub fn add(&mut self, time: NaiveTime, label: impl Into<String>) -> AlarmId {
        self.alarms.add(time, label)
    }

    pub fn edit(
        &mut self,
        id: AlarmId,
        time: NaiveTime,
        label: impl Into<String>,
    ) -> Result<(), AlarmError> {
        self.alarms.edit(id, time, label)
    }

    /// arming or disarming an alarm leaves the ringing state alone, even for the
    /// alarm that is ringing right now
    pub fn toggle(&mut self, id: AlarmId) -> Result<bool, AlarmError> {
        self.alarms.toggle(id)
    }

    pub fn delete(&mut self, id: AlarmId) -> Result<Alarm, AlarmError> {
        self.alarms.delete(id)
    }

    pub fn set_label(&mut self, id: AlarmId, label: impl Into<String>) -> Result<(), AlarmError> {
        self.alarms.set_label(id, label)
    }

    pub fn stop(&mut self) {
        self.ringer.stop();
    }

    /// one poller tick: keeps the ringing sound looping, then disarms and fires
    /// every armed alarm in the same minute as `now`.
    /// alarms are fired in list order so when several match the last one in the
    /// list is the one left ringing
    pub fn check_alarms(&mut self, now: NaiveTime) -> Vec<AlarmId> {
        if let Err(e) = self.ringer.service() {
            warn!("couldn't restart alarm sound: {e}");
        }
        self.alarms
            .take_due(now)
            .into_iter()
            .map(|(id, label)| {
                // a sound failure must not keep the alarm from showing or the rest from firing
                if let Err(e) = self.ringer.fire(id, label) {
                    warn!("alarm {id} is ringing without sound: {e}");
                }
                id
            })
            .collect()
    }
}

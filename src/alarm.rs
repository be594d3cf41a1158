use std::fmt::{self, Write};

use chrono::{NaiveTime, Timelike};
use log::debug;

use crate::error::AlarmError;

/// opaque handle to an alarm, stays valid until that alarm is deleted
/// (deleting other alarms doesn't change it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlarmId(u64);

impl AlarmId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// represents an alarm
/// contains the time that the alarm should go off at,
/// whether it is armed, and a label (which may be empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    id: AlarmId,
    time: NaiveTime,
    active: bool,
    label: String,
}

impl Alarm {
    #[must_use]
    pub const fn id(&self) -> AlarmId {
        self.id
    }

    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// true if the alarm is armed and `now` is in the same minute as the alarm,
    /// seconds (and anything below) are ignored
    #[must_use]
    pub fn is_due(&self, now: NaiveTime) -> bool {
        self.active && self.time.hour() == now.hour() && self.time.minute() == now.minute()
    }

    /// one line summary, `time_format` is a chrono format string.
    /// a format that can't print a time of day falls back to `%H:%M`
    #[must_use]
    pub fn render(&self, time_format: &str) -> String {
        let mut line = format!("[{}] ", self.id);
        let start = line.len();
        if write!(line, "{}", self.time.format(time_format)).is_err() {
            line.truncate(start);
            line.push_str(&self.time.format("%H:%M").to_string());
        }
        line.push_str(if self.active { " on" } else { " off" });
        if !self.label.is_empty() {
            line.push(' ');
            line.push_str(&self.label);
        }
        line
    }
}

/// the ordered list of alarms, the only thing that writes to them
#[derive(Debug, Default, Clone)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
    last_id: u64,
}

impl AlarmStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// appends a new armed alarm, any time is accepted and duplicates are fine
    pub fn add(&mut self, time: NaiveTime, label: impl Into<String>) -> AlarmId {
        self.last_id += 1;
        let id = AlarmId(self.last_id);
        self.alarms.push(Alarm {
            id,
            time,
            active: true,
            label: label.into(),
        });
        debug!("added alarm {id} at {time}");
        id
    }

    /// replaces time and label but keeps the alarm armed (or not) as it was
    pub fn edit(
        &mut self,
        id: AlarmId,
        time: NaiveTime,
        label: impl Into<String>,
    ) -> Result<(), AlarmError> {
        let alarm = self.get_mut(id)?;
        alarm.time = time;
        alarm.label = label.into();
        Ok(())
    }

    /// flips whether the alarm is armed and returns the new value
    pub fn toggle(&mut self, id: AlarmId) -> Result<bool, AlarmError> {
        let alarm = self.get_mut(id)?;
        alarm.active = !alarm.active;
        Ok(alarm.active)
    }

    pub fn delete(&mut self, id: AlarmId) -> Result<Alarm, AlarmError> {
        let index = self
            .alarms
            .iter()
            .position(|alarm| alarm.id == id)
            .ok_or(AlarmError::UnknownAlarm(id))?;
        Ok(self.alarms.remove(index))
    }

    pub fn set_label(&mut self, id: AlarmId, label: impl Into<String>) -> Result<(), AlarmError> {
        self.get_mut(id)?.label = label.into();
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    /// alarms in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// disarms every alarm that is due at `now` and returns their ids and labels,
    /// in list order
    pub(crate) fn take_due(&mut self, now: NaiveTime) -> Vec<(AlarmId, String)> {
        self.alarms
            .iter_mut()
            .filter(|alarm| alarm.is_due(now))
            .map(|alarm| {
                alarm.active = false;
                (alarm.id, alarm.label.clone())
            })
            .collect()
    }

    fn get_mut(&mut self, id: AlarmId) -> Result<&mut Alarm, AlarmError> {
        self.alarms
            .iter_mut()
            .find(|alarm| alarm.id == id)
            .ok_or(AlarmError::UnknownAlarm(id))
    }
}

impl<'a> IntoIterator for &'a AlarmStore {
    type Item = &'a Alarm;
    type IntoIter = std::slice::Iter<'a, Alarm>;

    fn into_iter(self) -> Self::IntoIter {
        self.alarms.iter()
    }
}

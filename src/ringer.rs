use log::{debug, info, warn};

use crate::{
    alarm::AlarmId,
    audio::{AudioOutput, Playback},
    error::AudioError,
};

/// whether an alarm is currently being announced, at most one at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RingingState {
    #[default]
    Idle,
    Ringing { alarm: AlarmId, label: String },
}

impl RingingState {
    #[must_use]
    pub const fn is_ringing(&self) -> bool {
        matches!(self, Self::Ringing { .. })
    }

    /// label of the ringing alarm, empty when idle
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Ringing { label, .. } => label,
        }
    }

    #[must_use]
    pub const fn alarm(&self) -> Option<AlarmId> {
        match self {
            Self::Idle => None,
            Self::Ringing { alarm, .. } => Some(*alarm),
        }
    }
}

/// owns the ringing state and the looping alarm sound
pub struct Ringer<A: AudioOutput> {
    output: A,
    state: RingingState,
    playback: Option<A::Playback>,
}

impl<A: AudioOutput> Ringer<A> {
    pub fn new(output: A) -> Self {
        Self {
            output,
            state: RingingState::Idle,
            playback: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &RingingState {
        &self.state
    }

    /// starts ringing for `alarm`, replacing whatever was ringing before.
    /// the state is set even if the sound can't be started, the error is only
    /// returned so it can be reported
    pub fn fire(&mut self, alarm: AlarmId, label: impl Into<String>) -> Result<(), AudioError> {
        self.release();
        let label = label.into();
        info!("alarm {alarm} ringing: {label:?}");
        self.state = RingingState::Ringing { alarm, label };
        self.playback = Some(self.output.start()?);
        Ok(())
    }

    /// silences the alarm, does nothing if already idle
    pub fn stop(&mut self) {
        if let RingingState::Ringing { alarm, .. } = &self.state {
            info!("alarm {alarm} stopped");
        }
        self.release();
        self.state = RingingState::Idle;
    }

    /// restarts the sound if it reached its end, so it loops until `stop`
    pub fn service(&mut self) -> Result<(), AudioError> {
        let Some(playback) = &mut self.playback else {
            return Ok(());
        };
        if !playback.is_finished() {
            return Ok(());
        }
        debug!("alarm sound finished, restarting");
        if let Err(e) = playback.restart() {
            // keep ringing (the modal is still up) but let go of the broken sound
            self.release();
            return Err(e);
        }
        Ok(())
    }

    #[must_use]
    pub const fn has_playback(&self) -> bool {
        self.playback.is_some()
    }

    fn release(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            playback.stop();
        }
    }
}

impl<A: AudioOutput> Drop for Ringer<A> {
    fn drop(&mut self) {
        if self.playback.is_some() {
            warn!("ringer dropped while ringing, stopping sound");
        }
        self.release();
    }
}

//! audio is an injected service so the ringer can be driven without a sound card

use std::{
    fmt,
    io::{self, Cursor},
    path::Path,
    sync::Arc,
    time::Duration,
};

use log::{debug, warn};
use rodio::{source::SineWave, Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::{config::Sound, error::AudioError};

/// one running instance of the alarm sound
pub trait Playback {
    /// true once the sound has played to its end, this is the completion signal
    fn is_finished(&self) -> bool;
    /// plays the sound again from the start
    fn restart(&mut self) -> Result<(), AudioError>;
    /// stops playing and releases whatever the playback holds
    fn stop(&mut self);
}

/// something that can start playing the alarm sound
pub trait AudioOutput {
    type Playback: Playback;

    fn start(&mut self) -> Result<Self::Playback, AudioError>;
}

/// pitch and length of the beep played when there is no sound file
const TONE_HZ: f32 = 880.0;
const TONE_LENGTH: Duration = Duration::from_millis(400);

/// what gets played, the configured file or a generated beep when that file doesn't exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    File(Arc<[u8]>),
    Tone,
}

impl SoundSource {
    /// reads the sound file, a missing file gives the beep instead of an error
    pub fn load(path: &Path) -> Result<Self, AudioError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Self::File(bytes.into())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("no sound file at {}, beeping instead", path.display());
                Ok(Self::Tone)
            }
            Err(source) => Err(AudioError::SoundFile {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// plays a sound file on the default output device using rodio
pub struct RodioOutput {
    // None when the device couldn't be opened, alarms still ring but silently
    stream: Option<OutputStream>,
    sound: Sound,
    volume: f32,
}

impl fmt::Debug for RodioOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RodioOutput")
            .field("has_stream", &self.stream.is_some())
            .field("sound", &self.sound)
            .field("volume", &self.volume)
            .finish()
    }
}

impl RodioOutput {
    /// `volume` goes from 0 to 100
    #[must_use]
    pub fn open(sound: Sound, volume: f32) -> Self {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("couldn't open audio output, alarms will be silent: {e}");
                None
            }
        };
        Self {
            stream,
            sound,
            volume: volume.clamp(0.0, 100.0),
        }
    }
}

impl AudioOutput for RodioOutput {
    type Playback = RodioPlayback;

    fn start(&mut self) -> Result<Self::Playback, AudioError> {
        let Some(stream) = &self.stream else {
            return Err(AudioError::Device("output stream is not open".to_string()));
        };
        // read the file on every start so a replaced sound file is picked up
        let source = SoundSource::load(&self.sound.path)?;
        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(self.volume / 100.0);
        let playback = RodioPlayback { sink, source };
        playback.queue()?;
        playback.sink.play();
        debug!("playing {}", self.sound);
        Ok(playback)
    }
}

pub struct RodioPlayback {
    sink: Sink,
    source: SoundSource,
}

impl fmt::Debug for RodioPlayback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RodioPlayback")
            .field("tone", &(self.source == SoundSource::Tone))
            .finish_non_exhaustive()
    }
}

impl RodioPlayback {
    fn queue(&self) -> Result<(), AudioError> {
        match &self.source {
            SoundSource::File(bytes) => {
                self.sink.append(Decoder::new(Cursor::new(Arc::clone(bytes)))?);
            }
            // the gap until the next poller tick restarts it makes it beep
            SoundSource::Tone => self
                .sink
                .append(SineWave::new(TONE_HZ).take_duration(TONE_LENGTH)),
        }
        Ok(())
    }
}

impl Playback for RodioPlayback {
    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn restart(&mut self) -> Result<(), AudioError> {
        self.queue()?;
        self.sink.play();
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

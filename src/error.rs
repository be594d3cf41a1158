use std::path::PathBuf;

use thiserror::Error;

use crate::alarm::AlarmId;

/// errors from the alarm store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlarmError {
    /// the id was never handed out or the alarm was already deleted
    #[error("no alarm with id {0}")]
    UnknownAlarm(AlarmId),
}

/// errors from the audio output, these never stop an alarm from ringing
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Device(String),

    #[error("couldn't read sound file {path}: {source}")]
    SoundFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't decode sound: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't find a home directory for the config")]
    NoProjectDirs,

    #[error("couldn't access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// errors from reading a command line typed by the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{0}` is missing an argument")]
    MissingArgument(&'static str),

    #[error("`{0}` is not a valid alarm id")]
    InvalidId(String),

    #[error("`{0}` is not a valid time, try HH:MM")]
    InvalidTime(String),
}

//! the requests a front end sends to the [`Clock`](crate::Clock), and the text form
//! the terminal front end types them in

use std::str::FromStr;

use chrono::NaiveTime;

use crate::{
    alarm::AlarmId,
    audio::AudioOutput,
    error::{AlarmError, ParseError},
    Clock,
};

/// time formats accepted when typing an alarm time
const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%I:%M%p"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Add {
        time: NaiveTime,
        label: String,
    },
    Edit {
        id: AlarmId,
        time: NaiveTime,
        label: String,
    },
    Toggle(AlarmId),
    Delete(AlarmId),
    SetLabel {
        id: AlarmId,
        label: String,
    },
    /// silence the ringing alarm
    Stop,
    List,
    Quit,
}

/// what applying a message did, for the front end to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(AlarmId),
    Updated(AlarmId),
    Toggled { id: AlarmId, active: bool },
    Deleted(AlarmId),
    Stopped,
    /// nothing changed, the front end should just redraw
    Unchanged,
}

impl Message {
    /// applies a mutating message to the clock.
    /// `List` and `Quit` are for the front end itself and leave the clock alone
    pub fn apply<A: AudioOutput>(self, clock: &mut Clock<A>) -> Result<Outcome, AlarmError> {
        Ok(match self {
            Self::Add { time, label } => Outcome::Added(clock.add(time, label)),
            Self::Edit { id, time, label } => {
                clock.edit(id, time, label)?;
                Outcome::Updated(id)
            }
            Self::Toggle(id) => Outcome::Toggled {
                id,
                active: clock.toggle(id)?,
            },
            Self::Delete(id) => {
                clock.delete(id)?;
                Outcome::Deleted(id)
            }
            Self::SetLabel { id, label } => {
                clock.set_label(id, label)?;
                Outcome::Updated(id)
            }
            Self::Stop => {
                clock.stop();
                Outcome::Stopped
            }
            Self::List | Self::Quit => Outcome::Unchanged,
        })
    }
}

/// parses a time the way a user would type it, `07:30`, `7:30:15` or `7:30PM`
pub fn parse_time(input: &str) -> Result<NaiveTime, ParseError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(input, format).ok())
        .ok_or_else(|| ParseError::InvalidTime(input.to_string()))
}

fn parse_id(input: Option<&str>, command: &'static str) -> Result<AlarmId, ParseError> {
    let input = input.ok_or(ParseError::MissingArgument(command))?;
    input
        .parse()
        .map(AlarmId::new)
        .map_err(|_| ParseError::InvalidId(input.to_string()))
}

fn parse_time_arg(input: Option<&str>, command: &'static str) -> Result<NaiveTime, ParseError> {
    parse_time(input.ok_or(ParseError::MissingArgument(command))?)
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        // splits off the next word, whatever is left over is the label
        let next = |rest: &str| -> (Option<String>, String) {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let word = parts.next().filter(|w| !w.is_empty()).map(str::to_string);
            let tail = parts.next().unwrap_or("").trim().to_string();
            (word, tail)
        };

        match command.to_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "add" | "new" => {
                let (time, label) = next(rest);
                Ok(Self::Add {
                    time: parse_time_arg(time.as_deref(), "add")?,
                    label,
                })
            }
            "edit" => {
                let (id, rest) = next(rest);
                let (time, label) = next(&rest);
                Ok(Self::Edit {
                    id: parse_id(id.as_deref(), "edit")?,
                    time: parse_time_arg(time.as_deref(), "edit")?,
                    label,
                })
            }
            "toggle" => {
                let (id, _) = next(rest);
                Ok(Self::Toggle(parse_id(id.as_deref(), "toggle")?))
            }
            "delete" | "rm" => {
                let (id, _) = next(rest);
                Ok(Self::Delete(parse_id(id.as_deref(), "delete")?))
            }
            "label" => {
                let (id, label) = next(rest);
                Ok(Self::SetLabel {
                    id: parse_id(id.as_deref(), "label")?,
                    label,
                })
            }
            "stop" => Ok(Self::Stop),
            "list" | "ls" => Ok(Self::List),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

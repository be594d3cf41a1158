use std::{
    error::Error,
    io::{self, BufRead},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Instant,
};

use clap::{Parser, Subcommand};
use doseli::{
    alarm::AlarmId,
    audio::{AudioOutput, RodioOutput},
    communication::{parse_time, Message, Outcome},
    config::Config,
    error::ParseError,
    poller::{Poller, SystemClock},
    Clock,
};
use log::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
    /// alarm to set on startup, `HH:MM` or `HH:MM=label`, can be repeated
    #[clap(long, short)]
    alarm: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// write the default config file
    Init {
        #[clap(long, short)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    simple_file_logger::init_logger!("doseli").expect("couldn't initialize logger");

    let args = Args::parse();
    if let Some(Command::Init { force }) = args.command {
        let path = Config::config_path()?;
        let config = if force || !Config::is_config_present() {
            let config = Config::new();
            config.save(&path)?;
            println!("wrote config to {}", path.display());
            config
        } else {
            println!(
                "config already exists at {}, use --force to overwrite",
                path.display()
            );
            Config::load(&path)?
        };
        // the alarm beeps until a sound file is put here
        if let Some(sounds) = config.sound.path.parent() {
            std::fs::create_dir_all(sounds)?;
        }
        println!("alarm sound: {}", config.sound.path.display());
        return Ok(());
    }

    let config = load_config();
    let mut clock = Clock::new(RodioOutput::open(config.sound.clone(), config.volume));
    for alarm in &args.alarm {
        let (time, label) = alarm.split_once('=').unwrap_or((alarm.as_str(), ""));
        let id = clock.add(parse_time(time)?, label);
        println!("{}", render(&clock, id, &config));
    }

    // the reader thread only parses, every change to the clock happens on this thread
    let (tx, rx) = mpsc::channel::<Result<Message, ParseError>>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(line.parse()).is_err() {
                break;
            }
        }
    });

    let mut poller = Poller::new(SystemClock, config.poll_interval());
    info!("polling every {:?}", poller.interval());
    loop {
        match rx.recv_timeout(poller.time_until_tick(Instant::now())) {
            Ok(Ok(Message::Quit)) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(Ok(Message::List)) => list(&clock, &config),
            Ok(Ok(message)) => handle(message, &mut clock, &config),
            Ok(Err(e)) => println!("{e}"),
            Err(RecvTimeoutError::Timeout) => {}
        }
        for id in poller.poll(Instant::now(), &mut clock) {
            if clock.ringing().alarm() == Some(id) {
                let label = clock.ringing().label();
                println!("alarm ringing! {label} (type `stop` to stop it)");
            }
        }
    }
    clock.stop();
    Ok(())
}

fn load_config() -> Config {
    let path = match Config::config_path() {
        Ok(path) if path.exists() => path,
        Ok(_) => return Config::default(),
        Err(e) => {
            warn!("{e}, using default config");
            return Config::default();
        }
    };
    Config::load(&path).unwrap_or_else(|e| {
        warn!("{e}, using default config");
        Config::default()
    })
}

fn handle<A: AudioOutput>(message: Message, clock: &mut Clock<A>, config: &Config) {
    match message.apply(clock) {
        Ok(Outcome::Added(id) | Outcome::Updated(id) | Outcome::Toggled { id, .. }) => {
            println!("{}", render(clock, id, config));
        }
        Ok(Outcome::Deleted(id)) => println!("deleted alarm {id}"),
        Ok(Outcome::Stopped) => println!("alarm stopped"),
        Ok(Outcome::Unchanged) => {}
        // usually an id that was deleted in the meantime
        Err(e) => {
            warn!("{e}");
            println!("{e}");
        }
    }
}

fn render<A: AudioOutput>(clock: &Clock<A>, id: AlarmId, config: &Config) -> String {
    clock
        .alarms()
        .get(id)
        .map_or_else(String::new, |alarm| alarm.render(&config.time_format))
}

fn list<A: AudioOutput>(clock: &Clock<A>, config: &Config) {
    if clock.alarms().is_empty() {
        println!("no alarms set");
    }
    for alarm in clock.alarms() {
        println!("{}", alarm.render(&config.time_format));
    }
    if clock.ringing().is_ringing() {
        println!("ringing: {}", clock.ringing().label());
    }
}

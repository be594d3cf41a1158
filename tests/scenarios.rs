use std::{cell::RefCell, rc::Rc};

use chrono::NaiveTime;
use doseli::{
    audio::{AudioOutput, Playback},
    communication::{Message, Outcome},
    error::{AlarmError, AudioError},
    ringer::RingingState,
    Clock,
};

/// counts how many sounds are playing right now and how many were ever started
#[derive(Default)]
struct Speaker {
    playing: usize,
    started: usize,
    restarted: usize,
    // set to make the current sound look like it played to the end
    finished: bool,
    broken: bool,
}

struct TestOutput(Rc<RefCell<Speaker>>);

struct TestPlayback(Rc<RefCell<Speaker>>);

impl AudioOutput for TestOutput {
    type Playback = TestPlayback;

    fn start(&mut self) -> Result<TestPlayback, AudioError> {
        let mut speaker = self.0.borrow_mut();
        if speaker.broken {
            return Err(AudioError::Device("unplugged".to_string()));
        }
        speaker.playing += 1;
        speaker.started += 1;
        Ok(TestPlayback(Rc::clone(&self.0)))
    }
}

impl Playback for TestPlayback {
    fn is_finished(&self) -> bool {
        self.0.borrow().finished
    }

    fn restart(&mut self) -> Result<(), AudioError> {
        let mut speaker = self.0.borrow_mut();
        speaker.finished = false;
        speaker.restarted += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.0.borrow_mut().playing -= 1;
    }
}

fn clock() -> (Clock<TestOutput>, Rc<RefCell<Speaker>>) {
    let speaker = Rc::new(RefCell::new(Speaker::default()));
    (Clock::new(TestOutput(Rc::clone(&speaker))), speaker)
}

fn at(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, second).unwrap()
}

#[test]
fn work_alarm_rings_at_seven() {
    let (mut clock, speaker) = clock();
    let id = clock.add(at(7, 0, 0), "Work");

    assert!(clock.check_alarms(at(6, 59, 59)).is_empty());
    assert_eq!(clock.check_alarms(at(7, 0, 0)), vec![id]);

    assert!(!clock.alarms().get(id).unwrap().is_active());
    assert_eq!(
        clock.ringing(),
        &RingingState::Ringing {
            alarm: id,
            label: "Work".to_string()
        }
    );
    assert_eq!(speaker.borrow().playing, 1);
}

#[test]
fn one_fire_per_matching_minute() {
    let (mut clock, speaker) = clock();
    let id = clock.add(at(7, 0, 0), "Work");

    let fired: Vec<_> = (0..60)
        .flat_map(|second| clock.check_alarms(at(7, 0, second)))
        .collect();
    assert_eq!(fired, vec![id]);
    assert_eq!(speaker.borrow().started, 1);
    assert!(clock.ringing().is_ringing());
}

#[test]
fn same_minute_alarms_fire_together_and_last_in_list_wins() {
    let (mut clock, speaker) = clock();
    let a = clock.add(at(8, 30, 0), "A");
    let b = clock.add(at(8, 30, 0), "B");

    assert_eq!(clock.check_alarms(at(8, 30, 5)), vec![a, b]);
    assert!(!clock.alarms().get(a).unwrap().is_active());
    assert!(!clock.alarms().get(b).unwrap().is_active());
    assert_eq!(clock.ringing().label(), "B");
    assert_eq!(clock.ringing().alarm(), Some(b));

    // A's sound was released before B's started
    assert_eq!(speaker.borrow().started, 2);
    assert_eq!(speaker.borrow().playing, 1);
}

#[test]
fn stop_returns_to_idle_and_is_idempotent() {
    let (mut clock, speaker) = clock();
    clock.stop();
    assert_eq!(clock.ringing(), &RingingState::Idle);

    clock.add(at(7, 0, 0), "Work");
    clock.check_alarms(at(7, 0, 0));
    clock.stop();
    clock.stop();
    assert_eq!(clock.ringing(), &RingingState::Idle);
    assert_eq!(clock.ringing().label(), "");
    assert_eq!(speaker.borrow().playing, 0);
}

#[test]
fn ringing_stays_until_stopped() {
    let (mut clock, _speaker) = clock();
    clock.add(at(7, 0, 0), "Work");
    clock.check_alarms(at(7, 0, 0));

    for minute in 1..30 {
        clock.check_alarms(at(7, minute, 0));
        assert!(clock.ringing().is_ringing());
    }
    Message::Stop.apply(&mut clock).unwrap();
    assert!(!clock.ringing().is_ringing());
}

#[test]
fn finished_sound_is_restarted_on_the_next_tick() {
    let (mut clock, speaker) = clock();
    clock.add(at(7, 0, 0), "Work");
    clock.check_alarms(at(7, 0, 0));

    // still playing, nothing to do
    clock.check_alarms(at(7, 0, 1));
    assert_eq!(speaker.borrow().restarted, 0);

    speaker.borrow_mut().finished = true;
    assert!(clock.check_alarms(at(7, 3, 0)).is_empty());
    assert_eq!(speaker.borrow().restarted, 1);
    assert!(!speaker.borrow().finished);
    assert_eq!(speaker.borrow().started, 1);
    assert_eq!(speaker.borrow().playing, 1);
    assert_eq!(clock.ringing().label(), "Work");

    // once stopped a finished sound stays finished
    clock.stop();
    speaker.borrow_mut().finished = true;
    clock.check_alarms(at(7, 4, 0));
    assert_eq!(speaker.borrow().restarted, 1);
}

#[test]
fn toggle_does_not_touch_ringing_state() {
    let (mut clock, _speaker) = clock();
    let id = clock.add(at(7, 0, 0), "Work");
    clock.check_alarms(at(7, 0, 0));

    assert!(clock.toggle(id).unwrap());
    assert!(clock.ringing().is_ringing());
    assert!(!clock.toggle(id).unwrap());
    assert_eq!(clock.ringing().label(), "Work");
}

#[test]
fn disarmed_alarms_never_fire() {
    let (mut clock, _speaker) = clock();
    let id = clock.add(at(7, 0, 0), "Work");
    clock.toggle(id).unwrap();
    assert!(clock.check_alarms(at(7, 0, 0)).is_empty());
    assert!(!clock.ringing().is_ringing());
}

#[test]
fn rearmed_alarm_fires_again_next_day() {
    let (mut clock, speaker) = clock();
    let id = clock.add(at(7, 0, 0), "Work");
    clock.check_alarms(at(7, 0, 0));
    clock.stop();
    clock.toggle(id).unwrap();

    assert!(clock.check_alarms(at(12, 0, 0)).is_empty());
    assert_eq!(clock.check_alarms(at(7, 0, 30)), vec![id]);
    assert_eq!(speaker.borrow().started, 2);
}

#[test]
fn edit_after_delete_is_an_error_not_corruption() {
    let (mut clock, _speaker) = clock();
    let first = clock.add(at(6, 0, 0), "first");
    let second = clock.add(at(7, 0, 0), "second");

    clock.delete(first).unwrap();
    assert_eq!(
        clock.edit(first, at(9, 0, 0), "x"),
        Err(AlarmError::UnknownAlarm(first))
    );
    assert_eq!(
        Message::SetLabel {
            id: first,
            label: "x".to_string()
        }
        .apply(&mut clock),
        Err(AlarmError::UnknownAlarm(first))
    );

    let left: Vec<_> = clock.alarms().iter().map(|alarm| alarm.id()).collect();
    assert_eq!(left, vec![second]);
    assert_eq!(clock.alarms().get(second).unwrap().label(), "second");
    assert_eq!(clock.alarms().get(second).unwrap().time(), at(7, 0, 0));
}

#[test]
fn alarm_rings_silently_when_audio_is_broken() {
    let (mut clock, speaker) = clock();
    speaker.borrow_mut().broken = true;
    let a = clock.add(at(8, 30, 0), "A");
    let b = clock.add(at(8, 30, 0), "B");

    // the failure on A doesn't keep B from firing
    assert_eq!(clock.check_alarms(at(8, 30, 0)), vec![a, b]);
    assert!(!clock.alarms().get(a).unwrap().is_active());
    assert!(clock.ringing().is_ringing());
    assert_eq!(clock.ringing().label(), "B");

    clock.stop();
    assert!(!clock.ringing().is_ringing());
}

#[test]
fn messages_drive_the_clock() {
    let (mut clock, _speaker) = clock();
    let Ok(Outcome::Added(id)) = "add 07:00 Work".parse::<Message>().unwrap().apply(&mut clock)
    else {
        panic!("add should succeed");
    };
    assert_eq!(
        format!("toggle {id}")
            .parse::<Message>()
            .unwrap()
            .apply(&mut clock),
        Ok(Outcome::Toggled { id, active: false })
    );
    format!("edit {id} 07:45 Late")
        .parse::<Message>()
        .unwrap()
        .apply(&mut clock)
        .unwrap();
    let alarm = clock.alarms().get(id).unwrap();
    assert_eq!(alarm.time(), at(7, 45, 0));
    assert_eq!(alarm.label(), "Late");
    assert!(!alarm.is_active());

    assert_eq!(
        format!("delete {id}")
            .parse::<Message>()
            .unwrap()
            .apply(&mut clock),
        Ok(Outcome::Deleted(id))
    );
    assert!(clock.alarms().is_empty());
}

#[test]
fn dropping_the_clock_releases_the_sound() {
    let (mut clock, speaker) = clock();
    clock.add(at(7, 0, 0), "Work");
    clock.check_alarms(at(7, 0, 0));
    assert_eq!(speaker.borrow().playing, 1);
    drop(clock);
    assert_eq!(speaker.borrow().playing, 0);
}

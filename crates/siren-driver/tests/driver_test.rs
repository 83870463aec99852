//! Integration tests for the siren driver.
//!
//! These drive the public API through a recording host with a manual clock.

use siren_driver::validate::{check_range, validate_range, validate_repeat, MAX_BEEP_MS};
use siren_driver::{
    beep_steps, total_delay_ms, turn_off_steps, Attribute, BeepParams, CommandStep, DeviceStatus,
    MemoryStore, Param, RecordingHost, SirenDriver, SirenSettings, StateStore, TimerCallback,
};
use siren_protocol::{Command, NodeCapabilities, SIREN_IN_CLUSTERS};

fn new_siren() -> SirenDriver {
    SirenDriver::new("Siren", SirenSettings::default(), &NodeCapabilities::default())
}

/// Fire every due one-shot timer, collecting the emitted steps.
fn fire_due(siren: &mut SirenDriver, host: &mut RecordingHost) -> Vec<CommandStep> {
    let mut steps = Vec::new();
    while let Some(callback) = host.take_due() {
        steps.extend(siren.on_timer(host, callback));
    }
    steps
}

// ============================================================================
// Validator Properties
// ============================================================================

#[test]
fn test_validate_range_always_in_bounds() {
    let bounds = [(0, 0), (1, 5), (1, 3), (0, 18_000), (2, i64::from(i32::MAX))];
    let values = [i64::MIN, -1, 0, 1, 2, 3, 4, 5, 6, 17_999, 18_000, 18_001, i64::MAX];

    for &(min, max) in &bounds {
        for &value in &values {
            let result = validate_range(&Param::Int(value), min, min, max, "Test");
            assert!(result >= min && result <= max, "{} in [{}, {}] gave {}", value, min, max, result);
            if value >= min && value <= max {
                assert_eq!(result, value);
            } else if value > max {
                assert_eq!(result, max);
            } else {
                assert_eq!(result, min);
            }
        }
    }
}

#[test]
fn test_validate_range_unparseable_uses_default() {
    for raw in [Param::Missing, Param::from(""), Param::from("loud"), Param::from("1.5")] {
        let (result, correction) = check_range(&raw, 2, 1, 3);
        assert_eq!(result, 2);
        assert!(correction.is_some());
    }
    assert_eq!(validate_range(&Param::from(" 3 "), 1, 1, 5, "Sound"), 3);
}

#[test]
fn test_repeat_zero_when_length_fills_budget() {
    for delay in [1, 25, 1000, 18_000] {
        assert_eq!(validate_repeat(&Param::Int(5), 18_000, delay), 0);
    }
}

#[test]
fn test_beep_burst_within_budget() {
    for length in [0, 50, 100, 6_000, 18_000, 50_000] {
        for delay in [0, 25, 1000, 17_999] {
            for repeat in [0, 1, 7, 1000] {
                let params = BeepParams::validate(
                    &Param::Int(3),
                    &Param::Int(1),
                    &Param::Int(repeat),
                    &Param::Int(delay),
                    &Param::Int(length),
                );
                assert!(total_delay_ms(&beep_steps(&params)) <= MAX_BEEP_MS as u64);
            }
        }
    }
}

// ============================================================================
// Status Machine
// ============================================================================

#[test]
fn test_custom_beep_scenario() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    let steps = siren.custom_beep(&mut host, 3, 2, 3, 25, 50);

    let mut expected = Vec::new();
    for i in 0..3 {
        expected.push(CommandStep::Send(Command::siren_sound_volume(3, 2)));
        expected.push(CommandStep::Delay(50));
        expected.push(CommandStep::Send(Command::switch_off()));
        if i < 2 {
            expected.push(CommandStep::Delay(25));
        }
    }
    expected.extend(turn_off_steps());

    assert_eq!(steps, expected);
    assert_eq!(siren.status(), DeviceStatus::CustomBeep);
}

#[test]
fn test_same_status_twice_never_rearms() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();

    siren.start_beep(&mut host);
    assert!(host.is_armed(TimerCallback::PlayNextBeep));

    siren.start_custom_beep(&mut host, 10, 60, 3, 1, 1, 0, 50);
    siren.off(&mut host);
    siren.off(&mut host);

    let state = siren.state();
    assert!(!state.alarm_pending && !state.beep_schedule_running);
    assert!(state.beep_schedule.is_none() && state.scheduled_alarm.is_none());
    assert!(!host.is_armed(TimerCallback::PlayNextBeep));
    assert!(!host.is_armed(TimerCallback::PlayPendingAlarm));
}

#[test]
fn test_off_status_has_no_pending_work() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    siren.delayed_alarm(&mut host, 4, 2, 10, 5);
    siren.start_beep(&mut host);
    siren.off(&mut host);

    assert_eq!(siren.status(), DeviceStatus::Off);
    assert!(siren.state().scheduled_alarm.is_none());
    assert!(siren.state().beep_schedule.is_none());
}

// ============================================================================
// Delayed Alarms
// ============================================================================

#[test]
fn test_delayed_alarm_plays_custom_alarm() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    assert!(siren.delayed_alarm(&mut host, 4, 2, 10, 5).is_empty());
    assert_eq!(siren.status(), DeviceStatus::DelayedAlarm);

    host.advance_ms(4_999);
    assert!(fire_due(&mut siren, &mut host).is_empty());

    host.advance_ms(1);
    let fired = fire_due(&mut siren, &mut host);

    let mut reference_host = RecordingHost::new(0);
    let expected = new_siren().custom_alarm(&mut reference_host, 4, 2, 10);
    assert_eq!(fired, expected);
    assert_eq!(siren.status(), DeviceStatus::CustomAlarm);
    assert!(!siren.state().alarm_pending);
    assert!(siren.state().scheduled_alarm.is_none());
}

#[test]
fn test_delayed_alarm_default_delay() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    siren.delayed_alarm(&mut host, 4, 2, 10, Param::Missing);
    assert_eq!(host.timer(TimerCallback::PlayPendingAlarm).map(|t| t.due_ms), Some(3_000));

    siren.delayed_alarm(&mut host, 4, 2, 10, 0);
    assert_eq!(host.timer(TimerCallback::PlayPendingAlarm).map(|t| t.due_ms), Some(1_000));
}

#[test]
fn test_beep_schedule_cancels_delayed_alarm() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    siren.delayed_alarm(&mut host, 4, 2, 10, 5);
    siren.start_beep(&mut host);

    assert!(siren.state().scheduled_alarm.is_none());
    assert!(!siren.state().alarm_pending);
    assert!(!host.is_armed(TimerCallback::PlayPendingAlarm));

    // A late firing of the old timer is a no-op.
    assert!(siren.on_timer(&mut host, TimerCallback::PlayPendingAlarm).is_empty());

    // Run the schedule to completion: no alarm ever sounds.
    let mut all = Vec::new();
    for _ in 0..10 {
        host.advance_ms(10_000);
        all.extend(fire_due(&mut siren, &mut host));
    }
    assert!(!all.contains(&CommandStep::Send(Command::siren_sound_volume(4, 2))));
    assert!(siren.state().beep_schedule.is_none());
}

// ============================================================================
// Beep Schedules
// ============================================================================

#[test]
fn test_zero_interval_schedule_fires_once() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    let steps = siren.start_custom_beep(&mut host, 0, 60, 3, 1, 1, 0, 50);

    let mut expected = vec![
        CommandStep::Send(Command::siren_sound_volume(3, 1)),
        CommandStep::Delay(50),
        CommandStep::Send(Command::switch_off()),
    ];
    expected.extend(turn_off_steps());
    assert_eq!(steps, expected);

    assert!(!host.is_armed(TimerCallback::PlayNextBeep));
    assert!(siren.state().beep_schedule.is_none());
    assert!(!siren.state().beep_schedule_running);
}

#[test]
fn test_start_custom_beep_defaults() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    siren.start_custom_beep(&mut host, 5, 20, 2, 2, Param::Missing, Param::Missing, Param::Missing);
    let schedule = siren.state().beep_schedule.expect("schedule running");
    assert_eq!(schedule.beep.repeat, 1);
    assert_eq!(schedule.beep.repeat_delay_ms, 1000);
    assert_eq!(schedule.beep.beep_length_ms, 100);
}

#[test]
fn test_stop_after_minimum() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    siren.start_custom_beep(&mut host, 1, 0, 3, 1, 1, 0, 50);
    assert_eq!(siren.state().beep_schedule.map(|s| s.stop_after_secs), Some(2));
}

#[test]
fn test_schedule_cancelled_by_off() {
    let mut host = RecordingHost::new(0);
    let mut siren = new_siren();
    siren.start_beep(&mut host);
    host.advance_ms(10_000);
    fire_due(&mut siren, &mut host);

    let steps = siren.off(&mut host);
    assert_eq!(steps, turn_off_steps());
    host.advance_ms(60_000);
    assert!(fire_due(&mut siren, &mut host).is_empty());
}

#[test]
fn test_beep_routed_through_schedule() {
    let mut host = RecordingHost::new(0);
    let settings = SirenSettings {
        use_beep_schedule_for_beep: true,
        ..Default::default()
    };
    let mut siren = SirenDriver::new("Siren", settings, &NodeCapabilities::default());
    siren.beep(&mut host);
    assert_eq!(siren.status(), DeviceStatus::BeepSchedule);
    assert!(host.is_armed(TimerCallback::PlayNextBeep));
}

// ============================================================================
// Persistence and Inbound Reports
// ============================================================================

#[test]
fn test_pending_alarm_survives_restart() {
    let mut host = RecordingHost::new(0);
    let mut store = MemoryStore::new();

    let mut before = new_siren();
    before.delayed_alarm(&mut host, 2, 3, 0, 5);
    store.save(before.state()).expect("save");
    drop(before);

    let state = store.load().expect("load").expect("saved state");
    let mut after = new_siren().with_state(state);
    host.advance_ms(5_000);
    let steps = fire_due(&mut after, &mut host);
    assert_eq!(steps, vec![CommandStep::Send(Command::siren_sound_volume(2, 3))]);
}

#[test]
fn test_alarm_then_switch_report() {
    let caps = NodeCapabilities::from_clusters(SIREN_IN_CLUSTERS);
    let mut host = RecordingHost::new(0);
    let mut siren = SirenDriver::new("Siren", SirenSettings::default(), &caps);

    let steps = siren.custom_alarm(&mut host, 1, 3, 2);
    let wire = siren.render(&steps);
    assert_eq!(
        wire,
        vec!["988100700425020103", "delay 2000", "988100250100", "delay 100", "9881002502"]
    );

    siren.parse_hex(&mut host, "988100250300");
    assert_eq!(siren.status(), DeviceStatus::Off);
    let alarm = host.last_event(Attribute::Alarm).expect("alarm event");
    // A custom alarm never shows the alarm as sounding, so switching off is not displayed either.
    assert_eq!((alarm.value.as_str(), alarm.displayed), ("off", false));
}

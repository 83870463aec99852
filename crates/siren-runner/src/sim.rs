//! Virtual-clock simulation of a hub, its transport and a siren.
//!
//! Command sequences are laid out on the virtual clock as they would be sent
//! by the hub: each frame goes out after the delays declared before it. The
//! simulated siren answers get requests with reports, which are parsed by
//! the driver at the moment they arrive. Timers armed by the driver fire at
//! their due time.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use siren_driver::{CommandStep, DeviceEvent, Host, SirenDriver, TimerCallback};
use siren_protocol::{
    Command, Report, AEON_LABS_MANUFACTURER_ID, PARAM_SIREN_SOUND_VOLUME, SIREN_PRODUCT_ID,
    SIREN_PRODUCT_TYPE, SWITCH_OFF, SWITCH_ON,
};
use tracing::{debug, trace};

// ============================================================================
// Timeline
// ============================================================================

/// Something that happened during a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimelineEntry {
    /// A frame left the hub.
    Frame { at_ms: i64, wire: String, command: String },
    /// The siren answered with a report.
    Report { at_ms: i64, wire: String, report: String },
    /// The driver sent an attribute update.
    Event { at_ms: i64, event: DeviceEvent },
    /// The driver armed a timer.
    TimerArmed { at_ms: i64, callback: TimerCallback, due_ms: i64 },
    /// A timer fired.
    TimerFired { at_ms: i64, callback: TimerCallback },
}

impl TimelineEntry {
    /// Virtual time of the entry.
    pub fn at_ms(&self) -> i64 {
        match self {
            TimelineEntry::Frame { at_ms, .. }
            | TimelineEntry::Report { at_ms, .. }
            | TimelineEntry::Event { at_ms, .. }
            | TimelineEntry::TimerArmed { at_ms, .. }
            | TimelineEntry::TimerFired { at_ms, .. } => *at_ms,
        }
    }
}

/// Formats entries relative to a start time.
pub struct Relative<'a> {
    /// Start of the run.
    pub start_ms: i64,
    /// Entry to format.
    pub entry: &'a TimelineEntry,
}

impl fmt::Display for Relative<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offset = self.entry.at_ms() - self.start_ms;
        write!(f, "[+{:>4}.{:03}s] ", offset / 1000, offset % 1000)?;
        match self.entry {
            TimelineEntry::Frame { wire, command, .. } => write!(f, "-> {:<24} {}", wire, command),
            TimelineEntry::Report { wire, report, .. } => write!(f, "<- {:<24} {}", wire, report),
            TimelineEntry::Event { event, .. } => {
                let shown = if event.displayed { "" } else { " (hidden)" };
                write!(f, "event {} = {}{}", event.attribute, event.value, shown)
            }
            TimelineEntry::TimerArmed { callback, due_ms, .. } => {
                write!(f, "timer {} armed for +{}ms", callback, due_ms - self.entry.at_ms())
            }
            TimelineEntry::TimerFired { callback, .. } => write!(f, "timer {} fired", callback),
        }
    }
}

// ============================================================================
// Host
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct SimTimer {
    due_ms: i64,
    period_ms: Option<i64>,
}

/// A [`Host`] on a virtual clock that records what the driver does.
#[derive(Debug, Default)]
pub struct SimHost {
    now_ms: i64,
    timers: BTreeMap<TimerCallback, SimTimer>,
    timeline: Vec<TimelineEntry>,
}

impl SimHost {
    /// Host whose clock starts at `start_ms`.
    pub fn new(start_ms: i64) -> Self {
        SimHost {
            now_ms: start_ms,
            ..Default::default()
        }
    }

    /// Earliest armed timer, if any.
    fn next_timer(&self) -> Option<(TimerCallback, i64)> {
        self.timers
            .iter()
            .min_by_key(|(_, timer)| timer.due_ms)
            .map(|(callback, timer)| (*callback, timer.due_ms))
    }

    /// Consume a due timer, re-arming it if it is periodic.
    fn fire(&mut self, callback: TimerCallback) {
        if let Some(timer) = self.timers.remove(&callback) {
            if let Some(period) = timer.period_ms {
                self.timers.insert(
                    callback,
                    SimTimer {
                        due_ms: timer.due_ms + period,
                        period_ms: Some(period),
                    },
                );
            }
        }
        self.timeline.push(TimelineEntry::TimerFired {
            at_ms: self.now_ms,
            callback,
        });
    }

    fn arm(&mut self, callback: TimerCallback, timer: SimTimer) {
        self.timers.insert(callback, timer);
        self.timeline.push(TimelineEntry::TimerArmed {
            at_ms: self.now_ms,
            callback,
            due_ms: timer.due_ms,
        });
    }
}

impl Host for SimHost {
    fn now_millis(&self) -> i64 {
        self.now_ms
    }

    fn run_in(&mut self, delay_secs: u64, callback: TimerCallback) {
        let due_ms = self.now_ms + (delay_secs as i64) * 1000;
        self.arm(callback, SimTimer { due_ms, period_ms: None });
    }

    fn run_every(&mut self, period_minutes: u32, callback: TimerCallback) {
        let period = i64::from(period_minutes) * 60_000;
        self.arm(
            callback,
            SimTimer {
                due_ms: self.now_ms + period,
                period_ms: Some(period),
            },
        );
    }

    fn unschedule(&mut self, callback: TimerCallback) {
        self.timers.remove(&callback);
    }

    fn send_event(&mut self, event: DeviceEvent) {
        self.timeline.push(TimelineEntry::Event {
            at_ms: self.now_ms,
            event,
        });
    }
}

// ============================================================================
// Simulated Siren
// ============================================================================

/// The siren end of the link: tracks whether it is sounding and answers
/// get requests.
#[derive(Debug, Default, Clone)]
pub struct SimulatedSiren {
    sounding: bool,
    sound_volume: [u8; 2],
    notifications: u8,
}

impl SimulatedSiren {
    /// Whether the siren is currently making noise.
    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    /// Apply a command, returning the report the siren answers with.
    pub fn receive(&mut self, command: &Command) -> Option<Report> {
        match command {
            Command::ConfigurationSet { parameter, value, .. } if *parameter == PARAM_SIREN_SOUND_VOLUME => {
                if let [sound, volume] = value.as_slice() {
                    self.sound_volume = [*sound, *volume];
                }
                self.sounding = true;
                None
            }
            Command::ConfigurationSet { value, .. } => {
                self.notifications = value.first().copied().unwrap_or_default();
                None
            }
            Command::ConfigurationGet { parameter } => {
                let value = if *parameter == PARAM_SIREN_SOUND_VOLUME {
                    self.sound_volume.to_vec()
                } else {
                    vec![self.notifications]
                };
                Some(Report::Configuration {
                    parameter: *parameter,
                    size: value.len() as u8,
                    value,
                })
            }
            Command::SwitchBinarySet { value } => {
                self.sounding = *value != SWITCH_OFF;
                None
            }
            Command::SwitchBinaryGet => Some(Report::SwitchBinary {
                value: self.switch_value(),
            }),
            Command::BasicGet => Some(Report::Basic {
                value: self.switch_value(),
            }),
            Command::ManufacturerSpecificGet => Some(Report::ManufacturerSpecific {
                manufacturer_id: AEON_LABS_MANUFACTURER_ID,
                product_type: SIREN_PRODUCT_TYPE,
                product_id: SIREN_PRODUCT_ID,
            }),
            Command::VersionGet => Some(Report::Version {
                library_type: 3,
                protocol_version: 4,
                protocol_sub_version: 5,
                application_version: 1,
                application_sub_version: 1,
            }),
        }
    }

    fn switch_value(&self) -> u8 {
        if self.sounding {
            SWITCH_ON
        } else {
            SWITCH_OFF
        }
    }
}

// ============================================================================
// Simulation
// ============================================================================

#[derive(Debug, Clone)]
struct QueuedFrame {
    send_at_ms: i64,
    seq: u64,
    command: Command,
}

/// A driver, its host and a simulated siren sharing one virtual clock.
pub struct Simulation {
    driver: SirenDriver,
    host: SimHost,
    siren: SimulatedSiren,
    outbox: Vec<QueuedFrame>,
    next_seq: u64,
    start_ms: i64,
}

impl Simulation {
    /// Simulation starting at `start_ms`.
    pub fn new(driver: SirenDriver, start_ms: i64) -> Self {
        Simulation {
            driver,
            host: SimHost::new(start_ms),
            siren: SimulatedSiren::default(),
            outbox: Vec::new(),
            next_seq: 0,
            start_ms,
        }
    }

    /// The driver under simulation.
    pub fn driver(&self) -> &SirenDriver {
        &self.driver
    }

    /// The simulated siren.
    pub fn siren(&self) -> &SimulatedSiren {
        &self.siren
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> i64 {
        self.host.now_ms
    }

    /// Start of the run.
    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Everything recorded so far.
    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.host.timeline
    }

    /// Consume the simulation, returning the driver and the timeline.
    pub fn finish(self) -> (SirenDriver, Vec<TimelineEntry>) {
        (self.driver, self.host.timeline)
    }

    /// Run an action against the driver now and queue what it returns.
    pub fn apply<F>(&mut self, action: F)
    where
        F: FnOnce(&mut SirenDriver, &mut SimHost) -> Vec<CommandStep>,
    {
        let steps = action(&mut self.driver, &mut self.host);
        self.enqueue(&steps);
    }

    /// Deliver an inbound frame to the driver now.
    pub fn inject(&mut self, frame: &[u8]) {
        let name = match Report::decode(frame) {
            Ok(report) => match report.encapsulated() {
                Some(Ok(inner)) => inner.name(),
                _ => report.name(),
            },
            Err(_) => "undecodable",
        };
        self.record_report(frame, name);
        self.driver.parse(&mut self.host, frame);
    }

    /// Lay a command sequence out on the clock, starting now.
    fn enqueue(&mut self, steps: &[CommandStep]) {
        let mut at = self.host.now_ms;
        for step in steps {
            match step {
                CommandStep::Send(command) => {
                    self.outbox.push(QueuedFrame {
                        send_at_ms: at,
                        seq: self.next_seq,
                        command: command.clone(),
                    });
                    self.next_seq += 1;
                }
                CommandStep::Delay(ms) => at += *ms as i64,
            }
        }
    }

    fn take_next_frame(&mut self, until_ms: i64) -> Option<QueuedFrame> {
        let index = self
            .outbox
            .iter()
            .enumerate()
            .filter(|(_, f)| f.send_at_ms <= until_ms)
            .min_by_key(|(_, f)| (f.send_at_ms, f.seq))
            .map(|(i, _)| i)?;
        Some(self.outbox.remove(index))
    }

    /// Advance the clock to `end_ms`, sending queued frames and firing
    /// timers in time order. Frames win ties with timers.
    pub fn run_until(&mut self, end_ms: i64) {
        loop {
            let next_frame_at = self
                .outbox
                .iter()
                .map(|f| f.send_at_ms)
                .min()
                .filter(|at| *at <= end_ms);
            let next_timer = self.host.next_timer().filter(|(_, due)| *due <= end_ms);

            match (next_frame_at, next_timer) {
                (Some(frame_at), Some((_, due))) if frame_at <= due => self.send_next(frame_at),
                (Some(frame_at), None) => self.send_next(frame_at),
                (_, Some((callback, due))) => {
                    self.host.now_ms = self.host.now_ms.max(due);
                    self.host.fire(callback);
                    trace!("firing {}", callback);
                    self.apply(|driver, host| driver.on_timer(host, callback));
                }
                (None, None) => break,
            }
        }
        self.host.now_ms = self.host.now_ms.max(end_ms);
    }

    /// Advance until nothing is queued and only periodic timers remain, or
    /// until `end_ms`, whichever is first.
    pub fn run_until_idle(&mut self, end_ms: i64) {
        loop {
            let pending_one_shot = self
                .host
                .timers
                .iter()
                .filter(|(_, t)| t.period_ms.is_none())
                .map(|(_, t)| t.due_ms)
                .min();
            let pending_frame = self.outbox.iter().map(|f| f.send_at_ms).min();

            let next = match (pending_one_shot, pending_frame) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => break,
            };
            if next > end_ms {
                break;
            }
            self.run_until(next);
        }
    }

    fn send_next(&mut self, frame_at: i64) {
        self.host.now_ms = self.host.now_ms.max(frame_at);
        let Some(frame) = self.take_next_frame(self.host.now_ms) else {
            return;
        };

        let encoder = self.driver.wire_encoder();
        self.host.timeline.push(TimelineEntry::Frame {
            at_ms: self.host.now_ms,
            wire: encoder.format(&frame.command),
            command: frame.command.to_string(),
        });

        if let Some(report) = self.siren.receive(&frame.command) {
            let mut bytes = report.encode();
            if encoder.is_secure() {
                bytes = siren_protocol::encapsulate(&bytes);
            }
            debug!("siren answered {}", report.name());
            self.inject(&bytes);
        }
    }

    fn record_report(&mut self, frame: &[u8], name: &str) {
        self.host.timeline.push(TimelineEntry::Report {
            at_ms: self.host.now_ms,
            wire: siren_protocol::to_hex(frame),
            report: name.to_string(),
        });
    }
}

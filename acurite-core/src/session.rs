//! Drives edge events through both framing state machines and the device
//! registry, turning accepted candidates into `Payload`s.

use crate::device::{Device, Device523, Device609};
use crate::model523::FramingState523;
use crate::model609::FramingState609;
use crate::payload::{Payload, Status};
use crate::pulse::PulseEvent;

/// A source of raw edge-transition events, supplied by the host.
///
/// Implementors own the GPIO/interrupt plumbing; `next_edge` blocks (or
/// polls) for up to `timeout_us` and returns `None` if nothing arrived in
/// that window.
pub trait EdgeSource {
    fn next_edge(&mut self, timeout_us: u64) -> Option<PulseEvent>;
}

/// A monotonic microsecond clock, supplied by the host.
pub trait Clock {
    fn now_us(&self) -> u64;
}

/// Running accept/reject counters for one registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStats {
    pub accepted: u32,
    pub rejected: u32,
}

impl DeviceStats {
    fn record(&mut self, result: &Result<(), crate::Error>) {
        match result {
            Ok(()) => self.accepted = self.accepted.saturating_add(1),
            Err(_) => self.rejected = self.rejected.saturating_add(1),
        }
    }
}

/// Owns both framing state machines and the fixed set of registered
/// devices, dispatching every accepted candidate to its matching device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispatcher {
    framer523: FramingState523,
    framer609: FramingState609,
    devices523: [Device523; 2],
    device609: Device609,
    stats523: [DeviceStats; 2],
    stats609: DeviceStats,
    on_accept: Option<fn(model: u16, device: u16, stats: DeviceStats)>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new_with_defaults()
    }
}

impl Dispatcher {
    /// Build a dispatcher preloaded with the freezer, fridge, and a single
    /// outdoor sensor slot.
    pub fn new_with_defaults() -> Self {
        Self {
            framer523: FramingState523::new(),
            framer609: FramingState609::new(),
            devices523: [Device523::freezer(), Device523::fridge()],
            device609: Device609::outdoor(),
            stats523: [DeviceStats::default(); 2],
            stats609: DeviceStats::default(),
            on_accept: None,
        }
    }

    /// Register a callback invoked on every accepted candidate, after its
    /// device's stats are updated, with the just-updated counters. This is
    /// the `updateStats` external sink named by the dispatch rules; hosts
    /// that don't need observability can leave it unset.
    pub fn with_stats_callback(mut self, callback: fn(u16, u16, DeviceStats)) -> Self {
        self.on_accept = Some(callback);
        self
    }

    /// Reset all framing state. Device identity and latched readings
    /// survive a reset; only in-flight bit accumulation is discarded.
    pub fn reset(&mut self) {
        self.framer523 = FramingState523::new();
        self.framer609 = FramingState609::new();
    }

    pub fn stats523(&self, index: usize) -> Option<DeviceStats> {
        self.stats523.get(index).copied()
    }

    pub fn stats609(&self) -> DeviceStats {
        self.stats609
    }

    pub fn device523(&self, index: usize) -> Option<&Device523> {
        self.devices523.get(index)
    }

    pub fn device609(&self) -> &Device609 {
        &self.device609
    }

    /// Feed one edge event to both framers and dispatch any completed
    /// candidate to the first matching device. Candidates from the 00523
    /// framer are tried against the freezer then the fridge; the 00609
    /// candidate against the single outdoor slot.
    pub fn step(&mut self, event: PulseEvent) -> Option<Payload> {
        let candidate523 = self.framer523.parse_rf(event.duration_us, event.level);
        let candidate609 = self.framer609.parse_rf(event.duration_us, event.level);

        if candidate523 != 0 {
            for (device, stats) in self.devices523.iter_mut().zip(self.stats523.iter_mut()) {
                let result = device.validate(candidate523);
                stats.record(&result);
                if result.is_ok() {
                    if let Some(callback) = self.on_accept {
                        callback(device.model(), device.id(), *stats);
                    }
                    self.framer523.clear();
                    self.framer609.clear();
                    return Some(device.create_payload(Status::Ok));
                }
            }
        }

        if candidate609 != 0 {
            let result = self.device609.validate(candidate609);
            self.stats609.record(&result);
            if result.is_ok() {
                if let Some(callback) = self.on_accept {
                    callback(self.device609.model(), self.device609.id(), self.stats609);
                }
                self.framer523.clear();
                self.framer609.clear();
                return Some(self.device609.create_payload(Status::Ok));
            }
        }

        None
    }
}

/// High-level driver pairing a host `EdgeSource`/`Clock` with a
/// `Dispatcher`.
pub struct Session<E, C> {
    edge_source: E,
    clock: C,
    dispatcher: Dispatcher,
}

impl<E: EdgeSource, C: Clock> Session<E, C> {
    pub fn new(edge_source: E, clock: C) -> Self {
        Self {
            edge_source,
            clock,
            dispatcher: Dispatcher::new_with_defaults(),
        }
    }

    /// Discard any in-flight framing state, e.g. after a receiver restart.
    pub fn start(&mut self) {
        self.dispatcher.reset();
    }

    /// Poll the edge source until a payload is decoded or `timeout_seconds`
    /// elapses with nothing accepted, returning `None` on timeout.
    pub fn available(&mut self, timeout_seconds: u32) -> Option<Payload> {
        let deadline = self.clock.now_us() + (timeout_seconds as u64) * 1_000_000;
        loop {
            let now = self.clock.now_us();
            if now >= deadline {
                return None;
            }
            let remaining = deadline - now;
            let event = self.edge_source.next_edge(remaining)?;
            if let Some(payload) = self.dispatcher.step(event) {
                return Some(payload);
            }
        }
    }

    /// Build a synthetic payload reporting `Status::Timeout`, for hosts
    /// that want to emit a heartbeat record when `available` times out.
    pub fn timeout_payload(model: u16, device: u16) -> Payload {
        Payload::new(model, device, Status::Timeout, 0, 0.0, 0.0)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

//! Linux GPIO implementation of `acurite_core::EdgeSource`, backed by the
//! `gpio-cdev` character device interface.

use std::os::fd::{AsRawFd, BorrowedFd};
use std::time::Instant;

use acurite_core::{EdgeSource, PulseEvent, MIN_PULSE_US};
use anyhow::Context;
use gpio_cdev::{Chip, EventRequestFlags, EventType, LineEventHandle, LineRequestFlags};
use nix::poll::{poll, PollFd, PollFlags};

/// Edge source reading both-edge transitions off a single GPIO line.
pub struct GpioEdgeSource {
    events: LineEventHandle,
    last_edge: Instant,
}

impl GpioEdgeSource {
    pub fn open(chip_path: &str, line_offset: u32) -> anyhow::Result<Self> {
        let mut chip = Chip::new(chip_path)
            .with_context(|| format!("failed to open GPIO chip {chip_path}"))?;
        let line = chip
            .get_line(line_offset)
            .with_context(|| format!("failed to get GPIO line {line_offset}"))?;
        let events = line
            .events(
                LineRequestFlags::INPUT,
                EventRequestFlags::BOTH_EDGES,
                "acurite-cli",
            )
            .with_context(|| "failed to request GPIO line events")?;
        Ok(Self {
            events,
            last_edge: Instant::now(),
        })
    }

    fn poll_one(&mut self, timeout_ms: i32) -> Option<PulseEvent> {
        let raw_fd = self.events.as_raw_fd();
        // SAFETY: `self.events` outlives this borrow; poll() does not retain it.
        let borrowed = unsafe { BorrowedFd::borrow_raw(raw_fd) };
        let mut fds = [PollFd::new(borrowed, PollFlags::POLLIN)];
        let ready = poll(&mut fds, timeout_ms).ok()?;
        if ready == 0 {
            return None;
        }

        let event = self.events.get_event().ok()?;
        let now = Instant::now();
        let duration_us = u32::try_from(now.duration_since(self.last_edge).as_micros())
            .unwrap_or(u32::MAX);
        self.last_edge = now;

        // `level` reports the pulse that just ended: a rising edge means the
        // period before it was low, a falling edge means it was high.
        let level = match event.event_type() {
            EventType::RisingEdge => 0,
            EventType::FallingEdge => 1,
        };
        Some(PulseEvent::new(level, duration_us))
    }
}

impl EdgeSource for GpioEdgeSource {
    fn next_edge(&mut self, timeout_us: u64) -> Option<PulseEvent> {
        let deadline = Instant::now() + std::time::Duration::from_micros(timeout_us);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let timeout_ms = i32::try_from(remaining.as_millis()).unwrap_or(i32::MAX).max(1);
            let event = self.poll_one(timeout_ms)?;
            if event.duration_us >= MIN_PULSE_US {
                return Some(event);
            }
        }
    }
}

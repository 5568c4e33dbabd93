use std::time::{Duration, Instant};

pub const TIMER_HZ: u32 = 60;

/// Whether the buzzer should be sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Playing,
    Silent,
}

/// Delay and sound timers. Both count down to zero and stop there.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    pub fn tone(&self) -> Tone {
        if self.sound > 0 {
            Tone::Playing
        } else {
            Tone::Silent
        }
    }

    /// One 60Hz step. The tone plays for every tick that finds the sound
    /// timer above zero.
    pub fn tick(&mut self) -> Tone {
        self.delay = self.delay.saturating_sub(1);
        let tone = self.tone();
        self.sound = self.sound.saturating_sub(1);
        tone
    }
}

/// Fires once for every `period` of real time, independent of how often it
/// is polled. Each firing moves the reference point on by one period so the
/// rate does not drift with the poll interval. After a stall of two periods
/// or more it fires once and starts again from the poll time.
#[derive(Debug, Clone, Copy)]
pub struct TimerGate {
    period: Duration,
    last: Instant,
}

impl TimerGate {
    pub fn new(now: Instant) -> Self {
        Self::with_period(Duration::from_secs(1) / TIMER_HZ, now)
    }

    pub fn with_period(period: Duration, now: Instant) -> Self {
        Self { period, last: now }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last);
        if elapsed < self.period {
            return false;
        }
        self.last = if elapsed >= self.period * 2 {
            now
        } else {
            self.last + self.period
        };
        true
    }
}

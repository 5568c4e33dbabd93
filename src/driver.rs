//! Per-frame scheduling of the interpreter.
//!
//! Three things run at different rates: host event polling (once per loop),
//! instruction throughput (`instructions_per_frame` cycles per frame) and the
//! 60Hz timers. The caller passes the current time in so the timer rate is
//! tied to real time rather than to the frame count.

use crate::chip8::{Chip8, Result, TimerGate, Tone};
use std::time::{Duration, Instant};

pub const DEFAULT_INSTRUCTIONS_PER_FRAME: u32 = 11;

/// What happened during one frame that the host should react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub timers_ticked: bool,
    /// only set when the tone starts or stops
    pub tone_change: Option<Tone>,
    pub redraw: bool,
}

pub struct FrameDriver {
    instructions_per_frame: u32,
    timer_gate: TimerGate,
    tone: Tone,
}

impl FrameDriver {
    pub fn new(instructions_per_frame: u32, now: Instant) -> Self {
        Self {
            instructions_per_frame,
            timer_gate: TimerGate::new(now),
            tone: Tone::Silent,
        }
    }

    pub fn instructions_per_frame(&self) -> u32 {
        self.instructions_per_frame
    }

    pub fn frame_period(&self) -> Duration {
        self.timer_gate.period()
    }

    /// Runs this frame's instructions, then ticks the timers if a timer
    /// period has passed since the last tick.
    pub fn run_frame(&mut self, emu: &mut Chip8, now: Instant) -> Result<Frame> {
        for _ in 0..self.instructions_per_frame {
            emu.emulate_cycle()?;
        }

        let mut frame = Frame {
            timers_ticked: false,
            tone_change: None,
            redraw: false,
        };
        if self.timer_gate.poll(now) {
            let tone = emu.tick_timers();
            frame.timers_ticked = true;
            if tone != self.tone {
                log::debug!("tone {:?} -> {:?}", self.tone, tone);
                self.tone = tone;
                frame.tone_change = Some(tone);
            }
        }
        frame.redraw = emu.take_draw_flag();
        Ok(frame)
    }

    /// Runs `frames` frames against a simulated clock that advances one timer
    /// period per frame, starting from `start`. Returns how many frames asked
    /// for a redraw.
    pub fn run_frames(&mut self, emu: &mut Chip8, frames: u64, start: Instant) -> Result<u64> {
        let period = self.frame_period();
        let mut now = start;
        let mut redraws = 0;
        for _ in 0..frames {
            now += period;
            if self.run_frame(emu, now)?.redraw {
                redraws += 1;
            }
        }
        Ok(redraws)
    }
}

/// Paces the host loop to one frame per timer period, the way a fixed
/// frame-rate clock does. Sleeping for `delay(now)` after each frame puts
/// the next frame on the next period boundary.
pub struct FramePacer {
    period: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, next: now }
    }

    /// How long to wait before starting the next frame. A loop that has
    /// fallen behind gets no delay and restarts its schedule from `now`.
    pub fn delay(&mut self, now: Instant) -> Duration {
        self.next += self.period;
        if self.next > now {
            self.next - now
        } else {
            self.next = now;
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 200: V0 += 1; 202: jump 200
    const COUNTER: [u8; 4] = [0x70, 0x01, 0x12, 0x00];

    fn machine(program: &[u8]) -> Chip8 {
        let mut emu = Chip8::with_seed(0);
        emu.load(program).unwrap();
        emu
    }

    #[test]
    fn test_runs_instructions_per_frame() {
        let start = Instant::now();
        let mut emu = machine(&COUNTER);
        let mut driver = FrameDriver::new(10, start);
        driver.run_frame(&mut emu, start).unwrap();
        // every other instruction increments
        assert_eq!(emu.register(0x0), 5);
        assert_eq!(driver.instructions_per_frame(), 10);
    }

    #[test]
    fn test_timers_tick_on_real_time_not_frames() {
        let start = Instant::now();
        // V1 = 10; delay = V1; jump 204
        let mut emu = machine(&[0x61, 0x0A, 0xF1, 0x15, 0x12, 0x04]);
        let mut driver = FrameDriver::new(DEFAULT_INSTRUCTIONS_PER_FRAME, start);

        for _ in 0..5 {
            let frame = driver.run_frame(&mut emu, start).unwrap();
            assert!(!frame.timers_ticked);
        }
        assert_eq!(emu.timers().delay(), 10);

        let frame = driver
            .run_frame(&mut emu, start + Duration::from_millis(20))
            .unwrap();
        assert!(frame.timers_ticked);
        assert_eq!(emu.timers().delay(), 9);
    }

    #[test]
    fn test_tone_reported_on_transitions_only() {
        let start = Instant::now();
        // V1 = 2; sound = V1; jump 204
        let mut emu = machine(&[0x61, 0x02, 0xF1, 0x18, 0x12, 0x04]);
        let mut driver = FrameDriver::new(3, start);
        let step = Duration::from_millis(17);

        let changes: Vec<_> = (1..=5)
            .map(|n| {
                driver
                    .run_frame(&mut emu, start + step * n)
                    .unwrap()
                    .tone_change
            })
            .collect();
        assert_eq!(
            changes,
            vec![Some(Tone::Playing), None, Some(Tone::Silent), None, None]
        );
    }

    #[test]
    fn test_redraw_follows_draw_flag() {
        let start = Instant::now();
        // I = glyph 0; draw; jump 204
        let mut emu = machine(&[0xA0, 0x50, 0xD0, 0x05, 0x12, 0x04]);
        let mut driver = FrameDriver::new(2, start);
        assert!(driver.run_frame(&mut emu, start).unwrap().redraw);
        assert!(!driver.run_frame(&mut emu, start).unwrap().redraw);
    }

    #[test]
    fn test_run_frames_simulates_clock() {
        let start = Instant::now();
        let mut emu = machine(&[0x61, 0x3C, 0xF1, 0x15, 0x12, 0x04]);
        let mut driver = FrameDriver::new(DEFAULT_INSTRUCTIONS_PER_FRAME, start);
        driver.run_frames(&mut emu, 30, start).unwrap();
        assert_eq!(emu.timers().delay(), 30);
    }

    #[test]
    fn test_wait_for_key_blocks_instructions_but_not_timers() {
        let start = Instant::now();
        // V1 = 10; delay = V1; V2 = key; jump 206
        let mut emu = machine(&[0x61, 0x0A, 0xF1, 0x15, 0xF2, 0x0A, 0x12, 0x06]);
        emu.set_register(0x2, 0x55);
        let mut driver = FrameDriver::new(5, start);
        let step = Duration::from_millis(17);

        for n in 1..=3 {
            let frame = driver.run_frame(&mut emu, start + step * n).unwrap();
            assert!(frame.timers_ticked);
            assert_eq!(emu.pc(), 0x204);
            assert_eq!(emu.register(0x2), 0x55);
        }
        assert_eq!(emu.timers().delay(), 7);

        emu.press_key(0x9);
        driver.run_frame(&mut emu, start + step * 4).unwrap();
        assert_eq!(emu.pc(), 0x206);
        assert_eq!(emu.register(0x2), 0x9);
        assert_eq!(emu.timers().delay(), 6);
    }

    #[test]
    fn test_pacer_waits_out_the_rest_of_the_period() {
        let start = Instant::now();
        let period = Duration::from_millis(16);
        let mut pacer = FramePacer::new(period, start);
        assert_eq!(pacer.delay(start + Duration::from_millis(4)), Duration::from_millis(12));
        // next boundary is 32ms, not 16ms after the last call
        assert_eq!(pacer.delay(start + Duration::from_millis(20)), Duration::from_millis(12));
    }

    #[test]
    fn test_pacer_resyncs_when_behind() {
        let start = Instant::now();
        let period = Duration::from_millis(16);
        let mut pacer = FramePacer::new(period, start);
        let late = start + Duration::from_millis(100);
        assert_eq!(pacer.delay(late), Duration::ZERO);
        assert_eq!(pacer.delay(late + Duration::from_millis(1)), Duration::from_millis(15));
    }

    #[test]
    fn test_paced_loop_ticks_timers_at_full_rate() {
        let start = Instant::now();
        let mut emu = machine(&[0x61, 0xFF, 0xF1, 0x15, 0x12, 0x04]);
        let mut driver = FrameDriver::new(DEFAULT_INSTRUCTIONS_PER_FRAME, start);
        let mut pacer = FramePacer::new(driver.frame_period(), start);
        let work = Duration::from_millis(1);

        let mut now = start;
        let mut ticks = 0;
        while now < start + Duration::from_secs(1) {
            now += work;
            if driver.run_frame(&mut emu, now).unwrap().timers_ticked {
                ticks += 1;
            }
            now += pacer.delay(now);
        }
        assert!((59..=60).contains(&ticks), "{} ticks in 1s", ticks);
    }

    #[test]
    fn test_fault_stops_frame() {
        let start = Instant::now();
        let mut emu = machine(&[0x00, 0xEE]);
        let mut driver = FrameDriver::new(4, start);
        assert!(driver.run_frame(&mut emu, start).is_err());
    }
}

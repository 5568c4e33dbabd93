use chip8_vm::chip8::{Chip8, Tone, HEIGHT, WIDTH};
use chip8_vm::driver::{FrameDriver, FramePacer};
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sdl2::event::{Event, WindowEvent};
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::Keycode;
use sdl2::pixels;
use std::error::Error;
use std::time::Instant;

const BEEP_HZ: f32 = 440.0;
const BEEP_VOLUME: f32 = 0.25;

/// host key -> hex keypad
///   1 2 3 4      1 2 3 C
///   Q W E R  ->  4 5 6 D
///   A S D F      7 8 9 E
///   Z X C V      A 0 B F
fn keymap(key: Keycode) -> Option<u8> {
    let k = match key {
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Num4 => 0xC,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::R => 0xD,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::F => 0xE,
        Keycode::Z => 0xA,
        Keycode::X => 0x0,
        Keycode::C => 0xB,
        Keycode::V => 0xF,
        _ => return None,
    };
    Some(k)
}

struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for x in out.iter_mut() {
            *x = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// Starts and stops the buzzer on tone transitions.
struct Beeper {
    device: AudioDevice<SquareWave>,
}

impl Beeper {
    fn new(audio: &sdl2::AudioSubsystem) -> Result<Self, String> {
        let desired = AudioSpecDesired {
            freq: Some(44_100),
            channels: Some(1),
            samples: None,
        };
        let device = audio.open_playback(None, &desired, |spec| SquareWave {
            phase_inc: BEEP_HZ / spec.freq as f32,
            phase: 0.0,
            volume: BEEP_VOLUME,
        })?;
        Ok(Self { device })
    }

    fn set(&mut self, tone: Tone) {
        match tone {
            Tone::Playing => self.device.resume(),
            Tone::Silent => self.device.pause(),
        }
    }
}

/// Opens a window and runs `emu` until the window is closed, Escape is
/// pressed or the interpreter faults.
pub fn run(
    mut emu: Chip8,
    scale: u32,
    instructions_per_frame: u32,
) -> Result<(), Box<dyn Error>> {
    let sdl_ctx = sdl2::init()?;
    let video = sdl_ctx.video()?;

    let window = video
        .window("CHIP-8", WIDTH as u32 * scale, HEIGHT as u32 * scale)
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;

    let black = pixels::Color::RGB(0, 0, 0);
    let white = pixels::Color::RGB(255, 255, 255);
    canvas.set_draw_color(black);
    canvas.clear();
    canvas.present();

    let audio = sdl_ctx.audio()?;
    let mut beeper = Beeper::new(&audio)?;
    let mut event_pump = sdl_ctx.event_pump()?;
    let start = Instant::now();
    let mut driver = FrameDriver::new(instructions_per_frame, start);
    let mut pacer = FramePacer::new(driver.frame_period(), start);

    let scale = i16::try_from(scale)?;

    'main: loop {
        for e in event_pump.poll_iter() {
            match e {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(k) = keymap(key) {
                        emu.press_key(k);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(k) = keymap(key) {
                        emu.release_key(k);
                    }
                }
                // key-up events are lost once the window loses focus
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => emu.clear_keys(),
                _ => {}
            }
        }

        let frame = match driver.run_frame(&mut emu, Instant::now()) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("stopping at {:#05X}: {}", emu.pc(), e);
                beeper.set(Tone::Silent);
                return Err(e.into());
            }
        };

        if let Some(tone) = frame.tone_change {
            beeper.set(tone);
        }

        if frame.redraw {
            canvas.set_draw_color(black);
            canvas.clear();
            for (y, row) in emu.display().rows().iter().enumerate() {
                for (x, &lit) in row.iter().enumerate() {
                    if !lit {
                        continue;
                    }
                    let x = x as i16 * scale;
                    let y = y as i16 * scale;
                    canvas.box_(x, y, x + scale - 1, y + scale - 1, white)?;
                }
            }
            canvas.present();
        }

        std::thread::sleep(pacer.delay(Instant::now()));
    }

    beeper.set(Tone::Silent);
    Ok(())
}

mod display;
mod error;
mod instruction;
mod keypad;
mod memory;
mod timer;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

pub use display::{Display, HEIGHT, WIDTH};
pub use error::{Chip8Error, Result};
pub use instruction::Instruction;
pub use keypad::Keypad;
pub use memory::{Memory, FONT_ADDR, MAX_PROGRAM_LEN, PROGRAM_ADDR};
pub use timer::{TimerGate, Timers, Tone};

use memory::GLYPH_BYTES;

const FLAG: usize = 0xF;

pub struct Chip8 {
    // CHIP-8 VM
    memory: Memory,   // system memory
    v: [u8; 16],      // registers V0-VE (VF is flag for some instructions)
    i: u16,           // address register
    pc: u16,          // program counter
    stack: Vec<u16>,  // return addresses
    display: Display, // pixels state
    timers: Timers,   // timers count down at 60Hz
    keypad: Keypad,   // hex keypad state

    // emulator resources
    draw_flag: bool,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same machine, but CXNN produces a reproducible sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            memory: Memory::new(),
            v: [0; 16],
            i: 0,
            pc: PROGRAM_ADDR,
            stack: Vec::new(),
            display: Display::new(),
            timers: Timers::new(),
            keypad: Keypad::new(),

            draw_flag: false,
            rng,
        }
    }

    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load(program)?;
        log::debug!("loaded {} byte program at {:#05X}", program.len(), PROGRAM_ADDR);
        Ok(())
    }

    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let program = std::fs::read(path)?;
        self.load(&program)
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn register(&self, x: usize) -> u8 {
        self.v[x]
    }

    pub fn set_register(&mut self, x: usize, value: u8) {
        self.v[x] = value;
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// true if the screen changed since the last call
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::replace(&mut self.draw_flag, false)
    }

    /// True while the sound timer is above zero. This is read after the
    /// last tick's decrement, so it can be false on the same tick that
    /// `tick_timers` reported `Tone::Playing`.
    pub fn sound_flag(&self) -> bool {
        self.timers.tone() == Tone::Playing
    }

    pub fn clear_keys(&mut self) {
        self.keypad.clear();
    }

    pub fn press_key(&mut self, key: u8) {
        self.keypad.press(key);
    }

    pub fn release_key(&mut self, key: u8) {
        self.keypad.release(key);
    }

    pub fn tick_timers(&mut self) -> Tone {
        self.timers.tick()
    }

    /// Reads the two-byte opcode at PC and moves PC past it.
    pub fn fetch(&mut self) -> Result<u16> {
        let opcode = self.memory.word(self.pc)?;
        self.pc += 2;
        Ok(opcode)
    }

    pub fn emulate_cycle(&mut self) -> Result<u8> {
        let opcode = self.fetch()?;
        self.decode_and_execute(opcode)
    }

    /// Executes one opcode and returns its class (top nibble). PC must already
    /// point past the opcode.
    pub fn decode_and_execute(&mut self, opcode: u16) -> Result<u8> {
        let instruction = Instruction::decode(opcode);
        log::trace!("{:#05X}: {:04X} {:?}", self.pc.wrapping_sub(2), opcode, instruction);
        self.execute(instruction)?;
        Ok(instruction::class(opcode))
    }

    fn execute(&mut self, instruction: Instruction) -> Result<()> {
        use Instruction::*;
        match instruction {
            ClearScreen => {
                self.display.clear();
                self.draw_flag = true;
            }
            Return => {
                let pc = self.pc.wrapping_sub(2);
                self.pc = self
                    .stack
                    .pop()
                    .ok_or(Chip8Error::StackUnderflow { pc })?;
            }
            Jump(nnn) => self.pc = nnn,
            Call(nnn) => {
                self.stack.push(self.pc);
                self.pc = nnn;
            }
            SkipEqImm(x, nn) => self.skip_if(self.v[x as usize] == nn),
            SkipNeImm(x, nn) => self.skip_if(self.v[x as usize] != nn),
            SkipEqReg(x, y) => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            SkipNeReg(x, y) => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            LoadImm(x, nn) => self.v[x as usize] = nn,
            AddImm(x, nn) => {
                // no carry
                let x = x as usize;
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Move(x, y) => self.v[x as usize] = self.v[y as usize],
            Or(x, y) => self.v[x as usize] |= self.v[y as usize],
            And(x, y) => self.v[x as usize] &= self.v[y as usize],
            Xor(x, y) => self.v[x as usize] ^= self.v[y as usize],
            Add(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                let (sum, carry) = vx.overflowing_add(vy);
                self.v[x as usize] = sum;
                self.v[FLAG] = carry as u8;
            }
            Sub(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vx.wrapping_sub(vy);
                self.v[FLAG] = (vx >= vy) as u8;
            }
            SubNeg(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vy.wrapping_sub(vx);
                self.v[FLAG] = (vy >= vx) as u8;
            }
            ShiftRight(x) => {
                let vx = self.v[x as usize];
                self.v[x as usize] = vx >> 1;
                self.v[FLAG] = vx & 0x1;
            }
            ShiftLeft(x) => {
                let vx = self.v[x as usize];
                self.v[x as usize] = vx << 1;
                self.v[FLAG] = vx >> 7;
            }
            SetIndex(nnn) => self.i = nnn,
            // always V0, not VX
            JumpOffset(nnn) => self.pc = nnn + u16::from(self.v[0]),
            Random(x, nn) => self.v[x as usize] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let sprite = self.memory.slice(self.i, n as usize)?;
                let collision =
                    self.display
                        .draw_sprite(self.v[x as usize], self.v[y as usize], sprite);
                self.v[FLAG] = collision as u8;
                self.draw_flag = true;
            }
            SkipIfKey(x) => self.skip_if(self.keypad.is_pressed(self.v[x as usize])),
            SkipIfNotKey(x) => self.skip_if(!self.keypad.is_pressed(self.v[x as usize])),
            GetDelay(x) => self.v[x as usize] = self.timers.delay(),
            WaitForKey(x) => match self.keypad.first_pressed() {
                Some(key) => self.v[x as usize] = key,
                // repeat this instruction if no pressed key
                None => self.pc -= 2,
            },
            SetDelay(x) => self.timers.set_delay(self.v[x as usize]),
            SetSound(x) => self.timers.set_sound(self.v[x as usize]),
            AddIndex(x) => self.i = self.i.wrapping_add(u16::from(self.v[x as usize])),
            FontChar(x) => self.i = FONT_ADDR + GLYPH_BYTES * u16::from(self.v[x as usize]),
            StoreBcd(x) => {
                // so 193 becomes [1, 9, 3] in memory at I
                let vx = self.v[x as usize];
                self.memory
                    .slice_mut(self.i, 3)?
                    .copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
            }
            StoreRegisters(x) => {
                let count = x as usize + 1;
                self.memory
                    .slice_mut(self.i, count)?
                    .copy_from_slice(&self.v[..count]);
            }
            LoadRegisters(x) => {
                let count = x as usize + 1;
                let src = self.memory.slice(self.i, count)?;
                self.v[..count].copy_from_slice(src);
            }
            Unknown(opcode) => {
                log::warn!(
                    "unknown opcode {:04X} at {:#05X}, skipping",
                    opcode,
                    self.pc.wrapping_sub(2)
                );
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc += 2;
        }
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

use super::error::{Chip8Error, Result};

pub const MEMORY_SIZE: usize = 4096;
pub const FONT_ADDR: u16 = 0x050;
pub const PROGRAM_ADDR: u16 = 0x200; // programs start at 0x200
pub const GLYPH_BYTES: u16 = 5;

pub const MAX_PROGRAM_LEN: usize = MEMORY_SIZE - PROGRAM_ADDR as usize;

const FONTSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// 4K of flat system memory. Accesses are bounds checked and never wrap.
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: [0; MEMORY_SIZE],
        }
    }

    /// Writes the fontset and copies `program` to 0x200. Nothing is written
    /// if the program does not fit.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_LEN {
            return Err(Chip8Error::RomTooLarge {
                len: program.len(),
                max: MAX_PROGRAM_LEN,
            });
        }

        // CHIP-8 systems had the interpreter in the first 512 bytes of memory
        // since we're emulating that we can just store the fontset there
        self.slice_mut(FONT_ADDR, FONTSET.len())?
            .copy_from_slice(&FONTSET);
        self.slice_mut(PROGRAM_ADDR, program.len())?
            .copy_from_slice(program);
        Ok(())
    }

    /// two-byte big-endian word, i.e. an opcode
    pub fn word(&self, addr: u16) -> Result<u16> {
        let bytes = self.slice(addr, 2)?;
        Ok(u16::from(bytes[0]) << 8 | u16::from(bytes[1]))
    }

    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let range = Self::range(addr, len)?;
        Ok(&self.bytes[range])
    }

    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let range = Self::range(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    fn range(addr: u16, len: usize) -> Result<std::ops::Range<usize>> {
        let start = addr as usize;
        match start.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(start..end),
            _ => Err(Chip8Error::AddressOutOfRange { addr: start, len }),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

//! CHIP-8 interpreter core plus the frame scheduling the host drives it with.

pub mod chip8;
pub mod driver;

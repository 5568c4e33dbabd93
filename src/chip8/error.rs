use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("ROM is {len} bytes but at most {max} bytes fit in memory")]
    RomTooLarge { len: usize, max: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("access of {len} byte(s) at {addr:#06X} is outside memory")]
    AddressOutOfRange { addr: usize, len: usize },
    #[error("return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },
}

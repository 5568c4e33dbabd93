mod frontend;

use chip8_vm::chip8::Chip8;
use chip8_vm::driver::{FrameDriver, DEFAULT_INSTRUCTIONS_PER_FRAME};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

/// CHIP-8 interpreter
#[derive(Parser, Debug)]
#[command(name = "chip8")]
#[command(about = "A CHIP-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file
    #[arg(short, long, default_value = "pong2.ch8")]
    rom: PathBuf,

    /// Scale factor for the screen dimensions
    #[arg(
        short,
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..=64)
    )]
    scale: u32,

    /// Instructions to execute per frame
    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_FRAME)]
    instructions: u32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many frames without a window, then dump the screen and registers
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut emu = match args.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };
    emu.load_rom(&args.rom)?;
    log::info!(
        "running {} at {} instructions per frame",
        args.rom.display(),
        args.instructions
    );

    match args.frames {
        Some(frames) => run_headless(emu, args.instructions, frames),
        None => frontend::run(emu, args.scale, args.instructions),
    }
}

fn run_headless(
    mut emu: Chip8,
    instructions_per_frame: u32,
    frames: u64,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let mut driver = FrameDriver::new(instructions_per_frame, start);
    let result = driver.run_frames(&mut emu, frames, start);

    print!("{}", emu.display());
    println!("PC: {:03X}  I: {:03X}", emu.pc(), emu.index());
    print!("V: [ ");
    for v in emu.registers() {
        print!("{:02X} ", v);
    }
    println!("]");
    print!("stack: [ ");
    for s in emu.stack() {
        print!("{:03X} ", s);
    }
    println!("]");
    println!(
        "delay: {}  sound: {}",
        emu.timers().delay(),
        emu.timers().sound()
    );

    let redraws = result?;
    log::info!("ran {} frames, {} redraws", frames, redraws);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_defaults_to_ten() {
        let args = Args::try_parse_from(["chip8"]).unwrap();
        assert_eq!(args.scale, 10);
    }

    #[test]
    fn test_scale_is_bounded() {
        assert!(Args::try_parse_from(["chip8", "--scale", "64"]).is_ok());
        assert!(Args::try_parse_from(["chip8", "--scale", "0"]).is_err());
        assert!(Args::try_parse_from(["chip8", "--scale", "600"]).is_err());
    }
}

/// A decoded CHIP-8 instruction. Register operands are V indices 0x0 - 0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,            // 00E0
    Return,                 // 00EE
    Jump(u16),              // 1NNN
    Call(u16),              // 2NNN
    SkipEqImm(u8, u8),      // 3XNN
    SkipNeImm(u8, u8),      // 4XNN
    SkipEqReg(u8, u8),      // 5XY0
    LoadImm(u8, u8),        // 6XNN
    AddImm(u8, u8),         // 7XNN
    Move(u8, u8),           // 8XY0
    Or(u8, u8),             // 8XY1
    And(u8, u8),            // 8XY2
    Xor(u8, u8),            // 8XY3
    Add(u8, u8),            // 8XY4
    Sub(u8, u8),            // 8XY5
    ShiftRight(u8),         // 8XY6
    SubNeg(u8, u8),         // 8XY7
    ShiftLeft(u8),          // 8XYE
    SkipNeReg(u8, u8),      // 9XY0
    SetIndex(u16),          // ANNN
    JumpOffset(u16),        // BNNN
    Random(u8, u8),         // CXNN
    Draw(u8, u8, u8),       // DXYN
    SkipIfKey(u8),          // EX9E
    SkipIfNotKey(u8),       // EXA1
    GetDelay(u8),           // FX07
    WaitForKey(u8),         // FX0A
    SetDelay(u8),           // FX15
    SetSound(u8),           // FX18
    AddIndex(u8),           // FX1E
    FontChar(u8),           // FX29
    StoreBcd(u8),           // FX33
    StoreRegisters(u8),     // FX55
    LoadRegisters(u8),      // FX65
    Unknown(u16),
}

/// top nibble of an opcode
pub fn class(opcode: u16) -> u8 {
    (opcode >> 12) as u8
}

impl Instruction {
    pub fn decode(opcode: u16) -> Self {
        let x = ((opcode & 0x0F00) >> 8) as u8;
        let y = ((opcode & 0x00F0) >> 4) as u8;
        let n = (opcode & 0x000F) as u8;
        let nn = (opcode & 0x00FF) as u8;
        let nnn = opcode & 0x0FFF;

        use Instruction::*;
        match (class(opcode), x, y, n) {
            (0x0, 0x0, 0xE, 0x0) => ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, _, _, _) => Jump(nnn),
            (0x2, _, _, _) => Call(nnn),
            (0x3, _, _, _) => SkipEqImm(x, nn),
            (0x4, _, _, _) => SkipNeImm(x, nn),
            // the low nibble of 5XY_ and 9XY_ is not checked
            (0x5, _, _, _) => SkipEqReg(x, y),
            (0x6, _, _, _) => LoadImm(x, nn),
            (0x7, _, _, _) => AddImm(x, nn),
            (0x8, _, _, 0x0) => Move(x, y),
            (0x8, _, _, 0x1) => Or(x, y),
            (0x8, _, _, 0x2) => And(x, y),
            (0x8, _, _, 0x3) => Xor(x, y),
            (0x8, _, _, 0x4) => Add(x, y),
            (0x8, _, _, 0x5) => Sub(x, y),
            (0x8, _, _, 0x6) => ShiftRight(x),
            (0x8, _, _, 0x7) => SubNeg(x, y),
            (0x8, _, _, 0xE) => ShiftLeft(x),
            (0x9, _, _, _) => SkipNeReg(x, y),
            (0xA, _, _, _) => SetIndex(nnn),
            (0xB, _, _, _) => JumpOffset(nnn),
            (0xC, _, _, _) => Random(x, nn),
            (0xD, _, _, _) => Draw(x, y, n),
            (0xE, _, 0x9, 0xE) => SkipIfKey(x),
            (0xE, _, 0xA, 0x1) => SkipIfNotKey(x),
            (0xF, _, 0x0, 0x7) => GetDelay(x),
            (0xF, _, 0x0, 0xA) => WaitForKey(x),
            (0xF, _, 0x1, 0x5) => SetDelay(x),
            (0xF, _, 0x1, 0x8) => SetSound(x),
            (0xF, _, 0x1, 0xE) => AddIndex(x),
            (0xF, _, 0x2, 0x9) => FontChar(x),
            (0xF, _, 0x3, 0x3) => StoreBcd(x),
            (0xF, _, 0x5, 0x5) => StoreRegisters(x),
            (0xF, _, 0x6, 0x5) => LoadRegisters(x),
            _ => Unknown(opcode),
        }
    }
}

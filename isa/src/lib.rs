//! The one canonical opcode table, shared by the assembler (which emits
//! these bytes) and the VM (which decodes them). Keeping a single source of
//! truth here is what makes the assembler's length-determinism invariant
//! and the VM's decode loop impossible to drift apart.

pub const LDI: u8 = 0x01;
pub const LDI16: u8 = 0x02;
pub const MOV: u8 = 0x03;
pub const LDM: u8 = 0x04;
pub const STM: u8 = 0x05;
pub const LDR: u8 = 0x06;
pub const STR: u8 = 0x07;
pub const ADD: u8 = 0x08;
pub const ADC: u8 = 0x09;
pub const SUB: u8 = 0x0A;
pub const SBC: u8 = 0x0B;
pub const INC: u8 = 0x0C;
pub const DEC: u8 = 0x0D;
pub const CMP: u8 = 0x0E;
pub const AND: u8 = 0x0F;
pub const OR: u8 = 0x10;
pub const XOR: u8 = 0x11;
pub const NOT: u8 = 0x12;
pub const SHL: u8 = 0x13;
pub const SHR: u8 = 0x14;
pub const JMP: u8 = 0x15;
pub const JZ: u8 = 0x16;
pub const JNZ: u8 = 0x17;
pub const JC: u8 = 0x18;
pub const JNC: u8 = 0x19;
pub const PUSH: u8 = 0x1A;
pub const POP: u8 = 0x1B;
pub const PUSH16: u8 = 0x1C;
pub const POP16: u8 = 0x1D;
pub const CALL: u8 = 0x1E;
pub const RET: u8 = 0x1F;
pub const IN: u8 = 0x20;
pub const OUT: u8 = 0x21;
pub const HALT: u8 = 0xFF;

/// Total byte count of every register, 64 KiB byte-addressed.
pub const MEM_SIZE: usize = 0x10000;

/// The 16-byte memory-mapped text buffer sits at the very top of memory.
pub const TEXT_BUFFER_START: u16 = (MEM_SIZE - 16) as u16;
pub const TEXT_BUFFER_LEN: usize = 16;

/// Stack pointer resets here; the stack grows downward from it. Chosen to
/// leave the text buffer's 16 bytes untouched and a generous code/data
/// region below it for any program this toolchain is likely to assemble.
pub const STACK_START: u16 = 0xE000;
pub const STACK_END: u16 = TEXT_BUFFER_START - 1;

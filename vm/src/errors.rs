use thiserror::Error;

/// Fatal conditions the guest program can trigger. All three abort the run;
/// an unrecognized opcode is deliberately not one of these (§7: non-fatal,
/// PC just advances by one).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    #[error("stack overflow: SP would cross below {stack_start:#06x}")]
    StackOverflow { stack_start: u16 },

    #[error("stack underflow: SP would cross above {stack_end:#06x}")]
    StackUnderflow { stack_end: u16 },

    #[error("port {0} is outside the valid range 0..=7")]
    InvalidPort(u8),
}

/// What the host sees when a run dies: the fatal error plus the PC and
/// opcode byte that were current when it happened, so the host can report
/// exactly where execution broke (§7: "the host records the failing PC and
/// last-executed instruction").
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("fatal VM error at PC={pc:#06x} (opcode {opcode:#04x}): {source}")]
pub struct VmFault {
    pub pc: u16,
    pub opcode: u8,
    #[source]
    pub source: VmError,
}

//! NAND machine bytecode definition
//!
//! Every byte is a valid opcode. The top bit selects the instruction class,
//! a clear bit is a conditional branch, a set bit is a NAND. Operands are
//! 16-bit little-endian addresses following the opcode.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

macro_rules! constmod {
    ($vis:vis $mname:ident($repr:ty) {
        $(#![doc = $mdoc:literal])?
        $($cname:ident = $val:expr $(,$doc:literal)?;)*
    }) => {
        $(#[doc = $mdoc])?
        $vis mod $mname {
            $(
                $(#[doc = $doc])?
                pub const $cname: $repr = $val;
            )*
        }
    };
}

constmod!(pub opcode(u8) {
    //! Opcode bit masks

    NAND         = 0b1000_0000, "Set: NAND, clear: branch";
    INDIRECT     = 0b0100_0000, "Branch; redirect the target once more";
    BYTE         = 0b0100_0000, "NAND; whole byte instead of a single bit";
    ITSELF       = 0b0010_0000, "NAND; destination is the source, only one operand";
    BIT_MASK     = 0b0001_1100, "NAND; bit index field";
    REDIRECT_SRC = 0b0000_0010, "NAND; redirect the source operand";
    REDIRECT_DST = 0b0000_0001, "NAND; redirect the destination operand";
});

/// Offset of [`opcode::BIT_MASK`] inside the opcode
pub const BIT_SHIFT: u32 = 2;

constmod!(pub addr(u16) {
    //! Well-known addresses

    READ_PORT  = 0xFFFD, "NAND destination; read one input byte into the I/O cell";
    WRITE_PORT = 0xFFFE, "NAND destination; write the I/O cell to the output";
    IO_CELL    = 0xFFFF, "I/O data cell";
    HALT       = 0xFFFF, "Instruction pointer value which stops the machine";
});

constmod!(pub cycles(u64) {
    //! Cycle costs

    DECAY     = 128, "Cycles after a NAND write until the written bit or byte is lost";
    BYTE_NAND = 8,   "Whole byte NAND";
    BIT_NAND  = 1,   "Single bit NAND";
    BRANCH    = 1,   "Branch, taken or not";
    IO        = 1,   "Port access";
});

/// Size of the address space in bytes
pub const MEMORY_SIZE: usize = 0x10000;

/// NAND operand width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// All eight bits at once
    Byte,
    /// Single bit, index 0 to 7
    Bit(u8),
}

/// Decoded opcode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Jump to the target if the flag is set
    Branch {
        /// Target is a pointer to the real target
        indirect: bool,
    },
    /// `dst ← ¬(src ∧ dst)`
    Nand {
        width: Width,
        /// Destination equals source
        itself: bool,
        redirect_src: bool,
        redirect_dst: bool,
    },
}

impl Instruction {
    /// Decode opcode byte. Unused bits are ignored.
    pub const fn decode(op: u8) -> Self {
        use opcode::*;

        if op & NAND == 0 {
            return Self::Branch { indirect: op & INDIRECT != 0 };
        }

        Self::Nand {
            width: match op & BYTE {
                0 => Width::Bit((op & BIT_MASK) >> BIT_SHIFT),
                _ => Width::Byte,
            },
            itself: op & ITSELF != 0,
            redirect_src: op & REDIRECT_SRC != 0,
            redirect_dst: op & REDIRECT_DST != 0,
        }
    }

    /// Canonical opcode byte, unused bits cleared
    pub const fn encode(self) -> u8 {
        use opcode::*;

        match self {
            Self::Branch { indirect } => flag(indirect, INDIRECT),
            Self::Nand { width, itself, redirect_src, redirect_dst } => {
                NAND | match width {
                    Width::Byte => BYTE,
                    Width::Bit(bit) => (bit << BIT_SHIFT) & BIT_MASK,
                } | flag(itself, ITSELF)
                    | flag(redirect_src, REDIRECT_SRC)
                    | flag(redirect_dst, REDIRECT_DST)
            }
        }
    }

    /// Number of address operands following the opcode
    pub const fn operands(self) -> usize {
        match self {
            Self::Branch { .. } | Self::Nand { itself: true, .. } => 1,
            Self::Nand { itself: false, .. } => 2,
        }
    }

    /// Encoded size in bytes
    pub const fn size(self) -> usize {
        1 + 2 * self.operands()
    }
}

const fn flag(set: bool, mask: u8) -> u8 {
    if set {
        mask
    } else {
        0
    }
}

/// Instruction could not be disassembled
#[cfg(feature = "disasm")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisasmError {
    /// Byte slice ends before the instruction does
    Truncated { needed: usize, got: usize },
    /// Output refused the text
    Fmt,
}

#[cfg(feature = "disasm")]
impl From<core::fmt::Error> for DisasmError {
    fn from(_: core::fmt::Error) -> Self {
        Self::Fmt
    }
}

#[cfg(feature = "disasm")]
impl core::fmt::Display for DisasmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated { needed, got } => {
                write!(f, "instruction truncated, needs {needed} bytes, got {got}")
            }
            Self::Fmt => f.write_str("formatter error"),
        }
    }
}

#[cfg(feature = "disasm")]
impl std::error::Error for DisasmError {}

/// Disassemble the instruction at the start of `bytes` into `out`
///
/// Returns the number of bytes the instruction occupies.
///
/// Syntax:
/// - `br 0x0123`, `br *0x0123` for an indirect target
/// - `nand 0x0010, 0x0020` for a byte NAND, `nand.3 …` for a NAND on bit 3
/// - `*` in front of an operand marks a redirected operand
#[cfg(feature = "disasm")]
pub fn disasm(bytes: &[u8], out: &mut impl core::fmt::Write) -> Result<usize, DisasmError> {
    let &op = bytes.first().ok_or(DisasmError::Truncated { needed: 1, got: 0 })?;
    let instr = Instruction::decode(op);
    let size = instr.size();
    if bytes.len() < size {
        return Err(DisasmError::Truncated { needed: size, got: bytes.len() });
    }

    let operand = |n: usize| u16::from_le_bytes([bytes[1 + 2 * n], bytes[2 + 2 * n]]);
    let star = |redirect: bool| if redirect { "*" } else { "" };

    match instr {
        Instruction::Branch { indirect } => {
            write!(out, "br {}{:#06x}", star(indirect), operand(0))?;
        }
        Instruction::Nand { width, itself, redirect_src, redirect_dst } => {
            match width {
                Width::Byte => out.write_str("nand")?,
                Width::Bit(bit) => write!(out, "nand.{bit}")?,
            }

            write!(out, " {}{:#06x}", star(redirect_src), operand(0))?;
            if !itself {
                write!(out, ", {}{:#06x}", star(redirect_dst), operand(1))?;
            }
        }
    }

    Ok(size)
}

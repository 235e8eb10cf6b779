use {
    crate::symbols::SymbolError,
    derive_more::Display,
    nandvm::{mem::Address, VmRunError},
    std::io,
};

/// Exit code of a clean halt
pub const EXIT_FINISHED: i32 = 0;

/// Runtime failure, each kind maps to its own exit code
#[derive(Debug, Display)]
pub enum RtError {
    /// No image path given
    #[display(fmt = "Usage: nandrt <path to binary> [--debug --symbols <path>] [--step]")]
    NoProgram,

    /// Image could not be opened or mapped
    #[display(fmt = "Could not open file {}: {}", _0, _1)]
    BadImage(String, io::Error),

    /// Operand fetch ran into the halt sentinel
    #[display(fmt = "[Fetch error at {}]", _0)]
    Fetch(Address),

    /// Debug mode requested without a symbol table
    #[display(fmt = "--debug needs a symbol table, pass --symbols <path>")]
    MissingSymbolArgument,

    /// Symbol table could not be read or parsed
    #[display(fmt = "Bad symbol table {}: {}", _0, _1)]
    BadSymbolTable(String, SymbolError),

    /// Operator input failed while single-stepping
    #[display(fmt = "Single-step input failed: {}", _0)]
    Step(io::Error),
}

impl RtError {
    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoProgram => 1,
            Self::BadImage(..) => 2,
            Self::Fetch(_) => 3,
            Self::MissingSymbolArgument => 4,
            Self::BadSymbolTable(..) => 5,
            Self::Step(_) => 6,
        }
    }
}

impl std::error::Error for RtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BadImage(_, e) | Self::Step(e) => Some(e),
            Self::BadSymbolTable(_, e) => Some(e),
            _ => None,
        }
    }
}

impl From<VmRunError> for RtError {
    fn from(value: VmRunError) -> Self {
        match value {
            VmRunError::FetchError(pc) => Self::Fetch(pc),
        }
    }
}

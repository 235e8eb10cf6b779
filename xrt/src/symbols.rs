//! Symbol table for traces
//!
//! Text format: whitespace-separated `name address` pairs, addresses in
//! hexadecimal with an optional `0x` prefix.
//!
//! ```text
//! main 0x0000
//! loop 0x0010
//! putc 01f0
//! ```

use {
    derive_more::Display,
    nandvm::mem::Address,
    std::{collections::BTreeMap, fmt, fs, path::Path},
};

/// Symbol table parse failure
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum SymbolError {
    #[display(fmt = "symbol {} has no address", _0)]
    MissingAddress(String),
    #[display(fmt = "symbol {} has invalid address {}", _0, _1)]
    BadAddress(String, String),
    #[display(fmt = "{}", _0)]
    Io(String),
}

impl std::error::Error for SymbolError {}

/// Address to name mapping
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<u16, String>,
}

impl SymbolTable {
    /// Read and parse a symbol file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SymbolError> {
        let text = fs::read_to_string(path).map_err(|e| SymbolError::Io(e.to_string()))?;
        text.parse()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Closest symbol at or below `addr`
    pub fn resolve(&self, addr: Address) -> Location<'_> {
        match self.symbols.range(..=addr.get()).next_back() {
            Some((&base, name)) => Location { symbol: Some(name), offset: addr.get() - base },
            None => Location { symbol: None, offset: addr.get() },
        }
    }
}

impl std::str::FromStr for SymbolTable {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut symbols = BTreeMap::new();
        let mut words = s.split_whitespace();
        while let Some(name) = words.next() {
            let addr = words.next().ok_or_else(|| SymbolError::MissingAddress(name.into()))?;
            let value = u16::from_str_radix(addr.trim_start_matches("0x"), 16)
                .map_err(|_| SymbolError::BadAddress(name.into(), addr.into()))?;

            if let Some(old) = symbols.insert(value, name.to_owned()) {
                log::warn!("{name} shadows {old} at {:#06x}", value);
            }
        }

        Ok(Self { symbols })
    }
}

/// Symbolic address, `name+offset` or `unknown+address`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location<'a> {
    pub symbol: Option<&'a str>,
    pub offset: u16,
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{:#x}", self.symbol.unwrap_or("unknown"), self.offset)
    }
}

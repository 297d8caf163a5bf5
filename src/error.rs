use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload bit buffer could not be reserved.
    #[error("cannot allocate a buffer for {bits} payload bits")]
    Allocation { bits: u64 },

    #[error("corrupt or truncated container: {0}")]
    CorruptContainer(#[from] ContainerError),

    /// No symbols to build a tree from.
    #[error("input has no symbols to build a huffman tree from")]
    DegenerateInput,

    /// The source produced a byte the code table has no code for.
    #[error("byte {0:#04x} has no code in the table")]
    UnknownSymbol(u8),

    #[error("code for byte {symbol:#04x} is {length} bits long, the limit is 255")]
    CodeTooLong { symbol: u8, length: usize },
}

/// The ways a container can fail to decode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("header ends early")]
    TruncatedHeader,

    #[error("symbol count {0} is outside 0..=256")]
    InvalidSymbolCount(i32),

    #[error("symbol {0:#04x} has a zero-length code")]
    EmptyCode(u8),

    #[error("symbol {0:#04x} is described twice")]
    DuplicateSymbol(u8),

    #[error("code for symbol {0:#04x} collides with another code")]
    NotPrefixFree(u8),

    #[error("payload holds {actual} bytes, header needs {expected}")]
    TruncatedPayload { expected: u64, actual: u64 },

    #[error("no code matches the bits ending at position {position}")]
    UnmatchedCode { position: u64 },

    #[error("payload ends in the middle of a code")]
    DanglingBits,

    #[error("header declares {0} payload bits but no codes")]
    MissingCodes(u64),
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use crate::constant_pool::CpTag;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Unexpected end of input at offset 0x{offset:X}")]
    EndOfInput { offset: u64 },
    #[error("Unknown constant pool tag 0x{tag:02X} at offset 0x{offset:X}")]
    UnknownTag { tag: u8, offset: u64 },
    #[error("Unknown element value tag 0x{tag:02X} at offset 0x{offset:X}")]
    UnknownElementValueTag { tag: u8, offset: u64 },
    #[error("Constant pool index {0} is out of range")]
    IndexOutOfRange(u16),
    #[error("Expected {expected:?} at constant pool index {index}, found {found:?}")]
    TagMismatch {
        index: u16,
        expected: CpTag,
        found: CpTag,
    },
    #[error("Expected attribute {expected}, found {found}")]
    AttributeNameMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("Malformed descriptor: {0:?}")]
    MalformedDescriptor(String),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("Two-slot constant overruns the declared constant pool count")]
    ConstantPoolOverrun,
    #[error("Unexpected trailing bytes at offset 0x{offset:X}")]
    TrailingBytes { offset: u64 },
    #[error("Element values nested too deeply at offset 0x{offset:X}")]
    NestingTooDeep { offset: u64 },
    #[error("Invalid modified UTF-8 string at offset 0x{offset:X}")]
    InvalidModifiedUtf8 { offset: u64 },
    #[error("Table of {length} entries does not fit its length prefix")]
    TableTooLarge { length: usize },
    #[error("Constant pool is full")]
    ConstantPoolFull,
}

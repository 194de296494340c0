// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The fields before `field` consumed more space than the layout allows.
    LayoutOverrun {
        /// The field whose anchor was overrun.
        field: &'static str,
        /// The absolute offset the field is anchored at.
        target: u64,
        /// The cursor position, past the anchor.
        position: u64,
    },
    /// An element index outside the declared size of a packed array.
    OutOfBounds {
        /// The requested element index.
        index: usize,
        /// The declared element count.
        count: usize,
    },
    /// A value too wide for the field it was written to.
    ValueOutOfRange {
        /// The rejected value.
        value: u8,
        /// The field width in bits.
        width: u32,
    },
    /// A list ran past the end of the buffer before its terminator.
    TruncatedList {
        /// The list field being read.
        field: &'static str,
        /// The position at which the data ran out.
        position: u64,
    },
    /// A buffer or sequence was not the size the layout requires.
    SizeMismatch {
        /// The expected size.
        expected: usize,
        /// The size found.
        actual: usize,
    },
    /// The length word of a compressed save does not match the file size.
    RleLengthMismatch {
        /// The length the header declares.
        declared: usize,
        /// The length implied by the buffer.
        actual: usize,
    },
    /// Compressed data ended in the middle of an escape sequence.
    TruncatedRle {
        /// The position of the cut-off sequence.
        position: u64,
    },
    /// There was an error while parsing that carried no further context.
    ParsingFailed,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::LayoutOverrun {
                field,
                target,
                position,
            } => write!(
                f,
                "layout overrun before {field}: cursor at {position:#x}, anchor at {target:#x} ({} bytes past)",
                position - target
            ),
            Error::OutOfBounds { index, count } => {
                write!(f, "element index out of bounds: {index} >= {count}")
            }
            Error::ValueOutOfRange { value, width } => {
                write!(f, "value {value} does not fit in a {width}-bit field")
            }
            Error::TruncatedList { field, position } => write!(
                f,
                "no terminator found for {field}: data ran out at {position:#x}"
            ),
            Error::SizeMismatch { expected, actual } => {
                write!(f, "unexpected size: expected {expected}, got {actual}")
            }
            Error::RleLengthMismatch { declared, actual } => write!(
                f,
                "compressed length field mismatch: declared {declared}, actual {actual}"
            ),
            Error::TruncatedRle { position } => write!(
                f,
                "compressed data ends inside an escape sequence at {position:#x}"
            ),
            Error::ParsingFailed => write!(f, "parsing failed"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Recovers the typed error a custom parser embedded into a binrw error,
    /// if there is one.
    pub(crate) fn from_binrw(err: binrw::Error) -> Error {
        if let Some(e) = err.custom_err::<Error>() {
            return e.clone();
        }
        if let binrw::Error::Backtrace(backtrace) = &err {
            if let Some(e) = backtrace.error.custom_err::<Error>() {
                return e.clone();
            }
        }
        Error::ParsingFailed
    }
}

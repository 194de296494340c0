// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Cursor;

use binrw::binrw;
use binrw::{BinRead, BinReaderExt, BinWrite};
use tracing::warn;

use crate::{ByteBuffer, ByteSpan, Error};

const HEADER_SIZE: usize = 6;

/// Runs shorter than this cost more escaped than literal.
const MIN_RUN: usize = 4;

#[binrw]
#[derive(Debug)]
#[brw(little)]
struct RleHeader {
    /// Copied through to the decompressed output verbatim.
    leading_word: u16,
    /// Only the low byte is the escape value.
    escape_word: u16,
    /// Counts every byte after the leading word, itself included.
    declared_length: u16,
}

/// Expands a SAV file as found on disk into the fixed-size blob the layout
/// codec reads.
///
/// In the stream, an escape byte is followed by a count and a value and
/// expands to that value repeated; every other byte is literal.
pub fn decompress_sav(buffer: ByteSpan) -> Result<ByteBuffer, Error> {
    if buffer.len() < HEADER_SIZE {
        return Err(Error::SizeMismatch {
            expected: HEADER_SIZE,
            actual: buffer.len(),
        });
    }

    let mut cursor = Cursor::new(buffer);
    let header = RleHeader::read(&mut cursor).map_err(Error::from_binrw)?;
    let escape = header.escape_word as u8;

    let declared = header.declared_length as usize;
    let actual = buffer.len() - 2;
    if declared != actual {
        warn!(declared, actual, "not a save file, or one cut short");
        return Err(Error::RleLengthMismatch { declared, actual });
    }

    let mut out = ByteBuffer::with_capacity(actual);
    out.extend_from_slice(&header.leading_word.to_le_bytes());

    while let Ok(value) = cursor.read_le::<u8>() {
        if value == escape {
            let position = cursor.position() - 1;
            let count = cursor
                .read_le::<u8>()
                .map_err(|_| Error::TruncatedRle { position })?;
            let run_value = cursor
                .read_le::<u8>()
                .map_err(|_| Error::TruncatedRle { position })?;
            out.resize(out.len() + count as usize, run_value);
        } else {
            out.push(value);
        }
    }

    Ok(out)
}

/// Packs a decompressed save back into the on-disk SAV form.
///
/// The escape byte is whatever value the payload uses least; literal
/// occurrences of it are escaped with a count of their run length, and runs
/// of four or more of any value are escaped too, capped at 255 per sequence.
pub fn compress_sav(buffer: ByteSpan) -> Result<ByteBuffer, Error> {
    if buffer.len() < 2 {
        return Err(Error::SizeMismatch {
            expected: 2,
            actual: buffer.len(),
        });
    }
    let payload = &buffer[2..];

    let mut frequency = [0usize; 256];
    for &byte in payload {
        frequency[byte as usize] += 1;
    }
    let escape = (0..=255u8)
        .min_by_key(|&value| frequency[value as usize])
        .unwrap_or(0);

    let mut encoded = ByteBuffer::new();
    let mut i = 0;
    while i < payload.len() {
        let value = payload[i];
        let mut run = 1;
        while run < 255 && i + run < payload.len() && payload[i + run] == value {
            run += 1;
        }

        if run >= MIN_RUN || value == escape {
            encoded.push(escape);
            encoded.push(run as u8);
            encoded.push(value);
        } else {
            encoded.resize(encoded.len() + run, value);
        }
        i += run;
    }

    let declared = HEADER_SIZE - 2 + encoded.len();
    if declared > u16::MAX as usize {
        return Err(Error::SizeMismatch {
            expected: u16::MAX as usize,
            actual: declared,
        });
    }

    let mut out = ByteBuffer::with_capacity(HEADER_SIZE + encoded.len());
    {
        let mut cursor = Cursor::new(&mut out);
        let header = RleHeader {
            leading_word: u16::from_le_bytes([buffer[0], buffer[1]]),
            escape_word: escape as u16,
            declared_length: declared as u16,
        };
        header.write(&mut cursor).map_err(Error::from_binrw)?;
    }
    out.extend_from_slice(&encoded);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_known_stream() {
        // leading word, escape 0xFE, length, then one literal and one run
        let compressed = [
            0x34, 0x12, 0xFE, 0x00, 0x08, 0x00, 0x07, 0xFE, 0x03, 0x42,
        ];

        let expanded = decompress_sav(&compressed).unwrap();
        assert_eq!(expanded, [0x34, 0x12, 0x07, 0x42, 0x42, 0x42]);
    }

    #[test]
    fn round_trip() {
        // every byte value occurs, so the escape byte collides with payload
        // data, plus a long run worth escaping
        let mut blob = vec![0x99u8, 0x99];
        for value in 0..=255u8 {
            blob.push(value);
            blob.push(value.wrapping_mul(3));
        }
        blob.extend_from_slice(&[0x07; 300]);

        let compressed = compress_sav(&blob).unwrap();
        assert!(compressed.len() < blob.len() + HEADER_SIZE);
        assert_eq!(decompress_sav(&compressed).unwrap(), blob);
    }

    #[test]
    fn length_field_mismatch() {
        let full = compress_sav(&[0u8, 0, 1, 2, 3]).unwrap();

        let mut compressed = full.clone();
        compressed.pop();

        assert_eq!(
            decompress_sav(&compressed).unwrap_err(),
            Error::RleLengthMismatch {
                declared: full.len() - 2,
                actual: compressed.len() - 2,
            }
        );
    }

    #[test]
    fn cut_off_escape_sequence() {
        // escape byte with no count or value after it
        let compressed = [0x00u8, 0x00, 0xFF, 0x00, 0x06, 0x00, 0x01, 0xFF];

        assert_eq!(
            decompress_sav(&compressed).unwrap_err(),
            Error::TruncatedRle { position: 7 }
        );
    }
}

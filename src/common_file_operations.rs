// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(clippy::ptr_arg)] // binrw trips up another false positive

use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};

use crate::Error;

/// Terminates every variable-length record list in the save layout.
pub(crate) const LIST_SENTINEL: u16 = 0xFFFF;

pub(crate) fn custom_error(pos: u64, err: Error) -> binrw::Error {
    binrw::Error::Custom {
        pos,
        err: Box::new(err),
    }
}

/// Consumes the gap between the cursor and the absolute offset the next
/// field is anchored at, keeping the skipped bytes so they can be replayed
/// on write. A cursor already past the anchor means the preceding fields
/// overran their room in the layout.
#[binrw::parser(reader)]
pub(crate) fn parse_filler(target: u64, field: &'static str) -> BinResult<Vec<u8>> {
    let position = reader.stream_position()?;
    if target < position {
        return Err(custom_error(
            position,
            Error::LayoutOverrun {
                field,
                target,
                position,
            },
        ));
    }

    let mut filler = vec![0u8; (target - position) as usize];
    reader.read_exact(&mut filler)?;
    Ok(filler)
}

/// Fills the gap up to `target` with the bytes captured at parse time.
/// Captures from a differently-sized gap are truncated, and shortfalls are
/// zero-filled; records that never went through a parse carry no capture
/// and produce pure zero fill.
#[binrw::writer(writer)]
pub(crate) fn write_filler(filler: &Vec<u8>, target: u64, field: &'static str) -> BinResult<()> {
    let position = writer.stream_position()?;
    if target < position {
        return Err(custom_error(
            position,
            Error::LayoutOverrun {
                field,
                target,
                position,
            },
        ));
    }

    let gap = (target - position) as usize;
    let mut bytes = vec![0u8; gap];
    let keep = filler.len().min(gap);
    bytes[..keep].copy_from_slice(&filler[..keep]);
    writer.write_all(&bytes)?;
    Ok(())
}

/// Reads fixed-size records until a leading `0xFFFF` word, which is consumed
/// as the terminator and not as data. The layout stores no count, so running
/// out of buffer before the terminator is the only failure mode.
pub(crate) fn parse_sentinel_list<R, T>(
    reader: &mut R,
    endian: Endian,
    (field,): (&'static str,),
) -> BinResult<Vec<T>>
where
    R: Read + Seek,
    T: for<'a> BinRead<Args<'a> = ()>,
{
    let mut records = Vec::new();
    loop {
        let position = reader.stream_position()?;
        let marker = match u16::read_options(reader, endian, ()) {
            Ok(marker) => marker,
            Err(_) => return Err(custom_error(position, Error::TruncatedList { field, position })),
        };
        if marker == LIST_SENTINEL {
            return Ok(records);
        }

        reader.seek(SeekFrom::Current(-2))?;
        match T::read_options(reader, endian, ()) {
            Ok(record) => records.push(record),
            Err(_) => return Err(custom_error(position, Error::TruncatedList { field, position })),
        }
    }
}

/// Writes the records in sequence order followed by the `0xFFFF` terminator.
pub(crate) fn write_sentinel_list<W, T>(
    records: &Vec<T>,
    writer: &mut W,
    endian: Endian,
    _args: (),
) -> BinResult<()>
where
    W: Write + Seek,
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    for record in records {
        record.write_options(writer, endian, ())?;
    }
    LIST_SENTINEL.write_options(writer, endian, ())
}

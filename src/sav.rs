// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Cursor;

use binrw::binrw;
use binrw::{BinRead, BinWrite};
use tracing::warn;

use crate::bitfield::PackedBitField;
use crate::common_file_operations::{
    parse_filler, parse_sentinel_list, write_filler, write_sentinel_list, LIST_SENTINEL,
};
use crate::{ByteBuffer, ByteSpan, Error};

/// The number of map areas tracked by a save.
pub const MAP_AREA_COUNT: usize = 50_684;

const MAP_AREA_FIELD: PackedBitField = PackedBitField::new(2, MAP_AREA_COUNT);

/// The size of the packed map area flags, in bytes.
pub const MAP_AREA_FLAGS_SIZE: usize = MAP_AREA_FIELD.packed_size();

/// The size of the opaque region between the map flags and the dialogue data.
pub const UNKNOWN_REGION_SIZE: usize = 162;

/// The size of the dialogue region.
pub const DIALOGUE_REGION_SIZE: usize = 4_600;

const HEADER_SIZE: usize = 4;

/// Where the data segment starts in the file.
pub const DATA_SEGMENT_BASE: usize =
    HEADER_SIZE + MAP_AREA_FLAGS_SIZE + UNKNOWN_REGION_SIZE + DIALOGUE_REGION_SIZE;

/// The size of the data segment.
pub const DATA_SEGMENT_SIZE: usize = 0x567e;

/// The size of a decompressed save file.
pub const SAVE_FILE_SIZE: usize = DATA_SEGMENT_BASE + DATA_SEGMENT_SIZE;

// Field anchors inside the data segment, relative to its base. The original
// layout notes express these as `0x441d + offset` from the file start;
// 0x441d is just where the segment sits in the file.
const UI_HEAD_INDEX_OFFSET: u64 = 0x00e8;
const INTRO_LIST_OFFSET: u64 = 0x11dd;
const PALACE_PLAN_OFFSET: u64 = 0x120b;
const SEGMENT_END_OFFSET: u64 = DATA_SEGMENT_SIZE as u64;

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[brw(little)]
/// The two leading words of a save. Neither is interpreted.
pub struct Header {
    pub flags: u16,
    pub size: u16,
}

#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[brw(little)]
/// One 2-bit flag per map area, packed four to a byte with the first area in
/// the least-significant bits.
pub struct MapAreaFlags {
    #[br(count = MAP_AREA_FLAGS_SIZE)]
    packed: Vec<u8>,
}

impl MapAreaFlags {
    /// Creates flags with every area cleared.
    pub fn new() -> MapAreaFlags {
        MapAreaFlags {
            packed: vec![0u8; MAP_AREA_FLAGS_SIZE],
        }
    }

    /// Reads the flag of a single area.
    pub fn get(&self, area: usize) -> Result<u8, Error> {
        MAP_AREA_FIELD.get(&self.packed, area)
    }

    /// Sets the flag of a single area. Values above 3 do not fit and are
    /// rejected, never truncated.
    pub fn set(&mut self, area: usize, value: u8) -> Result<(), Error> {
        MAP_AREA_FIELD.set(&mut self.packed, area, value)
    }

    /// Expands the flags of every area, in area order.
    pub fn values(&self) -> Vec<u8> {
        MAP_AREA_FIELD.unpack(&self.packed)
    }

    /// Packs one flag per area, in area order.
    pub fn from_values(values: &[u8]) -> Result<MapAreaFlags, Error> {
        Ok(MapAreaFlags {
            packed: MAP_AREA_FIELD.pack(values)?,
        })
    }
}

impl Default for MapAreaFlags {
    fn default() -> MapAreaFlags {
        MapAreaFlags::new()
    }
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
/// A UI sprite placement.
pub struct UiSimpleSprite {
    /// The sprite identifier. `0xFFFF` is reserved for the list terminator;
    /// a sprite carrying it would be misread as the end of its list.
    pub index: u16,
    /// Vertical position.
    pub y: i16,
    /// Horizontal position.
    pub x: i16,
}

#[binrw]
#[derive(Debug, Clone, Default)]
#[brw(little, import { base: u64 })]
/// The trailing segment of a save. Most of it is unmapped; the fields the
/// layout does name sit at fixed offsets from the segment base, with the
/// bytes in between captured and replayed untouched.
pub struct DataSegment {
    pub rand_bits: u16,
    /// Opaque game state, preserved verbatim.
    pub ds_0002: u16,
    /// Opaque game state, preserved verbatim.
    pub ds_0004_current_location_and_room: u16,
    pub ds_0006: u8,
    pub ds_0007: u8,

    #[br(parse_with = parse_filler, args(base + UI_HEAD_INDEX_OFFSET, "ui_head_index"))]
    #[bw(write_with = write_filler, args(base + UI_HEAD_INDEX_OFFSET, "ui_head_index"))]
    filler_ui_head_index: Vec<u8>,

    pub ui_head_index: u8,

    #[br(parse_with = parse_filler, args(base + INTRO_LIST_OFFSET, "intro_28_night_attack_ui_list"))]
    #[bw(write_with = write_filler, args(base + INTRO_LIST_OFFSET, "intro_28_night_attack_ui_list"))]
    filler_intro_list: Vec<u8>,

    /// Sprite placements of the night attack scene, in draw order.
    #[br(parse_with = parse_sentinel_list, args("intro_28_night_attack_ui_list"))]
    #[bw(write_with = write_sentinel_list)]
    pub intro_28_night_attack_ui_list: Vec<UiSimpleSprite>,

    #[br(parse_with = parse_filler, args(base + PALACE_PLAN_OFFSET, "palace_plan"))]
    #[bw(write_with = write_filler, args(base + PALACE_PLAN_OFFSET, "palace_plan"))]
    filler_palace_plan: Vec<u8>,

    /// Sprite placements of the palace floor plan, in draw order.
    #[br(parse_with = parse_sentinel_list, args("palace_plan"))]
    #[bw(write_with = write_sentinel_list)]
    pub palace_plan: Vec<UiSimpleSprite>,

    #[br(parse_with = parse_filler, args(base + SEGMENT_END_OFFSET, "end of data segment"))]
    #[bw(write_with = write_filler, args(base + SEGMENT_END_OFFSET, "end of data segment"))]
    filler_end: Vec<u8>,
}

impl PartialEq for DataSegment {
    fn eq(&self, other: &DataSegment) -> bool {
        // filler bytes are replayed on write but are not observable state
        self.rand_bits == other.rand_bits
            && self.ds_0002 == other.ds_0002
            && self.ds_0004_current_location_and_room == other.ds_0004_current_location_and_room
            && self.ds_0006 == other.ds_0006
            && self.ds_0007 == other.ds_0007
            && self.ui_head_index == other.ui_head_index
            && self.intro_28_night_attack_ui_list == other.intro_28_night_attack_ui_list
            && self.palace_plan == other.palace_plan
    }
}

impl Eq for DataSegment {}

#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[brw(little)]
/// A complete save, as laid out in the decompressed SAV file.
pub struct SaveFile {
    pub header: Header,
    pub map_flags: MapAreaFlags,

    /// Opaque region between the map flags and the dialogue data, preserved
    /// verbatim.
    #[br(count = UNKNOWN_REGION_SIZE)]
    pub unknown: Vec<u8>,

    /// Opaque dialogue state, preserved verbatim.
    #[br(count = DIALOGUE_REGION_SIZE)]
    pub dialogue: Vec<u8>,

    #[brw(args { base: DATA_SEGMENT_BASE as u64 })]
    pub data_segment: DataSegment,
}

impl SaveFile {
    /// Parses an existing save file.
    pub fn from_existing(buffer: ByteSpan) -> Result<SaveFile, Error> {
        if buffer.len() != SAVE_FILE_SIZE {
            return Err(Error::SizeMismatch {
                expected: SAVE_FILE_SIZE,
                actual: buffer.len(),
            });
        }

        let mut cursor = Cursor::new(buffer);
        SaveFile::read(&mut cursor).map_err(Error::from_binrw)
    }

    /// Writes the save back to a buffer of exactly [`SAVE_FILE_SIZE`] bytes.
    pub fn write_to_buffer(&self) -> Result<ByteBuffer, Error> {
        if self.unknown.len() != UNKNOWN_REGION_SIZE {
            return Err(Error::SizeMismatch {
                expected: UNKNOWN_REGION_SIZE,
                actual: self.unknown.len(),
            });
        }
        if self.dialogue.len() != DIALOGUE_REGION_SIZE {
            return Err(Error::SizeMismatch {
                expected: DIALOGUE_REGION_SIZE,
                actual: self.dialogue.len(),
            });
        }

        for sprite in self
            .data_segment
            .intro_28_night_attack_ui_list
            .iter()
            .chain(&self.data_segment.palace_plan)
        {
            if sprite.index == LIST_SENTINEL {
                warn!(
                    index = sprite.index,
                    "sprite index equals the list terminator and will not survive a round trip"
                );
            }
        }

        let mut buffer = ByteBuffer::new();
        {
            let mut cursor = Cursor::new(&mut buffer);
            self.write(&mut cursor).map_err(Error::from_binrw)?;
        }

        if buffer.len() != SAVE_FILE_SIZE {
            return Err(Error::SizeMismatch {
                expected: SAVE_FILE_SIZE,
                actual: buffer.len(),
            });
        }

        Ok(buffer)
    }
}

impl Default for SaveFile {
    fn default() -> SaveFile {
        SaveFile {
            header: Header::default(),
            map_flags: MapAreaFlags::new(),
            unknown: vec![0u8; UNKNOWN_REGION_SIZE],
            dialogue: vec![0u8; DIALOGUE_REGION_SIZE],
            data_segment: DataSegment::default(),
        }
    }
}

// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reading and writing the save data of the 1992 Dune CD-ROM game.
//!
//! Save files are a single fixed-size blob mixing scalar fields, a packed
//! per-area flag array, opaque byte regions and sentinel-terminated sprite
//! lists, all anchored at fixed file offsets. Decoding and re-encoding an
//! unchanged save reproduces the input byte for byte.

/// Represents a continuous block of memory which is not owned.
pub type ByteSpan<'a> = &'a [u8];

/// Represents a continuous block of memory which is owned.
pub type ByteBuffer = Vec<u8>;

/// Reading and writing the save file (SAV) layout.
pub mod sav;

/// Packed arrays of sub-byte unsigned fields.
pub mod bitfield;

/// The RLE scheme wrapping save files on disk.
pub mod compression;

mod common_file_operations;

mod error;
pub use error::Error;

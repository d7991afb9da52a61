//! This module provides [`PbfWriter`], which appends Protocol Buffers wire values to an in-memory buffer.
//!
//! # Examples
//!
//! ```rust
//! use vector_tile_pbf::PbfWriter;
//! # fn main() -> anyhow::Result<()> {
//! let mut writer = PbfWriter::new();
//! writer.write_varint(1025)?;
//! assert_eq!(writer.into_blob().into_vec(), vec![0b10000001, 0b00001000]);
//! # Ok(())
//! # }
//! ```

use crate::Blob;
use anyhow::{Context, Result};
use byteorder::{LE, WriteBytesExt};
use std::io::{Cursor, Write};

/// Writes Protocol Buffers wire values into a growing buffer.
#[derive(Default)]
pub struct PbfWriter {
	cursor: Cursor<Vec<u8>>,
}

impl PbfWriter {
	#[must_use]
	pub fn new() -> PbfWriter {
		PbfWriter {
			cursor: Cursor::new(Vec::new()),
		}
	}

	/// Consumes the writer and returns everything written so far.
	#[must_use]
	pub fn into_blob(self) -> Blob {
		Blob::from(self.cursor.into_inner())
	}

	/// Number of bytes written so far.
	#[must_use]
	pub fn position(&self) -> u64 {
		self.cursor.position()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.position() == 0
	}

	/// Writes a base-128 varint.
	pub fn write_varint(&mut self, mut value: u64) -> Result<()> {
		while value >= 0x80 {
			self.cursor.write_all(&[((value & 0x7F) as u8) | 0x80])?;
			value >>= 7;
		}
		self.cursor.write_all(&[value as u8])?;
		Ok(())
	}

	/// Writes a zigzag encoded varint (`sint64`).
	pub fn write_svarint(&mut self, value: i64) -> Result<()> {
		self.write_varint(((value << 1) ^ (value >> 63)) as u64)
	}

	/// Writes a little-endian `f32`.
	pub fn write_f32(&mut self, value: f32) -> Result<()> {
		Ok(self.cursor.write_f32::<LE>(value)?)
	}

	/// Writes a little-endian `f64`.
	pub fn write_f64(&mut self, value: f64) -> Result<()> {
		Ok(self.cursor.write_f64::<LE>(value)?)
	}

	/// Writes raw bytes without a length prefix.
	pub fn write_slice(&mut self, buf: &[u8]) -> Result<()> {
		self.cursor.write_all(buf)?;
		Ok(())
	}

	/// Writes a field key made of `field_number` and `wire_type`.
	pub fn write_pbf_key(&mut self, field_number: u32, wire_type: u8) -> Result<()> {
		self
			.write_varint((u64::from(field_number) << 3) | u64::from(wire_type))
			.context("Failed to write PBF key")
	}

	/// Writes a length-delimited blob.
	pub fn write_pbf_blob(&mut self, blob: &Blob) -> Result<()> {
		self
			.write_varint(blob.len())
			.context("Failed to write varint for blob length")?;
		self.write_slice(blob.as_slice()).context("Failed to write PBF blob")
	}

	/// Writes a length-delimited UTF-8 string.
	pub fn write_pbf_string(&mut self, text: &str) -> Result<()> {
		self
			.write_varint(text.len() as u64)
			.context("Failed to write varint for string length")?;
		self.write_slice(text.as_bytes()).context("Failed to write PBF string")
	}

	/// Writes a packed repeated `uint32` field body (without key).
	pub fn write_pbf_packed_uint32(&mut self, data: &[u32]) -> Result<()> {
		self.write_packed(data, |writer, value| writer.write_varint(u64::from(*value)))
			.context("Failed to write packed uint32")
	}

	/// Writes a packed repeated `uint64` field body (without key).
	pub fn write_pbf_packed_uint64(&mut self, data: &[u64]) -> Result<()> {
		self.write_packed(data, |writer, value| writer.write_varint(*value))
			.context("Failed to write packed uint64")
	}

	/// Writes a packed repeated `sint64` field body (without key).
	pub fn write_pbf_packed_sint64(&mut self, data: &[i64]) -> Result<()> {
		self.write_packed(data, |writer, value| writer.write_svarint(*value))
			.context("Failed to write packed sint64")
	}

	/// Writes a packed repeated `float` field body (without key).
	pub fn write_pbf_packed_f32(&mut self, data: &[f32]) -> Result<()> {
		self.write_packed(data, |writer, value| writer.write_f32(*value))
			.context("Failed to write packed float")
	}

	/// Writes a packed repeated `double` field body (without key).
	pub fn write_pbf_packed_f64(&mut self, data: &[f64]) -> Result<()> {
		self.write_packed(data, |writer, value| writer.write_f64(*value))
			.context("Failed to write packed double")
	}

	fn write_packed<T>(&mut self, data: &[T], write: impl Fn(&mut PbfWriter, &T) -> Result<()>) -> Result<()> {
		let mut writer = PbfWriter::new();
		for value in data {
			write(&mut writer, value)?;
		}
		self.write_pbf_blob(&writer.into_blob())
	}
}

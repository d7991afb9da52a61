//! This module provides [`PbfReader`], a cursor over a byte slice that decodes Protocol Buffers wire values.
//!
//! Embedded messages are read through sub-readers borrowing the same slice, so a whole tile
//! can be walked without copying any bytes except strings and packed arrays.

use crate::{Blob, WIRE_FIXED32, WIRE_FIXED64, WIRE_LEN, WIRE_VARINT};
use anyhow::{Context, Result, anyhow, bail, ensure};
use byteorder::{LE, ReadBytesExt};
use std::io::Cursor;

/// Reads Protocol Buffers wire values from a byte slice.
pub struct PbfReader<'a> {
	cursor: Cursor<&'a [u8]>,
	len: u64,
}

impl<'a> PbfReader<'a> {
	/// Creates a reader positioned at the start of `slice`.
	#[must_use]
	pub fn new(slice: &'a [u8]) -> PbfReader<'a> {
		PbfReader {
			len: slice.len() as u64,
			cursor: Cursor::new(slice),
		}
	}

	/// Total length of the readable data.
	#[must_use]
	pub fn len(&self) -> u64 {
		self.len
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	#[must_use]
	pub fn position(&self) -> u64 {
		self.cursor.position()
	}

	#[must_use]
	pub fn remaining(&self) -> u64 {
		self.len - self.position()
	}

	#[must_use]
	pub fn has_remaining(&self) -> bool {
		self.remaining() > 0
	}

	/// Reads a base-128 varint.
	///
	/// # Errors
	/// Fails on truncated input or when the varint is longer than ten bytes.
	pub fn read_varint(&mut self) -> Result<u64> {
		let mut value = 0;
		let mut shift = 0;
		loop {
			let byte = self.cursor.read_u8().context("Unexpected end of data while reading varint")?;
			value |= (u64::from(byte) & 0x7F) << shift;
			if byte & 0x80 == 0 {
				break;
			}
			shift += 7;
			if shift >= 70 {
				bail!("Varint too long");
			}
		}
		Ok(value)
	}

	/// Reads a zigzag encoded varint (`sint64`).
	pub fn read_svarint(&mut self) -> Result<i64> {
		let value = self.read_varint()?;
		Ok(((value >> 1) as i64) ^ -((value & 1) as i64))
	}

	/// Reads a little-endian `f32` (`float`, wire type 5).
	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(self.cursor.read_f32::<LE>()?)
	}

	/// Reads a little-endian `f64` (`double`, wire type 1).
	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(self.cursor.read_f64::<LE>()?)
	}

	/// Returns the next `length` bytes without copying them.
	pub fn read_bytes(&mut self, length: u64) -> Result<&'a [u8]> {
		let start = self.position();
		let end = start
			.checked_add(length)
			.ok_or_else(|| anyhow!("Length overflow while reading {length} bytes"))?;
		ensure!(
			end <= self.len,
			"Requested {length} bytes at position {start}, but only {} remain",
			self.remaining()
		);
		let slice: &'a [u8] = *self.cursor.get_ref();
		self.cursor.set_position(end);
		Ok(&slice[start as usize..end as usize])
	}

	/// Reads a Protocol Buffers key, returning `(field_number, wire_type)`.
	pub fn read_pbf_key(&mut self) -> Result<(u32, u8)> {
		let value = self.read_varint().context("Failed to read varint for PBF key")?;
		let field = u32::try_from(value >> 3).context("PBF field number out of range")?;
		Ok((field, (value & 0x07) as u8))
	}

	/// Returns a reader over the next length-delimited field.
	pub fn get_pbf_sub_reader(&mut self) -> Result<PbfReader<'a>> {
		let length = self
			.read_varint()
			.context("Failed to read varint for sub-reader length")?;
		Ok(PbfReader::new(
			self.read_bytes(length).context("Failed to get sub-reader")?,
		))
	}

	/// Reads a length-delimited UTF-8 string.
	pub fn read_pbf_string(&mut self) -> Result<String> {
		let length = self.read_varint().context("Failed to read varint for string length")?;
		let bytes = self.read_bytes(length).context("Failed to read PBF string")?;
		Ok(String::from_utf8(bytes.to_vec())?)
	}

	/// Reads a length-delimited field into a [`Blob`].
	pub fn read_pbf_blob(&mut self) -> Result<Blob> {
		let length = self.read_varint().context("Failed to read varint for blob length")?;
		Ok(Blob::from(self.read_bytes(length).context("Failed to read PBF blob")?))
	}

	/// Reads a packed repeated `uint32` field.
	pub fn read_pbf_packed_uint32(&mut self) -> Result<Vec<u32>> {
		self.read_packed(|reader| {
			let value = reader.read_varint()?;
			u32::try_from(value).with_context(|| format!("Value {value} does not fit into uint32"))
		})
		.context("Failed to read packed uint32")
	}

	/// Reads a packed repeated `uint64` field.
	pub fn read_pbf_packed_uint64(&mut self) -> Result<Vec<u64>> {
		self.read_packed(PbfReader::read_varint)
			.context("Failed to read packed uint64")
	}

	/// Reads a packed repeated `sint64` field.
	pub fn read_pbf_packed_sint64(&mut self) -> Result<Vec<i64>> {
		self.read_packed(PbfReader::read_svarint)
			.context("Failed to read packed sint64")
	}

	/// Reads a packed repeated `float` field.
	pub fn read_pbf_packed_f32(&mut self) -> Result<Vec<f32>> {
		self.read_packed(PbfReader::read_f32).context("Failed to read packed float")
	}

	/// Reads a packed repeated `double` field.
	pub fn read_pbf_packed_f64(&mut self) -> Result<Vec<f64>> {
		self.read_packed(PbfReader::read_f64).context("Failed to read packed double")
	}

	fn read_packed<T>(&mut self, mut read: impl FnMut(&mut PbfReader<'a>) -> Result<T>) -> Result<Vec<T>> {
		let mut reader = self.get_pbf_sub_reader()?;
		let mut values = Vec::new();
		while reader.has_remaining() {
			values.push(read(&mut reader)?);
		}
		Ok(values)
	}

	/// Skips the value of a field whose key has already been read.
	///
	/// # Errors
	/// Fails for the deprecated group wire types and on truncated input.
	pub fn skip_field(&mut self, wire_type: u8) -> Result<()> {
		match wire_type {
			WIRE_VARINT => {
				self.read_varint()?;
			}
			WIRE_FIXED64 => {
				self.read_bytes(8)?;
			}
			WIRE_LEN => {
				let length = self.read_varint()?;
				self.read_bytes(length)?;
			}
			WIRE_FIXED32 => {
				self.read_bytes(4)?;
			}
			w => bail!("Cannot skip field with wire type {w}"),
		}
		Ok(())
	}
}

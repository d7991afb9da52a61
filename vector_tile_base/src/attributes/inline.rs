//! Typed value banks with inline complex values, used by version 3 layers.
//!
//! A feature stores its attributes as `(key index, complex value)` pairs. A complex value
//! packs a 4 bit tag with a parameter, `(param << 4) | tag`:
//!
//! | tag | meaning                                                             |
//! |-----|---------------------------------------------------------------------|
//! | 0   | string bank index                                                   |
//! | 1   | float bank index                                                    |
//! | 2   | double bank index                                                   |
//! | 3   | signed integer bank index                                           |
//! | 4   | unsigned integer bank index                                         |
//! | 5   | unsigned integer below 2^56, stored inline                          |
//! | 6   | zigzag code of a signed integer with magnitude below 2^55           |
//! | 7   | `0` false, `1` true, `2` null                                       |
//! | 8   | list of `param` complex values                                      |
//! | 9   | map of `param` `(key index, complex value)` pairs                   |
//! | 10  | scaled float list of `param` entries: scaling index, then entries   |
//!
//! The banks are written as one `AttributePool` message per layer:
//!  * field 1: repeated string
//!  * field 2: packed float
//!  * field 3: packed double
//!  * field 4: packed sint64
//!  * field 5: packed uint64

use super::{AttributeEncoding, AttributeValue, Attributes, Lookup, ScaledFloatList};
use crate::{AttributeScaling, VectorTileError, zigzag};
use anyhow::{Context, Result, anyhow};
use log::{debug, trace};
use std::slice::Iter;
use vector_tile_pbf::{Blob, PbfReader, PbfWriter, WIRE_LEN};

const TAG_STRING: u64 = 0;
const TAG_FLOAT: u64 = 1;
const TAG_DOUBLE: u64 = 2;
const TAG_SINT: u64 = 3;
const TAG_UINT: u64 = 4;
const TAG_INLINE_UINT: u64 = 5;
const TAG_INLINE_SINT: u64 = 6;
const TAG_BOOL_NULL: u64 = 7;
const TAG_LIST: u64 = 8;
const TAG_MAP: u64 = 9;
const TAG_SCALED_LIST: u64 = 10;

const INLINE_UINT_LIMIT: u64 = 1 << 56;
const INLINE_SINT_LIMIT: u64 = 1 << 55;
const MAX_NESTING: usize = 64;

fn complex(tag: u64, param: u64) -> u64 {
	(param << 4) | tag
}

fn malformed(message: String) -> anyhow::Error {
	anyhow!(VectorTileError::MalformedAttributes(message))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InlinePool {
	strings: Lookup<String>,
	floats: Lookup<u32>,
	doubles: Lookup<u64>,
	signed: Lookup<i64>,
	unsigned: Lookup<u64>,
}

impl InlinePool {
	pub fn is_empty(&self) -> bool {
		self.strings.is_empty()
			&& self.floats.is_empty()
			&& self.doubles.is_empty()
			&& self.signed.is_empty()
			&& self.unsigned.is_empty()
	}

	/// Reads an `AttributePool` message.
	pub fn read(reader: &mut PbfReader<'_>) -> Result<InlinePool> {
		let mut strings = Vec::new();
		let mut floats = Vec::new();
		let mut doubles = Vec::new();
		let mut signed = Vec::new();
		let mut unsigned = Vec::new();

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_LEN) => strings.push(reader.read_pbf_string().context("Failed to read string bank entry")?),
				(2, WIRE_LEN) => floats.extend(
					reader
						.read_pbf_packed_f32()
						.context("Failed to read float bank")?
						.into_iter()
						.map(f32::to_bits),
				),
				(3, WIRE_LEN) => doubles.extend(
					reader
						.read_pbf_packed_f64()
						.context("Failed to read double bank")?
						.into_iter()
						.map(f64::to_bits),
				),
				(4, WIRE_LEN) => signed.extend(reader.read_pbf_packed_sint64().context("Failed to read sint bank")?),
				(5, WIRE_LEN) => unsigned.extend(reader.read_pbf_packed_uint64().context("Failed to read uint bank")?),
				(f, w) => {
					trace!("skipping unknown attribute pool field {f} (wire type {w})");
					reader.skip_field(w)?;
				}
			}
		}

		Ok(InlinePool {
			strings: Lookup::new(strings),
			floats: Lookup::new(floats),
			doubles: Lookup::new(doubles),
			signed: Lookup::new(signed),
			unsigned: Lookup::new(unsigned),
		})
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();
		for string in self.strings.iter() {
			writer.write_pbf_key(1, WIRE_LEN)?;
			writer.write_pbf_string(string).context("Failed to write string bank entry")?;
		}
		if !self.floats.is_empty() {
			let floats: Vec<f32> = self.floats.iter().map(|bits| f32::from_bits(*bits)).collect();
			writer.write_pbf_key(2, WIRE_LEN)?;
			writer.write_pbf_packed_f32(&floats).context("Failed to write float bank")?;
		}
		if !self.doubles.is_empty() {
			let doubles: Vec<f64> = self.doubles.iter().map(|bits| f64::from_bits(*bits)).collect();
			writer.write_pbf_key(3, WIRE_LEN)?;
			writer.write_pbf_packed_f64(&doubles).context("Failed to write double bank")?;
		}
		if !self.signed.is_empty() {
			writer.write_pbf_key(4, WIRE_LEN)?;
			writer
				.write_pbf_packed_sint64(self.signed.as_slice())
				.context("Failed to write sint bank")?;
		}
		if !self.unsigned.is_empty() {
			writer.write_pbf_key(5, WIRE_LEN)?;
			writer
				.write_pbf_packed_uint64(self.unsigned.as_slice())
				.context("Failed to write uint bank")?;
		}
		Ok(writer.into_blob())
	}

	/// Encodes one value, dropping (and removing from `value`) whatever cannot be encoded.
	/// Returns `None` if the value itself has to be dropped.
	fn encode_value(
		&mut self,
		keys: &mut Lookup<String>,
		value: &mut AttributeValue,
		scalings: &[AttributeScaling],
	) -> Option<Vec<u64>> {
		let encoded = match value {
			AttributeValue::String(s) => vec![complex(TAG_STRING, u64::from(self.strings.add(s.clone())))],
			AttributeValue::Float(f) => vec![complex(TAG_FLOAT, u64::from(self.floats.add(f.to_bits())))],
			AttributeValue::Double(f) => vec![complex(TAG_DOUBLE, u64::from(self.doubles.add(f.to_bits())))],
			AttributeValue::Int(v) => {
				if v.unsigned_abs() < INLINE_SINT_LIMIT {
					vec![complex(TAG_INLINE_SINT, zigzag::encode(*v))]
				} else {
					vec![complex(TAG_SINT, u64::from(self.signed.add(*v)))]
				}
			}
			AttributeValue::UInt(v) => {
				if *v < INLINE_UINT_LIMIT {
					vec![complex(TAG_INLINE_UINT, *v)]
				} else {
					vec![complex(TAG_UINT, u64::from(self.unsigned.add(*v)))]
				}
			}
			AttributeValue::Bool(b) => vec![complex(TAG_BOOL_NULL, u64::from(*b))],
			AttributeValue::Null => vec![complex(TAG_BOOL_NULL, 2)],
			AttributeValue::List(items) => {
				let mut body = Vec::new();
				items.retain_mut(|item| match self.encode_value(keys, item, scalings) {
					Some(encoded) => {
						body.extend(encoded);
						true
					}
					None => false,
				});
				let mut encoded = vec![complex(TAG_LIST, items.len() as u64)];
				encoded.extend(body);
				encoded
			}
			AttributeValue::Map(map) => {
				let body = self.encode_map(keys, map, scalings);
				let mut encoded = vec![complex(TAG_MAP, map.len() as u64)];
				encoded.extend(body);
				encoded
			}
			AttributeValue::ScaledFloatList(list) => {
				let Some(scaling) = scalings.get(list.scaling as usize) else {
					debug!("dropping scaled float list: scaling {} is not registered", list.scaling);
					return None;
				};
				let mut encoded = vec![complex(TAG_SCALED_LIST, list.values.len() as u64), u64::from(list.scaling)];
				encoded.extend(scaling.encode_values(&list.values));
				encoded
			}
		};
		Some(encoded)
	}

	fn encode_map(&mut self, keys: &mut Lookup<String>, map: &mut Attributes, scalings: &[AttributeScaling]) -> Vec<u64> {
		let mut body = Vec::new();
		map.retain(|key, value| match self.encode_value(keys, value, scalings) {
			Some(encoded) => {
				body.push(u64::from(keys.add(key.clone())));
				body.extend(encoded);
				true
			}
			None => {
				debug!("dropping attribute '{key}'");
				false
			}
		});
		body
	}

	fn decode_value(
		&self,
		keys: &Lookup<String>,
		data: &mut Iter<'_, u64>,
		scalings: &[AttributeScaling],
		depth: usize,
	) -> Result<AttributeValue> {
		if depth > MAX_NESTING {
			return Err(malformed(format!("values are nested deeper than {MAX_NESTING} levels")));
		}
		let value = *data
			.next()
			.ok_or_else(|| malformed("attribute data ends inside a value".to_string()))?;
		let (tag, param) = (value & 0x0F, value >> 4);

		Ok(match tag {
			TAG_STRING => AttributeValue::String(self.strings.get(param)?.clone()),
			TAG_FLOAT => AttributeValue::Float(f32::from_bits(*self.floats.get(param)?)),
			TAG_DOUBLE => AttributeValue::Double(f64::from_bits(*self.doubles.get(param)?)),
			TAG_SINT => AttributeValue::Int(*self.signed.get(param)?),
			TAG_UINT => AttributeValue::UInt(*self.unsigned.get(param)?),
			TAG_INLINE_UINT => AttributeValue::UInt(param),
			TAG_INLINE_SINT => AttributeValue::Int(zigzag::decode(param)),
			TAG_BOOL_NULL => match param {
				0 => AttributeValue::Bool(false),
				1 => AttributeValue::Bool(true),
				2 => AttributeValue::Null,
				p => return Err(malformed(format!("invalid bool/null parameter {p}"))),
			},
			TAG_LIST => {
				let mut items = Vec::new();
				for _ in 0..param {
					items.push(self.decode_value(keys, data, scalings, depth + 1)?);
				}
				AttributeValue::List(items)
			}
			TAG_MAP => AttributeValue::Map(self.decode_pairs(keys, data, scalings, param, depth + 1)?),
			TAG_SCALED_LIST => {
				let index = *data
					.next()
					.ok_or_else(|| malformed("scaled float list is missing its scaling index".to_string()))?;
				let scaling = usize::try_from(index)
					.ok()
					.and_then(|i| scalings.get(i))
					.ok_or_else(|| malformed(format!("scaled float list references unknown scaling {index}")))?;
				let count = usize::try_from(param).unwrap_or(usize::MAX);
				if data.len() < count {
					return Err(malformed(format!(
						"scaled float list needs {count} entries, only {} remain",
						data.len()
					)));
				}
				let entries: Vec<u64> = data.by_ref().take(count).copied().collect();
				AttributeValue::ScaledFloatList(ScaledFloatList::new(scaling.index(), scaling.decode_values(&entries)))
			}
			t => return Err(malformed(format!("unknown complex value tag {t}"))),
		})
	}

	fn decode_pair(
		&self,
		keys: &Lookup<String>,
		data: &mut Iter<'_, u64>,
		scalings: &[AttributeScaling],
		depth: usize,
	) -> Result<(String, AttributeValue)> {
		let key_index = *data
			.next()
			.ok_or_else(|| malformed("attribute data ends before a key".to_string()))?;
		let key = keys.get(key_index).context("Failed to resolve attribute key")?;
		Ok((key.clone(), self.decode_value(keys, data, scalings, depth)?))
	}

	fn decode_pairs(
		&self,
		keys: &Lookup<String>,
		data: &mut Iter<'_, u64>,
		scalings: &[AttributeScaling],
		count: u64,
		depth: usize,
	) -> Result<Attributes> {
		let mut attributes = Attributes::new();
		for _ in 0..count {
			let (key, value) = self.decode_pair(keys, data, scalings, depth)?;
			attributes.insert(key, value);
		}
		Ok(attributes)
	}
}

impl AttributeEncoding for InlinePool {
	fn encode(&mut self, keys: &mut Lookup<String>, attributes: &mut Attributes, scalings: &[AttributeScaling]) -> Vec<u64> {
		self.encode_map(keys, attributes, scalings)
	}

	fn decode(&self, keys: &Lookup<String>, data: &[u64], scalings: &[AttributeScaling]) -> Result<Attributes> {
		let mut iter = data.iter();
		let mut attributes = Attributes::new();
		while iter.len() > 0 {
			let (key, value) = self.decode_pair(keys, &mut iter, scalings, 0)?;
			attributes.insert(key, value);
		}
		Ok(attributes)
	}
}

//! Flat value pool used by version 2 layers.
//!
//! Every distinct `(type, value)` pair is stored once per layer as a `Value` message:
//!  * field 1: string
//!  * field 2: float
//!  * field 3: double
//!  * field 4: int64
//!  * field 5: uint64
//!  * field 6: sint64
//!  * field 7: bool
//!
//! A feature references its attributes as alternating `(key index, value index)` tags.

use super::{AttributeEncoding, AttributeValue, Attributes, Lookup};
use crate::{AttributeScaling, VectorTileError};
use anyhow::{Context, Result, bail};
use itertools::Itertools;
use log::{debug, trace};
use vector_tile_pbf::{Blob, PbfReader, PbfWriter, WIRE_FIXED32, WIRE_FIXED64, WIRE_LEN, WIRE_VARINT};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegacyPool {
	values: Lookup<AttributeValue>,
}

impl LegacyPool {
	pub fn new(values: Vec<AttributeValue>) -> LegacyPool {
		LegacyPool {
			values: Lookup::new(values),
		}
	}

	pub fn values(&self) -> &[AttributeValue] {
		self.values.as_slice()
	}

	fn is_supported(value: &AttributeValue) -> bool {
		matches!(
			value,
			AttributeValue::Bool(_)
				| AttributeValue::String(_)
				| AttributeValue::Float(_)
				| AttributeValue::Double(_)
				| AttributeValue::Int(_)
				| AttributeValue::UInt(_)
		)
	}

	/// Reads a single `Value` message.
	pub fn read_value(reader: &mut PbfReader<'_>) -> Result<AttributeValue> {
		use AttributeValue::{Bool, Double, Float, Int, String, UInt};
		let mut value: Option<AttributeValue> = None;

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_LEN) => value = Some(String(reader.read_pbf_string().context("Failed to read string value")?)),
				(2, WIRE_FIXED32) => value = Some(Float(reader.read_f32().context("Failed to read f32 value")?)),
				(3, WIRE_FIXED64) => value = Some(Double(reader.read_f64().context("Failed to read f64 value")?)),
				(4, WIRE_VARINT) => {
					#[allow(clippy::cast_possible_wrap)]
					let v = reader.read_varint().context("Failed to read varint for int value")? as i64;
					value = Some(Int(v));
				}
				(5, WIRE_VARINT) => value = Some(UInt(reader.read_varint().context("Failed to read uint value")?)),
				(6, WIRE_VARINT) => value = Some(Int(reader.read_svarint().context("Failed to read sint value")?)),
				(7, WIRE_VARINT) => value = Some(Bool(reader.read_varint().context("Failed to read bool value")? != 0)),
				(f, w) => {
					trace!("skipping unknown value field {f} (wire type {w})");
					reader.skip_field(w)?;
				}
			}
		}

		Ok(value.unwrap_or_else(|| {
			trace!("value message holds no known field, reading it as null");
			AttributeValue::Null
		}))
	}

	/// Encodes a pooled value as a `Value` message. `Null`, which only enters the pool when read
	/// from an empty message, is written back as an empty message.
	pub fn value_to_blob(value: &AttributeValue) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		match value {
			AttributeValue::String(s) => {
				writer.write_pbf_key(1, WIRE_LEN)?;
				writer.write_pbf_string(s).context("Failed to write string value")?;
			}
			AttributeValue::Float(f) => {
				writer.write_pbf_key(2, WIRE_FIXED32)?;
				writer.write_f32(*f).context("Failed to write float value")?;
			}
			AttributeValue::Double(f) => {
				writer.write_pbf_key(3, WIRE_FIXED64)?;
				writer.write_f64(*f).context("Failed to write double value")?;
			}
			AttributeValue::UInt(u) => {
				writer.write_pbf_key(5, WIRE_VARINT)?;
				writer.write_varint(*u).context("Failed to write uint value")?;
			}
			AttributeValue::Int(s) => {
				writer.write_pbf_key(6, WIRE_VARINT)?;
				writer.write_svarint(*s).context("Failed to write int value")?;
			}
			AttributeValue::Bool(b) => {
				writer.write_pbf_key(7, WIRE_VARINT)?;
				writer.write_varint(u64::from(*b)).context("Failed to write bool value")?;
			}
			AttributeValue::Null => {}
			other => bail!("{} values cannot be stored in a legacy value pool", other.type_name()),
		}

		Ok(writer.into_blob())
	}
}

impl AttributeEncoding for LegacyPool {
	fn encode(&mut self, keys: &mut Lookup<String>, attributes: &mut Attributes, _scalings: &[AttributeScaling]) -> Vec<u64> {
		let mut tags = Vec::with_capacity(attributes.len() * 2);
		attributes.retain(|key, value| {
			if !LegacyPool::is_supported(value) {
				debug!("dropping attribute '{key}': {} values need a version 3 layer", value.type_name());
				return false;
			}
			tags.push(u64::from(keys.add(key.clone())));
			tags.push(u64::from(self.values.add(value.clone())));
			true
		});
		tags
	}

	fn decode(&self, keys: &Lookup<String>, data: &[u64], _scalings: &[AttributeScaling]) -> Result<Attributes> {
		if data.len() % 2 != 0 {
			bail!(VectorTileError::MalformedAttributes(format!(
				"tag list has odd length {}",
				data.len()
			)));
		}
		let mut attributes = Attributes::new();
		for (key, value) in data.iter().tuples() {
			let key = keys.get(*key).context("Failed to resolve attribute key")?;
			let value = self.values.get(*value).context("Failed to resolve attribute value")?;
			attributes.insert(key.clone(), value.clone());
		}
		Ok(attributes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attributes::ScaledFloatList;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn encode(pool: &mut LegacyPool, keys: &mut Lookup<String>, attributes: &mut Attributes) -> Vec<u64> {
		pool.encode(keys, attributes, &[])
	}

	#[test]
	fn shared_values_are_pooled_once() -> Result<()> {
		let mut pool = LegacyPool::default();
		let mut keys = Lookup::default();
		let mut attributes = Attributes::from(vec![("a", 1), ("b", 1)]);

		let tags = encode(&mut pool, &mut keys, &mut attributes);
		assert_eq!(tags, vec![0, 0, 1, 0]);
		assert_eq!(pool.values(), &[AttributeValue::Int(1)]);
		assert_eq!(pool.decode(&keys, &tags, &[])?, attributes);
		Ok(())
	}

	#[test]
	fn equal_values_of_different_types_are_separate() {
		let mut pool = LegacyPool::default();
		let mut keys = Lookup::default();
		let mut attributes = Attributes::new();
		attributes.insert("int", 1i64);
		attributes.insert("uint", 1u64);
		attributes.insert("float", 1.0f32);
		attributes.insert("double", 1.0f64);

		encode(&mut pool, &mut keys, &mut attributes);
		assert_eq!(pool.values().len(), 4);
	}

	#[test]
	fn unsupported_values_are_dropped_from_caller_map() -> Result<()> {
		let mut pool = LegacyPool::default();
		let mut keys = Lookup::default();
		let mut attributes = Attributes::new();
		attributes.insert("name", "road");
		attributes.insert("list", vec![AttributeValue::Int(1)]);
		attributes.insert("map", Attributes::from(vec![("x", 1)]));
		attributes.insert("nothing", AttributeValue::Null);
		attributes.insert("scaled", ScaledFloatList::new(0, vec![Some(1.0)]));

		let tags = encode(&mut pool, &mut keys, &mut attributes);
		assert_eq!(attributes, Attributes::from(vec![("name", "road")]));
		assert_eq!(keys.len(), 1);
		assert_eq!(pool.decode(&keys, &tags, &[])?, attributes);
		Ok(())
	}

	#[rstest]
	#[case(&[0], "odd length")]
	#[case(&[0, 5], "out of range")]
	#[case(&[3, 0], "out of range")]
	fn malformed_tags(#[case] tags: &[u64], #[case] message: &str) {
		let mut pool = LegacyPool::default();
		let mut keys = Lookup::default();
		encode(&mut pool, &mut keys, &mut Attributes::from(vec![("a", true)]));
		let error = pool.decode(&keys, tags, &[]).unwrap_err();
		assert!(format!("{error:#}").contains(message), "{error:#}");
	}

	#[rstest]
	#[case(AttributeValue::from("hello"), &[0x0A, 0x05, b'h', b'e', b'l', b'l', b'o'])]
	#[case(AttributeValue::Float(1.0), &[0x15, 0x00, 0x00, 0x80, 0x3F])]
	#[case(AttributeValue::Double(1.0), &[0x19, 0, 0, 0, 0, 0, 0, 0xF0, 0x3F])]
	#[case(AttributeValue::UInt(300), &[0x28, 0xAC, 0x02])]
	#[case(AttributeValue::Int(-75), &[0x30, 0x95, 0x01])]
	#[case(AttributeValue::Bool(true), &[0x38, 0x01])]
	fn value_messages(#[case] value: AttributeValue, #[case] bytes: &[u8]) -> Result<()> {
		assert_eq!(LegacyPool::value_to_blob(&value)?.as_slice(), bytes);
		assert_eq!(LegacyPool::read_value(&mut PbfReader::new(bytes))?, value);
		Ok(())
	}

	#[test]
	fn int64_field_is_read_as_int() -> Result<()> {
		let bytes = [0x20, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
		assert_eq!(LegacyPool::read_value(&mut PbfReader::new(&bytes))?, AttributeValue::Int(-1));
		Ok(())
	}

	#[test]
	fn float32_precision_is_kept() -> Result<()> {
		let blob = LegacyPool::value_to_blob(&AttributeValue::Float(23432.3232))?;
		assert_eq!(
			LegacyPool::read_value(&mut PbfReader::new(blob.as_slice()))?,
			AttributeValue::Float(23432.322_265_625)
		);
		Ok(())
	}

	#[test]
	fn empty_value_message_reads_as_null() -> Result<()> {
		assert_eq!(LegacyPool::read_value(&mut PbfReader::new(&[]))?, AttributeValue::Null);
		// unknown field 9 only
		assert_eq!(
			LegacyPool::read_value(&mut PbfReader::new(&[0x48, 0x01]))?,
			AttributeValue::Null
		);
		assert!(LegacyPool::value_to_blob(&AttributeValue::Null)?.is_empty());
		assert!(LegacyPool::value_to_blob(&AttributeValue::List(vec![])).is_err());

		let pool = LegacyPool::new(vec![AttributeValue::Null]);
		let keys = Lookup::new(vec!["k".to_string()]);
		assert_eq!(
			pool.decode(&keys, &[0, 0], &[])?,
			Attributes::from(vec![("k", AttributeValue::Null)])
		);
		Ok(())
	}

	#[test]
	fn signed_zeros_are_pooled_separately() {
		let mut pool = LegacyPool::default();
		let mut keys = Lookup::default();
		let mut attributes = Attributes::new();
		attributes.insert("a", 0.0f64);
		attributes.insert("b", -0.0f64);
		attributes.insert("c", 0.0f64);

		let tags = encode(&mut pool, &mut keys, &mut attributes);
		assert_eq!(tags, vec![0, 0, 1, 1, 2, 0]);
		assert_eq!(pool.values().len(), 2);
	}
}

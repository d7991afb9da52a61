//! Attribute scalings: precision-bounded affine quantization of floating point values.
//!
//! A scaling maps a real number `v` to an integer `i` with
//! `v ≈ base + multiplier · (i + offset)`. [`AttributeScaling::compute`] picks a power of two
//! multiplier small enough that every value inside `[min, max]` survives the round trip with an
//! absolute error strictly below the requested precision.
//!
//! Scaled lists are stored delta coded and zigzag mapped, which keeps sorted or slowly changing
//! series down to a few bytes per entry.

use crate::{VectorTileError, zigzag};
use anyhow::{Context, Result, bail};
use vector_tile_pbf::{Blob, PbfReader, PbfWriter, WIRE_FIXED64, WIRE_VARINT};

/// Quantization parameters of a layer.
///
/// Equality covers the index and the stored parameters; the precision and range a scaling
/// was computed from are not written to the wire.
#[derive(Clone, Debug)]
pub struct AttributeScaling {
	index: u32,
	offset: i64,
	multiplier: f64,
	base: f64,
	precision: Option<f64>,
	range: Option<(f64, f64)>,
}

impl PartialEq for AttributeScaling {
	fn eq(&self, other: &Self) -> bool {
		self.index == other.index
			&& self.offset == other.offset
			&& self.multiplier == other.multiplier
			&& self.base == other.base
	}
}

impl AttributeScaling {
	/// Derives a scaling for values in `[min, max]` with an absolute error below `precision`.
	///
	/// # Errors
	/// [`VectorTileError::InvalidScalingConfig`] if `precision` is not inside `(0, 1)`, if any
	/// argument is not finite, or if `max` is not greater than `min`.
	pub fn compute(precision: f64, min: f64, max: f64) -> Result<AttributeScaling> {
		if !(precision.is_finite() && min.is_finite() && max.is_finite()) {
			bail!(VectorTileError::InvalidScalingConfig(format!(
				"arguments must be finite (precision {precision}, min {min}, max {max})"
			)));
		}
		if precision <= 0.0 || precision >= 1.0 {
			bail!(VectorTileError::InvalidScalingConfig(format!(
				"precision must be greater than 0 and less than 1, got {precision}"
			)));
		}
		if max <= min {
			bail!(VectorTileError::InvalidScalingConfig(format!(
				"max ({max}) must be greater than min ({min})"
			)));
		}

		let span = max - min;
		// number of bits needed to address every step of `precision` inside the span, rounded up to whole bytes
		let bits = ((span / precision).log2() + 1.0).ceil().max(1.0);
		let bytes = (bits / 8.0).ceil();
		if bytes > 8.0 {
			bail!(VectorTileError::InvalidScalingConfig(format!(
				"range [{min}, {max}] at precision {precision} needs more than 64 bits"
			)));
		}
		let value_pow = span.log2().ceil();
		let integer_pow = 8.0 * bytes - 1.0;
		let multiplier = (value_pow - integer_pow).exp2();

		Ok(AttributeScaling {
			index: 0,
			offset: 0,
			multiplier,
			base: min,
			precision: Some(precision),
			range: Some((min, max)),
		})
	}

	/// Creates a scaling from explicit parameters.
	///
	/// # Errors
	/// [`VectorTileError::InvalidScalingConfig`] if `multiplier` is zero or any value is not finite.
	pub fn new(offset: i64, multiplier: f64, base: f64) -> Result<AttributeScaling> {
		if !(multiplier.is_finite() && base.is_finite()) || multiplier == 0.0 {
			bail!(VectorTileError::InvalidScalingConfig(format!(
				"multiplier must be finite and non-zero and base finite (multiplier {multiplier}, base {base})"
			)));
		}
		Ok(AttributeScaling {
			index: 0,
			offset,
			multiplier,
			base,
			precision: None,
			range: None,
		})
	}

	/// Position of this scaling in its layer's scaling list.
	#[must_use]
	pub fn index(&self) -> u32 {
		self.index
	}

	pub(crate) fn with_index(mut self, index: u32) -> AttributeScaling {
		self.index = index;
		self
	}

	#[must_use]
	pub fn offset(&self) -> i64 {
		self.offset
	}

	#[must_use]
	pub fn multiplier(&self) -> f64 {
		self.multiplier
	}

	#[must_use]
	pub fn base(&self) -> f64 {
		self.base
	}

	/// The precision this scaling was computed for; `None` for explicit or decoded scalings.
	#[must_use]
	pub fn precision(&self) -> Option<f64> {
		self.precision
	}

	/// The `(min, max)` range this scaling was computed for; `None` for explicit or decoded scalings.
	#[must_use]
	pub fn range(&self) -> Option<(f64, f64)> {
		self.range
	}

	/// Quantizes a single value: `round((value - base) / multiplier) - offset`.
	///
	/// Values outside the declared range are still encoded, without the precision guarantee.
	#[must_use]
	pub fn encode_value(&self, value: f64) -> i64 {
		(((value - self.base) / self.multiplier).round() as i64).wrapping_sub(self.offset)
	}

	/// Inverse of [`encode_value`](Self::encode_value): `multiplier · (integer + offset) + base`.
	#[must_use]
	pub fn decode_value(&self, integer: i64) -> f64 {
		self.multiplier * ((i128::from(integer) + i128::from(self.offset)) as f64) + self.base
	}

	/// Quantizes, delta codes and zigzag maps a list of optional values.
	///
	/// Absent entries are written as `0`, present ones as `zigzag(delta) + 1`; absent entries
	/// do not advance the delta base.
	#[must_use]
	pub fn encode_values(&self, values: &[Option<f64>]) -> Vec<u64> {
		let mut previous = 0i64;
		values
			.iter()
			.map(|value| match value {
				None => 0,
				Some(v) => {
					let integer = self.encode_value(*v);
					let code = zigzag::encode(integer.wrapping_sub(previous));
					previous = integer;
					code.wrapping_add(1)
				}
			})
			.collect()
	}

	/// Inverse of [`encode_values`](Self::encode_values).
	#[must_use]
	pub fn decode_values(&self, data: &[u64]) -> Vec<Option<f64>> {
		let mut previous = 0i64;
		data
			.iter()
			.map(|code| {
				if *code == 0 {
					None
				} else {
					previous = previous.wrapping_add(zigzag::decode(code - 1));
					Some(self.decode_value(previous))
				}
			})
			.collect()
	}

	/// Reads a scaling message (`offset` sint64, `multiplier` double, `base` double).
	pub(crate) fn read(reader: &mut PbfReader<'_>, index: u32) -> Result<AttributeScaling> {
		let mut offset = 0;
		let mut multiplier = 1.0;
		let mut base = 0.0;

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_VARINT) => offset = reader.read_svarint().context("Failed to read scaling offset")?,
				(2, WIRE_FIXED64) => multiplier = reader.read_f64().context("Failed to read scaling multiplier")?,
				(3, WIRE_FIXED64) => base = reader.read_f64().context("Failed to read scaling base")?,
				(f, w) => {
					log::trace!("skipping unknown attribute scaling field {f} (wire type {w})");
					reader.skip_field(w)?;
				}
			}
		}

		Ok(AttributeScaling::new(offset, multiplier, base)?.with_index(index))
	}

	pub(crate) fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();
		if self.offset != 0 {
			writer.write_pbf_key(1, WIRE_VARINT)?;
			writer.write_svarint(self.offset)?;
		}
		writer.write_pbf_key(2, WIRE_FIXED64)?;
		writer.write_f64(self.multiplier)?;
		if self.base != 0.0 {
			writer.write_pbf_key(3, WIRE_FIXED64)?;
			writer.write_f64(self.base)?;
		}
		Ok(writer.into_blob())
	}
}

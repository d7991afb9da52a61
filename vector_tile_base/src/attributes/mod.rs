//! Attribute values and the two ways a layer stores them.
//!
//! - [`legacy`]: one flat pool of `Value` messages, referenced by `(key, value)` index pairs.
//!   Used by version 2 layers.
//! - [`inline`]: typed banks plus inline complex values, supporting nulls, lists, maps and
//!   scaled float lists. Used by version 3 layers.
//!
//! Both implement [`AttributeEncoding`]; a layer holds one of them as a [`ValuePool`].

mod inline;
mod legacy;
mod lookup;
mod value;

use crate::AttributeScaling;
use anyhow::Result;
pub use inline::InlinePool;
pub use legacy::LegacyPool;
pub use lookup::Lookup;
pub use value::{AttributeValue, Attributes, ScaledFloatList};

/// Translation between an attribute map and the integer list stored on a feature.
pub trait AttributeEncoding {
	/// Encodes `attributes`, interning keys and values into the layer's tables.
	///
	/// Entries that cannot be represented are dropped silently and removed from `attributes`,
	/// so afterwards the map equals what decoding the result will produce.
	fn encode(&mut self, keys: &mut Lookup<String>, attributes: &mut Attributes, scalings: &[AttributeScaling]) -> Vec<u64>;

	fn decode(&self, keys: &Lookup<String>, data: &[u64], scalings: &[AttributeScaling]) -> Result<Attributes>;
}

/// The value storage of a layer, fixed when the layer is created or read.
#[derive(Clone, Debug, PartialEq)]
pub enum ValuePool {
	Legacy(LegacyPool),
	Inline(InlinePool),
}

impl ValuePool {
	/// Version 3 and newer layers use inline values.
	pub fn for_version(version: u32) -> ValuePool {
		if version >= 3 {
			ValuePool::Inline(InlinePool::default())
		} else {
			ValuePool::Legacy(LegacyPool::default())
		}
	}

	pub fn is_inline(&self) -> bool {
		matches!(self, ValuePool::Inline(_))
	}

	fn encoding(&self) -> &dyn AttributeEncoding {
		match self {
			ValuePool::Legacy(pool) => pool,
			ValuePool::Inline(pool) => pool,
		}
	}

	fn encoding_mut(&mut self) -> &mut dyn AttributeEncoding {
		match self {
			ValuePool::Legacy(pool) => pool,
			ValuePool::Inline(pool) => pool,
		}
	}
}

impl AttributeEncoding for ValuePool {
	fn encode(&mut self, keys: &mut Lookup<String>, attributes: &mut Attributes, scalings: &[AttributeScaling]) -> Vec<u64> {
		self.encoding_mut().encode(keys, attributes, scalings)
	}

	fn decode(&self, keys: &Lookup<String>, data: &[u64], scalings: &[AttributeScaling]) -> Result<Attributes> {
		self.encoding().decode(keys, data, scalings)
	}
}

/// Decoded attributes of a feature, materialized on first read.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AttributeCache {
	#[default]
	Stale,
	Fresh(Attributes),
}

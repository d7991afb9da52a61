use std::{
	collections::{BTreeMap, btree_map},
	fmt::Debug,
	hash::{Hash, Hasher},
};

/// A list of optional doubles quantized through one of the layer's attribute scalings.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledFloatList {
	/// Index of the [`AttributeScaling`](crate::AttributeScaling) inside the layer.
	pub scaling: u32,
	pub values: Vec<Option<f64>>,
}

impl ScaledFloatList {
	#[must_use]
	pub fn new(scaling: u32, values: Vec<Option<f64>>) -> ScaledFloatList {
		ScaledFloatList { scaling, values }
	}
}

/// A single attribute value.
///
/// Floats compare and hash by bit pattern, so `0.0` and `-0.0` are distinct and `NaN`
/// equals itself.
#[derive(Clone)]
pub enum AttributeValue {
	Bool(bool),
	String(String),
	Float(f32),
	Double(f64),
	Int(i64),
	UInt(u64),
	Null,
	List(Vec<AttributeValue>),
	Map(Attributes),
	ScaledFloatList(ScaledFloatList),
}

impl AttributeValue {
	/// Short name of the variant, used in error messages.
	#[must_use]
	pub fn type_name(&self) -> &'static str {
		match self {
			AttributeValue::Bool(_) => "bool",
			AttributeValue::String(_) => "string",
			AttributeValue::Float(_) => "float",
			AttributeValue::Double(_) => "double",
			AttributeValue::Int(_) => "int",
			AttributeValue::UInt(_) => "uint",
			AttributeValue::Null => "null",
			AttributeValue::List(_) => "list",
			AttributeValue::Map(_) => "map",
			AttributeValue::ScaledFloatList(_) => "scaled float list",
		}
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttributeValue::String(s) => Some(s),
			_ => None,
		}
	}

	/// Returns `true` for values made of a single scalar (no list, map or scaled list).
	#[must_use]
	pub fn is_scalar(&self) -> bool {
		!matches!(
			self,
			AttributeValue::List(_) | AttributeValue::Map(_) | AttributeValue::ScaledFloatList(_)
		)
	}
}

impl Debug for AttributeValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Self::String(v) => f.debug_tuple("String").field(v).finish(),
			Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
			Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
			Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
			Self::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
			Self::Null => f.write_str("Null"),
			Self::List(v) => f.debug_list().entries(v).finish(),
			Self::Map(v) => v.fmt(f),
			Self::ScaledFloatList(v) => v.fmt(f),
		}
	}
}

impl PartialEq for AttributeValue {
	fn eq(&self, other: &Self) -> bool {
		use AttributeValue::*;
		match (self, other) {
			(Bool(a), Bool(b)) => a == b,
			(String(a), String(b)) => a == b,
			(Float(a), Float(b)) => a.to_bits() == b.to_bits(),
			(Double(a), Double(b)) => a.to_bits() == b.to_bits(),
			(Int(a), Int(b)) => a == b,
			(UInt(a), UInt(b)) => a == b,
			(Null, Null) => true,
			(List(a), List(b)) => a == b,
			(Map(a), Map(b)) => a == b,
			(ScaledFloatList(a), ScaledFloatList(b)) => {
				a.scaling == b.scaling
					&& a.values.len() == b.values.len()
					&& a
						.values
						.iter()
						.zip(&b.values)
						.all(|(x, y)| x.map(f64::to_bits) == y.map(f64::to_bits))
			}
			_ => false,
		}
	}
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
	fn hash<H: Hasher>(&self, state: &mut H) {
		core::mem::discriminant(self).hash(state);
		match self {
			AttributeValue::Bool(v) => v.hash(state),
			AttributeValue::String(v) => v.hash(state),
			AttributeValue::Float(v) => v.to_bits().hash(state),
			AttributeValue::Double(v) => v.to_bits().hash(state),
			AttributeValue::Int(v) => v.hash(state),
			AttributeValue::UInt(v) => v.hash(state),
			AttributeValue::Null => (),
			AttributeValue::List(v) => v.hash(state),
			AttributeValue::Map(v) => v.hash(state),
			AttributeValue::ScaledFloatList(v) => {
				v.scaling.hash(state);
				for value in &v.values {
					value.map(f64::to_bits).hash(state);
				}
			}
		}
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		AttributeValue::String(value.to_string())
	}
}

impl From<&String> for AttributeValue {
	fn from(value: &String) -> Self {
		AttributeValue::String(value.clone())
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		AttributeValue::String(value)
	}
}

impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		AttributeValue::Bool(value)
	}
}

impl From<i32> for AttributeValue {
	fn from(value: i32) -> Self {
		AttributeValue::Int(i64::from(value))
	}
}

impl From<i64> for AttributeValue {
	fn from(value: i64) -> Self {
		AttributeValue::Int(value)
	}
}

impl From<u32> for AttributeValue {
	fn from(value: u32) -> Self {
		AttributeValue::UInt(u64::from(value))
	}
}

impl From<u64> for AttributeValue {
	fn from(value: u64) -> Self {
		AttributeValue::UInt(value)
	}
}

impl From<f32> for AttributeValue {
	fn from(value: f32) -> Self {
		AttributeValue::Float(value)
	}
}

impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		AttributeValue::Double(value)
	}
}

impl From<Vec<AttributeValue>> for AttributeValue {
	fn from(value: Vec<AttributeValue>) -> Self {
		AttributeValue::List(value)
	}
}

impl From<Attributes> for AttributeValue {
	fn from(value: Attributes) -> Self {
		AttributeValue::Map(value)
	}
}

impl From<ScaledFloatList> for AttributeValue {
	fn from(value: ScaledFloatList) -> Self {
		AttributeValue::ScaledFloatList(value)
	}
}

/// String keyed attribute map, ordered by key.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Attributes {
	entries: BTreeMap<String, AttributeValue>,
}

impl Attributes {
	#[must_use]
	pub fn new() -> Attributes {
		Attributes::default()
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Option<AttributeValue> {
		self.entries.insert(key.into(), value.into())
	}

	pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
		self.entries.remove(key)
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&AttributeValue> {
		self.entries.get(key)
	}

	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, AttributeValue> {
		self.entries.iter()
	}

	pub fn keys(&self) -> impl Iterator<Item = &String> + '_ {
		self.entries.keys()
	}

	/// Keeps only the entries for which `keep` returns `true`.
	pub fn retain(&mut self, keep: impl FnMut(&String, &mut AttributeValue) -> bool) {
		self.entries.retain(keep);
	}
}

impl IntoIterator for Attributes {
	type Item = (String, AttributeValue);
	type IntoIter = btree_map::IntoIter<String, AttributeValue>;
	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

impl<'a> IntoIterator for &'a Attributes {
	type Item = (&'a String, &'a AttributeValue);
	type IntoIter = btree_map::Iter<'a, String, AttributeValue>;
	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Attributes {
			entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

impl<K: Into<String>, V: Into<AttributeValue>> From<Vec<(K, V)>> for Attributes {
	fn from(value: Vec<(K, V)>) -> Self {
		value.into_iter().collect()
	}
}

impl Debug for Attributes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(&self.entries).finish()
	}
}

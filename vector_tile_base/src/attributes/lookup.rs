use crate::VectorTileError;
use anyhow::{Result, anyhow};
use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// Append only list with a reverse index, used for key tables and value banks.
///
/// Adding an entry that is already present returns its existing index; indices are
/// never reassigned.
#[derive(Clone, PartialEq)]
pub struct Lookup<T>
where
	T: Clone + Eq + Hash,
{
	list: Vec<T>,
	map: HashMap<T, u32>,
}

impl<T> Lookup<T>
where
	T: Clone + Debug + Eq + Hash,
{
	/// Builds a lookup from decoded entries; duplicates keep their positions.
	pub fn new(list: Vec<T>) -> Lookup<T> {
		let mut map = HashMap::with_capacity(list.len());
		for (index, entry) in list.iter().enumerate() {
			#[allow(clippy::cast_possible_truncation)]
			map.entry(entry.clone()).or_insert(index as u32);
		}
		Lookup { list, map }
	}

	pub fn add(&mut self, entry: T) -> u32 {
		if let Some(index) = self.map.get(&entry) {
			return *index;
		}
		#[allow(clippy::cast_possible_truncation)]
		let index = self.list.len() as u32;
		self.map.insert(entry.clone(), index);
		self.list.push(entry);
		index
	}

	pub fn find(&self, entry: &T) -> Option<u32> {
		self.map.get(entry).copied()
	}

	pub fn get(&self, index: u64) -> Result<&T> {
		usize::try_from(index)
			.ok()
			.and_then(|i| self.list.get(i))
			.ok_or_else(|| {
				anyhow!(VectorTileError::MalformedAttributes(format!(
					"index {index} is out of range for a table of {} entries",
					self.list.len()
				)))
			})
	}

	pub fn as_slice(&self) -> &[T] {
		&self.list
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.list.iter()
	}

	pub fn len(&self) -> usize {
		self.list.len()
	}

	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}
}

impl<T: Clone + Debug + Eq + Hash> Default for Lookup<T> {
	fn default() -> Lookup<T> {
		Lookup::new(vec![])
	}
}

impl<T> Debug for Lookup<T>
where
	T: Clone + Debug + Eq + Hash,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.list).finish()
	}
}

//! This module provides the [`Blob`] struct, a thin wrapper around [`Vec<u8>`] holding encoded tile data.

use std::fmt::{Debug, Write};

/// An owned buffer of encoded bytes.
///
/// # Examples
///
/// ```rust
/// use vector_tile_pbf::Blob;
///
/// let blob = Blob::from(vec![0x1A, 0x00]);
/// assert_eq!(blob.len(), 2);
/// assert_eq!(blob.as_slice(), &[0x1A, 0x00]);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	/// Creates an empty `Blob`.
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Returns the contents as a byte slice.
	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	/// Consumes the `Blob` and returns the underlying vector.
	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Number of bytes in the `Blob`.
	#[must_use]
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Lowercase hex dump, space separated.
	#[must_use]
	pub fn as_hex(&self) -> String {
		let mut text = String::with_capacity(self.0.len() * 3);
		for (i, byte) in self.0.iter().enumerate() {
			if i > 0 {
				text.push(' ');
			}
			let _ = write!(text, "{byte:02x}");
		}
		text
	}
}

impl From<Vec<u8>> for Blob {
	fn from(vec: Vec<u8>) -> Self {
		Blob(vec)
	}
}

impl From<&[u8]> for Blob {
	fn from(slice: &[u8]) -> Self {
		Blob(slice.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(array: &[u8; N]) -> Self {
		Blob(array.to_vec())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Blob({}): {}", self.0.len(), self.as_hex())
	}
}

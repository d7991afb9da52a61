use std::fmt::Display;

/// Geometry kind of a feature, written as the feature's `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
	Point = 1,
	LineString = 2,
	Polygon = 3,
	Curve = 4,
}

impl FeatureKind {
	#[must_use]
	pub fn as_u64(self) -> u64 {
		self as u64
	}

	/// Maps a wire value to a kind; `None` for unknown types.
	#[must_use]
	pub fn from_u64(value: u64) -> Option<FeatureKind> {
		match value {
			1 => Some(FeatureKind::Point),
			2 => Some(FeatureKind::LineString),
			3 => Some(FeatureKind::Polygon),
			4 => Some(FeatureKind::Curve),
			_ => None,
		}
	}

	/// Oldest layer version able to hold this kind.
	#[must_use]
	pub fn min_version(self) -> u32 {
		match self {
			FeatureKind::Curve => 3,
			_ => 1,
		}
	}
}

impl Display for FeatureKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			FeatureKind::Point => "point",
			FeatureKind::LineString => "line string",
			FeatureKind::Polygon => "polygon",
			FeatureKind::Curve => "curve",
		})
	}
}

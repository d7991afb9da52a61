//! Geometry encoding.
//!
//! - [`command`]: command integers (MoveTo, LineTo, ClosePath).
//! - [`codec`]: per feature command streams with a persistent cursor.
//! - [`rings`]: ring winding and grouping of rings into polygons.

mod codec;
mod command;
mod rings;

pub(crate) use codec::CommandStream;
pub use codec::{Coordinates, LineStrings, Points, Polygons};
pub use rings::{assemble, is_clockwise};

/// Decoded geometry of a feature, shaped by its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
	Points(Points),
	LineStrings(LineStrings),
	Polygons(Polygons),
	Curve {
		control_points: Points,
		knots: Vec<f64>,
		degree: u32,
	},
}

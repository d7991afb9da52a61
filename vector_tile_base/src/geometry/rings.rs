use super::codec::{Points, Polygons};
use log::trace;

/// Returns `true` if a ring winds clockwise, i.e. its shoelace sum
/// `Σ(x_i·y_{i+1} − y_i·x_{i+1})` is negative.
///
/// Winding is only defined for two dimensional rings; rings with more
/// dimensions, or with points lacking a coordinate, are never clockwise.
pub fn is_clockwise<P: AsRef<[i64]>>(ring: &[P], dimensions: usize) -> bool {
	if dimensions != 2 || ring.len() < 3 {
		return false;
	}
	if ring.iter().any(|point| point.as_ref().len() < 2) {
		return false;
	}

	let mut sum: i128 = 0;
	let mut add = |a: &[i64], b: &[i64]| {
		sum += i128::from(a[0]) * i128::from(b[1]) - i128::from(a[1]) * i128::from(b[0]);
	};
	for pair in ring.windows(2) {
		add(pair[0].as_ref(), pair[1].as_ref());
	}
	let (first, last) = (ring[0].as_ref(), ring[ring.len() - 1].as_ref());
	if first != last {
		add(last, first);
	}

	sum < 0
}

/// Groups a flat ring list into polygons.
///
/// A ring that is not clockwise opens a new polygon; a clockwise ring becomes a hole of the
/// polygon opened last. Holes that appear before any exterior ring are dropped.
pub fn assemble(rings: Vec<Points>, dimensions: usize) -> Polygons {
	let mut polygons: Polygons = Vec::new();
	for ring in rings {
		if !is_clockwise(&ring, dimensions) {
			polygons.push(vec![ring]);
		} else if let Some(polygon) = polygons.last_mut() {
			polygon.push(ring);
		} else {
			trace!("dropping hole with {} points that precedes every exterior ring", ring.len());
		}
	}
	polygons
}

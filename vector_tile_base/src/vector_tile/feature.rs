//! Vector tile **features**.
//!
//! A [`Feature`] owns its command stream and everything else that needs no layer context:
//! id, kind, dimensions, curve knots and degree. Attributes live in the layer's key table and
//! value pool, so they are reached through [`FeatureMut`], a handle that borrows the feature
//! together with those tables.
//!
//! Wire fields of a feature message:
//!  * field 1: `id` (varint)
//!  * field 2: `tags` (packed uint32, legacy attributes)
//!  * field 3: `type` (varint, see [`FeatureKind`])
//!  * field 4: `geometry` (packed, two dimensional)
//!  * field 5: `attributes` (packed, inline attributes)
//!  * field 6: `geometry` (packed, three dimensional)
//!  * field 7: `string_id` (string)
//!  * field 8: `knots` (packed double)
//!  * field 9: `degree` (varint, default 2)
//!  * field 10: `knot_scaling` (varint)
//!  * field 11: `scaled_knots` (packed)

use super::FeatureKind;
use crate::{
	AttributeScaling, DEFAULT_CURVE_DEGREE, VectorTileError,
	attributes::{AttributeCache, AttributeEncoding, AttributeValue, Attributes, Lookup, ValuePool},
	geometry::{CommandStream, Geometry, LineStrings, Points, Polygons, assemble},
};
use anyhow::{Context, Result, anyhow, bail, ensure};
use log::trace;
use std::ops::{Deref, DerefMut};
use vector_tile_pbf::{Blob, PbfReader, PbfWriter, WIRE_LEN, WIRE_VARINT};

/// Identifier of a feature. String ids need a version 3 layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureId {
	Integer(u64),
	String(String),
}

impl From<u64> for FeatureId {
	fn from(value: u64) -> Self {
		FeatureId::Integer(value)
	}
}

impl From<&str> for FeatureId {
	fn from(value: &str) -> Self {
		FeatureId::String(value.to_string())
	}
}

impl From<String> for FeatureId {
	fn from(value: String) -> Self {
		FeatureId::String(value)
	}
}

#[derive(Clone, Debug)]
pub struct Feature {
	kind: FeatureKind,
	version: u32,
	id: Option<FeatureId>,
	geometry: CommandStream,
	attribute_data: Vec<u64>,
	attributes: AttributeCache,
	knots: Vec<f64>,
	knot_scaling: Option<u32>,
	degree: u32,
}

impl PartialEq for Feature {
	fn eq(&self, other: &Self) -> bool {
		self.kind == other.kind
			&& self.id == other.id
			&& self.geometry == other.geometry
			&& self.attribute_data == other.attribute_data
			&& self.knots == other.knots
			&& self.knot_scaling == other.knot_scaling
			&& self.degree == other.degree
	}
}

impl Feature {
	pub(crate) fn new(kind: FeatureKind, dimensions: u8, version: u32) -> Feature {
		Feature {
			kind,
			version,
			id: None,
			geometry: CommandStream::new(usize::from(dimensions)),
			attribute_data: Vec::new(),
			attributes: AttributeCache::Fresh(Attributes::new()),
			knots: Vec::new(),
			knot_scaling: None,
			degree: DEFAULT_CURVE_DEGREE,
		}
	}

	#[must_use]
	pub fn kind(&self) -> FeatureKind {
		self.kind
	}

	/// Number of values per coordinate, 2 or 3.
	#[must_use]
	pub fn dimensions(&self) -> u8 {
		#[allow(clippy::cast_possible_truncation)]
		let dimensions = self.geometry.dimensions() as u8;
		dimensions
	}

	#[must_use]
	pub fn id(&self) -> Option<&FeatureId> {
		self.id.as_ref()
	}

	/// Sets or clears the id.
	///
	/// # Errors
	/// [`VectorTileError::RequiresVersion3`] for string ids on older layers.
	pub fn set_id(&mut self, id: Option<FeatureId>) -> Result<()> {
		if let Some(FeatureId::String(_)) = id {
			ensure!(self.version >= 3, VectorTileError::RequiresVersion3("string feature ids"));
		}
		self.id = id;
		Ok(())
	}

	/// The raw attribute list: `(key, value)` index pairs or inline complex values.
	#[must_use]
	pub fn attribute_data(&self) -> &[u64] {
		&self.attribute_data
	}

	pub(crate) fn cached_attributes(&self) -> Option<&Attributes> {
		match &self.attributes {
			AttributeCache::Fresh(attributes) => Some(attributes),
			AttributeCache::Stale => None,
		}
	}

	/// The raw command integers.
	#[must_use]
	pub fn geometry_data(&self) -> &[u64] {
		self.geometry.data()
	}

	fn expect_kind(&self, expected: FeatureKind) -> Result<()> {
		ensure!(
			self.kind == expected,
			VectorTileError::WrongFeatureKind {
				expected,
				actual: self.kind
			}
		);
		Ok(())
	}

	/// Appends points to a point feature. All points share a single MoveTo command.
	pub fn add_points<P: AsRef<[i64]>>(&mut self, points: &[P]) -> Result<()> {
		self.expect_kind(FeatureKind::Point)?;
		self.geometry.push_points(points)
	}

	pub fn get_points(&self) -> Result<Points> {
		self.expect_kind(FeatureKind::Point)?;
		self.geometry.decode_points()
	}

	/// Appends one line string of at least two points.
	pub fn add_line_string<P: AsRef<[i64]>>(&mut self, line_string: &[P]) -> Result<()> {
		self.expect_kind(FeatureKind::LineString)?;
		self.geometry.push_line(line_string, FeatureKind::LineString)
	}

	pub fn get_line_strings(&self) -> Result<LineStrings> {
		self.expect_kind(FeatureKind::LineString)?;
		self.geometry.decode_groups(false)
	}

	/// Appends one ring. Exterior rings must wind counterclockwise, holes clockwise.
	pub fn add_ring<P: AsRef<[i64]>>(&mut self, ring: &[P]) -> Result<()> {
		self.expect_kind(FeatureKind::Polygon)?;
		self.geometry.push_ring(ring)
	}

	/// All rings in stream order, each closed by a copy of its first point.
	pub fn get_rings(&self) -> Result<Vec<Points>> {
		self.expect_kind(FeatureKind::Polygon)?;
		self.geometry.decode_groups(true)
	}

	/// Rings grouped into polygons by winding order.
	pub fn get_polygons(&self) -> Result<Polygons> {
		Ok(assemble(self.get_rings()?, self.geometry.dimensions()))
	}

	/// Sets the control points of a curve. A curve holds a single set of control points.
	pub fn add_control_points<P: AsRef<[i64]>>(&mut self, control_points: &[P]) -> Result<()> {
		self.expect_kind(FeatureKind::Curve)?;
		ensure!(
			self.geometry.is_empty(),
			VectorTileError::MalformedGeometry("curve already has control points".to_string())
		);
		self.geometry.push_line(control_points, FeatureKind::Curve)
	}

	pub fn get_control_points(&self) -> Result<Points> {
		self.expect_kind(FeatureKind::Curve)?;
		let mut groups = self.geometry.decode_groups(false)?;
		ensure!(
			groups.len() <= 1,
			VectorTileError::MalformedGeometry(format!("curve has {} control point groups", groups.len()))
		);
		Ok(groups.pop().unwrap_or_default())
	}

	/// Replaces the knot vector with plain doubles.
	pub fn add_knots(&mut self, knots: &[f64]) -> Result<()> {
		self.expect_kind(FeatureKind::Curve)?;
		self.knots = knots.to_vec();
		self.knot_scaling = None;
		Ok(())
	}

	/// Replaces the knot vector with values quantized through `scaling`.
	///
	/// The stored knots are the quantized values, exactly as they decode after a round trip.
	pub fn add_scaled_knots(&mut self, scaling: &AttributeScaling, knots: &[f64]) -> Result<()> {
		self.expect_kind(FeatureKind::Curve)?;
		self.knots = knots
			.iter()
			.map(|knot| scaling.decode_value(scaling.encode_value(*knot)))
			.collect();
		self.knot_scaling = Some(scaling.index());
		Ok(())
	}

	pub fn get_knots(&self) -> Result<&[f64]> {
		self.expect_kind(FeatureKind::Curve)?;
		Ok(&self.knots)
	}

	/// Index of the scaling the knots are stored with, if any.
	#[must_use]
	pub fn knot_scaling(&self) -> Option<u32> {
		self.knot_scaling
	}

	#[must_use]
	pub fn degree(&self) -> u32 {
		self.degree
	}

	pub fn set_degree(&mut self, degree: u32) -> Result<()> {
		self.expect_kind(FeatureKind::Curve)?;
		ensure!(
			degree >= 1,
			VectorTileError::MalformedGeometry("curve degree must be at least 1".to_string())
		);
		self.degree = degree;
		Ok(())
	}

	/// Removes all geometry and resets the cursor. Knots and degree are kept.
	pub fn clear_geometry(&mut self) {
		self.geometry.clear();
	}

	/// Geometry in the shape matching the feature kind.
	pub fn geometry(&self) -> Result<Geometry> {
		Ok(match self.kind {
			FeatureKind::Point => Geometry::Points(self.get_points()?),
			FeatureKind::LineString => Geometry::LineStrings(self.get_line_strings()?),
			FeatureKind::Polygon => Geometry::Polygons(self.get_polygons()?),
			FeatureKind::Curve => Geometry::Curve {
				control_points: self.get_control_points()?,
				knots: self.knots.clone(),
				degree: self.degree,
			},
		})
	}

	/// Reads a feature message.
	///
	/// Returns `None` for features of unknown type, otherwise the feature and whether its
	/// attributes were stored inline.
	pub(crate) fn read(
		reader: &mut PbfReader<'_>,
		version: u32,
		scalings: &[AttributeScaling],
	) -> Result<Option<(Feature, bool)>> {
		let mut id = None;
		let mut kind = 0;
		let mut tags: Vec<u64> = Vec::new();
		let mut inline: Option<Vec<u64>> = None;
		let mut geometry_2d: Vec<u64> = Vec::new();
		let mut geometry_3d: Option<Vec<u64>> = None;
		let mut knots: Vec<f64> = Vec::new();
		let mut degree = DEFAULT_CURVE_DEGREE;
		let mut knot_scaling: Option<u32> = None;
		let mut scaled_knots: Vec<u64> = Vec::new();

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_VARINT) => {
					id = Some(FeatureId::Integer(reader.read_varint().context("Failed to read feature ID")?));
				}
				(2, WIRE_LEN) => tags.extend(
					reader
						.read_pbf_packed_uint32()
						.context("Failed to read tag IDs")?
						.into_iter()
						.map(u64::from),
				),
				(3, WIRE_VARINT) => kind = reader.read_varint().context("Failed to read geometry type")?,
				(4, WIRE_LEN) => geometry_2d.extend(reader.read_pbf_packed_uint64().context("Failed to read geometry")?),
				(5, WIRE_LEN) => inline.get_or_insert_with(Vec::new).extend(
					reader
						.read_pbf_packed_uint64()
						.context("Failed to read inline attributes")?,
				),
				(6, WIRE_LEN) => {
					geometry_3d
						.get_or_insert_with(Vec::new)
						.extend(reader.read_pbf_packed_uint64().context("Failed to read 3D geometry")?);
				}
				(7, WIRE_LEN) => {
					id = Some(FeatureId::String(reader.read_pbf_string().context("Failed to read string ID")?));
				}
				(8, WIRE_LEN) => knots.extend(reader.read_pbf_packed_f64().context("Failed to read knots")?),
				(9, WIRE_VARINT) => {
					degree = u32::try_from(reader.read_varint().context("Failed to read curve degree")?)
						.context("Curve degree out of range")?;
				}
				(10, WIRE_VARINT) => {
					knot_scaling = Some(
						u32::try_from(reader.read_varint().context("Failed to read knot scaling")?)
							.context("Knot scaling index out of range")?,
					);
				}
				(11, WIRE_LEN) => {
					scaled_knots.extend(reader.read_pbf_packed_uint64().context("Failed to read scaled knots")?);
				}
				(f, w) => {
					trace!("skipping unknown feature field {f} (wire type {w})");
					reader.skip_field(w)?;
				}
			}
		}

		let Some(kind) = FeatureKind::from_u64(kind) else {
			trace!("skipping feature of unknown type {kind}");
			return Ok(None);
		};

		let (dimensions, geometry) = if let Some(geometry_3d) = geometry_3d {
			ensure!(
				geometry_2d.is_empty(),
				VectorTileError::MalformedGeometry("feature has both 2D and 3D geometry".to_string())
			);
			ensure!(
				version >= 3,
				VectorTileError::InvalidDimensions { dimensions: 3, version }
			);
			(3, geometry_3d)
		} else {
			(2, geometry_2d)
		};

		if !scaled_knots.is_empty() {
			let index = knot_scaling
				.ok_or_else(|| anyhow!(VectorTileError::MalformedGeometry("scaled knots without a scaling".to_string())))?;
			let scaling = scalings.get(index as usize).ok_or_else(|| {
				anyhow!(VectorTileError::MalformedGeometry(format!(
					"knots reference unknown scaling {index}"
				)))
			})?;
			knots = scaling
				.decode_values(&scaled_knots)
				.into_iter()
				.collect::<Option<Vec<f64>>>()
				.ok_or_else(|| anyhow!(VectorTileError::MalformedGeometry("knot vector contains nulls".to_string())))?;
		} else {
			knot_scaling = None;
		}

		let is_inline = inline.is_some();
		let feature = Feature {
			kind,
			version,
			id,
			geometry: CommandStream::from_data(geometry, dimensions),
			attribute_data: inline.unwrap_or(tags),
			attributes: AttributeCache::Stale,
			knots,
			knot_scaling,
			degree,
		};
		Ok(Some((feature, is_inline)))
	}

	/// Writes the feature message; `inline` selects the attribute field.
	pub(crate) fn to_blob(&self, inline: bool, scalings: &[AttributeScaling]) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		match &self.id {
			Some(FeatureId::Integer(id)) => {
				writer.write_pbf_key(1, WIRE_VARINT)?;
				writer.write_varint(*id).context("Failed to write feature ID")?;
			}
			Some(FeatureId::String(id)) => {
				writer.write_pbf_key(7, WIRE_LEN)?;
				writer.write_pbf_string(id).context("Failed to write string ID")?;
			}
			None => {}
		}

		if !self.attribute_data.is_empty() {
			if inline {
				writer.write_pbf_key(5, WIRE_LEN)?;
				writer
					.write_pbf_packed_uint64(&self.attribute_data)
					.context("Failed to write inline attributes")?;
			} else {
				let tags = self
					.attribute_data
					.iter()
					.map(|tag| u32::try_from(*tag))
					.collect::<Result<Vec<u32>, _>>()
					.context("Tag index does not fit into uint32")?;
				writer.write_pbf_key(2, WIRE_LEN)?;
				writer.write_pbf_packed_uint32(&tags).context("Failed to write tag IDs")?;
			}
		}

		writer.write_pbf_key(3, WIRE_VARINT)?;
		writer
			.write_varint(self.kind.as_u64())
			.context("Failed to write geometry type")?;

		// an empty 3D field still marks the feature as three dimensional
		if self.geometry.dimensions() == 3 {
			writer.write_pbf_key(6, WIRE_LEN)?;
			writer
				.write_pbf_packed_uint64(self.geometry.data())
				.context("Failed to write 3D geometry")?;
		} else if !self.geometry.is_empty() {
			writer.write_pbf_key(4, WIRE_LEN)?;
			writer
				.write_pbf_packed_uint64(self.geometry.data())
				.context("Failed to write geometry")?;
		}

		if self.kind == FeatureKind::Curve {
			if let Some(index) = self.knot_scaling {
				let scaling = scalings
					.get(index as usize)
					.with_context(|| format!("Knots reference unknown scaling {index}"))?;
				let values: Vec<Option<f64>> = self.knots.iter().copied().map(Some).collect();
				writer.write_pbf_key(10, WIRE_VARINT)?;
				writer.write_varint(u64::from(index))?;
				writer.write_pbf_key(11, WIRE_LEN)?;
				writer
					.write_pbf_packed_uint64(&scaling.encode_values(&values))
					.context("Failed to write scaled knots")?;
			} else if !self.knots.is_empty() {
				writer.write_pbf_key(8, WIRE_LEN)?;
				writer.write_pbf_packed_f64(&self.knots).context("Failed to write knots")?;
			}
			if self.degree != DEFAULT_CURVE_DEGREE {
				writer.write_pbf_key(9, WIRE_VARINT)?;
				writer.write_varint(u64::from(self.degree))?;
			}
		}

		Ok(writer.into_blob())
	}
}

fn string_key(key: impl Into<AttributeValue>) -> Result<String> {
	match key.into() {
		AttributeValue::String(key) => Ok(key),
		other => bail!(VectorTileError::AttributeKeyTypeError(other.type_name())),
	}
}

/// A feature borrowed together with its layer's attribute tables.
///
/// Dereferences to [`Feature`] for geometry access.
pub struct FeatureMut<'a> {
	feature: &'a mut Feature,
	keys: &'a mut Lookup<String>,
	pool: &'a mut ValuePool,
	scalings: &'a [AttributeScaling],
}

impl<'a> FeatureMut<'a> {
	pub(crate) fn new(
		feature: &'a mut Feature,
		keys: &'a mut Lookup<String>,
		pool: &'a mut ValuePool,
		scalings: &'a [AttributeScaling],
	) -> FeatureMut<'a> {
		FeatureMut {
			feature,
			keys,
			pool,
			scalings,
		}
	}

	/// The decoded attribute map, decoded on first access and cached afterwards.
	pub fn attributes(&mut self) -> Result<&Attributes> {
		if matches!(self.feature.attributes, AttributeCache::Stale) {
			let decoded = self
				.pool
				.decode(self.keys, &self.feature.attribute_data, self.scalings)
				.context("Failed to decode feature attributes")?;
			self.feature.attributes = AttributeCache::Fresh(decoded);
		}
		match &self.feature.attributes {
			AttributeCache::Fresh(attributes) => Ok(attributes),
			AttributeCache::Stale => bail!("attribute cache was not filled"),
		}
	}

	/// # Errors
	/// [`VectorTileError::AttributeKeyTypeError`] for non-string keys,
	/// [`VectorTileError::AttributeKeyNotFound`] for absent keys.
	pub fn get_attribute(&mut self, key: impl Into<AttributeValue>) -> Result<&AttributeValue> {
		let key = string_key(key)?;
		self
			.attributes()?
			.get(&key)
			.ok_or_else(|| anyhow!(VectorTileError::AttributeKeyNotFound(key)))
	}

	pub fn contains_attribute(&mut self, key: impl Into<AttributeValue>) -> Result<bool> {
		let key = string_key(key)?;
		Ok(self.attributes()?.contains_key(&key))
	}

	/// Sets a single attribute. Values the layer cannot store are dropped silently.
	pub fn set_attribute(&mut self, key: impl Into<AttributeValue>, value: impl Into<AttributeValue>) -> Result<()> {
		let key = string_key(key)?;
		let mut attributes = self.attributes()?.clone();
		attributes.insert(key, value);
		self.set_attributes(&mut attributes);
		Ok(())
	}

	/// Removes a single attribute and returns its value.
	pub fn remove_attribute(&mut self, key: impl Into<AttributeValue>) -> Result<AttributeValue> {
		let key = string_key(key)?;
		let mut attributes = self.attributes()?.clone();
		let value = attributes
			.remove(&key)
			.ok_or_else(|| anyhow!(VectorTileError::AttributeKeyNotFound(key)))?;
		self.set_attributes(&mut attributes);
		Ok(value)
	}

	/// Replaces all attributes.
	///
	/// Entries the layer cannot store are dropped and removed from `attributes`, which then
	/// equals what [`attributes`](Self::attributes) returns.
	pub fn set_attributes(&mut self, attributes: &mut Attributes) {
		self.feature.attribute_data = self.pool.encode(self.keys, attributes, self.scalings);
		self.feature.attributes = AttributeCache::Fresh(attributes.clone());
	}
}

impl Deref for FeatureMut<'_> {
	type Target = Feature;
	fn deref(&self) -> &Feature {
		self.feature
	}
}

impl DerefMut for FeatureMut<'_> {
	fn deref_mut(&mut self) -> &mut Feature {
		self.feature
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn domain_error<T: std::fmt::Debug>(result: Result<T>) -> VectorTileError {
		result
			.unwrap_err()
			.downcast::<VectorTileError>()
			.expect("domain error")
	}

	fn read_back(feature: &Feature, version: u32, scalings: &[AttributeScaling]) -> Result<Feature> {
		let blob = feature.to_blob(version >= 3, scalings)?;
		let (decoded, _) = Feature::read(&mut PbfReader::new(blob.as_slice()), version, scalings)?
			.context("feature has a known type")?;
		Ok(decoded)
	}

	#[test]
	fn points_append_after_decode() -> Result<()> {
		let mut feature = Feature::new(FeatureKind::Point, 2, 2);
		feature.add_points(&[[10, 11], [10, 12]])?;
		assert_eq!(feature.get_points()?, vec![vec![10, 11], vec![10, 12]]);

		let mut decoded = read_back(&feature, 2, &[])?;
		decoded.add_points(&[[10, 13]])?;
		assert_eq!(decoded.get_points()?, vec![vec![10, 11], vec![10, 12], vec![10, 13]]);
		Ok(())
	}

	#[test]
	fn wrong_arity_is_rejected() -> Result<()> {
		let mut feature = Feature::new(FeatureKind::Point, 2, 2);
		assert!(matches!(
			domain_error(feature.add_points(&[[1, 2, 3]])),
			VectorTileError::MalformedGeometry(_)
		));
		assert!(feature.geometry_data().is_empty());
		Ok(())
	}

	#[test]
	fn two_point_ring_is_rejected() {
		let mut feature = Feature::new(FeatureKind::Polygon, 2, 2);
		assert_eq!(
			domain_error(feature.add_ring(&[[0, 0], [5, 5]])),
			VectorTileError::InsufficientPoints {
				kind: FeatureKind::Polygon,
				required: 3,
				actual: 2
			}
		);
	}

	#[test]
	fn polygon_grouping() -> Result<()> {
		let exterior = [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]];
		let hole = [[3, 3], [3, 5], [5, 5], [3, 3]];
		let as_points = |ring: &[[i64; 2]]| ring.iter().map(|p| p.to_vec()).collect::<Points>();

		let mut feature = Feature::new(FeatureKind::Polygon, 2, 2);
		feature.add_ring(&exterior)?;
		feature.add_ring(&hole)?;
		assert_eq!(feature.get_rings()?, vec![as_points(&exterior), as_points(&hole)]);
		assert_eq!(feature.get_polygons()?, vec![vec![as_points(&exterior), as_points(&hole)]]);

		let mut reversed = Feature::new(FeatureKind::Polygon, 2, 2);
		reversed.add_ring(&hole)?;
		reversed.add_ring(&exterior)?;
		assert_eq!(reversed.get_polygons()?, vec![vec![as_points(&exterior)]]);
		Ok(())
	}

	#[rstest]
	#[case(FeatureKind::Point)]
	#[case(FeatureKind::LineString)]
	#[case(FeatureKind::Polygon)]
	fn geometry_calls_check_kind(#[case] kind: FeatureKind) {
		let mut feature = Feature::new(kind, 2, 3);
		let points = [[0, 0], [1, 0], [1, 1]];
		let results = [
			feature.add_points(&points).is_ok(),
			feature.add_line_string(&points).is_ok(),
			feature.add_ring(&points).is_ok(),
			feature.add_control_points(&points).is_ok(),
		];
		assert_eq!(results.iter().filter(|ok| **ok).count(), 1);
		assert!(matches!(
			domain_error(feature.get_knots()),
			VectorTileError::WrongFeatureKind {
				expected: FeatureKind::Curve,
				..
			}
		));
	}

	#[test]
	fn curve_control_points_and_knots() -> Result<()> {
		let mut feature = Feature::new(FeatureKind::Curve, 2, 3);
		let control_points = [[8, 10], [9, 11], [11, 9], [12, 10]];
		let knots = [0.0, 2.0, 3.0, 4.0, 5.875, 6.0, 7.0];
		feature.add_control_points(&control_points)?;
		feature.add_knots(&knots)?;

		assert!(feature.add_control_points(&[[0, 0], [1, 1]]).is_err());

		let decoded = read_back(&feature, 3, &[])?;
		assert_eq!(
			decoded.geometry()?,
			Geometry::Curve {
				control_points: control_points.iter().map(|p| p.to_vec()).collect(),
				knots: knots.to_vec(),
				degree: DEFAULT_CURVE_DEGREE,
			}
		);
		Ok(())
	}

	#[test]
	fn scaled_knots_round_trip() -> Result<()> {
		let scaling = AttributeScaling::compute(1e-6, 0.0, 10.0)?;
		let mut feature = Feature::new(FeatureKind::Curve, 3, 3);
		feature.add_control_points(&[[0, 0, 0], [5, 5, 5], [10, 0, 10]])?;
		feature.add_scaled_knots(&scaling, &[0.0, 0.0, 0.1, 0.7, 1.0, 1.0])?;
		feature.set_degree(3)?;

		let decoded = read_back(&feature, 3, std::slice::from_ref(&scaling))?;
		assert_eq!(decoded, feature);
		assert_eq!(decoded.knot_scaling(), Some(0));
		assert_eq!(decoded.degree(), 3);
		assert_eq!(decoded.dimensions(), 3);
		for (knot, expected) in decoded.get_knots()?.iter().zip([0.0, 0.0, 0.1, 0.7, 1.0, 1.0]) {
			assert!((knot - expected).abs() < 1e-6);
		}
		Ok(())
	}

	#[test]
	fn string_ids_need_version_3() -> Result<()> {
		let mut legacy = Feature::new(FeatureKind::Point, 2, 2);
		assert_eq!(
			domain_error(legacy.set_id(Some(FeatureId::from("a")))),
			VectorTileError::RequiresVersion3("string feature ids")
		);
		legacy.set_id(Some(FeatureId::from(7)))?;
		assert_eq!(read_back(&legacy, 2, &[])?.id(), Some(&FeatureId::Integer(7)));

		let mut feature = Feature::new(FeatureKind::Point, 2, 3);
		feature.set_id(Some(FeatureId::from("node/42")))?;
		assert_eq!(read_back(&feature, 3, &[])?.id(), Some(&FeatureId::from("node/42")));
		Ok(())
	}

	#[test]
	fn clear_geometry_resets_cursor() -> Result<()> {
		let mut feature = Feature::new(FeatureKind::LineString, 2, 2);
		feature.add_line_string(&[[5, 5], [6, 6]])?;
		feature.clear_geometry();
		assert!(feature.get_line_strings()?.is_empty());
		feature.add_line_string(&[[1, 1], [2, 2]])?;
		assert_eq!(feature.geometry_data(), &[9, 2, 2, 10, 2, 2]);
		Ok(())
	}

	#[test]
	fn three_dimensional_geometry_uses_own_field() -> Result<()> {
		let mut feature = Feature::new(FeatureKind::LineString, 3, 3);
		feature.add_line_string(&[[0, 0, 0], [1, 1, 1]])?;
		let blob = feature.to_blob(true, &[])?;
		assert_eq!(blob.as_slice()[..4], [0x18, 0x02, 0x32, 0x08]);

		assert!(matches!(
			domain_error(Feature::read(&mut PbfReader::new(blob.as_slice()), 2, &[])),
			VectorTileError::InvalidDimensions { dimensions: 3, version: 2 }
		));
		Ok(())
	}

	#[test]
	fn empty_three_dimensional_feature_keeps_dimensions() -> Result<()> {
		let feature = Feature::new(FeatureKind::Point, 3, 3);
		let blob = feature.to_blob(true, &[])?;
		assert_eq!(blob.as_slice(), &[0x18, 0x01, 0x32, 0x00]);

		let mut decoded = read_back(&feature, 3, &[])?;
		assert_eq!(decoded.dimensions(), 3);
		assert!(decoded.get_points()?.is_empty());
		decoded.add_points(&[[1, 2, 3]])?;
		assert_eq!(decoded.get_points()?, vec![vec![1, 2, 3]]);

		let flat = read_back(&Feature::new(FeatureKind::Point, 2, 3), 3, &[])?;
		assert_eq!(flat.dimensions(), 2);
		Ok(())
	}

	#[test]
	fn unknown_type_and_fields_are_skipped() -> Result<()> {
		// type 0, then an unknown field 20 holding a string
		let blob = [0x18, 0x00, 0xA2, 0x01, 0x01, b'x'];
		assert!(Feature::read(&mut PbfReader::new(&blob), 2, &[])?.is_none());

		// type point with an unknown varint field 21
		let blob = [0x18, 0x01, 0xA8, 0x01, 0x05, 0x22, 0x03, 0x09, 0x02, 0x02];
		let (feature, inline) = Feature::read(&mut PbfReader::new(&blob), 2, &[])?.context("point")?;
		assert!(!inline);
		assert_eq!(feature.get_points()?, vec![vec![1, 1]]);
		Ok(())
	}
}

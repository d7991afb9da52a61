//! Vector tile **layers**.
//!
//! A [`Layer`] owns its features together with the tables they reference: the key table,
//! the value pool and the attribute scalings. Version 2 layers store values in a flat
//! legacy pool, version 3 layers in typed inline banks.
//!
//! Wire fields of a layer message:
//!  * field 1: `name` (string)
//!  * field 2: repeated `feature` (embedded message)
//!  * field 3: repeated `keys` (string)
//!  * field 4: repeated `values` (embedded message, legacy pool)
//!  * field 5: `extent` (varint, default 4096)
//!  * field 6: `attribute_pool` (embedded message, inline banks)
//!  * field 7: repeated `attribute_scalings` (embedded message)
//!  * fields 11, 12, 13: `tile_x`, `tile_y`, `tile_zoom` (varint)
//!  * field 15: `version` (varint, default 1)

use super::{Feature, FeatureKind, FeatureMut};
use crate::{
	AttributeScaling, VectorTileError,
	attributes::{AttributeEncoding, AttributeValue, Attributes, InlinePool, LegacyPool, Lookup, ValuePool},
};
use anyhow::{Context, Result, anyhow, bail, ensure};
use log::trace;
use vector_tile_pbf::{Blob, PbfReader, PbfWriter, WIRE_LEN, WIRE_VARINT};

/// Default coordinate extent of a layer.
pub const DEFAULT_EXTENT: u32 = 4096;

/// Position of a tile in the tile pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileLocation {
	pub zoom: u32,
	pub x: u32,
	pub y: u32,
}

impl TileLocation {
	#[must_use]
	pub fn new(zoom: u32, x: u32, y: u32) -> TileLocation {
		TileLocation { zoom, x, y }
	}
}

/// Settings a layer is created with.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
	pub name: String,
	/// Layer version. Fixed for the lifetime of the layer.
	pub version: u32,
	pub extent: u32,
	/// Only allowed on version 3 layers.
	pub tile_location: Option<TileLocation>,
}

impl LayerConfig {
	pub fn new(name: &str, version: u32) -> LayerConfig {
		LayerConfig {
			name: name.to_string(),
			version,
			..LayerConfig::default()
		}
	}
}

impl Default for LayerConfig {
	fn default() -> Self {
		LayerConfig {
			name: String::new(),
			version: 2,
			extent: DEFAULT_EXTENT,
			tile_location: None,
		}
	}
}

/// A named collection of features sharing key, value and scaling tables.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
	name: String,
	version: u32,
	extent: u32,
	tile_location: Option<TileLocation>,
	keys: Lookup<String>,
	pool: ValuePool,
	scalings: Vec<AttributeScaling>,
	features: Vec<Feature>,
}

impl Layer {
	/// Creates an empty layer.
	///
	/// # Errors
	/// [`VectorTileError::RequiresVersion3`] if a tile location is set on an older layer.
	pub fn new(config: LayerConfig) -> Result<Layer> {
		if config.tile_location.is_some() {
			ensure!(config.version >= 3, VectorTileError::RequiresVersion3("tile location"));
		}
		Ok(Layer {
			tile_location: config.tile_location,
			..Layer::empty(config.name, config.version, config.extent)
		})
	}

	pub(crate) fn empty(name: String, version: u32, extent: u32) -> Layer {
		Layer {
			name,
			version,
			extent,
			tile_location: None,
			keys: Lookup::default(),
			pool: ValuePool::for_version(version),
			scalings: Vec::new(),
			features: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn set_name(&mut self, name: &str) {
		self.name = name.to_string();
	}

	pub fn version(&self) -> u32 {
		self.version
	}

	pub fn extent(&self) -> u32 {
		self.extent
	}

	pub fn set_extent(&mut self, extent: u32) {
		self.extent = extent;
	}

	pub fn tile_location(&self) -> Option<TileLocation> {
		self.tile_location
	}

	pub fn set_tile_location(&mut self, tile_location: Option<TileLocation>) -> Result<()> {
		if tile_location.is_some() {
			ensure!(self.version >= 3, VectorTileError::RequiresVersion3("tile location"));
		}
		self.tile_location = tile_location;
		Ok(())
	}

	/// The key table in index order.
	pub fn keys(&self) -> &[String] {
		self.keys.as_slice()
	}

	/// Values of the legacy pool, empty for layers storing values inline.
	pub fn legacy_values(&self) -> &[AttributeValue] {
		match &self.pool {
			ValuePool::Legacy(pool) => pool.values(),
			ValuePool::Inline(_) => &[],
		}
	}

	/// Whether the layer stores attribute values in inline banks.
	pub fn uses_inline_attributes(&self) -> bool {
		self.pool.is_inline()
	}

	pub fn features(&self) -> &[Feature] {
		&self.features
	}

	pub fn feature(&self, index: usize) -> Option<&Feature> {
		self.features.get(index)
	}

	/// Borrows a feature together with the tables needed to edit its attributes.
	pub fn feature_mut(&mut self, index: usize) -> Option<FeatureMut<'_>> {
		let feature = self.features.get_mut(index)?;
		Some(FeatureMut::new(feature, &mut self.keys, &mut self.pool, &self.scalings))
	}

	/// Appends a new, empty feature and returns a handle to it.
	///
	/// # Errors
	/// [`VectorTileError::InvalidDimensions`] for dimensions other than 2 or 3, or 3 on an
	/// older layer; [`VectorTileError::UnsupportedFeatureKind`] for curves on an older layer.
	pub fn add_feature(&mut self, kind: FeatureKind, dimensions: u8) -> Result<FeatureMut<'_>> {
		let version = self.version;
		ensure!(
			dimensions == 2 || (dimensions == 3 && version >= 3),
			VectorTileError::InvalidDimensions { dimensions, version }
		);
		ensure!(
			version >= kind.min_version(),
			VectorTileError::UnsupportedFeatureKind { kind, version }
		);

		let index = self.features.len();
		self.features.push(Feature::new(kind, dimensions, version));
		Ok(FeatureMut::new(
			&mut self.features[index],
			&mut self.keys,
			&mut self.pool,
			&self.scalings,
		))
	}

	/// Derives a scaling for `precision` over `[min, max]` and registers it.
	///
	/// Returns a copy carrying the index the layer assigned.
	pub fn add_attribute_scaling(&mut self, precision: f64, min: f64, max: f64) -> Result<AttributeScaling> {
		let scaling = AttributeScaling::compute(precision, min, max)?;
		self.push_scaling(scaling)
	}

	/// Registers a scaling with explicit parameters.
	pub fn add_attribute_scaling_parameters(&mut self, offset: i64, multiplier: f64, base: f64) -> Result<AttributeScaling> {
		let scaling = AttributeScaling::new(offset, multiplier, base)?;
		self.push_scaling(scaling)
	}

	fn push_scaling(&mut self, scaling: AttributeScaling) -> Result<AttributeScaling> {
		let index = u32::try_from(self.scalings.len()).context("Too many attribute scalings")?;
		let scaling = scaling.with_index(index);
		self.scalings.push(scaling.clone());
		Ok(scaling)
	}

	pub fn attribute_scalings(&self) -> &[AttributeScaling] {
		&self.scalings
	}

	/// Decodes the attributes of a feature of this layer without caching them.
	pub fn decode_attributes(&self, feature: &Feature) -> Result<Attributes> {
		if let Some(attributes) = feature.cached_attributes() {
			return Ok(attributes.clone());
		}
		self
			.pool
			.decode(&self.keys, feature.attribute_data(), &self.scalings)
			.context("Failed to decode feature attributes")
	}

	/// Reads a layer message.
	///
	/// Features are parsed after the rest of the message, since scalings and version may
	/// follow them on the wire.
	pub(crate) fn read(reader: &mut PbfReader<'_>) -> Result<Layer> {
		let mut name = None;
		let mut feature_readers = Vec::new();
		let mut keys = Vec::new();
		let mut legacy_values = Vec::new();
		let mut extent = DEFAULT_EXTENT;
		let mut inline_pool: Option<InlinePool> = None;
		let mut scalings = Vec::new();
		let mut tile_x = None;
		let mut tile_y = None;
		let mut tile_zoom = None;
		let mut version = 1;

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_LEN) => name = Some(reader.read_pbf_string().context("Failed to read layer name")?),
				(2, WIRE_LEN) => feature_readers.push(
					reader
						.get_pbf_sub_reader()
						.context("Failed to get PBF sub-reader for feature")?,
				),
				(3, WIRE_LEN) => keys.push(reader.read_pbf_string().context("Failed to read attribute key")?),
				(4, WIRE_LEN) => legacy_values.push(
					LegacyPool::read_value(
						&mut reader
							.get_pbf_sub_reader()
							.context("Failed to get PBF sub-reader for value")?,
					)
					.context("Failed to read legacy value")?,
				),
				(5, WIRE_VARINT) => extent = read_u32(reader).context("Failed to read extent")?,
				(6, WIRE_LEN) => {
					inline_pool = Some(
						InlinePool::read(
							&mut reader
								.get_pbf_sub_reader()
								.context("Failed to get PBF sub-reader for attribute pool")?,
						)
						.context("Failed to read attribute pool")?,
					);
				}
				(7, WIRE_LEN) => {
					let index = u32::try_from(scalings.len()).context("Too many attribute scalings")?;
					scalings.push(
						AttributeScaling::read(
							&mut reader
								.get_pbf_sub_reader()
								.context("Failed to get PBF sub-reader for attribute scaling")?,
							index,
						)
						.context("Failed to read attribute scaling")?,
					);
				}
				(11, WIRE_VARINT) => tile_x = Some(read_u32(reader).context("Failed to read tile x")?),
				(12, WIRE_VARINT) => tile_y = Some(read_u32(reader).context("Failed to read tile y")?),
				(13, WIRE_VARINT) => tile_zoom = Some(read_u32(reader).context("Failed to read tile zoom")?),
				(15, WIRE_VARINT) => version = read_u32(reader).context("Failed to read version")?,
				(f, w) => {
					trace!("skipping unknown layer field {f} (wire type {w})");
					reader.skip_field(w)?;
				}
			}
		}

		let name = name
			.ok_or(anyhow!("Layer name is required"))
			.context("Failed to get layer name")?;

		let mut features = Vec::with_capacity(feature_readers.len());
		let mut any_inline = false;
		for mut feature_reader in feature_readers {
			if let Some((feature, inline)) =
				Feature::read(&mut feature_reader, version, &scalings).context("Failed to read feature")?
			{
				any_inline |= inline;
				features.push(feature);
			}
		}

		let has_legacy = !legacy_values.is_empty();
		let pool = match inline_pool {
			Some(pool) => ValuePool::Inline(pool),
			None if any_inline => ValuePool::Inline(InlinePool::default()),
			None if has_legacy => ValuePool::Legacy(LegacyPool::new(legacy_values)),
			None => ValuePool::for_version(version),
		};
		if pool.is_inline() && has_legacy {
			trace!("layer '{name}' has both legacy and inline values, ignoring the legacy ones");
		}

		let tile_location = match (tile_zoom, tile_x, tile_y) {
			(Some(zoom), Some(x), Some(y)) if version >= 3 => Some(TileLocation { zoom, x, y }),
			(None, None, None) => None,
			_ => {
				trace!("dropping incomplete or unsupported tile location of layer '{name}'");
				None
			}
		};

		Ok(Layer {
			name,
			version,
			extent,
			tile_location,
			keys: Lookup::new(keys),
			pool,
			scalings,
			features,
		})
	}

	/// Serializes the layer message.
	pub(crate) fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		writer
			.write_pbf_key(1, WIRE_LEN)
			.context("Failed to write PBF key for layer name")?;
		writer.write_pbf_string(&self.name).context("Failed to write layer name")?;

		let inline = self.pool.is_inline();
		for feature in &self.features {
			writer
				.write_pbf_key(2, WIRE_LEN)
				.context("Failed to write PBF key for feature")?;
			writer
				.write_pbf_blob(
					&feature
						.to_blob(inline, &self.scalings)
						.context("Failed to convert feature to blob")?,
				)
				.context("Failed to write feature blob")?;
		}

		for key in self.keys.iter() {
			writer
				.write_pbf_key(3, WIRE_LEN)
				.context("Failed to write PBF key for attribute key")?;
			writer.write_pbf_string(key).context("Failed to write attribute key")?;
		}

		match &self.pool {
			ValuePool::Legacy(pool) => {
				for value in pool.values() {
					writer
						.write_pbf_key(4, WIRE_LEN)
						.context("Failed to write PBF key for value")?;
					writer
						.write_pbf_blob(&LegacyPool::value_to_blob(value).context("Failed to convert value to blob")?)
						.context("Failed to write value blob")?;
				}
			}
			ValuePool::Inline(pool) => {
				if !pool.is_empty() {
					writer
						.write_pbf_key(6, WIRE_LEN)
						.context("Failed to write PBF key for attribute pool")?;
					writer
						.write_pbf_blob(&pool.to_blob().context("Failed to convert attribute pool to blob")?)
						.context("Failed to write attribute pool blob")?;
				}
			}
		}

		if self.extent != DEFAULT_EXTENT {
			writer.write_pbf_key(5, WIRE_VARINT)?;
			writer
				.write_varint(u64::from(self.extent))
				.context("Failed to write extent")?;
		}

		for scaling in &self.scalings {
			writer
				.write_pbf_key(7, WIRE_LEN)
				.context("Failed to write PBF key for attribute scaling")?;
			writer
				.write_pbf_blob(&scaling.to_blob().context("Failed to convert attribute scaling to blob")?)
				.context("Failed to write attribute scaling blob")?;
		}

		if let Some(location) = self.tile_location {
			for (field, value) in [(11, location.x), (12, location.y), (13, location.zoom)] {
				writer.write_pbf_key(field, WIRE_VARINT)?;
				writer
					.write_varint(u64::from(value))
					.context("Failed to write tile location")?;
			}
		}

		if self.version != 1 {
			writer.write_pbf_key(15, WIRE_VARINT)?;
			writer
				.write_varint(u64::from(self.version))
				.context("Failed to write version")?;
		}

		Ok(writer.into_blob())
	}
}

fn read_u32(reader: &mut PbfReader<'_>) -> Result<u32> {
	let value = reader.read_varint()?;
	match u32::try_from(value) {
		Ok(value) => Ok(value),
		Err(_) => bail!("value {value} does not fit into uint32"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attributes::ScaledFloatList;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn round_trip(layer: &Layer) -> Result<Layer> {
		let blob = layer.to_blob()?;
		Layer::read(&mut PbfReader::new(blob.as_slice()))
	}

	fn domain_error<T>(result: Result<T>) -> Option<VectorTileError> {
		result.err().and_then(|e| e.downcast::<VectorTileError>().ok())
	}

	#[rstest]
	#[case::four_dimensions(2, FeatureKind::Point, 4)]
	#[case::zero_dimensions(3, FeatureKind::Point, 0)]
	#[case::three_dimensions_on_v2(2, FeatureKind::LineString, 3)]
	fn invalid_dimensions(#[case] version: u32, #[case] kind: FeatureKind, #[case] dimensions: u8) {
		let mut layer = Layer::new(LayerConfig::new("test", version)).unwrap();
		assert_eq!(
			domain_error(layer.add_feature(kind, dimensions)),
			Some(VectorTileError::InvalidDimensions { dimensions, version })
		);
		assert!(layer.features().is_empty());
	}

	#[test]
	fn curves_need_version_3() {
		let mut layer = Layer::new(LayerConfig::new("test", 2)).unwrap();
		assert_eq!(
			domain_error(layer.add_feature(FeatureKind::Curve, 2)),
			Some(VectorTileError::UnsupportedFeatureKind {
				kind: FeatureKind::Curve,
				version: 2
			})
		);
	}

	#[test]
	fn tile_location_needs_version_3() -> Result<()> {
		let config = LayerConfig {
			tile_location: Some(TileLocation::new(14, 8801, 5371)),
			..LayerConfig::new("test", 2)
		};
		assert_eq!(
			domain_error(Layer::new(config.clone())),
			Some(VectorTileError::RequiresVersion3("tile location"))
		);

		let layer = Layer::new(LayerConfig { version: 3, ..config })?;
		let decoded = round_trip(&layer)?;
		assert_eq!(decoded.tile_location(), Some(TileLocation::new(14, 8801, 5371)));
		Ok(())
	}

	#[test]
	fn header_fields_round_trip() -> Result<()> {
		let mut layer = Layer::new(LayerConfig::new("water", 3))?;
		layer.set_extent(512);
		layer.set_name("ocean");
		let decoded = round_trip(&layer)?;
		assert_eq!(decoded.name(), "ocean");
		assert_eq!(decoded.extent(), 512);
		assert_eq!(decoded.version(), 3);
		assert!(decoded.uses_inline_attributes());
		Ok(())
	}

	#[test]
	fn missing_version_defaults_to_1() -> Result<()> {
		// name "a" only
		let layer = Layer::read(&mut PbfReader::new(&[0x0A, 0x01, b'a']))?;
		assert_eq!(layer.version(), 1);
		assert_eq!(layer.extent(), DEFAULT_EXTENT);
		assert!(!layer.uses_inline_attributes());
		assert!(Layer::read(&mut PbfReader::new(&[0x28, 0x01])).is_err());
		Ok(())
	}

	#[test]
	fn keys_are_shared_and_never_reused() -> Result<()> {
		let mut layer = Layer::new(LayerConfig::new("test", 2))?;
		layer
			.add_feature(FeatureKind::Point, 2)?
			.set_attribute("name", "a")?;
		{
			let mut feature = layer.add_feature(FeatureKind::Point, 2)?;
			feature.set_attribute("kind", "b")?;
			feature.set_attribute("name", "c")?;
			assert_eq!(feature.remove_attribute("kind")?, AttributeValue::from("b"));
		}
		assert_eq!(layer.keys(), &["name".to_string(), "kind".to_string()]);
		assert_eq!(layer.feature(1).unwrap().attribute_data(), &[0, 2]);
		Ok(())
	}

	#[test]
	fn attributes_decode_lazily_after_read() -> Result<()> {
		let mut layer = Layer::new(LayerConfig::new("test", 3))?;
		let mut attributes = Attributes::from(vec![("class", AttributeValue::from("primary"))]);
		attributes.insert("lanes", 4u64);
		attributes.insert("tags", vec![AttributeValue::from("a"), AttributeValue::Null]);
		layer.add_feature(FeatureKind::Point, 2)?.set_attributes(&mut attributes);

		let mut decoded = round_trip(&layer)?;
		assert_eq!(decoded.decode_attributes(&decoded.features()[0])?, attributes);

		let mut feature = decoded.feature_mut(0).unwrap();
		assert_eq!(feature.get_attribute("lanes")?, &AttributeValue::UInt(4));
		assert!(feature.contains_attribute("tags")?);
		assert!(!feature.contains_attribute("missing")?);
		assert_eq!(
			domain_error(feature.get_attribute("missing")),
			Some(VectorTileError::AttributeKeyNotFound("missing".to_string()))
		);
		assert_eq!(
			domain_error(feature.get_attribute(7)),
			Some(VectorTileError::AttributeKeyTypeError("int"))
		);
		Ok(())
	}

	#[test]
	fn non_string_key_leaves_attributes_untouched() -> Result<()> {
		let mut layer = Layer::new(LayerConfig::new("test", 2))?;
		let mut feature = layer.add_feature(FeatureKind::Point, 2)?;
		feature.set_attribute("a", 1)?;
		assert!(domain_error(feature.set_attribute(true, 2)).is_some());
		assert_eq!(feature.attributes()?, &Attributes::from(vec![("a", 1)]));
		Ok(())
	}

	#[test]
	fn scaled_lists_use_layer_scalings() -> Result<()> {
		let mut layer = Layer::new(LayerConfig::new("elevation", 3))?;
		let scaling = layer.add_attribute_scaling(0.01, -100.0, 9000.0)?;
		let explicit = layer.add_attribute_scaling_parameters(3, 0.5, 10.0)?;
		assert_eq!((scaling.index(), explicit.index()), (0, 1));

		let list = ScaledFloatList::new(scaling.index(), vec![Some(12.5), None, Some(8848.86)]);
		layer
			.add_feature(FeatureKind::Point, 2)?
			.set_attribute("heights", list)?;

		let mut decoded = round_trip(&layer)?;
		assert_eq!(decoded.attribute_scalings().len(), 2);
		assert_eq!(decoded.attribute_scalings()[1].offset(), 3);
		let mut feature = decoded.feature_mut(0).unwrap();
		let AttributeValue::ScaledFloatList(decoded_list) = feature.get_attribute("heights")? else {
			panic!("expected a scaled float list");
		};
		assert_eq!(decoded_list.scaling, 0);
		assert_eq!(decoded_list.values.len(), 3);
		assert!(decoded_list.values[1].is_none());
		approx::assert_abs_diff_eq!(decoded_list.values[2].unwrap(), 8848.86, epsilon = 0.01);
		Ok(())
	}

	#[test]
	fn legacy_layer_drops_complex_values() -> Result<()> {
		let mut layer = Layer::new(LayerConfig::new("test", 2))?;
		let mut feature = layer.add_feature(FeatureKind::Point, 2)?;
		let mut attributes = Attributes::from(vec![
			("list", AttributeValue::List(vec![AttributeValue::Int(1)])),
			("nothing", AttributeValue::Null),
			("name", AttributeValue::from("x")),
		]);
		feature.set_attributes(&mut attributes);
		assert_eq!(attributes, Attributes::from(vec![("name", "x")]));

		let decoded = round_trip(&layer)?;
		assert_eq!(decoded.legacy_values(), &[AttributeValue::from("x")]);
		assert_eq!(decoded.decode_attributes(&decoded.features()[0])?, attributes);
		Ok(())
	}

	fn hand_built_layer(version: u64, legacy_value: Option<&[u8]>, feature: &Blob) -> Result<Blob> {
		let mut writer = PbfWriter::new();
		writer.write_pbf_key(1, WIRE_LEN)?;
		writer.write_pbf_string("test")?;
		writer.write_pbf_key(2, WIRE_LEN)?;
		writer.write_pbf_blob(feature)?;
		writer.write_pbf_key(3, WIRE_LEN)?;
		writer.write_pbf_string("k")?;
		if let Some(value) = legacy_value {
			writer.write_pbf_key(4, WIRE_LEN)?;
			writer.write_pbf_blob(&Blob::from(value))?;
		}
		writer.write_pbf_key(15, WIRE_VARINT)?;
		writer.write_varint(version)?;
		Ok(writer.into_blob())
	}

	#[test]
	fn attribute_codec_follows_structure() -> Result<()> {
		let expected = Attributes::from(vec![("k", AttributeValue::UInt(7))]);

		// version 2 header, feature with inline attributes
		let mut feature = PbfWriter::new();
		feature.write_pbf_key(3, WIRE_VARINT)?;
		feature.write_varint(1)?;
		feature.write_pbf_key(5, WIRE_LEN)?;
		feature.write_pbf_packed_uint64(&[0, (7 << 4) | 5])?;
		let blob = hand_built_layer(2, None, &feature.into_blob())?;
		let layer = Layer::read(&mut PbfReader::new(blob.as_slice()))?;
		assert_eq!(layer.version(), 2);
		assert!(layer.uses_inline_attributes());
		assert_eq!(layer.decode_attributes(&layer.features()[0])?, expected);
		let again = round_trip(&layer)?;
		assert!(again.uses_inline_attributes());
		assert_eq!(again.decode_attributes(&again.features()[0])?, expected);

		// version 3 header, legacy uint value and tags
		let mut feature = PbfWriter::new();
		feature.write_pbf_key(2, WIRE_LEN)?;
		feature.write_pbf_packed_uint32(&[0, 0])?;
		feature.write_pbf_key(3, WIRE_VARINT)?;
		feature.write_varint(1)?;
		let blob = hand_built_layer(3, Some(&[0x28u8, 0x07][..]), &feature.into_blob())?;
		let layer = Layer::read(&mut PbfReader::new(blob.as_slice()))?;
		assert_eq!(layer.version(), 3);
		assert!(!layer.uses_inline_attributes());
		assert_eq!(layer.legacy_values(), &[AttributeValue::UInt(7)]);
		assert_eq!(layer.decode_attributes(&layer.features()[0])?, expected);
		let again = round_trip(&layer)?;
		assert!(!again.uses_inline_attributes());
		assert_eq!(again.decode_attributes(&again.features()[0])?, expected);
		Ok(())
	}

	#[test]
	fn empty_legacy_value_reads_as_null() -> Result<()> {
		let mut feature = PbfWriter::new();
		feature.write_pbf_key(2, WIRE_LEN)?;
		feature.write_pbf_packed_uint32(&[0, 0])?;
		feature.write_pbf_key(3, WIRE_VARINT)?;
		feature.write_varint(1)?;
		let blob = hand_built_layer(2, Some(&[] as &[u8]), &feature.into_blob())?;

		let layer = Layer::read(&mut PbfReader::new(blob.as_slice()))?;
		let expected = Attributes::from(vec![("k", AttributeValue::Null)]);
		assert_eq!(layer.decode_attributes(&layer.features()[0])?, expected);
		let again = round_trip(&layer)?;
		assert_eq!(again.legacy_values(), &[AttributeValue::Null]);
		assert_eq!(again.decode_attributes(&again.features()[0])?, expected);
		Ok(())
	}

	#[test]
	fn unknown_feature_types_are_skipped() -> Result<()> {
		let mut writer = PbfWriter::new();
		writer.write_pbf_key(1, WIRE_LEN)?;
		writer.write_pbf_string("test")?;
		for kind in [9, 1] {
			let mut feature = PbfWriter::new();
			feature.write_pbf_key(3, WIRE_VARINT)?;
			feature.write_varint(kind)?;
			writer.write_pbf_key(2, WIRE_LEN)?;
			writer.write_pbf_blob(&feature.into_blob())?;
		}
		// unknown layer field 20
		writer.write_pbf_key(20, WIRE_VARINT)?;
		writer.write_varint(1)?;

		let blob = writer.into_blob();
		let layer = Layer::read(&mut PbfReader::new(blob.as_slice()))?;
		assert_eq!(layer.features().len(), 1);
		assert_eq!(layer.features()[0].kind(), FeatureKind::Point);
		Ok(())
	}
}

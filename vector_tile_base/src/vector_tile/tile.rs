use super::layer::{Layer, LayerConfig};
use anyhow::{Context, Result};
use log::trace;
use vector_tile_pbf::{Blob, PbfReader, PbfWriter, WIRE_LEN};

/// An ordered list of layers; the root of the codec.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTile {
	layers: Vec<Layer>,
}

impl VectorTile {
	#[must_use]
	pub fn new() -> VectorTile {
		VectorTile::default()
	}

	/// Parses a tile. Unknown top level fields are skipped.
	pub fn from_blob(blob: &Blob) -> Result<VectorTile> {
		let mut reader = PbfReader::new(blob.as_slice());

		let mut tile = VectorTile::default();
		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(3, WIRE_LEN) => {
					tile.layers.push(
						Layer::read(&mut reader.get_pbf_sub_reader().context("Failed to get PBF sub-reader")?)
							.context("Failed to read layer")?,
					);
				}
				(f, w) => {
					trace!("skipping unknown tile field {f} (wire type {w})");
					reader.skip_field(w)?;
				}
			}
		}

		Ok(tile)
	}

	/// Serializes all layers in order. An empty tile encodes to zero bytes.
	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = PbfWriter::new();

		for layer in &self.layers {
			writer.write_pbf_key(3, WIRE_LEN).context("Failed to write PBF key")?;
			writer
				.write_pbf_blob(&layer.to_blob().context("Failed to convert layer to blob")?)
				.context("Failed to write PBF blob")?;
		}

		Ok(writer.into_blob())
	}

	/// Appends a layer with default extent and no tile location.
	pub fn add_layer(&mut self, name: &str, version: u32) -> &mut Layer {
		let config = LayerConfig::new(name, version);
		self.push(Layer::empty(config.name, config.version, config.extent))
	}

	/// Appends a layer built from `config`.
	pub fn add_layer_with_config(&mut self, config: LayerConfig) -> Result<&mut Layer> {
		let layer = Layer::new(config)?;
		Ok(self.push(layer))
	}

	fn push(&mut self, layer: Layer) -> &mut Layer {
		let index = self.layers.len();
		self.layers.push(layer);
		&mut self.layers[index]
	}

	pub fn layers(&self) -> &[Layer] {
		&self.layers
	}

	pub fn layers_mut(&mut self) -> &mut [Layer] {
		&mut self.layers
	}

	/// First layer called `name`.
	pub fn find_layer(&self, name: &str) -> Option<&Layer> {
		self.layers.iter().find(|layer| layer.name() == name)
	}

	pub fn find_layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
		self.layers.iter_mut().find(|layer| layer.name() == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{FeatureKind, TileLocation};
	use pretty_assertions::assert_eq;

	#[test]
	fn empty_tile_is_empty_blob() -> Result<()> {
		let blob = VectorTile::new().to_blob()?;
		assert!(blob.is_empty());
		assert_eq!(VectorTile::from_blob(&blob)?, VectorTile::new());
		Ok(())
	}

	#[test]
	fn layer_order_is_kept() -> Result<()> {
		let mut tile = VectorTile::new();
		for name in ["water", "roads", "buildings"] {
			tile.add_layer(name, 2);
		}
		tile.add_layer_with_config(LayerConfig {
			tile_location: Some(TileLocation::new(3, 4, 2)),
			..LayerConfig::new("labels", 3)
		})?;

		let decoded = VectorTile::from_blob(&tile.to_blob()?)?;
		let names: Vec<&str> = decoded.layers().iter().map(Layer::name).collect();
		assert_eq!(names, ["water", "roads", "buildings", "labels"]);
		assert_eq!(decoded, tile);
		Ok(())
	}

	#[test]
	fn find_layers_by_name() -> Result<()> {
		let mut tile = VectorTile::new();
		tile.add_layer("roads", 2);
		tile.add_layer("roads", 3);
		assert_eq!(tile.find_layer("roads").map(Layer::version), Some(2));
		assert!(tile.find_layer("rivers").is_none());

		let layer = tile.find_layer_mut("roads").unwrap();
		layer.add_feature(FeatureKind::Point, 2)?.add_points(&[[1, 2]])?;
		assert_eq!(tile.layers()[0].features().len(), 1);

		tile.layers_mut()[1].set_extent(256);
		assert_eq!(tile.layers()[1].extent(), 256);
		Ok(())
	}

	#[test]
	fn unknown_tile_fields_are_skipped() -> Result<()> {
		let mut tile = VectorTile::new();
		tile.add_layer("a", 2);
		let mut bytes = vec![0x08, 0x96, 0x01];
		bytes.extend_from_slice(tile.to_blob()?.as_slice());
		assert_eq!(VectorTile::from_blob(&Blob::from(bytes))?, tile);
		Ok(())
	}
}

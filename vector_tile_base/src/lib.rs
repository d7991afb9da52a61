//! Encoder and decoder for vector tiles.
//!
//! A [`VectorTile`] holds named [`Layer`]s, each holding typed [`Feature`]s whose geometry is
//! stored as a command stream in tile-local integer coordinates. Layers of version 2 keep
//! attribute values in a flat pool; version 3 layers keep them in typed banks, support
//! lists, maps and nulls, and may quantize float lists with [`AttributeScaling`]s.
//!
//! Geometry lives on the feature itself. Attributes are reached through [`FeatureMut`],
//! which [`Layer::add_feature`] and [`Layer::feature_mut`] hand out:
//!
//! ```rust
//! use vector_tile_base::{FeatureKind, VectorTile};
//! # fn main() -> anyhow::Result<()> {
//! let mut tile = VectorTile::new();
//! let layer = tile.add_layer("poi", 3);
//! let mut feature = layer.add_feature(FeatureKind::Point, 2)?;
//! feature.add_points(&[[25, 17]])?;
//! feature.set_attribute("name", "fountain")?;
//!
//! let decoded = VectorTile::from_blob(&tile.to_blob()?)?;
//! let layer = &decoded.layers()[0];
//! let attributes = layer.decode_attributes(&layer.features()[0])?;
//! assert_eq!(attributes.get("name").and_then(|v| v.as_str()), Some("fountain"));
//! # Ok(())
//! # }
//! ```

pub mod attributes;
mod error;
pub mod geometry;
pub mod scaling;
mod vector_tile;
pub mod zigzag;

pub use attributes::{AttributeValue, Attributes, ScaledFloatList};
pub use error::VectorTileError;
pub use geometry::{Coordinates, Geometry, LineStrings, Points, Polygons};
pub use scaling::AttributeScaling;
pub use vector_tile::*;
pub use vector_tile_pbf::Blob;

/// Degree of a curve unless set otherwise.
pub const DEFAULT_CURVE_DEGREE: u32 = 2;

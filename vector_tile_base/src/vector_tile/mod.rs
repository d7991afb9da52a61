mod feature;
mod feature_kind;
mod layer;
mod tile;

pub use feature::{Feature, FeatureId, FeatureMut};
pub use feature_kind::FeatureKind;
pub use layer::{DEFAULT_EXTENT, Layer, LayerConfig, TileLocation};
pub use tile::VectorTile;

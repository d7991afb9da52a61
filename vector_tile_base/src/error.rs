use crate::FeatureKind;
use thiserror::Error;

/// Domain errors raised by the codec.
///
/// Public functions return [`anyhow::Result`]; these values travel inside the
/// `anyhow::Error` and can be recovered with `error.downcast_ref::<VectorTileError>()`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum VectorTileError {
	#[error("malformed geometry: {0}")]
	MalformedGeometry(String),

	#[error("{kind} requires at least {required} points, got {actual}")]
	InsufficientPoints {
		kind: FeatureKind,
		required: usize,
		actual: usize,
	},

	#[error("{dimensions} dimensions are not supported by a version {version} layer")]
	InvalidDimensions { dimensions: u8, version: u32 },

	#[error("{kind} features are not supported by a version {version} layer")]
	UnsupportedFeatureKind { kind: FeatureKind, version: u32 },

	#[error("attribute keys must be strings, got {0}")]
	AttributeKeyTypeError(&'static str),

	#[error("attribute key '{0}' not found")]
	AttributeKeyNotFound(String),

	#[error("invalid attribute scaling: {0}")]
	InvalidScalingConfig(String),

	#[error("operation needs a {expected} feature, but this is a {actual} feature")]
	WrongFeatureKind { expected: FeatureKind, actual: FeatureKind },

	#[error("{0} requires layer version 3 or newer")]
	RequiresVersion3(&'static str),

	#[error("malformed attributes: {0}")]
	MalformedAttributes(String),
}

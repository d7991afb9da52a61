//! Protocol Buffers wire primitives for the vector tile codec.
//!
//! The crate is deliberately schema-less: callers drive the decoding loop
//! themselves by reading `(field_number, wire_type)` keys and dispatching on
//! them, the same way every message in `vector_tile_base` is parsed.
//!
//! - [`Blob`]: an owned byte buffer.
//! - [`PbfReader`]: reads varints, fixed-width values and length-delimited fields from a slice.
//! - [`PbfWriter`]: the symmetric writer, producing a [`Blob`].
//!
//! ```rust
//! use vector_tile_pbf::{PbfReader, PbfWriter};
//! # fn main() -> anyhow::Result<()> {
//! let mut writer = PbfWriter::new();
//! writer.write_pbf_key(1, 2)?;
//! writer.write_pbf_string("roads")?;
//! let blob = writer.into_blob();
//!
//! let mut reader = PbfReader::new(blob.as_slice());
//! assert_eq!(reader.read_pbf_key()?, (1, 2));
//! assert_eq!(reader.read_pbf_string()?, "roads");
//! # Ok(())
//! # }
//! ```

mod blob;
mod reader;
mod writer;

pub use blob::Blob;
pub use reader::PbfReader;
pub use writer::PbfWriter;

/// Wire type of varint encoded fields (`int32`, `uint64`, `sint64`, `bool`, `enum`).
pub const WIRE_VARINT: u8 = 0;
/// Wire type of 64 bit fixed-width fields (`double`, `fixed64`).
pub const WIRE_FIXED64: u8 = 1;
/// Wire type of length-delimited fields (strings, bytes, messages, packed repeated fields).
pub const WIRE_LEN: u8 = 2;
/// Wire type of 32 bit fixed-width fields (`float`, `fixed32`).
pub const WIRE_FIXED32: u8 = 5;

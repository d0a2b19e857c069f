//! Image normalization pipeline components.
//!
//! Stages, leaves first:
//! - **registry**: Which encodings may be decoded
//! - **decode**: Content-sniffed decoding to RGBA
//! - **trim**: Crop transparent margins
//! - **compose**: Square padding, letterboxing and logo overlay
//! - **encode**: WebP / PNG / JPEG output
//! - **naming**: Output file names
//! - **hash**: Content hashes and batch cache keys
//! - **processor**: One item through the whole chain
//! - **batch**: Bounded fan-out over a batch

pub mod batch;
pub mod compose;
pub mod decode;
pub mod encode;
pub mod hash;
pub mod naming;
pub mod processor;
pub mod registry;
pub mod trim;

// Re-exports for convenient access
pub use batch::{BatchCoordinator, CancelToken};
pub use compose::{Anchor, Compositor};
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::{Encoder, OutputFormat};
pub use hash::Hasher;
pub use naming::{Namer, NamingMode};
pub use processor::{EncodedImage, ItemProcessor};
pub use registry::FormatRegistry;
pub use trim::{Bounds, Trimmer};

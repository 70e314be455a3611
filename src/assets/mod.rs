//! Device photos and title logos.

pub mod decode;

pub use decode::{PreparedImage, decode_image, load_image};

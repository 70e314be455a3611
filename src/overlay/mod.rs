pub mod aggregate;

pub use aggregate::populate_image_overlays;

//! ID type wrappers for type safety.

mod id_macro;
pub mod image_id;

pub use image_id::ImageId;

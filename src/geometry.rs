mod bounding_box;
mod mirroring;
mod shapes;
mod transform;

pub use bounding_box::*;
pub use mirroring::*;
pub use shapes::*;
pub use transform::*;

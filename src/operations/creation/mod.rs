mod make_face;
mod make_region;

pub use make_face::{FaceBuild, MakeFace};
pub use make_region::MakeRegion;

pub mod f32;
pub mod f64;
pub mod io;
pub mod mask;
pub mod pfm;
pub mod resample;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::f64::ImageF64;
pub use self::mask::Mask;
pub use self::resample::Interpolation;
pub use self::traits::{Raster, RasterMut, Rows};
pub use self::u8::{ImageU8, LabelMap};

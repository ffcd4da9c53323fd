//! Small fixed-kernel filters used by the smoothness and surface-normal metrics.
pub mod conv;
pub mod scharr;

pub use conv::{convolve3x3, transpose, BorderMode, Kernel3};
pub use scharr::{hessian_norm, scharr_h, scharr_v, HSCHARR, NORMAL_KERNEL};

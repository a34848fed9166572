//! Individual preprocessing steps

pub mod contrast;
pub mod grayscale;
pub mod normalize;
pub mod pad;
pub mod resize;
pub mod rotate;
pub mod sharpen;
pub mod threshold;
pub mod trim;

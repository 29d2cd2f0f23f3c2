//! Feature assembly: scaled lexical signals appended to the text embedding.

pub mod assembler;
pub mod scaler;

pub use assembler::{FeatureAssembler, FeatureVector};
pub use scaler::{ScalerState, StandardScaler};

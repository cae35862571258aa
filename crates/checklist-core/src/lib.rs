mod color;
mod core;
mod ops;

pub use crate::color::*;
pub use crate::core::*;
pub use crate::ops::*;

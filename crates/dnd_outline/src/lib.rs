mod engine;
mod outline;

pub use engine::*;
pub use outline::*;

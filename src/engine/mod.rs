mod batcher;
pub use batcher::*;

mod model;
pub use model::*;

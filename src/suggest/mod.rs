pub mod normalize;
pub mod gazetteer;

pub use gazetteer::{Gazetteer, NO_SUGGESTION};

mod note;
mod query;
mod stats;

pub use note::*;
pub use query::*;
pub use stats::*;

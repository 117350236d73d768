pub mod action;
pub mod analysis;
pub mod queue;
pub mod rule;
pub mod stats;

pub use action::*;
pub use analysis::*;
pub use queue::*;
pub use rule::*;
pub use stats::*;

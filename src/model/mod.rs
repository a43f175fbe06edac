pub mod block;
pub mod config;
pub mod partition;
pub mod planner;
pub mod range;
pub mod schedule;
pub mod task;

pub use block::*;
pub use config::*;
pub use partition::*;
pub use planner::*;
pub use range::*;
pub use schedule::*;
pub use task::*;

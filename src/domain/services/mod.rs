//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod partitioner;
mod replay_plan;

pub use partitioner::partition;
pub use replay_plan::{ReplayPlan, ReplayStep};

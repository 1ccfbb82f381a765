//! Threading and event plumbing shared by screens.

pub mod scheduler;
pub mod subscription;

pub use scheduler::{Scheduler, SchedulerHandle};
pub use subscription::Subscription;

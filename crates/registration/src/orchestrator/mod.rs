pub mod control;
pub mod executor;
pub mod retry;
pub mod scheduler;

pub use control::{Clock, ControlState, ManualClock, RunSignal, RunState, SystemClock};
pub use executor::AttemptExecutor;
pub use retry::{RetryController, RetryPolicy};
pub use scheduler::{Scheduler, SchedulerBuilder};

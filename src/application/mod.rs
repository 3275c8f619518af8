pub mod scheduler;

pub use scheduler::{Scheduler, TickReport};

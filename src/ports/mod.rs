pub mod clock;
pub mod collector;

pub use clock::Clock;
pub use collector::{CollectError, LinkCollector};

pub mod clock;
pub mod procfs;
pub mod store;

pub use clock::{ManualClock, SystemClock};
pub use procfs::{ProcfsConfig, ProcfsWirelessCollector};
pub use store::{SampleStore, StoreConfig, Subscription};

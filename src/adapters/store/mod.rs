mod fanout;
mod memory;

pub use fanout::{SubscriberId, SubscriberRegistry, Subscription};
pub use memory::{SampleStore, StoreConfig};

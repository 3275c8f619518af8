pub mod record;
pub mod sample;
pub mod selection;
pub mod status;

pub use record::InterfaceRecord;
pub use sample::Sample;
pub use selection::select_best;
pub use status::{InterfaceStatus, StatusSnapshot};

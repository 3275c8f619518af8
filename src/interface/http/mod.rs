mod handlers;
mod routes;

pub use handlers::{AppState, HistoryResponse, SampleResponse};
pub use routes::create_router;

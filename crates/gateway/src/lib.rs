//! HTTP front of the segmentation service: the JSON API, sample catalog,
//! per-session uploads and the files derived from them.

pub mod config;
pub mod error;
pub mod routes;
pub mod samples;
pub mod session;
pub mod state;
pub mod storage;

pub use error::ApiError;
pub use routes::{ResultsReply, router};
pub use state::AppState;

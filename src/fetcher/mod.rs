pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::PageFetcher;
pub use errors::FetchError;
pub use types::PageResponse;

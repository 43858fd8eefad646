pub mod client;
pub mod error;

pub use client::ProviderClient;
pub use error::{SdkError, SdkResult};

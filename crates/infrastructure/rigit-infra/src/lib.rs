pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;

pub use client::ApiClient;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use endpoints::Endpoint;
pub use error::{extract_error_message, ApiError, ApiErrorKind};

pub use reqwest::Method;

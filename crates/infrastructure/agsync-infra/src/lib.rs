pub mod credentials;
pub mod net;

// Re-exports for convenience
pub use credentials::{default_credentials_path, CredentialCache, Session};
pub use net::{default_http_client, ApiClient};

pub mod rest_client;
pub mod session;

pub use rest_client::RestBackend;
pub use session::StaticTokenSession;

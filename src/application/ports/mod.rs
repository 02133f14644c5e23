pub mod local_store;
pub mod remote_backend;
pub mod session;

pub use local_store::LocalStore;
pub use remote_backend::RemoteBackend;
pub use session::SessionProvider;

//! Cache operations

pub mod session;
pub mod store;

pub use session::SessionStore;
pub use store::CacheStore;

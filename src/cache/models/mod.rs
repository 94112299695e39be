//! Cache data models

pub mod session;

pub use session::Session;

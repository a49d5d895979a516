//! Session Store: resolves client tokens to sessions, registration and login, activity
//! tracking, and per-session sequencing.

mod credentials;
mod locks;
mod store;

pub use credentials::{hash_password, verify_password, Credentials};
pub use locks::{SessionGuard, SessionLocks};
pub use store::SessionStore;

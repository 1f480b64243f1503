//! Project-specific utilities live here.

pub mod password;

pub use password::is_password_allowed;

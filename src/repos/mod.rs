pub mod error;
pub mod memory;
pub mod password;
pub mod user_provider;

//! Core business logic for domus.

pub mod dates;
pub mod services;

pub use dates::parse_date_field;
pub use services::*;

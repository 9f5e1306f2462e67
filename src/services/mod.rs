pub mod auth_service;
pub mod field_extractor;
pub mod log_relay;

pub use auth_service::AuthService;
pub use field_extractor::{ExtractionError, FieldExtractor};
pub use log_relay::{LogLevel, LogRelay};

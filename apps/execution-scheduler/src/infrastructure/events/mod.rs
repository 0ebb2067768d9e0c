//! Event Publisher Adapters

pub mod log_publisher;

pub use log_publisher::LoggingEventPublisher;

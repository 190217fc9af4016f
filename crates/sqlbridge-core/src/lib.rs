//! Core types and traits for SQLBridge Rust.
//!
//! This crate provides the standardized, vendor-neutral database-access
//! contract that driver crates implement:
//!
//! - [`Connection`] and [`Statement`] traits for the operational surface
//! - [`Attribute`]/[`AttrValue`] for the closed connection-attribute model
//! - The shared error taxonomy ([`Error`], [`ConnectionError`], [`QueryError`])
//!   and the standardized [`ErrorInfo`] triplet
//! - The process-wide driver-name registry

pub mod attr;
pub mod connection;
pub mod driver;
pub mod error;

pub use attr::{AttrValue, Attribute};
pub use connection::{Connection, Statement};
pub use driver::{available_drivers, register_driver};
pub use error::{
    ConnectionError, ConnectionErrorKind, DriverError, Error, ErrorInfo, QueryError,
    QueryErrorKind, Result,
};

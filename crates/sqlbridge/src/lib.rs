//! SQLBridge Rust - vendor-neutral database access with native driver
//! adapters.
//!
//! SQLBridge separates the standardized connection surface from the
//! vendor-specific drivers that implement it:
//!
//! - `sqlbridge-core` defines the [`Connection`]/[`Statement`] traits, the
//!   closed attribute model, the shared error taxonomy and the driver-name
//!   registry.
//! - `sqlbridge-oci` adapts that surface onto the Oracle client library.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sqlbridge::{AttrValue, Attribute, OciConfig, OciConnection};
//!
//! let config = OciConfig::new("dbhost/XE", "scott", "tiger")
//!     .attribute(Attribute::Persistent, AttrValue::from("on"));
//! let mut conn = OciConnection::connect(&config)?;
//!
//! let deleted = conn.exec("DELETE FROM sessions WHERE expired = 1")?;
//! println!("removed {deleted} rows");
//!
//! conn.begin_transaction();
//! conn.exec("INSERT INTO audit (what) VALUES ('cleanup')")?;
//! if !conn.commit() {
//!     eprintln!("commit failed: {:?}", conn.error_info());
//! }
//! # Ok::<(), sqlbridge::Error>(())
//! ```

// Re-export the core contract
pub use sqlbridge_core::{
    AttrValue, Attribute, Connection, ConnectionError, ConnectionErrorKind, DriverError, Error,
    ErrorInfo, QueryError, QueryErrorKind, Result, Statement, available_drivers, register_driver,
};

// Re-export the Oracle adapter
pub use sqlbridge_oci::{OciConfig, OciConnection, OciStatement, QueryMode};

/// Driver crates, re-exported under their own namespaces.
pub mod oci {
    pub use sqlbridge_oci::*;
}

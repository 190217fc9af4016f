//! Oracle OCI driver for SQLBridge Rust.
//!
//! This crate adapts the standardized connection surface from
//! `sqlbridge-core` onto the Oracle client library. It owns the native
//! session handle, tracks the autocommit/transaction flag, dispatches
//! statements and normalizes the driver's error reporting.
//!
//! # Features
//!
//! - Full `Connection`/`Statement` trait implementation
//! - Autocommit-based transaction control (`begin_transaction`, `commit`,
//!   `roll_back`, `in_transaction`)
//! - Raise-vs-record error reporting: statement paths raise, transaction
//!   control records for polling via `error_code`/`error_info`
//! - Persistent-connect dispatch through the attribute model
//! - Guaranteed cursor release (`exec` is fully scoped; statements release
//!   on drop)
//!
//! The real native client is compiled in with the `oci-client` cargo
//! feature, which links the Oracle client library (`oci` on Windows,
//! `clntsh` elsewhere). Without it the crate still builds and tests, and
//! [`OciConnection::connect`] reports the driver-unavailable condition.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlbridge_oci::{OciConfig, OciConnection};
//!
//! let config = OciConfig::new("dbhost/XE", "scott", "tiger");
//! let mut conn = OciConnection::connect(&config)?;
//!
//! conn.begin_transaction();
//! conn.exec("UPDATE accounts SET balance = balance - 10 WHERE id = 1")?;
//! if !conn.commit() {
//!     eprintln!("commit failed: {:?}", conn.error_info());
//! }
//! conn.close();
//! # Ok::<(), sqlbridge_core::Error>(())
//! ```
//!
//! # Threading
//!
//! The model is single-threaded and blocking: every operation is a direct
//! call into the native driver, one connection owns exactly one native
//! handle, and the adapter provides no internal synchronization. Sharing a
//! connection across threads requires external synchronization.

pub mod connection;
pub mod native;
pub mod statement;

#[cfg(feature = "oci-client")]
pub mod client;
#[cfg(feature = "oci-client")]
pub mod ffi;

#[cfg(test)]
pub(crate) mod testkit;

pub use connection::{OciConfig, OciConnection, QueryMode};
pub use statement::OciStatement;

/// Name this driver reports under in the platform driver list.
pub const DRIVER_NAME: &str = "oci";

/// The platform's driver list with this adapter included.
///
/// Returns the registered driver names with `"oci"` appended when not
/// already present, so discovery callers always see this adapter listed.
pub fn available_drivers() -> Vec<String> {
    let mut names = sqlbridge_core::available_drivers();
    if !names.iter().any(|name| name == DRIVER_NAME) {
        names.push(DRIVER_NAME.to_string());
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_list_includes_oci() {
        let names = available_drivers();
        assert_eq!(names.iter().filter(|n| n.as_str() == "oci").count(), 1);
    }

    #[test]
    fn driver_list_does_not_duplicate_a_registered_oci() {
        sqlbridge_core::register_driver("oci");
        let names = available_drivers();
        assert_eq!(names.iter().filter(|n| n.as_str() == "oci").count(), 1);
    }
}

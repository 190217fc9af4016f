//! The native driver boundary.
//!
//! These traits describe the primitive surface the Oracle client library
//! exposes to the adapter: connect and persistent-connect, statement parse
//! and execute, explicit commit/rollback, a single error-retrieval primitive
//! keyed off a handle, and close. The adapter is written entirely against
//! this boundary; the real client ([`crate::client`], behind the
//! `oci-client` feature) and the in-memory fake used by tests both implement
//! it.
//!
//! No `Send`/`Sync` bounds: the execution model is single-threaded and
//! blocking, and a handle must not be shared across threads without external
//! synchronization.

use sqlbridge_core::{DriverError, Result};

/// Entry point to a native client: produces connection handles.
pub trait NativeDriver {
    /// Establish a session. `dsn` is the Oracle connect string
    /// (`host[:port]/service`), as handed to the client library verbatim.
    fn connect(
        &self,
        dsn: &str,
        username: &str,
        password: &str,
    ) -> std::result::Result<Box<dyn NativeHandle>, DriverError>;

    /// Establish a session through the persistent-connect primitive.
    ///
    /// Drivers without a distinct persistent path serve a standard session.
    fn connect_persistent(
        &self,
        dsn: &str,
        username: &str,
        password: &str,
    ) -> std::result::Result<Box<dyn NativeHandle>, DriverError> {
        self.connect(dsn, username, password)
    }
}

/// One live session with the database.
pub trait NativeHandle {
    /// Parse a statement, yielding a cursor. Parsing does not execute.
    fn parse(&mut self, sql: &str) -> std::result::Result<Box<dyn NativeCursor>, DriverError>;

    /// Commit the current transaction. On failure the error is retrievable
    /// through [`last_error`](NativeHandle::last_error).
    fn commit(&mut self) -> bool;

    /// Roll back the current transaction. Same error contract as `commit`.
    fn rollback(&mut self) -> bool;

    /// The error-retrieval primitive: diagnostic state of the last call made
    /// through this handle, absent when it succeeded.
    fn last_error(&self) -> Option<DriverError>;

    /// End the session and release the native resources.
    fn close(&mut self);
}

/// A parsed statement.
pub trait NativeCursor {
    /// Execute the statement. With `commit_on_success` the driver commits as
    /// part of the call; without it, execution opens (or continues) the
    /// implicit transaction.
    fn execute(&mut self, commit_on_success: bool) -> bool;

    /// Rows affected by the statement so far.
    fn row_count(&self) -> u64;

    /// Diagnostic state of the last call made through this cursor.
    fn last_error(&self) -> Option<DriverError>;

    /// Release the cursor.
    fn close(&mut self);
}

/// Obtain the native client compiled into this build.
///
/// Fails with [`ConnectionErrorKind::Unavailable`] when the build carries no
/// client support. This condition is fatal and non-retryable, unlike a
/// failed connect attempt.
#[cfg(feature = "oci-client")]
pub fn load_driver() -> Result<Box<dyn NativeDriver>> {
    Ok(Box::new(crate::client::OciClient::init()?))
}

/// Obtain the native client compiled into this build.
///
/// Fails with [`ConnectionErrorKind::Unavailable`] when the build carries no
/// client support. This condition is fatal and non-retryable, unlike a
/// failed connect attempt.
#[cfg(not(feature = "oci-client"))]
pub fn load_driver() -> Result<Box<dyn NativeDriver>> {
    use sqlbridge_core::{ConnectionError, ConnectionErrorKind, Error};

    Err(Error::Connection(ConnectionError {
        kind: ConnectionErrorKind::Unavailable,
        message: "oci driver support is not compiled into this build \
                  (enable the `oci-client` feature and install the Oracle client library)"
            .to_string(),
        source: None,
    }))
}

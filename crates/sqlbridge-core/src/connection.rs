//! Database connection traits.
//!
//! This module defines the standardized, vendor-neutral surface drivers
//! implement:
//!
//! - [`Connection`] - query/exec/prepare, attribute and transaction control,
//!   error reporting and literal quoting
//! - [`Statement`] - the statement-executor contract a driver's statement
//!   type must satisfy
//!
//! All operations are synchronous, blocking calls into the native driver.
//! A connection owns exactly one native handle; sharing it across threads
//! requires external synchronization, the adapter provides none.

use crate::attr::{AttrValue, Attribute};
use crate::error::{ErrorInfo, Result};

/// A statement executor bound to a connection.
///
/// The executor owns a native cursor. Releasing the cursor is idempotent and
/// must also happen when the executor is dropped.
pub trait Statement {
    /// Execute the statement against the native driver.
    fn execute(&mut self) -> Result<()>;

    /// Number of rows affected by the statement.
    ///
    /// Zero when the statement has not executed or the cursor was released.
    fn row_count(&self) -> u64;

    /// Release the native cursor. Safe to call more than once.
    fn close_cursor(&mut self);
}

/// A connection to a database through a native driver.
///
/// The transaction model is autocommit-based: `begin_transaction` turns
/// autocommit off, `commit`/`roll_back` act on the native handle without
/// touching the flag, and `in_transaction` is the negation of the flag.
///
/// Error reporting is deliberately asymmetric: `query`/`exec`/`prepare`
/// raise, while `commit`/`roll_back` record the native error for polling via
/// [`error_code`](Connection::error_code)/[`error_info`](Connection::error_info).
pub trait Connection {
    /// Name this driver registers under, e.g. `"oci"`.
    const DRIVER_NAME: &'static str;

    /// The statement executor type produced by this connection.
    type Stmt: Statement;

    /// Execute `sql` and return the already-executed statement.
    fn query(&mut self, sql: &str) -> Result<Self::Stmt>;

    /// Execute `sql` and return the affected-row count. The underlying
    /// cursor is always released before this returns.
    fn exec(&mut self, sql: &str) -> Result<u64>;

    /// Parse `sql` without executing it.
    fn prepare(&mut self, sql: &str) -> Result<Self::Stmt>;

    /// Set a connection attribute. Unrecognized identifiers are ignored.
    fn set_attribute(&mut self, attr: Attribute, value: AttrValue);

    /// Current value of a recognized attribute, absent for the rest.
    fn get_attribute(&self, attr: Attribute) -> Option<AttrValue>;

    /// Commit the in-flight work. Returns the native success flag; failures
    /// are recorded, not raised.
    fn commit(&mut self) -> bool;

    /// Roll back the in-flight work. Same reporting contract as `commit`.
    fn roll_back(&mut self) -> bool;

    /// Turn autocommit off. No native call is issued; the driver opens a
    /// transaction implicitly on the next statement.
    fn begin_transaction(&mut self);

    fn in_transaction(&self) -> bool;

    /// Release the native handle. Idempotent.
    fn close(&mut self);

    /// Native code of the stored error, absent after a successful operation.
    fn error_code(&self) -> Option<i32>;

    /// Standardized error-info triplet for the stored error.
    fn error_info(&self) -> Option<ErrorInfo>;

    /// Quote a string literal for interpolation into SQL: embedded single
    /// quotes are doubled and the result is wrapped in single quotes.
    fn quote(&self, text: &str) -> String {
        let mut quoted = String::with_capacity(text.len() + 2);
        quoted.push('\'');
        for ch in text.chars() {
            if ch == '\'' {
                quoted.push('\'');
            }
            quoted.push(ch);
        }
        quoted.push('\'');
        quoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullStatement;

    impl Statement for NullStatement {
        fn execute(&mut self) -> Result<()> {
            Ok(())
        }

        fn row_count(&self) -> u64 {
            0
        }

        fn close_cursor(&mut self) {}
    }

    /// Minimal impl to exercise the default `quote`.
    struct NullConnection;

    impl Connection for NullConnection {
        const DRIVER_NAME: &'static str = "null";
        type Stmt = NullStatement;

        fn query(&mut self, _sql: &str) -> Result<Self::Stmt> {
            Ok(NullStatement)
        }

        fn exec(&mut self, _sql: &str) -> Result<u64> {
            Ok(0)
        }

        fn prepare(&mut self, _sql: &str) -> Result<Self::Stmt> {
            Ok(NullStatement)
        }

        fn set_attribute(&mut self, _attr: Attribute, _value: AttrValue) {}

        fn get_attribute(&self, _attr: Attribute) -> Option<AttrValue> {
            None
        }

        fn commit(&mut self) -> bool {
            true
        }

        fn roll_back(&mut self) -> bool {
            true
        }

        fn begin_transaction(&mut self) {}

        fn in_transaction(&self) -> bool {
            false
        }

        fn close(&mut self) {}

        fn error_code(&self) -> Option<i32> {
            None
        }

        fn error_info(&self) -> Option<ErrorInfo> {
            None
        }
    }

    fn unquote(quoted: &str) -> String {
        assert!(quoted.starts_with('\'') && quoted.ends_with('\''));
        quoted[1..quoted.len() - 1].replace("''", "'")
    }

    #[test]
    fn quote_wraps_in_single_quotes() {
        let conn = NullConnection;
        assert_eq!(conn.quote("hello"), "'hello'");
        assert_eq!(conn.quote(""), "''");
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        let conn = NullConnection;
        assert_eq!(conn.quote("O'Brien"), "'O''Brien'");
        assert_eq!(conn.quote("'"), "''''");
        assert_eq!(conn.quote("''"), "''''''");
    }

    #[test]
    fn quote_round_trips() {
        let conn = NullConnection;
        for input in ["", "plain", "O'Brien", "'", "''", "a'b'c", "it's 'x'"] {
            let quoted = conn.quote(input);
            assert_eq!(unquote(&quoted), input, "round trip failed for {input:?}");

            // no unescaped quote inside the wrapper
            let inner = &quoted[1..quoted.len() - 1];
            let mut chars = inner.chars().peekable();
            while let Some(ch) = chars.next() {
                if ch == '\'' {
                    assert_eq!(chars.next(), Some('\''), "unescaped quote in {quoted:?}");
                }
            }
        }
    }

    #[test]
    fn driver_name_is_exposed_as_const() {
        assert_eq!(NullConnection::DRIVER_NAME, "null");
    }
}

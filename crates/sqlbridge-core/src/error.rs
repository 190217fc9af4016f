//! Error types for SQLBridge operations.

use std::fmt;

/// The primary error type for all SQLBridge operations.
#[derive(Debug)]
pub enum Error {
    /// Connection-related errors (driver unavailable, connect, closed handle)
    Connection(ConnectionError),
    /// Statement construction or execution errors
    Query(QueryError),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Native driver support is not compiled in or cannot be loaded.
    /// Fatal and non-retryable, unlike a failed connect attempt.
    Unavailable,
    /// Failed to establish connection
    Connect,
    /// Authentication failed
    Authentication,
    /// Operation attempted on a closed connection
    Disconnected,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    /// Native error code reported by the driver, if any.
    pub code: Option<i32>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Table or column not found
    NotFound,
    /// Permission denied
    Permission,
    /// Deadlock detected
    Deadlock,
    /// Data too large for column
    DataTruncation,
    /// Other database error
    Database,
}

/// The error record retrieved from a native driver's error primitive.
///
/// This is the shape stored in a connection's "last error" slot and the
/// source from which [`ErrorInfo`] triplets are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}

impl DriverError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The standardized error-info triplet exposed to callers.
///
/// Drivers with no separate SQLSTATE concept duplicate the native code into
/// both numeric fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: i32,
    pub driver_code: i32,
    pub message: String,
}

impl From<&DriverError> for ErrorInfo {
    fn from(err: &DriverError) -> Self {
        Self {
            code: err.code,
            driver_code: err.code,
            message: err.message.clone(),
        }
    }
}

impl Error {
    /// Native error code carried by this error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Query(q) => q.code,
            Error::Connection(_) => None,
        }
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            Error::Connection(_) => None,
        }
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Is this the fatal "native driver support missing" condition?
    pub fn is_driver_unavailable(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Unavailable,
                ..
            })
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Query(e) => {
                if let Some(code) = e.code {
                    write!(f, "Query error (code {}): {}", code, e.message)
                } else {
                    write!(f, "Query error: {}", e.message)
                }
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "{} (code {})", self.message, code)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

/// Result type alias for SQLBridge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_accessors() {
        let err = Error::Query(QueryError {
            kind: QueryErrorKind::Syntax,
            sql: Some("SELECT".to_string()),
            code: Some(900),
            message: "ORA-00900: invalid SQL statement".to_string(),
            source: None,
        });

        assert_eq!(err.code(), Some(900));
        assert_eq!(err.sql(), Some("SELECT"));
        assert!(!err.is_connection_error());
        assert!(!err.is_driver_unavailable());
        assert!(err.to_string().contains("ORA-00900"));
    }

    #[test]
    fn driver_unavailable_is_distinct_from_connect_failure() {
        let unavailable = Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Unavailable,
            message: "oci client support not compiled in".to_string(),
            source: None,
        });
        let refused = Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Connect,
            message: "listener refused the connection".to_string(),
            source: None,
        });

        assert!(unavailable.is_driver_unavailable());
        assert!(!refused.is_driver_unavailable());
        assert!(refused.is_connection_error());
    }

    #[test]
    fn error_info_duplicates_native_code() {
        let native = DriverError::new(942, "ORA-00942: table or view does not exist");
        let info = ErrorInfo::from(&native);

        assert_eq!(info.code, 942);
        assert_eq!(info.driver_code, 942);
        assert_eq!(info.message, native.message);
    }
}

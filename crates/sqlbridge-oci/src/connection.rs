//! The Oracle connection adapter.
//!
//! Owns one native session handle, tracks the autocommit/transaction flag,
//! dispatches statements and normalizes error reporting into the
//! standardized shape.
//!
//! Error reporting is asymmetric on purpose: `query`/`exec`/`prepare` raise,
//! while `commit`/`roll_back` record the native diagnostic for polling via
//! `error_code`/`error_info`. Unifying the two would change observable
//! behavior for callers of the standardized interface.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use sqlbridge_core::{
    AttrValue, Attribute, Connection, ConnectionError, ConnectionErrorKind, DriverError, Error,
    ErrorInfo, QueryError, Result, Statement,
};

use crate::native::{self, NativeDriver, NativeHandle};
use crate::statement::{OciStatement, query_kind_for};

/// Connection parameters for the Oracle adapter.
#[derive(Debug, Clone)]
pub struct OciConfig {
    /// Oracle connect string (`host[:port]/service`), passed to the client
    /// library verbatim.
    pub dsn: String,
    pub username: String,
    pub password: String,
    /// Request the persistent-connect primitive.
    pub persistent: bool,
}

impl OciConfig {
    pub fn new(
        dsn: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            dsn: dsn.into(),
            username: username.into(),
            password: password.into(),
            persistent: false,
        }
    }

    /// Toggle persistent-connect semantics.
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Apply a connect-time attribute. [`Attribute::Persistent`] is honored
    /// (truthy forms: `true`, nonzero, `"on"`/`"true"` case-insensitive);
    /// any other identifier is ignored.
    pub fn attribute(mut self, attr: Attribute, value: AttrValue) -> Self {
        match attr {
            Attribute::Persistent => self.persistent = value.is_truthy(),
            other => {
                tracing::trace!(attribute = ?other, "connect-time attribute ignored");
            }
        }
        self
    }
}

/// Fetch-mode arguments accepted by [`OciConnection::query_with_mode`] for
/// call-site compatibility with other drivers. The Oracle adapter does not
/// interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    #[default]
    Default,
    /// Fetch a single column by zero-based index.
    Column(u32),
}

/// One live session with an Oracle database.
///
/// The native handle is owned exclusively and released exactly once, by
/// [`close`](OciConnection::close) or on drop. The model is single-threaded
/// and blocking; the adapter provides no internal synchronization.
pub struct OciConnection {
    handle: Option<Box<dyn NativeHandle>>,
    /// Shared with statements so execution observes the flag current at
    /// execute time, not at parse time.
    autocommit: Rc<Cell<bool>>,
    last_error: Option<DriverError>,
}

impl std::fmt::Debug for OciConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciConnection")
            .field("handle", &self.handle.as_ref().map(|_| "<handle>"))
            .field("autocommit", &self.autocommit)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl OciConnection {
    /// Connect through the native client compiled into this build.
    ///
    /// Fails with [`ConnectionErrorKind::Unavailable`] when no client
    /// support was compiled in, and with a connect/authentication error when
    /// the driver rejects the session.
    pub fn connect(config: &OciConfig) -> Result<Self> {
        let driver = native::load_driver()?;
        Self::connect_with(driver.as_ref(), config)
    }

    /// Connect through an explicitly supplied native driver.
    pub fn connect_with(driver: &dyn NativeDriver, config: &OciConfig) -> Result<Self> {
        let attempt = if config.persistent {
            driver.connect_persistent(&config.dsn, &config.username, &config.password)
        } else {
            driver.connect(&config.dsn, &config.username, &config.password)
        };
        let handle = attempt.map_err(|err| connect_error(&config.dsn, err))?;

        let mut conn = Self {
            handle: Some(handle),
            autocommit: Rc::new(Cell::new(true)),
            last_error: None,
        };
        // Some native connects return a usable handle with a deferred
        // diagnostic attached; pick it up before anything else runs.
        conn.refresh_error();
        tracing::debug!(dsn = %config.dsn, persistent = config.persistent, "session established");
        Ok(conn)
    }

    /// Execute `sql` and return the already-executed statement.
    pub fn query(&mut self, sql: &str) -> Result<OciStatement> {
        let mut stmt = self.prepare(sql)?;
        match stmt.execute() {
            Ok(()) => {
                self.refresh_error();
                Ok(stmt)
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// [`query`](Self::query) with fetch-mode arguments. The mode is
    /// accepted for interface compatibility and not interpreted.
    pub fn query_with_mode(&mut self, sql: &str, mode: QueryMode) -> Result<OciStatement> {
        if mode != QueryMode::Default {
            tracing::trace!(?mode, "fetch mode accepted but not interpreted");
        }
        self.query(sql)
    }

    /// Execute `sql` and return the affected-row count.
    ///
    /// The cursor lives only inside this call: it is released before the
    /// count is returned, and statement drop guarantees release on the
    /// failure path as well.
    pub fn exec(&mut self, sql: &str) -> Result<u64> {
        let mut stmt = self.query(sql)?;
        let rows = stmt.row_count();
        stmt.close_cursor();
        Ok(rows)
    }

    /// Parse `sql` without executing it.
    pub fn prepare(&mut self, sql: &str) -> Result<OciStatement> {
        let handle = self.live_handle()?;
        match handle.parse(sql) {
            Ok(cursor) => Ok(OciStatement::new(sql, cursor, Rc::clone(&self.autocommit))),
            Err(native) => {
                tracing::warn!(code = native.code, "statement parse failed");
                let err = Error::Query(QueryError {
                    kind: query_kind_for(native.code),
                    sql: Some(sql.to_string()),
                    code: Some(native.code),
                    message: native.message.clone(),
                    source: None,
                });
                self.last_error = Some(native);
                Err(err)
            }
        }
    }

    /// [`prepare`](Self::prepare) with driver options. The options are
    /// accepted for interface compatibility and not interpreted.
    pub fn prepare_with(
        &mut self,
        sql: &str,
        options: &[(Attribute, AttrValue)],
    ) -> Result<OciStatement> {
        if !options.is_empty() {
            tracing::trace!(count = options.len(), "statement options accepted but not interpreted");
        }
        self.prepare(sql)
    }

    /// Set a connection attribute. Only [`Attribute::Autocommit`] is
    /// interpreted; unrecognized identifiers are ignored without error.
    pub fn set_attribute(&mut self, attr: Attribute, value: AttrValue) {
        match attr {
            Attribute::Autocommit => {
                let on = value.is_truthy();
                self.autocommit.set(on);
                tracing::debug!(autocommit = on, "autocommit switched");
            }
            other => {
                tracing::trace!(attribute = ?other, "attribute not supported, ignored");
            }
        }
    }

    /// Current value for [`Attribute::Autocommit`], absent for the rest.
    pub fn get_attribute(&self, attr: Attribute) -> Option<AttrValue> {
        match attr {
            Attribute::Autocommit => Some(AttrValue::Bool(self.autocommit.get())),
            _ => None,
        }
    }

    /// Current autocommit flag. Duplicate accessor kept for interface
    /// parity.
    pub fn auto_commit(&self) -> bool {
        self.autocommit.get()
    }

    /// Commit through the native primitive and refresh the diagnostic
    /// state. Returns the native success flag; failures are recorded for
    /// polling, never raised. The autocommit flag is left untouched.
    pub fn commit(&mut self) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let ok = handle.commit();
        if !ok {
            tracing::warn!("commit reported failure");
        }
        self.refresh_error();
        ok
    }

    /// Roll back through the native primitive. Same reporting contract as
    /// [`commit`](Self::commit).
    pub fn roll_back(&mut self) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let ok = handle.rollback();
        if !ok {
            tracing::warn!("rollback reported failure");
        }
        self.refresh_error();
        ok
    }

    /// Turn autocommit off. No native call is issued: the driver opens the
    /// transaction implicitly on the first statement executed without
    /// commit-on-success.
    pub fn begin_transaction(&mut self) {
        self.set_attribute(Attribute::Autocommit, AttrValue::Bool(false));
    }

    pub fn in_transaction(&self) -> bool {
        !self.autocommit.get()
    }

    /// Release the native handle. Safe to call more than once; after the
    /// first call the connection only answers state accessors.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
            tracing::debug!("session closed");
        }
    }

    /// Re-read the diagnostic state from the native handle, overwriting the
    /// stored record (clearing it when the driver reports no error).
    ///
    /// Invoked internally after every driver call; exposed so callers
    /// integrating external diagnostics can force a refresh. Silent no-op
    /// once the handle has been released.
    pub fn refresh_error(&mut self) {
        if let Some(handle) = self.handle.as_ref() {
            self.last_error = handle.last_error();
        }
    }

    /// Native code of the stored error, absent after a successful
    /// operation.
    pub fn error_code(&self) -> Option<i32> {
        self.last_error.as_ref().map(|err| err.code)
    }

    /// Standardized error-info triplet. Both numeric fields carry the
    /// native code; the adapter has no separate SQLSTATE concept.
    pub fn error_info(&self) -> Option<ErrorInfo> {
        self.last_error.as_ref().map(ErrorInfo::from)
    }

    /// Legacy diagnostic interceptor.
    ///
    /// Scans `message` for an `ORA-<digits>` pattern; on a match the parsed
    /// code is stored together with the full message text. Without a match
    /// the stored state is refreshed from the native handle instead.
    pub fn error_handler(&mut self, message: &str) {
        if let Some(captures) = ora_pattern().captures(message) {
            let code = captures[1].parse().unwrap_or(0);
            tracing::warn!(code, "intercepted driver diagnostic");
            self.last_error = Some(DriverError::new(code, message));
        } else {
            self.refresh_error();
        }
    }

    fn live_handle(&mut self) -> Result<&mut Box<dyn NativeHandle>> {
        self.handle.as_mut().ok_or_else(|| {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Disconnected,
                message: "connection is closed".to_string(),
                source: None,
            })
        })
    }

    fn record_failure(&mut self, err: &Error) {
        if let Error::Query(query) = err {
            self.last_error = Some(DriverError::new(
                query.code.unwrap_or(0),
                query.message.clone(),
            ));
        }
    }
}

impl Drop for OciConnection {
    fn drop(&mut self) {
        self.close();
    }
}

impl Connection for OciConnection {
    const DRIVER_NAME: &'static str = crate::DRIVER_NAME;
    type Stmt = OciStatement;

    fn query(&mut self, sql: &str) -> Result<OciStatement> {
        OciConnection::query(self, sql)
    }

    fn exec(&mut self, sql: &str) -> Result<u64> {
        OciConnection::exec(self, sql)
    }

    fn prepare(&mut self, sql: &str) -> Result<OciStatement> {
        OciConnection::prepare(self, sql)
    }

    fn set_attribute(&mut self, attr: Attribute, value: AttrValue) {
        OciConnection::set_attribute(self, attr, value);
    }

    fn get_attribute(&self, attr: Attribute) -> Option<AttrValue> {
        OciConnection::get_attribute(self, attr)
    }

    fn commit(&mut self) -> bool {
        OciConnection::commit(self)
    }

    fn roll_back(&mut self) -> bool {
        OciConnection::roll_back(self)
    }

    fn begin_transaction(&mut self) {
        OciConnection::begin_transaction(self);
    }

    fn in_transaction(&self) -> bool {
        OciConnection::in_transaction(self)
    }

    fn close(&mut self) {
        OciConnection::close(self);
    }

    fn error_code(&self) -> Option<i32> {
        OciConnection::error_code(self)
    }

    fn error_info(&self) -> Option<ErrorInfo> {
        OciConnection::error_info(self)
    }
}

fn connect_error(dsn: &str, err: DriverError) -> Error {
    // ORA-01017: invalid username/password
    let kind = if err.code == 1017 {
        ConnectionErrorKind::Authentication
    } else {
        ConnectionErrorKind::Connect
    };
    Error::Connection(ConnectionError {
        kind,
        message: format!("connect to {} failed: {}", dsn, err.message),
        source: None,
    })
}

fn ora_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"ORA-(\d+)").expect("pattern is valid"))
}

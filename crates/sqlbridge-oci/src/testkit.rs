//! Scripted in-memory implementation of the native boundary.
//!
//! Stands in for the Oracle client in tests: every primitive call is
//! recorded in a shared log so tests can assert dispatch, ordering and
//! release discipline, and failure modes are injected through the driver's
//! public fields.

use std::cell::RefCell;
use std::rc::Rc;

use sqlbridge_core::DriverError;

use crate::native::{NativeCursor, NativeDriver, NativeHandle};

pub(crate) type CallLog = Rc<RefCell<Vec<String>>>;

pub(crate) struct FakeDriver {
    log: CallLog,
    /// Fail connect/pconnect outright with this error.
    pub fail_connect: Option<DriverError>,
    /// Hand out a handle that already carries this diagnostic, the way some
    /// native connects succeed while leaving a deferred error behind.
    pub deferred_error: Option<DriverError>,
    /// Make the next commit report failure.
    pub fail_commit: Option<DriverError>,
    /// Rows affected reported for DML statements.
    pub rows_affected: u64,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            fail_connect: None,
            deferred_error: None,
            fail_commit: None,
            rows_affected: 1,
        }
    }

    pub fn with_rows_affected(rows: u64) -> Self {
        let mut driver = Self::new();
        driver.rows_affected = rows;
        driver
    }

    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    fn handle(&self) -> Box<dyn NativeHandle> {
        Box::new(FakeHandle {
            log: Rc::clone(&self.log),
            error: self.deferred_error.clone(),
            fail_commit: self.fail_commit.clone(),
            rows_affected: self.rows_affected,
            closed: false,
        })
    }
}

impl NativeDriver for FakeDriver {
    fn connect(
        &self,
        dsn: &str,
        username: &str,
        _password: &str,
    ) -> Result<Box<dyn NativeHandle>, DriverError> {
        if let Some(err) = &self.fail_connect {
            self.log.borrow_mut().push(format!("connect {username}@{dsn} -> error"));
            return Err(err.clone());
        }
        self.log.borrow_mut().push(format!("connect {username}@{dsn}"));
        Ok(self.handle())
    }

    fn connect_persistent(
        &self,
        dsn: &str,
        username: &str,
        _password: &str,
    ) -> Result<Box<dyn NativeHandle>, DriverError> {
        if let Some(err) = &self.fail_connect {
            self.log.borrow_mut().push(format!("pconnect {username}@{dsn} -> error"));
            return Err(err.clone());
        }
        self.log.borrow_mut().push(format!("pconnect {username}@{dsn}"));
        Ok(self.handle())
    }
}

struct FakeHandle {
    log: CallLog,
    error: Option<DriverError>,
    fail_commit: Option<DriverError>,
    rows_affected: u64,
    closed: bool,
}

impl NativeHandle for FakeHandle {
    fn parse(&mut self, sql: &str) -> Result<Box<dyn NativeCursor>, DriverError> {
        if sql.trim().is_empty() {
            let err = DriverError::new(900, "ORA-00900: invalid SQL statement");
            self.log.borrow_mut().push(format!("parse {sql:?} -> error"));
            self.error = Some(err.clone());
            return Err(err);
        }
        self.log.borrow_mut().push(format!("parse {sql}"));
        self.error = None;
        Ok(Box::new(FakeCursor {
            log: Rc::clone(&self.log),
            sql: sql.to_string(),
            rows_affected: self.rows_affected,
            error: None,
            rows: 0,
            released: false,
        }))
    }

    fn commit(&mut self) -> bool {
        self.log.borrow_mut().push("commit".to_string());
        if let Some(err) = self.fail_commit.take() {
            self.error = Some(err);
            return false;
        }
        self.error = None;
        true
    }

    fn rollback(&mut self) -> bool {
        self.log.borrow_mut().push("rollback".to_string());
        self.error = None;
        true
    }

    fn last_error(&self) -> Option<DriverError> {
        self.error.clone()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.borrow_mut().push("logoff".to_string());
        }
    }
}

struct FakeCursor {
    log: CallLog,
    sql: String,
    rows_affected: u64,
    error: Option<DriverError>,
    rows: u64,
    released: bool,
}

impl FakeCursor {
    fn is_dml(&self) -> bool {
        let upper = self.sql.trim_start().to_ascii_uppercase();
        ["DELETE", "UPDATE", "INSERT"]
            .iter()
            .any(|kw| upper.starts_with(kw))
    }
}

impl NativeCursor for FakeCursor {
    fn execute(&mut self, commit_on_success: bool) -> bool {
        if self.sql.trim_start().starts_with("BOGUS") {
            self.log
                .borrow_mut()
                .push(format!("execute {} commit_on_success={commit_on_success} -> error", self.sql));
            self.error = Some(DriverError::new(900, "ORA-00900: invalid SQL statement"));
            return false;
        }
        self.log
            .borrow_mut()
            .push(format!("execute {} commit_on_success={commit_on_success}", self.sql));
        self.error = None;
        self.rows = if self.is_dml() { self.rows_affected } else { 0 };
        true
    }

    fn row_count(&self) -> u64 {
        self.rows
    }

    fn last_error(&self) -> Option<DriverError> {
        self.error.clone()
    }

    fn close(&mut self) {
        if !self.released {
            self.released = true;
            self.log.borrow_mut().push("close_cursor".to_string());
        }
    }
}

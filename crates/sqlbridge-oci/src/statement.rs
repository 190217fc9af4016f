//! Statement execution against a native cursor.

use std::cell::Cell;
use std::rc::Rc;

use sqlbridge_core::{DriverError, Error, QueryError, QueryErrorKind, Result, Statement};

use crate::native::NativeCursor;

/// A statement parsed on an Oracle connection.
///
/// Produced by `query` (already executed) and `prepare` (not executed).
/// The native cursor is released by [`close_cursor`](Statement::close_cursor)
/// or, at the latest, on drop, so a statement can never leak its cursor.
pub struct OciStatement {
    sql: String,
    cursor: Option<Box<dyn NativeCursor>>,
    autocommit: Rc<Cell<bool>>,
    executed: bool,
}

impl std::fmt::Debug for OciStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciStatement")
            .field("sql", &self.sql)
            .field("cursor", &self.cursor.as_ref().map(|_| "<cursor>"))
            .field("autocommit", &self.autocommit)
            .field("executed", &self.executed)
            .finish()
    }
}

impl OciStatement {
    pub(crate) fn new(
        sql: &str,
        cursor: Box<dyn NativeCursor>,
        autocommit: Rc<Cell<bool>>,
    ) -> Self {
        Self {
            sql: sql.to_string(),
            cursor: Some(cursor),
            autocommit,
            executed: false,
        }
    }

    /// The statement text this executor was constructed with.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Whether `execute` has completed successfully.
    pub fn executed(&self) -> bool {
        self.executed
    }
}

impl Statement for OciStatement {
    fn execute(&mut self) -> Result<()> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(Error::Query(QueryError {
                kind: QueryErrorKind::Database,
                sql: Some(self.sql.clone()),
                code: None,
                message: "statement cursor already released".to_string(),
                source: None,
            }));
        };

        // The autocommit flag is read at execute time, not at parse time:
        // a statement prepared before begin_transaction() must not commit.
        if cursor.execute(self.autocommit.get()) {
            self.executed = true;
            return Ok(());
        }

        let native = cursor
            .last_error()
            .unwrap_or_else(|| DriverError::new(0, "statement execution failed"));
        tracing::warn!(code = native.code, sql = %self.sql, "statement execution failed");
        Err(Error::Query(QueryError {
            kind: query_kind_for(native.code),
            sql: Some(self.sql.clone()),
            code: Some(native.code),
            message: native.message,
            source: None,
        }))
    }

    fn row_count(&self) -> u64 {
        self.cursor.as_ref().map_or(0, |c| c.row_count())
    }

    fn close_cursor(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
    }
}

impl Drop for OciStatement {
    fn drop(&mut self) {
        self.close_cursor();
    }
}

/// Classify a native ORA error code.
pub(crate) fn query_kind_for(code: i32) -> QueryErrorKind {
    match code {
        // ORA-00001 unique constraint, ORA-02290..92 check/FK constraints
        1 | 2290..=2292 => QueryErrorKind::Constraint,
        // ORA-00060 deadlock detected while waiting for resource
        60 => QueryErrorKind::Deadlock,
        // invalid SQL statement / missing expression / SQL command not
        // properly ended
        900 | 911 | 933 | 936 => QueryErrorKind::Syntax,
        // ORA-00904 invalid identifier, ORA-00942 table or view does not exist
        904 | 942 => QueryErrorKind::NotFound,
        // invalid username/password, insufficient privileges
        1017 | 1031 | 1045 => QueryErrorKind::Permission,
        // ORA-01438 value larger than precision, ORA-12899 value too large
        1438 | 12899 => QueryErrorKind::DataTruncation,
        _ => QueryErrorKind::Database,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{NativeDriver, NativeHandle};
    use crate::testkit::FakeDriver;

    fn parsed(driver: &FakeDriver, sql: &str) -> OciStatement {
        let mut handle = driver.connect("db", "u", "p").unwrap();
        let cursor = handle.parse(sql).unwrap();
        OciStatement::new(sql, cursor, Rc::new(Cell::new(true)))
    }

    #[test]
    fn execute_marks_statement_executed() {
        let driver = FakeDriver::new();
        let mut stmt = parsed(&driver, "SELECT 1 FROM dual");

        assert!(!stmt.executed());
        stmt.execute().unwrap();
        assert!(stmt.executed());
    }

    #[test]
    fn execute_passes_autocommit_mode_to_the_cursor() {
        let driver = FakeDriver::new();
        let log = driver.log();

        let mut handle = driver.connect("db", "u", "p").unwrap();
        let cursor = handle.parse("DELETE FROM t").unwrap();
        let autocommit = Rc::new(Cell::new(true));
        let mut stmt = OciStatement::new("DELETE FROM t", cursor, Rc::clone(&autocommit));

        stmt.execute().unwrap();
        assert!(
            log.borrow()
                .iter()
                .any(|entry| entry.contains("commit_on_success=true"))
        );

        // flag flipped after parse is still observed
        let cursor = handle.parse("DELETE FROM t").unwrap();
        let mut stmt = OciStatement::new("DELETE FROM t", cursor, Rc::clone(&autocommit));
        autocommit.set(false);
        stmt.execute().unwrap();
        assert!(
            log.borrow()
                .iter()
                .any(|entry| entry.contains("commit_on_success=false"))
        );
    }

    #[test]
    fn failed_execute_surfaces_the_native_error() {
        let driver = FakeDriver::new();
        let mut stmt = parsed(&driver, "BOGUS SQL");

        let err = stmt.execute().unwrap_err();
        assert_eq!(err.code(), Some(900));
        assert!(err.to_string().contains("ORA-00900"));
        assert!(!stmt.executed());
    }

    #[test]
    fn row_count_is_zero_after_release() {
        let driver = FakeDriver::with_rows_affected(3);
        let mut stmt = parsed(&driver, "DELETE FROM t");

        stmt.execute().unwrap();
        assert_eq!(stmt.row_count(), 3);

        stmt.close_cursor();
        assert_eq!(stmt.row_count(), 0);
    }

    #[test]
    fn close_cursor_is_idempotent() {
        let driver = FakeDriver::new();
        let log = driver.log();
        let mut stmt = parsed(&driver, "SELECT 1 FROM dual");

        stmt.close_cursor();
        stmt.close_cursor();

        let closes = log
            .borrow()
            .iter()
            .filter(|entry| entry.as_str() == "close_cursor")
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn drop_releases_the_cursor() {
        let driver = FakeDriver::new();
        let log = driver.log();

        {
            let _stmt = parsed(&driver, "SELECT 1 FROM dual");
        }

        assert!(log.borrow().iter().any(|entry| entry == "close_cursor"));
    }

    #[test]
    fn executing_a_released_cursor_fails() {
        let driver = FakeDriver::new();
        let mut stmt = parsed(&driver, "SELECT 1 FROM dual");

        stmt.close_cursor();
        let err = stmt.execute().unwrap_err();
        assert!(err.to_string().contains("released"));
    }

    #[test]
    fn ora_codes_map_onto_query_kinds() {
        assert_eq!(query_kind_for(1), QueryErrorKind::Constraint);
        assert_eq!(query_kind_for(2291), QueryErrorKind::Constraint);
        assert_eq!(query_kind_for(60), QueryErrorKind::Deadlock);
        assert_eq!(query_kind_for(900), QueryErrorKind::Syntax);
        assert_eq!(query_kind_for(942), QueryErrorKind::NotFound);
        assert_eq!(query_kind_for(1017), QueryErrorKind::Permission);
        assert_eq!(query_kind_for(12899), QueryErrorKind::DataTruncation);
        assert_eq!(query_kind_for(7445), QueryErrorKind::Database);
    }
}

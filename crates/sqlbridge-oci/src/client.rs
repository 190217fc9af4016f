//! The native client over the Oracle Call Interface.
//!
//! Implements the native boundary ([`crate::native`]) with real OCI calls.
//! One environment handle is shared by every session the client opens; each
//! session owns its error/server/session/service-context handles and is torn
//! down exactly once. Cursors hold the session alive through an `Rc` and go
//! inert once the session ends.

#![allow(unsafe_code)]

use std::cell::Cell;
use std::ptr;
use std::rc::Rc;

use sqlbridge_core::{ConnectionError, ConnectionErrorKind, DriverError, Error, Result};

use crate::ffi;
use crate::native::{NativeCursor, NativeDriver, NativeHandle};

fn call_ok(rc: i32) -> bool {
    rc == ffi::OCI_SUCCESS || rc == ffi::OCI_SUCCESS_WITH_INFO
}

/// Owned OCI environment, freed exactly once when the last user drops it.
struct Environment {
    raw: *mut ffi::OCIEnv,
}

impl Environment {
    fn create() -> Result<Self> {
        let mut raw: *mut ffi::OCIEnv = ptr::null_mut();
        let rc = unsafe {
            ffi::OCIEnvNlsCreate(
                &mut raw,
                ffi::OCI_DEFAULT,
                ptr::null(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
                0,
                ptr::null(),
                0,
                0,
            )
        };
        if !call_ok(rc) || raw.is_null() {
            return Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Unavailable,
                message: format!("could not create an OCI environment (rc {rc})"),
                source: None,
            }));
        }
        Ok(Self { raw })
    }

    fn alloc(&self, hnd_type: u32) -> std::result::Result<*mut std::ffi::c_void, DriverError> {
        let mut handle: *mut std::ffi::c_void = ptr::null_mut();
        let rc = unsafe { ffi::OCIHandleAlloc(self.raw, &mut handle, hnd_type, 0, ptr::null()) };
        if !call_ok(rc) || handle.is_null() {
            return Err(DriverError::new(
                rc,
                format!("could not allocate OCI handle of type {hnd_type}"),
            ));
        }
        Ok(handle)
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        unsafe {
            ffi::OCIHandleFree(self.raw.cast(), ffi::OCI_HTYPE_ENV);
        }
    }
}

/// The OCI-backed native driver.
pub struct OciClient {
    env: Rc<Environment>,
}

impl OciClient {
    /// Create the shared environment. Fails with the driver-unavailable
    /// condition when the client library cannot initialize.
    pub fn init() -> Result<Self> {
        Ok(Self {
            env: Rc::new(Environment::create()?),
        })
    }
}

impl NativeDriver for OciClient {
    fn connect(
        &self,
        dsn: &str,
        username: &str,
        password: &str,
    ) -> std::result::Result<Box<dyn NativeHandle>, DriverError> {
        let session = Session::open(Rc::clone(&self.env), dsn, username, password)?;
        Ok(Box::new(OciHandle {
            session: Rc::new(session),
        }))
    }

    // The persistent path performs the same attach sequence; process-level
    // handle caching is the embedding platform's concern, not the client's.
}

/// One authenticated session: error, server, session and service-context
/// handles, torn down together exactly once.
struct Session {
    /// Keeps the shared environment alive for the session's lifetime.
    _env: Rc<Environment>,
    err: *mut ffi::OCIError,
    srv: *mut ffi::OCIServer,
    ses: *mut ffi::OCISession,
    svc: *mut ffi::OCISvcCtx,
    live: Cell<bool>,
    /// Whether the most recent call through this session failed; gates
    /// `last_error` so stale diagnostics on the error handle are not
    /// re-reported after a successful call.
    failed: Cell<bool>,
}

impl Session {
    fn open(
        env: Rc<Environment>,
        dsn: &str,
        username: &str,
        password: &str,
    ) -> std::result::Result<Self, DriverError> {
        let err = env.alloc(ffi::OCI_HTYPE_ERROR)?.cast::<ffi::OCIError>();
        let srv = match env.alloc(ffi::OCI_HTYPE_SERVER) {
            Ok(h) => h.cast::<ffi::OCIServer>(),
            Err(e) => {
                unsafe { ffi::OCIHandleFree(err.cast(), ffi::OCI_HTYPE_ERROR) };
                return Err(e);
            }
        };
        let svc = match env.alloc(ffi::OCI_HTYPE_SVCCTX) {
            Ok(h) => h.cast::<ffi::OCISvcCtx>(),
            Err(e) => {
                unsafe {
                    ffi::OCIHandleFree(srv.cast(), ffi::OCI_HTYPE_SERVER);
                    ffi::OCIHandleFree(err.cast(), ffi::OCI_HTYPE_ERROR);
                }
                return Err(e);
            }
        };
        let ses = match env.alloc(ffi::OCI_HTYPE_SESSION) {
            Ok(h) => h.cast::<ffi::OCISession>(),
            Err(e) => {
                unsafe {
                    ffi::OCIHandleFree(svc.cast(), ffi::OCI_HTYPE_SVCCTX);
                    ffi::OCIHandleFree(srv.cast(), ffi::OCI_HTYPE_SERVER);
                    ffi::OCIHandleFree(err.cast(), ffi::OCI_HTYPE_ERROR);
                }
                return Err(e);
            }
        };

        let session = Self {
            _env: env,
            err,
            srv,
            ses,
            svc,
            live: Cell::new(false),
            failed: Cell::new(false),
        };

        let rc = unsafe {
            ffi::OCIServerAttach(
                session.srv,
                session.err,
                dsn.as_ptr(),
                dsn.len() as u32,
                ffi::OCI_DEFAULT,
            )
        };
        if !call_ok(rc) {
            let error = session.take_diagnostic(rc);
            session.free_handles();
            return Err(error);
        }

        unsafe {
            ffi::OCIAttrSet(
                session.svc.cast(),
                ffi::OCI_HTYPE_SVCCTX,
                session.srv.cast(),
                0,
                ffi::OCI_ATTR_SERVER,
                session.err,
            );
            ffi::OCIAttrSet(
                session.ses.cast(),
                ffi::OCI_HTYPE_SESSION,
                username.as_ptr().cast(),
                username.len() as u32,
                ffi::OCI_ATTR_USERNAME,
                session.err,
            );
            ffi::OCIAttrSet(
                session.ses.cast(),
                ffi::OCI_HTYPE_SESSION,
                password.as_ptr().cast(),
                password.len() as u32,
                ffi::OCI_ATTR_PASSWORD,
                session.err,
            );
        }

        let rc = unsafe {
            ffi::OCISessionBegin(
                session.svc,
                session.err,
                session.ses,
                ffi::OCI_CRED_RDBMS,
                ffi::OCI_DEFAULT,
            )
        };
        if !call_ok(rc) {
            let error = session.take_diagnostic(rc);
            unsafe {
                ffi::OCIServerDetach(session.srv, session.err, ffi::OCI_DEFAULT);
            }
            session.free_handles();
            return Err(error);
        }

        unsafe {
            ffi::OCIAttrSet(
                session.svc.cast(),
                ffi::OCI_HTYPE_SVCCTX,
                session.ses.cast(),
                0,
                ffi::OCI_ATTR_SESSION,
                session.err,
            );
        }

        session.live.set(true);
        Ok(session)
    }

    /// Record the outcome of the most recent call.
    fn check(&self, rc: i32) -> bool {
        let ok = call_ok(rc);
        self.failed.set(!ok);
        ok
    }

    /// Read the diagnostic for a just-failed call, without touching the
    /// `failed` gate.
    fn take_diagnostic(&self, rc: i32) -> DriverError {
        self.read_error()
            .unwrap_or_else(|| DriverError::new(rc, format!("OCI call failed (rc {rc})")))
    }

    fn read_error(&self) -> Option<DriverError> {
        let mut code: i32 = 0;
        let mut buf = [0u8; ffi::OCI_ERROR_MAXMSG_SIZE];
        let rc = unsafe {
            ffi::OCIErrorGet(
                self.err.cast(),
                1,
                ptr::null(),
                &mut code,
                buf.as_mut_ptr(),
                buf.len() as u32,
                ffi::OCI_HTYPE_ERROR,
            )
        };
        if rc != ffi::OCI_SUCCESS || code == 0 {
            return None;
        }
        let len = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
        let message = String::from_utf8_lossy(&buf[..len]).trim_end().to_string();
        Some(DriverError::new(code, message))
    }

    fn last_error(&self) -> Option<DriverError> {
        if !self.failed.get() {
            return None;
        }
        self.read_error()
    }

    fn end(&self) {
        if self.live.replace(false) {
            unsafe {
                ffi::OCISessionEnd(self.svc, self.err, self.ses, ffi::OCI_DEFAULT);
                ffi::OCIServerDetach(self.srv, self.err, ffi::OCI_DEFAULT);
            }
            self.free_handles();
        }
    }

    fn free_handles(&self) {
        unsafe {
            ffi::OCIHandleFree(self.ses.cast(), ffi::OCI_HTYPE_SESSION);
            ffi::OCIHandleFree(self.svc.cast(), ffi::OCI_HTYPE_SVCCTX);
            ffi::OCIHandleFree(self.srv.cast(), ffi::OCI_HTYPE_SERVER);
            ffi::OCIHandleFree(self.err.cast(), ffi::OCI_HTYPE_ERROR);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end();
    }
}

struct OciHandle {
    session: Rc<Session>,
}

impl NativeHandle for OciHandle {
    fn parse(&mut self, sql: &str) -> std::result::Result<Box<dyn NativeCursor>, DriverError> {
        if !self.session.live.get() {
            return Err(DriverError::new(0, "session has ended"));
        }
        let mut stmt: *mut ffi::OCIStmt = ptr::null_mut();
        let rc = unsafe {
            ffi::OCIStmtPrepare2(
                self.session.svc,
                &mut stmt,
                self.session.err,
                sql.as_ptr(),
                sql.len() as u32,
                ptr::null(),
                0,
                ffi::OCI_NTV_SYNTAX,
                ffi::OCI_DEFAULT,
            )
        };
        if !self.session.check(rc) {
            return Err(self.session.take_diagnostic(rc));
        }
        Ok(Box::new(OciCursor {
            session: Rc::clone(&self.session),
            stmt,
            released: false,
        }))
    }

    fn commit(&mut self) -> bool {
        if !self.session.live.get() {
            return false;
        }
        let rc =
            unsafe { ffi::OCITransCommit(self.session.svc, self.session.err, ffi::OCI_DEFAULT) };
        self.session.check(rc)
    }

    fn rollback(&mut self) -> bool {
        if !self.session.live.get() {
            return false;
        }
        let rc =
            unsafe { ffi::OCITransRollback(self.session.svc, self.session.err, ffi::OCI_DEFAULT) };
        self.session.check(rc)
    }

    fn last_error(&self) -> Option<DriverError> {
        self.session.last_error()
    }

    fn close(&mut self) {
        self.session.end();
    }
}

struct OciCursor {
    session: Rc<Session>,
    stmt: *mut ffi::OCIStmt,
    released: bool,
}

impl NativeCursor for OciCursor {
    fn execute(&mut self, commit_on_success: bool) -> bool {
        if self.released || !self.session.live.get() {
            return false;
        }
        // SELECTs execute with zero iterations; everything else runs once.
        let mut stmt_type: u16 = 0;
        unsafe {
            ffi::OCIAttrGet(
                self.stmt.cast(),
                ffi::OCI_HTYPE_STMT,
                (&raw mut stmt_type).cast(),
                ptr::null_mut(),
                ffi::OCI_ATTR_STMT_TYPE,
                self.session.err,
            );
        }
        let iters = u32::from(stmt_type != ffi::OCI_STMT_SELECT);
        let mode = if commit_on_success {
            ffi::OCI_COMMIT_ON_SUCCESS
        } else {
            ffi::OCI_DEFAULT
        };
        let rc = unsafe {
            ffi::OCIStmtExecute(
                self.session.svc,
                self.stmt,
                self.session.err,
                iters,
                0,
                ptr::null(),
                ptr::null_mut(),
                mode,
            )
        };
        self.session.check(rc)
    }

    fn row_count(&self) -> u64 {
        if self.released || !self.session.live.get() {
            return 0;
        }
        let mut rows: u32 = 0;
        unsafe {
            ffi::OCIAttrGet(
                self.stmt.cast(),
                ffi::OCI_HTYPE_STMT,
                (&raw mut rows).cast(),
                ptr::null_mut(),
                ffi::OCI_ATTR_ROW_COUNT,
                self.session.err,
            );
        }
        u64::from(rows)
    }

    fn last_error(&self) -> Option<DriverError> {
        self.session.last_error()
    }

    fn close(&mut self) {
        if !self.released {
            self.released = true;
            if self.session.live.get() {
                unsafe {
                    ffi::OCIStmtRelease(
                        self.stmt,
                        self.session.err,
                        ptr::null(),
                        0,
                        ffi::OCI_DEFAULT,
                    );
                }
            }
        }
    }
}

impl Drop for OciCursor {
    fn drop(&mut self) {
        self.close();
    }
}

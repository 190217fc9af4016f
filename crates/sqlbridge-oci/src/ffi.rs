//! Low-level FFI bindings to the Oracle client library.
//!
//! These bindings are manually written to provide full control over the
//! interface. We only expose what we need for the driver implementation.
//! The library name differs per platform: `oci` on Windows, `clntsh`
//! elsewhere.

#![allow(unsafe_code)]
#![allow(non_camel_case_types)]
#![allow(clippy::upper_case_acronyms)]

use std::ffi::c_void;

/// Opaque OCI environment handle.
#[repr(C)]
pub struct OCIEnv {
    _private: [u8; 0],
}

/// Opaque OCI error handle.
#[repr(C)]
pub struct OCIError {
    _private: [u8; 0],
}

/// Opaque OCI server handle.
#[repr(C)]
pub struct OCIServer {
    _private: [u8; 0],
}

/// Opaque OCI user-session handle.
#[repr(C)]
pub struct OCISession {
    _private: [u8; 0],
}

/// Opaque OCI service-context handle.
#[repr(C)]
pub struct OCISvcCtx {
    _private: [u8; 0],
}

/// Opaque OCI statement handle.
#[repr(C)]
pub struct OCIStmt {
    _private: [u8; 0],
}

// Call return codes
pub const OCI_SUCCESS: i32 = 0;
pub const OCI_SUCCESS_WITH_INFO: i32 = 1;
pub const OCI_NO_DATA: i32 = 100;
pub const OCI_ERROR: i32 = -1;
pub const OCI_INVALID_HANDLE: i32 = -2;

// Modes
pub const OCI_DEFAULT: u32 = 0;
pub const OCI_COMMIT_ON_SUCCESS: u32 = 32;

// Handle types
pub const OCI_HTYPE_ENV: u32 = 1;
pub const OCI_HTYPE_ERROR: u32 = 2;
pub const OCI_HTYPE_SVCCTX: u32 = 3;
pub const OCI_HTYPE_STMT: u32 = 4;
pub const OCI_HTYPE_SERVER: u32 = 8;
pub const OCI_HTYPE_SESSION: u32 = 9;

// Credential types
pub const OCI_CRED_RDBMS: u32 = 1;

// Attributes
pub const OCI_ATTR_SERVER: u32 = 6;
pub const OCI_ATTR_SESSION: u32 = 7;
pub const OCI_ATTR_ROW_COUNT: u32 = 9;
pub const OCI_ATTR_USERNAME: u32 = 22;
pub const OCI_ATTR_PASSWORD: u32 = 23;
pub const OCI_ATTR_STMT_TYPE: u32 = 24;

// Statement types
pub const OCI_STMT_SELECT: u16 = 1;

// Statement language
pub const OCI_NTV_SYNTAX: u32 = 1;

/// Upper bound OCI documents for a diagnostic message.
pub const OCI_ERROR_MAXMSG_SIZE: usize = 3072;

#[cfg_attr(windows, link(name = "oci"))]
#[cfg_attr(not(windows), link(name = "clntsh"))]
unsafe extern "C" {
    pub fn OCIEnvNlsCreate(
        envhpp: *mut *mut OCIEnv,
        mode: u32,
        ctxp: *const c_void,
        malocfp: *const c_void,
        ralocfp: *const c_void,
        mfreefp: *const c_void,
        xtramemsz: usize,
        usrmempp: *const c_void,
        charset: u16,
        ncharset: u16,
    ) -> i32;

    pub fn OCIHandleAlloc(
        parenth: *mut OCIEnv,
        hndlpp: *mut *mut c_void,
        hndl_type: u32,
        xtramem_sz: usize,
        usrmempp: *const c_void,
    ) -> i32;

    pub fn OCIHandleFree(hndlp: *mut c_void, hnd_type: u32) -> i32;

    pub fn OCIServerAttach(
        srvhp: *mut OCIServer,
        errhp: *mut OCIError,
        dblink: *const u8,
        dblink_len: u32,
        mode: u32,
    ) -> i32;

    pub fn OCIServerDetach(srvhp: *mut OCIServer, errhp: *mut OCIError, mode: u32) -> i32;

    pub fn OCISessionBegin(
        svchp: *mut OCISvcCtx,
        errhp: *mut OCIError,
        userhp: *mut OCISession,
        credt: u32,
        mode: u32,
    ) -> i32;

    pub fn OCISessionEnd(
        svchp: *mut OCISvcCtx,
        errhp: *mut OCIError,
        userhp: *mut OCISession,
        mode: u32,
    ) -> i32;

    pub fn OCIAttrSet(
        trgthndlp: *mut c_void,
        trghndltyp: u32,
        attributep: *const c_void,
        size: u32,
        attrtype: u32,
        errhp: *mut OCIError,
    ) -> i32;

    pub fn OCIAttrGet(
        trgthndlp: *const c_void,
        trghndltyp: u32,
        attributep: *mut c_void,
        sizep: *mut u32,
        attrtype: u32,
        errhp: *mut OCIError,
    ) -> i32;

    pub fn OCIErrorGet(
        hndlp: *const c_void,
        recordno: u32,
        sqlstate: *const c_void,
        errcodep: *mut i32,
        bufp: *mut u8,
        bufsiz: u32,
        hnd_type: u32,
    ) -> i32;

    pub fn OCIStmtPrepare2(
        svchp: *mut OCISvcCtx,
        stmthp: *mut *mut OCIStmt,
        errhp: *mut OCIError,
        stmttext: *const u8,
        stmt_len: u32,
        key: *const u8,
        keylen: u32,
        language: u32,
        mode: u32,
    ) -> i32;

    pub fn OCIStmtRelease(
        stmtp: *mut OCIStmt,
        errhp: *mut OCIError,
        key: *const u8,
        keylen: u32,
        mode: u32,
    ) -> i32;

    pub fn OCIStmtExecute(
        svchp: *mut OCISvcCtx,
        stmtp: *mut OCIStmt,
        errhp: *mut OCIError,
        iters: u32,
        rowoff: u32,
        snap_in: *const c_void,
        snap_out: *mut c_void,
        mode: u32,
    ) -> i32;

    pub fn OCITransCommit(svchp: *mut OCISvcCtx, errhp: *mut OCIError, flags: u32) -> i32;

    pub fn OCITransRollback(svchp: *mut OCISvcCtx, errhp: *mut OCIError, flags: u32) -> i32;
}

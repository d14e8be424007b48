// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

//! The CCI transport boundary.
//!
//! Everything in this crate talks to the CUBRID broker through the [`Cci`]
//! trait, which mirrors the primitive set of the CCI client library one
//! function per primitive. A production deployment implements it over
//! `libcascci`; the test suite implements it in memory. All handles are
//! opaque integers owned by exactly one wrapper object and invalidated on
//! close; they are never reused after invalidation.

use crate::sql_type::{CubridType, StatementKind};

/// Server session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnHandle(pub i32);

/// Server-side prepared statement handle (a CCI request handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtHandle(pub i32);

/// Server-side large object locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LobHandle(pub i64);

/// Server-side collection value handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetHandle(pub i64);

// Transport error codes. The broker reports three disjoint negative code
// ranges; the sentinels below bound them and drive facility naming in
// error messages.
pub const CCI_ER_DBMS: i32 = -20001;
pub const CCI_ER_CON_HANDLE: i32 = -20002;
pub const CCI_ER_NO_MORE_MEMORY: i32 = -20003;
pub const CCI_ER_COMMUNICATION: i32 = -20004;
pub const CCI_ER_NO_MORE_DATA: i32 = -20005;
pub const CCI_ER_TYPE_CONVERSION: i32 = -20008;
pub const CCI_ER_BIND_INDEX: i32 = -20009;
pub const CCI_ER_REQ_HANDLE: i32 = -20018;
/// End of the CCI error code range.
pub const CCI_ER_END: i32 = -20100;
/// Distinguished "no further result sets" code from the broker.
pub const CAS_ER_NO_MORE_RESULT_SET: i32 = -1022;
/// End of the CAS (broker) error code range.
pub const CAS_ER_IS: i32 = -1200;

// Statement execution flags (bitwise-or'ed into the `options` argument
// of `Cci::execute`).
pub const EXEC_ASYNC: i32 = 0x01;
pub const EXEC_QUERY_ALL: i32 = 0x02;
pub const EXEC_QUERY_INFO: i32 = 0x04;
pub const EXEC_ONLY_QUERY_PLAN: i32 = 0x08;
pub const EXEC_THREAD: i32 = 0x10;

// Schema pattern-match flags for `Cci::schema_info`.
pub const CLASS_NAME_PATTERN_MATCH: u8 = 0x01;
pub const ATTR_NAME_PATTERN_MATCH: u8 = 0x02;

/// Server-reported diagnostic payload accompanying a DBMS failure code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: i32,
    pub message: String,
}

/// A failed transport call: the primitive's negative return code plus the
/// server diagnostic, when one was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CciError {
    pub code: i32,
    pub diagnostic: Option<Diagnostic>,
}

impl CciError {
    pub fn new(code: i32) -> CciError {
        CciError {
            code,
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(code: i32, diag_code: i32, message: &str) -> CciError {
        CciError {
            code,
            diagnostic: Some(Diagnostic {
                code: diag_code,
                message: message.to_string(),
            }),
        }
    }
}

pub type CciResult<T> = std::result::Result<T, CciError>;

/// Transaction terminator selector for [`Cci::end_tran`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranType {
    Commit,
    Rollback,
}

/// Session parameters readable through [`Cci::get_db_parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbParam {
    LockTimeout,
    MaxStringLength,
    IsolationLevel,
    AutoCommit,
}

/// Origin for server-side cursor repositioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOrigin {
    First,
    Current,
    Last,
}

/// The access representation requested from [`Cci::get_data`].
///
/// This mirrors the `CCI_A_TYPE` codes: the same column can be asked for
/// in several representations, and asking for one the transport cannot
/// produce is an error (which the legacy fallback decode path relies on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Str,
    Int,
    BigInt,
    Date,
    Set,
    Blob,
    Clob,
}

/// Calendar struct used for DATE/TIME/DATETIME/TIMESTAMP transit.
/// `ms` is milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CciDate {
    pub yr: i32,
    pub mon: u32,
    pub day: u32,
    pub hh: u32,
    pub mm: u32,
    pub ss: u32,
    pub ms: u32,
}

/// One fetched datum in its wire representation, before codec conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum WireDatum {
    /// Raw bytes of a textual fetch (not yet charset-decoded).
    Str(Vec<u8>),
    Int(i32),
    BigInt(i64),
    Date(CciDate),
    Set(SetHandle),
    Lob(LobHandle),
}

/// BLOB/CLOB discriminator. Fixed per LOB at creation or first bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    Blob,
    Clob,
}

/// A parameter value in its wire representation, ready to bind.
///
/// The owning variant keeps the encoded byte buffer alive across the
/// synchronous `bind_param` call; the transport copies or sends it before
/// returning, never afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Int(i32),
    BigInt(i64),
    Double(f64),
    Str {
        bytes: Vec<u8>,
        wire_type: CubridType,
    },
    Bit {
        bytes: Vec<u8>,
        wire_type: CubridType,
    },
    Date {
        value: CciDate,
        wire_type: CubridType,
    },
    Lob {
        handle: LobHandle,
        kind: LobKind,
    },
    Set(SetHandle),
}

/// One element of a collection being built for binding. Textual transit:
/// elements are given as text except BIT/VARBIT elements, which are
/// pre-packed byte buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetElement {
    Null,
    Text(String),
    Bit(Vec<u8>),
}

/// Per-statement outcome of a batch execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub err_no: i32,
    pub err_msg: String,
}

/// Full column descriptor as reported by the broker in result info.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub attr_name: String,
    pub class_name: String,
    pub data_type: CubridType,
    pub precision: i32,
    pub scale: i32,
    pub non_null: bool,
    pub default_value: String,
    pub auto_increment: bool,
    pub unique_key: bool,
    pub primary_key: bool,
    pub foreign_key: bool,
    pub reverse_index: bool,
    pub reverse_unique: bool,
    pub shared: bool,
}

impl ColumnMeta {
    pub fn new(name: &str, data_type: CubridType) -> ColumnMeta {
        ColumnMeta {
            name: name.to_string(),
            attr_name: String::new(),
            class_name: String::new(),
            data_type,
            precision: 0,
            scale: 0,
            non_null: false,
            default_value: String::new(),
            auto_increment: false,
            unique_key: false,
            primary_key: false,
            foreign_key: false,
            reverse_index: false,
            reverse_unique: false,
            shared: false,
        }
    }
}

/// Schema introspection selector for [`Cci::schema_info`]. The numeric
/// codes are part of the fixed broker contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Table,
    View,
    QuerySpec,
    Attribute,
    TableAttribute,
    Method,
    TableMethod,
    MethodFile,
    SuperTable,
    SubTable,
    Constraint,
    Trigger,
    TablePrivilege,
    ColumnPrivilege,
    DirectSuperTable,
    PrimaryKey,
    ImportedKeys,
    ExportedKeys,
    CrossReference,
}

impl SchemaType {
    /// The pattern-match flag the broker expects for this schema request.
    pub fn pattern_flag(&self) -> u8 {
        match self {
            SchemaType::Table | SchemaType::View => CLASS_NAME_PATTERN_MATCH,
            SchemaType::Attribute | SchemaType::TableAttribute => ATTR_NAME_PATTERN_MATCH,
            _ => 0,
        }
    }
}

/// The CCI primitive set.
///
/// All calls are synchronous and blocking; no primitive may be invoked
/// concurrently for the same connection. Negative outcomes are returned as
/// [`CciError`] values and translated into crate errors at the call site.
pub trait Cci: Send + Sync {
    // -- session ---------------------------------------------------------
    fn connect(&self, url: &str, user: &str, password: &str) -> CciResult<ConnHandle>;
    fn disconnect(&self, conn: ConnHandle) -> CciResult<()>;
    fn end_tran(&self, conn: ConnHandle, tran: TranType) -> CciResult<()>;
    fn set_autocommit(&self, conn: ConnHandle, on: bool) -> CciResult<()>;
    fn set_isolation_level(&self, conn: ConnHandle, level: i32) -> CciResult<()>;
    fn get_db_parameter(&self, conn: ConnHandle, param: DbParam) -> CciResult<i32>;
    fn get_db_version(&self, conn: ConnHandle) -> CciResult<String>;
    fn last_insert_id(&self, conn: ConnHandle) -> CciResult<Option<String>>;

    // -- statements ------------------------------------------------------
    fn prepare(&self, conn: ConnHandle, sql: &str, flag: i32) -> CciResult<StmtHandle>;
    fn bind_count(&self, stmt: StmtHandle) -> CciResult<usize>;
    fn bind_param(&self, stmt: StmtHandle, index: usize, value: &BindValue) -> CciResult<()>;
    fn execute(&self, stmt: StmtHandle, options: i32, max_col_size: i32) -> CciResult<i64>;
    fn execute_batch(&self, conn: ConnHandle, sqls: &[&str]) -> CciResult<Vec<QueryResult>>;
    fn result_info(&self, stmt: StmtHandle) -> CciResult<(StatementKind, Vec<ColumnMeta>)>;
    fn cursor_move(&self, stmt: StmtHandle, offset: i64, origin: CursorOrigin) -> CciResult<()>;
    fn fetch(&self, stmt: StmtHandle) -> CciResult<()>;
    /// Fetch one column of the current row. `col` is 1-based. `Ok(None)`
    /// is the null indicator, regardless of the requested access type.
    fn get_data(
        &self,
        stmt: StmtHandle,
        col: usize,
        atype: AccessType,
    ) -> CciResult<Option<WireDatum>>;
    fn next_result(&self, stmt: StmtHandle) -> CciResult<i64>;
    fn close_statement(&self, stmt: StmtHandle) -> CciResult<()>;
    fn schema_info(
        &self,
        conn: ConnHandle,
        kind: SchemaType,
        class_name: Option<&str>,
        attr_name: Option<&str>,
        flag: u8,
    ) -> CciResult<StmtHandle>;

    // -- large objects ---------------------------------------------------
    fn lob_new(&self, conn: ConnHandle, kind: LobKind) -> CciResult<LobHandle>;
    fn lob_write(
        &self,
        conn: ConnHandle,
        lob: LobHandle,
        kind: LobKind,
        pos: u64,
        data: &[u8],
    ) -> CciResult<usize>;
    fn lob_read(
        &self,
        conn: ConnHandle,
        lob: LobHandle,
        kind: LobKind,
        pos: u64,
        len: usize,
    ) -> CciResult<Vec<u8>>;
    fn lob_size(&self, lob: LobHandle, kind: LobKind) -> CciResult<u64>;
    fn lob_free(&self, lob: LobHandle) -> CciResult<()>;

    // -- collections -----------------------------------------------------
    fn set_make(
        &self,
        conn: ConnHandle,
        elem_type: CubridType,
        elements: &[SetElement],
    ) -> CciResult<SetHandle>;
    fn set_size(&self, set: SetHandle) -> CciResult<usize>;
    /// Element text of the 1-based `index`-th element; `Ok(None)` for a
    /// null element.
    fn set_get(&self, set: SetHandle, index: usize) -> CciResult<Option<String>>;
    fn set_free(&self, set: SetHandle) -> CciResult<()>;

    // -- diagnostics -----------------------------------------------------
    /// Message lookup for codes in the transport's own ranges (CAS/CCI).
    fn error_message(&self, code: i32) -> Option<String>;
}

// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

use crate::cci::{
    AccessType, BindValue, Cci, ColumnMeta, CursorOrigin, LobKind, StmtHandle, WireDatum,
    CAS_ER_NO_MORE_RESULT_SET, CCI_ER_NO_MORE_DATA,
};
use crate::collection::CubridSet;
use crate::connection::Connection;
use crate::error;
use crate::lob::Lob;
use crate::row::{read_row, read_row_map, Row};
use crate::sql_type::{CubridType, StatementKind};
use crate::value::{encode_value, Charset, Value};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One entry of the `description` attribute: the conventional 7-field
/// column summary `(name, type, display_size, internal_size, precision,
/// scale, nullable)`. Populated only after a SELECT execution and cleared
/// whenever the statement is reset.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescription {
    pub name: String,
    pub type_code: i32,
    pub display_size: i32,
    pub internal_size: i32,
    pub precision: i32,
    pub scale: i32,
    pub nullable: bool,
}

// Lifecycle of the server-side statement handle. Transitions rebuild the
// whole state value; there is at most one live handle per cursor and it is
// released before a new one is allocated.
enum State {
    /// No statement prepared yet.
    Open,
    Prepared(Prepared),
    /// Terminal. Everything but an implicit teardown fails from here.
    Closed,
}

struct Prepared {
    handle: StmtHandle,
    bind_count: usize,
    /// Present once the statement has been executed.
    result: Option<ResultSetState>,
}

struct ResultSetState {
    /// `None` after the result sets are exhausted via `next_result`.
    kind: Option<StatementKind>,
    columns: Vec<ColumnMeta>,
    column_names: Arc<Vec<String>>,
    description: Option<Vec<ColumnDescription>>,
    row_count: i64,
    pos: i64,
}

impl ResultSetState {
    /// The shape left behind when no result set is current.
    fn cleared() -> ResultSetState {
        ResultSetState {
            kind: None,
            columns: Vec::new(),
            column_names: Arc::new(Vec::new()),
            description: None,
            row_count: -1,
            pos: 0,
        }
    }
}

/// A database cursor owning one server-side prepared statement.
///
/// The cursor moves through `prepare` → `bind_param` → `execute` →
/// `fetch_row`, with `prepare` implicitly resetting any earlier statement.
/// After [`close`](Cursor::close), every operation (including a second
/// explicit close) fails with the invalid-cursor condition; dropping the
/// cursor releases the statement silently.
pub struct Cursor<'conn> {
    conn: &'conn Connection,
    charset: Charset,
    state: State,
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}

impl<'conn> Cursor<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Cursor<'conn> {
        Cursor {
            conn,
            charset: Charset::default(),
            state: State::Open,
        }
    }

    fn cci(&self) -> Arc<dyn Cci> {
        self.conn.transport()
    }

    fn check_open(&self) -> Result<()> {
        if matches!(self.state, State::Closed) {
            Err(Error::invalid_cursor())
        } else {
            Ok(())
        }
    }

    fn prepared(&self) -> Result<&Prepared> {
        match &self.state {
            State::Closed => Err(Error::invalid_cursor()),
            State::Open => Err(Error::client(error::ER_SQL_UNPREPARE)),
            State::Prepared(p) => Ok(p),
        }
    }

    fn executed(&self) -> Result<(&Prepared, &ResultSetState)> {
        let p = self.prepared()?;
        match &p.result {
            Some(r) => Ok((p, r)),
            None => Err(Error::client(error::ER_INVALID_SQL_TYPE)),
        }
    }

    fn executed_mut(&mut self) -> Result<(StmtHandle, &mut ResultSetState)> {
        match &mut self.state {
            State::Closed => Err(Error::invalid_cursor()),
            State::Open => Err(Error::client(error::ER_SQL_UNPREPARE)),
            State::Prepared(p) => match &mut p.result {
                Some(r) => Ok((p.handle, r)),
                None => Err(Error::client(error::ER_INVALID_SQL_TYPE)),
            },
        }
    }

    /// Releases the current statement handle, dropping column metadata,
    /// row count and cursor position with it.
    fn reset_statement(&mut self) {
        if let State::Prepared(p) = std::mem::replace(&mut self.state, State::Open) {
            let _ = self.cci().close_statement(p.handle);
        }
    }

    /// Sets the character set used to decode textual columns fetched
    /// through this cursor. The default is `"utf8"`.
    pub fn set_charset(&mut self, name: &str) -> Result<()> {
        self.check_open()?;
        self.charset = Charset::from_name(name)?;
        Ok(())
    }

    /// Creates a server-side prepared statement for `sql`.
    ///
    /// Any previously prepared statement is released first; its column
    /// descriptors, row count and cursor position are discarded.
    pub fn prepare(&mut self, sql: &str) -> Result<()> {
        self.check_open()?;
        self.reset_statement();
        let cci = self.cci();
        let conn = self.conn.handle()?;
        let handle = cci
            .prepare(conn, sql, 0)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        let bind_count = cci
            .bind_count(handle)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        debug!(sql, bind_count, "statement prepared");
        self.state = State::Prepared(Prepared {
            handle,
            bind_count,
            result: None,
        });
        Ok(())
    }

    /// Returns the number of `?` placeholders in the prepared statement.
    pub fn bind_count(&self) -> Result<usize> {
        Ok(self.prepared()?.bind_count)
    }

    /// Binds a value to the 1-based placeholder `index`.
    ///
    /// `hint` forces the wire type where the value's own shape does not,
    /// e.g. `CubridType::BigInt` for a small integer bound into a BIGINT
    /// column or `CubridType::VarBit` for raw bytes.
    pub fn bind_param(&mut self, index: usize, value: &Value, hint: Option<CubridType>) -> Result<()> {
        let handle = self.prepared()?.handle;
        let bind = encode_value(value, hint)?;
        let cci = self.cci();
        cci.bind_param(handle, index, &bind)
            .map_err(|e| Error::from_cci(&e, &*cci))
    }

    /// Binds a large object to the 1-based placeholder `index`.
    pub fn bind_lob(&mut self, index: usize, lob: &Lob) -> Result<()> {
        let stmt = self.prepared()?.handle;
        let (handle, kind) = lob.locator()?;
        let cci = self.cci();
        cci.bind_param(stmt, index, &BindValue::Lob { handle, kind })
            .map_err(|e| Error::from_cci(&e, &*cci))
    }

    /// Binds a collection value to the 1-based placeholder `index`.
    pub fn bind_set(&mut self, index: usize, set: &CubridSet) -> Result<()> {
        let stmt = self.prepared()?.handle;
        let handle = set.handle()?;
        let cci = self.cci();
        cci.bind_param(stmt, index, &BindValue::Set(handle))
            .map_err(|e| Error::from_cci(&e, &*cci))
    }

    /// Executes the prepared statement. Equivalent to
    /// [`execute_with(0, 0)`](Cursor::execute_with).
    pub fn execute(&mut self) -> Result<i64> {
        self.execute_with(0, 0)
    }

    /// Executes the prepared statement with explicit execution flags and
    /// column size limit.
    ///
    /// Returns the result count from the transport: the number of rows for
    /// SELECT, the number of affected rows for INSERT/UPDATE/DELETE, 0 for
    /// other statements. For SELECT the column metadata is loaded and the
    /// server cursor is advanced onto the first row.
    pub fn execute_with(&mut self, options: i32, max_col_size: i32) -> Result<i64> {
        let (handle, bind_count) = {
            let p = self.prepared()?;
            (p.handle, p.bind_count)
        };
        let cci = self.cci();
        let count = cci
            .execute(handle, options, max_col_size)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        let result = load_result_state(&*cci, handle, count)?;
        let kind = result.kind.map(|k| k.to_string()).unwrap_or_default();
        debug!(kind = kind.as_str(), rows = result.row_count, "statement executed");
        self.state = State::Prepared(Prepared {
            handle,
            bind_count,
            result: Some(result),
        });
        Ok(count)
    }

    /// Fetches the next row as an ordered sequence of values.
    ///
    /// Returns `Ok(None)` once all rows are consumed; calling again after
    /// exhaustion keeps returning `Ok(None)` without error.
    pub fn fetch_row(&mut self) -> Result<Option<Row>> {
        let cci = self.cci();
        let (handle, columns, names, charset) = {
            let (p, r) = self.executed()?;
            (p.handle, r.columns.clone(), r.column_names.clone(), self.charset)
        };
        if !position_is_valid(&*cci, handle)? {
            return Ok(None);
        }
        cci.fetch(handle).map_err(|e| Error::from_cci(&e, &*cci))?;
        let row = read_row(&*cci, handle, &columns, names, charset)?;
        advance_one(&*cci, handle)?;
        let (_, r) = self.executed_mut()?;
        r.pos += 1;
        Ok(Some(row))
    }

    /// Fetches the next row as a name-keyed mapping. When two columns
    /// share a name, the value of the later column wins.
    pub fn fetch_row_map(&mut self) -> Result<Option<HashMap<String, Value>>> {
        let cci = self.cci();
        let (handle, columns, charset) = {
            let (p, r) = self.executed()?;
            (p.handle, r.columns.clone(), self.charset)
        };
        if !position_is_valid(&*cci, handle)? {
            return Ok(None);
        }
        cci.fetch(handle).map_err(|e| Error::from_cci(&e, &*cci))?;
        let row = read_row_map(&*cci, handle, &columns, charset)?;
        advance_one(&*cci, handle)?;
        let (_, r) = self.executed_mut()?;
        r.pos += 1;
        Ok(Some(row))
    }

    /// Fetches the LOB locator of column `col` (1-based) from the next
    /// row. Returns `Ok(None)` at end of data or for a NULL column.
    pub fn fetch_lob(&mut self, col: usize) -> Result<Option<Lob<'conn>>> {
        let cci = self.cci();
        let (handle, kind) = {
            let (p, r) = self.executed()?;
            let meta = col
                .checked_sub(1)
                .and_then(|i| r.columns.get(i))
                .ok_or_else(|| Error::client(error::ER_INVALID_PARAM))?;
            let kind = match meta.data_type {
                CubridType::Blob => LobKind::Blob,
                CubridType::Clob => LobKind::Clob,
                _ => return Err(Error::client(error::ER_NOT_SUPPORTED_TYPE)),
            };
            (p.handle, kind)
        };
        if !position_is_valid(&*cci, handle)? {
            return Ok(None);
        }
        cci.fetch(handle).map_err(|e| Error::from_cci(&e, &*cci))?;
        let atype = match kind {
            LobKind::Blob => AccessType::Blob,
            LobKind::Clob => AccessType::Clob,
        };
        let lob = match cci
            .get_data(handle, col, atype)
            .map_err(|e| Error::from_cci(&e, &*cci))?
        {
            None => None,
            Some(WireDatum::Lob(locator)) => Some(Lob::from_locator(self.conn, locator, kind)),
            Some(_) => return Err(Error::client(error::ER_UNKNOWN_TYPE)),
        };
        advance_one(&*cci, handle)?;
        let (_, r) = self.executed_mut()?;
        r.pos += 1;
        Ok(lob)
    }

    /// Loads the next result set of a multi-statement execution, replacing
    /// the current column metadata, row count and position wholesale.
    ///
    /// Returns `Ok(false)` when no further result set exists; the cursor
    /// is then left with no current result set (column and row counts are
    /// not stale values from the previous set).
    pub fn next_result(&mut self) -> Result<bool> {
        let handle = self.prepared()?.handle;
        // Drop the previous result set's metadata before asking for the
        // next one, so exhaustion does not leave stale state behind.
        if let State::Prepared(p) = &mut self.state {
            p.result = Some(ResultSetState::cleared());
        }
        let cci = self.cci();
        let count = match cci.next_result(handle) {
            Ok(count) => count,
            Err(e) if e.code == CAS_ER_NO_MORE_RESULT_SET => return Ok(false),
            Err(e) => return Err(Error::from_cci(&e, &*cci)),
        };
        let result = load_result_state(&*cci, handle, count)?;
        if let State::Prepared(p) = &mut self.state {
            p.result = Some(result);
        }
        Ok(true)
    }

    /// The number of rows affected by the last INSERT, UPDATE or DELETE;
    /// -1 for every other statement kind.
    pub fn affected_rows(&self) -> Result<i64> {
        self.check_open()?;
        if let State::Prepared(Prepared {
            result: Some(r), ..
        }) = &self.state
        {
            if matches!(
                r.kind,
                Some(StatementKind::Insert | StatementKind::Update | StatementKind::Delete)
            ) {
                return Ok(r.row_count);
            }
        }
        Ok(-1)
    }

    /// The number of result columns; `None` unless the last execution was
    /// a SELECT.
    pub fn num_fields(&self) -> Result<Option<usize>> {
        self.check_open()?;
        if let State::Prepared(Prepared {
            result: Some(r), ..
        }) = &self.state
        {
            if r.kind == Some(StatementKind::Select) {
                return Ok(Some(r.columns.len()));
            }
        }
        Ok(None)
    }

    /// The number of result rows; `None` unless the last execution was a
    /// SELECT.
    pub fn num_rows(&self) -> Result<Option<i64>> {
        self.check_open()?;
        if let State::Prepared(Prepared {
            result: Some(r), ..
        }) = &self.state
        {
            if r.kind == Some(StatementKind::Select) {
                return Ok(Some(r.row_count));
            }
        }
        Ok(None)
    }

    /// The current cursor position, counted in fetched rows.
    pub fn row_tell(&self) -> Result<i64> {
        self.check_open()?;
        let (pos, row_count) = match &self.state {
            State::Prepared(Prepared {
                result: Some(r), ..
            }) => (r.pos, r.row_count),
            _ => (0, -1),
        };
        if pos > row_count {
            return Err(Error::client(error::ER_INVALID_CURSOR_POS));
        }
        Ok(pos)
    }

    /// Moves the cursor to the absolute 1-based row `row`, range-checked
    /// against the known row count of the current result set.
    pub fn data_seek(&mut self, row: i64) -> Result<()> {
        self.check_open()?;
        let cci = self.cci();
        let (handle, r) = self.executed_mut()?;
        if row < 1 || row > r.row_count {
            return Err(Error::client(error::ER_INVALID_PARAM));
        }
        cci.cursor_move(handle, row, CursorOrigin::First)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        r.pos = row;
        Ok(())
    }

    /// Moves the cursor by `offset` rows relative to the current
    /// position. Not range-checked beyond what the transport rejects.
    pub fn row_seek(&mut self, offset: i64) -> Result<()> {
        self.check_open()?;
        let cci = self.cci();
        let (handle, r) = self.executed_mut()?;
        cci.cursor_move(handle, offset, CursorOrigin::Current)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        r.pos += offset;
        Ok(())
    }

    /// Full column metadata of the current result set.
    ///
    /// With `n = None` all columns are returned; with `Some(n)` only the
    /// 1-based column `n`. Returns `Ok(None)` when the current result set
    /// has no columns.
    pub fn result_info(&self, n: Option<usize>) -> Result<Option<Vec<ColumnMeta>>> {
        self.check_open()?;
        let (columns, count) = match &self.state {
            State::Prepared(Prepared {
                result: Some(r), ..
            }) => (&r.columns[..], r.columns.len() as i64),
            _ => (&[][..], -1),
        };
        if count == 0 {
            return Ok(None);
        }
        match n {
            None => {
                if count < 0 {
                    return Err(Error::client(error::ER_INVALID_PARAM));
                }
                Ok(Some(columns.to_vec()))
            }
            Some(n) => {
                if n < 1 || (n as i64) > count {
                    return Err(Error::client(error::ER_INVALID_PARAM));
                }
                Ok(Some(vec![columns[n - 1].clone()]))
            }
        }
    }

    /// The conventional 7-field column summary of the last SELECT, or
    /// `None` when no SELECT result set is current.
    pub fn description(&self) -> Option<&[ColumnDescription]> {
        match &self.state {
            State::Prepared(Prepared {
                result: Some(r), ..
            }) => r.description.as_deref(),
            _ => None,
        }
    }

    /// Closes the cursor, releasing the server-side statement.
    ///
    /// A second explicit close fails with the invalid-cursor condition;
    /// only the implicit close on drop is silent.
    pub fn close(&mut self) -> Result<()> {
        if matches!(self.state, State::Closed) {
            return Err(Error::invalid_cursor());
        }
        self.reset_statement();
        self.state = State::Closed;
        debug!("cursor closed");
        Ok(())
    }
}

impl Drop for Cursor<'_> {
    fn drop(&mut self) {
        // Teardown path: release the handle, never report.
        self.reset_statement();
    }
}

/// Checks whether the server cursor currently points at a row. A
/// no-more-data report is the end-of-data condition, not an error.
fn position_is_valid(cci: &dyn Cci, handle: StmtHandle) -> Result<bool> {
    match cci.cursor_move(handle, 0, CursorOrigin::Current) {
        Ok(()) => Ok(true),
        Err(e) if e.code == CCI_ER_NO_MORE_DATA => Ok(false),
        Err(e) => Err(Error::from_cci(&e, cci)),
    }
}

/// Advances the server cursor by one row, tolerating no-more-data.
fn advance_one(cci: &dyn Cci, handle: StmtHandle) -> Result<()> {
    match cci.cursor_move(handle, 1, CursorOrigin::Current) {
        Ok(()) => Ok(()),
        Err(e) if e.code == CCI_ER_NO_MORE_DATA => Ok(()),
        Err(e) => Err(Error::from_cci(&e, cci)),
    }
}

/// Builds the result-set state after an execute or next-result: column
/// metadata, row-count semantics, the `description` summary for SELECT,
/// and the initial fetch-ahead cursor advance the row reader relies on.
fn load_result_state(cci: &dyn Cci, handle: StmtHandle, count: i64) -> Result<ResultSetState> {
    let (kind, columns) = cci
        .result_info(handle)
        .map_err(|e| Error::from_cci(&e, cci))?;
    if kind == StatementKind::Select && columns.is_empty() {
        return Err(Error::client(error::ER_CANNOT_GET_COLUMN_INFO));
    }
    let row_count = if kind.reports_row_count() { count } else { -1 };
    let column_names = Arc::new(columns.iter().map(|c| c.name.clone()).collect::<Vec<_>>());
    let description = if kind == StatementKind::Select {
        Some(
            columns
                .iter()
                .map(|c| ColumnDescription {
                    name: c.name.clone(),
                    type_code: c.data_type.code(),
                    display_size: 0,
                    internal_size: 0,
                    precision: c.precision,
                    scale: c.scale,
                    nullable: !c.non_null,
                })
                .collect(),
        )
    } else {
        None
    };
    if kind == StatementKind::Select {
        advance_one(cci, handle)?;
    }
    Ok(ResultSetState {
        kind: Some(kind),
        columns,
        column_names,
        description,
        row_count,
        pos: 0,
    })
}

// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

//! A scriptable in-memory CCI transport.
//!
//! Tests register per-SQL scripts (result sets, affected counts, injected
//! failures) and then drive the public API against them. The fake models
//! the broker-side cursor the same way the real client observes it: the
//! position starts before the first row, a move out of range reports
//! no-more-data and parks the cursor there, and fetch addresses whatever
//! row the cursor points at.

#![allow(dead_code)]

use cubrid::cci::*;
use cubrid::{Connection, CubridType, StatementKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One scripted cell. `Null` answers every access type with the null
/// indicator; other variants answer only their own representation, so a
/// mismatched request fails the way the real transport does.
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Int(i32),
    BigInt(i64),
    Text(String),
    Date(CciDate),
    Set(Vec<Option<String>>),
    Lob(LobKind, Vec<u8>),
}

impl Cell {
    pub fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedResult {
    pub kind: StatementKind,
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Cell>>,
    pub count: i64,
}

impl ScriptedResult {
    pub fn select(columns: Vec<ColumnMeta>, rows: Vec<Vec<Cell>>) -> ScriptedResult {
        let count = rows.len() as i64;
        ScriptedResult {
            kind: StatementKind::Select,
            columns,
            rows,
            count,
        }
    }

    pub fn update(kind: StatementKind, affected: i64) -> ScriptedResult {
        ScriptedResult {
            kind,
            columns: Vec::new(),
            rows: Vec::new(),
            count: affected,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub bind_count: usize,
    pub results: Vec<ScriptedResult>,
    pub execute_error: Option<CciError>,
}

struct StmtState {
    script: Script,
    current: usize,
    pos: i64,
}

impl StmtState {
    fn result(&self) -> &ScriptedResult {
        &self.script.results[self.current]
    }
}

struct LobState {
    kind: LobKind,
    data: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    scripts: HashMap<String, Script>,
    stmts: HashMap<i32, StmtState>,
    lobs: HashMap<i64, LobState>,
    sets: HashMap<i64, Vec<SetElement>>,
    bound: Vec<(usize, BindValue)>,
    made_sets: Vec<(CubridType, Vec<SetElement>)>,
    batch_results: Vec<QueryResult>,
    commits: u32,
    rollbacks: u32,
    autocommit: Option<bool>,
    isolation: i32,
    disconnected: bool,
    fail_lob_read_at: Option<u64>,
}

pub struct FakeCci {
    inner: Mutex<Inner>,
}

impl FakeCci {
    pub fn new() -> Arc<FakeCci> {
        Arc::new(FakeCci {
            inner: Mutex::new(Inner {
                isolation: 4,
                ..Default::default()
            }),
        })
    }

    pub fn script(&self, sql: &str, script: Script) {
        self.inner
            .lock()
            .unwrap()
            .scripts
            .insert(sql.to_string(), script);
    }

    pub fn script_select(&self, sql: &str, columns: Vec<ColumnMeta>, rows: Vec<Vec<Cell>>) {
        self.script(
            sql,
            Script {
                bind_count: 0,
                results: vec![ScriptedResult::select(columns, rows)],
                execute_error: None,
            },
        );
    }

    pub fn script_update(&self, sql: &str, kind: StatementKind, affected: i64) {
        self.script(
            sql,
            Script {
                bind_count: 0,
                results: vec![ScriptedResult::update(kind, affected)],
                execute_error: None,
            },
        );
    }

    pub fn script_batch(&self, results: Vec<QueryResult>) {
        self.inner.lock().unwrap().batch_results = results;
    }

    /// Makes every LOB read past byte `at` fail with a communication
    /// error.
    pub fn fail_lob_read_at(&self, at: u64) {
        self.inner.lock().unwrap().fail_lob_read_at = Some(at);
    }

    /// The parameters bound since the last prepare, in bind order.
    pub fn bound_params(&self) -> Vec<(usize, BindValue)> {
        self.inner.lock().unwrap().bound.clone()
    }

    /// Collections built through `set_make`, oldest first.
    pub fn made_sets(&self) -> Vec<(CubridType, Vec<SetElement>)> {
        self.inner.lock().unwrap().made_sets.clone()
    }

    pub fn commits(&self) -> u32 {
        self.inner.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> u32 {
        self.inner.lock().unwrap().rollbacks
    }

    pub fn disconnected(&self) -> bool {
        self.inner.lock().unwrap().disconnected
    }

    pub fn lob_contents(&self, handle: LobHandle) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .lobs
            .get(&handle.0)
            .map(|l| l.data.clone())
    }

    fn next_id(inner: &mut Inner) -> i64 {
        inner.next_id += 1;
        inner.next_id
    }
}

impl Cci for FakeCci {
    fn connect(&self, _url: &str, _user: &str, _password: &str) -> CciResult<ConnHandle> {
        let mut inner = self.inner.lock().unwrap();
        let id = FakeCci::next_id(&mut inner) as i32;
        Ok(ConnHandle(id))
    }

    fn disconnect(&self, _conn: ConnHandle) -> CciResult<()> {
        self.inner.lock().unwrap().disconnected = true;
        Ok(())
    }

    fn end_tran(&self, _conn: ConnHandle, tran: TranType) -> CciResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match tran {
            TranType::Commit => inner.commits += 1,
            TranType::Rollback => inner.rollbacks += 1,
        }
        Ok(())
    }

    fn set_autocommit(&self, _conn: ConnHandle, on: bool) -> CciResult<()> {
        self.inner.lock().unwrap().autocommit = Some(on);
        Ok(())
    }

    fn set_isolation_level(&self, _conn: ConnHandle, level: i32) -> CciResult<()> {
        self.inner.lock().unwrap().isolation = level;
        Ok(())
    }

    fn get_db_parameter(&self, _conn: ConnHandle, param: DbParam) -> CciResult<i32> {
        let inner = self.inner.lock().unwrap();
        Ok(match param {
            DbParam::LockTimeout => 1,
            DbParam::MaxStringLength => 1_073_741_823,
            DbParam::IsolationLevel => inner.isolation,
            DbParam::AutoCommit => i32::from(inner.autocommit.unwrap_or(true)),
        })
    }

    fn get_db_version(&self, _conn: ConnHandle) -> CciResult<String> {
        Ok("11.2.0.0001".to_string())
    }

    fn last_insert_id(&self, _conn: ConnHandle) -> CciResult<Option<String>> {
        Ok(None)
    }

    fn prepare(&self, _conn: ConnHandle, sql: &str, _flag: i32) -> CciResult<StmtHandle> {
        let mut inner = self.inner.lock().unwrap();
        let script = match inner.scripts.get(sql) {
            Some(script) => script.clone(),
            None => {
                return Err(CciError::with_diagnostic(
                    CCI_ER_DBMS,
                    -493,
                    "Syntax: syntax error",
                ))
            }
        };
        let id = FakeCci::next_id(&mut inner) as i32;
        inner.stmts.insert(
            id,
            StmtState {
                script,
                current: 0,
                pos: 0,
            },
        );
        inner.bound.clear();
        Ok(StmtHandle(id))
    }

    fn bind_count(&self, stmt: StmtHandle) -> CciResult<usize> {
        let inner = self.inner.lock().unwrap();
        inner
            .stmts
            .get(&stmt.0)
            .map(|s| s.script.bind_count)
            .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))
    }

    fn bind_param(&self, stmt: StmtHandle, index: usize, value: &BindValue) -> CciResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let bind_count = inner
            .stmts
            .get(&stmt.0)
            .map(|s| s.script.bind_count)
            .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))?;
        if index < 1 || index > bind_count {
            return Err(CciError::new(CCI_ER_BIND_INDEX));
        }
        inner.bound.push((index, value.clone()));
        Ok(())
    }

    fn execute(&self, stmt: StmtHandle, _options: i32, _max_col_size: i32) -> CciResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        let state = inner
            .stmts
            .get_mut(&stmt.0)
            .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))?;
        if let Some(err) = &state.script.execute_error {
            return Err(err.clone());
        }
        state.current = 0;
        state.pos = 0;
        Ok(state.result().count)
    }

    fn execute_batch(&self, _conn: ConnHandle, sqls: &[&str]) -> CciResult<Vec<QueryResult>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.batch_results.is_empty() {
            return Ok(sqls
                .iter()
                .map(|_| QueryResult {
                    err_no: 0,
                    err_msg: String::new(),
                })
                .collect());
        }
        Ok(std::mem::take(&mut inner.batch_results))
    }

    fn result_info(&self, stmt: StmtHandle) -> CciResult<(StatementKind, Vec<ColumnMeta>)> {
        let inner = self.inner.lock().unwrap();
        let state = inner
            .stmts
            .get(&stmt.0)
            .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))?;
        let result = state.result();
        Ok((result.kind, result.columns.clone()))
    }

    fn cursor_move(&self, stmt: StmtHandle, offset: i64, origin: CursorOrigin) -> CciResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let state = inner
            .stmts
            .get_mut(&stmt.0)
            .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))?;
        let nrows = state.result().rows.len() as i64;
        let target = match origin {
            CursorOrigin::Current => state.pos + offset,
            CursorOrigin::First => offset,
            CursorOrigin::Last => nrows + 1 - offset,
        };
        if target < 1 || target > nrows {
            // The cursor parks out of range, so later checks keep
            // reporting no-more-data.
            state.pos = target.clamp(0, nrows + 1);
            return Err(CciError::new(CCI_ER_NO_MORE_DATA));
        }
        state.pos = target;
        Ok(())
    }

    fn fetch(&self, stmt: StmtHandle) -> CciResult<()> {
        let inner = self.inner.lock().unwrap();
        let state = inner
            .stmts
            .get(&stmt.0)
            .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))?;
        let nrows = state.result().rows.len() as i64;
        if state.pos < 1 || state.pos > nrows {
            return Err(CciError::new(CCI_ER_NO_MORE_DATA));
        }
        Ok(())
    }

    fn get_data(
        &self,
        stmt: StmtHandle,
        col: usize,
        atype: AccessType,
    ) -> CciResult<Option<WireDatum>> {
        let mut inner = self.inner.lock().unwrap();
        let cell = {
            let state = inner
                .stmts
                .get(&stmt.0)
                .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))?;
            let result = state.result();
            let row = result
                .rows
                .get((state.pos - 1) as usize)
                .ok_or_else(|| CciError::new(CCI_ER_NO_MORE_DATA))?;
            row.get(col - 1)
                .ok_or_else(|| CciError::new(CCI_ER_TYPE_CONVERSION))?
                .clone()
        };
        match (&cell, atype) {
            (Cell::Null, _) => Ok(None),
            (Cell::Int(n), AccessType::Int) => Ok(Some(WireDatum::Int(*n))),
            (Cell::BigInt(n), AccessType::BigInt) => Ok(Some(WireDatum::BigInt(*n))),
            (Cell::Text(s), AccessType::Str) => Ok(Some(WireDatum::Str(s.clone().into_bytes()))),
            (Cell::Date(d), AccessType::Date) => Ok(Some(WireDatum::Date(*d))),
            (Cell::Set(elements), AccessType::Set) => {
                let id = FakeCci::next_id(&mut inner);
                let stored = elements
                    .iter()
                    .map(|e| match e {
                        None => SetElement::Null,
                        Some(text) => SetElement::Text(text.clone()),
                    })
                    .collect();
                inner.sets.insert(id, stored);
                Ok(Some(WireDatum::Set(SetHandle(id))))
            }
            (Cell::Lob(kind, data), AccessType::Blob | AccessType::Clob) => {
                let id = FakeCci::next_id(&mut inner);
                inner.lobs.insert(
                    id,
                    LobState {
                        kind: *kind,
                        data: data.clone(),
                    },
                );
                Ok(Some(WireDatum::Lob(LobHandle(id))))
            }
            _ => Err(CciError::new(CCI_ER_TYPE_CONVERSION)),
        }
    }

    fn next_result(&self, stmt: StmtHandle) -> CciResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        let state = inner
            .stmts
            .get_mut(&stmt.0)
            .ok_or_else(|| CciError::new(CCI_ER_REQ_HANDLE))?;
        if state.current + 1 >= state.script.results.len() {
            return Err(CciError::new(CAS_ER_NO_MORE_RESULT_SET));
        }
        state.current += 1;
        state.pos = 0;
        Ok(state.result().count)
    }

    fn close_statement(&self, stmt: StmtHandle) -> CciResult<()> {
        self.inner.lock().unwrap().stmts.remove(&stmt.0);
        Ok(())
    }

    fn schema_info(
        &self,
        _conn: ConnHandle,
        _kind: SchemaType,
        _class_name: Option<&str>,
        _attr_name: Option<&str>,
        _flag: u8,
    ) -> CciResult<StmtHandle> {
        let mut inner = self.inner.lock().unwrap();
        let script = match inner.scripts.get("schema_info") {
            Some(script) => script.clone(),
            None => return Err(CciError::new(CCI_ER_REQ_HANDLE)),
        };
        let id = FakeCci::next_id(&mut inner) as i32;
        inner.stmts.insert(
            id,
            StmtState {
                script,
                current: 0,
                pos: 0,
            },
        );
        Ok(StmtHandle(id))
    }

    fn lob_new(&self, _conn: ConnHandle, kind: LobKind) -> CciResult<LobHandle> {
        let mut inner = self.inner.lock().unwrap();
        let id = FakeCci::next_id(&mut inner);
        inner.lobs.insert(
            id,
            LobState {
                kind,
                data: Vec::new(),
            },
        );
        Ok(LobHandle(id))
    }

    fn lob_write(
        &self,
        _conn: ConnHandle,
        lob: LobHandle,
        _kind: LobKind,
        pos: u64,
        data: &[u8],
    ) -> CciResult<usize> {
        let mut inner = self.inner.lock().unwrap();
        let state = inner
            .lobs
            .get_mut(&lob.0)
            .ok_or_else(|| CciError::new(CCI_ER_COMMUNICATION))?;
        let pos = pos as usize;
        if state.data.len() < pos {
            state.data.resize(pos, 0);
        }
        let end = pos + data.len();
        if state.data.len() < end {
            state.data.resize(end, 0);
        }
        state.data[pos..end].copy_from_slice(data);
        Ok(data.len())
    }

    fn lob_read(
        &self,
        _conn: ConnHandle,
        lob: LobHandle,
        _kind: LobKind,
        pos: u64,
        len: usize,
    ) -> CciResult<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        if let Some(at) = inner.fail_lob_read_at {
            if pos >= at {
                return Err(CciError::new(CCI_ER_COMMUNICATION));
            }
        }
        let state = inner
            .lobs
            .get(&lob.0)
            .ok_or_else(|| CciError::new(CCI_ER_COMMUNICATION))?;
        let start = (pos as usize).min(state.data.len());
        let end = (start + len).min(state.data.len());
        Ok(state.data[start..end].to_vec())
    }

    fn lob_size(&self, lob: LobHandle, _kind: LobKind) -> CciResult<u64> {
        let inner = self.inner.lock().unwrap();
        inner
            .lobs
            .get(&lob.0)
            .map(|l| l.data.len() as u64)
            .ok_or_else(|| CciError::new(CCI_ER_COMMUNICATION))
    }

    fn lob_free(&self, lob: LobHandle) -> CciResult<()> {
        self.inner.lock().unwrap().lobs.remove(&lob.0);
        Ok(())
    }

    fn set_make(
        &self,
        _conn: ConnHandle,
        elem_type: CubridType,
        elements: &[SetElement],
    ) -> CciResult<SetHandle> {
        let mut inner = self.inner.lock().unwrap();
        let id = FakeCci::next_id(&mut inner);
        inner.sets.insert(id, elements.to_vec());
        inner.made_sets.push((elem_type, elements.to_vec()));
        Ok(SetHandle(id))
    }

    fn set_size(&self, set: SetHandle) -> CciResult<usize> {
        let inner = self.inner.lock().unwrap();
        inner
            .sets
            .get(&set.0)
            .map(|s| s.len())
            .ok_or_else(|| CciError::new(CCI_ER_COMMUNICATION))
    }

    fn set_get(&self, set: SetHandle, index: usize) -> CciResult<Option<String>> {
        let inner = self.inner.lock().unwrap();
        let elements = inner
            .sets
            .get(&set.0)
            .ok_or_else(|| CciError::new(CCI_ER_COMMUNICATION))?;
        match elements.get(index - 1) {
            Some(SetElement::Null) => Ok(None),
            Some(SetElement::Text(text)) => Ok(Some(text.clone())),
            Some(SetElement::Bit(bytes)) => {
                // Bit elements come back as their hex text, like any
                // other textual fetch of BIT data.
                Ok(Some(bytes.iter().map(|b| format!("{:02X}", b)).collect()))
            }
            None => Err(CciError::new(CCI_ER_NO_MORE_DATA)),
        }
    }

    fn set_free(&self, set: SetHandle) -> CciResult<()> {
        self.inner.lock().unwrap().sets.remove(&set.0);
        Ok(())
    }

    fn error_message(&self, code: i32) -> Option<String> {
        match code {
            CCI_ER_DBMS => Some("CUBRID DBMS Error".to_string()),
            CCI_ER_CON_HANDLE => Some("Invalid connection handle".to_string()),
            CCI_ER_COMMUNICATION => Some("Cannot communicate with server".to_string()),
            CCI_ER_NO_MORE_DATA => Some("Invalid cursor position".to_string()),
            CCI_ER_BIND_INDEX => Some("Parameter index is out of range".to_string()),
            CCI_ER_REQ_HANDLE => Some("Cannot allocate request handle".to_string()),
            _ => None,
        }
    }
}

pub fn connect(fake: &Arc<FakeCci>) -> Connection {
    Connection::connect(fake.clone(), "localhost:33000:demodb:::", "public", "")
        .expect("connect through fake transport")
}

/// Shorthand for a scalar column descriptor.
pub fn col(name: &str, data_type: CubridType) -> ColumnMeta {
    ColumnMeta::new(name, data_type)
}

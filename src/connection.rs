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
    AccessType, Cci, CciError, ConnHandle, CursorOrigin, DbParam, SchemaType, TranType, WireDatum,
    CCI_ER_CON_HANDLE, CCI_ER_NO_MORE_DATA, CCI_ER_REQ_HANDLE,
};
use crate::collection::CubridSet;
use crate::cursor::Cursor;
use crate::error;
use crate::lob::Lob;
use crate::sql_type::CubridType;
use crate::value::Value;
use crate::{Error, Result};
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Transaction isolation level of a session.
///
/// The numeric levels are the server's own codes; anything outside the
/// known range maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    RepClassCommitInstance,
    RepClassRepInstance,
    Serializable,
    Unknown(i32),
}

impl IsolationLevel {
    pub fn from_level(level: i32) -> IsolationLevel {
        match level {
            4 => IsolationLevel::RepClassCommitInstance,
            5 => IsolationLevel::RepClassRepInstance,
            6 => IsolationLevel::Serializable,
            other => IsolationLevel::Unknown(other),
        }
    }

    pub fn level(&self) -> i32 {
        match *self {
            IsolationLevel::RepClassCommitInstance => 4,
            IsolationLevel::RepClassRepInstance => 5,
            IsolationLevel::Serializable => 6,
            IsolationLevel::Unknown(level) => level,
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IsolationLevel::RepClassCommitInstance => write!(f, "CUBRID_REP_CLASS_COMMIT_INSTANCE"),
            IsolationLevel::RepClassRepInstance => write!(f, "CUBRID_REP_CLASS_REP_INSTANCE"),
            IsolationLevel::Serializable => write!(f, "CUBRID_SERIALIZABLE"),
            IsolationLevel::Unknown(_) => write!(f, "CUBRID_TRAN_UNKNOWN_ISOLATION"),
        }
    }
}

/// Per-statement outcome of [`Connection::batch_execute`]. Non-negative
/// codes report success; a negative code carries the server's message for
/// that statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub err_no: i32,
    pub err_msg: String,
}

/// A connection to a CUBRID database.
///
/// The session handle is owned exclusively by this object. Closing a
/// connection invalidates the handle; child cursors, LOBs and collection
/// values keep their borrows but their operations fail from then on.
/// Dropping the connection closes it silently, whether or not its
/// children were explicitly closed first.
pub struct Connection {
    cci: Arc<dyn Cci>,
    handle: Cell<Option<ConnHandle>>,
    autocommit: Cell<bool>,
    isolation_level: Cell<IsolationLevel>,
    lock_timeout: i32,
    max_string_len: i32,
    url: String,
    user: String,
}

impl Connection {
    /// Establishes a session through `transport`.
    ///
    /// `url` is the broker address in the usual
    /// `host:port:db_name:db_user:db_password:` form (the `cci:` scheme
    /// prefix is added here). The session starts in autocommit mode with
    /// a committed transaction, and the server-side lock timeout, maximum
    /// string length and isolation level are cached on the connection.
    pub fn connect(
        transport: Arc<dyn Cci>,
        url: &str,
        user: &str,
        password: &str,
    ) -> Result<Connection> {
        let cci = transport;
        let full_url = format!("cci:{}", url);
        let handle = cci
            .connect(&full_url, user, password)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        cci.set_autocommit(handle, true)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        let lock_timeout = cci
            .get_db_parameter(handle, DbParam::LockTimeout)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        // Older brokers do not report this parameter.
        let max_string_len = cci
            .get_db_parameter(handle, DbParam::MaxStringLength)
            .unwrap_or(0);
        let level = cci
            .get_db_parameter(handle, DbParam::IsolationLevel)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        let autocommit = cci
            .get_db_parameter(handle, DbParam::AutoCommit)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        cci.end_tran(handle, TranType::Commit)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        debug!(url, user, "connection established");
        Ok(Connection {
            cci,
            handle: Cell::new(Some(handle)),
            autocommit: Cell::new(autocommit != 0),
            isolation_level: Cell::new(IsolationLevel::from_level(level)),
            lock_timeout,
            max_string_len,
            url: url.to_string(),
            user: user.to_string(),
        })
    }

    pub(crate) fn transport(&self) -> Arc<dyn Cci> {
        self.cci.clone()
    }

    pub(crate) fn handle(&self) -> Result<ConnHandle> {
        self.handle
            .get()
            .ok_or_else(|| Error::from_cci(&CciError::new(CCI_ER_CON_HANDLE), &*self.cci))
    }

    /// Returns a new cursor on this connection.
    pub fn cursor(&self) -> Result<Cursor<'_>> {
        self.handle()?;
        Ok(Cursor::new(self))
    }

    /// Returns a new, empty large object bound to this connection.
    pub fn lob(&self) -> Result<Lob<'_>> {
        if self.handle.get().is_none() {
            return Err(Error::from_cci(&CciError::new(CCI_ER_REQ_HANDLE), &*self.cci));
        }
        Ok(Lob::new(self))
    }

    /// Returns a new, empty collection value bound to this connection.
    pub fn set(&self) -> Result<CubridSet<'_>> {
        if self.handle.get().is_none() {
            return Err(Error::from_cci(&CciError::new(CCI_ER_REQ_HANDLE), &*self.cci));
        }
        Ok(CubridSet::new(self))
    }

    /// Commits the pending transaction.
    pub fn commit(&self) -> Result<()> {
        self.end_tran(TranType::Commit)
    }

    /// Rolls back the pending transaction.
    pub fn rollback(&self) -> Result<()> {
        self.end_tran(TranType::Rollback)
    }

    fn end_tran(&self, tran: TranType) -> Result<()> {
        let handle = self.handle()?;
        self.cci
            .end_tran(handle, tran)
            .map_err(|e| Error::from_cci(&e, &*self.cci))
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit.get()
    }

    /// Enables or disables autocommit for the session.
    pub fn set_autocommit(&self, on: bool) -> Result<()> {
        let handle = self.handle()?;
        self.cci
            .set_autocommit(handle, on)
            .map_err(|e| Error::from_cci(&e, &*self.cci))?;
        self.autocommit.set(on);
        Ok(())
    }

    pub fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level.get()
    }

    /// Sets the transaction isolation level for the session.
    pub fn set_isolation_level(&self, level: IsolationLevel) -> Result<()> {
        let handle = self.handle()?;
        self.cci
            .set_isolation_level(handle, level.level())
            .map_err(|e| Error::from_cci(&e, &*self.cci))?;
        self.isolation_level.set(level);
        Ok(())
    }

    /// The lock-wait timeout the server reported at connect time.
    pub fn lock_timeout(&self) -> i32 {
        self.lock_timeout
    }

    /// The maximum string length the server reported at connect time,
    /// 0 when unreported.
    pub fn max_string_len(&self) -> i32 {
        self.max_string_len
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// The server version string.
    pub fn server_version(&self) -> Result<String> {
        let handle = self.handle()?;
        self.cci
            .get_db_version(handle)
            .map_err(|e| Error::from_cci(&e, &*self.cci))
    }

    /// The generated value of the AUTO_INCREMENT column updated by the
    /// previous INSERT, or `None` when the previous statement generated
    /// no id.
    pub fn last_insert_id(&self) -> Result<Option<i64>> {
        let handle = self.handle()?;
        let id = self
            .cci
            .last_insert_id(handle)
            .map_err(|e| Error::from_cci(&e, &*self.cci))?;
        match id {
            None => Ok(None),
            Some(text) => Ok(Some(text.trim().parse()?)),
        }
    }

    /// Executes several SQL statements in one round trip.
    ///
    /// Execution continues past failing statements: the returned sequence
    /// has one entry per statement the server attempted, each carrying
    /// that statement's own outcome code and message.
    pub fn batch_execute(&self, sqls: &[&str]) -> Result<Vec<BatchEntry>> {
        if sqls.is_empty() {
            return Err(Error::client(error::ER_INVALID_PARAM));
        }
        let handle = self.handle()?;
        let results = self
            .cci
            .execute_batch(handle, sqls)
            .map_err(|e| Error::from_cci(&e, &*self.cci))?;
        debug!(statements = sqls.len(), attempted = results.len(), "batch executed");
        Ok(results
            .into_iter()
            .map(|r| BatchEntry {
                err_no: r.err_no,
                err_msg: if r.err_no >= 0 {
                    "success".to_string()
                } else {
                    r.err_msg
                },
            })
            .collect())
    }

    /// Checks that the server still answers queries on this session.
    pub fn ping(&self) -> Result<bool> {
        let handle = self.handle()?;
        let cci = &*self.cci;
        let stmt = cci
            .prepare(handle, "select 1+1 from db_root", 0)
            .map_err(|e| Error::from_cci(&e, cci))?;
        let probe = || -> Result<bool> {
            cci.execute(stmt, 0, 0).map_err(|e| Error::from_cci(&e, cci))?;
            let mut connected = false;
            loop {
                match cci.cursor_move(stmt, 1, CursorOrigin::Current) {
                    Ok(()) => {}
                    Err(e) if e.code == CCI_ER_NO_MORE_DATA => break,
                    Err(e) => return Err(Error::from_cci(&e, cci)),
                }
                cci.fetch(stmt).map_err(|e| Error::from_cci(&e, cci))?;
                if let Some(WireDatum::Int(n)) = cci
                    .get_data(stmt, 1, AccessType::Int)
                    .map_err(|e| Error::from_cci(&e, cci))?
                {
                    if n == 2 {
                        connected = true;
                    }
                }
            }
            Ok(connected)
        };
        let result = probe();
        let _ = cci.close_statement(stmt);
        result
    }

    /// Requests schema information from the database and returns the
    /// first matching row, or `None` when nothing matches.
    ///
    /// Integer-typed result columns are decoded as integers, everything
    /// else as text.
    pub fn schema_info(
        &self,
        kind: SchemaType,
        class_name: Option<&str>,
        attr_name: Option<&str>,
    ) -> Result<Option<Vec<Value>>> {
        let handle = self.handle()?;
        let cci = &*self.cci;
        let stmt = cci
            .schema_info(handle, kind, class_name, attr_name, kind.pattern_flag())
            .map_err(|e| Error::from_cci(&e, cci))?;
        let fetch = || -> Result<Option<Vec<Value>>> {
            let (_, columns) = cci
                .result_info(stmt)
                .map_err(|e| Error::from_cci(&e, cci))?;
            if columns.is_empty() {
                return Err(Error::client(error::ER_CANNOT_GET_COLUMN_INFO));
            }
            match cci.cursor_move(stmt, 1, CursorOrigin::Current) {
                Ok(()) => {}
                Err(e) if e.code == CCI_ER_NO_MORE_DATA => return Ok(None),
                Err(e) => return Err(Error::from_cci(&e, cci)),
            }
            cci.fetch(stmt).map_err(|e| Error::from_cci(&e, cci))?;
            let mut row = Vec::with_capacity(columns.len());
            for (i, meta) in columns.iter().enumerate() {
                let value = match meta.data_type {
                    CubridType::Int | CubridType::Short => {
                        match cci
                            .get_data(stmt, i + 1, AccessType::Int)
                            .map_err(|e| Error::from_cci(&e, cci))?
                        {
                            None => Value::Null,
                            Some(WireDatum::Int(n)) => Value::Int(n as i64),
                            Some(_) => return Err(Error::client(error::ER_UNKNOWN_TYPE)),
                        }
                    }
                    _ => match cci
                        .get_data(stmt, i + 1, AccessType::Str)
                        .map_err(|e| Error::from_cci(&e, cci))?
                    {
                        None => Value::Null,
                        Some(WireDatum::Str(bytes)) => Value::Text(
                            String::from_utf8(bytes)
                                .map_err(|_| Error::parse_message("String decoding failed"))?,
                        ),
                        Some(_) => return Err(Error::client(error::ER_UNKNOWN_TYPE)),
                    },
                };
                row.push(value);
            }
            Ok(Some(row))
        };
        let result = fetch();
        let _ = cci.close_statement(stmt);
        result
    }

    /// Closes the connection. Safe to call at any time: closing an
    /// already-closed connection is a silent no-op, and child objects
    /// need not have been closed first.
    pub fn close(&self) -> Result<()> {
        let handle = match self.handle.get() {
            Some(handle) => handle,
            None => return Ok(()),
        };
        self.cci
            .disconnect(handle)
            .map_err(|e| Error::from_cci(&e, &*self.cci))?;
        self.handle.set(None);
        debug!("connection closed");
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.handle.get().is_some() {
            write!(f, "<open CUBRID connection at {}:{}>", self.url, self.user)
        } else {
            write!(f, "<closed CUBRID connection at {}>", self.url)
        }
    }
}

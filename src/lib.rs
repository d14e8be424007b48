// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

/*!
This is a [CUBRID database][] client library for [Rust][], layered over the
CCI connection interface of the CUBRID broker.

The crate provides the conventional cursor-based access pattern: obtain a
[`Connection`], open a [`Cursor`], prepare a statement, bind parameters,
execute, and fetch rows. Large objects stream through [`Lob`] and
collection columns bind through [`CubridSet`]. Every fetched value is
materialized as a [`Value`], with SQL NULL mapped to [`Value::Null`]
regardless of the column's declared type.

The wire protocol itself lives behind the [`cci::Cci`] trait; this crate
owns statement lifecycle, value marshaling and error classification on top
of that primitive set.

## Example

Execute a select statement and fetch rows:

```no_run
# fn run(conn: &cubrid::Connection) -> cubrid::Result<()> {
use cubrid::Value;

let mut cur = conn.cursor()?;
cur.prepare("select id, name from athlete where gender = ?")?;
cur.bind_param(1, &Value::from("M"), None)?;
cur.execute()?;
while let Some(row) = cur.fetch_row()? {
    let id = row.get(0)?;
    let name = row.get("name")?;
    println!("{} {}", id, name);
}
cur.close()?;
# Ok(()) }
```

Execute non-select statements and control the transaction:

```no_run
# fn run(conn: &cubrid::Connection) -> cubrid::Result<()> {
use cubrid::Value;

let mut cur = conn.cursor()?;
cur.prepare("insert into athlete(name, gender) values (?, ?)")?;
cur.bind_param(1, &Value::from("Ji Sung Park"), None)?;
cur.bind_param(2, &Value::from("M"), None)?;
cur.execute()?;
assert_eq!(cur.affected_rows()?, 1);
conn.commit()?;
# Ok(()) }
```

[CUBRID database]: https://www.cubrid.org/
[Rust]: https://www.rust-lang.org/
*/

pub mod cci;
mod collection;
mod connection;
mod cursor;
mod error;
mod lob;
mod row;
mod sql_type;
mod value;

pub use crate::cci::ColumnMeta;
pub use crate::cci::LobKind;
pub use crate::cci::SchemaType;
pub use crate::collection::CubridSet;
pub use crate::connection::BatchEntry;
pub use crate::connection::Connection;
pub use crate::connection::IsolationLevel;
pub use crate::cursor::ColumnDescription;
pub use crate::cursor::Cursor;
pub use crate::error::Error;
pub use crate::error::ErrorKind;
pub use crate::error::Facility;
pub use crate::lob::Lob;
pub use crate::lob::Whence;
pub use crate::row::Row;
pub use crate::row::RowIndex;
pub use crate::sql_type::CubridType;
pub use crate::sql_type::StatementKind;
pub use crate::value::Charset;
pub use crate::value::Collection;
pub use crate::value::Value;

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
pub(crate) mod test_util {
    use crate::cci::*;
    use crate::sql_type::{CubridType, StatementKind};

    /// A transport where every primitive fails; unit tests that only need
    /// a `&dyn Cci` for message lookup use it.
    pub struct NullCci;

    impl Cci for NullCci {
        fn connect(&self, _: &str, _: &str, _: &str) -> CciResult<ConnHandle> {
            Err(CciError::new(CCI_ER_COMMUNICATION))
        }
        fn disconnect(&self, _: ConnHandle) -> CciResult<()> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn end_tran(&self, _: ConnHandle, _: TranType) -> CciResult<()> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn set_autocommit(&self, _: ConnHandle, _: bool) -> CciResult<()> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn set_isolation_level(&self, _: ConnHandle, _: i32) -> CciResult<()> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn get_db_parameter(&self, _: ConnHandle, _: DbParam) -> CciResult<i32> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn get_db_version(&self, _: ConnHandle) -> CciResult<String> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn last_insert_id(&self, _: ConnHandle) -> CciResult<Option<String>> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn prepare(&self, _: ConnHandle, _: &str, _: i32) -> CciResult<StmtHandle> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn bind_count(&self, _: StmtHandle) -> CciResult<usize> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn bind_param(&self, _: StmtHandle, _: usize, _: &BindValue) -> CciResult<()> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn execute(&self, _: StmtHandle, _: i32, _: i32) -> CciResult<i64> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn execute_batch(&self, _: ConnHandle, _: &[&str]) -> CciResult<Vec<QueryResult>> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn result_info(&self, _: StmtHandle) -> CciResult<(StatementKind, Vec<ColumnMeta>)> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn cursor_move(&self, _: StmtHandle, _: i64, _: CursorOrigin) -> CciResult<()> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn fetch(&self, _: StmtHandle) -> CciResult<()> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn get_data(
            &self,
            _: StmtHandle,
            _: usize,
            _: AccessType,
        ) -> CciResult<Option<WireDatum>> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn next_result(&self, _: StmtHandle) -> CciResult<i64> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn close_statement(&self, _: StmtHandle) -> CciResult<()> {
            Err(CciError::new(CCI_ER_REQ_HANDLE))
        }
        fn schema_info(
            &self,
            _: ConnHandle,
            _: SchemaType,
            _: Option<&str>,
            _: Option<&str>,
            _: u8,
        ) -> CciResult<StmtHandle> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn lob_new(&self, _: ConnHandle, _: LobKind) -> CciResult<LobHandle> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn lob_write(
            &self,
            _: ConnHandle,
            _: LobHandle,
            _: LobKind,
            _: u64,
            _: &[u8],
        ) -> CciResult<usize> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn lob_read(
            &self,
            _: ConnHandle,
            _: LobHandle,
            _: LobKind,
            _: u64,
            _: usize,
        ) -> CciResult<Vec<u8>> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn lob_size(&self, _: LobHandle, _: LobKind) -> CciResult<u64> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn lob_free(&self, _: LobHandle) -> CciResult<()> {
            Ok(())
        }
        fn set_make(
            &self,
            _: ConnHandle,
            _: CubridType,
            _: &[SetElement],
        ) -> CciResult<SetHandle> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn set_size(&self, _: SetHandle) -> CciResult<usize> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn set_get(&self, _: SetHandle, _: usize) -> CciResult<Option<String>> {
            Err(CciError::new(CCI_ER_CON_HANDLE))
        }
        fn set_free(&self, _: SetHandle) -> CciResult<()> {
            Ok(())
        }
        fn error_message(&self, _: i32) -> Option<String> {
            None
        }
    }
}

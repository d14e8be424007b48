// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

use crate::cci::{Cci, ColumnMeta, StmtHandle};
use crate::error;
use crate::value::{decode_collection, decode_column, Charset, Value};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Row in a result set of a select statement.
///
/// Column values are materialized in declared column order; the column
/// name list is shared with the cursor that produced the row.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) column_names: Arc<Vec<String>>,
    pub(crate) values: Vec<Value>,
}

impl Row {
    /// Gets the column value at the specified index.
    ///
    /// The index is a 0-based position or a column name; names are
    /// compared case-insensitively.
    pub fn get<I>(&self, colidx: I) -> Result<&Value>
    where
        I: RowIndex,
    {
        let pos = colidx.idx(&self.column_names)?;
        Ok(&self.values[pos])
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A trait implemented by types that can index into columns of a row.
pub trait RowIndex {
    fn idx(&self, column_names: &[String]) -> Result<usize>;
}

impl RowIndex for usize {
    fn idx(&self, column_names: &[String]) -> Result<usize> {
        if *self < column_names.len() {
            Ok(*self)
        } else {
            Err(Error::client(error::ER_INVALID_PARAM))
        }
    }
}

impl RowIndex for &str {
    fn idx(&self, column_names: &[String]) -> Result<usize> {
        column_names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(self))
            .ok_or_else(|| Error::client(error::ER_INVALID_PARAM))
    }
}

fn read_value(
    cci: &dyn Cci,
    stmt: StmtHandle,
    col: usize,
    meta: &ColumnMeta,
    charset: Charset,
) -> Result<Value> {
    if meta.data_type.is_collection() {
        decode_collection(cci, stmt, col, meta.data_type)
    } else {
        decode_column(cci, stmt, col, meta.data_type, charset)
    }
}

/// Builds one ordered row from the current server-side row. The caller
/// must already have advanced the cursor to a valid row; this never
/// fetches or repositions by itself.
pub(crate) fn read_row(
    cci: &dyn Cci,
    stmt: StmtHandle,
    columns: &[ColumnMeta],
    column_names: Arc<Vec<String>>,
    charset: Charset,
) -> Result<Row> {
    let mut values = Vec::with_capacity(columns.len());
    for (i, meta) in columns.iter().enumerate() {
        values.push(read_value(cci, stmt, i + 1, meta, charset)?);
    }
    Ok(Row {
        column_names,
        values,
    })
}

/// Builds one name-keyed row. When two columns share a name the last one
/// wins; no disambiguation is performed.
pub(crate) fn read_row_map(
    cci: &dyn Cci,
    stmt: StmtHandle,
    columns: &[ColumnMeta],
    charset: Charset,
) -> Result<HashMap<String, Value>> {
    let mut row = HashMap::with_capacity(columns.len());
    for (i, meta) in columns.iter().enumerate() {
        let value = read_value(cci, stmt, i + 1, meta, charset)?;
        row.insert(meta.name.clone(), value);
    }
    Ok(row)
}

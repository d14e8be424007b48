// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

//! Conversion between host values and the typed wire representation.
//!
//! Decoding dispatches on the column's wire type and always checks the
//! per-value null indicator first; a null column is the host [`Value::Null`]
//! no matter what the dispatch table would have produced. Encoding
//! dispatches on the host value's variant, with an optional wire type hint
//! that overrides the chosen wire type but never the byte-level conversion
//! strategy.

use crate::cci::{AccessType, BindValue, Cci, CciDate, StmtHandle, WireDatum};
use crate::error;
use crate::sql_type::CubridType;
use crate::{Error, Result};
use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A value crossing the boundary between the host program and the server.
///
/// Fetched column values are materialized as this type, and bind
/// parameters are supplied as it. `Null` is the uniform host
/// representation of SQL NULL for every wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// INT, SHORT and BIGINT columns. The wire type chosen when binding
    /// depends on the magnitude and on an explicit BIGINT hint.
    Int(i64),
    /// FLOAT and DOUBLE columns; bound as DOUBLE.
    Float(f64),
    /// NUMERIC columns; travels as text in both directions so no binary
    /// float precision is lost.
    Decimal(BigDecimal),
    Text(String),
    /// BIT/VARBIT columns and raw byte parameters.
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// DATETIME (millisecond resolution) and TIMESTAMP (second
    /// resolution) columns.
    DateTime(NaiveDateTime),
    /// SET/MULTISET/SEQUENCE columns, fully materialized.
    Collection(Collection),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Bytes(v) => {
                for b in v {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::Collection(Collection::Set(v)) => write!(f, "set({} elements)", v.len()),
            Value::Collection(Collection::List(v)) => write!(f, "list({} elements)", v.len()),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Value {
        Value::Bytes(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Value {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Value {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Value {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Value {
        Value::DateTime(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Value {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A fetched collection column.
///
/// A SET column deduplicates and is unordered; MULTISET and SEQUENCE keep
/// order and duplicates. Elements are always materialized as text, with
/// null elements preserved as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Set(HashSet<Option<String>>),
    List(Vec<Option<String>>),
}

impl Collection {
    pub fn len(&self) -> usize {
        match self {
            Collection::Set(v) => v.len(),
            Collection::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, elem: &Option<String>) -> bool {
        match self {
            Collection::Set(v) => v.contains(elem),
            Collection::List(v) => v.contains(elem),
        }
    }
}

/// Character set used to decode textual column data. UTF-8 unless the
/// cursor was told otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Iso88591,
}

impl Charset {
    pub fn from_name(name: &str) -> Result<Charset> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Charset::Utf8),
            "iso-8859-1" | "iso88591" | "latin1" => Ok(Charset::Iso88591),
            _ => Err(Error::client(error::ER_INVALID_PARAM)),
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::parse_message("String decoding failed")),
            Charset::Iso88591 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

fn get_datum(
    cci: &dyn Cci,
    stmt: StmtHandle,
    col: usize,
    atype: AccessType,
) -> Result<Option<WireDatum>> {
    cci.get_data(stmt, col, atype)
        .map_err(|e| Error::from_cci(&e, cci))
}

fn fetch_text(
    cci: &dyn Cci,
    stmt: StmtHandle,
    col: usize,
    charset: Charset,
) -> Result<Option<String>> {
    match get_datum(cci, stmt, col, AccessType::Str)? {
        None => Ok(None),
        Some(WireDatum::Str(bytes)) => charset.decode(&bytes).map(Some),
        Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
    }
}

/// Pairs up hexadecimal digits of a BIT/VARBIT textual fetch into bytes.
fn hex_to_bytes(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2 + 1);
    for pair in bytes.chunks(2) {
        let s = std::str::from_utf8(pair)?;
        let b =
            u8::from_str_radix(s, 16).map_err(|_| Error::parse_message("Invalid hex digit"))?;
        out.push(b);
    }
    Ok(out)
}

fn date_from_parts(dt: &CciDate) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(dt.yr, dt.mon, dt.day)
        .ok_or_else(|| Error::parse_message("Invalid date value"))
}

fn time_from_parts(dt: &CciDate, micro: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_micro_opt(dt.hh, dt.mm, dt.ss, micro)
        .ok_or_else(|| Error::parse_message("Invalid time value"))
}

fn datetime_from_parts(dt: &CciDate, milli: u32) -> Result<NaiveDateTime> {
    date_from_parts(dt)?
        .and_hms_milli_opt(dt.hh, dt.mm, dt.ss, milli)
        .ok_or_else(|| Error::parse_message("Invalid datetime value"))
}

/// Decodes one scalar column of the current row.
///
/// Collection columns are not handled here; the row reader dispatches
/// them to [`decode_collection`].
pub(crate) fn decode_column(
    cci: &dyn Cci,
    stmt: StmtHandle,
    col: usize,
    dtype: CubridType,
    charset: Charset,
) -> Result<Value> {
    match dtype {
        CubridType::Bit | CubridType::VarBit => {
            // The broker sends BIT data as hexadecimal text.
            match fetch_text(cci, stmt, col, charset)? {
                None => Ok(Value::Null),
                Some(text) => Ok(Value::Bytes(hex_to_bytes(&text)?)),
            }
        }
        CubridType::Int | CubridType::Short => {
            match get_datum(cci, stmt, col, AccessType::Int)? {
                None => Ok(Value::Null),
                Some(WireDatum::Int(n)) => Ok(Value::Int(n as i64)),
                Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
            }
        }
        CubridType::BigInt => match get_datum(cci, stmt, col, AccessType::BigInt)? {
            None => Ok(Value::Null),
            Some(WireDatum::BigInt(n)) => Ok(Value::Int(n)),
            Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
        },
        CubridType::Float | CubridType::Double => {
            // Fetched as text and parsed host-side; the transport's binary
            // float path loses precision.
            match fetch_text(cci, stmt, col, charset)? {
                None => Ok(Value::Null),
                Some(text) => Ok(Value::Float(text.trim().parse()?)),
            }
        }
        CubridType::Numeric => match fetch_text(cci, stmt, col, charset)? {
            None => Ok(Value::Null),
            Some(text) => Ok(Value::Decimal(
                BigDecimal::from_str(text.trim()).map_err(Error::parse_error)?,
            )),
        },
        CubridType::Date => match get_datum(cci, stmt, col, AccessType::Date)? {
            None => Ok(Value::Null),
            Some(WireDatum::Date(dt)) => Ok(Value::Date(date_from_parts(&dt)?)),
            Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
        },
        CubridType::Time => match get_datum(cci, stmt, col, AccessType::Date)? {
            None => Ok(Value::Null),
            Some(WireDatum::Date(dt)) => Ok(Value::Time(time_from_parts(&dt, 0)?)),
            Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
        },
        CubridType::Datetime => match get_datum(cci, stmt, col, AccessType::Date)? {
            None => Ok(Value::Null),
            Some(WireDatum::Date(dt)) => Ok(Value::DateTime(datetime_from_parts(&dt, dt.ms)?)),
            Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
        },
        CubridType::Timestamp => match get_datum(cci, stmt, col, AccessType::Date)? {
            None => Ok(Value::Null),
            // TIMESTAMP has second resolution; sub-second is forced to zero.
            Some(WireDatum::Date(dt)) => Ok(Value::DateTime(datetime_from_parts(&dt, 0)?)),
            Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
        },
        CubridType::Char | CubridType::String | CubridType::Json => {
            match fetch_text(cci, stmt, col, charset)? {
                None => Ok(Value::Null),
                Some(text) => Ok(Value::Text(text)),
            }
        }
        _ => decode_unknown(cci, stmt, col, charset),
    }
}

/// Legacy fallback for wire types this client does not dispatch on.
///
/// Probes integer, then the date struct (sub-dispatching on which fields
/// are nonzero), then text, in that fixed order, and returns whichever
/// succeeds first. This probing order is a compatibility behavior and can
/// misclassify genuinely unknown types; do not extend it.
fn decode_unknown(
    cci: &dyn Cci,
    stmt: StmtHandle,
    col: usize,
    charset: Charset,
) -> Result<Value> {
    if let Ok(datum) = cci.get_data(stmt, col, AccessType::Int) {
        return match datum {
            None => Ok(Value::Null),
            Some(WireDatum::Int(n)) => Ok(Value::Int(n as i64)),
            Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
        };
    }
    if let Ok(datum) = cci.get_data(stmt, col, AccessType::Date) {
        return match datum {
            None => Ok(Value::Null),
            Some(WireDatum::Date(dt)) => {
                if dt.yr == 0 {
                    Ok(Value::Time(time_from_parts(&dt, dt.ms * 1000)?))
                } else if dt.hh == 0 && dt.mm == 0 && dt.ss == 0 && dt.ms == 0 {
                    Ok(Value::Date(date_from_parts(&dt)?))
                } else {
                    Ok(Value::DateTime(datetime_from_parts(&dt, dt.ms)?))
                }
            }
            Some(_) => Err(Error::client(error::ER_UNKNOWN_TYPE)),
        };
    }
    match fetch_text(cci, stmt, col, charset)? {
        None => Ok(Value::Null),
        Some(text) => Ok(Value::Text(text)),
    }
}

/// Decodes one collection column of the current row.
///
/// Every element is materialized as text; the declared collection type
/// decides between the deduplicating set and the ordered list shape.
pub(crate) fn decode_collection(
    cci: &dyn Cci,
    stmt: StmtHandle,
    col: usize,
    dtype: CubridType,
) -> Result<Value> {
    let handle = match get_datum(cci, stmt, col, AccessType::Set)? {
        None => return Ok(Value::Null),
        Some(WireDatum::Set(handle)) => handle,
        Some(_) => return Err(Error::client(error::ER_UNKNOWN_TYPE)),
    };
    let read = || -> Result<Vec<Option<String>>> {
        let size = cci.set_size(handle).map_err(|e| Error::from_cci(&e, cci))?;
        let mut elements = Vec::with_capacity(size);
        for i in 1..=size {
            elements.push(cci.set_get(handle, i).map_err(|e| Error::from_cci(&e, cci))?);
        }
        Ok(elements)
    };
    let result = read();
    let _ = cci.set_free(handle);
    let elements = result?;
    if dtype.is_set_like() {
        Ok(Value::Collection(Collection::Set(
            elements.into_iter().collect(),
        )))
    } else {
        Ok(Value::Collection(Collection::List(elements)))
    }
}

/// Selects a wire type and representation for a parameter value.
///
/// An explicit `hint` overrides the wire type where the value's own shape
/// does not force one, but never changes how the host value is converted
/// to bytes.
pub(crate) fn encode_value(value: &Value, hint: Option<CubridType>) -> Result<BindValue> {
    match value {
        Value::Null => Ok(BindValue::Null),
        Value::Int(n) => {
            if hint == Some(CubridType::BigInt) {
                Ok(BindValue::BigInt(*n))
            } else if *n >= i32::MIN as i64 && *n <= i32::MAX as i64 {
                Ok(BindValue::Int(*n as i32))
            } else {
                Ok(BindValue::BigInt(*n))
            }
        }
        Value::Float(f) => Ok(BindValue::Double(*f)),
        Value::Decimal(d) => Ok(BindValue::Str {
            bytes: d.to_string().into_bytes(),
            wire_type: CubridType::Numeric,
        }),
        Value::Text(s) => Ok(BindValue::Str {
            bytes: s.as_bytes().to_vec(),
            wire_type: hint.unwrap_or(CubridType::Char),
        }),
        Value::Bytes(b) => match hint {
            Some(wire_type @ (CubridType::Bit | CubridType::VarBit)) => Ok(BindValue::Bit {
                bytes: b.clone(),
                wire_type,
            }),
            _ => Ok(BindValue::Str {
                bytes: b.clone(),
                wire_type: hint.unwrap_or(CubridType::Char),
            }),
        },
        Value::Date(d) => Ok(BindValue::Date {
            value: CciDate {
                yr: d.year(),
                mon: d.month(),
                day: d.day(),
                ..Default::default()
            },
            wire_type: CubridType::Date,
        }),
        Value::Time(t) => Ok(BindValue::Date {
            value: CciDate {
                hh: t.hour(),
                mm: t.minute(),
                ss: t.second(),
                ms: t.nanosecond() / 1_000_000,
                ..Default::default()
            },
            wire_type: CubridType::Time,
        }),
        Value::DateTime(dt) => Ok(BindValue::Date {
            value: CciDate {
                yr: dt.year(),
                mon: dt.month(),
                day: dt.day(),
                hh: dt.hour(),
                mm: dt.minute(),
                ss: dt.second(),
                ms: dt.nanosecond() / 1_000_000,
            },
            wire_type: CubridType::Datetime,
        }),
        Value::Collection(_) => Err(Error::client(error::ER_NOT_SUPPORTED_TYPE)),
    }
}

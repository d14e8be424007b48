// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

use std::fmt;

/// Column/parameter type tags of the CUBRID wire protocol.
///
/// The numeric codes are the `CCI_U_TYPE` codes reported by the broker in
/// column metadata. Collection types (`SET`, `MULTISET`, `SEQUENCE`) carry
/// the collection code used in result info, not the plain element code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubridType {
    Null,
    Char,
    String,
    NChar,
    VarNChar,
    Bit,
    VarBit,
    Numeric,
    Int,
    Short,
    Monetary,
    Float,
    Double,
    Date,
    Time,
    Timestamp,
    Object,
    BigInt,
    Datetime,
    Blob,
    Clob,
    Json,
    Set,
    Multiset,
    Sequence,
    /// A type code this client does not know about. Values of such columns
    /// are fetched through a legacy probing path; see the value codec.
    Other(i32),
}

impl CubridType {
    pub fn from_code(code: i32) -> CubridType {
        match code {
            0 => CubridType::Null,
            1 => CubridType::Char,
            2 => CubridType::String,
            3 => CubridType::NChar,
            4 => CubridType::VarNChar,
            5 => CubridType::Bit,
            6 => CubridType::VarBit,
            7 => CubridType::Numeric,
            8 => CubridType::Int,
            9 => CubridType::Short,
            10 => CubridType::Monetary,
            11 => CubridType::Float,
            12 => CubridType::Double,
            13 => CubridType::Date,
            14 => CubridType::Time,
            15 => CubridType::Timestamp,
            19 => CubridType::Object,
            21 => CubridType::BigInt,
            22 => CubridType::Datetime,
            23 => CubridType::Blob,
            24 => CubridType::Clob,
            130 => CubridType::Json,
            32 => CubridType::Set,
            64 => CubridType::Multiset,
            96 => CubridType::Sequence,
            code => CubridType::Other(code),
        }
    }

    pub fn code(&self) -> i32 {
        match *self {
            CubridType::Null => 0,
            CubridType::Char => 1,
            CubridType::String => 2,
            CubridType::NChar => 3,
            CubridType::VarNChar => 4,
            CubridType::Bit => 5,
            CubridType::VarBit => 6,
            CubridType::Numeric => 7,
            CubridType::Int => 8,
            CubridType::Short => 9,
            CubridType::Monetary => 10,
            CubridType::Float => 11,
            CubridType::Double => 12,
            CubridType::Date => 13,
            CubridType::Time => 14,
            CubridType::Timestamp => 15,
            CubridType::Object => 19,
            CubridType::BigInt => 21,
            CubridType::Datetime => 22,
            CubridType::Blob => 23,
            CubridType::Clob => 24,
            CubridType::Json => 130,
            CubridType::Set => 32,
            CubridType::Multiset => 64,
            CubridType::Sequence => 96,
            CubridType::Other(code) => code,
        }
    }

    /// True for SET, MULTISET and SEQUENCE columns. Such columns are read
    /// through the collection marshaler instead of the scalar codec.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            CubridType::Set | CubridType::Multiset | CubridType::Sequence
        )
    }

    /// True for the SET type proper, whose host representation deduplicates
    /// and is unordered. MULTISET and SEQUENCE keep order and duplicates.
    pub fn is_set_like(&self) -> bool {
        matches!(self, CubridType::Set)
    }
}

impl fmt::Display for CubridType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CubridType::Null => write!(f, "null"),
            CubridType::Char => write!(f, "char"),
            CubridType::String => write!(f, "string"),
            CubridType::NChar => write!(f, "nchar"),
            CubridType::VarNChar => write!(f, "varnchar"),
            CubridType::Bit => write!(f, "bit"),
            CubridType::VarBit => write!(f, "varbit"),
            CubridType::Numeric => write!(f, "numeric"),
            CubridType::Int => write!(f, "int"),
            CubridType::Short => write!(f, "short"),
            CubridType::Monetary => write!(f, "monetary"),
            CubridType::Float => write!(f, "float"),
            CubridType::Double => write!(f, "double"),
            CubridType::Date => write!(f, "date"),
            CubridType::Time => write!(f, "time"),
            CubridType::Timestamp => write!(f, "timestamp"),
            CubridType::Object => write!(f, "object"),
            CubridType::BigInt => write!(f, "bigint"),
            CubridType::Datetime => write!(f, "datetime"),
            CubridType::Blob => write!(f, "blob"),
            CubridType::Clob => write!(f, "clob"),
            CubridType::Json => write!(f, "json"),
            CubridType::Set => write!(f, "set"),
            CubridType::Multiset => write!(f, "multiset"),
            CubridType::Sequence => write!(f, "sequence"),
            CubridType::Other(code) => write!(f, "other({})", code),
        }
    }
}

/// Statement kind reported by the broker after a statement is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Call,
    /// Any other command (DDL, commit, session control, ...).
    Other(i32),
}

impl StatementKind {
    /// Whether the transport's execute return value is a meaningful row
    /// count for this kind of statement. For everything else the row count
    /// is reported as -1 ("not applicable", distinct from zero rows).
    pub fn reports_row_count(&self) -> bool {
        !matches!(self, StatementKind::Other(_))
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StatementKind::Select => write!(f, "select"),
            StatementKind::Insert => write!(f, "insert"),
            StatementKind::Update => write!(f, "update"),
            StatementKind::Delete => write!(f, "delete"),
            StatementKind::Call => write!(f, "call"),
            StatementKind::Other(code) => write!(f, "other({})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_code_round_trip() {
        for code in [1, 2, 5, 6, 7, 8, 9, 11, 12, 13, 14, 15, 21, 22, 23, 24, 32, 64, 96, 130] {
            assert_eq!(CubridType::from_code(code).code(), code);
        }
        assert_eq!(CubridType::from_code(77), CubridType::Other(77));
        assert_eq!(CubridType::Other(77).code(), 77);
    }

    #[test]
    fn collection_predicates() {
        assert!(CubridType::Set.is_collection());
        assert!(CubridType::Multiset.is_collection());
        assert!(CubridType::Sequence.is_collection());
        assert!(CubridType::Set.is_set_like());
        assert!(!CubridType::Multiset.is_set_like());
        assert!(!CubridType::String.is_collection());
    }

    #[test]
    fn statement_kind_row_count() {
        assert!(StatementKind::Select.reports_row_count());
        assert!(StatementKind::Call.reports_row_count());
        assert!(!StatementKind::Other(3).reports_row_count());
    }
}

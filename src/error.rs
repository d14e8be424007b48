// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

use crate::cci::{Cci, CciError, CAS_ER_IS, CCI_ER_DBMS, CCI_ER_END};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::num;
use std::str;

// Client-side error codes. These live below the CCI range and are produced
// by this crate itself, never by the transport.
pub(crate) const ER_NO_MORE_MEMORY: i32 = -30001;
pub(crate) const ER_INVALID_SQL_TYPE: i32 = -30002;
pub(crate) const ER_CANNOT_GET_COLUMN_INFO: i32 = -30003;
pub(crate) const ER_INIT_ARRAY_FAIL: i32 = -30004;
pub(crate) const ER_UNKNOWN_TYPE: i32 = -30005;
pub(crate) const ER_INVALID_PARAM: i32 = -30006;
pub(crate) const ER_INVALID_ARRAY_TYPE: i32 = -30007;
pub(crate) const ER_NOT_SUPPORTED_TYPE: i32 = -30008;
pub(crate) const ER_OPEN_FILE: i32 = -30009;
pub(crate) const ER_CREATE_TEMP_FILE: i32 = -30010;
pub(crate) const ER_INVALID_CURSOR_POS: i32 = -30011;
pub(crate) const ER_SQL_UNPREPARE: i32 = -30012;
pub(crate) const ER_PARAM_UNBIND: i32 = -30013;
pub(crate) const ER_SCHEMA_TYPE: i32 = -30014;
pub(crate) const ER_READ_FILE: i32 = -30015;
pub(crate) const ER_WRITE_FILE: i32 = -30016;
pub(crate) const ER_LOB_NOT_EXIST: i32 = -30017;
pub(crate) const ER_INVALID_CURSOR: i32 = -30018;
/// End of the client error code range.
pub(crate) const CUBRID_ER_END: i32 = -31000;

static CLIENT_ERROR_MESSAGES: Lazy<HashMap<i32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (ER_NO_MORE_MEMORY, "Memory allocation error"),
        (ER_INVALID_SQL_TYPE, "Invalid API call"),
        (ER_CANNOT_GET_COLUMN_INFO, "Cannot get column info"),
        (ER_INIT_ARRAY_FAIL, "Array initializing error"),
        (ER_UNKNOWN_TYPE, "Unknown column type"),
        (ER_INVALID_PARAM, "Invalid parameter"),
        (ER_INVALID_ARRAY_TYPE, "Invalid array type"),
        (ER_NOT_SUPPORTED_TYPE, "Invalid type"),
        (ER_OPEN_FILE, "File open error"),
        (ER_CREATE_TEMP_FILE, "Temporary file open error"),
        (ER_INVALID_CURSOR_POS, "Invalid cursor position"),
        (ER_SQL_UNPREPARE, "SQL statement not prepared"),
        (ER_PARAM_UNBIND, "Some parameter not binded"),
        (ER_SCHEMA_TYPE, "Invalid schema type"),
        (ER_READ_FILE, "Can not read file"),
        (ER_WRITE_FILE, "Can not write file"),
        (ER_LOB_NOT_EXIST, "LOB not exist"),
        (
            ER_INVALID_CURSOR,
            "The cursor has been closed. No operation is allowed any more.",
        ),
    ])
});

// Server diagnostic codes with a known classification. Everything else on
// a DBMS failure is a generic database error. The tables are fixed, not
// derived from server headers.
const PROGRAMMING_CODES: &[i32] = &[-493];
const OPERATIONAL_CODES: &[i32] = &[-669, -673, -677, -1069, -1071];
const INTEGRITY_CODES: &[i32] = &[
    -205, -494, -631, -670, -886, -919, -920, -921, -922, -923, -924, -1063, -1067,
];

/// A list of error categories.
///
/// The database categories follow the conventional client API taxonomy;
/// `Parse` and `OutOfRange` are raised locally by value conversion.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Client library misuse or client-side failure.
    Interface,

    /// Operation attempted on a closed cursor. A specialization of
    /// [`Interface`](ErrorKind::Interface).
    InvalidCursor,

    /// Generic server-reported failure.
    Database,

    /// Reserved specialization of [`Database`](ErrorKind::Database); not
    /// raised by this crate's own logic.
    Data,

    /// Environment or resource failure reported by the server, e.g. a
    /// lock timeout or a lost connection.
    Operational,

    /// Constraint violation (not-null, unique, foreign key).
    Integrity,

    /// Malformed SQL or invalid API sequencing detected server-side.
    Programming,

    /// Unrecognized server failure carrying no diagnostic payload.
    NotSupported,

    /// Error when a fetched value cannot be converted to its host
    /// representation (charset decode failure, malformed numeric text).
    Parse,

    /// Error when a conversion fails due to out-of-range.
    OutOfRange,
}

impl ErrorKind {
    /// True for [`Interface`](ErrorKind::Interface) and its
    /// [`InvalidCursor`](ErrorKind::InvalidCursor) specialization.
    pub fn is_interface_error(&self) -> bool {
        matches!(self, ErrorKind::Interface | ErrorKind::InvalidCursor)
    }

    /// True for [`Database`](ErrorKind::Database) and its specializations.
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::Database
                | ErrorKind::Data
                | ErrorKind::Operational
                | ErrorKind::Integrity
                | ErrorKind::Programming
                | ErrorKind::NotSupported
        )
    }
}

/// Subsystem that produced an error code, named in the formatted message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Facility {
    Dbms,
    Cas,
    Cci,
    Client,
    Unknown,
}

impl Facility {
    fn of_code(code: i32) -> Facility {
        if code > CAS_ER_IS {
            Facility::Cas
        } else if code > CCI_ER_END {
            Facility::Cci
        } else if code > CUBRID_ER_END {
            Facility::Client
        } else {
            Facility::Unknown
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Facility::Dbms => write!(f, "DBMS"),
            Facility::Cas => write!(f, "CAS"),
            Facility::Cci => write!(f, "CCI"),
            Facility::Client => write!(f, "CLIENT"),
            Facility::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// The error type for cubrid.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    code: i32,
    facility: Facility,
    message: Cow<'static, str>,
    source: Option<Box<dyn error::Error + Send + Sync>>,
}

impl Error {
    fn new<M>(kind: ErrorKind, code: i32, facility: Facility, message: M) -> Error
    where
        M: Into<Cow<'static, str>>,
    {
        Error {
            kind,
            code,
            facility,
            message: message.into(),
            source: None,
        }
    }

    /// Translates a failed transport call into its error category.
    ///
    /// A DBMS failure is classified by the embedded diagnostic code; every
    /// other code is an interface error whose message comes from the
    /// client table or, for codes in the transport's own ranges, from the
    /// transport's message lookup.
    pub(crate) fn from_cci(err: &CciError, cci: &dyn Cci) -> Error {
        if err.code == CCI_ER_DBMS {
            return match &err.diagnostic {
                Some(diag) => {
                    let kind = if PROGRAMMING_CODES.contains(&diag.code) {
                        ErrorKind::Programming
                    } else if OPERATIONAL_CODES.contains(&diag.code) {
                        ErrorKind::Operational
                    } else if INTEGRITY_CODES.contains(&diag.code) {
                        ErrorKind::Integrity
                    } else {
                        ErrorKind::Database
                    };
                    Error::formatted(kind, diag.code, Facility::Dbms, &diag.message)
                }
                None => Error::formatted(
                    ErrorKind::NotSupported,
                    0,
                    Facility::Dbms,
                    "Unknown DBMS Error",
                ),
            };
        }
        let message = if err.code > CCI_ER_END {
            cci.error_message(err.code)
                .unwrap_or_else(|| "Unknown Error".to_string())
        } else {
            CLIENT_ERROR_MESSAGES
                .get(&err.code)
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Unknown Error".to_string())
        };
        let kind = if err.code == ER_INVALID_CURSOR {
            ErrorKind::InvalidCursor
        } else {
            ErrorKind::Interface
        };
        Error::formatted(kind, err.code, Facility::of_code(err.code), &message)
    }

    /// An error for a client-side code, resolved against the static table.
    pub(crate) fn client(code: i32) -> Error {
        let message = CLIENT_ERROR_MESSAGES
            .get(&code)
            .copied()
            .unwrap_or("Unknown Error");
        let kind = if code == ER_INVALID_CURSOR {
            ErrorKind::InvalidCursor
        } else {
            ErrorKind::Interface
        };
        Error::formatted(kind, code, Facility::of_code(code), message)
    }

    fn formatted(kind: ErrorKind, code: i32, facility: Facility, message: &str) -> Error {
        Error::new(
            kind,
            code,
            facility,
            format!("ERROR: {}, {}, {}", facility, code, message),
        )
    }

    pub(crate) fn invalid_cursor() -> Error {
        Error::client(ER_INVALID_CURSOR)
    }

    pub(crate) fn parse_error<T>(source: T) -> Error
    where
        T: Into<Box<dyn error::Error + Send + Sync>>,
    {
        let source = source.into();
        let mut err = Error::new(
            ErrorKind::Parse,
            0,
            Facility::Unknown,
            format!("{}", source),
        );
        err.source = Some(source);
        err
    }

    pub(crate) fn parse_message<M>(message: M) -> Error
    where
        M: Into<Cow<'static, str>>,
    {
        Error::new(ErrorKind::Parse, 0, Facility::Unknown, message)
    }

    pub(crate) fn out_of_range<T>(message: T) -> Error
    where
        T: Into<Cow<'static, str>>,
    {
        Error::new(ErrorKind::OutOfRange, 0, Facility::Unknown, message)
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The numeric error code: the diagnostic code for DBMS failures, the
    /// transport or client code otherwise, 0 for local conversion errors.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The subsystem the code belongs to.
    pub fn facility(&self) -> Facility {
        self.facility
    }

    /// The formatted diagnostic text, `ERROR: {facility}, {code}, {message}`
    /// for translated errors.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}

impl From<num::ParseIntError> for Error {
    fn from(err: num::ParseIntError) -> Self {
        Error::parse_error(err)
    }
}

impl From<num::ParseFloatError> for Error {
    fn from(err: num::ParseFloatError) -> Self {
        Error::parse_error(err)
    }
}

impl From<str::Utf8Error> for Error {
    fn from(err: str::Utf8Error) -> Self {
        Error::parse_error(err)
    }
}

// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

use crate::cci::{Cci, SetElement, SetHandle};
use crate::connection::Connection;
use crate::error;
use crate::sql_type::CubridType;
use crate::{Error, Result};
use std::sync::Arc;

/// A server-side SET/MULTISET/SEQUENCE value under construction for
/// binding.
///
/// Elements are supplied as their textual representations; the literal
/// text `"NULL"` marks a null element rather than the four-character
/// string. The built value stays valid until [`close`](CubridSet::close)
/// or drop, and can be bound into any number of statements meanwhile.
pub struct CubridSet<'conn> {
    conn: &'conn Connection,
    handle: Option<SetHandle>,
    elem_type: CubridType,
}

impl<'conn> CubridSet<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> CubridSet<'conn> {
        CubridSet {
            conn,
            handle: None,
            elem_type: CubridType::String,
        }
    }

    fn cci(&self) -> Arc<dyn Cci> {
        self.conn.transport()
    }

    /// Builds the server-side collection from `elements` with the declared
    /// element type, replacing any previously built value.
    ///
    /// For BIT/VARBIT element types each element must be a string of `'0'`
    /// and `'1'` characters; a malformed bit string aborts the whole build
    /// with an invalid-parameter error. Empty element text is rejected.
    pub fn import_values(&mut self, elements: &[&str], elem_type: CubridType) -> Result<()> {
        let mut built = Vec::with_capacity(elements.len());
        for text in elements {
            if text.is_empty() {
                return Err(Error::client(error::ER_INVALID_PARAM));
            }
            if *text == "NULL" {
                built.push(SetElement::Null);
                continue;
            }
            match elem_type {
                CubridType::Bit | CubridType::VarBit => {
                    let packed = pack_bit_string(text)
                        .ok_or_else(|| Error::client(error::ER_INVALID_PARAM))?;
                    built.push(SetElement::Bit(packed));
                }
                _ => built.push(SetElement::Text(text.to_string())),
            }
        }
        // Non-bit elements always travel as text; the server coerces them
        // to the column's element domain.
        let wire_elem_type = match elem_type {
            CubridType::Bit | CubridType::VarBit => elem_type,
            _ => CubridType::String,
        };
        let cci = self.cci();
        let handle = cci
            .set_make(self.conn.handle()?, wire_elem_type, &built)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        if let Some(old) = self.handle.replace(handle) {
            let _ = cci.set_free(old);
        }
        self.elem_type = elem_type;
        Ok(())
    }

    pub fn element_type(&self) -> CubridType {
        self.elem_type
    }

    pub(crate) fn handle(&self) -> Result<SetHandle> {
        self.handle
            .ok_or_else(|| Error::client(error::ER_INVALID_PARAM))
    }

    /// Releases the server-side value. Idempotent and silent, like the
    /// implicit release on drop.
    pub fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            let _ = self.cci().set_free(handle);
        }
        Ok(())
    }
}

impl Drop for CubridSet<'_> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Packs a '0'/'1' string into a byte buffer, MSB-last: the final
/// character of the string lands in bit 0 of the final byte. Returns
/// `None` for any character outside '0'/'1'.
fn pack_bit_string(text: &str) -> Option<Vec<u8>> {
    let len = text.len();
    let t = usize::from(len % 8 == 0);
    let mut buf = vec![0u8; len / 8 + 1];
    for (i, ch) in text.bytes().rev().enumerate() {
        match ch {
            b'1' => {
                let idx = len / 8 - i / 8 - t;
                buf[idx] |= 1 << (i % 8);
            }
            b'0' => {}
            _ => return None,
        }
    }
    Some(buf)
}

// Rust-cubrid - Rust binding for CUBRID database
//
// URL: https://github.com/cubrid/rust-cubrid
//
//-----------------------------------------------------------------------------
// Copyright (c) 2024-2026 CUBRID Corporation. All rights reserved.
// This program is free software: you can modify it and/or redistribute it
// under the terms of the BSD 3-Clause license.
//-----------------------------------------------------------------------------

use crate::cci::{Cci, LobHandle, LobKind};
use crate::connection::Connection;
use crate::error;
use crate::{Error, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

// Transfer chunk size for file import/export. Both directions chunk
// identically and detect end-of-data by byte count.
const LOB_BUF_SIZE: usize = 4096;

/// Position origin for [`Lob::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// From the start of the object; the offset is the new position.
    Set,
    /// From the current position.
    Cur,
    /// Back from the end of the object.
    End,
}

/// A BLOB or CLOB value: a server-side locator plus a client-side byte
/// position.
///
/// A `Lob` is independent of any cursor. It is created empty through
/// [`Connection::lob`], filled by [`write`](Lob::write) or
/// [`import_from`](Lob::import_from) and then bound into an INSERT, or
/// obtained from a result column via `Cursor::fetch_lob` and drained by
/// [`read`](Lob::read) or [`export_to`](Lob::export_to). The kind tag is
/// fixed once the server object exists; re-creation replaces it.
///
/// The locator must be released with [`close`](Lob::close); dropping the
/// value releases it silently.
pub struct Lob<'conn> {
    conn: &'conn Connection,
    handle: Option<LobHandle>,
    kind: LobKind,
    pos: i64,
}

impl<'conn> Lob<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Lob<'conn> {
        Lob {
            conn,
            handle: None,
            kind: LobKind::Blob,
            pos: 0,
        }
    }

    pub(crate) fn from_locator(conn: &'conn Connection, handle: LobHandle, kind: LobKind) -> Lob<'conn> {
        Lob {
            conn,
            handle: Some(handle),
            kind,
            pos: 0,
        }
    }

    fn cci(&self) -> Arc<dyn Cci> {
        self.conn.transport()
    }

    /// Creates a fresh server-side object of `kind`, releasing any
    /// previous one.
    fn create(&mut self, kind: LobKind) -> Result<()> {
        let cci = self.cci();
        if let Some(old) = self.handle.take() {
            let _ = cci.lob_free(old);
        }
        let handle = cci
            .lob_new(self.conn.handle()?, kind)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        self.handle = Some(handle);
        self.kind = kind;
        self.pos = 0;
        Ok(())
    }

    pub(crate) fn locator(&self) -> Result<(LobHandle, LobKind)> {
        match self.handle {
            Some(handle) => Ok((handle, self.kind)),
            None => Err(Error::client(error::ER_LOB_NOT_EXIST)),
        }
    }

    pub fn kind(&self) -> LobKind {
        self.kind
    }

    /// The client-side position the next read or write starts at.
    pub fn position(&self) -> i64 {
        self.pos
    }

    fn wire_pos(&self) -> Result<u64> {
        // A negative position from an unchecked seek surfaces here, on
        // the I/O attempt rather than at seek time.
        u64::try_from(self.pos).map_err(|_| Error::client(error::ER_INVALID_PARAM))
    }

    /// Writes `data` at the current position and advances it.
    ///
    /// When no server object exists yet, a BLOB is created first; use
    /// [`write_as`](Lob::write_as) to control the kind.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.handle.is_none() {
            self.create(LobKind::Blob)?;
        }
        self.write_chunk(data)
    }

    /// Writes `data`, creating a server object of `kind` when none exists
    /// yet. The kind of an existing object is not changed.
    pub fn write_as(&mut self, data: &[u8], kind: LobKind) -> Result<()> {
        if self.handle.is_none() {
            self.create(kind)?;
        }
        self.write_chunk(data)
    }

    fn write_chunk(&mut self, data: &[u8]) -> Result<()> {
        let (handle, kind) = self.locator()?;
        let pos = self.wire_pos()?;
        let cci = self.cci();
        let written = cci
            .lob_write(self.conn.handle()?, handle, kind, pos, data)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        self.pos += written as i64;
        Ok(())
    }

    /// Reads `len` bytes from the current position, or everything up to
    /// the end of the object when `len` is 0, and advances the position.
    pub fn read(&mut self, len: u64) -> Result<Vec<u8>> {
        let (handle, kind) = self.locator()?;
        let len = if len == 0 {
            let size = self.size()?;
            size.saturating_sub(self.pos.max(0) as u64)
        } else {
            len
        };
        let pos = self.wire_pos()?;
        let cci = self.cci();
        let data = cci
            .lob_read(self.conn.handle()?, handle, kind, pos, len as usize)
            .map_err(|e| Error::from_cci(&e, &*cci))?;
        self.pos += data.len() as i64;
        Ok(data)
    }

    /// Total size of the server-side object in bytes.
    pub fn size(&self) -> Result<u64> {
        let (handle, kind) = self.locator()?;
        let cci = self.cci();
        cci.lob_size(handle, kind)
            .map_err(|e| Error::from_cci(&e, &*cci))
    }

    /// Repositions the client-side cursor and returns the new position.
    ///
    /// This is pure position arithmetic: no I/O happens and the result is
    /// not validated against the object size. An out-of-range position
    /// fails on the next read or write instead.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<i64> {
        match whence {
            Whence::Cur => self.pos += offset,
            Whence::Set => self.pos = offset,
            Whence::End => {
                let size = self.size()? as i64;
                self.pos = size - offset;
            }
        }
        Ok(self.pos)
    }

    /// Streams a local file into a fresh server-side object of `kind`
    /// (BLOB when `None`).
    ///
    /// The transfer runs in fixed-size chunks and aborts on the first
    /// failure; a partially written object is released.
    pub fn import_from<P: AsRef<Path>>(&mut self, path: P, kind: Option<LobKind>) -> Result<()> {
        self.create(kind.unwrap_or(LobKind::Blob))?;
        let mut file =
            File::open(path.as_ref()).map_err(|_| Error::client(error::ER_OPEN_FILE))?;
        let (handle, kind) = self.locator()?;
        let cci = self.cci();
        let conn = self.conn.handle()?;
        let mut buf = [0u8; LOB_BUF_SIZE];
        let mut pos: u64 = 0;
        loop {
            let n = match file.read(&mut buf) {
                Ok(n) => n,
                Err(_) => {
                    let _ = self.close();
                    return Err(Error::client(error::ER_READ_FILE));
                }
            };
            if n == 0 {
                break;
            }
            if let Err(e) = cci.lob_write(conn, handle, kind, pos, &buf[..n]) {
                let err = Error::from_cci(&e, &*cci);
                let _ = self.close();
                return Err(err);
            }
            pos += n as u64;
        }
        debug!(bytes = pos, "lob import complete");
        Ok(())
    }

    /// Streams the server-side object into a local file.
    ///
    /// The transfer runs in fixed-size chunks and aborts on the first
    /// failure; a partially written output file is removed.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let (handle, kind) = self.locator()?;
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|_| Error::client(error::ER_OPEN_FILE))?;
        let cci = self.cci();
        let conn = self.conn.handle()?;
        let size = self
            .size()?;
        let mut pos: u64 = 0;
        while pos < size {
            let chunk = match cci.lob_read(conn, handle, kind, pos, LOB_BUF_SIZE) {
                Ok(chunk) => chunk,
                Err(e) => {
                    let err = Error::from_cci(&e, &*cci);
                    drop(file);
                    let _ = std::fs::remove_file(path);
                    return Err(err);
                }
            };
            if chunk.is_empty() {
                break;
            }
            if file.write_all(&chunk).is_err() {
                drop(file);
                let _ = std::fs::remove_file(path);
                return Err(Error::client(error::ER_WRITE_FILE));
            }
            pos += chunk.len() as u64;
        }
        debug!(bytes = pos, "lob export complete");
        Ok(())
    }

    /// Releases the server-side locator. Idempotent and silent, like the
    /// implicit release on drop.
    pub fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            let _ = self.cci().lob_free(handle);
        }
        Ok(())
    }
}

impl Drop for Lob<'_> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

// Storage resolution and the opaque storage object behind each table entry.

use crate::interface;
use crate::interface::errnos::{errno_from_io, syscall_error, Errno};

use super::syscalls::fs_constants::*;

/// The storage object an open file entry refers to.
///
/// The table and syscall layer never look inside: they read and write byte
/// ranges, query the size, and ask whether the object can be repositioned.
/// Each variant carries its own host-level state and failure modes.
#[derive(Debug)]
pub enum Storage {
    File(interface::EmulatedFile),
    Console(interface::ConsoleDevice),
}

impl Storage {
    /// Read up to `buf.len()` bytes at `offset`. Zero means end-of-file.
    pub fn readat(&self, buf: &mut [u8], offset: usize) -> std::io::Result<usize> {
        match self {
            Storage::File(f) => f.readat(buf, offset),
            // the console is a write-only sink; reads are permanently at EOF
            Storage::Console(_) => Ok(0),
        }
    }

    /// Write `buf` at `offset`, returning the bytes actually written.
    pub fn writeat(&self, buf: &[u8], offset: usize) -> std::io::Result<usize> {
        match self {
            Storage::File(f) => f.writeat(buf, offset),
            Storage::Console(console) => console.write(buf),
        }
    }

    /// The stat query: current size in bytes. Used for end-relative seeks.
    pub fn size(&self) -> std::io::Result<usize> {
        match self {
            Storage::File(f) => f.size(),
            Storage::Console(_) => Ok(0),
        }
    }

    /// Whether the object supports repositioning at all.
    pub fn is_seekable(&self) -> bool {
        match self {
            Storage::File(_) => true,
            Storage::Console(_) => false,
        }
    }
}

/// Resolve a path and open flags to a storage object.
///
/// This is the storage half of open_syscall: flag validation, existence and
/// O_CREAT / O_EXCL checks, and O_TRUNC handling. Errors come back already
/// negated so open_syscall can return them directly.
pub fn resolve(path: &str, flags: i32, mode: u32) -> Result<Storage, i32> {
    if path.is_empty() {
        return Err(syscall_error(Errno::ENOENT, "open", "given path was null"));
    }

    if flags & !O_ALLFLAGS != 0 {
        return Err(syscall_error(Errno::EINVAL, "open", "invalid value in flags"));
    }
    // O_RDONLY | O_WRONLY is not a real access mode
    if flags & O_RDWRFLAGS == O_RDWRFLAGS {
        return Err(syscall_error(Errno::EINVAL, "open", "invalid access mode in flags"));
    }
    if mode & S_IRWXA != mode {
        return Err(syscall_error(Errno::EPERM, "open", "mode bits were not sane"));
    }

    let exists = interface::pathexists(path);
    if !exists && flags & O_CREAT == 0 {
        return Err(syscall_error(
            Errno::ENOENT,
            "open",
            "tried to open a file that did not exist, and O_CREAT was not specified",
        ));
    }
    if exists && flags & (O_CREAT | O_EXCL) == (O_CREAT | O_EXCL) {
        return Err(syscall_error(
            Errno::EEXIST,
            "open",
            "file already exists and O_CREAT and O_EXCL were used",
        ));
    }

    let file = interface::openfile(path.to_string(), flags & O_CREAT != 0)
        .map_err(|e| syscall_error(errno_from_io(&e), "open", "could not open backing file"))?;

    if exists && flags & O_TRUNC != 0 {
        file.truncate()
            .map_err(|e| syscall_error(errno_from_io(&e), "open", "could not truncate file"))?;
    }

    Ok(Storage::File(file))
}

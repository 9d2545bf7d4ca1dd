//! This module contains all filesystem-related system calls.
//!
//! ## File System Calls
//!
//! Procs have methods for filesystem-related calls. They return a
//! non-negative result or a negated code from the `errno` enum. Offsets
//! and transfer counts travel through that `i32`, so files are supported
//! up to `i32::MAX` bytes.
//!
//! - [open_syscall](crate::filetable::process::Proc::open_syscall)
//! - [close_syscall](crate::filetable::process::Proc::close_syscall)
//! - [read_syscall](crate::filetable::process::Proc::read_syscall)
//! - [write_syscall](crate::filetable::process::Proc::write_syscall)
//! - [lseek_syscall](crate::filetable::process::Proc::lseek_syscall)
//! - [dup_syscall](crate::filetable::process::Proc::dup_syscall)
//! - [dup2_syscall](crate::filetable::process::Proc::dup2_syscall)

use super::fs_constants::*;
use crate::filetable::oft::{Whence, OPEN_MAX};
use crate::filetable::process::Proc;
use crate::filetable::storage;
use crate::interface::errnos::{errno_from_io, syscall_error, Errno};

impl Proc {
    //------------------------------------OPEN SYSCALL------------------------------------

    /// Open `path` and return the lowest free file descriptor bound to a
    /// fresh open file table entry at offset 0.
    ///
    /// Resolution errors (missing file without O_CREAT, bad flags, host
    /// failures) come back from the storage layer verbatim. A full open file
    /// table is ENFILE; a full descriptor table is EMFILE, and in that case
    /// the entry inserted just before must be released again so the failed
    /// call leaks no share.
    pub fn open_syscall(&self, path: &str, flags: i32, mode: u32) -> i32 {
        let storage_obj = match storage::resolve(path, flags, mode) {
            Ok(storage_obj) => storage_obj,
            Err(errcode) => return errcode,
        };

        // all files open with an offset of 0
        let slot_index = match self.oft.insert(0, storage_obj) {
            Ok(slot_index) => slot_index,
            Err(e) => {
                return syscall_error(e, "open", "no available slot in the open file table");
            }
        };

        match self.fd_alloc(slot_index, STARTINGFD) {
            Ok(fd) => fd,
            Err(e) => {
                // unwind the insert so the failed open leaves no entry behind
                self.oft.release(slot_index);
                syscall_error(
                    e,
                    "open",
                    "no available file descriptor number could be found",
                )
            }
        }
    }

    //------------------------------------CLOSE SYSCALL------------------------------------

    /// Release one descriptor. The storage object only actually closes when
    /// the last descriptor bound to its entry is gone.
    pub fn close_syscall(&self, fd: i32) -> i32 {
        // unbinding and the lookup are one atomic step, so a racing close of
        // the same fd gets EBADF instead of releasing the share twice
        let slot_index = match self.fd_take(fd) {
            Ok(slot_index) => slot_index,
            Err(e) => return syscall_error(e, "close", "invalid file descriptor"),
        };
        self.oft.release(slot_index);
        0
    }

    //------------------------------------READ SYSCALL------------------------------------

    /// Read up to `buf.len()` bytes at the entry's current offset, then
    /// advance the offset by the bytes actually transferred.
    ///
    /// A return of 0 signals end-of-file, not an error. The offset update
    /// serializes through the table lock, so descriptors aliasing one entry
    /// interleave rather than losing updates; the I/O itself runs with no
    /// table lock held.
    pub fn read_syscall(&self, fd: i32, buf: &mut [u8]) -> i32 {
        let slot_index = match self.fd_get(fd) {
            Ok(slot_index) => slot_index,
            Err(e) => return syscall_error(e, "read", "invalid file descriptor"),
        };

        // offset and storage leave the critical section together
        let (offset, storage_obj) = match self.oft.snapshot(slot_index) {
            Some(pair) => pair,
            None => return syscall_error(Errno::EBADF, "read", "invalid file descriptor"),
        };

        let bytes_read = match storage_obj.readat(buf, offset) {
            Ok(n) => n,
            Err(e) => {
                return syscall_error(errno_from_io(&e), "read", "could not read from storage");
            }
        };

        if bytes_read != 0 {
            // advance by what actually transferred; the entry may have been
            // closed from under us by another thread, in which case there is
            // no offset left to move
            let _ = self.oft.reposition(slot_index, Whence::Cur, bytes_read as isize);
        }
        bytes_read as i32
    }

    //------------------------------------WRITE SYSCALL------------------------------------

    /// Write `buf` at the entry's current offset and advance the offset by
    /// the bytes actually written. Symmetric to read.
    pub fn write_syscall(&self, fd: i32, buf: &[u8]) -> i32 {
        let slot_index = match self.fd_get(fd) {
            Ok(slot_index) => slot_index,
            Err(e) => return syscall_error(e, "write", "invalid file descriptor"),
        };

        let (offset, storage_obj) = match self.oft.snapshot(slot_index) {
            Some(pair) => pair,
            None => return syscall_error(Errno::EBADF, "write", "invalid file descriptor"),
        };

        let bytes_written = match storage_obj.writeat(buf, offset) {
            Ok(n) => n,
            Err(e) => {
                return syscall_error(errno_from_io(&e), "write", "could not write to storage");
            }
        };

        if bytes_written != 0 {
            let _ = self
                .oft
                .reposition(slot_index, Whence::Cur, bytes_written as isize);
        }
        bytes_written as i32
    }

    //------------------------------------LSEEK SYSCALL------------------------------------

    /// Move the entry's offset and return the new absolute position.
    ///
    /// ESPIPE if the storage cannot be repositioned (the consoles), EINVAL
    /// for an unknown whence or a computed position before the start of the
    /// file; a failed seek leaves the offset where it was.
    pub fn lseek_syscall(&self, fd: i32, offset: isize, whence: i32) -> i32 {
        let slot_index = match self.fd_get(fd) {
            Ok(slot_index) => slot_index,
            Err(e) => return syscall_error(e, "lseek", "invalid file descriptor"),
        };

        let storage_obj = match self.oft.storage_of(slot_index) {
            Some(storage_obj) => storage_obj,
            None => return syscall_error(Errno::EBADF, "lseek", "invalid file descriptor"),
        };
        if !storage_obj.is_seekable() {
            return syscall_error(
                Errno::ESPIPE,
                "lseek",
                "file descriptor is associated with a stream, cannot seek",
            );
        }

        let whence = match Whence::from_raw(whence) {
            Some(whence) => whence,
            None => return syscall_error(Errno::EINVAL, "lseek", "unknown whence"),
        };

        match self.oft.reposition(slot_index, whence, offset) {
            Ok(newoffset) => newoffset as i32,
            Err(Errno::EINVAL) => {
                syscall_error(Errno::EINVAL, "lseek", "seek to before position 0 in file")
            }
            Err(e) => syscall_error(e, "lseek", "could not reposition file"),
        }
    }

    //------------------------------------DUP SYSCALL------------------------------------

    /// Bind the lowest free descriptor at or above `start_desc` (default 0)
    /// to the same entry as `fd`; the new descriptor takes its own share.
    pub fn dup_syscall(&self, fd: i32, start_desc: Option<i32>) -> i32 {
        //if a starting fd was passed, then use that as the starting point, but
        //otherwise, use the designated minimum of STARTINGFD
        let start_fd = match start_desc {
            Some(start_desc) => start_desc,
            None => STARTINGFD,
        };

        if start_fd == fd {
            return start_fd;
        } //if the file descriptors are equal, return the new one

        let slot_index = match self.fd_get(fd) {
            Ok(slot_index) => slot_index,
            Err(e) => return syscall_error(e, "dup", "invalid old file descriptor"),
        };

        // take the share before binding so the entry can never be destroyed
        // between the two steps
        self.oft.acquire(slot_index);
        match self.fd_alloc(slot_index, start_fd) {
            Ok(newfd) => newfd,
            Err(e) => {
                self.oft.release(slot_index);
                syscall_error(
                    e,
                    "dup",
                    "no available file descriptor number could be found",
                )
            }
        }
    }

    //------------------------------------DUP2 SYSCALL------------------------------------

    /// Clone descriptor `oldfd` onto descriptor `newfd`.
    ///
    /// If `newfd` is currently bound, the entry it held is released first
    /// with full close semantics, destroying it if this was its last
    /// reference. Afterwards both descriptors name the same entry and share
    /// its offset. `dup2(fd, fd)` returns `fd` and mutates nothing, and a
    /// validation failure leaves both descriptors untouched.
    pub fn dup2_syscall(&self, oldfd: i32, newfd: i32) -> i32 {
        //checking if the new fd is out of range
        if newfd < 0 || newfd >= OPEN_MAX as i32 {
            return syscall_error(
                Errno::EBADF,
                "dup2",
                "provided file descriptor is out of range",
            );
        }

        if newfd == oldfd {
            return newfd;
        } //if the file descriptors are equal, return the new one

        let slot_index = match self.fd_get(oldfd) {
            Ok(slot_index) => slot_index,
            Err(e) => return syscall_error(e, "dup2", "invalid old file descriptor"),
        };

        // the new name takes its share before the rebind
        self.oft.acquire(slot_index);

        // rebind newfd; whatever it referred to before is closed in passing,
        // mirroring linux in ignoring any error from that implicit close
        if let Some(prev_slot) = self.fd_replace(newfd, slot_index) {
            self.oft.release(prev_slot);
        }
        newfd
    }
}

// File related interface
//
// Storage primitives consumed by the open file table: a byte-addressable
// backing file and the write-only console device. The table treats both as
// opaque objects that can read, write, and report their size, and that may
// fail with io errors which the syscall layer maps onto errnos.

use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use crate::interface;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::LazyLock;

// Count of open EmulatedFile handles per backing file. Guards removefile
// against deleting a file out from under an open handle; one path can be
// open many times, and the file only becomes deletable when every handle
// is gone.
static OPEN_FILES: LazyLock<Arc<DashMap<String, usize>>> =
    LazyLock::new(|| Arc::new(DashMap::new()));

const MAX_FILENAME_LENGTH: usize = 120;

fn is_allowed_char(c: char) -> bool {
    char::is_alphanumeric(c) || c == '.'
}

// Checker for illegal filenames. Backing files live flat in the working
// directory, so separators, dotfiles, and path tricks are all rejected.
fn check_allowed_filename(filename: &str) -> std::io::Result<()> {
    let bad = |msg: &str| {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{}: {}", msg, filename),
        ))
    };

    if filename.len() > MAX_FILENAME_LENGTH {
        return bad("filename exceeds maximum length");
    }
    if !filename.chars().all(is_allowed_char) {
        return bad("filename has disallowed characters");
    }
    match filename {
        "" | "." | ".." => return bad("illegal filename"),
        _ => {}
    }
    if filename.starts_with('.') {
        return bad("filename cannot start with a period");
    }
    Ok(())
}

pub fn pathexists(filename: &str) -> bool {
    if check_allowed_filename(filename).is_err() {
        return false;
    }
    let path: std::path::PathBuf = [".", filename].iter().collect();
    path.exists()
}

pub fn removefile(filename: String) -> std::io::Result<()> {
    check_allowed_filename(&filename)?;

    if OPEN_FILES.contains_key(&filename) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("file in use: {}", filename),
        ));
    }

    let path: std::path::PathBuf = [".".to_string(), filename].iter().collect();
    let absolute_filename = fs::canonicalize(&path)?; //will return an error if the file does not exist

    fs::remove_file(absolute_filename)?;
    Ok(())
}

pub fn openfile(filename: String, create: bool) -> std::io::Result<EmulatedFile> {
    EmulatedFile::new(filename, create)
}

/// An open backing file.
///
/// Offsets are managed by the open file table, not here: every read and write
/// is positional, seeking the host file under the object's own lock. The
/// handle is shared through an `Arc` by the table and closes (and releases its
/// name for deletion) when the last reference drops.
#[derive(Debug)]
pub struct EmulatedFile {
    filename: String,
    fobj: Arc<Mutex<File>>,
}

impl EmulatedFile {
    fn new(filename: String, create: bool) -> std::io::Result<EmulatedFile> {
        check_allowed_filename(&filename)?;

        let path: std::path::PathBuf = [".", filename.as_str()].iter().collect();

        let f = if !path.exists() {
            if !create {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("cannot open non-existent file {}", filename),
                ));
            }
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(filename.clone())
        } else {
            OpenOptions::new().read(true).write(true).open(filename.clone())
        }?;

        *OPEN_FILES.entry(filename.clone()).or_insert(0) += 1;

        Ok(EmulatedFile {
            filename: filename,
            fobj: Arc::new(Mutex::new(f)),
        })
    }

    /// Size of the backing file in bytes (the stat query).
    pub fn size(&self) -> std::io::Result<usize> {
        let fobj = self.fobj.lock();
        Ok(fobj.metadata()?.len() as usize)
    }

    /// Truncate the backing file to length 0.
    pub fn truncate(&self) -> std::io::Result<()> {
        let fobj = self.fobj.lock();
        fobj.set_len(0)?;
        Ok(())
    }

    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes actually read; short counts and 0 mean the
    /// read ran into end-of-file.
    pub fn readat(&self, buf: &mut [u8], offset: usize) -> std::io::Result<usize> {
        let mut fobj = self.fobj.lock();
        fobj.seek(SeekFrom::Start(offset as u64))?;

        let mut bytes_read = 0;
        while bytes_read < buf.len() {
            match fobj.read(&mut buf[bytes_read..]) {
                Ok(0) => break, // end of file
                Ok(n) => bytes_read += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(bytes_read)
    }

    /// Write `buf` starting at `offset`, extending the file if needed.
    ///
    /// Returns the number of bytes actually written.
    pub fn writeat(&self, buf: &[u8], offset: usize) -> std::io::Result<usize> {
        let mut fobj = self.fobj.lock();
        fobj.seek(SeekFrom::Start(offset as u64))?;

        let mut bytes_written = 0;
        while bytes_written < buf.len() {
            match fobj.write(&buf[bytes_written..]) {
                Ok(0) => break,
                Ok(n) => bytes_written += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(bytes_written)
    }
}

impl Drop for EmulatedFile {
    fn drop(&mut self) {
        // drop this handle's count; the filename stays protected until the
        // last handle on the path goes away
        if let Entry::Occupied(mut entry) = OPEN_FILES.entry(self.filename.clone()) {
            *entry.get_mut() -= 1;
            if *entry.get() == 0 {
                entry.remove();
            }
        }
    }
}

/// The console device behind the pre-bound stdout/stderr descriptors.
///
/// Writes pass through to the matching host stream. The device is not
/// seekable, reports size 0, and reads as permanently at end-of-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleDevice {
    Stdout,
    Stderr,
}

impl ConsoleDevice {
    pub fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        match self {
            ConsoleDevice::Stdout => interface::log_to_stdout(&s),
            ConsoleDevice::Stderr => interface::log_to_stderr(&s),
        }
        Ok(buf.len())
    }
}

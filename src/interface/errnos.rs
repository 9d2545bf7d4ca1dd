// Errno values and the error convention for the syscall layer.
//
// Every syscall returns a non-negative result on success or a negated errno
// on failure, produced through syscall_error so failures can be traced when
// verbose logging is enabled at init.

use crate::interface;

// Nonzero means syscall_error prints the errno, syscall name, and cause to
// stderr before returning. Set once at filetable_init.
pub static VERBOSE: interface::RustAtomicUsize = interface::RustAtomicUsize::new(0);

/// Errno values, numbered as in errno.h.
#[repr(i32)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Errno {
    /// Operation not permitted
    EPERM = 1,
    /// No such file or directory
    ENOENT = 2,
    /// Interrupted system call
    EINTR = 4,
    /// Input/output error
    EIO = 5,
    /// Device not configured
    ENXIO = 6,
    /// Bad file descriptor
    EBADF = 9,
    /// Resource temporarily unavailable
    EAGAIN = 11,
    /// Cannot allocate memory
    ENOMEM = 12,
    /// Permission denied
    EACCES = 13,
    /// Bad address
    EFAULT = 14,
    /// Device busy
    EBUSY = 16,
    /// File exists
    EEXIST = 17,
    /// Is a directory
    EISDIR = 21,
    /// Invalid argument
    EINVAL = 22,
    /// Too many open files in system
    ENFILE = 23,
    /// Too many open files in process
    EMFILE = 24,
    /// File too large
    EFBIG = 27,
    /// No space left on device
    ENOSPC = 28,
    /// Illegal seek
    ESPIPE = 29,
    /// Read-only file system
    EROFS = 30,
    /// Broken pipe
    EPIPE = 32,
    /// Result too large
    ERANGE = 34,
    /// Filename too long
    ENAMETOOLONG = 36,
}

/// Build the return value for a failing syscall: the negation of the errno.
///
/// `syscall` and `message` name the failing call and the cause; they are only
/// rendered when [`VERBOSE`] was set at init.
pub fn syscall_error(e: Errno, syscall: &str, message: &str) -> i32 {
    if VERBOSE.load(interface::RustAtomicOrdering::Relaxed) > 0 {
        let msg = format!("Error in syscall: {} - {:?}: {}\n", syscall, e, message);
        interface::log_to_stderr(&msg);
    }
    return -(e as i32);
}

// Map a host io error to the nearest errno so storage failures propagate to
// user code verbatim rather than as a panic.
pub fn errno_from_io(err: &std::io::Error) -> Errno {
    match err.kind() {
        std::io::ErrorKind::NotFound => Errno::ENOENT,
        std::io::ErrorKind::PermissionDenied => Errno::EACCES,
        std::io::ErrorKind::AlreadyExists => Errno::EEXIST,
        std::io::ErrorKind::InvalidInput => Errno::EINVAL,
        std::io::ErrorKind::Interrupted => Errno::EINTR,
        _ => Errno::EIO,
    }
}

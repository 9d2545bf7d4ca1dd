//! Wrapper for the system calls of the file-descriptor layer, with methods
//! for each call divided into filesystem and system categories. Calls are
//! methods on [`Proc`](crate::filetable::process::Proc) and return a
//! non-negative result or a negated code from the `Errno` enum.

pub mod fs_calls;
pub mod fs_constants;
pub mod sys_calls;

pub use fs_calls::*;
pub use fs_constants::*;
pub use sys_calls::*;

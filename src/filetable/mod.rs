//! The file-descriptor layer: a shared open file table plus per-process
//! descriptor tables.
//!
//! ## top-level features:
//!
//! - ### Open File Table:
//!     - A single process-wide table of open file entries, fixed at OPEN_MAX
//!       slots. Each occupied slot carries the current byte offset, a shared
//!       reference to its storage object, and a reference count recording how
//!       many descriptors (across all processes) are bound to it. Every table
//!       mutation happens under one table-wide lock.
//!
//! - ### Proc Objects:
//!     - Each process object has a Proc ID, a Parent ID, a descriptor table
//!       mapping small integer fds to slots in the open file table, and a
//!       handle on the shared table. Descriptors 1 and 2 come up bound to the
//!       two permanently-open console entries.
//!
//! - ### System Calls:
//!     - Each proc object has public methods corresponding to each system
//!       call: open, close, read, write, lseek, dup, dup2 as filesystem
//!       related calls, and fork, exit, getpid as system related calls. They
//!       return a non-negative result or a negated code from the `Errno`
//!       enum.
//!
//! - ### Storage:
//!     - Path resolution turns a path and open flags into a storage object
//!       (a backing file or the console device). The tables treat storage as
//!       opaque: byte-range read, byte-range write, a size query, and a
//!       seekability query, any of which may fail.

pub mod oft;
pub mod process;
pub mod storage;
pub mod syscalls;

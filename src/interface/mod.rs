//! Module definitions for the filetable interface
//!
//! ## Interface Module
//!
//! Thin interface layer that contains every import from outside the crate's
//! own code: host file access, shared-state primitives, and errno handling.
//! The table and syscall code only reach the host through the names
//! re-exported here, which keeps the surface that touches the outside world
//! small and easy to audit.

pub mod errnos;
mod file;
mod misc;

pub use errnos::*;
pub use file::*;
pub use misc::*;

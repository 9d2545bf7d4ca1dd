// Misc types and helpers for the interface
// Shared refs, locks, maps, logging, threads.

pub use dashmap::{DashMap as RustHashMap, DashSet as RustHashSet};
pub use parking_lot::{Mutex, RwLock as RustLock};
pub use std::sync::Arc as RustRfc;
pub use std::sync::LazyLock as RustLazyGlobal;

pub use std::sync::atomic::{
    AtomicBool as RustAtomicBool, AtomicU64 as RustAtomicU64, AtomicUsize as RustAtomicUsize,
    Ordering as RustAtomicOrdering,
};

// Print text to stdout
pub fn log_to_stdout(s: &str) {
    print!("{}", s);
}

// Print text to stderr
pub fn log_to_stderr(s: &str) {
    eprint!("{}", s);
}

// Spawn a helper thread (used by tests exercising concurrent table access)
pub fn helper_thread<F, T>(f: F) -> std::thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    std::thread::spawn(f)
}

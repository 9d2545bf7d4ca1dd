// Per-process descriptor tables, the process registry, and boot wiring.

use crate::interface;
use crate::interface::errnos::Errno;

use super::oft::{OpenFileTable, GLOBAL_STDERR, GLOBAL_STDOUT, OPEN_MAX};
use super::storage::Storage;
use super::syscalls::fs_constants::*;

/// Registry of live processes, keyed by procid. Populated by
/// `filetable_init` and `fork_syscall`, drained by `exit_syscall`.
pub static PROC_TABLE: interface::RustLazyGlobal<
    interface::RustHashMap<u64, interface::RustRfc<Proc>>,
> = interface::RustLazyGlobal::new(interface::RustHashMap::new);

/// A process, as this layer sees one: an id, a descriptor table, and a
/// handle on the shared open file table.
///
/// The descriptor table maps fd numbers to open file table slots, FREE_SLOT
/// where unbound. Each bound descriptor holds exactly one unit of its slot's
/// reference count; the table itself never owns an entry outright. Only the
/// owning process mutates its descriptor table.
pub struct Proc {
    pub procid: u64,
    pub parent: u64,
    pub(crate) fdtable: interface::RustLock<[i32; OPEN_MAX]>,
    pub oft: interface::RustRfc<OpenFileTable>,
}

impl Proc {
    /// Fresh process: descriptors 1 and 2 come up bound to the console
    /// slots, and each pre-binding takes its reference on the slot.
    pub fn new(procid: u64, parent: u64, oft: interface::RustRfc<OpenFileTable>) -> Proc {
        let mut fdtable = [FREE_SLOT; OPEN_MAX];
        fdtable[STDOUT_FD as usize] = GLOBAL_STDOUT as i32;
        fdtable[STDERR_FD as usize] = GLOBAL_STDERR as i32;
        oft.acquire(GLOBAL_STDOUT);
        oft.acquire(GLOBAL_STDERR);

        Proc {
            procid: procid,
            parent: parent,
            fdtable: interface::RustLock::new(fdtable),
            oft: oft,
        }
    }

    // Child constructor for fork: the caller has already copied the
    // descriptor table and acquired one share per bound descriptor.
    pub(crate) fn inherit(
        procid: u64,
        parent: u64,
        fdtable: [i32; OPEN_MAX],
        oft: interface::RustRfc<OpenFileTable>,
    ) -> Proc {
        Proc {
            procid: procid,
            parent: parent,
            fdtable: interface::RustLock::new(fdtable),
            oft: oft,
        }
    }

    // ---- descriptor table contract ----

    /// Bind the lowest free descriptor at or above `start_fd` to `slot_index`.
    /// The standard requires the lowest available number.
    pub(crate) fn fd_alloc(&self, slot_index: usize, start_fd: i32) -> Result<i32, Errno> {
        let mut fdtable = self.fdtable.write();
        for fd in (start_fd.max(0) as usize)..OPEN_MAX {
            if fdtable[fd] == FREE_SLOT {
                fdtable[fd] = slot_index as i32;
                return Ok(fd as i32);
            }
        }
        Err(Errno::EMFILE)
    }

    /// Slot bound to `fd`, or EBADF if out of range or unbound.
    pub(crate) fn fd_get(&self, fd: i32) -> Result<usize, Errno> {
        if fd < 0 || fd >= OPEN_MAX as i32 {
            return Err(Errno::EBADF);
        }
        let slot = self.fdtable.read()[fd as usize];
        if slot == FREE_SLOT {
            return Err(Errno::EBADF);
        }
        Ok(slot as usize)
    }

    /// Unbind `fd` and return the slot it held. Lookup and clear share one
    /// critical section so two racing closes cannot both release the share.
    pub(crate) fn fd_take(&self, fd: i32) -> Result<usize, Errno> {
        if fd < 0 || fd >= OPEN_MAX as i32 {
            return Err(Errno::EBADF);
        }
        let mut fdtable = self.fdtable.write();
        let slot = fdtable[fd as usize];
        if slot == FREE_SLOT {
            return Err(Errno::EBADF);
        }
        fdtable[fd as usize] = FREE_SLOT;
        Ok(slot as usize)
    }

    /// Bind `fd` to `slot_index` unconditionally, returning the previous
    /// binding if there was one (the dup2 rebind step).
    pub(crate) fn fd_replace(&self, fd: i32, slot_index: usize) -> Option<usize> {
        let mut fdtable = self.fdtable.write();
        let prev = fdtable[fd as usize];
        fdtable[fd as usize] = slot_index as i32;
        if prev == FREE_SLOT {
            None
        } else {
            Some(prev as usize)
        }
    }
}

/// Fetch a shared reference to a registered process.
pub fn proc_getref(procid: u64) -> interface::RustRfc<Proc> {
    PROC_TABLE
        .get(&procid)
        .expect("proc_getref on an unregistered procid")
        .value()
        .clone()
}

/// Boot-time wiring: build the open file table with its two permanently-open
/// console entries and register the initial process (procid 1).
///
/// Failures here are the one fatal path in the crate; everything after boot
/// reports errors to the caller instead.
pub fn filetable_init(verbosity: usize) {
    interface::errnos::VERBOSE.store(verbosity, interface::RustAtomicOrdering::Relaxed);

    let oft = interface::RustRfc::new(OpenFileTable::new());

    // the consoles occupy slots 0 and 1 for the life of the table
    let stdout_slot = oft
        .insert(0, Storage::Console(interface::ConsoleDevice::Stdout))
        .expect("could not add stdout to the open file table");
    assert_eq!(stdout_slot, GLOBAL_STDOUT);

    let stderr_slot = oft
        .insert(0, Storage::Console(interface::ConsoleDevice::Stderr))
        .expect("could not add stderr to the open file table");
    assert_eq!(stderr_slot, GLOBAL_STDERR);

    let initproc = Proc::new(1, 0, oft);
    PROC_TABLE.insert(1, interface::RustRfc::new(initproc));
}

/// Tear the layer down: exit every process still registered. The last
/// process reference drops the open file table handle, which releases any
/// remaining entries.
pub fn filetable_finalize() {
    let procids: Vec<u64> = PROC_TABLE.iter().map(|entry| *entry.key()).collect();
    for procid in procids {
        if let Some(entry) = PROC_TABLE.get(&procid) {
            let proc = entry.value().clone();
            // the map guard must be gone before exit_syscall deregisters
            drop(entry);
            proc.exit_syscall();
        }
    }
}

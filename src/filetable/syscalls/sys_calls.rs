// Process lifecycle system calls: the descriptor-table side of fork and
// exit, plus the id queries.

use super::fs_constants::*;
use crate::filetable::process::{Proc, PROC_TABLE};
use crate::interface;

impl Proc {
    /// Create a child process whose descriptor table is a copy of this one.
    ///
    /// Every bound descriptor is inherited, and each inherited binding takes
    /// its own share on the entry, so parent and child observe the same
    /// offsets until one of them closes.
    pub fn fork_syscall(&self, child_procid: u64) -> i32 {
        let fdtable = self.fdtable.read();
        for &slot in fdtable.iter() {
            if slot != FREE_SLOT {
                self.oft.acquire(slot as usize);
            }
        }
        let child = Proc::inherit(child_procid, self.procid, *fdtable, self.oft.clone());
        drop(fdtable);

        PROC_TABLE.insert(child_procid, interface::RustRfc::new(child));
        0
    }

    /// Tear the process down: release every descriptor still bound (an exit
    /// with open descriptors must not strand their shares) and deregister.
    pub fn exit_syscall(&self) -> i32 {
        let mut fdtable = self.fdtable.write();
        for slot in fdtable.iter_mut() {
            if *slot != FREE_SLOT {
                self.oft.release(*slot as usize);
                *slot = FREE_SLOT;
            }
        }
        drop(fdtable);

        PROC_TABLE.remove(&self.procid);
        0
    }

    pub fn getpid_syscall(&self) -> i32 {
        self.procid as i32
    }

    pub fn getppid_syscall(&self) -> i32 {
        self.parent as i32
    }
}

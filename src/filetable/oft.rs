// The process-wide open file table.
//
// Two levels back every descriptor: each per-process table maps small integer
// fds to slot indices here, and each occupied slot carries the shared file
// offset, a reference to the storage object, and a count of how many
// descriptors are bound to it. Descriptors aliased by dup2 or fork point at
// the same slot and therefore observe the same offset; independent opens of
// the same path get separate slots and separate offsets.
//
// One mutex covers the whole table. Critical sections are O(1) metadata
// updates only; storage I/O always happens with the lock released, so a slow
// read or write on one descriptor cannot stall table operations on others.

use crate::interface;
use crate::interface::errnos::{errno_from_io, Errno};

use super::storage::Storage;
use super::syscalls::fs_constants::*;

/// Capacity of the open file table, and of every descriptor table.
pub const OPEN_MAX: usize = 128;

// slot locations of the boot-time console entries
pub const GLOBAL_STDOUT: usize = 0;
pub const GLOBAL_STDERR: usize = 1;

/// One open file: the shared offset, the storage behind it, and the number
/// of descriptor references currently bound to this slot.
#[derive(Debug)]
pub struct OpenFile {
    offset: usize,
    storage: interface::RustRfc<Storage>,
    refcount: u32,
}

/// Seek origin, as a closed set so every computation rule is matched
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

impl Whence {
    /// Decode the raw whence argument of lseek; `None` means EINVAL.
    pub fn from_raw(whence: i32) -> Option<Whence> {
        match whence {
            SEEK_SET => Some(Whence::Set),
            SEEK_CUR => Some(Whence::Cur),
            SEEK_END => Some(Whence::End),
            _ => None,
        }
    }
}

/// The open file table. Created once at boot by `filetable_init` and handed
/// to every process as a shared reference; never a hidden global.
#[derive(Debug)]
pub struct OpenFileTable {
    slots: interface::Mutex<Vec<Option<OpenFile>>>,
}

impl OpenFileTable {
    pub fn new() -> OpenFileTable {
        OpenFileTable {
            slots: interface::Mutex::new((0..OPEN_MAX).map(|_| None).collect()),
        }
    }

    /// Place a new entry in the first free slot, with a refcount of 1.
    ///
    /// The scan and the insert share one critical section so two concurrent
    /// opens can never claim the same slot. A full table is ENFILE.
    pub fn insert(&self, offset: usize, storage: Storage) -> Result<usize, Errno> {
        let mut slots = self.slots.lock();
        for (slot_index, slot) in slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(OpenFile {
                    offset: offset,
                    storage: interface::RustRfc::new(storage),
                    refcount: 1,
                });
                return Ok(slot_index);
            }
        }
        Err(Errno::ENFILE)
    }

    /// Record one more descriptor reference to an occupied slot (dup2, dup,
    /// fork inheritance, console pre-binding).
    ///
    /// The caller must already hold a reference to the slot, so finding it
    /// empty is a bookkeeping bug, not a user error.
    pub fn acquire(&self, slot_index: usize) {
        let mut slots = self.slots.lock();
        let entry = slots[slot_index]
            .as_mut()
            .expect("acquire on an empty open file table slot");
        entry.refcount += 1;
    }

    /// Drop one descriptor reference. The last reference destroys the entry,
    /// releasing the storage handle and freeing the slot for immediate reuse.
    pub fn release(&self, slot_index: usize) {
        let mut slots = self.slots.lock();
        let entry = slots[slot_index]
            .as_mut()
            .expect("release on an empty open file table slot");
        if entry.refcount > 1 {
            // open file is still referenced by other descriptors
            entry.refcount -= 1;
        } else {
            slots[slot_index] = None;
        }
    }

    /// Snapshot of the entry's current offset.
    pub fn offset_of(&self, slot_index: usize) -> Option<usize> {
        self.slots.lock()[slot_index].as_ref().map(|entry| entry.offset)
    }

    /// Shared reference to the entry's storage object.
    pub fn storage_of(&self, slot_index: usize) -> Option<interface::RustRfc<Storage>> {
        self.slots.lock()[slot_index]
            .as_ref()
            .map(|entry| entry.storage.clone())
    }

    /// Offset and storage taken in a single critical section, for read and
    /// write to issue their I/O against a consistent view of the entry.
    pub fn snapshot(&self, slot_index: usize) -> Option<(usize, interface::RustRfc<Storage>)> {
        self.slots.lock()[slot_index]
            .as_ref()
            .map(|entry| (entry.offset, entry.storage.clone()))
    }

    /// Current reference count of a slot, if occupied.
    pub fn refcount_of(&self, slot_index: usize) -> Option<u32> {
        self.slots.lock()[slot_index].as_ref().map(|entry| entry.refcount)
    }

    /// Move the entry's offset: absolute for `Set`, relative to the current
    /// offset for `Cur`, relative to the storage size for `End`.
    ///
    /// A negative result is EINVAL and leaves the stored offset untouched.
    /// The whole read-modify-write runs under the table lock, so concurrent
    /// repositions of a shared entry serialize rather than losing updates.
    /// The size query for `End` is storage I/O and happens before the lock is
    /// taken.
    pub fn reposition(
        &self,
        slot_index: usize,
        whence: Whence,
        delta: isize,
    ) -> Result<usize, Errno> {
        let end_base = match whence {
            Whence::End => {
                let storage = self.storage_of(slot_index).ok_or(Errno::EBADF)?;
                Some(storage.size().map_err(|e| errno_from_io(&e))? as isize)
            }
            _ => None,
        };

        let mut slots = self.slots.lock();
        let entry = slots[slot_index].as_mut().ok_or(Errno::EBADF)?;

        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => entry.offset as isize,
            Whence::End => end_base.unwrap_or(0),
        };
        let newoffset = base + delta;
        if newoffset < 0 {
            return Err(Errno::EINVAL);
        }

        entry.offset = newoffset as usize;
        Ok(newoffset as usize)
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        Self::new()
    }
}

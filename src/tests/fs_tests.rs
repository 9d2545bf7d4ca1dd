#[cfg(test)]
pub mod fs_tests {
    use crate::filetable::oft::OPEN_MAX;
    use crate::filetable::process::*;
    use crate::filetable::syscalls::fs_constants::*;
    use crate::interface;
    use crate::interface::errnos::Errno;

    #[test]
    pub fn test_fs() {
        // the subtests share the process registry and backing files in the
        // working directory, so they run sequentially under one test
        rdwrtest();
        seektest();
        openflagtest();
        removeguardtest();
        consoletest();
        independentopentest();
        duptest();
        dup2test();
        exhaustiontest();
        forktest();
        concurrencytest();
    }

    fn scrub(filename: &str) {
        let _ = interface::removefile(filename.to_string());
    }

    // write, close, reopen, read back: contents and end-of-file behavior
    pub fn rdwrtest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("rdwrtest.txt");

        let fd = proc.open_syscall("rdwrtest.txt", O_CREAT | O_RDWR, S_IRWXA);
        assert!(fd >= 0);

        assert_eq!(proc.write_syscall(fd, b"hello there!"), 12);

        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_SET), 0);
        let mut readbuf1 = [0u8; 5];
        assert_eq!(proc.read_syscall(fd, &mut readbuf1), 5);
        assert_eq!(&readbuf1, b"hello");

        assert_eq!(proc.write_syscall(fd, b" world!"), 7);
        assert_eq!(proc.close_syscall(fd), 0);

        // a reopened file starts again at offset 0 with the written bytes
        let fd = proc.open_syscall("rdwrtest.txt", O_RDONLY, S_IRWXA);
        assert!(fd >= 0);
        let mut readbuf2 = [0u8; 12];
        assert_eq!(proc.read_syscall(fd, &mut readbuf2), 12);
        assert_eq!(&readbuf2, b"hello world!");
        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_CUR), 12);

        // reading past the end transfers nothing and is not an error
        let mut readbuf3 = [0u8; 12];
        assert_eq!(proc.read_syscall(fd, &mut readbuf3), 0);

        assert_eq!(proc.close_syscall(fd), 0);
        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("rdwrtest.txt");
    }

    pub fn seektest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("seektest.txt");

        let fd = proc.open_syscall("seektest.txt", O_CREAT | O_TRUNC | O_RDWR, S_IRWXA);
        assert!(fd >= 0);
        let teststr = b"The quick brown fox jumped over the lazy dog.";
        assert_eq!(proc.write_syscall(fd, teststr), 45);

        assert_eq!(proc.lseek_syscall(fd, 5, SEEK_SET), 5);
        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_CUR), 5);
        assert_eq!(proc.lseek_syscall(fd, 5, SEEK_CUR), 10);
        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_END), 45);
        assert_eq!(proc.lseek_syscall(fd, -5, SEEK_END), 40);

        // a seek before position 0 fails and moves nothing
        assert_eq!(
            proc.lseek_syscall(fd, -1, SEEK_SET),
            -(Errno::EINVAL as i32)
        );
        assert_eq!(
            proc.lseek_syscall(fd, -100, SEEK_CUR),
            -(Errno::EINVAL as i32)
        );
        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_CUR), 40);

        // an unrecognized whence is rejected outright
        assert_eq!(proc.lseek_syscall(fd, 0, 77), -(Errno::EINVAL as i32));

        assert_eq!(proc.close_syscall(fd), 0);
        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("seektest.txt");
    }

    // flag and mode validation on the open path
    pub fn openflagtest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("openflag.txt");

        // both write bits at once is not a real access mode
        assert_eq!(
            proc.open_syscall("openflag.txt", O_CREAT | O_WRONLY | O_RDWR, S_IRWXA),
            -(Errno::EINVAL as i32)
        );

        // recognized but unsupported bits are rejected rather than ignored
        assert_eq!(
            proc.open_syscall("openflag.txt", O_CREAT | O_WRONLY | O_APPEND, S_IRWXA),
            -(Errno::EINVAL as i32)
        );
        assert_eq!(
            proc.open_syscall("openflag.txt", O_CREAT | O_RDWR | O_NOCTTY, S_IRWXA),
            -(Errno::EINVAL as i32)
        );

        assert_eq!(
            proc.open_syscall("openflag.txt", O_RDWR, S_IRWXA),
            -(Errno::ENOENT as i32)
        );
        assert_eq!(
            proc.open_syscall("openflag.txt", O_CREAT | O_RDWR, 0o7777),
            -(Errno::EPERM as i32)
        );

        // exclusive create works exactly once
        let fd = proc.open_syscall("openflag.txt", O_CREAT | O_EXCL | O_RDWR, S_IRWXA);
        assert!(fd >= 0);
        assert_eq!(proc.close_syscall(fd), 0);
        assert_eq!(
            proc.open_syscall("openflag.txt", O_CREAT | O_EXCL | O_RDWR, S_IRWXA),
            -(Errno::EEXIST as i32)
        );

        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("openflag.txt");
    }

    // a file stays protected from deletion while any open handle remains
    pub fn removeguardtest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("removeguard.txt");

        let fd1 = proc.open_syscall("removeguard.txt", O_CREAT | O_RDWR, S_IRWXA);
        assert!(fd1 >= 0);
        let fd2 = proc.open_syscall("removeguard.txt", O_RDONLY, S_IRWXA);
        assert!(fd2 >= 0);

        // closing one of two handles must not make the file deletable
        assert_eq!(proc.close_syscall(fd1), 0);
        assert!(interface::removefile("removeguard.txt".to_string()).is_err());

        // once the last handle is gone, deletion goes through
        assert_eq!(proc.close_syscall(fd2), 0);
        assert!(interface::removefile("removeguard.txt".to_string()).is_ok());

        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
    }

    pub fn consoletest() {
        filetable_init(0);
        let proc = proc_getref(1);

        // the pre-bound console descriptors accept writes but cannot seek
        assert_eq!(proc.write_syscall(STDOUT_FD, b"console write ok\n"), 17);
        assert_eq!(proc.write_syscall(STDERR_FD, b"console write ok\n"), 17);
        assert_eq!(
            proc.lseek_syscall(STDOUT_FD, 0, SEEK_SET),
            -(Errno::ESPIPE as i32)
        );
        assert_eq!(
            proc.lseek_syscall(STDERR_FD, 10, SEEK_CUR),
            -(Errno::ESPIPE as i32)
        );

        // fd 0 starts unbound in this layer
        assert_eq!(proc.close_syscall(0), -(Errno::EBADF as i32));
        assert_eq!(proc.close_syscall(-1), -(Errno::EBADF as i32));
        assert_eq!(proc.close_syscall(OPEN_MAX as i32), -(Errno::EBADF as i32));

        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
    }

    // two opens of one path get their own entries and their own offsets
    pub fn independentopentest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("independent.txt");

        let fd1 = proc.open_syscall("independent.txt", O_CREAT | O_TRUNC | O_RDWR, S_IRWXA);
        assert!(fd1 >= 0);
        assert_eq!(proc.write_syscall(fd1, b"0123456789"), 10);

        let fd2 = proc.open_syscall("independent.txt", O_RDONLY, S_IRWXA);
        assert!(fd2 >= 0);
        assert_eq!(proc.lseek_syscall(fd2, 0, SEEK_CUR), 0);

        assert_eq!(proc.lseek_syscall(fd1, 7, SEEK_SET), 7);
        assert_eq!(proc.lseek_syscall(fd2, 0, SEEK_CUR), 0);

        // same file contents through either entry all the same
        let mut readbuf = [0u8; 10];
        assert_eq!(proc.read_syscall(fd2, &mut readbuf), 10);
        assert_eq!(&readbuf, b"0123456789");

        assert_eq!(proc.close_syscall(fd1), 0);
        assert_eq!(proc.close_syscall(fd2), 0);
        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("independent.txt");
    }

    pub fn duptest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("duptest.txt");

        let fd = proc.open_syscall("duptest.txt", O_CREAT | O_TRUNC | O_RDWR, S_IRWXA);
        assert!(fd >= 0);
        let slot = proc.fd_get(fd).unwrap();
        assert_eq!(proc.oft.refcount_of(slot), Some(1));

        let dupfd = proc.dup_syscall(fd, None);
        assert!(dupfd >= 0);
        assert_ne!(dupfd, fd);
        assert_eq!(proc.fd_get(dupfd).unwrap(), slot);
        assert_eq!(proc.oft.refcount_of(slot), Some(2));

        // one name writes, the other observes the moved offset
        assert_eq!(proc.write_syscall(fd, b"abcdef"), 6);
        assert_eq!(proc.oft.offset_of(slot), Some(6));
        assert_eq!(proc.lseek_syscall(dupfd, 0, SEEK_CUR), 6);

        // closing one name leaves the entry alive for the other
        assert_eq!(proc.close_syscall(fd), 0);
        assert_eq!(proc.oft.refcount_of(slot), Some(1));
        assert_eq!(proc.lseek_syscall(dupfd, 0, SEEK_CUR), 6);

        assert_eq!(proc.close_syscall(dupfd), 0);
        assert_eq!(proc.oft.refcount_of(slot), None);

        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("duptest.txt");
    }

    pub fn dup2test() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("dup2test.txt");
        scrub("dup2other.txt");

        let fd = proc.open_syscall("dup2test.txt", O_CREAT | O_TRUNC | O_RDWR, S_IRWXA);
        assert!(fd >= 0);
        let slot = proc.fd_get(fd).unwrap();
        assert_eq!(proc.write_syscall(fd, b"hello there!"), 12);

        // dup2 to a free descriptor: both names share one offset
        let newfd = 10;
        assert_eq!(proc.dup2_syscall(fd, newfd), newfd);
        assert_eq!(proc.oft.refcount_of(slot), Some(2));
        assert_eq!(proc.lseek_syscall(newfd, 0, SEEK_CUR), 12);

        assert_eq!(proc.write_syscall(newfd, b" and then some"), 14);
        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_CUR), 26);
        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_SET), 0);
        assert_eq!(proc.lseek_syscall(newfd, 0, SEEK_CUR), 0);

        // dup2 of a descriptor onto itself changes nothing
        assert_eq!(proc.dup2_syscall(fd, fd), fd);
        assert_eq!(proc.oft.refcount_of(slot), Some(2));

        // dup2 onto an already-bound descriptor closes what it held first
        let otherfd = proc.open_syscall("dup2other.txt", O_CREAT | O_TRUNC | O_RDWR, S_IRWXA);
        assert!(otherfd >= 0);
        let otherslot = proc.fd_get(otherfd).unwrap();
        assert_eq!(proc.oft.refcount_of(otherslot), Some(1));

        assert_eq!(proc.dup2_syscall(fd, otherfd), otherfd);
        assert_eq!(proc.oft.refcount_of(otherslot), None); // last reference went away
        assert_eq!(proc.oft.refcount_of(slot), Some(3));
        assert_eq!(proc.fd_get(otherfd).unwrap(), slot);

        // out-of-range and unbound descriptors are rejected untouched
        assert_eq!(
            proc.dup2_syscall(fd, OPEN_MAX as i32),
            -(Errno::EBADF as i32)
        );
        assert_eq!(proc.dup2_syscall(fd, -1), -(Errno::EBADF as i32));
        assert_eq!(proc.dup2_syscall(99, 10), -(Errno::EBADF as i32));
        assert_eq!(proc.oft.refcount_of(slot), Some(3));

        assert_eq!(proc.close_syscall(fd), 0);
        assert_eq!(proc.close_syscall(newfd), 0);
        assert_eq!(proc.close_syscall(otherfd), 0);
        assert_eq!(proc.oft.refcount_of(slot), None);

        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("dup2test.txt");
        scrub("dup2other.txt");
    }

    // fill both tables, then verify one close makes an open possible again
    pub fn exhaustiontest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("exhaustion.txt");

        // 2 slots hold the consoles, so this many opens fit
        let available = OPEN_MAX - 2;
        let mut fds = Vec::new();
        for _ in 0..available {
            let fd = proc.open_syscall("exhaustion.txt", O_CREAT | O_RDWR, S_IRWXA);
            assert!(fd >= 0);
            fds.push(fd);
        }

        // the table is now full; the next open must fail cleanly
        assert_eq!(
            proc.open_syscall("exhaustion.txt", O_CREAT | O_RDWR, S_IRWXA),
            -(Errno::ENFILE as i32)
        );

        // freeing any one slot makes an open succeed again
        assert_eq!(proc.close_syscall(fds[17]), 0);
        let fd = proc.open_syscall("exhaustion.txt", O_CREAT | O_RDWR, S_IRWXA);
        assert!(fd >= 0);
        fds[17] = fd;

        for fd in fds {
            assert_eq!(proc.close_syscall(fd), 0);
        }
        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("exhaustion.txt");
    }

    pub fn forktest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("forktest.txt");

        let fd = proc.open_syscall("forktest.txt", O_CREAT | O_TRUNC | O_RDWR, S_IRWXA);
        assert!(fd >= 0);
        let slot = proc.fd_get(fd).unwrap();
        assert_eq!(proc.write_syscall(fd, b"parent"), 6);

        assert_eq!(proc.fork_syscall(2), 0);
        let child = proc_getref(2);
        assert_eq!(child.getpid_syscall(), 2);
        assert_eq!(child.getppid_syscall(), 1);
        assert_eq!(proc.oft.refcount_of(slot), Some(2));

        // the inherited descriptor continues at the parent's offset
        assert_eq!(child.lseek_syscall(fd, 0, SEEK_CUR), 6);
        assert_eq!(child.write_syscall(fd, b" child"), 6);
        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_CUR), 12);

        // child exit drops its shares but not the parent's
        assert_eq!(child.exit_syscall(), 0);
        assert_eq!(proc.oft.refcount_of(slot), Some(1));

        assert_eq!(proc.lseek_syscall(fd, 0, SEEK_SET), 0);
        let mut readbuf = [0u8; 12];
        assert_eq!(proc.read_syscall(fd, &mut readbuf), 12);
        assert_eq!(&readbuf, b"parent child");

        assert_eq!(proc.close_syscall(fd), 0);
        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("forktest.txt");
    }

    // offset bookkeeping on a shared entry must not lose updates under
    // concurrent writers
    pub fn concurrencytest() {
        filetable_init(0);
        let proc = proc_getref(1);
        scrub("concurrency.txt");

        let fd = proc.open_syscall("concurrency.txt", O_CREAT | O_TRUNC | O_RDWR, S_IRWXA);
        assert!(fd >= 0);
        let dupfd = proc.dup_syscall(fd, None);
        assert!(dupfd >= 0);

        const WRITERS: usize = 4;
        const ROUNDS: usize = 250;
        let mut threads = Vec::new();
        for writer in 0..WRITERS {
            let threadproc = proc_getref(1);
            let threadfd = if writer % 2 == 0 { fd } else { dupfd };
            threads.push(interface::helper_thread(move || {
                for _ in 0..ROUNDS {
                    assert_eq!(threadproc.write_syscall(threadfd, b"0123456789"), 10);
                }
            }));
        }
        for thread in threads {
            thread.join().unwrap();
        }

        // every write advanced the shared offset exactly once
        assert_eq!(
            proc.lseek_syscall(fd, 0, SEEK_CUR),
            (WRITERS * ROUNDS * 10) as i32
        );

        assert_eq!(proc.close_syscall(fd), 0);
        assert_eq!(proc.close_syscall(dupfd), 0);
        assert_eq!(proc.exit_syscall(), 0);
        filetable_finalize();
        scrub("concurrency.txt");
    }
}

// File system related constants
#![allow(dead_code)]

// Define constants using static or const
// Imported into fs_calls file

pub const STARTINGFD: i32 = 0;

// used as integer entry value for a free slot in the process descriptor table
pub const FREE_SLOT: i32 = -1;

// stdout and stderr file descriptors, pre-bound in every descriptor table
pub const STDOUT_FD: i32 = 1;
pub const STDERR_FD: i32 = 2;

pub const O_RDONLY: i32 = 0o0;
pub const O_WRONLY: i32 = 0o1;
pub const O_RDWR: i32 = 0o2;
pub const O_RDWRFLAGS: i32 = 0o3;

pub const O_CREAT: i32 = 0o100;
pub const O_EXCL: i32 = 0o200;
pub const O_TRUNC: i32 = 0o1000;

// recognized but unsupported: append positioning and tty handling have no
// implementation here, so these bits stay out of the accepted mask
pub const O_NOCTTY: i32 = 0o400;
pub const O_APPEND: i32 = 0o2000;

// every flag bit open_syscall accepts; anything else is EINVAL
pub const O_ALLFLAGS: i32 = O_RDWRFLAGS | O_CREAT | O_EXCL | O_TRUNC;

pub const SEEK_SET: i32 = 0;
pub const SEEK_CUR: i32 = 1;
pub const SEEK_END: i32 = 2;

//Standard mode bit combinations
pub const S_IRWXA: u32 = 0o777;
pub const S_IRWXU: u32 = 0o700;
pub const S_IRUSR: u32 = 0o400;
pub const S_IWUSR: u32 = 0o200;
pub const S_IXUSR: u32 = 0o100;
pub const S_IRWXG: u32 = 0o070;
pub const S_IRGRP: u32 = 0o040;
pub const S_IWGRP: u32 = 0o020;
pub const S_IXGRP: u32 = 0o010;
pub const S_IRWXO: u32 = 0o007;
pub const S_IROTH: u32 = 0o004;
pub const S_IWOTH: u32 = 0o002;
pub const S_IXOTH: u32 = 0o001;

//! Advisory exclusive locks on open files
//!
//! The lock only serializes processes that also request it. It is released
//! when the guard is dropped or the file is closed.

use std::fs::File;
use std::io;

/// Exclusive `flock` held on a file for the guard's lifetime
pub struct FileLock<'a> {
    file: &'a File,
}

impl<'a> FileLock<'a> {
    /// Block until an exclusive lock on `file` is granted
    #[cfg(unix)]
    pub fn exclusive(file: &'a File) -> io::Result<Self> {
        use std::os::unix::io::AsRawFd;

        let fd = file.as_raw_fd();
        loop {
            let result = unsafe { libc::flock(fd, libc::LOCK_EX) };
            if result == 0 {
                return Ok(Self { file });
            }

            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    /// Advisory locks are not taken on this platform
    #[cfg(not(unix))]
    pub fn exclusive(file: &'a File) -> io::Result<Self> {
        Ok(Self { file })
    }

    pub fn file(&self) -> &File {
        self.file
    }
}

impl Drop for FileLock<'_> {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}

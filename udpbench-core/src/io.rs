//! Readiness primitive shared by workers and control loops.
//!
//! Each caller only ever waits on a single descriptor at a time, so a
//! plain "wait for readable/writable, with a timeout" operation on that
//! fd is all that's needed. This is implemented with a single-entry
//! `poll(2)`, which is portable across the platforms `libc` supports
//! without pulling in a full epoll/kqueue abstraction for a
//! one-descriptor wait.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Readiness {
    Ready,
    TimedOut,
}

fn poll_for(fd: RawFd, events: i16, timeout: Duration) -> io::Result<Readiness> {
    let mut pfd = libc::pollfd {
        fd,
        events,
        revents: 0,
    };

    let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);

    loop {
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        match rc {
            -1 => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    // A signal delivered during the wait is a no-op here;
                    // callers re-check their own stop flag and retry.
                    continue;
                }
                return Err(err);
            }
            0 => return Ok(Readiness::TimedOut),
            _ => return Ok(Readiness::Ready),
        }
    }
}

/// Waits up to `timeout` for `fd` to become readable.
pub fn wait_readable(fd: RawFd, timeout: Duration) -> io::Result<Readiness> {
    poll_for(fd, libc::POLLIN, timeout)
}

/// Waits up to `timeout` for `fd` to become writable.
pub fn wait_writable(fd: RawFd, timeout: Duration) -> io::Result<Readiness> {
    poll_for(fd, libc::POLLOUT, timeout)
}

//! # Character Device Link
//!
//! A [`Link`] over a device node (`/dev/rfcomm*`, `/dev/usb/lp*`).
//!
//! Large writes go out in chunks with a small pause between them so the
//! printer's receive buffer is not overrun. Reads wait with `poll(2)` so a
//! silent printer turns into a timeout instead of a hung worker.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::Link;
use crate::error::CometaError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

pub struct DeviceLink {
    file: Option<File>,
    path: PathBuf,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl DeviceLink {
    /// Open a device node for reading and writing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CometaError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                CometaError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw_fd(&self) -> Option<i32> {
        self.file.as_ref().map(|f| f.as_raw_fd())
    }

    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    fn file(&mut self) -> Result<&mut File, CometaError> {
        let path = self.path.display().to_string();
        self.file
            .as_mut()
            .ok_or_else(|| CometaError::Transport(format!("{path} is closed")))
    }
}

impl Link for DeviceLink {
    fn send(&mut self, data: &[u8]) -> Result<(), CometaError> {
        let chunk_size = self.chunk_size;
        let delay = self.chunk_delay;
        let chunked = data.len() > chunk_size;
        let file = self.file()?;

        for chunk in data.chunks(chunk_size) {
            file.write_all(chunk)
                .map_err(|e| CometaError::Transport(format!("Write failed: {}", e)))?;
            if chunked && !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        file.flush()
            .map_err(|e| CometaError::Transport(format!("Flush failed: {}", e)))
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, CometaError> {
        let file = self.file()?;
        if !wait_readable(file.as_raw_fd(), timeout)? {
            return Ok(0);
        }
        // Readable with nothing to read means the other end hung up.
        match file.read(buf) {
            Ok(0) if !buf.is_empty() => Err(CometaError::Transport(
                "Device closed by printer".to_string(),
            )),
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(CometaError::Transport(format!("Read failed: {}", e))),
        }
    }

    fn close(&mut self) -> Result<(), CometaError> {
        match self.file.take() {
            Some(mut file) => file
                .flush()
                .map_err(|e| CometaError::Transport(format!("Close failed: {}", e))),
            None => Ok(()),
        }
    }
}

/// Wait until `fd` has data to read. `false` means the timeout elapsed.
fn wait_readable(fd: i32, timeout: Duration) -> Result<bool, CometaError> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;
    let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
    if rc < 0 {
        return Err(CometaError::Transport(format!(
            "poll failed: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(rc > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device() {
        let err = DeviceLink::open("/dev/does-not-exist-42").err().unwrap();
        assert!(err.to_string().contains("/dev/does-not-exist-42"));
    }

    #[test]
    fn test_send_to_regular_file_in_chunks() {
        let path = std::env::temp_dir().join(format!("cometa-device-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let mut link = DeviceLink::open(&path).unwrap();
        link.set_chunk_size(3);
        link.set_chunk_delay(Duration::ZERO);
        link.send(b"0123456789").unwrap();
        link.close().unwrap();
        assert!(link.send(b"x").is_err());

        assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_recv_at_end_of_stream_is_error() {
        let path = std::env::temp_dir().join(format!("cometa-eof-{}", std::process::id()));
        std::fs::write(&path, b"\x23").unwrap();

        let mut link = DeviceLink::open(&path).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(link.recv(&mut buf, Duration::from_millis(50)).unwrap(), 1);
        assert_eq!(buf[0], 0x23);
        let err = link.recv(&mut buf, Duration::from_millis(50)).unwrap_err();
        assert!(err.to_string().contains("closed"));

        link.close().unwrap();
        std::fs::remove_file(&path).unwrap();
    }
}

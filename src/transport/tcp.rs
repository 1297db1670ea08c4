//! TCP transport for network printers (port 9100 / RAW).

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};

use super::Link;
use crate::error::CometaError;

pub const DEFAULT_PORT: u16 = 9100;

/// A connected raw TCP link.
pub struct TcpLink {
    stream: Option<TcpStream>,
    addr: SocketAddr,
}

impl TcpLink {
    /// Connect to `host` or `host:port`, waiting at most `timeout`.
    pub fn connect(host: &str, timeout: Duration) -> Result<Self, CometaError> {
        let addr = resolve(host)?;
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                CometaError::Timeout(format!("connecting to {addr}"))
            }
            _ => CometaError::Transport(format!("Failed to connect to {addr}: {e}")),
        })?;

        stream
            .set_nodelay(true)
            .and_then(|_| configure_keepalive(&stream, Duration::from_secs(60)))
            .and_then(|_| stream.set_write_timeout(Some(timeout)))
            .map_err(|e| CometaError::Transport(format!("Failed to configure {addr}: {e}")))?;

        tracing::debug!(%addr, "connected");
        Ok(Self {
            stream: Some(stream),
            addr,
        })
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.addr
    }

    fn stream(&mut self) -> Result<&mut TcpStream, CometaError> {
        let addr = self.addr;
        self.stream
            .as_mut()
            .ok_or_else(|| CometaError::Transport(format!("connection to {addr} is closed")))
    }
}

impl Link for TcpLink {
    fn send(&mut self, data: &[u8]) -> Result<(), CometaError> {
        let stream = self.stream()?;
        stream
            .write_all(data)
            .and_then(|_| stream.flush())
            .map_err(|e| CometaError::Transport(format!("Write failed: {e}")))
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, CometaError> {
        let stream = self.stream()?;
        // A zero read timeout means "block forever" to the OS.
        stream
            .set_read_timeout(Some(timeout.max(Duration::from_millis(1))))
            .map_err(|e| CometaError::Transport(format!("Read failed: {e}")))?;
        match stream.read(buf) {
            Ok(0) => Err(CometaError::Transport("Connection closed by printer".into())),
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(0)
            }
            Err(e) => Err(CometaError::Transport(format!("Read failed: {e}"))),
        }
    }

    fn close(&mut self) -> Result<(), CometaError> {
        match self.stream.take() {
            Some(stream) => match stream.shutdown(Shutdown::Both) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
                Err(e) => Err(CometaError::Transport(format!("Close failed: {e}"))),
            },
            None => Ok(()),
        }
    }
}

/// Resolve `host` or `host:port`, defaulting to [`DEFAULT_PORT`].
pub fn resolve(host: &str) -> Result<SocketAddr, CometaError> {
    let with_port = if host.parse::<SocketAddr>().is_ok() || has_port(host) {
        host.to_string()
    } else {
        format!("{host}:{DEFAULT_PORT}")
    };
    with_port
        .to_socket_addrs()
        .map_err(|e| CometaError::Transport(format!("Cannot resolve {host}: {e}")))?
        .next()
        .ok_or_else(|| CometaError::Transport(format!("Cannot resolve {host}")))
}

fn has_port(host: &str) -> bool {
    match host.rsplit_once(':') {
        // Bare IPv6 addresses contain colons too
        Some((name, port)) => !name.contains(':') && port.parse::<u16>().is_ok(),
        None => false,
    }
}

/// Configure TCP keepalive via `socket2`.
fn configure_keepalive(stream: &TcpStream, interval: Duration) -> io::Result<()> {
    let keepalive = TcpKeepalive::new().with_time(interval);

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    let keepalive = keepalive.with_interval(interval);

    SockRef::from(stream).set_tcp_keepalive(&keepalive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_resolve_defaults_port() {
        assert_eq!(resolve("127.0.0.1").unwrap().port(), 9100);
        assert_eq!(resolve("127.0.0.1:9101").unwrap().port(), 9101);
    }

    #[test]
    fn test_send_and_recv_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 3];
            conn.read_exact(&mut buf).unwrap();
            conn.write_all(&[0xAB]).unwrap();
            buf
        });

        let mut link = TcpLink::connect(&addr.to_string(), Duration::from_secs(2)).unwrap();
        link.send(&[0x1B, 0x06, 0x01]).unwrap();
        let mut reply = [0u8; 1];
        let mut n = 0;
        while n == 0 {
            n = link.recv(&mut reply, Duration::from_secs(2)).unwrap();
        }
        assert_eq!(reply, [0xAB]);
        assert_eq!(server.join().unwrap(), [0x1B, 0x06, 0x01]);
        link.close().unwrap();
    }
}

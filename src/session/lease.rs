//! Scoped ownership of an opened port.

use std::ops::{Deref, DerefMut};

use crate::error::CometaError;
use crate::transport::Port;

/// Holds a port and releases it exactly once: through [`release`] when the
/// session finishes, or on drop if the session unwinds first.
///
/// [`release`]: PortLease::release
pub struct PortLease {
    port: Box<dyn Port>,
    released: bool,
}

impl PortLease {
    pub fn new(port: Box<dyn Port>) -> Self {
        Self {
            port,
            released: false,
        }
    }

    /// Release the port. Later calls are no-ops.
    pub fn release(&mut self) -> Result<(), CometaError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.port.release()
    }
}

impl Deref for PortLease {
    type Target = dyn Port;

    fn deref(&self) -> &Self::Target {
        self.port.as_ref()
    }
}

impl DerefMut for PortLease {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.port.as_mut()
    }
}

impl Drop for PortLease {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "releasing port on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockOpener, MockScript};
    use crate::transport::PortOpener;
    use std::time::Duration;

    fn lease(opener: &MockOpener) -> PortLease {
        PortLease::new(opener.open("TCP:mock", "", Duration::ZERO).unwrap())
    }

    #[test]
    fn test_release_once() {
        let opener = MockOpener::new(MockScript::default());
        let mut lease = lease(&opener);
        lease.release().unwrap();
        lease.release().unwrap();
        drop(lease);
        assert_eq!(opener.log().releases, 1);
    }

    #[test]
    fn test_drop_releases() {
        let opener = MockOpener::new(MockScript {
            fail_release: Some("gone".into()),
            ..Default::default()
        });
        drop(lease(&opener));
        assert_eq!(opener.log().releases, 1);
    }
}

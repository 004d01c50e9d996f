//! Wait for a freshly booted machine to accept SSH connections
//!
//! A droplet reports `active` before sshd is listening, so the deploy
//! executor first polls the port with short TCP connects.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::ports::SessionError;

#[derive(Debug, Clone, Copy)]
pub struct ConnectivityWaiter {
    /// Timeout of a single connect attempt
    pub attempt_timeout: Duration,
    /// Pause between attempts
    pub interval: Duration,
    /// Give up after this long; `None` keeps trying
    pub limit: Option<Duration>,
}

impl Default for ConnectivityWaiter {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(5),
            interval: Duration::from_secs(5),
            limit: None,
        }
    }
}

impl ConnectivityWaiter {
    /// Block until `address:port` accepts a TCP connection
    pub fn wait_for_port(&self, address: &str, port: u16) -> Result<(), SessionError> {
        let target = format!("{}:{}", address, port);
        let addrs: Vec<SocketAddr> = (address, port)
            .to_socket_addrs()
            .map_err(|e| SessionError::Connect {
                target: target.clone(),
                message: e.to_string(),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(SessionError::Connect {
                target,
                message: "address did not resolve".to_string(),
            });
        }

        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let last_error = match try_connect(&addrs, self.attempt_timeout) {
                Ok(()) => {
                    debug!(%target, attempts, "port is reachable");
                    return Ok(());
                }
                Err(e) => e,
            };

            let exhausted = self
                .limit
                .is_some_and(|limit| started.elapsed() + self.interval >= limit);
            if exhausted {
                return Err(SessionError::Connect {
                    target,
                    message: format!("not reachable after {} attempts: {}", attempts, last_error),
                });
            }

            debug!(%target, attempts, error = %last_error, "port not reachable yet");
            thread::sleep(self.interval);
        }
    }
}

fn try_connect(addrs: &[SocketAddr], timeout: Duration) -> std::io::Result<()> {
    let mut last = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(_) => return Ok(()),
            Err(e) => last = Some(e),
        }
    }
    Err(last.unwrap_or_else(|| std::io::Error::other("no addresses")))
}

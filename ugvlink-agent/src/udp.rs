//! UDP stand-in for the addressed radio link.
//!
//! One datagram carries one protocol payload, the same unit the real
//! radio delivers per frame. The socket is shared between the two
//! halves so the send pump and the listener operate independently.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::trace;

use ugvlink::{RadioRx, RadioTx};
use ugvlink_proto::MAX_PAYLOAD;

/// A bound UDP socket ready to be split into link halves.
#[derive(Debug)]
pub struct UdpLink {
    socket: Arc<UdpSocket>,
}

impl UdpLink {
    /// Binds the local socket.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        Ok(Self {
            socket: Arc::new(UdpSocket::bind(addr).await?),
        })
    }

    /// The bound local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Splits into independent send and receive halves.
    pub fn split(self) -> (UdpTx, UdpRx) {
        (
            UdpTx {
                socket: Arc::clone(&self.socket),
            },
            UdpRx {
                socket: self.socket,
                buf: vec![0; MAX_PAYLOAD],
            },
        )
    }
}

/// Outbound half of the UDP link.
#[derive(Debug)]
pub struct UdpTx {
    socket: Arc<UdpSocket>,
}

/// Inbound half of the UDP link.
#[derive(Debug)]
pub struct UdpRx {
    socket: Arc<UdpSocket>,
    buf: Vec<u8>,
}

impl RadioTx for UdpTx {
    type Addr = SocketAddr;

    async fn send(&mut self, dest: &SocketAddr, payload: &[u8]) -> io::Result<()> {
        self.socket.send_to(payload, *dest).await.map(|_| ())
    }
}

impl RadioRx for UdpRx {
    async fn recv(&mut self) -> io::Result<Vec<u8>> {
        let (len, from) = self.socket.recv_from(&mut self.buf).await?;
        trace!(%from, len, "datagram received");
        Ok(self.buf[..len].to_vec())
    }
}

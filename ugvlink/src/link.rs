//! Transport boundary: the consumed radio-link capability.
//!
//! The protocol layer never interprets the link's framing or
//! addressing; it hands each encoded message to [`RadioTx::send`] as an
//! opaque payload for one peer address, and takes whole payloads back
//! from [`RadioRx::recv`]. The link may drop, duplicate, or reorder
//! payloads — every inbound payload is handled independently.
//!
//! The two halves are separate traits so the send pump and the inbound
//! listener can each own their half outright; radio drivers generally
//! expose exactly this split (a frame builder and a frame parser).

use std::future::Future;
use std::io;

/// Outbound half of a radio link.
pub trait RadioTx {
    /// Opaque peer address understood by the link layer (a 64-bit radio
    /// address, a socket address, a test channel — the protocol does
    /// not look inside).
    type Addr;

    /// Hands one payload to the link for delivery to `dest`.
    ///
    /// Delivery is best-effort; an error means the link could not even
    /// accept the payload, and the caller treats the message as
    /// dropped.
    fn send(
        &mut self,
        dest: &Self::Addr,
        payload: &[u8],
    ) -> impl Future<Output = io::Result<()>> + Send;
}

/// Inbound half of a radio link.
pub trait RadioRx {
    /// Waits for the next inbound payload.
    fn recv(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

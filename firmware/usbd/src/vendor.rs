//! Vendor extension hook

use usb::SetupPacket;

/// Outcome of a vendor request's setup stage
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reply {
    /// Send the first `n` bytes of the shared buffer back to the host
    Ack(u16),
    /// Accept the request; there's nothing to send back
    NoData,
    /// Unknown request; the transfer is stalled
    Unsupported,
}

/// Vendor commands carried over the control pipe
///
/// All methods run in interrupt context and must return promptly
pub trait Vendor {
    /// Handles the setup stage of a vendor request
    ///
    /// `buf` is the endpoint 0 buffer; response bytes are written into it
    fn setup(&mut self, request: &SetupPacket, buf: &mut [u8]) -> Reply;

    /// Handles one packet of host-to-device data that followed vendor request `request`
    ///
    /// NOTE there's no way to reject the data; the status stage is always acknowledged
    fn data(&mut self, request: u8, data: &[u8]);

    /// Called after every bus reset
    fn reset(&mut self) {}

    /// An IN transaction completed on data endpoint `ep`
    ///
    /// Returns the number of bytes written into `buf` to send next, or `None` to NAK
    fn endpoint_in(&mut self, ep: u8, buf: &mut [u8]) -> Option<usize> {
        let _ = (ep, buf);
        None
    }

    /// An OUT transaction completed on data endpoint `ep`
    fn endpoint_out(&mut self, ep: u8, data: &[u8]) {
        let _ = (ep, data);
    }
}

/// A device without vendor commands
pub struct NoVendor;

impl Vendor for NoVendor {
    fn setup(&mut self, _: &SetupPacket, _: &mut [u8]) -> Reply {
        Reply::Unsupported
    }

    fn data(&mut self, _: u8, _: &[u8]) {}
}

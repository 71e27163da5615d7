//! Bus events: reset, suspend / resume; and the data endpoints

use core::cmp;

use usb::{ep, Direction};

use crate::{
    ep0::Stage,
    port::{Control, Handshake, Port},
    vendor::Vendor,
    Controller, Descriptors, Enumeration,
};

/// Puts every configured data endpoint back in its default state
pub(crate) fn arm_data_endpoints(descs: &Descriptors<'_>, port: &mut dyn Port) {
    let mut armed = 0u8;
    for address in descs.endpoints() {
        let n = address.number();
        if armed & (1 << n) == 0 {
            port.set_tx_len(n, 0);
            port.set_endpoint(n, Control::DATA_DEFAULT);
            armed |= 1 << n;
        }
    }
}

impl<'a, P, V> Controller<'a, P, V>
where
    P: Port,
    V: Vendor,
{
    /// Configures the peripheral and attaches the device to the bus
    pub fn init(&mut self) {
        self.port.set_address(0);
        self.port.set_tx_len(0, 0);
        self.port.set_endpoint(0, Control::EP0_IDLE);
        arm_data_endpoints(&self.descs, &mut self.port);

        self.port.clear_events();
        self.port.set_interrupts(true);
        self.port.set_pull_up(true);

        log::info!("pulled D+ up");
    }

    /// Masks the USB interrupts and detaches from the bus
    pub fn detach(&mut self) {
        self.port.set_interrupts(false);
        self.port.set_pull_up(false);

        log::info!("detached from the bus");
    }

    pub(crate) fn reset(&mut self) {
        log::info!("USB reset");

        self.port.set_tx_len(0, 0);
        self.port.set_endpoint(0, Control::EP0_IDLE);
        arm_data_endpoints(&self.descs, &mut self.port);
        self.port.set_address(0);
        // a reset supersedes whatever else was flagged
        self.port.clear_events();

        self.usb = Enumeration::new();
        self.stage = Stage::Idle;

        self.vendor.reset();
    }

    pub(crate) fn suspend(&mut self) {
        log::info!("entering low power mode");

        let cause = self.port.suspend(self.wake);

        log::info!("leaving low power mode ({:?})", cause);
    }

    pub(crate) fn data_in(&mut self, n: u8) {
        let address = match ep::Address::new(n, Direction::IN) {
            Ok(address) => address,
            Err(_) => {
                log::warn!("IN transaction on nonexistent endpoint {}", n);
                return;
            }
        };

        if self.usb.halts.is_halted(address) {
            // keeps answering STALL
            return;
        }

        let buf = self.port.buffer(n);
        let capacity = cmp::min(buf.len(), usize::from(u8::max_value()));
        let next = self.vendor.endpoint_in(n, &mut buf[..capacity]);

        let mut control = self.port.endpoint(n);
        match next {
            Some(len) => {
                self.port.set_tx_len(n, cmp::min(len, capacity) as u8);
                control.tx = Handshake::Ack;
            }

            None => {
                self.port.set_tx_len(n, 0);
                control.tx = Handshake::Nak;
            }
        }
        self.port.set_endpoint(n, control);
    }

    pub(crate) fn data_out(&mut self, n: u8, len: u8) {
        let address = match ep::Address::new(n, Direction::OUT) {
            Ok(address) => address,
            Err(_) => {
                log::warn!("OUT transaction on nonexistent endpoint {}", n);
                return;
            }
        };

        if self.usb.halts.is_halted(address) {
            return;
        }

        let buf = self.port.buffer(n);
        let len = cmp::min(usize::from(len), buf.len());
        self.vendor.endpoint_out(n, &buf[..len]);
    }
}

//! USB device controller
//!
//! Device-side protocol engine: the endpoint 0 control transfer state machine, the standard
//! requests needed for enumeration, bus reset / suspend handling and a hook for vendor commands.
//!
//! The controller owns the peripheral (`Port`) and the vendor command handler (`Vendor`). The
//! interrupt handler drives it through `Controller::on_interrupt`; the main loop reaches it
//! through `Shared::lock`, with the interrupt masked.
//!
//! # References
//!
//! - Universal Serial Bus Specification Revision 1.1, chapter 9

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![no_std]

mod bus;
mod desc;
mod ep0;
mod halt;
mod port;
mod shared;
mod standard;
mod vendor;

use usb::{ep, State};

pub use crate::{
    desc::{Descriptors, Endpoints},
    halt::Halts,
    port::{Control, Event, Handshake, Port, Wake, WakeSources},
    shared::Shared,
    vendor::{NoVendor, Reply, Vendor},
};

/// Control pipe errors
///
/// None of these is fatal; they all resolve to a STALL of endpoint 0 (or are ignored) and the host
/// recovers by issuing a new SETUP
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Error {
    /// The SETUP transaction didn't carry exactly 8 bytes
    MalformedSetupPacket,
    /// Unknown or unimplemented standard request, or a parameter out of range
    UnsupportedStandardRequest,
    /// The vendor hook rejected the request
    UnsupportedVendorRequest,
    /// Unknown descriptor type or string index
    UnsupportedDescriptorIndex,
    /// Interrupt flags with no corresponding protocol event
    HardwareTransientEvent,
}

/// Enumeration state; survives across control transfers, cleared by a bus reset
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Enumeration {
    /// Address the device answers to
    pub(crate) address: u8,
    /// Address received in SET_ADDRESS; takes effect after the status stage
    pub(crate) pending_address: Option<u8>,
    /// Active configuration; 0 = not configured
    pub(crate) configuration: u8,
    /// The host enabled remote wakeup
    pub(crate) remote_wakeup: bool,
    pub(crate) halts: Halts,
}

impl Enumeration {
    pub(crate) const fn new() -> Self {
        Self {
            address: 0,
            pending_address: None,
            configuration: 0,
            remote_wakeup: false,
            halts: Halts::new(),
        }
    }
}

/// USB device controller
pub struct Controller<'a, P, V> {
    port: P,
    vendor: V,
    descs: Descriptors<'a>,
    wake: WakeSources,
    max_packet_size0: u8,
    usb: Enumeration,
    stage: ep0::Stage<'a>,
}

impl<'a, P, V> Controller<'a, P, V>
where
    P: Port,
    V: Vendor,
{
    /// Creates a controller that serves `descs`
    ///
    /// NOTE the peripheral is left untouched until `init` is called
    pub fn new(mut port: P, descs: Descriptors<'a>, vendor: V) -> Self {
        let buffer_len = port.buffer(0).len();
        let max_packet_size0 = if buffer_len < usize::from(descs.max_packet_size0()) {
            log::warn!(
                "EP0 buffer ({}B) is smaller than bMaxPacketSize0 ({}B)",
                buffer_len,
                descs.max_packet_size0()
            );
            buffer_len as u8
        } else {
            descs.max_packet_size0()
        };

        Self {
            port,
            vendor,
            descs,
            wake: WakeSources::default(),
            max_packet_size0,
            usb: Enumeration::new(),
            stage: ep0::Stage::Idle,
        }
    }

    /// Selects the signals that end a bus suspension
    pub fn wake_on(mut self, wake: WakeSources) -> Self {
        self.wake = wake;
        self
    }

    /// Services every pending hardware event
    pub fn on_interrupt(&mut self) {
        while let Some(event) = self.port.next_event() {
            self.handle(event);
        }
    }

    /// Services a single hardware event
    pub fn handle(&mut self, event: Event) {
        log::trace!("-> {:?}", event);

        match event {
            Event::Setup { len } => self.setup(len),
            Event::In { ep: 0 } => self.ep0_in(),
            Event::Out { ep: 0, len } => self.ep0_out(len),
            Event::In { ep } => self.data_in(ep),
            Event::Out { ep, len } => self.data_out(ep, len),
            Event::BusReset => self.reset(),
            Event::Suspend => self.suspend(),
            Event::Resume => log::info!("bus activity resumed"),
            Event::Spurious => {
                log::debug!("{:?}; clearing flags", Error::HardwareTransientEvent);
                self.port.clear_events();
            }
        }
    }

    /// Address the device currently answers to
    ///
    /// A new address only shows up here after the status stage of SET_ADDRESS completes
    pub fn address(&self) -> u8 {
        self.usb.address
    }

    /// Active configuration value; 0 means not configured
    pub fn configuration(&self) -> u8 {
        self.usb.configuration
    }

    /// Device state
    pub fn state(&self) -> State {
        match (self.usb.address, self.usb.configuration) {
            (0, _) => State::Default,
            (address, 0) => State::Address(address),
            (address, value) => State::Configured { address, value },
        }
    }

    /// Whether data endpoint `address` is halted
    pub fn is_halted(&self, address: ep::Address) -> bool {
        self.usb.halts.is_halted(address)
    }

    /// Whether the host enabled remote wakeup
    pub fn remote_wakeup_enabled(&self) -> bool {
        self.usb.remote_wakeup
    }

    /// The served descriptors
    pub fn descriptors(&self) -> &Descriptors<'a> {
        &self.descs
    }

    /// The peripheral
    pub fn port(&self) -> &P {
        &self.port
    }

    /// The peripheral
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// The vendor command handler
    pub fn vendor(&self) -> &V {
        &self.vendor
    }

    /// The vendor command handler
    pub fn vendor_mut(&mut self) -> &mut V {
        &mut self.vendor
    }
}

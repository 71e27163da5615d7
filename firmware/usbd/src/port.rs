//! Hardware register port
//!
//! The register-level details of the USB peripheral live behind the `Port` trait; the controller
//! only ever issues the commands listed here

/// Response a (half) endpoint gives to the next token
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Handshake {
    /// Accept the data / send the armed data
    Ack,
    /// Not ready; the host will retry
    Nak,
    /// Protocol error or halted endpoint
    Stall,
}

/// Endpoint control register
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Control {
    /// Response to IN tokens (device-to-host)
    pub tx: Handshake,
    /// Response to OUT tokens (host-to-device)
    pub rx: Handshake,
    /// Data toggle of the next transmitted packet (`true` = DATA1)
    pub tx_toggle: bool,
    /// Expected data toggle of the next received packet (`true` = DATA1)
    pub rx_toggle: bool,
    /// The hardware flips the toggles on its own after each successful transaction
    pub auto_toggle: bool,
}

impl Control {
    /// Endpoint 0 between transfers: accept SETUP/OUT, NAK IN
    pub const EP0_IDLE: Control = Control {
        tx: Handshake::Nak,
        rx: Handshake::Ack,
        tx_toggle: false,
        rx_toggle: false,
        auto_toggle: false,
    };

    /// Endpoint 0 after a SETUP: both directions answer with DATA1
    pub const EP0_ARMED: Control = Control {
        tx: Handshake::Ack,
        rx: Handshake::Ack,
        tx_toggle: true,
        rx_toggle: true,
        auto_toggle: false,
    };

    /// Endpoint 0 after a protocol error
    pub const EP0_STALL: Control = Control {
        tx: Handshake::Stall,
        rx: Handshake::Stall,
        tx_toggle: true,
        rx_toggle: true,
        auto_toggle: false,
    };

    /// Data endpoint default: NAK IN until there is data, ACK OUT
    pub const DATA_DEFAULT: Control = Control {
        tx: Handshake::Nak,
        rx: Handshake::Ack,
        tx_toggle: false,
        rx_toggle: false,
        auto_toggle: true,
    };
}

/// Hardware event, as reported by the interrupt flags
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// SETUP transaction on endpoint 0; `len` bytes were received
    Setup {
        /// Received byte count
        len: u8,
    },
    /// IN transaction completed
    In {
        /// Endpoint number
        ep: u8,
    },
    /// OUT transaction completed
    Out {
        /// Endpoint number
        ep: u8,
        /// Received byte count
        len: u8,
    },
    /// Bus reset
    BusReset,
    /// Bus went idle
    Suspend,
    /// Bus activity resumed
    Resume,
    /// Interrupt flags with no corresponding protocol event
    Spurious,
}

/// Signals that may wake the device from the low power mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WakeSources {
    /// USB bus activity
    pub usb: bool,
    /// UART0 receive line pulled low
    pub rxd0: bool,
    /// UART1 receive line pulled low
    pub rxd1: bool,
}

impl Default for WakeSources {
    fn default() -> Self {
        Self {
            usb: true,
            rxd0: true,
            rxd1: true,
        }
    }
}

/// What ended a suspension
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Wake {
    /// USB bus activity
    Usb,
    /// UART0 receive line
    Rxd0,
    /// UART1 receive line
    Rxd1,
}

/// USB device peripheral
pub trait Port {
    /// Packet buffer of endpoint `ep`
    ///
    /// The endpoint 0 buffer is shared by SETUP, OUT and IN transactions and holds at most one
    /// max-packet-size worth of data
    fn buffer(&mut self, ep: u8) -> &mut [u8];

    /// Sets the number of bytes the next IN transaction on `ep` sends
    fn set_tx_len(&mut self, ep: u8, len: u8);

    /// Reads the control register of `ep`
    fn endpoint(&self, ep: u8) -> Control;

    /// Writes the control register of `ep`
    fn set_endpoint(&mut self, ep: u8, control: Control);

    /// Writes the device address register
    fn set_address(&mut self, address: u8);

    /// Connects (`true`) or detaches (`false`) the D+ pull-up
    fn set_pull_up(&mut self, connected: bool);

    /// Enables (`true`) or masks (`false`) the transfer, bus reset and suspend interrupts
    fn set_interrupts(&mut self, enabled: bool);

    /// Returns, and clears, the next pending event
    fn next_event(&mut self) -> Option<Event>;

    /// Clears every interrupt flag
    fn clear_events(&mut self);

    /// Enters the low power mode and blocks until one of the `wake` sources fires
    fn suspend(&mut self, wake: WakeSources) -> Wake;

    /// Busy waits for `ms` milliseconds
    fn delay_ms(&mut self, ms: u16);
}

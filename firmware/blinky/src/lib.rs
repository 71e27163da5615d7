//! LED blinker controlled over USB vendor requests
//!
//! The USB interrupt runs `Blinky` (through `usbd`); the main loop (`App`) blinks the LED and
//! executes the commands `Blinky` leaves behind.

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![cfg_attr(not(test), no_std)]

mod app;
pub mod seq;

use consts::{
    COMMAND_JUMP_TO_BOOTLOADER, COMMAND_READ_BLINK_TIME, COMMAND_SET_BLINK_SEQUENCE,
    COMMAND_SET_BLINK_TIME, COMMAND_TOGGLE_BLINK, SEQUENCE_LEN,
};
use heapless::Vec;
use usb::SetupPacket;
use usbd::{Descriptors, Reply, Vendor};

pub use crate::app::{App, Board, Poll};

include!(concat!(env!("OUT_DIR"), "/descs.rs"));

/// Blink half-period after reset, in milliseconds
pub const DEFAULT_BLINK_TIME: u16 = 250;
/// The other half-period `TOGGLE_BLINK` switches to
pub const FAST_BLINK_TIME: u16 = 100;

/// The device's descriptors
pub fn descriptors() -> Descriptors<'static> {
    Descriptors {
        device: &DEVICE_DESC,
        configuration: &CONFIG_DESC,
        strings: &STRINGS,
    }
}

/// `bConfigurationValue` of the only configuration
pub const fn configuration_value() -> u8 {
    CONFIG_VAL
}

/// Sequence opcodes, as uploaded by the host
pub type Sequence = Vec<u8, SEQUENCE_LEN>;

/// Work handed from the USB interrupt to the main loop
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Play a LED sequence
    Sequence(Sequence),
    /// Detach from the bus and reboot into the bootloader
    Bootloader,
}

/// Vendor command handler
///
/// NOTE commands are not queued: there's a single pending slot and the most recent command wins
pub struct Blinky {
    blink_time: u16,
    pending: Option<Command>,
    // bumped every time the main loop should drop what it's doing
    revision: u16,
    upload: Sequence,
}

impl Blinky {
    /// Handler in its power-on state
    pub const fn new() -> Self {
        Self {
            blink_time: DEFAULT_BLINK_TIME,
            pending: None,
            revision: 0,
            upload: Vec::new(),
        }
    }

    /// Current blink half-period, in milliseconds
    pub fn blink_time(&self) -> u16 {
        self.blink_time
    }

    /// Changes whenever a command interrupts the blinking or a sequence in progress
    pub fn revision(&self) -> u16 {
        self.revision
    }

    /// Takes the pending command, if any
    pub fn take_command(&mut self) -> Option<Command> {
        self.pending.take()
    }

    fn interrupt(&mut self) {
        self.revision = self.revision.wrapping_add(1);

        if let Some(command) = self.pending.take() {
            log::warn!("dropping unprocessed command {:?}", command);
        }
    }

    fn set_blink_time(&mut self, ms: u16) {
        self.interrupt();
        self.blink_time = ms;

        log::info!("blink time = {} ms", ms);
    }
}

impl Default for Blinky {
    fn default() -> Self {
        Self::new()
    }
}

impl Vendor for Blinky {
    fn setup(&mut self, request: &SetupPacket, buf: &mut [u8]) -> Reply {
        match request.bRequest {
            COMMAND_READ_BLINK_TIME => match buf.get_mut(..2) {
                Some(bytes) => {
                    bytes.copy_from_slice(&self.blink_time.to_le_bytes());
                    Reply::Ack(2)
                }
                None => Reply::Unsupported,
            },

            COMMAND_TOGGLE_BLINK => {
                let ms = if self.blink_time == DEFAULT_BLINK_TIME {
                    FAST_BLINK_TIME
                } else {
                    DEFAULT_BLINK_TIME
                };
                self.set_blink_time(ms);
                Reply::NoData
            }

            COMMAND_SET_BLINK_TIME => {
                self.set_blink_time(request.wValue);
                Reply::NoData
            }

            COMMAND_SET_BLINK_SEQUENCE => {
                // the opcodes arrive in the data stage
                self.interrupt();
                self.upload.clear();
                Reply::NoData
            }

            COMMAND_JUMP_TO_BOOTLOADER => {
                self.interrupt();
                log::info!("bootloader requested");
                self.pending = Some(Command::Bootloader);
                Reply::NoData
            }

            code => {
                log::warn!("unknown vendor request {:#04x}", code);
                Reply::Unsupported
            }
        }
    }

    fn data(&mut self, request: u8, data: &[u8]) {
        if request != COMMAND_SET_BLINK_SEQUENCE {
            return;
        }

        let room = self.upload.capacity() - self.upload.len();
        if data.len() > room {
            log::warn!("sequence truncated to {} opcodes", SEQUENCE_LEN);
        }
        let n = core::cmp::min(room, data.len());
        // NOTE can't fail; `n` fits in the remaining capacity
        let _ = self.upload.extend_from_slice(&data[..n]);

        log::debug!("sequence upload: {}B", self.upload.len());

        // the blinking pauses while the sequence plays
        self.blink_time = FAST_BLINK_TIME;
        self.revision = self.revision.wrapping_add(1);
        self.pending = Some(Command::Sequence(self.upload.clone()));
    }

    fn reset(&mut self) {
        self.upload.clear();
    }
}

//! Identifiers shared by the firmware and the host tooling

#![no_std]

/// USB Vendor ID
pub const VID: u16 = 0xFFFF;

/// USB Product ID
pub const PID: u16 = 0x001E;

/// Maximum packet size of the control endpoint
pub const MAX_PACKET_SIZE0: u8 = 32;

/// `bmRequestType`: host-to-device, vendor request, interface recipient
pub const TYPE_OUT_ITF: u8 = 0x41;

/// `bmRequestType`: device-to-host, vendor request, interface recipient
pub const TYPE_IN_ITF: u8 = TYPE_OUT_ITF | (1 << 7);

/// Reads the blink interval (2 bytes, little endian)
pub const COMMAND_READ_BLINK_TIME: u8 = 0xD0;

/// Toggles the blink interval between 250 ms and 100 ms
pub const COMMAND_TOGGLE_BLINK: u8 = 0xD1;

/// Sets the blink interval to `wValue` milliseconds
pub const COMMAND_SET_BLINK_TIME: u8 = 0xD3;

/// Uploads a blink sequence in the data stage
pub const COMMAND_SET_BLINK_SEQUENCE: u8 = 0xD4;

/// Re-enters the ROM bootloader
pub const COMMAND_JUMP_TO_BOOTLOADER: u8 = 0xB0;

/// Capacity of the blink sequence buffer
pub const SEQUENCE_LEN: usize = MAX_PACKET_SIZE0 as usize;

//! USB device types
//!
//! Wire representation of the standard descriptors and of the control transfer setup packet
//!
//! # References
//!
//! - Universal Serial Bus Specification Revision 1.1, chapter 9

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![no_std]

use core::convert::TryFrom;

pub mod configuration;
pub mod device;
pub mod ep;
pub mod iface;
pub mod string;

/// Transfer direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    /// Host-to-Device
    OUT = 0,

    /// Device-to-Host
    IN = 1,
}

/// Device state, as seen by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum State {
    /// Reset but not yet addressed
    Default,
    /// Addressed but not configured
    Address(u8),
    /// Configured
    Configured {
        /// Device address
        address: u8,
        /// Active configuration value
        value: u8,
    },
}

// see table 9-4 Standard Request Codes
/// Standard request code
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum bRequest {
    /// GET_STATUS
    GET_STATUS,
    /// CLEAR_FEATURE
    CLEAR_FEATURE,
    /// SET_FEATURE
    SET_FEATURE,
    /// SET_ADDRESS
    SET_ADDRESS,
    /// GET_DESCRIPTOR
    GET_DESCRIPTOR,
    /// SET_DESCRIPTOR
    SET_DESCRIPTOR,
    /// GET_CONFIGURATION
    GET_CONFIGURATION,
    /// SET_CONFIGURATION
    SET_CONFIGURATION,
    /// GET_INTERFACE
    GET_INTERFACE,
    /// SET_INTERFACE
    SET_INTERFACE,
    /// SYNCH_FRAME
    SYNCH_FRAME,
    /// Reserved code
    Reserved,
    /// Not a standard request code
    NonStandard(u8),
}

impl From<u8> for bRequest {
    fn from(byte: u8) -> Self {
        match byte {
            0 => bRequest::GET_STATUS,
            1 => bRequest::CLEAR_FEATURE,
            2 => bRequest::Reserved,
            3 => bRequest::SET_FEATURE,
            4 => bRequest::Reserved,
            5 => bRequest::SET_ADDRESS,
            6 => bRequest::GET_DESCRIPTOR,
            7 => bRequest::SET_DESCRIPTOR,
            8 => bRequest::GET_CONFIGURATION,
            9 => bRequest::SET_CONFIGURATION,
            10 => bRequest::GET_INTERFACE,
            11 => bRequest::SET_INTERFACE,
            12 => bRequest::SYNCH_FRAME,
            byte => bRequest::NonStandard(byte),
        }
    }
}

/// Descriptor type
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DescriptorType {
    /// Device descriptor
    DEVICE = 1,
    /// Configuration descriptor
    CONFIGURATION = 2,
    /// String descriptor
    STRING = 3,
    /// Interface descriptor
    INTERFACE = 4,
    /// Endpoint descriptor
    ENDPOINT = 5,
}

impl TryFrom<u8> for DescriptorType {
    type Error = ();
    fn try_from(byte: u8) -> Result<Self, ()> {
        Ok(match byte {
            1 => DescriptorType::DEVICE,
            2 => DescriptorType::CONFIGURATION,
            3 => DescriptorType::STRING,
            4 => DescriptorType::INTERFACE,
            5 => DescriptorType::ENDPOINT,
            _ => return Err(()),
        })
    }
}

/// Standard feature selectors
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Feature {
    /// ENDPOINT_HALT (endpoint recipient)
    EndpointHalt = 0,
    /// DEVICE_REMOTE_WAKEUP (device recipient)
    DeviceRemoteWakeup = 1,
}

impl TryFrom<u16> for Feature {
    type Error = ();
    fn try_from(word: u16) -> Result<Self, ()> {
        match word {
            0 => Ok(Feature::EndpointHalt),
            1 => Ok(Feature::DeviceRemoteWakeup),
            _ => Err(()),
        }
    }
}

/// `bmRequestType` bits 5..7
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RequestType {
    /// Standard request
    Standard,
    /// Class request
    Class,
    /// Vendor request
    Vendor,
    /// Reserved
    Reserved,
}

/// `bmRequestType` bits 0..5
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recipient {
    /// Device
    Device,
    /// Interface
    Interface,
    /// Endpoint
    Endpoint,
    /// Other or reserved
    Other,
}

/// The setup packet was not exactly 8 bytes long
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Malformed;

/// Control transfer setup packet
#[allow(non_snake_case)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetupPacket {
    /// Characteristics of the request
    pub bmRequestType: u8,
    /// Request code
    pub bRequest: u8,
    /// Request specific
    pub wValue: u16,
    /// Request specific; usually an interface or endpoint
    pub wIndex: u16,
    /// Number of bytes in the data stage
    pub wLength: u16,
}

impl SetupPacket {
    /// The size of a setup packet on the wire
    pub const SIZE: usize = 8;

    /// Parses the wire representation of a setup packet
    pub fn parse(bytes: &[u8]) -> Result<Self, Malformed> {
        if bytes.len() != Self::SIZE {
            return Err(Malformed);
        }

        Ok(Self {
            bmRequestType: bytes[0],
            bRequest: bytes[1],
            wValue: u16::from_le_bytes([bytes[2], bytes[3]]),
            wIndex: u16::from_le_bytes([bytes[4], bytes[5]]),
            wLength: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }

    /// Returns the wire representation of this packet
    pub fn bytes(&self) -> [u8; Self::SIZE] {
        [
            self.bmRequestType,
            self.bRequest,
            self.wValue as u8,
            (self.wValue >> 8) as u8,
            self.wIndex as u8,
            (self.wIndex >> 8) as u8,
            self.wLength as u8,
            (self.wLength >> 8) as u8,
        ]
    }

    /// Direction of the data stage
    pub fn direction(&self) -> Direction {
        if self.bmRequestType & (1 << 7) != 0 {
            Direction::IN
        } else {
            Direction::OUT
        }
    }

    /// Request type
    pub fn request_type(&self) -> RequestType {
        match (self.bmRequestType >> 5) & 0b11 {
            0 => RequestType::Standard,
            1 => RequestType::Class,
            2 => RequestType::Vendor,
            _ => RequestType::Reserved,
        }
    }

    /// Recipient of the request
    pub fn recipient(&self) -> Recipient {
        match self.bmRequestType & 0b1_1111 {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            _ => Recipient::Other,
        }
    }

    /// High byte of `wValue`
    pub fn value_high(&self) -> u8 {
        (self.wValue >> 8) as u8
    }

    /// Low byte of `wValue`
    pub fn value_low(&self) -> u8 {
        self.wValue as u8
    }
}

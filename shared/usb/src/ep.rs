//! Endpoints

use crate::{DescriptorType, Direction};

/// Highest data endpoint number the hardware provides
pub const MAX_NUMBER: u8 = 4;

/// Endpoint Descriptor
#[allow(non_snake_case)]
#[derive(Clone, Copy)]
pub struct Desc {
    // pub bLength: u8,
    // pub bDescriptorType: u8,
    /// Endpoint address
    pub bEndpointAddress: Address,
    /// Attributes
    pub bmAttributes: bmAttributes,
    /// Maximum packet size; must be less than `1 << 11`
    pub wMaxPacketSize: u16,
    /// Polling interval
    pub bInterval: u8,
}

impl Desc {
    /// The size of this descriptor on the wire
    pub const SIZE: u8 = 7;

    /// Returns the wire representation of this descriptor
    pub fn bytes(&self) -> [u8; Self::SIZE as usize] {
        let word = self.wMaxPacketSize & ((1 << 11) - 1);
        [
            Self::SIZE,
            DescriptorType::ENDPOINT as u8,
            self.bEndpointAddress.byte(),
            self.bmAttributes.byte(),
            word as u8,
            (word >> 8) as u8,
            self.bInterval,
        ]
    }
}

/// The endpoint number is outside `1..=MAX_NUMBER`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidNumber(pub u8);

/// Data endpoint address
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Address {
    number: u8,
    direction: Direction,
}

impl Address {
    /// Creates an endpoint address; only endpoints `1..=MAX_NUMBER` exist
    pub fn new(number: u8, direction: Direction) -> Result<Self, InvalidNumber> {
        if number == 0 || number > MAX_NUMBER {
            return Err(InvalidNumber(number));
        }

        Ok(Self { number, direction })
    }

    /// Parses a `bEndpointAddress` / `wIndex` byte
    pub fn from_byte(byte: u8) -> Result<Self, InvalidNumber> {
        // bits 4..7 are reserved
        if byte & 0b0111_0000 != 0 {
            return Err(InvalidNumber(byte & 0b1111));
        }

        let direction = if byte & (1 << 7) != 0 {
            Direction::IN
        } else {
            Direction::OUT
        };

        Self::new(byte & 0b1111, direction)
    }

    /// Endpoint number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Endpoint direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the wire representation of this address
    pub fn byte(&self) -> u8 {
        (self.number & 0b1111) | (self.direction as u8) << 7
    }
}

/// Endpoint attributes
#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
pub enum bmAttributes {
    /// Bulk endpoint
    Bulk,
    /// Control endpoint
    Control,
    /// Interrupt endpoint
    Interrupt,
    /// Isochronous endpoint
    Isochronous {
        /// Synchronization type
        synchronization_type: SynchronizationType,
        /// Usage type
        usage_type: UsageType,
    },
}

impl bmAttributes {
    fn byte(&self) -> u8 {
        match self {
            bmAttributes::Control => TransferType::Control as u8,
            bmAttributes::Bulk => TransferType::Bulk as u8,
            bmAttributes::Interrupt => TransferType::Interrupt as u8,
            bmAttributes::Isochronous {
                synchronization_type,
                usage_type,
            } => {
                TransferType::Isochronous as u8
                    | (*synchronization_type as u8) << 2
                    | (*usage_type as u8) << 4
            }
        }
    }
}

/// Endpoint transfer type
#[derive(Clone, Copy)]
pub enum TransferType {
    /// Control endpoint
    Control = 0b00,
    /// Isochronous endpoint
    Isochronous = 0b01,
    /// Bulk endpoint
    Bulk = 0b10,
    /// Interrupt endpoint
    Interrupt = 0b11,
}

/// Synchronization type
#[derive(Clone, Copy)]
pub enum SynchronizationType {
    /// No synchronization
    NoSynchronization = 0b00,
    /// Asynchronous
    Asynchronous = 0b01,
    /// Adaptive
    Adaptive = 0b10,
    /// Synchronous
    Synchronous = 0b11,
}

/// Usage type
#[derive(Clone, Copy)]
pub enum UsageType {
    /// Data endpoint
    DataEndpoint = 0b00,
    /// Feedback endpoint
    FeedbackEndpoint = 0b01,
    /// Implicit feedback data endpoint
    ImplicitFeedbackDataEndpoint = 0b10,
}

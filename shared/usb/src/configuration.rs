//! Configuration descriptor and the descriptors nested under it

use core::num::NonZeroU8;

use crate::{ep, iface, DescriptorType};

/// `bmAttributes` bit 7; must always be set
pub const ATTR_DEFAULT: u8 = 1 << 7;
/// `bmAttributes` self-powered bit
pub const ATTR_SELF_POWERED: u8 = 1 << 6;
/// `bmAttributes` remote-wakeup bit
pub const ATTR_REMOTE_WAKEUP: u8 = 1 << 5;

/// Configuration Descriptor
#[allow(non_snake_case)]
#[derive(Clone, Copy)]
pub struct Desc {
    // pub blength: u8,
    // pub bDescriptorType: u8,
    // NOTE `wTotalLength` and `bNumInterfaces` are computed by `Tree`
    /// Value that selects this configuration in SET_CONFIGURATION
    pub bConfigurationValue: NonZeroU8,
    /// Configuration string index
    pub iConfiguration: u8,
    /// Attributes
    pub bmAttributes: bmAttributes,
    /// Maximum power consumption in units of 2 mA
    pub bMaxPower: u8,
}

impl Desc {
    /// The size of this descriptor on the wire
    pub const SIZE: u8 = 9;

    /// Returns the wire representation of this descriptor
    pub fn bytes(&self, total_length: u16, num_interfaces: u8) -> [u8; Self::SIZE as usize] {
        [
            Self::SIZE,
            DescriptorType::CONFIGURATION as u8,
            total_length as u8,
            (total_length >> 8) as u8,
            num_interfaces,
            self.bConfigurationValue.get(),
            self.iConfiguration,
            self.bmAttributes.byte(),
            self.bMaxPower,
        ]
    }
}

/// Configuration attributes
#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
pub struct bmAttributes {
    /// Device has a local power source
    pub self_powered: bool,
    /// Device supports remote wakeup
    pub remote_wakeup: bool,
}

impl bmAttributes {
    /// Returns the wire representation of the attributes
    pub fn byte(&self) -> u8 {
        ATTR_DEFAULT
            | if self.self_powered {
                ATTR_SELF_POWERED
            } else {
                0
            }
            | if self.remote_wakeup {
                ATTR_REMOTE_WAKEUP
            } else {
                0
            }
    }
}

/// Converts a current draw in milliamps into `bMaxPower` units
pub const fn max_power(milliamps: u16) -> u8 {
    let units = milliamps / 2;
    if units > 0xFF {
        0xFF
    } else {
        units as u8
    }
}

/// An interface and its endpoints
#[derive(Clone, Copy)]
pub struct Interface<'a> {
    /// Interface descriptor
    pub desc: iface::Desc,
    /// Endpoints that belong to this interface, in wire order
    pub endpoints: &'a [ep::Desc],
}

/// Serialization error
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Error {
    /// The output buffer can't hold the whole tree
    BufferTooSmall,
    /// The tree doesn't fit in `wTotalLength`
    TooLong,
}

/// A configuration descriptor followed by all its nested descriptors
///
/// `wTotalLength`, `bNumInterfaces` and `bNumEndpoints` are derived from the tree itself so they
/// always match the serialized data
#[derive(Clone, Copy)]
pub struct Tree<'a> {
    /// Configuration header
    pub config: Desc,
    /// Interfaces, in wire order
    pub interfaces: &'a [Interface<'a>],
}

impl Tree<'_> {
    /// Number of bytes `write` produces
    pub fn total_length(&self) -> usize {
        usize::from(Desc::SIZE)
            + self
                .interfaces
                .iter()
                .map(|iface| {
                    usize::from(iface::Desc::SIZE)
                        + iface.endpoints.len() * usize::from(ep::Desc::SIZE)
                })
                .sum::<usize>()
    }

    /// Serializes the tree into `buf` and returns the number of bytes written
    pub fn write(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let total = self.total_length();
        if total > usize::from(u16::max_value()) || self.interfaces.len() > 0xFF {
            return Err(Error::TooLong);
        }
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }

        let mut cursor = 0;
        let mut put = |bytes: &[u8]| {
            buf[cursor..cursor + bytes.len()].copy_from_slice(bytes);
            cursor += bytes.len();
        };

        put(&self.config.bytes(total as u16, self.interfaces.len() as u8));
        for iface in self.interfaces {
            if iface.endpoints.len() > 0xFF {
                return Err(Error::TooLong);
            }
            put(&iface.desc.bytes(iface.endpoints.len() as u8));
            for ep in iface.endpoints {
                put(&ep.bytes());
            }
        }

        debug_assert_eq!(cursor, total);
        Ok(total)
    }
}

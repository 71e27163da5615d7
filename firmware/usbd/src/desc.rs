//! Descriptor lookup

use core::convert::TryFrom;

use usb::{configuration, ep, DescriptorType};

use crate::Error;

/// The descriptors the device serves, already in their wire representation
#[derive(Clone, Copy)]
pub struct Descriptors<'a> {
    /// Device descriptor (18 bytes)
    pub device: &'a [u8],
    /// Configuration descriptor followed by its interface and endpoint descriptors
    pub configuration: &'a [u8],
    /// String descriptors; index 0 is the language ID list
    pub strings: &'a [&'a [u8]],
}

impl<'a> Descriptors<'a> {
    /// Returns the descriptor selected by GET_DESCRIPTOR's `wValue`
    ///
    /// The length of the returned slice is the natural length of the descriptor; for the
    /// configuration that includes every nested descriptor
    pub fn get(&self, ty: u8, index: u8) -> Result<&'a [u8], Error> {
        match DescriptorType::try_from(ty) {
            Ok(DescriptorType::DEVICE) => Ok(self.device),

            // there's a single configuration
            Ok(DescriptorType::CONFIGURATION) if index == 0 => Ok(self.configuration),

            Ok(DescriptorType::STRING) => self
                .strings
                .get(usize::from(index))
                .copied()
                .ok_or(Error::UnsupportedDescriptorIndex),

            _ => Err(Error::UnsupportedDescriptorIndex),
        }
    }

    /// Maximum packet size of endpoint 0
    pub fn max_packet_size0(&self) -> u8 {
        self.device.get(7).copied().unwrap_or(8)
    }

    /// `bConfigurationValue` of the configuration
    pub fn configuration_value(&self) -> u8 {
        self.configuration.get(5).copied().unwrap_or(0)
    }

    /// `bmAttributes` of the configuration
    pub fn attributes(&self) -> u8 {
        self.configuration
            .get(7)
            .copied()
            .unwrap_or(configuration::ATTR_DEFAULT)
    }

    /// Whether the configuration advertises remote wakeup
    pub fn remote_wakeup(&self) -> bool {
        self.attributes() & configuration::ATTR_REMOTE_WAKEUP != 0
    }

    /// Addresses of the data endpoints declared in the configuration
    pub fn endpoints(&self) -> Endpoints<'a> {
        Endpoints {
            bytes: self.configuration,
        }
    }

    /// Highest data endpoint number the configuration uses; 0 if it has none
    pub fn endpoint_count(&self) -> u8 {
        self.endpoints()
            .map(|address| address.number())
            .max()
            .unwrap_or(0)
    }

    /// Whether `address` is one of the data endpoints `1..=endpoint_count()`
    ///
    /// Both directions of every endpoint number in that range exist, even if the configuration
    /// only declares one of them
    pub fn has_endpoint(&self, address: ep::Address) -> bool {
        address.number() <= self.endpoint_count()
    }
}

/// Iterator over the endpoint descriptors nested in a configuration descriptor
pub struct Endpoints<'a> {
    bytes: &'a [u8],
}

impl Iterator for Endpoints<'_> {
    type Item = ep::Address;

    fn next(&mut self) -> Option<ep::Address> {
        loop {
            let len = usize::from(*self.bytes.first()?);
            if len < 2 || len > self.bytes.len() {
                // malformed table; stop walking it
                self.bytes = &[];
                return None;
            }

            let (desc, rest) = self.bytes.split_at(len);
            self.bytes = rest;

            if desc[1] == DescriptorType::ENDPOINT as u8 && len >= usize::from(ep::Desc::SIZE) {
                if let Ok(address) = ep::Address::from_byte(desc[2]) {
                    return Some(address);
                }
            }
        }
    }
}

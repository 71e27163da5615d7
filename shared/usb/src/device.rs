//! Device descriptor

use core::convert::TryFrom;

use crate::DescriptorType;

/// Standard Device Descriptor
#[allow(non_snake_case)]
#[derive(Clone, Copy)]
pub struct Desc {
    // pub blength: u8,
    // pub bDescriptorType: u8,
    /// USB specification release version
    pub bcdUSB: bcdUSB,
    /// Device class
    pub bDeviceClass: u8,
    /// Device subclass
    pub bDeviceSubClass: u8,
    /// Device protocol
    pub bDeviceProtocol: u8,
    /// Maximum packet size of endpoint 0
    pub bMaxPacketSize0: bMaxPacketSize0,
    /// Vendor ID
    pub idVendor: u16,
    /// Product ID
    pub idProduct: u16,
    /// Device release number
    pub bcdDevice: u16,
    /// Manufacturer string index
    pub iManufacturer: u8,
    /// Product string index
    pub iProduct: u8,
    /// Serial number string index
    pub iSerialNumber: u8,
    /// Number of configurations
    pub bNumConfigurations: u8,
}

/// USB specification release version
#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
pub enum bcdUSB {
    /// 1.1
    V11 = 0x0110,
    /// 2.0
    V20 = 0x0200,
}

/// Maximum packet size of endpoint 0
#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
pub enum bMaxPacketSize0 {
    /// 8 bytes
    B8 = 8,
    /// 16 bytes
    B16 = 16,
    /// 32 bytes
    B32 = 32,
    /// 64 bytes
    B64 = 64,
}

/// The byte count is not a valid endpoint 0 packet size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidPacketSize(pub u8);

impl TryFrom<u8> for bMaxPacketSize0 {
    type Error = InvalidPacketSize;

    fn try_from(size: u8) -> Result<Self, InvalidPacketSize> {
        Ok(match size {
            8 => bMaxPacketSize0::B8,
            16 => bMaxPacketSize0::B16,
            32 => bMaxPacketSize0::B32,
            64 => bMaxPacketSize0::B64,
            _ => return Err(InvalidPacketSize(size)),
        })
    }
}

impl Desc {
    /// The size of this descriptor on the wire
    pub const SIZE: u8 = 18;

    /// Returns the wire representation of this descriptor; multi-byte fields are little endian
    pub fn bytes(&self) -> [u8; Self::SIZE as usize] {
        let mut bytes = [0; Self::SIZE as usize];

        bytes[0] = Self::SIZE;
        bytes[1] = DescriptorType::DEVICE as u8;
        bytes[2..4].copy_from_slice(&(self.bcdUSB as u16).to_le_bytes());
        bytes[4..7].copy_from_slice(&[
            self.bDeviceClass,
            self.bDeviceSubClass,
            self.bDeviceProtocol,
        ]);
        bytes[7] = self.bMaxPacketSize0 as u8;
        for (chunk, word) in bytes[8..14]
            .chunks_mut(2)
            .zip(&[self.idVendor, self.idProduct, self.bcdDevice])
        {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes[14..].copy_from_slice(&[
            self.iManufacturer,
            self.iProduct,
            self.iSerialNumber,
            self.bNumConfigurations,
        ]);

        bytes
    }
}

#[cfg(test)]
mod tests {
    use core::convert::TryFrom;

    use super::{bMaxPacketSize0, bcdUSB, Desc, InvalidPacketSize};

    #[test]
    fn little_endian() {
        let desc = Desc {
            bcdUSB: bcdUSB::V20,
            bDeviceClass: 0xFF,
            bDeviceSubClass: 0,
            bDeviceProtocol: 0,
            bMaxPacketSize0: bMaxPacketSize0::B32,
            idVendor: 0xFFFF,
            idProduct: 0x001E,
            bcdDevice: 0x0000,
            iManufacturer: 1,
            iProduct: 2,
            iSerialNumber: 0,
            bNumConfigurations: 1,
        };

        assert_eq!(
            desc.bytes(),
            [
                18, 0x01, 0x00, 0x02, 0xFF, 0x00, 0x00, 32, 0xFF, 0xFF, 0x1E, 0x00, 0x00, 0x00,
                0x01, 0x02, 0x00, 0x01
            ]
        );
    }

    #[test]
    fn packet_sizes() {
        assert_eq!(bMaxPacketSize0::try_from(32).map(|size| size as u8), Ok(32));
        assert_eq!(
            bMaxPacketSize0::try_from(12).map(|size| size as u8),
            Err(InvalidPacketSize(12))
        );
    }
}

use std::{env, error::Error, fs, path::PathBuf};

use core::{convert::TryFrom, num::NonZeroU8};

use quote::quote;
use usb::{
    configuration::{self, bmAttributes, Interface, Tree},
    device::{self, bMaxPacketSize0},
    ep, iface, string, Direction,
};

const CONFIG_VAL: u8 = 1;
const MANUFACTURER: &str = "CH55x";
const PRODUCT: &str = "Blinky";

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let max_packet_size0 = bMaxPacketSize0::try_from(consts::MAX_PACKET_SIZE0)
        .map_err(|e| format!("MAX_PACKET_SIZE0 is not a valid endpoint 0 packet size: {:?}", e))?;

    let device_desc = device::Desc {
        bcdUSB: device::bcdUSB::V20,
        bDeviceClass: 0xFF,
        bDeviceSubClass: 0,
        bDeviceProtocol: 0,
        bMaxPacketSize0: max_packet_size0,
        idVendor: consts::VID,
        idProduct: consts::PID,
        bcdDevice: 0x00_00,
        iManufacturer: 1,
        iProduct: 2,
        iSerialNumber: 0,
        bNumConfigurations: 1,
    };

    let endpoints = [ep::Desc {
        bEndpointAddress: ep::Address::new(1, Direction::OUT).map_err(|e| format!("{:?}", e))?,
        bmAttributes: ep::bmAttributes::Bulk,
        wMaxPacketSize: 8,
        bInterval: 0,
    }];
    let interfaces = [Interface {
        desc: iface::Desc {
            bInterfaceNumber: 0,
            bAlternativeSetting: 0,
            bInterfaceClass: iface::CLASS_VENDOR,
            bInterfaceSubClass: 0,
            bInterfaceProtocol: 0,
            iInterface: 0,
        },
        endpoints: &endpoints,
    }];
    let tree = Tree {
        config: configuration::Desc {
            bConfigurationValue: NonZeroU8::new(CONFIG_VAL).ok_or("configuration value can't be 0")?,
            iConfiguration: 0,
            bmAttributes: bmAttributes {
                self_powered: false,
                remote_wakeup: false,
            },
            bMaxPower: configuration::max_power(120),
        },
        interfaces: &interfaces,
    };

    let mut cdb = vec![0; tree.total_length()];
    tree.write(&mut cdb).map_err(|e| format!("{:?}", e))?;
    let cdl = cdb.len();

    let ddb = device_desc.bytes();
    let ddl = ddb.len();

    let mut ldb = vec![0; 4];
    string::write_langids(&[string::LANGID_EN_US], &mut ldb).map_err(|e| format!("{:?}", e))?;
    let ldl = ldb.len();
    let mdb = string_desc(MANUFACTURER)?;
    let mdl = mdb.len();
    let pdb = string_desc(PRODUCT)?;
    let pdl = pdb.len();

    fs::write(
        out_dir.join("descs.rs"),
        quote!(
            const CONFIG_VAL: u8 = #CONFIG_VAL;
            static DEVICE_DESC: [u8; #ddl] = [#(#ddb,)*];
            static CONFIG_DESC: [u8; #cdl] = [#(#cdb,)*];
            static LANGIDS_DESC: [u8; #ldl] = [#(#ldb,)*];
            static MANUFACTURER_DESC: [u8; #mdl] = [#(#mdb,)*];
            static PRODUCT_DESC: [u8; #pdl] = [#(#pdb,)*];
            static STRINGS: [&[u8]; 3] = [&LANGIDS_DESC, &MANUFACTURER_DESC, &PRODUCT_DESC];
        )
        .to_string(),
    )?;

    Ok(())
}

fn string_desc(s: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut bytes = vec![0; string::encoded_len(s)];
    string::write(s, &mut bytes).map_err(|e| format!("{:?}", e))?;
    Ok(bytes)
}

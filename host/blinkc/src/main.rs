use core::time::Duration;
use std::convert::TryFrom;

use anyhow::{bail, ensure, format_err};
use log::{debug, info};
use rusb::{DeviceHandle, GlobalContext};
use structopt::StructOpt;

const TIMEOUT: Duration = Duration::from_secs(1);
const INTERFACE: u8 = 0;

// standard GET_DESCRIPTOR
const TYPE_IN_DEVICE: u8 = 0x80;
const GET_DESCRIPTOR: u8 = 6;
const DESC_DEVICE: u8 = 1;
const DESC_CONFIGURATION: u8 = 2;

/// Off, then on/off steps of decreasing and increasing length, forever
const DEMO_SEQUENCE: [u8; 29] = [
    0x04, // off 4 ticks
    0x16, 0x06, 0x15, 0x05, 0x14, 0x04, 0x13, 0x03, 0x12, 0x02, // slowing down
    0x11, 0x01, 0x11, 0x01, 0x11, 0x01, 0x11, 0x01, // fast
    0x12, 0x02, 0x13, 0x03, 0x14, 0x04, 0x15, 0x05, // speeding up
    0x80 | 1, // jump to offset 1
    0x00,
];

#[derive(StructOpt)]
enum Opts {
    /// Prints the current blink half-period
    Read,
    /// Toggles between the 250 ms and 100 ms half-periods
    Toggle,
    /// Sets the blink half-period
    Set {
        /// In milliseconds
        ms: u16,
    },
    /// Uploads a demo LED sequence
    Sequence,
    /// Reboots the device into its bootloader
    Bootloader,
    /// Dumps the device and configuration descriptors
    Config,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let opts = Opts::from_args();

    let mut dev = open()?;

    match opts {
        Opts::Read => {
            let mut buf = [0; consts::MAX_PACKET_SIZE0 as usize];
            let n = dev.read_control(
                consts::TYPE_IN_ITF,
                consts::COMMAND_READ_BLINK_TIME,
                0,
                0,
                &mut buf,
                TIMEOUT,
            )?;
            println!("{} ms", decode_blink_time(&buf[..n])?);
        }

        Opts::Toggle => command(&dev, consts::COMMAND_TOGGLE_BLINK, 0, &[])?,

        Opts::Set { ms } => command(&dev, consts::COMMAND_SET_BLINK_TIME, ms, &[])?,

        Opts::Sequence => {
            ensure!(
                DEMO_SEQUENCE.len() <= consts::SEQUENCE_LEN,
                "the sequence is longer than {} bytes",
                consts::SEQUENCE_LEN
            );
            command(&dev, consts::COMMAND_SET_BLINK_SEQUENCE, 0, &DEMO_SEQUENCE)?
        }

        Opts::Bootloader => {
            command(&dev, consts::COMMAND_JUMP_TO_BOOTLOADER, 0, &[])?;
            info!("the device is now detaching from the bus");
        }

        Opts::Config => {
            for &(name, ty) in &[("device", DESC_DEVICE), ("configuration", DESC_CONFIGURATION)] {
                let mut buf = [0; 255];
                let n = dev.read_control(
                    TYPE_IN_DEVICE,
                    GET_DESCRIPTOR,
                    u16::from(ty) << 8,
                    0,
                    &mut buf,
                    TIMEOUT,
                )?;
                println!("{} descriptor ({}B):", name, n);
                dump(&buf[..n]);
            }
        }
    }

    dev.release_interface(INTERFACE)?;

    Ok(())
}

fn open() -> Result<DeviceHandle<GlobalContext>, anyhow::Error> {
    let mut dev = rusb::open_device_with_vid_pid(consts::VID, consts::PID).ok_or_else(|| {
        format_err!(
            "device {:04x}:{:04x} not found or cannot be opened",
            consts::VID,
            consts::PID
        )
    })?;

    // not supported on every platform
    if dev.kernel_driver_active(INTERFACE).unwrap_or(false) {
        debug!("detaching kernel driver");
        dev.detach_kernel_driver(INTERFACE)?;
    }

    dev.set_active_configuration(1)?;
    dev.claim_interface(INTERFACE)?;
    debug!("claimed interface {}", INTERFACE);

    Ok(dev)
}

fn command(
    dev: &DeviceHandle<GlobalContext>,
    code: u8,
    value: u16,
    data: &[u8],
) -> Result<(), anyhow::Error> {
    let n = dev.write_control(consts::TYPE_OUT_ITF, code, value, 0, data, TIMEOUT)?;
    debug!("command {:#04x}: sent {}B", code, n);

    ensure!(
        n == data.len(),
        "short write: {} out of {} bytes",
        n,
        data.len()
    );

    Ok(())
}

fn decode_blink_time(bytes: &[u8]) -> Result<u16, anyhow::Error> {
    match <[u8; 2]>::try_from(bytes) {
        Ok(bytes) => Ok(u16::from_le_bytes(bytes)),
        Err(_) => bail!("expected 2 bytes, got {}", bytes.len()),
    }
}

fn dump(bytes: &[u8]) {
    for line in bytes.chunks(16) {
        let hex = line
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>();
        println!("  {}", hex.join(" "));
    }
}

#![allow(dead_code)]

use std::{collections::VecDeque, num::NonZeroU8};

use usb::{
    configuration::{self, Interface, Tree},
    device::{self, bMaxPacketSize0},
    ep, iface, string, Direction, SetupPacket,
};
use usbd::{Control, Controller, Descriptors, Event, Handshake, Port, Reply, Vendor, Wake, WakeSources};

pub const MAX_PACKET_SIZE0: usize = 8;

pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
}

/// In-memory stand-in for the USB peripheral
pub struct MockPort {
    pub buffers: Vec<Vec<u8>>,
    pub tx_len: [u8; 5],
    pub controls: [Control; 5],
    pub address: u8,
    pub pull_up: bool,
    pub interrupts: bool,
    pub events: VecDeque<Event>,
    pub cleared: usize,
    pub suspensions: Vec<WakeSources>,
    pub delays: Vec<u16>,
}

impl MockPort {
    pub fn new() -> Self {
        const OFF: Control = Control {
            tx: Handshake::Nak,
            rx: Handshake::Nak,
            tx_toggle: false,
            rx_toggle: false,
            auto_toggle: false,
        };

        let mut buffers = vec![vec![0; MAX_PACKET_SIZE0]];
        buffers.extend((1..5).map(|_| vec![0; 64]));

        Self {
            buffers,
            tx_len: [0xFF; 5],
            controls: [OFF; 5],
            address: 0xFF,
            pull_up: false,
            interrupts: false,
            events: VecDeque::new(),
            cleared: 0,
            suspensions: vec![],
            delays: vec![],
        }
    }

    /// The packet the next IN token on endpoint 0 would carry
    pub fn ep0_packet(&self) -> Vec<u8> {
        self.buffers[0][..usize::from(self.tx_len[0])].to_vec()
    }
}

impl Port for MockPort {
    fn buffer(&mut self, ep: u8) -> &mut [u8] {
        &mut self.buffers[usize::from(ep)]
    }

    fn set_tx_len(&mut self, ep: u8, len: u8) {
        self.tx_len[usize::from(ep)] = len;
    }

    fn endpoint(&self, ep: u8) -> Control {
        self.controls[usize::from(ep)]
    }

    fn set_endpoint(&mut self, ep: u8, control: Control) {
        self.controls[usize::from(ep)] = control;
    }

    fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    fn set_pull_up(&mut self, connected: bool) {
        self.pull_up = connected;
    }

    fn set_interrupts(&mut self, enabled: bool) {
        self.interrupts = enabled;
    }

    fn next_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    fn clear_events(&mut self) {
        self.events.clear();
        self.cleared += 1;
    }

    fn suspend(&mut self, wake: WakeSources) -> Wake {
        self.suspensions.push(wake);
        Wake::Usb
    }

    fn delay_ms(&mut self, ms: u16) {
        self.delays.push(ms);
    }
}

/// Vendor hook that records what it sees
///
/// - `0x01` answers `[0xAA, 0xBB, 0xCC]`
/// - `0x02` is accepted without data (and takes a data stage, if any)
/// - `0x03` claims a 64-byte answer
/// - anything else is rejected
#[derive(Default)]
pub struct Recorder {
    pub setups: Vec<SetupPacket>,
    pub data: Vec<(u8, Vec<u8>)>,
    pub resets: usize,
    pub ep_in: Vec<u8>,
    pub ep_out: Vec<(u8, Vec<u8>)>,
}

impl Vendor for Recorder {
    fn setup(&mut self, request: &SetupPacket, buf: &mut [u8]) -> Reply {
        self.setups.push(*request);

        match request.bRequest {
            0x01 => {
                buf[..3].copy_from_slice(&[0xAA, 0xBB, 0xCC]);
                Reply::Ack(3)
            }
            0x02 => Reply::NoData,
            0x03 => {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = i as u8;
                }
                Reply::Ack(64)
            }
            _ => Reply::Unsupported,
        }
    }

    fn data(&mut self, request: u8, data: &[u8]) {
        self.data.push((request, data.to_vec()));
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn endpoint_in(&mut self, ep: u8, buf: &mut [u8]) -> Option<usize> {
        self.ep_in.push(ep);
        buf[..2].copy_from_slice(b"hi");
        Some(2)
    }

    fn endpoint_out(&mut self, ep: u8, data: &[u8]) {
        self.ep_out.push((ep, data.to_vec()));
    }
}

pub const PRODUCT: &str = "Cool_board";

/// Descriptor tables: EP0 of 8 bytes, one vendor interface with bulk EP1 OUT and EP1 IN
pub fn descriptors(remote_wakeup: bool) -> Descriptors<'static> {
    let device = device::Desc {
        bcdUSB: device::bcdUSB::V20,
        bDeviceClass: 0xFF,
        bDeviceSubClass: 0,
        bDeviceProtocol: 0,
        bMaxPacketSize0: bMaxPacketSize0::B8,
        idVendor: 0xFFFF,
        idProduct: 0xC551,
        bcdDevice: 0x0000,
        iManufacturer: 1,
        iProduct: 2,
        iSerialNumber: 0,
        bNumConfigurations: 1,
    };

    let bulk = |number, direction| ep::Desc {
        bEndpointAddress: ep::Address::new(number, direction).unwrap(),
        bmAttributes: ep::bmAttributes::Bulk,
        wMaxPacketSize: 64,
        bInterval: 0,
    };
    let endpoints = [bulk(1, Direction::OUT), bulk(1, Direction::IN)];
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
            bConfigurationValue: NonZeroU8::new(1).unwrap(),
            iConfiguration: 0,
            bmAttributes: configuration::bmAttributes {
                self_powered: false,
                remote_wakeup,
            },
            bMaxPower: configuration::max_power(100),
        },
        interfaces: &interfaces,
    };
    let mut config = vec![0; tree.total_length()];
    tree.write(&mut config).unwrap();

    let mut langids = vec![0; 4];
    string::write_langids(&[string::LANGID_EN_US], &mut langids).unwrap();
    let mut vendor = vec![0; string::encoded_len("CH55x")];
    string::write("CH55x", &mut vendor).unwrap();
    let mut product = vec![0; string::encoded_len(PRODUCT)];
    string::write(PRODUCT, &mut product).unwrap();

    let strings: Vec<&'static [u8]> = vec![leak(langids), leak(vendor), leak(product)];

    Descriptors {
        device: leak(device.bytes().to_vec()),
        configuration: leak(config),
        strings: Box::leak(strings.into_boxed_slice()),
    }
}

fn leak(bytes: Vec<u8>) -> &'static [u8] {
    Box::leak(bytes.into_boxed_slice())
}

pub type Usb<V> = Controller<'static, MockPort, V>;

pub fn controller(remote_wakeup: bool) -> Usb<Recorder> {
    init_logger();

    let mut usb = Controller::new(MockPort::new(), descriptors(remote_wakeup), Recorder::default());
    usb.init();
    usb
}

/// The device stalled the transfer
#[derive(Debug, PartialEq)]
pub struct Stalled;

fn stalled<V: Vendor>(usb: &Usb<V>) -> bool {
    let control = usb.port().endpoint(0);
    control.tx == Handshake::Stall && control.rx == Handshake::Stall
}

/// Delivers a SETUP transaction
pub fn setup<V: Vendor>(usb: &mut Usb<V>, request: SetupPacket) -> Result<(), Stalled> {
    usb.port_mut().buffers[0][..8].copy_from_slice(&request.bytes());
    usb.handle(Event::Setup { len: 8 });

    if stalled(usb) {
        Err(Stalled)
    } else {
        Ok(())
    }
}

/// Runs the data stage of a control read, without the status stage
///
/// Returns each packet along with the data toggle it was sent with
pub fn data_in<V: Vendor>(usb: &mut Usb<V>, length: u16) -> Vec<(Vec<u8>, bool)> {
    let mut packets = vec![];
    let mut total = 0;
    loop {
        let control = usb.port().endpoint(0);
        assert_eq!(control.tx, Handshake::Ack, "IN token would be NAKed");

        let packet = usb.port().ep0_packet();
        assert!(packet.len() <= MAX_PACKET_SIZE0);
        usb.handle(Event::In { ep: 0 });

        total += packet.len();
        let short = packet.len() < MAX_PACKET_SIZE0;
        packets.push((packet, control.tx_toggle));

        if short || total >= usize::from(length) {
            break;
        }
    }
    packets
}

/// Complete control read transfer
pub fn control_in<V: Vendor>(usb: &mut Usb<V>, request: SetupPacket) -> Result<Vec<u8>, Stalled> {
    setup(usb, request)?;
    let data = data_in(usb, request.wLength)
        .into_iter()
        .flat_map(|(packet, _)| packet)
        .collect();
    // status stage
    usb.handle(Event::Out { ep: 0, len: 0 });
    Ok(data)
}

/// Complete control write transfer
pub fn control_out<V: Vendor>(
    usb: &mut Usb<V>,
    request: SetupPacket,
    data: &[u8],
) -> Result<(), Stalled> {
    setup(usb, request)?;
    for chunk in data.chunks(MAX_PACKET_SIZE0) {
        usb.port_mut().buffers[0][..chunk.len()].copy_from_slice(chunk);
        usb.handle(Event::Out {
            ep: 0,
            len: chunk.len() as u8,
        });
    }

    // status stage: the host reads a zero-length DATA1 packet
    let control = usb.port().endpoint(0);
    assert_eq!(control.tx, Handshake::Ack);
    assert!(control.tx_toggle);
    assert!(usb.port().ep0_packet().is_empty());
    usb.handle(Event::In { ep: 0 });
    Ok(())
}

pub fn request(bm_request_type: u8, b_request: u8, w_value: u16, w_index: u16, w_length: u16) -> SetupPacket {
    SetupPacket {
        bmRequestType: bm_request_type,
        bRequest: b_request,
        wValue: w_value,
        wIndex: w_index,
        wLength: w_length,
    }
}

pub fn get_descriptor(ty: u8, index: u8, length: u16) -> SetupPacket {
    request(0x80, 6, u16::from(ty) << 8 | u16::from(index), 0, length)
}

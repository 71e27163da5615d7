mod common;

use usbd::{Control, Controller, Event, Handshake, NoVendor, Port};

use common::{request, MockPort, Stalled};

#[test]
fn vendor_read() {
    let mut usb = common::controller(false);

    let bytes = common::control_in(&mut usb, request(0xC1, 0x01, 0x1234, 0x5678, 16)).unwrap();
    assert_eq!(bytes, [0xAA, 0xBB, 0xCC]);

    let setup = usb.vendor().setups[0];
    assert_eq!(setup.wValue, 0x1234);
    assert_eq!(setup.wIndex, 0x5678);
    assert_eq!(usb.port().endpoint(0), Control::EP0_IDLE);
}

#[test]
fn vendor_read_is_truncated_to_wlength() {
    let mut usb = common::controller(false);

    let bytes = common::control_in(&mut usb, request(0xC1, 0x01, 0, 0, 2)).unwrap();
    assert_eq!(bytes, [0xAA, 0xBB]);
}

#[test]
fn vendor_read_is_clamped_to_one_packet() {
    let mut usb = common::controller(false);

    let bytes = common::control_in(&mut usb, request(0xC1, 0x03, 0, 0, 64)).unwrap();
    assert_eq!(bytes, [0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn vendor_command_without_data() {
    let mut usb = common::controller(false);

    common::control_out(&mut usb, request(0x41, 0x02, 250, 0, 0), &[]).unwrap();
    assert_eq!(usb.vendor().setups.len(), 1);
    assert!(usb.vendor().data.is_empty());
}

#[test]
fn vendor_read_without_data() {
    let mut usb = common::controller(false);

    let bytes = common::control_in(&mut usb, request(0xC1, 0x02, 0, 0, 8)).unwrap();
    assert!(bytes.is_empty());
}

#[test]
fn vendor_write() {
    let mut usb = common::controller(false);

    let data = (0..12).collect::<Vec<u8>>();
    common::control_out(&mut usb, request(0x41, 0x02, 0, 0, 12), &data).unwrap();

    // one call per packet
    let received = &usb.vendor().data;
    assert_eq!(received.len(), 2);
    assert_eq!(received[0], (0x02, data[..8].to_vec()));
    assert_eq!(received[1], (0x02, data[8..].to_vec()));
    assert_eq!(usb.port().endpoint(0), Control::EP0_IDLE);
}

#[test]
fn vendor_write_data_toggles() {
    let mut usb = common::controller(false);

    common::setup(&mut usb, request(0x41, 0x02, 0, 0, 16)).unwrap();
    assert!(usb.port().endpoint(0).rx_toggle);

    usb.port_mut().buffers[0].copy_from_slice(&[1; 8]);
    usb.handle(Event::Out { ep: 0, len: 8 });
    let control = usb.port().endpoint(0);
    assert!(!control.rx_toggle);

    usb.handle(Event::Out { ep: 0, len: 8 });
    // acknowledged with a DATA1 zero-length packet
    let control = usb.port().endpoint(0);
    assert_eq!(control.tx, Handshake::Ack);
    assert!(control.tx_toggle);
    assert!(usb.port().ep0_packet().is_empty());
}

#[test]
fn unknown_vendor_request_stalls() {
    let mut usb = common::controller(false);

    assert_eq!(
        common::control_in(&mut usb, request(0xC1, 0x7F, 0, 0, 1)),
        Err(Stalled)
    );
    assert_eq!(usb.port().endpoint(0), Control::EP0_STALL);
    assert_eq!(usb.vendor().setups.len(), 1);
}

#[test]
fn no_vendor() {
    common::init_logger();
    let mut usb = Controller::new(MockPort::new(), common::descriptors(false), NoVendor);
    usb.init();

    assert_eq!(
        common::control_out(&mut usb, request(0x41, 0xD1, 0, 0, 0), &[]),
        Err(Stalled)
    );
    // standard requests are still served
    assert!(common::control_in(&mut usb, common::get_descriptor(1, 0, 18)).is_ok());
}

#[test]
fn data_endpoints() {
    let mut usb = common::controller(false);
    common::control_out(&mut usb, request(0x00, 9, 1, 0, 0), &[]).unwrap();

    usb.handle(Event::In { ep: 1 });
    assert_eq!(usb.vendor().ep_in, [1]);
    assert_eq!(usb.port().endpoint(1).tx, Handshake::Ack);
    assert_eq!(usb.port().tx_len[1], 2);

    usb.port_mut().buffers[1][..3].copy_from_slice(b"abc");
    usb.handle(Event::Out { ep: 1, len: 3 });
    assert_eq!(usb.vendor().ep_out, [(1, b"abc".to_vec())]);
}

//! Standard device requests

use core::convert::TryFrom;

use usb::{bRequest, ep, Direction, Feature, Recipient, SetupPacket};

use crate::{
    bus,
    port::{Handshake, Port},
    Descriptors, Enumeration, Error,
};

/// What a standard request handler has access to
pub(crate) struct Ctx<'c, 'a> {
    pub(crate) descs: &'c Descriptors<'a>,
    pub(crate) usb: &'c mut Enumeration,
    pub(crate) port: &'c mut dyn Port,
}

/// Where the data stage comes from
pub(crate) enum Response<'a> {
    /// A descriptor table
    Table(&'a [u8]),
    /// The first `n` bytes of the endpoint 0 buffer
    Buffer(u16),
    /// Nothing to send
    NoData,
}

type Handler = for<'c, 'a> fn(&mut Ctx<'c, 'a>, &SetupPacket) -> Result<Response<'a>, Error>;

// GET_INTERFACE, SET_INTERFACE, SET_DESCRIPTOR and SYNCH_FRAME are not implemented
static HANDLERS: [(bRequest, Handler); 7] = [
    (bRequest::GET_STATUS, get_status),
    (bRequest::CLEAR_FEATURE, clear_feature),
    (bRequest::SET_FEATURE, set_feature),
    (bRequest::SET_ADDRESS, set_address),
    (bRequest::GET_DESCRIPTOR, get_descriptor),
    (bRequest::GET_CONFIGURATION, get_configuration),
    (bRequest::SET_CONFIGURATION, set_configuration),
];

pub(crate) fn dispatch<'a>(cx: &mut Ctx<'_, 'a>, setup: &SetupPacket) -> Result<Response<'a>, Error> {
    let request = bRequest::from(setup.bRequest);
    let handler = HANDLERS
        .iter()
        .find(|(code, _)| *code == request)
        .map(|(_, handler)| *handler)
        .ok_or_else(|| {
            log::warn!("EP0SETUP: {:?} is not supported", request);
            Error::UnsupportedStandardRequest
        })?;

    handler(cx, setup)
}

fn get_status<'a>(cx: &mut Ctx<'_, 'a>, _: &SetupPacket) -> Result<Response<'a>, Error> {
    log::info!("GET_STATUS");

    // neither self-powered nor remote wakeup status is reported
    let buf = cx.port.buffer(0);
    let n = core::cmp::min(buf.len(), 2);
    buf[..n].iter_mut().for_each(|byte| *byte = 0);

    Ok(Response::Buffer(n as u16))
}

fn clear_feature<'a>(cx: &mut Ctx<'_, 'a>, setup: &SetupPacket) -> Result<Response<'a>, Error> {
    feature(cx, setup, false)
}

fn set_feature<'a>(cx: &mut Ctx<'_, 'a>, setup: &SetupPacket) -> Result<Response<'a>, Error> {
    feature(cx, setup, true)
}

fn feature<'a>(cx: &mut Ctx<'_, 'a>, setup: &SetupPacket, set: bool) -> Result<Response<'a>, Error> {
    let feature = Feature::try_from(setup.wValue).map_err(|_| {
        log::warn!("unknown feature selector {}", setup.wValue);
        Error::UnsupportedStandardRequest
    })?;

    log::info!(
        "{} {:?} {:#04x}",
        if set { "SET_FEATURE" } else { "CLEAR_FEATURE" },
        feature,
        setup.wIndex
    );

    match (setup.recipient(), feature) {
        (Recipient::Device, Feature::DeviceRemoteWakeup) => {
            if !cx.descs.remote_wakeup() {
                log::warn!("the configuration doesn't support remote wakeup");
                return Err(Error::UnsupportedStandardRequest);
            }

            cx.usb.remote_wakeup = set;
            Ok(Response::NoData)
        }

        (Recipient::Endpoint, Feature::EndpointHalt) => {
            let address = u8::try_from(setup.wIndex)
                .ok()
                .and_then(|byte| ep::Address::from_byte(byte).ok())
                .filter(|address| cx.descs.has_endpoint(*address))
                .ok_or_else(|| {
                    log::warn!(
                        "endpoint {:#04x} doesn't exist (endpoints 1..={})",
                        setup.wIndex,
                        cx.descs.endpoint_count()
                    );
                    Error::UnsupportedStandardRequest
                })?;

            halt(cx, address, set);
            Ok(Response::NoData)
        }

        _ => Err(Error::UnsupportedStandardRequest),
    }
}

/// Halts or resumes a data endpoint; the data toggle restarts at DATA0 either way
fn halt(cx: &mut Ctx<'_, '_>, address: ep::Address, halted: bool) {
    let n = address.number();
    let mut control = cx.port.endpoint(n);

    match address.direction() {
        Direction::IN => {
            control.tx = if halted {
                Handshake::Stall
            } else {
                Handshake::Nak
            };
            control.tx_toggle = false;
        }

        Direction::OUT => {
            control.rx = if halted {
                Handshake::Stall
            } else {
                Handshake::Ack
            };
            control.rx_toggle = false;
        }
    }

    cx.port.set_endpoint(n, control);
    cx.usb.halts.set(address, halted);
}

fn set_address<'a>(cx: &mut Ctx<'_, 'a>, setup: &SetupPacket) -> Result<Response<'a>, Error> {
    if setup.wValue > 127 {
        log::warn!("SET_ADDRESS {} is out of range", setup.wValue);
        return Err(Error::UnsupportedStandardRequest);
    }

    let address = setup.value_low();
    log::info!("SET_ADDRESS {}", address);

    // committed after the status stage
    cx.usb.pending_address = Some(address);

    Ok(Response::NoData)
}

fn get_descriptor<'a>(cx: &mut Ctx<'_, 'a>, setup: &SetupPacket) -> Result<Response<'a>, Error> {
    let (ty, index) = (setup.value_high(), setup.value_low());

    log::info!("GET_DESCRIPTOR [{}] {} {}", setup.wLength, ty, index);

    cx.descs.get(ty, index).map(Response::Table).map_err(|e| {
        log::warn!("requested descriptor ({}, {}) doesn't exist", ty, index);
        e
    })
}

fn get_configuration<'a>(cx: &mut Ctx<'_, 'a>, _: &SetupPacket) -> Result<Response<'a>, Error> {
    log::info!("GET_CONFIGURATION");

    let configuration = cx.usb.configuration;
    let buf = cx.port.buffer(0);
    if buf.is_empty() {
        return Err(Error::UnsupportedStandardRequest);
    }
    buf[0] = configuration;

    Ok(Response::Buffer(1))
}

fn set_configuration<'a>(cx: &mut Ctx<'_, 'a>, setup: &SetupPacket) -> Result<Response<'a>, Error> {
    let value = setup.value_low();

    log::info!("SET_CONFIGURATION {}", value);

    if setup.value_high() != 0 || (value != 0 && value != cx.descs.configuration_value()) {
        log::error!("requested configuration is not supported");
        return Err(Error::UnsupportedStandardRequest);
    }

    cx.usb.configuration = value;

    // (re)configuring restarts every data endpoint
    cx.usb.halts.clear_all();
    bus::arm_data_endpoints(cx.descs, cx.port);

    Ok(Response::NoData)
}

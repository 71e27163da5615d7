//! Endpoint 0 control transfer state machine

use core::cmp;

use usb::{Direction, RequestType, SetupPacket};

use crate::{
    port::{Control, Handshake, Port},
    standard::{self, Ctx, Response},
    vendor::{Reply, Vendor},
    Controller, Error,
};

/// Stage of the control transfer in progress
///
/// `Idle -> (SETUP) -> DataIn | DataOut | StatusIn -> .. -> Idle`; `Stalled` is only left on the
/// next SETUP (or a bus reset)
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Stage<'a> {
    Idle,
    /// Device-to-host data stage
    DataIn {
        /// Bytes not yet copied into the endpoint buffer
        rest: &'a [u8],
        /// Size of the packet currently armed
        last: u8,
    },
    /// Host-to-device data stage of a vendor request
    DataOut { request: u8, remaining: u16 },
    /// Waiting for the host to read the zero-length status packet
    StatusIn,
    /// Waiting for the host to send the zero-length status packet
    StatusOut,
    Stalled,
}

impl<'a, P, V> Controller<'a, P, V>
where
    P: Port,
    V: Vendor,
{
    pub(crate) fn setup(&mut self, len: u8) {
        // a SETUP aborts whatever transfer was in progress
        self.usb.pending_address = None;
        self.stage = Stage::Idle;

        if let Err(e) = self.setup_stage(len) {
            self.stall(e);
        }
    }

    fn setup_stage(&mut self, len: u8) -> Result<(), Error> {
        let setup = self
            .port
            .buffer(0)
            .get(..usize::from(len))
            .and_then(|bytes| SetupPacket::parse(bytes).ok())
            .ok_or(Error::MalformedSetupPacket)?;

        log::debug!(
            "EP0SETUP: {:02x} {:02x} {:04x} {:04x} {}",
            setup.bmRequestType,
            setup.bRequest,
            setup.wValue,
            setup.wIndex,
            setup.wLength
        );

        let vendor = setup.request_type() == RequestType::Vendor;
        let response = match setup.request_type() {
            RequestType::Vendor => match self.vendor.setup(&setup, self.port.buffer(0)) {
                Reply::Ack(n) => Response::Buffer(n),
                Reply::NoData => Response::NoData,
                Reply::Unsupported => return Err(Error::UnsupportedVendorRequest),
            },

            RequestType::Standard => {
                let mut cx = Ctx {
                    descs: &self.descs,
                    usb: &mut self.usb,
                    port: &mut self.port,
                };
                standard::dispatch(&mut cx, &setup)?
            }

            RequestType::Class | RequestType::Reserved => {
                log::warn!("EP0SETUP: class requests are not supported");
                return Err(Error::UnsupportedStandardRequest);
            }
        };

        match setup.direction() {
            Direction::IN => {
                let requested = usize::from(setup.wLength);
                match response {
                    Response::Table(bytes) => {
                        let n = cmp::min(requested, bytes.len());
                        self.start_data_in(&bytes[..n]);
                    }

                    Response::Buffer(n) => {
                        // the response lives in the endpoint buffer so it can't span packets
                        let n = cmp::min(
                            cmp::min(usize::from(n), requested),
                            usize::from(self.max_packet_size0),
                        );
                        self.arm_data_in(n as u8, &[]);
                    }

                    Response::NoData => self.arm_data_in(0, &[]),
                }
            }

            Direction::OUT if setup.wLength != 0 => {
                if !vendor {
                    log::warn!("EP0SETUP: unexpected data stage");
                    return Err(Error::UnsupportedStandardRequest);
                }

                self.port.set_tx_len(0, 0);
                self.stage = Stage::DataOut {
                    request: setup.bRequest,
                    remaining: setup.wLength,
                };
            }

            Direction::OUT => {
                // arm the zero-length status packet
                self.port.set_tx_len(0, 0);
                self.stage = Stage::StatusIn;
            }
        }

        self.port.set_endpoint(0, Control::EP0_ARMED);

        Ok(())
    }

    /// Copies the first packet of `data` into the endpoint buffer
    fn start_data_in(&mut self, data: &'a [u8]) {
        let (chunk, rest) = data.split_at(cmp::min(data.len(), usize::from(self.max_packet_size0)));
        self.port.buffer(0)[..chunk.len()].copy_from_slice(chunk);
        self.arm_data_in(chunk.len() as u8, rest);
    }

    fn arm_data_in(&mut self, len: u8, rest: &'a [u8]) {
        log::debug!("EPIN0: sending {}B of data", len);

        self.port.set_tx_len(0, len);
        self.stage = Stage::DataIn { rest, last: len };
    }

    pub(crate) fn ep0_in(&mut self) {
        match self.stage {
            Stage::DataIn { rest, last } => {
                if last < self.max_packet_size0 {
                    // a short (or zero-length) packet ends the data stage
                    log::debug!("EPIN0: data stage complete");

                    self.port.set_tx_len(0, 0);
                    let control = self.port.endpoint(0);
                    self.port.set_endpoint(
                        0,
                        Control {
                            tx: Handshake::Nak,
                            ..control
                        },
                    );
                    self.stage = Stage::StatusOut;
                } else {
                    // NOTE when `rest` is empty this arms the zero-length packet that terminates a
                    // data stage made of full packets
                    self.start_data_in(rest);

                    let control = self.port.endpoint(0);
                    self.port.set_endpoint(
                        0,
                        Control {
                            tx_toggle: !control.tx_toggle,
                            ..control
                        },
                    );
                }
            }

            Stage::StatusIn => {
                if let Some(address) = self.usb.pending_address.take() {
                    self.port.set_address(address);
                    self.usb.address = address;

                    log::info!("address {} is now active", address);
                }

                self.finish();
            }

            Stage::Stalled => log::debug!("EPIN0: IN transaction while stalled"),

            Stage::Idle | Stage::DataOut { .. } | Stage::StatusOut => {
                log::debug!("EPIN0: unexpected IN transaction in {:?}", self.stage);

                self.finish();
            }
        }
    }

    pub(crate) fn ep0_out(&mut self, len: u8) {
        match self.stage {
            Stage::DataOut { request, remaining } => {
                let buf = self.port.buffer(0);
                let n = cmp::min(usize::from(len), buf.len());
                self.vendor.data(request, &buf[..n]);

                let remaining = remaining.saturating_sub(n as u16);
                let control = self.port.endpoint(0);
                if remaining == 0 || len < self.max_packet_size0 {
                    // acknowledge with a zero-length DATA1 packet
                    self.port.set_tx_len(0, 0);
                    self.port.set_endpoint(
                        0,
                        Control {
                            tx: Handshake::Ack,
                            tx_toggle: true,
                            ..control
                        },
                    );
                    self.stage = Stage::StatusIn;
                } else {
                    self.port.set_endpoint(
                        0,
                        Control {
                            rx_toggle: !control.rx_toggle,
                            ..control
                        },
                    );
                    self.stage = Stage::DataOut { request, remaining };
                }
            }

            // the host may end a control read early
            Stage::DataIn { .. } | Stage::StatusOut => self.finish(),

            Stage::Stalled => log::debug!("EPOUT0: OUT transaction while stalled"),

            Stage::Idle | Stage::StatusIn => {
                log::debug!("EPOUT0: unexpected OUT transaction in {:?}", self.stage);

                self.finish();
            }
        }
    }

    /// Ends the control transfer and waits for the next SETUP
    fn finish(&mut self) {
        self.port.set_tx_len(0, 0);
        self.port.set_endpoint(0, Control::EP0_IDLE);
        self.stage = Stage::Idle;
    }

    /// Stalls both directions of endpoint 0 until the next SETUP
    pub(crate) fn stall(&mut self, error: Error) {
        log::warn!("EP0: stalled ({:?})", error);

        self.usb.pending_address = None;
        self.stage = Stage::Stalled;
        self.port.set_endpoint(0, Control::EP0_STALL);
    }
}

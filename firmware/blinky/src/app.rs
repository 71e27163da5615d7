use usbd::{Controller, Port, Shared};

use crate::{seq::Player, Blinky, Command};

/// Long delays are split in slices this long so a new command can cut them short
const SLICE_MS: u16 = 100;
/// Time given to the host to notice the device left the bus
const DETACH_MS: u16 = 100;

/// Board support the main loop needs
pub trait Board {
    /// Drives the LED
    fn set_led(&mut self, on: bool);

    /// Busy waits for `ms` milliseconds
    fn delay_ms(&mut self, ms: u16);

    /// Hands control over to the bootloader
    ///
    /// On hardware this doesn't return
    fn bootloader(&mut self);
}

/// Main loop
pub struct App<B> {
    board: B,
    led: bool,
}

/// What `App::poll` did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Poll {
    /// Blinked once (or played a sequence); call `poll` again
    Blinked,
    /// The device detached itself and jumped into the bootloader
    Bootloader,
}

impl<B> App<B>
where
    B: Board,
{
    /// Main loop with the LED initially off
    pub fn new(mut board: B) -> Self {
        board.set_led(false);
        Self { board, led: false }
    }

    /// The board
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Runs one iteration of the main loop: executes the pending command, if any, then waits one
    /// blink period and toggles the LED
    pub fn poll<P>(&mut self, usb: &Shared<Controller<'static, P, Blinky>>) -> Poll
    where
        P: Port,
    {
        let (command, blink_time, revision) = usb
            .lock(|usb| {
                let blinky = usb.vendor_mut();
                let command = blinky.take_command();
                (command, blinky.blink_time(), blinky.revision())
            })
            .unwrap_or((None, crate::DEFAULT_BLINK_TIME, 0));

        match command {
            Some(Command::Bootloader) => {
                log::info!("jumping to the bootloader");

                usb.lock(|usb| {
                    usb.detach();
                    usb.port_mut().delay_ms(DETACH_MS);
                });
                self.board.bootloader();
                return Poll::Bootloader;
            }

            Some(Command::Sequence(code)) => {
                self.play(usb, &code, revision);
                return Poll::Blinked;
            }

            None => {}
        }

        self.delay(usb, blink_time, revision);
        self.led = !self.led;
        self.board.set_led(self.led);

        Poll::Blinked
    }

    /// Plays `code` until it ends or another command arrives; the LED is left off
    fn play<P>(&mut self, usb: &Shared<Controller<'static, P, Blinky>>, code: &[u8], revision: u16)
    where
        P: Port,
    {
        log::debug!("playing a {}-opcode sequence", code.len());

        for step in Player::new(code) {
            if interrupted(usb, revision) {
                log::debug!("sequence interrupted");
                break;
            }

            self.board.set_led(step.led);
            self.delay(usb, step.duration_ms, revision);
        }

        self.led = false;
        self.board.set_led(false);
    }

    fn delay<P>(&mut self, usb: &Shared<Controller<'static, P, Blinky>>, ms: u16, revision: u16)
    where
        P: Port,
    {
        let mut left = ms;
        while left > SLICE_MS {
            self.board.delay_ms(SLICE_MS);
            if interrupted(usb, revision) {
                return;
            }
            left -= SLICE_MS;
        }

        if left != 0 {
            self.board.delay_ms(left);
        }
    }
}

fn interrupted<P>(usb: &Shared<Controller<'static, P, Blinky>>, revision: u16) -> bool
where
    P: Port,
{
    usb.lock(|usb| usb.vendor().revision() != revision).unwrap_or(false)
}

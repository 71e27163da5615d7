//! Endpoint halt bookkeeping

use usb::{ep, Direction};

/// Halt flag of every data endpoint
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Halts {
    // bit N = endpoint N
    in_: u8,
    out: u8,
}

impl Halts {
    /// No endpoint halted
    pub const fn new() -> Self {
        Self { in_: 0, out: 0 }
    }

    /// Whether `address` is halted
    pub fn is_halted(&self, address: ep::Address) -> bool {
        *self.mask(address.direction()) & (1 << address.number()) != 0
    }

    pub(crate) fn set(&mut self, address: ep::Address, halted: bool) {
        let bit = 1 << address.number();
        let mask = self.mask_mut(address.direction());
        if halted {
            *mask |= bit;
        } else {
            *mask &= !bit;
        }
    }

    pub(crate) fn clear_all(&mut self) {
        *self = Self::new();
    }

    fn mask(&self, direction: Direction) -> &u8 {
        match direction {
            Direction::IN => &self.in_,
            Direction::OUT => &self.out,
        }
    }

    fn mask_mut(&mut self, direction: Direction) -> &mut u8 {
        match direction {
            Direction::IN => &mut self.in_,
            Direction::OUT => &mut self.out,
        }
    }
}

//! LED sequence bytecode
//!
//! One opcode per byte:
//!
//! - `0x00`: end of the sequence
//! - `0b1xxn_nnnn`: jump to offset `n_nnnn`
//! - `0b0xxL_dddd`: set the LED to `L` then wait `dddd * 64` milliseconds

/// Delay unit of the wait opcodes, in milliseconds
pub const TICK_MS: u16 = 64;

const JUMP: u8 = 1 << 7;
const LED: u8 = 1 << 4;

/// A single LED state change
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// New LED state
    pub led: bool,
    /// How long to hold it
    pub duration_ms: u16,
}

/// Interpreter; yields the steps of a sequence in order
///
/// Sequences that jump backwards repeat forever. A run of jumps that never reaches a wait opcode
/// ends the sequence
pub struct Player<'a> {
    code: &'a [u8],
    pc: usize,
}

impl<'a> Player<'a> {
    /// Starts playing `code` from offset 0
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, pc: 0 }
    }
}

impl Iterator for Player<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let mut jumps = 0;
        loop {
            let op = *self.code.get(self.pc)?;
            self.pc += 1;

            if op == 0 {
                self.pc = self.code.len();
                return None;
            }

            if op & JUMP != 0 {
                jumps += 1;
                if jumps > self.code.len() {
                    log::warn!("sequence is stuck in a jump loop at offset {}", self.pc - 1);
                    self.pc = self.code.len();
                    return None;
                }

                self.pc = usize::from(op & 0x1F);
                continue;
            }

            return Some(Step {
                led: op & LED != 0,
                duration_ms: u16::from(op & 0xF) * TICK_MS,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Player, Step};

    fn step(led: bool, duration_ms: u16) -> Step {
        Step { led, duration_ms }
    }

    #[test]
    fn wait_opcodes() {
        let steps = Player::new(&[0x1F, 0x01, 0x10]).collect::<Vec<_>>();
        assert_eq!(steps, [step(true, 960), step(false, 64), step(true, 0)]);
    }

    #[test]
    fn ends_at_zero() {
        let steps = Player::new(&[0x14, 0x00, 0x14]).collect::<Vec<_>>();
        assert_eq!(steps, [step(true, 256)]);
    }

    #[test]
    fn jump_repeats() {
        let steps = Player::new(&[0x14, 0x04, 0x80]).take(5).collect::<Vec<_>>();
        assert_eq!(
            steps,
            [
                step(true, 256),
                step(false, 256),
                step(true, 256),
                step(false, 256),
                step(true, 256),
            ]
        );
    }

    #[test]
    fn jump_forward_and_out_of_bounds() {
        // skips the second opcode
        let steps = Player::new(&[0x82, 0x1F, 0x11]).collect::<Vec<_>>();
        assert_eq!(steps, [step(true, 64)]);

        // past the end
        assert_eq!(Player::new(&[0x9F]).count(), 0);
    }

    #[test]
    fn jump_loop_terminates() {
        let mut player = Player::new(&[0x81, 0x80]);
        assert_eq!(player.next(), None);
        assert_eq!(player.next(), None);
    }

    #[test]
    fn unused_bits_are_ignored() {
        // bits 5 and 6 of a wait opcode, bits 5 and 6 of a jump opcode
        let steps = Player::new(&[0x61, 0xE3, 0x00, 0x12]).collect::<Vec<_>>();
        assert_eq!(steps, [step(false, 64), step(true, 128)]);
    }
}

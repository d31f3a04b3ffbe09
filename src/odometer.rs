//! Mixed-radix counter driving the enumeration.
//!
//! One digit per binding, digit `i` ranging over `0..radices[i]`. The last
//! digit advances fastest, so the sequence matches nested loops with the
//! first-discovered binding outermost:
//!
//! ```text
//! radices [2, 3]:  [0,0] [0,1] [0,2] [1,0] [1,1] [1,2]
//! ```
//!
//! With no digits the odometer yields the empty combination exactly once.
//! After the last combination it stays exhausted.

/// Where the odometer is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OdometerState {
    /// Nothing yielded yet
    Fresh,
    /// `digits` holds the last combination yielded
    Running,
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct Odometer {
    radices: Vec<usize>,
    digits: Vec<usize>,
    state: OdometerState,
}

impl Odometer {
    /// Create an odometer over the given radices.
    ///
    /// A zero radix means an empty factor in the product: the odometer is
    /// exhausted before yielding anything.
    pub fn new(radices: Vec<usize>) -> Self {
        let state = if radices.contains(&0) {
            OdometerState::Exhausted
        } else {
            OdometerState::Fresh
        };
        Self {
            digits: vec![0; radices.len()],
            radices,
            state,
        }
    }

    pub fn radices(&self) -> &[usize] {
        &self.radices
    }

    /// Whether another combination can still be produced.
    pub fn has_more(&self) -> bool {
        match self.state {
            OdometerState::Fresh => true,
            OdometerState::Running => self
                .digits
                .iter()
                .zip(&self.radices)
                .any(|(digit, radix)| digit + 1 < *radix),
            OdometerState::Exhausted => false,
        }
    }

    /// Advance to the next combination and return it.
    pub fn next_combination(&mut self) -> Option<&[usize]> {
        match self.state {
            OdometerState::Fresh => {
                self.state = OdometerState::Running;
            }
            OdometerState::Running => {
                if !self.advance() {
                    self.state = OdometerState::Exhausted;
                    return None;
                }
            }
            OdometerState::Exhausted => return None,
        }
        Some(&self.digits)
    }

    /// Exhaust the odometer without yielding anything further.
    pub fn stop(&mut self) {
        self.state = OdometerState::Exhausted;
    }

    /// Increment like a multi-digit counter. Returns false on wrap-around.
    fn advance(&mut self) -> bool {
        let mut pos = self.digits.len();
        loop {
            if pos == 0 {
                return false;
            }
            pos -= 1;
            self.digits[pos] += 1;
            if self.digits[pos] < self.radices[pos] {
                return true;
            }
            self.digits[pos] = 0;
        }
    }

    /// Number of combinations not yet yielded, or `None` if it does not fit
    /// in a `u128`.
    pub fn remaining(&self) -> Option<u128> {
        match self.state {
            OdometerState::Exhausted => Some(0),
            OdometerState::Fresh => self
                .radices
                .iter()
                .try_fold(1u128, |acc, &radix| acc.checked_mul(radix as u128)),
            OdometerState::Running => {
                // Combinations after the current one: total - (ordinal + 1)
                let mut ordinal: u128 = 0;
                let mut total: u128 = 1;
                for (&digit, &radix) in self.digits.iter().zip(&self.radices) {
                    ordinal = ordinal
                        .checked_mul(radix as u128)?
                        .checked_add(digit as u128)?;
                    total = total.checked_mul(radix as u128)?;
                }
                Some(total - ordinal - 1)
            }
        }
    }
}

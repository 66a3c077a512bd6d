//! Bounded restart counter.

/// Counts automatic restarts since the last explicit reset.
///
/// Successful requests do not pay the budget back; only
/// [`reset`](RestartBudget::reset) does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartBudget {
    used: u32,
    ceiling: u32,
}

impl RestartBudget {
    pub fn new(ceiling: u32) -> Self {
        Self { used: 0, ceiling }
    }

    /// Take one restart if any are left.
    pub fn try_consume(&mut self) -> bool {
        if self.used < self.ceiling {
            self.used += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.ceiling
    }
}

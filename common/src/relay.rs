/// Minimum-hold-time guard for the relay output.
///
/// Mechanical relays dislike chatter. After every applied switch the guard
/// blocks further changes for a hold window; each blocked request burns one
/// tick of that window.
#[derive(Debug, Clone)]
pub struct RelayDebounce {
    hold_ticks: u32,
    wait_counter: u32,
    out: bool,
}

impl RelayDebounce {
    pub fn new(tick_seconds: f32, hold_seconds: f32) -> Self {
        Self {
            hold_ticks: (hold_seconds / tick_seconds) as u32,
            wait_counter: 0,
            out: false,
        }
    }

    /// Applies `desired` if the hold window has elapsed, otherwise keeps the
    /// previous output. Returns the state actually on the wire.
    pub fn set(&mut self, desired: bool) -> bool {
        if self.wait_counter == 0 {
            self.out = desired;
            self.wait_counter = self.hold_ticks;
        } else {
            self.wait_counter -= 1;
        }
        self.out
    }

    pub fn output(&self) -> bool {
        self.out
    }
}

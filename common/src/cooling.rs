//! Gate for speculative night-cooling runs.
//!
//! Warm air left in the collector after sunset is worth blowing out, but on
//! a sunny-but-cold day the collector keeps producing heat and cooling would
//! fight it. Instead of committing, the controller runs a bounded test and,
//! if the situation is unclear, rests before probing again. An evening test
//! drains the collector, so no re-test is needed afterwards.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoolingState {
    /// No restriction, a test may start.
    Open,
    /// Probationary cooling attempt in progress.
    Testing,
    /// Cooldown after a failed or uncertain test.
    Resting,
}

impl CoolingState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Testing => "TESTING",
            Self::Resting => "RESTING",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmartCooling {
    test_ticks: i64,
    rest_ticks: i64,
    state: CoolingState,
    /// Tick counter, incremented first on every `step`.
    time: i64,
    /// Tick at which the current state began, -1 before the first switch.
    switch: i64,
}

impl SmartCooling {
    pub fn new(tick_seconds: f32, test_seconds: f32, rest_seconds: f32) -> Self {
        Self {
            test_ticks: (test_seconds / tick_seconds) as i64,
            rest_ticks: (rest_seconds / tick_seconds) as i64,
            state: CoolingState::Open,
            time: -1,
            switch: -1,
        }
    }

    pub fn state(&self) -> CoolingState {
        self.state
    }

    /// Advances the tick counter, then applies at most one timed transition.
    pub fn step(&mut self) {
        self.time += 1;

        match self.state {
            CoolingState::Testing if self.time - self.switch == self.test_ticks => {
                self.state = CoolingState::Resting;
                self.switch = self.time;
            }
            CoolingState::Resting if self.time - self.switch == self.rest_ticks => {
                self.state = CoolingState::Open;
                self.switch = self.time;
            }
            _ => {}
        }
    }

    /// Begins a test in the current tick.
    ///
    /// Only legal while [`CoolingState::Open`]; the orchestrator must check
    /// the state first, anything else is a bug in the calling code.
    pub fn test(&mut self) {
        assert!(
            self.state == CoolingState::Open,
            "cooling test started while {}",
            self.state.as_str()
        );
        self.state = CoolingState::Testing;
        self.switch = self.time;
    }
}

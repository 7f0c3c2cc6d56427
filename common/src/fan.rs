use std::collections::VecDeque;

/// Moving-average smoother for fan duty-cycle requests.
///
/// Every request is remembered (capped at 100) so a burst of short spikes
/// ramps the fan instead of kicking it. A request above 100 is the escape
/// hatch: full speed right now, no averaging, but the capped value still
/// enters the history for later calls.
#[derive(Debug, Clone)]
pub struct FanSmoother {
    history: VecDeque<f32>,
    capacity: usize,
}

impl FanSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records `raw` and returns the duty cycle to apply, in [0, 100].
    pub fn set(&mut self, raw: f32) -> f32 {
        self.history.push_back(raw.min(100.0));
        if self.history.len() > self.capacity {
            self.history.pop_front();
        }

        if raw > 100.0 {
            100.0
        } else {
            self.history.iter().sum::<f32>() / self.history.len() as f32
        }
    }
}

//! Integer fractional-second clock

/// Counts media time in `unit`-ths of a second so that frame durations add
/// up exactly. Cutting subtracts the nominal target and keeps the residual,
/// so rounding never accumulates across segments.
#[derive(Debug, Clone)]
pub struct FracClock {
    unit: u64,
    target: u64,
    ticks: u64,
}

impl FracClock {
    pub fn new(unit: u64, target_secs: u64) -> Self {
        Self { unit, target: target_secs, ticks: 0 }
    }

    /// Ticks for `samples` PCM samples at `sample_rate` Hz
    pub fn ticks_for(&self, samples: u64, sample_rate: u32) -> u64 {
        samples * (self.unit / u64::from(sample_rate))
    }

    pub fn advance(&mut self, ticks: u64) {
        self.ticks += ticks;
    }

    pub fn reached(&self) -> bool {
        self.ticks / self.unit >= self.target
    }

    /// Whole seconds accumulated since the last cut
    pub fn seconds(&self) -> u64 {
        self.ticks / self.unit
    }

    /// Close the segment: returns its whole seconds and keeps the remainder
    pub fn cut(&mut self) -> u64 {
        self.ticks -= self.target * self.unit;
        self.target + self.ticks / self.unit
    }

    pub fn residual_ticks(&self) -> u64 {
        self.ticks
    }
}

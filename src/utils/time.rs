/// Frames further apart than this are treated as a stall (tab switch,
/// debugger pause) and do not advance the simulation.
pub const MAX_FRAME_GAP: f32 = 0.1;

/// What a frame timestamp means for the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStep {
    /// Advance by this many seconds.
    Advance(f32),
    /// The gap since the previous frame was too long; render only.
    Skip,
}

/// Frame timing driven by host timestamps in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_timestamp: Option<f64>,
    /// Seconds covered by the last accepted frame.
    pub delta: f32,
    /// Seconds of simulation advanced so far.
    pub elapsed: f32,
    pub frame_count: u64,
    pub skipped_frames: u64,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `timestamp_ms`. The first frame advances by zero.
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameStep {
        let dt = match self.last_timestamp.replace(timestamp_ms) {
            Some(previous) => ((timestamp_ms - previous) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.frame_count += 1;

        if dt > MAX_FRAME_GAP {
            self.skipped_frames += 1;
            return FrameStep::Skip;
        }
        self.delta = dt;
        self.elapsed += dt;
        FrameStep::Advance(dt)
    }

    /// Forgets the previous timestamp so the next frame starts fresh.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_gaps_are_skipped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1000.0), FrameStep::Advance(0.0));
        assert_eq!(clock.tick(1016.0), FrameStep::Advance(0.016));
        assert_eq!(clock.tick(1500.0), FrameStep::Skip);
        assert_eq!(clock.tick(1516.0), FrameStep::Advance(0.016));
        assert_eq!(clock.skipped_frames, 1);
    }
}

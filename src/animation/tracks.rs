use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How far the cursor scans linearly before falling back to a binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in, so steady
/// playback finds the next interval in O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For `CubicSpline` each keyframe stores `[in_tangent, value, out_tangent]`.
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn linear(times: Vec<f32>, values: Vec<T>) -> Self {
        Self::new(times, values, InterpolationMode::Linear)
    }

    /// Time of the last keyframe, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sample using a binary search. `None` for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        self.sample_at_frame(next_idx.saturating_sub(1), time)
    }

    /// Samples at `time`, starting the interval search at `cursor` and
    /// updating it.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        if len == 0 {
            return None;
        }
        if len == 1 {
            return self.value_at(0);
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found = if time >= t_curr {
            // forward: playback or fast-forward
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.times[len - 1] {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // backward: reverse playback or ping-pong
            (0..=MAX_SCAN_OFFSET.min(i))
                .map(|offset| i - offset)
                .find(|&idx| time >= self.times[idx])
        };

        let index = found.unwrap_or_else(|| {
            // large jump, e.g. a loop wrap
            self.times.partition_point(|&t| t <= time).saturating_sub(1)
        });
        cursor.last_index = index;

        self.sample_at_frame(index, time)
    }

    fn value_at(&self, index: usize) -> Option<T> {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values.get(index * 3 + 1).copied(),
            _ => self.values.get(index).copied(),
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> Option<T> {
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;
        let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                let v0 = self.value_at(index)?;
                let v1 = self.value_at(next_idx)?;
                Some(T::interpolate_linear(v0, v1, t))
            }
            InterpolationMode::CubicSpline => {
                let v0 = *self.values.get(index * 3 + 1)?;
                let out_tangent0 = *self.values.get(index * 3 + 2)?;
                let in_tangent1 = *self.values.get(next_idx * 3)?;
                let v1 = *self.values.get(next_idx * 3 + 1)?;
                Some(T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_matches_binary_search() {
        let track = KeyframeTrack::linear(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let mut cursor = KeyframeCursor::default();
        for step in 0..=50 {
            let time = step as f32 * 0.1;
            assert_eq!(track.sample_with_cursor(time, &mut cursor), track.sample(time));
        }
        // jump back to the start
        assert_eq!(track.sample_with_cursor(0.25, &mut cursor), Some(0.5));
        assert_eq!(cursor.last_index, 0);
    }

    #[test]
    fn empty_track_samples_nothing() {
        let track: KeyframeTrack<f32> = KeyframeTrack::linear(Vec::new(), Vec::new());
        assert_eq!(track.sample(1.0), None);
        assert_eq!(track.sample_with_cursor(1.0, &mut KeyframeCursor::default()), None);
    }

    #[test]
    fn step_holds_previous_value() {
        let track = KeyframeTrack::new(vec![0.0, 1.0], vec![3.0, 7.0], InterpolationMode::Step);
        assert_eq!(track.sample(0.99), Some(3.0));
        assert_eq!(track.sample(1.0), Some(7.0));
    }
}

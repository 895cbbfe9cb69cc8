//! # Slicing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{Signal, SignalError};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Signal {
    /// Cut the signal to the samples within `[start, end]`, both inclusive.
    pub fn slice_to_time(&self, start: f64, end: f64) -> Result<Signal, SignalError> {
        self.slice_to_time_bounded(start, end, true, true)
    }

    /// Cut the signal to the samples between `start` and `end`.
    ///
    /// `include_start` and `include_end` select whether samples lying exactly
    /// on the bounds are kept. Fails if `start > end` or if no sample remains.
    pub fn slice_to_time_bounded(
        &self,
        start: f64,
        end: f64,
        include_start: bool,
        include_end: bool,
    ) -> Result<Signal, SignalError> {
        if start > end {
            return Err(SignalError::SliceStartAfterEnd { start, end });
        }
        if start > self.last_time() || end < self.first_time() {
            return Err(SignalError::SliceOutOfRange { start, end });
        }

        let start_idx = self.time.iter().position(|&t| {
            if include_start {
                t >= start
            } else {
                t > start
            }
        });
        let end_idx = self.time.iter().rposition(|&t| {
            if include_end {
                t <= end
            } else {
                t < end
            }
        });

        match (start_idx, end_idx) {
            (Some(s), Some(e)) if s <= e => Ok(self.sliced(s, e + 1)),
            _ => Err(SignalError::EmptySlice),
        }
    }

    /// Cut the signal to the samples from index `start` up to `end`.
    ///
    /// Negative indices count from the end of the signal, as in Python. If
    /// `end` is `None` the slice runs to the last sample. By default the start
    /// index is included and the end index excluded, `include_start` and
    /// `include_end` change this.
    pub fn slice_to_index(
        &self,
        start: isize,
        end: Option<isize>,
        include_start: bool,
        include_end: bool,
    ) -> Result<Signal, SignalError> {
        let len = self.len() as isize;

        let resolve = |idx: isize| if idx < 0 { len + idx } else { idx };

        let mut from = resolve(start);
        let mut to = match end {
            Some(e) => resolve(e),
            None => len,
        };

        if !include_start {
            from += 1;
        }
        if include_end && end.is_some() {
            to += 1;
        }

        let from = from.max(0).min(len) as usize;
        let to = to.max(0).min(len) as usize;

        if from >= to {
            return Err(SignalError::EmptySlice);
        }

        Ok(self.sliced(from, to))
    }

    /// Keep the samples in `from..to`, which must be a non-empty range.
    fn sliced(&self, from: usize, to: usize) -> Signal {
        let time = self.time[from..to].to_vec();
        let values = self.values[from..to].to_vec();

        let description = format!(
            "sliced signal to chunk from {}{} to {}{}",
            time[0],
            self.units.time,
            time[time.len() - 1],
            self.units.time
        );

        self.derive(time, values, self.units.clone(), &description)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

//! # Interpolation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::lin_map;

use super::{round_all, Signal, SignalError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Available interpolation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    Linear,
}

impl Default for InterpolationMethod {
    fn default() -> Self {
        InterpolationMethod::Linear
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Signal {
    /// Linearly interpolate the signal onto a new time array.
    pub fn interpolate(&self, target: &[f64]) -> Result<Signal, SignalError> {
        self.interpolate_with(target, InterpolationMethod::Linear)
    }

    /// Interpolate the signal onto a new time array.
    ///
    /// The target must be non-empty, strictly increasing and lie within the
    /// signal's time range, no extrapolation is done.
    pub fn interpolate_with(
        &self,
        target: &[f64],
        method: InterpolationMethod,
    ) -> Result<Signal, SignalError> {
        self.check_interpolation_target(target)?;

        let values = match method {
            InterpolationMethod::Linear => target
                .iter()
                .map(|&t| self.interp_linear(t))
                .collect::<Vec<_>>(),
        };

        let description = format!(
            "performed interpolation with new time vector [{} , {} , ... , {}]",
            target[0],
            target.get(1).map_or_else(|| String::from("-"), |t| t.to_string()),
            target[target.len() - 1]
        );

        Ok(self.derive(
            round_all(target, self.precision),
            round_all(&values, self.precision),
            self.units.clone(),
            &description,
        ))
    }

    /// The interpolated value of the signal at time `t`.
    pub fn value(&self, t: f64) -> Result<f64, SignalError> {
        let interpolated = self.interpolate(&[t])?;

        Ok(interpolated.values[0])
    }

    fn check_interpolation_target(&self, target: &[f64]) -> Result<(), SignalError> {
        if target.is_empty() {
            return Err(SignalError::EmptyInterpolationTarget);
        }

        if target.windows(2).any(|w| !(w[1] - w[0] > 0.0)) {
            return Err(SignalError::NonMonotonicTarget);
        }

        for &t in [target[0], target[target.len() - 1]].iter() {
            if !(t >= self.first_time() && t <= self.last_time()) {
                return Err(SignalError::TimeOutOfRange {
                    t,
                    start: self.first_time(),
                    end: self.last_time(),
                });
            }
        }

        Ok(())
    }

    /// Linear interpolation at a time known to be within range.
    fn interp_linear(&self, t: f64) -> f64 {
        if self.len() == 1 {
            return self.values[0];
        }

        // Last sample at or before t, limited to the second last sample so
        // that t == last time still has a following sample
        let idx_pre = self
            .time
            .iter()
            .rposition(|&ti| ti <= t)
            .unwrap_or(0)
            .min(self.len() - 2);

        lin_map(
            (self.time[idx_pre], self.time[idx_pre + 1]),
            (self.values[idx_pre], self.values[idx_pre + 1]),
            t,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::SignalConfig;

    fn signal() -> Signal {
        Signal::new(
            &[0.0, 1.0, 2.0, 4.0],
            &[0.0, 10.0, 30.0, 10.0],
            SignalConfig::new("s"),
        )
        .unwrap()
    }

    #[test]
    fn test_interpolate() -> Result<(), SignalError> {
        let s = signal();
        let i = s.interpolate(&[0.0, 0.5, 1.5, 3.0, 4.0])?;

        assert_eq!(i.time(), &[0.0, 0.5, 1.5, 3.0, 4.0]);
        assert_eq!(i.values(), &[0.0, 5.0, 20.0, 20.0, 10.0]);
        assert_eq!(
            i.history().last().map(|h| h.description.as_str()),
            Some("performed interpolation with new time vector [0 , 0.5 , ... , 4]")
        );

        // Receiver untouched
        assert_eq!(s.time(), &[0.0, 1.0, 2.0, 4.0]);

        Ok(())
    }

    #[test]
    fn test_interpolate_at_first_sample_is_exact() -> Result<(), SignalError> {
        let s = Signal::new(&[0.3, 0.7], &[1.234567, 8.0], SignalConfig::new("s"))?;

        assert_eq!(s.interpolate(&[s.time()[0]])?.values()[0], s.values()[0]);

        Ok(())
    }

    #[test]
    fn test_interpolate_rejects_bad_targets() {
        let s = signal();

        assert_eq!(s.interpolate(&[]), Err(SignalError::EmptyInterpolationTarget));
        assert_eq!(s.interpolate(&[1.0, 1.0]), Err(SignalError::NonMonotonicTarget));
        assert_eq!(s.interpolate(&[2.0, 1.0]), Err(SignalError::NonMonotonicTarget));
        assert!(matches!(
            s.interpolate(&[-0.1, 1.0]),
            Err(SignalError::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            s.interpolate(&[1.0, 4.1]),
            Err(SignalError::TimeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_value() -> Result<(), SignalError> {
        let s = signal();

        assert_eq!(s.value(3.5)?, 15.0);
        assert_eq!(s.value(4.0)?, 10.0);
        assert!(s.value(5.0).is_err());

        Ok(())
    }
}

use crate::error::{Error, Result};
use crate::models::ProfileConfig;

/// Hour-of-day multiplier in [0, 1] applied to the base arrival rate.
///
/// Built from sparse hourly nodes by monotone piecewise-cubic (Fritsch -
/// Carlson) interpolation, so the curve passes through every node without
/// overshooting between them.
pub struct ArrivalProfile {
    hours: Vec<f64>,
    levels: Vec<f64>,
    slopes: Vec<f64>,
}

impl ArrivalProfile {
    pub fn new(hours: Vec<f64>, levels: Vec<f64>) -> Result<Self> {
        if hours.len() != levels.len() {
            return Err(Error::InvalidProfile(format!(
                "{} hours vs {} levels",
                hours.len(),
                levels.len()
            )));
        }
        if hours.len() < 2 {
            return Err(Error::InvalidProfile(
                "at least two nodes required".to_string(),
            ));
        }
        for pair in hours.windows(2) {
            if pair[1] <= pair[0] {
                return Err(Error::InvalidProfile(format!(
                    "hours must be strictly increasing ({} then {})",
                    pair[0], pair[1]
                )));
            }
        }
        if hours[0] < 0.0 || hours[hours.len() - 1] > 24.0 {
            return Err(Error::InvalidProfile(
                "hours must lie within [0, 24]".to_string(),
            ));
        }
        for level in &levels {
            if !(0.0..=1.0).contains(level) {
                return Err(Error::InvalidProfile(format!(
                    "level {} outside [0, 1]",
                    level
                )));
            }
        }
        let slopes = pchip_slopes(&hours, &levels);
        Ok(Self {
            hours,
            levels,
            slopes,
        })
    }

    /// Constant 1.0 around the clock.
    pub fn flat() -> Self {
        Self::new(vec![0.0, 24.0], vec![1.0, 1.0]).expect("flat profile nodes are valid")
    }

    /// Day curve with a morning peak around 10-11 and an afternoon peak
    /// around 15-16, quiet overnight.
    pub fn daily() -> Self {
        let hours = vec![
            0.0, 5.0, 7.0, 8.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 23.0, 24.0,
        ];
        let levels = vec![
            0.2, 0.2, 0.4, 0.6, 1.0, 1.0, 0.6, 0.4, 0.6, 1.0, 1.0, 0.4, 0.2, 0.2,
        ];
        Self::new(hours, levels).expect("built-in profile nodes are valid")
    }

    pub fn from_config(config: &ProfileConfig) -> Result<Self> {
        match config {
            ProfileConfig::Flat => Ok(Self::flat()),
            ProfileConfig::Daily => Ok(Self::daily()),
            ProfileConfig::Custom { hours, levels } => Self::new(hours.clone(), levels.clone()),
        }
    }

    /// Evaluates the interpolant at an hour of day. The argument wraps mod
    /// 24; output is clamped to [0, 1].
    pub fn multiplier(&self, hour: f64) -> f64 {
        let hour = hour.rem_euclid(24.0);
        let first = self.hours[0];
        let last = self.hours[self.hours.len() - 1];
        let x = hour.clamp(first, last);

        let idx = match self
            .hours
            .iter()
            .rposition(|node| *node <= x)
        {
            Some(idx) => idx.min(self.hours.len() - 2),
            None => 0,
        };

        let width = self.hours[idx + 1] - self.hours[idx];
        let t = (x - self.hours[idx]) / width;
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        let value = self.levels[idx] * h00
            + width * self.slopes[idx] * h10
            + self.levels[idx + 1] * h01
            + width * self.slopes[idx + 1] * h11;
        value.clamp(0.0, 1.0)
    }
}

/// Fritsch-Carlson slope limiter: zero slope at local extrema, a weighted
/// harmonic mean of the adjacent secants elsewhere, and one-sided endpoint
/// slopes clipped so the first and last segments stay monotone.
fn pchip_slopes(hours: &[f64], levels: &[f64]) -> Vec<f64> {
    let n = hours.len();
    let widths: Vec<f64> = hours.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let secants: Vec<f64> = levels
        .windows(2)
        .zip(&widths)
        .map(|(pair, width)| (pair[1] - pair[0]) / width)
        .collect();

    if n == 2 {
        return vec![secants[0], secants[0]];
    }

    let mut slopes = vec![0.0; n];
    for i in 1..n - 1 {
        let (prev, next) = (secants[i - 1], secants[i]);
        if prev * next <= 0.0 {
            slopes[i] = 0.0;
        } else {
            let w1 = 2.0 * widths[i] + widths[i - 1];
            let w2 = widths[i] + 2.0 * widths[i - 1];
            slopes[i] = (w1 + w2) / (w1 / prev + w2 / next);
        }
    }
    slopes[0] = endpoint_slope(widths[0], widths[1], secants[0], secants[1]);
    slopes[n - 1] = endpoint_slope(
        widths[n - 2],
        widths[n - 3],
        secants[n - 2],
        secants[n - 3],
    );
    slopes
}

fn endpoint_slope(w0: f64, w1: f64, d0: f64, d1: f64) -> f64 {
    let slope = ((2.0 * w0 + w1) * d0 - w0 * d1) / (w0 + w1);
    if slope * d0 <= 0.0 {
        0.0
    } else if d0 * d1 < 0.0 && slope.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        slope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_profile_is_one_everywhere() {
        let profile = ArrivalProfile::flat();
        for hour in [0.0, 3.5, 12.0, 23.9] {
            assert_eq!(profile.multiplier(hour), 1.0);
        }
    }

    #[test]
    fn daily_profile_passes_through_its_nodes() {
        let profile = ArrivalProfile::daily();
        assert!((profile.multiplier(0.0) - 0.2).abs() < 1e-9);
        assert!((profile.multiplier(10.0) - 1.0).abs() < 1e-9);
        assert!((profile.multiplier(12.0) - 0.6).abs() < 1e-9);
        assert!((profile.multiplier(16.0) - 1.0).abs() < 1e-9);
        assert!((profile.multiplier(24.0 - 1e-9) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn daily_profile_is_monotone_on_the_morning_ramp() {
        let profile = ArrivalProfile::daily();
        let mut previous = profile.multiplier(8.0);
        let mut hour = 8.1;
        while hour < 10.0 {
            let value = profile.multiplier(hour);
            assert!(value >= previous - 1e-12, "dip at hour {}", hour);
            previous = value;
            hour += 0.1;
        }
    }

    #[test]
    fn output_stays_within_unit_interval() {
        let profile = ArrivalProfile::daily();
        let mut hour = 0.0;
        while hour <= 24.0 {
            let value = profile.multiplier(hour);
            assert!((0.0..=1.0).contains(&value), "{} at hour {}", value, hour);
            hour += 0.05;
        }
    }

    #[test]
    fn hours_wrap_around_midnight() {
        let profile = ArrivalProfile::daily();
        assert_eq!(profile.multiplier(25.0), profile.multiplier(1.0));
        assert_eq!(profile.multiplier(-1.0), profile.multiplier(23.0));
    }

    #[test]
    fn custom_nodes_are_validated() {
        assert!(ArrivalProfile::new(vec![0.0], vec![1.0]).is_err());
        assert!(ArrivalProfile::new(vec![0.0, 24.0], vec![1.0]).is_err());
        assert!(ArrivalProfile::new(vec![5.0, 5.0], vec![0.5, 0.5]).is_err());
        assert!(ArrivalProfile::new(vec![0.0, 25.0], vec![0.5, 0.5]).is_err());
        assert!(ArrivalProfile::new(vec![0.0, 24.0], vec![0.5, 1.5]).is_err());
        assert!(ArrivalProfile::new(vec![0.0, 24.0], vec![0.5, 0.7]).is_ok());
    }

    #[test]
    fn two_node_profile_interpolates_linearly() {
        let profile = ArrivalProfile::new(vec![0.0, 24.0], vec![0.0, 1.0]).unwrap();
        assert!((profile.multiplier(12.0) - 0.5).abs() < 1e-9);
        assert!((profile.multiplier(6.0) - 0.25).abs() < 1e-9);
    }
}

use std::time::{Duration, Instant};

/// Easing curve applied to a [`Fade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    InOutCubic,
}

impl Easing {
    /// Maps linear progress `t` in `0.0..=1.0` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = -2.0 * t + 2.0;
                    1.0 - f * f * f / 2.0
                }
            }
        }
    }
}

/// An opacity interpolation from `from` to `to`, driven by whatever clock the caller has.
///
/// The fade never mutates anything by itself; the owner polls [`Fade::value_at`] and performs
/// its completion step once [`Fade::is_finished`] turns true.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
    easing: Easing,
}

impl Fade {
    pub fn new(from: f32, to: f32, started: Instant, duration: Duration) -> Self {
        Fade {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            started,
            duration,
            easing: Easing::default(),
        }
    }

    pub fn easing(self, easing: Easing) -> Self {
        Fade { easing, ..self }
    }

    /// Linear progress in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        let eased = self.easing.apply(self.progress(now));
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn in_out_cubic_hits_endpoints_and_midpoint() {
        assert_eq!(Easing::InOutCubic.apply(0.0), 0.0);
        assert_eq!(Easing::InOutCubic.apply(1.0), 1.0);
        assert!((Easing::InOutCubic.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn easing_clamps_out_of_range_progress() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(3.0), 1.0);
    }

    #[test]
    fn fade_out_reaches_zero_when_finished() {
        let start = Instant::now();
        let fade = Fade::new(1.0, 0.0, start, 300 * MS);

        assert_eq!(fade.value_at(start), 1.0);
        assert!(!fade.is_finished(start + 299 * MS));
        assert!(fade.is_finished(start + 300 * MS));
        assert_eq!(fade.value_at(start + 300 * MS), 0.0);
        assert_eq!(fade.value_at(start + 5000 * MS), 0.0);
    }

    #[test]
    fn fade_in_is_monotonic() {
        let start = Instant::now();
        let fade = Fade::new(0.0, 1.0, start, 300 * MS);
        let mut last = fade.value_at(start);
        for step in 1..=30 {
            let value = fade.value_at(start + step * 10 * MS);
            assert!(value >= last);
            last = value;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let start = Instant::now();
        let fade = Fade::new(0.3, 1.0, start, Duration::ZERO);
        assert!(fade.is_finished(start));
        assert_eq!(fade.value_at(start), 1.0);
    }

    #[test]
    fn clock_before_start_does_not_underflow() {
        let start = Instant::now() + 100 * MS;
        let fade = Fade::new(0.0, 1.0, start, 300 * MS).easing(Easing::Linear);
        assert_eq!(fade.value_at(Instant::now()), 0.0);
    }
}

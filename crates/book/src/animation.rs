//! Release animation: eases the pointer from where it was let go to the
//! edge the page settles on.

use std::time::{Duration, Instant};

use pagecurl_core::DVec2;

/// Where the curl mesh ends up when the animation completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationTarget {
    SetCurlToLeft,
    SetCurlToRight,
}

/// Smoothstep ease over `progress` in `[0, 1]`; 0 at the start, 1 at the end.
pub fn ease(progress: f64) -> f64 {
    let t = 1.0 - progress.clamp(0.0, 1.0);
    1.0 - t * t * t * (3.0 - 2.0 * t)
}

#[derive(Clone, Copy, Debug)]
pub struct CurlAnimation {
    source: DVec2,
    target: DVec2,
    start: Instant,
    duration: Duration,
    event: AnimationTarget,
}

impl CurlAnimation {
    pub fn new(
        source: DVec2,
        target: DVec2,
        event: AnimationTarget,
        start: Instant,
        duration: Duration,
    ) -> Self {
        Self {
            source,
            target,
            start,
            duration,
            event,
        }
    }

    #[inline]
    pub fn event(&self) -> AnimationTarget {
        self.event
    }

    #[inline]
    pub fn source(&self) -> DVec2 {
        self.source
    }

    #[inline]
    pub fn target(&self) -> DVec2 {
        self.target
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn position_at(&self, now: Instant) -> DVec2 {
        self.source + (self.target - self.source) * ease(self.progress(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_hits_endpoints() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        assert!((ease(0.5) - 0.75).abs() < 1e-12);
        assert_eq!(ease(-1.0), 0.0);
        assert_eq!(ease(2.0), 1.0);
    }

    #[test]
    fn ease_is_monotonic() {
        let mut prev = ease(0.0);
        for i in 1..=100 {
            let v = ease(i as f64 / 100.0);
            assert!(v > prev, "not increasing at step {i}");
            prev = v;
        }
    }

    #[test]
    fn position_moves_from_source_to_target() {
        let start = Instant::now();
        let dur = Duration::from_millis(100);
        let a = CurlAnimation::new(
            DVec2::new(0.5, 0.2),
            DVec2::new(-1.0, 0.2),
            AnimationTarget::SetCurlToLeft,
            start,
            dur,
        );
        assert_eq!(a.position_at(start), a.source());
        assert!(!a.is_finished(start));

        let mid = a.position_at(start + Duration::from_millis(30));
        assert!(mid.x < 0.5 && mid.x > -1.0);
        assert_eq!(mid.y, 0.2);

        let end = start + dur;
        assert!(a.is_finished(end));
        assert_eq!(a.position_at(end), a.target());
        assert_eq!(a.position_at(end + dur), a.target());
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let start = Instant::now();
        let a = CurlAnimation::new(
            DVec2::ZERO,
            DVec2::ONE,
            AnimationTarget::SetCurlToRight,
            start,
            Duration::ZERO,
        );
        assert!(a.is_finished(start));
        assert_eq!(a.position_at(start), DVec2::ONE);
    }
}

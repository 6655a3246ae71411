//! Time-based transitions
//!
//! A [`Transition`] maps elapsed time to progress in `[0, 1]`. The graph uses
//! that progress to blend a binding's previous value into its current one.
//!
//! [`CubicBezier`] precomputes its curve into a bucketed sample table at
//! construction so that evaluation is a lookup plus one linear blend:
//!
//! ```text
//! bucket round(x(t) * N) -> y(t)     for t = 1/N, 2/N, ... (N-1)/N
//! bucket 0 -> 0, bucket N -> 1       fixed endpoints
//! ```
//!
//! Forward sampling in `t` does not land uniformly in `x`, so some buckets
//! stay empty; evaluation walks outward to the nearest populated bucket on
//! each side.

use std::fmt;
use std::rc::Rc;

/// Default number of buckets in a bezier sample table
pub const DEFAULT_SAMPLE_COUNT: usize = 700;

/// Shared, immutable transition
pub type TransitionRef = Rc<dyn Transition>;

pub trait Transition {
    /// Total duration in milliseconds
    fn duration_ms(&self) -> f64;

    /// Eased value for a linear progress strictly inside `(0, 1)`
    fn ease(&self, progress: f64) -> f64;

    /// Eased progress after `elapsed_ms`.
    ///
    /// Exactly 0 at or before the start, exactly 1 at or after the end, and
    /// 1 for a zero or negative duration.
    fn progress(&self, elapsed_ms: f64) -> f64 {
        let duration = self.duration_ms();
        if duration <= 0.0 {
            return 1.0;
        }
        let linear = elapsed_ms / duration;
        if linear.is_nan() || linear <= 0.0 {
            0.0
        } else if linear >= 1.0 {
            1.0
        } else {
            self.ease(linear)
        }
    }

    /// Eased progress of a transition started at `start_ms`, observed at `now_ms`
    fn interpolate(&self, start_ms: f64, now_ms: f64) -> f64 {
        self.progress(now_ms - start_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cubic bezier
// ─────────────────────────────────────────────────────────────────────────────

/// Cubic bezier easing from (0,0) to (1,1) with control points (x1,y1), (x2,y2)
#[derive(Clone)]
pub struct CubicBezier {
    duration_ms: f64,
    control: [f64; 4],
    /// `samples[i]` is the eased value at `x = i / N`, if any sample landed there
    samples: Vec<Option<f64>>,
}

impl CubicBezier {
    pub fn new(duration_ms: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::with_samples(DEFAULT_SAMPLE_COUNT, duration_ms, x1, y1, x2, y2)
    }

    pub fn with_samples(
        sample_count: usize,
        duration_ms: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> Self {
        let n = sample_count.max(1);
        let mut samples = vec![None; n + 1];
        samples[0] = Some(0.0);
        samples[n] = Some(1.0);

        for k in 1..n {
            let t = k as f64 / n as f64;
            let x = eval_cubic(x1, x2, t);
            let y = eval_cubic(y1, y2, t);
            let bucket = (x * n as f64).round();
            if bucket >= 0.0 && bucket <= n as f64 {
                samples[bucket as usize] = Some(y);
            }
        }

        Self {
            duration_ms,
            control: [x1, y1, x2, y2],
            samples,
        }
    }

    /// Number of buckets `N`
    pub fn sample_count(&self) -> usize {
        self.samples.len() - 1
    }

    /// Control points `[x1, y1, x2, y2]`
    pub fn control_points(&self) -> [f64; 4] {
        self.control
    }

    /// Number of buckets holding a sample, endpoints included
    pub fn populated_buckets(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }
}

impl Transition for CubicBezier {
    fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn ease(&self, progress: f64) -> f64 {
        let n = self.sample_count();
        let x = progress.clamp(0.0, 1.0) * n as f64;

        let mut lo = (x.floor() as usize).min(n);
        let y_lo = loop {
            match self.samples[lo] {
                Some(y) => break y,
                // bucket 0 is always populated
                None => lo -= 1,
            }
        };

        let mut hi = (lo.max(x.floor() as usize) + 1).min(n);
        let y_hi = loop {
            match self.samples[hi] {
                Some(y) => break y,
                // bucket N is always populated
                None => hi += 1,
            }
        };

        if hi == lo {
            return y_lo;
        }
        (x - lo as f64) / (hi - lo) as f64 * (y_hi - y_lo) + y_lo
    }
}

impl fmt::Debug for CubicBezier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubicBezier")
            .field("duration_ms", &self.duration_ms)
            .field("control", &self.control)
            .field("sample_count", &self.sample_count())
            .finish()
    }
}

/// One axis of a cubic bezier anchored at 0 and 1
fn eval_cubic(p1: f64, p2: f64, t: f64) -> f64 {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    ((a * t + b) * t + c) * t
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

/// Standard ease curve, bezier (0.25, 0.1, 0.25, 1.0)
#[derive(Debug, Clone)]
pub struct Ease;

impl Ease {
    pub const CONTROL: [f64; 4] = [0.25, 0.1, 0.25, 1.0];

    #[allow(clippy::new_ret_no_self)]
    pub fn new(duration_ms: f64) -> CubicBezier {
        Self::with_samples(DEFAULT_SAMPLE_COUNT, duration_ms)
    }

    pub fn with_samples(sample_count: usize, duration_ms: f64) -> CubicBezier {
        let [x1, y1, x2, y2] = Self::CONTROL;
        CubicBezier::with_samples(sample_count, duration_ms, x1, y1, x2, y2)
    }
}

/// Constant-speed transition
#[derive(Debug, Clone, Copy)]
pub struct Linear {
    duration_ms: f64,
}

impl Linear {
    pub fn new(duration_ms: f64) -> Self {
        Self { duration_ms }
    }
}

impl Transition for Linear {
    fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn ease(&self, progress: f64) -> f64 {
        progress
    }
}

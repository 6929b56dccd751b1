//! Response curves used to reshape normalized noise heights.
//!
//! [`KeyframeCurve`] is a keyframe ramp over `(time, value)` pairs with
//! linear interpolation between keys and constant extrapolation beyond the
//! first and last key.

use serde::{Deserialize, Serialize};

use crate::core::Lerp;

/// A float to float lookup applied to the masked noise value.
pub trait ResponseCurve {
    fn evaluate(&self, t: f32) -> f32;
}

impl<F: Fn(f32) -> f32> ResponseCurve for F {
    fn evaluate(&self, t: f32) -> f32 {
        self(t)
    }
}

/// Identity curve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearCurve;

impl ResponseCurve for LinearCurve {
    fn evaluate(&self, t: f32) -> f32 {
        t
    }
}

/// Piecewise-linear keyframe curve.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeCurve {
    keys: Vec<(f32, f32)>,
}

impl KeyframeCurve {
    /// Create a curve from unsorted keys. Keys are sorted by time.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.retain(|k| k.0.is_finite() && k.1.is_finite());
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys }
    }

    /// Identity over [0, 1].
    pub fn linear() -> Self {
        Self::new(vec![(0.0, 0.0), (1.0, 1.0)])
    }

    /// A curve that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![(0.0, value)],
        }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for KeyframeCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl ResponseCurve for KeyframeCurve {
    /// Sample the curve. An empty curve evaluates to zero; NaN samples the
    /// first key.
    fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };
        if t.is_nan() || self.keys.len() == 1 || t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        // first key with time > t; guaranteed to exist and be > 0 here
        let upper = self.keys.iter().position(|k| k.0 > t).unwrap_or(self.keys.len() - 1);
        let (t_a, v_a) = self.keys[upper - 1];
        let (t_b, v_b) = self.keys[upper];
        let span = t_b - t_a;
        if span < 1e-6 {
            return v_a;
        }
        Lerp::lerp(&v_a, &v_b, (t - t_a) / span)
    }
}

impl Serialize for KeyframeCurve {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeyframeCurve {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<(f32, f32)>::deserialize(deserializer)?;
        Ok(Self::new(keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_linear_is_identity() {
        let curve = KeyframeCurve::linear();
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert!(approx_eq(curve.evaluate(t), t));
        }
        assert_eq!(LinearCurve.evaluate(0.37), 0.37);
    }

    #[test]
    fn test_empty_curve_is_zero() {
        let curve = KeyframeCurve::new(Vec::new());
        assert!(curve.is_empty());
        assert_eq!(curve.evaluate(0.5), 0.0);
    }

    #[test]
    fn test_constant_curve() {
        let curve = KeyframeCurve::constant(0.7);
        assert_eq!(curve.evaluate(-3.0), 0.7);
        assert_eq!(curve.evaluate(0.5), 0.7);
        assert_eq!(curve.evaluate(12.0), 0.7);
    }

    #[test]
    fn test_clamps_outside_keys() {
        let curve = KeyframeCurve::new(vec![(0.2, 1.0), (0.8, 3.0)]);
        assert_eq!(curve.evaluate(0.0), 1.0);
        assert_eq!(curve.evaluate(1.0), 3.0);
        assert!(approx_eq(curve.evaluate(0.5), 2.0));
    }

    #[test]
    fn test_unsorted_keys() {
        let curve = KeyframeCurve::new(vec![(1.0, 1.0), (0.0, 0.0), (0.5, 0.25)]);
        assert_eq!(curve.keys()[1], (0.5, 0.25));
        assert!(approx_eq(curve.evaluate(0.25), 0.125));
        assert!(approx_eq(curve.evaluate(0.75), 0.625));
    }

    #[test]
    fn test_nan_sample_uses_first_key() {
        assert_eq!(KeyframeCurve::constant(0.5).evaluate(f32::NAN), 0.5);
        assert_eq!(KeyframeCurve::linear().evaluate(f32::NAN), 0.0);
        assert_eq!(KeyframeCurve::new(Vec::new()).evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn test_closure_curve() {
        let square = |t: f32| t * t;
        assert_eq!(square.evaluate(0.5), 0.25);
    }

    #[test]
    fn test_serde_round_trip() {
        let curve = KeyframeCurve::new(vec![(0.0, 0.0), (0.5, 0.1), (1.0, 1.0)]);
        let json = serde_json::to_string(&curve).unwrap();
        assert_eq!(json, "[[0.0,0.0],[0.5,0.1],[1.0,1.0]]");
        let back: KeyframeCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, curve);
    }
}

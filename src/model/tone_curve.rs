//! The seven-point tone curve.
//!
//! Seven named control points sit at fixed input percentiles; only their
//! output values move. Edits keep the point set monotonic, either by
//! clamping the edited value against its neighbors or by linearly
//! redistributing the neighbors to make room. The curve itself is a
//! degree-2 B-spline sampled into a dense polyline.

use crate::core::params::{float_or, Params};
use indexmap::IndexMap;

/// Control point names, in input order.
pub const TONE_CURVE_KEYS: [&str; 7] = [
    "start",
    "shadows",
    "blacks",
    "mediums",
    "whites",
    "highlights",
    "end",
];

/// Fixed input percentiles of the seven control points.
pub const TONE_CURVE_INPUTS: [f64; 7] = [0.0, 10.0, 30.0, 50.0, 70.0, 90.0, 100.0];

/// Input coordinate the terminal control point is pushed out to when the
/// spline is built, so the curve does not overshoot near 100.
const TERMINAL_INPUT: f64 = 200.0;

const DEGREE: usize = 2;
const SAMPLES: usize = 100;

/// Output values of the seven control points, editable under a
/// monotonicity policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneCurveModel {
    values: [f64; 7],
}

impl Default for ToneCurveModel {
    fn default() -> Self {
        Self {
            values: TONE_CURVE_INPUTS,
        }
    }
}

impl ToneCurveModel {
    /// The identity curve: every output equals its input percentile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output values, in key order.
    pub fn values(&self) -> &[f64; 7] {
        &self.values
    }

    /// Output value of one control point.
    pub fn value(&self, key: &str) -> Option<f64> {
        TONE_CURVE_KEYS
            .iter()
            .position(|k| *k == key)
            .map(|i| self.values[i])
    }

    /// Set one control point's output value.
    ///
    /// When the new value fits between its neighbors it is accepted as is.
    /// When it would break monotonicity on the right: with `auto_scale`,
    /// the points to the right are linearly redistributed between the new
    /// value and the terminal value (rounded to whole percents) and the
    /// edited point keeps its old value; without, the edited point is
    /// clamped down to the minimum of its right neighbors. Left-side
    /// violations are handled symmetrically. An unknown key changes
    /// nothing.
    ///
    /// Returns the full updated mapping.
    pub fn set_value(&mut self, key: &str, value: f64, auto_scale: bool) -> IndexMap<String, f64> {
        let index = match TONE_CURVE_KEYS.iter().position(|k| *k == key) {
            Some(i) => i,
            None => return self.mapping(),
        };

        let left_ok = self.values[..index].iter().all(|v| *v <= value);
        let right_ok = self.values[index + 1..].iter().all(|v| value <= *v);

        if left_ok && right_ok {
            self.values[index] = value;
        } else if !right_ok {
            if auto_scale {
                let min = self.values[index..]
                    .iter()
                    .cloned()
                    .fold(f64::INFINITY, f64::min);
                let max = self.values[6];
                // redistribution target capped at the terminal value so
                // the rescaled points stay ordered
                let floor = value.min(max);
                for i in index + 1..7 {
                    let u = if max - min < f64::EPSILON {
                        1.0
                    } else {
                        (self.values[i] - min) / (max - min)
                    };
                    let rescaled = (floor * (1.0 - u) + u * max).round();
                    // rounding must not push a point below its left neighbor
                    self.values[i] = rescaled.max(self.values[i - 1]);
                }
            } else {
                self.values[index] = self.values[index + 1..]
                    .iter()
                    .cloned()
                    .fold(f64::INFINITY, f64::min);
            }
        } else if auto_scale {
            let min = self.values[0];
            let max = self.values[..index]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let ceil = value.max(min);
            for i in (0..index).rev() {
                let u = if max - min < f64::EPSILON {
                    0.0
                } else {
                    (self.values[i] - min) / (max - min)
                };
                let rescaled = (min * (1.0 - u) + u * ceil).round();
                self.values[i] = rescaled.min(self.values[i + 1]);
            }
        } else {
            self.values[index] = self.values[..index]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
        }

        self.mapping()
    }

    /// Replace all control values from a parameter map; missing keys keep
    /// their identity defaults.
    pub fn set_values(&mut self, params: &Params) {
        for (i, key) in TONE_CURVE_KEYS.iter().enumerate() {
            self.values[i] = float_or(params, key, TONE_CURVE_INPUTS[i]);
        }
    }

    /// Current control values as a parameter map.
    pub fn to_params(&self) -> Params {
        TONE_CURVE_KEYS
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.to_string(), (*v).into()))
            .collect()
    }

    fn mapping(&self) -> IndexMap<String, f64> {
        TONE_CURVE_KEYS
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    /// Sample the curve into a dense polyline of (input, output) pairs.
    ///
    /// The spline runs through the seven control points with the terminal
    /// input pushed to 200, so inputs in [0, 200] are covered. The
    /// polyline is derived fresh on every call.
    pub fn evaluate(&self) -> Vec<[f64; 2]> {
        let mut ctrl = [[0.0f64; 2]; 7];
        for i in 0..7 {
            ctrl[i] = [TONE_CURVE_INPUTS[i], self.values[i]];
        }
        ctrl[6][0] = TERMINAL_INPUT;

        let knots = clamped_uniform_knots(DEGREE, ctrl.len());
        (0..SAMPLES)
            .map(|s| {
                let u = s as f64 / (SAMPLES - 1) as f64;
                de_boor(&ctrl, &knots, DEGREE, u)
            })
            .collect()
    }

    /// Output value for one input, by linear interpolation over the
    /// sampled polyline. Inputs below the first sample clamp to it.
    pub fn interpolate(polyline: &[[f64; 2]], x: f64) -> f64 {
        match polyline.iter().position(|p| p[0] >= x) {
            Some(0) | None if polyline.is_empty() => x,
            Some(0) => polyline[0][1],
            Some(i) => {
                let [x0, y0] = polyline[i - 1];
                let [x1, y1] = polyline[i];
                if x1 - x0 <= f64::EPSILON {
                    y1
                } else {
                    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
                }
            }
            None => polyline[polyline.len() - 1][1],
        }
    }
}

/// Clamped uniform knot vector: degree+1 zeros, evenly spaced interior
/// knots, degree+1 ones.
fn clamped_uniform_knots(degree: usize, n_ctrl: usize) -> Vec<f64> {
    let interior = n_ctrl - degree - 1;
    let mut knots = vec![0.0; degree + 1];
    for i in 1..=interior {
        knots.push(i as f64 / (interior + 1) as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

/// De Boor's algorithm for one parameter value on a clamped B-spline.
fn de_boor(ctrl: &[[f64; 2]], knots: &[f64], degree: usize, u: f64) -> [f64; 2] {
    let n = ctrl.len();
    // knot span containing u
    let k = if u >= knots[n] {
        n - 1
    } else {
        knots[degree..n]
            .iter()
            .position(|t| u < *t)
            .map(|i| i + degree - 1)
            .unwrap_or(n - 1)
    };

    let mut d: Vec<[f64; 2]> = (0..=degree)
        .map(|j| ctrl[j + k - degree])
        .collect();
    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let i = j + k - degree;
            let denom = knots[i + degree + 1 - r] - knots[i];
            let alpha = if denom.abs() < f64::EPSILON {
                0.0
            } else {
                (u - knots[i]) / denom
            };
            d[j] = [
                (1.0 - alpha) * d[j - 1][0] + alpha * d[j][0],
                (1.0 - alpha) * d[j - 1][1] + alpha * d[j][1],
            ];
        }
    }
    d[degree]
}

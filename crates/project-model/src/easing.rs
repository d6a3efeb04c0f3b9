//! Easing curves for track interpolation.
//!
//! Every curve is normalized so `apply(0.0, d) == 0.0` and
//! `apply(1.0, d) == 1.0` for any segment duration `d > 0`. Springs are
//! solved analytically; the duration parameter only matters to them
//! (a spring's shape depends on how much wall time the segment spans).

use serde::{Deserialize, Serialize};

/// Easing curve applied across one animation segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier {
        p1x: f64,
        p1y: f64,
        p2x: f64,
        p2y: f64,
    },
    Spring {
        #[serde(rename = "dampingRatio")]
        damping_ratio: f64,
        response: f64,
    },
}

impl Easing {
    /// Apply the curve at progress `t ∈ [0, 1]` over a segment of
    /// `duration` seconds. The result is clamped into `[0, 1]`.
    pub fn apply(&self, t: f64, duration: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let value = match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::CubicBezier { p1x, p1y, p2x, p2y } => bezier_value(t, *p1x, *p1y, *p2x, *p2y),
            Self::Spring {
                damping_ratio,
                response,
            } => spring_value(t, duration, *damping_ratio, *response),
        };
        value.clamp(0.0, 1.0)
    }

    /// Analytical derivative d(apply)/dt at progress `t`.
    ///
    /// Used by consumers to derive motion-blur intensity and velocity
    /// continuity across segment seams.
    pub fn derivative(&self, t: f64, duration: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => 1.0,
            Self::EaseIn => 2.0 * t,
            Self::EaseOut => 2.0 - 2.0 * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t
                } else {
                    4.0 - 4.0 * t
                }
            }
            Self::CubicBezier { p1x, p1y, p2x, p2y } => {
                bezier_derivative(t, *p1x, *p1y, *p2x, *p2y)
            }
            Self::Spring {
                damping_ratio,
                response,
            } => spring_derivative(t, duration, *damping_ratio, *response),
        }
    }

    // Presets

    /// Critically damped spring: fastest response with no overshoot.
    pub fn spring_critical() -> Self {
        Self::Spring {
            damping_ratio: 1.0,
            response: 0.55,
        }
    }

    /// Gentler critically damped spring for longer pans.
    pub fn spring_smooth() -> Self {
        Self::Spring {
            damping_ratio: 1.0,
            response: 0.85,
        }
    }

    /// Slightly underdamped spring for zoom-in emphasis.
    pub fn spring_snappy() -> Self {
        Self::Spring {
            damping_ratio: 0.9,
            response: 0.5,
        }
    }

    pub fn is_spring(&self) -> bool {
        matches!(self, Self::Spring { .. })
    }
}

/// Raw spring step response at `elapsed` seconds, settling toward 1.0.
///
/// `omega0 = 2π / response`, the SwiftUI-style parameterization. All three
/// damping regimes are solved exactly.
fn spring_raw(elapsed: f64, damping_ratio: f64, response: f64) -> f64 {
    let omega0 = 2.0 * std::f64::consts::PI / response.max(0.01);
    let zeta = damping_ratio.max(0.05);
    let u = elapsed.max(0.0);

    if (zeta - 1.0).abs() < 1e-6 {
        // Critically damped
        let decay = (-omega0 * u).exp();
        1.0 - (1.0 + omega0 * u) * decay
    } else if zeta < 1.0 {
        // Underdamped: oscillatory approach
        let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
        let decay = (-zeta * omega0 * u).exp();
        1.0 - decay * ((omega_d * u).cos() + (zeta * omega0 / omega_d) * (omega_d * u).sin())
    } else {
        // Overdamped: hyperbolic decay, no oscillation
        let omega_d = omega0 * (zeta * zeta - 1.0).sqrt();
        let decay = (-zeta * omega0 * u).exp();
        1.0 - decay * ((omega_d * u).cosh() + (zeta * omega0 / omega_d) * (omega_d * u).sinh())
    }
}

/// Raw spring velocity (d/du of [`spring_raw`]).
fn spring_raw_derivative(elapsed: f64, damping_ratio: f64, response: f64) -> f64 {
    let omega0 = 2.0 * std::f64::consts::PI / response.max(0.01);
    let zeta = damping_ratio.max(0.05);
    let u = elapsed.max(0.0);

    if (zeta - 1.0).abs() < 1e-6 {
        let decay = (-omega0 * u).exp();
        omega0 * omega0 * u * decay
    } else if zeta < 1.0 {
        let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
        let decay = (-zeta * omega0 * u).exp();
        decay * (omega0 * omega0 / omega_d) * (omega_d * u).sin()
    } else {
        let omega_d = omega0 * (zeta * zeta - 1.0).sqrt();
        let decay = (-zeta * omega0 * u).exp();
        decay * (omega0 * omega0 / omega_d) * (omega_d * u).sinh()
    }
}

/// Unit-normalized spring value: the raw response rescaled so the curve
/// lands exactly on 1.0 at `t = 1` regardless of duration and tuning.
fn spring_value(t: f64, duration: f64, damping_ratio: f64, response: f64) -> f64 {
    let d = duration.max(1e-3);
    let settle = spring_raw(d, damping_ratio, response);
    if settle.abs() < 1e-9 {
        return t;
    }
    spring_raw(t * d, damping_ratio, response) / settle
}

fn spring_derivative(t: f64, duration: f64, damping_ratio: f64, response: f64) -> f64 {
    let d = duration.max(1e-3);
    let settle = spring_raw(d, damping_ratio, response);
    if settle.abs() < 1e-9 {
        return 1.0;
    }
    spring_raw_derivative(t * d, damping_ratio, response) * d / settle
}

// Cubic Bézier helpers. The curve maps progress through control points
// (0,0), (p1x,p1y), (p2x,p2y), (1,1); we invert the x polynomial with
// Newton-Raphson to evaluate y at a given time fraction.

fn bezier_axis(s: f64, c1: f64, c2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * c1 + 3.0 * ms * s * s * c2 + s * s * s
}

fn bezier_axis_derivative(s: f64, c1: f64, c2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * c1 + 6.0 * ms * s * (c2 - c1) + 3.0 * s * s * (1.0 - c2)
}

fn solve_bezier_parameter(t: f64, p1x: f64, p2x: f64) -> f64 {
    const EPSILON: f64 = 1e-4;
    let mut s = t;
    for _ in 0..10 {
        let diff = bezier_axis(s, p1x, p2x) - t;
        if diff.abs() < EPSILON {
            break;
        }
        let slope = bezier_axis_derivative(s, p1x, p2x);
        if slope.abs() < EPSILON {
            break;
        }
        s -= diff / slope;
    }
    s.clamp(0.0, 1.0)
}

fn bezier_value(t: f64, p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> f64 {
    let s = solve_bezier_parameter(t, p1x, p2x);
    bezier_axis(s, p1y, p2y)
}

fn bezier_derivative(t: f64, p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> f64 {
    let s = solve_bezier_parameter(t, p1x, p2x);
    let dy = bezier_axis_derivative(s, p1y, p2y);
    let dx = bezier_axis_derivative(s, p1x, p2x);
    if dx.abs() < 1e-4 {
        return 1.0;
    }
    dy / dx
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATIONS: [f64; 3] = [0.1, 1.0, 4.0];

    fn all_curves() -> Vec<Easing> {
        vec![
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::CubicBezier {
                p1x: 0.42,
                p1y: 0.0,
                p2x: 0.58,
                p2y: 1.0,
            },
            Easing::spring_critical(),
            Easing::spring_smooth(),
            Easing::spring_snappy(),
            Easing::Spring {
                damping_ratio: 0.6,
                response: 1.2,
            },
        ]
    }

    #[test]
    fn test_endpoints_pinned_for_every_curve_and_duration() {
        for curve in all_curves() {
            for d in DURATIONS {
                assert!(
                    curve.apply(0.0, d).abs() < 1e-9,
                    "{curve:?} apply(0, {d}) != 0"
                );
                assert!(
                    (curve.apply(1.0, d) - 1.0).abs() < 1e-9,
                    "{curve:?} apply(1, {d}) != 1"
                );
            }
        }
    }

    #[test]
    fn test_output_stays_in_unit_range() {
        for curve in all_curves() {
            for d in DURATIONS {
                for i in 0..=100 {
                    let v = curve.apply(i as f64 / 100.0, d);
                    assert!((0.0..=1.0).contains(&v), "{curve:?} escaped [0,1]: {v}");
                }
            }
        }
    }

    #[test]
    fn test_critically_damped_spring_is_monotone() {
        let spring = Easing::Spring {
            damping_ratio: 1.0,
            response: 0.6,
        };
        for d in DURATIONS {
            let mut prev = 0.0;
            for i in 1..=200 {
                let v = spring.apply(i as f64 / 200.0, d);
                assert!(v + 1e-12 >= prev, "non-monotone at step {i} (d={d})");
                prev = v;
            }
        }
    }

    #[test]
    fn test_quadratic_midpoints() {
        assert!((Easing::EaseIn.apply(0.5, 1.0) - 0.25).abs() < 1e-9);
        assert!((Easing::EaseOut.apply(0.5, 1.0) - 0.75).abs() < 1e-9);
        assert!((Easing::EaseInOut.apply(0.5, 1.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_bezier_matches_linear_when_on_diagonal() {
        let curve = Easing::CubicBezier {
            p1x: 1.0 / 3.0,
            p1y: 1.0 / 3.0,
            p2x: 2.0 / 3.0,
            p2y: 2.0 / 3.0,
        };
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((curve.apply(t, 1.0) - t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_spring_derivative_is_nonnegative_when_critical() {
        let spring = Easing::spring_critical();
        for i in 0..=100 {
            let v = spring.derivative(i as f64 / 100.0, 0.8);
            assert!(v >= -1e-9);
        }
    }

    #[test]
    fn test_linear_derivative() {
        assert!((Easing::Linear.derivative(0.3, 2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_serde_roundtrip() {
        for curve in all_curves() {
            let json = serde_json::to_string(&curve).unwrap();
            let decoded: Easing = serde_json::from_str(&json).unwrap();
            assert_eq!(curve, decoded);
        }
    }
}

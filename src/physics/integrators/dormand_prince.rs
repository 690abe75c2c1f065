//! Dormand–Prince 5(4) adaptive integration
//!
//! An embedded Runge–Kutta pair: each step produces a fifth-order solution,
//! which is propagated, and a fourth-order companion whose difference from it
//! estimates the local error. The step size shrinks or grows to keep that
//! estimate within the requested tolerances.
//!
//! # Algorithm
//!
//! ```text
//! k1 = f(t, y)                       (reused from the previous step: FSAL)
//! k_i = f(t + c_i h, y + h Σ a_ij k_j),  i = 2..6
//! y_new = y + h Σ b_i k_i
//! k7 = f(t + h, y_new)
//! err = h Σ e_i k_i
//! ```
//!
//! The error is measured as the RMS of `err / (atol + rtol * max(|y|, |y_new|))`.
//! A step is accepted when that norm is at most 1. The next step is scaled by
//! `0.9 * norm^(-1/5)`, clamped to `[0.2, 10]`, and never grown right after a
//! rejection.

use super::{Integrator, StateDerivative, all_finite};
use crate::config::IntegratorConfig;
use crate::error::IntegrationFailure;
use crate::physics::math::Scalar;

const C: [Scalar; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [[Scalar; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];

const B: [Scalar; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

/// Difference between the fifth- and fourth-order weights, including the FSAL stage
const E: [Scalar; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

const SAFETY: Scalar = 0.9;
const MIN_FACTOR: Scalar = 0.2;
const MAX_FACTOR: Scalar = 10.0;
const ERROR_EXPONENT: Scalar = -1.0 / 5.0;

/// Error control settings for [`DormandPrince`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub relative: Scalar,
    pub absolute: Scalar,
    /// Smallest allowed step as a fraction of the requested interval
    pub min_step_fraction: Scalar,
    /// Accepted plus rejected steps allowed in one `advance`
    pub max_steps: usize,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::from(&IntegratorConfig::default())
    }
}

impl From<&IntegratorConfig> for Tolerances {
    fn from(config: &IntegratorConfig) -> Self {
        Self {
            relative: config.relative_tolerance,
            absolute: config.absolute_tolerance,
            min_step_fraction: config.min_step_fraction,
            max_steps: config.max_steps,
        }
    }
}

/// Adaptive Dormand–Prince 5(4) integrator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DormandPrince {
    pub tolerances: Tolerances,
}

impl DormandPrince {
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    /// RMS of the error scaled component-wise by the mixed tolerance
    fn error_norm(&self, error: &[Scalar], y: &[Scalar], y_new: &[Scalar]) -> Scalar {
        if error.is_empty() {
            return 0.0;
        }

        let sum_of_squares: Scalar = error
            .iter()
            .zip(y.iter().zip(y_new))
            .map(|(e, (a, b))| {
                let scale = self.tolerances.absolute + self.tolerances.relative * a.abs().max(b.abs());
                let scaled = e / scale;
                scaled * scaled
            })
            .sum();

        libm::sqrt(sum_of_squares / error.len() as Scalar)
    }

    /// Starting step from Hairer, Nørsett & Wanner, "Solving ODEs I", II.4
    fn initial_step(
        &self,
        field: &dyn StateDerivative,
        y0: &[Scalar],
        f0: &[Scalar],
        interval: Scalar,
    ) -> Scalar {
        let scale: Vec<Scalar> = y0
            .iter()
            .map(|y| self.tolerances.absolute + self.tolerances.relative * y.abs())
            .collect();
        let rms = |values: &[Scalar]| -> Scalar {
            let sum: Scalar = values
                .iter()
                .zip(&scale)
                .map(|(v, s)| (v / s) * (v / s))
                .sum();
            libm::sqrt(sum / values.len() as Scalar)
        };

        let d0 = rms(y0);
        let d1 = rms(f0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(interval);

        let y1: Vec<Scalar> = y0.iter().zip(f0).map(|(y, f)| y + h0 * f).collect();
        let mut f1 = vec![0.0; y0.len()];
        field.evaluate(h0, &y1, &mut f1);

        let difference: Vec<Scalar> = f1.iter().zip(f0).map(|(a, b)| a - b).collect();
        let d2 = rms(&difference) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (1e-6 as Scalar).max(h0 * 1e-3)
        } else {
            libm::pow(0.01 / d1.max(d2), 1.0 / 5.0)
        };

        (100.0 * h0).min(h1).min(interval)
    }
}

impl Integrator for DormandPrince {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn advance(
        &self,
        field: &dyn StateDerivative,
        initial_state: &[Scalar],
        interval: Scalar,
    ) -> Result<Vec<Scalar>, IntegrationFailure> {
        let n = initial_state.len();
        let mut y = initial_state.to_vec();
        if n == 0 || interval <= 0.0 {
            return Ok(y);
        }

        let floor = self.tolerances.min_step_fraction * interval;
        let mut t: Scalar = 0.0;

        let mut k: [Vec<Scalar>; 7] = std::array::from_fn(|_| vec![0.0; n]);
        field.evaluate(t, &y, &mut k[0]);
        if !all_finite(&k[0]) {
            return Err(IntegrationFailure::NonFiniteState { time: t });
        }

        let mut h = self.initial_step(field, &y, &k[0], interval);
        let mut stage = vec![0.0; n];
        let mut y_new = vec![0.0; n];
        let mut error = vec![0.0; n];
        let mut attempts = 0usize;

        while t < interval {
            let remaining = interval - t;
            let mut rejected = false;

            loop {
                if attempts >= self.tolerances.max_steps {
                    return Err(IntegrationFailure::StepBudgetExhausted {
                        time: t,
                        target: interval,
                        max_steps: self.tolerances.max_steps,
                    });
                }
                attempts += 1;

                // land exactly on the end of the interval
                let last_step = h >= remaining;
                let step = if last_step { remaining } else { h };

                if step < floor && !last_step {
                    return Err(IntegrationFailure::StepSizeUnderflow {
                        time: t,
                        step,
                        floor,
                    });
                }

                for s in 1..6 {
                    for (i, value) in stage.iter_mut().enumerate() {
                        let increment: Scalar =
                            (0..s).map(|j| A[s][j] * k[j][i]).sum();
                        *value = y[i] + step * increment;
                    }
                    let (_, rest) = k.split_at_mut(s);
                    field.evaluate(t + C[s] * step, &stage, &mut rest[0]);
                }

                for (i, value) in y_new.iter_mut().enumerate() {
                    let increment: Scalar = (0..6).map(|j| B[j] * k[j][i]).sum();
                    *value = y[i] + step * increment;
                }

                let t_new = if last_step { interval } else { t + step };
                let (_, last) = k.split_at_mut(6);
                field.evaluate(t_new, &y_new, &mut last[0]);

                for (i, value) in error.iter_mut().enumerate() {
                    *value = step * (0..7).map(|j| E[j] * k[j][i]).sum::<Scalar>();
                }

                let norm = self.error_norm(&error, &y, &y_new);

                if !norm.is_finite() || !all_finite(&y_new) {
                    // a blown-up stage may still be resolved by a smaller step
                    if step <= floor {
                        return Err(IntegrationFailure::NonFiniteState { time: t });
                    }
                    h = step * MIN_FACTOR;
                    rejected = true;
                    continue;
                }

                if norm <= 1.0 {
                    let factor = if norm == 0.0 {
                        MAX_FACTOR
                    } else {
                        (SAFETY * libm::pow(norm, ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
                    };
                    let factor = if rejected { factor.min(1.0) } else { factor };

                    t = t_new;
                    std::mem::swap(&mut y, &mut y_new);
                    k.swap(0, 6);
                    h = step * factor;
                    break;
                }

                if step <= floor {
                    return Err(IntegrationFailure::StepSizeUnderflow {
                        time: t,
                        step,
                        floor,
                    });
                }

                let factor = (SAFETY * libm::pow(norm, ERROR_EXPONENT)).max(MIN_FACTOR);
                h = step * factor;
                rejected = true;
            }
        }

        if !all_finite(&y) {
            return Err(IntegrationFailure::NonFiniteState { time: t });
        }

        Ok(y)
    }

    fn convergence_order(&self) -> usize {
        5
    }

    fn name(&self) -> &'static str {
        "dormand_prince"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["rk45", "dopri5"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harmonic(omega: Scalar) -> impl Fn(Scalar, &[Scalar], &mut [Scalar]) {
        move |_t: Scalar, y: &[Scalar], dy: &mut [Scalar]| {
            dy[0] = y[1];
            dy[1] = -omega * omega * y[0];
        }
    }

    #[test]
    fn test_exponential_decay() {
        let integrator = DormandPrince::default();
        let decay = |_t: Scalar, y: &[Scalar], dy: &mut [Scalar]| dy[0] = -y[0];

        let y = integrator.advance(&decay, &[1.0], 2.0).unwrap();

        let exact = (-2.0 as Scalar).exp();
        assert!((y[0] - exact).abs() < 1e-6, "got {}, expected {}", y[0], exact);
    }

    #[test]
    fn test_harmonic_oscillator_full_period() {
        let omega = 2.0 * std::f64::consts::PI;
        let integrator = DormandPrince::default();

        let y = integrator.advance(&harmonic(omega), &[1.0, 0.0], 1.0).unwrap();

        assert!((y[0] - 1.0).abs() < 1e-5, "position {}", y[0]);
        assert!(y[1].abs() < 1e-4, "velocity {}", y[1]);
    }

    #[test]
    fn test_tighter_tolerance_is_more_accurate() {
        let omega = 3.0;
        let exact = (omega * 5.0 as Scalar).cos();

        let loose = DormandPrince::new(Tolerances {
            relative: 1e-3,
            absolute: 1e-6,
            ..Tolerances::default()
        });
        let tight = DormandPrince::new(Tolerances {
            relative: 1e-10,
            absolute: 1e-12,
            ..Tolerances::default()
        });

        let loose_error = (loose.advance(&harmonic(omega), &[1.0, 0.0], 5.0).unwrap()[0] - exact).abs();
        let tight_error = (tight.advance(&harmonic(omega), &[1.0, 0.0], 5.0).unwrap()[0] - exact).abs();

        assert!(tight_error < loose_error);
        assert!(tight_error < 1e-8, "tight error {tight_error}");
    }

    #[test]
    fn test_lands_exactly_on_interval_end() {
        let integrator = DormandPrince::default();
        let last_time = std::cell::Cell::new(0.0);
        let clock = |t: Scalar, _y: &[Scalar], dy: &mut [Scalar]| {
            last_time.set(t);
            dy[0] = 1.0;
        };

        let y = integrator.advance(&clock, &[0.0], 0.3).unwrap();

        assert_eq!(last_time.get(), 0.3);
        assert!((y[0] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_constant_derivative_is_exact() {
        let integrator = DormandPrince::default();
        let drift = |_t: Scalar, y: &[Scalar], dy: &mut [Scalar]| {
            dy[0] = y[1];
            dy[1] = 0.0;
        };

        let y = integrator.advance(&drift, &[5.0, 2.0], 0.25).unwrap();

        assert!((y[0] - 5.5).abs() < 1e-12);
        assert_eq!(y[1], 2.0);
    }

    #[test]
    fn test_empty_state_and_zero_interval() {
        let integrator = DormandPrince::default();
        let never = |_t: Scalar, _y: &[Scalar], _dy: &mut [Scalar]| {
            panic!("derivative must not be evaluated");
        };

        assert_eq!(integrator.advance(&never, &[], 1.0).unwrap(), Vec::<Scalar>::new());
        assert_eq!(integrator.advance(&never, &[4.0], 0.0).unwrap(), vec![4.0]);
    }

    #[test]
    fn test_finite_time_blowup_is_reported() {
        // y' = y^2 with y(0) = 1 diverges at t = 1
        let integrator = DormandPrince::default();
        let blowup = |_t: Scalar, y: &[Scalar], dy: &mut [Scalar]| dy[0] = y[0] * y[0];

        let result = integrator.advance(&blowup, &[1.0], 2.0);

        assert!(
            matches!(
                result,
                Err(IntegrationFailure::StepSizeUnderflow { .. })
                    | Err(IntegrationFailure::NonFiniteState { .. })
                    | Err(IntegrationFailure::StepBudgetExhausted { .. })
            ),
            "unexpected result {result:?}"
        );
    }

    #[test]
    fn test_step_budget_exhausted() {
        let integrator = DormandPrince::new(Tolerances {
            max_steps: 3,
            ..Tolerances::default()
        });
        let omega = 50.0;

        let result = integrator.advance(&harmonic(omega), &[1.0, 0.0], 10.0);

        assert!(matches!(
            result,
            Err(IntegrationFailure::StepBudgetExhausted { max_steps: 3, .. })
        ));
    }

    #[test]
    fn test_non_finite_initial_derivative() {
        let integrator = DormandPrince::default();
        let broken = |_t: Scalar, _y: &[Scalar], dy: &mut [Scalar]| dy[0] = Scalar::NAN;

        assert_eq!(
            integrator.advance(&broken, &[1.0], 1.0),
            Err(IntegrationFailure::NonFiniteState { time: 0.0 })
        );
    }

    #[test]
    fn test_metadata() {
        let integrator = DormandPrince::default();
        assert_eq!(integrator.name(), "dormand_prince");
        assert_eq!(integrator.convergence_order(), 5);
        assert_eq!(integrator.aliases(), vec!["rk45", "dopri5"]);
        assert_eq!(integrator.tolerances.relative, 1e-6);
        assert_eq!(integrator.tolerances.absolute, 1e-9);
    }
}

//! Classic fixed-step Runge-Kutta integration

use super::{Integrator, StateDerivative, all_finite};
use crate::error::IntegrationFailure;
use crate::physics::math::Scalar;

/// Fourth-order Runge-Kutta integrator (RK4)
///
/// Splits each requested interval into `substeps` equal steps and applies
/// the classic four-stage scheme to each:
///
/// 1. k1 = f(t, y)
/// 2. k2 = f(t + h/2, y + k1*h/2)
/// 3. k3 = f(t + h/2, y + k2*h/2)
/// 4. k4 = f(t + h, y + k3*h)
/// 5. y(t+h) = y(t) + h/6 * (k1 + 2*k2 + 2*k3 + k4)
///
/// There is no error control; a non-finite state is the only failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RungeKuttaFourthOrder {
    pub substeps: usize,
}

impl Default for RungeKuttaFourthOrder {
    fn default() -> Self {
        Self { substeps: 1 }
    }
}

impl RungeKuttaFourthOrder {
    pub fn new(substeps: usize) -> Self {
        Self {
            substeps: substeps.max(1),
        }
    }
}

impl Integrator for RungeKuttaFourthOrder {
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

        let substeps = self.substeps.max(1);
        let h = interval / substeps as Scalar;

        let mut k1 = vec![0.0; n];
        let mut k2 = vec![0.0; n];
        let mut k3 = vec![0.0; n];
        let mut k4 = vec![0.0; n];
        let mut stage = vec![0.0; n];

        for step in 0..substeps {
            let t = step as Scalar * h;

            field.evaluate(t, &y, &mut k1);

            for i in 0..n {
                stage[i] = y[i] + 0.5 * h * k1[i];
            }
            field.evaluate(t + 0.5 * h, &stage, &mut k2);

            for i in 0..n {
                stage[i] = y[i] + 0.5 * h * k2[i];
            }
            field.evaluate(t + 0.5 * h, &stage, &mut k3);

            for i in 0..n {
                stage[i] = y[i] + h * k3[i];
            }
            field.evaluate(t + h, &stage, &mut k4);

            for i in 0..n {
                y[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
            }

            if !all_finite(&y) {
                return Err(IntegrationFailure::NonFiniteState { time: t + h });
            }
        }

        Ok(y)
    }

    fn convergence_order(&self) -> usize {
        4
    }

    fn name(&self) -> &'static str {
        "runge_kutta_fourth_order"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["rk4"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rk4_constant_acceleration() {
        let rk4 = RungeKuttaFourthOrder::default();
        // [x, v] with x'' = -9.81
        let falling = |_t: Scalar, y: &[Scalar], dy: &mut [Scalar]| {
            dy[0] = y[1];
            dy[1] = -9.81;
        };

        let y = rk4.advance(&falling, &[0.0, 1.0], 0.01).unwrap();

        // exact for quadratics
        assert!((y[0] - (0.01 - 0.5 * 9.81 * 0.0001)).abs() < 1e-15);
        assert!((y[1] - (1.0 - 0.0981)).abs() < 1e-15);
    }

    #[test]
    fn test_rk4_substeps_improve_accuracy() {
        let decay = |_t: Scalar, y: &[Scalar], dy: &mut [Scalar]| dy[0] = -y[0];
        let exact = (-1.0 as Scalar).exp();

        let coarse = RungeKuttaFourthOrder::new(1).advance(&decay, &[1.0], 1.0).unwrap();
        let fine = RungeKuttaFourthOrder::new(10).advance(&decay, &[1.0], 1.0).unwrap();

        let coarse_error = (coarse[0] - exact).abs();
        let fine_error = (fine[0] - exact).abs();
        assert!(fine_error < coarse_error / 1000.0, "{fine_error} vs {coarse_error}");
    }

    #[test]
    fn test_rk4_zero_substeps_treated_as_one() {
        let rk4 = RungeKuttaFourthOrder::new(0);
        assert_eq!(rk4.substeps, 1);
    }

    #[test]
    fn test_rk4_reports_non_finite_state() {
        let rk4 = RungeKuttaFourthOrder::default();
        let broken = |_t: Scalar, _y: &[Scalar], dy: &mut [Scalar]| dy[0] = Scalar::INFINITY;

        assert!(matches!(
            rk4.advance(&broken, &[0.0], 0.5),
            Err(IntegrationFailure::NonFiniteState { .. })
        ));
    }

    #[test]
    fn test_rk4_metadata() {
        let rk4 = RungeKuttaFourthOrder::default();
        assert_eq!(rk4.name(), "runge_kutta_fourth_order");
        assert_eq!(rk4.aliases(), vec!["rk4"]);
        assert_eq!(rk4.convergence_order(), 4);
    }
}

use crate::resources::SharedRng;
use rand::Rng;

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 2D vector type for positions, velocities, and forces
pub type Vector = bevy::math::DVec2;

/// Samples a point uniformly from the axis-aligned rectangle `[min, max]`.
pub fn random_point_in_rect(rng: &mut SharedRng, min: Vector, max: Vector) -> Vector {
    Vector::new(
        rng.random_range(min.x..=max.x),
        rng.random_range(min.y..=max.y),
    )
}

/// Samples a vector with each component uniform in `[-bound, bound]`.
pub fn random_symmetric_vector(rng: &mut SharedRng, bound: Scalar) -> Vector {
    if bound == 0.0 {
        return Vector::ZERO;
    }

    Vector::new(
        rng.random_range(-bound..=bound),
        rng.random_range(-bound..=bound),
    )
}

/// Component-wise Euclidean remainder, always in `[0, dims)` for positive `dims`.
#[inline]
pub fn wrap(value: Vector, dims: Vector) -> Vector {
    Vector::new(wrap_scalar(value.x, dims.x), wrap_scalar(value.y, dims.y))
}

#[inline]
fn wrap_scalar(value: Scalar, dim: Scalar) -> Scalar {
    let wrapped = value - dim * libm::floor(value / dim);
    // floor can round a tiny negative value up to exactly `dim`
    if wrapped >= dim { 0.0 } else { wrapped }
}

/// Shortest displacement between two copies of a periodic lattice point.
#[inline]
pub fn minimum_image(displacement: Vector, dims: Vector) -> Vector {
    Vector::new(
        displacement.x - dims.x * libm::round(displacement.x / dims.x),
        displacement.y - dims.y * libm::round(displacement.y / dims.y),
    )
}

#[cfg(test)]
mod math_tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_in_range_values() {
        let dims = Vector::new(1280.0, 720.0);
        let inside = Vector::new(0.0, 719.5);
        assert_eq!(wrap(inside, dims), inside);
    }

    #[test]
    fn test_wrap_out_of_range_values() {
        let dims = Vector::new(1280.0, 720.0);

        assert_eq!(wrap(Vector::new(1290.0, -10.0), dims), Vector::new(10.0, 710.0));
        assert_eq!(wrap(Vector::new(1280.0, 720.0), dims), Vector::ZERO);
        assert_eq!(wrap(Vector::new(-2560.0, 1440.0), dims), Vector::ZERO);
    }

    #[test]
    fn test_wrap_tiny_negative_never_reaches_upper_bound() {
        let dims = Vector::new(1280.0, 720.0);
        let wrapped = wrap(Vector::new(-1e-300, -1e-17), dims);

        assert!(wrapped.x >= 0.0 && wrapped.x < dims.x);
        assert!(wrapped.y >= 0.0 && wrapped.y < dims.y);
    }

    #[test]
    fn test_minimum_image_prefers_short_path() {
        let dims = Vector::new(1280.0, 720.0);
        let d = minimum_image(Vector::new(1278.0, -700.0), dims);

        assert_eq!(d, Vector::new(-2.0, 20.0));
    }

    #[test]
    fn test_random_point_in_rect_bounds() {
        let mut rng = SharedRng::from_seed(7);
        let min = Vector::new(10.0, 10.0);
        let max = Vector::new(1270.0, 710.0);

        for _ in 0..10_000 {
            let p = random_point_in_rect(&mut rng, min, max);
            assert!(p.x >= min.x && p.x <= max.x, "x out of range: {}", p.x);
            assert!(p.y >= min.y && p.y <= max.y, "y out of range: {}", p.y);
        }
    }

    #[test]
    fn test_random_symmetric_vector_moments() {
        let count_of_samples = 100_000;
        let bound = 150.0;
        let mut rng = SharedRng::from_seed(11);

        let (sum_x, sum_y) = (0..count_of_samples)
            .map(|_| random_symmetric_vector(&mut rng, bound))
            .inspect(|v| {
                assert!(v.x.abs() <= bound && v.y.abs() <= bound);
            })
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));

        let n = count_of_samples as Scalar;
        // standard deviation of U(-b, b) is b / sqrt(3)
        let tolerance = 4.0 * bound / libm::sqrt(3.0 * n);
        assert!((sum_x / n).abs() < tolerance, "x mean: {}", sum_x / n);
        assert!((sum_y / n).abs() < tolerance, "y mean: {}", sum_y / n);
    }

    #[test]
    fn test_random_symmetric_vector_zero_bound() {
        let mut rng = SharedRng::from_seed(1);
        assert_eq!(random_symmetric_vector(&mut rng, 0.0), Vector::ZERO);
    }
}

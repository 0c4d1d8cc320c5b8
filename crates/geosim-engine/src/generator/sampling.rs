//! Continuous distributions sampled from a uniform source.

use std::f64::consts::TAU;

use rand::Rng;

/// Box–Muller standard normal.
pub(crate) fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // (0, 1] so ln never sees zero
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

pub(crate) fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    mean + std_dev * standard_normal(rng)
}

/// Exponential with the given mean, by inverse CDF.
pub(crate) fn exponential<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    -scale * (1.0 - rng.random::<f64>()).ln()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const SAMPLES: usize = 20_000;

    #[allow(clippy::cast_precision_loss)]
    fn moments(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn normal_has_requested_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f64> = (0..SAMPLES).map(|_| normal(&mut rng, 10.0, 2.0)).collect();
        let (mean, sd) = moments(&values);
        assert!((mean - 10.0).abs() < 0.1, "mean {mean}");
        assert!((sd - 2.0).abs() < 0.1, "sd {sd}");
    }

    #[test]
    fn exponential_is_non_negative_with_requested_mean() {
        let mut rng = StdRng::seed_from_u64(11);
        let values: Vec<f64> = (0..SAMPLES).map(|_| exponential(&mut rng, 500.0)).collect();
        assert!(values.iter().all(|v| *v >= 0.0 && v.is_finite()));
        let (mean, _) = moments(&values);
        assert!((mean - 500.0).abs() < 25.0, "mean {mean}");
    }
}

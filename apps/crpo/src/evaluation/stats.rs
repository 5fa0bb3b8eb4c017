// Summary statistics over score lists. Empty input yields 0.0 everywhere.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f64]) -> f64 {
    std_with_ddof(values, 0)
}

/// Sample standard deviation (divides by n - 1). Fewer than two values → 0.0.
pub fn sample_std(values: &[f64]) -> f64 {
    std_with_ddof(values, 1)
}

fn std_with_ddof(values: &[f64], ddof: usize) -> f64 {
    if values.len() <= ddof {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - ddof) as f64).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std(&[]), 0.0);
        assert_eq!(sample_std(&[0.4]), 0.0);
        assert_eq!(min(&[]), 0.0);
        assert_eq!(max(&[]), 0.0);
    }

    #[test]
    fn test_population_vs_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((population_std(&values) - 2.0).abs() < 1e-12);
        assert!((sample_std(&values) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_min_max() {
        let values = [0.3, 0.9, 0.1];
        assert_eq!(min(&values), 0.1);
        assert_eq!(max(&values), 0.9);
    }
}

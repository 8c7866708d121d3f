use crate::error::{AfterglowError, AfterglowResult};

/// Hard cap on separable-blur kernel taps, matching the convolution shader's
/// fixed uniform array length.
pub const MAX_KERNEL_SIZE: usize = 25;

/// Tap count for a given sigma: `2 * ceil(3 * sigma) + 1`, capped at
/// [`MAX_KERNEL_SIZE`].
pub fn kernel_size(sigma: f64) -> usize {
    let size = 2 * (sigma * 3.0).ceil() as usize + 1;
    size.min(MAX_KERNEL_SIZE)
}

/// Build a normalized 1-D Gaussian kernel for a separable blur.
///
/// The `1 / (sqrt(2 pi) * sigma)` term is dropped since the kernel is
/// normalized to sum to 1 afterwards.
pub fn build_kernel(sigma: f64) -> AfterglowResult<Vec<f64>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AfterglowError::config("blur sigma must be > 0"));
    }

    let size = kernel_size(sigma);
    let half_width = (size - 1) as f64 * 0.5;

    let mut values = Vec::with_capacity(size);
    let mut sum = 0.0f64;
    for i in 0..size {
        let x = i as f64 - half_width;
        let value = (-(x * x) / (2.0 * sigma * sigma)).exp();
        values.push(value);
        sum += value;
    }

    for value in &mut values {
        *value /= sum;
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_sums_to_one() {
        for sigma in [0.5, 1.0, 2.0, 3.0, 4.0, 10.0] {
            let kernel = build_kernel(sigma).unwrap();
            let sum: f64 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sigma {sigma}: sum {sum}");
        }
    }

    #[test]
    fn kernel_length_follows_sigma_until_cap() {
        assert_eq!(build_kernel(1.0).unwrap().len(), 7);
        assert_eq!(build_kernel(2.0).unwrap().len(), 13);
        assert_eq!(build_kernel(4.0).unwrap().len(), 25);
        assert_eq!(build_kernel(100.0).unwrap().len(), MAX_KERNEL_SIZE);
    }

    #[test]
    fn kernel_is_symmetric_with_center_peak() {
        let kernel = build_kernel(2.0).unwrap();
        let mid = kernel.len() / 2;
        for i in 0..mid {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-12);
            assert!(kernel[i] < kernel[mid]);
        }
    }

    #[test]
    fn rejects_non_positive_sigma() {
        assert!(build_kernel(0.0).is_err());
        assert!(build_kernel(-1.0).is_err());
        assert!(build_kernel(f64::NAN).is_err());
    }
}

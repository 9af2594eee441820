//! Regression metrics over flattened targets and predictions.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Result, RunnerError};

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(RunnerError::shape("metric inputs", y_true.len(), y_pred.len()));
    }
    if y_true.is_empty() {
        return Err(RunnerError::InvalidInput("metrics need at least one sample".into()));
    }
    Ok(())
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

/// mean(|y − ŷ|)
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    Ok(y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum::<f64>() / y_true.len() as f64)
}

/// Coefficient of determination, `1 − SS_res / SS_tot`.
///
/// A constant target gives 1.0 for a perfect prediction and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let y_mean = mean(y_true);
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Pearson correlation and its two-sided p-value for zero correlation.
///
/// Constant input has no defined correlation; both values are NaN.
pub fn pearsonr(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    check_lengths(x, y)?;
    let n = x.len();
    if n < 2 {
        return Err(RunnerError::InvalidInput(
            "pearson correlation needs at least two samples".into(),
        ));
    }

    let (mx, my) = (mean(x), mean(y));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        log::warn!("an input is constant; the correlation coefficient is not defined");
        return Ok((f64::NAN, f64::NAN));
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    if n == 2 {
        return Ok((r, 1.0));
    }

    let dof = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        return Ok((r, 0.0));
    }
    let t = r * (dof / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, dof).map_err(|e| RunnerError::InvalidInput(e.to_string()))?;
    Ok((r, (2.0 * dist.sf(t.abs())).min(1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mae_and_r2_known_values() {
        let y = [3.0, -0.5, 2.0, 7.0];
        let p = [2.5, 0.0, 2.0, 8.0];
        assert!((mean_absolute_error(&y, &p).unwrap() - 0.5).abs() < 1e-12);
        assert!((r2_score(&y, &p).unwrap() - 0.948_608_137_044_967_9).abs() < 1e-12);
    }

    #[test]
    fn r2_constant_target() {
        assert_eq!(r2_score(&[2.0, 2.0], &[2.0, 2.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[2.0, 2.0], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn pearson_reference_value() {
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let y = [2.0, 1.0, 4.0, 3.0, 7.0, 5.0, 6.0, 9.0, 10.0, 8.0];
        let (r, p) = pearsonr(&x, &y).unwrap();
        assert!((r - 0.903_030_303_030_303_1).abs() < 1e-9);
        assert!(p > 0.0 && p < 0.001, "p = {p}");
    }

    #[test]
    fn pearson_p_value_two_degrees_of_freedom() {
        // with n = 4 the t tail reduces to p = 1 - |r|
        let (r, p) = pearsonr(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        assert!((r - 0.8).abs() < 1e-12);
        assert!((p - 0.2).abs() < 1e-9, "p = {p}");
    }

    #[test]
    fn pearson_perfect_and_degenerate() {
        let (r, p) = pearsonr(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(p < 1e-6);

        let (r, p) = pearsonr(&[1.0, 2.0], &[5.0, 3.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
        assert_eq!(p, 1.0);

        let (r, p) = pearsonr(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(r.is_nan() && p.is_nan());

        assert!(pearsonr(&[1.0], &[1.0]).is_err());
        assert!(pearsonr(&[1.0, 2.0], &[1.0]).is_err());
    }
}

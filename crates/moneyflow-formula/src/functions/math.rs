//! Math functions

use crate::error::{FormulaError, FormulaResult};

/// SUM function
pub fn fn_sum(values: &[f64]) -> FormulaResult<f64> {
    Ok(values.iter().sum())
}

/// AVERAGE function
pub fn fn_average(values: &[f64]) -> FormulaResult<f64> {
    if values.is_empty() {
        return Err(FormulaError::Evaluation(
            "AVERAGE of no numeric values".into(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// MIN function (0 when no values)
pub fn fn_min(values: &[f64]) -> FormulaResult<f64> {
    Ok(values.iter().copied().reduce(f64::min).unwrap_or(0.0))
}

/// MAX function (0 when no values)
pub fn fn_max(values: &[f64]) -> FormulaResult<f64> {
    Ok(values.iter().copied().reduce(f64::max).unwrap_or(0.0))
}

/// COUNT function
pub fn fn_count(values: &[f64]) -> FormulaResult<f64> {
    Ok(values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum() {
        assert_eq!(fn_sum(&[1500.0, 0.0, 3000.0]).unwrap(), 4500.0);
        assert_eq!(fn_sum(&[]).unwrap(), 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(fn_average(&[2.0, 4.0, 6.0]).unwrap(), 4.0);
        assert!(fn_average(&[]).is_err());
    }

    #[test]
    fn test_min_max() {
        assert_eq!(fn_min(&[5.0, 2.0, 8.0]).unwrap(), 2.0);
        assert_eq!(fn_max(&[5.0, 2.0, 8.0]).unwrap(), 8.0);
        assert_eq!(fn_min(&[]).unwrap(), 0.0);
        assert_eq!(fn_max(&[-3.0]).unwrap(), -3.0);
    }

    #[test]
    fn test_count() {
        assert_eq!(fn_count(&[1.0, 2.0, 0.0]).unwrap(), 3.0);
    }
}

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("invalid inflation table: {0}")]
    InvalidTable(String),
}

impl CalcError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            Self::InvalidTable(_) => None,
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

pub(crate) fn require_finite(field: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(field, "must be a finite number"))
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> CalcResult<f64> {
    if require_finite(field, value)? < 0.0 {
        return Err(CalcError::invalid(field, "must be >= 0"));
    }
    Ok(value)
}

pub(crate) fn require_at_most(field: &'static str, value: u32, max: u32) -> CalcResult<u32> {
    if value > max {
        return Err(CalcError::invalid(field, format!("must be <= {max}")));
    }
    Ok(value)
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> CalcResult<f64> {
    if require_finite(field, value)? <= 0.0 {
        return Err(CalcError::invalid(field, "must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_names_field() {
        let err = CalcError::invalid("term", "must be > 0");
        assert_eq!(err.to_string(), "invalid term: must be > 0");
        assert_eq!(err.field(), Some("term"));
    }

    #[test]
    fn require_positive_rejects_zero_and_nan() {
        assert!(require_positive("principal", 0.0).is_err());
        assert!(require_positive("principal", f64::NAN).is_err());
        assert_eq!(require_positive("principal", 1.5), Ok(1.5));
    }

    #[test]
    fn require_at_most_names_the_bound() {
        assert_eq!(require_at_most("term", 1_200, 1_200), Ok(1_200));
        let err = require_at_most("term", 1_201, 1_200).expect_err("must reject");
        assert_eq!(err.to_string(), "invalid term: must be <= 1200");
    }

    #[test]
    fn require_non_negative_accepts_zero() {
        assert_eq!(require_non_negative("overpayment", 0.0), Ok(0.0));
        assert!(require_non_negative("overpayment", -0.01).is_err());
        assert!(require_non_negative("overpayment", f64::INFINITY).is_err());
    }
}

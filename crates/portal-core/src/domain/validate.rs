use crate::error::DomainError;

pub(crate) fn not_blank(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

pub(crate) fn max_len(field: &str, value: Option<&str>, max: usize) -> Result<(), DomainError> {
    match value {
        Some(v) if v.chars().count() > max => Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn in_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), DomainError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(DomainError::validation(format!(
            "{field} must be between {min} and {max}"
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

/// Collects required form fields and reports every blank one at once.
#[derive(Debug, Default, Clone)]
pub struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.missing.push(name.to_string());
        }
        self
    }

    pub fn optional_text(self, name: &str, value: Option<&str>) -> Self {
        self.text(name, value.unwrap_or_default())
    }

    pub fn non_empty<T>(mut self, name: &str, values: &[T]) -> Self {
        if values.is_empty() {
            self.missing.push(name.to_string());
        }
        self
    }

    pub fn positive(mut self, name: &str, value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            self.missing.push(name.to_string());
        }
        self
    }

    pub fn check(self) -> Result<(), ValidationError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                missing: self.missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_values_are_both_missing() {
        let err = RequiredFields::new()
            .text("customer_name", "")
            .text("customer_email", "   ")
            .text("equipment_name", "Cuplock")
            .check()
            .unwrap_err();
        assert_eq!(err.missing, vec!["customer_name", "customer_email"]);
    }

    #[test]
    fn nan_is_not_positive() {
        assert!(RequiredFields::new().positive("quantity", f64::NAN).check().is_err());
        assert!(RequiredFields::new().positive("quantity", 2.0).check().is_ok());
    }
}

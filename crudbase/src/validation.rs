//! Input validation for Create and Update schemas.
//!
//! `CrudBase` calls [`Validatable::validate`] before touching the store, so a
//! rejected payload never opens a transaction.
//!
//! ```rust,ignore
//! use crudbase::validation::{Validatable, ValidationErrors, validators};
//!
//! impl Validatable for UserCreate {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         errors.check(validators::validate_length("username", &self.username, 1..=50));
//!         errors.check(validators::validate_email("email", &self.email));
//!         errors.result()
//!     }
//! }
//! ```

use serde::Serialize;
use std::fmt;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Every field rejected by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Records the error of a failed validator, ignores `Ok`.
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Messages recorded against `field`, in the order they were added.
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.messages_for(field).next().is_some()
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid input ({fields})")
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by Create and Update schemas. The default accepts everything.
pub trait Validatable {
    /// # Errors
    ///
    /// Returns every rejected field.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Reusable field checks. Each returns the `ValidationError` to record.
pub mod validators {
    use super::ValidationError;
    use std::fmt::Display;
    use std::ops::{Bound, RangeBounds};

    fn describe<T: Display>(bounds: &impl RangeBounds<T>, unit: &str) -> String {
        let lower = match bounds.start_bound() {
            Bound::Included(min) => Some(format!("at least {min}{unit}")),
            Bound::Excluded(min) => Some(format!("more than {min}{unit}")),
            Bound::Unbounded => None,
        };
        let upper = match bounds.end_bound() {
            Bound::Included(max) => Some(format!("at most {max}{unit}")),
            Bound::Excluded(max) => Some(format!("less than {max}{unit}")),
            Bound::Unbounded => None,
        };
        match (lower, upper) {
            (Some(lower), Some(upper)) => format!("must be {lower} and {upper}"),
            (Some(only), None) | (None, Some(only)) => format!("must be {only}"),
            (None, None) => "is out of range".to_string(),
        }
    }

    /// Length in characters, not bytes.
    ///
    /// # Errors
    ///
    /// When the length falls outside `bounds`.
    pub fn validate_length(
        field: &str,
        value: &str,
        bounds: impl RangeBounds<usize>,
    ) -> Result<(), ValidationError> {
        if bounds.contains(&value.chars().count()) {
            Ok(())
        } else {
            Err(ValidationError::new(field, describe(&bounds, " characters")))
        }
    }

    /// # Errors
    ///
    /// When `value` falls outside `bounds`.
    pub fn validate_range<T: PartialOrd + Display>(
        field: &str,
        value: &T,
        bounds: impl RangeBounds<T>,
    ) -> Result<(), ValidationError> {
        if bounds.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::new(field, describe(&bounds, "")))
        }
    }

    /// Shape only: `local@domain.tld`, no whitespace, exactly one `@`.
    ///
    /// # Errors
    ///
    /// When `value` does not have that shape.
    pub fn validate_email(field: &str, value: &str) -> Result<(), ValidationError> {
        let well_formed = !value.chars().any(char::is_whitespace)
            && value.split_once('@').is_some_and(|(local, domain)| {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.split('.').count() >= 2
                    && domain.split('.').all(|label| !label.is_empty())
            });
        if well_formed {
            Ok(())
        } else {
            Err(ValidationError::new(field, "is not an email address"))
        }
    }

    /// # Errors
    ///
    /// When `value` is empty or only whitespace.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be blank"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;

    #[test]
    fn test_collects_and_reports_every_field() {
        let mut errors = ValidationErrors::new();
        errors.check(validate_required("username", ""));
        errors.check(validate_email("email", "a@x.com"));
        errors.check(validate_length("email", "a@x.com", ..=3));
        errors.check(validate_email("email", "nope"));

        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("username"));
        assert!(!errors.has_field("bio"));
        assert_eq!(errors.messages_for("email").count(), 2);
        assert_eq!(
            errors.to_string(),
            "invalid input (username: must not be blank; \
             email: must be at most 3 characters; email: is not an email address)"
        );
        assert!(errors.result().is_err());
        assert!(ValidationErrors::new().result().is_ok());
    }

    #[test]
    fn test_default_validate_accepts() {
        struct Anything;
        impl Validatable for Anything {}
        assert!(Anything.validate().is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(validate_length("username", "Ana", 1..=50).is_ok());
        assert!(validate_length("username", "", 1..=50).is_err());
        assert!(validate_length("username", "João", ..=4).is_ok());
        let err = validate_length("username", &"a".repeat(51), ..=50).unwrap_err();
        assert_eq!(err.message, "must be at most 50 characters");
    }

    #[test]
    fn test_range_respects_bound_kinds() {
        assert!(validate_range("age", &18, 18..).is_ok());
        assert!(validate_range("age", &18, 0..18).is_err());
        let err = validate_range("age", &200, 0..=120).unwrap_err();
        assert_eq!(err.message, "must be at least 0 and at most 120");
    }

    #[test]
    fn test_email_shape() {
        for bad in ["ana", "@x.com", "a@x", "a@.com", "a@x.", "a b@x.com", "a@b@x.com"] {
            assert!(validate_email("email", bad).is_err(), "{bad}");
        }
        for good in ["a@x.com", "ana.lima@mail.example.co.uk"] {
            assert!(validate_email("email", good).is_ok(), "{good}");
        }
    }

    #[test]
    fn test_required_rejects_whitespace() {
        assert!(validate_required("username", "   ").is_err());
        assert!(validate_required("username", " Ana ").is_ok());
    }
}

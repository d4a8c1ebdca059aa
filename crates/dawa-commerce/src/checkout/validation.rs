//! Per-field form validation results.

use std::collections::BTreeMap;
use std::fmt;

/// A form field that can carry a validation message.
pub trait FormField: Copy + Ord + fmt::Debug {
    /// Wire/display key of the field (e.g., "fullName").
    fn as_str(&self) -> &'static str;
}

/// Field-keyed validation messages for one form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors<F: FormField> {
    errors: BTreeMap<F, String>,
}

impl<F: FormField> Default for ValidationErrors<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: FormField> ValidationErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: F, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: F) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(value)` when no message was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl<F: FormField> fmt::Display for ValidationErrors<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

impl<F: FormField> std::error::Error for ValidationErrors<F> {}

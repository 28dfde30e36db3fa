use std::fmt;

/// Accumulated field errors for a rejected write.
///
/// Rendered as `Validation failed: <reason>, <reason>` so callers can show it
/// directly to API clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(reason: impl Into<String>) -> Self {
        Self(vec![reason.into()])
    }

    pub fn add(&mut self, reason: impl Into<String>) {
        self.0.push(reason.into());
    }

    /// Appends every reason of `other`.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Adds `"<field> can't be blank"` when the value is missing or whitespace only.
    pub fn require_present(&mut self, field: &str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.add(format!("{} can't be blank", field));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn reasons(&self) -> &[String] {
        &self.0
    }

    /// Reasons joined with `", "`, without the `Validation failed` prefix.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.joined())
    }
}

impl std::error::Error for ValidationErrors {}

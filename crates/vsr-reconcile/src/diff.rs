//! Field-level comparison between live and desired state.

use std::fmt::Display;

/// One field whose live value differs from the desired one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub current: String,
    pub desired: String,
}

/// Accumulates the differing fields of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    fields: Vec<FieldChange>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare one field and record it if it differs.
    pub fn field<T: PartialEq + Display + ?Sized>(mut self, name: &'static str, current: &T, desired: &T) -> Self {
        if current != desired {
            self.fields.push(FieldChange {
                field: name,
                current: current.to_string(),
                desired: desired.to_string(),
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldChange] {
        &self.fields
    }

    /// `a: x -> y, b: u -> v` for logs.
    pub fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|c| format!("{}: {} -> {}", c.field, c.current, c.desired))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_only_differing_fields() {
        let c = Changes::new()
            .field("a", "x", "x")
            .field("b", "1", "2");
        assert_eq!(c.fields().len(), 1);
        assert_eq!(c.summary(), "b: 1 -> 2");
    }

    #[test]
    fn identical_values_yield_no_changes() {
        assert!(Changes::new().field("n", &3, &3).is_empty());
    }
}

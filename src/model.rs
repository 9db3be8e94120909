//! Data structures describing the rows that feed a grid report.
//!
//! A [`Row`] is an ordered list of named [`Field`] values. Rows are matched to
//! the configured columns by field name, so rows do not need to carry every
//! column nor keep the column order.

/// A named value with optional display override and fallback.
///
/// The text shown for a field is chosen by [`Field::display_value`]: the
/// display override always wins, then the value, then the field's own
/// fallback. A field with none of the three is a missing value and is left to
/// the report-level null policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Field {
    name: String,
    value: Option<String>,
    display_override: Option<String>,
    fallback: Option<String>,
}

impl Field {
    /// Creates a field carrying the provided value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Creates a field without a value.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the field name used for column lookup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw value, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the display override, if any.
    pub fn display_override(&self) -> Option<&str> {
        self.display_override.as_deref()
    }

    /// Returns the field-level fallback, if any.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Sets the value and returns the updated field.
    pub fn with_value(mut self, value: impl Into<Option<String>>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the display override and returns the updated field.
    pub fn with_display_override(mut self, display: impl Into<Option<String>>) -> Self {
        self.display_override = display.into();
        self
    }

    /// Sets the fallback used when the field has no value.
    pub fn with_fallback(mut self, fallback: impl Into<Option<String>>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Returns the text this field renders as on its own, or `None` when the
    /// report null string has to step in.
    pub fn display_value(&self) -> Option<&str> {
        self.display_override
            .as_deref()
            .or(self.value.as_deref())
            .or(self.fallback.as_deref())
    }
}

/// Ordered sequence of fields forming one line of the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<Field>,
}

impl Row {
    /// Creates a row from the provided fields.
    pub fn new(fields: impl Into<Vec<Field>>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    /// Returns the fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of fields carried by the row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Appends a field and returns the updated row.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a field in place.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }
}

impl FromIterator<Field> for Row {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, Row};

    #[test]
    fn display_override_wins_over_value() {
        let field = Field::new("col1", "raw").with_display_override(Some("shown".to_string()));
        assert_eq!(field.display_value(), Some("shown"));
    }

    #[test]
    fn fallback_only_applies_without_value() {
        let with_value = Field::new("col1", "raw").with_fallback(Some("N/A".to_string()));
        assert_eq!(with_value.display_value(), Some("raw"));

        let without_value = Field::missing("col1").with_fallback(Some("N/A".to_string()));
        assert_eq!(without_value.display_value(), Some("N/A"));

        assert_eq!(Field::missing("col1").display_value(), None);
    }

    #[test]
    fn lookup_returns_first_match() {
        let row = Row::new(vec![
            Field::new("b", "first"),
            Field::new("a", "other"),
            Field::new("b", "second"),
        ]);
        assert_eq!(row.field("b").and_then(Field::value), Some("first"));
        assert!(row.field("missing").is_none());
        assert_eq!(row.len(), 3);
    }
}

//! Multi-column sort parameters (`?sort=part_number,-name`).

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sortable field: the public name and the SQL expression it orders by.
pub type SortField = (&'static str, &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: &'static str,
    #[serde(skip)]
    pub column: &'static str,
    pub direction: SortDirection,
}

/// An ordered list of sort keys drawn from a whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse a comma-separated sort parameter against `allowed` fields.
    ///
    /// A leading `-` sorts descending. Blank input falls back to `default`.
    /// Repeated fields keep their first occurrence. Unknown fields are a
    /// validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockroom_core::listing::{SortDirection, SortSpec};
    ///
    /// let allowed = &[("name", "p.name"), ("part_number", "p.part_number")];
    /// let spec = SortSpec::parse(Some("-name,part_number"), allowed, "name").unwrap();
    /// assert_eq!(spec.keys()[0].direction, SortDirection::Desc);
    /// assert_eq!(spec.to_sql("p.id"), "p.name DESC, p.part_number ASC, p.id ASC");
    /// ```
    pub fn parse(
        raw: Option<&str>,
        allowed: &[SortField],
        default: &str,
    ) -> Result<Self, CoreError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default);

        let mut keys: Vec<SortKey> = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, direction) = match token.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (token, SortDirection::Asc),
            };
            let &(field, column) = allowed
                .iter()
                .find(|(f, _)| *f == name)
                .ok_or_else(|| {
                    let names: Vec<&str> = allowed.iter().map(|(f, _)| *f).collect();
                    CoreError::Validation(format!(
                        "Unknown sort field '{name}'. Must be one of: {}",
                        names.join(", ")
                    ))
                })?;
            if keys.iter().any(|k| k.field == field) {
                continue;
            }
            keys.push(SortKey {
                field,
                column,
                direction,
            });
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Render an `ORDER BY` body, ending with `tiebreak ASC` for a stable order.
    pub fn to_sql(&self, tiebreak: &str) -> String {
        self.keys
            .iter()
            .map(|k| format!("{} {}", k.column, k.direction.as_sql()))
            .chain(std::iter::once(format!("{tiebreak} ASC")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

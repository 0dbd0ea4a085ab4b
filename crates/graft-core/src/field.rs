//! Scalar column definitions.

/// Metadata for one scalar column of an entity type.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    /// Entity field name.
    pub field: &'static str,
    /// Database column name (may differ from the field name).
    pub column: &'static str,
}

impl ColumnDef {
    /// Create a column whose database name equals the field name.
    #[must_use]
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            column: field,
        }
    }

    /// Set the database column name.
    #[must_use]
    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = name;
        self
    }
}

use super::sort::SortOrder;

/// The order used for a column's min/max statistics, as recorded in the file footer.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnOrder {
    /// Column uses the order defined by its logical or physical type.
    TypeDefinedOrder(SortOrder),
    /// Column does not have a specified order, so one cannot assume anything about the
    /// correctness of min/max statistics.
    Undefined,
}

impl Default for ColumnOrder {
    fn default() -> Self {
        Self::Undefined
    }
}

/// Paging options for listing products or orders.
///
/// Records are always returned in ascending id order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum number of records to return.
    pub limit: Option<usize>,

    /// Number of records to skip.
    pub offset: Option<usize>,
}

impl ListQuery {
    /// Creates a query returning every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips a number of results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Applies the paging window to an already ordered iterator.
    pub(crate) fn apply<T>(&self, records: impl Iterator<Item = T>) -> Vec<T> {
        let records = records.skip(self.offset.unwrap_or(0));
        match self.limit {
            Some(limit) => records.take(limit).collect(),
            None => records.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_returns_everything() {
        let query = ListQuery::new();
        assert_eq!(query.apply(1..=5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_offset_and_limit() {
        let query = ListQuery::new().offset(1).limit(2);
        assert_eq!(query.offset, Some(1));
        assert_eq!(query.limit, Some(2));
        assert_eq!(query.apply(1..=5), vec![2, 3]);
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let query = ListQuery::new().offset(10);
        assert!(query.apply(1..=5).is_empty());
    }
}

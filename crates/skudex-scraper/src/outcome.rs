use skudex_core::ProductRecord;

use crate::error::ExtractError;

/// One item that failed while the run as a whole carried on.
#[derive(Debug)]
pub struct ItemFailure {
    /// URL of the page or feed entry the failure belongs to.
    pub url: String,
    pub error: ExtractError,
}

/// Result of a multi-item run: everything extracted plus everything that
/// failed along the way. Per-item failures never abort the run; only
/// whole-run errors (an unreachable listing, a pagination cap) surface as
/// `Err` from the operations that produce these.
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub records: Vec<ProductRecord>,
    pub failures: Vec<ItemFailure>,
}

impl ExtractionOutcome {
    /// Folds another outcome into this one, preserving order.
    pub fn extend(&mut self, other: ExtractionOutcome) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }

    /// True when the run produced neither records nor failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }
}

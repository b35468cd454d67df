//! Resource guard: depth and size checks invoked at every decomposition step.
use tracing::warn;

use crate::config::DeepEqualsConfig;
use crate::error::{CompareError, LimitKind};

/// Read-only view over the limit fields of a [`DeepEqualsConfig`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResourceGuard<'a> {
    config: &'a DeepEqualsConfig,
}

impl<'a> ResourceGuard<'a> {
    pub(crate) fn new(config: &'a DeepEqualsConfig) -> Self {
        Self { config }
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), CompareError> {
        check(LimitKind::Depth, self.config.max_depth, depth)
    }

    pub(crate) fn check_collection(&self, len: usize) -> Result<(), CompareError> {
        check(LimitKind::CollectionSize, self.config.max_collection_size, len)
    }

    pub(crate) fn check_array(&self, len: usize) -> Result<(), CompareError> {
        check(LimitKind::ArraySize, self.config.max_array_size, len)
    }

    pub(crate) fn check_map(&self, len: usize) -> Result<(), CompareError> {
        check(LimitKind::MapSize, self.config.max_map_size, len)
    }

    pub(crate) fn check_record(&self, members: usize) -> Result<(), CompareError> {
        check(LimitKind::RecordFields, self.config.max_record_fields, members)
    }
}

fn check(kind: LimitKind, limit: Option<usize>, actual: usize) -> Result<(), CompareError> {
    match limit {
        Some(limit) if actual > limit => {
            warn!(limit = kind.as_str(), max = limit, actual, "comparison aborted");
            Err(CompareError::LimitExceeded {
                kind,
                limit,
                actual,
            })
        }
        Some(_) | None => Ok(()),
    }
}

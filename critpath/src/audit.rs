//! Scores the critical path of an ad request and packages the result for reporting.

use crate::error::{InvalidInputError, Result};
use crate::index::RequestIndex;
use crate::locator::{locate, AdRequestMatcher, Location, NotApplicableReason};
use crate::records::{self, NetworkRecord};
use crate::tree::{CriticalPath, CriticalPathTreeBuilder, TreeNode};

/// Largest number of distinct scripts, ad request included, that still passes. The ad request
/// plus one intermediary dependency is acceptable; three or more distinct entries fail.
pub const PASS_THRESHOLD: usize = 2;

/// Default maximum number of chained parent stacks accepted on a single initiator.
pub const MAX_STACK_DEPTH: usize = 64;

/// Highest configurable stack depth. JSON decoding refuses nesting beyond 128 levels, so deeper
/// parent chains could never be read in the first place.
pub const STACK_DEPTH_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AuditConfig {
    pub pass_threshold: usize,
    pub max_stack_depth: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            pass_threshold: PASS_THRESHOLD,
            max_stack_depth: MAX_STACK_DEPTH,
        }
    }
}

impl AuditConfig {
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_stack_depth > STACK_DEPTH_LIMIT {
            return Err(InvalidInputError::StackDepthLimit {
                requested: self.max_stack_depth,
                limit: STACK_DEPTH_LIMIT,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CriticalPathReport {
    pub applicable: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub not_applicable_reason: Option<NotApplicableReason>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub raw_value: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub passed: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub tree: Option<TreeNode>,
}

impl CriticalPathReport {
    pub fn not_applicable(reason: NotApplicableReason) -> Self {
        Self {
            applicable: false,
            not_applicable_reason: Some(reason),
            raw_value: None,
            passed: None,
            tree: None,
        }
    }
}

/// Scores a built critical path: the raw value is the number of distinct URLs in it.
pub fn score(path: CriticalPath, config: &AuditConfig) -> CriticalPathReport {
    let passed = path.unique_count <= config.pass_threshold;
    CriticalPathReport {
        applicable: true,
        not_applicable_reason: None,
        raw_value: Some(path.unique_count),
        passed: Some(passed),
        tree: Some(path.tree),
    }
}

/// Validates the records, finds the ad request, builds its critical path and scores it.
pub fn audit<M: AdRequestMatcher + ?Sized>(records: &[NetworkRecord], matcher: &M, config: &AuditConfig) -> Result<CriticalPathReport> {
    config.validate()?;
    records::validate(records, config.max_stack_depth)?;

    let root = match locate(records, matcher) {
        Location::Found(_, record) => record,
        Location::NotApplicable(reason) => return Ok(CriticalPathReport::not_applicable(reason)),
    };

    let index = RequestIndex::new(records);
    let path = CriticalPathTreeBuilder::new(&index, config.max_stack_depth).build(root);
    tracing::debug!(url = %root.url, unique = path.unique_count, nodes = path.tree.node_count(), depth = path.tree.depth(), "built critical path");

    Ok(score(path, config))
}

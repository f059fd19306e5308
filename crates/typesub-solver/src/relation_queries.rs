//! Relation query policy and results.
//!
//! [`SubtypePolicy`] carries the knobs a caller can turn for one decision;
//! [`RelationResult`] is what a decision reports back.

use crate::recursion::RecursionProfile;
use crate::subtype::SubtypeResult;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Policy bits that change raw verdicts. Part of the relation cache key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RelationFlags: u8 {
        /// Mutable-container slots compare by identity.
        const STRICT_INVARIANCE = 1 << 0;
    }
}

/// How the boolean entry point collapses `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownPolicy {
    /// `Unknown` is `false`.
    #[default]
    Strict,
    /// `Unknown` is `true`.
    Permissive,
}

impl UnknownPolicy {
    pub fn collapse(self, result: SubtypeResult) -> bool {
        match result {
            SubtypeResult::True => true,
            SubtypeResult::False => false,
            SubtypeResult::Unknown => self == UnknownPolicy::Permissive,
        }
    }
}

/// Policy knobs for subtype queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubtypePolicy {
    pub unknown_as: UnknownPolicy,
    pub strict_invariance: bool,
    pub max_depth: u32,
    pub max_iterations: u32,
}

impl Default for SubtypePolicy {
    fn default() -> Self {
        let profile = RecursionProfile::SubtypeCheck;
        Self {
            unknown_as: UnknownPolicy::Strict,
            strict_invariance: false,
            max_depth: profile.max_depth(),
            max_iterations: profile.max_iterations(),
        }
    }
}

impl SubtypePolicy {
    pub fn with_unknown_as(mut self, unknown_as: UnknownPolicy) -> Self {
        self.unknown_as = unknown_as;
        self
    }

    pub fn with_strict_invariance(mut self, strict: bool) -> Self {
        self.strict_invariance = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn flags(&self) -> RelationFlags {
        let mut flags = RelationFlags::empty();
        flags.set(RelationFlags::STRICT_INVARIANCE, self.strict_invariance);
        flags
    }

    pub fn recursion_profile(&self) -> RecursionProfile {
        RecursionProfile::Custom {
            max_depth: self.max_depth,
            max_iterations: self.max_iterations,
        }
    }
}

/// Result of a subtype query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationResult {
    pub verdict: SubtypeResult,
    /// A recursion limit was hit; `Unknown` parts of the verdict may be
    /// artifacts of the limit.
    pub depth_exceeded: bool,
}

impl RelationResult {
    /// The verdict collapsed to a boolean under `policy`.
    #[inline]
    pub fn is_related(self, policy: &SubtypePolicy) -> bool {
        policy.unknown_as.collapse(self.verdict)
    }
}

#[cfg(test)]
#[path = "../tests/relation_queries_tests.rs"]
mod tests;

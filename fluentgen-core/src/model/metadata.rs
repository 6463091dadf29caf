//! Per-node constructor bookkeeping.

use serde::Serialize;

use crate::symbols::{ConstructorId, FluentOptions};

/// How a step carries a known parameter value forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueStorage {
    /// A field on a synthesized step.
    Field { name: String },
    /// A member read from the target type reused as a step.
    Property { name: String },
}

impl ValueStorage {
    pub fn member_name(&self) -> &str {
        match self {
            Self::Field { name } | Self::Property { name } => name,
        }
    }
}

/// Constructor information attached to a trie node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorMetadata {
    /// Representative constructor for this node.
    pub constructor: ConstructorId,
    /// Parameter count of the representative constructor.
    pub parameter_count: usize,
    /// Every constructor reachable through the node, sorted.
    pub candidate_constructors: Vec<ConstructorId>,
    pub options: FluentOptions,
}

impl ConstructorMetadata {
    pub fn new(constructor: ConstructorId, parameter_count: usize, options: FluentOptions) -> Self {
        Self {
            constructor,
            parameter_count,
            candidate_constructors: vec![constructor],
            options,
        }
    }

    /// Fold `other` into `self` for a node at `depth`.
    ///
    /// Candidates are unioned and options OR'd. The representative becomes
    /// whichever side's parameter count equals `depth`, so a node that ends
    /// one constructor reports that constructor even when longer ones pass
    /// through it.
    pub fn merge(&mut self, other: &ConstructorMetadata, depth: usize) {
        for c in &other.candidate_constructors {
            if let Err(pos) = self.candidate_constructors.binary_search(c) {
                self.candidate_constructors.insert(pos, *c);
            }
        }
        self.options |= other.options;
        if other.parameter_count == depth && self.parameter_count != depth {
            self.constructor = other.constructor;
            self.parameter_count = other.parameter_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_unions_and_overrides_on_depth() {
        let mut long = ConstructorMetadata::new(ConstructorId(0), 3, FluentOptions::default());
        let short = ConstructorMetadata::new(
            ConstructorId(1),
            1,
            FluentOptions {
                no_create_method: true,
                custom_create_method_name: false,
            },
        );
        long.merge(&short, 1);
        assert_eq!(long.constructor, ConstructorId(1));
        assert_eq!(long.candidate_constructors, vec![ConstructorId(0), ConstructorId(1)]);
        assert!(long.options.no_create_method);
    }

    #[test]
    fn test_merge_keeps_matching_representative() {
        let mut end = ConstructorMetadata::new(ConstructorId(2), 2, FluentOptions::default());
        let other = ConstructorMetadata::new(ConstructorId(0), 2, FluentOptions::default());
        end.merge(&other, 2);
        assert_eq!(end.constructor, ConstructorId(2));
        assert_eq!(end.candidate_constructors, vec![ConstructorId(0), ConstructorId(2)]);
    }
}

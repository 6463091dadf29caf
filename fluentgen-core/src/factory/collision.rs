//! Signature collision resolution on a single step.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{FluentMethod, MethodSignature};

/// A method proposed for a step, before collisions are resolved.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub method: FluentMethod,
    /// Where the method comes from: `Type::parameter` for parameters,
    /// `ConverterType::Method` for templates, the target for creation methods.
    pub source_key: String,
    /// Discovery order on this step.
    pub order: usize,
}

/// One signature: the winning candidate and the ones it shadows.
#[derive(Debug, Clone)]
pub(crate) struct CollisionGroup {
    pub survivor: Candidate,
    pub ignored: Vec<Candidate>,
}

/// Total order used to pick a survivor: higher priority, then regular before
/// multi before creation, then name, source key and discovery order.
pub(crate) fn survivor_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.method
        .priority()
        .cmp(&a.method.priority())
        .then_with(|| a.method.kind_rank().cmp(&b.method.kind_rank()))
        .then_with(|| a.method.name().cmp(b.method.name()))
        .then_with(|| a.source_key.cmp(&b.source_key))
        .then_with(|| a.order.cmp(&b.order))
}

/// Group candidates by signature and keep one per group. Groups come back in
/// order of first appearance.
pub(crate) fn resolve_collisions(candidates: Vec<Candidate>) -> Vec<CollisionGroup> {
    let mut index: HashMap<MethodSignature, usize> = HashMap::new();
    let mut groups: Vec<Vec<Candidate>> = Vec::new();

    for candidate in candidates {
        let signature = candidate.method.signature();
        match index.get(&signature) {
            Some(&i) => groups[i].push(candidate),
            None => {
                index.insert(signature, groups.len());
                groups.push(vec![candidate]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|mut members| {
            members.sort_by(survivor_order);
            let mut iter = members.into_iter();
            let survivor = iter.next()?;
            Some(CollisionGroup {
                survivor,
                ignored: iter.collect(),
            })
        })
        .collect()
}

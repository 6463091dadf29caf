//! Mutable state for building one factory root.
//!
//! A fresh context is created per call, so concurrent builds never share
//! anything but the read-only type system.

use std::collections::{BTreeSet, HashMap};

use crate::config::NamingConfig;
use crate::diagnostics::{Diagnostic, UnreachableConstructorAnalyzer};
use crate::generics::TypeParameterScope;
use crate::model::{
    ConstructorMetadata, FluentMethodParameter, FluentStep, FluentType, KnownParameter, NodeId,
    StepId, Trie,
};
use crate::symbols::{
    ConstructorContext, ConstructorId, FactoryRootType, TypeConstraints, TypeMapping,
    TypeParameter, TypeRef, TypeSystem,
};

use super::candidates::{prepare_constructor, ParameterPlan, PreparedConstructor};
use super::collision::{Candidate, CollisionGroup};

/// Identity of a regular step: the normalized known-parameter sequence.
pub(crate) type StepKey = Vec<(FluentType, String)>;

/// A synthesized step other trie nodes with the same key fold into.
#[derive(Debug, Clone)]
pub(crate) struct SharedStep {
    pub id: StepId,
    /// Scope and known parameters of the path that created the step.
    pub scope: TypeParameterScope,
    pub known: Vec<KnownParameter>,
    /// Methods currently on the step.
    pub survivors: Vec<Candidate>,
}

pub(crate) struct BuildContext<'a> {
    pub root: &'a FactoryRootType,
    pub contexts: &'a [ConstructorContext],
    pub naming: &'a NamingConfig,
    pub prepared: Vec<PreparedConstructor>,
    pub trie: Trie<FluentMethodParameter, ConstructorId>,
    pub diagnostics: Vec<Diagnostic>,
    pub unreachable: UnreachableConstructorAnalyzer,
    pub usings: BTreeSet<String>,
    /// Collisions in which a converter overload lost, reported after the walk.
    pub shadowed: Vec<CollisionGroup>,
    /// Provisional step slots, allocated in pre-order.
    steps: Vec<Option<FluentStep>>,
    regular_steps: HashMap<StepKey, SharedStep>,
}

impl<'a> BuildContext<'a> {
    /// Prepare every constructor and insert it into the trie.
    pub fn new(
        root: &'a FactoryRootType,
        contexts: &'a [ConstructorContext],
        naming: &'a NamingConfig,
        type_system: &dyn TypeSystem,
    ) -> Self {
        let mut cx = Self {
            root,
            contexts,
            naming,
            prepared: Vec::with_capacity(contexts.len()),
            trie: Trie::new(),
            diagnostics: Vec::new(),
            unreachable: UnreachableConstructorAnalyzer::new(),
            usings: BTreeSet::new(),
            shadowed: Vec::new(),
            steps: Vec::new(),
            regular_steps: HashMap::new(),
        };

        for (i, ctx) in contexts.iter().enumerate() {
            let id = ConstructorId(i);
            let prepared =
                prepare_constructor(id, ctx, type_system, naming, &mut cx.diagnostics);
            cx.collect_usings(ctx);

            // A parameter with no usable source already produced an error;
            // the constructor stays out of the trie and the reachability count.
            if prepared.parameters.iter().all(|p| !p.sources.is_empty()) {
                cx.unreachable.add_declared(
                    id,
                    ctx.constructor.display_signature(),
                    ctx.constructor.location.clone(),
                    Some(ctx.attribute_location.clone()),
                );
                let end = cx.trie.insert(prepared.keys(id), id);
                tracing::debug!(
                    constructor = %ctx.constructor.display_signature(),
                    depth = cx.trie.node(end).depth(),
                    "constructor inserted"
                );
            }
            cx.prepared.push(prepared);
        }

        if let Some(ns) = &root.namespace {
            cx.usings.remove(ns);
        }
        cx
    }

    fn collect_usings(&mut self, ctx: &ConstructorContext) {
        if let Some(ns) = &ctx.target().namespace {
            self.usings.insert(ns.clone());
        }
        for param in ctx.parameters() {
            param.ty.collect_namespaces(&mut self.usings);
            if let Some(group) = &param.method_group {
                group.declaring_type.collect_namespaces(&mut self.usings);
                for template in &group.templates {
                    for p in &template.parameters {
                        p.ty.collect_namespaces(&mut self.usings);
                    }
                }
            }
        }
    }

    pub fn plan(&self, key: &FluentMethodParameter) -> &ParameterPlan {
        &self.prepared[key.constructor.0].parameters[key.index]
    }

    pub fn context(&self, id: ConstructorId) -> &ConstructorContext {
        &self.contexts[id.0]
    }

    /// Metadata folded over every constructor ending at or below `node`.
    pub fn metadata(&self, node: NodeId) -> Option<ConstructorMetadata> {
        let depth = self.trie.node(node).depth();
        let mut values = self.trie.values(node).into_iter();
        let first = values.next()?;
        let mut merged = self.prepared[first.0].metadata.clone();
        for id in values {
            merged.merge(&self.prepared[id.0].metadata, depth);
        }
        Some(merged)
    }

    /// Constraints of `original` as declared on the constructor's target,
    /// in placeholder form. Only placeholders up to `bound_through` are kept.
    pub fn constraints_for(
        &self,
        ctor: ConstructorId,
        original: &str,
        bound_through: usize,
    ) -> TypeConstraints {
        let prepared = &self.prepared[ctor.0];
        let mapping: TypeMapping = prepared
            .placeholders
            .as_mapping()
            .into_iter()
            .filter(|(name, _)| prepared.placeholders.get(name).is_some_and(|i| i <= bound_through))
            .collect();
        self.context(ctor)
            .target()
            .declared_parameter(original)
            .map(|p| p.constraints.substitute(&mapping))
            .unwrap_or_default()
    }

    /// The constructor's target type as seen from `scope`, plus declarations
    /// for target type parameters the parameter list never mentions.
    pub fn target_type(
        &self,
        ctor: ConstructorId,
        scope: &TypeParameterScope,
    ) -> (TypeRef, Vec<TypeParameter>) {
        let target = self.context(ctor).target();
        let placeholders = &self.prepared[ctor.0].placeholders;
        let mut unbound = Vec::new();
        let mut renames = TypeMapping::new();

        let args = target
            .type_parameters
            .iter()
            .map(|tp| match placeholders.get(&tp.name) {
                Some(i) if i < scope.len() => TypeRef::param(scope.names()[i].clone()),
                _ => {
                    let name = scope.fresh_name(&tp.name);
                    if name != tp.name {
                        renames.insert(tp.name.clone(), TypeRef::param(name.clone()));
                    }
                    unbound.push((name.clone(), tp.constraints.clone()));
                    TypeRef::param(name)
                }
            })
            .collect();

        let mut bound = placeholders.as_mapping();
        bound.extend(renames);
        let unbound = unbound
            .into_iter()
            .map(|(name, c)| {
                let c = c.substitute(&bound);
                TypeParameter::with_constraints(name, scope_constraints(scope, c))
            })
            .collect();

        (
            TypeRef::named(target.namespace.as_deref(), target.name.clone(), args),
            unbound,
        )
    }

    pub fn reserve_step(&mut self) -> StepId {
        self.steps.push(None);
        StepId(self.steps.len() - 1)
    }

    pub fn fill_step(&mut self, id: StepId, step: FluentStep) {
        if let Some(slot) = self.steps.get_mut(id.0) {
            *slot = Some(step);
        }
    }

    pub fn step(&self, id: StepId) -> Option<&FluentStep> {
        self.steps.get(id.0).and_then(Option::as_ref)
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut FluentStep> {
        self.steps.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn take_step(&mut self, id: StepId) -> Option<FluentStep> {
        self.steps.get_mut(id.0).and_then(Option::take)
    }

    pub fn provisional_step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn shared_step(&self, key: &StepKey) -> Option<SharedStep> {
        self.regular_steps.get(key).cloned()
    }

    pub fn register_shared_step(&mut self, key: StepKey, step: SharedStep) {
        self.regular_steps.insert(key, step);
    }
}

fn scope_constraints(scope: &TypeParameterScope, constraints: TypeConstraints) -> TypeConstraints {
    TypeConstraints {
        bounds: constraints.bounds.iter().map(|b| scope.display(b)).collect(),
        ..constraints
    }
}

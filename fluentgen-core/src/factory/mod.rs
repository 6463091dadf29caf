//! Fluent model construction.
//!
//! [`FluentModelFactory::create_fluent_factory_compilation_unit`] turns every
//! constructor declared against one factory root into a
//! [`FluentFactoryCompilationUnit`]:
//!
//! 1. validate the constructor contexts (any error stops here)
//! 2. normalize parameters and insert them into a prefix trie
//! 3. walk the trie depth-first, materializing steps and methods and
//!    resolving signature collisions per step
//! 4. report converter overloads that lost a collision
//! 5. prune steps no root method leads to and number the survivors
//! 6. report constructors no path through the finished graph reaches

mod candidates;
mod collision;
mod context;
pub mod validate;
mod walk;

use std::collections::{BTreeSet, HashMap};

use crate::config::NamingConfig;
use crate::diagnostics::Diagnostic;
use crate::graph::StepGraph;
use crate::model::{ConstructorSummary, FluentFactoryCompilationUnit, FluentMethod, FluentStep, StepId};
use crate::symbols::{ConstructorContext, ConstructorId, FactoryRootType, TypeRef, TypeSystem};

use context::BuildContext;

pub use validate::{is_valid_identifier, validate_contexts};

/// Builds fluent models against a type system.
///
/// The factory holds no per-call state, so one instance can serve many roots
/// from many threads.
#[derive(Debug, Clone)]
pub struct FluentModelFactory<S: TypeSystem> {
    type_system: S,
    naming: NamingConfig,
}

impl<S: TypeSystem> FluentModelFactory<S> {
    pub fn new(type_system: S) -> Self {
        Self {
            type_system,
            naming: NamingConfig::default(),
        }
    }

    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn type_system(&self) -> &S {
        &self.type_system
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Build the model for `root` from the constructors declared against it.
    ///
    /// Never fails: problems are reported as diagnostics on the unit. When
    /// validation finds an error the unit carries diagnostics only.
    pub fn create_fluent_factory_compilation_unit(
        &self,
        root: &FactoryRootType,
        contexts: &[ConstructorContext],
    ) -> FluentFactoryCompilationUnit {
        let span = tracing::info_span!("fluent_factory", root = %root.qualified_name());
        let _guard = span.enter();

        let mut diagnostics = validate_contexts(root, contexts);
        if diagnostics.iter().any(Diagnostic::is_error) {
            tracing::warn!(
                diagnostics = diagnostics.len(),
                "validation failed, no members generated"
            );
            return FluentFactoryCompilationUnit::diagnostics_only(root, diagnostics);
        }

        let mut cx = BuildContext::new(root, contexts, &self.naming, &self.type_system);
        tracing::debug!(nodes = cx.trie.len(), "trie built");

        let root_methods = cx.build_root();
        cx.report_superseded(&root_methods);
        let (methods, steps, reached) = finish_steps(
            &mut cx,
            root_methods,
            &self.naming.step_type_prefix,
            &root.name,
        );
        cx.unreachable.mark_all_reached(reached);

        diagnostics.append(&mut cx.diagnostics);
        diagnostics.extend(cx.unreachable.unreachable_constructors_diagnostics());

        let constructors: Vec<ConstructorSummary> = contexts
            .iter()
            .enumerate()
            .map(|(i, ctx)| {
                let target = ctx.target();
                ConstructorSummary {
                    id: ConstructorId(i),
                    display: ctx.constructor.display_signature(),
                    target: TypeRef::named(
                        target.namespace.as_deref(),
                        target.name.clone(),
                        target
                            .type_parameters
                            .iter()
                            .map(|p| TypeRef::param(p.name.clone()))
                            .collect(),
                    ),
                    location: ctx.constructor.location.clone(),
                }
            })
            .collect();

        tracing::info!(
            constructors = contexts.len(),
            root_methods = methods.len(),
            steps = steps.len(),
            diagnostics = diagnostics.len(),
            "fluent model built"
        );

        FluentFactoryCompilationUnit {
            usings: std::mem::take(&mut cx.usings),
            methods,
            steps,
            constructors,
            diagnostics,
            ..FluentFactoryCompilationUnit::empty(root)
        }
    }
}

/// Keep the steps reachable from the root, renumber them in discovery order
/// and rewrite every step reference. Also returns the constructors the kept
/// graph reaches.
fn finish_steps(
    cx: &mut BuildContext<'_>,
    mut root_methods: Vec<FluentMethod>,
    prefix: &str,
    root_name: &str,
) -> (Vec<FluentMethod>, Vec<FluentStep>, BTreeSet<ConstructorId>) {
    let (live, reached) = {
        let view: &BuildContext<'_> = cx;
        let graph = StepGraph::build(&root_methods, |id| {
            view.step(id).map(|s| (s.methods(), s.arrival_constructor()))
        });
        (graph.live_steps(), graph.reachable_constructors())
    };

    let mut remap: HashMap<StepId, StepId> = HashMap::with_capacity(live.len());
    let mut steps = Vec::with_capacity(live.len());
    for old in &live {
        if let Some(step) = cx.take_step(*old) {
            remap.insert(*old, StepId(steps.len()));
            steps.push(step);
        }
    }

    let pruned = cx.provisional_step_count() - steps.len();
    if pruned > 0 {
        tracing::debug!(pruned, "dropped unreachable steps");
    }

    rewrite_step_references(&mut root_methods, &remap);
    for (i, step) in steps.iter_mut().enumerate() {
        step.assign_index(i, prefix, root_name);
        rewrite_step_references(step.methods_mut(), &remap);
    }

    (root_methods, steps, reached)
}

fn rewrite_step_references(methods: &mut [FluentMethod], remap: &HashMap<StepId, StepId>) {
    for method in methods {
        if let Some(new) = method.return_step().and_then(|old| remap.get(&old)) {
            method.set_return_step(*new);
        }
    }
}

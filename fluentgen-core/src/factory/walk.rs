//! Depth-first materialization of trie nodes into methods and steps.
//!
//! A later node can fold into a step an earlier node already produced, so
//! what a method reaches is only known once the walk is over. Collisions
//! that shadowed a converter are kept and reported against the finished
//! step graph.

use crate::config::pascal_case;
use crate::diagnostics::{IgnoredTemplate, MethodOutcome, SupersededMethodTemplateWarningFactory};
use crate::generics::{dedupe_type_parameters, TypeParameterScope};
use crate::graph::StepGraph;
use crate::model::method::template_summary;
use crate::model::{
    ConverterRef, CreationMethod, ExistingTypeFluentStep, FluentMethod, FluentMethodParameter,
    FluentReturn, FluentStep, KnownParameter, MethodParameter, MultiMethod, NodeId,
    RegularFluentStep, RegularMethod, SourceParameter, TargetTypeReturn, ValueStorage,
};
use crate::symbols::{ConstructorId, TypeMapping, TypeParameter, TypeRef};

use super::candidates::{MethodSource, TemplatePlan};
use super::collision::{resolve_collisions, Candidate};
use super::context::{BuildContext, SharedStep, StepKey};

/// Everything known about the path from the root to a node.
#[derive(Debug, Clone, Default)]
struct PathState {
    scope: TypeParameterScope,
    known: Vec<KnownParameter>,
    key: StepKey,
}

impl BuildContext<'_> {
    pub fn build_root(&mut self) -> Vec<FluentMethod> {
        let root = self.trie.root();
        let ambient = self.root.type_parameters.clone();
        self.build_node(root, &PathState::default(), &ambient, true)
    }

    /// Methods leaving `node`: one per edge key and method source, plus
    /// creation methods for constructors ending here when `with_creation`.
    fn build_node(
        &mut self,
        node: NodeId,
        path: &PathState,
        ambient: &[TypeParameter],
        with_creation: bool,
    ) -> Vec<FluentMethod> {
        let mut candidates = Vec::new();
        self.node_candidates(node, path, ambient, with_creation, &mut candidates);
        methods_of(self.select(candidates))
    }

    fn node_candidates(
        &mut self,
        node: NodeId,
        path: &PathState,
        ambient: &[TypeParameter],
        with_creation: bool,
        candidates: &mut Vec<Candidate>,
    ) {
        let children = self.trie.node(node).children().to_vec();
        for child in children {
            let Some(child_path) = self.extend_path(child, path) else {
                continue;
            };
            let ret = self.materialize(child, &child_path);
            let keys = self.trie.node(child).encountered_key_parts().to_vec();
            for key in &keys {
                self.edge_candidates(key, path, &child_path, ambient, &ret, candidates);
            }
        }

        if with_creation {
            let ends = self.trie.node(node).end_values().to_vec();
            for ctor in ends {
                if !self.context(ctor).options.no_create_method {
                    let order = candidates.len();
                    candidates.push(self.creation_candidate(ctor, &path.scope, ambient, order));
                }
            }
        }
    }

    fn extend_path(&self, child: NodeId, parent: &PathState) -> Option<PathState> {
        let key = self.trie.node(child).key()?;
        let plan = self.plan(key);

        let mut scope = parent.scope.clone();
        for (index, original) in &plan.introduced {
            let constraints = self.constraints_for(key.constructor, original, *index);
            scope.bind(*index, original, constraints);
        }

        let name = plan.symbol.name.clone();
        let field = if parent.known.iter().any(|k| k.name == name) {
            format!("_{}{}", name, parent.known.len())
        } else {
            format!("_{}", name)
        };
        let mut known = parent.known.clone();
        known.push(KnownParameter {
            name: name.clone(),
            ty: scope.display(&plan.ty),
            storage: ValueStorage::Field { name: field },
        });

        let mut step_key = parent.key.clone();
        step_key.push((key.ty.clone(), name));

        Some(PathState {
            scope,
            known,
            key: step_key,
        })
    }

    /// What calling into `node` produces.
    fn materialize(&mut self, node: NodeId, path: &PathState) -> FluentReturn {
        let trie_node = self.trie.node(node);
        let has_children = !trie_node.children().is_empty();
        let (direct, creatable): (Vec<ConstructorId>, Vec<ConstructorId>) = trie_node
            .end_values()
            .iter()
            .copied()
            .partition(|id| self.context(*id).options.no_create_method);
        let metadata = self.metadata(node);

        // Last parameter of a constructor without a creation method.
        if !has_children && creatable.is_empty() {
            if let Some(&ctor) = direct.first() {
                let (target, _) = self.target_type(ctor, &path.scope);
                let candidate_constructors = metadata
                    .map(|m| m.candidate_constructors)
                    .unwrap_or_else(|| vec![ctor]);
                return FluentReturn::Target(TargetTypeReturn {
                    target,
                    constructor: ctor,
                    candidate_constructors,
                });
            }
        }

        // The target itself can carry the remaining methods.
        if direct.len() == 1
            && creatable.is_empty()
            && self.context(direct[0]).target().accepts_generated_members()
        {
            return self.existing_type_step(node, direct[0], path);
        }

        if let Some(shared) = self.shared_step(&path.key) {
            return self.extend_shared_step(node, &path.key, shared);
        }

        let id = self.reserve_step();
        let type_parameters = path.scope.declarations();
        let mut candidates = Vec::new();
        self.node_candidates(node, path, &type_parameters, true, &mut candidates);
        let survivors = self.select(candidates);
        let (constructor, candidate_constructors) = match metadata {
            Some(m) => (m.constructor, m.candidate_constructors),
            None => (ConstructorId(0), Vec::new()),
        };
        self.fill_step(
            id,
            FluentStep::Regular(RegularFluentStep {
                index: id.0,
                name: String::new(),
                known_parameters: path.known.clone(),
                type_parameters,
                methods: methods_of(survivors.clone()),
                constructor,
                candidate_constructors,
            }),
        );
        self.register_shared_step(
            path.key.clone(),
            SharedStep {
                id,
                scope: path.scope.clone(),
                known: path.known.clone(),
                survivors,
            },
        );
        FluentReturn::Step { step: id }
    }

    /// Fold the methods of another node with the same known-parameter
    /// sequence into an already synthesized step.
    fn extend_shared_step(
        &mut self,
        node: NodeId,
        key: &StepKey,
        shared: SharedStep,
    ) -> FluentReturn {
        let path = PathState {
            scope: shared.scope.clone(),
            known: shared.known.clone(),
            key: key.clone(),
        };
        let type_parameters = path.scope.declarations();

        let mut candidates = shared.survivors;
        for (order, candidate) in candidates.iter_mut().enumerate() {
            candidate.order = order;
        }
        self.node_candidates(node, &path, &type_parameters, true, &mut candidates);
        let survivors = self.select(candidates);
        let folded = self
            .metadata(node)
            .map(|m| m.candidate_constructors)
            .unwrap_or_default();

        if let Some(step) = self.step_mut(shared.id) {
            *step.methods_mut() = methods_of(survivors.clone());
        }
        if let Some(FluentStep::Regular(step)) = self.step_mut(shared.id) {
            for ctor in &folded {
                if let Err(pos) = step.candidate_constructors.binary_search(ctor) {
                    step.candidate_constructors.insert(pos, *ctor);
                }
            }
        }
        self.register_shared_step(
            key.clone(),
            SharedStep {
                id: shared.id,
                scope: path.scope,
                known: path.known,
                survivors,
            },
        );
        tracing::debug!(step = %shared.id, "folded node into shared step");
        FluentReturn::Step { step: shared.id }
    }

    fn existing_type_step(
        &mut self,
        node: NodeId,
        ctor: ConstructorId,
        path: &PathState,
    ) -> FluentReturn {
        let id = self.reserve_step();
        let (target, _) = self.target_type(ctor, &path.scope);
        let type_parameters = path.scope.declarations();
        let methods = self.build_node(node, path, &type_parameters, false);

        let known_parameters: Vec<KnownParameter> = path
            .known
            .iter()
            .zip(self.context(ctor).parameters())
            .map(|(known, param)| KnownParameter {
                name: param.name.clone(),
                ty: known.ty.clone(),
                storage: ValueStorage::Property {
                    name: param
                        .storage_member
                        .clone()
                        .unwrap_or_else(|| pascal_case(&param.name)),
                },
            })
            .collect();

        self.fill_step(
            id,
            FluentStep::ExistingType(ExistingTypeFluentStep {
                index: id.0,
                target,
                constructor: ctor,
                known_parameters,
                type_parameters,
                methods,
            }),
        );
        FluentReturn::Step { step: id }
    }

    #[allow(clippy::too_many_arguments)]
    fn edge_candidates(
        &self,
        key: &FluentMethodParameter,
        parent: &PathState,
        child: &PathState,
        ambient: &[TypeParameter],
        ret: &FluentReturn,
        out: &mut Vec<Candidate>,
    ) {
        let plan = self.plan(key);
        let ctx = self.context(key.constructor);
        let symbol = &plan.symbol;

        let mut introduced = child.scope.declarations_from(parent.scope.len());
        if let FluentReturn::Target(t) = ret {
            introduced.extend(self.target_type(t.constructor, &child.scope).1);
        }

        let source_parameter = SourceParameter {
            constructor: key.constructor,
            index: key.index,
            name: symbol.name.clone(),
            ty: child.scope.display(&plan.ty),
        };

        for source in &plan.sources {
            let (method, source_key) = match source {
                MethodSource::Regular { name } => (
                    FluentMethod::Regular(RegularMethod {
                        name: name.clone(),
                        source_parameter: source_parameter.clone(),
                        method_parameters: vec![MethodParameter {
                            name: symbol.name.clone(),
                            ty: source_parameter.ty.clone(),
                            documentation: plan.documentation.clone(),
                        }],
                        type_parameters: dedupe_type_parameters(introduced.clone(), ambient),
                        ret: ret.clone(),
                        documentation: plan.documentation.clone(),
                        priority: symbol.priority,
                        location: symbol.location.clone(),
                    }),
                    format!("{}::{}", ctx.target().qualified_name(), symbol.name),
                ),
                MethodSource::Template(template) => (
                    self.multi_method(
                        template,
                        &source_parameter,
                        plan.documentation.as_deref(),
                        symbol.priority,
                        &child.scope,
                        introduced.clone(),
                        ambient,
                        ret,
                    ),
                    format!(
                        "{}::{}",
                        template.declaring_type.qualified_name(),
                        template.template.name
                    ),
                ),
            };
            let order = out.len();
            out.push(Candidate {
                method,
                source_key,
                order,
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn multi_method(
        &self,
        plan: &TemplatePlan,
        source_parameter: &SourceParameter,
        parameter_docs: Option<&str>,
        parameter_priority: i32,
        scope: &TypeParameterScope,
        mut type_parameters: Vec<TypeParameter>,
        ambient: &[TypeParameter],
        ret: &FluentReturn,
    ) -> FluentMethod {
        let template = &plan.template;

        // Converter-only type parameters keep their names unless the path
        // already uses them.
        let mut renames = TypeMapping::new();
        let mut taken: Vec<String> = scope.names().to_vec();
        taken.extend(type_parameters.iter().map(|p| p.name.clone()));
        for free in &plan.free_type_parameters {
            let mut name = free.name.clone();
            let mut n = 1;
            while taken.contains(&name) {
                name = format!("{}{}", free.name, n);
                n += 1;
            }
            if name != free.name {
                renames.insert(free.name.clone(), TypeRef::param(name.clone()));
            }
            taken.push(name);
        }
        let render = |ty: &TypeRef| scope.display(&ty.substitute(&renames));

        for free in &plan.free_type_parameters {
            let mut constraints = free.constraints.clone();
            constraints.bounds = constraints.bounds.iter().map(&render).collect();
            let name = renames
                .get(&free.name)
                .and_then(TypeRef::param_name)
                .unwrap_or(free.name.as_str())
                .to_string();
            type_parameters.push(TypeParameter::with_constraints(name, constraints));
        }

        let docs = template.documentation.as_ref();
        let method_parameters = plan
            .parameters
            .iter()
            .map(|(name, ty)| MethodParameter {
                name: name.clone(),
                ty: render(ty),
                documentation: docs.and_then(|d| d.parameter(name)).map(str::to_string),
            })
            .collect();

        FluentMethod::Multi(MultiMethod {
            name: template.name.clone(),
            source_parameter: source_parameter.clone(),
            method_parameters,
            type_parameters: dedupe_type_parameters(type_parameters, ambient),
            ret: ret.clone(),
            documentation: template_summary(docs, parameter_docs),
            priority: if template.priority != 0 {
                template.priority
            } else {
                parameter_priority
            },
            converter: ConverterRef {
                declaring_type: plan.declaring_type.clone(),
                method: template.name.clone(),
                arguments: plan.parameters.iter().map(|(n, _)| n.clone()).collect(),
            },
            siblings: plan.siblings.clone(),
            attribute_location: plan.attribute_location.clone(),
            template_locations: template.locations.clone(),
        })
    }

    fn creation_candidate(
        &self,
        ctor: ConstructorId,
        scope: &TypeParameterScope,
        ambient: &[TypeParameter],
        order: usize,
    ) -> Candidate {
        let ctx = self.context(ctor);
        let (target, unbound) = self.target_type(ctor, scope);
        let name = ctx
            .create_method_name
            .clone()
            .unwrap_or_else(|| self.naming.creation_method_name(&ctx.target().name));

        Candidate {
            method: FluentMethod::Creation(CreationMethod {
                name,
                target: TargetTypeReturn {
                    target,
                    constructor: ctor,
                    candidate_constructors: vec![ctor],
                },
                type_parameters: dedupe_type_parameters(unbound, ambient),
                documentation: ctx
                    .constructor
                    .documentation
                    .as_ref()
                    .and_then(|d| d.summary.clone()),
                location: ctx.constructor.location.clone(),
            }),
            source_key: ctx.target().qualified_name(),
            order,
        }
    }

    /// Resolve collisions, keeping groups that shadowed a converter for
    /// [`Self::report_superseded`]. Returns the surviving candidates in order
    /// of first appearance.
    fn select(&mut self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut survivors = Vec::new();
        for group in resolve_collisions(candidates) {
            if !group.ignored.is_empty() {
                tracing::debug!(
                    method = %group.survivor.method.display_signature(),
                    ignored = group.ignored.len(),
                    "signature collision"
                );
                if group.ignored.iter().any(|c| c.method.is_multi()) {
                    self.shadowed.push(group.clone());
                }
            }
            survivors.push(group.survivor);
        }
        survivors
    }

    /// Report converter overloads that lost a collision, judging what each
    /// method reaches by the finished step graph.
    pub fn report_superseded(&mut self, root_methods: &[FluentMethod]) {
        let groups = std::mem::take(&mut self.shadowed);
        if groups.is_empty() {
            return;
        }

        // Losing methods may lead to steps nothing else uses; enter the graph
        // through every recorded method so those steps are walked too.
        let mut entries = root_methods.to_vec();
        for group in &groups {
            entries.push(group.survivor.method.clone());
            entries.extend(group.ignored.iter().map(|c| c.method.clone()));
        }

        let factory = SupersededMethodTemplateWarningFactory::new();
        let mut diagnostics = Vec::new();
        {
            let view: &BuildContext<'_> = self;
            let graph = StepGraph::build(&entries, |id| {
                view.step(id).map(|s| (s.methods(), s.arrival_constructor()))
            });
            for group in &groups {
                let ignored: Vec<IgnoredTemplate> = group
                    .ignored
                    .iter()
                    .filter_map(|c| match &c.method {
                        FluentMethod::Multi(m) => Some(IgnoredTemplate {
                            outcome: outcome_of(&c.method, &graph),
                            attribute_location: m.attribute_location.clone(),
                            template_locations: m.template_locations.clone(),
                            parameter: m.source_parameter.name.clone(),
                            constructor: view
                                .context(m.source_parameter.constructor)
                                .constructor
                                .display_signature(),
                        }),
                        _ => None,
                    })
                    .collect();
                let survivor = outcome_of(&group.survivor.method, &graph);
                diagnostics.extend(factory.create(&survivor, &ignored));
            }
        }
        self.diagnostics.extend(diagnostics);
    }
}

fn methods_of(survivors: Vec<Candidate>) -> Vec<FluentMethod> {
    survivors.into_iter().map(|c| c.method).collect()
}

fn outcome_of(method: &FluentMethod, graph: &StepGraph) -> MethodOutcome {
    MethodOutcome {
        display: method.display_signature(),
        location: method.location(),
        converter_type: match method {
            FluentMethod::Multi(m) => Some(m.converter.declaring_type.clone()),
            _ => None,
        },
        reach: graph.method_reach(method),
    }
}

//! Composition engine - lowers the syntax tree into the IR contract
//!
//! Lowering is a single depth-first traversal per screen. User-defined
//! macros are expanded inline with an explicit per-invocation context, so
//! no macro name ever survives into the final node map. All fatal problems
//! are accumulated and reported together after every screen is processed.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::ast::{Definition, PropMap, PropValue, SourceNode, SourceProject};
use crate::ir::{
    self, ComponentNode, ContainerKind, ContainerNode, ContainerStyle, IrContract, Node, NodeMeta,
    NodeRef, Project, Screen, Viewport, IR_VERSION,
};
use crate::palette::Palette;
use crate::style::ResolvedStyle;

use super::error::{CompositionError, CompositionIssue, CompositionWarning};
use super::ids::IdGenerator;
use super::registry::{DefinitionKind, DefinitionRegistry};

/// Reserved component name standing in for a defined layout's content slot
pub const CHILDREN_SLOT: &str = "Children";

/// The primitive component kinds the layout engine and renderer understand.
/// Sorted, so membership checks can binary-search.
pub const BUILTIN_COMPONENTS: &[&str] = &[
    "Alert",
    "Avatar",
    "Badge",
    "Breadcrumbs",
    "Button",
    "Chart",
    "Checkbox",
    "Divider",
    "Heading",
    "Icon",
    "Image",
    "Input",
    "Link",
    "Progress",
    "Radio",
    "Searchbar",
    "Select",
    "Separate",
    "SidebarMenu",
    "Slider",
    "Switch",
    "Table",
    "Tabs",
    "Text",
    "Textarea",
    "Topbar",
];

/// Component properties with no default: a missing binding here is fatal
const REQUIRED_PROPS: &[(&str, &str)] = &[
    ("Alert", "text"),
    ("Badge", "text"),
    ("Button", "label"),
    ("Heading", "text"),
    ("Link", "text"),
    ("Text", "text"),
];

/// Container parameter keys that move into the resolved style record
const STYLE_KEYS: &[&str] = &["padding", "gap", "align", "background"];

fn is_builtin(component: &str) -> bool {
    BUILTIN_COMPONENTS.binary_search(&component).is_ok()
}

fn required_prop(target: &str, property: &str) -> bool {
    REQUIRED_PROPS
        .iter()
        .any(|(t, p)| *t == target && *p == property)
}

/// Per-invocation macro expansion state.
///
/// Each nested invocation gets its own context built from its own caller's
/// arguments; contexts are never shared between invocations.
#[derive(Debug)]
struct ExpansionContext {
    macro_name: String,
    kind: DefinitionKind,
    args: BTreeMap<String, PropValue>,
    used: BTreeSet<String>,
    allows_children: bool,
    slot: Option<NodeRef>,
}

impl ExpansionContext {
    fn new(
        macro_name: &str,
        kind: DefinitionKind,
        args: BTreeMap<String, PropValue>,
        allows_children: bool,
        slot: Option<NodeRef>,
    ) -> Self {
        Self {
            macro_name: macro_name.to_string(),
            kind,
            args,
            used: BTreeSet::new(),
            allows_children,
            slot,
        }
    }
}

/// The composition engine. Carries all per-run mutable state (symbol tables,
/// id counters, the growing node map); construct a fresh one per compilation
/// and never share instances across concurrent runs.
#[derive(Debug, Default)]
pub struct Composer {
    ids: IdGenerator,
    registry: DefinitionRegistry,
    nodes: BTreeMap<String, Node>,
    issues: Vec<CompositionIssue>,
    warnings: Vec<CompositionWarning>,
    undefined: BTreeSet<String>,
}

/// Generate the IR contract for a project with a fresh composer.
///
/// Returns the contract together with the non-fatal warnings collected
/// during lowering.
pub fn compose(
    project: &SourceProject,
) -> Result<(IrContract, Vec<CompositionWarning>), CompositionError> {
    let mut composer = Composer::new();
    let contract = composer.generate(project)?;
    Ok((contract, composer.take_warnings()))
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings collected by the most recent `generate` call
    pub fn warnings(&self) -> &[CompositionWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<CompositionWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Lower a source project into the IR contract.
    ///
    /// All definitions are registered before any screen is lowered, so a
    /// screen may invoke a macro defined later in the source. Fatal errors
    /// are collected across every screen and reported together; partial
    /// output is never returned.
    pub fn generate(&mut self, project: &SourceProject) -> Result<IrContract, CompositionError> {
        self.reset();

        debug!(
            "composing project {:?}: {} components, {} layouts, {} screens",
            project.name,
            project.components.len(),
            project.layouts.len(),
            project.screens.len()
        );

        for def in &project.components {
            if !self.registry.register_component(def.clone()) {
                self.warn(CompositionWarning::DuplicateDefinition {
                    name: def.name.clone(),
                });
            }
        }
        for def in &project.layouts {
            if !self.registry.register_layout(def.clone()) {
                self.warn(CompositionWarning::DuplicateDefinition {
                    name: def.name.clone(),
                });
            }
        }

        let style = ResolvedStyle::from_tokens(&project.style);
        let (width, min_height) = style.viewport();

        let mut screens = Vec::with_capacity(project.screens.len());
        for decl in &project.screens {
            let root = self.lower_node(&decl.root, None);
            let id = self.ids.generate("screen");
            debug!("lowered screen {:?} as {}", decl.name, id);
            screens.push(Screen {
                id,
                name: decl.name.clone(),
                viewport: Viewport { width, min_height },
                background: decl.background.clone().or_else(|| style.background.clone()),
                root,
            });
        }

        if !self.undefined.is_empty() {
            return Err(CompositionError::UndefinedComponents {
                names: self.undefined.iter().cloned().collect(),
            });
        }
        if !self.issues.is_empty() {
            return Err(CompositionError::Failed {
                issues: std::mem::take(&mut self.issues),
            });
        }

        let contract = IrContract {
            ir_version: IR_VERSION.to_string(),
            project: Project {
                id: self.ids.generate("project"),
                name: project.name.clone(),
                style,
                mocks: project.mocks.clone(),
                colors: Palette::default().merged(&project.colors),
                screens,
                nodes: std::mem::take(&mut self.nodes),
            },
        };

        ir::validate(&contract)?;
        Ok(contract)
    }

    fn reset(&mut self) {
        self.ids.reset();
        self.registry.clear();
        self.nodes.clear();
        self.issues.clear();
        self.warnings.clear();
        self.undefined.clear();
    }

    fn warn(&mut self, warning: CompositionWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    // ------------------------------------------------------------------
    // Node lowering
    // ------------------------------------------------------------------

    fn lower_node(
        &mut self,
        node: &SourceNode,
        mut ctx: Option<&mut ExpansionContext>,
    ) -> NodeRef {
        match node {
            SourceNode::Layout {
                kind,
                params,
                children,
            } => {
                if let Some(def) = self.registry.layout(kind).cloned() {
                    self.expand_layout(&def, params, children, ctx)
                } else {
                    self.lower_container(kind, params, children, ctx.as_deref_mut())
                }
            }
            SourceNode::Cell { params, children } => self.lower_cell(params, children, ctx),
            SourceNode::Component { component, props } => {
                if component == CHILDREN_SLOT {
                    return self.resolve_children_slot(ctx);
                }
                if let Some(def) = self.registry.component(component).cloned() {
                    return self.expand_component(&def, props, ctx);
                }
                // A defined layout invoked through a component node still
                // expands as a layout; the missing content child surfaces
                // as an arity error rather than an undefined component.
                if let Some(def) = self.registry.layout(component).cloned() {
                    return self.expand_layout(&def, props, &[], ctx);
                }
                self.lower_component(component, props, ctx)
            }
        }
    }

    fn lower_container(
        &mut self,
        kind: &str,
        params: &PropMap,
        children: &[SourceNode],
        mut ctx: Option<&mut ExpansionContext>,
    ) -> NodeRef {
        let mut refs = Vec::with_capacity(children.len());
        for child in children {
            refs.push(self.lower_node(child, ctx.as_deref_mut()));
        }

        let resolved = self.resolve_values(params, kind, ctx);
        let (params, style) = split_container_style(resolved);

        let id = self.ids.generate("node");
        self.nodes.insert(
            id.clone(),
            Node::Container(ContainerNode {
                id: id.clone(),
                kind: ContainerKind::parse(kind),
                params,
                children: refs,
                style,
                meta: NodeMeta::default(),
            }),
        );
        NodeRef::new(id)
    }

    /// Cells lower as stack containers with their parameters kept verbatim
    /// (no style split, no default padding) and a `source: "cell"` tag so
    /// the layout engine can recognize grid cells.
    fn lower_cell(
        &mut self,
        params: &PropMap,
        children: &[SourceNode],
        mut ctx: Option<&mut ExpansionContext>,
    ) -> NodeRef {
        let mut refs = Vec::with_capacity(children.len());
        for child in children {
            refs.push(self.lower_node(child, ctx.as_deref_mut()));
        }

        let params = self.resolve_values(params, "cell", ctx);

        let id = self.ids.generate("node");
        self.nodes.insert(
            id.clone(),
            Node::Container(ContainerNode {
                id: id.clone(),
                kind: ContainerKind::Stack,
                params,
                children: refs,
                style: ContainerStyle::default(),
                meta: NodeMeta::cell(),
            }),
        );
        NodeRef::new(id)
    }

    fn lower_component(
        &mut self,
        component: &str,
        props: &PropMap,
        ctx: Option<&mut ExpansionContext>,
    ) -> NodeRef {
        let props = self.resolve_values(props, component, ctx);

        if !is_builtin(component) {
            self.undefined.insert(component.to_string());
        }

        let id = self.ids.generate("cmp");
        self.nodes.insert(
            id.clone(),
            Node::Component(ComponentNode {
                id: id.clone(),
                component: component.to_string(),
                props,
                style: ContainerStyle::default(),
                meta: NodeMeta::default(),
            }),
        );
        NodeRef::new(id)
    }

    /// An empty stack standing in for a node that could not be produced;
    /// the accompanying issue makes the compilation fail regardless.
    fn placeholder_node(&mut self) -> NodeRef {
        let id = self.ids.generate("node");
        self.nodes.insert(
            id.clone(),
            Node::Container(ContainerNode {
                id: id.clone(),
                kind: ContainerKind::Stack,
                params: PropMap::new(),
                children: vec![],
                style: ContainerStyle::default(),
                meta: NodeMeta::default(),
            }),
        );
        NodeRef::new(id)
    }

    // ------------------------------------------------------------------
    // Macro expansion
    // ------------------------------------------------------------------

    /// Expand a defined component: lower its body under a context exposing
    /// the caller's resolved properties as bindable arguments. Exactly one
    /// node id replaces the invocation; the macro name never reaches the IR.
    fn expand_component(
        &mut self,
        def: &Definition,
        caller_props: &PropMap,
        mut ctx: Option<&mut ExpansionContext>,
    ) -> NodeRef {
        if matches!(def.body, SourceNode::Cell { .. }) {
            self.issues.push(CompositionIssue::InvalidDefinitionBody {
                name: def.name.clone(),
            });
            return self.placeholder_node();
        }

        let args = self.resolve_values(caller_props, &def.name, ctx.as_deref_mut());
        self.check_required_params(def, &args);

        let mut scope =
            ExpansionContext::new(&def.name, DefinitionKind::Component, args, false, None);
        let node_ref = self.lower_node(&def.body, Some(&mut scope));

        self.report_unused(&scope, caller_props);
        node_ref
    }

    /// Expand a defined layout: a content-slot macro invoked with exactly
    /// one child. The slot content is lowered in the caller's scope before
    /// the body is lowered in the macro's own scope.
    fn expand_layout(
        &mut self,
        def: &Definition,
        caller_params: &PropMap,
        children: &[SourceNode],
        mut ctx: Option<&mut ExpansionContext>,
    ) -> NodeRef {
        if children.len() != 1 {
            self.issues.push(CompositionIssue::LayoutChildrenArity {
                layout: def.name.clone(),
                found: children.len(),
            });
        }

        let slot = match children.first() {
            Some(SourceNode::Component { component, .. }) if component == CHILDREN_SLOT => {
                // Slot forwarding: the lone child is itself the reserved
                // placeholder, resolved against the enclosing macro's slot.
                match ctx.as_deref_mut() {
                    Some(scope) if scope.allows_children => scope.slot.clone(),
                    Some(scope) => {
                        self.issues
                            .push(CompositionIssue::ChildrenSlotOutsideDefinition {
                                context: format!(
                                    "forwarding into {} from {} {}",
                                    def.name,
                                    scope.kind.as_str(),
                                    scope.macro_name
                                ),
                            });
                        None
                    }
                    None => {
                        self.issues
                            .push(CompositionIssue::ChildrenSlotOutsideDefinition {
                                context: format!("forwarding into {} at top level", def.name),
                            });
                        None
                    }
                }
            }
            Some(child) => Some(self.lower_node(child, ctx.as_deref_mut())),
            None => None,
        };

        // Extra content children are still lowered so their own problems
        // surface alongside the arity error.
        for extra in children.iter().skip(1) {
            self.lower_node(extra, ctx.as_deref_mut());
        }

        let args = self.resolve_values(caller_params, &def.name, ctx.as_deref_mut());
        self.check_required_params(def, &args);

        let mut scope = ExpansionContext::new(&def.name, DefinitionKind::Layout, args, true, slot);
        let node_ref = self.lower_node(&def.body, Some(&mut scope));

        self.report_unused(&scope, caller_params);
        node_ref
    }

    fn resolve_children_slot(&mut self, ctx: Option<&mut ExpansionContext>) -> NodeRef {
        match ctx {
            Some(scope) if scope.allows_children => match scope.slot.clone() {
                Some(slot) => slot,
                // The arity error for the missing content child is already
                // recorded; keep the node map consistent.
                None => self.placeholder_node(),
            },
            Some(scope) => {
                self.issues
                    .push(CompositionIssue::ChildrenSlotOutsideDefinition {
                        context: format!("inside {} {}", scope.kind.as_str(), scope.macro_name),
                    });
                self.placeholder_node()
            }
            None => {
                self.issues
                    .push(CompositionIssue::ChildrenSlotOutsideDefinition {
                        context: "outside any definition".to_string(),
                    });
                self.placeholder_node()
            }
        }
    }

    // ------------------------------------------------------------------
    // Argument binding
    // ------------------------------------------------------------------

    /// Substitute bound-argument values against the active expansion
    /// context. Missing optional bindings drop the property with a warning;
    /// missing required bindings are fatal. Outside any expansion the raw
    /// marker passes through for the renderer.
    fn resolve_values(
        &mut self,
        values: &PropMap,
        target: &str,
        mut ctx: Option<&mut ExpansionContext>,
    ) -> PropMap {
        let mut resolved = PropMap::new();
        for (key, value) in values {
            let bind = match value.as_bound() {
                Some(bind) => bind,
                None => {
                    resolved.insert(key.clone(), value.clone());
                    continue;
                }
            };
            match ctx.as_deref_mut() {
                Some(scope) => {
                    if let Some(arg) = scope.args.get(bind).cloned() {
                        scope.used.insert(bind.to_string());
                        resolved.insert(key.clone(), arg);
                    } else if required_prop(target, key) {
                        self.issues
                            .push(CompositionIssue::MissingRequiredBoundValue {
                                macro_name: scope.macro_name.clone(),
                                target: target.to_string(),
                                property: key.clone(),
                            });
                    } else {
                        self.warn(CompositionWarning::MissingBoundValue {
                            macro_name: scope.macro_name.clone(),
                            target: target.to_string(),
                            property: key.clone(),
                        });
                    }
                }
                None if required_prop(target, key) => {
                    self.issues
                        .push(CompositionIssue::MissingRequiredBoundValue {
                            macro_name: "top level".to_string(),
                            target: target.to_string(),
                            property: key.clone(),
                        });
                }
                None => {
                    resolved.insert(key.clone(), value.clone());
                }
            }
        }
        resolved
    }

    fn check_required_params(&mut self, def: &Definition, args: &PropMap) {
        for param in &def.params {
            if param.required && !args.contains_key(&param.name) {
                self.issues
                    .push(CompositionIssue::MissingRequiredBoundValue {
                        macro_name: def.name.clone(),
                        target: def.name.clone(),
                        property: param.name.clone(),
                    });
            }
        }
    }

    fn report_unused(&mut self, scope: &ExpansionContext, caller_values: &PropMap) {
        let macro_name = scope.macro_name.clone();
        let unused: Vec<String> = caller_values
            .keys()
            .filter(|name| !scope.used.contains(*name))
            .cloned()
            .collect();
        for argument in unused {
            self.warn(CompositionWarning::UnusedDefinitionArgument {
                macro_name: macro_name.clone(),
                argument,
            });
        }
    }
}

/// Split style-only keys out of a container's parameter map.
///
/// Padding becomes the literal string `"none"` when absent so the layout
/// engine never guesses; the remaining keys stay in `params` untouched.
fn split_container_style(mut params: PropMap) -> (PropMap, ContainerStyle) {
    let mut style = ContainerStyle::default();
    for key in STYLE_KEYS {
        let Some(value) = params.remove(*key) else {
            continue;
        };
        let Some(text) = value.as_str().map(str::to_string) else {
            continue;
        };
        match *key {
            "padding" => style.padding = text,
            "gap" => style.gap = Some(text),
            "align" => style.align = Some(text),
            "background" => style.background = Some(text),
            _ => {}
        }
    }
    (params, style)
}

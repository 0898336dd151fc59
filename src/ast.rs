//! Syntax-tree input types for the wireframe compiler backend
//!
//! The tree is produced by an external parser and treated as read-only here.
//! Serde derives let front ends hand trees across a process boundary; the
//! builder-style constructors exist for programmatic construction and tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A scalar property value on a layout, component, or cell node.
///
/// Macro arguments are an explicit variant rather than a magic string marker,
/// so binding resolution never has to sniff string contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Num(f64),
    Bound { bind: String },
    Str(String),
}

impl PropValue {
    /// Create a bound-argument reference
    pub fn bound(name: impl Into<String>) -> Self {
        PropValue::Bound { bind: name.into() }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            PropValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// The referenced argument name, for bound values
    pub fn as_bound(&self) -> Option<&str> {
        match self {
            PropValue::Bound { bind } => Some(bind.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Num(n)
    }
}

/// Property map shared by all node kinds
pub type PropMap = BTreeMap<String, PropValue>;

/// A node in the source tree - containers and cells carry children,
/// components are leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceNode {
    Layout {
        kind: String,
        #[serde(default)]
        params: PropMap,
        #[serde(default)]
        children: Vec<SourceNode>,
    },
    Component {
        component: String,
        #[serde(default)]
        props: PropMap,
    },
    Cell {
        #[serde(default)]
        params: PropMap,
        #[serde(default)]
        children: Vec<SourceNode>,
    },
}

impl SourceNode {
    pub fn layout(kind: impl Into<String>) -> Self {
        SourceNode::Layout {
            kind: kind.into(),
            params: PropMap::new(),
            children: vec![],
        }
    }

    pub fn component(component: impl Into<String>) -> Self {
        SourceNode::Component {
            component: component.into(),
            props: PropMap::new(),
        }
    }

    pub fn cell() -> Self {
        SourceNode::Cell {
            params: PropMap::new(),
            children: vec![],
        }
    }

    /// Set a property (components) or parameter (layouts and cells)
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        match &mut self {
            SourceNode::Layout { params, .. } | SourceNode::Cell { params, .. } => {
                params.insert(key.into(), value.into());
            }
            SourceNode::Component { props, .. } => {
                props.insert(key.into(), value.into());
            }
        }
        self
    }

    /// Append a child; no-op on components, which are leaves
    pub fn with_child(mut self, child: SourceNode) -> Self {
        match &mut self {
            SourceNode::Layout { children, .. } | SourceNode::Cell { children, .. } => {
                children.push(child);
            }
            SourceNode::Component { .. } => {}
        }
        self
    }

    pub fn with_children(mut self, new_children: impl IntoIterator<Item = SourceNode>) -> Self {
        match &mut self {
            SourceNode::Layout { children, .. } | SourceNode::Cell { children, .. } => {
                children.extend(new_children);
            }
            SourceNode::Component { .. } => {}
        }
        self
    }

    /// The type tag of this node: layout kind or component name
    pub fn type_name(&self) -> &str {
        match self {
            SourceNode::Layout { kind, .. } => kind.as_str(),
            SourceNode::Component { component, .. } => component.as_str(),
            SourceNode::Cell { .. } => "cell",
        }
    }
}

/// A declared parameter on a user-defined component or layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    /// Required parameters make a missing binding a hard error
    #[serde(default)]
    pub required: bool,
}

impl ParamDecl {
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }

    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }
}

/// A user-defined component or layout macro
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    pub body: SourceNode,
}

impl Definition {
    pub fn new(name: impl Into<String>, body: SourceNode) -> Self {
        Self {
            name: name.into(),
            params: vec![],
            body,
        }
    }

    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }
}

/// A screen declaration holding one root layout node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenDecl {
    pub name: String,
    #[serde(default)]
    pub background: Option<String>,
    pub root: SourceNode,
}

impl ScreenDecl {
    pub fn new(name: impl Into<String>, root: SourceNode) -> Self {
        Self {
            name: name.into(),
            background: None,
            root,
        }
    }
}

/// The complete source project handed over by the parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceProject {
    #[serde(default)]
    pub name: String,
    /// Raw style tokens (density, spacing, device, ...), resolved during composition
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Project color palette, merged over the built-in defaults
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    /// Mock data passed through verbatim to the renderer
    #[serde(default)]
    pub mocks: PropMap,
    #[serde(default)]
    pub components: Vec<Definition>,
    #[serde(default)]
    pub layouts: Vec<Definition>,
    #[serde(default)]
    pub screens: Vec<ScreenDecl>,
}

impl SourceProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_screen(mut self, screen: ScreenDecl) -> Self {
        self.screens.push(screen);
        self
    }

    pub fn with_component(mut self, def: Definition) -> Self {
        self.components.push(def);
        self
    }

    pub fn with_layout(mut self, def: Definition) -> Self {
        self.layouts.push(def);
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_value_accessors() {
        assert_eq!(PropValue::from("hi").as_str(), Some("hi"));
        assert_eq!(PropValue::from(3.0).as_num(), Some(3.0));
        assert_eq!(PropValue::bound("title").as_bound(), Some("title"));
        assert_eq!(PropValue::from("hi").as_num(), None);
    }

    #[test]
    fn test_node_builders() {
        let node = SourceNode::layout("stack")
            .with_prop("gap", "md")
            .with_child(SourceNode::component("Button").with_prop("label", "Ok"));

        match &node {
            SourceNode::Layout { kind, params, children } => {
                assert_eq!(kind, "stack");
                assert_eq!(params.get("gap"), Some(&PropValue::from("md")));
                assert_eq!(children.len(), 1);
            }
            other => panic!("Expected layout, got {:?}", other),
        }
    }

    #[test]
    fn test_component_ignores_children() {
        let node = SourceNode::component("Text").with_child(SourceNode::component("Icon"));
        assert!(matches!(node, SourceNode::Component { .. }));
    }

    #[test]
    fn test_prop_value_roundtrip() {
        // Bound values serialize as {"bind": name}, literals as bare scalars
        let bound = PropValue::bound("title");
        let json = serde_json_shim(&bound);
        assert!(json.contains("bind"));
    }

    // toml is the only serialization format in the dependency tree; use it
    // for the wire-shape assertion.
    fn serde_json_shim(value: &PropValue) -> String {
        #[derive(serde::Serialize)]
        struct Wrap<'a> {
            value: &'a PropValue,
        }
        toml::to_string(&Wrap { value }).expect("serializable")
    }
}

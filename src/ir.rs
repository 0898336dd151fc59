//! IR contract types - the versioned artifact between composition and layout
//!
//! The contract is a flat node map with `{ref}`-style children, plus screens
//! pointing at root nodes. It is the documented interchange format other
//! tools may persist or diff, so every type serializes deterministically
//! (`BTreeMap` keys, camelCase field names).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::PropMap;
use crate::style::ResolvedStyle;

/// Version tag written into every contract
pub const IR_VERSION: &str = "1.0";

/// A reference to a node in the flat node map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    #[serde(rename = "ref")]
    pub target: String,
}

impl NodeRef {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Container layout strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Stack,
    Grid,
    Split,
    Panel,
    Card,
}

impl ContainerKind {
    /// Map a source layout kind to a container strategy.
    ///
    /// Unknown kinds lower to a plain stack so malformed input still gets a
    /// sensible layout instead of an error.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "grid" => ContainerKind::Grid,
            "split" => ContainerKind::Split,
            "panel" => ContainerKind::Panel,
            "card" => ContainerKind::Card,
            _ => ContainerKind::Stack,
        }
    }
}

/// Resolved container style, split out of the raw parameter map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerStyle {
    /// Spacing token, `"none"` when the source gave no padding
    pub padding: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self {
            padding: "none".to_string(),
            gap: None,
            align: None,
            background: None,
        }
    }
}

/// Provenance metadata on a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Origin tag, e.g. `"cell"` for grid cells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Optional trace id pointing back at the source tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl NodeMeta {
    pub fn cell() -> Self {
        Self {
            source: Some("cell".to_string()),
            trace: None,
        }
    }
}

/// A container node holding ordered child references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerNode {
    pub id: String,
    pub kind: ContainerKind,
    /// Non-style parameters (direction, columns, span, ...)
    #[serde(default)]
    pub params: PropMap,
    #[serde(default)]
    pub children: Vec<NodeRef>,
    #[serde(default)]
    pub style: ContainerStyle,
    #[serde(default)]
    pub meta: NodeMeta,
}

/// A leaf component node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    pub component: String,
    #[serde(default)]
    pub props: PropMap,
    #[serde(default)]
    pub style: ContainerStyle,
    #[serde(default)]
    pub meta: NodeMeta,
}

/// A node in the IR graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Container(ContainerNode),
    Component(ComponentNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Container(c) => c.id.as_str(),
            Node::Component(c) => c.id.as_str(),
        }
    }

    /// Child references, empty for components
    pub fn children(&self) -> &[NodeRef] {
        match self {
            Node::Container(c) => c.children.as_slice(),
            Node::Component(_) => &[],
        }
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            Node::Container(c) => Some(c),
            Node::Component(_) => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentNode> {
        match self {
            Node::Component(c) => Some(c),
            Node::Container(_) => None,
        }
    }
}

/// Screen viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: f64,
    pub min_height: f64,
}

/// A screen with its root node reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub id: String,
    pub name: String,
    pub viewport: Viewport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub root: NodeRef,
}

/// The resolved project: everything the layout engine and renderer need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub style: ResolvedStyle,
    #[serde(default)]
    pub mocks: PropMap,
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub screens: Vec<Screen>,
    #[serde(default)]
    pub nodes: BTreeMap<String, Node>,
}

/// The versioned IR contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrContract {
    pub ir_version: String,
    pub project: Project,
}

/// Structural invariant violations in a produced contract.
///
/// These indicate a composition bug, not bad user input: the generator
/// validates its own output before handing it over.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("node {owner} references missing node {target}")]
    DanglingReference { owner: String, target: String },

    #[error("node map key {key} disagrees with node id {id}")]
    IdMismatch { key: String, id: String },

    #[error("screen {screen} has a non-positive viewport")]
    InvalidViewport { screen: String },

    #[error("unsupported IR version {version}")]
    UnsupportedVersion { version: String },
}

/// Check every structural invariant of a contract: all references resolve,
/// map keys match node ids, viewports are positive.
pub fn validate(contract: &IrContract) -> Result<(), ContractError> {
    if contract.ir_version != IR_VERSION {
        return Err(ContractError::UnsupportedVersion {
            version: contract.ir_version.clone(),
        });
    }

    let nodes = &contract.project.nodes;

    for (key, node) in nodes {
        if key != node.id() {
            return Err(ContractError::IdMismatch {
                key: key.clone(),
                id: node.id().to_string(),
            });
        }
        for child in node.children() {
            if !nodes.contains_key(&child.target) {
                return Err(ContractError::DanglingReference {
                    owner: key.clone(),
                    target: child.target.clone(),
                });
            }
        }
    }

    for screen in &contract.project.screens {
        if !nodes.contains_key(&screen.root.target) {
            return Err(ContractError::DanglingReference {
                owner: screen.id.clone(),
                target: screen.root.target.clone(),
            });
        }
        if screen.viewport.width <= 0.0 || screen.viewport.min_height <= 0.0 {
            return Err(ContractError::InvalidViewport {
                screen: screen.id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_contract() -> IrContract {
        IrContract {
            ir_version: IR_VERSION.to_string(),
            project: Project {
                id: "project_1".to_string(),
                name: "test".to_string(),
                style: ResolvedStyle::default(),
                mocks: PropMap::new(),
                colors: BTreeMap::new(),
                screens: vec![],
                nodes: BTreeMap::new(),
            },
        }
    }

    fn container(id: &str, children: Vec<NodeRef>) -> Node {
        Node::Container(ContainerNode {
            id: id.to_string(),
            kind: ContainerKind::Stack,
            params: PropMap::new(),
            children,
            style: ContainerStyle::default(),
            meta: NodeMeta::default(),
        })
    }

    #[test]
    fn test_container_kind_parse_fallback() {
        assert_eq!(ContainerKind::parse("grid"), ContainerKind::Grid);
        assert_eq!(ContainerKind::parse("card"), ContainerKind::Card);
        assert_eq!(ContainerKind::parse("flexbox"), ContainerKind::Stack);
    }

    #[test]
    fn test_validate_ok() {
        let mut contract = empty_contract();
        contract.project.nodes.insert(
            "node_1".to_string(),
            container("node_1", vec![NodeRef::new("node_2")]),
        );
        contract
            .project
            .nodes
            .insert("node_2".to_string(), container("node_2", vec![]));
        contract.project.screens.push(Screen {
            id: "screen_1".to_string(),
            name: "Home".to_string(),
            viewport: Viewport {
                width: 1280.0,
                min_height: 800.0,
            },
            background: None,
            root: NodeRef::new("node_1"),
        });

        assert!(validate(&contract).is_ok());
    }

    #[test]
    fn test_validate_dangling_child() {
        let mut contract = empty_contract();
        contract.project.nodes.insert(
            "node_1".to_string(),
            container("node_1", vec![NodeRef::new("ghost")]),
        );

        let err = validate(&contract).unwrap_err();
        assert!(matches!(err, ContractError::DanglingReference { .. }));
    }

    #[test]
    fn test_validate_dangling_root() {
        let mut contract = empty_contract();
        contract.project.screens.push(Screen {
            id: "screen_1".to_string(),
            name: "Home".to_string(),
            viewport: Viewport {
                width: 1280.0,
                min_height: 800.0,
            },
            background: None,
            root: NodeRef::new("ghost"),
        });

        let err = validate(&contract).unwrap_err();
        assert!(matches!(err, ContractError::DanglingReference { .. }));
    }

    #[test]
    fn test_validate_id_mismatch() {
        let mut contract = empty_contract();
        contract
            .project
            .nodes
            .insert("wrong_key".to_string(), container("node_1", vec![]));

        let err = validate(&contract).unwrap_err();
        assert!(matches!(err, ContractError::IdMismatch { .. }));
    }

    #[test]
    fn test_node_ref_wire_shape() {
        // NodeRef serializes as {"ref": id} per the documented contract
        let wrapped = toml::to_string(&NodeRef::new("node_7")).expect("serializable");
        assert!(wrapped.contains("ref = \"node_7\""));
    }
}

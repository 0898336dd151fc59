//! End-to-end compile tests: a realistic dashboard project through both
//! passes, plus the failure paths a compiling front end relies on.

use mockforge::{
    compile, validate, CompileError, CompositionWarning, Definition, Node, ParamDecl, PropValue,
    ScreenDecl, SourceNode, SourceProject,
};

/// A dashboard the way a real wireframe author would write it: a shell
/// layout macro, a stat-card component macro, and a grid of content.
fn dashboard() -> SourceProject {
    let shell = Definition::new(
        "AppShell",
        SourceNode::layout("stack")
            .with_child(SourceNode::component("Topbar").with_prop("title", "Console"))
            .with_child(
                SourceNode::layout("split")
                    .with_prop("width", 240.0)
                    .with_child(SourceNode::component("SidebarMenu").with_prop(
                        "items",
                        "Overview,Reports,Settings",
                    ))
                    .with_child(SourceNode::component("Children")),
            ),
    );

    let stat_card = Definition::new(
        "StatCard",
        SourceNode::layout("card")
            .with_prop("padding", "md")
            .with_child(SourceNode::component("Text").with_prop("text", PropValue::bound("label")))
            .with_child(
                SourceNode::component("Heading").with_prop("text", PropValue::bound("value")),
            ),
    )
    .with_param(ParamDecl::required("value"));

    let mut grid = SourceNode::layout("grid").with_prop("gap", "md");
    for (label, value) in [("Users", "1,204"), ("Sessions", "8,930"), ("Errors", "12")] {
        grid = grid.with_child(
            SourceNode::cell().with_prop("span", 4.0).with_child(
                SourceNode::component("StatCard")
                    .with_prop("label", label)
                    .with_prop("value", value),
            ),
        );
    }
    let content = SourceNode::layout("stack")
        .with_prop("gap", "lg")
        .with_child(grid)
        .with_child(SourceNode::component("Table").with_prop("rows", 5.0));

    SourceProject::new("console")
        .with_style("density", "normal")
        .with_style("spacing", "md")
        .with_layout(shell)
        .with_component(stat_card)
        .with_screen(ScreenDecl::new(
            "Overview",
            SourceNode::layout("AppShell").with_child(content),
        ))
}

#[test]
fn test_dashboard_compiles_end_to_end() {
    let compilation = compile(&dashboard()).expect("Should compile");

    assert_eq!(compilation.contract.ir_version, "1.0");
    assert!(validate(&compilation.contract).is_ok());
    assert_eq!(
        compilation.positions.len(),
        compilation.contract.project.nodes.len()
    );
    assert!(compilation.warnings.is_empty());

    // macro expansion left no trace of either macro name
    for node in compilation.contract.project.nodes.values() {
        if let Node::Component(c) = node {
            assert_ne!(c.component, "AppShell");
            assert_ne!(c.component, "StatCard");
        }
    }
}

#[test]
fn test_dashboard_geometry_is_sane() {
    let compilation = compile(&dashboard()).expect("Should compile");
    let contract = &compilation.contract;
    let positions = &compilation.positions;

    // the sidebar sits at the shell's fixed width, content to its right
    let sidebar = contract
        .project
        .nodes
        .values()
        .filter_map(Node::as_component)
        .find(|c| c.component == "SidebarMenu")
        .unwrap();
    assert_eq!(positions[sidebar.id.as_str()].width, 240.0);

    // three stat cards share one grid row
    let mut card_tops: Vec<f64> = contract
        .project
        .nodes
        .values()
        .filter_map(Node::as_container)
        .filter(|c| c.meta.source.as_deref() == Some("cell"))
        .map(|c| positions[c.id.as_str()].y)
        .collect();
    card_tops.dedup();
    assert_eq!(card_tops.len(), 1);

    // nothing lands outside the viewport horizontally
    for rect in positions.values() {
        assert!(rect.x >= 0.0);
        assert!(rect.x + rect.width <= 1280.0 + f64::EPSILON);
    }
}

#[test]
fn test_compile_twice_is_deterministic() {
    let project = dashboard();
    let first = compile(&project).expect("Should compile");
    let second = compile(&project).expect("Should compile");

    assert_eq!(first.contract, second.contract);
    assert_eq!(first.positions, second.positions);
}

#[test]
fn test_missing_required_macro_argument_fails() {
    let mut project = dashboard();
    // drop the required `value` argument from one invocation
    fn strip_value(node: &mut SourceNode) {
        match node {
            SourceNode::Component { component, props } if component == "StatCard" => {
                props.remove("value");
            }
            SourceNode::Layout { children, .. } | SourceNode::Cell { children, .. } => {
                for child in children {
                    strip_value(child);
                }
            }
            SourceNode::Component { .. } => {}
        }
    }
    strip_value(&mut project.screens[0].root);

    let err = compile(&project).unwrap_err();
    let CompileError::Composition(inner) = err;
    let message = inner.to_string();
    assert!(message.contains("StatCard"), "got: {}", message);
    assert!(message.contains("value"), "got: {}", message);
}

#[test]
fn test_undefined_component_error_names_every_offender() {
    let project = SourceProject::new("broken").with_screen(ScreenDecl::new(
        "Home",
        SourceNode::layout("stack")
            .with_child(SourceNode::component("Sparkline"))
            .with_child(SourceNode::component("Gauge")),
    ));

    let err = compile(&project).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Sparkline"));
    assert!(message.contains("Gauge"));
}

#[test]
fn test_warnings_survive_successful_compilation() {
    let pill = Definition::new(
        "Pill",
        SourceNode::component("Badge").with_prop("text", PropValue::bound("label")),
    );
    let project = SourceProject::new("warned")
        .with_component(pill)
        .with_screen(ScreenDecl::new(
            "Home",
            SourceNode::layout("stack").with_child(
                SourceNode::component("Pill")
                    .with_prop("label", "New")
                    .with_prop("unused", "value"),
            ),
        ));

    let compilation = compile(&project).expect("Should compile");
    assert!(compilation.warnings.iter().any(|w| matches!(
        w,
        CompositionWarning::UnusedDefinitionArgument { argument, .. } if argument == "unused"
    )));
}

#[test]
fn test_multiple_screens_lay_out_independently() {
    let root = |title: &str| {
        SourceNode::layout("stack")
            .with_child(SourceNode::component("Heading").with_prop("text", title))
    };
    let project = SourceProject::new("multi")
        .with_screen(ScreenDecl::new("First", root("One")))
        .with_screen(ScreenDecl::new("Second", root("Two")));

    let compilation = compile(&project).expect("Should compile");
    assert_eq!(compilation.contract.project.screens.len(), 2);

    // each screen's root starts at its own origin
    for screen in &compilation.contract.project.screens {
        let rect = compilation.positions[screen.root.target.as_str()];
        assert_eq!((rect.x, rect.y), (0.0, 0.0));
    }
}

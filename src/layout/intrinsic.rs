//! Per-component intrinsic sizing heuristics
//!
//! These estimates stand in for real text shaping and media probing: the
//! renderer draws placeholder boxes, so the layout only has to be plausible
//! and deterministic. Heights feed vertical stacking; widths matter only
//! for natural-width row placement.

use crate::ast::{PropMap, PropValue};
use crate::style::{
    control_height, font_size, heading_font_size, line_height, resolve_spacing, Density,
    ResolvedStyle,
};

/// An explicit pixel value supplied on the node itself. Literal values
/// bypass density scaling.
pub fn explicit_px(props: &PropMap, key: &str) -> Option<f64> {
    props.get(key).and_then(PropValue::as_num).filter(|v| *v >= 0.0)
}

/// Natural height of a component at the given available width
pub fn component_height(component: &str, props: &PropMap, width: f64, style: &ResolvedStyle) -> f64 {
    let density = style.density;
    match component {
        "Heading" => wrapped_text_height(
            text_content(props, "text"),
            width,
            heading_font_size(density),
            density,
        ),
        "Text" | "Link" => wrapped_text_height(
            text_content(props, "text"),
            width,
            font_size(density),
            density,
        ),
        // Alerts wrap their message inside their own chrome
        "Alert" => {
            wrapped_text_height(text_content(props, "text"), width, font_size(density), density)
                + 16.0
        }
        "Table" => table_height(props, density),
        "SidebarMenu" => item_count(props) * density.scale(40.0),
        "Image" => image_height(props, width),
        "Chart" => 240.0,
        "Textarea" => line_height(font_size(density)) * 4.0 + 16.0,
        "Divider" => 1.0,
        "Separate" => resolve_spacing(
            props.get("size").and_then(PropValue::as_str),
            style.spacing,
            density,
            true,
        ),
        "Topbar" => 56.0,
        "Progress" => 8.0,
        "Avatar" => density.scale(40.0),
        "Icon" => 24.0,
        _ => control_height(density),
    }
}

/// Natural width of a component, used when a horizontal stack places
/// children at their intrinsic size instead of stretching them.
pub fn component_width(component: &str, props: &PropMap, style: &ResolvedStyle) -> f64 {
    let density = style.density;
    let body = font_size(density);
    match component {
        "Button" => (text_len(props, "label") * 0.6 * body + 32.0).max(64.0),
        "Badge" => (text_len(props, "text") * 0.55 * body + 16.0).max(32.0),
        "Text" | "Link" => (text_len(props, "text") * 0.6 * body).max(40.0),
        "Heading" => (text_len(props, "text") * 0.6 * heading_font_size(density)).max(80.0),
        "Icon" => 24.0,
        "Avatar" => density.scale(40.0),
        "Checkbox" | "Radio" => 20.0,
        "Switch" => 44.0,
        "Input" | "Textarea" => density.scale(240.0),
        "Select" | "Searchbar" => density.scale(200.0),
        "Slider" | "Progress" => density.scale(160.0),
        "Image" => explicit_px(props, "width").unwrap_or(160.0),
        "Table" => 480.0,
        "SidebarMenu" => 240.0,
        "Tabs" => 320.0,
        "Breadcrumbs" => 240.0,
        _ => density.scale(120.0),
    }
}

/// Wrap text at a width-derived character budget (~0.6 x font size per
/// character) and grow by whole lines, never below the default control
/// height.
fn wrapped_text_height(text: &str, width: f64, font_px: f64, density: Density) -> f64 {
    let budget = (width / (0.6 * font_px)).floor().max(1.0);
    let chars = text.chars().count() as f64;
    let lines = (chars / budget).ceil().max(1.0);
    (lines * line_height(font_px)).max(control_height(density))
}

/// Optional title band + header band + rows + optional pagination and
/// caption bands.
fn table_height(props: &PropMap, density: Density) -> f64 {
    let row_height = control_height(density);
    let rows = props
        .get("rows")
        .and_then(PropValue::as_num)
        .unwrap_or(3.0)
        .max(0.0);
    let mut height = row_height + rows * row_height;
    if props.contains_key("title") {
        height += 40.0;
    }
    if props.contains_key("pagination") {
        height += 44.0;
    }
    if props.contains_key("caption") {
        height += 32.0;
    }
    height
}

/// Height from the placeholder aspect ratio, with a flat fallback when no
/// width is available.
fn image_height(props: &PropMap, width: f64) -> f64 {
    let ratio = match props.get("placeholder").and_then(PropValue::as_str) {
        Some("square") => 1.0,
        Some("portrait") => 3.0 / 4.0,
        Some("wide") => 21.0 / 9.0,
        _ => 16.0 / 9.0,
    };
    if width > 0.0 {
        width / ratio
    } else {
        160.0
    }
}

/// Menu entry count: an `items` list string or count, defaulting to a
/// plausible placeholder menu.
fn item_count(props: &PropMap) -> f64 {
    match props.get("items") {
        Some(PropValue::Str(items)) => items.split(',').count().max(1) as f64,
        Some(PropValue::Num(n)) => n.max(1.0),
        _ => 5.0,
    }
}

fn text_content<'a>(props: &'a PropMap, key: &str) -> &'a str {
    props.get(key).and_then(PropValue::as_str).unwrap_or("")
}

fn text_len(props: &PropMap, key: &str) -> f64 {
    text_content(props, key).chars().count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::PropMap;

    fn props(entries: &[(&str, PropValue)]) -> PropMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_short_text_stays_at_control_height() {
        let style = ResolvedStyle::default();
        let height = component_height("Text", &props(&[("text", "hi".into())]), 600.0, &style);
        assert_eq!(height, control_height(Density::Normal));
    }

    #[test]
    fn test_long_text_wraps_and_grows() {
        let style = ResolvedStyle::default();
        let long = "a".repeat(400);
        let narrow = component_height("Text", &props(&[("text", long.clone().into())]), 200.0, &style);
        let wide = component_height("Text", &props(&[("text", long.into())]), 1200.0, &style);
        assert!(narrow > wide);
        assert!(narrow > control_height(Density::Normal));
    }

    #[test]
    fn test_table_bands() {
        let density = Density::Normal;
        let row = control_height(density);
        let base = component_height(
            "Table",
            &props(&[("rows", PropValue::Num(4.0))]),
            600.0,
            &ResolvedStyle::default(),
        );
        assert_eq!(base, row + 4.0 * row);

        let full = component_height(
            "Table",
            &props(&[
                ("rows", PropValue::Num(4.0)),
                ("title", "Users".into()),
                ("pagination", "true".into()),
                ("caption", "All users".into()),
            ]),
            600.0,
            &ResolvedStyle::default(),
        );
        assert_eq!(full, base + 40.0 + 44.0 + 32.0);
    }

    #[test]
    fn test_sidebar_menu_scales_with_items() {
        let style = ResolvedStyle::default();
        let three = component_height(
            "SidebarMenu",
            &props(&[("items", "Home,Files,Trash".into())]),
            240.0,
            &style,
        );
        assert_eq!(three, 120.0);
    }

    #[test]
    fn test_image_aspect_ratio() {
        let style = ResolvedStyle::default();
        let square =
            component_height("Image", &props(&[("placeholder", "square".into())]), 300.0, &style);
        assert_eq!(square, 300.0);
        let landscape = component_height("Image", &props(&[]), 320.0, &style);
        assert_eq!(landscape, 180.0);
        // no width available: flat fallback
        let fallback = component_height("Image", &props(&[]), 0.0, &style);
        assert_eq!(fallback, 160.0);
    }

    #[test]
    fn test_fixed_heights() {
        let style = ResolvedStyle::default();
        assert_eq!(component_height("Divider", &props(&[]), 600.0, &style), 1.0);
        assert_eq!(component_height("Topbar", &props(&[]), 600.0, &style), 56.0);
        // Separate resolves its size token density-aware
        let sep = component_height("Separate", &props(&[("size", "lg".into())]), 600.0, &style);
        assert_eq!(sep, 24.0);
    }

    #[test]
    fn test_density_monotonic_dimensions() {
        let compact = ResolvedStyle {
            density: Density::Compact,
            ..ResolvedStyle::default()
        };
        let comfortable = ResolvedStyle {
            density: Density::Comfortable,
            ..ResolvedStyle::default()
        };
        let p = props(&[]);
        assert!(
            component_height("Button", &p, 600.0, &compact)
                < component_height("Button", &p, 600.0, &comfortable)
        );
        assert!(
            component_width("Input", &p, &compact) < component_width("Input", &p, &comfortable)
        );
    }

    #[test]
    fn test_explicit_px_ignores_non_numbers() {
        let p = props(&[("height", "tall".into()), ("width", PropValue::Num(120.0))]);
        assert_eq!(explicit_px(&p, "height"), None);
        assert_eq!(explicit_px(&p, "width"), Some(120.0));
    }
}

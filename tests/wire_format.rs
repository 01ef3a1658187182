//! Decoding compiled graphs from the JSON wire format

use std::fs;

use graft::error::GraphError;
use graft::graph::{wire, AttrValue, ClosingTag, Expr, Node, PartialRef};
use graft::template::Template;
use graft::{render_html, RenderConfig};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_every_node_type_decodes() {
    let compiled = wire::from_str(
        r#"[
            "text",
            {"t": 2, "r": "a"},
            {"t": 3, "r": "b"},
            {"t": 4, "r": "c", "f": ["x"]},
            {"t": 5, "r": "d"},
            {"t": 7, "e": "hr"},
            {"t": 8, "r": "p", "f": "fallback"},
            {"t": 9, "c": "note"},
            {"t": 14, "e": "div", "i": "0.1"},
            {"t": 30, "r": "e"}
        ]"#,
    )
    .unwrap();

    let graph = compiled.graph;
    assert_eq!(graph.len(), 10);
    assert_eq!(graph[0], Node::text("text"));
    assert_eq!(graph[1], Node::Interpolator(Expr::new("a")));
    assert_eq!(graph[2], Node::Triple(Expr::new("b")));
    assert!(matches!(&graph[3], Node::Section(s) if s.children == vec![Node::text("x")]));
    assert!(matches!(&graph[4], Node::SectionUnless(s) if s.expr.as_str() == "d"));
    assert!(matches!(&graph[5], Node::Element(el) if el.tag_name == "hr"));
    assert_eq!(
        graph[6],
        Node::Partial(PartialRef {
            name: "p".into(),
            children: vec![Node::text("fallback")],
        })
    );
    assert_eq!(graph[7], Node::Comment("note".into()));
    assert_eq!(
        graph[8],
        Node::ClosingTag(ClosingTag {
            id: Some("0.1".into()),
            tag_name: "div".into(),
        })
    );
    assert_eq!(graph[9], Node::Reference(Expr::new("e")));
}

#[test]
fn test_mixed_attribute_decodes_and_renders() {
    let source = r#"{"t": 7, "e": "li", "a": {"class": ["item ", {"t": 2, "r": "state"}], "hidden": null}}"#;
    let compiled = wire::from_str(source).unwrap();
    let li = compiled.graph[0].as_element().unwrap();
    assert!(matches!(li.attribute("class"), Some(AttrValue::Mixed(parts)) if parts.len() == 2));
    assert_eq!(li.attribute("hidden"), Some(&AttrValue::Empty));

    let html = render_html(source, &json!({"state": "open"})).unwrap();
    insta::assert_snapshot!(html, @r#"<li class="item open" hidden></li>"#);
}

#[test]
fn test_versioned_envelope_partials_render() {
    let template = Template::from_json(
        r#"{
            "v": 2,
            "t": [{"t": 7, "e": "nav", "f": [{"t": 8, "r": "wire_format_link"}]}],
            "p": {"wire_format_link": [{"t": 7, "e": "a", "a": {"href": "/"}, "f": "home"}]}
        }"#,
    )
    .unwrap();
    assert!(template.partials().get("wire_format_link").is_some());
    assert_eq!(
        template.to_html(&json!({})),
        r#"<nav><a href="/">home</a></nav>"#
    );
}

#[test]
fn test_section_in_attribute_matches_fragment_escaping() {
    let source = r#"{"t": 7, "e": "a", "a": {"title": [{"t": 4, "r": "x", "f": [{"t": 2, "r": "v"}]}]}}"#;
    let data = json!({"x": true, "v": "a&b<c"});
    let expected = r#"<a title="a&amp;b&lt;c"></a>"#;

    assert_eq!(render_html(source, &data).unwrap(), expected);
    let fragment = Template::from_json(source).unwrap().to_fragment(&data);
    assert_eq!(fragment.to_html(), expected);
}

#[test]
fn test_unless_section_renders_on_empty_list() {
    let html = render_html(
        r#"[{"t": 4, "n": 51, "r": "items", "f": ["none"]}, {"t": 4, "r": "items", "f": [{"t": 2, "r": "."}]}]"#,
        &json!({"items": []}),
    )
    .unwrap();
    assert_eq!(html, "none");
}

#[test]
fn test_triple_is_not_escaped() {
    let html = render_html(
        r#"[{"t": 2, "r": "x"}, {"t": 3, "r": "x"}]"#,
        &json!({"x": "<b>&</b>"}),
    )
    .unwrap();
    assert_eq!(html, "&lt;b&gt;&amp;&lt;/b&gt;<b>&</b>");
}

#[test]
fn test_missing_partial_name_is_an_error() {
    let err = wire::from_str(r#"{"t": 8}"#).unwrap_err();
    assert!(matches!(
        err,
        GraphError::MissingField {
            node: "partial",
            field: "r"
        }
    ));
}

#[test]
fn test_wrong_shape_is_a_json_error() {
    let err = wire::from_str(r#"{"t": "seven"}"#).unwrap_err();
    assert!(matches!(err, GraphError::Json(_)));
}

#[test]
fn test_from_file() {
    let dir = std::env::temp_dir().join(format!("graft-wire-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("graph.json");
    fs::write(&path, r#"[{"t": 7, "e": "b", "f": [{"t": 2, "r": "n"}]}]"#).unwrap();

    let template = Template::from_file(&path).unwrap();
    assert_eq!(template.to_html(&json!({"n": 5})), "<b>5</b>");

    let err = wire::from_file(&dir.join("missing.json")).unwrap_err();
    assert!(matches!(err, GraphError::Io { .. }));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_config_from_toml_applies_to_render() {
    let config = RenderConfig::from_toml(
        r#"
        [render]
        wrap_tag = "article"
        void_elements = ["hr"]
        "#,
    )
    .unwrap();
    let template = Template::from_json(r#"[{"t": 7, "e": "hr"}, {"t": 7, "e": "br"}]"#)
        .unwrap()
        .with_config(config)
        .wrap_default();
    assert_eq!(
        template.to_html(&json!({})),
        "<article><hr><br></br></article>"
    );
}

//! 変数・コールスタックモデルの統合テスト

mod common;

use common::{session, start, MAIN};
use kanshi_core::{Debugger, SessionConfig, VariableColumn};
use kanshi_target::mock::{MockFrame, MockObject};
use kanshi_target::{MockRuntime, ObjectId, TargetError, ThreadStatus, Value};
use std::sync::Arc;

fn main_frames() -> Vec<MockFrame> {
    vec![
        MockFrame::new("Area", "quorum.Circle", 8)
            .with_this(ObjectId(1))
            .with_local("a", "int", Value::Int(3))
            .with_local("b", "java.lang.String", Value::Text("hi".into())),
        MockFrame::new("Main", "plugins.quorum.Runner", 20),
        MockFrame::new("Main", "quorum.Main", 4),
    ]
}

fn circle() -> MockObject {
    MockObject::new("quorum.Circle")
        .with_field("radius", "double", Value::Double(2.0))
        .with_field("hidden_id", "int", Value::Int(99))
        .with_field("Libraries_Shape__", "quorum.Libraries.Shape", Value::Object(ObjectId(2)))
}

#[test]
fn test_root_lists_self_then_locals() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, main_frames());
    mock.insert_object(ObjectId(1), circle());
    start(&mock, &debugger, &rx);

    let variables = debugger.variables();
    let root = variables.children(None, None);
    let names: Vec<_> = root.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["this", "a", "b"]);
    assert!(root[0].is_field);
    assert_eq!(root[0].type_name, "quorum.Circle");
    assert_eq!(variables.children_count(None), 3);
    assert!(!variables.is_leaf(None));
}

#[test]
fn test_primitive_node_is_leaf() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, main_frames());
    mock.insert_object(ObjectId(1), circle());
    start(&mock, &debugger, &rx);

    let variables = debugger.variables();
    let root = variables.children(None, None);
    let a = &root[1];
    assert!(variables.is_leaf(Some(a)));
    assert!(variables.children(Some(a), None).is_empty());
    assert_eq!(variables.value_at(a, VariableColumn::Value), "3");
    assert_eq!(variables.value_at(a, VariableColumn::Type), "int");
    assert_eq!(variables.display_name(a), "a");
}

#[test]
fn test_object_children_are_filtered_fields() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, main_frames());
    mock.insert_object(ObjectId(1), circle());
    mock.insert_object(ObjectId(2), MockObject::new("quorum.Libraries.Shape"));
    start(&mock, &debugger, &rx);

    let variables = debugger.variables();
    let this = variables.children(None, Some(0..1)).remove(0);
    let fields = variables.children(Some(&this), None);
    let names: Vec<_> = fields.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["radius", "Libraries_Shape__"]);
    assert!(fields.iter().all(|v| v.is_field));
    assert!(!fields[0].is_parent);
    assert!(fields[1].is_parent);
    assert!(!variables.is_leaf(Some(&fields[1])));
}

#[test]
fn test_range_selects_subset() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, main_frames());
    mock.insert_object(ObjectId(1), circle());
    start(&mock, &debugger, &rx);

    let names: Vec<_> = debugger
        .variables()
        .children(None, Some(1..3))
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn test_static_frame_lists_only_locals() {
    let (mock, debugger, rx) = session();
    mock.add_thread(
        MAIN,
        vec![MockFrame::new("Main", "quorum.Main", 1).with_local("n", "long", Value::Long(4))],
    );
    start(&mock, &debugger, &rx);

    let root = debugger.variables().children(None, None);
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].name, "n");
}

#[test]
fn test_unreadable_local_does_not_abort_listing() {
    let (mock, debugger, rx) = session();
    mock.add_thread(
        MAIN,
        vec![MockFrame::new("Main", "quorum.Main", 1)
            .with_unreadable_local("stale", "quorum.Thing", TargetError::InvalidObject(ObjectId(5)))
            .with_local("ok", "boolean", Value::Bool(true))],
    );
    start(&mock, &debugger, &rx);

    let root = debugger.variables().children(None, None);
    assert_eq!(root.len(), 2);
    assert_eq!(root[0].value, "null");
    assert_eq!(root[1].value, "true");
}

#[test]
fn test_introspection_requires_suspended_live_thread() {
    let (mock, debugger, rx) = session();
    assert!(debugger.variables().children(None, None).is_empty());

    mock.add_thread(MAIN, main_frames());
    mock.insert_object(ObjectId(1), circle());
    start(&mock, &debugger, &rx);
    assert!(!debugger.variables().children(None, None).is_empty());

    debugger.resume().unwrap();
    assert!(debugger.variables().children(None, None).is_empty());
    assert!(debugger.call_stack().frames().is_empty());

    debugger.pause().unwrap();
    assert!(!debugger.call_stack().frames().is_empty());
    mock.set_thread_status(MAIN, ThreadStatus::Zombie);
    assert!(debugger.variables().children(None, None).is_empty());
    assert!(debugger.variables().watch("a").is_none());
}

#[test]
fn test_watch_expression() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, main_frames());
    mock.insert_object(ObjectId(1), circle());
    start(&mock, &debugger, &rx);

    let watched = debugger.variables().watch(" b ").unwrap();
    assert!(watched.is_watch_expression);
    assert_eq!(watched.value, "hi");
    assert!(debugger.variables().watch("missing").is_none());
}

#[test]
fn test_call_stack_hides_excluded_frames() {
    common::init_tracing();
    let mock = Arc::new(MockRuntime::new());
    let config = SessionConfig {
        frame_exclusions: vec!["plugins.*".to_string()],
        ..SessionConfig::default()
    };
    let debugger = Debugger::with_config(mock.clone(), config);
    let (recorder, rx) = common::Recorder::new("recorder");
    debugger.add_listener(recorder);
    mock.add_thread(MAIN, main_frames());
    start(&mock, &debugger, &rx);

    let stack = debugger.call_stack();
    let frames = stack.frames();
    let names: Vec<_> = frames.iter().map(|f| stack.display_name(f)).collect();
    assert_eq!(names, ["Area:8", "Main:4"]);
    assert!(frames[0].is_current);
    assert!(!frames[1].is_current);
    assert_eq!(frames[0].unit_path(), "quorum/Circle");
    assert!(stack.is_leaf(&frames[1]));
    assert_eq!(stack.children_count(), 2);
    assert_eq!(stack.children(Some(1..2)), vec![frames[1].clone()]);
}

#[test]
fn test_friendly_naming_changes_labels_only() {
    common::init_tracing();
    let mock = Arc::new(MockRuntime::new());
    let config = SessionConfig::from_toml_str("naming = \"friendly\"").unwrap();
    let debugger = Debugger::with_config(mock.clone(), config);
    let (recorder, rx) = common::Recorder::new("recorder");
    debugger.add_listener(recorder);
    mock.add_thread(MAIN, main_frames());
    mock.insert_object(ObjectId(1), circle());
    mock.insert_object(ObjectId(2), MockObject::new("quorum.Libraries.Shape"));
    start(&mock, &debugger, &rx);

    let variables = debugger.variables();
    let root = variables.children(None, None);
    let labels: Vec<_> = root
        .iter()
        .map(|v| (v.name.as_str(), v.type_name.as_str()))
        .collect();
    assert_eq!(labels, [("me", "Circle"), ("a", "integer"), ("b", "text")]);

    let fields = variables.children(Some(&root[0]), None);
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].name, "parent:Libraries.Shape");
    assert!(fields[1].is_parent);
}

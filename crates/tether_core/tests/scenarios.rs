//! End-to-end binding scenarios

use std::rc::Rc;

use tether_core::{
    BindingError, BindingGraph, Brush, Collection, Ease, Layout, Length, ManualClock,
    PropertyValue, RuntimeConfig, Value, ValueKind,
};

fn graph_at_zero() -> (BindingGraph, ManualClock) {
    let clock = ManualClock::new();
    (BindingGraph::with_clock(Rc::new(clock.clone())), clock)
}

fn px(value: f64) -> Length {
    Length::Px(value)
}

fn px_of(length: &Length) -> f64 {
    match length {
        Length::Px(n) => *n,
        other => panic!("expected px, got {other}"),
    }
}

#[test]
fn test_set_then_get_returns_coerced_value_for_every_kind() {
    let mut graph = BindingGraph::new();
    let inputs = [
        (ValueKind::Boolean, Value::Int(3), Value::Boolean(true)),
        (ValueKind::Int, Value::Float(-2.7), Value::Int(-2)),
        (ValueKind::Float, Value::from("2.5"), Value::Float(2.5)),
        (ValueKind::String, Value::Int(12), Value::from("12")),
        (ValueKind::Length, Value::Float(8.0), Value::Length(px(8.0))),
        (ValueKind::Brush, Value::Int(1), Value::Brush(Brush::TRANSPARENT)),
        (ValueKind::Layout, Value::Int(1), Value::Layout(Layout::Column)),
        (
            ValueKind::Collection,
            Value::Int(2),
            Value::Collection(Collection::from_int_range(2)),
        ),
    ];

    for (kind, input, expected) in inputs {
        let id = graph.create_dynamic(kind);
        graph.set_value(id, input.clone()).unwrap();
        assert_eq!(graph.get_value(id, false).unwrap(), expected, "{kind} from {input:?}");
        assert_eq!(kind.coerce(input), expected);
    }
}

#[test]
fn test_connect_is_observable_without_waiting() {
    let mut graph = BindingGraph::new();
    let x1 = graph.create_with(px(10.0));
    let x2 = graph.create_with(px(30.0));
    let width = graph.create::<Length>();

    graph.connect(width, (x1, x2), |(a, b)| b - a, None).unwrap();
    assert_eq!(graph.get(width).unwrap(), px(20.0));
}

#[test]
fn test_eased_transition_follows_ancestor() {
    let (mut graph, clock) = graph_at_zero();
    let a = graph.create_with(px(0.0));
    let b = graph.create::<Length>();
    graph
        .connect(b, a, |v| v, Some(Rc::new(Ease::new(1000.0))))
        .unwrap();

    graph.set(a, px(100.0)).unwrap();
    assert_eq!(graph.get(b).unwrap(), px(100.0));
    assert_eq!(graph.get_interpolated(b).unwrap(), px(0.0));

    let mut last = 0.0;
    for ms in (0..=1000).step_by(50) {
        clock.set(ms as f64);
        let value = px_of(&graph.get_interpolated(b).unwrap());
        assert!((0.0..=100.0).contains(&value), "{value} at {ms}ms");
        assert!(value >= last, "{value} < {last} at {ms}ms");
        last = value;
    }
    assert_eq!(graph.get_interpolated(b).unwrap(), px(100.0));
}

#[test]
fn test_transition_between_incompatible_lengths_is_symbolic() {
    let (mut graph, clock) = graph_at_zero();
    let width = graph.create_with_transition(px(10.0), Rc::new(tether_core::Linear::new(100.0)));
    graph.set(width, Length::Vw(50.0)).unwrap();

    clock.set(50.0);
    let mid = graph.get_interpolated(width).unwrap();
    assert!(!mid.is_concrete());
    assert_eq!(mid.to_string(), "(((50vw - 10px) * 0.5) + 10px)");

    clock.set(100.0);
    assert_eq!(graph.get_interpolated(width).unwrap(), Length::Vw(50.0));
}

#[test]
fn test_frozen_binding_rejects_set_and_connect() {
    let mut graph = BindingGraph::new();
    let source = graph.create::<i32>();
    let n = graph.create_with(1i32);
    graph.freeze(n.id()).unwrap();

    assert_eq!(graph.set(n, 2), Err(BindingError::ReadonlyViolation(n.id())));
    assert_eq!(
        graph.connect(n, source, |v| v, None),
        Err(BindingError::ReadonlyViolation(n.id()))
    );
    assert_eq!(graph.get(n).unwrap(), 1);
}

#[test]
fn test_computed_binding_only_updates_from_ancestors() {
    let mut graph = BindingGraph::new();
    let a = graph.create_with(1.0f64);
    let b = graph.create_with(2.0f64);
    let m = graph.create::<f64>();
    graph.connect(m, (a, b), |(a, b)| a * b, None).unwrap();

    assert_eq!(
        graph.set(m, 0.0),
        Err(BindingError::DirectWriteOnComputed(m.id()))
    );
    graph.set(a, 4.0).unwrap();
    assert_eq!(graph.get(m).unwrap(), 8.0);
}

#[test]
fn test_disconnect_clears_computed_flag() {
    let mut graph = BindingGraph::new();
    let a = graph.create_with(true);
    let m = graph.create::<bool>();
    graph.connect(m, a, |v| !v, None).unwrap();

    graph.disconnect(m.id()).unwrap();
    assert!(!graph.is_computed(m.id()).unwrap());
    graph.set(m, true).unwrap();
    assert!(graph.get(m).unwrap());
}

#[test]
fn test_mutual_connect_is_rejected() {
    let mut graph = BindingGraph::new();
    let a = graph.create::<i32>();
    let b = graph.create::<i32>();

    graph.connect(a, b, |v| v, None).unwrap();
    assert_eq!(
        graph.connect(b, a, |v| v, None),
        Err(BindingError::CycleRejected(b.id()))
    );
}

#[test]
fn test_configured_sample_count_reaches_transitions() {
    let config = RuntimeConfig::from_toml_str("[easing]\nsample_count = 32\n").unwrap();
    let clock = ManualClock::new();
    let mut graph = BindingGraph::with_config(config, Rc::new(clock.clone()));

    let opacity = graph.create_with(0.0f64);
    let ease = graph.ease(200.0);
    graph.set_transition(opacity.id(), Some(ease)).unwrap();
    graph.set(opacity, 1.0).unwrap();

    clock.set(100.0);
    let mid = graph.get_interpolated(opacity).unwrap();
    assert!(mid > 0.5 && mid < 1.0, "mid = {mid}");
}

#[test]
fn test_default_values_are_kind_defaults() {
    let mut graph = BindingGraph::new();
    let fill = graph.create::<Brush>();
    let layout = graph.create::<Layout>();
    assert_eq!(graph.get(fill).unwrap(), Brush::default_value());
    assert_eq!(graph.get(layout).unwrap(), Layout::Row);
}

#[test]
fn test_propagation_under_trace_logging() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(1i32);
        let b = graph.create::<i32>();
        graph.connect(b, a, |v| v + 1, None).unwrap();
        graph.set(a, 2).unwrap();
        graph.remove(a.id()).unwrap();
        assert_eq!(graph.get(b).unwrap(), 3);
    });
}

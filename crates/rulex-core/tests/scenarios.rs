//! End-to-end behaviour of the engine: parse once, evaluate against events.

use std::cell::RefCell;
use std::collections::HashMap;

use rulex_core::{Engine, EvalErrorKind, EventContext, FieldSource, evaluate};
use rulex_lang::format::format_expr;
use rulex_lang::{ParseErrorKind, Value, parse_expression};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Field source that records every path it is asked for.
struct Recording {
    fields: HashMap<String, Value>,
    seen: RefCell<Vec<String>>,
}

impl Recording {
    fn new(pairs: &[(&str, Value)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl FieldSource for Recording {
    fn lookup(&self, path: &str) -> Option<&Value> {
        self.seen.borrow_mut().push(path.to_string());
        self.fields.get(path)
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn constant_arithmetic() {
    init_logging();
    let engine = Engine::default();
    let expr = engine.parse("1 + 2").unwrap();
    assert_eq!(engine.evaluate(&expr, "{}").unwrap(), "3");
}

#[test]
fn field_comparison() {
    let engine = Engine::default();
    let expr = engine.parse(r#"age >= 18 && country == "US""#).unwrap();
    let out = engine
        .evaluate(&expr, r#"{"age": 30, "country": "US"}"#)
        .unwrap();
    assert_eq!(out, "true");
    let out = engine
        .evaluate(&expr, r#"{"age": 17, "country": "US"}"#)
        .unwrap();
    assert_eq!(out, "false");
}

#[test]
fn missing_field_equals_null() {
    let engine = Engine::default();
    let expr = engine.parse("missingField == null").unwrap();
    assert_eq!(engine.evaluate(&expr, "{}").unwrap(), "true");
}

#[test]
fn division_by_zero_is_an_error() {
    let engine = Engine::default();
    let expr = engine.parse("1 / 0").unwrap();
    let err = evaluate(&expr, &EventContext::new()).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert!(engine.evaluate(&expr, "{}").is_err());
}

#[test]
fn lone_paren_is_a_parse_error_at_one() {
    let err = parse_expression("(").unwrap_err();
    assert_eq!(err.position, 1);
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
}

#[test]
fn or_short_circuits() {
    let expr = parse_expression("a || b").unwrap();
    let source = Recording::new(&[("a", Value::Bool(true)), ("b", Value::Bool(false))]);
    assert_eq!(evaluate(&expr, &source).unwrap(), Value::Bool(true));
    assert_eq!(source.seen(), vec!["a"]);

    let source = Recording::new(&[("a", Value::Bool(false)), ("b", Value::Bool(true))]);
    assert_eq!(evaluate(&expr, &source).unwrap(), Value::Bool(true));
    assert_eq!(source.seen(), vec!["a", "b"]);
}

#[test]
fn and_short_circuits() {
    let expr = parse_expression("a && b.c").unwrap();
    let source = Recording::new(&[("a", Value::Number(0.0))]);
    assert_eq!(evaluate(&expr, &source).unwrap(), Value::Bool(false));
    assert_eq!(source.seen(), vec!["a"]);
}

#[test]
fn original_event_shape() {
    let engine = Engine::default();
    let expr = engine
        .parse("concat(event.code, ':', round(event.properties.amount * 1.2, 2))")
        .unwrap();
    let event = r#"{
        "code": "purchase",
        "timestamp": "2024-01-01T00:00:00Z",
        "properties": {"amount": "10.5"}
    }"#;
    assert_eq!(engine.evaluate(&expr, event).unwrap(), "purchase:12.6");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn evaluation_is_deterministic() {
    let engine = Engine::default();
    let expr = engine
        .parse("concat(name, '-', age / 3, '-', tags.1 in ('x', 'y'))")
        .unwrap();
    let event = r#"{"name": "n", "age": 10, "tags": ["w", "y"]}"#;
    let first = engine.evaluate(&expr, event).unwrap();
    for _ in 0..100 {
        assert_eq!(engine.evaluate(&expr, event).unwrap(), first);
    }
    assert_eq!(first, "n-3.3333333333333335-true");
}

#[test]
fn equality_never_fails() {
    let values = ["null", "true", "0", "1.5", "'s'", "''", "missing"];
    let ctx = EventContext::new();
    for a in values {
        for b in values {
            let src = format!("{a} == {b}");
            let expr = parse_expression(&src).unwrap();
            let eq = evaluate(&expr, &ctx).unwrap();
            let ne = evaluate(&parse_expression(&format!("{a} != {b}")).unwrap(), &ctx).unwrap();
            assert!(matches!(eq, Value::Bool(_)), "{src}");
            assert_eq!(eq, Value::Bool(!ne.is_truthy()), "{src}");
        }
    }
}

#[test]
fn shared_expression_across_threads() {
    let engine = Engine::default();
    let expr = engine.parse("score * 2 > limit || vip").unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (engine, expr) = (&engine, &expr);
                s.spawn(move || {
                    let event = format!(r#"{{"score": {i}, "limit": 7, "vip": false}}"#);
                    engine.evaluate(expr, &event).unwrap()
                })
            })
            .collect();
        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let expected: Vec<&str> = (0..8)
            .map(|i| if i * 2 > 7 { "true" } else { "false" })
            .collect();
        assert_eq!(results, expected);
    });
}

#[test]
fn printed_tree_reparses_to_same_tree() {
    for src in [
        "age >= 18 && country == 'US'",
        "-(a + b) * c % 2",
        "x not in [1, 'two', null]",
        "round(amount, -2) + FLOOR(1.5)",
    ] {
        let expr = parse_expression(src).unwrap();
        assert_eq!(parse_expression(&format_expr(&expr)).unwrap(), expr);
    }
}

#[test]
fn depth_limit_guards_the_stack() {
    let src = format!("{}x{}", "(".repeat(50_000), ")".repeat(50_000));
    let engine = Engine::with_limits(rulex_lang::ParseLimits {
        max_depth: 128,
        max_input_bytes: 200_000,
    });
    let err = engine.try_parse(&src).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TooComplex { limit: 128 });
}

#[test]
fn ceiling_depth_evaluates_on_a_thread_stack() {
    let n = rulex_lang::ParseLimits::MAX_DEPTH_CEILING - 2;
    let out = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let engine = Engine::default();
            let src = format!("{}x + 1{}", "(".repeat(n), ")".repeat(n));
            let expr = engine.parse(&src).unwrap();
            let rendered = engine.evaluate(&expr, r#"{"x": 1}"#).unwrap();
            assert_eq!(parse_expression(&format_expr(&expr)).unwrap(), expr);
            rendered
        })
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(out, "2");
}

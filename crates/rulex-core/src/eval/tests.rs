use super::*;
use crate::event::EventContext;
use rulex_lang::parse_expression;

fn ctx() -> EventContext {
    EventContext::from_json(
        r#"{
            "age": 30,
            "country": "US",
            "name": "Alice",
            "score": "12.5",
            "zero": 0,
            "empty": "",
            "active": true,
            "nothing": null,
            "code": "signup",
            "properties": {"plan": "pro", "seats": 3},
            "tags": ["a", "b"]
        }"#,
    )
    .unwrap()
}

fn eval(src: &str) -> Value {
    let expr = parse_expression(src).unwrap();
    evaluate(&expr, &ctx()).unwrap_or_else(|e| panic!("{src}: {e}"))
}

fn eval_err(src: &str) -> EvalError {
    let expr = parse_expression(src).unwrap();
    evaluate(&expr, &ctx()).unwrap_err()
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn s(v: &str) -> Value {
    Value::Str(v.to_string())
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[test]
fn field_lookup() {
    assert_eq!(eval("age"), num(30.0));
    assert_eq!(eval("properties.plan"), s("pro"));
    assert_eq!(eval("tags.1"), s("b"));
    assert_eq!(eval("nothing"), Value::Null);
}

#[test]
fn missing_field_is_null() {
    assert_eq!(eval("missingField"), Value::Null);
    assert_eq!(eval("missingField == null"), Value::Bool(true));
    assert_eq!(eval("properties.missing == null"), Value::Bool(true));
}

#[test]
fn event_prefix_falls_back() {
    assert_eq!(eval("event.code"), s("signup"));
    assert_eq!(eval("event.properties.seats"), num(3.0));
    assert_eq!(eval("event.nope"), Value::Null);
}

#[test]
fn plain_hashmap_is_a_source() {
    let mut map = std::collections::HashMap::new();
    map.insert("x".to_string(), num(2.0));
    let expr = parse_expression("x * 21").unwrap();
    assert_eq!(evaluate(&expr, &map).unwrap(), num(42.0));
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

#[test]
fn arithmetic_basics() {
    assert_eq!(eval("1 + 2"), num(3.0));
    assert_eq!(eval("1 + 2 * 3"), num(7.0));
    assert_eq!(eval("(1 + 2) * 3"), num(9.0));
    assert_eq!(eval("10 - 4 - 3"), num(3.0));
    assert_eq!(eval("7 / 2"), num(3.5));
    assert_eq!(eval("7 % 4"), num(3.0));
    assert_eq!(eval("-7 % 4"), num(-3.0));
    assert_eq!(eval("-(age)"), num(-30.0));
    assert_eq!(eval("age * 2 + 1"), num(61.0));
}

#[test]
fn numeric_strings_coerce() {
    assert_eq!(eval("score * 2"), num(25.0));
    assert_eq!(eval("'3' + '4'"), num(7.0));
    assert_eq!(eval("-score"), num(-12.5));
}

#[test]
fn arithmetic_type_mismatch() {
    let e = eval_err("name + 1");
    assert_eq!(
        e.kind,
        EvalErrorKind::TypeMismatch {
            op: "+",
            found: "string and number".into()
        }
    );
    assert_eq!(e.node, "name + 1");
    assert_eq!(e.code(), 1301);

    assert!(matches!(eval_err("missing * 2").kind, EvalErrorKind::TypeMismatch { .. }));
    assert!(matches!(eval_err("active - 1").kind, EvalErrorKind::TypeMismatch { .. }));
    assert!(matches!(eval_err("-name").kind, EvalErrorKind::TypeMismatch { op: "-", .. }));
    assert!(matches!(eval_err("'inf' * 1").kind, EvalErrorKind::TypeMismatch { .. }));
}

#[test]
fn division_by_zero() {
    let e = eval_err("1 / 0");
    assert_eq!(e.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(e.node, "1 / 0");
    assert_eq!(e.code(), 1302);
    assert_eq!(eval_err("age % zero").kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn error_names_innermost_node() {
    let e = eval_err("1 + (2 * (3 / (age - 30)))");
    assert_eq!(e.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(e.node, "3 / (age - 30)");
}

#[test]
fn overflow_is_non_finite() {
    let e = eval_err("1e308 * 10");
    assert_eq!(e.kind, EvalErrorKind::NonFinite { op: "*" });
    assert_eq!(e.code(), 1303);
}

// ---------------------------------------------------------------------------
// Comparison & equality
// ---------------------------------------------------------------------------

#[test]
fn equality_is_total() {
    assert_eq!(eval("1 == 1.0"), Value::Bool(true));
    assert_eq!(eval("0.1 + 0.2 == 0.3"), Value::Bool(false));
    assert_eq!(eval("'1' == 1"), Value::Bool(false));
    assert_eq!(eval("null == false"), Value::Bool(false));
    assert_eq!(eval("null != 0"), Value::Bool(true));
    assert_eq!(eval("country == 'US'"), Value::Bool(true));
    assert_eq!(eval("active == true"), Value::Bool(true));
    assert_eq!(eval("nothing == missing"), Value::Bool(true));
}

#[test]
fn number_equality_agrees_with_ordering() {
    let pairs = [
        ("0.0000000000000001", "0"),
        ("1e-300", "0"),
        ("0.1 + 0.2", "0.3"),
        ("1", "1.0"),
        ("-0", "0"),
        ("age", "30"),
    ];
    for (a, b) in pairs {
        let eq = eval(&format!("{a} == {b}")).is_truthy();
        let lt = eval(&format!("{a} < {b}")).is_truthy();
        let gt = eval(&format!("{a} > {b}")).is_truthy();
        assert_eq!(
            [eq, lt, gt].iter().filter(|held| **held).count(),
            1,
            "{a} vs {b}: == {eq}, < {lt}, > {gt}"
        );
    }
    assert_eq!(eval("0.0000000000000001 == 0"), Value::Bool(false));
    assert_eq!(eval("1e-300 != 0"), Value::Bool(true));
}

#[test]
fn relational() {
    assert_eq!(eval("age >= 18"), Value::Bool(true));
    assert_eq!(eval("age < 30"), Value::Bool(false));
    assert_eq!(eval("age <= 30"), Value::Bool(true));
    assert_eq!(eval("'apple' < 'banana'"), Value::Bool(true));
    assert_eq!(eval("'Z' < 'a'"), Value::Bool(true));
    assert_eq!(eval("name > 'Aaron'"), Value::Bool(true));
}

#[test]
fn relational_type_mismatch() {
    let e = eval_err("age > '18'");
    assert_eq!(
        e.kind,
        EvalErrorKind::TypeMismatch {
            op: ">",
            found: "number and string".into()
        }
    );
    assert!(matches!(eval_err("missing < 1").kind, EvalErrorKind::TypeMismatch { .. }));
}

// ---------------------------------------------------------------------------
// Logic
// ---------------------------------------------------------------------------

#[test]
fn truthiness_rules() {
    assert_eq!(eval("!nothing"), Value::Bool(true));
    assert_eq!(eval("!zero"), Value::Bool(true));
    assert_eq!(eval("!empty"), Value::Bool(true));
    assert_eq!(eval("!name"), Value::Bool(false));
    assert_eq!(eval("!!age"), Value::Bool(true));
}

#[test]
fn logic_yields_booleans() {
    assert_eq!(eval("age >= 18 && country == 'US'"), Value::Bool(true));
    assert_eq!(eval("name && age"), Value::Bool(true));
    assert_eq!(eval("empty || zero"), Value::Bool(false));
    assert_eq!(eval("missing || 'x'"), Value::Bool(true));
}

#[test]
fn short_circuit_skips_errors() {
    assert_eq!(eval("false && 1 / 0"), Value::Bool(false));
    assert_eq!(eval("true || 1 / 0"), Value::Bool(true));
    assert_eq!(eval_err("true && 1 / 0").kind, EvalErrorKind::DivisionByZero);
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[test]
fn in_list() {
    assert_eq!(eval("country in ('US', 'CA')"), Value::Bool(true));
    assert_eq!(eval("country not in ['US', 'CA']"), Value::Bool(false));
    assert_eq!(eval("age in (10, 20, 30)"), Value::Bool(true));
    assert_eq!(eval("missing in (null)"), Value::Bool(true));
    assert_eq!(eval("'30' in (age)"), Value::Bool(false));
}

#[test]
fn in_list_stops_at_first_match() {
    assert_eq!(eval("1 in (1, 1 / 0)"), Value::Bool(true));
    assert_eq!(eval_err("2 in (1, 1 / 0)").kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn in_string_is_substring() {
    assert_eq!(eval("'lic' in name"), Value::Bool(true));
    assert_eq!(eval("'bob' not in name"), Value::Bool(true));
    let e = eval_err("1 in name");
    assert_eq!(
        e.kind,
        EvalErrorKind::TypeMismatch {
            op: "in",
            found: "number and string".into()
        }
    );
    assert!(matches!(
        eval_err("'x' not in age").kind,
        EvalErrorKind::TypeMismatch { op: "not in", .. }
    ));
}

#[test]
fn parenthesised_operand_is_a_one_item_list() {
    assert_eq!(eval("'li' in name"), Value::Bool(true));
    assert_eq!(eval("'li' in (name)"), Value::Bool(false));
    assert_eq!(eval("'Alice' in (name)"), Value::Bool(true));
    assert_eq!(eval("'li' not in [name]"), Value::Bool(true));
}

#[test]
fn bare_list_is_unsupported() {
    let list = Expression::List(vec![Expression::literal(1.0)]);
    let e = evaluate(&list, &ctx()).unwrap_err();
    assert!(matches!(e.kind, EvalErrorKind::UnsupportedOperation(_)));
    assert_eq!(e.code(), 1305);
    assert_eq!(e.node, "(1)");
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

#[test]
fn concat_renders_each_argument() {
    assert_eq!(
        eval("concat(event.code, '-', age, '-', active, '-', missing)"),
        s("signup-30-true-null")
    );
    assert_eq!(eval("CONCAT(score)"), s("12.5"));
}

#[test]
fn rounding_functions() {
    assert_eq!(eval("round(12.345, 2)"), num(12.35));
    assert_eq!(eval("round(2.5)"), num(3.0));
    assert_eq!(eval("round(-2.5)"), num(-3.0));
    assert_eq!(eval("round(1234.5, -2)"), num(1200.0));
    assert_eq!(eval("ceil(1.21, 1)"), num(1.3));
    assert_eq!(eval("floor(-1.21, 1)"), num(-1.3));
    assert_eq!(eval("floor(score)"), num(12.0));
    assert_eq!(eval("Ceil(score)"), num(13.0));
}

#[test]
fn rounding_rejects_fractional_places() {
    let e = eval_err("round(1.5, 0.5)");
    assert!(matches!(
        e.kind,
        EvalErrorKind::InvalidArgument { function: "round", .. }
    ));
    assert_eq!(e.code(), 1304);
    assert!(matches!(eval_err("round(name)").kind, EvalErrorKind::TypeMismatch { .. }));
}

#[test]
fn min_max() {
    assert_eq!(eval("min(3, 1, 2)"), num(1.0));
    assert_eq!(eval("max(3, age, score)"), num(30.0));
    assert_eq!(eval("max(-1)"), num(-1.0));
    assert!(matches!(eval_err("min(1, name)").kind, EvalErrorKind::TypeMismatch { op: "min", .. }));
}

#[test]
fn string_functions() {
    assert_eq!(eval("lower(name)"), s("alice"));
    assert_eq!(eval("upper(country)"), s("US"));
    assert_eq!(eval("len('héllo')"), num(5.0));
    assert_eq!(eval("contains(name, 'li')"), Value::Bool(true));
    assert_eq!(eval("contains(name, 'LI')"), Value::Bool(false));
    assert!(matches!(eval_err("len(age)").kind, EvalErrorKind::TypeMismatch { op: "len", .. }));
}

#[test]
fn regex_match() {
    assert_eq!(eval("regex_match(name, '^A.*e$')"), Value::Bool(true));
    assert_eq!(eval("regex_match(country, '^[a-z]+$')"), Value::Bool(false));
    let e = eval_err("regex_match(name, '(')");
    assert!(matches!(
        e.kind,
        EvalErrorKind::InvalidArgument { function: "regex_match", .. }
    ));
}

#[test]
fn rendering_of_results() {
    assert_eq!(eval("1 + 2").render(), "3");
    assert_eq!(eval("7 / 2").render(), "3.5");
    assert_eq!(eval("0 - 12").render(), "-12");
    assert_eq!(eval("-0 * 1").render(), "0");
    assert_eq!(eval("country").render(), "US");
    assert_eq!(eval("missing").render(), "null");
    assert_eq!(eval("age > 1").render(), "true");
}

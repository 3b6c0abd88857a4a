//! Expression language tests: parsing, type-checking against schemas, and
//! evaluation over flattened input.

mod common;

use common::*;
use glide::error::{EvalError, ExprError};
use glide::expr::{Env, Type, Value};
use glide::prelude::*;
use serde_json::json;

fn schema(source: &str) -> Schema {
    Schema::from_json(source).unwrap()
}

fn eval_with(expression: &str, schema_json: &str, input: serde_json::Value) -> Value {
    let schema = schema(schema_json);
    let provider = SchemaProvider::new("input", &schema);
    let env = Env::new(&provider).variable("input", Type::Object("input".to_string()));
    let compiled = env.compile(expression).unwrap();
    let map = InputMap::new("input", &input_from(input));
    compiled.eval(&map.data).unwrap()
}

fn compile_err(expression: &str, schema_json: &str) -> ExprError {
    let schema = schema(schema_json);
    let provider = SchemaProvider::new("input", &schema);
    let env = Env::new(&provider).variable("input", Type::Object("input".to_string()));
    env.compile(expression).unwrap_err()
}

#[test]
fn nested_fields_resolve_through_the_provider() {
    let schema = schema(
        r#"{
            "properties": {
                "name": {"type": "string"},
                "group": {
                    "type": "object",
                    "properties": {"id": {"type": "string"}}
                }
            }
        }"#,
    );
    let provider = SchemaProvider::new("input", &schema);
    let env = Env::new(&provider).variable("input", Type::Object("input".to_string()));

    let compiled = env.compile(r#"input.group.id == "world""#).unwrap();
    assert_eq!(*compiled.output_type(), Type::Bool);
}

#[test]
fn and_binds_tighter_than_or() {
    let result = eval_with("true || false && false", "{}", json!({}));
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn parentheses_override_precedence() {
    let result = eval_with("!(true && false)", "{}", json!({}));
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn literal_comparisons() {
    assert_eq!(eval_with("3 < 5", "{}", json!({})), Value::Bool(true));
    assert_eq!(eval_with("2.5 >= 2.5", "{}", json!({})), Value::Bool(true));
    assert_eq!(
        eval_with(r#""abc" < "abd""#, "{}", json!({})),
        Value::Bool(true)
    );
    assert_eq!(eval_with("5 != 5", "{}", json!({})), Value::Bool(false));
}

#[test]
fn in_matches_against_a_schema_list() {
    let schema_json = r#"{"properties": {"groups": {"type": "array"}}}"#;
    let result = eval_with(
        r#""admins" in input.groups"#,
        schema_json,
        json!({"groups": ["users", "admins"]}),
    );
    assert_eq!(result, Value::Bool(true));

    let result = eval_with(
        r#""admins" in input.groups"#,
        schema_json,
        json!({"groups": ["users"]}),
    );
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn ints_and_doubles_compare_by_value() {
    // the schema types 'count' as double; JSON hands the evaluator an i64
    let result = eval_with(
        "input.count == 2.0",
        r#"{"properties": {"count": {"type": "number"}}}"#,
        json!({"count": 2}),
    );
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn null_compares_against_anything() {
    let result = eval_with(
        "input.group != null",
        r#"{"properties": {"group": {"type": "object", "properties": {"id": {"type": "string"}}}}}"#,
        json!({"group": {"id": "x"}}),
    );
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn open_objects_type_check_as_any() {
    // additionalProperties disables field checking beneath 'tags'
    let result = eval_with(
        "input.tags.prod == true",
        r#"{"properties": {"tags": {"type": "object", "additionalProperties": true}}}"#,
        json!({"tags": {"prod": true}}),
    );
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn unknown_variables_are_rejected() {
    assert!(matches!(
        compile_err("something == false", "{}"),
        ExprError::UnknownVariable(name) if name == "something"
    ));
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(matches!(
        compile_err(
            r#"input.missing == "x""#,
            r#"{"properties": {"name": {"type": "string"}}}"#
        ),
        ExprError::UnknownField { object, field } if object == "input" && field == "missing"
    ));
}

#[test]
fn field_selection_on_a_scalar_is_rejected() {
    assert!(matches!(
        compile_err(
            r#"input.name.id == "x""#,
            r#"{"properties": {"name": {"type": "string"}}}"#
        ),
        ExprError::NotAnObject(Type::String)
    ));
}

#[test]
fn mismatched_equality_operands_are_rejected() {
    assert!(matches!(
        compile_err(r#"1 == "x""#, "{}"),
        ExprError::OperandMismatch { op: "==", .. }
    ));
}

#[test]
fn ordering_booleans_is_rejected() {
    assert!(matches!(
        compile_err("true < false", "{}"),
        ExprError::OperandMismatch { op: "<", .. }
    ));
}

#[test]
fn negating_a_number_is_rejected() {
    assert!(matches!(
        compile_err("!1", "{}"),
        ExprError::BadOperand { op: "!", .. }
    ));
}

#[test]
fn garbage_fails_to_parse() {
    assert!(matches!(
        compile_err("&& ==", "{}"),
        ExprError::Parse(_)
    ));
}

#[test]
fn missing_inputs_fail_evaluation() {
    let schema = schema(r#"{"properties": {"group": {"type": "string"}}}"#);
    let provider = SchemaProvider::new("input", &schema);
    let env = Env::new(&provider).variable("input", Type::Object("input".to_string()));
    let compiled = env.compile(r#"input.group == "test""#).unwrap();

    let map = InputMap::new("input", &no_input());
    let err = compiled.eval(&map.data).unwrap_err();
    assert!(matches!(
        err,
        EvalError::InputNotFound(path) if path == "input.group"
    ));
}

#[test]
fn short_circuiting_skips_the_right_operand() {
    // input.flag is never resolved: '&&' already knows the answer
    let schema = schema(r#"{"properties": {"flag": {"type": "boolean"}}}"#);
    let provider = SchemaProvider::new("input", &schema);
    let env = Env::new(&provider).variable("input", Type::Object("input".to_string()));
    let compiled = env.compile("false && input.flag").unwrap();

    let map = InputMap::new("input", &no_input());
    assert_eq!(compiled.eval(&map.data).unwrap(), Value::Bool(false));
}

#[test]
fn compiled_expressions_remember_their_source() {
    let schema = Schema::default();
    let provider = SchemaProvider::new("input", &schema);
    let env = Env::new(&provider);
    let compiled = env.compile("true || false").unwrap();
    assert_eq!(compiled.source(), "true || false");
    assert_eq!(*compiled.output_type(), Type::Bool);
}

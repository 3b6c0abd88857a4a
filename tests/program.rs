//! Parsing tests: document shape, located errors, dialect resolution, and
//! the YAML round trip into execution.

mod common;

use common::*;
use glide::dialect::access;
use glide::error::{DialectError, Error, ParseError};
use glide::prelude::*;
use serde_json::json;

/// Unwrap a located error, returning the parse error and its rendered path.
fn located_parse_error(err: &Error) -> (&ParseError, String) {
    match err {
        Error::Node(node) => {
            let path = node
                .location
                .as_ref()
                .expect("located error should carry a path")
                .to_string();
            match node.inner() {
                Error::Parse(parse) => (parse, path),
                other => panic!("expected a parse error, got {other:?}"),
            }
        }
        other => panic!("expected a located error, got {other:?}"),
    }
}

#[test]
fn access_workflow_parses_compiles_and_executes() {
    let source = r#"
workflow:
  default:
    steps:
      - start: request
      - name: Wait for an admin
        action: approval
        with:
          groups:
            - admins
      - outcome: approved
"#;
    let program = Program::parse(source, &access::dialect()).unwrap();
    let graph = Compiler::new(program).compile().unwrap();

    let result = graph
        .execute("request", &input_from(json!({"approvals": []})))
        .unwrap();
    assert_eq!(result.state["default.1"], State::Active);
    assert_eq!(result.outcome, None);

    let result = graph
        .execute(
            "request",
            &input_from(json!({"approvals": [{"groups": ["admins"]}]})),
        )
        .unwrap();
    assert_eq!(result.state["default.1"], State::Complete);
    assert_eq!(result.outcome.as_deref(), Some("approved"));
}

#[test]
fn action_payload_absorbs_with_fields() {
    let source = r#"
workflow:
  default:
    steps:
      - start: request
      - action: approval
        with:
          groups: [admins, ops]
      - outcome: approved
"#;
    let program = Program::parse(source, &access::dialect()).unwrap();
    let step = &program.workflow["default"].steps[1];
    match &step.body {
        Body::Action { name, payload } => {
            assert_eq!(name, "approval");
            let payload = payload.as_ref().expect("payload decoded");
            assert_eq!(
                payload.describe(),
                "notifying admins, ops for access approval"
            );
        }
        other => panic!("expected an action step, got {other:?}"),
    }
}

#[test]
fn scalar_step_is_rejected_with_its_location() {
    let source = r#"
workflow:
  default:
    steps:
      - helloworld
"#;
    let err = Program::parse(source, &Dialect::new()).unwrap_err();
    let (parse, path) = located_parse_error(&err);
    assert!(matches!(parse, ParseError::StepNotAMapping));
    assert_eq!(path, "$.workflow.default.steps[0]");
}

#[test]
fn action_without_dialect_actions_is_rejected() {
    let source = r#"
workflow:
  default:
    steps:
      - action: hi
"#;
    let err = Program::parse(source, &Dialect::new()).unwrap_err();
    let (parse, path) = located_parse_error(&err);
    assert!(matches!(parse, ParseError::NoActions));
    assert_eq!(path, "$.workflow.default.steps[0].action");
}

#[test]
fn unknown_action_is_rejected_with_its_location() {
    let source = r#"
workflow:
  default:
    steps:
      - action: teleport
"#;
    let err = Program::parse(source, &test_dialect()).unwrap_err();
    let (parse, path) = located_parse_error(&err);
    assert!(matches!(
        parse,
        ParseError::UnknownAction(name) if name == "teleport"
    ));
    assert_eq!(path, "$.workflow.default.steps[0].action");
}

#[test]
fn nested_action_error_carries_the_full_path() {
    let source = r#"
workflow:
  default:
    steps:
      - and:
          - check: true
          - action: hi
"#;
    let err = Program::parse(source, &Dialect::new()).unwrap_err();
    let (parse, path) = located_parse_error(&err);
    assert!(matches!(parse, ParseError::NoActions));
    assert_eq!(path, "$.workflow.default.steps[0].and[1].action");
}

#[test]
fn step_with_both_and_and_or_is_rejected() {
    let source = r#"
workflow:
  default:
    steps:
      - and:
          - check: true
        or:
          - check: false
"#;
    let err = Program::parse(source, &Dialect::new()).unwrap_err();
    let (parse, _) = located_parse_error(&err);
    assert!(matches!(parse, ParseError::AndOrConflict));
}

#[test]
fn step_without_a_recognized_key_is_rejected() {
    let source = r#"
workflow:
  default:
    steps:
      - frobnicate: yes
"#;
    let err = Program::parse(source, &Dialect::new()).unwrap_err();
    let (parse, _) = located_parse_error(&err);
    assert!(matches!(parse, ParseError::UnknownStepShape));
}

#[test]
fn document_without_workflow_is_rejected() {
    let err = Program::parse("steps: []", &Dialect::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ParseError::MissingWorkflow)
    ));
}

#[test]
fn path_without_steps_is_rejected() {
    let source = r#"
workflow:
  default:
    stages: []
"#;
    let err = Program::parse(source, &Dialect::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ParseError::MissingSteps(name)) if name == "default"
    ));
}

#[test]
fn declared_kind_must_agree_with_the_step_form() {
    let source = r#"
workflow:
  default:
    steps:
      - start: approved
      - outcome: approved
"#;
    let err = Program::parse(source, &test_dialect()).unwrap_err();
    let (parse, path) = located_parse_error(&err);
    assert!(matches!(
        parse,
        ParseError::KindMismatch {
            id,
            declared: NodeKind::Outcome,
            requested: NodeKind::Start,
        } if id == "approved"
    ));
    assert_eq!(path, "$.workflow.default.steps[0].start");
}

#[test]
fn declared_node_name_overrides_the_step_name() {
    let dialect = Dialect::new()
        .start("request", "Request")
        .outcome("approved", "Approved", 1);
    let source = r#"
workflow:
  default:
    steps:
      - name: my own label
        start: request
      - outcome: approved
"#;
    let program = Program::parse(source, &dialect).unwrap();
    assert_eq!(program.workflow["default"].steps[0].name, "Request");
}

#[test]
fn invalid_dialect_is_rejected_before_parsing() {
    let dialect = Dialect::new()
        .start("request", "")
        .outcome("approved", "", 1)
        .outcome("denied", "", 1);
    let err = Program::parse("workflow: {}", &dialect).unwrap_err();
    assert!(matches!(
        err,
        Error::Dialect(DialectError::DuplicatePriority(1))
    ));
}

#[test]
fn dialect_validation_is_idempotent() {
    let dialect = test_dialect();
    assert!(dialect.validate().is_ok());
    assert!(dialect.validate().is_ok());

    let zero = Dialect::new().outcome("approved", "", 0);
    assert!(matches!(
        zero.validate(),
        Err(DialectError::NonPositivePriority { priority: 0, .. })
    ));
}

#[test]
fn compile_errors_carry_the_step_location() {
    let source = r#"
workflow:
  default:
    steps:
      - start: request
      - check: nonsense == true
      - outcome: approved
"#;
    let program = Program::parse(source, &test_dialect()).unwrap();
    let err = Compiler::new(program).compile().unwrap_err();
    match err {
        Error::Node(node) => {
            let path = node.location.expect("compile error should be located");
            assert_eq!(path.to_string(), "$.workflow.default.steps[1]");
        }
        other => panic!("expected a located error, got {other:?}"),
    }
}

#[test]
fn wrapping_preserves_the_innermost_location() {
    let inner = DocPath::root().key("workflow").key("a");
    let outer = DocPath::root().key("workflow").key("b");

    let err = NodeError::wrap(ParseError::NoActions, Some(inner.clone()));
    let err = NodeError::wrap(err, Some(outer));

    match err {
        Error::Node(node) => assert_eq!(node.location, Some(inner)),
        other => panic!("expected a located error, got {other:?}"),
    }
}

#[test]
fn pretty_print_annotates_the_offending_line() {
    let source = r#"
workflow:
  default:
    steps:
      - action: hi
"#;
    let err = Program::parse(source, &Dialect::new()).unwrap_err();
    match err {
        Error::Node(node) => {
            let rendered = node.pretty_print(source);
            assert!(rendered.contains("no actions are defined"));
            assert!(rendered.contains("- action: hi"));
            assert!(rendered.contains('^'));
        }
        other => panic!("expected a located error, got {other:?}"),
    }
}

#[test]
fn doc_paths_render_like_yaml_paths() {
    let path = DocPath::root()
        .key("workflow")
        .key("default")
        .key("steps")
        .index(0)
        .key("and")
        .index(1)
        .key("action");
    assert_eq!(path.to_string(), "$.workflow.default.steps[0].and[1].action");
}

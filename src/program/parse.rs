use super::{DocPath, Path, Program, Segment};
use crate::dialect::Dialect;
use crate::error::{Error, NodeError, ParseError};
use crate::node::NodeKind;
use crate::step::{Body, BoolOp, Step};
use serde_yaml::Value;

/// Parse a workflow document.
///
/// The document looks like:
///
/// ```yaml
/// workflow:
///   default:
///     steps:
///       - start: request
///       - check: input.group == "test"
///       - outcome: approved
/// ```
pub(super) fn parse_program(source: &str, dialect: &Dialect) -> Result<Program, Error> {
    dialect.validate()?;

    let doc: Value = serde_yaml::from_str(source).map_err(ParseError::Yaml)?;
    let passes = doc
        .get("workflow")
        .and_then(Value::as_mapping)
        .ok_or(ParseError::MissingWorkflow)?;

    let workflow_path = DocPath::root().key("workflow");
    let mut program = Program::new();

    for (name, pass) in passes {
        let name = name.as_str().ok_or(ParseError::BadFieldValue {
            key: "workflow".to_string(),
            expected: "mapping of named paths",
        })?;
        let pass_path = workflow_path.key(name);

        let items = pass
            .get("steps")
            .and_then(Value::as_sequence)
            .ok_or_else(|| ParseError::MissingSteps(name.to_string()))?;
        let steps_path = pass_path.key("steps");

        let mut steps = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            steps.push(parse_step(item, steps_path.index(index), name, dialect)?);
        }

        program.workflow.insert(
            name.to_string(),
            Path {
                id: name.to_string(),
                steps,
            },
        );
    }

    Ok(program)
}

fn parse_step(value: &Value, at: DocPath, pass: &str, dialect: &Dialect) -> Result<Step, Error> {
    if value.as_mapping().is_none() {
        return Err(NodeError::wrap(ParseError::StepNotAMapping, Some(at)));
    }

    // optional display name; for ref steps the dialect's declared name wins
    let mut name = String::new();
    if let Some(v) = value.get("name") {
        name = v
            .as_str()
            .ok_or_else(|| {
                NodeError::wrap(
                    ParseError::BadFieldValue {
                        key: "name".to_string(),
                        expected: "string",
                    },
                    Some(at.key("name")),
                )
            })?
            .to_string();
    }

    if let Some(v) = value.get("start") {
        return node_ref(v, &at, "start", NodeKind::Start, name, pass, dialect);
    }
    if let Some(v) = value.get("outcome") {
        return node_ref(v, &at, "outcome", NodeKind::Outcome, name, pass, dialect);
    }

    if let Some(v) = value.get("check") {
        let expression = scalar_string(v).ok_or_else(|| {
            NodeError::wrap(
                ParseError::BadFieldValue {
                    key: "check".to_string(),
                    expected: "scalar expression",
                },
                Some(at.key("check")),
            )
        })?;
        return Ok(step(Body::Check { expression }, name, pass, at));
    }

    if let Some(v) = value.get("action") {
        let action_path = at.key("action");
        let Some(factory) = dialect.actions else {
            return Err(NodeError::wrap(ParseError::NoActions, Some(action_path)));
        };
        let action_name = v.as_str().ok_or_else(|| {
            NodeError::wrap(
                ParseError::BadFieldValue {
                    key: "action".to_string(),
                    expected: "string",
                },
                Some(action_path.clone()),
            )
        })?;

        let mut actions = factory();
        let Some(mut payload) = actions.remove(action_name) else {
            return Err(NodeError::wrap(
                ParseError::UnknownAction(action_name.to_string()),
                Some(action_path),
            ));
        };
        if let Some(with) = value.get("with") {
            payload.decode(with).map_err(|e| {
                NodeError::wrap(
                    ParseError::ActionDecode {
                        name: action_name.to_string(),
                        source: e,
                    },
                    Some(at.key("with")),
                )
            })?;
        }
        return Ok(step(
            Body::Action {
                name: action_name.to_string(),
                payload: Some(payload),
            },
            name,
            pass,
            at,
        ));
    }

    let has_and = value.get("and").is_some();
    let has_or = value.get("or").is_some();
    if has_and && has_or {
        return Err(NodeError::wrap(ParseError::AndOrConflict, Some(at)));
    }
    if has_and || has_or {
        let (key, op) = if has_and {
            ("and", BoolOp::And)
        } else {
            ("or", BoolOp::Or)
        };
        let items = value.get(key).and_then(Value::as_sequence).ok_or_else(|| {
            NodeError::wrap(
                ParseError::BadFieldValue {
                    key: key.to_string(),
                    expected: "sequence of steps",
                },
                Some(at.key(key)),
            )
        })?;

        let children_path = at.key(key);
        let mut children = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            children.push(parse_step(item, children_path.index(index), pass, dialect)?);
        }

        let mut step = step(Body::Boolean(op), name, pass, at);
        step.children = children;
        return Ok(step);
    }

    Err(NodeError::wrap(ParseError::UnknownStepShape, Some(at)))
}

fn node_ref(
    value: &Value,
    at: &DocPath,
    key: &str,
    kind: NodeKind,
    name: String,
    pass: &str,
    dialect: &Dialect,
) -> Result<Step, Error> {
    let ref_path = at.key(key);
    let id = value.as_str().ok_or_else(|| {
        NodeError::wrap(
            ParseError::BadFieldValue {
                key: key.to_string(),
                expected: "node id",
            },
            Some(ref_path.clone()),
        )
    })?;

    let node = dialect
        .resolve(id, kind)
        .map_err(|e| NodeError::wrap(e, Some(ref_path)))?;

    // the declared name wins so that a shared node reads the same in
    // every pass that references it
    let name = if node.name.is_empty() {
        name
    } else {
        node.name.clone()
    };

    Ok(step(Body::Ref(node), name, pass, at.clone()))
}

fn step(body: Body, name: String, pass: &str, at: DocPath) -> Step {
    Step {
        name,
        body,
        children: Vec::new(),
        pass: pass.to_string(),
        position: Vec::new(),
        location: Some(at),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Render an annotated excerpt of `source` pointing at the entry a
/// [`DocPath`] names. Best effort: `None` when the path cannot be located,
/// so diagnostics degrade to the bare error message rather than failing.
pub fn annotate(source: &str, path: &DocPath) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let mut start = 0usize;
    let mut floor: Option<usize> = None;
    let mut target: Option<(usize, usize)> = None;

    for segment in path.segments() {
        match segment {
            Segment::Key(key) => {
                let mut hit = None;
                let plain = format!("{key}:");
                let spaced = format!("{key}: ");
                for idx in start..lines.len() {
                    let Some((indent, text)) = measure(lines[idx]) else {
                        continue;
                    };
                    if let Some(f) = floor {
                        if indent < f {
                            break;
                        }
                        if indent == f && !(idx == start && text.starts_with('-')) {
                            break;
                        }
                    }
                    let text = text
                        .strip_prefix('-')
                        .map(str::trim_start)
                        .unwrap_or(text);
                    if text == plain || text.starts_with(&spaced) {
                        hit = Some((idx, indent));
                        break;
                    }
                }
                let (idx, indent) = hit?;
                target = Some((idx, indent));
                floor = Some(indent);
                start = idx + 1;
            }
            Segment::Index(i) => {
                let mut remaining = *i;
                let mut item_indent: Option<usize> = None;
                let mut hit = None;
                for idx in start..lines.len() {
                    let Some((indent, text)) = measure(lines[idx]) else {
                        continue;
                    };
                    if let Some(f) = floor {
                        if indent <= f {
                            break;
                        }
                    }
                    if !text.starts_with('-') {
                        continue;
                    }
                    match item_indent {
                        None => item_indent = Some(indent),
                        Some(it) if indent > it => continue,
                        Some(it) if indent < it => break,
                        _ => {}
                    }
                    if remaining == 0 {
                        hit = Some((idx, indent));
                        break;
                    }
                    remaining -= 1;
                }
                let (idx, indent) = hit?;
                target = Some((idx, indent));
                floor = Some(indent);
                start = idx;
            }
        }
    }

    let (idx, indent) = target?;
    let first = idx.saturating_sub(2);
    let mut out = String::new();
    for i in first..=idx {
        let marker = if i == idx { '>' } else { ' ' };
        out.push_str(&format!("{}{:>4} | {}\n", marker, i + 1, lines[i]));
    }
    // the "NNNN | " gutter is 8 columns wide
    out.push_str(&format!("{}^\n", " ".repeat(8 + indent)));
    Some(out)
}

fn measure(line: &str) -> Option<(usize, &str)> {
    let text = line.trim();
    if text.is_empty() || text.starts_with('#') {
        return None;
    }
    Some((line.len() - line.trim_start().len(), text))
}

use super::ast::{Expr, Value};
use crate::error::ExprError;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "expr/grammar.pest"]
struct ExprParser;

pub(super) fn parse(source: &str) -> Result<Expr, ExprError> {
    let mut pairs = ExprParser::parse(Rule::root, source)
        .map_err(|e| ExprError::Parse(e.to_string()))?;
    let root = pairs.next().ok_or_else(|| malformed("empty parse"))?;
    let expression = root
        .into_inner()
        .next()
        .ok_or_else(|| malformed("missing expression"))?;
    build(expression)
}

fn malformed(what: &str) -> ExprError {
    ExprError::Parse(what.to_string())
}

fn build(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    match pair.as_rule() {
        Rule::expression | Rule::primary => build(first_inner(pair)?),
        Rule::or_expr | Rule::and_expr | Rule::cmp_expr => fold_binary(pair),
        Rule::unary_expr => {
            let mut inner = pair.into_inner();
            let head = inner.next().ok_or_else(|| malformed("empty unary"))?;
            match head.as_rule() {
                Rule::op_not => {
                    let operand = inner
                        .next()
                        .ok_or_else(|| malformed("missing '!' operand"))?;
                    Ok(Expr::Not(Box::new(build(operand)?)))
                }
                _ => build(head),
            }
        }
        Rule::member_expr => {
            let mut inner = pair.into_inner();
            let base = inner.next().ok_or_else(|| malformed("empty member"))?;
            let mut expr = build(base)?;
            for field in inner {
                expr = Expr::Member(Box::new(expr), field.as_str().to_string());
            }
            Ok(expr)
        }
        Rule::literal => literal(first_inner(pair)?),
        Rule::identifier => Ok(Expr::Ident(pair.as_str().to_string())),
        rule => Err(malformed(&format!("unexpected rule {rule:?}"))),
    }
}

/// Left-fold a chain of same-precedence binary operations into a tree.
fn fold_binary(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    let mut inner = pair.into_inner();
    let first = inner.next().ok_or_else(|| malformed("missing operand"))?;
    let mut left = build(first)?;
    while let Some(op) = inner.next() {
        let right = inner
            .next()
            .ok_or_else(|| malformed("missing right operand"))?;
        left = combine(op.as_rule(), left, build(right)?)?;
    }
    Ok(left)
}

fn combine(op: Rule, left: Expr, right: Expr) -> Result<Expr, ExprError> {
    let (l, r) = (Box::new(left), Box::new(right));
    Ok(match op {
        Rule::op_or => Expr::Or(l, r),
        Rule::op_and => Expr::And(l, r),
        Rule::op_eq => Expr::Equal(l, r),
        Rule::op_ne => Expr::NotEqual(l, r),
        Rule::op_lt => Expr::LessThan(l, r),
        Rule::op_le => Expr::LessThanOrEqual(l, r),
        Rule::op_gt => Expr::GreaterThan(l, r),
        Rule::op_ge => Expr::GreaterThanOrEqual(l, r),
        Rule::op_in => Expr::In(l, r),
        rule => return Err(malformed(&format!("unexpected operator {rule:?}"))),
    })
}

fn literal(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    let value = match pair.as_rule() {
        Rule::null_lit => Value::Null,
        Rule::bool_lit => Value::Bool(pair.as_str() == "true"),
        Rule::number_lit => {
            let text = pair.as_str();
            if text.contains('.') {
                Value::Double(text.parse().map_err(|_| malformed("invalid number"))?)
            } else {
                Value::Int(text.parse().map_err(|_| malformed("invalid number"))?)
            }
        }
        Rule::string_lit => Value::String(unescape(pair.as_str())),
        rule => return Err(malformed(&format!("unexpected literal {rule:?}"))),
    };
    Ok(Expr::Literal(value))
}

fn unescape(quoted: &str) -> String {
    let body = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn first_inner(pair: Pair<Rule>) -> Result<Pair<Rule>, ExprError> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| malformed(&format!("empty {rule:?}")))
}

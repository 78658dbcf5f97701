//! Strict truthiness for Tera conditions.
//!
//! Tera already fails on undefined values in `{{ }}` blocks, `for` containers,
//! comparisons and filter arguments. Two places are lenient: a bare
//! identifier used as a condition (`{% if ingress.enabled %}`, either operand
//! of `and`/`or`) and a negated identifier (`not ingress.enabled`). Both
//! evaluate an undefined value as false.
//!
//! After compilation every template AST is rewritten so those identifiers go
//! through [`STRICT_TRUTHY_FN`], whose argument is evaluated like any other
//! expression and therefore fails on undefined values. Truthiness of defined
//! values is unchanged. Optional values stay expressible with
//! `x is defined` or `x | default(value=false)`.

use std::collections::HashMap;

use tera::ast::{Expr, ExprVal, FunctionCall, LogicOperator, Node};
use tera::{Template, Tera, Value};

/// Name of the function wrapping condition identifiers.
pub const STRICT_TRUTHY_FN: &str = "__strict_truthy";

const ARG: &str = "value";

/// Register [`STRICT_TRUTHY_FN`] and rewrite every registered template.
pub fn harden(tera: &mut Tera) {
    tera.register_function(STRICT_TRUTHY_FN, strict_truthy);
    for template in tera.templates.values_mut() {
        harden_template(template);
    }
}

fn strict_truthy(args: &HashMap<String, Value>) -> tera::Result<Value> {
    match args.get(ARG) {
        Some(value) => Ok(Value::Bool(is_truthy(value))),
        None => Err(tera::Error::msg(format!("`{STRICT_TRUTHY_FN}` requires a `{ARG}` argument"))),
    }
}

/// Tera's truthiness rules.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan())
            }
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// Macros and blocks are stored outside `ast` as well, and inheritance
// renders from `blocks_definitions`.
fn harden_template(template: &mut Template) {
    harden_nodes(&mut template.ast);
    for definition in template.macros.values_mut() {
        harden_nodes(&mut definition.body);
        for default in definition.args.values_mut().flatten() {
            harden_expr(default);
        }
    }
    for block in template.blocks.values_mut() {
        harden_nodes(&mut block.body);
    }
    for definitions in template.blocks_definitions.values_mut() {
        for (_, block) in definitions.iter_mut() {
            harden_nodes(&mut block.body);
        }
    }
}

fn harden_nodes(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::VariableBlock(_, expr) => harden_expr(expr),
            Node::MacroDefinition(_, definition, _) => {
                harden_nodes(&mut definition.body);
                for default in definition.args.values_mut().flatten() {
                    harden_expr(default);
                }
            }
            Node::Set(_, set) => harden_expr(&mut set.value),
            Node::FilterSection(_, section, _) => {
                harden_call(&mut section.filter);
                harden_nodes(&mut section.body);
            }
            Node::Block(_, block, _) => harden_nodes(&mut block.body),
            Node::Forloop(_, forloop, _) => {
                harden_expr(&mut forloop.container);
                harden_nodes(&mut forloop.body);
                if let Some(empty) = forloop.empty_body.as_mut() {
                    harden_nodes(empty);
                }
            }
            Node::If(branches, _) => {
                for (_, condition, body) in branches.conditions.iter_mut() {
                    harden_condition(condition);
                    harden_nodes(body);
                }
                if let Some((_, body)) = branches.otherwise.as_mut() {
                    harden_nodes(body);
                }
            }
            _ => {}
        }
    }
}

/// An expression evaluated for its truthiness.
fn harden_condition(expr: &mut Expr) {
    if matches!(expr.val, ExprVal::Ident(_)) {
        wrap_ident(expr);
    } else {
        harden_expr(expr);
    }
}

/// An expression evaluated for its value.
fn harden_expr(expr: &mut Expr) {
    if expr.negated && matches!(expr.val, ExprVal::Ident(_)) {
        wrap_ident(expr);
        return;
    }

    for filter in expr.filters.iter_mut() {
        harden_call(filter);
    }

    match &mut expr.val {
        ExprVal::Logic(logic) => match logic.operator {
            LogicOperator::And | LogicOperator::Or => {
                harden_condition(&mut logic.lhs);
                harden_condition(&mut logic.rhs);
            }
            _ => {
                harden_expr(&mut logic.lhs);
                harden_expr(&mut logic.rhs);
            }
        },
        ExprVal::Math(math) => {
            harden_expr(&mut math.lhs);
            harden_expr(&mut math.rhs);
        }
        ExprVal::In(contains) => {
            harden_expr(&mut contains.lhs);
            harden_expr(&mut contains.rhs);
        }
        ExprVal::Test(test) => test.args.iter_mut().for_each(harden_expr),
        ExprVal::MacroCall(call) => call.args.values_mut().for_each(harden_expr),
        ExprVal::FunctionCall(call) => harden_call(call),
        ExprVal::Array(items) => items.iter_mut().for_each(harden_expr),
        _ => {}
    }
}

fn harden_call(call: &mut FunctionCall) {
    call.args.values_mut().for_each(harden_expr);
}

/// `ident | filters` becomes `__strict_truthy(value=ident | filters)`,
/// keeping the outer negation.
fn wrap_ident(expr: &mut Expr) {
    let inner = Expr {
        val: std::mem::replace(&mut expr.val, ExprVal::Bool(false)),
        negated: false,
        filters: std::mem::take(&mut expr.filters),
    };
    let mut args = HashMap::with_capacity(1);
    args.insert(ARG.to_string(), inner);
    expr.val = ExprVal::FunctionCall(FunctionCall {
        name: STRICT_TRUTHY_FN.to_string(),
        args,
    });
}

//! Expression evaluation (ES5 11)
//!
//! Each expression node maps to a computation yielding a [`Datum`]. Member
//! and identifier nodes yield references; everything else yields values.
//! Hosted exceptions leave through the failure channel.

use std::rc::Rc;

use crate::ast::{
    ArrayExpression, AssignmentExpression, AssignmentOp, BinaryOp, CallExpression, Expression,
    LiteralValue, LogicalOp, MemberExpression, MemberProperty, NewExpression, ObjectExpression,
    PropertyKind, UnaryExpression, UnaryOp, UpdateExpression, UpdateOp,
};
use crate::compute::{defer, enumeration, lazy, sequence, succeed};
use crate::value::{
    CheapClone, DescriptorFragment, JsString, JsValue, PropertyDescriptor, to_int32, to_uint32,
};

use super::conversion::{Hint, with_number, with_primitive, with_string};
use super::environment;
use super::reference::{self, Reference};
use super::{
    Context, Datum, ErrorKind, Eval, EvalExt, function, object, or_reject, throw_error, undefined,
    value, with_realm,
};

/// Evaluate `expr` to a value or reference
pub fn evaluate(expr: &Rc<Expression>) -> Eval {
    let expr = Rc::clone(expr);
    lazy(move || expression(&expr))
}

/// Evaluate `expr` and resolve the result with GetValue
pub fn evaluate_value(expr: &Rc<Expression>) -> Eval {
    evaluate(expr).and_value(value)
}

fn expression(expr: &Expression) -> Eval {
    match expr {
        Expression::Literal(literal) => value(match &literal.value {
            LiteralValue::Null => JsValue::Null,
            LiteralValue::Boolean(b) => JsValue::Boolean(*b),
            LiteralValue::Number(n) => JsValue::Number(*n),
            LiteralValue::String(s) => JsValue::String(s.cheap_clone()),
        }),
        Expression::Identifier(id) => identifier(id.name.cheap_clone()),
        Expression::This(_) => defer(|ctx: &mut Context| value(ctx.user_data.this_binding.cheap_clone())),
        Expression::Array(array) => array_literal(array),
        Expression::Object(object) => object_literal(object),
        Expression::Function(literal) => {
            let literal = Rc::clone(literal);
            defer(move |ctx: &mut Context| {
                let scope = ctx.user_data.lexical_env.cheap_clone();
                let func = function::make_function_expression(&ctx.user_data.realm, literal, scope);
                value(func)
            })
        }
        Expression::Unary(unary) => unary_expression(unary),
        Expression::Binary(binary) => {
            let (op, right) = (binary.operator, Rc::clone(&binary.right));
            evaluate_value(&binary.left)
                .and_value(move |l| evaluate_value(&right).and_value(move |r| apply_binary(op, l, r)))
        }
        Expression::Logical(logical) => {
            let (op, right) = (logical.operator, Rc::clone(&logical.right));
            evaluate_value(&logical.left).and_value(move |l| {
                let short_circuit = match op {
                    LogicalOp::And => !l.to_boolean(),
                    LogicalOp::Or => l.to_boolean(),
                };
                if short_circuit { value(l) } else { evaluate_value(&right) }
            })
        }
        Expression::Conditional(conditional) => {
            let consequent = Rc::clone(&conditional.consequent);
            let alternate = Rc::clone(&conditional.alternate);
            evaluate_value(&conditional.test).and_value(move |test| {
                if test.to_boolean() {
                    evaluate_value(&consequent)
                } else {
                    evaluate_value(&alternate)
                }
            })
        }
        Expression::Assignment(assignment) => assignment_expression(assignment),
        Expression::Update(update) => update_expression(update),
        Expression::Sequence(seq) => sequence(
            seq.expressions.iter().map(evaluate_value).collect(),
            Datum::Value(JsValue::Undefined),
        ),
        Expression::Member(member) => member_expression(member),
        Expression::Call(call) => call_expression(call),
        Expression::New(new) => new_expression(new),
    }
}

/// Reference to `name` resolved against the running lexical environment
pub(super) fn identifier(name: JsString) -> Eval {
    defer(move |ctx: &mut Context| {
        let running = &ctx.user_data;
        succeed(Datum::Reference(environment::get_identifier_reference(
            Some(&running.lexical_env),
            name,
            running.strict,
        )))
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Literals
// ═══════════════════════════════════════════════════════════════════════════════

fn array_literal(array: &ArrayExpression) -> Eval {
    let elements: Vec<Option<Rc<Expression>>> = array.elements.clone();
    with_realm(move |realm| {
        let target = realm.new_array(Vec::new());
        let len = u32::try_from(elements.len()).unwrap_or(u32::MAX);
        let steps: Vec<Eval> = elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                let element = element.as_ref()?;
                let target = target.cheap_clone();
                Some(evaluate_value(element).and_value(move |v| {
                    target
                        .borrow_mut()
                        .insert(index.to_string(), PropertyDescriptor::open(v));
                    undefined()
                }))
            })
            .collect();
        sequence(steps, Datum::Value(JsValue::Undefined)).then(lazy(move || {
            object::set_length_value(&target, len);
            value(target)
        }))
    })
}

fn object_literal(literal: &ObjectExpression) -> Eval {
    let properties: Vec<(JsString, Rc<Expression>, PropertyKind)> = literal
        .properties
        .iter()
        .map(|p| (p.key.cheap_clone(), Rc::clone(&p.value), p.kind))
        .collect();
    with_realm(move |realm| {
        let target = realm.new_object();
        let steps: Vec<Eval> = properties
            .into_iter()
            .map(|(key, expr, kind)| {
                let target = target.cheap_clone();
                evaluate_value(&expr).and_value(move |v| {
                    let frag = match kind {
                        PropertyKind::Init => DescriptorFragment::data(v, true, true, true),
                        PropertyKind::Get => DescriptorFragment {
                            get: Some(v),
                            enumerable: Some(true),
                            configurable: Some(true),
                            ..DescriptorFragment::default()
                        },
                        PropertyKind::Set => DescriptorFragment {
                            set: Some(v),
                            enumerable: Some(true),
                            configurable: Some(true),
                            ..DescriptorFragment::default()
                        },
                    };
                    or_reject(object::define_own_property(&target, &key, frag), |()| undefined())
                })
            })
            .collect();
        sequence(steps, Datum::Value(JsValue::Undefined)).then(value(target))
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Operators
// ═══════════════════════════════════════════════════════════════════════════════

fn unary_expression(unary: &UnaryExpression) -> Eval {
    let argument = evaluate(&unary.argument);
    match unary.operator {
        UnaryOp::Typeof => argument.bind(|datum| match datum {
            Datum::Reference(reference) if reference.is_unresolved() => value("undefined"),
            other => succeed(other).and_value(|v| value(v.type_of())),
        }),
        UnaryOp::Delete => argument.bind(|datum| match datum {
            Datum::Reference(reference) => reference::delete_reference(reference),
            _ => value(true),
        }),
        UnaryOp::Void => argument.and_value(|_| undefined()),
        UnaryOp::Not => argument.and_value(|v| value(!v.to_boolean())),
        UnaryOp::Minus => argument.and_value(|v| with_number(v, |n| value(-n))),
        UnaryOp::Plus => argument.and_value(|v| with_number(v, |n| value(n))),
        UnaryOp::BitNot => argument.and_value(|v| with_number(v, |n| value(!to_int32(n)))),
    }
}

/// Apply a binary operator to two already evaluated operands
pub fn apply_binary(op: BinaryOp, l: JsValue, r: JsValue) -> Eval {
    match op {
        BinaryOp::Add => with_primitive(l, Hint::Default, move |lp| {
            with_primitive(r, Hint::Default, move |rp| match (&lp, &rp) {
                (JsValue::String(_), _) | (_, JsValue::String(_)) => {
                    value(lp.to_string_primitive().concat(&rp.to_string_primitive()))
                }
                _ => value(lp.to_number_primitive() + rp.to_number_primitive()),
            })
        }),
        BinaryOp::Sub => numeric(l, r, |a, b| a - b),
        BinaryOp::Mul => numeric(l, r, |a, b| a * b),
        BinaryOp::Div => numeric(l, r, |a, b| a / b),
        BinaryOp::Mod => numeric(l, r, |a, b| a % b),
        BinaryOp::BitAnd => numeric(l, r, |a, b| f64::from(to_int32(a) & to_int32(b))),
        BinaryOp::BitOr => numeric(l, r, |a, b| f64::from(to_int32(a) | to_int32(b))),
        BinaryOp::BitXor => numeric(l, r, |a, b| f64::from(to_int32(a) ^ to_int32(b))),
        BinaryOp::LShift => numeric(l, r, |a, b| f64::from(to_int32(a).wrapping_shl(to_uint32(b) & 0x1f))),
        BinaryOp::RShift => numeric(l, r, |a, b| f64::from(to_int32(a).wrapping_shr(to_uint32(b) & 0x1f))),
        BinaryOp::URShift => numeric(l, r, |a, b| f64::from(to_uint32(a).wrapping_shr(to_uint32(b) & 0x1f))),
        BinaryOp::Lt => relational(l, r, |a, b| compare(a, b) == Some(true)),
        BinaryOp::Gt => relational(l, r, |a, b| compare(b, a) == Some(true)),
        BinaryOp::LtEq => relational(l, r, |a, b| compare(b, a) == Some(false)),
        BinaryOp::GtEq => relational(l, r, |a, b| compare(a, b) == Some(false)),
        BinaryOp::Eq => loose_equals(l, r),
        BinaryOp::NotEq => loose_equals(l, r).and_value(|v| value(!v.to_boolean())),
        BinaryOp::StrictEq => value(l.strict_equals(&r)),
        BinaryOp::StrictNotEq => value(!l.strict_equals(&r)),
        BinaryOp::Instanceof => match &r {
            JsValue::Object(callee) if callee.is_callable() => function::has_instance(callee, l),
            _ => throw_error(
                ErrorKind::TypeError,
                "Right-hand side of 'instanceof' is not callable",
            ),
        },
        BinaryOp::In => match r {
            JsValue::Object(target) => with_string(l, move |key| value(object::has_property(&target, &key))),
            other => throw_error(
                ErrorKind::TypeError,
                format!("Cannot use 'in' operator to search in {}", other.to_string_primitive()),
            ),
        },
    }
}

fn numeric(l: JsValue, r: JsValue, op: fn(f64, f64) -> f64) -> Eval {
    with_number(l, move |a| with_number(r, move |b| value(op(a, b))))
}

/// Both operands through ToPrimitive(Number), left first, then `op`
fn relational(l: JsValue, r: JsValue, op: fn(&JsValue, &JsValue) -> bool) -> Eval {
    with_primitive(l, Hint::Number, move |a| {
        with_primitive(r, Hint::Number, move |b| value(op(&a, &b)))
    })
}

/// Abstract relational comparison `a < b` on primitives (ES5 11.8.5);
/// `None` stands for undefined (a NaN was involved).
fn compare(a: &JsValue, b: &JsValue) -> Option<bool> {
    if let (JsValue::String(x), JsValue::String(y)) = (a, b) {
        return Some(x.as_str().encode_utf16().lt(y.as_str().encode_utf16()));
    }
    let (x, y) = (a.to_number_primitive(), b.to_number_primitive());
    if x.is_nan() || y.is_nan() {
        None
    } else {
        Some(x < y)
    }
}

/// Abstract equality `==` (ES5 11.9.3)
pub fn loose_equals(a: JsValue, b: JsValue) -> Eval {
    use JsValue::{Boolean, Null, Number, Object, String, Undefined};
    match (&a, &b) {
        (Undefined | Null, Undefined | Null) => value(true),
        (Number(_), String(s)) => value(a.strict_equals(&Number(crate::value::string_to_number(s.as_str())))),
        (String(s), Number(_)) => value(Number(crate::value::string_to_number(s.as_str())).strict_equals(&b)),
        (Boolean(_), _) => loose_equals(Number(a.to_number_primitive()), b),
        (_, Boolean(_)) => loose_equals(a, Number(b.to_number_primitive())),
        (Number(_) | String(_), Object(_)) => with_primitive(b, Hint::Default, move |bp| loose_equals(a, bp)),
        (Object(_), Number(_) | String(_)) => with_primitive(a, Hint::Default, move |ap| loose_equals(ap, b)),
        _ => value(a.strict_equals(&b)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Assignment and update
// ═══════════════════════════════════════════════════════════════════════════════

fn assignment_expression(assignment: &AssignmentExpression) -> Eval {
    let right = Rc::clone(&assignment.right);
    let operator = assignment.operator;
    evaluate(&assignment.left).bind(move |target| {
        let Some(op) = operator.binary_op() else {
            debug_assert!(operator == AssignmentOp::Assign);
            return evaluate_value(&right).and_value(move |v| {
                reference::put_value(target, v.cheap_clone()).then(value(v))
            });
        };
        succeed(target.clone()).and_value(move |current| {
            evaluate_value(&right).and_value(move |r| {
                apply_binary(op, current, r).and_value(move |result| {
                    reference::put_value(target, result.cheap_clone()).then(value(result))
                })
            })
        })
    })
}

fn update_expression(update: &UpdateExpression) -> Eval {
    let delta = match update.operator {
        UpdateOp::Increment => 1.0,
        UpdateOp::Decrement => -1.0,
    };
    let prefix = update.prefix;
    evaluate(&update.argument).bind(move |target| {
        if !matches!(target, Datum::Reference(_)) {
            return throw_error(
                ErrorKind::ReferenceError,
                "Invalid left-hand side expression in update operation",
            );
        }
        succeed(target.clone()).and_value(move |current| {
            with_number(current, move |old| {
                let new = old + delta;
                reference::put_value(target, JsValue::Number(new))
                    .then(value(if prefix { new } else { old }))
            })
        })
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Member access, calls, new
// ═══════════════════════════════════════════════════════════════════════════════

fn member_expression(member: &MemberExpression) -> Eval {
    let key = match &member.property {
        MemberProperty::Identifier(id) => value(id.name.cheap_clone()),
        MemberProperty::Computed(expr) => evaluate_value(expr),
    };
    evaluate_value(&member.object).and_value(move |base| {
        key.and_value(move |key| {
            if base.is_nullish() {
                return throw_error(
                    ErrorKind::TypeError,
                    format!(
                        "Cannot read property '{}' of {}",
                        key.to_string_primitive(),
                        base.to_string_primitive()
                    ),
                );
            }
            with_string(key, move |key| {
                defer(move |ctx: &mut Context| {
                    let strict = ctx.user_data.strict;
                    succeed(Datum::Reference(Reference::Property { base, key, strict }))
                })
            })
        })
    })
}

/// Evaluate argument expressions left to right
fn arguments(args: &[Rc<Expression>]) -> Eval {
    enumeration(args.iter().map(evaluate_value).collect())
}

fn is_eval_identifier(expr: &Expression) -> bool {
    matches!(expr, Expression::Identifier(id) if id.name.as_str() == "eval")
}

/// Source-level name of a callee (`f`, `this.m`, `a[...].b`) for error
/// messages; `None` for any other expression.
fn callee_name(expr: &Expression) -> Option<String> {
    let mut segments = Vec::new();
    let mut current = expr;
    let root = loop {
        match current {
            Expression::Identifier(id) => break id.name.to_string(),
            Expression::This(_) => break "this".to_string(),
            Expression::Member(member) => {
                segments.push(match &member.property {
                    MemberProperty::Identifier(id) => format!(".{}", id.name),
                    MemberProperty::Computed(_) => "[...]".to_string(),
                });
                current = &member.object;
            }
            _ => return None,
        }
    };
    Some(segments.iter().rev().fold(root, |name, segment| name + segment))
}

fn call_expression(call: &CallExpression) -> Eval {
    let args: Vec<Rc<Expression>> = call.arguments.clone();
    let maybe_eval = is_eval_identifier(&call.callee);
    let name = callee_name(&call.callee);
    evaluate(&call.callee).bind(move |datum| {
        let this_value = match &datum {
            Datum::Reference(reference) => reference::implicit_this(reference),
            _ => JsValue::Undefined,
        };
        succeed(datum).and_value(move |func| {
            if !func.is_callable() {
                let name = name.unwrap_or_else(|| function::describe(&func));
                return throw_error(ErrorKind::TypeError, format!("{name} is not a function"));
            }
            arguments(&args).and_values(move |argv| {
                defer(move |ctx: &mut Context| {
                    let direct = maybe_eval
                        && func
                            .as_object()
                            .is_some_and(|f| f.ptr_eq(&ctx.user_data.realm.eval));
                    if direct {
                        let caller_strict = ctx.user_data.strict;
                        function::perform_eval(argv, function::EvalScope::Direct { caller_strict })
                    } else {
                        function::call(&func, this_value, argv)
                    }
                })
            })
        })
    })
}

fn new_expression(new: &NewExpression) -> Eval {
    let args: Vec<Rc<Expression>> = new.arguments.clone();
    let name = callee_name(&new.callee);
    evaluate_value(&new.callee).and_value(move |callee| {
        arguments(&args).and_values(move |argv| {
            if !callee.as_object().is_some_and(|c| c.is_constructor()) {
                let name = name.unwrap_or_else(|| function::describe(&callee));
                return throw_error(ErrorKind::TypeError, format!("{name} is not a constructor"));
            }
            function::construct(&callee, argv)
        })
    })
}

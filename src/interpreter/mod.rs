//! Evaluator for ECMAScript 5 programs
//!
//! Syntax nodes are mapped to computations of the [`crate::compute`] engine.
//! Expressions evaluate to a [`Datum`] (a value or a [`Reference`]) and
//! report hosted exceptions on the failure channel; statements evaluate to a
//! [`Completion`].

pub mod builtins;
pub mod completion;
pub mod context;
pub mod conversion;
pub mod environment;
pub mod expression;
pub mod function;
pub mod hoist;
pub mod object;
pub mod realm;
pub mod reference;
pub mod statement;

use std::rc::Rc;

use crate::ast::Program;
use crate::compute::{ComputeContext, Computation, Decide, defer, fail, succeed};
use crate::platform::TimeProvider;
use crate::value::JsValue;

pub use completion::{Completion, CompletionKind};
pub use context::{CodeKind, ExecutionContext};
pub use realm::{ErrorKind, Realm, Settings};
pub use reference::Reference;

/// Computation over the interpreter's state; failures carry thrown values
pub type Eval = Computation<ExecutionContext, Datum, JsValue>;

/// Engine context specialised to the interpreter
pub type Context = ComputeContext<ExecutionContext, Datum>;

/// What an evaluation step produces
#[derive(Debug, Clone)]
pub enum Datum {
    Value(JsValue),
    Reference(Reference),
    Completion(Completion),
    List(Vec<Datum>),
}

impl Datum {
    /// The plain value, if this datum is one
    pub fn into_value(self) -> Option<JsValue> {
        match self {
            Datum::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_completion(self) -> Option<Completion> {
        match self {
            Datum::Completion(completion) => Some(completion),
            _ => None,
        }
    }
}

impl From<JsValue> for Datum {
    fn from(value: JsValue) -> Self {
        Datum::Value(value)
    }
}

impl From<Reference> for Datum {
    fn from(reference: Reference) -> Self {
        Datum::Reference(reference)
    }
}

impl From<Completion> for Datum {
    fn from(completion: Completion) -> Self {
        Datum::Completion(completion)
    }
}

impl From<Vec<Datum>> for Datum {
    fn from(items: Vec<Datum>) -> Self {
        Datum::List(items)
    }
}

impl Decide for Datum {
    fn decide(&self) -> bool {
        match self {
            Datum::Value(value) => value.to_boolean(),
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

pub fn value(value: impl Into<JsValue>) -> Eval {
    succeed(Datum::Value(value.into()))
}

pub fn undefined() -> Eval {
    succeed(Datum::Value(JsValue::Undefined))
}

pub fn completion(completion: Completion) -> Eval {
    succeed(Datum::Completion(completion))
}

/// Raise a hosted exception
pub fn throw(value: JsValue) -> Eval {
    fail(value)
}

/// Raise a fresh error object of the given kind
pub fn throw_error(kind: ErrorKind, message: impl Into<String>) -> Eval {
    let message = message.into();
    defer(move |ctx: &mut Context| fail(ctx.user_data.realm.create_error(kind, &message)))
}

/// Turn an object-model rejection into the matching hosted error
pub fn reject(rejection: object::Rejection) -> Eval {
    match rejection {
        object::Rejection::Type(message) => throw_error(ErrorKind::TypeError, message),
        object::Rejection::Range(message) => throw_error(ErrorKind::RangeError, message),
    }
}

/// Continue `Ok` results with `f`, reject errors
pub fn or_reject<T>(result: Result<T, object::Rejection>, f: impl FnOnce(T) -> Eval) -> Eval {
    match result {
        Ok(value) => f(value),
        Err(rejection) => reject(rejection),
    }
}

/// Build the next step with the current realm
pub fn with_realm<F>(f: F) -> Eval
where
    F: FnOnce(&Rc<Realm>) -> Eval + 'static,
{
    defer(move |ctx: &mut Context| {
        let realm = Rc::clone(&ctx.user_data.realm);
        f(&realm)
    })
}

/// The engine or object model was handed structurally invalid input. This
/// is an implementation defect, not a hosted exception: it trips an assertion
/// in debug builds and degrades to a `TypeError` otherwise.
pub fn precondition_violation(what: &str) -> Eval {
    tracing::error!(what, "precondition violation");
    debug_assert!(false, "precondition violation: {what}");
    throw_error(ErrorKind::TypeError, format!("internal error: {what}"))
}

/// Chaining helpers for computations that yield a [`Datum`]
pub trait EvalExt {
    /// Resolve a reference result to its value (GetValue) and continue.
    fn and_value<F>(self, f: F) -> Eval
    where
        F: FnOnce(JsValue) -> Eval + 'static;

    /// Continue with the values of a `Datum::List` result.
    fn and_values<F>(self, f: F) -> Eval
    where
        F: FnOnce(Vec<JsValue>) -> Eval + 'static;

    /// Continue with a completion result.
    fn and_completion<F>(self, f: F) -> Eval
    where
        F: FnOnce(Completion) -> Eval + 'static;
}

impl EvalExt for Eval {
    fn and_value<F>(self, f: F) -> Eval
    where
        F: FnOnce(JsValue) -> Eval + 'static,
    {
        self.bind(move |datum| match datum {
            Datum::Value(value) => f(value),
            Datum::Reference(reference) => reference::get_value(reference).bind(move |resolved| {
                match resolved {
                    Datum::Value(value) => f(value),
                    _ => precondition_violation("reference resolved to a non-value"),
                }
            }),
            _ => precondition_violation("expected a value or reference"),
        })
    }

    fn and_values<F>(self, f: F) -> Eval
    where
        F: FnOnce(Vec<JsValue>) -> Eval + 'static,
    {
        self.bind(move |datum| match datum {
            Datum::List(items) => {
                let values: Option<Vec<JsValue>> = items.into_iter().map(Datum::into_value).collect();
                match values {
                    Some(values) => f(values),
                    None => precondition_violation("expected a list of values"),
                }
            }
            _ => precondition_violation("expected a list"),
        })
    }

    fn and_completion<F>(self, f: F) -> Eval
    where
        F: FnOnce(Completion) -> Eval + 'static,
    {
        self.bind(move |datum| match datum {
            Datum::Completion(c) => f(c),
            _ => precondition_violation("expected a completion"),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Running programs
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of a top-level program
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Normal(JsValue),
    Throw(JsValue),
}

/// Evaluate a parsed program in the global context of `realm`. Returns the
/// result and the final logical time, so a later run can keep the clock
/// monotonic.
pub fn execute(
    realm: &Rc<Realm>,
    program: &Program,
    clock: Rc<dyn TimeProvider>,
    clock_floor: f64,
) -> (EvalResult, f64) {
    let context = context::create_global_context(
        realm,
        realm.global_env.clone(),
        realm.global.clone(),
    );
    let strict = program.strict || realm.settings.strict;
    let context = ExecutionContext { strict, ..context };
    let mut ctx = ComputeContext::new(context, clock).with_clock_floor(clock_floor);

    tracing::debug!(statements = program.body.len(), strict, "program start");

    let body = program.body.clone();
    let declarations = Rc::clone(&program.declarations);
    let env = realm.global_env.clone();
    let computation = hoist::instantiate_declarations(env, declarations, CodeKind::Global, strict)
        .then(statement::statement_list(body));

    let result = match computation.run(&mut ctx) {
        Ok(Datum::Completion(c)) if c.kind == CompletionKind::Throw => {
            EvalResult::Throw(c.value_or_undefined())
        }
        Ok(Datum::Completion(c)) => EvalResult::Normal(c.value_or_undefined()),
        Ok(Datum::Value(value)) => EvalResult::Normal(value),
        Ok(_) => EvalResult::Normal(JsValue::Undefined),
        Err(thrown) => EvalResult::Throw(thrown),
    };

    tracing::debug!(
        outcome = if matches!(result, EvalResult::Throw(_)) { "throw" } else { "normal" },
        live_slots = ctx.live_slots(),
        "program finished"
    );
    (result, ctx.now())
}

//! Function objects and the call/construct protocol (ES5 13.2, 10.4.3, 10.6)

use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionLiteral;
use crate::compute::{defer, lazy};
use crate::error::JsError;
use crate::parser::Parser;
use crate::value::{
    Args, CallHook, CheapClone, ClassTag, ConstructHook, HostCall, InternalSlot, JsObjectRef,
    JsString, JsValue, ObjectValue, ParameterMap, PropertyDescriptor,
};

use super::context::{self, CodeKind};
use super::conversion::to_object;
use super::environment::EnvRef;
use super::{
    CompletionKind, Context, ErrorKind, Eval, EvalExt, Realm, hoist, object, or_reject, statement,
    throw, throw_error, undefined, value,
};

/// Code and captured scope of a function written in the hosted language
pub struct FunctionCode {
    pub literal: Rc<FunctionLiteral>,
    pub scope: EnvRef,
}

impl fmt::Debug for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.literal.id.as_ref().map_or("<anonymous>", |id| id.name.as_str());
        write!(f, "FunctionCode({name})")
    }
}

/// Result of `Function.prototype.bind`
pub struct BoundFunction {
    pub target: JsObjectRef,
    pub this: JsValue,
    pub args: Vec<JsValue>,
}

/// Accessor pair that throws on any access (strict `caller`/`arguments`)
pub(super) fn poison_pill(realm: &Realm) -> PropertyDescriptor {
    PropertyDescriptor::Accessor {
        get: JsValue::Object(realm.thrower.cheap_clone()),
        set: JsValue::Object(realm.thrower.cheap_clone()),
        enumerable: false,
        configurable: false,
    }
}

/// Create a function object for `literal` closing over `scope` (ES5 13.2)
pub fn make_function(realm: &Realm, literal: Rc<FunctionLiteral>, scope: EnvRef) -> JsObjectRef {
    let name = literal
        .id
        .as_ref()
        .map_or_else(|| JsString::from(""), |id| id.name.cheap_clone());
    let arity = literal.params.len();
    let strict = literal.strict;

    let mut func = ObjectValue::new(ClassTag::Function, Some(realm.function_prototype.cheap_clone()));
    func.insert("length", PropertyDescriptor::frozen(JsValue::Number(arity as f64)));
    func.insert("name", PropertyDescriptor::frozen(JsValue::String(name)));
    if strict {
        func.insert("caller", poison_pill(realm));
        func.insert("arguments", poison_pill(realm));
    }
    func.call = Some(CallHook::Language(Rc::new(FunctionCode { literal, scope })));
    func.construct = Some(ConstructHook::Ordinary);
    let func = JsObjectRef::new(func);

    let prototype = realm.new_object();
    prototype
        .borrow_mut()
        .insert("constructor", PropertyDescriptor::hidden(JsValue::Object(func.cheap_clone())));
    func.borrow_mut().insert(
        "prototype",
        PropertyDescriptor::data(JsValue::Object(prototype), true, false, false),
    );
    func
}

/// Function expression; a named one sees its own name as an immutable
/// binding in a scope of its own.
pub fn make_function_expression(realm: &Realm, literal: Rc<FunctionLiteral>, scope: EnvRef) -> JsObjectRef {
    let Some(name) = literal.id.as_ref().map(|id| id.name.cheap_clone()) else {
        return make_function(realm, literal, scope);
    };
    let own_scope = EnvRef::new_declarative(Some(scope));
    own_scope.create_immutable_binding(name.cheap_clone());
    let func = make_function(realm, literal, own_scope.cheap_clone());
    own_scope.initialize_immutable_binding(&name, JsValue::Object(func.cheap_clone()));
    func
}

// ═══════════════════════════════════════════════════════════════════════════════
// [[Call]]
// ═══════════════════════════════════════════════════════════════════════════════

pub(super) fn describe(v: &JsValue) -> String {
    match v {
        JsValue::String(s) => format!("\"{s}\""),
        JsValue::Object(obj) if obj.is_callable() => "function".to_string(),
        JsValue::Object(_) => "object".to_string(),
        other => other.to_string_primitive().to_string(),
    }
}

/// Invoke `callee` with `this` and `args`
pub fn call(callee: &JsValue, this: JsValue, args: Vec<JsValue>) -> Eval {
    let Some(obj) = callee.as_object() else {
        return throw_error(ErrorKind::TypeError, format!("{} is not a function", describe(callee)));
    };
    let hook = obj.borrow().call.clone();
    match hook {
        None => throw_error(ErrorKind::TypeError, format!("{} is not a function", describe(callee))),
        Some(CallHook::Native(func)) => {
            let callee = obj.cheap_clone();
            context::with_call_frame(lazy(move || {
                func(HostCall {
                    callee,
                    this,
                    args: Args::from(args),
                })
            }))
        }
        Some(CallHook::Language(code)) => {
            context::with_call_frame(call_language(obj.cheap_clone(), code, this, args))
        }
        Some(CallHook::Bound(bound)) => lazy(move || {
            let mut all = bound.args.clone();
            all.extend(args);
            call(&JsValue::Object(bound.target.cheap_clone()), bound.this.cheap_clone(), all)
        }),
    }
}

fn call_language(callee: JsObjectRef, code: Rc<FunctionCode>, this: JsValue, args: Vec<JsValue>) -> Eval {
    defer(move |ctx: &mut Context| {
        let depth = ctx.user_data.calls;
        let realm = Rc::clone(&ctx.user_data.realm);

        let literal = Rc::clone(&code.literal);
        let strict = literal.strict;
        let this_binding = if strict {
            this
        } else if this.is_nullish() {
            JsValue::Object(ctx.user_data.global.cheap_clone())
        } else {
            match to_object(&realm, &this) {
                Ok(obj) => JsValue::Object(obj),
                Err(rejection) => return super::reject(rejection),
            }
        };

        let env = EnvRef::new_declarative(Some(code.scope.cheap_clone()));
        instantiate_function(&realm, &env, &callee, &code, &args);

        let name = literal.id.as_ref().map(|id| id.name.cheap_clone());
        tracing::trace!(name = name.as_ref().map(JsString::as_str), depth, "call");

        let next = ctx.user_data.nested(CodeKind::Function, strict, env.cheap_clone(), env, this_binding);
        context::with_context(next, statement::statement_list(literal.body.clone())).and_completion(
            move |completion| {
                tracing::trace!(name = name.as_ref().map(JsString::as_str), kind = ?completion.kind, "return");
                match completion.kind {
                    CompletionKind::Return => value(completion.value_or_undefined()),
                    CompletionKind::Throw => throw(completion.value_or_undefined()),
                    _ => undefined(),
                }
            },
        )
    })
}

/// Declaration binding for function code (ES5 10.5): parameters, hoisted
/// functions, `arguments`, then `var` names.
fn instantiate_function(realm: &Realm, env: &EnvRef, callee: &JsObjectRef, code: &FunctionCode, args: &[JsValue]) {
    let literal = &code.literal;
    for (index, name) in literal.params.iter().enumerate() {
        let v = args.get(index).cloned().unwrap_or_default();
        env.declare(name.cheap_clone(), v);
    }
    for declaration in &literal.declarations.functions {
        if let Some(id) = &declaration.id {
            let func = make_function(realm, Rc::clone(declaration), env.cheap_clone());
            env.declare(id.name.cheap_clone(), JsValue::Object(func));
        }
    }
    if !env.has_binding("arguments") {
        let arguments = create_arguments_object(realm, callee, &literal.params, args, env, literal.strict);
        if literal.strict {
            let name = JsString::from("arguments");
            env.create_immutable_binding(name.cheap_clone());
            env.initialize_immutable_binding(&name, JsValue::Object(arguments));
        } else {
            env.declare(JsString::from("arguments"), JsValue::Object(arguments));
        }
    }
    for name in &literal.declarations.vars {
        if !env.has_binding(name) {
            env.declare(name.cheap_clone(), JsValue::Undefined);
        }
    }
}

/// Arguments object (ES5 10.6)
fn create_arguments_object(
    realm: &Realm,
    callee: &JsObjectRef,
    names: &[JsString],
    args: &[JsValue],
    env: &EnvRef,
    strict: bool,
) -> JsObjectRef {
    let mut obj = ObjectValue::new(ClassTag::Arguments, Some(realm.object_prototype.cheap_clone()));
    obj.insert("length", PropertyDescriptor::hidden(JsValue::Number(args.len() as f64)));
    for (index, v) in args.iter().enumerate() {
        obj.insert(index.to_string(), PropertyDescriptor::open(v.cheap_clone()));
    }

    if strict {
        obj.insert("caller", poison_pill(realm));
        obj.insert("callee", poison_pill(realm));
    } else {
        let mut mapped: Vec<Option<JsString>> = vec![None; args.len()];
        let mut seen: Vec<&JsString> = Vec::new();
        // a repeated parameter name aliases only its last position
        for index in (0..args.len().min(names.len())).rev() {
            if let (Some(name), Some(slot)) = (names.get(index), mapped.get_mut(index))
                && !seen.contains(&name)
            {
                seen.push(name);
                *slot = Some(name.cheap_clone());
            }
        }
        obj.internal = Some(InternalSlot::Arguments(ParameterMap {
            env: env.cheap_clone(),
            names: mapped,
        }));
        obj.insert(
            "callee",
            PropertyDescriptor::hidden(JsValue::Object(callee.cheap_clone())),
        );
    }
    JsObjectRef::new(obj)
}

// ═══════════════════════════════════════════════════════════════════════════════
// [[Construct]]
// ═══════════════════════════════════════════════════════════════════════════════

/// `new callee(...args)`
pub fn construct(callee: &JsValue, args: Vec<JsValue>) -> Eval {
    let hook = callee.as_object().and_then(|obj| obj.borrow().construct.clone());
    let Some(obj) = callee.as_object().filter(|_| hook.is_some()) else {
        return throw_error(ErrorKind::TypeError, format!("{} is not a constructor", describe(callee)));
    };
    match hook {
        Some(ConstructHook::Native(func)) => {
            let callee = obj.cheap_clone();
            context::with_call_frame(lazy(move || {
                func(HostCall {
                    callee,
                    this: JsValue::Undefined,
                    args: Args::from(args),
                })
            }))
        }
        Some(ConstructHook::Bound(bound)) => lazy(move || {
            let mut all = bound.args.clone();
            all.extend(args);
            construct(&JsValue::Object(bound.target.cheap_clone()), all)
        }),
        Some(ConstructHook::Ordinary) | None => construct_ordinary(obj.cheap_clone(), args),
    }
}

/// Allocate from the callee's `prototype`, call it with the fresh object as
/// `this`, and keep the result if it is an object (ES5 13.2.2)
fn construct_ordinary(callee: JsObjectRef, args: Vec<JsValue>) -> Eval {
    let receiver = JsValue::Object(callee.cheap_clone());
    object::get(&callee, "prototype", receiver.cheap_clone()).and_value(move |prototype| {
        super::with_realm(move |realm| {
            let prototype = match prototype {
                JsValue::Object(proto) => proto,
                _ => realm.object_prototype.cheap_clone(),
            };
            let fresh = JsObjectRef::new(ObjectValue::new(ClassTag::Object, Some(prototype)));
            call(&receiver, JsValue::Object(fresh.cheap_clone()), args).and_value(move |result| {
                if result.is_object() {
                    value(result)
                } else {
                    value(JsValue::Object(fresh))
                }
            })
        })
    })
}

/// [[HasInstance]] for `value instanceof callee` (ES5 15.3.5.3)
pub fn has_instance(callee: &JsObjectRef, candidate: JsValue) -> Eval {
    let mut callee = callee.cheap_clone();
    loop {
        let target = match &callee.borrow().call {
            Some(CallHook::Bound(bound)) => bound.target.cheap_clone(),
            _ => break,
        };
        callee = target;
    }
    let receiver = JsValue::Object(callee.cheap_clone());
    object::get(&callee, "prototype", receiver).and_value(move |prototype| {
        let JsValue::Object(prototype) = prototype else {
            return throw_error(
                ErrorKind::TypeError,
                "Function has non-object prototype in instanceof check",
            );
        };
        let JsValue::Object(candidate) = candidate else {
            return value(false);
        };
        let mut current = candidate.prototype();
        while let Some(proto) = current {
            if proto.ptr_eq(&prototype) {
                return value(true);
            }
            current = proto.prototype();
        }
        value(false)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// eval (ES5 15.1.2.1, 10.4.2)
// ═══════════════════════════════════════════════════════════════════════════════

/// Where eval code runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalScope {
    /// `eval(...)` called by that name from the running code
    Direct { caller_strict: bool },
    /// Any other call to the eval function
    Indirect,
}

fn syntax_message(error: JsError) -> String {
    match error {
        JsError::SyntaxError { message, .. } => message,
        other => other.to_string(),
    }
}

/// Evaluate `args[0]` as a program. A non-string argument is returned as is.
pub fn perform_eval(args: Vec<JsValue>, scope: EvalScope) -> Eval {
    let source = match args.into_iter().next() {
        Some(JsValue::String(source)) => source,
        Some(other) => return value(other),
        None => return undefined(),
    };
    defer(move |ctx: &mut Context| {
        let realm = Rc::clone(&ctx.user_data.realm);
        let caller_strict = match scope {
            EvalScope::Direct { caller_strict } => caller_strict,
            EvalScope::Indirect => false,
        };
        let parsed = {
            let mut strings = realm.strings.borrow_mut();
            Parser::new(source.as_str(), &mut strings)
                .strict(caller_strict)
                .parse_program()
        };
        let program = match parsed {
            Ok(program) => program,
            Err(error) => return throw_error(ErrorKind::SyntaxError, syntax_message(error)),
        };
        let strict = program.strict || caller_strict;

        let running = &ctx.user_data;
        let (lexical, variable, this_binding) = match scope {
            EvalScope::Direct { .. } => (
                running.lexical_env.cheap_clone(),
                running.variable_env.cheap_clone(),
                running.this_binding.cheap_clone(),
            ),
            EvalScope::Indirect => (
                realm.global_env.cheap_clone(),
                realm.global_env.cheap_clone(),
                JsValue::Object(running.global.cheap_clone()),
            ),
        };
        let (lexical, variable) = if strict {
            let own = EnvRef::new_declarative(Some(lexical));
            (own.cheap_clone(), own)
        } else {
            (lexical, variable)
        };
        tracing::trace!(?scope, strict, "eval");

        let next = running.nested(CodeKind::Eval, strict, lexical, variable.cheap_clone(), this_binding);
        let body = hoist::instantiate_declarations(variable, Rc::clone(&program.declarations), CodeKind::Eval, strict)
            .then(statement::statement_list(program.body.clone()));
        context::with_context(next, body).and_completion(|completion| match completion.kind {
            CompletionKind::Throw => throw(completion.value_or_undefined()),
            _ => value(completion.value_or_undefined()),
        })
    })
}

/// ToObject on a call's `this`, rejected for `undefined`/`null`
pub fn this_object(realm: &Realm, this: &JsValue, f: impl FnOnce(JsObjectRef) -> Eval) -> Eval {
    or_reject(to_object(realm, this), f)
}

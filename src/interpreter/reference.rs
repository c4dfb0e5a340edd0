//! References (ES5 8.7)
//!
//! A reference names a place a value can be read from or written to. Member
//! and identifier expressions evaluate to references; `GetValue`/`PutValue`
//! resolve them.

use crate::compute::{SlotKey, defer, effect};
use crate::value::{CheapClone, JsString, JsValue, PropertyDescriptor};

use super::conversion::to_object;
use super::environment::{self, EnvRef};
use super::{
    Context, Datum, ErrorKind, Eval, function, object, or_reject, precondition_violation,
    throw_error, undefined, value, with_realm,
};

#[derive(Debug, Clone)]
pub enum Reference {
    /// Identifier binding; `env` is `None` for an unresolved name
    Environment {
        name: JsString,
        env: Option<EnvRef>,
        strict: bool,
    },
    /// Property of an object or of a primitive's wrapper
    Property {
        base: JsValue,
        key: JsString,
        strict: bool,
    },
    /// Evaluator-private slot in the engine's value store
    Internal { slot: SlotKey },
}

impl Reference {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Reference::Environment { env: None, .. })
    }

    pub fn name(&self) -> Option<&JsString> {
        match self {
            Reference::Environment { name, .. } => Some(name),
            Reference::Property { key, .. } => Some(key),
            Reference::Internal { .. } => None,
        }
    }
}

/// GetValue
pub fn get_value(reference: Reference) -> Eval {
    match reference {
        Reference::Environment { name, env: None, .. } => {
            throw_error(ErrorKind::ReferenceError, format!("{name} is not defined"))
        }
        Reference::Environment {
            name,
            env: Some(env),
            strict,
        } => environment::get_binding_value(&env, name, strict),
        Reference::Property { base, key, .. } => {
            if let JsValue::Object(obj) = &base {
                return object::get(obj, &key, base.cheap_clone());
            }
            with_realm(move |realm| {
                or_reject(to_object(realm, &base), |wrapper| object::get(&wrapper, &key, base))
            })
        }
        Reference::Internal { slot } => defer(move |ctx: &mut Context| match ctx.slot(slot) {
            Some(Datum::Value(v)) => value(v.cheap_clone()),
            _ => precondition_violation("read of an empty internal slot"),
        }),
    }
}

/// PutValue. Writing through anything but a reference is an early error in
/// ES5; it is reported as a `ReferenceError` here.
pub fn put_value(target: Datum, new_value: JsValue) -> Eval {
    match target {
        Datum::Reference(reference) => put_reference(reference, new_value),
        _ => throw_error(ErrorKind::ReferenceError, "Invalid left-hand side in assignment"),
    }
}

pub fn put_reference(reference: Reference, new_value: JsValue) -> Eval {
    match reference {
        Reference::Environment {
            name,
            env: None,
            strict,
        } => {
            if strict {
                return throw_error(ErrorKind::ReferenceError, format!("{name} is not defined"));
            }
            defer(move |ctx: &mut Context| {
                let global = ctx.user_data.global.cheap_clone();
                object::put(&global, name, new_value, false)
            })
        }
        Reference::Environment {
            name,
            env: Some(env),
            strict,
        } => environment::set_mutable_binding(&env, name, new_value, strict),
        Reference::Property { base, key, strict } => {
            if let JsValue::Object(obj) = &base {
                return object::put(obj, key, new_value, strict);
            }
            put_on_primitive(base, key, new_value, strict)
        }
        Reference::Internal { slot } => effect(move |ctx: &mut Context| {
            ctx.set_slot(slot, Datum::Value(new_value));
            Ok(Datum::Value(JsValue::Undefined))
        }),
    }
}

/// [[Put]] with a primitive base (ES5 8.7.2): only an inherited setter can
/// observe the write; anything else is dropped, or a TypeError in strict code.
fn put_on_primitive(base: JsValue, key: JsString, new_value: JsValue, strict: bool) -> Eval {
    with_realm(move |realm| {
        or_reject(to_object(realm, &base), move |wrapper| {
            let type_name = base.type_of();
            if !object::can_put(&wrapper, &key) {
                return refuse_write(strict, "assign to read only", &key, type_name);
            }
            if let Some(PropertyDescriptor::Data { .. }) = object::own_descriptor(&wrapper, &key) {
                return refuse_write(strict, "assign to", &key, type_name);
            }
            match object::get_property(&wrapper, &key) {
                Some(PropertyDescriptor::Accessor { set, .. }) if !set.is_undefined() => {
                    function::call(&set, base, vec![new_value]).then(undefined())
                }
                _ => refuse_write(strict, "create", &key, type_name),
            }
        })
    })
}

fn refuse_write(strict: bool, what: &str, key: &JsString, type_name: &str) -> Eval {
    if strict {
        throw_error(
            ErrorKind::TypeError,
            format!("Cannot {what} property '{key}' on {type_name}"),
        )
    } else {
        undefined()
    }
}

/// The `delete` operator applied to a reference
pub fn delete_reference(reference: Reference) -> Eval {
    match reference {
        Reference::Environment {
            name,
            env: None,
            strict,
        } => {
            if strict {
                throw_error(
                    ErrorKind::SyntaxError,
                    format!("Delete of an unqualified identifier '{name}' in strict mode"),
                )
            } else {
                value(true)
            }
        }
        Reference::Environment {
            name,
            env: Some(env),
            ..
        } => environment::delete_binding(&env, &name),
        Reference::Property { base, key, strict } => with_realm(move |realm| {
            or_reject(to_object(realm, &base), |obj| {
                or_reject(object::delete(&obj, &key, strict), |deleted| value(deleted))
            })
        }),
        Reference::Internal { .. } => value(true),
    }
}

/// `this` for a call through `reference`
pub fn implicit_this(reference: &Reference) -> JsValue {
    match reference {
        Reference::Property { base, .. } => base.cheap_clone(),
        Reference::Environment { env: Some(env), .. } => env.implicit_this(),
        _ => JsValue::Undefined,
    }
}

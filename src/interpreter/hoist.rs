//! Declaration binding instantiation for global and eval code (ES5 10.5)
//!
//! Function declarations are created and bound before any statement of the
//! program runs; `var` names are bound to `undefined` unless a binding of
//! that name already exists. Function code does the same for its fresh
//! declarative frame in [`super::function`].

use std::rc::Rc;

use crate::ast::Declarations;
use crate::compute::{lazy, sequence};
use crate::value::{CheapClone, JsValue, PropertyDescriptor};

use super::context::CodeKind;
use super::environment::{self, EnvRef};
use super::{Datum, ErrorKind, Eval, function, object, reject, throw_error, undefined, with_realm};

pub fn instantiate_declarations(env: EnvRef, declarations: Rc<Declarations>, kind: CodeKind, strict: bool) -> Eval {
    let deletable = kind == CodeKind::Eval;
    let mut steps: Vec<Eval> = Vec::with_capacity(declarations.functions.len() + declarations.vars.len());

    for literal in &declarations.functions {
        let literal = Rc::clone(literal);
        let env = env.cheap_clone();
        steps.push(with_realm(move |realm| {
            let Some(name) = literal.id.as_ref().map(|id| id.name.cheap_clone()) else {
                return undefined();
            };
            if !env.has_binding(&name) {
                if let Err(rejection) = env.create_mutable_binding(name.cheap_clone(), deletable) {
                    return reject(rejection);
                }
            } else if kind == CodeKind::Global
                && let Some(global) = env.binding_object()
                && let Some(existing) = object::own_descriptor(&global, &name)
                && !existing.configurable()
                && !matches!(existing, PropertyDescriptor::Data { writable: true, enumerable: true, .. })
            {
                return throw_error(
                    ErrorKind::TypeError,
                    format!("Cannot redefine global function '{name}'"),
                );
            }
            let func = function::make_function(realm, Rc::clone(&literal), env.cheap_clone());
            environment::set_mutable_binding(&env, name, JsValue::Object(func), strict)
        }));
    }

    for name in &declarations.vars {
        let name = name.cheap_clone();
        let env = env.cheap_clone();
        steps.push(lazy(move || {
            if env.has_binding(&name) {
                return undefined();
            }
            if let Err(rejection) = env.create_mutable_binding(name.cheap_clone(), deletable) {
                return reject(rejection);
            }
            environment::set_mutable_binding(&env, name, JsValue::Undefined, strict)
        }));
    }

    tracing::trace!(
        functions = declarations.functions.len(),
        vars = declarations.vars.len(),
        ?kind,
        "instantiate declarations"
    );
    sequence(steps, Datum::Value(JsValue::Undefined))
}

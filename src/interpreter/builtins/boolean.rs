//! `Boolean` constructor and prototype (ES5 15.6)

use std::rc::Rc;

use crate::value::{CheapClone, ClassTag, HostCall, JsValue};

use crate::interpreter::realm::ConstructorDef;
use crate::interpreter::{ErrorKind, Eval, Realm, throw_error, value, with_realm};

use super::{boxed, this_primitive};

pub fn install(realm: &Rc<Realm>) {
    let proto = realm.boolean_prototype.cheap_clone();
    realm.register_constructor(
        &realm.global,
        ConstructorDef {
            name: "Boolean",
            arity: 1,
            prototype: proto.cheap_clone(),
            statics: &[],
            call: boolean_call,
            construct: Some(boolean_construct),
        },
    );
    realm.register_function(&proto, "toString", 0, boolean_to_string);
    realm.register_function(&proto, "valueOf", 0, boolean_value_of);
}

/// `Boolean(value)` converts
fn boolean_call(call: HostCall) -> Eval {
    value(call.args.get(0).to_boolean())
}

/// `new Boolean(value)` boxes
fn boolean_construct(call: HostCall) -> Eval {
    let primitive = JsValue::Boolean(call.args.get(0).to_boolean());
    with_realm(move |realm| {
        value(boxed(&realm.boolean_prototype, ClassTag::Boolean, primitive))
    })
}

fn this_boolean(this: &JsValue, method: &str) -> Result<bool, Eval> {
    match this_primitive(this, ClassTag::Boolean) {
        Some(JsValue::Boolean(b)) => Ok(b),
        _ => Err(throw_error(
            ErrorKind::TypeError,
            format!("Boolean.prototype.{method} requires that 'this' be a Boolean"),
        )),
    }
}

fn boolean_to_string(call: HostCall) -> Eval {
    match this_boolean(&call.this, "toString") {
        Ok(b) => value(if b { "true" } else { "false" }),
        Err(error) => error,
    }
}

fn boolean_value_of(call: HostCall) -> Eval {
    match this_boolean(&call.this, "valueOf") {
        Ok(b) => value(b),
        Err(error) => error,
    }
}

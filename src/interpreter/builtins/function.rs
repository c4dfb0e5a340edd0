//! `Function` constructor and `Function.prototype` (call, apply, bind, toString)

use std::cell::RefCell;
use std::rc::Rc;

use crate::compute::lazy;
use crate::value::{
    CallHook, CheapClone, ClassTag, ConstructHook, HostCall, JsObjectRef, JsValue, ObjectValue,
    PropertyDescriptor,
};

use crate::interpreter::function::{self, BoundFunction, poison_pill};
use crate::interpreter::realm::ConstructorDef;
use crate::interpreter::{ErrorKind, Eval, EvalExt, Realm, object, throw_error, undefined, value, with_realm};

use super::{for_range, index_key, with_length};

pub fn install(realm: &Rc<Realm>) {
    let proto = &realm.function_prototype;
    {
        let mut fp = proto.borrow_mut();
        fp.call = Some(CallHook::Native(empty_function));
        fp.insert("length", PropertyDescriptor::frozen(JsValue::Number(0.0)));
        fp.insert("name", PropertyDescriptor::frozen(JsValue::from("")));
    }
    realm.register_constructor(
        &realm.global,
        ConstructorDef {
            name: "Function",
            arity: 1,
            prototype: proto.cheap_clone(),
            statics: &[],
            call: unsupported_constructor,
            construct: Some(unsupported_constructor),
        },
    );
    realm.register_function(proto, "call", 1, function_call);
    realm.register_function(proto, "apply", 2, function_apply);
    realm.register_function(proto, "bind", 1, function_bind);
    realm.register_function(proto, "toString", 0, function_to_string);
}

/// `Function.prototype` itself accepts any arguments and returns undefined
fn empty_function(_call: HostCall) -> Eval {
    undefined()
}

fn unsupported_constructor(_call: HostCall) -> Eval {
    throw_error(
        ErrorKind::TypeError,
        "Function constructor is not supported: code cannot be compiled at runtime",
    )
}

fn require_callable(this: &JsValue, method: &str) -> Option<Eval> {
    if this.is_callable() {
        None
    } else {
        Some(throw_error(
            ErrorKind::TypeError,
            format!("Function.prototype.{method} called on a non-function"),
        ))
    }
}

fn function_call(call: HostCall) -> Eval {
    if let Some(error) = require_callable(&call.this, "call") {
        return error;
    }
    let this_arg = call.args.get(0);
    let rest = call.args.rest(1);
    function::call(&call.this, this_arg, rest)
}

fn function_apply(call: HostCall) -> Eval {
    if let Some(error) = require_callable(&call.this, "apply") {
        return error;
    }
    let target = call.this;
    let this_arg = call.args.get(0);
    let list = match call.args.get(1) {
        JsValue::Undefined | JsValue::Null => return function::call(&target, this_arg, Vec::new()),
        JsValue::Object(list) => list,
        _ => {
            return throw_error(
                ErrorKind::TypeError,
                "Function.prototype.apply: argument list has wrong type",
            );
        }
    };
    let source = list.cheap_clone();
    with_length(&source, move |len| {
        let collected: Rc<RefCell<Vec<JsValue>>> = Rc::default();
        let sink = Rc::clone(&collected);
        let reads = for_range(
            0,
            len,
            Rc::new(move |i| {
                let sink = Rc::clone(&sink);
                object::get(&list, &index_key(i), JsValue::Object(list.cheap_clone())).and_value(
                    move |v| {
                        sink.borrow_mut().push(v);
                        undefined()
                    },
                )
            }),
        );
        reads.then(lazy(move || function::call(&target, this_arg, collected.take())))
    })
}

fn function_bind(call: HostCall) -> Eval {
    let JsValue::Object(target) = call.this.cheap_clone() else {
        return throw_error(ErrorKind::TypeError, "Bind must be called on a function");
    };
    if !target.is_callable() {
        return throw_error(ErrorKind::TypeError, "Bind must be called on a function");
    }
    let bound_this = call.args.get(0);
    let bound_args = call.args.rest(1);
    with_realm(move |realm| value(make_bound_function(realm, target, bound_this, bound_args)))
}

/// Bound function exotic object (ES5 15.3.4.5)
fn make_bound_function(realm: &Realm, target: JsObjectRef, this: JsValue, args: Vec<JsValue>) -> JsObjectRef {
    let target_len = match object::own_descriptor(&target, "length").and_then(|d| d.value().cloned()) {
        Some(JsValue::Number(n)) if target.class() == ClassTag::Function => n,
        _ => 0.0,
    };
    let length = (target_len - args.len() as f64).max(0.0);
    let name = match object::own_descriptor(&target, "name").and_then(|d| d.value().cloned()) {
        Some(JsValue::String(name)) => format!("bound {name}"),
        _ => "bound ".to_string(),
    };
    let constructible = target.is_constructor();
    let bound = Rc::new(BoundFunction { target, this, args });

    let mut func = ObjectValue::new(ClassTag::Function, Some(realm.function_prototype.cheap_clone()));
    func.insert("length", PropertyDescriptor::frozen(JsValue::Number(length)));
    func.insert("name", PropertyDescriptor::frozen(JsValue::from(name)));
    func.insert("caller", poison_pill(realm));
    func.insert("arguments", poison_pill(realm));
    func.call = Some(CallHook::Bound(Rc::clone(&bound)));
    if constructible {
        func.construct = Some(ConstructHook::Bound(bound));
    }
    JsObjectRef::new(func)
}

fn function_to_string(call: HostCall) -> Eval {
    let JsValue::Object(func) = &call.this else {
        return throw_error(
            ErrorKind::TypeError,
            "Function.prototype.toString requires that 'this' be a Function",
        );
    };
    let hook = func.borrow().call.clone();
    let name = match object::own_descriptor(func, "name").and_then(|d| d.value().cloned()) {
        Some(JsValue::String(name)) => name.to_string(),
        _ => String::new(),
    };
    match hook {
        Some(CallHook::Language(code)) => value(code.literal.source.as_ref()),
        Some(CallHook::Native(_)) => value(format!("function {name}() {{ [native code] }}")),
        Some(CallHook::Bound(_)) => value("function () { [native code] }"),
        None => throw_error(
            ErrorKind::TypeError,
            "Function.prototype.toString requires that 'this' be a Function",
        ),
    }
}

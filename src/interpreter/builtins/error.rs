//! `Error` and the native error constructors (ES5 15.11)

use std::rc::Rc;

use crate::value::{CheapClone, HostCall, JsValue, PropertyDescriptor};

use crate::interpreter::conversion::with_string;
use crate::interpreter::realm::{ConstructorDef, ErrorKind};
use crate::interpreter::{Eval, EvalExt, Realm, object, throw_error, value, with_realm};

pub fn install(realm: &Rc<Realm>) {
    for kind in ErrorKind::ALL {
        let prototype = realm.error_prototypes.get(kind).cheap_clone();
        {
            let mut proto = prototype.borrow_mut();
            proto.insert("name", PropertyDescriptor::hidden(JsValue::from(kind.name())));
            proto.insert("message", PropertyDescriptor::hidden(JsValue::from("")));
        }
        let hook = constructor_for(kind);
        realm.register_constructor(
            &realm.global,
            ConstructorDef {
                name: kind.name(),
                arity: 1,
                prototype,
                statics: &[],
                call: hook,
                construct: Some(hook),
            },
        );
    }
    realm.register_function(
        realm.error_prototypes.get(ErrorKind::Error),
        "toString",
        0,
        error_to_string,
    );
}

fn constructor_for(kind: ErrorKind) -> fn(HostCall) -> Eval {
    match kind {
        ErrorKind::Error => error,
        ErrorKind::TypeError => type_error,
        ErrorKind::RangeError => range_error,
        ErrorKind::ReferenceError => reference_error,
        ErrorKind::SyntaxError => syntax_error,
        ErrorKind::EvalError => eval_error,
        ErrorKind::URIError => uri_error,
    }
}

/// Calling and constructing an error constructor both create a new error
/// (ES5 15.11.1, 15.11.2)
fn create(kind: ErrorKind, call: HostCall) -> Eval {
    let message = call.args.get(0);
    with_realm(move |realm| {
        let error = realm.create_error(kind, "");
        if message.is_undefined() {
            return value(error);
        }
        with_string(message, move |message| {
            if let JsValue::Object(obj) = &error {
                obj.borrow_mut()
                    .insert("message", PropertyDescriptor::hidden(JsValue::String(message)));
            }
            value(error)
        })
    })
}

fn error(call: HostCall) -> Eval {
    create(ErrorKind::Error, call)
}

fn type_error(call: HostCall) -> Eval {
    create(ErrorKind::TypeError, call)
}

fn range_error(call: HostCall) -> Eval {
    create(ErrorKind::RangeError, call)
}

fn reference_error(call: HostCall) -> Eval {
    create(ErrorKind::ReferenceError, call)
}

fn syntax_error(call: HostCall) -> Eval {
    create(ErrorKind::SyntaxError, call)
}

fn eval_error(call: HostCall) -> Eval {
    create(ErrorKind::EvalError, call)
}

fn uri_error(call: HostCall) -> Eval {
    create(ErrorKind::URIError, call)
}

/// `Error.prototype.toString` (ES5 15.11.4.4)
fn error_to_string(call: HostCall) -> Eval {
    let JsValue::Object(obj) = call.this.cheap_clone() else {
        return throw_error(
            ErrorKind::TypeError,
            "Error.prototype.toString called on non-object",
        );
    };
    let receiver = call.this;
    let source = obj.cheap_clone();
    object::get(&obj, "name", receiver.cheap_clone()).and_value(move |name| {
        let name = if name.is_undefined() { JsValue::from("Error") } else { name };
        with_string(name, move |name| {
            object::get(&source, "message", receiver).and_value(move |message| {
                let message = if message.is_undefined() { JsValue::from("") } else { message };
                with_string(message, move |message| {
                    let text = match (name.as_str(), message.as_str()) {
                        ("", message) => message.to_string(),
                        (name, "") => name.to_string(),
                        (name, message) => format!("{name}: {message}"),
                    };
                    value(text)
                })
            })
        })
    })
}

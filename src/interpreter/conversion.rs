//! Type conversions that may run user code (ES5 9.1, 9.3, 9.8, 9.9)
//!
//! Primitives convert synchronously through the helpers on [`JsValue`];
//! objects go through ToPrimitive, which calls `valueOf`/`toString`, so the
//! conversions here take a continuation.

use crate::value::{CheapClone, ClassTag, JsObjectRef, JsString, JsValue, ObjectValue};

use super::object::{self, Rejection};
use super::{ErrorKind, Eval, EvalExt, Realm, function, or_reject, throw_error, value, with_realm};

/// Preferred type for ToPrimitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Default,
    Number,
    String,
}

/// ToPrimitive (ES5 9.1 / 8.12.8)
pub fn to_primitive(v: JsValue, hint: Hint) -> Eval {
    let obj = match v {
        JsValue::Object(obj) => obj,
        primitive => return value(primitive),
    };
    let hint = match hint {
        Hint::Default if obj.class() == ClassTag::Date => Hint::String,
        Hint::Default => Hint::Number,
        other => other,
    };
    let order = if hint == Hint::String {
        ["toString", "valueOf"]
    } else {
        ["valueOf", "toString"]
    };
    let [first, second] = order;
    try_method(obj.cheap_clone(), first, move || {
        try_method(obj, second, || {
            throw_error(ErrorKind::TypeError, "Cannot convert object to primitive value")
        })
    })
}

/// Call `obj[name]()` and keep a primitive result, else continue with `otherwise`
fn try_method<F>(obj: JsObjectRef, name: &'static str, otherwise: F) -> Eval
where
    F: FnOnce() -> Eval + 'static,
{
    let receiver = JsValue::Object(obj.cheap_clone());
    object::get(&obj, name, receiver.cheap_clone()).and_value(move |method| {
        if !method.is_callable() {
            return otherwise();
        }
        function::call(&method, receiver, Vec::new()).and_value(move |result| {
            if result.is_object() {
                otherwise()
            } else {
                value(result)
            }
        })
    })
}

pub fn with_primitive<F>(v: JsValue, hint: Hint, f: F) -> Eval
where
    F: FnOnce(JsValue) -> Eval + 'static,
{
    if v.is_object() {
        to_primitive(v, hint).and_value(f)
    } else {
        f(v)
    }
}

/// ToNumber
pub fn with_number<F>(v: JsValue, f: F) -> Eval
where
    F: FnOnce(f64) -> Eval + 'static,
{
    with_primitive(v, Hint::Number, move |p| f(p.to_number_primitive()))
}

/// ToString
pub fn with_string<F>(v: JsValue, f: F) -> Eval
where
    F: FnOnce(JsString) -> Eval + 'static,
{
    with_primitive(v, Hint::String, move |p| f(p.to_string_primitive()))
}

/// ToObject; fails for `undefined` and `null`
pub fn to_object(realm: &Realm, v: &JsValue) -> Result<JsObjectRef, Rejection> {
    let (class, proto) = match v {
        JsValue::Object(obj) => return Ok(obj.cheap_clone()),
        JsValue::Undefined | JsValue::Null => {
            return Err(Rejection::Type(format!(
                "Cannot convert {} to object",
                v.to_string_primitive()
            )));
        }
        JsValue::Boolean(_) => (ClassTag::Boolean, &realm.boolean_prototype),
        JsValue::Number(_) => (ClassTag::Number, &realm.number_prototype),
        JsValue::String(_) => (ClassTag::String, &realm.string_prototype),
    };
    Ok(JsObjectRef::new(
        ObjectValue::new(class, Some(proto.cheap_clone())).with_primitive(v.cheap_clone()),
    ))
}

pub fn with_object<F>(v: JsValue, f: F) -> Eval
where
    F: FnOnce(JsObjectRef) -> Eval + 'static,
{
    match v {
        JsValue::Object(obj) => f(obj),
        primitive => with_realm(move |realm| or_reject(to_object(realm, &primitive), f)),
    }
}

/// CheckObjectCoercible
pub fn check_object_coercible(v: &JsValue, what: &str) -> Result<(), Rejection> {
    if v.is_nullish() {
        Err(Rejection::Type(format!(
            "{what} called on {}",
            v.to_string_primitive()
        )))
    } else {
        Ok(())
    }
}

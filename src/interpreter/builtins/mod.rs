//! Builtin library
//!
//! Each submodule installs one family of intrinsics on the realm through
//! [`Realm::register_constructor`] and [`Realm::register_function`]. Native
//! functions are plain `fn(HostCall) -> Eval`, so a builtin that calls back
//! into hosted code (a `toString`, a callback) stays on the trampoline.

pub mod array;
pub mod boolean;
pub mod console;
pub mod date;
pub mod error;
pub mod function;
pub mod global;
pub mod math;
pub mod number;
pub mod object;
pub mod string;

use std::rc::Rc;

use crate::compute::{enumeration, lazy};
use crate::value::{CheapClone, ClassTag, JsObjectRef, JsString, JsValue, ObjectValue, to_uint32};

use super::conversion::{with_number, with_string};
use super::{Eval, EvalExt, Realm, object as objects, undefined, value};

/// Install every builtin on `realm`
pub fn install(realm: &Rc<Realm>) {
    function::install(realm);
    object::install(realm);
    global::install(realm);
    array::install(realm);
    error::install(realm);
    boolean::install(realm);
    number::install(realm);
    string::install(realm);
    date::install(realm);
    math::install(realm);
    console::install(realm);
    tracing::debug!(
        globals = realm.global.borrow().properties.len(),
        "builtins installed"
    );
}

/// ToNumber of every value, left to right
pub(crate) fn numbers(values: Vec<JsValue>) -> Eval {
    enumeration(
        values
            .into_iter()
            .map(|v| with_number(v, |n| value(n)))
            .collect(),
    )
}

/// ToString of every value, left to right
pub(crate) fn strings(values: Vec<JsValue>) -> Eval {
    enumeration(
        values
            .into_iter()
            .map(|v| with_string(v, |s| value(s)))
            .collect(),
    )
}

/// Run `step(i)` for each `i` in `from..to`, ascending. Each step is built
/// only once the previous one has finished.
pub(crate) fn for_range(from: u32, to: u32, step: Rc<dyn Fn(u32) -> Eval>) -> Eval {
    if from >= to {
        return undefined();
    }
    lazy(move || step(from).then(lazy(move || for_range(from + 1, to, step))))
}

/// Run `step(i)` for each `i` in `from..to`, descending
pub(crate) fn for_range_rev(from: u32, to: u32, step: Rc<dyn Fn(u32) -> Eval>) -> Eval {
    if from >= to {
        return undefined();
    }
    lazy(move || step(to - 1).then(lazy(move || for_range_rev(from, to - 1, step))))
}

/// `ToUint32(obj.length)`
pub(crate) fn with_length<F>(obj: &JsObjectRef, f: F) -> Eval
where
    F: FnOnce(u32) -> Eval + 'static,
{
    let obj = obj.cheap_clone();
    lazy(move || objects::get(&obj, "length", JsValue::Object(obj.cheap_clone())))
        .and_value(move |len| with_number(len, move |n| f(to_uint32(n))))
}

/// Property key for an array index
pub(crate) fn index_key(index: u32) -> JsString {
    JsString::from(index.to_string())
}

/// Resolve a relative index argument (negative counts from `len`) into `0..=len`
pub(crate) fn relative_index(n: f64, len: u32) -> u32 {
    let len_f = f64::from(len);
    let resolved = if n < 0.0 { (len_f + n).max(0.0) } else { n.min(len_f) };
    // Clamped into 0..=len above
    resolved as u32
}

/// The wrapped primitive of `this`: the value itself, or the internal slot of
/// a wrapper object of `class`
pub(crate) fn this_primitive(this: &JsValue, class: ClassTag) -> Option<JsValue> {
    match this {
        JsValue::Object(obj) if obj.class() == class => obj.borrow().primitive_value().cloned(),
        JsValue::Object(_) => None,
        JsValue::Boolean(_) if class == ClassTag::Boolean => Some(this.cheap_clone()),
        JsValue::Number(_) if class == ClassTag::Number => Some(this.cheap_clone()),
        JsValue::String(_) if class == ClassTag::String => Some(this.cheap_clone()),
        _ => None,
    }
}

/// Wrapper object of `class` holding `primitive` in its internal slot
pub(crate) fn boxed(prototype: &JsObjectRef, class: ClassTag, primitive: JsValue) -> JsObjectRef {
    JsObjectRef::new(ObjectValue::new(class, Some(prototype.cheap_clone())).with_primitive(primitive))
}

//! `String` constructor and prototype (ES5 15.5)
//!
//! Positions and lengths count UTF-16 code units. Indexed access and
//! `length` on String objects are virtual properties of the object model.

use std::rc::Rc;

use crate::value::{CheapClone, ClassTag, HostCall, JsString, JsValue, is_js_whitespace, to_integer, to_uint32};

use crate::interpreter::conversion::{check_object_coercible, with_number, with_string};
use crate::interpreter::realm::ConstructorDef;
use crate::interpreter::{ErrorKind, Eval, EvalExt, Realm, or_reject, throw_error, value, with_realm};

use super::{boxed, numbers, strings, this_primitive};

const METHODS: &[(&str, fn(HostCall) -> Eval, u32)] = &[
    ("toString", string_to_string, 0),
    ("valueOf", string_value_of, 0),
    ("charAt", string_char_at, 1),
    ("charCodeAt", string_char_code_at, 1),
    ("concat", string_concat, 1),
    ("indexOf", string_index_of, 1),
    ("lastIndexOf", string_last_index_of, 1),
    ("slice", string_slice, 2),
    ("substring", string_substring, 2),
    ("toLowerCase", string_to_lower_case, 0),
    ("toUpperCase", string_to_upper_case, 0),
    ("trim", string_trim, 0),
];

pub fn install(realm: &Rc<Realm>) {
    let proto = realm.string_prototype.cheap_clone();
    realm.register_constructor(
        &realm.global,
        ConstructorDef {
            name: "String",
            arity: 1,
            prototype: proto.cheap_clone(),
            statics: &[("fromCharCode", string_from_char_code, 1)],
            call: string_call,
            construct: Some(string_construct),
        },
    );
    for (name, hook, arity) in METHODS {
        realm.register_function(&proto, name, *arity, *hook);
    }
}

fn argument_string(call: &HostCall, k: impl FnOnce(JsString) -> Eval + 'static) -> Eval {
    if call.args.is_empty() {
        k(JsString::from(""))
    } else {
        with_string(call.args.get(0), k)
    }
}

fn string_call(call: HostCall) -> Eval {
    argument_string(&call, |s| value(s))
}

fn string_construct(call: HostCall) -> Eval {
    argument_string(&call, |s| {
        with_realm(move |realm| {
            value(boxed(&realm.string_prototype, ClassTag::String, JsValue::String(s)))
        })
    })
}

/// `String.fromCharCode(...codes)` (ES5 15.5.3.2)
fn string_from_char_code(call: HostCall) -> Eval {
    numbers(call.args.into_vec()).and_values(|codes| {
        let units: Vec<u16> = codes
            .iter()
            .map(|code| match code {
                // ToUint16
                JsValue::Number(n) => (to_uint32(*n) & 0xFFFF) as u16,
                _ => 0,
            })
            .collect();
        value(String::from_utf16_lossy(&units))
    })
}

fn this_string_value(this: &JsValue, method: &str) -> Eval {
    match this_primitive(this, ClassTag::String) {
        Some(s @ JsValue::String(_)) => value(s),
        _ => throw_error(
            ErrorKind::TypeError,
            format!("String.prototype.{method} requires that 'this' be a String"),
        ),
    }
}

fn string_to_string(call: HostCall) -> Eval {
    this_string_value(&call.this, "toString")
}

fn string_value_of(call: HostCall) -> Eval {
    this_string_value(&call.this, "valueOf")
}

/// CheckObjectCoercible(this), then ToString(this)
fn with_this_string<F>(call: &HostCall, method: &str, k: F) -> Eval
where
    F: FnOnce(Vec<u16>) -> Eval + 'static,
{
    let this = call.this.cheap_clone();
    let what = format!("String.prototype.{method}");
    or_reject(check_object_coercible(&this, &what), move |()| {
        with_string(this, move |s| k(s.as_str().encode_utf16().collect()))
    })
}

/// ToInteger of an optional argument; `None` when it is undefined
fn with_integer<F>(v: JsValue, k: F) -> Eval
where
    F: FnOnce(Option<f64>) -> Eval + 'static,
{
    if v.is_undefined() {
        k(None)
    } else {
        with_number(v, move |n| k(Some(to_integer(n))))
    }
}

fn from_units(units: &[u16]) -> JsValue {
    JsValue::from(String::from_utf16_lossy(units))
}

/// `units[from..to]`, clamped
fn units_between(units: &[u16], from: usize, to: usize) -> JsValue {
    let to = to.min(units.len());
    let from = from.min(to);
    from_units(units.get(from..to).unwrap_or_default())
}

/// Clamp a relative position (negative counts from the end) into `0..=len`
fn relative(n: f64, len: usize) -> usize {
    let len_f = len as f64;
    let resolved = if n < 0.0 { (len_f + n).max(0.0) } else { n.min(len_f) };
    // Clamped into 0..=len above
    resolved as usize
}

/// Clamp an absolute position into `0..=len`
fn clamp(n: f64, len: usize) -> usize {
    // Clamped into 0..=len
    n.max(0.0).min(len as f64) as usize
}

fn string_char_at(call: HostCall) -> Eval {
    let pos = call.args.get(0);
    with_this_string(&call, "charAt", move |units| {
        with_integer(pos, move |pos| {
            let pos = pos.unwrap_or(0.0);
            if pos < 0.0 || pos >= units.len() as f64 {
                return value("");
            }
            let index = pos as usize;
            value(units_between(&units, index, index + 1))
        })
    })
}

fn string_char_code_at(call: HostCall) -> Eval {
    let pos = call.args.get(0);
    with_this_string(&call, "charCodeAt", move |units| {
        with_integer(pos, move |pos| {
            let pos = pos.unwrap_or(0.0);
            if pos < 0.0 {
                return value(f64::NAN);
            }
            match units.get(pos as usize) {
                Some(unit) => value(f64::from(*unit)),
                None => value(f64::NAN),
            }
        })
    })
}

fn string_concat(call: HostCall) -> Eval {
    let args = call.args.as_slice().to_vec();
    with_this_string(&call, "concat", move |units| {
        strings(args).and_values(move |parts| {
            let mut out = String::from_utf16_lossy(&units);
            for part in parts {
                if let JsValue::String(s) = part {
                    out.push_str(s.as_str());
                }
            }
            value(out)
        })
    })
}

/// First occurrence of `needle` in `haystack` at or after `from`
pub fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    (from..haystack.len())
        .find(|&start| haystack.get(start..start + needle.len()) == Some(needle))
}

/// Last occurrence of `needle` in `haystack` starting at or before `from`
pub fn rfind_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    let last_start = haystack.len().checked_sub(needle.len())?;
    (0..=from.min(last_start))
        .rev()
        .find(|&start| haystack.get(start..start + needle.len()) == Some(needle))
}

fn string_index_of(call: HostCall) -> Eval {
    let search = call.args.get(0);
    let pos = call.args.get(1);
    with_this_string(&call, "indexOf", move |units| {
        with_string(search, move |search| {
            with_integer(pos, move |pos| {
                let needle: Vec<u16> = search.as_str().encode_utf16().collect();
                let start = clamp(pos.unwrap_or(0.0), units.len());
                match find_units(&units, &needle, start) {
                    Some(index) => value(index as f64),
                    None => value(-1.0),
                }
            })
        })
    })
}

fn string_last_index_of(call: HostCall) -> Eval {
    let search = call.args.get(0);
    let pos = call.args.get(1);
    with_this_string(&call, "lastIndexOf", move |units| {
        with_string(search, move |search| {
            // NaN position means "search the whole string"
            with_number(pos, move |pos| {
                let needle: Vec<u16> = search.as_str().encode_utf16().collect();
                let start = if pos.is_nan() {
                    units.len()
                } else {
                    clamp(to_integer(pos), units.len())
                };
                match rfind_units(&units, &needle, start) {
                    Some(index) => value(index as f64),
                    None => value(-1.0),
                }
            })
        })
    })
}

fn string_slice(call: HostCall) -> Eval {
    let start = call.args.get(0);
    let end = call.args.get(1);
    with_this_string(&call, "slice", move |units| {
        with_integer(start, move |start| {
            with_integer(end, move |end| {
                let len = units.len();
                let from = relative(start.unwrap_or(0.0), len);
                let to = end.map_or(len, |end| relative(end, len));
                value(units_between(&units, from, to))
            })
        })
    })
}

fn string_substring(call: HostCall) -> Eval {
    let start = call.args.get(0);
    let end = call.args.get(1);
    with_this_string(&call, "substring", move |units| {
        with_integer(start, move |start| {
            with_integer(end, move |end| {
                let len = units.len();
                let a = clamp(start.unwrap_or(0.0), len);
                let b = end.map_or(len, |end| clamp(end, len));
                value(units_between(&units, a.min(b), a.max(b)))
            })
        })
    })
}

fn string_to_lower_case(call: HostCall) -> Eval {
    with_this_string(&call, "toLowerCase", |units| {
        value(String::from_utf16_lossy(&units).to_lowercase())
    })
}

fn string_to_upper_case(call: HostCall) -> Eval {
    with_this_string(&call, "toUpperCase", |units| {
        value(String::from_utf16_lossy(&units).to_uppercase())
    })
}

fn string_trim(call: HostCall) -> Eval {
    with_this_string(&call, "trim", |units| {
        let text = String::from_utf16_lossy(&units);
        value(text.trim_matches(is_js_whitespace))
    })
}

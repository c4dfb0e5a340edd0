//! `Number` constructor, constants and prototype (ES5 15.7)

use std::rc::Rc;

use crate::value::{CheapClone, ClassTag, HostCall, JsValue, PropertyDescriptor, number_to_string, to_integer};

use crate::interpreter::conversion::with_number;
use crate::interpreter::realm::ConstructorDef;
use crate::interpreter::{ErrorKind, Eval, Realm, throw_error, value, with_realm};

use super::{boxed, this_primitive};

const CONSTANTS: [(&str, f64); 5] = [
    ("MAX_VALUE", f64::MAX),
    ("MIN_VALUE", 5e-324),
    ("NaN", f64::NAN),
    ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
    ("POSITIVE_INFINITY", f64::INFINITY),
];

pub fn install(realm: &Rc<Realm>) {
    let proto = realm.number_prototype.cheap_clone();
    let ctor = realm.register_constructor(
        &realm.global,
        ConstructorDef {
            name: "Number",
            arity: 1,
            prototype: proto.cheap_clone(),
            statics: &[],
            call: number_call,
            construct: Some(number_construct),
        },
    );
    {
        let mut ctor = ctor.borrow_mut();
        for (name, n) in CONSTANTS {
            ctor.insert(name, PropertyDescriptor::frozen(JsValue::Number(n)));
        }
    }
    realm.register_function(&proto, "toString", 1, number_to_string_method);
    realm.register_function(&proto, "toLocaleString", 0, number_to_string_method);
    realm.register_function(&proto, "valueOf", 0, number_value_of);
    realm.register_function(&proto, "toFixed", 1, number_to_fixed);
}

fn argument_number(call: &HostCall, k: impl FnOnce(f64) -> Eval + 'static) -> Eval {
    if call.args.is_empty() {
        k(0.0)
    } else {
        with_number(call.args.get(0), k)
    }
}

fn number_call(call: HostCall) -> Eval {
    argument_number(&call, |n| value(n))
}

fn number_construct(call: HostCall) -> Eval {
    argument_number(&call, |n| {
        with_realm(move |realm| {
            value(boxed(&realm.number_prototype, ClassTag::Number, JsValue::Number(n)))
        })
    })
}

fn this_number(this: &JsValue, method: &str) -> Result<f64, Eval> {
    match this_primitive(this, ClassTag::Number) {
        Some(JsValue::Number(n)) => Ok(n),
        _ => Err(throw_error(
            ErrorKind::TypeError,
            format!("Number.prototype.{method} requires that 'this' be a Number"),
        )),
    }
}

fn number_value_of(call: HostCall) -> Eval {
    match this_number(&call.this, "valueOf") {
        Ok(n) => value(n),
        Err(error) => error,
    }
}

/// `Number.prototype.toString([radix])` (ES5 15.7.4.2)
fn number_to_string_method(call: HostCall) -> Eval {
    let n = match this_number(&call.this, "toString") {
        Ok(n) => n,
        Err(error) => return error,
    };
    let radix = call.args.get(0);
    if radix.is_undefined() {
        return value(number_to_string(n));
    }
    with_number(radix, move |radix| {
        let radix = to_integer(radix);
        if !(2.0..=36.0).contains(&radix) {
            return throw_error(ErrorKind::RangeError, "toString() radix must be between 2 and 36");
        }
        // Range checked above
        let radix = radix as u32;
        if radix == 10 {
            value(number_to_string(n))
        } else {
            value(to_radix_string(n, radix))
        }
    })
}

/// Render `n` in a non-decimal radix: the integer part exactly, the
/// fraction up to 52 digits
pub fn to_radix_string(n: f64, radix: u32) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let negative = n < 0.0;
    let n = n.abs();
    let base = f64::from(radix);

    let mut int_part = libm::floor(n);
    let mut fraction = n - int_part;
    let mut digits = Vec::new();
    loop {
        let digit = libm::fmod(int_part, base);
        digits.push(digit_char(digit as u32));
        int_part = libm::floor(int_part / base);
        if int_part < 1.0 {
            break;
        }
    }
    digits.reverse();
    let mut out: String = digits.into_iter().collect();

    if fraction > 0.0 {
        out.push('.');
        for _ in 0..52 {
            fraction *= base;
            let digit = libm::floor(fraction);
            out.push(digit_char(digit as u32));
            fraction -= digit;
            if fraction <= 0.0 {
                break;
            }
        }
    }
    if negative {
        out.insert(0, '-');
    }
    out
}

fn digit_char(digit: u32) -> char {
    char::from_digit(digit, 36).unwrap_or('0')
}

/// `Number.prototype.toFixed(fractionDigits)` (ES5 15.7.4.5)
fn number_to_fixed(call: HostCall) -> Eval {
    let n = match this_number(&call.this, "toFixed") {
        Ok(n) => n,
        Err(error) => return error,
    };
    with_number(call.args.get(0), move |digits| {
        let digits = to_integer(digits);
        if !(0.0..=20.0).contains(&digits) {
            return throw_error(ErrorKind::RangeError, "toFixed() digits argument must be between 0 and 20");
        }
        // Range checked above
        value(to_fixed(n, digits as usize))
    })
}

pub fn to_fixed(n: f64, digits: usize) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.abs() >= 1e21 {
        return number_to_string(n);
    }
    let scale = libm::pow(10.0, digits as f64);
    let scaled = n.abs() * scale;
    // Exact ties round away from zero
    if scaled.fract() == 0.5 && scaled < 9_007_199_254_740_992.0 && scaled / scale == n.abs() {
        let rounded = libm::ceil(scaled) / scale;
        let text = format!("{rounded:.digits$}");
        return if n < 0.0 { format!("-{text}") } else { text };
    }
    let text = format!("{:.digits$}", n.abs());
    if n < 0.0 { format!("-{text}") } else { text }
}

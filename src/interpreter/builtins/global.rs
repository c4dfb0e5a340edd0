//! Global functions and value properties (ES5 15.1)

use std::rc::Rc;

use crate::value::{HostCall, JsValue, PropertyDescriptor, is_js_whitespace, to_int32};

use crate::interpreter::conversion::{with_number, with_string};
use crate::interpreter::function::{EvalScope, perform_eval};
use crate::interpreter::{Eval, Realm, value};

pub fn install(realm: &Rc<Realm>) {
    {
        let mut global = realm.global.borrow_mut();
        global.insert("NaN", PropertyDescriptor::frozen(JsValue::Number(f64::NAN)));
        global.insert("Infinity", PropertyDescriptor::frozen(JsValue::Number(f64::INFINITY)));
        global.insert("undefined", PropertyDescriptor::frozen(JsValue::Undefined));
        global.insert("eval", PropertyDescriptor::hidden(JsValue::Object(realm.eval.clone())));
    }
    realm.register_function(&realm.global, "isNaN", 1, is_nan);
    realm.register_function(&realm.global, "isFinite", 1, is_finite);
    realm.register_function(&realm.global, "parseInt", 2, parse_int);
    realm.register_function(&realm.global, "parseFloat", 1, parse_float);
}

/// The global `eval`. Called through this hook it is always indirect; the
/// call expression detects direct calls before reaching here.
pub fn eval(call: HostCall) -> Eval {
    perform_eval(call.args.into_vec(), EvalScope::Indirect)
}

fn is_nan(call: HostCall) -> Eval {
    with_number(call.args.get(0), |n| value(n.is_nan()))
}

fn is_finite(call: HostCall) -> Eval {
    with_number(call.args.get(0), |n| value(n.is_finite()))
}

fn parse_int(call: HostCall) -> Eval {
    let radix = call.args.get(1);
    with_string(call.args.get(0), move |input| {
        with_number(radix, move |radix| value(parse_int_str(input.as_str(), to_int32(radix))))
    })
}

fn parse_float(call: HostCall) -> Eval {
    with_string(call.args.get(0), |input| value(parse_float_str(input.as_str())))
}

/// `parseInt` on an already converted string (ES5 15.1.2.2)
pub fn parse_int_str(input: &str, radix: i32) -> f64 {
    let trimmed = input.trim_start_matches(is_js_whitespace);
    let (negative, rest) = match trimmed.chars().next() {
        Some('-') => (true, trimmed.get(1..).unwrap_or("")),
        Some('+') => (false, trimmed.get(1..).unwrap_or("")),
        _ => (false, trimmed),
    };

    let mut radix = radix;
    let mut strip_prefix = true;
    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return f64::NAN;
        }
        if radix != 16 {
            strip_prefix = false;
        }
    } else {
        radix = 10;
    }

    let digits = if strip_prefix
        && let Some(stripped) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))
    {
        radix = 16;
        stripped
    } else {
        rest
    };

    // Radix checked to be within 2..=36 above
    let base = radix.unsigned_abs();
    let mut result = 0.0_f64;
    let mut any = false;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(base) else { break };
        result = result * f64::from(base) + f64::from(digit);
        any = true;
    }
    if !any {
        return f64::NAN;
    }
    if negative { -result } else { result }
}

/// `parseFloat` on an already converted string (ES5 15.1.2.3)
pub fn parse_float_str(input: &str) -> f64 {
    let trimmed = input.trim_start_matches(is_js_whitespace);
    let (sign, rest) = match trimmed.chars().next() {
        Some('-') => (-1.0, trimmed.get(1..).unwrap_or("")),
        Some('+') => (1.0, trimmed.get(1..).unwrap_or("")),
        _ => (1.0, trimmed),
    };
    if rest.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let bytes = rest.as_bytes();
    let mut end = 0;
    let mut mantissa_digits = 0;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
        mantissa_digits += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        let mut frac = end + 1;
        while bytes.get(frac).is_some_and(u8::is_ascii_digit) {
            frac += 1;
            mantissa_digits += 1;
        }
        if mantissa_digits > 0 {
            end = frac;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let digits_start = exp;
        while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            exp += 1;
        }
        if exp > digits_start {
            end = exp;
        }
    }
    let literal = rest.get(..end).unwrap_or("");
    literal.parse::<f64>().map_or(f64::NAN, |n| sign * n)
}

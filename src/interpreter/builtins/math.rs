//! The `Math` object (ES5 15.8)

use std::f64::consts;
use std::rc::Rc;

use crate::value::{ClassTag, HostCall, JsObjectRef, JsValue, ObjectValue, PropertyDescriptor};

use crate::interpreter::conversion::with_number;
use crate::interpreter::{Eval, EvalExt, Realm, value};

use super::numbers;

const CONSTANTS: [(&str, f64); 8] = [
    ("E", consts::E),
    ("LN10", consts::LN_10),
    ("LN2", consts::LN_2),
    ("LOG2E", consts::LOG2_E),
    ("LOG10E", consts::LOG10_E),
    ("PI", consts::PI),
    ("SQRT1_2", consts::FRAC_1_SQRT_2),
    ("SQRT2", consts::SQRT_2),
];

const UNARY: &[(&str, fn(HostCall) -> Eval)] = &[
    ("abs", math_abs),
    ("acos", math_acos),
    ("asin", math_asin),
    ("atan", math_atan),
    ("ceil", math_ceil),
    ("cos", math_cos),
    ("exp", math_exp),
    ("floor", math_floor),
    ("log", math_log),
    ("round", math_round),
    ("sin", math_sin),
    ("sqrt", math_sqrt),
    ("tan", math_tan),
];

pub fn install(realm: &Rc<Realm>) {
    let math = JsObjectRef::new(ObjectValue::new(
        ClassTag::Math,
        Some(realm.object_prototype.clone()),
    ));
    {
        let mut object = math.borrow_mut();
        for (name, n) in CONSTANTS {
            object.insert(name, PropertyDescriptor::frozen(JsValue::Number(n)));
        }
    }
    for (name, hook) in UNARY {
        realm.register_function(&math, name, 1, *hook);
    }
    realm.register_function(&math, "atan2", 2, math_atan2);
    realm.register_function(&math, "pow", 2, math_pow);
    realm.register_function(&math, "max", 2, math_max);
    realm.register_function(&math, "min", 2, math_min);
    realm.register_value(&realm.global, "Math", JsValue::Object(math));
}

fn unary(call: HostCall, f: fn(f64) -> f64) -> Eval {
    with_number(call.args.get(0), move |x| value(f(x)))
}

fn binary(call: HostCall, f: fn(f64, f64) -> f64) -> Eval {
    numbers(vec![call.args.get(0), call.args.get(1)]).and_values(move |xs| match xs.as_slice() {
        [JsValue::Number(x), JsValue::Number(y)] => value(f(*x, *y)),
        _ => value(f64::NAN),
    })
}

/// Math.round (15.8.2.15): halves round towards +Infinity, and results in
/// `[-0.5, 0)` are -0
pub fn round(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    if (-0.5..0.0).contains(&x) {
        return -0.0;
    }
    let floor = libm::floor(x);
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Math.pow (15.8.2.13)
pub fn pow(x: f64, y: f64) -> f64 {
    if y.is_nan() {
        return f64::NAN;
    }
    if y == 0.0 {
        return 1.0;
    }
    if x.abs() == 1.0 && y.is_infinite() {
        return f64::NAN;
    }
    libm::pow(x, y)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().fold(f64::NEG_INFINITY, |acc, &n| {
        if acc.is_nan() || n.is_nan() {
            f64::NAN
        } else if n > acc || (n == 0.0 && acc == 0.0 && acc.is_sign_negative()) {
            n
        } else {
            acc
        }
    })
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().fold(f64::INFINITY, |acc, &n| {
        if acc.is_nan() || n.is_nan() {
            f64::NAN
        } else if n < acc || (n == 0.0 && acc == 0.0 && n.is_sign_negative()) {
            n
        } else {
            acc
        }
    })
}

fn fold(call: HostCall, f: fn(&[f64]) -> f64) -> Eval {
    numbers(call.args.into_vec()).and_values(move |xs| {
        let xs: Vec<f64> = xs
            .iter()
            .map(|v| match v {
                JsValue::Number(n) => *n,
                _ => f64::NAN,
            })
            .collect();
        value(f(&xs))
    })
}

fn math_abs(call: HostCall) -> Eval {
    unary(call, libm::fabs)
}

fn math_acos(call: HostCall) -> Eval {
    unary(call, libm::acos)
}

fn math_asin(call: HostCall) -> Eval {
    unary(call, libm::asin)
}

fn math_atan(call: HostCall) -> Eval {
    unary(call, libm::atan)
}

fn math_ceil(call: HostCall) -> Eval {
    unary(call, libm::ceil)
}

fn math_cos(call: HostCall) -> Eval {
    unary(call, libm::cos)
}

fn math_exp(call: HostCall) -> Eval {
    unary(call, libm::exp)
}

fn math_floor(call: HostCall) -> Eval {
    unary(call, libm::floor)
}

fn math_log(call: HostCall) -> Eval {
    unary(call, libm::log)
}

fn math_round(call: HostCall) -> Eval {
    unary(call, round)
}

fn math_sin(call: HostCall) -> Eval {
    unary(call, libm::sin)
}

fn math_sqrt(call: HostCall) -> Eval {
    unary(call, libm::sqrt)
}

fn math_tan(call: HostCall) -> Eval {
    unary(call, libm::tan)
}

fn math_atan2(call: HostCall) -> Eval {
    binary(call, libm::atan2)
}

fn math_pow(call: HostCall) -> Eval {
    binary(call, pow)
}

fn math_max(call: HostCall) -> Eval {
    fold(call, max)
}

fn math_min(call: HostCall) -> Eval {
    fold(call, min)
}

//! Global functions and the Boolean, Number and Math builtins

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_global_values() {
    assert_eq!(eval("typeof NaN"), string("number"));
    assert_eq!(eval("Infinity > 1e308"), JsValue::Boolean(true));
    assert_eq!(eval("undefined = 1; typeof undefined"), string("undefined"));
    assert_eq!(eval("Object.keys(this).indexOf('NaN')"), JsValue::Number(-1.0));
}

#[test]
fn test_number_parsing_globals() {
    assert_eq!(eval("parseInt('42px')"), JsValue::Number(42.0));
    assert_eq!(eval("parseInt('0x1A')"), JsValue::Number(26.0));
    assert_eq!(eval("parseInt('z', 36)"), JsValue::Number(35.0));
    assert_eq!(eval("parseFloat('3.5e1 rest')"), JsValue::Number(35.0));
    assert_eq!(eval("isNaN(parseInt('px'))"), JsValue::Boolean(true));
    assert_eq!(eval("isNaN('abc')"), JsValue::Boolean(true));
    assert_eq!(eval("isFinite('12')"), JsValue::Boolean(true));
    assert_eq!(eval("isFinite(Infinity)"), JsValue::Boolean(false));
}

#[test]
fn test_boolean() {
    assert_eq!(eval("Boolean('')"), JsValue::Boolean(false));
    assert_eq!(eval("Boolean('0')"), JsValue::Boolean(true));
    assert_eq!(eval("new Boolean(false) ? 'truthy' : 'falsy'"), string("truthy"));
    assert_eq!(eval("new Boolean(false).valueOf()"), JsValue::Boolean(false));
    assert_eq!(eval("true.toString()"), string("true"));
    assert!(throws_error("Boolean.prototype.valueOf.call(1)", "TypeError"));
}

#[test]
fn test_number_constructor_and_constants() {
    assert_eq!(eval("Number('  12  ')"), JsValue::Number(12.0));
    assert_eq!(eval("Number()"), JsValue::Number(0.0));
    assert_eq!(eval("Number('0x10')"), JsValue::Number(16.0));
    assert_eq!(eval("isNaN(Number('1px'))"), JsValue::Boolean(true));
    assert_eq!(eval("Number.MAX_VALUE"), JsValue::Number(f64::MAX));
    assert_eq!(eval("Number.POSITIVE_INFINITY === Infinity"), JsValue::Boolean(true));
    assert_eq!(eval("Number.MAX_VALUE = 1; Number.MAX_VALUE"), JsValue::Number(f64::MAX));
    assert_eq!(eval("new Number(5) + 1"), JsValue::Number(6.0));
}

#[test]
fn test_number_formatting() {
    assert_eq!(eval("(255).toString(16)"), string("ff"));
    assert_eq!(eval("(-10).toString(2)"), string("-1010"));
    assert_eq!(eval("(1.005).toFixed(1)"), string("1.0"));
    assert_eq!(eval("(2.5).toFixed(0)"), string("3"));
    assert_eq!(eval("(1e21).toFixed(2)"), string("1e+21"));
    assert_eq!(eval("String(0.1 + 0.2)"), string("0.30000000000000004"));
    assert_eq!(eval("String(1e21)"), string("1e+21"));
    assert_eq!(eval("String(-0)"), string("0"));
    assert!(throws_error("(1).toString(1)", "RangeError"));
    assert!(throws_error("(1).toFixed(21)", "RangeError"));
}

#[test]
fn test_math_functions() {
    assert_eq!(eval("Math.max(1, 5, 3)"), JsValue::Number(5.0));
    assert_eq!(eval("Math.min()"), JsValue::Number(f64::INFINITY));
    assert_eq!(eval("isNaN(Math.max(1, NaN))"), JsValue::Boolean(true));
    assert_eq!(eval("Math.round(2.5)"), JsValue::Number(3.0));
    assert_eq!(eval("Math.round(-2.5)"), JsValue::Number(-2.0));
    assert_eq!(eval("Math.floor(-1.5) + Math.ceil(1.2)"), JsValue::Number(0.0));
    assert_eq!(eval("Math.abs(-4)"), JsValue::Number(4.0));
    assert_eq!(eval("Math.pow(2, 10)"), JsValue::Number(1024.0));
    assert_eq!(eval("Math.sqrt(81)"), JsValue::Number(9.0));
    assert_eq!(eval("isNaN(Math.pow(1, Infinity))"), JsValue::Boolean(true));
}

#[test]
fn test_math_object() {
    assert_eq!(eval("Math.PI > 3.14 && Math.PI < 3.15"), JsValue::Boolean(true));
    assert_eq!(eval("Object.prototype.toString.call(Math)"), string("[object Math]"));
    assert_eq!(eval("Math.PI = 3; Math.PI === 3"), JsValue::Boolean(false));
    assert!(throws_error("new Math.abs(1)", "TypeError"));
}

#[test]
fn test_operators_on_mixed_types() {
    assert_eq!(eval("null == undefined"), JsValue::Boolean(true));
    assert_eq!(eval("null == 0"), JsValue::Boolean(false));
    assert_eq!(eval("'1' == 1"), JsValue::Boolean(true));
    assert_eq!(eval("true + 1"), JsValue::Number(2.0));
    assert_eq!(eval("[] + {}"), string("[object Object]"));
    assert_eq!(eval("typeof null"), string("object"));
    assert_eq!(eval("1 / 0 === Infinity"), JsValue::Boolean(true));
    assert_eq!(eval("-1 >>> 0"), JsValue::Number(4_294_967_295.0));
    assert_eq!(eval("'a' in { a: 1 }"), JsValue::Boolean(true));
    assert!(throws_error("'a' in 'abc'", "TypeError"));
}

//! String primitives, String objects and String.prototype

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_length_and_indexing() {
    assert_eq!(eval("'hello'.length"), JsValue::Number(5.0));
    assert_eq!(eval("'hello'[1]"), string("e"));
    assert_eq!(eval("'hello'[10]"), JsValue::Undefined);
    assert_eq!(eval("'\\u00e9t\\u00e9'.length"), JsValue::Number(3.0));
    assert_eq!(eval("var s = 'abc'; s.length = 10; s.length"), JsValue::Number(3.0));
}

#[test]
fn test_string_constructor() {
    assert_eq!(eval("String(12)"), string("12"));
    assert_eq!(eval("String()"), string(""));
    assert_eq!(eval("String(null) + String(undefined)"), string("nullundefined"));
    assert_eq!(eval("typeof new String('x')"), string("object"));
    assert_eq!(eval("new String('x') == 'x'"), JsValue::Boolean(true));
    assert_eq!(eval("new String('x') === 'x'"), JsValue::Boolean(false));
    assert_eq!(eval("String.fromCharCode(72, 105, 65536 + 33)"), string("Hi!"));
}

#[test]
fn test_char_access() {
    assert_eq!(eval("'abc'.charAt(2)"), string("c"));
    assert_eq!(eval("'abc'.charAt(3)"), string(""));
    assert_eq!(eval("'abc'.charAt()"), string("a"));
    assert_eq!(eval("'abc'.charCodeAt(0)"), JsValue::Number(97.0));
    assert_eq!(eval("isNaN('abc'.charCodeAt(-1))"), JsValue::Boolean(true));
}

#[test]
fn test_searching() {
    assert_eq!(eval("'abcabc'.indexOf('c')"), JsValue::Number(2.0));
    assert_eq!(eval("'abcabc'.indexOf('c', 3)"), JsValue::Number(5.0));
    assert_eq!(eval("'abcabc'.indexOf('z')"), JsValue::Number(-1.0));
    assert_eq!(eval("'abc'.indexOf('')"), JsValue::Number(0.0));
    assert_eq!(eval("'abcabc'.lastIndexOf('a')"), JsValue::Number(3.0));
    assert_eq!(eval("'abcabc'.lastIndexOf('a', 2)"), JsValue::Number(0.0));
}

#[test]
fn test_slicing() {
    assert_eq!(eval("'abcdef'.slice(1, 3)"), string("bc"));
    assert_eq!(eval("'abcdef'.slice(-2)"), string("ef"));
    assert_eq!(eval("'abcdef'.slice(4, 1)"), string(""));
    assert_eq!(eval("'abcdef'.substring(4, 1)"), string("bcd"));
    assert_eq!(eval("'abcdef'.substring(-3, 2)"), string("ab"));
    assert_eq!(eval("'abcdef'.substring(NaN)"), string("abcdef"));
}

#[test]
fn test_case_and_trim() {
    assert_eq!(eval("'MiXeD'.toLowerCase()"), string("mixed"));
    assert_eq!(eval("'MiXeD'.toUpperCase()"), string("MIXED"));
    assert_eq!(eval("'  \\t padded \\n '.trim()"), string("padded"));
    assert_eq!(eval("'a'.concat('b', 1, null)"), string("ab1null"));
}

#[test]
fn test_methods_coerce_this() {
    assert_eq!(eval("String.prototype.charAt.call(12345, 1)"), string("2"));
    assert_eq!(eval("String.prototype.trim.call({ toString: function () { return ' o '; } })"), string("o"));
    assert!(throws_error("String.prototype.trim.call(null)", "TypeError"));
    assert!(throws_error("String.prototype.toString.call({})", "TypeError"));
}

#[test]
fn test_string_comparison_and_concatenation() {
    assert_eq!(eval("'b' > 'a'"), JsValue::Boolean(true));
    assert_eq!(eval("'10' < '9'"), JsValue::Boolean(true));
    assert_eq!(eval("'10' < 9"), JsValue::Boolean(false));
    assert_eq!(eval("1 + '2'"), string("12"));
    assert_eq!(eval("'3' * '4'"), JsValue::Number(12.0));
}

#[test]
fn test_primitive_methods_do_not_persist_properties() {
    assert_eq!(eval("var s = 'abc'; s.extra = 1; s.extra"), JsValue::Undefined);
    assert_eq!(eval("String.prototype.shout = function () { return this + '!'; }; 'hi'.shout()"), string("hi!"));
}

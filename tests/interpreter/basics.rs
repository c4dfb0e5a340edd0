//! Basic language features: arithmetic, precedence, comparison, variables, conversions

use super::{completion, eval, string, throws_error};
use esrun::JsValue;
use esrun::interpreter::CompletionKind;

#[test]
fn test_arithmetic() {
    assert_eq!(eval("1 + 2"), JsValue::Number(3.0));
    assert_eq!(eval("10 - 4"), JsValue::Number(6.0));
    assert_eq!(eval("3 * 4"), JsValue::Number(12.0));
    assert_eq!(eval("15 / 3"), JsValue::Number(5.0));
    assert_eq!(eval("17 % 5"), JsValue::Number(2.0));
    assert_eq!(eval("-7 % 3"), JsValue::Number(-1.0));
}

#[test]
fn test_precedence() {
    assert_eq!(eval("1 + 2 * 3"), JsValue::Number(7.0));
    assert_eq!(eval("(1 + 2) * 3"), JsValue::Number(9.0));
    assert_eq!(eval("10 - 2 - 3"), JsValue::Number(5.0));
    assert_eq!(eval("2 * 3 + 4 * 5"), JsValue::Number(26.0));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'a' + 'b'"), string("ab"));
    assert_eq!(eval("'n' + 1"), string("n1"));
    assert_eq!(eval("1 + 2 + '3'"), string("33"));
    assert_eq!(eval("'3' + 1 + 2"), string("312"));
    assert_eq!(eval("'5' - 2"), JsValue::Number(3.0));
    assert_eq!(eval("[1, 2] + ''"), string("1,2"));
    assert_eq!(eval("({}) + ''"), string("[object Object]"));
}

#[test]
fn test_comparison() {
    assert_eq!(eval("1 < 2"), JsValue::Boolean(true));
    assert_eq!(eval("2 > 1"), JsValue::Boolean(true));
    assert_eq!(eval("2 <= 2"), JsValue::Boolean(true));
    assert_eq!(eval("'a' < 'b'"), JsValue::Boolean(true));
    assert_eq!(eval("'10' < '9'"), JsValue::Boolean(true));
    assert_eq!(eval("'10' < 9"), JsValue::Boolean(false));
    assert_eq!(eval("NaN < 1"), JsValue::Boolean(false));
    assert_eq!(eval("NaN >= 1"), JsValue::Boolean(false));
}

#[test]
fn test_equality() {
    assert_eq!(eval("1 === 1"), JsValue::Boolean(true));
    assert_eq!(eval("1 !== 2"), JsValue::Boolean(true));
    assert_eq!(eval("'1' == 1"), JsValue::Boolean(true));
    assert_eq!(eval("'1' === 1"), JsValue::Boolean(false));
    assert_eq!(eval("null == undefined"), JsValue::Boolean(true));
    assert_eq!(eval("null === undefined"), JsValue::Boolean(false));
    assert_eq!(eval("null == 0"), JsValue::Boolean(false));
    assert_eq!(eval("true == 1"), JsValue::Boolean(true));
    assert_eq!(eval("NaN == NaN"), JsValue::Boolean(false));
    assert_eq!(eval("var o = {}; o == o"), JsValue::Boolean(true));
    assert_eq!(eval("({}) == ({})"), JsValue::Boolean(false));
    assert_eq!(eval("[1] == 1"), JsValue::Boolean(true));
}

#[test]
fn test_logical_operators_return_operands() {
    assert_eq!(eval("0 || 'x'"), string("x"));
    assert_eq!(eval("'a' || 'b'"), string("a"));
    assert_eq!(eval("0 && f()"), JsValue::Number(0.0));
    assert_eq!(eval("1 && 2"), JsValue::Number(2.0));
    assert_eq!(eval("!0"), JsValue::Boolean(true));
    assert_eq!(eval("!!''"), JsValue::Boolean(false));
}

#[test]
fn test_logical_short_circuit_skips_right() {
    assert_eq!(
        eval("var hits = 0; function hit() { hits++; return true; } true || hit(); false && hit(); hits"),
        JsValue::Number(0.0)
    );
}

#[test]
fn test_bitwise_and_shift() {
    assert_eq!(eval("5 & 3"), JsValue::Number(1.0));
    assert_eq!(eval("5 | 3"), JsValue::Number(7.0));
    assert_eq!(eval("5 ^ 3"), JsValue::Number(6.0));
    assert_eq!(eval("~5"), JsValue::Number(-6.0));
    assert_eq!(eval("1 << 4"), JsValue::Number(16.0));
    assert_eq!(eval("-16 >> 2"), JsValue::Number(-4.0));
    assert_eq!(eval("-1 >>> 28"), JsValue::Number(15.0));
    assert_eq!(eval("1 << 33"), JsValue::Number(2.0));
}

#[test]
fn test_unary_operators() {
    assert_eq!(eval("+'42'"), JsValue::Number(42.0));
    assert_eq!(eval("-'3'"), JsValue::Number(-3.0));
    assert_eq!(eval("void 0"), JsValue::Undefined);
    assert_eq!(eval("typeof 1"), string("number"));
    assert_eq!(eval("typeof 'x'"), string("string"));
    assert_eq!(eval("typeof null"), string("object"));
    assert_eq!(eval("typeof undefined"), string("undefined"));
    assert_eq!(eval("typeof function () {}"), string("function"));
    assert_eq!(eval("typeof notDeclaredAnywhere"), string("undefined"));
}

#[test]
fn test_variables() {
    assert_eq!(eval("var x = 5; x"), JsValue::Number(5.0));
    assert_eq!(eval("var x = 5; x = 10; x"), JsValue::Number(10.0));
    assert_eq!(eval("var a = 1, b = a + 1; b"), JsValue::Number(2.0));
    assert_eq!(eval("var u; u"), JsValue::Undefined);
}

#[test]
fn test_var_hoisting() {
    assert_eq!(eval("var before = typeof later; var later = 1; before"), string("undefined"));
    assert_eq!(eval("x = 3; var x; x"), JsValue::Number(3.0));
}

#[test]
fn test_implicit_global_in_sloppy_code() {
    assert_eq!(eval("function f() { leaked = 7; } f(); leaked"), JsValue::Number(7.0));
    assert_eq!(eval("implicit = 1; this.implicit"), JsValue::Number(1.0));
}

#[test]
fn test_unresolved_reference_throws() {
    assert!(throws_error("missing + 1", "ReferenceError"));
    assert!(throws_error("missing + 1", "missing is not defined"));
}

#[test]
fn test_conditional_and_comma() {
    assert_eq!(eval("true ? 1 : 2"), JsValue::Number(1.0));
    assert_eq!(eval("false ? 1 : 2"), JsValue::Number(2.0));
    assert_eq!(eval("(1, 2, 3)"), JsValue::Number(3.0));
}

#[test]
fn test_compound_assignment() {
    assert_eq!(eval("var x = 10; x += 5; x"), JsValue::Number(15.0));
    assert_eq!(eval("var x = 10; x -= 3; x"), JsValue::Number(7.0));
    assert_eq!(eval("var x = 4; x *= 3; x"), JsValue::Number(12.0));
    assert_eq!(eval("var x = 'a'; x += 'b'; x"), string("ab"));
    assert_eq!(eval("var x = 6; x &= 3; x"), JsValue::Number(2.0));
    assert_eq!(eval("var x = 1; x <<= 3; x"), JsValue::Number(8.0));
    assert_eq!(eval("var o = { n: 1 }; o.n += 1; o.n"), JsValue::Number(2.0));
}

#[test]
fn test_in_and_instanceof() {
    assert_eq!(eval("'a' in { a: 1 }"), JsValue::Boolean(true));
    assert_eq!(eval("'toString' in {}"), JsValue::Boolean(true));
    assert_eq!(eval("0 in [5]"), JsValue::Boolean(true));
    assert_eq!(eval("[] instanceof Array"), JsValue::Boolean(true));
    assert_eq!(eval("[] instanceof Object"), JsValue::Boolean(true));
    assert_eq!(eval("({}) instanceof Array"), JsValue::Boolean(false));
    assert!(throws_error("'a' in 'abc'", "TypeError"));
    assert!(throws_error("({}) instanceof 1", "TypeError"));
}

#[test]
fn test_number_formatting() {
    assert_eq!(eval("String(0.1 + 0.2)"), string("0.30000000000000004"));
    assert_eq!(eval("String(1e21)"), string("1e+21"));
    assert_eq!(eval("String(123456789012)"), string("123456789012"));
    assert_eq!(eval("String(0.000001)"), string("0.000001"));
    assert_eq!(eval("String(1e-7)"), string("1e-7"));
    assert_eq!(eval("String(-0)"), string("0"));
    assert_eq!(eval("String(1 / 0)"), string("Infinity"));
}

#[test]
fn test_to_primitive_calls_value_of() {
    assert_eq!(eval("var o = { valueOf: function () { return 41; } }; o + 1"), JsValue::Number(42.0));
    assert_eq!(
        eval("var o = { toString: function () { return 'str'; } }; 'is ' + o"),
        string("is str")
    );
    assert!(throws_error(
        "var o = { valueOf: function () { return {}; }, toString: function () { return {}; } }; o + 1",
        "Cannot convert object to primitive value"
    ));
}

#[test]
fn test_program_completion_value() {
    let c = completion("1; 2; ;");
    assert_eq!(c.kind, CompletionKind::Normal);
    assert_eq!(c.value, Some(JsValue::Number(2.0)));

    let c = completion("throw 'boom'");
    assert_eq!(c.kind, CompletionKind::Throw);
    assert_eq!(c.value, Some(string("boom")));
}

#[test]
fn test_empty_program() {
    assert_eq!(eval(""), JsValue::Undefined);
    assert_eq!(eval("var a = 1;"), JsValue::Undefined);
}

#[test]
fn test_asi() {
    assert_eq!(eval("var a = 1\nvar b = 2\na + b"), JsValue::Number(3.0));
    assert_eq!(eval("function f() { return\n42 } f()"), JsValue::Undefined);
}

#[test]
fn test_syntax_error() {
    assert!(throws_error("var = 2;", "SyntaxError"));
    assert!(throws_error("if (", "SyntaxError"));
}

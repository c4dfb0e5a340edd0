//! Increment, decrement and compound assignment

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_postfix_returns_old_value() {
    assert_eq!(eval("var i = 1; i++"), JsValue::Number(1.0));
    assert_eq!(eval("var i = 1; i++; i"), JsValue::Number(2.0));
    assert_eq!(eval("var i = 1; i--; i"), JsValue::Number(0.0));
}

#[test]
fn test_prefix_returns_new_value() {
    assert_eq!(eval("var i = 1; ++i"), JsValue::Number(2.0));
    assert_eq!(eval("var i = 1; --i"), JsValue::Number(0.0));
}

#[test]
fn test_update_converts_to_number() {
    assert_eq!(eval("var s = '5'; s++"), JsValue::Number(5.0));
    assert_eq!(eval("var s = '5'; s++; s"), JsValue::Number(6.0));
    assert_eq!(eval("var u; u++; isNaN(u)"), JsValue::Boolean(true));
    assert_eq!(eval("var n = null; ++n"), JsValue::Number(1.0));
}

#[test]
fn test_update_member_targets() {
    assert_eq!(eval("var o = { c: 1 }; o.c++; o.c"), JsValue::Number(2.0));
    assert_eq!(eval("var a = [5]; --a[0]; a[0]"), JsValue::Number(4.0));
    assert_eq!(
        eval("var n = 0; var o = { x: 1 }; function key() { n++; return 'x'; } o[key()]++; n"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_update_requires_reference() {
    assert!(throws_error("1++", "ReferenceError"));
    assert!(throws_error("++(1 + 2)", "ReferenceError"));
}

#[test]
fn test_update_unresolvable_throws() {
    assert!(throws_error("missingName++", "ReferenceError"));
}

#[test]
fn test_compound_assignment() {
    assert_eq!(eval("var x = 2; x += 3; x *= 4; x -= 1; x"), JsValue::Number(19.0));
    assert_eq!(eval("var s = 'a'; s += 1; s"), string("a1"));
    assert_eq!(eval("var x = 7; x %= 4; x <<= 2; x"), JsValue::Number(12.0));
    assert_eq!(eval("var x = -16; x >>= 2; x"), JsValue::Number(-4.0));
    assert_eq!(eval("var x = -1; x >>>= 28; x"), JsValue::Number(15.0));
    assert_eq!(eval("var x = 6; x &= 3; x |= 8; x ^= 1; x"), JsValue::Number(11.0));
    assert_eq!(eval("var x = 9; x /= 2; x"), JsValue::Number(4.5));
}

#[test]
fn test_compound_assignment_reads_target_once() {
    assert_eq!(
        eval("var reads = 0; var o = { get v() { reads++; return 1; }, set v(x) {} }; o.v += 1; reads"),
        JsValue::Number(1.0)
    );
}

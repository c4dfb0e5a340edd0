//! Strict mode code

use super::{eval, string, throws_error};
use esrun::{EvalResult, JsValue, Runtime, Settings};

#[test]
fn test_strict_unresolved_assignment_throws() {
    assert!(throws_error("'use strict'; undeclared = 1;", "ReferenceError"));
    assert!(throws_error("function f() { 'use strict'; nope = 1; } f()", "nope is not defined"));
}

#[test]
fn test_strict_this_is_not_coerced() {
    assert_eq!(eval("function f() { 'use strict'; return this; } f()"), JsValue::Undefined);
    assert_eq!(eval("function f() { 'use strict'; return typeof this; } f.call(5)"), string("number"));
    assert_eq!(eval("function f() { 'use strict'; return this; } f.call(null)"), JsValue::Null);
}

#[test]
fn test_strict_read_only_write_throws() {
    assert!(throws_error(
        "'use strict'; var o = {}; Object.defineProperty(o, 'k', { value: 1 }); o.k = 2;",
        "TypeError"
    ));
    assert!(throws_error("'use strict'; var o = Object.freeze({ a: 1 }); o.b = 1;", "TypeError"));
    assert_eq!(
        eval("var o = Object.freeze({ a: 1 }); o.a = 2; o.a"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_strict_delete_restrictions() {
    assert!(throws_error("'use strict'; var x; delete x;", "SyntaxError"));
    assert!(throws_error("'use strict'; delete Object.prototype;", "TypeError"));
    assert_eq!(eval("delete Object.prototype"), JsValue::Boolean(false));
}

#[test]
fn test_strict_rejects_with() {
    assert!(throws_error("'use strict'; with ({}) {}", "SyntaxError"));
}

#[test]
fn test_strict_function_inherits_directive() {
    assert_eq!(
        eval("'use strict'; function f() { return this; } f()"),
        JsValue::Undefined
    );
    assert_eq!(
        eval("function outer() { 'use strict'; return (function () { return this; })(); } outer()"),
        JsValue::Undefined
    );
}

#[test]
fn test_directive_must_be_in_prologue() {
    assert_eq!(eval("function f() { var a; 'use strict'; return this !== undefined; } f()"), JsValue::Boolean(true));
}

#[test]
fn test_strict_setting_applies_to_programs() {
    let settings = Settings {
        strict: true,
        ..Settings::default()
    };
    let mut runtime = Runtime::with_settings(settings);
    let result = runtime.eval("leak = 1;").unwrap();
    assert!(matches!(result, EvalResult::Throw(_)));
}

#[test]
fn test_strict_function_poison_pills() {
    assert!(throws_error("function f() { 'use strict'; } f.caller", "TypeError"));
    assert!(throws_error("function f() { 'use strict'; } f.arguments", "TypeError"));
}

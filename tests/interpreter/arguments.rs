//! The `arguments` object
//!
//! Non-strict functions alias each named parameter with its `arguments`
//! index, so writes through either name are visible through the other.
//! Strict functions receive an unmapped snapshot instead.

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_arguments_values_and_length() {
    assert_eq!(eval("function f() { return arguments.length; } f(1, 2, 3)"), JsValue::Number(3.0));
    assert_eq!(eval("function f() { return arguments[1]; } f('a', 'b')"), string("b"));
    assert_eq!(eval("function f(a) { return arguments.length; } f()"), JsValue::Number(0.0));
    assert_eq!(
        eval("function f() { return Object.prototype.toString.call(arguments); } f()"),
        string("[object Arguments]")
    );
}

#[test]
fn test_arguments_callee() {
    assert_eq!(eval("function f() { return arguments.callee === f; } f()"), JsValue::Boolean(true));
    assert_eq!(
        eval("function f() { return Object.keys(arguments).join(); } f(7, 8)"),
        string("0,1")
    );
}

#[test]
fn test_sloppy_parameter_write_updates_arguments() {
    assert_eq!(eval("function f(a) { a = 2; return arguments[0]; } f(1)"), JsValue::Number(2.0));
}

#[test]
fn test_sloppy_arguments_write_updates_parameter() {
    assert_eq!(eval("function f(a) { arguments[0] = 9; return a; } f(1)"), JsValue::Number(9.0));
}

#[test]
fn test_unpassed_parameters_are_not_mapped() {
    assert_eq!(
        eval("function f(a, b) { b = 5; return arguments[1]; } f(1)"),
        JsValue::Undefined
    );
    assert_eq!(eval("function f(a, b) { b = 5; return arguments.length; } f(1)"), JsValue::Number(1.0));
}

#[test]
fn test_delete_unmaps_index() {
    assert_eq!(
        eval("function f(a) { delete arguments[0]; arguments[0] = 3; return a; } f(1)"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_accessor_redefinition_unmaps_index() {
    assert_eq!(
        eval(
            "function f(a) {
               Object.defineProperty(arguments, '0', { get: function () { return 'g'; } });
               a = 4;
               return arguments[0] + a;
             } f(1)"
        ),
        string("g4")
    );
}

#[test]
fn test_strict_arguments_is_a_snapshot() {
    assert_eq!(
        eval("function f(a) { 'use strict'; a = 2; return arguments[0]; } f(1)"),
        JsValue::Number(1.0)
    );
    assert_eq!(
        eval("function f(a) { 'use strict'; arguments[0] = 9; return a; } f(1)"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_strict_callee_throws() {
    assert!(throws_error("function f() { 'use strict'; return arguments.callee; } f()", "TypeError"));
}

#[test]
fn test_parameter_named_arguments_shadows() {
    assert_eq!(eval("function f(arguments) { return arguments; } f(3)"), JsValue::Number(3.0));
    assert_eq!(
        eval("function f() { function arguments() { return 'fn'; } return arguments(); } f()"),
        string("fn")
    );
}

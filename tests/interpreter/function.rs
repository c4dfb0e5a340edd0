//! Function declarations and expressions, closures, `this`, call/apply/bind, constructors

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_function_declaration_and_call() {
    assert_eq!(eval("function add(a, b) { return a + b; } add(2, 3)"), JsValue::Number(5.0));
    assert_eq!(eval("function f() {} f()"), JsValue::Undefined);
    assert_eq!(eval("function f(a, b) { return b; } f(1)"), JsValue::Undefined);
}

#[test]
fn test_function_hoisting() {
    assert_eq!(eval("var r = early(); function early() { return 'up'; } r"), string("up"));
}

#[test]
fn test_function_properties() {
    assert_eq!(eval("function f(a, b, c) {} f.length"), JsValue::Number(3.0));
    assert_eq!(eval("function named() {} named.name"), string("named"));
    assert_eq!(eval("function f() {} f.prototype.constructor === f"), JsValue::Boolean(true));
    assert_eq!(
        eval("function f() {} Object.getOwnPropertyDescriptor(f, 'prototype').enumerable"),
        JsValue::Boolean(false)
    );
    assert_eq!(eval("function f(a) {} f.length = 9; f.length"), JsValue::Number(1.0));
}

#[test]
fn test_closures() {
    assert_eq!(
        eval(
            "function counter() { var n = 0; return function () { return ++n; }; }
             var c = counter(); c(); c(); c()"
        ),
        JsValue::Number(3.0)
    );
    assert_eq!(
        eval(
            "var fs = []; for (var i = 0; i < 3; i++) { fs.push(function () { return i; }); }
             fs[0]()"
        ),
        JsValue::Number(3.0)
    );
}

#[test]
fn test_recursion() {
    assert_eq!(
        eval("function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); } fact(10)"),
        JsValue::Number(3628800.0)
    );
    assert_eq!(
        eval("function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } fib(15)"),
        JsValue::Number(610.0)
    );
}

#[test]
fn test_named_function_expression_binds_own_name() {
    assert_eq!(
        eval("var f = function g(n) { return n ? g(n - 1) + 1 : 0; }; f(4)"),
        JsValue::Number(4.0)
    );
    assert_eq!(eval("var f = function g() {}; typeof g"), string("undefined"));
    assert_eq!(eval("var f = function g() { g = 1; return typeof g; }; f()"), string("function"));
}

#[test]
fn test_this_binding() {
    assert_eq!(eval("var o = { v: 3, m: function () { return this.v; } }; o.m()"), JsValue::Number(3.0));
    assert_eq!(eval("function f() { return this; } f() === this"), JsValue::Boolean(true));
    assert_eq!(eval("var o = { f: function () { return this; } }; var g = o.f; g() === this"), JsValue::Boolean(true));
    assert_eq!(eval("function f() { return typeof this; } f.call(5)"), string("object"));
}

#[test]
fn test_call_and_apply() {
    assert_eq!(
        eval("function f(a, b) { return this.x + a + b; } f.call({ x: 1 }, 2, 3)"),
        JsValue::Number(6.0)
    );
    assert_eq!(
        eval("function f(a, b) { return this.x + a + b; } f.apply({ x: 1 }, [2, 3])"),
        JsValue::Number(6.0)
    );
    assert_eq!(eval("function f() { return arguments.length; } f.apply(null)"), JsValue::Number(0.0));
    assert_eq!(
        eval("function f() { return arguments.length; } f.apply(null, { length: 2 })"),
        JsValue::Number(2.0)
    );
    assert!(throws_error("function f() {} f.apply(null, 1)", "TypeError"));
}

#[test]
fn test_bind() {
    assert_eq!(
        eval("function f(a, b) { return this.x + a + b; } var g = f.bind({ x: 1 }, 2); g(3)"),
        JsValue::Number(6.0)
    );
    assert_eq!(eval("function f(a, b, c) {} f.bind(null, 1).length"), JsValue::Number(2.0));
    assert_eq!(eval("function f(a) {} f.bind(null, 1, 2).length"), JsValue::Number(0.0));
    assert_eq!(eval("function f() {} f.bind(null).name"), string("bound f"));
}

#[test]
fn test_bound_constructor() {
    assert_eq!(
        eval("function P(x, y) { this.x = x; this.y = y; } var B = P.bind(null, 1); var p = new B(2); p.x + p.y"),
        JsValue::Number(3.0)
    );
    assert_eq!(
        eval("function P() {} var B = P.bind(null); new B() instanceof P"),
        JsValue::Boolean(true)
    );
    assert_eq!(
        eval("function P() {} var B = P.bind(null); new P() instanceof B"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_constructors() {
    assert_eq!(eval("function P(n) { this.n = n; } new P(4).n"), JsValue::Number(4.0));
    assert_eq!(
        eval("function P() {} P.prototype.greet = function () { return 'hi'; }; new P().greet()"),
        string("hi")
    );
    assert_eq!(eval("function P() { return { other: true }; } new P().other"), JsValue::Boolean(true));
    assert_eq!(eval("function P() { this.a = 1; return 5; } new P().a"), JsValue::Number(1.0));
    assert_eq!(eval("function P() {} new P instanceof P"), JsValue::Boolean(true));
    assert_eq!(
        eval("function P() {} P.prototype = 3; Object.getPrototypeOf(new P()) === Object.prototype"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_non_callable_errors() {
    assert!(throws_error("var x = 1; x()", "x is not a function"));
    assert!(throws_error("var o = {}; o.missing()", "TypeError"));
    assert!(throws_error("new Math.abs()", "TypeError"));
    assert!(throws_error("var n = 3; new n()", "n is not a constructor"));
}

#[test]
fn test_non_callable_errors_name_the_value() {
    assert!(throws_error("new 5", "5 is not a constructor"));
    assert!(throws_error("(1)()", "1 is not a function"));
    assert!(throws_error("var o = { a: {} }; o.a.b()", "o.a.b is not a function"));
    assert!(throws_error("new ('x' + 1)()", "\"x1\" is not a constructor"));
}

#[test]
fn test_callee_checked_before_arguments() {
    assert_eq!(
        eval("var ran = false; try { (void 0)(ran = true); } catch (e) {} ran"),
        JsValue::Boolean(false)
    );
}

#[test]
fn test_max_call_depth() {
    assert!(throws_error(
        "function down(n) { return down(n + 1); } down(0)",
        "Maximum call stack size exceeded"
    ));
    assert_eq!(
        eval("function down() { return down(); } try { down(); } catch (e) { e instanceof RangeError }"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_function_to_string() {
    assert_eq!(eval("(function add(a, b) { return a + b; }).toString()"), string("function add(a, b) { return a + b; }"));
    assert!(eval("Math.max.toString()").as_str().is_some_and(|s| s.contains("[native code]")));
}

#[test]
fn test_function_prototype_is_callable() {
    assert_eq!(eval("Function.prototype()"), JsValue::Undefined);
    assert!(throws_error("Function('return 1')", "TypeError"));
}

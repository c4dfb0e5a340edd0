//! Direct and indirect `eval`

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_eval_returns_completion_value() {
    assert_eq!(eval("eval('1 + 2')"), JsValue::Number(3.0));
    assert_eq!(eval("eval('if (true) { \"branch\"; }')"), string("branch"));
    assert_eq!(eval("eval('')"), JsValue::Undefined);
    assert_eq!(eval("eval('var unused = 1;')"), JsValue::Undefined);
}

#[test]
fn test_eval_non_string_is_returned_unchanged() {
    assert_eq!(eval("eval(42)"), JsValue::Number(42.0));
    assert_eq!(eval("var o = {}; eval(o) === o"), JsValue::Boolean(true));
    assert_eq!(eval("eval()"), JsValue::Undefined);
}

#[test]
fn test_direct_eval_sees_local_scope() {
    assert_eq!(eval("function f() { var local = 'inner'; return eval('local'); } f()"), string("inner"));
    assert_eq!(
        eval("function f() { eval('var added = 5;'); return added; } f()"),
        JsValue::Number(5.0)
    );
    assert_eq!(eval("var o = { m: function () { return eval('this'); } }; o.m() === o"), JsValue::Boolean(true));
}

#[test]
fn test_indirect_eval_uses_global_scope() {
    assert_eq!(
        eval("var x = 'global'; function f() { var x = 'local'; var e = eval; return e('x'); } f()"),
        string("global")
    );
    assert_eq!(
        eval("var x = 'global'; function f() { var x = 'local'; return (0, eval)('x'); } f()"),
        string("global")
    );
    assert_eq!(
        eval("function f() { var e = eval; e('var leaked = 1;'); } f(); leaked"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_eval_declarations_are_deletable() {
    assert_eq!(eval("eval('var d = 1;'); delete d"), JsValue::Boolean(true));
    assert_eq!(eval("eval('var d = 1;'); delete d; typeof d"), string("undefined"));
    assert_eq!(eval("var kept = 1; delete kept"), JsValue::Boolean(false));
}

#[test]
fn test_eval_function_declarations() {
    assert_eq!(eval("eval('function made() { return 7; }'); made()"), JsValue::Number(7.0));
}

#[test]
fn test_strict_eval_has_own_variables() {
    assert_eq!(eval("eval('\"use strict\"; var hidden = 1;'); typeof hidden"), string("undefined"));
    assert_eq!(
        eval("function f() { 'use strict'; eval('var inner = 1;'); return typeof inner; } f()"),
        string("undefined")
    );
    assert_eq!(
        eval("function f() { 'use strict'; var outer = 3; return eval('outer'); } f()"),
        JsValue::Number(3.0)
    );
}

#[test]
fn test_eval_inherits_strictness_when_direct() {
    assert!(throws_error("function f() { 'use strict'; eval('undeclared = 1'); } f()", "ReferenceError"));
    assert_eq!(
        eval("function f() { 'use strict'; var e = eval; e('sloppyGlobal = 2'); } f(); sloppyGlobal"),
        JsValue::Number(2.0)
    );
}

#[test]
fn test_eval_syntax_error_is_catchable() {
    assert!(throws_error("eval('1 +')", "SyntaxError"));
    assert_eq!(eval("try { eval('}'); } catch (e) { e.name }"), string("SyntaxError"));
}

#[test]
fn test_eval_exceptions_propagate() {
    assert_eq!(eval("try { eval('throw 9'); } catch (e) { e }"), JsValue::Number(9.0));
}

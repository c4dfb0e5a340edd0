//! The `with` statement

use super::{eval, string};
use esrun::JsValue;

#[test]
fn test_with_resolves_object_properties() {
    assert_eq!(eval("var o = { a: 1, b: 2 }; with (o) { a + b }"), JsValue::Number(3.0));
    assert_eq!(eval("var a = 'outer'; with ({}) { a }"), string("outer"));
}

#[test]
fn test_with_assignment_targets_object() {
    assert_eq!(eval("var o = { a: 1 }; with (o) { a = 5; } o.a"), JsValue::Number(5.0));
    assert_eq!(
        eval("var o = {}; var fresh; with (o) { fresh = 5; } [o.fresh, fresh].join()"),
        string(",5")
    );
}

#[test]
fn test_with_var_hoists_to_function() {
    assert_eq!(
        eval("var o = { v: 1 }; with (o) { var v = 2; } [o.v, typeof v === 'undefined'].join()"),
        string("2,true")
    );
}

#[test]
fn test_with_calls_pass_object_as_this() {
    assert_eq!(
        eval("var o = { who: 'o', m: function () { return this.who; } }; with (o) { m() }"),
        string("o")
    );
}

#[test]
fn test_with_sees_inherited_properties() {
    assert_eq!(
        eval("var o = Object.create({ inherited: 'yes' }); with (o) { inherited }"),
        string("yes")
    );
}

#[test]
fn test_with_scope_ends_after_block() {
    assert_eq!(eval("with ({ scoped: 1 }) {} typeof scoped"), string("undefined"));
    assert_eq!(
        eval("var r; try { with ({ q: 1 }) { throw 0; } } catch (e) { r = typeof q; } r"),
        string("undefined")
    );
}

#[test]
fn test_with_primitive_is_boxed() {
    assert_eq!(eval("with ('abc') { length }"), JsValue::Number(3.0));
}

#[test]
fn test_closure_captures_with_scope() {
    assert_eq!(
        eval("var o = { n: 1 }; var get; with (o) { get = function () { return n; }; } o.n = 9; get()"),
        JsValue::Number(9.0)
    );
}

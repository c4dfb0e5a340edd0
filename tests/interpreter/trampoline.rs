//! Deep nesting and recursion stay off the native stack

use super::{eval, string, throws_error};
use esrun::{EvalResult, JsValue, Runtime, Settings};

#[test]
fn test_long_addition_chain() {
    let terms = vec!["1"; 100_000].join(" + ");
    assert_eq!(eval(&terms), JsValue::Number(100_000.0));
}

#[test]
fn test_long_string_concatenation_chain() {
    let source = format!("''{}", " + 'a'".repeat(20_000));
    let JsValue::String(s) = eval(&source) else {
        panic!("expected a string");
    };
    assert_eq!(s.as_str().len(), 20_000);
}

#[test]
fn test_long_statement_list() {
    let source = format!("var n = 0;{}n", " n++;".repeat(50_000));
    assert_eq!(eval(&source), JsValue::Number(50_000.0));
}

#[test]
fn test_deep_recursion_within_limit() {
    assert_eq!(
        eval("function down(n) { return n === 0 ? 'bottom' : down(n - 1); } down(5000)"),
        string("bottom")
    );
    assert_eq!(
        eval("function sum(n) { if (n === 0) return 0; return n + sum(n - 1); } sum(3000)"),
        JsValue::Number(4_501_500.0)
    );
}

#[test]
fn test_runaway_recursion_is_a_range_error() {
    assert!(throws_error("function f() { return f(); } f()", "RangeError"));
    assert_eq!(
        eval("function f() { f(); } try { f(); } catch (e) { e instanceof RangeError }"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_native_only_recursion_is_a_range_error() {
    assert_eq!(
        eval("var a = []; a[0] = a; try { String(a); } catch (e) { e instanceof RangeError }"),
        JsValue::Boolean(true)
    );
    assert!(throws_error(
        "var o = { length: 1, toString: Array.prototype.join }; o[0] = o; o + ''",
        "Maximum call stack size exceeded"
    ));
}

#[test]
fn test_getter_recursion_is_a_range_error() {
    assert_eq!(
        eval("var o = { get x() { return this.x; } }; try { o.x; } catch (e) { e.name }"),
        string("RangeError")
    );
}

#[test]
fn test_call_depth_recovers_after_overflow() {
    let mut runtime = Runtime::new();
    let overflow = runtime.eval("var a = [1]; a.push(a); String(a)").unwrap();
    assert!(matches!(overflow, EvalResult::Throw(_)));
    let after = runtime
        .eval_value("function d(n) { return n ? d(n - 1) : [1, 2].join('-'); } d(9000)")
        .unwrap();
    assert_eq!(after, string("1-2"));
}

#[test]
fn test_native_calls_count_towards_depth_setting() {
    let settings = Settings {
        max_call_depth: 3,
        ..Settings::default()
    };
    let mut runtime = Runtime::with_settings(settings);
    assert_eq!(runtime.eval_value("Math.max(1, 2)").unwrap(), JsValue::Number(2.0));
    let nested = runtime.eval("[[[[1]]]].join()").unwrap();
    assert!(matches!(nested, EvalResult::Throw(_)));
}

#[test]
fn test_releasing_long_object_chain() {
    assert_eq!(
        eval("var o = null; for (var i = 0; i < 100000; i++) { o = { next: o }; } o = null; 'released'"),
        string("released")
    );
    assert_eq!(
        eval("var a = []; for (var i = 0; i < 100000; i++) { a = [a]; } a.length"),
        JsValue::Number(1.0)
    );
    assert_eq!(
        eval("var p = {}; for (var i = 0; i < 100000; i++) { p = Object.create(p); } p.missing"),
        JsValue::Undefined
    );
}

#[test]
fn test_releasing_runtime_with_long_object_chain() {
    let mut runtime = Runtime::new();
    runtime
        .eval_value("var head = null; for (var i = 0; i < 100000; i++) { head = { next: head, value: [i] }; }")
        .unwrap();
    drop(runtime);
}

#[test]
fn test_call_depth_setting() {
    let settings = Settings {
        max_call_depth: 10,
        ..Settings::default()
    };
    let mut runtime = Runtime::with_settings(settings);
    let shallow = runtime
        .eval_value("function d(n) { return n ? d(n - 1) : 'ok'; } d(5)")
        .unwrap();
    assert_eq!(shallow, string("ok"));
    let deep = runtime.eval("d(50)").unwrap();
    assert!(matches!(deep, EvalResult::Throw(_)));
}

#[test]
fn test_long_loop() {
    assert_eq!(
        eval("var total = 0; for (var i = 0; i < 20000; i++) { total += i; } total"),
        JsValue::Number(199_990_000.0)
    );
}

#[test]
fn test_mutual_recursion() {
    assert_eq!(
        eval(
            "function even(n) { return n === 0 ? true : odd(n - 1); }
             function odd(n) { return n === 0 ? false : even(n - 1); }
             even(4001)"
        ),
        JsValue::Boolean(false)
    );
}

#[test]
fn test_nested_syntax_up_to_the_parser_bound() {
    let parens = format!("{}7{}", "(".repeat(150), ")".repeat(150));
    assert_eq!(eval(&parens), JsValue::Number(7.0));
    let blocks = format!("{}'inner';{}", "{".repeat(150), "}".repeat(150));
    assert_eq!(eval(&blocks), string("inner"));
    let assignments = format!("var a;{} 1", " a =".repeat(150));
    assert_eq!(eval(&assignments), JsValue::Number(1.0));
    assert!(throws_error(&format!("{}1{}", "[".repeat(2_000), "]".repeat(2_000)), "SyntaxError"));
}

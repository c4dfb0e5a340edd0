//! Statements: if, loops, labels, switch, try/catch/finally

use super::{completion, eval, string, throws_error};
use esrun::JsValue;
use esrun::interpreter::CompletionKind;

#[test]
fn test_if_else() {
    assert_eq!(eval("var r; if (1) r = 'yes'; else r = 'no'; r"), string("yes"));
    assert_eq!(eval("var r; if (0) { r = 'yes'; } else { r = 'no'; } r"), string("no"));
    assert_eq!(eval("if (false) 1;"), JsValue::Undefined);
}

#[test]
fn test_while_and_do_while() {
    assert_eq!(eval("var i = 0; while (i < 5) i++; i"), JsValue::Number(5.0));
    assert_eq!(eval("var i = 10; do { i++; } while (i < 5); i"), JsValue::Number(11.0));
}

#[test]
fn test_for_loop() {
    assert_eq!(eval("var s = 0; for (var i = 1; i <= 10; i++) s += i; s"), JsValue::Number(55.0));
    assert_eq!(eval("var n = 0; for (;;) { if (++n === 3) break; } n"), JsValue::Number(3.0));
}

#[test]
fn test_loop_completion_value() {
    assert_eq!(eval("var i = 0; while (i < 3) { i++; 'v' + i; }"), string("v3"));
    assert_eq!(eval("for (var i = 0; i < 2; i++) { i; }"), JsValue::Number(1.0));
    assert_eq!(eval("while (false) { 1; }"), JsValue::Undefined);
}

#[test]
fn test_break_and_continue() {
    assert_eq!(
        eval("var s = 0; for (var i = 0; i < 10; i++) { if (i % 2) continue; if (i > 6) break; s += i; } s"),
        JsValue::Number(12.0)
    );
}

#[test]
fn test_labeled_break_and_continue() {
    assert_eq!(
        eval(
            "var hits = 0;
             outer: for (var i = 0; i < 3; i++) {
               for (var j = 0; j < 3; j++) {
                 if (j === 1) continue outer;
                 if (i === 2) break outer;
                 hits++;
               }
             }
             hits"
        ),
        JsValue::Number(2.0)
    );
    assert_eq!(eval("block: { 1; break block; 2; }"), JsValue::Number(1.0));
}

#[test]
fn test_for_in() {
    assert_eq!(
        eval("var keys = []; for (var k in { a: 1, b: 2, c: 3 }) keys.push(k); keys.join()"),
        string("a,b,c")
    );
    assert_eq!(
        eval("var keys = []; for (var k in [5, 6]) keys.push(k); keys.join()"),
        string("0,1")
    );
    assert_eq!(eval("var n = 0; for (var k in null) n++; n"), JsValue::Number(0.0));
}

#[test]
fn test_for_in_walks_prototype_once() {
    assert_eq!(
        eval(
            "function P() { this.own = 1; this.shared = 2; }
             P.prototype.shared = 3; P.prototype.inherited = 4;
             var keys = []; for (var k in new P()) keys.push(k); keys.join()"
        ),
        string("own,shared,inherited")
    );
}

#[test]
fn test_for_in_skips_deleted_keys() {
    assert_eq!(
        eval("var o = { a: 1, b: 2, c: 3 }; var seen = []; for (var k in o) { seen.push(k); delete o.c; } seen.join()"),
        string("a,b")
    );
}

#[test]
fn test_for_in_skips_non_enumerable() {
    assert_eq!(eval("var n = 0; for (var k in []) n++; n"), JsValue::Number(0.0));
    assert_eq!(
        eval("var o = {}; Object.defineProperty(o, 'h', { value: 1 }); var n = 0; for (var k in o) n++; n"),
        JsValue::Number(0.0)
    );
}

#[test]
fn test_for_in_with_member_target() {
    assert_eq!(eval("var o = {}; for (o.k in { z: 1 }); o.k"), string("z"));
}

#[test]
fn test_switch() {
    let program = |x: &str| {
        format!(
            "var out = '';
             switch ({x}) {{
               case 1: out += 'one';
               case 2: out += 'two'; break;
               default: out += 'other';
               case 3: out += 'three';
             }}
             out"
        )
    };
    assert_eq!(eval(&program("1")), string("onetwo"));
    assert_eq!(eval(&program("2")), string("two"));
    assert_eq!(eval(&program("3")), string("three"));
    assert_eq!(eval(&program("9")), string("otherthree"));
    assert_eq!(eval(&program("'1'")), string("otherthree"));
}

#[test]
fn test_switch_evaluates_cases_lazily() {
    assert_eq!(
        eval(
            "var tested = [];
             function c(v) { tested.push(v); return v; }
             switch (2) { case c(1): break; case c(2): break; case c(3): break; }
             tested.join()"
        ),
        string("1,2")
    );
}

#[test]
fn test_try_catch() {
    assert_eq!(eval("try { throw 'x'; } catch (e) { 'caught ' + e }"), string("caught x"));
    assert_eq!(eval("try { null.f; } catch (e) { e instanceof TypeError }"), JsValue::Boolean(true));
    assert_eq!(eval("var e = 'outer'; try { throw 1; } catch (e) {} e"), string("outer"));
}

#[test]
fn test_finally() {
    assert_eq!(eval("var log = []; try { log.push(1); } finally { log.push(2); } log.join()"), string("1,2"));
    assert_eq!(
        eval("function f() { try { return 'try'; } finally { 'ignored'; } } f()"),
        string("try")
    );
    assert_eq!(
        eval("function f() { try { return 'try'; } finally { return 'finally'; } } f()"),
        string("finally")
    );
    assert_eq!(
        eval("function f() { try { throw 1; } catch (e) { return 'c'; } finally { } } f()"),
        string("c")
    );
    assert!(throws_error("try { throw new Error('kept'); } finally { }", "kept"));
    assert_eq!(
        eval("var n = 0; for (var i = 0; i < 3; i++) { try { continue; } finally { n++; } } n"),
        JsValue::Number(3.0)
    );
}

#[test]
fn test_uncaught_throw_completion() {
    let c = completion("function f() { throw { code: 7 }; } f()");
    assert_eq!(c.kind, CompletionKind::Throw);
}

#[test]
fn test_debugger_and_empty_statements() {
    assert_eq!(eval("debugger; ; 5"), JsValue::Number(5.0));
}

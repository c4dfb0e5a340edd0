//! Array literals, the special `length` property and Array.prototype methods

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_array_literal_and_length() {
    assert_eq!(eval("[1, 2, 3].length"), JsValue::Number(3.0));
    assert_eq!(eval("[].length"), JsValue::Number(0.0));
    assert_eq!(eval("[1, , 3].length"), JsValue::Number(3.0));
    assert_eq!(eval("1 in [1, , 3]"), JsValue::Boolean(false));
    assert_eq!(eval("[1, 2, ].length"), JsValue::Number(2.0));
}

#[test]
fn test_index_write_grows_length() {
    assert_eq!(eval("var a = []; a[4] = 'x'; a.length"), JsValue::Number(5.0));
    assert_eq!(eval("var a = [1]; a['2'] = 3; a.length"), JsValue::Number(3.0));
    assert_eq!(eval("var a = [1]; a.foo = 3; a.length"), JsValue::Number(1.0));
}

#[test]
fn test_length_write_truncates() {
    assert_eq!(eval("var a = [1, 2, 3, 4]; a.length = 2; a.join()"), string("1,2"));
    assert_eq!(eval("var a = [1, 2, 3]; a.length = 1; 2 in a"), JsValue::Boolean(false));
    assert!(throws_error("var a = []; a.length = -1", "RangeError"));
    assert!(throws_error("var a = []; a.length = 1.5", "Invalid array length"));
}

#[test]
fn test_non_writable_length_blocks_growth() {
    assert_eq!(
        eval("var a = [1]; Object.defineProperty(a, 'length', { writable: false }); a[5] = 1; a.length"),
        JsValue::Number(1.0)
    );
    assert_eq!(
        eval("var a = [1]; Object.defineProperty(a, 'length', { writable: false }); a[5] = 1; 5 in a"),
        JsValue::Boolean(false)
    );
}

#[test]
fn test_array_constructor() {
    assert_eq!(eval("new Array(3).length"), JsValue::Number(3.0));
    assert_eq!(eval("Array(1, 2).join('-')"), string("1-2"));
    assert_eq!(eval("new Array('3').length"), JsValue::Number(1.0));
    assert!(throws_error("new Array(-1)", "RangeError"));
    assert!(throws_error("new Array(1.5)", "Invalid array length"));
    assert_eq!(eval("Array.isArray([])"), JsValue::Boolean(true));
    assert_eq!(eval("Array.isArray({ length: 0 })"), JsValue::Boolean(false));
}

#[test]
fn test_push_pop() {
    assert_eq!(eval("var a = [1]; a.push(2, 3)"), JsValue::Number(3.0));
    assert_eq!(eval("var a = [1, 2]; a.pop()"), JsValue::Number(2.0));
    assert_eq!(eval("var a = [1, 2]; a.pop(); a.length"), JsValue::Number(1.0));
    assert_eq!(eval("[].pop()"), JsValue::Undefined);
}

#[test]
fn test_shift_unshift() {
    assert_eq!(eval("var a = [1, 2, 3]; a.shift()"), JsValue::Number(1.0));
    assert_eq!(eval("var a = [1, 2, 3]; a.shift(); a.join()"), string("2,3"));
    assert_eq!(eval("var a = [3]; a.unshift(1, 2)"), JsValue::Number(3.0));
    assert_eq!(eval("var a = [3]; a.unshift(1, 2); a.join()"), string("1,2,3"));
}

#[test]
fn test_join_and_to_string() {
    assert_eq!(eval("[1, 2, 3].join()"), string("1,2,3"));
    assert_eq!(eval("[1, 2, 3].join(' | ')"), string("1 | 2 | 3"));
    assert_eq!(eval("[1, null, undefined, 2].join()"), string("1,,,2"));
    assert_eq!(eval("String([1, [2, 3]])"), string("1,2,3"));
}

#[test]
fn test_concat_and_slice() {
    assert_eq!(eval("[1].concat([2, 3], 4).join()"), string("1,2,3,4"));
    assert_eq!(eval("[1, 2, 3, 4].slice(1, 3).join()"), string("2,3"));
    assert_eq!(eval("[1, 2, 3, 4].slice(-2).join()"), string("3,4"));
    assert_eq!(eval("[1, 2, 3].slice().length"), JsValue::Number(3.0));
}

#[test]
fn test_reverse_and_index_of() {
    assert_eq!(eval("[1, 2, 3].reverse().join()"), string("3,2,1"));
    assert_eq!(eval("['a', 'b', 'a'].indexOf('a', 1)"), JsValue::Number(2.0));
    assert_eq!(eval("[1, 2].indexOf('1')"), JsValue::Number(-1.0));
}

#[test]
fn test_iteration_methods() {
    assert_eq!(
        eval("var sum = 0; [1, 2, 3].forEach(function (x) { sum += x; }); sum"),
        JsValue::Number(6.0)
    );
    assert_eq!(eval("[1, 2, 3].map(function (x, i) { return x * i; }).join()"), string("0,2,6"));
    assert_eq!(eval("[1, 2, 3, 4].filter(function (x) { return x % 2; }).join()"), string("1,3"));
    assert_eq!(eval("[1, 2, 3].reduce(function (a, b) { return a + b; })"), JsValue::Number(6.0));
    assert_eq!(eval("[1, 2, 3].reduce(function (a, b) { return a + b; }, 10)"), JsValue::Number(16.0));
    assert_eq!(
        eval("['a', 'b', 'c'].reduceRight(function (a, b) { return a + b; })"),
        string("cba")
    );
    assert!(throws_error("[].reduce(function (a, b) { return a; })", "TypeError"));
    assert!(throws_error("[1].map(3)", "TypeError"));
}

#[test]
fn test_for_each_this_arg() {
    assert_eq!(
        eval("var o = { n: 0 }; [1, 2].forEach(function (x) { this.n += x; }, o); o.n"),
        JsValue::Number(3.0)
    );
}

#[test]
fn test_generic_methods_on_array_likes() {
    assert_eq!(
        eval("Array.prototype.join.call({ length: 2, 0: 'a', 1: 'b' }, '+')"),
        string("a+b")
    );
}

//! Object literals, property attributes, prototypes and the Object builtins

use super::{eval, string, throws_error};
use esrun::JsValue;

#[test]
fn test_object_literal() {
    assert_eq!(eval("var o = { a: 1, 'b c': 2, 3: 'three' }; o.a + o['b c']"), JsValue::Number(3.0));
    assert_eq!(eval("({ 3: 'three' })[3]"), string("three"));
    assert_eq!(eval("({ a: 1, a: 2 }).a"), JsValue::Number(2.0));
}

#[test]
fn test_getters_and_setters() {
    assert_eq!(eval("var o = { get double() { return 2 * 21; } }; o.double"), JsValue::Number(42.0));
    assert_eq!(
        eval("var o = { v: 0, set value(x) { this.v = x * 10; } }; o.value = 4; o.v"),
        JsValue::Number(40.0)
    );
    assert_eq!(eval("var o = { get only() { return 1; } }; o.only = 5; o.only"), JsValue::Number(1.0));
}

#[test]
fn test_property_enumeration_order() {
    assert_eq!(
        eval("Object.keys({ b: 1, 2: 1, a: 1, 1: 1 }).join()"),
        string("1,2,b,a")
    );
}

#[test]
fn test_prototype_chain_lookup() {
    assert_eq!(
        eval("var base = { greet: 'hi' }; var child = Object.create(base); child.greet"),
        string("hi")
    );
    assert_eq!(
        eval("var base = { v: 1 }; var child = Object.create(base); child.v = 2; base.v"),
        JsValue::Number(1.0)
    );
    assert_eq!(eval("Object.getPrototypeOf(Object.create(null))"), JsValue::Null);
    assert_eq!(eval("var o = Object.create(null); o.toString"), JsValue::Undefined);
}

#[test]
fn test_inherited_read_only_blocks_put() {
    assert_eq!(
        eval(
            "var base = {}; Object.defineProperty(base, 'k', { value: 1 });
             var child = Object.create(base); child.k = 2; child.hasOwnProperty('k')"
        ),
        JsValue::Boolean(false)
    );
}

#[test]
fn test_inherited_setter_is_called() {
    assert_eq!(
        eval(
            "var log = [];
             var base = { set k(v) { log.push(v); } };
             var child = Object.create(base); child.k = 7;
             log.join() + ':' + child.hasOwnProperty('k')"
        ),
        string("7:false")
    );
}

#[test]
fn test_define_property_defaults() {
    assert_eq!(
        eval(
            "var o = {}; Object.defineProperty(o, 'x', { value: 1 });
             var d = Object.getOwnPropertyDescriptor(o, 'x');
             [d.value, d.writable, d.enumerable, d.configurable].join()"
        ),
        string("1,false,false,false")
    );
}

#[test]
fn test_define_property_validation() {
    assert!(throws_error(
        "var o = {}; Object.defineProperty(o, 'x', { value: 1 }); Object.defineProperty(o, 'x', { value: 2 });",
        "TypeError"
    ));
    assert!(throws_error(
        "var o = {}; Object.defineProperty(o, 'x', { value: 1 }); Object.defineProperty(o, 'x', { enumerable: true });",
        "TypeError"
    ));
    assert!(throws_error(
        "Object.defineProperty({}, 'x', { value: 1, get: function () {} })",
        "TypeError"
    ));
    assert_eq!(
        eval(
            "var o = {}; Object.defineProperty(o, 'x', { value: 1 });
             Object.defineProperty(o, 'x', { value: 1 }); o.x"
        ),
        JsValue::Number(1.0)
    );
    assert_eq!(
        eval(
            "var o = {}; Object.defineProperty(o, 'x', { value: 1, writable: true });
             Object.defineProperty(o, 'x', { value: 5 }); o.x"
        ),
        JsValue::Number(5.0)
    );
}

#[test]
fn test_configurable_property_converts_kind() {
    assert_eq!(
        eval(
            "var o = { x: 1 };
             Object.defineProperty(o, 'x', { get: function () { return 'acc'; } });
             var d = Object.getOwnPropertyDescriptor(o, 'x');
             o.x + ':' + d.enumerable + ':' + ('value' in d)"
        ),
        string("acc:true:false")
    );
}

#[test]
fn test_define_properties() {
    assert_eq!(
        eval("var o = Object.defineProperties({}, { a: { value: 1, enumerable: true }, b: { value: 2 } }); Object.keys(o).join() + o.b"),
        string("a2")
    );
}

#[test]
fn test_non_extensible() {
    assert_eq!(eval("var o = Object.preventExtensions({}); o.x = 1; o.x"), JsValue::Undefined);
    assert_eq!(eval("Object.isExtensible(Object.preventExtensions({}))"), JsValue::Boolean(false));
    assert!(throws_error(
        "Object.defineProperty(Object.preventExtensions({}), 'x', { value: 1 })",
        "TypeError"
    ));
}

#[test]
fn test_freeze_and_seal() {
    assert_eq!(eval("Object.isFrozen(Object.freeze({ a: 1 }))"), JsValue::Boolean(true));
    assert_eq!(eval("Object.isFrozen({})"), JsValue::Boolean(false));
    assert_eq!(eval("var o = Object.seal({ a: 1 }); o.a = 2; delete o.a; o.a"), JsValue::Number(2.0));
}

#[test]
fn test_delete() {
    assert_eq!(eval("var o = { a: 1 }; delete o.a; 'a' in o"), JsValue::Boolean(false));
    assert_eq!(eval("var o = { a: 1 }; delete o.a"), JsValue::Boolean(true));
    assert_eq!(eval("delete ({}).missing"), JsValue::Boolean(true));
    assert_eq!(eval("var v = 1; delete v"), JsValue::Boolean(false));
    assert_eq!(eval("implicitGlobal = 1; delete implicitGlobal"), JsValue::Boolean(true));
    assert_eq!(eval("delete 5"), JsValue::Boolean(true));
}

#[test]
fn test_object_prototype_methods() {
    assert_eq!(eval("({ a: 1 }).hasOwnProperty('a')"), JsValue::Boolean(true));
    assert_eq!(eval("({}).hasOwnProperty('toString')"), JsValue::Boolean(false));
    assert_eq!(eval("Object.prototype.isPrototypeOf([])"), JsValue::Boolean(true));
    assert_eq!(eval("[].propertyIsEnumerable('length')"), JsValue::Boolean(false));
    assert_eq!(eval("Object.prototype.toString.call([])"), string("[object Array]"));
    assert_eq!(eval("Object.prototype.toString.call(null)"), string("[object Null]"));
    assert_eq!(eval("Object.prototype.toString.call(undefined)"), string("[object Undefined]"));
    assert_eq!(eval("Object.prototype.toString.call(1)"), string("[object Number]"));
    assert_eq!(eval("var o = {}; o.valueOf() === o"), JsValue::Boolean(true));
}

#[test]
fn test_object_constructor() {
    assert_eq!(eval("typeof Object(1)"), string("object"));
    assert_eq!(eval("Object(1) + 1"), JsValue::Number(2.0));
    assert_eq!(eval("var o = {}; Object(o) === o"), JsValue::Boolean(true));
    assert_eq!(eval("Object.getPrototypeOf(new Object()) === Object.prototype"), JsValue::Boolean(true));
    assert_eq!(eval("Object.getOwnPropertyNames([1]).join()"), string("0,length"));
    assert!(throws_error("Object.getPrototypeOf(1)", "TypeError"));
    assert!(throws_error("Object.create(1)", "TypeError"));
}

#[test]
fn test_string_objects_have_virtual_indices() {
    assert_eq!(eval("new String('abc')[1]"), string("b"));
    assert_eq!(eval("new String('abc').length"), JsValue::Number(3.0));
    assert_eq!(eval("'abc'[2]"), string("c"));
    assert_eq!(eval("var s = new String('ab'); s[0] = 'z'; s[0]"), string("a"));
    assert_eq!(eval("Object.keys(new String('ab')).join()"), string("0,1"));
}

//! Error constructors, thrown values and engine-raised errors

use super::{eval, eval_result, string, throws_error};
use esrun::{JsError, JsValue};

#[test]
fn test_error_constructor() {
    assert_eq!(eval("new Error('boom').message"), string("boom"));
    assert_eq!(eval("Error('boom').message"), string("boom"));
    assert_eq!(eval("new Error().message"), string(""));
    assert_eq!(eval("new TypeError('t').name"), string("TypeError"));
    assert_eq!(eval("String(new RangeError('too far'))"), string("RangeError: too far"));
    assert_eq!(eval("String(new Error())"), string("Error"));
}

#[test]
fn test_error_hierarchy() {
    assert_eq!(eval("new TypeError() instanceof Error"), JsValue::Boolean(true));
    assert_eq!(eval("new URIError() instanceof URIError"), JsValue::Boolean(true));
    assert_eq!(eval("new EvalError() instanceof TypeError"), JsValue::Boolean(false));
    assert_eq!(
        eval("Object.prototype.toString.call(new SyntaxError())"),
        string("[object Error]")
    );
    assert_eq!(eval("ReferenceError.prototype.name"), string("ReferenceError"));
}

#[test]
fn test_error_message_is_not_enumerable() {
    assert_eq!(eval("Object.keys(new Error('m')).length"), JsValue::Number(0.0));
}

#[test]
fn test_error_to_string_uses_own_fields() {
    assert_eq!(
        eval("var e = new Error('m'); e.name = 'Custom'; e.toString()"),
        string("Custom: m")
    );
    assert_eq!(
        eval("Error.prototype.toString.call({ name: 'N', message: '' })"),
        string("N")
    );
}

#[test]
fn test_engine_errors_are_catchable_instances() {
    assert_eq!(eval("try { undefinedName; } catch (e) { e instanceof ReferenceError }"), JsValue::Boolean(true));
    assert_eq!(eval("try { (1)(); } catch (e) { e.name }"), string("TypeError"));
    assert_eq!(eval("try { new Array(-1); } catch (e) { e instanceof RangeError }"), JsValue::Boolean(true));
    assert_eq!(eval("try { eval('var'); } catch (e) { e instanceof SyntaxError }"), JsValue::Boolean(true));
}

#[test]
fn test_throw_any_value() {
    assert_eq!(eval("try { throw 42; } catch (e) { e }"), JsValue::Number(42.0));
    assert_eq!(eval("try { throw { code: 1 }; } catch (e) { e.code }"), JsValue::Number(1.0));
    assert_eq!(eval("try { throw undefined; } catch (e) { typeof e }"), string("undefined"));
}

#[test]
fn test_throw_unwinds_calls() {
    assert_eq!(
        eval(
            "function inner() { throw new Error('deep'); }
             function middle() { inner(); return 'unreached'; }
             try { middle(); } catch (e) { e.message }"
        ),
        string("deep")
    );
}

#[test]
fn test_uncaught_error_reaches_host() {
    let err = eval_result("throw new TypeError('bad thing')").unwrap_err();
    assert_eq!(err.to_string(), "Uncaught TypeError: bad thing");
    let value = err.thrown_value().cloned().unwrap_or_default();
    assert!(value.is_object());

    let err = eval_result("throw 'plain'").unwrap_err();
    assert!(matches!(err, JsError::Thrown { ref message, .. } if message == "plain"));
}

#[test]
fn test_member_access_on_nullish() {
    assert!(throws_error("var u; u.x", "Cannot read property 'x' of undefined"));
    assert!(throws_error("null[0]", "TypeError"));
}

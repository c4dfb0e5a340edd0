//! Date objects on a controlled clock

use std::rc::Rc;

use super::{eval, string, throws_error};
use esrun::platform::{FixedTimeProvider, TimeProvider};
use esrun::{JsValue, Runtime, Settings};

/// 2001-09-09T01:46:40.000Z
const BILLENNIUM: f64 = 1e12;

fn runtime_at(now: f64) -> (Runtime, Rc<FixedTimeProvider>) {
    let clock = Rc::new(FixedTimeProvider::new(now));
    let provider: Rc<dyn TimeProvider> = clock.clone();
    let runtime = Runtime::with_clock(Settings::default(), provider);
    (runtime, clock)
}

fn eval_at(now: f64, source: &str) -> JsValue {
    let (mut runtime, _clock) = runtime_at(now);
    runtime.eval_value(source).unwrap()
}

#[test]
fn test_now_reads_host_clock() {
    assert_eq!(eval_at(BILLENNIUM, "Date.now()"), JsValue::Number(BILLENNIUM));
    assert_eq!(eval_at(BILLENNIUM, "new Date().getTime()"), JsValue::Number(BILLENNIUM));
    assert_eq!(eval_at(1500.75, "Date.now()"), JsValue::Number(1500.0));
}

#[test]
fn test_clock_is_monotonic_across_runs() {
    let (mut runtime, clock) = runtime_at(BILLENNIUM);
    assert_eq!(runtime.eval_value("Date.now()").unwrap(), JsValue::Number(BILLENNIUM));
    clock.set(0.0);
    assert_eq!(runtime.eval_value("Date.now()").unwrap(), JsValue::Number(BILLENNIUM));
    clock.advance(BILLENNIUM + 10.0);
    assert_eq!(runtime.eval_value("Date.now()").unwrap(), JsValue::Number(BILLENNIUM + 10.0));
}

#[test]
fn test_date_called_as_function_returns_string() {
    assert_eq!(
        eval_at(BILLENNIUM, "Date()"),
        string("Sun Sep 09 2001 01:46:40 GMT+0000 (UTC)")
    );
    assert_eq!(eval_at(BILLENNIUM, "typeof Date(2000, 1)"), string("string"));
}

#[test]
fn test_components() {
    let source = "var d = new Date(1e12);
                  [d.getFullYear(), d.getMonth(), d.getDate(), d.getDay(),
                   d.getHours(), d.getMinutes(), d.getSeconds(), d.getMilliseconds()].join()";
    assert_eq!(eval(source), string("2001,8,9,0,1,46,40,0"));
    assert_eq!(eval("new Date(1e12).getUTCHours()"), JsValue::Number(1.0));
    assert_eq!(eval("new Date(0).getTimezoneOffset()"), JsValue::Number(0.0));
}

#[test]
fn test_construct_from_components() {
    assert_eq!(
        eval("new Date(2020, 1, 29, 12, 30).toISOString()"),
        string("2020-02-29T12:30:00.000Z")
    );
    assert_eq!(eval("new Date(99, 0).getFullYear()"), JsValue::Number(1999.0));
    assert_eq!(eval("new Date(2020, 12, 1).getMonth()"), JsValue::Number(0.0));
    assert_eq!(eval("Date.UTC(1970, 0, 1, 0, 0, 1)"), JsValue::Number(1000.0));
}

#[test]
fn test_construct_from_string() {
    assert_eq!(eval("new Date('2001-09-09T01:46:40Z').getTime()"), JsValue::Number(BILLENNIUM));
    assert_eq!(eval("Date.parse('1970-01-02')"), JsValue::Number(86_400_000.0));
    assert_eq!(eval("Date.parse('1970-01-01T01:00+01:00')"), JsValue::Number(0.0));
    assert_eq!(eval("isNaN(Date.parse('not a date'))"), JsValue::Boolean(true));
}

#[test]
fn test_invalid_dates() {
    assert_eq!(eval("String(new Date(NaN))"), string("Invalid Date"));
    assert_eq!(eval("isNaN(new Date(8.64e15 + 1).getTime())"), JsValue::Boolean(true));
    assert_eq!(eval("isNaN(new Date(NaN).getFullYear())"), JsValue::Boolean(true));
    assert_eq!(eval("new Date(NaN).toJSON()"), JsValue::Null);
    assert!(throws_error("new Date(NaN).toISOString()", "RangeError"));
}

#[test]
fn test_formatting() {
    assert_eq!(eval("new Date(0).toISOString()"), string("1970-01-01T00:00:00.000Z"));
    assert_eq!(eval("new Date(0).toUTCString()"), string("Thu, 01 Jan 1970 00:00:00 GMT"));
    assert_eq!(eval("new Date(0).toString()"), string("Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"));
    assert_eq!(eval("new Date(1e12).toJSON()"), string("2001-09-09T01:46:40.000Z"));
}

#[test]
fn test_set_time() {
    assert_eq!(eval("var d = new Date(0); d.setTime(5000); d.getSeconds()"), JsValue::Number(5.0));
    assert!(throws_error("Date.prototype.getTime.call({})", "TypeError"));
}

#[test]
fn test_date_conversions() {
    assert_eq!(eval("+new Date(42)"), JsValue::Number(42.0));
    assert_eq!(eval("new Date(0) + ''"), string("Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"));
    assert_eq!(eval("new Date(3) - new Date(1)"), JsValue::Number(2.0));
    assert_eq!(eval("Object.prototype.toString.call(new Date(0))"), string("[object Date]"));
}

//! `Date` (ES5 15.9)
//!
//! Time values are milliseconds since the epoch in UTC. The local time zone
//! is UTC, so local and UTC accessors agree. Calendar arithmetic follows the
//! day/year/month formulas of ES5 15.9.1.

use std::rc::Rc;

use crate::compute::defer;
use crate::value::{CheapClone, ClassTag, HostCall, InternalSlot, JsValue, to_integer};

use crate::interpreter::conversion::{Hint, with_number, with_primitive};
use crate::interpreter::realm::ConstructorDef;
use crate::interpreter::{Context, ErrorKind, Eval, EvalExt, Realm, throw_error, value, with_realm};

use super::{boxed, numbers, this_primitive};

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
const MAX_TIME: f64 = 8.64e15;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const GETTERS: &[(&str, fn(HostCall) -> Eval)] = &[
    ("getFullYear", get_full_year),
    ("getUTCFullYear", get_full_year),
    ("getMonth", get_month),
    ("getUTCMonth", get_month),
    ("getDate", get_date),
    ("getUTCDate", get_date),
    ("getDay", get_day),
    ("getUTCDay", get_day),
    ("getHours", get_hours),
    ("getUTCHours", get_hours),
    ("getMinutes", get_minutes),
    ("getUTCMinutes", get_minutes),
    ("getSeconds", get_seconds),
    ("getUTCSeconds", get_seconds),
    ("getMilliseconds", get_milliseconds),
    ("getUTCMilliseconds", get_milliseconds),
    ("getTimezoneOffset", get_timezone_offset),
];

pub fn install(realm: &Rc<Realm>) {
    let proto = realm.date_prototype.cheap_clone();
    realm.register_constructor(
        &realm.global,
        ConstructorDef {
            name: "Date",
            arity: 7,
            prototype: proto.cheap_clone(),
            statics: &[("now", date_now, 0), ("UTC", date_utc, 7), ("parse", date_parse, 1)],
            call: date_call,
            construct: Some(date_construct),
        },
    );
    realm.register_function(&proto, "getTime", 0, date_value_of);
    realm.register_function(&proto, "valueOf", 0, date_value_of);
    realm.register_function(&proto, "setTime", 1, date_set_time);
    realm.register_function(&proto, "toISOString", 0, date_to_iso_string);
    realm.register_function(&proto, "toJSON", 1, date_to_json);
    realm.register_function(&proto, "toString", 0, date_to_string);
    realm.register_function(&proto, "toUTCString", 0, date_to_utc_string);
    for (name, hook) in GETTERS {
        realm.register_function(&proto, name, 0, *hook);
    }
}

// ─── Calendar arithmetic (ES5 15.9.1) ─────────────────────────────────────────

fn day(t: f64) -> f64 {
    libm::floor(t / MS_PER_DAY)
}

fn time_within_day(t: f64) -> f64 {
    t.rem_euclid(MS_PER_DAY)
}

fn days_in_year(y: f64) -> f64 {
    if y % 4.0 != 0.0 {
        365.0
    } else if y % 100.0 != 0.0 {
        366.0
    } else if y % 400.0 != 0.0 {
        365.0
    } else {
        366.0
    }
}

fn day_from_year(y: f64) -> f64 {
    365.0 * (y - 1970.0) + libm::floor((y - 1969.0) / 4.0) - libm::floor((y - 1901.0) / 100.0)
        + libm::floor((y - 1601.0) / 400.0)
}

fn time_from_year(y: f64) -> f64 {
    MS_PER_DAY * day_from_year(y)
}

pub fn year_from_time(t: f64) -> f64 {
    let mut y = libm::floor(t / (MS_PER_DAY * 365.2425)) + 1970.0;
    while time_from_year(y) > t {
        y -= 1.0;
    }
    while time_from_year(y + 1.0) <= t {
        y += 1.0;
    }
    y
}

fn in_leap_year(t: f64) -> bool {
    days_in_year(year_from_time(t)) == 366.0
}

fn day_within_year(t: f64) -> f64 {
    day(t) - day_from_year(year_from_time(t))
}

/// Day-of-year on which each month starts, for a common year
const MONTH_STARTS: [f64; 13] = [
    0.0, 31.0, 59.0, 90.0, 120.0, 151.0, 181.0, 212.0, 243.0, 273.0, 304.0, 334.0, 365.0,
];

fn month_start(month: usize, leap: bool) -> f64 {
    let start = MONTH_STARTS.get(month).copied().unwrap_or(365.0);
    if leap && month >= 2 { start + 1.0 } else { start }
}

pub fn month_from_time(t: f64) -> f64 {
    let d = day_within_year(t);
    let leap = in_leap_year(t);
    (0..12)
        .find(|&m| d < month_start(m + 1, leap))
        .map_or(11.0, |m| m as f64)
}

pub fn date_from_time(t: f64) -> f64 {
    let month = month_from_time(t) as usize;
    day_within_year(t) - month_start(month, in_leap_year(t)) + 1.0
}

fn week_day(t: f64) -> f64 {
    (day(t) + 4.0).rem_euclid(7.0)
}

fn hour_from_time(t: f64) -> f64 {
    libm::floor(time_within_day(t) / MS_PER_HOUR)
}

fn min_from_time(t: f64) -> f64 {
    libm::floor(time_within_day(t) / MS_PER_MINUTE) % 60.0
}

fn sec_from_time(t: f64) -> f64 {
    libm::floor(time_within_day(t) / MS_PER_SECOND) % 60.0
}

fn ms_from_time(t: f64) -> f64 {
    time_within_day(t) % MS_PER_SECOND
}

/// MakeTime (15.9.1.11)
pub fn make_time(hour: f64, min: f64, sec: f64, ms: f64) -> f64 {
    if ![hour, min, sec, ms].iter().all(|n| n.is_finite()) {
        return f64::NAN;
    }
    to_integer(hour) * MS_PER_HOUR
        + to_integer(min) * MS_PER_MINUTE
        + to_integer(sec) * MS_PER_SECOND
        + to_integer(ms)
}

/// MakeDay (15.9.1.12)
pub fn make_day(year: f64, month: f64, date: f64) -> f64 {
    if ![year, month, date].iter().all(|n| n.is_finite()) {
        return f64::NAN;
    }
    let (year, month, date) = (to_integer(year), to_integer(month), to_integer(date));
    let ym = year + libm::floor(month / 12.0);
    let mn = month.rem_euclid(12.0);
    if ym.abs() > 400_000.0 {
        return f64::NAN;
    }
    let leap = days_in_year(ym) == 366.0;
    day_from_year(ym) + month_start(mn as usize, leap) + date - 1.0
}

/// MakeDate (15.9.1.13)
pub fn make_date(day: f64, time: f64) -> f64 {
    if !day.is_finite() || !time.is_finite() {
        return f64::NAN;
    }
    day * MS_PER_DAY + time
}

/// TimeClip (15.9.1.14)
pub fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        return f64::NAN;
    }
    // ToInteger, normalising -0 to +0
    to_integer(t) + 0.0
}

/// Time value from the component form `(year, month[, date, h, m, s, ms])`
fn from_components(parts: &[f64]) -> f64 {
    let part = |i: usize, default: f64| parts.get(i).copied().unwrap_or(default);
    let mut year = part(0, f64::NAN);
    if year.is_finite() {
        let integer = to_integer(year);
        if (0.0..=99.0).contains(&integer) {
            year = 1900.0 + integer;
        }
    }
    let day = make_day(year, part(1, 0.0), part(2, 1.0));
    let time = make_time(part(3, 0.0), part(4, 0.0), part(5, 0.0), part(6, 0.0));
    make_date(day, time)
}

// ─── Formatting and parsing ───────────────────────────────────────────────────

pub fn iso_string(t: f64) -> String {
    let year = year_from_time(t);
    let year = if (0.0..=9999.0).contains(&year) {
        format!("{year:04}")
    } else if year < 0.0 {
        format!("-{:06}", -year)
    } else {
        format!("+{year:06}")
    };
    format!(
        "{year}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        month_from_time(t) + 1.0,
        date_from_time(t),
        hour_from_time(t),
        min_from_time(t),
        sec_from_time(t),
        ms_from_time(t),
    )
}

fn clock_string(t: f64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        hour_from_time(t),
        min_from_time(t),
        sec_from_time(t)
    )
}

fn names(t: f64) -> (&'static str, &'static str) {
    let day_name = DAY_NAMES.get(week_day(t) as usize).copied().unwrap_or("Sun");
    let month_name = MONTH_NAMES
        .get(month_from_time(t) as usize)
        .copied()
        .unwrap_or("Jan");
    (day_name, month_name)
}

pub fn display_string(t: f64) -> String {
    if t.is_nan() {
        return "Invalid Date".to_string();
    }
    let (day_name, month_name) = names(t);
    format!(
        "{day_name} {month_name} {:02} {:04} {} GMT+0000 (UTC)",
        date_from_time(t),
        year_from_time(t),
        clock_string(t)
    )
}

fn utc_string(t: f64) -> String {
    if t.is_nan() {
        return "Invalid Date".to_string();
    }
    let (day_name, month_name) = names(t);
    format!(
        "{day_name}, {:02} {month_name} {:04} {} GMT",
        date_from_time(t),
        year_from_time(t),
        clock_string(t)
    )
}

/// Fixed-width decimal field of the ISO format
fn field(text: &str, width: usize) -> Option<(f64, &str)> {
    let digits = text.get(..width)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: f64 = digits.parse().ok()?;
    Some((n, text.get(width..)?))
}

/// `sep` followed by a fixed-width field, if `text` starts with `sep`
fn separated(text: &str, sep: char, width: usize) -> Option<Option<(f64, &str)>> {
    match text.strip_prefix(sep) {
        Some(rest) => field(rest, width).map(Some),
        None => Some(None),
    }
}

/// The ES5 date time string format (15.9.1.15):
/// `YYYY[-MM[-DD]][THH:mm[:ss[.sss]][Z|±HH:mm]]`, with `±YYYYYY` years
pub fn parse_iso(text: &str) -> Option<f64> {
    let text = text.trim();
    let (year, mut rest) = match text.strip_prefix(['+', '-']) {
        Some(after_sign) => {
            let (n, rest) = field(after_sign, 6)?;
            (if text.starts_with('-') { -n } else { n }, rest)
        }
        None => field(text, 4)?,
    };
    let mut month = 1.0;
    let mut date = 1.0;
    if let Some((m, r)) = separated(rest, '-', 2)? {
        month = m;
        rest = r;
        if let Some((d, r)) = separated(rest, '-', 2)? {
            date = d;
            rest = r;
        }
    }
    let (mut hour, mut minute, mut second, mut millis) = (0.0, 0.0, 0.0, 0.0);
    let mut offset = 0.0;
    if let Some(time) = rest.strip_prefix('T') {
        let (h, r) = field(time, 2)?;
        let (m, r) = separated(r, ':', 2)??;
        (hour, minute) = (h, m);
        rest = r;
        if let Some((s, r)) = separated(rest, ':', 2)? {
            second = s;
            rest = r;
            if let Some((ms, r)) = separated(rest, '.', 3)? {
                millis = ms;
                rest = r;
            }
        }
        if let Some(r) = rest.strip_prefix('Z') {
            rest = r;
        } else if let Some(zone) = rest.strip_prefix(['+', '-']) {
            let (oh, r) = field(zone, 2)?;
            let (om, r) = separated(r, ':', 2)??;
            let sign = if rest.starts_with('-') { -1.0 } else { 1.0 };
            offset = sign * (oh * MS_PER_HOUR + om * MS_PER_MINUTE);
            rest = r;
        }
    }
    let valid = rest.is_empty()
        && (1.0..=12.0).contains(&month)
        && (1.0..=31.0).contains(&date)
        && hour <= 24.0
        && minute < 60.0
        && second < 60.0;
    if !valid {
        return None;
    }
    let day = make_day(year, month - 1.0, date);
    Some(time_clip(make_date(day, make_time(hour, minute, second, millis)) - offset))
}

pub fn parse(text: &str) -> f64 {
    parse_iso(text).unwrap_or(f64::NAN)
}

// ─── Constructor and statics ──────────────────────────────────────────────────

fn now() -> Eval {
    defer(|ctx: &mut Context| value(libm::floor(ctx.now())))
}

/// `Date()` called as a function ignores its arguments (15.9.2.1)
fn date_call(_call: HostCall) -> Eval {
    now().and_value(|t| match t {
        JsValue::Number(t) => value(display_string(t)),
        _ => value("Invalid Date"),
    })
}

fn new_date(t: f64) -> Eval {
    with_realm(move |realm| {
        value(boxed(&realm.date_prototype, ClassTag::Date, JsValue::Number(time_clip(t))))
    })
}

/// `new Date()`, `new Date(value)`, `new Date(year, month[, ...])` (15.9.3)
fn date_construct(call: HostCall) -> Eval {
    match call.args.len() {
        0 => now().and_value(|t| match t {
            JsValue::Number(t) => new_date(t),
            _ => new_date(f64::NAN),
        }),
        1 => with_primitive(call.args.get(0), Hint::Default, |primitive| match primitive {
            JsValue::String(s) => new_date(parse(s.as_str())),
            other => with_number(other, new_date),
        }),
        _ => numbers(call.args.into_vec()).and_values(|parts| new_date(from_components(&as_numbers(&parts)))),
    }
}

fn as_numbers(values: &[JsValue]) -> Vec<f64> {
    values
        .iter()
        .map(|v| match v {
            JsValue::Number(n) => *n,
            _ => f64::NAN,
        })
        .collect()
}

fn date_now(_call: HostCall) -> Eval {
    now()
}

fn date_utc(call: HostCall) -> Eval {
    numbers(call.args.into_vec())
        .and_values(|parts| value(time_clip(from_components(&as_numbers(&parts)))))
}

fn date_parse(call: HostCall) -> Eval {
    with_primitive(call.args.get(0), Hint::String, |v| value(parse(v.to_string_primitive().as_str())))
}

// ─── Prototype ────────────────────────────────────────────────────────────────

fn this_time(this: &JsValue) -> Result<f64, Eval> {
    match this_primitive(this, ClassTag::Date) {
        Some(JsValue::Number(t)) => Ok(t),
        _ => Err(throw_error(ErrorKind::TypeError, "this is not a Date object.")),
    }
}

fn with_time(call: &HostCall, f: impl FnOnce(f64) -> Eval) -> Eval {
    match this_time(&call.this) {
        Ok(t) => f(t),
        Err(error) => error,
    }
}

fn component(call: &HostCall, f: fn(f64) -> f64) -> Eval {
    with_time(call, |t| value(if t.is_nan() { f64::NAN } else { f(t) }))
}

fn date_value_of(call: HostCall) -> Eval {
    with_time(&call, |t| value(t))
}

fn date_set_time(call: HostCall) -> Eval {
    let JsValue::Object(date) = call.this.cheap_clone() else {
        return throw_error(ErrorKind::TypeError, "this is not a Date object.");
    };
    if let Err(error) = this_time(&call.this) {
        return error;
    }
    with_number(call.args.get(0), move |t| {
        let t = time_clip(t);
        date.borrow_mut().internal = Some(InternalSlot::Primitive(JsValue::Number(t)));
        value(t)
    })
}

fn date_to_iso_string(call: HostCall) -> Eval {
    with_time(&call, |t| {
        if t.is_nan() {
            throw_error(ErrorKind::RangeError, "Invalid time value")
        } else {
            value(iso_string(t))
        }
    })
}

fn date_to_json(call: HostCall) -> Eval {
    with_time(&call, |t| {
        if t.is_finite() { value(iso_string(t)) } else { value(JsValue::Null) }
    })
}

fn date_to_string(call: HostCall) -> Eval {
    with_time(&call, |t| value(display_string(t)))
}

fn date_to_utc_string(call: HostCall) -> Eval {
    with_time(&call, |t| value(utc_string(t)))
}

fn get_full_year(call: HostCall) -> Eval {
    component(&call, year_from_time)
}

fn get_month(call: HostCall) -> Eval {
    component(&call, month_from_time)
}

fn get_date(call: HostCall) -> Eval {
    component(&call, date_from_time)
}

fn get_day(call: HostCall) -> Eval {
    component(&call, week_day)
}

fn get_hours(call: HostCall) -> Eval {
    component(&call, hour_from_time)
}

fn get_minutes(call: HostCall) -> Eval {
    component(&call, min_from_time)
}

fn get_seconds(call: HostCall) -> Eval {
    component(&call, sec_from_time)
}

fn get_milliseconds(call: HostCall) -> Eval {
    component(&call, ms_from_time)
}

fn get_timezone_offset(call: HostCall) -> Eval {
    component(&call, |_| 0.0)
}

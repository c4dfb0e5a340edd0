//! The `console` object
//!
//! Each method converts its arguments with ToString, joins them with spaces
//! and hands the line to the realm's [`ConsoleProvider`](crate::platform::ConsoleProvider).

use std::rc::Rc;

use crate::platform::ConsoleLevel;
use crate::value::{HostCall, JsValue};

use crate::interpreter::{Eval, EvalExt, Realm, undefined, with_realm};

use super::strings;

pub fn install(realm: &Rc<Realm>) {
    let console = realm.new_object();
    realm.register_function(&console, "log", 0, console_log);
    realm.register_function(&console, "info", 0, console_info);
    realm.register_function(&console, "warn", 0, console_warn);
    realm.register_function(&console, "error", 0, console_error);
    realm.register_function(&console, "debug", 0, console_log);
    realm.register_value(&realm.global, "console", JsValue::Object(console));
}

fn write(level: ConsoleLevel, call: HostCall) -> Eval {
    strings(call.args.into_vec()).and_values(move |parts| {
        let line = parts
            .iter()
            .map(JsValue::to_string_primitive)
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        with_realm(move |realm| {
            realm.console.write(level, &line);
            undefined()
        })
    })
}

fn console_log(call: HostCall) -> Eval {
    write(ConsoleLevel::Log, call)
}

fn console_info(call: HostCall) -> Eval {
    write(ConsoleLevel::Info, call)
}

fn console_warn(call: HostCall) -> Eval {
    write(ConsoleLevel::Warn, call)
}

fn console_error(call: HostCall) -> Eval {
    write(ConsoleLevel::Error, call)
}

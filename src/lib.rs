//! ECMAScript 5 interpreter core
//!
//! Programs run on a trampolined computation engine ([`compute`]), so deeply
//! nested expressions and recursive calls never grow the native stack.
//!
//! # Example
//!
//! ```
//! use esrun::{JsValue, Runtime};
//!
//! let mut runtime = Runtime::new();
//! let result = runtime.eval_value("var a = [1, 2, 3]; a.length + 1").unwrap();
//! assert_eq!(result.as_number(), Some(4.0));
//! ```

pub mod ast;
pub mod compute;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod platform;
pub mod string_dict;
pub mod value;

pub use error::JsError;
pub use interpreter::{EvalResult, Realm, Settings};
pub use value::{CheapClone, JsObjectRef, JsString, JsValue};

use std::rc::Rc;

use crate::ast::Program;
use crate::interpreter::object;
use crate::parser::Parser;
use crate::platform::{ConsoleProvider, NoOpConsoleProvider, StdTimeProvider, TimeProvider};
use crate::value::ClassTag;

/// An interpreter instance: one realm plus the host clock
///
/// Global bindings persist across [`Runtime::eval`] calls.
pub struct Runtime {
    realm: Rc<Realm>,
    clock: Rc<dyn TimeProvider>,
    /// Logical time reached by the previous run
    clock_floor: f64,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self::with_clock(settings, Rc::new(StdTimeProvider::new()))
    }

    pub fn with_clock(settings: Settings, clock: Rc<dyn TimeProvider>) -> Self {
        Self::with_providers(settings, clock, Rc::new(NoOpConsoleProvider))
    }

    /// Full control over the host collaborators
    pub fn with_providers(
        settings: Settings,
        clock: Rc<dyn TimeProvider>,
        console: Rc<dyn ConsoleProvider>,
    ) -> Self {
        Self {
            realm: Realm::new(settings, console),
            clock,
            clock_floor: 0.0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.realm.settings
    }

    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    /// The global object, for registering host functions
    pub fn global(&self) -> &JsObjectRef {
        &self.realm.global
    }

    /// Parse `source` as a script
    pub fn parse(&self, source: &str) -> Result<Program, JsError> {
        let mut strings = self.realm.strings.borrow_mut();
        Parser::new(source, &mut strings)
            .strict(self.realm.settings.strict)
            .parse_program()
    }

    /// Parse and run `source`. Syntax errors are `Err`; hosted exceptions
    /// are [`EvalResult::Throw`].
    pub fn eval(&mut self, source: &str) -> Result<EvalResult, JsError> {
        let program = self.parse(source)?;
        Ok(self.run_program(&program))
    }

    /// Like [`Runtime::eval`], with an uncaught exception as [`JsError::Thrown`]
    pub fn eval_value(&mut self, source: &str) -> Result<JsValue, JsError> {
        match self.eval(source)? {
            EvalResult::Normal(value) => Ok(value),
            EvalResult::Throw(value) => Err(JsError::Thrown {
                message: describe(&value),
                value,
            }),
        }
    }

    /// Run a pre-parsed program in the global context
    pub fn run_program(&mut self, program: &Program) -> EvalResult {
        let (result, now) =
            interpreter::execute(&self.realm, program, Rc::clone(&self.clock), self.clock_floor);
        self.clock_floor = now;
        result
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Render an uncaught value without running hosted code: `Name: message`
/// for error objects, ToString for primitives.
pub fn describe(value: &JsValue) -> String {
    let JsValue::Object(obj) = value else {
        return value.to_string_primitive().to_string();
    };
    let data = |key: &str| match object::get_property(obj, key).and_then(|d| d.value().cloned()) {
        Some(JsValue::String(s)) => Some(s.to_string()),
        _ => None,
    };
    if obj.class() == ClassTag::Error {
        let name = data("name").unwrap_or_else(|| "Error".to_string());
        match data("message") {
            Some(message) if !message.is_empty() => format!("{name}: {message}"),
            _ => name,
        }
    } else {
        format!("[object {}]", obj.class().name())
    }
}

/// Export a value as JSON
///
/// Non-finite numbers, functions and `undefined` become `null`, arrays keep
/// their indexed elements, other objects their own enumerable data
/// properties. A reference back to an enclosing object is cut with `null`.
pub fn to_json(value: &JsValue) -> serde_json::Value {
    let mut ancestors = Vec::new();
    json_value(value, &mut ancestors)
}

fn json_value(value: &JsValue, ancestors: &mut Vec<JsObjectRef>) -> serde_json::Value {
    use serde_json::Value;
    match value {
        JsValue::Undefined | JsValue::Null => Value::Null,
        JsValue::Boolean(b) => Value::Bool(*b),
        JsValue::Number(n) => json_number(*n),
        JsValue::String(s) => Value::String(s.to_string()),
        JsValue::Object(obj) => {
            if obj.is_callable() || ancestors.iter().any(|a| a.ptr_eq(obj)) {
                return Value::Null;
            }
            ancestors.push(obj.cheap_clone());
            let exported = if obj.class() == ClassTag::Array {
                json_array(obj, ancestors)
            } else {
                json_object(obj, ancestors)
            };
            ancestors.pop();
            exported
        }
    }
}

fn json_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        // Exact integer
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn own_data(obj: &JsObjectRef, key: &str) -> JsValue {
    object::own_descriptor(obj, key)
        .and_then(|d| d.value().cloned())
        .unwrap_or_default()
}

fn json_array(obj: &JsObjectRef, ancestors: &mut Vec<JsObjectRef>) -> serde_json::Value {
    let len = match own_data(obj, "length") {
        JsValue::Number(n) => crate::value::to_uint32(n),
        _ => 0,
    };
    let items = (0..len)
        .map(|i| json_value(&own_data(obj, &i.to_string()), ancestors))
        .collect();
    serde_json::Value::Array(items)
}

fn json_object(obj: &JsObjectRef, ancestors: &mut Vec<JsObjectRef>) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for key in object::own_enumerable_keys(obj) {
        let Some(item) = object::own_descriptor(obj, key.as_str()).and_then(|d| d.value().cloned()) else {
            continue;
        };
        if item.is_undefined() {
            continue;
        }
        map.insert(key.to_string(), json_value(&item, ancestors));
    }
    serde_json::Value::Object(map)
}

//! Integration tests for the interpreter, organized by feature
//!
//! These tests exercise the interpreter through the public [`Runtime`] API.

mod arguments;
mod array;
mod basics;
mod builtins;
mod console;
mod control_flow;
mod date;
mod error;
mod eval;
mod function;
mod object;
mod strict;
mod string;
mod trampoline;
mod update;
mod with_statement;

use std::rc::Rc;

use esrun::interpreter::Completion;
use esrun::platform::FixedTimeProvider;
use esrun::{EvalResult, JsError, JsValue, Runtime, Settings};

/// Runtime on a fixed clock, so Date-dependent tests are deterministic
pub fn create_test_runtime() -> Runtime {
    Runtime::with_clock(Settings::default(), Rc::new(FixedTimeProvider::new(0.0)))
}

/// Evaluate source and return its completion value; panics on any error
#[allow(clippy::expect_used)]
pub fn eval(source: &str) -> JsValue {
    eval_result(source).expect("eval failed")
}

/// Evaluate source; syntax errors and uncaught exceptions are `Err`
pub fn eval_result(source: &str) -> Result<JsValue, JsError> {
    create_test_runtime().eval_value(source)
}

/// The program's completion record
#[allow(clippy::expect_used)]
pub fn completion(source: &str) -> Completion {
    match create_test_runtime().eval(source).expect("syntax error") {
        EvalResult::Normal(value) => Completion::normal(Some(value)),
        EvalResult::Throw(value) => Completion::throw(value),
    }
}

/// Check that evaluation fails with an error whose rendering contains `needle`
pub fn throws_error(source: &str, needle: &str) -> bool {
    match eval_result(source) {
        Err(e) => e.to_string().contains(needle),
        Ok(_) => false,
    }
}

/// Shorthand for string results
pub fn string(s: &str) -> JsValue {
    JsValue::from(s)
}

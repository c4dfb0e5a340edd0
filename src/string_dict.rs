//! Interning table for identifier and literal strings.
//!
//! The parser interns every identifier and string literal so that the same
//! name seen twice in a script shares one `Rc<str>`. Binding lookups hash the
//! string either way; sharing mostly saves allocations on large scripts.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, JsString};

/// Deduplicating store of [`JsString`] values.
pub struct StringDict {
    strings: FxHashMap<Box<str>, JsString>,
}

impl StringDict {
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Dictionary seeded with names almost every script touches.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Shared instance for `s`, inserting it on first use.
    pub fn get_or_insert(&mut self, s: &str) -> JsString {
        if let Some(existing) = self.strings.get(s) {
            return existing.cheap_clone();
        }
        let js_str = JsString::from(s);
        self.strings.insert(s.into(), js_str.cheap_clone());
        js_str
    }

    pub fn get(&self, s: &str) -> Option<JsString> {
        self.strings.get(s).map(CheapClone::cheap_clone)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

const COMMON_STRINGS: &[&str] = &[
    "length",
    "prototype",
    "constructor",
    "arguments",
    "callee",
    "caller",
    "name",
    "message",
    "value",
    "writable",
    "enumerable",
    "configurable",
    "get",
    "set",
    "toString",
    "valueOf",
    "hasOwnProperty",
    "undefined",
    "eval",
    "Object",
    "Array",
    "Function",
    "Error",
    "TypeError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "Math",
    "console",
    "log",
    "push",
    "i",
    "j",
    "k",
    "x",
    "y",
];

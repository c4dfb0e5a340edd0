//! Realm: intrinsic objects, settings and the builtin-registration interface

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::platform::ConsoleProvider;
use crate::string_dict::StringDict;
use crate::value::{
    CallHook, CheapClone, ClassTag, ConstructHook, HostCall, JsObjectRef, JsString, JsValue,
    NativeFn, ObjectValue, PropertyDescriptor,
};

use super::environment::EnvRef;
use super::{Eval, builtins, throw_error};

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Nested calls allowed before a `RangeError`
    pub max_call_depth: usize,
    /// Treat every program as strict-mode code
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_call_depth: 10_000,
            strict: false,
        }
    }
}

/// Native error constructors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    TypeError,
    RangeError,
    ReferenceError,
    SyntaxError,
    EvalError,
    URIError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::EvalError,
        ErrorKind::URIError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::URIError => "URIError",
        }
    }
}

/// Prototype objects for each error kind
pub struct ErrorPrototypes {
    pub error: JsObjectRef,
    pub type_error: JsObjectRef,
    pub range_error: JsObjectRef,
    pub reference_error: JsObjectRef,
    pub syntax_error: JsObjectRef,
    pub eval_error: JsObjectRef,
    pub uri_error: JsObjectRef,
}

impl ErrorPrototypes {
    pub fn get(&self, kind: ErrorKind) -> &JsObjectRef {
        match kind {
            ErrorKind::Error => &self.error,
            ErrorKind::TypeError => &self.type_error,
            ErrorKind::RangeError => &self.range_error,
            ErrorKind::ReferenceError => &self.reference_error,
            ErrorKind::SyntaxError => &self.syntax_error,
            ErrorKind::EvalError => &self.eval_error,
            ErrorKind::URIError => &self.uri_error,
        }
    }
}

/// A constructor to install with [`Realm::register_constructor`]
pub struct ConstructorDef {
    pub name: &'static str,
    pub arity: u32,
    /// Becomes the constructor's frozen `prototype`
    pub prototype: JsObjectRef,
    /// Static functions: name, hook, arity
    pub statics: &'static [(&'static str, NativeFn, u32)],
    pub call: NativeFn,
    /// `None` selects the ordinary construct behaviour
    pub construct: Option<NativeFn>,
}

pub struct Realm {
    pub settings: Settings,
    pub global: JsObjectRef,
    pub global_env: EnvRef,
    pub object_prototype: JsObjectRef,
    pub function_prototype: JsObjectRef,
    pub array_prototype: JsObjectRef,
    pub boolean_prototype: JsObjectRef,
    pub number_prototype: JsObjectRef,
    pub string_prototype: JsObjectRef,
    pub date_prototype: JsObjectRef,
    pub error_prototypes: ErrorPrototypes,
    /// %ThrowTypeError% (ES5 13.2.3)
    pub thrower: JsObjectRef,
    /// The initial value of the global `eval`, used to spot direct eval
    pub eval: JsObjectRef,
    /// Interning table shared by every parse in this realm
    pub strings: RefCell<StringDict>,
    pub console: Rc<dyn ConsoleProvider>,
}

fn bare(class: ClassTag, prototype: Option<&JsObjectRef>) -> JsObjectRef {
    JsObjectRef::new(ObjectValue::new(class, prototype.cloned()))
}

fn native(function_prototype: &JsObjectRef, name: &str, func: NativeFn, arity: u32) -> JsObjectRef {
    let mut object = ObjectValue::new(ClassTag::Function, Some(function_prototype.clone()));
    object.call = Some(CallHook::Native(func));
    object.insert("length", PropertyDescriptor::frozen(JsValue::from(arity)));
    object.insert("name", PropertyDescriptor::frozen(JsValue::from(name)));
    JsObjectRef::new(object)
}

fn throw_type_error(_call: HostCall) -> Eval {
    throw_error(
        super::ErrorKind::TypeError,
        "'caller', 'callee', and 'arguments' properties may not be accessed on strict mode functions",
    )
}

impl Realm {
    /// Build the intrinsics and install the builtin library
    pub fn new(settings: Settings, console: Rc<dyn ConsoleProvider>) -> Rc<Realm> {
        let object_prototype = bare(ClassTag::Object, None);
        let function_prototype = bare(ClassTag::Function, Some(&object_prototype));
        let array_prototype = bare(ClassTag::Array, Some(&object_prototype));
        array_prototype.borrow_mut().insert(
            "length",
            PropertyDescriptor::data(JsValue::Number(0.0), true, false, false),
        );
        let error = bare(ClassTag::Error, Some(&object_prototype));
        let error_prototypes = ErrorPrototypes {
            type_error: bare(ClassTag::Error, Some(&error)),
            range_error: bare(ClassTag::Error, Some(&error)),
            reference_error: bare(ClassTag::Error, Some(&error)),
            syntax_error: bare(ClassTag::Error, Some(&error)),
            eval_error: bare(ClassTag::Error, Some(&error)),
            uri_error: bare(ClassTag::Error, Some(&error)),
            error,
        };
        let boolean_prototype = JsObjectRef::new(
            ObjectValue::new(ClassTag::Boolean, Some(object_prototype.clone()))
                .with_primitive(JsValue::Boolean(false)),
        );
        let number_prototype = JsObjectRef::new(
            ObjectValue::new(ClassTag::Number, Some(object_prototype.clone()))
                .with_primitive(JsValue::Number(0.0)),
        );
        let string_prototype = JsObjectRef::new(
            ObjectValue::new(ClassTag::String, Some(object_prototype.clone()))
                .with_primitive(JsValue::from("")),
        );
        let date_prototype = JsObjectRef::new(
            ObjectValue::new(ClassTag::Date, Some(object_prototype.clone()))
                .with_primitive(JsValue::Number(f64::NAN)),
        );

        let thrower = native(&function_prototype, "", throw_type_error, 0);
        thrower.borrow_mut().extensible = false;
        let eval = native(&function_prototype, "eval", builtins::global::eval, 1);

        let global = bare(ClassTag::Global, Some(&object_prototype));
        let global_env = EnvRef::new_object(global.clone(), None, false);

        let realm = Rc::new(Realm {
            settings,
            global,
            global_env,
            object_prototype,
            function_prototype,
            array_prototype,
            boolean_prototype,
            number_prototype,
            string_prototype,
            date_prototype,
            error_prototypes,
            thrower,
            eval,
            strings: RefCell::new(StringDict::with_common_strings()),
            console,
        });
        builtins::install(&realm);
        tracing::debug!(
            globals = realm.global.borrow().properties.len(),
            "realm created"
        );
        realm
    }

    pub fn new_object(&self) -> JsObjectRef {
        bare(ClassTag::Object, Some(&self.object_prototype))
    }

    /// Array with `values` at indices `0..n` and `length` n
    pub fn new_array(&self, values: Vec<JsValue>) -> JsObjectRef {
        let mut object = ObjectValue::new(ClassTag::Array, Some(self.array_prototype.clone()));
        let len = values.len();
        for (index, v) in values.into_iter().enumerate() {
            object.insert(index.to_string(), PropertyDescriptor::open(v));
        }
        object.insert(
            "length",
            PropertyDescriptor::data(JsValue::Number(len as f64), true, false, false),
        );
        JsObjectRef::new(object)
    }

    /// Error object of `kind` with an own `message`
    pub fn create_error(&self, kind: ErrorKind, message: &str) -> JsValue {
        let object = bare(ClassTag::Error, Some(self.error_prototypes.get(kind)));
        if !message.is_empty() {
            object
                .borrow_mut()
                .insert("message", PropertyDescriptor::hidden(JsValue::from(message)));
        }
        JsValue::Object(object)
    }

    /// Function object with a native call hook
    pub fn make_native_function(&self, name: &str, func: NativeFn, arity: u32) -> JsObjectRef {
        native(&self.function_prototype, name, func, arity)
    }

    /// Install a native function as a non-enumerable property of `target`
    pub fn register_function(&self, target: &JsObjectRef, name: &str, arity: u32, hook: NativeFn) -> JsObjectRef {
        let func = self.make_native_function(name, hook, arity);
        target
            .borrow_mut()
            .insert(name, PropertyDescriptor::hidden(JsValue::Object(func.cheap_clone())));
        func
    }

    /// Install a constructor on `target`, wire `prototype.constructor` back to
    /// it and add its static functions.
    pub fn register_constructor(&self, target: &JsObjectRef, def: ConstructorDef) -> JsObjectRef {
        let ctor = self.make_native_function(def.name, def.call, def.arity);
        {
            let mut object = ctor.borrow_mut();
            object.construct = Some(match def.construct {
                Some(hook) => ConstructHook::Native(hook),
                None => ConstructHook::Ordinary,
            });
            object.insert(
                "prototype",
                PropertyDescriptor::frozen(JsValue::Object(def.prototype.cheap_clone())),
            );
        }
        def.prototype.borrow_mut().insert(
            "constructor",
            PropertyDescriptor::hidden(JsValue::Object(ctor.cheap_clone())),
        );
        for (name, hook, arity) in def.statics {
            self.register_function(&ctor, name, *arity, *hook);
        }
        target
            .borrow_mut()
            .insert(def.name, PropertyDescriptor::hidden(JsValue::Object(ctor.cheap_clone())));
        ctor
    }

    /// Install a plain value on `target` (writable, non-enumerable)
    pub fn register_value(&self, target: &JsObjectRef, name: &str, v: JsValue) {
        target.borrow_mut().insert(name, PropertyDescriptor::hidden(v));
    }

    /// Intern `s` in the realm's string table
    pub fn intern(&self, s: &str) -> JsString {
        self.strings.borrow_mut().get_or_insert(s)
    }
}

//! Environment records
//!
//! A scope frame is either declarative (a name → binding table) or an object
//! record wrapping an object's properties (the global object, `with`).
//!
//! Frames hold a strong reference to their outer frame. A function object
//! keeps its defining scope alive, and a frame can in turn hold that
//! function, so such cycles are never freed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::object::{self, Rejection};
use super::reference::Reference;
use super::{Eval, ErrorKind, throw_error, undefined, value};
use crate::value::{CheapClone, DescriptorFragment, JsObjectRef, JsString, JsValue, Orphans};

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: JsValue,
    pub mutable: bool,
    pub initialized: bool,
    pub deletable: bool,
}

pub enum Record {
    Declarative(FxHashMap<JsString, Binding>),
    Object {
        object: JsObjectRef,
        /// `with` frames supply their object as the implicit `this`
        provide_this: bool,
    },
}

pub struct Environment {
    pub outer: Option<EnvRef>,
    pub record: Record,
}

/// Shared handle to an environment record
#[derive(Clone)]
pub struct EnvRef(Rc<RefCell<Environment>>);

impl CheapClone for EnvRef {}

impl fmt::Debug for EnvRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(env) => match &env.record {
                Record::Declarative(bindings) => write!(f, "Declarative({} bindings)", bindings.len()),
                Record::Object { object, .. } => write!(f, "Object({object:?})"),
            },
            Err(_) => write!(f, "Environment(<borrowed>)"),
        }
    }
}

impl EnvRef {
    pub fn new_declarative(outer: Option<EnvRef>) -> Self {
        EnvRef(Rc::new(RefCell::new(Environment {
            outer,
            record: Record::Declarative(FxHashMap::default()),
        })))
    }

    pub fn new_object(object: JsObjectRef, outer: Option<EnvRef>, provide_this: bool) -> Self {
        EnvRef(Rc::new(RefCell::new(Environment {
            outer,
            record: Record::Object {
                object,
                provide_this,
            },
        })))
    }

    /// Move the frame's contents into `orphans` if this is its last handle
    pub(crate) fn detach_if_unique(self, orphans: &mut Orphans) {
        let Ok(cell) = Rc::try_unwrap(self.0) else {
            return;
        };
        let env = cell.into_inner();
        if let Some(outer) = env.outer {
            orphans.scope(outer);
        }
        match env.record {
            Record::Declarative(bindings) => {
                for (_, binding) in bindings {
                    orphans.value(binding.value);
                }
            }
            Record::Object { object, .. } => orphans.object(object),
        }
    }

    pub fn ptr_eq(&self, other: &EnvRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn outer(&self) -> Option<EnvRef> {
        self.0.borrow().outer.clone()
    }

    /// Object wrapped by an object record
    pub fn binding_object(&self) -> Option<JsObjectRef> {
        match &self.0.borrow().record {
            Record::Object { object, .. } => Some(object.cheap_clone()),
            Record::Declarative(_) => None,
        }
    }

    /// ImplicitThisValue (ES5 10.2.1.2.6)
    pub fn implicit_this(&self) -> JsValue {
        match &self.0.borrow().record {
            Record::Object {
                object,
                provide_this: true,
            } => JsValue::Object(object.cheap_clone()),
            _ => JsValue::Undefined,
        }
    }

    pub fn has_binding(&self, name: &str) -> bool {
        let object = match &self.0.borrow().record {
            Record::Declarative(bindings) => return bindings.contains_key(name),
            Record::Object { object, .. } => object.cheap_clone(),
        };
        object::has_property(&object, name)
    }

    /// Add an initialized, mutable, non-deletable binding to a declarative
    /// record, replacing any previous binding of that name. Used while
    /// instantiating function and catch scopes, which are always fresh
    /// declarative frames.
    pub fn declare(&self, name: JsString, value: JsValue) {
        if let Record::Declarative(bindings) = &mut self.0.borrow_mut().record {
            bindings.insert(
                name,
                Binding {
                    value,
                    mutable: true,
                    initialized: true,
                    deletable: false,
                },
            );
        } else {
            tracing::error!(%name, "declare on an object environment record");
        }
    }

    /// CreateMutableBinding; the binding starts out as `undefined`
    pub fn create_mutable_binding(&self, name: JsString, deletable: bool) -> Result<(), Rejection> {
        let object = match &mut self.0.borrow_mut().record {
            Record::Declarative(bindings) => {
                bindings.insert(
                    name,
                    Binding {
                        value: JsValue::Undefined,
                        mutable: true,
                        initialized: true,
                        deletable,
                    },
                );
                return Ok(());
            }
            Record::Object { object, .. } => object.cheap_clone(),
        };
        object::define_own_property(
            &object,
            &name,
            DescriptorFragment::data(JsValue::Undefined, true, true, deletable),
        )
    }

    /// CreateImmutableBinding; reads fail until it is initialized
    pub fn create_immutable_binding(&self, name: JsString) {
        if let Record::Declarative(bindings) = &mut self.0.borrow_mut().record {
            bindings.insert(
                name,
                Binding {
                    value: JsValue::Undefined,
                    mutable: false,
                    initialized: false,
                    deletable: false,
                },
            );
        }
    }

    pub fn initialize_immutable_binding(&self, name: &str, value: JsValue) {
        if let Record::Declarative(bindings) = &mut self.0.borrow_mut().record
            && let Some(binding) = bindings.get_mut(name)
        {
            binding.value = value;
            binding.initialized = true;
        }
    }

    /// Current value of a declarative binding
    pub fn read_binding(&self, name: &str) -> Option<JsValue> {
        match &self.0.borrow().record {
            Record::Declarative(bindings) => bindings.get(name).map(|b| b.value.cheap_clone()),
            Record::Object { .. } => None,
        }
    }

    /// Overwrite a declarative binding's value regardless of mutability.
    /// Returns false if there is no such binding.
    pub fn write_binding(&self, name: &str, value: JsValue) -> bool {
        if let Record::Declarative(bindings) = &mut self.0.borrow_mut().record
            && let Some(binding) = bindings.get_mut(name)
        {
            binding.value = value;
            binding.initialized = true;
            return true;
        }
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Binding operations
// ═══════════════════════════════════════════════════════════════════════════════

enum Lookup {
    Declarative(Option<Binding>),
    Object(JsObjectRef),
}

fn lookup(env: &EnvRef, name: &str) -> Lookup {
    match &env.0.borrow().record {
        Record::Declarative(bindings) => Lookup::Declarative(bindings.get(name).cloned()),
        Record::Object { object, .. } => Lookup::Object(object.cheap_clone()),
    }
}

/// GetBindingValue (ES5 10.2.1)
pub fn get_binding_value(env: &EnvRef, name: JsString, strict: bool) -> Eval {
    match lookup(env, &name) {
        Lookup::Declarative(Some(binding)) if binding.initialized => value(binding.value),
        Lookup::Declarative(Some(_)) if strict => {
            throw_error(ErrorKind::ReferenceError, format!("{name} is not initialized"))
        }
        Lookup::Declarative(_) => undefined(),
        Lookup::Object(object) => {
            if !object::has_property(&object, &name) {
                return if strict {
                    throw_error(ErrorKind::ReferenceError, format!("{name} is not defined"))
                } else {
                    undefined()
                };
            }
            let receiver = JsValue::Object(object.cheap_clone());
            object::get(&object, &name, receiver)
        }
    }
}

/// SetMutableBinding (ES5 10.2.1)
pub fn set_mutable_binding(env: &EnvRef, name: JsString, new_value: JsValue, strict: bool) -> Eval {
    match lookup(env, &name) {
        Lookup::Declarative(Some(binding)) if binding.mutable => {
            env.write_binding(&name, new_value);
            undefined()
        }
        Lookup::Declarative(Some(_)) => {
            if strict {
                throw_error(
                    ErrorKind::TypeError,
                    format!("Assignment to constant binding '{name}'"),
                )
            } else {
                undefined()
            }
        }
        Lookup::Declarative(None) => {
            env.declare(name, new_value);
            undefined()
        }
        Lookup::Object(object) => object::put(&object, name, new_value, strict),
    }
}

/// DeleteBinding (ES5 10.2.1); yields whether the binding is gone
pub fn delete_binding(env: &EnvRef, name: &str) -> Eval {
    let object = match &mut env.0.borrow_mut().record {
        Record::Declarative(bindings) => {
            let deleted = match bindings.get(name) {
                None => true,
                Some(binding) if binding.deletable => {
                    bindings.remove(name);
                    true
                }
                Some(_) => false,
            };
            return value(deleted);
        }
        Record::Object { object, .. } => object.cheap_clone(),
    };
    match object::delete(&object, name, false) {
        Ok(deleted) => value(deleted),
        Err(rejection) => super::reject(rejection),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Identifier resolution
// ═══════════════════════════════════════════════════════════════════════════════

/// GetIdentifierReference (ES5 10.2.2.1). An unresolved name yields a
/// reference with no environment.
pub fn get_identifier_reference(env: Option<&EnvRef>, name: JsString, strict: bool) -> Reference {
    let mut current = env.cloned();
    while let Some(frame) = current {
        if frame.has_binding(&name) {
            return Reference::Environment {
                name,
                env: Some(frame),
                strict,
            };
        }
        current = frame.outer();
    }
    Reference::Environment {
        name,
        env: None,
        strict,
    }
}

/// Assign to `name` as seen from `env`. Unresolved names become properties
/// of the global object unless `strict`.
pub fn set_identifier_reference(env: &EnvRef, name: JsString, new_value: JsValue, strict: bool) -> Eval {
    let reference = get_identifier_reference(Some(env), name, strict);
    super::reference::put_reference(reference, new_value)
}

/// `delete name` as seen from `env`
pub fn delete_identifier_reference(env: &EnvRef, name: JsString, strict: bool) -> Eval {
    let reference = get_identifier_reference(Some(env), name, strict);
    super::reference::delete_reference(reference)
}

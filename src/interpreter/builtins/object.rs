//! `Object` constructor and `Object.prototype` (ES5 15.2)

use std::cell::RefCell;
use std::rc::Rc;

use crate::compute::{lazy, sequence};
use crate::value::{
    CheapClone, ClassTag, DescriptorFragment, HostCall, JsObjectRef, JsString, JsValue, NativeFn,
    ObjectValue, PropertyDescriptor,
};

use crate::interpreter::conversion::{to_object, with_string};
use crate::interpreter::function::{self, this_object};
use crate::interpreter::realm::ConstructorDef;
use crate::interpreter::{
    Datum, ErrorKind, Eval, EvalExt, Realm, object, or_reject, throw_error, undefined, value,
    with_realm,
};

const STATICS: &[(&str, NativeFn, u32)] = &[
    ("getPrototypeOf", get_prototype_of, 1),
    ("getOwnPropertyDescriptor", get_own_property_descriptor, 2),
    ("getOwnPropertyNames", get_own_property_names, 1),
    ("create", create, 2),
    ("defineProperty", define_property, 3),
    ("defineProperties", define_properties, 2),
    ("seal", seal, 1),
    ("freeze", freeze, 1),
    ("preventExtensions", prevent_extensions, 1),
    ("isFrozen", is_frozen, 1),
    ("isExtensible", is_extensible, 1),
    ("keys", keys, 1),
];

pub fn install(realm: &Rc<Realm>) {
    realm.register_constructor(
        &realm.global,
        ConstructorDef {
            name: "Object",
            arity: 1,
            prototype: realm.object_prototype.cheap_clone(),
            statics: STATICS,
            call: object_constructor,
            construct: Some(object_constructor),
        },
    );
    let proto = &realm.object_prototype;
    realm.register_function(proto, "toString", 0, to_string);
    realm.register_function(proto, "toLocaleString", 0, to_locale_string);
    realm.register_function(proto, "valueOf", 0, value_of);
    realm.register_function(proto, "hasOwnProperty", 1, has_own_property);
    realm.register_function(proto, "isPrototypeOf", 1, is_prototype_of);
    realm.register_function(proto, "propertyIsEnumerable", 1, property_is_enumerable);
}

/// `Object(value)` and `new Object(value)`
fn object_constructor(call: HostCall) -> Eval {
    let arg = call.args.get(0);
    with_realm(move |realm| {
        if arg.is_nullish() {
            return value(realm.new_object());
        }
        or_reject(to_object(realm, &arg), |obj| value(obj))
    })
}

/// Continue with the first argument, which must be an object
fn object_arg<F>(call: &HostCall, what: &str, f: F) -> Eval
where
    F: FnOnce(JsObjectRef) -> Eval,
{
    match call.args.get(0) {
        JsValue::Object(obj) => f(obj),
        _ => throw_error(ErrorKind::TypeError, format!("Object.{what} called on non-object")),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Property descriptor objects (ES5 8.10.4, 8.10.5)
// ═══════════════════════════════════════════════════════════════════════════════

/// Descriptor object for `desc`, as returned by `getOwnPropertyDescriptor`
pub fn from_property_descriptor(realm: &Realm, desc: &PropertyDescriptor) -> JsObjectRef {
    let result = realm.new_object();
    {
        let mut obj = result.borrow_mut();
        match desc {
            PropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => {
                obj.insert("value", PropertyDescriptor::open(value.cheap_clone()));
                obj.insert("writable", PropertyDescriptor::open(JsValue::Boolean(*writable)));
                obj.insert("enumerable", PropertyDescriptor::open(JsValue::Boolean(*enumerable)));
                obj.insert("configurable", PropertyDescriptor::open(JsValue::Boolean(*configurable)));
            }
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => {
                obj.insert("get", PropertyDescriptor::open(get.cheap_clone()));
                obj.insert("set", PropertyDescriptor::open(set.cheap_clone()));
                obj.insert("enumerable", PropertyDescriptor::open(JsValue::Boolean(*enumerable)));
                obj.insert("configurable", PropertyDescriptor::open(JsValue::Boolean(*configurable)));
            }
        }
    }
    result
}

const DESCRIPTOR_FIELDS: [&str; 6] = ["enumerable", "configurable", "value", "writable", "get", "set"];

/// ToPropertyDescriptor: read the fields of `attributes` (through getters)
/// and continue with the fragment they describe.
pub fn to_property_descriptor<F>(attributes: JsValue, k: F) -> Eval
where
    F: FnOnce(DescriptorFragment) -> Eval + 'static,
{
    let JsValue::Object(source) = attributes else {
        return throw_error(ErrorKind::TypeError, "Property description must be an object");
    };
    let fragment = Rc::new(RefCell::new(DescriptorFragment::default()));
    let steps: Vec<Eval> = DESCRIPTOR_FIELDS
        .iter()
        .map(|&field| {
            let source = source.cheap_clone();
            let fragment = Rc::clone(&fragment);
            lazy(move || {
                if !object::has_property(&source, field) {
                    return undefined();
                }
                let receiver = JsValue::Object(source.cheap_clone());
                object::get(&source, field, receiver).and_value(move |v| {
                    let mut f = fragment.borrow_mut();
                    match field {
                        "enumerable" => f.enumerable = Some(v.to_boolean()),
                        "configurable" => f.configurable = Some(v.to_boolean()),
                        "value" => f.value = Some(v),
                        "writable" => f.writable = Some(v.to_boolean()),
                        "get" => f.get = Some(v),
                        _ => f.set = Some(v),
                    }
                    undefined()
                })
            })
        })
        .collect();
    sequence(steps, Datum::Value(JsValue::Undefined)).then(lazy(move || {
        let fragment = fragment.take();
        let bad_accessor = |accessor: &Option<JsValue>| {
            accessor
                .as_ref()
                .is_some_and(|f| !f.is_undefined() && !f.is_callable())
        };
        if bad_accessor(&fragment.get) {
            return throw_error(ErrorKind::TypeError, "Getter must be a function");
        }
        if bad_accessor(&fragment.set) {
            return throw_error(ErrorKind::TypeError, "Setter must be a function");
        }
        if fragment.is_accessor() && fragment.is_data() {
            return throw_error(
                ErrorKind::TypeError,
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            );
        }
        k(fragment)
    }))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Object.*
// ═══════════════════════════════════════════════════════════════════════════════

fn get_prototype_of(call: HostCall) -> Eval {
    object_arg(&call, "getPrototypeOf", |obj| match obj.prototype() {
        Some(proto) => value(proto),
        None => value(JsValue::Null),
    })
}

fn get_own_property_descriptor(call: HostCall) -> Eval {
    let key = call.args.get(1);
    object_arg(&call, "getOwnPropertyDescriptor", move |obj| {
        with_string(key, move |key| {
            with_realm(move |realm| match object::own_descriptor(&obj, &key) {
                Some(desc) => value(from_property_descriptor(realm, &desc)),
                None => undefined(),
            })
        })
    })
}

fn get_own_property_names(call: HostCall) -> Eval {
    object_arg(&call, "getOwnPropertyNames", |obj| {
        with_realm(move |realm| {
            let names = object::own_keys(&obj).into_iter().map(JsValue::String).collect();
            value(realm.new_array(names))
        })
    })
}

fn keys(call: HostCall) -> Eval {
    object_arg(&call, "keys", |obj| {
        with_realm(move |realm| {
            let names = object::own_enumerable_keys(&obj)
                .into_iter()
                .map(JsValue::String)
                .collect();
            value(realm.new_array(names))
        })
    })
}

fn create(call: HostCall) -> Eval {
    let properties = call.args.get(1);
    let prototype = match call.args.get(0) {
        JsValue::Object(proto) => Some(proto),
        JsValue::Null => None,
        _ => {
            return throw_error(ErrorKind::TypeError, "Object prototype may only be an Object or null");
        }
    };
    let created = JsObjectRef::new(ObjectValue::new(ClassTag::Object, prototype));
    if properties.is_undefined() {
        return value(created);
    }
    apply_properties(created, properties)
}

fn define_property(call: HostCall) -> Eval {
    let key = call.args.get(1);
    let attributes = call.args.get(2);
    object_arg(&call, "defineProperty", move |obj| {
        with_string(key, move |key| {
            to_property_descriptor(attributes, move |fragment| {
                object::define_property(&obj, key, fragment)
            })
        })
    })
}

fn define_properties(call: HostCall) -> Eval {
    let properties = call.args.get(1);
    object_arg(&call, "defineProperties", move |obj| apply_properties(obj, properties))
}

/// Shared tail of `defineProperties` and `create` (ES5 15.2.3.7): every
/// descriptor is read before any property is defined.
fn apply_properties(target: JsObjectRef, properties: JsValue) -> Eval {
    with_realm(move |realm| {
        or_reject(to_object(realm, &properties), move |props| {
            let collected: Rc<RefCell<Vec<(JsString, DescriptorFragment)>>> = Rc::default();
            let reads: Vec<Eval> = object::own_enumerable_keys(&props)
                .into_iter()
                .map(|key| {
                    let collected = Rc::clone(&collected);
                    let props = props.cheap_clone();
                    lazy(move || {
                        let receiver = JsValue::Object(props.cheap_clone());
                        object::get(&props, &key, receiver).and_value(move |attributes| {
                            to_property_descriptor(attributes, move |fragment| {
                                collected.borrow_mut().push((key, fragment));
                                undefined()
                            })
                        })
                    })
                })
                .collect();
            sequence(reads, Datum::Value(JsValue::Undefined)).then(lazy(move || {
                let defines: Vec<Eval> = collected
                    .take()
                    .into_iter()
                    .map(|(key, fragment)| {
                        let target = target.cheap_clone();
                        lazy(move || object::define_property(&target, key, fragment))
                    })
                    .collect();
                sequence(defines, Datum::Value(JsValue::Undefined)).then(value(target))
            }))
        })
    })
}

fn seal(call: HostCall) -> Eval {
    object_arg(&call, "seal", |obj| {
        or_reject(object::seal(&obj, false), move |()| value(obj))
    })
}

fn freeze(call: HostCall) -> Eval {
    object_arg(&call, "freeze", |obj| {
        or_reject(object::seal(&obj, true), move |()| value(obj))
    })
}

fn prevent_extensions(call: HostCall) -> Eval {
    object_arg(&call, "preventExtensions", |obj| {
        obj.borrow_mut().extensible = false;
        value(obj)
    })
}

fn is_frozen(call: HostCall) -> Eval {
    object_arg(&call, "isFrozen", |obj| value(object::is_frozen(&obj)))
}

fn is_extensible(call: HostCall) -> Eval {
    object_arg(&call, "isExtensible", |obj| {
        let extensible = obj.borrow().extensible;
        value(extensible)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Object.prototype
// ═══════════════════════════════════════════════════════════════════════════════

/// `[object Class]` for `this`
pub fn class_string(this: &JsValue) -> Eval {
    let this = this.cheap_clone();
    with_realm(move |realm| match &this {
        JsValue::Undefined => value("[object Undefined]"),
        JsValue::Null => value("[object Null]"),
        _ => this_object(realm, &this, |obj| value(format!("[object {}]", obj.class().name()))),
    })
}

fn to_string(call: HostCall) -> Eval {
    class_string(&call.this)
}

fn to_locale_string(call: HostCall) -> Eval {
    let this = call.this;
    with_realm(move |realm| {
        let receiver = this.cheap_clone();
        this_object(realm, &receiver, move |obj| {
            object::get(&obj, "toString", this.cheap_clone()).and_value(move |method| {
                if !method.is_callable() {
                    return throw_error(ErrorKind::TypeError, "toString is not a function");
                }
                function::call(&method, this, Vec::new())
            })
        })
    })
}

fn value_of(call: HostCall) -> Eval {
    with_realm(move |realm| this_object(realm, &call.this, |obj| value(obj)))
}

fn has_own_property(call: HostCall) -> Eval {
    let this = call.this;
    with_string(call.args.get(0), move |key| {
        with_realm(move |realm| {
            this_object(realm, &this, |obj| value(object::has_own_property(&obj, &key)))
        })
    })
}

fn is_prototype_of(call: HostCall) -> Eval {
    let JsValue::Object(candidate) = call.args.get(0) else {
        return value(false);
    };
    let this = call.this;
    with_realm(move |realm| {
        this_object(realm, &this, |obj| {
            let mut current = candidate.prototype();
            while let Some(proto) = current {
                if proto.ptr_eq(&obj) {
                    return value(true);
                }
                current = proto.prototype();
            }
            value(false)
        })
    })
}

fn property_is_enumerable(call: HostCall) -> Eval {
    let this = call.this;
    with_string(call.args.get(0), move |key| {
        with_realm(move |realm| {
            this_object(realm, &this, |obj| {
                let enumerable = object::own_descriptor(&obj, &key).is_some_and(|d| d.enumerable());
                value(enumerable)
            })
        })
    })
}

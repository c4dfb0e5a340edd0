//! Object and property model (ES5 8.12, 15.4.5.1, 10.6)
//!
//! Property lookup and `[[DefineOwnProperty]]` are pure operations on the
//! object record; only `get` and `put` become computations, because they can
//! run accessor functions. Array, String and Arguments objects specialise the
//! generic algorithms through explicit class-tag branches.

use crate::value::{
    CheapClone, ClassTag, DescriptorFragment, InternalSlot, JsObjectRef, JsString, JsValue,
    PropertyDescriptor, array_index, to_uint32,
};

use super::conversion::with_number;
use super::{Eval, ErrorKind, function, reject, throw_error, undefined, value};

/// Why the object model refused an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Type(String),
    Range(String),
}

fn refuse(throw: bool, message: impl FnOnce() -> String) -> Result<bool, Rejection> {
    if throw {
        Err(Rejection::Type(message()))
    } else {
        Ok(false)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Lookup
// ═══════════════════════════════════════════════════════════════════════════════

/// [[GetOwnProperty]]
pub fn own_descriptor(obj: &JsObjectRef, key: &str) -> Option<PropertyDescriptor> {
    let borrowed = obj.borrow();
    match borrowed.class {
        ClassTag::String => {
            if let Some(desc) = string_descriptor(borrowed.primitive_value(), key) {
                return Some(desc);
            }
        }
        ClassTag::Arguments => {
            if let Some(map) = borrowed.parameter_map()
                && let Some(name) = map.mapped(key)
                && let Some(PropertyDescriptor::Data {
                    writable,
                    enumerable,
                    configurable,
                    ..
                }) = borrowed.own(key)
            {
                let current = map.env.read_binding(name).unwrap_or_default();
                return Some(PropertyDescriptor::data(
                    current,
                    *writable,
                    *enumerable,
                    *configurable,
                ));
            }
        }
        _ => {}
    }
    borrowed.own(key).cloned()
}

/// Virtual `length` and index properties of a String object (ES5 15.5.5)
fn string_descriptor(primitive: Option<&JsValue>, key: &str) -> Option<PropertyDescriptor> {
    let Some(JsValue::String(s)) = primitive else {
        return None;
    };
    if key == "length" {
        return Some(PropertyDescriptor::frozen(JsValue::Number(s.utf16_len() as f64)));
    }
    let unit = s.code_unit_at(array_index(key)? as usize)?;
    let text = String::from_utf16_lossy(&[unit]);
    Some(PropertyDescriptor::data(JsValue::from(text), false, true, false))
}

fn is_string_virtual(obj: &JsObjectRef, key: &str) -> bool {
    let borrowed = obj.borrow();
    borrowed.class == ClassTag::String && string_descriptor(borrowed.primitive_value(), key).is_some()
}

/// [[GetProperty]]: own property, else the nearest one up the prototype chain
pub fn get_property(obj: &JsObjectRef, key: &str) -> Option<PropertyDescriptor> {
    let mut current = obj.cheap_clone();
    loop {
        if let Some(desc) = own_descriptor(&current, key) {
            return Some(desc);
        }
        current = current.prototype()?;
    }
}

/// [[HasProperty]]
pub fn has_property(obj: &JsObjectRef, key: &str) -> bool {
    get_property(obj, key).is_some()
}

pub fn has_own_property(obj: &JsObjectRef, key: &str) -> bool {
    own_descriptor(obj, key).is_some()
}

/// [[CanPut]] (ES5 8.12.4)
pub fn can_put(obj: &JsObjectRef, key: &str) -> bool {
    if let Some(desc) = own_descriptor(obj, key) {
        return match desc {
            PropertyDescriptor::Accessor { set, .. } => !set.is_undefined(),
            PropertyDescriptor::Data { writable, .. } => writable,
        };
    }
    let extensible = obj.borrow().extensible;
    let inherited = obj.prototype().and_then(|proto| get_property(&proto, key));
    match inherited {
        None => extensible,
        Some(PropertyDescriptor::Accessor { set, .. }) => !set.is_undefined(),
        Some(PropertyDescriptor::Data { writable, .. }) => extensible && writable,
    }
}

/// Own property keys in enumeration order: array indices ascending, then
/// the other keys in insertion order.
pub fn own_keys(obj: &JsObjectRef) -> Vec<JsString> {
    let borrowed = obj.borrow();
    let mut indexed: Vec<(u32, JsString)> = Vec::new();
    let mut named: Vec<JsString> = Vec::new();

    if borrowed.class == ClassTag::String
        && let Some(JsValue::String(s)) = borrowed.primitive_value()
    {
        let len = u32::try_from(s.utf16_len()).unwrap_or(u32::MAX);
        indexed.extend((0..len).map(|i| (i, JsString::from(i.to_string()))));
        named.push(JsString::from("length"));
    }

    for key in borrowed.properties.keys() {
        match array_index(key.as_str()) {
            Some(index) => indexed.push((index, key.cheap_clone())),
            None => named.push(key.cheap_clone()),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.dedup_by_key(|(index, _)| *index);

    indexed.into_iter().map(|(_, key)| key).chain(named).collect()
}

/// Keys of own enumerable properties, in enumeration order
pub fn own_enumerable_keys(obj: &JsObjectRef) -> Vec<JsString> {
    own_keys(obj)
        .into_iter()
        .filter(|key| own_descriptor(obj, key).is_some_and(|d| d.enumerable()))
        .collect()
}

/// Keys a `for-in` over `obj` visits: enumerable properties along the
/// prototype chain, a shadowed name reported once.
pub fn enumerable_keys(obj: &JsObjectRef) -> Vec<JsString> {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut keys = Vec::new();
    let mut current = Some(obj.cheap_clone());
    while let Some(object) = current {
        for key in own_keys(&object) {
            let enumerable = own_descriptor(&object, &key).is_some_and(|d| d.enumerable());
            if seen.insert(key.cheap_clone()) && enumerable {
                keys.push(key);
            }
        }
        current = object.prototype();
    }
    keys
}

// ═══════════════════════════════════════════════════════════════════════════════
// Get / Put
// ═══════════════════════════════════════════════════════════════════════════════

/// [[Get]]; getters run with `receiver` as `this`
pub fn get(obj: &JsObjectRef, key: &str, receiver: JsValue) -> Eval {
    match get_property(obj, key) {
        None => undefined(),
        Some(PropertyDescriptor::Data { value: v, .. }) => value(v),
        Some(PropertyDescriptor::Accessor { get, .. }) => {
            if get.is_undefined() {
                undefined()
            } else {
                function::call(&get, receiver, Vec::new())
            }
        }
    }
}

/// [[Put]] (ES5 8.12.5). Never writes into a prototype: an inherited data
/// property is shadowed by a new own property.
pub fn put(obj: &JsObjectRef, key: JsString, new_value: JsValue, throw: bool) -> Eval {
    if needs_length_coercion(obj, &key, &new_value) {
        let obj = obj.cheap_clone();
        return with_number(new_value, move |n| put(&obj, key, JsValue::Number(n), throw));
    }

    if !can_put(obj, &key) {
        return if throw {
            throw_error(
                ErrorKind::TypeError,
                format!("Cannot assign to read only property '{key}'"),
            )
        } else {
            undefined()
        };
    }

    if let Some(PropertyDescriptor::Data { .. }) = own_descriptor(obj, &key) {
        return match define(obj, &key, DescriptorFragment::value(new_value), throw) {
            Ok(_) => undefined(),
            Err(rejection) => reject(rejection),
        };
    }

    if let Some(PropertyDescriptor::Accessor { set, .. }) = get_property(obj, &key) {
        return function::call(&set, JsValue::Object(obj.cheap_clone()), vec![new_value])
            .then(undefined());
    }

    match define(obj, &key, DescriptorFragment::data(new_value, true, true, true), throw) {
        Ok(_) => undefined(),
        Err(rejection) => reject(rejection),
    }
}

/// An Array `length` written with an object value has to go through
/// ToNumber (and so possibly user code) before the pure define runs.
fn needs_length_coercion(obj: &JsObjectRef, key: &str, new_value: &JsValue) -> bool {
    key == "length" && new_value.is_object() && obj.class() == ClassTag::Array
}

/// `Object.defineProperty`'s entry point: like [`define_own_property`], but
/// an object-valued Array `length` is converted first.
pub fn define_property(obj: &JsObjectRef, key: JsString, mut frag: DescriptorFragment) -> Eval {
    if let Some(new_value) = frag.value.take_if(|v| needs_length_coercion(obj, &key, v)) {
        let obj = obj.cheap_clone();
        return with_number(new_value, move |n| {
            frag.value = Some(JsValue::Number(n));
            define_property(&obj, key, frag)
        });
    }
    match define(obj, &key, frag, true) {
        Ok(_) => value(JsValue::Object(obj.cheap_clone())),
        Err(rejection) => reject(rejection),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// [[DefineOwnProperty]]
// ═══════════════════════════════════════════════════════════════════════════════

/// Throwing [[DefineOwnProperty]]: any refusal is a rejection
pub fn define_own_property(
    obj: &JsObjectRef,
    key: &JsString,
    frag: DescriptorFragment,
) -> Result<(), Rejection> {
    define(obj, key, frag, true).map(|_| ())
}

/// Non-throwing [[DefineOwnProperty]]: a refusal is `Ok(false)`. An invalid
/// Array length is still a `RangeError`.
pub fn try_define_own_property(
    obj: &JsObjectRef,
    key: &JsString,
    frag: DescriptorFragment,
) -> Result<bool, Rejection> {
    define(obj, key, frag, false)
}

fn define(obj: &JsObjectRef, key: &JsString, frag: DescriptorFragment, throw: bool) -> Result<bool, Rejection> {
    match obj.class() {
        ClassTag::Array => define_array(obj, key, frag, throw),
        ClassTag::Arguments => define_arguments(obj, key, frag, throw),
        _ => define_ordinary(obj, key, frag, throw),
    }
}

/// Does every field present in `frag` already hold in `current`?
fn fragment_matches(current: &PropertyDescriptor, frag: &DescriptorFragment) -> bool {
    let same = |field: &Option<JsValue>, existing: Option<&JsValue>| match (field, existing) {
        (None, _) => true,
        (Some(v), Some(e)) => v.same_value(e),
        (Some(_), None) => false,
    };
    let flag = |field: Option<bool>, existing: Option<bool>| match (field, existing) {
        (None, _) => true,
        (Some(v), Some(e)) => v == e,
        (Some(_), None) => false,
    };
    let (value, writable, get, set) = match current {
        PropertyDescriptor::Data { value, writable, .. } => (Some(value), Some(*writable), None, None),
        PropertyDescriptor::Accessor { get, set, .. } => (None, None, Some(get), Some(set)),
    };
    same(&frag.value, value)
        && flag(frag.writable, writable)
        && same(&frag.get, get)
        && same(&frag.set, set)
        && flag(frag.enumerable, Some(current.enumerable()))
        && flag(frag.configurable, Some(current.configurable()))
}

/// Overlay the fields of `frag` on `base`, which must already be of the
/// right kind.
fn merge(base: PropertyDescriptor, frag: DescriptorFragment) -> PropertyDescriptor {
    match base {
        PropertyDescriptor::Data {
            value,
            writable,
            enumerable,
            configurable,
        } => PropertyDescriptor::Data {
            value: frag.value.unwrap_or(value),
            writable: frag.writable.unwrap_or(writable),
            enumerable: frag.enumerable.unwrap_or(enumerable),
            configurable: frag.configurable.unwrap_or(configurable),
        },
        PropertyDescriptor::Accessor {
            get,
            set,
            enumerable,
            configurable,
        } => PropertyDescriptor::Accessor {
            get: frag.get.unwrap_or(get),
            set: frag.set.unwrap_or(set),
            enumerable: frag.enumerable.unwrap_or(enumerable),
            configurable: frag.configurable.unwrap_or(configurable),
        },
    }
}

/// The generic algorithm (ES5 8.12.9)
fn define_ordinary(obj: &JsObjectRef, key: &JsString, frag: DescriptorFragment, throw: bool) -> Result<bool, Rejection> {
    let Some(current) = own_descriptor(obj, key) else {
        if !obj.borrow().extensible {
            return refuse(throw, || format!("Cannot define property {key}, object is not extensible"));
        }
        let fresh = if frag.is_accessor() {
            PropertyDescriptor::Accessor {
                get: JsValue::Undefined,
                set: JsValue::Undefined,
                enumerable: false,
                configurable: false,
            }
        } else {
            PropertyDescriptor::data(JsValue::Undefined, false, false, false)
        };
        obj.borrow_mut().insert(key.cheap_clone(), merge(fresh, frag));
        return Ok(true);
    };

    if frag.is_empty() || fragment_matches(&current, &frag) {
        return Ok(true);
    }

    let redefine = || format!("Cannot redefine property: {key}");
    if !current.configurable() {
        if frag.configurable == Some(true) {
            return refuse(throw, redefine);
        }
        if frag.enumerable.is_some_and(|e| e != current.enumerable()) {
            return refuse(throw, redefine);
        }
    }

    let base = if frag.is_generic() {
        current
    } else if current.is_accessor() != frag.is_accessor() {
        if !current.configurable() {
            return refuse(throw, redefine);
        }
        let (enumerable, configurable) = (current.enumerable(), current.configurable());
        if current.is_accessor() {
            PropertyDescriptor::data(JsValue::Undefined, false, enumerable, configurable)
        } else {
            PropertyDescriptor::Accessor {
                get: JsValue::Undefined,
                set: JsValue::Undefined,
                enumerable,
                configurable,
            }
        }
    } else {
        match &current {
            PropertyDescriptor::Data {
                value,
                writable: false,
                configurable: false,
                ..
            } => {
                if frag.writable == Some(true) {
                    return refuse(throw, redefine);
                }
                if frag.value.as_ref().is_some_and(|v| !v.same_value(value)) {
                    return refuse(throw, redefine);
                }
            }
            PropertyDescriptor::Accessor {
                get,
                set,
                configurable: false,
                ..
            } => {
                if frag.get.as_ref().is_some_and(|g| !g.same_value(get))
                    || frag.set.as_ref().is_some_and(|s| !s.same_value(set))
                {
                    return refuse(throw, redefine);
                }
            }
            _ => {}
        }
        current
    };

    // String indices and length are immutable views of the primitive; a
    // define that passed validation changes nothing.
    if is_string_virtual(obj, key) {
        return Ok(true);
    }
    obj.borrow_mut().insert(key.cheap_clone(), merge(base, frag));
    Ok(true)
}

// ─── Array (ES5 15.4.5.1) ──────────────────────────────────────────────────────

fn array_length(obj: &JsObjectRef) -> (u32, bool) {
    match obj.borrow().own("length") {
        Some(PropertyDescriptor::Data {
            value: JsValue::Number(n),
            writable,
            ..
        }) => (to_uint32(*n), *writable),
        _ => (0, true),
    }
}

/// Overwrite the stored `length` value, keeping its attributes
pub fn set_length_value(obj: &JsObjectRef, len: u32) {
    if let Some(PropertyDescriptor::Data { value, .. }) = obj.borrow_mut().properties.get_mut("length") {
        *value = JsValue::Number(f64::from(len));
    }
}

fn define_array(obj: &JsObjectRef, key: &JsString, frag: DescriptorFragment, throw: bool) -> Result<bool, Rejection> {
    let (old_len, length_writable) = array_length(obj);

    if key.as_str() == "length" {
        let Some(requested) = &frag.value else {
            return define_ordinary(obj, key, frag, throw);
        };
        let number = requested.to_number_primitive();
        let new_len = to_uint32(number);
        if f64::from(new_len) != number {
            return Err(Rejection::Range("Invalid array length".to_string()));
        }
        let mut new_frag = frag.clone();
        new_frag.value = Some(JsValue::Number(f64::from(new_len)));
        if new_len >= old_len {
            return define_ordinary(obj, key, new_frag, throw);
        }
        if !length_writable {
            return refuse(throw, || "Cannot assign to read only property 'length'".to_string());
        }
        let keep_writable = frag.writable != Some(false);
        if !keep_writable {
            new_frag.writable = Some(true);
        }
        if !define_ordinary(obj, key, new_frag, throw)? {
            return Ok(false);
        }

        let mut doomed: Vec<u32> = obj
            .borrow()
            .properties
            .keys()
            .filter_map(|k| array_index(k.as_str()))
            .filter(|index| *index >= new_len)
            .collect();
        doomed.sort_unstable_by(|a, b| b.cmp(a));

        for index in doomed {
            if !delete(obj, &index.to_string(), false)? {
                set_length_value(obj, index.saturating_add(1));
                if !keep_writable {
                    freeze_length(obj);
                }
                return refuse(throw, || format!("Cannot delete array element {index}"));
            }
        }
        if !keep_writable {
            freeze_length(obj);
        }
        return Ok(true);
    }

    if let Some(index) = array_index(key.as_str()) {
        if index >= old_len && !length_writable {
            return refuse(throw, || format!("Cannot add element {index}, length is read only"));
        }
        if !define_ordinary(obj, key, frag, throw)? {
            return Ok(false);
        }
        if index >= old_len {
            set_length_value(obj, index.saturating_add(1));
        }
        return Ok(true);
    }

    define_ordinary(obj, key, frag, throw)
}

fn freeze_length(obj: &JsObjectRef) {
    if let Some(PropertyDescriptor::Data { writable, .. }) = obj.borrow_mut().properties.get_mut("length") {
        *writable = false;
    }
}

// ─── Arguments (ES5 10.6) ──────────────────────────────────────────────────────

fn define_arguments(obj: &JsObjectRef, key: &JsString, frag: DescriptorFragment, throw: bool) -> Result<bool, Rejection> {
    let mapping = {
        let borrowed = obj.borrow();
        borrowed
            .parameter_map()
            .and_then(|map| map.mapped(key).map(|name| (map.env.cheap_clone(), name.cheap_clone())))
    };
    let is_accessor = frag.is_accessor();
    let new_value = frag.value.clone();
    let makes_readonly = frag.writable == Some(false);

    if !define_ordinary(obj, key, frag, throw)? {
        return Ok(false);
    }
    if let Some((env, name)) = mapping {
        if is_accessor {
            unmap(obj, key);
        } else {
            if let Some(v) = new_value {
                env.write_binding(&name, v);
            }
            if makes_readonly {
                unmap(obj, key);
            }
        }
    }
    Ok(true)
}

fn unmap(obj: &JsObjectRef, key: &str) {
    if let Some(InternalSlot::Arguments(map)) = &mut obj.borrow_mut().internal {
        map.unmap(key);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// [[Delete]] and friends
// ═══════════════════════════════════════════════════════════════════════════════

/// [[Delete]] (ES5 8.12.7)
pub fn delete(obj: &JsObjectRef, key: &str, throw: bool) -> Result<bool, Rejection> {
    let Some(desc) = own_descriptor(obj, key) else {
        return Ok(true);
    };
    if !desc.configurable() {
        return refuse(throw, || format!("Cannot delete property '{key}'"));
    }
    obj.borrow_mut().remove(key);
    if obj.class() == ClassTag::Arguments {
        unmap(obj, key);
    }
    Ok(true)
}

/// Make every own property non-configurable (and data properties
/// non-writable when `freeze`), then stop extensions.
pub fn seal(obj: &JsObjectRef, freeze: bool) -> Result<(), Rejection> {
    for key in own_keys(obj) {
        let mut frag = DescriptorFragment {
            configurable: Some(false),
            ..DescriptorFragment::default()
        };
        if freeze && own_descriptor(obj, &key).is_some_and(|d| !d.is_accessor()) {
            frag.writable = Some(false);
        }
        define_own_property(obj, &key, frag)?;
    }
    obj.borrow_mut().extensible = false;
    Ok(())
}

pub fn is_frozen(obj: &JsObjectRef) -> bool {
    if obj.borrow().extensible {
        return false;
    }
    own_keys(obj).iter().all(|key| match own_descriptor(obj, key) {
        Some(PropertyDescriptor::Data {
            writable,
            configurable,
            ..
        }) => !writable && !configurable,
        Some(PropertyDescriptor::Accessor { configurable, .. }) => !configurable,
        None => true,
    })
}

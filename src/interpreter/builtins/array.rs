//! `Array` constructor and `Array.prototype` (ES5 15.4)
//!
//! The prototype methods are generic: they read `length` and indexed
//! properties through [[Get]] and write through [[Put]], so they work on any
//! array-like `this`, including `arguments` and String objects.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::compute::{lazy, sequence};
use crate::value::{
    CheapClone, ClassTag, DescriptorFragment, HostCall, JsObjectRef, JsString, JsValue, NativeFn,
    to_integer, to_uint32,
};

use crate::interpreter::conversion::{with_number, with_string};
use crate::interpreter::function::{self, this_object};
use crate::interpreter::realm::ConstructorDef;
use crate::interpreter::{
    ErrorKind, Eval, EvalExt, Realm, object, or_reject, throw_error, undefined, value, with_realm,
};

use super::{for_range, for_range_rev, index_key, relative_index, with_length};

const STATICS: &[(&str, NativeFn, u32)] = &[("isArray", is_array, 1)];

const METHODS: &[(&str, NativeFn, u32)] = &[
    ("toString", to_string, 0),
    ("join", join, 1),
    ("push", push, 1),
    ("pop", pop, 0),
    ("shift", shift, 0),
    ("unshift", unshift, 1),
    ("concat", concat, 1),
    ("slice", slice, 2),
    ("reverse", reverse, 0),
    ("indexOf", index_of, 1),
    ("forEach", for_each, 1),
    ("map", map, 1),
    ("filter", filter, 1),
    ("reduce", reduce, 1),
    ("reduceRight", reduce_right, 1),
];

pub fn install(realm: &Rc<Realm>) {
    realm.register_constructor(
        &realm.global,
        ConstructorDef {
            name: "Array",
            arity: 1,
            prototype: realm.array_prototype.cheap_clone(),
            statics: STATICS,
            call: array_constructor,
            construct: Some(array_constructor),
        },
    );
    for (name, hook, arity) in METHODS {
        realm.register_function(&realm.array_prototype, name, *arity, *hook);
    }
}

/// `Array(...)` and `new Array(...)` (ES5 15.4.2)
fn array_constructor(call: HostCall) -> Eval {
    let args = call.args.into_vec();
    with_realm(move |realm| match args.as_slice() {
        [JsValue::Number(len)] => {
            let exact = to_uint32(*len);
            if f64::from(exact) != *len {
                return throw_error(ErrorKind::RangeError, "Invalid array length");
            }
            let array = realm.new_array(Vec::new());
            object::set_length_value(&array, exact);
            value(array)
        }
        _ => value(realm.new_array(args)),
    })
}

fn is_array(call: HostCall) -> Eval {
    let is_array = call
        .args
        .get(0)
        .as_object()
        .is_some_and(|obj| obj.class() == ClassTag::Array);
    value(is_array)
}

/// ToObject(this) and ToUint32(length), then `f`
fn with_this_array<F>(this: JsValue, f: F) -> Eval
where
    F: FnOnce(JsObjectRef, u32) -> Eval + 'static,
{
    with_realm(move |realm| {
        this_object(realm, &this, move |obj| {
            let source = obj.cheap_clone();
            with_length(&source, move |len| f(obj, len))
        })
    })
}

// The helpers below defer their object access until the step runs, so they
// can be chained with `then` in program order.

fn get_index(obj: &JsObjectRef, index: u32) -> Eval {
    let obj = obj.cheap_clone();
    lazy(move || object::get(&obj, &index_key(index), JsValue::Object(obj.cheap_clone())))
}

fn put_index(obj: &JsObjectRef, index: u32, v: JsValue) -> Eval {
    let obj = obj.cheap_clone();
    lazy(move || object::put(&obj, index_key(index), v, true))
}

fn put_length(obj: &JsObjectRef, len: f64) -> Eval {
    let obj = obj.cheap_clone();
    lazy(move || object::put(&obj, JsString::from("length"), JsValue::Number(len), true))
}

fn delete_index(obj: &JsObjectRef, index: u32) -> Eval {
    let obj = obj.cheap_clone();
    lazy(move || or_reject(object::delete(&obj, &index_key(index), true), |_| undefined()))
}

/// CreateDataProperty on a fresh result array
fn create_index(target: &JsObjectRef, index: u32, v: JsValue) -> Eval {
    let target = target.cheap_clone();
    lazy(move || {
        let fragment = DescriptorFragment::data(v, true, true, true);
        or_reject(object::define_own_property(&target, &index_key(index), fragment), |()| undefined())
    })
}

/// Move `from` to `to`, deleting `to` when `from` is a hole
fn move_index(obj: &JsObjectRef, from: u32, to: u32) -> Eval {
    let obj = obj.cheap_clone();
    lazy(move || {
        if object::has_property(&obj, &index_key(from)) {
            let target = obj.cheap_clone();
            get_index(&obj, from).and_value(move |v| put_index(&target, to, v))
        } else {
            delete_index(&obj, to)
        }
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Stack and queue operations
// ═══════════════════════════════════════════════════════════════════════════════

fn push(call: HostCall) -> Eval {
    let items = call.args.into_vec();
    with_this_array(call.this, move |obj, len| {
        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let new_len = f64::from(len) + f64::from(count);
        let items = Rc::new(items);
        let target = obj.cheap_clone();
        for_range(
            0,
            count,
            Rc::new(move |i| {
                let item = items.get(i as usize).cloned().unwrap_or_default();
                put_index(&target, len.saturating_add(i), item)
            }),
        )
        .then(put_length(&obj, new_len))
        .then(value(new_len))
    })
}

fn pop(call: HostCall) -> Eval {
    with_this_array(call.this, |obj, len| {
        if len == 0 {
            return put_length(&obj, 0.0).then(undefined());
        }
        let last = len - 1;
        let target = obj.cheap_clone();
        get_index(&obj, last).and_value(move |element| {
            delete_index(&target, last)
                .then(put_length(&target, f64::from(last)))
                .then(value(element))
        })
    })
}

fn shift(call: HostCall) -> Eval {
    with_this_array(call.this, |obj, len| {
        if len == 0 {
            return put_length(&obj, 0.0).then(undefined());
        }
        let target = obj.cheap_clone();
        get_index(&obj, 0).and_value(move |first| {
            let mover = target.cheap_clone();
            for_range(1, len, Rc::new(move |k| move_index(&mover, k, k - 1)))
                .then(delete_index(&target, len - 1))
                .then(put_length(&target, f64::from(len - 1)))
                .then(value(first))
        })
    })
}

fn unshift(call: HostCall) -> Eval {
    let items = call.args.into_vec();
    with_this_array(call.this, move |obj, len| {
        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let new_len = f64::from(len) + f64::from(count);
        let mover = obj.cheap_clone();
        let writer = obj.cheap_clone();
        let items = Rc::new(items);
        for_range_rev(
            0,
            len,
            Rc::new(move |k| move_index(&mover, k, k.saturating_add(count))),
        )
        .then(for_range(
            0,
            count,
            Rc::new(move |i| {
                let item = items.get(i as usize).cloned().unwrap_or_default();
                put_index(&writer, i, item)
            }),
        ))
        .then(put_length(&obj, new_len))
        .then(value(new_len))
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Copying operations
// ═══════════════════════════════════════════════════════════════════════════════

fn concat(call: HostCall) -> Eval {
    let this = call.this;
    let args = call.args.into_vec();
    with_realm(move |realm| {
        let result = realm.new_array(Vec::new());
        this_object(realm, &this, move |obj| {
            let next = Rc::new(Cell::new(0_u32));
            let mut items = vec![JsValue::Object(obj)];
            items.extend(args);
            let steps: Vec<Eval> = items
                .into_iter()
                .map(|item| append_spread(&result, &next, item))
                .collect();
            let target = result.cheap_clone();
            sequence(steps, JsValue::Undefined.into()).then(lazy(move || {
                object::set_length_value(&target, next.get());
                value(target)
            }))
        })
    })
}

/// One `concat` operand: arrays contribute their elements, anything else
/// itself.
fn append_spread(result: &JsObjectRef, next: &Rc<Cell<u32>>, item: JsValue) -> Eval {
    let result = result.cheap_clone();
    let next = Rc::clone(next);
    lazy(move || {
        let spread = item
            .as_object()
            .filter(|obj| obj.class() == ClassTag::Array)
            .cloned();
        let Some(source) = spread else {
            let at = next.get();
            next.set(at.saturating_add(1));
            return create_index(&result, at, item);
        };
        let reader = source.cheap_clone();
        with_length(&source, move |len| {
            let base = next.get();
            next.set(base.saturating_add(len));
            for_range(
                0,
                len,
                Rc::new(move |k| {
                    if !object::has_property(&reader, &index_key(k)) {
                        return undefined();
                    }
                    let target = result.cheap_clone();
                    get_index(&reader, k).and_value(move |v| create_index(&target, base.saturating_add(k), v))
                }),
            )
        })
    })
}

fn slice(call: HostCall) -> Eval {
    let start = call.args.get(0);
    let end = call.args.get(1);
    with_this_array(call.this, move |obj, len| {
        with_number(start, move |start| {
            let from = relative_index(to_integer(start), len);
            let end = if end.is_undefined() { JsValue::from(len) } else { end };
            with_number(end, move |end| {
                let to = relative_index(to_integer(end), len);
                with_realm(move |realm| {
                    let result = realm.new_array(Vec::new());
                    let count = to.saturating_sub(from);
                    let target = result.cheap_clone();
                    for_range(
                        from,
                        to,
                        Rc::new(move |k| {
                            if !object::has_property(&obj, &index_key(k)) {
                                return undefined();
                            }
                            let target = target.cheap_clone();
                            get_index(&obj, k).and_value(move |v| create_index(&target, k - from, v))
                        }),
                    )
                    .then(lazy(move || {
                        object::set_length_value(&result, count);
                        value(result)
                    }))
                })
            })
        })
    })
}

fn reverse(call: HostCall) -> Eval {
    with_this_array(call.this, |obj, len| {
        let middle = len / 2;
        let target = obj.cheap_clone();
        for_range(0, middle, Rc::new(move |lower| swap(&target, lower, len - lower - 1)))
            .then(value(obj))
    })
}

/// Exchange two indices, keeping holes as holes
fn swap(obj: &JsObjectRef, lower: u32, upper: u32) -> Eval {
    let lower_exists = object::has_property(obj, &index_key(lower));
    let upper_exists = object::has_property(obj, &index_key(upper));
    let target = obj.cheap_clone();
    read_if(obj, lower_exists, lower).and_value(move |lower_value| {
        read_if(&target, upper_exists, upper).and_value(move |upper_value| {
            let write_lower = if upper_exists {
                put_index(&target, lower, upper_value)
            } else {
                delete_index(&target, lower)
            };
            let write_upper = if lower_exists {
                put_index(&target, upper, lower_value)
            } else {
                delete_index(&target, upper)
            };
            write_lower.then(write_upper)
        })
    })
}

fn read_if(obj: &JsObjectRef, exists: bool, index: u32) -> Eval {
    if exists { get_index(obj, index) } else { undefined() }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversion and search
// ═══════════════════════════════════════════════════════════════════════════════

fn to_string(call: HostCall) -> Eval {
    let this = call.this;
    with_realm(move |realm| {
        this_object(realm, &this, |obj| {
            let receiver = JsValue::Object(obj.cheap_clone());
            object::get(&obj, "join", receiver.cheap_clone()).and_value(move |join| {
                if join.is_callable() {
                    function::call(&join, receiver, Vec::new())
                } else {
                    super::object::class_string(&receiver)
                }
            })
        })
    })
}

fn join(call: HostCall) -> Eval {
    let separator = call.args.get(0);
    with_this_array(call.this, move |obj, len| {
        let separator = if separator.is_undefined() { JsValue::from(",") } else { separator };
        with_string(separator, move |separator| {
            let joined = Rc::new(RefCell::new(String::new()));
            let sink = Rc::clone(&joined);
            for_range(
                0,
                len,
                Rc::new(move |k| {
                    let sink = Rc::clone(&sink);
                    let separator = separator.cheap_clone();
                    get_index(&obj, k).and_value(move |element| {
                        if k > 0 {
                            sink.borrow_mut().push_str(separator.as_str());
                        }
                        if element.is_nullish() {
                            return undefined();
                        }
                        with_string(element, move |s| {
                            sink.borrow_mut().push_str(s.as_str());
                            undefined()
                        })
                    })
                }),
            )
            .then(lazy(move || value(joined.take())))
        })
    })
}

fn index_of(call: HostCall) -> Eval {
    let search = call.args.get(0);
    let from = call.args.get(1);
    with_this_array(call.this, move |obj, len| {
        if len == 0 {
            return value(-1);
        }
        with_number(from, move |from| {
            let n = to_integer(from);
            if n >= f64::from(len) {
                return value(-1);
            }
            index_of_from(obj, search, relative_index(n, len), len)
        })
    })
}

fn index_of_from(obj: JsObjectRef, search: JsValue, k: u32, len: u32) -> Eval {
    if k >= len {
        return value(-1);
    }
    if !object::has_property(&obj, &index_key(k)) {
        return lazy(move || index_of_from(obj, search, k + 1, len));
    }
    let source = obj.cheap_clone();
    get_index(&source, k).and_value(move |element| {
        if element.strict_equals(&search) {
            value(k)
        } else {
            index_of_from(obj, search, k + 1, len)
        }
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Iteration with callbacks
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared shape of forEach/map/filter: call `callback(kValue, k, O)` for each
/// present index and hand the result to `visit`.
fn for_each_present(
    obj: JsObjectRef,
    len: u32,
    callback: JsValue,
    this_arg: JsValue,
    visit: Rc<dyn Fn(u32, JsValue, JsValue) -> Eval>,
) -> Eval {
    for_range(
        0,
        len,
        Rc::new(move |k| {
            if !object::has_property(&obj, &index_key(k)) {
                return undefined();
            }
            let callback = callback.cheap_clone();
            let this_arg = this_arg.cheap_clone();
            let receiver = JsValue::Object(obj.cheap_clone());
            let visit = Rc::clone(&visit);
            get_index(&obj, k).and_value(move |element| {
                let args = vec![element.cheap_clone(), JsValue::from(k), receiver];
                function::call(&callback, this_arg, args)
                    .and_value(move |result| visit(k, element, result))
            })
        }),
    )
}

fn require_callback(callback: &JsValue) -> Option<Eval> {
    if callback.is_callable() {
        None
    } else {
        Some(throw_error(
            ErrorKind::TypeError,
            format!("{} is not a function", callback.to_string_primitive()),
        ))
    }
}

fn for_each(call: HostCall) -> Eval {
    let callback = call.args.get(0);
    let this_arg = call.args.get(1);
    with_this_array(call.this, move |obj, len| {
        if let Some(error) = require_callback(&callback) {
            return error;
        }
        for_each_present(obj, len, callback, this_arg, Rc::new(|_, _, _| undefined())).then(undefined())
    })
}

fn map(call: HostCall) -> Eval {
    let callback = call.args.get(0);
    let this_arg = call.args.get(1);
    with_this_array(call.this, move |obj, len| {
        if let Some(error) = require_callback(&callback) {
            return error;
        }
        with_realm(move |realm| {
            let result = realm.new_array(Vec::new());
            object::set_length_value(&result, len);
            let target = result.cheap_clone();
            for_each_present(
                obj,
                len,
                callback,
                this_arg,
                Rc::new(move |k, _, mapped| create_index(&target, k, mapped)),
            )
            .then(value(result))
        })
    })
}

fn filter(call: HostCall) -> Eval {
    let callback = call.args.get(0);
    let this_arg = call.args.get(1);
    with_this_array(call.this, move |obj, len| {
        if let Some(error) = require_callback(&callback) {
            return error;
        }
        with_realm(move |realm| {
            let result = realm.new_array(Vec::new());
            let target = result.cheap_clone();
            let next = Rc::new(Cell::new(0_u32));
            for_each_present(
                obj,
                len,
                callback,
                this_arg,
                Rc::new(move |_, element, selected| {
                    if !selected.to_boolean() {
                        return undefined();
                    }
                    let at = next.get();
                    next.set(at + 1);
                    create_index(&target, at, element)
                }),
            )
            .then(value(result))
        })
    })
}

fn reduce(call: HostCall) -> Eval {
    reduce_with(call, false)
}

fn reduce_right(call: HostCall) -> Eval {
    reduce_with(call, true)
}

/// reduce / reduceRight (ES5 15.4.4.21, 15.4.4.22)
fn reduce_with(call: HostCall, from_right: bool) -> Eval {
    let callback = call.args.get(0);
    let initial = (call.args.len() > 1).then(|| call.args.get(1));
    with_this_array(call.this, move |obj, len| {
        if let Some(error) = require_callback(&callback) {
            return error;
        }
        let order = move |i: u32| if from_right { len - 1 - i } else { i };
        let present = |obj: &JsObjectRef, i: u32| object::has_property(obj, &index_key(order(i)));

        // Without an initial value the first present element seeds the
        // accumulator and iteration starts after it.
        let (seed, start) = match initial {
            Some(initial) => (value(initial), 0),
            None => match (0..len).find(|&i| present(&obj, i)) {
                Some(first) => (get_index(&obj, order(first)), first + 1),
                None => {
                    return throw_error(ErrorKind::TypeError, "Reduce of empty array with no initial value");
                }
            },
        };

        seed.and_value(move |seed| {
            let accumulator = Rc::new(RefCell::new(seed));
            let result = Rc::clone(&accumulator);
            let receiver = JsValue::Object(obj.cheap_clone());
            for_range(
                start,
                len,
                Rc::new(move |i| {
                    let k = order(i);
                    if !object::has_property(&obj, &index_key(k)) {
                        return undefined();
                    }
                    let callback = callback.cheap_clone();
                    let receiver = receiver.cheap_clone();
                    let accumulator = Rc::clone(&accumulator);
                    get_index(&obj, k).and_value(move |element| {
                        let previous = accumulator.borrow().cheap_clone();
                        let args = vec![previous, element, JsValue::from(k), receiver];
                        function::call(&callback, JsValue::Undefined, args).and_value(move |next| {
                            *accumulator.borrow_mut() = next;
                            undefined()
                        })
                    })
                }),
            )
            .then(lazy(move || value(result.borrow().cheap_clone())))
        })
    })
}

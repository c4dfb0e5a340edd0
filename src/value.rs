//! ECMAScript value representation
//!
//! Primitive values, the shared object record, property descriptors and the
//! pure (side-effect free) halves of the type conversions.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::interpreter::Eval;
use crate::interpreter::environment::EnvRef;
use crate::interpreter::function::{BoundFunction, FunctionCode};

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// Makes it explicit at the call site that a clone only bumps a reference count.
pub trait CheapClone: Clone {
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

// ═══════════════════════════════════════════════════════════════════════════════
// Strings
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable, reference-counted string
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in UTF-16 code units, the unit `length` and indexing are defined in.
    pub fn utf16_len(&self) -> usize {
        self.0.encode_utf16().count()
    }

    /// The code unit at `index`, if any.
    pub fn code_unit_at(&self, index: usize) -> Option<u16> {
        self.0.encode_utf16().nth(index)
    }

    pub fn concat(&self, other: &JsString) -> JsString {
        let mut joined = String::with_capacity(self.0.len() + other.0.len());
        joined.push_str(&self.0);
        joined.push_str(&other.0);
        JsString::from(joined)
    }
}

impl CheapClone for JsString {}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(Rc::from(s))
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(Rc::from(s))
    }
}

impl From<&String> for JsString {
    fn from(s: &String) -> Self {
        JsString(Rc::from(s.as_str()))
    }
}

impl std::ops::Deref for JsString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════════════

/// An ECMAScript language value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(JsObjectRef),
}

impl CheapClone for JsValue {}

impl JsValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// Check if this value is null or undefined
    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    pub fn as_object(&self) -> Option<&JsObjectRef> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Check if this value carries a call hook
    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(JsObjectRef::is_callable)
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(obj) if obj.is_callable() => "function",
            JsValue::Object(_) => "object",
        }
    }

    /// ToBoolean (ES5 9.2)
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => !(n.is_nan() || *n == 0.0),
            JsValue::String(s) => !s.as_str().is_empty(),
            JsValue::Object(_) => true,
        }
    }

    /// ToNumber for primitives (ES5 9.3). Objects must go through ToPrimitive
    /// first; here they convert to NaN.
    pub fn to_number_primitive(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => string_to_number(s.as_str()),
            JsValue::Object(_) => f64::NAN,
        }
    }

    /// ToString for primitives (ES5 9.8).
    pub fn to_string_primitive(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Object(obj) => JsString::from(format!("[object {}]", obj.class().name())),
        }
    }

    /// Strict equality (`===`)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// SameValue (ES5 9.12): like `===` but NaN equals NaN and +0 differs from -0.
    pub fn same_value(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Number(a), JsValue::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            _ => self.strict_equals(other),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{b}"),
            JsValue::Number(n) => write!(f, "{n}"),
            JsValue::String(s) => write!(f, "{s:?}"),
            JsValue::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_primitive())
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<u32> for JsValue {
    fn from(n: u32) -> Self {
        JsValue::Number(f64::from(n))
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(f64::from(n))
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

impl From<JsObjectRef> for JsValue {
    fn from(obj: JsObjectRef) -> Self {
        JsValue::Object(obj)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Number conversions
// ═══════════════════════════════════════════════════════════════════════════════

/// ECMAScript whitespace and line terminators (ES5 7.2, 7.3)
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000A}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{2028}'
            | '\u{2029}'
    ) || c.is_whitespace()
}

/// ToNumber applied to a string (ES5 9.3.1)
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return f64::NAN;
        }
        return hex.chars().fold(0.0, |acc, c| {
            acc * 16.0 + f64::from(c.to_digit(16).unwrap_or(0))
        });
    }
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Number::toString (ES5 9.8.1)
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // `{:e}` yields the shortest round-tripping digits, e.g. "1.2345e3"
    let scientific = format!("{n:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let e = point - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let mut chars = digits.chars();
        let first = chars.next().unwrap_or('0');
        let rest: String = chars.collect();
        if rest.is_empty() {
            format!("{first}e{sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", e.abs())
        }
    }
}

/// ToInteger (ES5 9.4)
pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() { 0.0 } else { libm::trunc(n) }
}

/// ToUint32 (ES5 9.6)
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    libm::trunc(n).rem_euclid(4_294_967_296.0) as u32
}

/// ToInt32 (ES5 9.5)
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// Parse a canonical array index ("0", "17", never "017" or "4294967295").
pub fn array_index(key: &str) -> Option<u32> {
    let first = key.chars().next()?;
    if !first.is_ascii_digit() || (first == '0' && key.len() > 1) {
        return None;
    }
    let index: u32 = key.parse().ok()?;
    (index != u32::MAX).then_some(index)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Objects
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared handle to an object record
#[derive(Clone)]
pub struct JsObjectRef(Rc<RefCell<ObjectValue>>);

impl CheapClone for JsObjectRef {}

impl JsObjectRef {
    pub fn new(object: ObjectValue) -> Self {
        JsObjectRef(Rc::new(RefCell::new(object)))
    }

    pub fn borrow(&self) -> Ref<'_, ObjectValue> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ObjectValue> {
        self.0.borrow_mut()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &JsObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn class(&self) -> ClassTag {
        self.0.borrow().class
    }

    pub fn prototype(&self) -> Option<JsObjectRef> {
        self.0.borrow().prototype.clone()
    }

    pub fn is_callable(&self) -> bool {
        self.0.borrow().call.is_some()
    }

    pub fn is_constructor(&self) -> bool {
        self.0.borrow().construct.is_some()
    }
}

impl PartialEq for JsObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for JsObjectRef {}

impl fmt::Debug for JsObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(obj) => match obj.class {
                ClassTag::Function => write!(f, "[Function]"),
                ClassTag::Array => write!(f, "[Array({})]", obj.properties.len().saturating_sub(1)),
                class => write!(f, "[object {}]", class.name()),
            },
            Err(_) => write!(f, "[object <borrowed>]"),
        }
    }
}

/// Internal class tag; selects the specialised object-model branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassTag {
    Object,
    Array,
    Function,
    Error,
    Boolean,
    Number,
    String,
    Date,
    Arguments,
    Math,
    Global,
}

impl ClassTag {
    /// The `[[Class]]` name reported by `Object.prototype.toString`
    pub fn name(self) -> &'static str {
        match self {
            ClassTag::Object => "Object",
            ClassTag::Array => "Array",
            ClassTag::Function => "Function",
            ClassTag::Error => "Error",
            ClassTag::Boolean => "Boolean",
            ClassTag::Number => "Number",
            ClassTag::String => "String",
            ClassTag::Date => "Date",
            ClassTag::Arguments => "Arguments",
            ClassTag::Math => "Math",
            ClassTag::Global => "global",
        }
    }
}

/// A complete property descriptor
#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    Data {
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: JsValue,
        set: JsValue,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor::Data {
            value,
            writable,
            enumerable,
            configurable,
        }
    }

    /// Writable, enumerable, configurable data property (plain assignment)
    pub fn open(value: JsValue) -> Self {
        Self::data(value, true, true, true)
    }

    /// Writable, configurable, non-enumerable (builtin methods)
    pub fn hidden(value: JsValue) -> Self {
        Self::data(value, true, false, true)
    }

    /// Non-writable, non-enumerable, non-configurable
    pub fn frozen(value: JsValue) -> Self {
        Self::data(value, false, false, false)
    }

    pub fn enumerable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { enumerable, .. }
            | PropertyDescriptor::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn configurable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { configurable, .. }
            | PropertyDescriptor::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, PropertyDescriptor::Accessor { .. })
    }

    /// Stored value of a data property
    pub fn value(&self) -> Option<&JsValue> {
        match self {
            PropertyDescriptor::Data { value, .. } => Some(value),
            PropertyDescriptor::Accessor { .. } => None,
        }
    }
}

/// A partial descriptor as accepted by defineOwnProperty; absent fields
/// keep their current (or default) values.
#[derive(Clone, Debug, Default)]
pub struct DescriptorFragment {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub get: Option<JsValue>,
    pub set: Option<JsValue>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl DescriptorFragment {
    /// A fragment carrying only a new value
    pub fn value(value: JsValue) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    pub fn accessor(get: JsValue, set: JsValue, enumerable: bool, configurable: bool) -> Self {
        Self {
            get: Some(get),
            set: Some(set),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_generic(&self) -> bool {
        !self.is_accessor() && !self.is_data()
    }

    pub fn is_empty(&self) -> bool {
        self.is_generic() && self.enumerable.is_none() && self.configurable.is_none()
    }
}

impl From<&PropertyDescriptor> for DescriptorFragment {
    fn from(desc: &PropertyDescriptor) -> Self {
        match desc {
            PropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => Self::data(value.clone(), *writable, *enumerable, *configurable),
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => Self::accessor(get.clone(), set.clone(), *enumerable, *configurable),
        }
    }
}

/// Arguments passed to a hook. Reading past the end yields `undefined`.
#[derive(Clone, Debug, Default)]
pub struct Args(Vec<JsValue>);

impl Args {
    pub fn new(values: Vec<JsValue>) -> Self {
        Args(values)
    }

    pub fn empty() -> Self {
        Args(Vec::new())
    }

    pub fn get(&self, index: usize) -> JsValue {
        self.0.get(index).cloned().unwrap_or(JsValue::Undefined)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[JsValue] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<JsValue> {
        self.0
    }

    /// Values from `start` on (empty if out of range)
    pub fn rest(&self, start: usize) -> Vec<JsValue> {
        self.0.iter().skip(start).cloned().collect()
    }
}

impl From<Vec<JsValue>> for Args {
    fn from(values: Vec<JsValue>) -> Self {
        Args(values)
    }
}

/// Invocation record handed to native hooks
pub struct HostCall {
    /// The function object being invoked
    pub callee: JsObjectRef,
    /// `this` for calls, `undefined` for constructs
    pub this: JsValue,
    pub args: Args,
}

/// Native hook signature
pub type NativeFn = fn(HostCall) -> Eval;

#[derive(Clone)]
pub enum CallHook {
    Native(NativeFn),
    Language(Rc<FunctionCode>),
    Bound(Rc<BoundFunction>),
}

#[derive(Clone)]
pub enum ConstructHook {
    Native(NativeFn),
    /// Allocate from the callee's `prototype`, call, keep an object result.
    Ordinary,
    Bound(Rc<BoundFunction>),
}

/// Parameter-to-index mapping of a non-strict arguments object
#[derive(Clone)]
pub struct ParameterMap {
    pub env: EnvRef,
    /// `names[i]` is the parameter aliased by index `i`, if still mapped
    pub names: Vec<Option<JsString>>,
}

impl ParameterMap {
    pub fn mapped(&self, key: &str) -> Option<&JsString> {
        let index = array_index(key)?;
        self.names.get(index as usize)?.as_ref()
    }

    pub fn unmap(&mut self, key: &str) {
        if let Some(slot) = array_index(key).and_then(|i| self.names.get_mut(i as usize)) {
            *slot = None;
        }
    }
}

#[derive(Clone)]
pub enum InternalSlot {
    /// Boxed Boolean/Number/String value or a Date's time value
    Primitive(JsValue),
    Arguments(ParameterMap),
}

pub type PropertyMap = IndexMap<JsString, PropertyDescriptor, FxBuildHasher>;

/// The object record shared by every kind of object
pub struct ObjectValue {
    pub prototype: Option<JsObjectRef>,
    pub class: ClassTag,
    pub extensible: bool,
    pub properties: PropertyMap,
    pub call: Option<CallHook>,
    pub construct: Option<ConstructHook>,
    pub internal: Option<InternalSlot>,
}

impl ObjectValue {
    pub fn new(class: ClassTag, prototype: Option<JsObjectRef>) -> Self {
        Self {
            prototype,
            class,
            extensible: true,
            properties: PropertyMap::default(),
            call: None,
            construct: None,
            internal: None,
        }
    }

    pub fn with_primitive(mut self, value: JsValue) -> Self {
        self.internal = Some(InternalSlot::Primitive(value));
        self
    }

    pub fn primitive_value(&self) -> Option<&JsValue> {
        match &self.internal {
            Some(InternalSlot::Primitive(value)) => Some(value),
            _ => None,
        }
    }

    pub fn parameter_map(&self) -> Option<&ParameterMap> {
        match &self.internal {
            Some(InternalSlot::Arguments(map)) => Some(map),
            _ => None,
        }
    }

    pub fn own(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    /// Store a descriptor without validation (object construction only)
    pub fn insert(&mut self, key: impl Into<JsString>, desc: PropertyDescriptor) {
        self.properties.insert(key.into(), desc);
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyDescriptor> {
        self.properties.shift_remove(key)
    }
}

/// Strong handles released by a dying object or scope, waiting to be torn
/// down. Long chains (`{ next: { next: ... } }`, closures capturing
/// closures) are freed from this list instead of by nested drops.
#[derive(Default)]
pub(crate) struct Orphans {
    objects: Vec<JsObjectRef>,
    scopes: Vec<EnvRef>,
}

impl Orphans {
    pub(crate) fn value(&mut self, value: JsValue) {
        if let JsValue::Object(obj) = value {
            self.objects.push(obj);
        }
    }

    pub(crate) fn object(&mut self, obj: JsObjectRef) {
        self.objects.push(obj);
    }

    pub(crate) fn scope(&mut self, env: EnvRef) {
        self.scopes.push(env);
    }

    /// Drop everything collected; handles that were the last owner have
    /// their own children moved here first.
    fn release(&mut self) {
        loop {
            if let Some(JsObjectRef(rc)) = self.objects.pop() {
                if let Ok(cell) = Rc::try_unwrap(rc) {
                    cell.into_inner().detach_children(self);
                }
            } else if let Some(env) = self.scopes.pop() {
                env.detach_if_unique(self);
            } else {
                break;
            }
        }
    }
}

impl ObjectValue {
    fn detach_children(&mut self, orphans: &mut Orphans) {
        for (_, desc) in std::mem::take(&mut self.properties) {
            match desc {
                PropertyDescriptor::Data { value, .. } => orphans.value(value),
                PropertyDescriptor::Accessor { get, set, .. } => {
                    orphans.value(get);
                    orphans.value(set);
                }
            }
        }
        if let Some(proto) = self.prototype.take() {
            orphans.object(proto);
        }
        match self.internal.take() {
            Some(InternalSlot::Primitive(value)) => orphans.value(value),
            Some(InternalSlot::Arguments(map)) => orphans.scope(map.env),
            None => {}
        }
        match self.call.take() {
            Some(CallHook::Language(code)) => {
                if let Ok(code) = Rc::try_unwrap(code) {
                    orphans.scope(code.scope);
                }
            }
            Some(CallHook::Bound(bound)) => detach_bound(bound, orphans),
            Some(CallHook::Native(_)) | None => {}
        }
        if let Some(ConstructHook::Bound(bound)) = self.construct.take() {
            detach_bound(bound, orphans);
        }
    }
}

fn detach_bound(bound: Rc<BoundFunction>, orphans: &mut Orphans) {
    if let Ok(bound) = Rc::try_unwrap(bound) {
        orphans.object(bound.target);
        orphans.value(bound.this);
        for arg in bound.args {
            orphans.value(arg);
        }
    }
}

impl Drop for ObjectValue {
    fn drop(&mut self) {
        let mut orphans = Orphans::default();
        self.detach_children(&mut orphans);
        orphans.release();
    }
}

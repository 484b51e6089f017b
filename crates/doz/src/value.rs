//! Dynamically typed values inspected by rules.
//!
//! Rules never know the static type of what they validate, so every input is
//! a [`Value`]. Besides the JSON-like variants, a value can carry the richer
//! types rules produce or inspect: parsed dates, parsed URLs, file metadata,
//! multi-value forms and opaque host objects.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Ordered string-keyed map used for objects and validated data.
pub type Map = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Date(DateTime<Utc>),
    Url(Url),
    File(FileInfo),
    Form(FormData),
    Instance(Instance),
}

impl Value {
    /// Build an object from key/value pairs, keeping their order.
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an array from anything convertible into values.
    pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Date(_) => "date",
            Value::Url(_) => "url",
            Value::File(_) => "file",
            Value::Form(_) => "form",
            Value::Instance(_) => "instance",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileInfo> {
        match self {
            Value::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&FormData> {
        match self {
            Value::Form(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(i) => Some(i),
            _ => None,
        }
    }
}

/// Equality follows "same value zero": `NaN` equals `NaN`, instances compare
/// by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Url(a), Value::Url(b)) => a == b,
            (Value::File(a), Value::File(b)) => a == b,
            (Value::Form(a), Value::Form(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a.same_object(b),
            _ => false,
        }
    }
}

/// Formats a number the way it is listed in messages: integers without a
/// fractional part, `NaN` and `Infinity` spelled out.
pub(crate) fn display_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

pub(crate) fn iso_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&display_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Object(_) | Value::Form(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Value::Date(d) => f.write_str(&iso_timestamp(d)),
            Value::Url(u) => f.write_str(u.as_str()),
            Value::File(file) => f.write_str(&file.name),
            Value::Instance(i) => write!(f, "[object {}]", i.type_name()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                serializer.serialize_i64(*n as i64)
            }
            // serde_json writes non-finite floats as null
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => map.serialize(serializer),
            Value::Date(d) => serializer.serialize_str(&iso_timestamp(d)),
            Value::Url(u) => serializer.serialize_str(u.as_str()),
            Value::File(file) => file.serialize(serializer),
            Value::Form(form) => form.serialize(serializer),
            Value::Instance(i) => serializer.serialize_str(i.type_name()),
        }
    }
}

/// Values deserialize through their JSON shape; the richer variants are only
/// reachable from Rust.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

number_from!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Url> for Value {
    fn from(u: Url) -> Self {
        Value::Url(u)
    }
}

impl From<FileInfo> for Value {
    fn from(f: FileInfo) -> Self {
        Value::File(f)
    }
}

impl From<FormData> for Value {
    fn from(f: FormData) -> Self {
        Value::Form(f)
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Value::Instance(i)
    }
}

/// Metadata of an uploaded file. Rules only look at these fields and never
/// read file contents.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileInfo {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Declared MIME type, empty when unknown
    #[serde(rename = "type", default)]
    pub content_type: String,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: String::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Text after the last `.` of the name, if there is a non-empty one.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// One entry of a [`FormData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    Text(String),
    File(FileInfo),
}

impl From<&str> for FormEntry {
    fn from(s: &str) -> Self {
        FormEntry::Text(s.to_string())
    }
}

impl From<String> for FormEntry {
    fn from(s: String) -> Self {
        FormEntry::Text(s)
    }
}

impl From<FileInfo> for FormEntry {
    fn from(f: FileInfo) -> Self {
        FormEntry::File(f)
    }
}

impl From<&FormEntry> for Value {
    fn from(entry: &FormEntry) -> Self {
        match entry {
            FormEntry::Text(s) => Value::String(s.clone()),
            FormEntry::File(f) => Value::File(f.clone()),
        }
    }
}

/// Multi-value form payload. Keys may repeat; order of appends is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormEntry)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, keeping any existing entries under the same key.
    pub fn append(&mut self, key: impl Into<String>, entry: impl Into<FormEntry>) {
        self.entries.push((key.into(), entry.into()));
    }

    /// Builder form of [`FormData::append`].
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<FormEntry>) -> Self {
        self.append(key, entry);
        self
    }

    /// First entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FormEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FormEntry> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, e)| e)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }
}

impl Serialize for FormData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut grouped: IndexMap<&str, Vec<Value>> = IndexMap::new();
        for (key, entry) in self.iter() {
            grouped.entry(key).or_default().push(Value::from(entry));
        }

        let mut map = serializer.serialize_map(Some(grouped.len()))?;
        for (key, mut values) in grouped {
            if values.len() == 1 {
                map.serialize_entry(key, &values.remove(0))?;
            } else {
                map.serialize_entry(key, &values)?;
            }
        }
        map.end()
    }
}

/// Runtime class of a value, as checked by the `instance_of` rule.
///
/// [`Value`] has no boxed form of its scalars, so the built-in `STRING`,
/// `NUMBER` and `BOOLEAN` classes match plain strings, numbers and booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Class {
    name: &'static str,
    kind: ClassKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ClassKind {
    Date,
    Url,
    File,
    FormData,
    Array,
    Object,
    String,
    Number,
    Boolean,
    Type(TypeId),
}

impl Class {
    pub const DATE: Class = Class::builtin("Date", ClassKind::Date);
    pub const URL: Class = Class::builtin("URL", ClassKind::Url);
    pub const FILE: Class = Class::builtin("File", ClassKind::File);
    pub const FORM_DATA: Class = Class::builtin("FormData", ClassKind::FormData);
    pub const ARRAY: Class = Class::builtin("Array", ClassKind::Array);
    pub const OBJECT: Class = Class::builtin("Object", ClassKind::Object);
    pub const STRING: Class = Class::builtin("String", ClassKind::String);
    pub const NUMBER: Class = Class::builtin("Number", ClassKind::Number);
    pub const BOOLEAN: Class = Class::builtin("Boolean", ClassKind::Boolean);

    const fn builtin(name: &'static str, kind: ClassKind) -> Self {
        Self { name, kind }
    }

    /// Class matching [`Instance`] values that wrap a `T`.
    pub fn of<T: Any>() -> Self {
        Self::named::<T>(short_type_name::<T>())
    }

    /// Like [`Class::of`] with an explicit display name.
    pub fn named<T: Any>(name: &'static str) -> Self {
        Self {
            name,
            kind: ClassKind::Type(TypeId::of::<T>()),
        }
    }

    /// Name used in failure messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `value` belongs to this class, directly or through an ancestor
    /// its instance declares. Built-in classes match their [`Value`] variant.
    pub fn matches(&self, value: &Value) -> bool {
        let direct = match self.kind {
            ClassKind::Date => matches!(value, Value::Date(_)),
            ClassKind::Url => matches!(value, Value::Url(_)),
            ClassKind::File => matches!(value, Value::File(_)),
            ClassKind::FormData => matches!(value, Value::Form(_)),
            ClassKind::Array => matches!(value, Value::Array(_)),
            ClassKind::Object => matches!(value, Value::Object(_)),
            ClassKind::String => matches!(value, Value::String(_)),
            ClassKind::Number => matches!(value, Value::Number(_)),
            ClassKind::Boolean => matches!(value, Value::Bool(_)),
            ClassKind::Type(id) => {
                matches!(value, Value::Instance(i) if i.inner.as_ref().type_id() == id)
            }
        };

        direct || matches!(value, Value::Instance(i) if i.ancestors.contains(self))
    }
}

fn short_type_name<T: Any>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Opaque host object wrapped into a [`Value`].
#[derive(Clone)]
pub struct Instance {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    ancestors: Vec<Class>,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: short_type_name::<T>(),
            ancestors: Vec::new(),
        }
    }

    /// Declare a class this instance also belongs to, such as a base type.
    pub fn extends(mut self, class: Class) -> Self {
        self.ancestors.push(class);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_ref().type_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_ref().downcast_ref::<T>()
    }

    fn same_object(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("ancestors", &self.ancestors)
            .finish()
    }
}

//! Standard value types with built-in persistence fixes.
//!
//! Their serde type names are the keys the built-in delegates are
//! registered under, see [`crate::codec::fixes`]. The names carry a
//! `satchel::` prefix so a bean's own `ListModel` or `Rect` keeps its
//! plain encoding.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{self, Serialize, SerializeStruct, Serializer};
use url::Url;

pub const LIST_MODEL_TYPE: &str = "satchel::ListModel";
pub const FILE_PATH_TYPE: &str = "satchel::FilePath";
pub const LOCATOR_TYPE: &str = "satchel::Locator";
pub const RECT_TYPE: &str = "satchel::Rect";

/// Largest size a stored list model may declare beyond the elements it
/// actually carries
pub const LIST_MODEL_SIZE_LIMIT: usize = 1 << 20;

/// Validate a stored list size against the number of values stored with it
pub fn check_list_size(size: u64, stored: usize) -> Result<usize, String> {
    match usize::try_from(size) {
        Ok(size) if size <= stored.max(LIST_MODEL_SIZE_LIMIT) => Ok(size),
        _ => Err(format!(
            "list size {} exceeds the {} stored values and the limit of {}",
            size, stored, LIST_MODEL_SIZE_LIMIT
        )),
    }
}

/// Mutable list whose slots may be empty, the model behind list widgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListModel<T> {
    slots: Vec<Option<T>>,
}

impl<T> ListModel<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Element at `index`; `None` for empty slots and out of range
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Replace slot `index`, returning its previous content
    pub fn set(&mut self, index: usize, value: Option<T>) -> Option<T> {
        std::mem::replace(&mut self.slots[index], value)
    }

    pub fn add(&mut self, value: T) {
        self.slots.push(Some(value));
    }

    pub fn insert(&mut self, index: usize, value: Option<T>) {
        self.slots.insert(index, value);
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.slots.remove(index)
    }

    /// Grow with empty slots or truncate to `size`
    pub fn set_size(&mut self, size: usize) {
        self.slots.resize_with(size, || None);
    }

    pub fn slots(&self) -> &[Option<T>] {
        &self.slots
    }

    /// Occupied elements in order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }
}

impl<T> Default for ListModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for ListModel<T> {
    fn from(values: Vec<T>) -> Self {
        Self {
            slots: values.into_iter().map(Some).collect(),
        }
    }
}

impl<T> FromIterator<T> for ListModel<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(Some).collect(),
        }
    }
}

impl<T: Serialize> Serialize for ListModel<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct(LIST_MODEL_TYPE, 2)?;
        state.serialize_field("size", &self.slots.len())?;
        state.serialize_field("elements", &self.slots)?;
        state.end()
    }
}

#[derive(serde::Deserialize)]
#[serde(rename = "satchel::ListModel")]
struct RawListModel<T> {
    size: u64,
    #[serde(default = "Vec::new")]
    elements: Vec<Option<T>>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ListModel<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawListModel::<T>::deserialize(deserializer)?;
        let size = check_list_size(raw.size, raw.elements.len()).map_err(de::Error::custom)?;
        // Sizing first leaves `size` empty slots; elements then fill them in order
        let mut model = ListModel::new();
        model.set_size(size);
        for (index, element) in raw.elements.into_iter().enumerate() {
            if index < size {
                model.set(index, element);
            } else {
                model.insert(index, element);
            }
        }
        Ok(model)
    }
}

/// A filesystem path value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(PathBuf);

impl FilePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl From<PathBuf> for FilePath {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl Serialize for FilePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Paths are stored as text, which must not lose bytes
        let path = self
            .0
            .to_str()
            .ok_or_else(|| ser::Error::custom(format!("path {:?} is not valid UTF-8", self.0)))?;
        let path = Path::new(path);
        let mut state = serializer.serialize_struct(FILE_PATH_TYPE, 4)?;
        state.serialize_field("path", path)?;
        state.serialize_field("name", &path.file_name().and_then(|n| n.to_str()))?;
        state.serialize_field("parent", &path.parent().and_then(Path::to_str))?;
        state.serialize_field("absolute", &self.0.is_absolute())?;
        state.end()
    }
}

#[derive(serde::Deserialize)]
#[serde(rename = "satchel::FilePath")]
struct RawFilePath {
    path: String,
}

impl<'de> Deserialize<'de> for FilePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Everything else is derived from the path
        let raw = RawFilePath::deserialize(deserializer)?;
        Ok(FilePath(PathBuf::from(raw.path)))
    }
}

/// A network locator value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(Url);

impl Locator {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Locator)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Canonical string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Url> for Locator {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct(LOCATOR_TYPE, 7)?;
        state.serialize_field("href", self.0.as_str())?;
        state.serialize_field("scheme", self.0.scheme())?;
        state.serialize_field("host", &self.0.host_str())?;
        state.serialize_field("port", &self.0.port())?;
        state.serialize_field("path", self.0.path())?;
        state.serialize_field("query", &self.0.query())?;
        state.serialize_field("fragment", &self.0.fragment())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LocatorVisitor)
    }
}

/// Accepts the canonical string or the structured form carrying `href`
struct LocatorVisitor;

impl<'de> de::Visitor<'de> for LocatorVisitor {
    type Value = Locator;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a locator string or a structure with an href")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Locator, E> {
        Locator::parse(v).map_err(E::custom)
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Locator, A::Error> {
        let mut href: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "href" {
                href = Some(map.next_value()?);
            } else {
                map.next_value::<de::IgnoredAny>()?;
            }
        }
        let href = href.ok_or_else(|| de::Error::missing_field("href"))?;
        Locator::parse(&href).map_err(de::Error::custom)
    }
}

/// Integer rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename = "satchel::Rect")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

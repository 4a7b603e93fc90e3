use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            Value::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// Insertion-ordered field map.
///
/// Re-inserting a key replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    pub fn new() -> Self {
        Fields::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn extend(&mut self, other: Fields) {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Which region table an IOL calculation sheet was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IolLayout {
    Haigis,
    HolladaySrkT,
}

/// One candidate lens with its power/refraction table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lens {
    pub name: String,
    /// `iol_<n>`/`ref_<n>` pairs, `iolbold`/`refbold`, and label fields.
    #[serde(flatten)]
    pub fields: Fields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IolEye {
    #[serde(flatten)]
    pub fields: Fields,
    #[serde(serialize_with = "serialize_lenses")]
    pub lenses: Vec<Lens>,
}

impl IolEye {
    /// Add a lens, replacing an earlier lens of the same name in place.
    pub fn insert_lens(&mut self, lens: Lens) {
        match self.lenses.iter_mut().find(|l| l.name == lens.name) {
            Some(existing) => *existing = lens,
            None => self.lenses.push(lens),
        }
    }

    pub fn lens(&self, name: &str) -> Option<&Lens> {
        self.lenses.iter().find(|l| l.name == name)
    }
}

fn serialize_lenses<S: Serializer>(lenses: &[Lens], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(lenses.len()))?;
    for lens in lenses {
        map.serialize_entry(&lens.name, lens)?;
    }
    map.end()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IolReport {
    pub filename: String,
    pub title: String,
    #[serde(skip)]
    pub layout: IolLayout,
    #[serde(flatten)]
    pub header: Fields,
    pub od: IolEye,
    pub os: IolEye,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MmtReport {
    pub filename: String,
    pub title: String,
    #[serde(flatten)]
    pub header: Fields,
    pub od: Fields,
    pub os: Fields,
    /// Reconstructed line texts, keyed `region_<name>_<line>`; empty unless requested.
    #[serde(flatten)]
    pub regions: Fields,
}

/// Report whose title matched no layout, or matched only a family prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnrecognizedReport {
    pub filename: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Iol(IolReport),
    Mmt(MmtReport),
    Unrecognized(UnrecognizedReport),
}

impl Report {
    pub fn filename(&self) -> &str {
        match self {
            Report::Iol(r) => &r.filename,
            Report::Mmt(r) => &r.filename,
            Report::Unrecognized(r) => &r.filename,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Report::Iol(r) => &r.title,
            Report::Mmt(r) => &r.title,
            Report::Unrecognized(r) => &r.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnrecognizedReport,
    UnrecognizedSubVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub message: String,
}

/// A parsed report plus the non-fatal problems met while parsing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedReport {
    pub report: Report,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
}

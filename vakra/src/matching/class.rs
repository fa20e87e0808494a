//! Road-class normalisation and cross-dataset equivalence.
//!
//! Class labels come from two vocabularies (French topographic "nature"
//! values and crowd-sourced `highway` tags). Both are normalised the same way
//! and the topographic values are then mapped onto the crowd-sourced ones,
//! so compatibility is a plain equality of canonical keys.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config::ConfigLoadError;

/// Maps a raw class label to a canonical key.
///
/// Two elements are class-compatible when both canonical keys exist and are
/// equal. A missing key is never compatible with anything.
pub trait ClassCompatibility: Send + Sync {
    /// Canonical key of a raw label, `None` when the label is empty.
    fn canonical(&self, raw: &str) -> Option<String>;

    /// Whether two raw labels are compatible.
    fn compatible(&self, a: &str, b: &str) -> bool {
        match (self.canonical(a), self.canonical(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Compatibility by normalised label only, without any vocabulary mapping.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizedClass;

impl ClassCompatibility for NormalizedClass {
    fn canonical(&self, raw: &str) -> Option<String> {
        normalize_class(raw)
    }
}

/// Normalise a class label.
///
/// Trims and lower-cases, strips accents through compatibility
/// decomposition (NFKD), drops whatever is still outside ASCII (except the
/// `œ`/`æ` ligatures, spelled out), turns `/ \ , ;` into spaces and
/// collapses whitespace. Empty results become `None`.
///
/// # Example
/// ```
/// use vakra::matching::normalize_class;
///
/// assert_eq!(normalize_class("  Route à 2 Chaussées "), Some("route a 2 chaussees".into()));
/// assert_eq!(normalize_class("Chemin/Piste"), Some("chemin piste".into()));
/// assert_eq!(normalize_class(" ; "), None);
/// ```
pub fn normalize_class(raw: &str) -> Option<String> {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().nfkd() {
        match c {
            'œ' => folded.push_str("oe"),
            'æ' => folded.push_str("ae"),
            '/' | '\\' | ',' | ';' => folded.push(' '),
            c if c.is_ascii() => folded.push(c),
            // Combining marks and non-Latin letters
            _ => {}
        }
    }

    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Default topographic-nature to crowd-sourced-highway table
/// (keys and values already normalised).
const DEFAULT_MAPPING: &[(&str, &str)] = &[
    ("autoroute", "motorway"),
    ("bretelle", "motorway_link"),
    ("bretelle d autoroute", "motorway_link"),
    ("route a 2 chaussees", "trunk"),
    ("route principale", "primary"),
    ("route secondaire", "secondary"),
    ("route tertiaire", "tertiary"),
    ("route communale", "unclassified"),
    ("chemin", "track"),
    ("piste", "track"),
    ("piste cyclable", "cycleway"),
    ("rond point", "junction"),
    ("aire de service", "service"),
    ("voie de desserte", "service"),
];

/// Class vocabulary mapping applied after normalisation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMapping {
    entries: HashMap<String, String>,
}

impl Default for ClassMapping {
    fn default() -> Self {
        Self {
            entries: DEFAULT_MAPPING
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl ClassMapping {
    /// A mapping with no entries (normalisation only).
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace one entry. Key and value are normalised; entries whose
    /// key or value normalise to nothing are ignored.
    pub fn insert(&mut self, from: &str, to: &str) {
        if let (Some(k), Some(v)) = (normalize_class(from), normalize_class(to)) {
            self.entries.insert(k, v);
        }
    }

    /// Default table extended (and overridden) by `overrides`.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        for (from, to) in overrides {
            self.insert(from, to);
        }
        self
    }

    /// Default table extended by a YAML map of `raw: canonical` overrides.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let user: HashMap<String, String> =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        Ok(Self::default().with_overrides(user.iter().map(|(k, v)| (k.as_str(), v.as_str()))))
    }

    /// Load overrides from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigLoadError::Io(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_yaml(&contents)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClassCompatibility for ClassMapping {
    fn canonical(&self, raw: &str) -> Option<String> {
        let key = normalize_class(raw)?;
        match self.entries.get(&key) {
            Some(mapped) => Some(mapped.clone()),
            None => Some(key),
        }
    }
}

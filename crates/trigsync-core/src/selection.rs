//! Trigger selections and the merge that turns them into desired state.
//!
//! A [`SelectionSet`] maps trigger kinds to the templates chosen for them.
//! The merge folds freshly answered [`SelectionFragment`]s over the
//! previously persisted set with union semantics: re-running the flow never
//! drops a previously configured module on its own. Templates only go away
//! when the caller names them in an explicit [`Removal`] (the user unchecked
//! a pre-checked default) or when their whole kind is not re-selected.

use crate::error::{Result, TriggerError};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// TemplateList
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Ordered set of template ids. A bare string deserializes as a
/// one-element list; serialization always emits a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateList(IndexSet<String>);

impl<'de> Deserialize<'de> for TemplateList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(s) => TemplateList::from_iter([s]),
            OneOrMany::Many(v) => TemplateList::from_iter(v),
        })
    }
}

impl TemplateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `template` at the end unless already present.
    pub fn insert(&mut self, template: impl Into<String>) -> bool {
        self.0.insert(template.into())
    }

    pub fn remove(&mut self, template: &str) -> bool {
        self.0.shift_remove(template)
    }

    pub fn union_with(&mut self, other: &TemplateList) {
        for t in other.iter() {
            self.insert(t);
        }
    }

    pub fn contains(&self, template: &str) -> bool {
        self.0.contains(template)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TemplateList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = TemplateList::new();
        for t in iter {
            list.insert(t);
        }
        list
    }
}

// ---------------------------------------------------------------------------
// SelectionSet
// ---------------------------------------------------------------------------

/// Trigger kind -> chosen templates, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(IndexMap<String, TemplateList>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted form: kind -> template id or list of ids.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a persisted previous selection. Blank input means there is none.
    pub fn parse_previous(s: Option<&str>) -> Result<Option<Self>> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::from_json_str(s).map(Some),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn insert(&mut self, kind: impl Into<String>, templates: TemplateList) {
        self.0.insert(kind.into(), templates);
    }

    pub fn get(&self, kind: &str) -> Option<&TemplateList> {
        self.0.get(kind)
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateList)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, TemplateList)> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = (K, TemplateList)>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Fragments and removals
// ---------------------------------------------------------------------------

/// The answer for one trigger kind, as collected by the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFragment {
    pub kind: String,
    pub templates: TemplateList,
}

impl SelectionFragment {
    pub fn new(kind: impl Into<String>, templates: TemplateList) -> Self {
        Self {
            kind: kind.into(),
            templates,
        }
    }

    /// Parse a serialized single-key fragment such as `{"PreSignUp":"recaptcha"}`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let set = SelectionSet::from_json_str(s)?;
        if set.len() != 1 {
            return Err(TriggerError::InvalidFragment(set.len()));
        }
        let (kind, templates) = set.0.into_iter().next().ok_or(TriggerError::InvalidFragment(0))?;
        Ok(Self { kind, templates })
    }
}

/// A template the user explicitly unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Removal {
    pub kind: String,
    pub template: String,
}

impl Removal {
    pub fn new(kind: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            template: template.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// DesiredState
// ---------------------------------------------------------------------------

/// Merged selection that reconciliation works from. No kind ever maps to an
/// empty template list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DesiredState(SelectionSet);

impl DesiredState {
    /// Adopt `set` as desired state, dropping kinds with no templates.
    pub fn from_selection(set: SelectionSet) -> Self {
        let pruned = set.0.into_iter().filter(|(_, t)| !t.is_empty()).collect();
        DesiredState(SelectionSet(pruned))
    }

    pub fn as_selection(&self) -> &SelectionSet {
        &self.0
    }

    pub fn into_selection(self) -> SelectionSet {
        self.0
    }

    pub fn get(&self, kind: &str) -> Option<&TemplateList> {
        self.0.get(kind)
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.0.contains_kind(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.kinds()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateList)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String> {
        self.0.to_json_string()
    }

    /// One fragment per kind, in order.
    pub fn fragments(&self) -> Vec<SelectionFragment> {
        self.iter()
            .map(|(k, t)| SelectionFragment::new(k, t.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Fold `current` fragments over `previous` into a [`DesiredState`].
///
/// Each fragment's templates are unioned into its kind; the previous
/// templates of that kind are unioned in as well. `removals` are applied
/// after the union, then empty kinds are dropped. Kinds that appear only in
/// `previous` are not carried over.
pub fn merge(
    current: &[SelectionFragment],
    previous: Option<&SelectionSet>,
    removals: &[Removal],
) -> DesiredState {
    let mut merged = SelectionSet::new();
    for fragment in current {
        let entry = merged.0.entry(fragment.kind.clone()).or_default();
        entry.union_with(&fragment.templates);
        if let Some(prev) = previous.and_then(|p| p.get(&fragment.kind)) {
            entry.union_with(prev);
        }
    }

    for removal in removals {
        if let Some(templates) = merged.0.get_mut(&removal.kind) {
            templates.remove(&removal.template);
        }
    }

    DesiredState::from_selection(merged)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Facet filter engine.
//!
//! A facet (dimension) is a named axis of classification such as `colors`,
//! `continent` or `side`. Dimensions are plain data: the engine is driven by a
//! list of [`FacetSpec`]s, so adding a dimension never needs new control flow.
//!
//! ## Matching
//!
//! Each dimension declares how a selection is matched against an item:
//!
//! | `match` | Meaning | Typical use |
//! |---------|---------|-------------|
//! | `all`   | every selected value must be on the item (subset, AND) | colors painted on one bollard |
//! | `any`   | at least one selected value must be on the item (membership, OR) | the one continent a bollard is from |
//!
//! Dimensions combine with AND. A dimension with nothing selected imposes no
//! constraint.
//!
//! ## Containment
//!
//! Values compare by equality (`exact`, the default). A dimension configured
//! with `substring` instead accepts a selected value when it occurs inside one
//! of the item's values, so selecting `left` matches an item tagged
//! `left-and-right`.

use crate::types::{Catalog, CatalogItem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How the selected values of one dimension combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Subset semantics: the item must carry every selected value.
    #[default]
    All,
    /// Membership semantics: the item must carry at least one selected value.
    Any,
}

/// How a single selected value is compared with an item's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Containment {
    #[default]
    Exact,
    Substring,
}

/// Configuration of one facet dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacetSpec {
    /// Key of the dimension in the catalog document (e.g. `colors`).
    pub key: String,
    /// Heading shown above the checkboxes. Falls back to `key`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(rename = "match", default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub containment: Containment,
}

impl FacetSpec {
    pub fn new(key: impl Into<String>, match_mode: MatchMode) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            match_mode,
            containment: Containment::Exact,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_containment(mut self, containment: Containment) -> Self {
        self.containment = containment;
        self
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

/// The stock dimensions of the bollard catalog.
pub fn default_specs() -> Vec<FacetSpec> {
    vec![
        FacetSpec::new("colors", MatchMode::All).with_label("Color"),
        FacetSpec::new("continent", MatchMode::Any).with_label("Continent"),
        FacetSpec::new("side", MatchMode::Any).with_label("Side"),
    ]
}

// ============================================================================
// Derived options
// ============================================================================

/// Sorted distinct values per configured dimension, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DerivedFacetOptions {
    dimensions: Vec<FacetOptions>,
}

/// Available values of one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub key: String,
    pub values: Vec<String>,
}

impl DerivedFacetOptions {
    /// Values for `dimension`; empty for unknown dimensions.
    pub fn get(&self, dimension: &str) -> &[String] {
        self.dimensions
            .iter()
            .find(|d| d.key == dimension)
            .map(|d| d.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FacetOptions> {
        self.dimensions.iter()
    }

    /// True when no dimension has any value.
    pub fn is_empty(&self) -> bool {
        self.dimensions.iter().all(|d| d.values.is_empty())
    }
}

/// Collect, dedupe and sort the values each configured dimension takes across
/// the catalog. Every spec gets an entry, even when no item carries it.
pub fn derive_options(catalog: &Catalog, specs: &[FacetSpec]) -> DerivedFacetOptions {
    let dimensions = specs
        .iter()
        .map(|spec| {
            let values: BTreeSet<&str> = catalog
                .iter()
                .flat_map(|item| item.tag_values(&spec.key).iter().map(String::as_str))
                .collect();
            FacetOptions {
                key: spec.key.clone(),
                values: values.into_iter().map(str::to_string).collect(),
            }
        })
        .collect();
    DerivedFacetOptions { dimensions }
}

/// Number of items carrying each value of `dimension`.
pub fn option_counts(catalog: &Catalog, dimension: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in catalog.iter().flat_map(|item| item.tag_values(dimension)) {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

// ============================================================================
// Selection
// ============================================================================

/// Currently selected values, per dimension.
///
/// Dimensions whose selection becomes empty are dropped, so toggling a value
/// twice yields a selection equal to the one you started with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSelection {
    by_dimension: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the dimension's selection, or remove it if present.
    ///
    /// Returns whether the value is selected afterwards.
    pub fn toggle(&mut self, dimension: &str, value: &str) -> bool {
        let selected = self.by_dimension.entry(dimension.to_string()).or_default();
        let now_selected = if selected.remove(value) {
            false
        } else {
            selected.insert(value.to_string());
            true
        };
        if selected.is_empty() {
            self.by_dimension.remove(dimension);
        }
        now_selected
    }

    pub fn is_selected(&self, dimension: &str, value: &str) -> bool {
        self.by_dimension
            .get(dimension)
            .is_some_and(|selected| selected.contains(value))
    }

    /// Selected values of `dimension`, sorted.
    pub fn selected(&self, dimension: &str) -> Vec<&str> {
        self.by_dimension
            .get(dimension)
            .map(|selected| selected.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// True when no dimension constrains the visible set.
    pub fn is_empty(&self) -> bool {
        self.by_dimension.is_empty()
    }

    /// Number of selected values across all dimensions.
    pub fn len(&self) -> usize {
        self.by_dimension.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.by_dimension.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Parse a `dimension=value` command-line selection.
pub fn parse_selection_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((dimension, value)) if !dimension.trim().is_empty() && !value.trim().is_empty() => {
            Ok((dimension.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected DIMENSION=VALUE, got '{arg}'")),
    }
}

// ============================================================================
// Visibility
// ============================================================================

/// Whether `item` satisfies every dimension with an active selection.
///
/// Selections on dimensions without a spec match with `all`/`exact`.
pub fn item_matches(item: &CatalogItem, specs: &[FacetSpec], selection: &FilterSelection) -> bool {
    selection.iter().all(|(dimension, selected)| {
        let (mode, containment) = specs
            .iter()
            .find(|spec| spec.key == dimension)
            .map(|spec| (spec.match_mode, spec.containment))
            .unwrap_or_default();
        dimension_matches(item.tag_values(dimension), selected, mode, containment)
    })
}

fn dimension_matches(
    values: &BTreeSet<String>,
    selected: &BTreeSet<String>,
    mode: MatchMode,
    containment: Containment,
) -> bool {
    if selected.is_empty() {
        return true;
    }
    let carries = |wanted: &String| match containment {
        Containment::Exact => values.contains(wanted),
        Containment::Substring => values.iter().any(|v| v.contains(wanted.as_str())),
    };
    match mode {
        MatchMode::All => selected.iter().all(carries),
        MatchMode::Any => selected.iter().any(carries),
    }
}

/// The items visible under `selection`, in catalog order.
pub fn compute_visible<'a>(
    catalog: &'a Catalog,
    specs: &[FacetSpec],
    selection: &FilterSelection,
) -> Vec<&'a CatalogItem> {
    catalog
        .iter()
        .filter(|item| item_matches(item, specs, selection))
        .collect()
}

/// Facet specs plus the live selection, scoped to one page view.
#[derive(Debug, Clone)]
pub struct FacetEngine {
    specs: Vec<FacetSpec>,
    selection: FilterSelection,
}

impl FacetEngine {
    pub fn new(specs: Vec<FacetSpec>) -> Self {
        Self {
            specs,
            selection: FilterSelection::new(),
        }
    }

    pub fn specs(&self) -> &[FacetSpec] {
        &self.specs
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn toggle(&mut self, dimension: &str, value: &str) -> bool {
        self.selection.toggle(dimension, value)
    }

    pub fn derive_options(&self, catalog: &Catalog) -> DerivedFacetOptions {
        derive_options(catalog, &self.specs)
    }

    pub fn compute_visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a CatalogItem> {
        compute_visible(catalog, &self.specs, &self.selection)
    }
}

//! Shared types used by the loader, the facet engine and the presentation layer.
//!
//! Tags are stored uniformly as sets: a dimension that the catalog document
//! writes as a single string (`continent: Europe`) ends up as a one-element
//! set, exactly like a list (`colors: [red, white]`). How a dimension is
//! matched is decided by its [`FacetSpec`](crate::facets::FacetSpec), never by
//! the shape the value had on disk.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

static NO_VALUES: BTreeSet<String> = BTreeSet::new();

/// One tagged reference image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Opaque asset reference (`src` in the catalog document).
    pub image_ref: String,
    /// Human-readable caption (`name`).
    pub display_label: String,
    /// Accessibility text (`alt`), carried through unchanged.
    pub alt_text: String,
    /// Dimension name → values. Dimensions the item does not carry are absent.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, BTreeSet<String>>,
}

impl CatalogItem {
    pub fn new(
        image_ref: impl Into<String>,
        display_label: impl Into<String>,
        alt_text: impl Into<String>,
    ) -> Self {
        Self {
            image_ref: image_ref.into(),
            display_label: display_label.into(),
            alt_text: alt_text.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Builder-style helper that adds values to a dimension.
    pub fn with_tag<I, S>(mut self, dimension: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .entry(dimension.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Values carried for `dimension`; empty when the item lacks it.
    pub fn tag_values(&self, dimension: &str) -> &BTreeSet<String> {
        self.tags.get(dimension).unwrap_or(&NO_VALUES)
    }
}

/// Ordered, immutable list of items published by the loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    /// Every dimension name used by at least one item, sorted.
    pub fn dimensions(&self) -> BTreeSet<&str> {
        self.items
            .iter()
            .flat_map(|item| item.tags.keys().map(String::as_str))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

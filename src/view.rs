//! Page view: one catalog, one selection, one lifecycle.
//!
//! A [`PageView`] starts in [`LoadState::Loading`] with an empty catalog, so
//! options and the visible set are empty too. The single transition to
//! [`LoadState::Ready`] happens when the load completes, successfully or not.
//! A failed load leaves the catalog empty and keeps the error message, which
//! lets the presentation tell "nothing matched" apart from "nothing loaded".
//!
//! Options are derived once, when the catalog is published. The visible set is
//! recomputed on every toggle. Toggling while loading is allowed: the
//! selection is kept and applied once the catalog arrives.

use crate::catalog::{self, CatalogError, CatalogSource};
use crate::facets::{DerivedFacetOptions, FacetEngine, FacetSpec, FilterSelection};
use crate::types::{Catalog, CatalogItem};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready,
}

/// Raw counts for the diagnostics panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub total: usize,
    pub visible: usize,
    /// Selected values per dimension, sorted.
    pub selections: BTreeMap<String, Vec<String>>,
}

/// Everything the presentation layer reads, in one serializable value.
#[derive(Debug, Serialize)]
pub struct ViewSnapshot<'a> {
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub options: &'a DerivedFacetOptions,
    pub selection: &'a FilterSelection,
    pub images: Vec<&'a CatalogItem>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug)]
pub struct PageView {
    engine: FacetEngine,
    state: LoadState,
    catalog: Catalog,
    load_error: Option<String>,
    options: DerivedFacetOptions,
    /// Indices into `catalog` of the visible items.
    visible: Vec<usize>,
}

impl PageView {
    pub fn new(specs: Vec<FacetSpec>) -> Self {
        let engine = FacetEngine::new(specs);
        let catalog = Catalog::default();
        let options = engine.derive_options(&catalog);
        Self {
            engine,
            state: LoadState::Loading,
            catalog,
            load_error: None,
            options,
            visible: Vec::new(),
        }
    }

    /// Fetch the catalog from `source` and complete the load.
    ///
    /// Does nothing, without fetching, if the view is already `Ready`.
    pub async fn load(&mut self, source: &CatalogSource) {
        if self.state == LoadState::Ready {
            warn!(source = %source, "ignoring a second catalog load for this page view");
            return;
        }
        let result = catalog::fetch_catalog(source).await;
        if let Err(err) = &result {
            warn!(source = %source, error = %err, "catalog unavailable");
        }
        self.complete_load(result);
    }

    /// Publish the outcome of the load and move to `Ready`.
    ///
    /// Returns `false`, changing nothing, if the view is already `Ready`.
    pub fn complete_load(&mut self, result: Result<Catalog, CatalogError>) -> bool {
        if self.state == LoadState::Ready {
            warn!("ignoring a second catalog load for this page view");
            return false;
        }
        match result {
            Ok(catalog) => self.catalog = catalog,
            Err(err) => {
                self.catalog = Catalog::default();
                self.load_error = Some(err.to_string());
            }
        }
        self.state = LoadState::Ready;
        self.options = self.engine.derive_options(&self.catalog);
        self.refresh_visible();
        info!(
            items = self.catalog.len(),
            visible = self.visible.len(),
            "page view ready"
        );
        true
    }

    /// Toggle `value` in `dimension`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, dimension: &str, value: &str) -> bool {
        let selected = self.engine.toggle(dimension, value);
        self.refresh_visible();
        selected
    }

    fn refresh_visible(&mut self) {
        self.visible = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                crate::facets::item_matches(item, self.engine.specs(), self.engine.selection())
            })
            .map(|(idx, _)| idx)
            .collect();
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Why the catalog is empty, if the load failed.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn specs(&self) -> &[FacetSpec] {
        self.engine.specs()
    }

    pub fn options(&self) -> &DerivedFacetOptions {
        &self.options
    }

    pub fn selection(&self) -> &FilterSelection {
        self.engine.selection()
    }

    /// Visible items, in catalog order.
    pub fn visible(&self) -> Vec<&CatalogItem> {
        self.visible.iter().map(|&idx| &self.catalog.items[idx]).collect()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let selections = self
            .selection()
            .iter()
            .map(|(dimension, values)| (dimension.to_string(), values.iter().cloned().collect()))
            .collect();
        Diagnostics {
            total: self.catalog.len(),
            visible: self.visible.len(),
            selections,
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        ViewSnapshot {
            loading: self.is_loading(),
            error: self.load_error(),
            options: &self.options,
            selection: self.selection(),
            images: self.visible(),
            diagnostics: self.diagnostics(),
        }
    }
}

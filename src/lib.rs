//! # Bollard Findr
//!
//! Browse a small curated catalog of roadside bollard photos and narrow it
//! down with checkbox facet filters (color, continent, mounting side).
//!
//! # Architecture: Load Once, Filter Often
//!
//! ```text
//! 1. Load      bollards.yaml  →  Catalog               (once per page view)
//! 2. Derive    Catalog        →  options per dimension (once, after load)
//! 3. Filter    Catalog + selection → visible items     (on every toggle)
//! ```
//!
//! The loader and the filter engine know nothing about rendering. A
//! [`view::PageView`] owns one catalog and one selection, and exposes what a
//! page needs: the loading flag, options, selection, a toggle, the visible
//! items and raw diagnostics counts. The CLI prints that surface as text or
//! renders it as a static HTML page.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Fetches the catalog document (file or http) and normalizes tags to sets |
//! | [`facets`] | Facet specs, option derivation, selection toggling, visibility |
//! | [`view`] | The Loading → Ready page-view state machine |
//! | [`config`] | `findr.toml` loading, merging over stock defaults, validation |
//! | [`types`] | `CatalogItem` and `Catalog` |
//! | [`generate`] | Static HTML snapshot of a page view using Maud |
//! | [`output`] | CLI text output |
//!
//! # Design Decisions
//!
//! ## Dimensions Are Data
//!
//! Every facet is a [`facets::FacetSpec`] in the config. Adding a dimension to
//! the catalog document and a `[[facets]]` entry is all it takes to filter on
//! it; no code path exists per dimension.
//!
//! ## One Tag Shape
//!
//! The document may write a tag as a single string or as a list. The loader
//! turns both into a set, and the facet's `match` setting decides whether a
//! dimension is matched with subset (`all`) or membership (`any`) semantics.
//! The shape on disk never changes how filtering behaves.
//!
//! ## Failure Is a State, Not a Crash
//!
//! If the catalog can't be fetched or parsed, the page view becomes ready with
//! an empty catalog and remembers why. Filtering and toggling never fail.

pub mod catalog;
pub mod config;
pub mod facets;
pub mod generate;
pub mod output;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;

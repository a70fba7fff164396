//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Logs go to stderr through
//! `tracing`, so stdout only carries what is formatted here.
//!
//! # Output Format
//!
//! ## Facets
//!
//! ```text
//! Color (colors, all)
//!     black (4)
//!     red (4)
//! Continent (continent, any)
//!     Asia (2)
//! ```
//!
//! ## Filter
//!
//! ```text
//! 001 france
//!     Source: /images/bollard_france.jpg
//!     colors: red, white
//!     continent: Europe
//!
//! Showing 1 of 10
//! Selection
//!     colors: red
//! ```

use crate::catalog::{self, CatalogSource};
use crate::config::FindrConfig;
use crate::facets::{self, FacetSpec, MatchMode};
use crate::types::{Catalog, CatalogItem};
use crate::view::PageView;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn match_name(spec: &FacetSpec) -> &'static str {
    match spec.match_mode {
        MatchMode::All => "all",
        MatchMode::Any => "any",
    }
}

/// Heading, source and tags of one item.
fn item_lines(index: usize, item: &CatalogItem, specs: &[FacetSpec], config: &FindrConfig) -> Vec<String> {
    let title = if item.display_label.is_empty() {
        format!("({})", item.image_ref)
    } else {
        item.display_label.clone()
    };
    let mut lines = vec![
        format!("{} {}", format_index(index), title),
        format!(
            "{}Source: {}",
            indent(1),
            catalog::resolve_asset(&config.base_path, &config.image_dir, &item.image_ref)
        ),
    ];
    for spec in specs {
        let values = item.tag_values(&spec.key);
        if !values.is_empty() {
            let joined: Vec<&str> = values.iter().map(String::as_str).collect();
            lines.push(format!("{}{}: {}", indent(1), spec.key, joined.join(", ")));
        }
    }
    lines
}

// ============================================================================
// facets
// ============================================================================

/// Format the available options of every dimension with per-value counts.
pub fn format_facets_output(view: &PageView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(err) = view.load_error() {
        lines.push(format!("Catalog unavailable: {err}"));
    }
    for spec in view.specs() {
        lines.push(format!(
            "{} ({}, {})",
            spec.display_label(),
            spec.key,
            match_name(spec)
        ));
        let counts = facets::option_counts(view.catalog(), &spec.key);
        let values = view.options().get(&spec.key);
        if values.is_empty() {
            lines.push(format!("{}(no values)", indent(1)));
        }
        for value in values {
            let count = counts.get(value).copied().unwrap_or(0);
            lines.push(format!("{}{} ({})", indent(1), value, count));
        }
    }
    lines
}

pub fn print_facets_output(view: &PageView) {
    for line in format_facets_output(view) {
        println!("{}", line);
    }
}

// ============================================================================
// filter
// ============================================================================

/// Format the visible items followed by the diagnostics counts.
pub fn format_filter_output(view: &PageView, config: &FindrConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(err) = view.load_error() {
        lines.push(format!("Catalog unavailable: {err}"));
    }

    let visible = view.visible();
    if visible.is_empty() {
        lines.push("No matching images".to_string());
    }
    for (i, item) in visible.iter().enumerate() {
        lines.extend(item_lines(i + 1, item, view.specs(), config));
    }

    let diagnostics = view.diagnostics();
    lines.push(String::new());
    lines.push(format!(
        "Showing {} of {}",
        diagnostics.visible, diagnostics.total
    ));
    if !diagnostics.selections.is_empty() {
        lines.push("Selection".to_string());
        for (dimension, values) in &diagnostics.selections {
            lines.push(format!("{}{}: {}", indent(1), dimension, values.join(", ")));
        }
    }
    lines
}

pub fn print_filter_output(view: &PageView, config: &FindrConfig) {
    for line in format_filter_output(view, config) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Summarize a strictly loaded catalog: item count and values per dimension.
pub fn format_check_output(catalog: &Catalog, source: &CatalogSource, specs: &[FacetSpec]) -> Vec<String> {
    let mut lines = vec![format!("{} images in {}", catalog.len(), source)];
    let options = facets::derive_options(catalog, specs);
    for spec in specs {
        lines.push(format!(
            "{}{}: {} values",
            indent(1),
            spec.key,
            options.get(&spec.key).len()
        ));
    }
    let unconfigured: Vec<&str> = catalog
        .dimensions()
        .into_iter()
        .filter(|dimension| !specs.iter().any(|spec| spec.key == *dimension))
        .collect();
    if !unconfigured.is_empty() {
        lines.push(format!("{}Not filterable: {}", indent(1), unconfigured.join(", ")));
    }
    lines
}

pub fn print_check_output(catalog: &Catalog, source: &CatalogSource, specs: &[FacetSpec]) {
    for line in format_check_output(catalog, source, specs) {
        println!("{}", line);
    }
}

//! Static HTML snapshot of a page view.
//!
//! Renders what the gallery page shows for the current state of a
//! [`PageView`]: a filter sidebar with one fieldset per dimension and a
//! checkbox per available value (checked when selected), the grid of visible
//! images, and a diagnostics panel with the raw counts.
//!
//! ## Status line
//!
//! | State | Shown |
//! |-------|-------|
//! | Loading | "Loading…" |
//! | Ready, load failed | "Catalog unavailable" with the reason |
//! | Ready, nothing visible | "No images match the selected filters" |
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All catalog text is auto-escaped.

use crate::catalog;
use crate::config::FindrConfig;
use crate::facets::FacetSpec;
use crate::types::CatalogItem;
use crate::view::PageView;
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS: &str = include_str!("../static/style.css");

/// Write the rendered page to `output`, creating parent directories.
pub fn generate(view: &PageView, config: &FindrConfig, output: &Path) -> Result<(), GenerateError> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let page = render_page(view, config);
    fs::write(output, page.into_string())?;
    info!(output = %output.display(), visible = view.visible().len(), "page rendered");
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders one fieldset of checkboxes for a dimension.
fn render_facet(view: &PageView, spec: &FacetSpec) -> Markup {
    let values = view.options().get(&spec.key);
    html! {
        fieldset.facet data-facet=(spec.key) {
            legend { (spec.display_label()) }
            @for (idx, value) in values.iter().enumerate() {
                @let id = format!("{}-{}", spec.key, idx);
                div.facet-option {
                    input type="checkbox" id=(id) name=(spec.key) value=(value)
                        checked[view.selection().is_selected(&spec.key, value)];
                    label for=(id) { (value) }
                }
            }
        }
    }
}

/// Renders one gallery tile.
fn render_item(item: &CatalogItem, config: &FindrConfig) -> Markup {
    let src = catalog::resolve_asset(&config.base_path, &config.image_dir, &item.image_ref);
    html! {
        figure {
            img src=(src) alt=(item.alt_text) width="300" height="200" loading="lazy";
            figcaption { (item.display_label) }
        }
    }
}

fn render_status(view: &PageView, visible: usize) -> Markup {
    if view.is_loading() {
        return html! { p.status { "Loading…" } };
    }
    if let Some(err) = view.load_error() {
        return html! { p.status.error { "Catalog unavailable: " (err) } };
    }
    if visible == 0 {
        return html! { p.status { "No images match the selected filters" } };
    }
    html! {}
}

fn render_diagnostics(view: &PageView) -> Markup {
    let diagnostics = view.diagnostics();
    html! {
        details.diagnostics {
            summary { "Debug" }
            dl {
                dt { "Total images" }
                dd { (diagnostics.total) }
                dt { "Visible images" }
                dd { (diagnostics.visible) }
                @for (dimension, values) in &diagnostics.selections {
                    dt { "Selected " (dimension) }
                    dd { (values.join(", ")) }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderer
// ============================================================================

/// Renders the gallery page for the current view state.
pub fn render_page(view: &PageView, config: &FindrConfig) -> Markup {
    let visible = view.visible();
    let content = html! {
        div.findr {
            h1 { (config.title) }
            div.findr-layout {
                aside.filters {
                    h2 { "Filter" }
                    @for spec in view.specs() {
                        (render_facet(view, spec))
                    }
                }
                main.results {
                    (render_status(view, visible.len()))
                    div.gallery {
                        @for item in &visible {
                            (render_item(item, config))
                        }
                    }
                    (render_diagnostics(view))
                }
            }
        }
    };

    base_document(&config.title, content)
}

// ============================================================================
// Tests
// ============================================================================

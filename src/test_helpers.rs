//! Shared test utilities for the bollard-findr test suite.
//!
//! Provides in-memory catalogs shaped like the real catalog document at
//! different stages of its life (colors only, then continent and side), plus
//! lookup helpers that panic with a readable message on a miss, and a tiny
//! HTTP server for exercising URL catalogs.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::types::{Catalog, CatalogItem};

// =========================================================================
// Catalogs
// =========================================================================

fn flag(name: &str, colors: &[&str]) -> CatalogItem {
    let alt = format!("{}{}", name[..1].to_uppercase(), &name[1..]);
    CatalogItem::new("bollard_314.jpg", name, alt).with_tag("colors", colors.iter().copied())
}

/// The two-item catalog used to walk through AND semantics on colors.
pub fn italy_france_catalog() -> Catalog {
    Catalog::new(vec![
        flag("italy", &["red", "white", "green"]),
        flag("france", &["blue", "white", "red"]),
    ])
}

/// Colors-only catalog, the earliest shape of the document.
pub fn flag_catalog() -> Catalog {
    Catalog::new(vec![
        flag("italy", &["red", "white", "green"]),
        flag("france", &["blue", "white", "red"]),
        flag("britain", &["red", "white", "blue"]),
        flag("germany", &["black", "red", "yellow"]),
        flag("poland", &["white", "red"]),
        flag("croatia", &["red", "white", "blue"]),
    ])
}

/// Catalog carrying all three stock dimensions.
pub fn bollard_catalog() -> Catalog {
    let bollard = |name: &str, colors: &[&str], continent: &str, sides: &[&str]| {
        CatalogItem::new(format!("{}.jpg", name.replace(' ', "_")), name, format!("Bollard in {name}"))
            .with_tag("colors", colors.iter().copied())
            .with_tag("continent", [continent])
            .with_tag("side", sides.iter().copied())
    };
    Catalog::new(vec![
        bollard("italy", &["red", "white"], "Europe", &["right"]),
        bollard("germany", &["black", "white", "yellow"], "Europe", &["right"]),
        bollard("france", &["red", "white"], "Europe", &["left", "right"]),
        bollard("japan", &["red", "white"], "Asia", &["left"]),
        bollard("australia", &["black", "white"], "Oceania", &["left"]),
        bollard("new zealand", &["red", "white"], "Oceania", &["left"]),
        bollard("poland", &["red", "white"], "Europe", &["right"]),
    ])
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Display labels of `items`, in order.
pub fn labels<'a>(items: &[&'a CatalogItem]) -> Vec<&'a str> {
    items.iter().map(|item| item.display_label.as_str()).collect()
}

/// Find an item by display label. Panics if not found.
pub fn find_item<'a>(catalog: &'a Catalog, label: &str) -> &'a CatalogItem {
    catalog
        .iter()
        .find(|item| item.display_label == label)
        .unwrap_or_else(|| {
            let all: Vec<&str> = catalog.iter().map(|i| i.display_label.as_str()).collect();
            panic!("item '{label}' not found. Available: {all:?}")
        })
}

/// Path of a file under `fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

// =========================================================================
// Minimal HTTP server (URL catalogs need a real socket)
// =========================================================================

/// Serves the same response to every request and counts the requests.
pub struct TestServer {
    port: u16,
    hits: Arc<AtomicUsize>,
    _stop: std::sync::mpsc::Sender<()>,
}

impl TestServer {
    pub fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let response = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            if status == 200 { "OK" } else { "Error" },
            body.len()
        );

        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            listener.set_nonblocking(true).unwrap();
            loop {
                if rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        serve_request(stream, &response);
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Self { port, hits, _stop: tx }
    }

    /// URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/{}", self.port, path.trim_start_matches('/'))
    }

    /// Requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn serve_request(mut stream: TcpStream, response: &str) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 4096];
    let _ = stream.read(&mut buf);
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

//! # Folio
//!
//! A static site generator for design and motion portfolios. Your filesystem
//! is the data source: directories become projects, media is ordered by
//! numeric prefix, and markdown files become pages.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (filesystem → structured data)
//! 2. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON, so the result of a scan can be
//! inspected or edited before generating.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content directory, groups media by stem, produces the manifest |
//! | [`generate`] | Stage 2: renders the HTML site from the manifest using Maud |
//! | [`media`] | Lazy loading and format negotiation: the headless model behind every gallery |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared types serialized between stages (`Project`, `Page`, `NavItem`) |
//! | [`naming`] | `NNN-name` filename convention parser used by all entry types |
//! | [`output`] | CLI output formatting for pipeline results |
//!
//! # Design Decisions
//!
//! ## Eager Head, Lazy Tail
//!
//! The first `eager_count` items of a gallery are written as real
//! `<picture>`/`<video>` elements so above-the-fold content paints without
//! waiting for script. Everything after them is an inert placeholder that
//! carries its sources in `data-` attributes and fetches nothing until the
//! visibility detector fires. Browsers without `IntersectionObserver` load
//! every placeholder immediately rather than never.
//!
//! ## Probe Once Per Session
//!
//! Whether the browser decodes AVIF, WebP or WebM is probed at most once per
//! page and memoized. Baseline encodings (JPEG, PNG, GIF, SVG, MP4) are never
//! probed. The same rules live in [`media::SessionCapabilities`], which the
//! generator also uses with a non-probing capability set to pick social
//! preview images.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Malformed markup is a build error, template variables are
//! Rust expressions, and all interpolation is auto-escaped, which matters for
//! alt text read from sidecar files.
//!
//! ## NNN-Prefix Ordering
//!
//! Directories and files use a numeric prefix (`001-`, `020-`, etc.) for explicit
//! ordering, parsed by [`naming::parse_entry_name`]. Projects without a prefix
//! are built but not listed on the index, which is useful for work-in-progress
//! content that should remain reachable by direct URL.

pub mod config;
pub mod generate;
pub mod media;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

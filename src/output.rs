//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity
//! (project, media entry, page) leads with its positional index and title;
//! filesystem paths follow as indented `Source:` lines so the output reads
//! as a content inventory while still tracing back to specific files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Projects
//! 001 Brand Identity (4 items, 2 eager)
//!     Source: 010-Brand-Identity/
//!     A bold identity for a neighbourhood bakery.
//!     001 Hero poster on a wall
//!         Source: 001-hero.jpg
//!         Alternate: 001-hero.webp
//!         Size: 1600x900
//!     002 Reel
//!         Source: 002-reel.mp4
//!
//! Unlisted
//!     wip sketches (3 items, 2 eager)
//!
//! Pages
//!     001 About Ada
//!         Source: about.md
//!
//! Config
//!     config.toml
//!     assets/
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! 001 Brand Identity → brand-identity/index.html
//!
//! Pages
//!     001 About Ada → about.html
//!     002 dribbble → (external link)
//!
//! Generated 2 projects, 9 media, 1 page
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::media::MediaDescriptor;
use crate::scan::ASSETS_DIR;
use crate::types::{Manifest, Project};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Project header: positional index + title + item counts.
///
/// ```text
/// 001 Brand Identity (4 items, 2 eager)
/// ```
fn project_header(index: Option<usize>, project: &Project) -> String {
    let total = project.media.len();
    let eager = project.gallery.eager_count.min(total);
    let counts = format!("({}, {} eager)", plural(total, "item", "items"), eager);
    match index {
        Some(i) => format!("{} {} {}", format_index(i), project.title, counts),
        None => format!("{} {}", project.title, counts),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn media_lines(index: usize, media: &MediaDescriptor) -> Vec<String> {
    let mut lines = vec![
        format!("    {} {}", format_index(index), media.alt),
        format!("        Source: {}", media.primary),
    ];
    if let Some(alt) = &media.alternate {
        lines.push(format!("        Alternate: {}", alt));
    }
    if let (Some(w), Some(h)) = (media.width, media.height) {
        lines.push(format!("        Size: {}x{}", w, h));
    }
    lines
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered portfolio structure.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Projects".to_string()];

    let (listed, unlisted): (Vec<&Project>, Vec<&Project>) =
        manifest.projects.iter().partition(|p| p.in_nav);

    for (i, project) in listed.iter().enumerate() {
        lines.push(project_header(Some(i + 1), project));
        lines.push(format!("    Source: {}/", project.source_dir));
        if let Some(desc) = &project.description {
            let first = desc.lines().next().unwrap_or_default().trim();
            if !first.is_empty() {
                lines.push(format!("    {}", truncate_desc(first, 60)));
            }
        }
        for (j, media) in project.media.iter().enumerate() {
            lines.extend(media_lines(j + 1, media));
        }
    }

    if !unlisted.is_empty() {
        lines.push(String::new());
        lines.push("Unlisted".to_string());
        for project in unlisted {
            lines.push(format!("    {}", project_header(None, project)));
        }
    }

    if !manifest.pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in manifest.pages.iter().enumerate() {
            let link_marker = if page.is_link { " (link)" } else { "" };
            lines.push(format!(
                "    {} {}{}",
                format_index(i + 1),
                page.title,
                link_marker
            ));
            lines.push(format!("        Source: {}.md", page.slug));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push("    config.toml".to_string());
    }
    if source_root.join(ASSETS_DIR).is_dir() {
        lines.push(format!("    {}/", ASSETS_DIR));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output showing generated HTML files.
pub fn format_generate_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Home \u{2192} index.html".to_string()];

    let mut position = 0;
    for project in &manifest.projects {
        let label = if project.in_nav {
            position += 1;
            format!("{} {}", format_index(position), project.title)
        } else {
            format!("    {}", project.title)
        };
        lines.push(format!(
            "{} \u{2192} {}/index.html",
            label, project.slug
        ));
    }

    let page_count = manifest.pages.iter().filter(|p| !p.is_link).count();
    if !manifest.pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in manifest.pages.iter().enumerate() {
            if page.is_link {
                lines.push(format!(
                    "    {} {} \u{2192} (external link)",
                    format_index(i + 1),
                    page.title
                ));
            } else {
                lines.push(format!(
                    "    {} {} \u{2192} {}.html",
                    format_index(i + 1),
                    page.title,
                    page.slug
                ));
            }
        }
    }

    if !manifest.config.site.base_url.is_empty() {
        lines.push("Sitemap \u{2192} sitemap.xml".to_string());
    }

    let media_count: usize = manifest.projects.iter().map(|p| p.media.len()).sum();
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(manifest.projects.len(), "project", "projects"),
        plural(media_count, "media", "media"),
        plural(page_count, "page", "pages"),
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(manifest: &Manifest) {
    for line in format_generate_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// One-line summary printed by `folio check` on success.
pub fn format_check_output(manifest: &Manifest) -> String {
    let media_count: usize = manifest.projects.iter().map(|p| p.media.len()).sum();
    let lazy: usize = manifest
        .projects
        .iter()
        .map(|p| p.media.len().saturating_sub(p.gallery.eager_count))
        .sum();
    format!(
        "Content OK: {}, {} ({} lazy), {}",
        plural(manifest.projects.len(), "project", "projects"),
        plural(media_count, "media entry", "media entries"),
        lazy,
        plural(manifest.pages.len(), "page", "pages"),
    )
}

// ============================================================================
// Tests
// ============================================================================

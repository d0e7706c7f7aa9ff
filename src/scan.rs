//! Filesystem scanning and manifest generation.
//!
//! Stage 1 of the build. Walks the content directory and produces the
//! [`Manifest`] that generate consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                  # Site configuration (optional)
//! ├── assets/                      # Copied verbatim to the output root
//! ├── 010-about.md                 # Page (numbered = in nav)
//! ├── 020-contact.md
//! ├── 030-dribbble.md              # URL-only content = external nav link
//! ├── 010-Brand-Identity/          # Project (numbered = listed on the index)
//! │   ├── config.toml              # [gallery] override (optional)
//! │   ├── description.md           # Project description (optional)
//! │   ├── 001-hero.jpg             # Media, ordered by number prefix
//! │   ├── 001-hero.webp            # Same stem = efficient alternate of 001
//! │   ├── 001-hero.txt             # Alt text sidecar
//! │   └── 002-reel.mp4
//! └── wip-sketches/                # Unnumbered = built but not listed
//! ```
//!
//! ## Media Grouping
//!
//! Files sharing a stem are one media entry. The baseline encoding (JPEG,
//! PNG, GIF, SVG, MP4) becomes the primary source; the efficient one (WebP,
//! WebM, else AVIF) the alternate. A stem with only efficient encodings uses
//! the best-ranked one as the primary.
//!
//! ## Validation
//!
//! - No nested directories inside a project
//! - No two stems with the same number in a project
//! - No image and video sharing a stem
//! - Every project has at least one media file
//! - Project slugs are unique
//! - Page slugs are non-empty, unique, and not `index`

use crate::config::{self, SiteConfig};
use crate::media::{Encoding, MediaDescriptor, MediaKind};
use crate::naming::{ParsedName, parse_entry_name};
use crate::types::{Manifest, NavItem, Page, Project};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Project contains a subdirectory: {0}")]
    NestedDirectory(PathBuf),
    #[error("Duplicate media number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
    #[error("Image and video share the stem '{0}' in {1}")]
    MixedKinds(String, PathBuf),
    #[error("Project has no media: {0}")]
    EmptyProject(PathBuf),
    #[error("Projects {0} and {1} have the same slug")]
    DuplicateSlug(String, String),
    #[error("Pages {0} and {1} would both be written to {2}.html")]
    DuplicatePageSlug(String, String, String),
    #[error("Page {0} has an empty or reserved slug '{1}'")]
    InvalidPageSlug(String, String),
}

/// `index.html` at the output root is the project grid.
const RESERVED_PAGE_SLUG: &str = "index";

/// Directory at the content root copied verbatim to the output root.
pub const ASSETS_DIR: &str = "assets";

const RESERVED_FILES: &[&str] = &["config.toml", "description.md", "description.txt"];

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;

    let mut project_dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir() && !is_hidden(p) && file_name(p) != ASSETS_DIR)
        .collect();
    project_dirs.sort();

    let mut projects = project_dirs
        .iter()
        .map(|dir| scan_project(dir, root, &config))
        .collect::<Result<Vec<_>, _>>()?;
    projects.sort_by(|a, b| (a.sort_key, &a.slug).cmp(&(b.sort_key, &b.slug)));
    check_unique_slugs(&projects)?;

    let pages = parse_pages(root)?;
    let navigation = build_navigation(&pages);

    Ok(Manifest {
        navigation,
        projects,
        pages,
        config,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_hidden(path: &Path) -> bool {
    file_name(path).starts_with('.')
}

fn check_unique_slugs(projects: &[Project]) -> Result<(), ScanError> {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for p in projects {
        if let Some(other) = seen.insert(&p.slug, &p.source_dir) {
            return Err(ScanError::DuplicateSlug(
                other.to_string(),
                p.source_dir.clone(),
            ));
        }
    }
    Ok(())
}

/// Pages are written to `{slug}.html` at the output root; link pages are not written.
fn check_page_slugs(pages: &[(String, Page)]) -> Result<(), ScanError> {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for (source, page) in pages.iter().filter(|(_, p)| !p.is_link) {
        if page.slug.is_empty() || page.slug == RESERVED_PAGE_SLUG {
            return Err(ScanError::InvalidPageSlug(source.clone(), page.slug.clone()));
        }
        if let Some(other) = seen.insert(&page.slug, source) {
            return Err(ScanError::DuplicatePageSlug(
                other.to_string(),
                source.clone(),
                page.slug.clone(),
            ));
        }
    }
    Ok(())
}

/// Navigation lists content pages in number order; projects live on the index.
fn build_navigation(pages: &[Page]) -> Vec<NavItem> {
    pages
        .iter()
        .filter(|p| p.in_nav)
        .map(|p| {
            if p.is_link {
                NavItem {
                    title: p.link_title.clone(),
                    href: p.body.trim().to_string(),
                    external: true,
                }
            } else {
                NavItem {
                    title: p.link_title.clone(),
                    href: format!("{}.html", p.slug),
                    external: false,
                }
            }
        })
        .collect()
}

/// Files of one stem, before primary/alternate selection.
struct MediaGroup {
    parsed: ParsedName,
    stem: String,
    files: Vec<(Encoding, PathBuf)>,
}

fn scan_project(dir: &Path, root: &Path, site: &SiteConfig) -> Result<Project, ScanError> {
    let dir_name = file_name(dir);
    let parsed = parse_entry_name(&dir_name);
    let title = if parsed.display_title.is_empty() {
        dir_name.clone()
    } else {
        parsed.display_title.clone()
    };
    let slug = match parsed.slug() {
        s if s.is_empty() => crate::naming::slugify(&dir_name),
        s => s,
    };

    let mut groups: BTreeMap<String, MediaGroup> = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_hidden(&path) {
            continue;
        }
        if path.is_dir() {
            return Err(ScanError::NestedDirectory(path));
        }
        let name = file_name(&path);
        if RESERVED_FILES.contains(&name.as_str()) {
            continue;
        }
        let Some(encoding) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Encoding::from_extension)
        else {
            continue;
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        groups
            .entry(stem.clone())
            .or_insert_with(|| MediaGroup {
                parsed: parse_entry_name(&stem),
                stem,
                files: Vec::new(),
            })
            .files
            .push((encoding, path));
    }

    if groups.is_empty() {
        return Err(ScanError::EmptyProject(dir.to_path_buf()));
    }

    let mut ordered: Vec<MediaGroup> = groups.into_values().collect();
    ordered.sort_by(|a, b| {
        (a.parsed.number.unwrap_or(u32::MAX), &a.stem)
            .cmp(&(b.parsed.number.unwrap_or(u32::MAX), &b.stem))
    });

    let mut numbers = HashSet::new();
    for group in &ordered {
        if let Some(n) = group.parsed.number
            && !numbers.insert(n)
        {
            return Err(ScanError::DuplicateNumber(n, dir.to_path_buf()));
        }
        let kinds: HashSet<MediaKind> = group.files.iter().map(|(e, _)| e.kind()).collect();
        if kinds.len() > 1 {
            return Err(ScanError::MixedKinds(group.stem.clone(), dir.to_path_buf()));
        }
    }

    let media = ordered
        .par_iter()
        .enumerate()
        .map(|(index, group)| describe_group(group, &title, index + 1))
        .collect::<Result<Vec<_>, ScanError>>()?;

    let description = read_description(dir)?;
    let gallery = config::load_project_gallery(site, dir)?;
    let source_dir = dir
        .strip_prefix(root)
        .unwrap_or(dir)
        .to_string_lossy()
        .into_owned();

    Ok(Project {
        title,
        slug,
        source_dir,
        description,
        media,
        in_nav: parsed.number.is_some(),
        sort_key: parsed.number.unwrap_or(u32::MAX),
        gallery,
    })
}

/// Preference among efficient encodings when several share a stem.
///
/// WebP wins over AVIF: the runtime capability check can confirm WebP
/// synchronously, while AVIF always reads as unsupported there, so an AVIF
/// alternate would only ever serve the primary to lazy items.
fn efficiency_rank(encoding: Encoding) -> u8 {
    match encoding {
        Encoding::Webp | Encoding::Webm => 0,
        Encoding::Avif => 1,
        _ => 2,
    }
}

fn describe_group(
    group: &MediaGroup,
    project_title: &str,
    position: usize,
) -> Result<MediaDescriptor, ScanError> {
    let mut files = group.files.clone();
    files.sort_by(|(ea, pa), (eb, pb)| {
        (efficiency_rank(*ea), pa).cmp(&(efficiency_rank(*eb), pb))
    });

    // Without a baseline file the best-ranked efficient encoding is the most compatible.
    let Some(first) = files.first() else {
        return Err(ScanError::EmptyProject(PathBuf::from(&group.stem)));
    };
    let primary = files.iter().find(|(e, _)| e.is_baseline()).unwrap_or(first);
    let alternate = files
        .iter()
        .find(|(e, p)| !e.is_baseline() && p != &primary.1);

    let alt = read_alt_text(&primary.1, &group.parsed, project_title, position)?;
    let mut descriptor = MediaDescriptor::new(file_name(&primary.1), alt);
    if let Some((_, path)) = alternate {
        descriptor = descriptor.with_alternate(file_name(path));
    }
    if let Some((w, h)) = read_dimensions(primary.0, &primary.1) {
        descriptor = descriptor.with_dimensions(w, h);
    }
    Ok(descriptor)
}

/// Alt text: sidecar `.txt` → title from filename → `"{project} {n}"`.
fn read_alt_text(
    media_path: &Path,
    parsed: &ParsedName,
    project_title: &str,
    position: usize,
) -> Result<String, ScanError> {
    let sidecar = media_path.with_extension("txt");
    if sidecar.is_file() {
        let text = fs::read_to_string(&sidecar)?.trim().to_string();
        if !text.is_empty() {
            return Ok(text);
        }
    }
    if !parsed.display_title.is_empty() {
        return Ok(parsed.display_title.clone());
    }
    Ok(format!("{} {}", project_title, position))
}

fn read_dimensions(encoding: Encoding, path: &Path) -> Option<(u32, u32)> {
    if encoding.kind() != MediaKind::Image || encoding == Encoding::Svg {
        return None;
    }
    match image::image_dimensions(path) {
        Ok(dims) => Some(dims),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not read image dimensions");
            None
        }
    }
}

fn read_description(dir: &Path) -> Result<Option<String>, ScanError> {
    for name in ["description.md", "description.txt"] {
        let path = dir.join(name);
        if path.is_file() {
            let content = fs::read_to_string(&path)?.trim().to_string();
            return Ok((!content.is_empty()).then_some(content));
        }
    }
    Ok(None)
}

/// Parse all markdown files in the root directory into pages.
fn parse_pages(root: &Path) -> Result<Vec<Page>, ScanError> {
    let mut md_files: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false)
        })
        .collect();
    md_files.sort();

    let mut pages = Vec::new();
    for md_path in &md_files {
        let stem = md_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = parse_entry_name(&stem);
        let link_title = parsed.display_title.clone();
        let slug = parsed.slug();

        let content = fs::read_to_string(md_path)?;
        let trimmed = content.trim();
        let is_link = !trimmed.contains('\n')
            && (trimmed.starts_with("http://")
                || trimmed.starts_with("https://")
                || trimmed.starts_with("mailto:"));

        let title = if is_link {
            link_title.clone()
        } else {
            content
                .lines()
                .find(|line| line.starts_with("# "))
                .map(|line| line.trim_start_matches("# ").trim().to_string())
                .unwrap_or_else(|| link_title.clone())
        };

        pages.push((
            file_name(md_path),
            Page {
                title,
                link_title,
                slug,
                body: content,
                in_nav: parsed.number.is_some(),
                sort_key: parsed.number.unwrap_or(u32::MAX),
                is_link,
            },
        ));
    }
    check_page_slugs(&pages)?;

    let mut pages: Vec<Page> = pages.into_iter().map(|(_, page)| page).collect();
    pages.sort_by_key(|p| p.sort_key);
    Ok(pages)
}

//! HTML site generation.
//!
//! Stage 2 of the folio build pipeline. Takes the scan manifest and writes
//! the final static site.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): Grid of project covers
//! - **Project pages** (`/{slug}/index.html`): The project's lazy-loading gallery
//! - **Content pages** (`/{slug}.html`): Markdown from the content root
//! - **Sitemap** (`/sitemap.xml`): Only when `site.base_url` is set
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about.html
//! ├── sitemap.xml
//! ├── favicon.png                # From content/assets/
//! └── brand-identity/
//!     ├── index.html
//!     ├── 001-hero.jpg           # Media copied from the project directory
//!     ├── 001-hero.webp
//!     └── 002-reel.mp4
//! ```
//!
//! ## Galleries
//!
//! Every gallery is composed with [`GalleryComposer`]: the first
//! `eager_count` items are rendered as real `<picture>`/`<video>` elements,
//! the rest as inert placeholders that `static/lazy-media.js` fills in when
//! they approach the viewport. Without JavaScript, `<noscript>` fallbacks
//! show the primary source.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined in every page:
//! - `static/style.css`: Base styles (colors, theme and grid columns injected from config)
//! - `static/lazy-media.js`: Visibility detection, format probing and fade-in

use crate::config::{self, SiteConfig, SiteMeta};
use crate::media::render;
use crate::media::{
    Encoding, FormatNegotiator, GalleryComposer, MediaDescriptor, MediaKind, SessionCapabilities,
    SourceCandidate, source_url,
};
use crate::scan::ASSETS_DIR;
use crate::types::{Manifest, NavItem, Page, Project};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to walk assets: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Media file missing: {0}")]
    MissingMedia(PathBuf),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/lazy-media.js");
/// Runs in `<head>` so fade-in styles only apply when the runtime will too.
const JS_FLAG: &str = "document.documentElement.classList.add('js')";

/// Length of generated meta descriptions, in characters.
const DESCRIPTION_LEN: usize = 160;

pub fn load_manifest(manifest_path: &Path) -> Result<Manifest, GenerateError> {
    let content = fs::read_to_string(manifest_path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn generate(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
) -> Result<(), GenerateError> {
    let css = site_css(&manifest.config);
    // Build-time negotiation never probes: only baseline encodings qualify.
    let capabilities = SessionCapabilities::baseline();

    fs::create_dir_all(output_dir)?;
    copy_assets(&source_root.join(ASSETS_DIR), output_dir)?;

    let index_html = render_index(manifest, &capabilities, &css);
    fs::write(output_dir.join("index.html"), index_html.into_string())?;

    for project in &manifest.projects {
        let project_dir = output_dir.join(&project.slug);
        fs::create_dir_all(&project_dir)?;
        copy_project_media(project, source_root, &project_dir)?;

        let page_css = project_css(&css, project, &manifest.config);
        let html = render_project_page(project, manifest, &capabilities, &page_css);
        fs::write(project_dir.join("index.html"), html.into_string())?;
        tracing::debug!(project = %project.slug, media = project.media.len(), "wrote project page");
    }

    for page in manifest.pages.iter().filter(|p| !p.is_link) {
        let html = render_page(page, manifest, &css);
        fs::write(output_dir.join(format!("{}.html", page.slug)), html.into_string())?;
    }

    if let Some(sitemap) = render_sitemap(manifest) {
        fs::write(output_dir.join("sitemap.xml"), sitemap)?;
    }

    Ok(())
}

fn site_css(config: &SiteConfig) -> String {
    let color_css = config::generate_color_css(&config.colors);
    let theme_css = config::generate_theme_css(&config.theme);
    let grid_css = render::grid_css(&config.gallery.layout());
    format!("{}\n\n{}\n\n{}\n\n{}", color_css, theme_css, grid_css, CSS_STATIC)
}

/// Site CSS, plus the project's own grid rules when its layout differs.
fn project_css(site_css: &str, project: &Project, config: &SiteConfig) -> String {
    let layout = project.gallery.layout();
    if layout == config.gallery.layout() {
        site_css.to_string()
    } else {
        format!("{}\n\n{}", site_css, render::grid_css(&layout))
    }
}

fn copy_project_media(
    project: &Project,
    source_root: &Path,
    project_dir: &Path,
) -> Result<(), GenerateError> {
    let src_dir = source_root.join(&project.source_dir);
    for media in &project.media {
        for file in std::iter::once(&media.primary).chain(media.alternate.as_ref()) {
            let src = src_dir.join(file);
            if !src.is_file() {
                return Err(GenerateError::MissingMedia(src));
            }
            fs::copy(&src, project_dir.join(file))?;
        }
    }
    Ok(())
}

/// Copy `content/assets/` into the output root, preserving structure.
fn copy_assets(assets_dir: &Path, output_dir: &Path) -> Result<(), GenerateError> {
    if !assets_dir.is_dir() {
        return Ok(());
    }
    for entry in WalkDir::new(assets_dir) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(assets_dir).unwrap_or(entry.path());
        let dst = output_dir.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst)?;
        } else {
            fs::copy(entry.path(), &dst)?;
        }
    }
    Ok(())
}

// ============================================================================
// Text helpers
// ============================================================================

fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(markdown));
    out
}

/// Plain-text summary of markdown for meta descriptions.
fn plain_summary(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::End(_) => text.push(' '),
            _ => {}
        }
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(DESCRIPTION_LEN) {
        Some((cut, _)) => format!("{}...", collapsed[..cut].trim_end()),
        None => collapsed,
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Per-page metadata for the document head.
struct PageMeta {
    title: String,
    description: String,
    /// Site-relative path of the page, `""` for the index.
    path: String,
    /// Site-relative path of the social preview image.
    image: Option<String>,
}

/// Social preview image for a project: the first image entry, negotiated
/// against baseline capabilities so crawlers get a universally decodable file.
fn preview_image(project: &Project, capabilities: &SessionCapabilities) -> Option<String> {
    let negotiator = FormatNegotiator::new(capabilities);
    project.media.iter().find_map(|media| {
        let candidates: Vec<SourceCandidate> = media
            .alternate
            .iter()
            .chain(std::iter::once(&media.primary))
            .filter_map(|src| SourceCandidate::from_url(source_url(src)))
            .filter(|c| c.encoding.kind() == MediaKind::Image && c.encoding != Encoding::Svg)
            .collect();
        negotiator
            .choose(&candidates)
            .map(|choice| format!("{}/{}", project.slug, choice.source()))
    })
}

/// SEO and social tags. Absolute URLs only when `base_url` is configured.
fn seo_head(meta: &PageMeta, site: &SiteMeta) -> Markup {
    let canonical = site.absolute_url(&meta.path);
    let image = meta
        .image
        .as_ref()
        .map(|img| site.absolute_url(img).unwrap_or_else(|| format!("/{}", img)));
    let card = if image.is_some() {
        "summary_large_image"
    } else {
        "summary"
    };
    html! {
        @if !meta.description.is_empty() {
            meta name="description" content=(meta.description);
        }
        @if !site.author.is_empty() {
            meta name="author" content=(site.author);
        }
        @if let Some(url) = &canonical {
            link rel="canonical" href=(url);
        }
        meta property="og:type" content="website";
        meta property="og:site_name" content=(site.title);
        meta property="og:title" content=(meta.title);
        @if !meta.description.is_empty() {
            meta property="og:description" content=(meta.description);
        }
        @if let Some(url) = &canonical {
            meta property="og:url" content=(url);
        }
        @if let Some(img) = &image {
            meta property="og:image" content=(img);
        }
        meta name="twitter:card" content=(card);
    }
}

/// Renders the base HTML document structure
fn base_document(
    meta: &PageMeta,
    site: &SiteMeta,
    css: &str,
    body_class: Option<&str>,
    content: Markup,
) -> Markup {
    let full_title = if meta.title == site.title {
        meta.title.clone()
    } else {
        format!("{} · {}", meta.title, site.title)
    };
    html! {
        (DOCTYPE)
        html lang=(site.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                script { (PreEscaped(JS_FLAG)) }
                (seo_head(meta, site))
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the site header with the home link and navigation
fn site_header(site_title: &str, nav: Markup) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (site_title) }
            nav.site-nav {
                (nav)
            }
        }
    }
}

/// Renders the navigation list, marking `current_href`.
pub fn render_nav(items: &[NavItem], current_href: &str) -> Markup {
    html! {
        ul {
            @for item in items {
                @if item.external {
                    li {
                        a href=(item.href) target="_blank" rel="noopener" { (item.title) }
                    }
                } @else {
                    @let is_current = item.href == current_href;
                    li class=[is_current.then_some("current")] {
                        a href={ "/" (item.href) } { (item.title) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the index page with the project cover grid
fn render_index(manifest: &Manifest, capabilities: &SessionCapabilities, css: &str) -> Markup {
    let site = &manifest.config.site;
    let gallery_config = &manifest.config.gallery;
    let listed: Vec<(&Project, &MediaDescriptor)> = manifest
        .projects
        .iter()
        .filter(|p| p.in_nav)
        .filter_map(|p| p.cover().map(|c| (p, c)))
        .collect();

    // Cover sources are relative to the project directory.
    let covers: Vec<MediaDescriptor> = listed
        .iter()
        .map(|(p, c)| MediaDescriptor {
            primary: format!("{}/{}", p.slug, c.primary),
            alternate: c.alternate.as_ref().map(|a| format!("{}/{}", p.slug, a)),
            ..(*c).clone()
        })
        .collect();
    let options = gallery_config.observer_options();
    let gallery = GalleryComposer::new(gallery_config.eager_count)
        .with_id_prefix("cover")
        .with_observer_options(options)
        .compose(&covers);

    let meta = PageMeta {
        title: site.title.clone(),
        description: site.description.clone(),
        path: String::new(),
        image: listed.first().and_then(|(p, _)| preview_image(p, capabilities)),
    };

    let content = html! {
        (site_header(&site.title, render_nav(&manifest.navigation, "")))
        main.index-page {
            div.media-grid.project-grid
                data-root-margin=(options.root_margin())
                data-threshold=(options.threshold) {
                @for ((project, _), item) in listed.iter().zip(gallery.items()) {
                    a.project-card href={ "/" (project.slug) "/" } {
                        (render::static_item(item))
                        span.project-title { (project.title) }
                    }
                }
            }
        }
    };

    base_document(&meta, site, css, Some("index"), content)
}

/// Renders a project page with its gallery
fn render_project_page(
    project: &Project,
    manifest: &Manifest,
    capabilities: &SessionCapabilities,
    css: &str,
) -> Markup {
    let site = &manifest.config.site;
    let gallery = GalleryComposer::new(project.gallery.eager_count)
        .with_id_prefix(project.slug.clone())
        .with_observer_options(project.gallery.observer_options())
        .compose(&project.media);

    let meta = PageMeta {
        title: project.title.clone(),
        description: project
            .description
            .as_deref()
            .map(plain_summary)
            .unwrap_or_else(|| site.description.clone()),
        path: format!("{}/", project.slug),
        image: preview_image(project, capabilities),
    };

    let content = html! {
        (site_header(&site.title, render_nav(&manifest.navigation, "")))
        main.project-page {
            header.project-header {
                h1 { (project.title) }
                @if let Some(desc) = &project.description {
                    div.project-description { (PreEscaped(markdown_to_html(desc))) }
                }
            }
            (render::gallery(&gallery, gallery.options()))
        }
    };

    base_document(&meta, site, css, Some("project"), content)
}

/// Renders a content page from markdown
fn render_page(page: &Page, manifest: &Manifest, css: &str) -> Markup {
    let site = &manifest.config.site;
    let href = format!("{}.html", page.slug);
    let meta = PageMeta {
        title: page.title.clone(),
        description: plain_summary(&page.body),
        path: href.clone(),
        image: None,
    };

    let content = html! {
        (site_header(&site.title, render_nav(&manifest.navigation, &href)))
        main.content-page {
            article.page-content {
                (PreEscaped(markdown_to_html(&page.body)))
            }
        }
    };

    base_document(&meta, site, css, None, content)
}

/// `sitemap.xml` listing every generated page, or `None` without a base URL.
fn render_sitemap(manifest: &Manifest) -> Option<String> {
    let site = &manifest.config.site;
    let mut paths = vec![String::new()];
    paths.extend(manifest.projects.iter().map(|p| format!("{}/", p.slug)));
    paths.extend(
        manifest
            .pages
            .iter()
            .filter(|p| !p.is_link)
            .map(|p| format!("{}.html", p.slug)),
    );

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in paths {
        let url = site.absolute_url(&path)?;
        xml.push_str(&format!("  <url><loc>{}</loc></url>\n", xml_escape(&url)));
    }
    xml.push_str("</urlset>\n");
    Some(xml)
}

// ============================================================================
// Tests
// ============================================================================

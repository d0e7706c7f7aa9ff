//! Types shared between the scan and generate stages.
//!
//! These are serialized into `manifest.json` by scan and read back by
//! generate, so both stages see exactly the same shape.

use crate::config::{GalleryConfig, SiteConfig};
use crate::media::MediaDescriptor;
use serde::{Deserialize, Serialize};

/// Scan output, generate input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub navigation: Vec<NavItem>,
    pub projects: Vec<Project>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<Page>,
    pub config: SiteConfig,
}

/// A project directory: a titled, ordered set of media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    /// URL segment, `{slug}/index.html`.
    pub slug: String,
    /// Directory name relative to the content root.
    pub source_dir: String,
    /// Markdown from `description.md` (or plain text from `description.txt`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media in display order. Sources are bare filenames: generate copies
    /// them from `source_dir` next to the project page.
    pub media: Vec<MediaDescriptor>,
    pub in_nav: bool,
    pub sort_key: u32,
    /// Gallery settings after applying the project's own `config.toml`.
    pub gallery: GalleryConfig,
}

impl Project {
    /// First media entry, used as the project's cover on the index.
    pub fn cover(&self) -> Option<&MediaDescriptor> {
        self.media.first()
    }
}

/// A page generated from a markdown file in the content root.
///
/// Numbered files (`NNN-name.md`) appear in navigation; a file whose only
/// content is a URL becomes an external navigation link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Title from the first `# heading`, or `link_title` as fallback.
    pub title: String,
    /// Navigation label: filename with number stripped and dashes as spaces.
    pub link_title: String,
    pub slug: String,
    /// Raw markdown (or the URL for link pages).
    pub body: String,
    pub in_nav: bool,
    pub sort_key: u32,
    pub is_link: bool,
}

/// One entry of the site navigation, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    /// Site-relative path, or an absolute URL when `external`.
    pub href: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

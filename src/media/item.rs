//! Media data model: encodings, descriptors, and composed items.
//!
//! A [`MediaDescriptor`] is what the scan stage produces for every numbered
//! media entry in a project directory. The gallery composer turns an ordered
//! sequence of descriptors into [`MediaItem`]s, stamping each with an element
//! id and a [`LoadPolicy`]. Items are immutable once composed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media encodings the pipeline knows how to label and negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Avif,
    Webp,
    Jpeg,
    Png,
    Gif,
    Svg,
    Webm,
    Mp4,
}

impl Encoding {
    /// Map a file extension (case-insensitive, no dot) to an encoding.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "avif" => Some(Self::Avif),
            "webp" => Some(Self::Webp),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            "webm" => Some(Self::Webm),
            "mp4" | "m4v" => Some(Self::Mp4),
            _ => None,
        }
    }

    /// Derive the encoding from the extension of a URL or path.
    ///
    /// Query strings and fragments are ignored.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let file = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Avif => "image/avif",
            Self::Webp => "image/webp",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Webm => "video/webm",
            Self::Mp4 => "video/mp4",
        }
    }

    pub fn kind(self) -> MediaKind {
        match self {
            Self::Webm | Self::Mp4 => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }

    /// Baseline encodings decode in every browser and are never probed.
    pub fn is_baseline(self) -> bool {
        matches!(
            self,
            Self::Jpeg | Self::Png | Self::Gif | Self::Svg | Self::Mp4
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Svg => "svg",
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Whether an item requests its bytes on mount or waits for visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    Eager,
    Lazy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One entry in a negotiator candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    pub source: String,
    pub encoding: Encoding,
}

impl SourceCandidate {
    /// Build a candidate from a URL, deriving the encoding from its extension.
    pub fn from_url(source: impl Into<String>) -> Option<Self> {
        let source = source.into();
        let encoding = Encoding::from_url(&source)?;
        Some(Self { source, encoding })
    }
}

/// Percent-encode a relative file path for use as a URL, keeping `/`.
///
/// Filenames may contain `#`, `?` or spaces; once encoded, [`Encoding::from_url`]
/// sees the real extension and browsers fetch the real file.
pub fn source_url(path: &str) -> String {
    urlencoding::encode(path).replace("%2F", "/")
}

/// Scan-stage description of a single media entry.
///
/// `primary` is the most compatible encoding (e.g. JPEG, MP4); `alternate`
/// is an optional more efficient encoding of the same content (e.g. WebP,
/// WebM). Both are file paths relative to the page that renders the
/// gallery; they become URLs through [`source_url`] when composed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl MediaDescriptor {
    pub fn new(primary: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternate: None,
            alt: alt.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_alternate(mut self, alternate: impl Into<String>) -> Self {
        self.alternate = Some(alternate.into());
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// DOM-level identity of a gallery item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A composed, immutable gallery entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: ElementId,
    pub primary_source: String,
    pub alternate_source: Option<String>,
    pub kind: MediaKind,
    pub intrinsic: Option<Dimensions>,
    pub alt_text: String,
    pub load_policy: LoadPolicy,
}

impl MediaItem {
    pub(crate) fn from_descriptor(
        id: ElementId,
        descriptor: &MediaDescriptor,
        load_policy: LoadPolicy,
    ) -> Self {
        let kind = Encoding::from_url(&source_url(&descriptor.primary))
            .map(Encoding::kind)
            .unwrap_or(MediaKind::Image);
        let intrinsic = match (descriptor.width, descriptor.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Some(Dimensions { width, height })
            }
            _ => None,
        };
        Self {
            id,
            primary_source: source_url(&descriptor.primary),
            alternate_source: descriptor.alternate.as_deref().map(source_url),
            kind,
            intrinsic,
            alt_text: descriptor.alt.clone(),
            load_policy,
        }
    }

    /// Negotiator candidates in preference order: efficient first, then the
    /// compatible primary. Sources with an unrecognised extension are skipped.
    pub fn candidates(&self) -> Vec<SourceCandidate> {
        self.alternate_source
            .iter()
            .chain(std::iter::once(&self.primary_source))
            .filter_map(|src| SourceCandidate::from_url(src.as_str()))
            .collect()
    }
}

//! Markup for gallery items.
//!
//! Two families of renderers live here:
//!
//! - **Build-time** ([`gallery`], [`static_item`]): the HTML written into
//!   generated pages. Eager items carry a concrete media element. Lazy items
//!   carry a placeholder whose sources sit in `data-` attributes only, so
//!   the browser has nothing to fetch until the runtime swaps them in.
//! - **Run-time** ([`media_element`], [`fallback_glyph`]): what a loader
//!   mounts into a host once a source has been negotiated or a load failed.
//!
//! Alt text is always present, as `alt` on images and `aria-label` on
//! figures and videos.

use super::gallery::{Gallery, GridLayout};
use super::item::{Dimensions, LoadPolicy, MediaItem, MediaKind, SourceCandidate};
use super::loader::LoadState;
use super::visibility::ObserverOptions;
use maud::{Markup, html};

/// Glyph shown in place of media that failed to load.
pub const FALLBACK_GLYPH: &str = "\u{2298}";

fn aspect_style(intrinsic: Option<Dimensions>) -> Option<String> {
    intrinsic.map(|d| format!("aspect-ratio: {} / {};", d.width, d.height))
}

fn state_attr(state: LoadState) -> &'static str {
    match state {
        LoadState::Pending => "pending",
        LoadState::Requested => "requested",
        LoadState::Loaded => "loaded",
        LoadState::Errored => "errored",
    }
}

/// A single concrete media element for `source`.
pub fn media_element(item: &MediaItem, source: &SourceCandidate) -> Markup {
    let width = item.intrinsic.map(|d| d.width);
    let height = item.intrinsic.map(|d| d.height);
    html! {
        @match item.kind {
            MediaKind::Image => {
                img.media-fade src=(source.source) alt=(item.alt_text)
                    width=[width] height=[height] decoding="async";
            }
            MediaKind::Video => {
                video.media-fade src=(source.source) aria-label=(item.alt_text)
                    width=[width] height=[height]
                    autoplay muted loop playsinline {}
            }
        }
    }
}

/// The fixed placeholder mounted when loading fails.
pub fn fallback_glyph(item: &MediaItem) -> Markup {
    html! {
        span.media-fallback role="img" aria-label=(item.alt_text) { (FALLBACK_GLYPH) }
    }
}

/// Build-time markup for one item, wrapped in its `<figure>`.
pub fn static_item(item: &MediaItem) -> Markup {
    let candidates = item.candidates();
    let state = match item.load_policy {
        LoadPolicy::Eager => LoadState::Requested,
        LoadPolicy::Lazy => LoadState::Pending,
    };
    let (primary, alternate) = split_candidates(&candidates);

    html! {
        figure.media-item id=(item.id.as_str()) role="img" aria-label=(item.alt_text)
            style=[aspect_style(item.intrinsic)]
            data-state=(state_attr(state))
            data-kind=(kind_attr(item.kind))
            data-primary=[primary.map(|c| c.source.as_str())]
            data-primary-type=[primary.map(|c| c.encoding.mime_type())]
            data-alternate=[alternate.map(|c| c.source.as_str())]
            data-alternate-type=[alternate.map(|c| c.encoding.mime_type())]
            data-alt=(item.alt_text) {
            @match state {
                LoadState::Requested => { (eager_element(item, &candidates)) }
                _ => {
                    @if let Some(primary) = primary {
                        noscript { (media_element(item, primary)) }
                    }
                }
            }
        }
    }
}

/// Build-time markup for a composed gallery.
pub fn gallery(gallery: &Gallery, options: &ObserverOptions) -> Markup {
    html! {
        div.media-grid
            data-root-margin=(options.root_margin())
            data-threshold=(options.threshold) {
            @for item in gallery.items() {
                (static_item(item))
            }
        }
    }
}

/// Grid CSS: default column count plus one media query per breakpoint,
/// widest first so narrower queries win the cascade.
pub fn grid_css(layout: &GridLayout) -> String {
    let mut css = format!(
        ".media-grid {{\n    grid-template-columns: repeat({}, minmax(0, 1fr));\n}}",
        layout.columns.max(1)
    );
    let mut breakpoints = layout.breakpoints.clone();
    breakpoints.sort_by(|a, b| b.max_width.cmp(&a.max_width));
    for bp in breakpoints {
        css.push_str(&format!(
            "\n\n@media (max-width: {}px) {{\n    .media-grid {{\n        grid-template-columns: repeat({}, minmax(0, 1fr));\n    }}\n}}",
            bp.max_width,
            bp.columns.max(1)
        ));
    }
    css
}

fn kind_attr(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
    }
}

/// Splits `[alternate, primary]` into `(primary, alternate)`.
fn split_candidates(
    candidates: &[SourceCandidate],
) -> (Option<&SourceCandidate>, Option<&SourceCandidate>) {
    match candidates {
        [] => (None, None),
        [only] => (Some(only), None),
        [.., alternate, primary] => (Some(primary), Some(alternate)),
    }
}

/// Eager items hand negotiation to the browser: every candidate but the last
/// becomes a typed `<source>`, the last is the unconditional element. The
/// browser takes the first type it can decode, else the last.
fn eager_element(item: &MediaItem, candidates: &[SourceCandidate]) -> Markup {
    let Some((last, preferred)) = candidates.split_last() else {
        return fallback_glyph(item);
    };
    let width = item.intrinsic.map(|d| d.width);
    let height = item.intrinsic.map(|d| d.height);
    html! {
        @match item.kind {
            MediaKind::Image => {
                picture {
                    @for c in preferred {
                        source type=(c.encoding.mime_type()) srcset=(c.source);
                    }
                    img.media-fade src=(last.source) alt=(item.alt_text)
                        width=[width] height=[height]
                        loading="eager" decoding="async";
                }
            }
            MediaKind::Video => {
                video.media-fade aria-label=(item.alt_text)
                    width=[width] height=[height]
                    autoplay muted loop playsinline preload="auto" {
                    @for c in candidates {
                        source src=(c.source) type=(c.encoding.mime_type());
                    }
                }
            }
        }
    }
}

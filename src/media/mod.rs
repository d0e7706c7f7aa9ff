//! Lazy media loading and adaptive format selection.
//!
//! This is the headless model of what every generated gallery does in the
//! browser. It is host-agnostic: the DOM side is reached only through
//! [`MediaHost`] and [`CapabilityProbe`], so the same state machine can be
//! driven by a test recorder or any other rendering environment.
//!
//! | Component | Role |
//! |---|---|
//! | [`visibility`] | One-shot intersection signal per element, fail-open without the primitive |
//! | [`negotiate`] | Session-memoized capability probe; first decodable candidate, else the last |
//! | [`loader`] | `Pending → Requested → Loaded / Errored`, fade-in, fallback glyph, no retry |
//! | [`gallery`] | Eager/lazy split for the first K items, event routing, column derivation |
//! | [`render`] | Build-time and run-time markup via Maud |
//!
//! The browser runtime embedded in generated pages (`static/lazy-media.js`)
//! implements the same transitions against the real DOM.

pub mod gallery;
pub mod host;
pub mod item;
pub mod loader;
pub mod negotiate;
pub mod render;
pub mod visibility;

pub use gallery::{Breakpoint, Gallery, GalleryComposer, GridLayout};
pub use host::MediaHost;
pub use item::{
    Dimensions, ElementId, Encoding, LoadPolicy, MediaDescriptor, MediaItem, MediaKind,
    SourceCandidate, source_url,
};
pub use loader::{LoadOutcome, LoadState, MediaLoader};
pub use negotiate::{CapabilityProbe, FormatNegotiator, NoProbe, SessionCapabilities, SourceChoice};
pub use visibility::{Attachment, ObserverOptions, VisibilityDetector, VisibilityEvent};

//! One-shot visibility detection over the host's intersection primitive.
//!
//! A [`VisibilityDetector`] is an acquired observer for exactly one element.
//! It releases itself on the first positive signal; any outstanding detector
//! is released by the gallery on unmount. Hosts without an intersection
//! primitive never hand out a detector: [`VisibilityDetector::attach`]
//! returns [`Attachment::ImmediatelyVisible`] so media still loads.

use super::host::MediaHost;
use super::item::ElementId;
use serde::{Deserialize, Serialize};

/// Tuning for the intersection primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    /// Start loading this many pixels before the element enters the viewport.
    pub root_margin_px: u32,
    /// Fraction of the element that must intersect, `0.0..=1.0`.
    pub threshold: f32,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin_px: 50,
            threshold: 0.1,
        }
    }
}

impl ObserverOptions {
    /// CSS-style margin string as expected by `IntersectionObserver`.
    pub fn root_margin(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

/// Transient signal produced by the host's intersection primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityEvent {
    pub element: ElementId,
    pub is_intersecting: bool,
}

impl VisibilityEvent {
    pub fn visible(element: ElementId) -> Self {
        Self {
            element,
            is_intersecting: true,
        }
    }

    pub fn hidden(element: ElementId) -> Self {
        Self {
            element,
            is_intersecting: false,
        }
    }
}

/// Result of trying to observe an element.
#[derive(Debug)]
pub enum Attachment {
    Observing(VisibilityDetector),
    /// No intersection primitive; treat the element as visible now.
    ImmediatelyVisible,
}

#[derive(Debug)]
#[must_use = "a detector must be kept so it can be released"]
pub struct VisibilityDetector {
    element: ElementId,
    attached: bool,
}

impl VisibilityDetector {
    pub fn attach<H: MediaHost + ?Sized>(
        host: &mut H,
        element: ElementId,
        options: &ObserverOptions,
    ) -> Attachment {
        if !host.supports_intersection() {
            tracing::debug!(element = %element, "no intersection primitive, loading immediately");
            return Attachment::ImmediatelyVisible;
        }
        host.observe(&element, options);
        Attachment::Observing(Self {
            element,
            attached: true,
        })
    }

    pub fn element(&self) -> &ElementId {
        &self.element
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Feed an event to the detector.
    ///
    /// Returns `true` exactly once: for the first intersecting event that
    /// targets this element. The detector detaches at that point and every
    /// later event is ignored.
    pub fn signal<H: MediaHost + ?Sized>(&mut self, host: &mut H, event: &VisibilityEvent) -> bool {
        if !self.attached || !event.is_intersecting || event.element != self.element {
            return false;
        }
        self.detach(host);
        true
    }

    /// Release the observer. Idempotent.
    pub fn detach<H: MediaHost + ?Sized>(&mut self, host: &mut H) {
        if self.attached {
            host.unobserve(&self.element);
            self.attached = false;
        }
    }
}

impl Drop for VisibilityDetector {
    fn drop(&mut self) {
        if self.attached {
            tracing::warn!(element = %self.element, "visibility detector dropped while still observing");
        }
    }
}

//! Per-item load state machine.
//!
//! ```text
//! Pending --(visibility signal | eager policy)--> Requested
//! Requested --(load ok)--> Loaded      fade in
//! Requested --(load failure)--> Errored  fallback glyph, no retry
//! ```
//!
//! Nothing is mounted while Pending, so a lazy item has no byte-stream
//! request until its signal arrives. Signals that do not apply to the
//! current state are ignored, which makes scroll jitter and late load
//! callbacks harmless.

use super::host::MediaHost;
use super::item::{LoadPolicy, MediaItem, SourceCandidate};
use super::negotiate::{FormatNegotiator, SessionCapabilities};
use super::render;
use super::visibility::{Attachment, ObserverOptions, VisibilityDetector, VisibilityEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Requested,
    Loaded,
    Errored,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::Errored)
    }
}

/// What the host reported for a mounted media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

#[derive(Debug)]
pub struct MediaLoader {
    item: MediaItem,
    state: LoadState,
    detector: Option<VisibilityDetector>,
    source: Option<SourceCandidate>,
}

impl MediaLoader {
    pub fn new(item: MediaItem) -> Self {
        Self {
            item,
            state: LoadState::Pending,
            detector: None,
            source: None,
        }
    }

    pub fn item(&self) -> &MediaItem {
        &self.item
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The negotiated source, once requested.
    pub fn source(&self) -> Option<&str> {
        self.source.as_ref().map(|c| c.source.as_str())
    }

    /// Start the item: request now if eager, otherwise observe.
    pub fn mount<H: MediaHost + ?Sized>(
        &mut self,
        host: &mut H,
        capabilities: &SessionCapabilities,
        options: &ObserverOptions,
    ) {
        if self.state != LoadState::Pending || self.detector.is_some() {
            return;
        }
        match self.item.load_policy {
            LoadPolicy::Eager => self.request(host, capabilities),
            LoadPolicy::Lazy => {
                match VisibilityDetector::attach(host, self.item.id.clone(), options) {
                    Attachment::Observing(detector) => self.detector = Some(detector),
                    Attachment::ImmediatelyVisible => self.request(host, capabilities),
                }
            }
        }
    }

    /// Returns `true` if the event moved the item to Requested.
    pub fn on_visibility<H: MediaHost + ?Sized>(
        &mut self,
        host: &mut H,
        capabilities: &SessionCapabilities,
        event: &VisibilityEvent,
    ) -> bool {
        if self.state != LoadState::Pending {
            return false;
        }
        let fired = match self.detector.as_mut() {
            Some(detector) => detector.signal(host, event),
            None => false,
        };
        if !fired {
            return false;
        }
        self.detector = None;
        self.request(host, capabilities);
        true
    }

    /// Returns `true` if the outcome moved the item to a terminal state.
    pub fn on_load<H: MediaHost + ?Sized>(&mut self, host: &mut H, outcome: LoadOutcome) -> bool {
        if self.state != LoadState::Requested {
            return false;
        }
        match outcome {
            LoadOutcome::Loaded => {
                self.state = LoadState::Loaded;
                host.fade_in(&self.item.id);
            }
            LoadOutcome::Failed => self.fail(host),
        }
        true
    }

    /// Release the observer if the item never became visible.
    pub fn unmount<H: MediaHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(mut detector) = self.detector.take() {
            detector.detach(host);
        }
    }

    fn request<H: MediaHost + ?Sized>(&mut self, host: &mut H, capabilities: &SessionCapabilities) {
        let candidates = self.item.candidates();
        let chosen = FormatNegotiator::new(capabilities)
            .choose(&candidates)
            .map(|choice| choice.candidate().clone());

        self.state = LoadState::Requested;
        match chosen {
            Some(candidate) => {
                host.mount(&self.item.id, render::media_element(&self.item, &candidate));
                self.source = Some(candidate);
            }
            None => self.fail(host),
        }
    }

    fn fail<H: MediaHost + ?Sized>(&mut self, host: &mut H) {
        self.state = LoadState::Errored;
        host.mount(&self.item.id, render::fallback_glyph(&self.item));
        if cfg!(debug_assertions) {
            tracing::warn!(
                element = %self.item.id,
                source = self.source().unwrap_or("<none>"),
                "media failed to load"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::host::tests::RecordingHost;
    use crate::media::item::{ElementId, Encoding, MediaDescriptor};

    fn loader(policy: LoadPolicy) -> MediaLoader {
        let d = MediaDescriptor::new("original.jpg", "Poster").with_alternate("efficient.webp");
        MediaLoader::new(MediaItem::from_descriptor(ElementId::new("m-0"), &d, policy))
    }

    fn webp_session() -> SessionCapabilities {
        SessionCapabilities::new(|e: Encoding| Some(e == Encoding::Webp))
    }

    fn visible() -> VisibilityEvent {
        VisibilityEvent::visible(ElementId::new("m-0"))
    }

    #[test]
    fn lazy_item_issues_no_request_before_signal() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Lazy);
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert_eq!(l.state(), LoadState::Pending);
        assert!(host.requests("m-0").is_empty());
        assert!(host.observing("m-0"));
        l.unmount(&mut host);
    }

    #[test]
    fn eager_item_requests_on_mount() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Eager);
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert_eq!(l.state(), LoadState::Requested);
        assert_eq!(host.requests("m-0").len(), 1);
        assert!(!host.observing("m-0"));
    }

    #[test]
    fn jittery_signal_requests_once() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Lazy);
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert!(l.on_visibility(&mut host, &caps, &visible()));
        assert!(!l.on_visibility(&mut host, &caps, &visible()));

        assert_eq!(l.state(), LoadState::Requested);
        assert_eq!(host.requests("m-0").len(), 1);
        assert!(!host.observing("m-0"));
    }

    #[test]
    fn requested_source_is_negotiated() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Eager);
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert_eq!(l.source(), Some("efficient.webp"));
        assert!(host.requests("m-0")[0].contains(r#"src="efficient.webp""#));
    }

    #[test]
    fn failure_renders_fallback_once_without_retry() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Eager);
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert!(l.on_load(&mut host, LoadOutcome::Failed));
        assert!(!l.on_load(&mut host, LoadOutcome::Failed));
        assert!(!l.on_visibility(&mut host, &caps, &visible()));

        assert_eq!(l.state(), LoadState::Errored);
        assert_eq!(host.fallbacks("m-0"), 1);
        assert_eq!(host.requests("m-0").len(), 1);
    }

    #[test]
    fn success_fades_in() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Eager);
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert!(l.on_load(&mut host, LoadOutcome::Loaded));
        assert_eq!(l.state(), LoadState::Loaded);
        assert!(host.faded("m-0"));
        assert!(l.state().is_terminal());
    }

    #[test]
    fn loaded_item_ignores_late_failure() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Eager);
        l.mount(&mut host, &caps, &ObserverOptions::default());
        l.on_load(&mut host, LoadOutcome::Loaded);

        assert!(!l.on_load(&mut host, LoadOutcome::Failed));
        assert_eq!(l.state(), LoadState::Loaded);
        assert_eq!(host.fallbacks("m-0"), 0);
    }

    #[test]
    fn load_outcome_before_request_is_ignored() {
        let mut host = RecordingHost::new();
        let mut l = loader(LoadPolicy::Lazy);
        assert!(!l.on_load(&mut host, LoadOutcome::Loaded));
        assert_eq!(l.state(), LoadState::Pending);
    }

    #[test]
    fn missing_intersection_loads_immediately() {
        let mut host = RecordingHost::without_intersection();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Lazy);
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert_eq!(l.state(), LoadState::Requested);
        assert_eq!(host.requests("m-0").len(), 1);
    }

    #[test]
    fn unmount_releases_pending_observer() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let mut l = loader(LoadPolicy::Lazy);
        l.mount(&mut host, &caps, &ObserverOptions::default());
        l.unmount(&mut host);

        assert!(!host.observing("m-0"));
        assert!(!l.on_visibility(&mut host, &caps, &visible()));
        assert!(host.requests("m-0").is_empty());
    }

    #[test]
    fn unrecognised_sources_error_immediately() {
        let mut host = RecordingHost::new();
        let caps = webp_session();
        let d = MediaDescriptor::new("clip.mov", "Clip");
        let mut l = MediaLoader::new(MediaItem::from_descriptor(
            ElementId::new("m-0"),
            &d,
            LoadPolicy::Eager,
        ));
        l.mount(&mut host, &caps, &ObserverOptions::default());

        assert_eq!(l.state(), LoadState::Errored);
        assert_eq!(host.fallbacks("m-0"), 1);
    }
}

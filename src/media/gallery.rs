//! Gallery composition and the per-gallery event router.
//!
//! [`GalleryComposer`] assigns load policy by position: the first K items
//! are eager (above the fold), the rest lazy. The composed [`Gallery`] owns
//! one [`MediaLoader`] per item and routes host events to them by element id.
//!
//! Column count is purely presentational and derived from viewport width by
//! [`GridLayout::columns_for`].

use super::host::MediaHost;
use super::item::{ElementId, LoadPolicy, MediaDescriptor, MediaItem};
use super::loader::{LoadOutcome, LoadState, MediaLoader};
use super::negotiate::SessionCapabilities;
use super::visibility::{ObserverOptions, VisibilityEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column override that applies at or below `max_width` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    pub max_width: u32,
    pub columns: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 3,
            breakpoints: vec![
                Breakpoint {
                    max_width: 1024,
                    columns: 2,
                },
                Breakpoint {
                    max_width: 640,
                    columns: 1,
                },
            ],
        }
    }
}

impl GridLayout {
    /// Columns at `viewport_width`: the narrowest breakpoint that still
    /// covers the width wins; otherwise the default.
    pub fn columns_for(&self, viewport_width: u32) -> u32 {
        self.breakpoints
            .iter()
            .filter(|bp| viewport_width <= bp.max_width)
            .min_by_key(|bp| bp.max_width)
            .map(|bp| bp.columns)
            .unwrap_or(self.columns)
            .max(1)
    }
}

#[derive(Debug, Clone)]
pub struct GalleryComposer {
    eager_count: usize,
    id_prefix: String,
    options: ObserverOptions,
}

impl GalleryComposer {
    pub fn new(eager_count: usize) -> Self {
        Self {
            eager_count,
            id_prefix: "media".to_string(),
            options: ObserverOptions::default(),
        }
    }

    /// Element ids become `{prefix}-{index}`; use distinct prefixes for
    /// galleries that share a page.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    pub fn with_observer_options(mut self, options: ObserverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy_for(&self, index: usize) -> LoadPolicy {
        if index < self.eager_count {
            LoadPolicy::Eager
        } else {
            LoadPolicy::Lazy
        }
    }

    pub fn compose(&self, descriptors: &[MediaDescriptor]) -> Gallery {
        let loaders: Vec<MediaLoader> = descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                let id = ElementId::new(format!("{}-{}", self.id_prefix, index));
                MediaLoader::new(MediaItem::from_descriptor(
                    id,
                    descriptor,
                    self.policy_for(index),
                ))
            })
            .collect();
        let index = loaders
            .iter()
            .enumerate()
            .map(|(i, l)| (l.item().id.clone(), i))
            .collect();
        Gallery {
            loaders,
            index,
            options: self.options,
        }
    }
}

#[derive(Debug)]
pub struct Gallery {
    loaders: Vec<MediaLoader>,
    index: HashMap<ElementId, usize>,
    options: ObserverOptions,
}

impl Gallery {
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &MediaItem> {
        self.loaders.iter().map(MediaLoader::item)
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    pub fn state(&self, element: &ElementId) -> Option<LoadState> {
        self.loader(element).map(MediaLoader::state)
    }

    pub fn loader(&self, element: &ElementId) -> Option<&MediaLoader> {
        self.index.get(element).map(|&i| &self.loaders[i])
    }

    /// Mount every item: eager ones request now, lazy ones start observing.
    pub fn mount<H: MediaHost + ?Sized>(&mut self, host: &mut H, capabilities: &SessionCapabilities) {
        let options = self.options;
        for loader in &mut self.loaders {
            loader.mount(host, capabilities, &options);
        }
    }

    /// Route a visibility event. Events for unknown elements are dropped.
    pub fn on_visibility<H: MediaHost + ?Sized>(
        &mut self,
        host: &mut H,
        capabilities: &SessionCapabilities,
        event: &VisibilityEvent,
    ) -> bool {
        match self.index.get(&event.element) {
            Some(&i) => self.loaders[i].on_visibility(host, capabilities, event),
            None => false,
        }
    }

    pub fn on_load<H: MediaHost + ?Sized>(
        &mut self,
        host: &mut H,
        element: &ElementId,
        outcome: LoadOutcome,
    ) -> bool {
        match self.index.get(element) {
            Some(&i) => self.loaders[i].on_load(host, outcome),
            None => false,
        }
    }

    /// Release every outstanding observer. In-flight requests are not
    /// cancelled; the host reclaims them with the detached elements.
    pub fn unmount<H: MediaHost + ?Sized>(mut self, host: &mut H) {
        for loader in &mut self.loaders {
            loader.unmount(host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::host::tests::RecordingHost;
    use crate::media::item::Encoding;

    fn descriptors(n: usize) -> Vec<MediaDescriptor> {
        (0..n)
            .map(|i| {
                MediaDescriptor::new(format!("{i:03}.jpg"), format!("Shot {i}"))
                    .with_alternate(format!("{i:03}.webp"))
            })
            .collect()
    }

    fn session() -> SessionCapabilities {
        SessionCapabilities::new(|e: Encoding| Some(e == Encoding::Webp))
    }

    #[test]
    fn first_k_items_are_eager() {
        let gallery = GalleryComposer::new(2).compose(&descriptors(6));
        let policies: Vec<LoadPolicy> = gallery.items().map(|i| i.load_policy).collect();
        assert_eq!(
            policies,
            vec![
                LoadPolicy::Eager,
                LoadPolicy::Eager,
                LoadPolicy::Lazy,
                LoadPolicy::Lazy,
                LoadPolicy::Lazy,
                LoadPolicy::Lazy,
            ]
        );
    }

    #[test]
    fn eager_count_larger_than_gallery() {
        let gallery = GalleryComposer::new(10).compose(&descriptors(3));
        assert!(gallery.items().all(|i| i.load_policy == LoadPolicy::Eager));
    }

    #[test]
    fn zero_eager_count_makes_everything_lazy() {
        let gallery = GalleryComposer::new(0).compose(&descriptors(3));
        assert!(gallery.items().all(|i| i.load_policy == LoadPolicy::Lazy));
    }

    #[test]
    fn ids_use_prefix_and_position() {
        let gallery = GalleryComposer::new(1)
            .with_id_prefix("brand")
            .compose(&descriptors(2));
        let ids: Vec<&str> = gallery.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["brand-0", "brand-1"]);
    }

    #[test]
    fn mount_requests_only_eager_items() {
        let mut host = RecordingHost::new();
        let caps = session();
        let mut gallery = GalleryComposer::new(2).compose(&descriptors(4));
        gallery.mount(&mut host, &caps);

        assert_eq!(host.requests("media-0").len(), 1);
        assert_eq!(host.requests("media-1").len(), 1);
        assert!(host.requests("media-2").is_empty());
        assert!(host.requests("media-3").is_empty());
        assert!(host.observing("media-2"));
        assert!(host.observing("media-3"));
        gallery.unmount(&mut host);
    }

    #[test]
    fn visibility_is_routed_by_element() {
        let mut host = RecordingHost::new();
        let caps = session();
        let mut gallery = GalleryComposer::new(0).compose(&descriptors(3));
        gallery.mount(&mut host, &caps);

        let id = ElementId::new("media-1");
        assert!(gallery.on_visibility(&mut host, &caps, &VisibilityEvent::visible(id.clone())));
        assert_eq!(gallery.state(&id), Some(LoadState::Requested));
        assert_eq!(
            gallery.state(&ElementId::new("media-0")),
            Some(LoadState::Pending)
        );
        gallery.unmount(&mut host);
    }

    #[test]
    fn unknown_element_events_are_dropped() {
        let mut host = RecordingHost::new();
        let caps = session();
        let mut gallery = GalleryComposer::new(0).compose(&descriptors(1));
        gallery.mount(&mut host, &caps);

        let ghost = ElementId::new("ghost");
        assert!(!gallery.on_visibility(&mut host, &caps, &VisibilityEvent::visible(ghost.clone())));
        assert!(!gallery.on_load(&mut host, &ghost, LoadOutcome::Loaded));
        gallery.unmount(&mut host);
    }

    #[test]
    fn unmount_releases_outstanding_observers() {
        let mut host = RecordingHost::new();
        let caps = session();
        let mut gallery = GalleryComposer::new(1).compose(&descriptors(3));
        gallery.mount(&mut host, &caps);
        gallery.unmount(&mut host);

        assert!(!host.observing("media-1"));
        assert!(!host.observing("media-2"));
    }

    #[test]
    fn probe_shared_across_gallery() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let caps = SessionCapabilities::new(move |_: Encoding| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(true)
        });
        let mut host = RecordingHost::new();
        let mut gallery = GalleryComposer::new(8).compose(&descriptors(8));
        gallery.mount(&mut host, &caps);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        gallery.unmount(&mut host);
    }

    #[test]
    fn columns_follow_breakpoints() {
        let layout = GridLayout::default();
        assert_eq!(layout.columns_for(1440), 3);
        assert_eq!(layout.columns_for(1024), 2);
        assert_eq!(layout.columns_for(800), 2);
        assert_eq!(layout.columns_for(640), 1);
        assert_eq!(layout.columns_for(320), 1);
    }

    #[test]
    fn breakpoint_order_does_not_matter() {
        let layout = GridLayout {
            columns: 4,
            breakpoints: vec![
                Breakpoint {
                    max_width: 500,
                    columns: 1,
                },
                Breakpoint {
                    max_width: 900,
                    columns: 2,
                },
            ],
        };
        assert_eq!(layout.columns_for(400), 1);
        assert_eq!(layout.columns_for(700), 2);
        assert_eq!(layout.columns_for(1200), 4);
    }
}

//! Adaptive format selection.
//!
//! Capability is probed lazily, at most once per encoding per session, and
//! cached in a [`SessionCapabilities`] value that consumers borrow. A session
//! is one page view; dropping the value is the reload that invalidates it.
//!
//! The negotiator only filters: the caller's preference order is kept, the
//! first candidate the session can decode wins, and the last candidate is
//! the fallback when nothing can be confirmed.

use super::item::{Encoding, SourceCandidate};
use std::fmt;
use std::sync::OnceLock;

/// Runtime decode check for a single encoding.
///
/// `None` means the probing primitive itself is unavailable (no canvas, no
/// media-capabilities API). The session treats that as "cannot decode".
pub trait CapabilityProbe: Send + Sync {
    fn can_decode(&self, encoding: Encoding) -> Option<bool>;
}

impl<F> CapabilityProbe for F
where
    F: Fn(Encoding) -> Option<bool> + Send + Sync,
{
    fn can_decode(&self, encoding: Encoding) -> Option<bool> {
        self(encoding)
    }
}

/// Probe for environments that can run no probes, such as link-preview
/// crawlers reading `og:image`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl CapabilityProbe for NoProbe {
    fn can_decode(&self, _encoding: Encoding) -> Option<bool> {
        None
    }
}

/// Single-initialization capability cache for one session.
pub struct SessionCapabilities {
    probe: Box<dyn CapabilityProbe>,
    avif: OnceLock<bool>,
    webp: OnceLock<bool>,
    webm: OnceLock<bool>,
}

impl SessionCapabilities {
    pub fn new(probe: impl CapabilityProbe + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            avif: OnceLock::new(),
            webp: OnceLock::new(),
            webm: OnceLock::new(),
        }
    }

    /// A session where only baseline encodings are trusted.
    pub fn baseline() -> Self {
        Self::new(NoProbe)
    }

    /// Whether this session can decode `encoding`, probing on first use.
    pub fn supports(&self, encoding: Encoding) -> bool {
        match self.cell(encoding) {
            None => true,
            Some(cell) => *cell.get_or_init(|| {
                let result = self.probe.can_decode(encoding);
                tracing::debug!(%encoding, ?result, "capability probed");
                result.unwrap_or(false)
            }),
        }
    }

    /// The cached answer for `encoding`, without probing.
    pub fn resolved(&self, encoding: Encoding) -> Option<bool> {
        match self.cell(encoding) {
            None => Some(true),
            Some(cell) => cell.get().copied(),
        }
    }

    fn cell(&self, encoding: Encoding) -> Option<&OnceLock<bool>> {
        match encoding {
            Encoding::Avif => Some(&self.avif),
            Encoding::Webp => Some(&self.webp),
            Encoding::Webm => Some(&self.webm),
            _ => {
                debug_assert!(encoding.is_baseline());
                None
            }
        }
    }
}

impl fmt::Debug for SessionCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCapabilities")
            .field("avif", &self.avif.get())
            .field("webp", &self.webp.get())
            .field("webm", &self.webm.get())
            .finish_non_exhaustive()
    }
}

/// Render decision for one candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChoice<'a> {
    /// A candidate the session confirmed it can decode.
    Negotiated(&'a SourceCandidate),
    /// Nothing confirmed; the last (most compatible) candidate.
    Fallback(&'a SourceCandidate),
}

impl<'a> SourceChoice<'a> {
    pub fn candidate(&self) -> &'a SourceCandidate {
        match self {
            Self::Negotiated(c) | Self::Fallback(c) => c,
        }
    }

    pub fn source(&self) -> &'a str {
        &self.candidate().source
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormatNegotiator<'s> {
    capabilities: &'s SessionCapabilities,
}

impl<'s> FormatNegotiator<'s> {
    pub fn new(capabilities: &'s SessionCapabilities) -> Self {
        Self { capabilities }
    }

    /// Pick the first decodable candidate, else the last one.
    ///
    /// Returns `None` only for an empty list.
    pub fn choose<'c>(&self, candidates: &'c [SourceCandidate]) -> Option<SourceChoice<'c>> {
        candidates
            .iter()
            .find(|c| self.capabilities.supports(c.encoding))
            .map(SourceChoice::Negotiated)
            .or_else(|| candidates.last().map(SourceChoice::Fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn candidates() -> Vec<SourceCandidate> {
        vec![
            SourceCandidate {
                source: "efficient.webp".to_string(),
                encoding: Encoding::Webp,
            },
            SourceCandidate {
                source: "original.jpg".to_string(),
                encoding: Encoding::Jpeg,
            },
        ]
    }

    fn webp_probe(supported: bool) -> impl CapabilityProbe {
        move |encoding: Encoding| match encoding {
            Encoding::Webp => Some(supported),
            _ => Some(false),
        }
    }

    fn counting_probe(count: Arc<AtomicUsize>) -> impl CapabilityProbe {
        move |_encoding: Encoding| {
            count.fetch_add(1, Ordering::SeqCst);
            Some(true)
        }
    }

    #[test]
    fn no_webp_support_picks_jpeg() {
        let caps = SessionCapabilities::new(webp_probe(false));
        let list = candidates();
        let choice = FormatNegotiator::new(&caps).choose(&list).unwrap();
        assert_eq!(choice.source(), "original.jpg");
    }

    #[test]
    fn webp_support_picks_webp() {
        let caps = SessionCapabilities::new(webp_probe(true));
        let list = candidates();
        let choice = FormatNegotiator::new(&caps).choose(&list).unwrap();
        assert_eq!(choice.source(), "efficient.webp");
        assert!(matches!(choice, SourceChoice::Negotiated(_)));
    }

    #[test]
    fn probe_runs_once_per_session() {
        let count = Arc::new(AtomicUsize::new(0));
        let caps = SessionCapabilities::new(counting_probe(count.clone()));
        let negotiator = FormatNegotiator::new(&caps);
        let list = candidates();

        for _ in 0..50 {
            negotiator.choose(&list);
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn baseline_encodings_are_never_probed() {
        let count = Arc::new(AtomicUsize::new(0));
        let caps = SessionCapabilities::new(counting_probe(count.clone()));
        assert!(caps.supports(Encoding::Jpeg));
        assert!(caps.supports(Encoding::Mp4));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn repeated_choice_is_identical() {
        let caps = SessionCapabilities::new(webp_probe(true));
        let negotiator = FormatNegotiator::new(&caps);
        let list = candidates();
        let first = negotiator.choose(&list);
        let second = negotiator.choose(&list);
        assert_eq!(first, second);
    }

    #[test]
    fn order_is_never_changed() {
        let caps = SessionCapabilities::new(|_: Encoding| Some(true));
        let list = vec![
            SourceCandidate {
                source: "a.avif".to_string(),
                encoding: Encoding::Avif,
            },
            SourceCandidate {
                source: "a.webp".to_string(),
                encoding: Encoding::Webp,
            },
        ];
        let choice = FormatNegotiator::new(&caps).choose(&list).unwrap();
        assert_eq!(choice.source(), "a.avif");
    }

    #[test]
    fn unconfirmed_list_falls_back_to_last() {
        let caps = SessionCapabilities::baseline();
        let list = vec![
            SourceCandidate {
                source: "a.avif".to_string(),
                encoding: Encoding::Avif,
            },
            SourceCandidate {
                source: "a.webp".to_string(),
                encoding: Encoding::Webp,
            },
        ];
        let choice = FormatNegotiator::new(&caps).choose(&list).unwrap();
        assert!(matches!(choice, SourceChoice::Fallback(_)));
        assert_eq!(choice.source(), "a.webp");
    }

    #[test]
    fn empty_list_has_no_choice() {
        let caps = SessionCapabilities::baseline();
        assert!(FormatNegotiator::new(&caps).choose(&[]).is_none());
    }

    #[test]
    fn unavailable_probe_is_cached_as_unsupported() {
        let caps = SessionCapabilities::baseline();
        assert_eq!(caps.resolved(Encoding::Webp), None);
        assert!(!caps.supports(Encoding::Webp));
        assert_eq!(caps.resolved(Encoding::Webp), Some(false));
    }
}

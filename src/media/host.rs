//! The browser boundary of the media pipeline.
//!
//! Everything the pipeline needs from its rendering environment goes through
//! [`MediaHost`]: the viewport-intersection primitive, element mounting, and
//! the cosmetic fade. Decode capability lives on a separate seam,
//! [`CapabilityProbe`](super::negotiate::CapabilityProbe), because it is
//! consulted once per session rather than once per element.
//!
//! Mounting is the only way a byte-stream request comes into existence: a
//! host issues the network request when a concrete `<img>` or `<video>` is
//! mounted for an element, never before.

use super::item::ElementId;
use super::visibility::ObserverOptions;
use maud::Markup;

pub trait MediaHost {
    /// Whether the environment provides a viewport-intersection primitive.
    fn supports_intersection(&self) -> bool;

    /// Start delivering visibility events for `element`.
    fn observe(&mut self, element: &ElementId, options: &ObserverOptions);

    /// Stop delivering visibility events for `element`.
    fn unobserve(&mut self, element: &ElementId);

    /// Replace the content of `element` with `markup`.
    fn mount(&mut self, element: &ElementId, markup: Markup);

    /// Run the opacity transition on a loaded element.
    fn fade_in(&mut self, element: &ElementId);
}

//! Near-end-of-list capability. In a browser this would be an
//! IntersectionObserver on a marker element; here the capability is a trait
//! so the trigger can come from viewport intersection ratios, a manual
//! load-more control, or anything else the host environment has.

use super::controller::FeedController;
use super::{FeedState, ProductStore};

/// Poll-style equivalent of `onNearEnd(callback)`: returns true once per
/// pending signal. Signals only take effect through the controller's own
/// gating (`has_more` and the loading flag), so spurious triggers are no-ops.
pub trait NearEnd {
    fn near_end(&mut self) -> bool;
}

/// Sentinel fed viewport visibility samples for a marker element near the
/// end of the list. Only mounted while the feed has more pages; unmounting
/// on a search change drops any pending signal so a stale trigger cannot
/// race the reset.
#[derive(Debug)]
pub struct ScrollSentinel {
    threshold: f64,
    mounted: bool,
    pending: bool,
}

impl ScrollSentinel {
    pub const DEFAULT_THRESHOLD: f64 = 0.1;

    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            mounted: false,
            pending: false,
        }
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Feed one visibility sample (fraction of the marker in view).
    pub fn observe(&mut self, visible_ratio: f64) {
        if self.mounted && visible_ratio >= self.threshold {
            self.pending = true;
        }
    }

    /// Keep mount state in sync with the feed: mounted iff more pages exist.
    pub fn sync(&mut self, state: &FeedState) {
        if state.has_more {
            if !self.mounted {
                self.mount();
            }
        } else {
            self.unmount();
        }
    }
}

impl Default for ScrollSentinel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl NearEnd for ScrollSentinel {
    fn near_end(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Manual alternative: an explicit "load more" control.
#[derive(Debug, Default)]
pub struct LoadMoreButton {
    pressed: bool,
}

impl LoadMoreButton {
    pub fn press(&mut self) {
        self.pressed = true;
    }
}

impl NearEnd for LoadMoreButton {
    fn near_end(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }
}

/// Drive one trigger cycle: if the signal fired and the controller accepts
/// a next-page request, run the fetch. Returns whether a fetch happened.
pub async fn pump<S: ProductStore + ?Sized>(
    controller: &mut FeedController,
    trigger: &mut dyn NearEnd,
    store: &S,
) -> bool {
    if !trigger.near_end() {
        return false;
    }
    let Some(request) = controller.request_next() else {
        return false;
    };
    controller.load(store, request).await;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_at_threshold_while_mounted() {
        let mut sentinel = ScrollSentinel::default();
        sentinel.observe(0.5);
        assert!(!sentinel.near_end(), "unmounted sentinel never signals");

        sentinel.mount();
        sentinel.observe(0.05);
        assert!(!sentinel.near_end(), "below threshold");
        sentinel.observe(0.1);
        assert!(sentinel.near_end());
        assert!(!sentinel.near_end(), "signal is consumed");
    }

    #[test]
    fn unmount_drops_pending_signal() {
        let mut sentinel = ScrollSentinel::default();
        sentinel.mount();
        sentinel.observe(1.0);
        sentinel.unmount();
        assert!(!sentinel.near_end(), "stale trigger must not survive a reset");
    }

    #[test]
    fn sync_follows_has_more() {
        let mut sentinel = ScrollSentinel::default();
        let mut state = FeedState::default();

        state.has_more = true;
        sentinel.sync(&state);
        assert!(sentinel.is_mounted());

        state.has_more = false;
        sentinel.sync(&state);
        assert!(!sentinel.is_mounted());
    }

    #[test]
    fn load_more_button_is_one_shot() {
        let mut button = LoadMoreButton::default();
        assert!(!button.near_end());
        button.press();
        assert!(button.near_end());
        assert!(!button.near_end());
    }
}

use super::view_state::Remap;
use std::time::{Duration, Instant};

/// How long a moved service stays highlighted.
pub const FOCUS_HOLD: Duration = Duration::from_millis(1500);

/// A momentary highlight on one service row plus its pending auto-clear.
///
/// There is only ever one pending expiry: `start` replaces it, so a newer
/// highlight can never be cleared by an older deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransientFocus {
    pending: Option<Pending>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    index: usize,
    deadline: Instant,
}

impl TransientFocus {
    pub fn start(&mut self, index: usize, now: Instant) {
        self.pending = Some(Pending {
            index,
            deadline: now + FOCUS_HOLD,
        });
    }

    pub fn index(&self) -> Option<usize> {
        self.pending.map(|p| p.index)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Clears the highlight once its deadline has passed. Returns true when
    /// something was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn remap(&mut self, remap: Remap) {
        if let Some(p) = self.pending.as_mut() {
            match remap.apply(p.index) {
                Some(index) => p.index = index,
                None => self.pending = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_default_has_no_focus() {
        let focus = TransientFocus::default();
        assert_eq!(focus.index(), None);
        assert_eq!(focus.deadline(), None);
    }

    #[test]
    fn test_expires_after_hold() {
        let t0 = Instant::now();
        let mut focus = TransientFocus::default();
        focus.start(2, t0);

        assert!(!focus.expire(t0 + ms(1499)));
        assert_eq!(focus.index(), Some(2));

        assert!(focus.expire(t0 + ms(1500)));
        assert_eq!(focus.index(), None);
    }

    #[test]
    fn test_restart_cancels_earlier_deadline() {
        let t0 = Instant::now();
        let mut focus = TransientFocus::default();
        focus.start(1, t0);
        focus.start(0, t0 + ms(1000));

        // First deadline passes; the newer highlight survives.
        assert!(!focus.expire(t0 + ms(1600)));
        assert_eq!(focus.index(), Some(0));

        assert!(focus.expire(t0 + ms(2500)));
        assert_eq!(focus.index(), None);
    }

    #[test]
    fn test_remap_follows_row_or_clears() {
        let t0 = Instant::now();
        let mut focus = TransientFocus::default();
        focus.start(3, t0);
        focus.remap(Remap::Removed(1));
        assert_eq!(focus.index(), Some(2));
        focus.remap(Remap::Swapped(2, 1));
        assert_eq!(focus.index(), Some(1));
        focus.remap(Remap::Removed(1));
        assert_eq!(focus.index(), None);
    }
}

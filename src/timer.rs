/// A cancelable one-shot deadline on the adapter's millisecond clock.
///
/// The engine never sleeps or spawns: the adapter advances time by calling
/// [`crate::VirtualList::tick`], which polls this deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timeout {
    deadline_ms: Option<u64>,
}

impl Timeout {
    /// Schedules the deadline `delay_ms` after `now_ms`, replacing any pending one.
    pub fn request(&mut self, now_ms: u64, delay_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(delay_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Returns `true` once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_pushes_the_deadline_back() {
        let mut t = Timeout::default();
        t.request(0, 150);
        t.request(100, 150);
        assert!(!t.poll(150));
        assert!(t.poll(250));
        assert!(!t.poll(400));
        assert_eq!(t.deadline_ms(), None);
    }

    #[test]
    fn cancel_drops_the_callback() {
        let mut t = Timeout::default();
        t.request(0, 10);
        t.cancel();
        assert!(!t.poll(1_000));
    }
}

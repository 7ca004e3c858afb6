use crate::{EventKind, LinkStatus, RadioStatus, Status};

/// Suppresses repeated identical statuses per event kind.
///
/// `None` means the kind has not been observed yet, so the first status of
/// each kind always passes. Statuses are only "new" by value; there is no
/// time-based expiry.
#[derive(Debug, Default, Clone)]
pub struct StatusDeduplicator {
    last_radio: Option<RadioStatus>,
    last_link: Option<LinkStatus>,
}

impl StatusDeduplicator {
    /// Creates a deduplicator with no kind observed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and remembers `status` if it differs from the last one
    /// seen for its kind.
    pub fn should_emit(&mut self, status: &Status) -> bool {
        match status {
            Status::Radio(radio) => replace_if_changed(&mut self.last_radio, radio),
            Status::Link(link) => replace_if_changed(&mut self.last_link, link),
        }
    }

    /// Last emitted status for `kind`, if any.
    pub fn last(&self, kind: EventKind) -> Option<Status> {
        match kind {
            EventKind::Radio => self.last_radio.map(Status::Radio),
            EventKind::Link => self.last_link.clone().map(Status::Link),
        }
    }

    /// Forgets both kinds.
    pub fn reset(&mut self) {
        self.last_radio = None;
        self.last_link = None;
    }
}

fn replace_if_changed<T: Clone + PartialEq>(slot: &mut Option<T>, new: &T) -> bool {
    if slot.as_ref() == Some(new) {
        return false;
    }
    *slot = Some(new.clone());
    true
}

use crate::foundation::error::PhotoframeError;

/// Identifies one asynchronous load request.
///
/// Tickets are issued in increasing order per slot; only the most recent one may apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What happened to a completed load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The result was accepted and the session state changed.
    Applied,
    /// A newer request was issued (or this one already completed); the result was dropped.
    Superseded,
    /// The load was current but failed; previous state is kept.
    Failed(PhotoframeError),
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Latest-request-wins bookkeeping for one kind of asset.
#[derive(Debug, Default)]
pub(crate) struct LoadSlot {
    issued: u64,
    settled: bool,
}

impl LoadSlot {
    pub(crate) fn begin(&mut self) -> LoadTicket {
        self.issued = self.issued.wrapping_add(1);
        self.settled = false;
        LoadTicket(self.issued)
    }

    /// Whether `ticket` is the latest issued and still awaiting completion.
    pub(crate) fn is_pending(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.issued && !self.settled
    }

    /// Mark `ticket` complete. Returns `false` when it is stale or already settled.
    pub(crate) fn settle(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_pending(ticket) {
            return false;
        }
        self.settled = true;
        true
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.issued != 0 && !self.settled
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

//! Response ordering

/// Admits responses in the order their requests were sent
///
/// Sequence numbers come from one counter shared by all jobs. A gate
/// starts at the counter value observed when tracking began, so responses
/// to requests sent before a restart are always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceGate {
    last_applied: u64,
}

impl SequenceGate {
    pub fn new(floor: u64) -> Self {
        Self {
            last_applied: floor,
        }
    }

    /// Accepts `seq` if it is newer than every response applied so far
    pub fn admit(&mut self, seq: u64) -> bool {
        if seq <= self.last_applied {
            return false;
        }
        self.last_applied = seq;
        true
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }
}

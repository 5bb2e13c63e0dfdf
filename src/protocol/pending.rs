use std::collections::HashMap;

/// A request sent to the peer and not yet answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub serial: u32,
    pub code: u32,
}

/// Correlation table from serial to the request awaiting its reply.
#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: HashMap<u32, PendingRequest>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request. Returns `false`, leaving the existing entry in place, if the
    /// serial is already pending.
    pub fn submit(&mut self, serial: u32, code: u32) -> bool {
        if self.entries.contains_key(&serial) {
            return false;
        }
        self.entries.insert(serial, PendingRequest { serial, code });
        true
    }

    /// Removes the entry for `serial` and returns its command code.
    pub fn resolve(&mut self, serial: u32) -> Option<u32> {
        self.entries.remove(&serial).map(|pending| pending.code)
    }

    pub fn get(&self, serial: u32) -> Option<&PendingRequest> {
        self.entries.get(&serial)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outstanding serials, oldest first.
    pub fn serials(&self) -> Vec<u32> {
        let mut serials = self.entries.keys().copied().collect::<Vec<u32>>();
        serials.sort_unstable();
        serials
    }
}

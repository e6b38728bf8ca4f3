//! Resource request ledger: the batch of signed rate requests for one settlement.
//!
//! Positive rates are consumption (drawn from supply), negative rates are
//! production (added to supply). Entries naming the same resource are kept
//! separate; nothing is netted.

/// One signed rate request in units per second.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    pub name: String,
    /// Positive = consume, negative = produce.
    pub rate: f64,
}

impl ResourceRequest {
    pub fn is_consumer(&self) -> bool {
        self.rate > 0.0
    }
}

/// Ordered, write-only batch of requests owned by a single tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestLedger {
    requests: Vec<ResourceRequest>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a producer. `rate` is a non-negative magnitude; it is stored negated.
    pub fn produce(&mut self, resource: impl Into<String>, rate: f64) -> &mut Self {
        self.requests.push(ResourceRequest {
            name: resource.into(),
            rate: -rate,
        });
        self
    }

    /// Register a consumer at `rate` units per second.
    pub fn consume(&mut self, resource: impl Into<String>, rate: f64) -> &mut Self {
        self.requests.push(ResourceRequest {
            name: resource.into(),
            rate,
        });
        self
    }

    pub fn requests(&self) -> &[ResourceRequest] {
        &self.requests
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl FromIterator<ResourceRequest> for RequestLedger {
    fn from_iter<I: IntoIterator<Item = ResourceRequest>>(iter: I) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}

impl Extend<ResourceRequest> for RequestLedger {
    fn extend<I: IntoIterator<Item = ResourceRequest>>(&mut self, iter: I) {
        self.requests.extend(iter);
    }
}

impl<'a> IntoIterator for &'a RequestLedger {
    type Item = &'a ResourceRequest;
    type IntoIter = std::slice::Iter<'a, ResourceRequest>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.iter()
    }
}

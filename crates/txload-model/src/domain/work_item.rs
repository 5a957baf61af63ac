/// Payload of one transaction: a fresh key and a fresh document body.
///
/// Nothing is shared between items; a new one is generated for every iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub key: String,
    pub body: String,
}

impl WorkItem {
    pub fn new(key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
        }
    }
}

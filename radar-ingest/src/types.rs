use serde::{Deserialize, Serialize};

/// One message as read from a device inbox (or an exported copy of it)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub id: String,
    /// Sender address, e.g. `VM-HDFCBK` or a phone number
    pub address: String,
    pub body: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl SmsMessage {
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        body: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            body: body.into(),
            timestamp,
        }
    }
}

/// Fields a bank template pulls out of its captures.
///
/// Type and bank are fixed by the template itself, so they are not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields {
    pub amount: f64,
    pub date: String,
    pub description: String,
    pub balance: Option<f64>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditKind;
use crate::error::HotlineError;

/// Text codec for columns persisted as opaque serialized text. The stored
/// format is entirely owned by the implementing type; a value that
/// `from_column` cannot parse surfaces as [`HotlineError::MalformedColumn`].
pub trait ColumnText: Sized {
    fn to_column(&self) -> String;
    fn from_column(raw: &str) -> Result<Self, HotlineError>;
}

/// Telephony capabilities of a provisioned number, stored in
/// `numbers.features` as a comma-joined token list (e.g. `"voice,sms"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFeatures {
    pub voice: bool,
    pub sms: bool,
}

impl ColumnText for NumberFeatures {
    fn to_column(&self) -> String {
        let mut tokens = Vec::new();
        if self.voice {
            tokens.push("voice");
        }
        if self.sms {
            tokens.push("sms");
        }
        tokens.join(",")
    }

    fn from_column(raw: &str) -> Result<Self, HotlineError> {
        let mut features = NumberFeatures::default();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "voice" => features.voice = true,
                "sms" => features.sms = true,
                other => {
                    return Err(HotlineError::MalformedColumn {
                        column: "features",
                        reason: format!("unknown feature token `{other}`"),
                    });
                }
            }
        }
        Ok(features)
    }
}

/// A provisioned phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Number {
    pub id: i64,
    pub number: String,
    pub country: String,
    pub features: NumberFeatures,
}

/// A hotline tenant. `primary_number` duplicates the text of the number row
/// referenced by `primary_number_id` for fast inbound lookup; the storage
/// layer writes both in one transaction so they cannot diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotline {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub primary_number: Option<String>,
    pub primary_number_id: Option<i64>,
    pub country: String,
    pub voice_greeting: Option<String>,
}

/// A number enrolled in a hotline's calls, without edit rights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotlineMember {
    pub id: i64,
    pub hotline_id: i64,
    pub name: String,
    pub number: String,
    pub verified: bool,
}

/// A person with edit rights over hotline configuration, not necessarily a
/// call participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotlineAdmin {
    pub id: i64,
    pub hotline_id: i64,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: String,
}

/// An immutable audit event. `metadata` stays opaque in the row; callers that
/// know the payload type decode it through [`AuditEntry::metadata_as`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: AuditKind,
    pub description: Option<String>,
    pub hotline_id: Option<i64>,
    pub user: Option<String>,
    pub metadata: Option<String>,
    pub reporter_number: Option<String>,
}

impl AuditEntry {
    pub fn metadata_as<M: ColumnText>(&self) -> Result<Option<M>, HotlineError> {
        self.metadata
            .as_deref()
            .map(M::from_column)
            .transpose()
    }
}

/// A number barred from one hotline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedNumber {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub hotline_id: i64,
    pub number: String,
    pub blocked_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHotline {
    pub name: String,
    pub slug: String,
    pub country: Option<String>,
    pub voice_greeting: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAdmin {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: String,
}

/// Audit insert payload. A `None` timestamp defaults to the insert instant.
#[derive(Debug, Clone, Default)]
pub struct NewAuditEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub hotline_id: Option<i64>,
    pub user: Option<String>,
    pub metadata: Option<String>,
    pub reporter_number: Option<String>,
}

//! Audit log kinds and the write helper used by the management handlers.

use serde::{Deserialize, Serialize};

use crate::db::models::NewAuditEntry;
use crate::db::sqlite::HotlineStorage;
use crate::error::HotlineError;

/// Integer-backed event kind stored in `audit_log.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i64)]
pub enum AuditKind {
    HotlineCreated = 1,
    HotlineModified = 2,
    NumberAssigned = 3,
    MemberAdded = 4,
    MemberVerified = 5,
    MemberRemoved = 6,
    NumberBlocked = 7,
    NumberUnblocked = 8,
    NumberReleased = 9,
}

impl AuditKind {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for AuditKind {
    type Error = HotlineError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(AuditKind::HotlineCreated),
            2 => Ok(AuditKind::HotlineModified),
            3 => Ok(AuditKind::NumberAssigned),
            4 => Ok(AuditKind::MemberAdded),
            5 => Ok(AuditKind::MemberVerified),
            6 => Ok(AuditKind::MemberRemoved),
            7 => Ok(AuditKind::NumberBlocked),
            8 => Ok(AuditKind::NumberUnblocked),
            9 => Ok(AuditKind::NumberReleased),
            other => Err(HotlineError::MalformedColumn {
                column: "kind",
                reason: format!("unknown audit kind {other}"),
            }),
        }
    }
}

/// Record one audit event against a hotline. Thin wrapper over
/// [`HotlineStorage::record_audit`] for the common handler call shape.
pub async fn log(
    db: &HotlineStorage,
    kind: AuditKind,
    hotline_id: Option<i64>,
    user: Option<&str>,
    description: impl Into<String>,
) -> Result<(), HotlineError> {
    db.record_audit(
        kind,
        NewAuditEntry {
            description: Some(description.into()),
            hotline_id,
            user: user.map(str::to_owned),
            ..NewAuditEntry::default()
        },
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_survives_integer_round_trip() {
        for kind in [
            AuditKind::HotlineCreated,
            AuditKind::HotlineModified,
            AuditKind::NumberAssigned,
            AuditKind::MemberAdded,
            AuditKind::MemberVerified,
            AuditKind::MemberRemoved,
            AuditKind::NumberBlocked,
            AuditKind::NumberUnblocked,
            AuditKind::NumberReleased,
        ] {
            assert_eq!(AuditKind::try_from(kind.as_i64()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(AuditKind::try_from(0).is_err());
        assert!(AuditKind::try_from(10).is_err());
        assert!(AuditKind::try_from(99).is_err());
    }
}

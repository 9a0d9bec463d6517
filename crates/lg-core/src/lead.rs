//! # Lead Rows
//!
//! The row shape served by the leads table: the stored lead record plus the
//! display fields joined in from visitors and companies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a literal does not name a variant of one of the lead enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! literal_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $literal:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $literal),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($literal => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

literal_enum! {
    /// Lifecycle of a lead. Chart buckets count rows per status.
    LeadStatus, "lead status" {
        Open => "open",
        Claimed => "claimed",
        Locked => "locked",
        Closed => "closed",
    }
}

literal_enum! {
    CallStatus, "call status" {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Finished => "finished",
    }
}

literal_enum! {
    Outcome, "outcome" {
        SalesRouted => "sales_routed",
        Scheduled => "scheduled",
        Closed => "closed",
        Missed => "missed",
    }
}

/// One row of the leads table.
///
/// `last_activity` anchors every temporal operation (chart buckets, cursor
/// pagination). Rows that arrive without it are stamped with the current time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub company_id: String,
    pub visitor_id: String,
    pub status: LeadStatus,
    #[serde(default)]
    pub claimed_by: Option<String>,
    #[serde(default, with = "crate::time::option")]
    pub claim_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub slack_id: Option<String>,
    #[serde(default)]
    pub call_id: Option<String>,
    pub call_status: CallStatus,
    #[serde(default)]
    pub notes: Option<String>,

    // Display fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default = "crate::time::now_millis", with = "crate::time")]
    pub last_activity: DateTime<Utc>,
    /// Minutes until the lead was first answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u32>,
    /// Minutes spent on the call, only set once the call finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl Lead {
    /// Minimal open lead, handy for fixtures and sources that fill in the rest.
    pub fn new(id: impl Into<String>, last_activity: DateTime<Utc>) -> Self {
        let id = id.into();
        Self {
            company_id: format!("company-{id}"),
            visitor_id: format!("visitor-{id}"),
            id,
            status: LeadStatus::Open,
            claimed_by: None,
            claim_at: None,
            slack_id: None,
            call_id: None,
            call_status: CallStatus::NotStarted,
            notes: None,
            visitor_name: None,
            company_name: None,
            last_activity,
            response_time: None,
            call_duration: None,
            outcome: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_round_trip() {
        for status in LeadStatus::ALL {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), *status);
        }
        for status in CallStatus::ALL {
            assert_eq!(status.as_str().parse::<CallStatus>().unwrap(), *status);
        }
        for outcome in Outcome::ALL {
            assert_eq!(outcome.as_str().parse::<Outcome>().unwrap(), *outcome);
        }
    }

    #[test]
    fn test_unknown_literal_is_rejected() {
        let err = "pending".parse::<LeadStatus>().unwrap_err();
        assert_eq!(err.kind, "lead status");
        assert_eq!(err.to_string(), "unknown lead status `pending`");
    }

    #[test]
    fn test_row_uses_camel_case_and_iso_dates() {
        let mut lead = Lead::new("lead-001", crate::time::from_millis(0).unwrap());
        lead.response_time = Some(30);
        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["companyId"], "company-lead-001");
        assert_eq!(json["lastActivity"], "1970-01-01T00:00:00.000Z");
        assert_eq!(json["responseTime"], 30);
        assert_eq!(json["claimedBy"], serde_json::Value::Null);
        assert_eq!(json["callStatus"], "not_started");
        assert!(json.get("outcome").is_none());
    }

    #[test]
    fn test_missing_last_activity_defaults_to_now() {
        let before = crate::time::now_millis();
        let lead: Lead = serde_json::from_str(
            r#"{"id":"a","companyId":"c","visitorId":"v","status":"open","callStatus":"finished"}"#,
        )
        .unwrap();
        assert!(lead.last_activity >= before);
        assert_eq!(lead.claim_at, None);
    }

    #[test]
    fn test_dates_accept_epoch_millis() {
        let lead: Lead = serde_json::from_str(
            r#"{"id":"a","companyId":"c","visitorId":"v","status":"claimed","callStatus":"in_progress",
                "claimAt":1000,"lastActivity":"2024-05-01T10:00:00.250Z"}"#,
        )
        .unwrap();
        assert_eq!(lead.claim_at.unwrap().timestamp_millis(), 1000);
        assert_eq!(lead.last_activity.timestamp_millis(), 1_714_557_600_250);
    }
}

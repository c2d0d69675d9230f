//! Decoding of inbound push messages.
//!
//! Every push message is a JSON object with a string `type` and a kind-specific
//! body. Known kinds decode to typed variants; anything else is kept as
//! [`InboundMessage::Unrecognized`] so a newer authority never breaks the
//! client.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{OpportunityId, OpportunityRecord, ScanReport, StatusFields};
use crate::error::DecodeError;

pub const NEW_OPPORTUNITY: &str = "new_opportunity";
pub const OPPORTUNITY_EXPIRED: &str = "opportunity_expired";
pub const SCAN_COMPLETE: &str = "scan_complete";
pub const STATUS_UPDATE: &str = "status_update";

/// A decoded push message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// A record was detected or re-detected.
    NewOpportunity(OpportunityRecord),
    /// A record is no longer valid.
    OpportunityExpired(OpportunityId),
    /// A scan finished.
    ScanComplete(ScanReport),
    /// Scanner status changed.
    StatusUpdate(StatusFields),
    /// A kind this client does not handle.
    Unrecognized { kind: String, raw: Value },
}

impl InboundMessage {
    /// Decode one raw message body.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is not JSON, has no string
    /// `type`, or a known kind carries a malformed body.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: Value = serde_json::from_slice(bytes).map_err(DecodeError::Json)?;
        Self::from_value(raw)
    }

    /// Decode an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`InboundMessage::decode`].
    pub fn from_value(raw: Value) -> Result<Self, DecodeError> {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingKind)?;

        match kind {
            NEW_OPPORTUNITY => {
                let body: DataBody<OpportunityRecord> = body(NEW_OPPORTUNITY, raw)?;
                Ok(Self::NewOpportunity(body.data))
            }
            OPPORTUNITY_EXPIRED => {
                let body: ExpiredBody = body(OPPORTUNITY_EXPIRED, raw)?;
                Ok(Self::OpportunityExpired(body.opportunity_id))
            }
            SCAN_COMPLETE => {
                let body: DataBody<ScanReport> = body(SCAN_COMPLETE, raw)?;
                Ok(Self::ScanComplete(body.data))
            }
            STATUS_UPDATE => {
                let body: DataBody<StatusFields> = body(STATUS_UPDATE, raw)?;
                Ok(Self::StatusUpdate(body.data))
            }
            other => Ok(Self::Unrecognized {
                kind: other.to_string(),
                raw,
            }),
        }
    }

    /// Wire name of the message kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::NewOpportunity(_) => NEW_OPPORTUNITY,
            Self::OpportunityExpired(_) => OPPORTUNITY_EXPIRED,
            Self::ScanComplete(_) => SCAN_COMPLETE,
            Self::StatusUpdate(_) => STATUS_UPDATE,
            Self::Unrecognized { kind, .. } => kind,
        }
    }
}

#[derive(Deserialize)]
struct DataBody<T> {
    data: T,
}

#[derive(Deserialize)]
struct ExpiredBody {
    opportunity_id: OpportunityId,
}

fn body<T>(kind: &'static str, raw: Value) -> Result<T, DecodeError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(raw).map_err(|source| DecodeError::Body { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decodes_new_opportunity() {
        let raw = br#"{
            "type": "new_opportunity",
            "data": {
                "id": "abc123",
                "arbitrage_type": "BINARY_MISPRICING",
                "market_question": "Will it rain?",
                "event_title": "",
                "markets_involved": ["m1"],
                "total_cost": 0.95,
                "guaranteed_payout": 1.0,
                "gross_profit": 0.05,
                "estimated_fees": 0.01,
                "net_profit": 0.04,
                "net_profit_percent": 4.21,
                "min_liquidity": 2500.0,
                "detected_at": "2024-05-01T10:00:00.123456",
                "trade_legs": [{"side": "BUY", "outcome": "Yes", "price": 0.45}],
                "slug": "will-it-rain"
            }
        }"#;

        let msg = InboundMessage::decode(raw).unwrap();
        let InboundMessage::NewOpportunity(record) = msg else {
            panic!("expected new_opportunity, got {msg:?}");
        };
        assert_eq!(record.id.as_str(), "abc123");
        assert_eq!(record.net_profit_percent, dec!(4.21));
        assert_eq!(record.event_title, None);
        assert_eq!(record.trade_legs.len(), 1);
    }

    #[test]
    fn decodes_expiry() {
        let msg = InboundMessage::decode(br#"{"type":"opportunity_expired","opportunity_id":"x9"}"#)
            .unwrap();
        assert_eq!(msg, InboundMessage::OpportunityExpired("x9".into()));
        assert_eq!(msg.kind(), OPPORTUNITY_EXPIRED);
    }

    #[test]
    fn decodes_scan_complete() {
        let msg = InboundMessage::decode(
            br#"{"type":"scan_complete","data":{"markets":1200,"opportunities":3}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            InboundMessage::ScanComplete(ScanReport {
                markets: 1200,
                opportunities: Some(3)
            })
        );
    }

    #[test]
    fn decodes_status_update() {
        let msg = InboundMessage::decode(
            br#"{"type":"status_update","data":{"is_running":true,"scan_count":4}}"#,
        )
        .unwrap();
        let InboundMessage::StatusUpdate(status) = msg else {
            panic!("expected status_update");
        };
        assert!(status.is_running);
        assert_eq!(status.scan_count, Some(4));
    }

    #[test]
    fn unknown_kind_is_kept() {
        let msg = InboundMessage::decode(br#"{"type":"heartbeat","seq":7}"#).unwrap();
        match msg {
            InboundMessage::Unrecognized { kind, raw } => {
                assert_eq!(kind, "heartbeat");
                assert_eq!(raw["seq"], 7);
            }
            other => panic!("expected unrecognized, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            InboundMessage::decode(b"not json"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            InboundMessage::decode(br#"{"data":{}}"#),
            Err(DecodeError::MissingKind)
        ));
        assert!(matches!(
            InboundMessage::decode(br#"{"type":42}"#),
            Err(DecodeError::MissingKind)
        ));
        assert!(matches!(
            InboundMessage::decode(br#"{"type":"new_opportunity","data":{"id":"a"}}"#),
            Err(DecodeError::Body {
                kind: NEW_OPPORTUNITY,
                ..
            })
        ));
        assert!(matches!(
            InboundMessage::decode(br#"{"type":"opportunity_expired"}"#),
            Err(DecodeError::Body { .. })
        ));
    }
}

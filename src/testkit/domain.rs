//! Builders for records and wire payloads used across tests.
//!
//! Records built here satisfy `net_profit == gross_profit - estimated_fees`
//! so tests never trip over inconsistent amounts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use crate::domain::wire::parse_timestamp;
use crate::domain::{ArbitrageType, OpportunityId, OpportunityRecord, TradeLeg};

const DEFAULT_DETECTED_AT: &str = "2024-05-01T10:00:00";

/// A binary-mispricing record with the given id and net profit percent.
pub fn record(id: &str, net_profit_percent: Decimal) -> OpportunityRecord {
    let total_cost = dec!(0.95);
    let gross_profit = dec!(0.05);
    let estimated_fees = dec!(0.01);
    OpportunityRecord {
        id: OpportunityId::from(id),
        arbitrage_type: ArbitrageType::BinaryMispricing,
        market_question: format!("Question for {id}?"),
        event_title: None,
        markets_involved: vec![format!("market-{id}")],
        total_cost,
        guaranteed_payout: Decimal::ONE,
        gross_profit,
        estimated_fees,
        net_profit: gross_profit - estimated_fees,
        net_profit_percent,
        min_liquidity: Some(dec!(1000)),
        detected_at: parse_timestamp(DEFAULT_DETECTED_AT).unwrap_or_default(),
        trade_legs: vec![
            TradeLeg {
                side: "BUY".into(),
                outcome: "Yes".into(),
                price: dec!(0.45),
                token_id: None,
                suggested_size: None,
            },
            TradeLeg {
                side: "BUY".into(),
                outcome: "No".into(),
                price: dec!(0.50),
                token_id: None,
                suggested_size: None,
            },
        ],
        slug: None,
    }
}

/// A record detected at `detected_at` (naive ISO-8601, read as UTC).
pub fn record_at(id: &str, detected_at: &str) -> OpportunityRecord {
    let mut r = record(id, dec!(1));
    r.detected_at = parse_timestamp(detected_at).unwrap_or_default();
    r
}

/// A record with the given minimum liquidity.
pub fn record_with_liquidity(id: &str, min_liquidity: Option<Decimal>) -> OpportunityRecord {
    let mut r = record(id, dec!(1));
    r.min_liquidity = min_liquidity;
    r
}

/// `new_opportunity` push body.
pub fn new_opportunity_msg(record: &OpportunityRecord) -> Vec<u8> {
    json!({ "type": "new_opportunity", "data": record })
        .to_string()
        .into_bytes()
}

/// `opportunity_expired` push body.
pub fn expired_msg(id: &str) -> Vec<u8> {
    json!({ "type": "opportunity_expired", "opportunity_id": id })
        .to_string()
        .into_bytes()
}

/// `scan_complete` push body.
pub fn scan_complete_msg(markets: u64, opportunities: u64) -> Vec<u8> {
    json!({
        "type": "scan_complete",
        "data": { "markets": markets, "opportunities": opportunities }
    })
    .to_string()
    .into_bytes()
}

/// `status_update` push body.
pub fn status_update_msg(is_running: bool, scan_count: u64) -> Vec<u8> {
    json!({
        "type": "status_update",
        "data": { "is_running": is_running, "scan_count": scan_count }
    })
    .to_string()
    .into_bytes()
}

/// Pull response body: a JSON array of records.
pub fn opportunities_body(records: &[OpportunityRecord]) -> Value {
    json!(records)
}

/// Summary response body.
pub fn summary_body(active: u64, best_percent: Decimal) -> Value {
    json!({
        "active_opportunities": active,
        "total_profit_potential": "0.5",
        "best_opportunity_percent": best_percent,
        "markets_scanned": 1200
    })
}

/// Status response body.
pub fn status_body(is_running: bool) -> Value {
    json!({
        "is_running": is_running,
        "last_scan_at": DEFAULT_DETECTED_AT,
        "scan_count": 3,
        "markets_scanned": 1200,
        "active_opportunities_count": 2
    })
}

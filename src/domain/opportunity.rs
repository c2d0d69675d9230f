//! Opportunity records as published by the authority.
//!
//! A record is the unit the store keeps and the presenter draws. It is
//! received whole on every sighting: the client never recomputes derived
//! amounts (`net_profit`, `net_profit_percent`) and never merges fields from
//! two sightings of the same id.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OpportunityId;
use super::wire;

/// Kind of arbitrage the authority detected.
///
/// The set is open on the wire: kinds added by a newer authority decode as
/// [`ArbitrageType::Unrecognized`] and keep their raw value so they can be
/// displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArbitrageType {
    /// YES + NO priced below the payout on a single binary market.
    BinaryMispricing,
    /// All outcomes of a multi-outcome event priced below the payout.
    DutchBookUnder,
    /// Prices inconsistent across related markets.
    MultiMarketInconsistency,
    /// A kind this client does not know about.
    Unrecognized(String),
}

impl ArbitrageType {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BinaryMispricing => "BINARY_MISPRICING",
            Self::DutchBookUnder => "DUTCH_BOOK_UNDER",
            Self::MultiMarketInconsistency => "MULTI_MARKET_INCONSISTENCY",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Short human label; unrecognized kinds label as their raw value.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::BinaryMispricing => "Binary",
            Self::DutchBookUnder => "Dutch Book",
            Self::MultiMarketInconsistency => "Multi-Market",
            Self::Unrecognized(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for ArbitrageType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "BINARY_MISPRICING" => Self::BinaryMispricing,
            "DUTCH_BOOK_UNDER" => Self::DutchBookUnder,
            "MULTI_MARKET_INCONSISTENCY" => Self::MultiMarketInconsistency,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<&str> for ArbitrageType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ArbitrageType> for String {
    fn from(kind: ArbitrageType) -> Self {
        match kind {
            ArbitrageType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ArbitrageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One order the trade plan calls for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLeg {
    /// BUY or SELL, kept verbatim.
    #[serde(default = "default_side")]
    pub side: String,
    /// Outcome name, e.g. "Yes".
    pub outcome: String,
    /// Limit price for this leg.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_size: Option<Decimal>,
}

fn default_side() -> String {
    "BUY".to_string()
}

fn default_payout() -> Decimal {
    Decimal::ONE
}

/// A detected arbitrage opportunity.
///
/// Invariant assumed of incoming data and never checked:
/// `net_profit == gross_profit - estimated_fees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    pub id: OpportunityId,
    pub arbitrage_type: ArbitrageType,
    #[serde(default)]
    pub market_question: String,
    #[serde(default, deserialize_with = "wire::non_empty_string")]
    pub event_title: Option<String>,
    #[serde(default)]
    pub markets_involved: Vec<String>,
    pub total_cost: Decimal,
    #[serde(default = "default_payout")]
    pub guaranteed_payout: Decimal,
    pub gross_profit: Decimal,
    pub estimated_fees: Decimal,
    pub net_profit: Decimal,
    /// Supplied by the authority; not derived, so a zero cost never divides.
    pub net_profit_percent: Decimal,
    #[serde(default)]
    pub min_liquidity: Option<Decimal>,
    /// Not monotonic across records.
    #[serde(deserialize_with = "wire::timestamp")]
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub trade_legs: Vec<TradeLeg>,
    /// External link key; empty on the wire means none.
    #[serde(default, deserialize_with = "wire::non_empty_string")]
    pub slug: Option<String>,
}

impl OpportunityRecord {
    /// Liquidity used for ordering; missing counts as zero.
    #[must_use]
    pub fn liquidity_or_zero(&self) -> Decimal {
        self.min_liquidity.unwrap_or(Decimal::ZERO)
    }
}

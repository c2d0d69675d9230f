//! View parameters: which records are shown and in what order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::opportunity::OpportunityRecord;

/// Ordering applied to the filtered view.
///
/// Every key sorts descending (best first); ties fall back to ascending id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Net profit percent.
    #[default]
    Profit,
    /// Absolute net profit.
    NetProfit,
    /// Minimum liquidity across legs; missing counts as zero.
    Liquidity,
    /// Detection time, newest first.
    Recent,
}

impl SortKey {
    /// Name in the authority's `sort` query vocabulary.
    ///
    /// The authority has no absolute-profit ordering, so [`SortKey::NetProfit`]
    /// asks for `profit`; the local view re-sorts anyway.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Profit | Self::NetProfit => "profit",
            Self::Liquidity => "liquidity",
            Self::Recent => "recent",
        }
    }

    /// Compare two records for display order.
    #[must_use]
    pub fn compare(self, a: &OpportunityRecord, b: &OpportunityRecord) -> Ordering {
        let primary = match self {
            Self::Profit => b.net_profit_percent.cmp(&a.net_profit_percent),
            Self::NetProfit => b.net_profit.cmp(&a.net_profit),
            Self::Liquidity => b.liquidity_or_zero().cmp(&a.liquidity_or_zero()),
            Self::Recent => b.detected_at.cmp(&a.detected_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Profit => "profit",
            Self::NetProfit => "net_profit",
            Self::Liquidity => "liquidity",
            Self::Recent => "recent",
        };
        f.write_str(name)
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "profit" | "percent" => Ok(Self::Profit),
            "net_profit" => Ok(Self::NetProfit),
            "liquidity" => Ok(Self::Liquidity),
            "recent" => Ok(Self::Recent),
            _ => Err(DomainError::UnknownSortKey {
                value: s.to_string(),
            }),
        }
    }
}

/// Active view parameters: filter floor and sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewParams {
    min_profit_threshold: Decimal,
    sort_key: SortKey,
}

impl ViewParams {
    /// Create view parameters, rejecting a negative threshold.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NegativeThreshold`] when `min_profit_threshold < 0`.
    pub fn try_new(min_profit_threshold: Decimal, sort_key: SortKey) -> Result<Self, DomainError> {
        if min_profit_threshold < Decimal::ZERO {
            return Err(DomainError::NegativeThreshold {
                value: min_profit_threshold,
            });
        }
        Ok(Self {
            min_profit_threshold,
            sort_key,
        })
    }

    #[must_use]
    pub const fn min_profit_threshold(&self) -> Decimal {
        self.min_profit_threshold
    }

    #[must_use]
    pub const fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// True when the record's net profit percent is at or above the floor.
    #[must_use]
    pub fn admits(&self, record: &OpportunityRecord) -> bool {
        record.net_profit_percent >= self.min_profit_threshold
    }
}

/// An ordered, filtered snapshot of the store.
///
/// Immutable once produced: later store mutations build a new view and never
/// reach into one already handed out. Cloning shares the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityView {
    params: ViewParams,
    records: Arc<[OpportunityRecord]>,
}

impl OpportunityView {
    /// Wrap already filtered and sorted records.
    #[must_use]
    pub fn new(params: ViewParams, records: Vec<OpportunityRecord>) -> Self {
        Self {
            params,
            records: records.into(),
        }
    }

    #[must_use]
    pub const fn params(&self) -> ViewParams {
        self.params
    }

    #[must_use]
    pub fn records(&self) -> &[OpportunityRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OpportunityRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id.as_str() == id)
    }
}

impl<'a> IntoIterator for &'a OpportunityView {
    type Item = &'a OpportunityRecord;
    type IntoIter = std::slice::Iter<'a, OpportunityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_sort_keys_leniently() {
        assert_eq!("profit".parse::<SortKey>().unwrap(), SortKey::Profit);
        assert_eq!("Net-Profit".parse::<SortKey>().unwrap(), SortKey::NetProfit);
        assert_eq!(" recent ".parse::<SortKey>().unwrap(), SortKey::Recent);
        assert!(matches!(
            "volume".parse::<SortKey>(),
            Err(DomainError::UnknownSortKey { .. })
        ));
    }

    #[test]
    fn net_profit_queries_as_profit() {
        assert_eq!(SortKey::NetProfit.as_query(), "profit");
        assert_eq!(SortKey::Liquidity.as_query(), "liquidity");
    }

    #[test]
    fn rejects_negative_threshold() {
        assert!(ViewParams::try_new(dec!(-0.1), SortKey::Profit).is_err());
        let params = ViewParams::try_new(dec!(0), SortKey::Recent).unwrap();
        assert_eq!(params.sort_key(), SortKey::Recent);
    }
}

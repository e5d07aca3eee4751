//! In-place ordering of the open/closed trade tables.
//!
//! Rows are rendered server-side and tagged with machine-readable attributes;
//! sorting only moves the existing row nodes.

use std::cmp::Ordering;

use view_core::{Page, ViewResult};

pub mod pills;
pub mod stats;

pub use pills::{parse_pill_id, pill_id, SortBoard, SortPills};
pub use stats::{format_currency, ClosedTrade, ClosedTradeStats};

pub const OPEN_TRADES_BODY: &str = "open-trades-body";
pub const CLOSED_TRADES_BODY: &str = "closed-trades-body";
pub const OPEN_TIME_ATTR: &str = "data-open-time";
pub const CLOSE_TIME_ATTR: &str = "data-close-time";
pub const PNL_ATTR: &str = "data-pnl";
pub const SYMBOL_ATTR: &str = "data-symbol";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeTable {
    Open,
    Closed,
}

impl TradeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeTable::Open => "open",
            TradeTable::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TradeTable::Open),
            "closed" => Some(TradeTable::Closed),
            _ => None,
        }
    }

    pub fn container_id(&self) -> &'static str {
        match self {
            TradeTable::Open => OPEN_TRADES_BODY,
            TradeTable::Closed => CLOSED_TRADES_BODY,
        }
    }

    /// Open trades sort on their open time, closed trades on their close time.
    pub fn time_attribute(&self) -> &'static str {
        match self {
            TradeTable::Open => OPEN_TIME_ATTR,
            TradeTable::Closed => CLOSE_TIME_ATTR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Time,
    Pnl,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Time => "time",
            SortKey::Pnl => "pnl",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "time" => Some(SortKey::Time),
            "pnl" => Some(SortKey::Pnl),
            _ => None,
        }
    }

    /// Pill label without a direction glyph.
    pub fn base_label(&self) -> &'static str {
        match self {
            SortKey::Time => "Time",
            SortKey::Pnl => "PnL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            SortDirection::Asc => "\u{25B2}",
            SortDirection::Desc => "\u{25BC}",
        }
    }

    fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Profit/loss attribute value; missing or unparsable counts as zero.
pub fn parse_pnl(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
        .unwrap_or(0.0)
}

/// Permutation putting `keys` in `direction` order under `cmp`.
///
/// Stable: rows comparing equal keep their current relative order.
pub fn sort_order<T, F>(keys: &[T], direction: SortDirection, cmp: F) -> Vec<usize>
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| direction.apply(cmp(&keys[a], &keys[b])));
    order
}

/// Reorder the rows of `table` in place.
///
/// Time compares ISO-8601 UTC strings lexicographically, a missing timestamp
/// being the empty string. PnL compares numerically.
pub fn sort<P: Page + ?Sized>(page: &mut P, table: TradeTable, spec: SortSpec) -> ViewResult<()> {
    let container = table.container_id();
    let order = match spec.key {
        SortKey::Time => {
            let times: Vec<String> = page
                .row_attributes(container, table.time_attribute())?
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect();
            sort_order(&times, spec.direction, |a, b| a.cmp(b))
        }
        SortKey::Pnl => {
            let pnls: Vec<f64> = page
                .row_attributes(container, PNL_ATTR)?
                .iter()
                .map(|raw| parse_pnl(raw.as_deref()))
                .collect();
            sort_order(&pnls, spec.direction, |a, b| a.total_cmp(b))
        }
    };
    page.reorder_rows(container, &order)?;
    tracing::debug!(
        table = table.as_str(),
        key = spec.key.as_str(),
        rows = order.len(),
        "trade table sorted"
    );
    Ok(())
}

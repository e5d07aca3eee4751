use std::collections::HashMap;

use view_core::{Page, ViewResult};

use crate::{parse_pnl, CLOSED_TRADES_BODY, PNL_ATTR, SYMBOL_ATTR};

pub const STAT_TRADES_COUNT: &str = "stat-trades-count";
pub const STAT_WIN_RATE: &str = "stat-win-rate";
pub const STAT_TOTAL_PNL: &str = "stat-total-pnl";
pub const STAT_AVG_PNL: &str = "stat-avg-pnl";
pub const STAT_BIGGEST_WIN: &str = "stat-biggest-win";
pub const STAT_BIGGEST_LOSS: &str = "stat-biggest-loss";
pub const STAT_TOP_SYMBOL: &str = "stat-top-symbol";

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: Option<String>,
    pub realised_pnl: f64,
}

/// Aggregate figures shown in the closed-trades stats row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosedTradeStats {
    pub trades_count: usize,
    pub wins_count: usize,
    pub losses_count: usize,
    pub win_rate_pct: f64,
    pub total_realised_pnl: f64,
    pub avg_realised_pnl: f64,
    pub most_common_symbol: Option<String>,
    pub biggest_win: f64,
    pub biggest_loss: f64,
}

impl ClosedTradeStats {
    pub fn compute(trades: &[ClosedTrade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }
        let count = trades.len();
        let pnls = trades.iter().map(|t| t.realised_pnl);
        let wins_count = pnls.clone().filter(|p| *p > 0.0).count();
        let losses_count = pnls.clone().filter(|p| *p < 0.0).count();
        let total: f64 = pnls.clone().sum();
        let biggest_win = pnls.clone().fold(f64::NEG_INFINITY, f64::max);
        let biggest_loss = pnls.fold(f64::INFINITY, f64::min);

        Self {
            trades_count: count,
            wins_count,
            losses_count,
            win_rate_pct: wins_count as f64 / count as f64 * 100.0,
            total_realised_pnl: total,
            avg_realised_pnl: total / count as f64,
            most_common_symbol: most_common_symbol(trades),
            biggest_win,
            biggest_loss,
        }
    }

    /// Stats over the rows currently rendered in the closed-trades table.
    pub fn from_page<P: Page + ?Sized>(page: &P) -> ViewResult<Self> {
        let pnls = page.row_attributes(CLOSED_TRADES_BODY, PNL_ATTR)?;
        let symbols = page.row_attributes(CLOSED_TRADES_BODY, SYMBOL_ATTR)?;
        let trades: Vec<ClosedTrade> = pnls
            .iter()
            .zip(symbols)
            .map(|(pnl, symbol)| ClosedTrade {
                symbol: symbol.filter(|s| !s.is_empty()),
                realised_pnl: parse_pnl(pnl.as_deref()),
            })
            .collect();
        Ok(Self::compute(&trades))
    }

    /// Fill the stats row; every cell is attempted before reporting a miss.
    pub fn render<P: Page + ?Sized>(&self, page: &mut P, currency: &str) -> ViewResult<()> {
        let cells = [
            (STAT_TRADES_COUNT, self.trades_count.to_string()),
            (STAT_WIN_RATE, format!("{:.1}%", self.win_rate_pct)),
            (STAT_TOTAL_PNL, format_currency(self.total_realised_pnl, currency)),
            (STAT_AVG_PNL, format_currency(self.avg_realised_pnl, currency)),
            (STAT_BIGGEST_WIN, format_currency(self.biggest_win, currency)),
            (STAT_BIGGEST_LOSS, format_currency(self.biggest_loss, currency)),
            (
                STAT_TOP_SYMBOL,
                self.most_common_symbol.clone().unwrap_or_else(|| "-".to_string()),
            ),
        ];
        let mut outcome = Ok(());
        for (id, text) in cells {
            let result = page.set_text(id, &text);
            if outcome.is_ok() {
                outcome = result;
            }
        }
        outcome
    }
}

// Ties go to the symbol seen first.
fn most_common_symbol(trades: &[ClosedTrade]) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, symbol) in trades.iter().filter_map(|t| t.symbol.as_deref()).enumerate() {
        let entry = counts.entry(symbol).or_insert((0, idx));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(symbol, _)| symbol.to_string())
}

/// `$1,234.50` for USD, otherwise the currency code as prefix.
pub fn format_currency(value: f64, code: &str) -> String {
    let symbol = if code == "USD" { "$" } else { code };
    let raw = format!("{value:.2}");
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let Some((int_part, frac_part)) = digits.split_once('.') else {
        return format!("{symbol}{raw}");
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{symbol}{sign}{grouped}.{frac_part}")
}

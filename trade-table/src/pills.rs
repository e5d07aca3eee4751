use view_core::{ids, Page, ViewError, ViewResult};

use crate::{sort, SortDirection, SortKey, SortSpec, TradeTable};

/// Element id of a sort pill, e.g. `closed-sort-pnl`.
pub fn pill_id(table: TradeTable, key: SortKey) -> String {
    format!("{}-sort-{}", table.as_str(), key.as_str())
}

pub fn parse_pill_id(id: &str) -> Option<(TradeTable, SortKey)> {
    let (table, key) = id.split_once("-sort-")?;
    Some((TradeTable::parse(table)?, SortKey::parse(key)?))
}

/// The Time/PnL pill pair of one table: single-select with direction memory
/// on the active pill only.
#[derive(Debug, Clone)]
pub struct SortPills {
    table: TradeTable,
    active: Option<SortSpec>,
}

impl SortPills {
    /// No pill active; rows stay in server-rendered order.
    pub fn new(table: TradeTable) -> Self {
        Self {
            table,
            active: None,
        }
    }

    pub fn table(&self) -> TradeTable {
        self.table
    }

    pub fn active(&self) -> Option<SortSpec> {
        self.active
    }

    /// Clicking the active pill flips its direction; any other pill becomes
    /// active descending.
    pub fn activate(&mut self, key: SortKey) -> SortSpec {
        let direction = match self.active {
            Some(spec) if spec.key == key => spec.direction.flipped(),
            _ => SortDirection::Desc,
        };
        let spec = SortSpec::new(key, direction);
        self.active = Some(spec);
        spec
    }

    pub fn label(&self, key: SortKey) -> String {
        match self.active {
            Some(spec) if spec.key == key => {
                format!("{} {}", key.base_label(), spec.direction.glyph())
            }
            _ => key.base_label().to_string(),
        }
    }

    /// Write both pills' labels and active classes to the page.
    pub fn render<P: Page + ?Sized>(&self, page: &mut P) -> ViewResult<()> {
        let mut outcome = Ok(());
        for key in [SortKey::Time, SortKey::Pnl] {
            let id = pill_id(self.table, key);
            let active = self.active.is_some_and(|spec| spec.key == key);
            let results = [
                page.set_text(&id, &self.label(key)),
                page.set_class(&id, ids::ACTIVE_CLASS, active),
            ];
            for result in results {
                if outcome.is_ok() {
                    outcome = result;
                }
            }
        }
        outcome
    }
}

/// Pill state for both trade tables.
#[derive(Debug, Clone)]
pub struct SortBoard {
    open: SortPills,
    closed: SortPills,
}

impl Default for SortBoard {
    fn default() -> Self {
        Self {
            open: SortPills::new(TradeTable::Open),
            closed: SortPills::new(TradeTable::Closed),
        }
    }
}

impl SortBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pills(&self, table: TradeTable) -> &SortPills {
        match table {
            TradeTable::Open => &self.open,
            TradeTable::Closed => &self.closed,
        }
    }

    fn pills_mut(&mut self, table: TradeTable) -> &mut SortPills {
        match table {
            TradeTable::Open => &mut self.open,
            TradeTable::Closed => &mut self.closed,
        }
    }

    /// Handle a click on the pill with element id `pill`: update pill state
    /// and labels, then sort the table. The rows are sorted even if a pill
    /// label node is missing.
    pub fn handle_pill_activation<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        pill: &str,
    ) -> ViewResult<SortSpec> {
        let (table, key) =
            parse_pill_id(pill).ok_or_else(|| ViewError::UnknownControl(format!("sort pill {pill:?}")))?;
        let pills = self.pills_mut(table);
        let spec = pills.activate(key);
        let labels = pills.render(page);
        sort(page, table, spec)?;
        labels.map(|_| spec)
    }
}

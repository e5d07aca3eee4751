use crate::error::{settle, ViewResult};
use crate::page::{ids, Display, Page};
use crate::state::{PageTab, TradesTab};
use crate::store::{KeyValueStore, ViewStateStore};

/// Keeps the page-level and trades-level tab groups in sync with the view state.
pub struct TabController<'a, P: ?Sized, S> {
    page: &'a mut P,
    store: &'a mut ViewStateStore<S>,
}

impl<'a, P: Page + ?Sized, S: KeyValueStore> TabController<'a, P, S> {
    pub fn new(page: &'a mut P, store: &'a mut ViewStateStore<S>) -> Self {
        Self { page, store }
    }

    /// Activate Overview or Trades and remember the choice.
    ///
    /// State and storage are updated even when the tab nodes are missing; the
    /// first missing node is reported after every toggle has been attempted.
    pub fn activate_page_tab(&mut self, which: PageTab) -> ViewResult<()> {
        let (on_tab, on_panel, off_tab, off_panel) = match which {
            PageTab::Overview => (
                ids::TAB_OVERVIEW,
                ids::PANEL_OVERVIEW,
                ids::TAB_TRADES,
                ids::PANEL_TRADES,
            ),
            PageTab::Trades => (
                ids::TAB_TRADES,
                ids::PANEL_TRADES,
                ids::TAB_OVERVIEW,
                ids::PANEL_OVERVIEW,
            ),
        };
        self.store.view_mut().page_tab = which;
        let dom = settle([
            self.page.set_class(on_tab, ids::ACTIVE_CLASS, true),
            self.page.set_class(on_panel, ids::ACTIVE_CLASS, true),
            self.page.set_class(off_tab, ids::ACTIVE_CLASS, false),
            self.page.set_class(off_panel, ids::ACTIVE_CLASS, false),
        ]);
        if let Err(err) = self.store.selection_mut().set_page_tab(which) {
            tracing::warn!(error = %err, "failed to persist page tab");
        }
        tracing::debug!(tab = which.as_str(), "page tab activated");
        dom
    }

    /// Activate Open or Closed; Closed also reveals the date-range selector
    /// and the aggregate stats row, Open hides them.
    pub fn activate_trades_tab(&mut self, which: TradesTab) -> ViewResult<()> {
        let (on_tab, on_panel, off_tab, off_panel) = match which {
            TradesTab::Open => (
                ids::TRADES_TAB_OPEN,
                ids::TRADES_PANEL_OPEN,
                ids::TRADES_TAB_CLOSED,
                ids::TRADES_PANEL_CLOSED,
            ),
            TradesTab::Closed => (
                ids::TRADES_TAB_CLOSED,
                ids::TRADES_PANEL_CLOSED,
                ids::TRADES_TAB_OPEN,
                ids::TRADES_PANEL_OPEN,
            ),
        };
        let closed_extras = match which {
            TradesTab::Closed => Display::Flex,
            TradesTab::Open => Display::Hidden,
        };
        self.store.view_mut().trades_tab = which;
        let dom = settle([
            self.page.set_class(on_tab, ids::ACTIVE_CLASS, true),
            self.page.set_class(on_panel, ids::ACTIVE_CLASS, true),
            self.page.set_class(off_tab, ids::ACTIVE_CLASS, false),
            self.page.set_class(off_panel, ids::ACTIVE_CLASS, false),
            self.page.set_display(ids::DATE_RANGE_SELECTOR, closed_extras),
            self.page.set_display(ids::CLOSED_STATS_ROW, closed_extras),
        ]);
        tracing::debug!(tab = which.as_str(), "trades tab activated");
        dom
    }
}

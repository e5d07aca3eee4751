use crate::config::DashboardConfig;
use crate::error::{ViewError, ViewResult};
use crate::modal::{ModalController, ModalKind};
use crate::page::{ids, Display, Page};
use crate::state::{PageTab, SelectedAccount, TradesTab, ViewState};
use crate::store::{KeyValueStore, PersistentSelectionStore, ViewStateStore};
use crate::tabs::TabController;
use crate::url::{strip_params, PageLocation, QueryStringEditor};

// ---------- URL and storage derivation ---------------------------------------

pub const RANGE_PARAM: &str = "range";
pub const TRADES_FRAGMENT: &str = "trades";
pub const OPEN_COPY_MODAL_PARAM: &str = "open_copy_modal";
pub const OPEN_STOP_MODAL_PARAM: &str = "open_stop_modal";
pub const STOP_STRATEGY_ID_PARAM: &str = "stop_strategy_id";

/// Initial tabs from the URL and durable storage.
///
/// A `#trades` fragment wins over the stored page tab, which wins over
/// Overview. A `range` parameter (any value) selects the Closed trades tab.
pub fn derive_initial_view<S: KeyValueStore>(
    location: &PageLocation,
    selection: &PersistentSelectionStore<S>,
) -> ViewState {
    let page_tab = if location.fragment() == Some(TRADES_FRAGMENT) {
        PageTab::Trades
    } else {
        selection.page_tab().unwrap_or_default()
    };
    let trades_tab = if location.query().contains(RANGE_PARAM) {
        TradesTab::Closed
    } else {
        TradesTab::Open
    };
    ViewState {
        page_tab,
        trades_tab,
    }
}

// ---------- Page load --------------------------------------------------------

/// What the bootstrap applied to the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub view: ViewState,
    pub account: Option<SelectedAccount>,
    pub opened_modal: Option<ModalKind>,
    pub stripped_params: Vec<String>,
    /// Ids of nodes this page does not render.
    pub missing: Vec<String>,
}

impl BootstrapReport {
    fn note(&mut self, result: ViewResult<()>) -> ViewResult<()> {
        match result {
            Err(ViewError::MissingElement { id }) => {
                self.missing.push(id);
                Ok(())
            }
            other => other,
        }
    }
}

/// Derives the initial view from storage and URL and applies it on load.
pub struct DashboardBootstrapper<'a, P: ?Sized, S, E: ?Sized> {
    page: &'a mut P,
    store: &'a mut ViewStateStore<S>,
    editor: &'a mut E,
}

impl<'a, P, S, E> DashboardBootstrapper<'a, P, S, E>
where
    P: Page + ?Sized,
    S: KeyValueStore,
    E: QueryStringEditor + ?Sized,
{
    pub fn new(page: &'a mut P, store: &'a mut ViewStateStore<S>, editor: &'a mut E) -> Self {
        Self {
            page,
            store,
            editor,
        }
    }

    /// Apply tabs, account visibility and one-shot modal triggers, then strip
    /// the consumed triggers from the URL so a reload does not repeat them.
    pub fn run(&mut self) -> ViewResult<BootstrapReport> {
        let location = self.editor.location()?;
        let view = derive_initial_view(&location, self.store.selection());
        let mut report = BootstrapReport {
            view,
            ..BootstrapReport::default()
        };

        {
            let mut tabs = TabController::new(&mut *self.page, &mut *self.store);
            report.note(tabs.activate_page_tab(view.page_tab))?;
            report.note(tabs.activate_trades_tab(view.trades_tab))?;
        }

        let account = self.store.selection().selected_account();
        report.note(show_copy_affordance(&mut *self.page, account.is_some()))?;
        report.account = account;

        let query = location.query();
        let mut consumed: Vec<&str> = Vec::new();
        {
            let mut modals = ModalController::new(&mut *self.page, &mut *self.store);
            report.note(modals.refresh_trade_size_label())?;
            if query.get(OPEN_COPY_MODAL_PARAM) == Some("1") {
                report.note(modals.open(ModalKind::Copy))?;
                consumed.push(OPEN_COPY_MODAL_PARAM);
            }
            if query.get(OPEN_STOP_MODAL_PARAM) == Some("1") {
                report.note(modals.open(ModalKind::Stop))?;
                consumed.extend([OPEN_STOP_MODAL_PARAM, STOP_STRATEGY_ID_PARAM]);
            }
        }
        report.opened_modal = self.store.open_modal();

        if !consumed.is_empty() && strip_params(&mut *self.editor, consumed.iter().copied())? {
            report.stripped_params = consumed
                .iter()
                .filter(|name| query.contains(name))
                .map(|name| name.to_string())
                .collect();
        }

        tracing::debug!(
            page_tab = view.page_tab.as_str(),
            trades_tab = view.trades_tab.as_str(),
            missing = report.missing.len(),
            "dashboard bootstrapped"
        );
        Ok(report)
    }
}

// ---------- Deferred and event-driven updates --------------------------------

/// Remove flash-notice parameters once they have been displayed.
pub fn scrub_flash_params<E: QueryStringEditor + ?Sized>(
    editor: &mut E,
    config: &DashboardConfig,
) -> ViewResult<bool> {
    strip_params(editor, &config.flash_params)
}

/// Persist the chosen source account and reveal the copy affordance.
pub fn select_account<P: Page + ?Sized, S: KeyValueStore>(
    page: &mut P,
    store: &mut ViewStateStore<S>,
    account: &SelectedAccount,
) -> ViewResult<()> {
    store.selection_mut().set_selected_account(account)?;
    tracing::debug!(account = %account.account_id, "account selected");
    show_copy_affordance(page, true)
}

/// Forget the selected account and hide the copy affordance.
pub fn clear_account<P: Page + ?Sized, S: KeyValueStore>(
    page: &mut P,
    store: &mut ViewStateStore<S>,
) -> ViewResult<()> {
    store.selection_mut().clear_selected_account()?;
    show_copy_affordance(page, false)
}

fn show_copy_affordance<P: Page + ?Sized>(page: &mut P, visible: bool) -> ViewResult<()> {
    let display = if visible { Display::Block } else { Display::Hidden };
    page.set_display(ids::COPY_AFFORDANCE, display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SELECTED_ACCOUNT_ID_KEY, SELECTED_PAGE_TAB_KEY};
    use crate::testing::{FakePage, MemoryLocation, MemoryStore};

    fn store_with(pairs: &[(&str, &str)]) -> ViewStateStore<MemoryStore> {
        let backend = MemoryStore::from_pairs(pairs.iter().copied());
        ViewStateStore::new(PersistentSelectionStore::new(backend))
    }

    fn derive(href: &str, pairs: &[(&str, &str)]) -> ViewState {
        let store = store_with(pairs);
        derive_initial_view(&PageLocation::parse(href).unwrap(), store.selection())
    }

    #[test]
    fn stored_trades_tab_without_url_hints() {
        let view = derive("/", &[(SELECTED_PAGE_TAB_KEY, "trades")]);
        assert_eq!(view.page_tab, PageTab::Trades);
        assert_eq!(view.trades_tab, TradesTab::Open);
    }

    #[test]
    fn range_param_selects_closed_regardless_of_storage() {
        let view = derive("/?range=30d", &[(SELECTED_PAGE_TAB_KEY, "overview")]);
        assert_eq!(view.trades_tab, TradesTab::Closed);
        assert_eq!(view.page_tab, PageTab::Overview);
        assert_eq!(derive("/?range=", &[]).trades_tab, TradesTab::Closed);
    }

    #[test]
    fn trades_fragment_overrides_storage() {
        let view = derive("/#trades", &[(SELECTED_PAGE_TAB_KEY, "overview")]);
        assert_eq!(view.page_tab, PageTab::Trades);
    }

    #[test]
    fn defaults_to_overview_and_open() {
        assert_eq!(derive("/#other", &[]), ViewState::default());
    }

    #[test]
    fn run_applies_view_and_consumes_copy_trigger() {
        let mut page = FakePage::dashboard();
        let mut store = store_with(&[(SELECTED_ACCOUNT_ID_KEY, "77")]);
        let mut location = MemoryLocation::new("/?open_copy_modal=1&range=7d#trades");
        let report = DashboardBootstrapper::new(&mut page, &mut store, &mut location)
            .run()
            .unwrap();

        assert_eq!(report.view.page_tab, PageTab::Trades);
        assert_eq!(report.view.trades_tab, TradesTab::Closed);
        assert_eq!(report.opened_modal, Some(ModalKind::Copy));
        assert_eq!(report.stripped_params, vec![OPEN_COPY_MODAL_PARAM.to_string()]);
        assert_eq!(report.account.unwrap().account_id, "77");
        assert!(report.missing.is_empty());

        assert!(page.has_class(ids::TAB_TRADES, ids::ACTIVE_CLASS));
        assert!(page.has_class(ids::TRADES_TAB_CLOSED, ids::ACTIVE_CLASS));
        assert_eq!(page.display(ids::COPY_MODAL), Some(Display::Flex));
        assert_eq!(page.display(ids::COPY_AFFORDANCE), Some(Display::Block));
        assert_eq!(location.current(), "/?range=7d#trades");
        assert_eq!(location.replacements(), 1);
    }

    #[test]
    fn stop_trigger_strips_strategy_id_too() {
        let mut page = FakePage::dashboard();
        let mut store = store_with(&[]);
        let mut location = MemoryLocation::new("/?open_stop_modal=1&stop_strategy_id=12");
        let report = DashboardBootstrapper::new(&mut page, &mut store, &mut location)
            .run()
            .unwrap();
        assert_eq!(report.opened_modal, Some(ModalKind::Stop));
        assert_eq!(location.current(), "/");
        assert_eq!(page.display(ids::COPY_AFFORDANCE), Some(Display::Hidden));
    }

    #[test]
    fn plain_load_touches_no_history() {
        let mut page = FakePage::dashboard();
        let mut store = store_with(&[]);
        let mut location = MemoryLocation::new("/?range=7d");
        let report = DashboardBootstrapper::new(&mut page, &mut store, &mut location)
            .run()
            .unwrap();
        assert_eq!(report.opened_modal, None);
        assert!(report.stripped_params.is_empty());
        assert_eq!(location.replacements(), 0);
        assert_eq!(page.body_overflow(), None);
    }

    #[test]
    fn partially_rendered_page_reports_missing_nodes() {
        let mut page = FakePage::new().with_elements([ids::TAB_OVERVIEW, ids::PANEL_OVERVIEW]);
        let mut store = store_with(&[]);
        let mut location = MemoryLocation::new("/accounts?open_copy_modal=1");
        let report = DashboardBootstrapper::new(&mut page, &mut store, &mut location)
            .run()
            .unwrap();
        assert!(report.missing.contains(&ids::TRADES_TAB_OPEN.to_string()));
        assert!(report.missing.contains(&ids::COPY_MODAL.to_string()));
        assert_eq!(report.opened_modal, None);
        // The trigger is consumed even though this page has no copy modal.
        assert_eq!(location.current(), "/accounts");
    }

    #[test]
    fn flash_params_are_scrubbed_once() {
        let mut location = MemoryLocation::new("/?link_success=1&copy_error=bad&range=7d");
        let cfg = DashboardConfig::default();
        assert!(scrub_flash_params(&mut location, &cfg).unwrap());
        assert_eq!(location.current(), "/?range=7d");
        assert!(!scrub_flash_params(&mut location, &cfg).unwrap());
        assert_eq!(location.replacements(), 1);
    }

    #[test]
    fn account_selection_toggles_affordance() {
        let mut page = FakePage::dashboard();
        let mut store = store_with(&[]);
        select_account(&mut page, &mut store, &SelectedAccount::new("5").with_type("mt4")).unwrap();
        assert_eq!(page.display(ids::COPY_AFFORDANCE), Some(Display::Block));
        assert_eq!(
            store.selection().selected_account(),
            Some(SelectedAccount::new("5").with_type("mt4"))
        );
        clear_account(&mut page, &mut store).unwrap();
        assert_eq!(page.display(ids::COPY_AFFORDANCE), Some(Display::Hidden));
        assert!(store.selection().selected_account().is_none());
    }
}

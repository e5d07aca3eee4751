use trade_table::{ClosedTradeStats, SortBoard, SortSpec};
use view_core::{
    clear_account, scrub_flash_params, select_account, BootstrapReport, BrokerServerLoader,
    CopySettings, DashboardBootstrapper, DashboardConfig, FetchError, KeyValueStore, LoadOutcome,
    ModalController, ModalKind, Page, PageTab, PendingLoad, PersistentSelectionStore,
    QueryStringEditor, SelectedAccount, ServerList, TabController, TradesTab, ViewError, ViewResult,
    ViewStateStore,
};

/// Host config from the raw global value; unreadable config falls back to defaults.
pub fn host_config(raw: Option<&str>) -> DashboardConfig {
    match raw.map(DashboardConfig::from_json) {
        Some(Ok(config)) => config,
        Some(Err(err)) => {
            tracing::warn!(error = %err, "ignoring malformed dashboard config");
            DashboardConfig::default()
        }
        None => DashboardConfig::default(),
    }
}

/// Everything the page scripts keep between events.
pub struct DashboardSession<S> {
    config: DashboardConfig,
    store: ViewStateStore<S>,
    sort_board: SortBoard,
    broker: BrokerServerLoader,
}

impl<S: KeyValueStore> DashboardSession<S> {
    pub fn new(config: DashboardConfig, backend: S) -> Self {
        let selection = PersistentSelectionStore::with_prefix(backend, config.storage_prefix.clone());
        Self {
            config,
            store: ViewStateStore::new(selection),
            sort_board: SortBoard::new(),
            broker: BrokerServerLoader::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &ViewStateStore<S> {
        &self.store
    }

    /// Initial view from storage + URL, then the closed-trades stats row.
    pub fn bootstrap<P, E>(&mut self, page: &mut P, editor: &mut E) -> ViewResult<BootstrapReport>
    where
        P: Page + ?Sized,
        E: QueryStringEditor + ?Sized,
    {
        let mut report = DashboardBootstrapper::new(page, &mut self.store, editor).run()?;
        if let Err(err) = self.refresh_closed_stats(page) {
            match err {
                ViewError::MissingElement { id } => report.missing.push(id),
                other => return Err(other),
            }
        }
        Ok(report)
    }

    pub fn scrub_flash<E: QueryStringEditor + ?Sized>(&self, editor: &mut E) -> ViewResult<bool> {
        scrub_flash_params(editor, &self.config)
    }

    pub fn activate_page_tab<P: Page + ?Sized>(&mut self, page: &mut P, tab: PageTab) -> ViewResult<()> {
        TabController::new(page, &mut self.store).activate_page_tab(tab)
    }

    pub fn activate_trades_tab<P: Page + ?Sized>(&mut self, page: &mut P, tab: TradesTab) -> ViewResult<()> {
        TabController::new(page, &mut self.store).activate_trades_tab(tab)
    }

    pub fn open_modal<P: Page + ?Sized>(&mut self, page: &mut P, modal: ModalKind) -> ViewResult<()> {
        ModalController::new(page, &mut self.store).open(modal)
    }

    pub fn close_modal<P: Page + ?Sized>(&mut self, page: &mut P, modal: ModalKind) -> ViewResult<()> {
        ModalController::new(page, &mut self.store).close(modal)
    }

    pub fn close_all_modals<P: Page + ?Sized>(&mut self, page: &mut P) -> ViewResult<()> {
        ModalController::new(page, &mut self.store).close_all()
    }

    /// A click that landed on a modal's backdrop (its container, not the
    /// dialog inside it) dismisses that modal.
    pub fn backdrop_clicked<P: Page + ?Sized>(&mut self, page: &mut P, container_id: &str) -> ViewResult<()> {
        let modal = ModalKind::from_container_id(container_id)
            .ok_or_else(|| ViewError::UnknownControl(format!("modal container {container_id:?}")))?;
        self.close_modal(page, modal)
    }

    pub fn confirm_unlink<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        account_ref: &str,
        display_label: &str,
    ) -> ViewResult<()> {
        ModalController::new(page, &mut self.store).confirm_unlink(account_ref, display_label)
    }

    /// `settings_json` is the copy-settings object the markup embeds, if any.
    /// A malformed object still counts as supplied, so defaults are applied.
    pub fn open_edit_modal<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        account_ref: &str,
        strategy_ref: &str,
        strategy_name: &str,
        settings_json: Option<&str>,
    ) -> ViewResult<()> {
        let settings = settings_json.map(|raw| {
            serde_json::from_str::<CopySettings>(raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "unreadable copy settings, using defaults");
                CopySettings::default()
            })
        });
        ModalController::new(page, &mut self.store).open_edit_modal(
            account_ref,
            strategy_ref,
            strategy_name,
            settings.as_ref(),
        )
    }

    pub fn open_stop_modal_copying<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        account_ref: &str,
        strategy_ref: &str,
        strategy_name: &str,
    ) -> ViewResult<()> {
        ModalController::new(page, &mut self.store).open_stop_modal_copying(
            account_ref,
            strategy_ref,
            strategy_name,
        )
    }

    pub fn refresh_trade_size_label<P: Page + ?Sized>(&mut self, page: &mut P) -> ViewResult<()> {
        ModalController::new(page, &mut self.store).refresh_trade_size_label()
    }

    pub fn handle_pill_activation<P: Page + ?Sized>(&mut self, page: &mut P, pill: &str) -> ViewResult<SortSpec> {
        self.sort_board.handle_pill_activation(page, pill)
    }

    pub fn begin_broker_change<P: Page + ?Sized>(&mut self, page: &mut P) -> ViewResult<Option<PendingLoad>> {
        self.broker.begin(page)
    }

    pub fn complete_broker_change<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        pending: &PendingLoad,
        result: Result<ServerList, FetchError>,
    ) -> ViewResult<LoadOutcome> {
        self.broker.complete(page, pending, result)
    }

    pub fn select_account<P: Page + ?Sized>(&mut self, page: &mut P, account: &SelectedAccount) -> ViewResult<()> {
        select_account(page, &mut self.store, account)
    }

    pub fn clear_account<P: Page + ?Sized>(&mut self, page: &mut P) -> ViewResult<()> {
        clear_account(page, &mut self.store)
    }

    pub fn refresh_closed_stats<P: Page + ?Sized>(&self, page: &mut P) -> ViewResult<ClosedTradeStats> {
        let stats = ClosedTradeStats::from_page(&*page)?;
        stats.render(page, &self.config.currency)?;
        Ok(stats)
    }
}

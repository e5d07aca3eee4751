//! Browser bindings for the copy-trading dashboard.
//!
//! `session` is plain Rust and runs against the in-memory fakes in tests. The
//! remaining modules bind it to `web_sys` and only build for `wasm32`.

pub mod console;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod location;
#[cfg(target_arch = "wasm32")]
mod storage;

pub use session::{host_config, DashboardSession};

#[cfg(target_arch = "wasm32")]
pub use bindings::*;

#[cfg(target_arch = "wasm32")]
mod bindings {
    use std::cell::RefCell;

    use gloo_timers::future::TimeoutFuture;
    use js_sys::{Reflect, JSON};
    use trade_table::{pill_id, SortKey, TradeTable};
    use view_core::{
        ids, ignore_missing, ModalKind, PageTab, SelectedAccount, ServerDirectory, TradesTab,
        ViewResult,
    };
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;

    use crate::dom::{document, js_error, DomPage};
    use crate::fetch::HttpServerDirectory;
    use crate::location::BrowserLocation;
    use crate::session::{host_config, DashboardSession};
    use crate::storage::WebStorage;

    const CONFIG_GLOBAL: &str = "COPYTRADE_DASHBOARD_CONFIG";

    thread_local! {
        static SESSION: RefCell<Option<DashboardSession<WebStorage>>> = const { RefCell::new(None) };
    }

    /// The config global may be a JSON string or a plain object.
    fn read_global(key: &str) -> Option<String> {
        let value = Reflect::get(&js_sys::global(), &JsValue::from_str(key)).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        if let Some(raw) = value.as_string() {
            return Some(raw);
        }
        JSON::stringify(&value).ok().and_then(|s| s.as_string())
    }

    fn log_failure(action: &str, err: &view_core::ViewError) {
        if err.is_missing() {
            tracing::debug!(action, error = %err, "element not on this page");
        } else {
            tracing::error!(action, error = %err, "dashboard update failed");
        }
    }

    /// Run `f` against the live session and document. Errors are logged, not thrown.
    fn with_session<T>(
        action: &str,
        f: impl FnOnce(&mut DashboardSession<WebStorage>, &mut DomPage) -> ViewResult<T>,
    ) -> Option<T> {
        let mut page = match DomPage::new() {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(action, error = %js_error(err), "no document");
                return None;
            }
        };
        SESSION.with(|cell| {
            let mut slot = cell.borrow_mut();
            let Some(session) = slot.as_mut() else {
                tracing::warn!(action, "dashboard not started");
                return None;
            };
            match f(session, &mut page) {
                Ok(value) => Some(value),
                Err(err) => {
                    log_failure(action, &err);
                    None
                }
            }
        })
    }

    fn on(id: &str, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
        let Ok(doc) = document() else { return };
        let Some(el) = doc.get_element_by_id(id) else {
            return;
        };
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        if let Err(err) = el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            tracing::warn!(id, event, error = %js_error(err), "listener not attached");
        }
        closure.forget();
    }

    fn attach_listeners() -> Result<(), JsValue> {
        on(ids::TAB_OVERVIEW, "click", |_: web_sys::Event| activate_page_tab("overview"));
        on(ids::TAB_TRADES, "click", |_: web_sys::Event| activate_page_tab("trades"));
        on(ids::TRADES_TAB_OPEN, "click", |_: web_sys::Event| activate_trades_tab("open"));
        on(ids::TRADES_TAB_CLOSED, "click", |_: web_sys::Event| activate_trades_tab("closed"));
        on(ids::BROKER_SELECT, "change", |_: web_sys::Event| on_broker_changed());
        on(ids::TRADE_SIZE_TYPE, "change", |_: web_sys::Event| {
            with_session("trade size type", |session, page| {
                ignore_missing(session.refresh_trade_size_label(page))
            });
        });

        for table in [TradeTable::Open, TradeTable::Closed] {
            for key in [SortKey::Time, SortKey::Pnl] {
                let id = pill_id(table, key);
                let pill = id.clone();
                on(&id, "click", move |_: web_sys::Event| handle_sort_pill(&pill));
            }
        }

        for modal in ModalKind::ALL {
            let container = modal.container_id();
            on(container, "click", move |ev: web_sys::Event| {
                // Clicks inside the dialog bubble up with a different target.
                if ev.target().is_some() && ev.target() == ev.current_target() {
                    with_session("backdrop click", |session, page| {
                        session.backdrop_clicked(page, container)
                    });
                }
            });
        }

        let escape = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(|ev: web_sys::KeyboardEvent| {
            if ev.key() == "Escape" {
                with_session("escape", |session, page| session.close_all_modals(page));
            }
        });
        document()?.add_event_listener_with_callback("keydown", escape.as_ref().unchecked_ref())?;
        escape.forget();
        Ok(())
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        crate::console::init(tracing::Level::INFO);

        let config = host_config(read_global(CONFIG_GLOBAL).as_deref());
        let delay = config.flash_scrub_delay_ms;
        let mut session = DashboardSession::new(config, WebStorage::local());
        let mut page = DomPage::new()?;
        let mut location = BrowserLocation::new()?;
        match session.bootstrap(&mut page, &mut location) {
            Ok(report) => tracing::info!(
                page_tab = report.view.page_tab.as_str(),
                trades_tab = report.view.trades_tab.as_str(),
                missing = report.missing.len(),
                "dashboard ready"
            ),
            Err(err) => log_failure("bootstrap", &err),
        }
        SESSION.with(|cell| *cell.borrow_mut() = Some(session));

        attach_listeners()?;

        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            let Ok(mut location) = BrowserLocation::new() else {
                return;
            };
            SESSION.with(|cell| {
                if let Some(session) = cell.borrow().as_ref() {
                    if let Err(err) = session.scrub_flash(&mut location) {
                        log_failure("scrub flash", &err);
                    }
                }
            });
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = activatePageTab)]
    pub fn activate_page_tab(tab: &str) {
        let Some(tab) = PageTab::parse(tab) else {
            tracing::warn!(tab, "unknown page tab");
            return;
        };
        with_session("activate page tab", |session, page| {
            ignore_missing(session.activate_page_tab(page, tab))
        });
    }

    #[wasm_bindgen(js_name = activateTradesTab)]
    pub fn activate_trades_tab(tab: &str) {
        let Some(tab) = TradesTab::parse(tab) else {
            tracing::warn!(tab, "unknown trades tab");
            return;
        };
        with_session("activate trades tab", |session, page| {
            ignore_missing(session.activate_trades_tab(page, tab))
        });
    }

    #[wasm_bindgen(js_name = openModal)]
    pub fn open_modal(modal: &str) {
        with_session("open modal", |session, page| {
            let modal: ModalKind = modal.parse()?;
            ignore_missing(session.open_modal(page, modal))
        });
    }

    #[wasm_bindgen(js_name = closeModal)]
    pub fn close_modal(modal: &str) {
        with_session("close modal", |session, page| {
            let modal: ModalKind = modal.parse()?;
            ignore_missing(session.close_modal(page, modal))
        });
    }

    #[wasm_bindgen(js_name = confirmUnlink)]
    pub fn confirm_unlink(account_ref: &str, display_label: &str) {
        with_session("confirm unlink", |session, page| {
            ignore_missing(session.confirm_unlink(page, account_ref, display_label))
        });
    }

    #[wasm_bindgen(js_name = openEditModal)]
    pub fn open_edit_modal(
        account_ref: &str,
        strategy_ref: &str,
        strategy_name: &str,
        settings_json: Option<String>,
    ) {
        with_session("open edit modal", |session, page| {
            ignore_missing(session.open_edit_modal(
                page,
                account_ref,
                strategy_ref,
                strategy_name,
                settings_json.as_deref(),
            ))
        });
    }

    #[wasm_bindgen(js_name = openStopModalCopying)]
    pub fn open_stop_modal_copying(account_ref: &str, strategy_ref: &str, strategy_name: &str) {
        with_session("open stop modal", |session, page| {
            ignore_missing(session.open_stop_modal_copying(
                page,
                account_ref,
                strategy_ref,
                strategy_name,
            ))
        });
    }

    #[wasm_bindgen(js_name = handleSortPill)]
    pub fn handle_sort_pill(pill: &str) {
        with_session("sort pill", |session, page| {
            session.handle_pill_activation(page, pill).map(|_| ())
        });
    }

    #[wasm_bindgen(js_name = selectAccount)]
    pub fn select_account(account_id: &str, account_type: Option<String>) {
        let mut account = SelectedAccount::new(account_id);
        account.account_type = account_type.filter(|t| !t.is_empty());
        with_session("select account", |session, page| {
            ignore_missing(session.select_account(page, &account))
        });
    }

    #[wasm_bindgen(js_name = clearAccount)]
    pub fn clear_account() {
        with_session("clear account", |session, page| {
            ignore_missing(session.clear_account(page))
        });
    }

    /// Reload the server list for the chosen broker. Only the newest request
    /// is allowed to touch the select.
    #[wasm_bindgen(js_name = onBrokerChanged)]
    pub fn on_broker_changed() {
        let begun = with_session("broker changed", |session, page| {
            let pending = session.begin_broker_change(page)?;
            Ok(pending.map(|p| (p, session.config().clone())))
        });
        let Some(Some((pending, config))) = begun else {
            return;
        };
        spawn_local(async move {
            let result = HttpServerDirectory::new(config)
                .fetch_servers(&pending.broker_code)
                .await;
            if let Some(outcome) = with_session("broker servers", |session, page| {
                session.complete_broker_change(page, &pending, result)
            }) {
                tracing::debug!(broker = %pending.broker_code, ?outcome, "server list settled");
            }
        });
    }
}

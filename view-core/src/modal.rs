use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ignore_missing, settle, ViewError, ViewResult};
use crate::page::{ids, Display, Page};
use crate::store::{KeyValueStore, ViewStateStore};
use crate::url::encoded_path;

pub const EDIT_COPY_TITLE: &str = "Edit Copy Settings";
pub const DEFAULT_TRADE_SIZE_TYPE: &str = "Fixed";
pub const DEFAULT_TRADE_SIZE_VALUE: f64 = 1.0;

/// The dashboard's modal dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Copy,
    Stop,
    Link,
    Unlink,
}

impl ModalKind {
    pub const ALL: [ModalKind; 4] = [
        ModalKind::Copy,
        ModalKind::Stop,
        ModalKind::Link,
        ModalKind::Unlink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModalKind::Copy => "copy",
            ModalKind::Stop => "stop",
            ModalKind::Link => "link",
            ModalKind::Unlink => "unlink",
        }
    }

    pub fn container_id(&self) -> &'static str {
        match self {
            ModalKind::Copy => ids::COPY_MODAL,
            ModalKind::Stop => ids::STOP_MODAL,
            ModalKind::Link => ids::LINK_MODAL,
            ModalKind::Unlink => ids::UNLINK_MODAL,
        }
    }

    pub fn from_container_id(id: &str) -> Option<Self> {
        ModalKind::ALL.into_iter().find(|m| m.container_id() == id)
    }
}

impl FromStr for ModalKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModalKind::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ViewError::UnknownControl(format!("modal {s:?}")))
    }
}

/// Existing copy settings used to pre-fill the edit form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySettings {
    #[serde(default)]
    pub trade_size_type: Option<String>,
    #[serde(default)]
    pub trade_size_value: Option<f64>,
    #[serde(default)]
    pub is_open_existing_trades: Option<bool>,
    #[serde(default)]
    pub is_round_up_to_minimum_size: Option<bool>,
}

/// Unit label for the trade-size input given the trade-size-type selection.
pub fn trade_size_label(trade_size_type: &str) -> &'static str {
    if trade_size_type == DEFAULT_TRADE_SIZE_TYPE {
        "Lot Size"
    } else {
        "Multiplier"
    }
}

/// Opens, closes and pre-fills the modal dialogs. At most one is open.
pub struct ModalController<'a, P: ?Sized, S> {
    page: &'a mut P,
    store: &'a mut ViewStateStore<S>,
}

impl<'a, P: Page + ?Sized, S: KeyValueStore> ModalController<'a, P, S> {
    pub fn new(page: &'a mut P, store: &'a mut ViewStateStore<S>) -> Self {
        Self { page, store }
    }

    /// Show `modal` and lock page scrolling, closing any other open modal first.
    pub fn open(&mut self, modal: ModalKind) -> ViewResult<()> {
        if let Some(current) = self.store.open_modal().filter(|m| *m != modal) {
            if let Err(err) = ignore_missing(self.close(current)) {
                tracing::warn!(
                    modal = current.as_str(),
                    error = %err,
                    "failed to close previous modal"
                );
            }
        }
        self.page.set_display(modal.container_id(), Display::Flex)?;
        self.page.set_body_overflow(Some("hidden"));
        self.store.set_open_modal(Some(modal));
        tracing::debug!(modal = modal.as_str(), "modal opened");
        Ok(())
    }

    /// Hide `modal`. The scroll lock is released (back to no inline override)
    /// only when `modal` was the open one.
    pub fn close(&mut self, modal: ModalKind) -> ViewResult<()> {
        let hidden = self.page.set_display(modal.container_id(), Display::Hidden);
        if self.store.open_modal() == Some(modal) {
            self.page.set_body_overflow(None);
            self.store.set_open_modal(None);
            tracing::debug!(modal = modal.as_str(), "modal closed");
        }
        hidden
    }

    /// Close whichever modal is open, if any.
    pub fn close_all(&mut self) -> ViewResult<()> {
        match self.store.open_modal() {
            Some(current) => self.close(current),
            None => Ok(()),
        }
    }

    /// Bind the unlink form to `account_ref`, label it and open the unlink modal.
    ///
    /// Without the form the modal stays closed, so an old action can never be
    /// submitted. A missing label is reported after the modal opens.
    pub fn confirm_unlink(&mut self, account_ref: &str, display_label: &str) -> ViewResult<()> {
        let action = encoded_path(["accounts", account_ref, "unlink"]);
        self.page.set_attribute(ids::UNLINK_FORM, "action", &action)?;
        let label = self.page.set_text(ids::UNLINK_ACCOUNT_LABEL, display_label);
        self.open(ModalKind::Unlink)?;
        label
    }

    /// Pre-fill the copy modal for editing an existing copy relationship.
    ///
    /// The modal opens even if some form fields are not rendered; the first
    /// missing field is reported afterwards.
    pub fn open_edit_modal(
        &mut self,
        account_ref: &str,
        strategy_ref: &str,
        strategy_name: &str,
        settings: Option<&CopySettings>,
    ) -> ViewResult<()> {
        let mut prefill = vec![
            self.page.set_value(ids::COPY_COPIER_ID, account_ref),
            self.page.set_value(ids::COPY_STRATEGY_ID, strategy_ref),
            self.page.set_value(ids::COPY_STRATEGY_NAME, strategy_name),
            self.page.set_text(ids::COPY_MODAL_TITLE, EDIT_COPY_TITLE),
        ];
        if let Some(settings) = settings {
            let size_type = settings
                .trade_size_type
                .as_deref()
                .unwrap_or(DEFAULT_TRADE_SIZE_TYPE);
            let size_value = settings
                .trade_size_value
                .unwrap_or(DEFAULT_TRADE_SIZE_VALUE);
            prefill.extend([
                self.page.set_value(ids::TRADE_SIZE_TYPE, size_type),
                self.page
                    .set_value(ids::TRADE_SIZE_VALUE, &format_size_value(size_value)),
                self.page.set_checked(
                    ids::OPEN_EXISTING_TRADES,
                    settings.is_open_existing_trades.unwrap_or(false),
                ),
                self.page.set_checked(
                    ids::ROUND_UP_TO_MINIMUM,
                    settings.is_round_up_to_minimum_size.unwrap_or(false),
                ),
            ]);
            prefill.push(self.refresh_trade_size_label());
        }
        self.open(ModalKind::Copy)?;
        settle(prefill)
    }

    /// Pre-fill the stop-copying modal and open it.
    pub fn open_stop_modal_copying(
        &mut self,
        account_ref: &str,
        strategy_ref: &str,
        strategy_name: &str,
    ) -> ViewResult<()> {
        let prefill = settle([
            self.page.set_value(ids::STOP_COPIER_ID, account_ref),
            self.page.set_value(ids::STOP_STRATEGY_ID, strategy_ref),
            self.page.set_value(ids::STOP_STRATEGY_NAME, strategy_name),
            self.page
                .set_text(ids::STOP_MODAL_TITLE, &format!("Stop Copying {strategy_name}")),
        ]);
        self.open(ModalKind::Stop)?;
        prefill
    }

    /// Recompute the trade-size unit label from the current selector value.
    pub fn refresh_trade_size_label(&mut self) -> ViewResult<()> {
        let size_type = self.page.value(ids::TRADE_SIZE_TYPE)?;
        self.page
            .set_text(ids::TRADE_SIZE_LABEL, trade_size_label(&size_type))
    }
}

// Whole numbers keep one decimal so `1` renders as `1.0` in the input.
fn format_size_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PersistentSelectionStore;
    use crate::testing::{FakePage, MemoryStore};

    fn store() -> ViewStateStore<MemoryStore> {
        ViewStateStore::new(PersistentSelectionStore::new(MemoryStore::default()))
    }

    #[test]
    fn open_locks_scroll_and_close_restores_unset() {
        let mut page = FakePage::dashboard();
        let mut store = store();
        let mut modals = ModalController::new(&mut page, &mut store);
        modals.open(ModalKind::Copy).unwrap();
        modals.close(ModalKind::Copy).unwrap();
        assert_eq!(page.display(ids::COPY_MODAL), Some(Display::Hidden));
        assert_eq!(page.body_overflow(), None);
        assert_eq!(page.overflow_writes(), vec![Some("hidden".to_string()), None]);
        assert_eq!(store.open_modal(), None);
    }

    #[test]
    fn opening_second_modal_closes_first() {
        let mut page = FakePage::dashboard();
        let mut store = store();
        let mut modals = ModalController::new(&mut page, &mut store);
        modals.open(ModalKind::Copy).unwrap();
        modals.open(ModalKind::Stop).unwrap();
        assert_eq!(page.display(ids::COPY_MODAL), Some(Display::Hidden));
        assert_eq!(page.display(ids::STOP_MODAL), Some(Display::Flex));
        assert_eq!(page.body_overflow(), Some("hidden"));
        assert_eq!(store.open_modal(), Some(ModalKind::Stop));
    }

    #[test]
    fn closing_a_modal_that_is_not_open_keeps_lock() {
        let mut page = FakePage::dashboard();
        let mut store = store();
        let mut modals = ModalController::new(&mut page, &mut store);
        modals.open(ModalKind::Link).unwrap();
        modals.close(ModalKind::Unlink).unwrap();
        assert_eq!(page.body_overflow(), Some("hidden"));
        assert_eq!(store.open_modal(), Some(ModalKind::Link));

        let mut modals = ModalController::new(&mut page, &mut store);
        modals.close_all().unwrap();
        assert_eq!(page.body_overflow(), None);
        assert_eq!(page.display(ids::LINK_MODAL), Some(Display::Hidden));
    }

    #[test]
    fn confirm_unlink_binds_fresh_action_each_time() {
        let mut page = FakePage::dashboard();
        let mut store = store();
        let mut modals = ModalController::new(&mut page, &mut store);
        modals.confirm_unlink("42", "Acct 42").unwrap();
        assert_eq!(page.attribute(ids::UNLINK_FORM, "action"), Some("/accounts/42/unlink"));
        assert_eq!(page.text(ids::UNLINK_ACCOUNT_LABEL), Some("Acct 42"));
        assert_eq!(page.display(ids::UNLINK_MODAL), Some(Display::Flex));

        let mut modals = ModalController::new(&mut page, &mut store);
        modals.confirm_unlink("a b/7", "Other").unwrap();
        assert_eq!(
            page.attribute(ids::UNLINK_FORM, "action"),
            Some("/accounts/a%20b%2F7/unlink")
        );
        assert_eq!(page.text(ids::UNLINK_ACCOUNT_LABEL), Some("Other"));
    }

    #[test]
    fn confirm_unlink_without_form_is_missing_and_stays_closed() {
        let mut page = FakePage::new().with_elements([ids::UNLINK_MODAL]);
        let mut store = store();
        let err = ModalController::new(&mut page, &mut store)
            .confirm_unlink("1", "x")
            .unwrap_err();
        assert_eq!(err, ViewError::missing(ids::UNLINK_FORM));
        assert_eq!(store.open_modal(), None);
    }

    #[test]
    fn edit_modal_applies_defaults_for_absent_settings_fields() {
        let mut page = FakePage::dashboard();
        page.set_value(ids::TRADE_SIZE_TYPE, "Multiplier").unwrap();
        page.set_checked(ids::OPEN_EXISTING_TRADES, true).unwrap();
        let mut store = store();
        ModalController::new(&mut page, &mut store)
            .open_edit_modal("c1", "s1", "Alpha", Some(&CopySettings::default()))
            .unwrap();
        assert_eq!(page.value_of(ids::COPY_COPIER_ID), Some("c1"));
        assert_eq!(page.value_of(ids::COPY_STRATEGY_ID), Some("s1"));
        assert_eq!(page.value_of(ids::COPY_STRATEGY_NAME), Some("Alpha"));
        assert_eq!(page.text(ids::COPY_MODAL_TITLE), Some(EDIT_COPY_TITLE));
        assert_eq!(page.value_of(ids::TRADE_SIZE_TYPE), Some("Fixed"));
        assert_eq!(page.value_of(ids::TRADE_SIZE_VALUE), Some("1.0"));
        assert_eq!(page.checked(ids::OPEN_EXISTING_TRADES), Some(false));
        assert_eq!(page.checked(ids::ROUND_UP_TO_MINIMUM), Some(false));
        assert_eq!(page.text(ids::TRADE_SIZE_LABEL), Some("Lot Size"));
        assert_eq!(store.open_modal(), Some(ModalKind::Copy));
    }

    #[test]
    fn edit_modal_fills_supplied_settings() {
        let settings: CopySettings = serde_json::from_str(
            r#"{"tradeSizeType":"Multiplier","tradeSizeValue":2.5,"isOpenExistingTrades":true}"#,
        )
        .unwrap();
        let mut page = FakePage::dashboard();
        let mut store = store();
        ModalController::new(&mut page, &mut store)
            .open_edit_modal("c1", "s1", "Alpha", Some(&settings))
            .unwrap();
        assert_eq!(page.value_of(ids::TRADE_SIZE_VALUE), Some("2.5"));
        assert_eq!(page.checked(ids::OPEN_EXISTING_TRADES), Some(true));
        assert_eq!(page.checked(ids::ROUND_UP_TO_MINIMUM), Some(false));
        assert_eq!(page.text(ids::TRADE_SIZE_LABEL), Some("Multiplier"));
    }

    #[test]
    fn edit_modal_without_settings_leaves_size_fields() {
        let mut page = FakePage::dashboard();
        page.set_value(ids::TRADE_SIZE_VALUE, "3").unwrap();
        let mut store = store();
        ModalController::new(&mut page, &mut store)
            .open_edit_modal("c1", "s1", "Alpha", None)
            .unwrap();
        assert_eq!(page.value_of(ids::TRADE_SIZE_VALUE), Some("3"));
        assert_eq!(store.open_modal(), Some(ModalKind::Copy));
    }

    #[test]
    fn stop_modal_title_names_strategy() {
        let mut page = FakePage::dashboard();
        let mut store = store();
        ModalController::new(&mut page, &mut store)
            .open_stop_modal_copying("c9", "s9", "Gold Scalper")
            .unwrap();
        assert_eq!(page.value_of(ids::STOP_COPIER_ID), Some("c9"));
        assert_eq!(page.value_of(ids::STOP_STRATEGY_ID), Some("s9"));
        assert_eq!(page.text(ids::STOP_MODAL_TITLE), Some("Stop Copying Gold Scalper"));
        assert_eq!(page.display(ids::STOP_MODAL), Some(Display::Flex));
    }

    #[test]
    fn edit_modal_opens_when_a_form_field_is_not_rendered() {
        for absent in [ids::TRADE_SIZE_LABEL, ids::COPY_STRATEGY_NAME, ids::ROUND_UP_TO_MINIMUM] {
            let mut page = FakePage::dashboard().without(absent);
            let mut store = store();
            let result = ModalController::new(&mut page, &mut store).open_edit_modal(
                "c1",
                "s1",
                "Alpha",
                Some(&CopySettings::default()),
            );
            assert_eq!(result, Err(ViewError::missing(absent)));
            assert_eq!(store.open_modal(), Some(ModalKind::Copy));
            assert_eq!(page.display(ids::COPY_MODAL), Some(Display::Flex));
            assert_eq!(page.value_of(ids::COPY_COPIER_ID), Some("c1"));
            assert_eq!(page.body_overflow(), Some("hidden"));
        }
    }

    #[test]
    fn edit_modal_without_container_stays_closed() {
        let mut page = FakePage::dashboard().without(ids::COPY_MODAL);
        let mut store = store();
        let result = ModalController::new(&mut page, &mut store)
            .open_edit_modal("c1", "s1", "Alpha", None);
        assert_eq!(result, Err(ViewError::missing(ids::COPY_MODAL)));
        assert_eq!(store.open_modal(), None);
        assert_eq!(page.body_overflow(), None);
    }

    #[test]
    fn stop_modal_opens_without_strategy_name_field() {
        let mut page = FakePage::dashboard().without(ids::STOP_STRATEGY_NAME);
        let mut store = store();
        let result = ModalController::new(&mut page, &mut store)
            .open_stop_modal_copying("c9", "s9", "Gold");
        assert_eq!(result, Err(ViewError::missing(ids::STOP_STRATEGY_NAME)));
        assert_eq!(store.open_modal(), Some(ModalKind::Stop));
        assert_eq!(page.text(ids::STOP_MODAL_TITLE), Some("Stop Copying Gold"));
    }

    #[test]
    fn unlink_opens_without_label_but_binds_action() {
        let mut page = FakePage::dashboard().without(ids::UNLINK_ACCOUNT_LABEL);
        let mut store = store();
        let result = ModalController::new(&mut page, &mut store)
            .confirm_unlink("42", "Acct 42");
        assert_eq!(result, Err(ViewError::missing(ids::UNLINK_ACCOUNT_LABEL)));
        assert_eq!(page.attribute(ids::UNLINK_FORM, "action"), Some("/accounts/42/unlink"));
        assert_eq!(store.open_modal(), Some(ModalKind::Unlink));
    }

    #[test]
    fn opening_over_a_removed_modal_still_works() {
        let mut page = FakePage::dashboard();
        let mut store = store();
        ModalController::new(&mut page, &mut store).open(ModalKind::Link).unwrap();
        let mut page = page.without(ids::LINK_MODAL);
        ModalController::new(&mut page, &mut store).open(ModalKind::Copy).unwrap();
        assert_eq!(store.open_modal(), Some(ModalKind::Copy));
        assert_eq!(page.body_overflow(), Some("hidden"));
    }

    #[test]
    fn size_label_follows_selector() {
        assert_eq!(trade_size_label("Fixed"), "Lot Size");
        assert_eq!(trade_size_label("Multiplier"), "Multiplier");
        assert_eq!(trade_size_label(""), "Multiplier");
        assert_eq!("unlink".parse::<ModalKind>().unwrap(), ModalKind::Unlink);
        assert!("settings".parse::<ModalKind>().is_err());
        assert_eq!(ModalKind::from_container_id(ids::STOP_MODAL), Some(ModalKind::Stop));
        assert_eq!(ModalKind::from_container_id(ids::STOP_MODAL_TITLE), None);
    }
}

use crate::error::ViewResult;
use crate::modal::ModalKind;
use crate::state::{PageTab, SelectedAccount, ViewState};

pub const SELECTED_ACCOUNT_ID_KEY: &str = "selectedAccountId";
pub const SELECTED_ACCOUNT_TYPE_KEY: &str = "selectedAccountType";
pub const SELECTED_PAGE_TAB_KEY: &str = "selectedPageTab";

/// Durable string key/value storage scoped to the browser (`localStorage`).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> ViewResult<()>;
    fn remove(&mut self, key: &str) -> ViewResult<()>;
}

/// Remembers the selected account and page tab across reloads.
pub struct PersistentSelectionStore<S> {
    backend: S,
    prefix: String,
}

impl<S: KeyValueStore> PersistentSelectionStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_prefix(backend, "")
    }

    pub fn with_prefix(backend: S, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Stored page tab; unknown values count as absent.
    pub fn page_tab(&self) -> Option<PageTab> {
        self.backend
            .get(&self.key(SELECTED_PAGE_TAB_KEY))
            .and_then(|raw| PageTab::parse(&raw))
    }

    pub fn set_page_tab(&mut self, tab: PageTab) -> ViewResult<()> {
        let key = self.key(SELECTED_PAGE_TAB_KEY);
        self.backend.set(&key, tab.as_str())
    }

    pub fn selected_account(&self) -> Option<SelectedAccount> {
        let account_id = self
            .backend
            .get(&self.key(SELECTED_ACCOUNT_ID_KEY))
            .filter(|id| !id.is_empty())?;
        let account_type = self
            .backend
            .get(&self.key(SELECTED_ACCOUNT_TYPE_KEY))
            .filter(|t| !t.is_empty());
        Some(SelectedAccount {
            account_id,
            account_type,
        })
    }

    pub fn set_selected_account(&mut self, account: &SelectedAccount) -> ViewResult<()> {
        let id_key = self.key(SELECTED_ACCOUNT_ID_KEY);
        let type_key = self.key(SELECTED_ACCOUNT_TYPE_KEY);
        self.backend.set(&id_key, &account.account_id)?;
        match &account.account_type {
            Some(kind) => self.backend.set(&type_key, kind),
            None => self.backend.remove(&type_key),
        }
    }

    pub fn clear_selected_account(&mut self) -> ViewResult<()> {
        let id_key = self.key(SELECTED_ACCOUNT_ID_KEY);
        let type_key = self.key(SELECTED_ACCOUNT_TYPE_KEY);
        self.backend.remove(&id_key)?;
        self.backend.remove(&type_key)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}

/// Explicit view state shared by the controllers: active tabs, the single
/// open modal and the durable selection store behind them.
pub struct ViewStateStore<S> {
    view: ViewState,
    open_modal: Option<ModalKind>,
    selection: PersistentSelectionStore<S>,
}

impl<S: KeyValueStore> ViewStateStore<S> {
    pub fn new(selection: PersistentSelectionStore<S>) -> Self {
        Self {
            view: ViewState::default(),
            open_modal: None,
            selection,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub(crate) fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn open_modal(&self) -> Option<ModalKind> {
        self.open_modal
    }

    pub(crate) fn set_open_modal(&mut self, modal: Option<ModalKind>) {
        self.open_modal = modal;
    }

    pub fn selection(&self) -> &PersistentSelectionStore<S> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut PersistentSelectionStore<S> {
        &mut self.selection
    }
}

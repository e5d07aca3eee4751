//! View-state synchronization for the copy-trading dashboard.
//!
//! Controllers work against small capability traits (`Page`, `KeyValueStore`,
//! `QueryStringEditor`, `ServerDirectory`) so the same logic drives the browser
//! and in-memory fakes.

pub mod bootstrap;
pub mod broker;
pub mod config;
pub mod error;
pub mod modal;
pub mod page;
pub mod state;
pub mod store;
pub mod tabs;
pub mod url;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bootstrap::{
    clear_account, derive_initial_view, scrub_flash_params, select_account, BootstrapReport,
    DashboardBootstrapper,
};
pub use broker::{
    BrokerServerLoader, LoadOutcome, PendingLoad, ServerDirectory, ServerEntry, ServerList,
    ServerListFuture,
};
pub use config::DashboardConfig;
pub use error::{ignore_missing, FetchError, ViewError, ViewResult};
pub use modal::{trade_size_label, CopySettings, ModalController, ModalKind};
pub use page::{ids, Display, Page, SelectOption};
pub use state::{PageTab, SelectedAccount, TradesTab, ViewState};
pub use store::{KeyValueStore, PersistentSelectionStore, ViewStateStore};
pub use tabs::TabController;
pub use crate::url::{strip_params, PageLocation, QueryParamSet, QueryStringEditor};

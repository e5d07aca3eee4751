use crate::error::ViewResult;

/// Element ids the server-rendered dashboard markup exposes.
pub mod ids {
    pub const TAB_OVERVIEW: &str = "tab-overview";
    pub const TAB_TRADES: &str = "tab-trades";
    pub const PANEL_OVERVIEW: &str = "panel-overview";
    pub const PANEL_TRADES: &str = "panel-trades";

    pub const TRADES_TAB_OPEN: &str = "trades-tab-open";
    pub const TRADES_TAB_CLOSED: &str = "trades-tab-closed";
    pub const TRADES_PANEL_OPEN: &str = "trades-panel-open";
    pub const TRADES_PANEL_CLOSED: &str = "trades-panel-closed";
    pub const DATE_RANGE_SELECTOR: &str = "date-range-selector";
    pub const CLOSED_STATS_ROW: &str = "closed-stats-row";

    pub const COPY_MODAL: &str = "copy-modal";
    pub const STOP_MODAL: &str = "stop-modal";
    pub const LINK_MODAL: &str = "link-modal";
    pub const UNLINK_MODAL: &str = "unlink-modal";

    pub const COPY_MODAL_TITLE: &str = "copy-modal-title";
    pub const COPY_COPIER_ID: &str = "copy-copier-id";
    pub const COPY_STRATEGY_ID: &str = "copy-strategy-id";
    pub const COPY_STRATEGY_NAME: &str = "copy-strategy-name";
    pub const TRADE_SIZE_TYPE: &str = "trade-size-type";
    pub const TRADE_SIZE_VALUE: &str = "trade-size-value";
    pub const TRADE_SIZE_LABEL: &str = "trade-size-label";
    pub const OPEN_EXISTING_TRADES: &str = "open-existing-trades";
    pub const ROUND_UP_TO_MINIMUM: &str = "round-up-to-minimum";

    pub const STOP_MODAL_TITLE: &str = "stop-modal-title";
    pub const STOP_COPIER_ID: &str = "stop-copier-id";
    pub const STOP_STRATEGY_ID: &str = "stop-strategy-id";
    pub const STOP_STRATEGY_NAME: &str = "stop-strategy-name";

    pub const UNLINK_FORM: &str = "unlink-form";
    pub const UNLINK_ACCOUNT_LABEL: &str = "unlink-account-label";

    pub const BROKER_SELECT: &str = "broker-select";
    pub const SERVER_SELECT: &str = "server-select";

    pub const COPY_AFFORDANCE: &str = "copy-affordance";

    pub const ACTIVE_CLASS: &str = "active";
}

/// CSS `display` values the controllers switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Flex,
    Block,
    Hidden,
}

impl Display {
    pub fn as_css(&self) -> &'static str {
        match self {
            Display::Flex => "flex",
            Display::Block => "block",
            Display::Hidden => "none",
        }
    }
}

/// One `<option>` of a selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    /// Disabled option with an empty value, shown as the only entry.
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            label: label.into(),
            disabled: true,
        }
    }
}

/// Capability over the rendered page, addressed by element id.
///
/// Every mutation reports `ViewError::MissingElement` when the node is not
/// rendered instead of failing the caller.
pub trait Page {
    fn set_class(&mut self, id: &str, class: &str, on: bool) -> ViewResult<()>;
    fn set_display(&mut self, id: &str, display: Display) -> ViewResult<()>;
    fn set_text(&mut self, id: &str, text: &str) -> ViewResult<()>;
    fn value(&self, id: &str) -> ViewResult<String>;
    fn set_value(&mut self, id: &str, value: &str) -> ViewResult<()>;
    fn set_checked(&mut self, id: &str, checked: bool) -> ViewResult<()>;
    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> ViewResult<()>;
    fn set_disabled(&mut self, id: &str, disabled: bool) -> ViewResult<()>;
    fn replace_options(&mut self, id: &str, options: &[SelectOption]) -> ViewResult<()>;

    /// Set or clear (`None`) the inline `overflow` override on `<body>`.
    fn set_body_overflow(&mut self, overflow: Option<&str>);

    /// Value of `attr` for each row of `container`, in current order.
    fn row_attributes(&self, container: &str, attr: &str) -> ViewResult<Vec<Option<String>>>;

    /// Move the existing rows of `container` so that `order[i]` (an index into
    /// the current order) ends up at position `i`.
    fn reorder_rows(&mut self, container: &str, order: &[usize]) -> ViewResult<()>;
}

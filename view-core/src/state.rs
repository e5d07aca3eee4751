/// Top-level dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageTab {
    #[default]
    Overview,
    Trades,
}

impl PageTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageTab::Overview => "overview",
            PageTab::Trades => "trades",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "overview" => Some(PageTab::Overview),
            "trades" => Some(PageTab::Trades),
            _ => None,
        }
    }
}

/// Tab inside the trades panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TradesTab {
    #[default]
    Open,
    Closed,
}

impl TradesTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradesTab::Open => "open",
            TradesTab::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "open" => Some(TradesTab::Open),
            "closed" => Some(TradesTab::Closed),
            _ => None,
        }
    }
}

/// Which tab of each group is active. One value per group, so exactly one tab
/// per group is active by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub page_tab: PageTab,
    pub trades_tab: TradesTab,
}

/// Source account the user picked; drives the copy affordances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAccount {
    pub account_id: String,
    pub account_type: Option<String>,
}

impl SelectedAccount {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            account_type: None,
        }
    }

    pub fn with_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }
}

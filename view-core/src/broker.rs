use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::error::{FetchError, ViewResult};
use crate::page::{ids, Page, SelectOption};

pub const SELECT_BROKER_FIRST: &str = "Select broker first";
pub const LOADING_SERVERS: &str = "Loading servers...";
pub const ERROR_LOADING_SERVERS: &str = "Error loading servers";

/// One trading server offered by a broker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerEntry {
    #[serde(alias = "serverCode", alias = "ServerCode")]
    pub code: String,
    #[serde(default, alias = "displayName", alias = "DisplayName")]
    pub name: String,
    #[serde(default, alias = "Vendor")]
    pub vendor: String,
}

impl ServerEntry {
    pub fn option_label(&self) -> String {
        let name = if self.name.is_empty() { &self.code } else { &self.name };
        if self.vendor.is_empty() {
            name.clone()
        } else {
            format!("{} ({})", name, self.vendor)
        }
    }
}

/// Success body of `GET /accounts/servers?brokerCode=...`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerList {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

pub type ServerListFuture = Pin<Box<dyn Future<Output = Result<ServerList, FetchError>>>>;

/// Source of the per-broker server list. Futures are single-threaded.
pub trait ServerDirectory {
    fn fetch_servers(&self, broker_code: &str) -> ServerListFuture;
}

/// Ticket for one issued server-list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub token: u64,
    pub broker_code: String,
}

/// What a broker change ended up doing to the server selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No broker selected; placeholder shown.
    Reset,
    /// Options rebuilt with this many servers.
    Applied(usize),
    /// Request failed; error placeholder shown.
    Failed,
    /// A newer request was issued meanwhile; response dropped.
    Stale,
}

/// Repopulates the server selector whenever the broker selection changes.
///
/// Each request carries a monotonically increasing token and only the latest
/// one may touch the selector, so a slow earlier response cannot overwrite a
/// newer one.
#[derive(Debug, Default)]
pub struct BrokerServerLoader {
    latest: u64,
}

impl BrokerServerLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous half of a broker change: read the broker, show the
    /// placeholder, and hand back a ticket if a fetch is needed.
    pub fn begin<P: Page + ?Sized>(&mut self, page: &mut P) -> ViewResult<Option<PendingLoad>> {
        let broker_code = page.value(ids::BROKER_SELECT)?.trim().to_string();
        self.latest += 1;
        if broker_code.is_empty() {
            page.replace_options(ids::SERVER_SELECT, &[SelectOption::placeholder(SELECT_BROKER_FIRST)])?;
            page.set_disabled(ids::SERVER_SELECT, true)?;
            return Ok(None);
        }
        page.replace_options(ids::SERVER_SELECT, &[SelectOption::placeholder(LOADING_SERVERS)])?;
        page.set_disabled(ids::SERVER_SELECT, true)?;
        tracing::debug!(broker = %broker_code, token = self.latest, "loading servers");
        Ok(Some(PendingLoad {
            token: self.latest,
            broker_code,
        }))
    }

    /// Apply a finished fetch if its ticket is still the latest one.
    pub fn complete<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        pending: &PendingLoad,
        result: Result<ServerList, FetchError>,
    ) -> ViewResult<LoadOutcome> {
        if pending.token != self.latest {
            tracing::debug!(
                broker = %pending.broker_code,
                token = pending.token,
                latest = self.latest,
                "discarding stale server list"
            );
            return Ok(LoadOutcome::Stale);
        }
        let outcome = match result {
            Ok(list) => {
                let options: Vec<SelectOption> = list
                    .servers
                    .iter()
                    .map(|s| SelectOption::new(s.code.clone(), s.option_label()))
                    .collect();
                page.replace_options(ids::SERVER_SELECT, &options)?;
                LoadOutcome::Applied(options.len())
            }
            Err(err) => {
                tracing::warn!(broker = %pending.broker_code, error = %err, "failed to load servers");
                page.replace_options(ids::SERVER_SELECT, &[SelectOption::placeholder(ERROR_LOADING_SERVERS)])?;
                LoadOutcome::Failed
            }
        };
        page.set_disabled(ids::SERVER_SELECT, false)?;
        Ok(outcome)
    }

    /// Full broker change for callers that own the page for the whole fetch.
    pub async fn on_broker_changed<P, D>(&mut self, page: &mut P, directory: &D) -> ViewResult<LoadOutcome>
    where
        P: Page + ?Sized,
        D: ServerDirectory + ?Sized,
    {
        let Some(pending) = self.begin(page)? else {
            return Ok(LoadOutcome::Reset);
        };
        let result = directory.fetch_servers(&pending.broker_code).await;
        self.complete(page, &pending, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePage, StaticDirectory};

    fn page_with_broker(code: &str) -> FakePage {
        let mut page = FakePage::dashboard();
        page.set_value(ids::BROKER_SELECT, code).unwrap();
        page
    }

    fn servers() -> ServerList {
        serde_json::from_str(
            r#"{"servers":[
                {"code":"ICM-Live","name":"IC Markets Live","vendor":"MT5"},
                {"code":"ICM-Demo","name":"IC Markets Demo","vendor":"MT4"}
            ]}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn empty_broker_resets_selector() {
        let mut page = page_with_broker("");
        let mut loader = BrokerServerLoader::new();
        let directory = StaticDirectory::ok(servers());
        let outcome = loader.on_broker_changed(&mut page, &directory).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Reset);
        assert_eq!(
            page.options(ids::SERVER_SELECT),
            vec![SelectOption::placeholder(SELECT_BROKER_FIRST)]
        );
        assert_eq!(page.disabled(ids::SERVER_SELECT), Some(true));
        assert!(directory.requests().is_empty());
    }

    #[tokio::test]
    async fn success_rebuilds_options_and_enables() {
        let mut page = page_with_broker("IC Markets");
        let mut loader = BrokerServerLoader::new();
        let directory = StaticDirectory::ok(servers());
        let outcome = loader.on_broker_changed(&mut page, &directory).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied(2));
        let options = page.options(ids::SERVER_SELECT);
        assert_eq!(options[0].value, "ICM-Live");
        assert_eq!(options[0].label, "IC Markets Live (MT5)");
        assert!(!options[1].disabled);
        assert_eq!(page.disabled(ids::SERVER_SELECT), Some(false));
        assert_eq!(directory.requests(), vec!["IC Markets".to_string()]);
    }

    #[tokio::test]
    async fn failure_shows_error_placeholder_but_reenables() {
        let mut page = page_with_broker("XM");
        let mut loader = BrokerServerLoader::new();
        let directory = StaticDirectory::err(FetchError::Status(502));
        let outcome = loader.on_broker_changed(&mut page, &directory).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(
            page.options(ids::SERVER_SELECT),
            vec![SelectOption::placeholder(ERROR_LOADING_SERVERS)]
        );
        assert_eq!(page.disabled(ids::SERVER_SELECT), Some(false));
    }

    #[test]
    fn begin_shows_loading_placeholder() {
        let mut page = page_with_broker("XM");
        let mut loader = BrokerServerLoader::new();
        let pending = loader.begin(&mut page).unwrap().unwrap();
        assert_eq!(pending.broker_code, "XM");
        assert_eq!(pending.token, 1);
        assert_eq!(
            page.options(ids::SERVER_SELECT),
            vec![SelectOption::placeholder(LOADING_SERVERS)]
        );
        assert_eq!(page.disabled(ids::SERVER_SELECT), Some(true));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut page = page_with_broker("A");
        let mut loader = BrokerServerLoader::new();
        let first = loader.begin(&mut page).unwrap().unwrap();
        page.set_value(ids::BROKER_SELECT, "B").unwrap();
        let second = loader.begin(&mut page).unwrap().unwrap();

        let fresh = ServerList {
            servers: vec![ServerEntry {
                code: "B-1".into(),
                name: "B One".into(),
                vendor: "MT5".into(),
            }],
        };
        assert_eq!(
            loader.complete(&mut page, &second, Ok(fresh)).unwrap(),
            LoadOutcome::Applied(1)
        );
        assert_eq!(
            loader.complete(&mut page, &first, Ok(servers())).unwrap(),
            LoadOutcome::Stale
        );
        assert_eq!(page.options(ids::SERVER_SELECT)[0].value, "B-1");
    }

    #[test]
    fn clearing_broker_invalidates_inflight_request() {
        let mut page = page_with_broker("A");
        let mut loader = BrokerServerLoader::new();
        let inflight = loader.begin(&mut page).unwrap().unwrap();
        page.set_value(ids::BROKER_SELECT, "").unwrap();
        assert!(loader.begin(&mut page).unwrap().is_none());
        assert_eq!(
            loader.complete(&mut page, &inflight, Ok(servers())).unwrap(),
            LoadOutcome::Stale
        );
        assert_eq!(
            page.options(ids::SERVER_SELECT),
            vec![SelectOption::placeholder(SELECT_BROKER_FIRST)]
        );
    }

    #[test]
    fn labels_fall_back_to_code() {
        let entry: ServerEntry = serde_json::from_str(r#"{"serverCode":"X-1"}"#).unwrap();
        assert_eq!(entry.option_label(), "X-1");
    }
}

use gloo_net::http::Request;
use view_core::{DashboardConfig, FetchError, ServerDirectory, ServerList, ServerListFuture};

/// Server list over HTTP from the dashboard backend.
pub struct HttpServerDirectory {
    config: DashboardConfig,
}

impl HttpServerDirectory {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }
}

impl ServerDirectory for HttpServerDirectory {
    fn fetch_servers(&self, broker_code: &str) -> ServerListFuture {
        let url = self.config.server_list_url(broker_code);
        Box::pin(async move {
            let resp = Request::get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            if !resp.ok() {
                return Err(FetchError::Status(resp.status()));
            }
            resp.json::<ServerList>()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()))
        })
    }
}

// RouterApi over REST
//
// Menu reads, the traffic monitor, and the two write-path passthroughs.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::record::{RawRecord, field_text};
use crate::rest::client::RestClient;
use crate::router::RouterApi;

#[async_trait]
impl RouterApi for RestClient {
    /// `GET /rest/{path}`
    async fn fetch(&self, path: &str) -> Result<Vec<RawRecord>, Error> {
        let url = self.rest_url(path)?;
        self.get(url).await
    }

    /// `POST /rest/interface/monitor-traffic` with `{"interface": .., "once": ""}`
    async fn fetch_traffic(&self, interfaces: &str) -> Result<Vec<RawRecord>, Error> {
        if interfaces.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.rest_url("/interface/monitor-traffic")?;
        debug!(interfaces, "sampling interface traffic");
        self.post(url, &json!({ "interface": interfaces, "once": "" }))
            .await
    }

    /// Look the entry up by `mod_param`, then `PATCH /rest/{path}/{.id}`.
    async fn set_value(
        &self,
        path: &str,
        param: &str,
        value: &str,
        mod_param: &str,
        mod_value: &str,
    ) -> Result<bool, Error> {
        let entries = self.get(self.rest_url(path)?).await?;
        let id = entries
            .iter()
            .find(|entry| field_text(entry, mod_param).as_deref() == Some(mod_value))
            .and_then(|entry| field_text(entry, ".id"));

        let Some(id) = id else {
            debug!(path, mod_param, mod_value, "no entry matched, nothing to set");
            return Ok(false);
        };

        let url = self.rest_url(&format!("{}/{id}", path.trim_end_matches('/')))?;
        let mut body = serde_json::Map::new();
        body.insert(param.to_owned(), serde_json::Value::String(value.to_owned()));
        self.patch(url, &serde_json::Value::Object(body)).await?;
        Ok(true)
    }

    /// `POST /rest/system/script/run` with `{"number": name}`
    async fn run_script(&self, name: &str) -> Result<bool, Error> {
        let url = self.rest_url("/system/script/run")?;
        debug!(name, "running script");
        self.post(url, &json!({ "number": name })).await?;
        Ok(true)
    }
}

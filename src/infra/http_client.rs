use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::ports::{CompoundLookupPort, RateLimiterPort};
use crate::common::constants::{SMILES_PROPERTY_KEYS, USER_AGENT};
use crate::common::error::{CuratorError, LookupError, Result};
use crate::observability::metrics;

// Everything but RFC 3986 unreserved characters, so `+ ( ) [ ] & ;` in names survive intact
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// PubChem PUG REST client. Every request waits on the shared limiter first.
pub struct PubChemClient {
    client: reqwest::Client,
    base_url: Url,
    limiter: Arc<dyn RateLimiterPort>,
}

impl PubChemClient {
    pub fn new(base_url: &str, timeout: Duration, limiter: Arc<dyn RateLimiterPort>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CuratorError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CuratorError::Config(format!("Base URL '{}' cannot take path segments", base_url)));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url, limiter })
    }

    /// `{base}/compound/name/{name}/cids/JSON`, with `name` percent-encoded as one segment.
    pub fn cids_url(&self, name: &str) -> Url {
        self.endpoint(&["compound", "name", name, "cids", "JSON"])
    }

    /// `{base}/compound/cid/{cid}/property/CanonicalSMILES/JSON`
    pub fn smiles_url(&self, cid: u64) -> Url {
        let cid = cid.to_string();
        self.endpoint(&["compound", "cid", cid.as_str(), "property", SMILES_PROPERTY_KEYS[0], "JSON"])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let encoded: Vec<String> = segments
            .iter()
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect();
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}/{}", self.base_url.path().trim_end_matches('/'), encoded.join("/")));
        url
    }

    async fn get_json(&self, url: Url, endpoint: &'static str) -> std::result::Result<Value, LookupError> {
        self.limiter.acquire().await;
        tracing::debug!("HTTP GET request to: {}", url);
        let started = Instant::now();

        let outcome = self.send(url).await;
        metrics::lookup::request_duration(endpoint, started.elapsed().as_secs_f64());
        match &outcome {
            Ok(_) => metrics::lookup::request_success(endpoint),
            Err(e) => metrics::lookup::request_error(endpoint, e.kind()),
        }
        outcome
    }

    async fn send(&self, url: Url) -> std::result::Result<Value, LookupError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        tracing::debug!("HTTP response: status={}", status.as_u16());
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound);
        }
        if !status.is_success() {
            return Err(LookupError::HttpStatus(status.as_u16()));
        }
        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl CompoundLookupPort for PubChemClient {
    async fn cids_by_name(&self, name: &str) -> std::result::Result<Vec<u64>, LookupError> {
        let body = self.get_json(self.cids_url(name), "cids_by_name").await?;
        parse_cid_list(&body)
    }

    async fn smiles_by_cid(&self, cid: u64) -> std::result::Result<String, LookupError> {
        let body = self.get_json(self.smiles_url(cid), "smiles_by_cid").await?;
        parse_smiles(&body)
    }
}

fn check_fault(body: &Value) -> std::result::Result<(), LookupError> {
    if let Some(fault) = body.get("Fault") {
        let code = fault.get("Code").and_then(Value::as_str).unwrap_or("");
        if code == "PUGREST.NotFound" || code.is_empty() {
            return Err(LookupError::NotFound);
        }
        let message = fault.get("Message").and_then(Value::as_str).unwrap_or(code);
        return Err(LookupError::Malformed(format!("service fault {}: {}", code, message)));
    }
    Ok(())
}

/// Extract `IdentifierList.CID`. CID 0 is the service's "no compound" marker and is dropped.
pub fn parse_cid_list(body: &Value) -> std::result::Result<Vec<u64>, LookupError> {
    check_fault(body)?;
    let list = body
        .get("IdentifierList")
        .and_then(|l| l.get("CID"))
        .and_then(Value::as_array)
        .ok_or_else(|| LookupError::Malformed("missing IdentifierList.CID".to_string()))?;

    let mut cids = Vec::with_capacity(list.len());
    for entry in list {
        let cid = entry
            .as_u64()
            .ok_or_else(|| LookupError::Malformed(format!("non-numeric CID {}", entry)))?;
        if cid != 0 {
            cids.push(cid);
        }
    }
    if cids.is_empty() {
        return Err(LookupError::NotFound);
    }
    Ok(cids)
}

/// Extract the first non-blank SMILES-like property of `PropertyTable.Properties[0]`.
pub fn parse_smiles(body: &Value) -> std::result::Result<String, LookupError> {
    check_fault(body)?;
    let first = body
        .get("PropertyTable")
        .and_then(|t| t.get("Properties"))
        .and_then(Value::as_array)
        .and_then(|props| props.first())
        .ok_or_else(|| LookupError::Malformed("missing PropertyTable.Properties".to_string()))?;

    SMILES_PROPERTY_KEYS
        .iter()
        .filter_map(|key| first.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(LookupError::NotFound)
}

//! Authenticated browser session over the WebDriver wire protocol
//!
//! The driver process is an opaque collaborator; this module only needs the
//! navigate/locate/interact/wait REST surface every WebDriver server exposes.
//! One `Session` is exclusively owned by one scenario for its duration and
//! released by the runner on every exit path.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::page::Locator;

/// Wire key for element references in WebDriver JSON payloads
pub(crate) const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque reference to a located element, valid for the current page
#[derive(Debug, Clone)]
pub struct ElementRef(pub(crate) String);

/// An authenticated browser session against the target application
pub struct Session {
    http: reqwest::Client,
    driver_url: String,
    session_id: String,
    base_url: String,
    closed: bool,
}

impl Session {
    /// Create a browser session against a running WebDriver server
    pub async fn new(driver_url: &str, base_url: &str, headless: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let mut args = vec!["--window-size=1280,900".to_string()];
        if headless {
            args.push("--headless=new".to_string());
        }

        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let resp: Value = http
            .post(format!("{}/session", driver_url))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let session_id = resp["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| Error::Session(format!("no sessionId in driver response: {}", resp)))?
            .to_string();

        debug!("Created WebDriver session {}", session_id);

        Ok(Self {
            http,
            driver_url: driver_url.to_string(),
            session_id,
            base_url: base_url.to_string(),
            closed: false,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.driver_url, self.session_id, path)
    }

    /// POST a command, returning the unwrapped `value` on success
    pub(crate) async fn cmd(&self, path: &str, body: Value) -> Result<Value> {
        let resp = self.http.post(self.endpoint(path)).json(&body).send().await?;
        Self::unwrap_value(resp).await
    }

    /// GET a command, returning the unwrapped `value` on success
    pub(crate) async fn get(&self, path: &str) -> Result<Value> {
        let resp = self.http.get(self.endpoint(path)).send().await?;
        Self::unwrap_value(resp).await
    }

    async fn unwrap_value(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let body: Value = resp.json().await?;
        if status.is_success() {
            Ok(body["value"].clone())
        } else {
            let error = body["value"]["error"].as_str().unwrap_or("unknown");
            let message = body["value"]["message"].as_str().unwrap_or("");
            Err(Error::Protocol(format!("{}: {}", error, message)))
        }
    }

    /// Navigate to a path under the application base URL and block until the
    /// document is ready or the timeout expires. Timeout is fatal to the
    /// calling scenario.
    pub async fn open(&self, path: &str, timeout: Duration) -> Result<()> {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
        };

        debug!("open {}", url);
        self.cmd("/url", json!({ "url": url })).await?;
        self.wait_document_ready(timeout).await
    }

    async fn wait_document_ready(&self, timeout: Duration) -> Result<()> {
        let start = std::time::Instant::now();
        loop {
            let state = self
                .execute("return document.readyState;", vec![])
                .await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(Error::Timeout("document ready".to_string()));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Log in through the application's HTML login form.
    ///
    /// Failure here is a hard `Session` error; the sweep cannot proceed
    /// without an authenticated session and no retry is attempted.
    pub async fn login(&self, login_path: &str, creds: &Credentials, timeout: Duration) -> Result<()> {
        self.open(login_path, timeout)
            .await
            .map_err(|e| Error::Session(format!("login navigation failed: {}", e)))?;

        // Already authenticated sessions land past the login form
        if self.find(&Locator::Id("enter".into())).await?.is_none() {
            return Ok(());
        }

        self.fill_login_field(Locator::Id("name".into()), &creds.username).await?;
        self.fill_login_field(Locator::Id("password".into()), &creds.password).await?;

        let submit = self
            .find(&Locator::Id("enter".into()))
            .await?
            .ok_or_else(|| Error::Session("login submit button missing".into()))?;
        self.cmd(&format!("/element/{}/click", submit.0), json!({})).await?;
        self.wait_document_ready(timeout).await?;

        // The login form still being present means the credentials were rejected
        if self.find(&Locator::Id("enter".into())).await?.is_some() {
            return Err(Error::Session("login rejected by application".into()));
        }

        info!("Logged in as {}", creds.username);
        Ok(())
    }

    async fn fill_login_field(&self, loc: Locator, text: &str) -> Result<()> {
        let el = self
            .find(&loc)
            .await?
            .ok_or_else(|| Error::Session(format!("login form field missing: {}", loc)))?;
        self.cmd(&format!("/element/{}/value", el.0), json!({ "text": text }))
            .await?;
        Ok(())
    }

    /// Locate a single element; `None` when absent (absence is not an error here)
    pub async fn find(&self, locator: &Locator) -> Result<Option<ElementRef>> {
        let (using, value) = locator.strategy();
        let resp = self
            .http
            .post(self.endpoint("/element"))
            .json(&json!({ "using": using, "value": value }))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let value = Self::unwrap_value(resp).await?;
        match value[ELEMENT_KEY].as_str() {
            Some(id) => Ok(Some(ElementRef(id.to_string()))),
            None => Err(Error::Protocol(format!("no element reference in: {}", value))),
        }
    }

    /// Locate all matching elements
    pub async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let (using, value) = locator.strategy();
        let value = self
            .cmd("/elements", json!({ "using": using, "value": value }))
            .await?;
        let list = value.as_array().cloned().unwrap_or_default();
        Ok(list
            .iter()
            .filter_map(|e| e[ELEMENT_KEY].as_str())
            .map(|id| ElementRef(id.to_string()))
            .collect())
    }

    /// Execute synchronous JavaScript in the page
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.cmd("/execute/sync", json!({ "script": script, "args": args }))
            .await
    }

    /// Execute script with an element as the first argument
    pub async fn execute_on(&self, script: &str, el: &ElementRef) -> Result<Value> {
        self.execute(script, vec![json!({ ELEMENT_KEY: el.0 })]).await
    }

    /// Full page source (for text-present checks over the rendered page)
    pub async fn page_source(&self) -> Result<String> {
        let value = self.get("/source").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Current page title
    pub async fn title(&self) -> Result<String> {
        let value = self.get("/title").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Accept a native alert/confirm dialog
    pub async fn accept_alert(&self) -> Result<()> {
        self.cmd("/alert/accept", json!({})).await?;
        Ok(())
    }

    /// Switch to the tab at the given index (opening order)
    pub async fn switch_tab(&self, index: usize) -> Result<()> {
        let handles = self.get("/window/handles").await?;
        let handles = handles.as_array().cloned().unwrap_or_default();
        let handle = handles
            .get(index)
            .and_then(|h| h.as_str())
            .ok_or_else(|| Error::Session(format!("no tab at index {}", index)))?;
        self.cmd("/window", json!({ "handle": handle })).await?;
        Ok(())
    }

    /// Release the session. Always invoked by the runner on both pass and
    /// fail paths; the driver process is separately killed on drop.
    pub async fn close(mut self) {
        self.closed = true;
        let url = format!("{}/session/{}", self.driver_url, self.session_id);
        if let Err(e) = self.http.delete(url).send().await {
            warn!("failed to close WebDriver session: {}", e);
        } else {
            debug!("Closed WebDriver session {}", self.session_id);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            // Release went through the runner in normal operation; this only
            // fires on panic paths, where the driver teardown reaps the
            // browser anyway.
            warn!("WebDriver session {} dropped without close()", self.session_id);
        }
    }
}

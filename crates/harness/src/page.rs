//! Page interaction library
//!
//! A thin capability set over the current session: click, type, overwrite,
//! dropdown select, checkbox toggle, tab switch, visibility waits, plus the
//! read primitives verification needs. Every mutating operation blocks until
//! its target element is present, visible, and enabled, or raises
//! `ElementNotReady` naming the locator and the awaited state. The library
//! holds no state between calls beyond the borrowed session.

use serde_json::json;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::session::{ElementRef, Session, ELEMENT_KEY};

/// A stable element locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    Name(String),
    Css(String),
    XPath(String),
    LinkText(String),
}

impl Locator {
    /// WebDriver location strategy pair (`using`, `value`)
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Locator::Id(id) => ("css selector", format!("#{}", css_escape(id))),
            Locator::Name(name) => ("css selector", format!("[name='{}']", name)),
            Locator::Css(sel) => ("css selector", sel.clone()),
            Locator::XPath(xp) => ("xpath", xp.clone()),
            Locator::LinkText(text) => ("link text", text.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(s) => write!(f, "id={}", s),
            Locator::Name(s) => write!(f, "name={}", s),
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
            Locator::LinkText(s) => write!(f, "link={}", s),
        }
    }
}

/// Escape characters CSS id selectors cannot carry verbatim
fn css_escape(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// The element state an operation waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Present,
    Visible,
    NotVisible,
    Enabled,
}

impl ElementState {
    fn as_str(&self) -> &'static str {
        match self {
            ElementState::Present => "present",
            ElementState::Visible => "visible",
            ElementState::NotVisible => "not visible",
            ElementState::Enabled => "enabled",
        }
    }
}

/// Interaction surface bound to one session
pub struct Page<'a> {
    session: &'a Session,
    wait_timeout: Duration,
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl<'a> Page<'a> {
    pub fn new(session: &'a Session, wait_timeout: Duration) -> Self {
        Self {
            session,
            wait_timeout,
        }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    /// Click an element once it is visible and enabled
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let el = self.await_state(locator, ElementState::Enabled).await?;
        self.session
            .cmd(&format!("/element/{}/click", el.0), json!({}))
            .await?;
        Ok(())
    }

    /// Type into a field, appending to its current content
    pub async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        let el = self.await_state(locator, ElementState::Enabled).await?;
        self.session
            .cmd(&format!("/element/{}/value", el.0), json!({ "text": text }))
            .await?;
        Ok(())
    }

    /// Clear a field and type a replacement value
    pub async fn overwrite(&self, locator: &Locator, text: &str) -> Result<()> {
        let el = self.await_state(locator, ElementState::Enabled).await?;
        self.session
            .cmd(&format!("/element/{}/clear", el.0), json!({}))
            .await?;
        self.session
            .cmd(&format!("/element/{}/value", el.0), json!({ "text": text }))
            .await?;
        Ok(())
    }

    /// Select a dropdown option by its visible label
    pub async fn select_option(&self, locator: &Locator, label: &str) -> Result<()> {
        let select = self.await_state(locator, ElementState::Enabled).await?;
        let option = Locator::XPath(format!(
            ".//option[normalize-space(.)={}]",
            xpath_literal(label)
        ));
        let (using, value) = option.strategy();
        let resp = self
            .session
            .cmd(
                &format!("/element/{}/element", select.0),
                json!({ "using": using, "value": value }),
            )
            .await
            .map_err(|_| Error::ElementNotReady {
                locator: format!("{} option '{}'", locator, label),
                state: ElementState::Present.as_str().to_string(),
                waited_ms: 0,
            })?;
        let option_id = resp[ELEMENT_KEY]
            .as_str()
            .ok_or_else(|| Error::Protocol(format!("no option element in: {}", resp)))?
            .to_string();
        self.session
            .cmd(&format!("/element/{}/click", option_id), json!({}))
            .await?;
        Ok(())
    }

    /// Set a checkbox to the requested state (no-op when already there)
    pub async fn toggle_checkbox(&self, locator: &Locator, checked: bool) -> Result<()> {
        let el = self.await_state(locator, ElementState::Enabled).await?;
        let current = self
            .session
            .get(&format!("/element/{}/selected", el.0))
            .await?
            .as_bool()
            .unwrap_or(false);
        if current != checked {
            self.session
                .cmd(&format!("/element/{}/click", el.0), json!({}))
                .await?;
        }
        Ok(())
    }

    /// Switch to another browser tab by opening order
    pub async fn switch_tab(&self, index: usize) -> Result<()> {
        self.session.switch_tab(index).await
    }

    /// Block until the element is visible
    pub async fn wait_visible(&self, locator: &Locator) -> Result<()> {
        self.await_state(locator, ElementState::Visible).await?;
        Ok(())
    }

    /// Block until the element is absent or hidden
    pub async fn wait_not_visible(&self, locator: &Locator) -> Result<()> {
        let start = std::time::Instant::now();
        loop {
            let visible = match self.session.find(locator).await? {
                None => false,
                Some(el) => self.is_displayed(&el).await?,
            };
            if !visible {
                return Ok(());
            }
            if start.elapsed() >= self.wait_timeout {
                return Err(Error::ElementNotReady {
                    locator: locator.to_string(),
                    state: ElementState::NotVisible.as_str().to_string(),
                    waited_ms: self.wait_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Element text content (waits for visibility first)
    pub async fn text(&self, locator: &Locator) -> Result<String> {
        let el = self.await_state(locator, ElementState::Visible).await?;
        let value = self.session.get(&format!("/element/{}/text", el.0)).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Current value of an input/textarea
    pub async fn value(&self, locator: &Locator) -> Result<String> {
        let el = self.await_state(locator, ElementState::Present).await?;
        let value = self
            .session
            .get(&format!("/element/{}/property/value", el.0))
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Attribute value, or None when the attribute is absent
    pub async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let el = self.await_state(locator, ElementState::Present).await?;
        let value = self
            .session
            .get(&format!("/element/{}/attribute/{}", el.0, name))
            .await?;
        Ok(value.as_str().map(String::from))
    }

    /// Visible label of the currently selected dropdown option
    pub async fn selected_label(&self, locator: &Locator) -> Result<String> {
        let el = self.await_state(locator, ElementState::Present).await?;
        let value = self
            .session
            .execute_on(
                "const s = arguments[0]; \
                 return s.selectedIndex >= 0 ? s.options[s.selectedIndex].text : '';",
                &el,
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().trim().to_string())
    }

    /// Whether a checkbox/radio/option is currently selected
    pub async fn is_selected(&self, locator: &Locator) -> Result<bool> {
        let el = self.await_state(locator, ElementState::Present).await?;
        let value = self
            .session
            .get(&format!("/element/{}/selected", el.0))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Whether the element is currently rendered
    pub async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        match self.session.find(locator).await? {
            None => Ok(false),
            Some(el) => self.is_displayed(&el).await,
        }
    }

    /// Whether the needle occurs anywhere in the rendered page
    pub async fn text_present(&self, needle: &str) -> Result<bool> {
        let source = self.session.page_source().await?;
        Ok(source.contains(needle))
    }

    async fn is_displayed(&self, el: &ElementRef) -> Result<bool> {
        let value = self
            .session
            .execute_on(
                "const e = arguments[0]; \
                 return !!(e.offsetWidth || e.offsetHeight || e.getClientRects().length);",
                el,
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Poll until the locator reaches the requested state, within the bound
    async fn await_state(&self, locator: &Locator, state: ElementState) -> Result<ElementRef> {
        let start = std::time::Instant::now();
        loop {
            if let Some(el) = self.session.find(locator).await? {
                let ready = match state {
                    ElementState::Present => true,
                    ElementState::Visible => self.is_displayed(&el).await?,
                    ElementState::Enabled => {
                        self.is_displayed(&el).await?
                            && self
                                .session
                                .get(&format!("/element/{}/enabled", el.0))
                                .await?
                                .as_bool()
                                .unwrap_or(false)
                    }
                    ElementState::NotVisible => !self.is_displayed(&el).await?,
                };
                if ready {
                    return Ok(el);
                }
            }
            if start.elapsed() >= self.wait_timeout {
                return Err(Error::ElementNotReady {
                    locator: locator.to_string(),
                    state: state.as_str().to_string(),
                    waited_ms: self.wait_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Quote a string as an XPath literal, handling embedded quotes
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn id_locator_escapes_css_metacharacters() {
        let (using, value) = Locator::Id("delay_flex_0_period".into()).strategy();
        assert_eq!(using, "css selector");
        assert_eq!(value, "#delay_flex_0_period");

        let (_, value) = Locator::Id("visible[type]".into()).strategy();
        assert_eq!(value, r"#visible\[type\]");
    }

    #[test]
    fn link_text_uses_native_strategy() {
        let (using, value) = Locator::LinkText("Discovery rules".into()).strategy();
        assert_eq!(using, "link text");
        assert_eq!(value, "Discovery rules");
    }

    #[test_case("plain", "'plain'"; "no quotes")]
    #[test_case("it's", "\"it's\""; "single quote")]
    #[test_case("say \"hi\"", "'say \"hi\"'"; "double quote")]
    fn xpath_literal_quotes_plain_strings(input: &str, expected: &str) {
        assert_eq!(xpath_literal(input), expected);
    }

    #[test]
    fn xpath_literal_concatenates_mixed_quotes() {
        assert!(xpath_literal(r#"both ' and ""#).starts_with("concat("));
    }

    #[test]
    fn locator_display_names_the_strategy() {
        assert_eq!(Locator::Id("name".into()).to_string(), "id=name");
        assert_eq!(
            Locator::LinkText("Items".into()).to_string(),
            "link=Items"
        );
    }
}

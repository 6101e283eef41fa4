//! Scenario runner
//!
//! Drives one fixed flow per data-provider row:
//! login → navigate → fill → submit → verify, then branches on the record's
//! expected outcome. Rows are isolated: an element or assertion failure fails
//! the row and the sweep moves on; a session failure aborts the sweep, since
//! nothing can run without one. Scenarios execute strictly sequentially
//! against the shared application instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::check::Verifier;
use crate::config::HarnessConfig;
use crate::driver::DriverHandle;
use crate::error::{Error, Result};
use crate::page::{Locator, Page};
use crate::record::{FieldValue, Outcome, SubRow, TestCase};
use crate::session::Session;
use crate::store::Store;
use crate::target::{bind, Control, FormTarget, RepeatSection};

/// Progress of one scenario through its fixed flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    LoggedIn,
    Navigated,
    FormFilled,
    Submitted,
    Verified,
    Failed,
}

/// Result of one scenario row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowResult {
    pub provider: String,
    pub row: usize,
    pub label: String,
    pub passed: bool,
    pub phase: Phase,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Result of a full sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
    pub rows: Vec<RowResult>,
}

impl SweepSummary {
    /// Aggregate per-row results into a summary
    pub fn from_rows(rows: Vec<RowResult>, duration_ms: u64) -> Self {
        let passed = rows.iter().filter(|r| r.passed).count();
        let failed = rows.len() - passed;
        Self {
            total: rows.len(),
            passed,
            failed,
            duration_ms,
            finished_at: Utc::now(),
            rows,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write the sweep results as a JSON artifact
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join("sweep-results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Which banner appeared after submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Banner {
    Good,
    Bad,
}

/// The scenario runner: one driver process, one backing store, many rows
pub struct ScenarioRunner {
    config: HarnessConfig,
    driver: DriverHandle,
    store: Store,
}

impl ScenarioRunner {
    /// Spawn the WebDriver server and open the backing store
    pub async fn start(config: HarnessConfig) -> Result<Self> {
        let driver = DriverHandle::spawn(config.driver.clone()).await?;
        let store = Store::open(&config.db_path)?;
        Ok(Self {
            config,
            driver,
            store,
        })
    }

    /// Run every row of one provider against one form target
    pub async fn run_provider(
        &self,
        target: &FormTarget,
        provider_name: &str,
        cases: &[TestCase],
        row_filter: Option<usize>,
    ) -> Result<SweepSummary> {
        let start = Instant::now();
        let mut rows = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!(
            "Running provider '{}' ({} row(s)) against {} form",
            provider_name,
            cases.len(),
            target.entity
        );

        for (index, case) in cases.iter().enumerate() {
            if let Some(only) = row_filter {
                if index != only {
                    continue;
                }
            }

            let result = self.run_case(target, provider_name, index, case).await?;
            if result.passed {
                passed += 1;
                info!("✓ [{}#{}] {} ({} ms)", provider_name, index, result.label, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ [{}#{}] {} - {}",
                    provider_name,
                    index,
                    result.label,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            rows.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Provider '{}': {} passed, {} failed ({} ms)",
            provider_name, passed, failed, duration_ms
        );

        Ok(SweepSummary::from_rows(rows, duration_ms))
    }

    /// Run one create-form scenario row
    ///
    /// Returns `Err` only for sweep-aborting failures (lost session, broken
    /// provider); row-scoped failures come back inside the `RowResult`.
    pub async fn run_case(
        &self,
        target: &FormTarget,
        provider: &str,
        row: usize,
        case: &TestCase,
    ) -> Result<RowResult> {
        let start = Instant::now();
        debug!("Running case '{}'", case.label);

        // Phase::NotStarted covers everything before a session exists; a
        // login failure aborts the sweep before any row is reported
        let session = self.open_session().await?;
        let mut phase = Phase::LoggedIn;

        let outcome = self.drive_case(&session, target, case, &mut phase).await;

        // Scoped release: the session is returned to the driver on both the
        // pass and the fail path before the row is reported.
        session.close().await;

        self.row_result(provider, row, &case.label, phase, outcome, start)
    }

    /// Open an existing entity, submit with zero edits, and prove the
    /// backing table is byte-identical afterwards.
    pub async fn run_noop_update(
        &self,
        target: &FormTarget,
        entity_name: &str,
    ) -> Result<RowResult> {
        let start = Instant::now();

        let session = self.open_session().await?;
        let mut phase = Phase::LoggedIn;

        let outcome = self
            .drive_noop_update(&session, target, entity_name, &mut phase)
            .await;
        session.close().await;

        self.row_result(
            "simple-update",
            0,
            &format!("no-op update of '{}'", entity_name),
            phase,
            outcome,
            start,
        )
    }

    /// Open an existing entity, cancel out, and prove nothing changed.
    pub async fn run_cancel(&self, target: &FormTarget, entity_name: &str) -> Result<RowResult> {
        let start = Instant::now();

        let session = self.open_session().await?;
        let mut phase = Phase::LoggedIn;

        let outcome = self
            .drive_cancel(&session, target, entity_name, &mut phase)
            .await;
        session.close().await;

        self.row_result(
            "cancel",
            0,
            &format!("cancel out of '{}'", entity_name),
            phase,
            outcome,
            start,
        )
    }

    fn row_result(
        &self,
        provider: &str,
        row: usize,
        label: &str,
        phase: Phase,
        outcome: Result<()>,
        start: Instant,
    ) -> Result<RowResult> {
        let duration_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(()) => Ok(RowResult {
                provider: provider.to_string(),
                row,
                label: label.to_string(),
                passed: true,
                phase: Phase::Verified,
                error: None,
                duration_ms,
            }),
            Err(e) if e.is_row_scoped() => Ok(RowResult {
                provider: provider.to_string(),
                row,
                label: label.to_string(),
                passed: false,
                phase,
                error: Some(e.to_string()),
                duration_ms,
            }),
            Err(e) => Err(e),
        }
    }

    /// Authenticate a fresh session; failures here abort the sweep
    async fn open_session(&self) -> Result<Session> {
        let session = Session::new(
            self.driver.base_url(),
            &self.config.base_url,
            self.config.driver.headless,
        )
        .await?;
        session
            .login("index.php", &self.config.credentials, self.config.wait_timeout)
            .await?;
        Ok(session)
    }

    async fn drive_case(
        &self,
        session: &Session,
        target: &FormTarget,
        case: &TestCase,
        phase: &mut Phase,
    ) -> Result<()> {
        let page = Page::new(session, self.config.wait_timeout);

        let before = self.store.snapshot(&target.queries.snapshot)?;
        let key_count_before = self.key_count(target, case)?;

        session.open(&target.list_path, self.config.wait_timeout).await?;
        page.click(&target.create_button).await?;
        *phase = Phase::Navigated;

        self.fill_form(&page, target, case).await?;
        *phase = Phase::FormFilled;

        // Identity as the UI holds it, so rows relying on form defaults are
        // verified against what was actually submitted
        let effective_name = self.read_identity(&page, target, &target.name_field).await?;
        let effective_key = match &target.key_field {
            Some(field) => Some(self.read_identity(&page, target, field).await?),
            None => None,
        };

        page.click(&target.commit_button).await?;
        *phase = Phase::Submitted;

        let banner = self.await_banner(&page, target).await?;
        let mut verifier = Verifier::new();

        match &case.outcome {
            Outcome::Good { message } => {
                if banner == Banner::Good {
                    let text = page.text(&target.good_banner).await?;
                    verifier.text_present("success banner", &text, message);

                    if case.checks.form_check {
                        self.form_check(&page, session, target, case, &effective_name)
                            .await?;
                        // form_check runs its own comparisons through the page;
                        // mismatches land in the same verifier below
                        self.form_check_values(&page, target, case, &mut verifier)
                            .await?;
                    }
                    if case.checks.db_check {
                        self.db_check(
                            target,
                            &effective_name,
                            effective_key.as_deref(),
                            &mut verifier,
                        )?;
                    }
                    if case.checks.remove {
                        self.delete_entity(&page, session, target, &effective_name, &mut verifier)
                            .await?;
                    }
                } else {
                    let text = page.text(&target.bad_banner).await.unwrap_or_default();
                    verifier.text_present(
                        "success banner",
                        &format!("failure banner shown instead: {}", text),
                        message,
                    );
                }
            }
            Outcome::Bad { header, details } => {
                if banner == Banner::Bad {
                    let text = page.text(&target.bad_banner).await?;
                    verifier.text_present("failure banner", &text, header);
                    let source = session.page_source().await?;
                    for detail in details {
                        verifier.text_present("error details", &source, detail);
                    }
                } else {
                    let text = page.text(&target.good_banner).await.unwrap_or_default();
                    verifier.text_present(
                        "failure banner",
                        &format!("success banner shown instead: {}", text),
                        header,
                    );
                }

                // A rejected submission must leave the backing store untouched
                let after = self.store.snapshot(&target.queries.snapshot)?;
                verifier.hash_unchanged(&target.queries.table, &before, &after);
                if let Some((query, count_before)) = key_count_before {
                    let count_after = self.store.row_count(&query)?;
                    verifier.row_count(&query, count_before, count_after);
                }
            }
        }

        verifier.finish()
    }

    /// Pre-submission row count for the record's key, when both the record
    /// and the target carry one
    fn key_count(&self, target: &FormTarget, case: &TestCase) -> Result<Option<(String, i64)>> {
        let (key_field, by_key) = match (&target.key_field, &target.queries.by_key) {
            (Some(f), Some(q)) => (f, q),
            _ => return Ok(None),
        };
        let key = match case.text_field(key_field) {
            Some(k) => k,
            None => return Ok(None),
        };
        let query = bind(by_key, "key", key);
        let count = self.store.row_count(&query)?;
        Ok(Some((query, count)))
    }

    async fn fill_form(&self, page: &Page<'_>, target: &FormTarget, case: &TestCase) -> Result<()> {
        for (field, value) in &case.fields {
            match (target.control(field)?, value) {
                (Control::Input(loc), FieldValue::Text(s)) => page.type_into(loc, s).await?,
                (Control::Input(loc), FieldValue::Overwrite(s)) => page.overwrite(loc, s).await?,
                (Control::Select(loc), FieldValue::Option(label)) => {
                    page.select_option(loc, label).await?
                }
                (Control::Checkbox(loc), FieldValue::Flag(on)) => {
                    page.toggle_checkbox(loc, *on).await?
                }
                (Control::Repeat(section), FieldValue::Rows(rows)) => {
                    self.fill_repeat(page, section, rows).await?
                }
                _ => {
                    return Err(Error::DataProvider(format!(
                        "field '{}' value does not fit its control on the {} form",
                        field, target.entity
                    )))
                }
            }
        }
        Ok(())
    }

    /// Apply repeatable sub-rows in list order. The row index advances with
    /// every add and is never reused; a remove-flagged row is undone right
    /// after being added, leaving the counter where the UI leaves it.
    async fn fill_repeat(
        &self,
        page: &Page<'_>,
        section: &RepeatSection,
        rows: &[SubRow],
    ) -> Result<()> {
        for (index, row) in rows.iter().enumerate() {
            for (column, template) in &section.columns {
                if let Some(value) = row.values.get(column) {
                    page.overwrite(&section.column_locator(template, index), value)
                        .await?;
                }
            }

            page.click(&section.add_button).await?;

            // The next row's controls appearing is the ready signal
            if let Some((_, first_template)) = section.columns.first() {
                page.wait_visible(&section.column_locator(first_template, index + 1))
                    .await?;
            }

            if row.remove {
                page.click(&section.remove_locator(index)).await?;
            }
        }
        Ok(())
    }

    async fn read_identity(
        &self,
        page: &Page<'_>,
        target: &FormTarget,
        field: &str,
    ) -> Result<String> {
        match target.control(field)? {
            Control::Input(loc) => page.value(loc).await,
            Control::Select(loc) => page.selected_label(loc).await,
            _ => Err(Error::DataProvider(format!(
                "identity field '{}' must be an input or a select",
                field
            ))),
        }
    }

    /// Wait until either banner renders; a single click was sent and no
    /// retry happens here
    async fn await_banner(&self, page: &Page<'_>, target: &FormTarget) -> Result<Banner> {
        let start = Instant::now();
        loop {
            if page.is_visible(&target.good_banner).await? {
                return Ok(Banner::Good);
            }
            if page.is_visible(&target.bad_banner).await? {
                return Ok(Banner::Bad);
            }
            if start.elapsed() >= self.config.wait_timeout {
                return Err(Error::Timeout("success or failure banner".to_string()));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Reopen the created entity from its list page
    async fn form_check(
        &self,
        page: &Page<'_>,
        session: &Session,
        target: &FormTarget,
        case: &TestCase,
        effective_name: &str,
    ) -> Result<()> {
        session.open(&target.list_path, self.config.wait_timeout).await?;
        let link = case
            .checks
            .db_name
            .clone()
            .unwrap_or_else(|| effective_name.to_string());
        page.click(&Locator::LinkText(link)).await?;

        if let Control::Input(loc) | Control::Select(loc) = target.control(&target.name_field)? {
            page.wait_visible(loc).await?;
        }
        Ok(())
    }

    /// Compare every submitted field against the reopened form, byte-for-byte
    async fn form_check_values(
        &self,
        page: &Page<'_>,
        target: &FormTarget,
        case: &TestCase,
        verifier: &mut Verifier,
    ) -> Result<()> {
        for (field, value) in &case.fields {
            match (target.control(field)?, value) {
                (Control::Input(loc), FieldValue::Text(expected))
                | (Control::Input(loc), FieldValue::Overwrite(expected)) => {
                    let actual = page.value(loc).await?;
                    verifier.value(&format!("round-trip of '{}'", field), expected, &actual);
                }
                (Control::Select(loc), FieldValue::Option(expected)) => {
                    let actual = page.selected_label(loc).await?;
                    verifier.selected(&loc.to_string(), expected, &actual);
                }
                (Control::Checkbox(loc), FieldValue::Flag(expected)) => {
                    let actual = page.is_selected(loc).await?;
                    if actual != *expected {
                        verifier.value(
                            &format!("round-trip of '{}'", field),
                            &expected.to_string(),
                            &actual.to_string(),
                        );
                    }
                }
                // Repeatable sections are not round-tripped; their persisted
                // effect is covered by the db checks
                (Control::Repeat(_), FieldValue::Rows(_)) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Exactly one backing row with a matching projection
    fn db_check(
        &self,
        target: &FormTarget,
        name: &str,
        key: Option<&str>,
        verifier: &mut Verifier,
    ) -> Result<()> {
        let query = bind(&target.queries.by_name, "name", name);
        let rows = self.store.rows(&query)?;
        verifier.row_count(&query, 1, rows.len() as i64);

        if let Some(row) = rows.first() {
            if let Some(stored_name) = row.first() {
                verifier.value("stored name", name, stored_name);
            }
            if let (Some(expected_key), Some(stored_key)) = (key, row.get(1)) {
                verifier.value("stored key", expected_key, stored_key);
            }
        }
        Ok(())
    }

    /// The follow-up delete flow: list page → row checkbox → mass delete →
    /// alert accept → banner → zero rows left
    async fn delete_entity(
        &self,
        page: &Page<'_>,
        session: &Session,
        target: &FormTarget,
        name: &str,
        verifier: &mut Verifier,
    ) -> Result<()> {
        let delete = target.delete.as_ref().ok_or_else(|| {
            Error::DataProvider(format!(
                "case requests removal but the {} target has no delete flow",
                target.entity
            ))
        })?;

        let id_query = bind(&target.queries.id_by_name, "name", name);
        let rows = self.store.rows(&id_query)?;
        let id = rows
            .first()
            .and_then(|r| r.first())
            .ok_or_else(|| Error::AssertionFailed(format!("no backing row to delete for '{}'", name)))?
            .clone();

        session.open(&target.list_path, self.config.wait_timeout).await?;
        page.toggle_checkbox(&delete.checkbox_locator(&id), true).await?;
        page.click(&delete.delete_button).await?;
        self.accept_alert(session).await?;

        page.wait_visible(&target.good_banner).await?;
        let text = page.text(&target.good_banner).await?;
        verifier.text_present("delete banner", &text, &delete.deleted_message);

        let count_query = bind(&target.queries.by_name, "name", name);
        let remaining = self.store.row_count(&count_query)?;
        verifier.row_count(&count_query, 0, remaining);
        Ok(())
    }

    /// The confirm dialog can lag the click; poll acceptance to the bound
    async fn accept_alert(&self, session: &Session) -> Result<()> {
        let start = Instant::now();
        loop {
            match session.accept_alert().await {
                Ok(()) => return Ok(()),
                Err(_) if start.elapsed() < self.config.wait_timeout => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                Err(_) => return Err(Error::Timeout("confirmation dialog".to_string())),
            }
        }
    }

    async fn drive_noop_update(
        &self,
        session: &Session,
        target: &FormTarget,
        entity_name: &str,
        phase: &mut Phase,
    ) -> Result<()> {
        let page = Page::new(session, self.config.wait_timeout);
        let before = self.store.snapshot(&target.queries.snapshot)?;

        session.open(&target.list_path, self.config.wait_timeout).await?;
        page.click(&Locator::LinkText(entity_name.to_string())).await?;
        page.wait_visible(&target.update_button).await?;
        *phase = Phase::Navigated;

        // Zero edits: FormFilled is reached by leaving every default alone
        *phase = Phase::FormFilled;
        page.click(&target.update_button).await?;
        *phase = Phase::Submitted;

        page.wait_visible(&target.good_banner).await?;
        let mut verifier = Verifier::new();
        let text = page.text(&target.good_banner).await?;
        verifier.text_present("update banner", &text, &target.updated_message);

        let source = session.page_source().await?;
        verifier.text_present("list page", &source, entity_name);

        let after = self.store.snapshot(&target.queries.snapshot)?;
        verifier.hash_unchanged(&target.queries.table, &before, &after);
        verifier.finish()
    }

    async fn drive_cancel(
        &self,
        session: &Session,
        target: &FormTarget,
        entity_name: &str,
        phase: &mut Phase,
    ) -> Result<()> {
        let page = Page::new(session, self.config.wait_timeout);
        let before = self.store.snapshot(&target.queries.snapshot)?;

        session.open(&target.list_path, self.config.wait_timeout).await?;
        page.click(&Locator::LinkText(entity_name.to_string())).await?;
        page.wait_visible(&target.cancel_button).await?;
        *phase = Phase::Navigated;

        page.click(&target.cancel_button).await?;
        *phase = Phase::Submitted;

        // Back on the list page, with nothing persisted
        page.wait_visible(&target.create_button).await?;
        let mut verifier = Verifier::new();
        let after = self.store.snapshot(&target.queries.snapshot)?;
        verifier.hash_unchanged(&target.queries.table, &before, &after);
        verifier.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&Phase::FormFilled).unwrap();
        assert_eq!(json, "\"form_filled\"");
    }

    fn row(label: &str, passed: bool) -> RowResult {
        RowResult {
            provider: "create".to_string(),
            row: 0,
            label: label.to_string(),
            passed,
            phase: if passed { Phase::Verified } else { Phase::Submitted },
            error: (!passed).then(|| "mismatch".to_string()),
            duration_ms: 5,
        }
    }

    #[test]
    fn summary_tracks_pass_fail_counts() {
        let summary = SweepSummary::from_rows(vec![row("a", true), row("b", false)], 10);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_passed());
    }

    #[test]
    fn results_artifact_lands_in_the_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let summary = SweepSummary::from_rows(vec![row("a", true)], 5);
        let path = summary.write(dir.path()).unwrap();
        assert!(path.ends_with("sweep-results.json"));

        let json = std::fs::read_to_string(path).unwrap();
        let parsed: SweepSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total, 1);
        assert!(parsed.all_passed());
    }
}

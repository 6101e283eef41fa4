//! Form target descriptions
//!
//! A `FormTarget` is everything the scenario runner needs to know about one
//! configuration form: where its list page lives, which locator each record
//! field maps to, where the banners render, and which backing-store queries
//! verify its side effects. Targets are declared once per entity by the
//! suite; the runner stays generic.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::page::Locator;

/// How a record field maps onto the form
#[derive(Debug, Clone)]
pub enum Control {
    /// Text input or textarea
    Input(Locator),
    /// Dropdown selected by visible label
    Select(Locator),
    /// Checkbox toggled to a requested state
    Checkbox(Locator),
    /// Repeatable sub-row section with auto-incrementing indices
    Repeat(RepeatSection),
}

/// A repeatable form section (flexible intervals, filter conditions)
///
/// Column and remove locators are id templates carrying `{i}`; the index
/// advances with every added row and is never reused, matching the UI's
/// own counter, so later rows may depend on the indices earlier ones left
/// behind.
#[derive(Debug, Clone)]
pub struct RepeatSection {
    /// Columns in fill order: (record column name, id template)
    pub columns: Vec<(String, String)>,
    /// Button that commits the current row and reveals the next index
    pub add_button: Locator,
    /// Id template for the per-row remove link
    pub remove_template: String,
}

impl RepeatSection {
    pub fn column_locator(&self, template: &str, index: usize) -> Locator {
        Locator::Id(template.replace("{i}", &index.to_string()))
    }

    pub fn remove_locator(&self, index: usize) -> Locator {
        Locator::Id(self.remove_template.replace("{i}", &index.to_string()))
    }
}

/// Backing-store queries for one entity
///
/// Queries carry `{name}`/`{key}`/`{id}` placeholders filled from the
/// record under test; values are SQL-quoted before substitution. The
/// snapshot query must be ordered.
#[derive(Debug, Clone)]
pub struct TableQueries {
    /// Human name for reporting ("items")
    pub table: String,
    /// Ordered full-table digest query for the hash guard
    pub snapshot: String,
    /// COUNT-compatible row query per entity name
    pub by_name: String,
    /// COUNT-compatible row query per entity key (duplicate-key guard)
    pub by_key: Option<String>,
    /// Single-id lookup for the delete flow
    pub id_by_name: String,
}

/// The delete flow for one entity's list page
#[derive(Debug, Clone)]
pub struct DeleteFlow {
    /// Checkbox id template carrying `{id}`
    pub checkbox_template: String,
    /// Mass-delete button on the list page
    pub delete_button: Locator,
    /// Success banner text after deletion
    pub deleted_message: String,
}

impl DeleteFlow {
    pub fn checkbox_locator(&self, id: &str) -> Locator {
        Locator::Id(self.checkbox_template.replace("{id}", id))
    }
}

/// One configuration form under test
#[derive(Debug, Clone)]
pub struct FormTarget {
    /// Entity name for reporting ("discovery rule")
    pub entity: String,
    /// Path of the entity list page, relative to the application base URL
    pub list_path: String,
    /// Button on the list page that opens the create form
    pub create_button: Locator,
    /// Commit button of the create form
    pub commit_button: Locator,
    /// Commit button of the update form
    pub update_button: Locator,
    /// Cancel button of the form
    pub cancel_button: Locator,
    /// Success banner region
    pub good_banner: Locator,
    /// Failure banner region (header plus error details)
    pub bad_banner: Locator,
    /// Banner text after a no-edit update
    pub updated_message: String,
    /// Record field name → form control
    pub controls: BTreeMap<String, Control>,
    /// The field whose value names the entity (list link text, DB name)
    pub name_field: String,
    /// The field holding the entity key, when the form has one
    pub key_field: Option<String>,
    /// Backing-store verification queries
    pub queries: TableQueries,
    /// Delete flow, when the suite exercises `remove`
    pub delete: Option<DeleteFlow>,
}

impl FormTarget {
    pub fn control(&self, field: &str) -> Result<&Control> {
        self.controls.get(field).ok_or_else(|| {
            Error::DataProvider(format!(
                "field '{}' has no control mapping on the {} form",
                field, self.entity
            ))
        })
    }
}

/// Fill a `{placeholder}` query template with a SQL-quoted value
pub fn bind(template: &str, placeholder: &str, value: &str) -> String {
    let quoted = value.replace('\'', "''");
    template.replace(&format!("{{{}}}", placeholder), &quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_section_indices_render_into_locators() {
        let section = RepeatSection {
            columns: vec![
                ("delay".into(), "delay_flex_{i}_delay".into()),
                ("period".into(), "delay_flex_{i}_period".into()),
            ],
            add_button: Locator::Id("interval_add".into()),
            remove_template: "delay_flex_{i}_remove".into(),
        };
        assert_eq!(
            section.column_locator("delay_flex_{i}_period", 2),
            Locator::Id("delay_flex_2_period".into())
        );
        assert_eq!(
            section.remove_locator(0),
            Locator::Id("delay_flex_0_remove".into())
        );
    }

    #[test]
    fn bind_quotes_sql_values() {
        let sql = bind(
            "SELECT * FROM items WHERE name = '{name}'",
            "name",
            "O'Brien",
        );
        assert_eq!(sql, "SELECT * FROM items WHERE name = 'O''Brien'");
    }
}

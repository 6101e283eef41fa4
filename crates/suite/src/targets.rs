//! Form targets for the monitored application's configuration pages
//!
//! Locator ids, banner regions, and backing-table queries for each entity
//! the suite exercises. The host context is passed in explicitly; nothing
//! here reads ambient state.

use std::collections::BTreeMap;

use webcheck_harness::{
    Control, DeleteFlow, FormTarget, Locator, RepeatSection, TableQueries,
};

/// The test host every scenario runs against, seeded in the application's
/// test data set
#[derive(Debug, Clone)]
pub struct HostContext {
    pub name: String,
    pub id: i64,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            name: "Simple form test host".to_string(),
            id: 40001,
        }
    }
}

/// The discovery-rule configuration form
pub fn discovery_rule(host: &HostContext) -> FormTarget {
    let mut controls = BTreeMap::new();
    controls.insert("name".into(), Control::Input(Locator::Id("name".into())));
    controls.insert("key".into(), Control::Input(Locator::Id("key".into())));
    controls.insert("type".into(), Control::Select(Locator::Id("type".into())));
    controls.insert("delay".into(), Control::Input(Locator::Id("delay".into())));
    controls.insert(
        "lifetime".into(),
        Control::Input(Locator::Id("lifetime".into())),
    );
    controls.insert(
        "username".into(),
        Control::Input(Locator::Id("username".into())),
    );
    controls.insert(
        "ipmi_sensor".into(),
        Control::Input(Locator::Id("ipmi_sensor".into())),
    );
    controls.insert(
        "params_es".into(),
        Control::Input(Locator::Id("params_es".into())),
    );
    controls.insert(
        "authtype".into(),
        Control::Select(Locator::Id("authtype".into())),
    );
    controls.insert(
        "snmpv3_securitylevel".into(),
        Control::Select(Locator::Id("snmpv3_securitylevel".into())),
    );
    controls.insert(
        "enabled".into(),
        Control::Checkbox(Locator::Id("status".into())),
    );
    controls.insert(
        "flex_intervals".into(),
        Control::Repeat(RepeatSection {
            columns: vec![
                ("delay".into(), "delay_flex_{i}_delay".into()),
                ("period".into(), "delay_flex_{i}_period".into()),
            ],
            add_button: Locator::Id("interval_add".into()),
            remove_template: "delay_flex_{i}_remove".into(),
        }),
    );

    FormTarget {
        entity: "discovery rule".into(),
        list_path: format!("host_discovery.php?hostid={}", host.id),
        create_button: Locator::XPath(
            "//button[normalize-space(.)='Create discovery rule']".into(),
        ),
        commit_button: Locator::Id("add".into()),
        update_button: Locator::Id("update".into()),
        cancel_button: Locator::Id("cancel".into()),
        good_banner: Locator::Css(".msg-good".into()),
        bad_banner: Locator::Css(".msg-bad".into()),
        updated_message: "Discovery rule updated".into(),
        controls,
        name_field: "name".into(),
        key_field: Some("key".into()),
        queries: TableQueries {
            table: "items".into(),
            snapshot: "SELECT itemid, hostid, name, key_, delay FROM items ORDER BY itemid"
                .into(),
            by_name: format!(
                "SELECT name, key_ FROM items WHERE name = '{{name}}' AND hostid = {}",
                host.id
            ),
            by_key: Some(format!(
                "SELECT itemid FROM items WHERE key_ = '{{key}}' AND hostid = {}",
                host.id
            )),
            id_by_name: format!(
                "SELECT itemid FROM items WHERE name = '{{name}}' AND hostid = {}",
                host.id
            ),
        },
        delete: Some(DeleteFlow {
            checkbox_template: "g_hostdruleid_{id}".into(),
            delete_button: Locator::Css("button[value='discoveryrule.massdelete']".into()),
            deleted_message: "Discovery rules deleted".into(),
        }),
    }
}

/// The graph-prototype form under one discovery rule
pub fn graph_prototype(parent_discovery_id: i64) -> FormTarget {
    let mut controls = BTreeMap::new();
    controls.insert("name".into(), Control::Input(Locator::Id("name".into())));
    controls.insert(
        "width".into(),
        Control::Input(Locator::Id("width".into())),
    );
    controls.insert(
        "height".into(),
        Control::Input(Locator::Id("height".into())),
    );
    controls.insert(
        "graphtype".into(),
        Control::Select(Locator::Id("graphtype".into())),
    );

    FormTarget {
        entity: "graph prototype".into(),
        list_path: format!("graphs.php?parent_discoveryid={}", parent_discovery_id),
        create_button: Locator::XPath(
            "//button[normalize-space(.)='Create graph prototype']".into(),
        ),
        commit_button: Locator::Id("add".into()),
        update_button: Locator::Id("update".into()),
        cancel_button: Locator::Id("cancel".into()),
        good_banner: Locator::Css(".msg-good".into()),
        bad_banner: Locator::Css(".msg-bad".into()),
        updated_message: "Graph prototype updated".into(),
        controls,
        name_field: "name".into(),
        key_field: None,
        queries: TableQueries {
            table: "graphs".into(),
            snapshot: "SELECT graphid, name, width, height, graphtype FROM graphs ORDER BY graphid"
                .into(),
            by_name: "SELECT name FROM graphs WHERE name = '{name}'".into(),
            by_key: None,
            id_by_name: "SELECT graphid FROM graphs WHERE name = '{name}'".into(),
        },
        delete: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webcheck_harness::target::bind;

    #[test]
    fn discovery_target_maps_the_fields_the_providers_use() {
        let target = discovery_rule(&HostContext::default());
        for field in [
            "name",
            "key",
            "type",
            "delay",
            "lifetime",
            "username",
            "ipmi_sensor",
            "params_es",
            "flex_intervals",
        ] {
            assert!(target.control(field).is_ok(), "unmapped field {}", field);
        }
        assert_eq!(target.name_field, "name");
        assert_eq!(target.key_field.as_deref(), Some("key"));
    }

    #[test]
    fn queries_bind_the_host_context() {
        let host = HostContext {
            name: "other host".into(),
            id: 50002,
        };
        let target = discovery_rule(&host);
        let query = bind(&target.queries.by_name, "name", "discoveryRuleNo1");
        assert!(query.contains("hostid = 50002"));
        assert!(query.contains("'discoveryRuleNo1'"));
    }
}

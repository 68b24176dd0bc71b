use trellis::model::{
    Aggregation, ConfigBundle, DiscoveredTable, FieldMetadata, Filter, FilterOperator,
    ModelConfiguration, PivotZone, SemanticType,
};
use trellis::state::{reconcile, reduce, Action, EngineState};

fn model(tables: &[(&str, &[&str])]) -> ModelConfiguration {
    let mut m = ModelConfiguration::new();
    for (table, fields) in tables {
        m.insert_table(table, fields.iter().map(|f| f.to_string()).collect());
    }
    m
}

fn demo_state() -> EngineState {
    let mut state = EngineState::new();
    state.discovered_tables = vec![
        DiscoveredTable::new("customer", &["customer_id", "name"]),
        DiscoveredTable::new("film", &["film_id", "title"]),
    ];
    state = reduce(state, Action::SelectTable("customer".into()));
    state = reduce(state, Action::SelectTable("film".into()));
    state = reduce(
        state,
        Action::SetJoins(vec![serde_json::from_str(
            r#"{"from":"customer","to":"film","type":"INNER JOIN","on":{"from":"film_id","to":"film_id"}}"#,
        )
        .unwrap()]),
    );
    state
}

#[test]
fn test_select_table_takes_all_discovered_fields() {
    let state = demo_state();
    assert_eq!(
        state.model_configuration.fields("customer").unwrap(),
        &["customer_id".to_string(), "name".to_string()]
    );
    assert!(state.is_model_dirty);
}

#[test]
fn test_removing_a_table_prunes_pivot_rows() {
    let mut state = demo_state();
    state.pivot_config.rows = vec!["customer.name".into(), "film.title".into()];

    let state = reduce(state, Action::DeselectTable("customer".into()));

    assert_eq!(state.pivot_config.rows, vec!["film.title".to_string()]);
}

#[test]
fn test_removing_a_table_prunes_its_joins() {
    let state = demo_state();
    assert_eq!(state.joins.len(), 1);

    let state = reduce(state, Action::DeselectTable("film".into()));
    assert!(state.joins.is_empty());
}

#[test]
fn test_removing_a_table_prunes_filters_and_field_lists() {
    let mut state = demo_state();
    state.filters = vec![Filter::new("name", FilterOperator::Equals, "SMITH")];
    state.selected_fields = vec!["name".into(), "title".into()];
    state.analysis_active_fields = vec!["name".into()];

    let state = reduce(state, Action::DeselectTable("customer".into()));

    assert!(state.filters.is_empty());
    assert_eq!(state.selected_fields, vec!["title".to_string()]);
    assert!(state.analysis_active_fields.is_empty());
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut state = demo_state();
    state.pivot_config.rows = vec!["name".into(), "ghost".into()];
    state.filters = vec![Filter::new("ghost", FilterOperator::Equals, "x")];

    let once = reconcile(state);
    let twice = reconcile(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_removing_a_table_only_shrinks_derived_state() {
    let mut state = demo_state();
    state.pivot_config.rows = vec!["name".into(), "title".into()];
    state.pivot_config.values = vec![serde_json::from_str(
        r#"{"field":"title","aggregation":"COUNT"}"#,
    )
    .unwrap()];
    state.filters = vec![Filter::new("title", FilterOperator::Contains, "matrix")];

    let before = state.clone();
    let after = reduce(state, Action::DeselectTable("customer".into()));

    assert!(after.pivot_config.rows.len() <= before.pivot_config.rows.len());
    assert!(after.pivot_config.columns.len() <= before.pivot_config.columns.len());
    assert!(after.pivot_config.values.len() <= before.pivot_config.values.len());
    assert!(after.filters.len() <= before.filters.len());
    assert!(after.analysis_active_fields.len() <= before.analysis_active_fields.len());
}

#[test]
fn test_alias_edits_never_trigger_cleanup() {
    let mut state = demo_state();
    // An out-of-model pivot row would be removed by reconciliation; alias
    // edits must leave it alone.
    state.pivot_config.rows = vec!["ghost".into()];

    let state = reduce(
        state,
        Action::SetFieldAlias {
            field_key: "customer.name".into(),
            alias: "Customer Name".into(),
        },
    );

    assert_eq!(state.pivot_config.rows, vec!["ghost".to_string()]);
    assert_eq!(
        state.field_aliases.get("customer.name").map(String::as_str),
        Some("Customer Name")
    );
}

#[test]
fn test_confirm_model_lifecycle() {
    let mut state = demo_state();
    assert!(state.is_model_dirty);
    assert!(state.available_fields().is_empty());

    state = reduce(state, Action::ConfirmModel);
    assert!(!state.is_model_dirty);
    assert_eq!(state.confirmed_model_configuration, state.model_configuration);
    assert!(state
        .available_fields()
        .contains(&"customer.name".to_string()));

    // Further draft edits re-dirty the model but leave available fields
    // (derived from confirmed) untouched.
    state = reduce(state, Action::DeselectTable("customer".into()));
    assert!(state.is_model_dirty);
    assert!(state
        .available_fields()
        .contains(&"customer.name".to_string()));
}

#[test]
fn test_move_pivot_field_is_zone_exclusive() {
    let mut state = demo_state();
    state = reduce(
        state,
        Action::MovePivotField {
            field: "name".into(),
            zone: PivotZone::Rows,
        },
    );
    assert_eq!(state.pivot_config.rows, vec!["name".to_string()]);

    state = reduce(
        state,
        Action::MovePivotField {
            field: "name".into(),
            zone: PivotZone::Columns,
        },
    );
    assert!(state.pivot_config.rows.is_empty());
    assert_eq!(state.pivot_config.columns, vec!["name".to_string()]);

    state = reduce(
        state,
        Action::MovePivotField {
            field: "name".into(),
            zone: PivotZone::Values,
        },
    );
    assert!(state.pivot_config.columns.is_empty());
    assert_eq!(state.pivot_config.values.len(), 1);
}

#[test]
fn test_move_to_values_infers_default_aggregation() {
    let mut state = demo_state();
    state = reduce(
        state,
        Action::SetTableFields {
            table: "film".into(),
            fields: vec!["title".into(), "replacement_cost".into()],
        },
    );

    let state = reduce(
        state,
        Action::MovePivotField {
            field: "replacement_cost".into(),
            zone: PivotZone::Values,
        },
    );
    assert_eq!(state.pivot_config.values[0].aggregation, Aggregation::Sum);

    let state = reduce(
        state,
        Action::MovePivotField {
            field: "title".into(),
            zone: PivotZone::Values,
        },
    );
    assert_eq!(state.pivot_config.values[1].aggregation, Aggregation::Count);
}

#[test]
fn test_explicit_metadata_overrides_name_inference() {
    let mut state = demo_state();
    state = reduce(
        state,
        Action::SetFieldMetadata {
            field_key: "customer.name".into(),
            metadata: FieldMetadata {
                description: None,
                data_type: Some(SemanticType::Measure),
            },
        },
    );

    let state = reduce(
        state,
        Action::MovePivotField {
            field: "name".into(),
            zone: PivotZone::Values,
        },
    );
    assert_eq!(state.pivot_config.values[0].aggregation, Aggregation::Sum);
}

#[test]
fn test_move_pivot_field_auto_selects() {
    let state = demo_state();
    assert!(!state.selected_fields.contains(&"title".to_string()));
    let state = reduce(
        state,
        Action::MovePivotField {
            field: "title".into(),
            zone: PivotZone::Rows,
        },
    );
    assert!(state.selected_fields.contains(&"title".to_string()));
}

#[test]
fn test_add_filter_replaces_same_field_keeping_id() {
    let mut state = demo_state();
    let first = Filter::new("name", FilterOperator::Equals, "SMITH");
    let original_id = first.id.clone();
    state = reduce(state, Action::AddFilter(first));

    let state = reduce(
        state,
        Action::AddFilter(Filter::new("name", FilterOperator::Contains, "SMI")),
    );

    assert_eq!(state.filters.len(), 1);
    assert_eq!(state.filters[0].id, original_id);
    assert_eq!(state.filters[0].operator, FilterOperator::Contains);
}

#[test]
fn test_values_referencing_metrics_survive_cleanup() {
    let mut state = demo_state();
    state = reduce(
        state,
        Action::SetMetrics(vec![serde_json::from_str(
            r#"{"id":"m_total","name":"Total","formula":"COUNT(*)"}"#,
        )
        .unwrap()]),
    );
    state.pivot_config.values = vec![
        serde_json::from_str(r#"{"field":"m_total","aggregation":"SUM"}"#).unwrap(),
        serde_json::from_str(r#"{"field":"ghost","aggregation":"SUM"}"#).unwrap(),
    ];

    let state = reconcile(state);
    assert_eq!(state.pivot_config.values.len(), 1);
    assert_eq!(state.pivot_config.values[0].field, "m_total");
}

#[test]
fn test_load_bundle_reconciles_untrusted_config() {
    let bundle: ConfigBundle = serde_json::from_str(
        r#"{
            "configName": "loaded",
            "modelConfiguration": {"film": ["film_id", "title"]},
            "pivotConfig": {"rows": ["title", "bogus"], "columns": [], "values": []},
            "filters": [{"id":"1","field":"nope","operator":"equals","value":"x"}],
            "joins": [{"from":"film","to":"ghost","type":"LEFT JOIN","on":{"from":"a","to":"b"}}]
        }"#,
    )
    .unwrap();

    let state = reduce(EngineState::new(), Action::LoadBundle(bundle));

    assert_eq!(state.config_name, "loaded");
    assert_eq!(state.pivot_config.rows, vec!["title".to_string()]);
    assert!(state.filters.is_empty());
    assert!(state.joins.is_empty());
    // Loads always start clean.
    assert!(!state.is_model_dirty);
}

#[test]
fn test_load_bundle_keeps_absent_sections() {
    let mut state = demo_state();
    state.config_name = "original".into();
    let state = reduce(
        state,
        Action::LoadBundle(serde_json::from_str(r#"{"selectedFields": []}"#).unwrap()),
    );
    assert_eq!(state.config_name, "original");
    assert!(state.model_configuration.contains_table("customer"));
}

#[test]
fn test_reset_restores_initial_state() {
    let state = reduce(demo_state(), Action::Reset);
    assert_eq!(state, EngineState::new());
}

#[test]
fn test_replace_model_reconciles() {
    let mut state = demo_state();
    state.pivot_config.rows = vec!["name".into(), "title".into()];

    let state = reduce(
        state,
        Action::SetModelConfiguration(model(&[("film", &["film_id", "title"])])),
    );

    assert_eq!(state.pivot_config.rows, vec!["title".to_string()]);
    assert!(state.is_model_dirty);
}

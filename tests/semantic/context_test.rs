use std::collections::BTreeMap;

use trellis::model::{FieldMetadata, Join, Metric, ModelConfiguration, SchemaRegistry};
use trellis::semantic::context::{build_semantic_context, estimate_tokens, ContextInput};

fn model() -> ModelConfiguration {
    let mut m = ModelConfiguration::new();
    m.insert_table("film", vec!["film_id".into(), "title".into(), "rating".into()]);
    m.insert_table("rental", vec!["rental_id".into()]);
    m
}

fn joins() -> Vec<Join> {
    vec![serde_json::from_str(
        r#"{"from":"rental","to":"film","type":"LEFT JOIN","on":{"from":"inventory_id","to":"film_id"}}"#,
    )
    .unwrap()]
}

fn base_input<'a>(model: &'a ModelConfiguration, joins: &'a [Join]) -> ContextInput<'a> {
    ContextInput {
        model,
        joins,
        field_metadata: None,
        metrics: None,
        registry: None,
        sample_values: None,
        max_chars: None,
    }
}

#[test]
fn test_tier1_lists_model_and_joins() {
    let model = model();
    let joins = joins();
    let context = build_semantic_context(&base_input(&model, &joins));

    assert!(context.starts_with("# SEMANTIC CONTEXT"));
    assert!(context.contains("## ACTIVE MODEL"));
    assert!(context.contains("- **film**: film_id, title, rating"));
    assert!(context.contains("- rental LEFT JOIN film ON inventory_id = film_id"));
}

#[test]
fn test_empty_model_still_produces_tier1() {
    let model = ModelConfiguration::new();
    let context = build_semantic_context(&base_input(&model, &[]));
    assert!(context.contains("No tables selected."));
}

#[test]
fn test_metadata_tier_filters_to_model_fields() {
    let model = model();
    let mut metadata = BTreeMap::new();
    metadata.insert(
        "film.title".to_string(),
        FieldMetadata {
            description: Some("Film title".into()),
            data_type: None,
        },
    );
    metadata.insert(
        "store.address".to_string(),
        FieldMetadata {
            description: Some("Should not appear".into()),
            data_type: None,
        },
    );

    let mut input = base_input(&model, &[]);
    input.field_metadata = Some(&metadata);
    let context = build_semantic_context(&input);

    assert!(context.contains("## FIELD METADATA"));
    assert!(context.contains("film.title"));
    assert!(!context.contains("store.address"));
}

#[test]
fn test_registry_tier_lists_only_tables_outside_the_model() {
    let model = model();
    let registry: SchemaRegistry = serde_json::from_str(
        r#"{"tables":[
            {"name":"film","columns":[]},
            {"name":"customer","columns":[
                {"name":"store_id","foreignKey":{"table":"store","column":"store_id"}}
            ]}
        ]}"#,
    )
    .unwrap();

    let mut input = base_input(&model, &[]);
    input.registry = Some(&registry);
    let context = build_semantic_context(&input);

    assert!(context.contains("## OTHER AVAILABLE TABLES"));
    assert!(context.contains("- **customer**"));
    assert!(context.contains("store_id -> store.store_id"));
    // film is in the model, so the registry tier must not list it.
    assert!(!context.contains("- **film** ("));
    let registry_section = context.split("## OTHER AVAILABLE TABLES").nth(1).unwrap();
    assert!(!registry_section.contains("**film**"));
}

#[test]
fn test_sample_values_are_capped_at_five() {
    let model = model();
    let mut samples = BTreeMap::new();
    samples.insert(
        "film.rating".to_string(),
        vec!["G", "PG", "PG-13", "R", "NC-17", "X"]
            .into_iter()
            .map(String::from)
            .collect(),
    );

    let mut input = base_input(&model, &[]);
    input.sample_values = Some(&samples);
    let context = build_semantic_context(&input);

    assert!(context.contains("## SAMPLE VALUES"));
    assert!(context.contains("G, PG, PG-13, R, NC-17"));
    assert!(!context.contains("NC-17, X"));
}

#[test]
fn test_lower_tiers_are_dropped_whole_under_budget() {
    let model = model();
    let metrics: Vec<Metric> = vec![serde_json::from_str(
        r#"{"id":"m1","name":"Total Rentals","formula":"COUNT(rental_id)"}"#,
    )
    .unwrap()];

    let mut input = base_input(&model, &[]);
    input.metrics = Some(&metrics);

    // Generous budget: the metrics tier fits.
    let full = build_semantic_context(&input);
    assert!(full.contains("## AVAILABLE METRICS"));

    // Budget that covers tier 1 but not tier 3: tier 3 disappears entirely,
    // with no partial rendering.
    let mut tight = input.clone();
    let tier1_len = build_semantic_context(&base_input(&model, &[])).len();
    tight.max_chars = Some(tier1_len + 10);
    let clipped = build_semantic_context(&tight);
    assert!(clipped.contains("## ACTIVE MODEL"));
    assert!(!clipped.contains("AVAILABLE METRICS"));
    assert!(!clipped.contains("Total Rentals"));
}

#[test]
fn test_tier1_is_hard_truncated_when_alone_it_overflows() {
    let model = model();
    let mut input = base_input(&model, &[]);
    input.max_chars = Some(40);
    let context = build_semantic_context(&input);
    assert!(context.len() <= 40);
    assert!(context.starts_with("# SEMANTIC CONTEXT"));
}

#[test]
fn test_estimate_tokens() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abcd"), 1);
    assert_eq!(estimate_tokens("abcde"), 2);
}

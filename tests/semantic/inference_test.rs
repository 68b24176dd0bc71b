use trellis::model::{Aggregation, SemanticType};
use trellis::semantic::inference::{default_aggregation, infer_semantic_type};

#[test]
fn test_measure_vocabulary() {
    assert_eq!(infer_semantic_type("amount"), SemanticType::Measure);
    assert_eq!(infer_semantic_type("unit_price"), SemanticType::Measure);
    assert_eq!(infer_semantic_type("shipping_cost"), SemanticType::Measure);
    assert_eq!(infer_semantic_type("total_jobs"), SemanticType::Measure);
    assert_eq!(infer_semantic_type("REVENUE"), SemanticType::Measure);
}

#[test]
fn test_identifier_shapes() {
    assert_eq!(infer_semantic_type("id"), SemanticType::Identifier);
    assert_eq!(infer_semantic_type("customer_id"), SemanticType::Identifier);
    assert_eq!(infer_semantic_type("Customer_ID"), SemanticType::Identifier);
    assert_eq!(infer_semantic_type("surrogate_key"), SemanticType::Identifier);
    assert_eq!(infer_semantic_type("row_uuid"), SemanticType::Identifier);
}

#[test]
fn test_date_shapes() {
    assert_eq!(infer_semantic_type("order_date"), SemanticType::Date);
    assert_eq!(infer_semantic_type("created_at"), SemanticType::Date);
    assert_eq!(infer_semantic_type("fiscal_year"), SemanticType::Date);
    assert_eq!(infer_semantic_type("position_month"), SemanticType::Date);
    assert_eq!(infer_semantic_type("timestamp"), SemanticType::Date);
}

#[test]
fn test_dimension_fallback() {
    assert_eq!(infer_semantic_type("language"), SemanticType::Dimension);
    assert_eq!(infer_semantic_type("rating"), SemanticType::Dimension);
    assert_eq!(infer_semantic_type("country_name"), SemanticType::Dimension);
    assert_eq!(infer_semantic_type(""), SemanticType::Dimension);
}

#[test]
fn test_precedence_identifier_over_measure() {
    // "_id" suffix wins over the measure stem.
    assert_eq!(infer_semantic_type("price_id"), SemanticType::Identifier);
    // date wins over measure when both match.
    assert_eq!(infer_semantic_type("total_date"), SemanticType::Date);
}

#[test]
fn test_qualified_names_use_bare_part() {
    assert_eq!(infer_semantic_type("payment.amount"), SemanticType::Measure);
    assert_eq!(infer_semantic_type("film.rating"), SemanticType::Dimension);
}

#[test]
fn test_is_total_and_deterministic() {
    for name in ["x", "weird-name!", "ñ", "123", "a.b.c"] {
        let first = infer_semantic_type(name);
        let second = infer_semantic_type(name);
        assert_eq!(first, second);
    }
}

#[test]
fn test_default_aggregation_follows_type() {
    assert_eq!(default_aggregation(SemanticType::Measure), Aggregation::Sum);
    assert_eq!(default_aggregation(SemanticType::Dimension), Aggregation::Count);
    assert_eq!(default_aggregation(SemanticType::Identifier), Aggregation::Count);
    assert_eq!(default_aggregation(SemanticType::Date), Aggregation::Count);
}

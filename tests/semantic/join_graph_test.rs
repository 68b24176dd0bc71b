use std::collections::BTreeMap;

use trellis::model::{Join, ModelConfiguration};
use trellis::semantic::join_graph::{
    choose_driving_table, resolve_join_plan, JoinGraphError,
};

fn model(tables: &[(&str, &[&str])]) -> ModelConfiguration {
    let mut m = ModelConfiguration::new();
    for (table, fields) in tables {
        m.insert_table(table, fields.iter().map(|f| f.to_string()).collect());
    }
    m
}

fn join(from: &str, to: &str, on_from: &str, on_to: &str) -> Join {
    serde_json::from_str(&format!(
        r#"{{"from":"{from}","to":"{to}","type":"LEFT JOIN","on":{{"from":"{on_from}","to":"{on_to}"}}}}"#
    ))
    .unwrap()
}

fn referenced(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
    entries
        .iter()
        .map(|(t, n)| (t.to_string(), *n))
        .collect()
}

#[test]
fn test_single_table_needs_no_joins() {
    let m = model(&[("film", &["title"])]);
    let plan = resolve_join_plan(&m, &[], &referenced(&[("film", 2)])).unwrap();
    assert_eq!(plan.driving_table, "film");
    assert!(plan.steps.is_empty());
}

#[test]
fn test_two_tables_one_join() {
    let m = model(&[
        ("rental", &["rental_id", "customer_id"]),
        ("film", &["film_id", "title"]),
    ]);
    let joins = vec![join("rental", "film", "inventory_id", "film_id")];
    let plan =
        resolve_join_plan(&m, &joins, &referenced(&[("film", 1), ("rental", 1)])).unwrap();

    // Tie on referenced-field count breaks lexicographically.
    assert_eq!(plan.driving_table, "film");
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].joined_table, "rental");
    assert_eq!(plan.steps[0].join.on.from, "inventory_id");
}

#[test]
fn test_driving_table_owns_most_referenced_fields() {
    assert_eq!(
        choose_driving_table(&referenced(&[("film", 1), ("rental", 3)])),
        Some("rental")
    );
    assert_eq!(
        choose_driving_table(&referenced(&[("b", 2), ("a", 2)])),
        Some("a")
    );
    assert_eq!(choose_driving_table(&BTreeMap::new()), None);
}

#[test]
fn test_unreachable_table_is_fatal() {
    let m = model(&[("film", &["title"]), ("payment", &["amount"])]);
    let result = resolve_join_plan(&m, &[], &referenced(&[("film", 1), ("payment", 1)]));
    assert_eq!(
        result,
        Err(JoinGraphError::UnreachableTable {
            table: "payment".to_string(),
            driving_table: "film".to_string(),
        })
    );
}

#[test]
fn test_first_declared_join_wins() {
    let m = model(&[("a", &["x"]), ("b", &["y"]), ("c", &["z"])]);
    // Two declared ways to reach c from a; the first must be used.
    let joins = vec![
        join("a", "c", "c_id", "id"),
        join("b", "c", "c_id2", "id"),
        join("a", "b", "b_id", "id"),
    ];
    let plan = resolve_join_plan(
        &m,
        &joins,
        &referenced(&[("a", 2), ("b", 1), ("c", 1)]),
    )
    .unwrap();

    assert_eq!(plan.driving_table, "a");
    let to_c = plan
        .steps
        .iter()
        .find(|s| s.joined_table == "c")
        .expect("c joined");
    assert_eq!(to_c.join.on.from, "c_id");
}

#[test]
fn test_intermediate_table_kept_on_path() {
    // a - b - c, with only a and c referenced: b must still be joined.
    let m = model(&[("a", &["x"]), ("b", &["y"]), ("c", &["z"])]);
    let joins = vec![join("a", "b", "b_id", "id"), join("b", "c", "c_id", "id")];
    let plan = resolve_join_plan(&m, &joins, &referenced(&[("a", 2), ("c", 1)])).unwrap();

    let joined: Vec<&str> = plan.steps.iter().map(|s| s.joined_table.as_str()).collect();
    assert_eq!(joined, vec!["b", "c"]);
}

#[test]
fn test_unreferenced_branch_is_pruned() {
    // a joins both b and c but only b is referenced: c stays out.
    let m = model(&[("a", &["x"]), ("b", &["y"]), ("c", &["z"])]);
    let joins = vec![join("a", "b", "b_id", "id"), join("a", "c", "c_id", "id")];
    let plan = resolve_join_plan(&m, &joins, &referenced(&[("a", 1), ("b", 1)])).unwrap();

    let joined: Vec<&str> = plan.steps.iter().map(|s| s.joined_table.as_str()).collect();
    assert_eq!(joined, vec!["b"]);
}

#[test]
fn test_joins_outside_the_model_are_ignored() {
    let m = model(&[("a", &["x"]), ("b", &["y"])]);
    let joins = vec![
        join("a", "ghost", "g_id", "id"),
        join("a", "b", "b_id", "id"),
    ];
    let plan = resolve_join_plan(&m, &joins, &referenced(&[("a", 1), ("b", 1)])).unwrap();
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].joined_table, "b");
}

#[test]
fn test_reachability_is_direction_agnostic() {
    // Join declared b -> a, query drives from a: still connects.
    let m = model(&[("a", &["x", "y"]), ("b", &["z"])]);
    let joins = vec![join("b", "a", "a_id", "id")];
    let plan = resolve_join_plan(&m, &joins, &referenced(&[("a", 2), ("b", 1)])).unwrap();
    assert_eq!(plan.driving_table, "a");
    assert_eq!(plan.steps[0].joined_table, "b");
    // The ON clause keeps the declared orientation.
    assert_eq!(plan.steps[0].join.from, "b");
}

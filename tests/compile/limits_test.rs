use trellis::compile::{
    compile, enforce_row_cap, CompileMode, CompileOptions, DEFAULT_PIVOT_ROW_LIMIT,
    DEFAULT_PREVIEW_ROW_LIMIT,
};
use trellis::model::DiscoveredTable;
use trellis::state::{reduce, Action, EngineState};

fn state() -> EngineState {
    let mut state = EngineState::new();
    state.discovered_tables = vec![DiscoveredTable::new("film", &["film_id", "title"])];
    state = reduce(state, Action::SelectTable("film".into()));
    reduce(
        state,
        Action::SetPivotConfig(
            serde_json::from_str(
                r#"{"rows": ["title"], "columns": [],
                    "values": [{"field": "film_id", "aggregation": "COUNT"}]}"#,
            )
            .unwrap(),
        ),
    )
}

#[test]
fn test_mode_default_row_caps() {
    let state = state();

    let pivot = compile(&state.compile_input(), &CompileOptions::default())
        .unwrap()
        .unwrap();
    assert!(pivot.sql.ends_with(&format!("LIMIT {DEFAULT_PIVOT_ROW_LIMIT}")));

    let preview = compile(
        &state.compile_input(),
        &CompileOptions::default().with_mode(CompileMode::Preview),
    )
    .unwrap()
    .unwrap();
    assert!(preview.sql.ends_with(&format!("LIMIT {DEFAULT_PREVIEW_ROW_LIMIT}")));
}

#[test]
fn test_row_limit_override() {
    let state = state();
    let compiled = compile(
        &state.compile_input(),
        &CompileOptions::default().with_row_limit(7),
    )
    .unwrap()
    .unwrap();
    assert!(compiled.sql.ends_with("LIMIT 7"));
}

#[test]
fn test_guest_cap_rewrites_larger_limit() {
    let state = state();
    let compiled = compile(&state.compile_input(), &CompileOptions::default())
        .unwrap()
        .unwrap();

    let capped = enforce_row_cap(&compiled.sql, 50);
    assert!(capped.ends_with("LIMIT 50"));
    assert_eq!(capped.matches("LIMIT").count(), 1);
}

#[test]
fn test_guest_cap_keeps_smaller_limit() {
    let sql = "SELECT \"a\" FROM \"t\"\nLIMIT 10";
    assert_eq!(enforce_row_cap(sql, 50), sql);
}

#[test]
fn test_guest_cap_appends_when_absent() {
    assert_eq!(
        enforce_row_cap("SELECT \"a\" FROM \"t\"", 50),
        "SELECT \"a\" FROM \"t\"\nLIMIT 50"
    );
    // A trailing semicolon stays terminal.
    assert_eq!(
        enforce_row_cap("SELECT \"a\" FROM \"t\";", 50),
        "SELECT \"a\" FROM \"t\"\nLIMIT 50;"
    );
}

#[test]
fn test_guest_cap_preserves_semicolon_on_rewrite() {
    assert_eq!(
        enforce_row_cap("SELECT \"a\" FROM \"t\"\nLIMIT 9999;", 50),
        "SELECT \"a\" FROM \"t\"\nLIMIT 50;"
    );
}

#[test]
fn test_guest_cap_ignores_limit_like_identifiers() {
    // Only a trailing LIMIT clause is rewritten; a column named "limit 99"
    // mid-statement is left alone.
    let sql = "SELECT \"limit 99\" FROM \"t\"";
    assert_eq!(enforce_row_cap(sql, 50), format!("{sql}\nLIMIT 50"));
}

//! DML dispatch scenarios against the in-memory engine

use crate::engine::TestEngine;
use ddlog_engine::Record;
use sql_bridge::{BridgeError, DdlogProvider, SqlRequest, SqlValue};

const DDL: [&str; 2] = [
    "CREATE TABLE hosts (id integer PRIMARY KEY, name varchar(36))",
    "CREATE VIEW v_hosts AS SELECT DISTINCT * FROM hosts",
];

/// Provider plus an engine wired for an identity view over `hosts`
fn setup() -> (DdlogProvider, TestEngine) {
    let provider = DdlogProvider::new(&DDL).unwrap();
    let engine = TestEngine::new();
    engine.add_relation("Rhosts");
    engine.add_relation("Rv_hosts");
    engine.mirror("Rhosts", "Rv_hosts");
    engine.set_key("Rhosts", &[0]);
    (provider, engine)
}

fn row(id: i32, name: &str) -> Vec<SqlValue> {
    vec![SqlValue::Int(id), SqlValue::Text(name.to_string())]
}

#[test]
fn test_insert_then_select_round_trip() {
    let (provider, engine) = setup();

    let responses = provider
        .execute_batch(
            &engine,
            &[SqlRequest::new(
                "INSERT INTO hosts VALUES (1, 'a'), (2, 'b')",
            )],
        )
        .unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].update_count, 2);
    assert!(responses[0].result.is_none());

    // The engine received one struct-record per row, tagged with the
    // table's IR type name, nullable column wrapped
    let committed = engine.committed("Rhosts");
    assert_eq!(committed.len(), 2);
    assert_eq!(
        committed[0],
        Record::make_struct(
            "Thosts",
            vec![
                Record::Signed(1),
                Record::make_struct("ddlog_std::Some", vec![Record::Str("a".to_string())]),
            ],
        )
    );

    // A select after the committed batch observes its net effect
    let responses = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM v_hosts")])
        .unwrap();
    let result = responses[0].result.as_ref().unwrap();
    assert_eq!(
        result.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["id", "name"]
    );
    assert_eq!(result.rows, vec![row(1, "a"), row(2, "b")]);
}

#[test]
fn test_bound_insert_with_null() {
    let (provider, engine) = setup();

    provider
        .execute_batch(
            &engine,
            &[SqlRequest::with_bindings(
                "INSERT INTO hosts VALUES (?, ?)",
                vec![SqlValue::Int(5), SqlValue::Null],
            )],
        )
        .unwrap();

    assert_eq!(
        engine.committed("Rhosts"),
        vec![Record::make_struct(
            "Thosts",
            vec![
                Record::Signed(5),
                Record::make_struct("ddlog_std::None", vec![]),
            ],
        )]
    );

    let responses = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM v_hosts")])
        .unwrap();
    assert_eq!(
        responses[0].result.as_ref().unwrap().rows,
        vec![vec![SqlValue::Int(5), SqlValue::Null]]
    );
}

#[test]
fn test_null_rejected_for_primary_key_column() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(
            &engine,
            &[SqlRequest::with_bindings(
                "INSERT INTO hosts VALUES (?, ?)",
                vec![SqlValue::Null, SqlValue::Text("a".to_string())],
            )],
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Codec(_)));
}

#[test]
fn test_delete_by_pk_is_idempotent() {
    let (provider, engine) = setup();

    provider
        .execute_batch(
            &engine,
            &[SqlRequest::new(
                "INSERT INTO hosts VALUES (1, 'a'), (2, 'b')",
            )],
        )
        .unwrap();

    for _ in 0..2 {
        let responses = provider
            .execute_batch(
                &engine,
                &[SqlRequest::with_bindings(
                    "DELETE FROM hosts WHERE id = ?",
                    vec![SqlValue::Int(1)],
                )],
            )
            .unwrap();
        assert_eq!(responses[0].update_count, 1);
    }

    let responses = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM v_hosts")])
        .unwrap();
    assert_eq!(responses[0].result.as_ref().unwrap().rows, vec![row(2, "b")]);
}

#[test]
fn test_net_effect_of_insert_and_delete_in_one_batch() {
    let (provider, engine) = setup();

    provider
        .execute_batch(
            &engine,
            &[
                SqlRequest::new("INSERT INTO hosts VALUES (1, 'a')"),
                SqlRequest::new("DELETE FROM hosts WHERE id = 1"),
            ],
        )
        .unwrap();

    let responses = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM v_hosts")])
        .unwrap();
    assert!(responses[0].result.as_ref().unwrap().rows.is_empty());
}

mod composite_pk {
    use super::*;

    const DDL: [&str; 2] = [
        "CREATE TABLE e (a integer, b integer, PRIMARY KEY (a, b))",
        "CREATE VIEW v_e AS SELECT DISTINCT * FROM e",
    ];

    fn setup() -> (DdlogProvider, TestEngine) {
        let provider = DdlogProvider::new(&DDL).unwrap();
        let engine = TestEngine::new();
        engine.add_relation("Re");
        engine.add_relation("Rv_e");
        engine.mirror("Re", "Rv_e");
        engine.set_key("Re", &[0, 1]);
        (provider, engine)
    }

    fn pair(a: i32, b: i32) -> Vec<SqlValue> {
        vec![SqlValue::Int(a), SqlValue::Int(b)]
    }

    #[test]
    fn test_key_follows_pk_declaration_order_not_query_order() {
        let (provider, engine) = setup();
        provider
            .execute_batch(
                &engine,
                &[SqlRequest::new("INSERT INTO e VALUES (1, 2), (2, 1)")],
            )
            .unwrap();

        // WHERE lists b first; the key tuple is still (a, b)
        provider
            .execute_batch(
                &engine,
                &[SqlRequest::new("DELETE FROM e WHERE b = 2 AND a = 1")],
            )
            .unwrap();

        let responses = provider
            .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM v_e")])
            .unwrap();
        assert_eq!(responses[0].result.as_ref().unwrap().rows, vec![pair(2, 1)]);
    }

    #[test]
    fn test_bound_delete_with_reversed_operands() {
        let (provider, engine) = setup();
        provider
            .execute_batch(
                &engine,
                &[SqlRequest::new("INSERT INTO e VALUES (1, 2), (2, 1)")],
            )
            .unwrap();

        // Placeholders are consumed in statement order: a = 2, then b = 1
        provider
            .execute_batch(
                &engine,
                &[SqlRequest::with_bindings(
                    "DELETE FROM e WHERE ? = a AND b = ?",
                    vec![SqlValue::Int(2), SqlValue::Int(1)],
                )],
            )
            .unwrap();

        let responses = provider
            .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM v_e")])
            .unwrap();
        assert_eq!(responses[0].result.as_ref().unwrap().rows, vec![pair(1, 2)]);
    }

    #[test]
    fn test_partial_pk_coverage_is_an_error() {
        let (provider, engine) = setup();
        let err = provider
            .execute_batch(&engine, &[SqlRequest::new("DELETE FROM e WHERE a = 1")])
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::PkNotCovered {
                table: "E".to_string(),
                column: "b".to_string(),
            }
        );
    }

    #[test]
    fn test_repeated_pk_column_is_an_error() {
        let (provider, engine) = setup();
        let err = provider
            .execute_batch(
                &engine,
                &[SqlRequest::with_bindings(
                    "DELETE FROM e WHERE a = ? AND a = 5",
                    vec![SqlValue::Int(1)],
                )],
            )
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::DuplicatePkPredicate {
                table: "E".to_string(),
                column: "a".to_string(),
            }
        );
    }

    #[test]
    fn test_repeated_pk_column_with_different_case_is_an_error() {
        let (provider, engine) = setup();
        let err = provider
            .execute_batch(
                &engine,
                &[SqlRequest::with_bindings(
                    "DELETE FROM e WHERE A = ? AND a = ?",
                    vec![SqlValue::Int(1), SqlValue::Int(2)],
                )],
            )
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::DuplicatePkPredicate {
                table: "E".to_string(),
                column: "a".to_string(),
            }
        );
    }
}

#[test]
fn test_rollback_discards_whole_batch() {
    let (provider, engine) = setup();

    // The second statement is rejected (DELETE without WHERE); the first
    // statement's insert must not become visible.
    let err = provider
        .execute_batch(
            &engine,
            &[
                SqlRequest::new("INSERT INTO hosts VALUES (1, 'a')"),
                SqlRequest::new("DELETE FROM hosts"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unsupported(_)));

    assert!(engine.committed("Rhosts").is_empty());
    let responses = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM v_hosts")])
        .unwrap();
    assert!(responses[0].result.as_ref().unwrap().rows.is_empty());
}

#[test]
fn test_parse_error_rolls_back() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(
            &engine,
            &[
                SqlRequest::new("INSERT INTO hosts VALUES (1, 'a')"),
                SqlRequest::new("NOT EVEN SQL"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Parse { .. }));

    // The engine is usable again afterwards
    provider
        .execute_batch(&engine, &[SqlRequest::new("INSERT INTO hosts VALUES (2, 'b')")])
        .unwrap();
    assert_eq!(engine.committed("Rhosts").len(), 1);
}

#[test]
fn test_select_unknown_table() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM missing")])
        .unwrap_err();
    assert_eq!(err, BridgeError::UnknownTable("MISSING".to_string()));
}

#[test]
fn test_select_must_be_star() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT id FROM v_hosts")])
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unsupported(_)));
}

#[test]
fn test_delete_on_non_pk_column() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(
            &engine,
            &[SqlRequest::new("DELETE FROM hosts WHERE name = 'a'")],
        )
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::NotPrimaryKey {
            table: "HOSTS".to_string(),
            column: "name".to_string(),
        }
    );
}

#[test]
fn test_delete_with_non_equality_operator() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(
            &engine,
            &[SqlRequest::new("DELETE FROM hosts WHERE id > 1")],
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unsupported(_)));
}

#[test]
fn test_insert_arity_mismatch() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(&engine, &[SqlRequest::new("INSERT INTO hosts VALUES (1)")])
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::Arity {
            table: "HOSTS".to_string(),
            expected: 2,
            found: 1,
        }
    );
}

#[test]
fn test_missing_binding() {
    let (provider, engine) = setup();
    let err = provider
        .execute_batch(
            &engine,
            &[SqlRequest::with_bindings(
                "INSERT INTO hosts VALUES (?, ?)",
                vec![SqlValue::Int(1)],
            )],
        )
        .unwrap_err();
    assert_eq!(err, BridgeError::MissingBinding);
}

#[test]
fn test_table_names_resolve_case_insensitively() {
    let (provider, engine) = setup();
    provider
        .execute_batch(&engine, &[SqlRequest::new("INSERT INTO HOSTS VALUES (1, 'a')")])
        .unwrap();
    let responses = provider
        .execute_batch(&engine, &[SqlRequest::new("SELECT * FROM V_HOSTS")])
        .unwrap();
    assert_eq!(responses[0].result.as_ref().unwrap().rows, vec![row(1, "a")]);
}

#[test]
fn test_translator_and_catalog_agree_on_field_order() {
    // Both initialization passes consume the same DDL list; the emitted
    // row type and the catalog's field list must line up.
    let program = sql_translator::translate_ddl(&DDL).unwrap();
    let provider = DdlogProvider::new(&DDL).unwrap();

    let tdef = program
        .typedefs()
        .find(|t| t.name.as_str() == "Thosts")
        .unwrap();
    let ir_fields: Vec<String> = match &tdef.ty {
        ddlog_ir::Type::Struct(fields) => fields.iter().map(|f| f.name.to_string()).collect(),
        other => panic!("expected struct type, got {:?}", other),
    };
    let catalog_fields: Vec<String> = provider
        .catalog()
        .get("hosts")
        .unwrap()
        .fields
        .iter()
        .map(|f| f.name.clone())
        .collect();
    assert_eq!(ir_fields, catalog_fields);
}

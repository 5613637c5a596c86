mod support;

use formsync_engine::{ErrorCode, Form, SyncConfig, SyncEvent, SyncOrchestrator};
use serde_json::json;

use support::{account, form_from, inspection, inspections_form, MemoryHost, SqliteStore};

const ROOT: &str = "account_7_form_3";
const VISITS: &str = "account_7_form_3_r";
const PHOTOS: &str = "account_7_form_3_r_p";

async fn activated(store: &SqliteStore) -> SyncOrchestrator {
    let mut orchestrator = SyncOrchestrator::new(store.boxed(), SyncConfig::default());
    orchestrator.activate().await.expect("activate should succeed");
    orchestrator
}

#[tokio::test]
async fn rebuild_is_idempotent() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(
        vec![inspections_form()],
        vec![inspection("rec-1", 2), inspection("rec-2", 1)],
    );
    let mut orchestrator = activated(&store).await;
    let form = inspections_form();

    let mut schemas = Vec::new();
    for _ in 0..2 {
        let total = orchestrator
            .rebuild_form(&host, &account(), &form, &mut |_| {})
            .await
            .expect("rebuild should succeed");
        assert_eq!(total, 2);
        assert_eq!(store.count(ROOT), 2);
        assert_eq!(store.count(VISITS), 3);
        assert_eq!(store.count(PHOTOS), 3);

        let tables = store.objects("table");
        let columns = tables
            .iter()
            .map(|table| store.columns(table))
            .collect::<Vec<_>>();
        schemas.push((tables, columns));
    }

    assert_eq!(schemas[0].0, vec![ROOT, VISITS, PHOTOS]);
    assert_eq!(schemas[0], schemas[1]);

    assert_eq!(
        store.objects("view"),
        vec![
            "Inspections",
            "Inspections - photos",
            "Inspections - visits",
            "account_7_form_3_r_p_view_full",
            "account_7_form_3_r_view_full",
            "account_7_form_3_view_full",
        ]
    );
    assert_eq!(
        store.texts("SELECT site_name FROM \"Inspections\" ORDER BY record_id"),
        vec![Some("site rec-1".to_string()), Some("site rec-2".to_string())]
    );
    assert_eq!(
        store.texts("SELECT created_at FROM account_7_form_3 WHERE record_id = 'rec-1'"),
        vec![Some("2024-05-01T06:00:00Z".to_string())]
    );
}

#[tokio::test]
async fn shrinking_a_repeatable_leaves_no_stale_rows() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(vec![inspections_form()], Vec::new());
    let mut orchestrator = activated(&store).await;
    let form = inspections_form();

    orchestrator
        .update_record(&host, &account(), &form, &inspection("rec-1", 3), false)
        .await
        .expect("first save");
    assert_eq!(store.count(VISITS), 3);

    orchestrator
        .update_record(&host, &account(), &form, &inspection("rec-1", 1), false)
        .await
        .expect("second save");

    assert_eq!(store.count(ROOT), 1);
    assert_eq!(store.count(VISITS), 1);
    assert_eq!(store.count(PHOTOS), 1);
    assert_eq!(
        store.texts("SELECT parent_id FROM account_7_form_3_r_p"),
        vec![Some("rec-1-v0".to_string())]
    );
}

#[tokio::test]
async fn deleting_a_record_cascades_and_is_repeatable() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(vec![inspections_form()], vec![inspection("rec-1", 2)]);
    let mut orchestrator = activated(&store).await;
    let form = inspections_form();
    orchestrator
        .rebuild_form(&host, &account(), &form, &mut |_| {})
        .await
        .expect("rebuild");

    for _ in 0..2 {
        orchestrator
            .handle_event(
                &host,
                SyncEvent::RecordDeleted {
                    account: account(),
                    form: form.clone(),
                    record: inspection("rec-1", 0),
                },
            )
            .await
            .expect("delete should succeed");
        assert_eq!(store.count(ROOT), 0);
        assert_eq!(store.count(VISITS), 0);
        assert_eq!(store.count(PHOTOS), 0);
    }
}

#[tokio::test]
async fn saving_into_a_missing_table_rebuilds_once_then_writes() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(vec![inspections_form()], vec![inspection("rec-1", 1)]);
    let mut orchestrator = activated(&store).await;

    orchestrator
        .handle_event(
            &host,
            SyncEvent::RecordSaved {
                account: account(),
                form: inspections_form(),
                record: inspection("rec-2", 2),
            },
        )
        .await
        .expect("save should recover");

    assert_eq!(host.streams_opened(), 1);
    assert_eq!(store.count(ROOT), 2);
    assert_eq!(store.count(VISITS), 3);

    let creates = store
        .statements()
        .iter()
        .filter(|sql| sql.starts_with("CREATE TABLE"))
        .count();
    assert_eq!(creates, 3);
}

#[tokio::test]
async fn form_changes_add_drop_and_retype_columns() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(Vec::new(), Vec::new());
    let mut orchestrator = activated(&store).await;
    let before = inspections_form();
    orchestrator
        .update_record(&host, &account(), &before, &inspection("rec-1", 1), false)
        .await
        .expect("seed");

    let after: Form = form_from(json!([
        {"key": "a", "type": "TextField", "data_name": "site"},
        {"key": "b", "type": "TextField", "data_name": "score"},
        {"key": "e", "type": "TimeField", "data_name": "arrival"},
        {"key": "r", "type": "Repeatable", "data_name": "visits", "elements": [
            {"key": "c", "type": "DateField", "data_name": "visited_on"}
        ]}
    ]));

    orchestrator
        .handle_event(
            &host,
            SyncEvent::FormSaved {
                account: account(),
                form: after.clone(),
                old_form: Some(before.version().expect("version")),
                new_form: Some(after.version().expect("version")),
            },
        )
        .await
        .expect("form update should succeed");

    let root_columns = store.columns(ROOT);
    assert!(root_columns.contains(&("fb".to_string(), "TEXT".to_string())));
    assert!(root_columns.contains(&("fe".to_string(), "TEXT".to_string())));
    assert!(!orchestrator.cache().contains(PHOTOS));
    assert_eq!(store.count(ROOT), 1);
    assert_eq!(
        store.texts("SELECT site FROM \"Inspections\""),
        vec![Some("site rec-1".to_string())]
    );
    assert!(store.objects("view").contains(&"Inspections - visits".to_string()));
    assert!(!store.objects("view").contains(&"Inspections - photos".to_string()));
}

#[tokio::test]
async fn renaming_a_field_only_touches_views() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(Vec::new(), Vec::new());
    let mut orchestrator = activated(&store).await;
    let before = inspections_form();
    let first = before.version().expect("version");
    orchestrator
        .update_form(&account(), &before, None, Some(&first))
        .await
        .expect("create");
    store.clear_statements();

    let mut after = before.clone();
    after.elements[0].data_name = "location".to_string();
    let second = after.version().expect("version");
    orchestrator
        .update_form(&account(), &after, Some(&first), Some(&second))
        .await
        .expect("rename");

    let statements = store.statements();
    assert!(statements.iter().all(|sql| !sql.contains("TABLE \"main\"")), "{statements:#?}");
    assert_eq!(store.texts("SELECT location FROM \"Inspections\""), Vec::<Option<String>>::new());
}

#[tokio::test]
async fn sync_account_reports_progress_per_form() {
    let store = SqliteStore::new();
    let records = (0..25).map(|i| inspection(&format!("rec-{i}"), 0)).collect();
    let host = MemoryHost::new(vec![inspections_form()], records);
    let mut orchestrator = activated(&store).await;
    let mut progress = Vec::new();

    let report = orchestrator
        .sync_account(&host, "Acme", &mut |form, count| progress.push((form.row_id, count)))
        .await
        .expect("sync should succeed");

    assert_eq!(progress, vec![(3, 10), (3, 20), (3, 25)]);
    assert_eq!(report.total_records(), 25);
    assert_eq!(report.forms[0].tables, 3);
    assert_eq!(store.count(ROOT), 25);
}

#[tokio::test]
async fn unknown_accounts_touch_nothing() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(vec![inspections_form()], vec![inspection("rec-1", 1)]);
    let mut orchestrator = SyncOrchestrator::new(store.boxed(), SyncConfig::default());

    let err = orchestrator
        .sync_account(&host, "Globex", &mut |_, _| {})
        .await
        .expect_err("unknown account should fail");

    assert_eq!(err.code, ErrorCode::AccountNotFound);
    assert!(store.statements().is_empty());
}

#[tokio::test]
async fn nul_bytes_are_stripped_before_reaching_sqlite() {
    let store = SqliteStore::new();
    let host = MemoryHost::new(Vec::new(), Vec::new());
    let mut orchestrator = activated(&store).await;
    let form = inspections_form();
    let mut record = inspection("rec-1", 0);
    record
        .form_values
        .insert("a".to_string(), json!("north\u{0}gate"));

    orchestrator
        .update_record(&host, &account(), &form, &record, false)
        .await
        .expect("save should succeed");

    assert_eq!(
        store.texts("SELECT fa FROM account_7_form_3"),
        vec![Some("northgate".to_string())]
    );
    assert!(store.statements().iter().all(|sql| !sql.contains('\0')));
}

#[tokio::test]
async fn keys_differing_only_in_case_never_reach_the_store() {
    let store = SqliteStore::new();
    let mut orchestrator = activated(&store).await;
    store.clear_statements();

    for elements in [
        json!([
            {"key": "a", "type": "TextField", "data_name": "site"},
            {"key": "A", "type": "TextField", "data_name": "site_upper"}
        ]),
        json!([
            {"key": "r", "type": "Repeatable", "data_name": "visits", "elements": []},
            {"key": "R", "type": "Repeatable", "data_name": "revisits", "elements": []}
        ]),
    ] {
        let form = form_from(elements);
        let version = form.version().expect("version");
        let err = orchestrator
            .update_form(&account(), &form, None, Some(&version))
            .await
            .expect_err("clashing keys should be rejected");

        assert_eq!(err.code, ErrorCode::InvalidFormDefinition);
    }

    assert!(store.statements().is_empty(), "{:#?}", store.statements());
    assert!(store.objects("table").is_empty());
}

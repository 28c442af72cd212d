use daybook_config::Config;
use daybook_core::{CoreError, ErrorCode, InsertMode, Ledger, LedgerStore, SqliteStore};
use std::path::{Path, PathBuf};

const JANUARY: &str = "2024-01-01,Salary,,100\n2024-01-03,Groceries,50,\n2024-01-03,Coffee,3.50,\n";

fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn file_ledger(dir: &Path) -> Ledger<SqliteStore> {
    let store = SqliteStore::open(dir.join("ledger.sqlite")).unwrap();
    Ledger::from_config(Config::default(), store)
}

#[tokio::test]
async fn importing_same_file_twice_keeps_row_count() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "january.csv", JANUARY);
    let ledger = file_ledger(dir.path());

    let first = ledger.import_file(&csv, InsertMode::Abort).await.unwrap();
    assert_eq!(first.rows, 3);
    assert_eq!(first.inserted, 3);
    assert_eq!(first.file_size, JANUARY.len() as u64);

    let err = ledger.import_file(&csv, InsertMode::Abort).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(ledger.store().count().unwrap(), 3);

    let skipped = ledger.import_file(&csv, InsertMode::SkipDuplicates).await.unwrap();
    assert_eq!(skipped.inserted, 0);
    assert_eq!(skipped.skipped, 3);
    assert_eq!(ledger.store().count().unwrap(), 3);
}

#[tokio::test]
async fn partially_duplicate_batch_is_rejected_as_a_unit() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path());

    let january = write_csv(dir.path(), "january.csv", JANUARY);
    ledger.import_file(&january, InsertMode::Abort).await.unwrap();

    // One new row, then a row already stored
    let overlap = write_csv(
        dir.path(),
        "overlap.csv",
        "2024-01-05,Refund,,20\n2024-01-01,Salary,,100\n",
    );
    let err = ledger.import_file(&overlap, InsertMode::Abort).await.unwrap_err();
    match err {
        CoreError::Conflict { id } => {
            assert_eq!(id, daybook_parser::identity("2024-01-01", "Salary", "", "100"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ledger.store().count().unwrap(), 3);

    let report = ledger.import_file(&overlap, InsertMode::SkipDuplicates).await.unwrap();
    assert_eq!((report.inserted, report.skipped), (1, 1));
    assert_eq!(ledger.store().count().unwrap(), 4);
}

#[tokio::test]
async fn reformatted_amounts_are_new_transactions() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path());

    let a = write_csv(dir.path(), "a.csv", "2024-01-01,Rent,0,100\n");
    let b = write_csv(dir.path(), "b.csv", "2024-01-01,Rent,0.00,100\n");
    ledger.import_file(&a, InsertMode::Abort).await.unwrap();
    ledger.import_file(&b, InsertMode::Abort).await.unwrap();

    assert_eq!(ledger.store().count().unwrap(), 2);
    assert_eq!(ledger.statement().unwrap().total_income(), 200.0);
}

#[tokio::test]
async fn malformed_file_stores_nothing_and_is_not_tracked() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path());

    let bad = write_csv(dir.path(), "bad.csv", "2024-01-01,A,,100\n01/02/2024,B,5,\n");
    let err = ledger.import_file(&bad, InsertMode::Abort).await.unwrap_err();

    assert!(matches!(err, CoreError::ParseError { row: Some(2), .. }));
    assert_eq!(ledger.store().count().unwrap(), 0);
    assert!(ledger.upload_history().unwrap().is_empty());
}

#[tokio::test]
async fn non_csv_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path());
    let path = write_csv(dir.path(), "statement.txt", JANUARY);

    let err = ledger.import_file(&path, InsertMode::Abort).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidFormat);
}

#[tokio::test]
async fn successful_imports_are_tracked() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path());
    let csv = write_csv(dir.path(), "january.csv", JANUARY);

    ledger.import_file(&csv, InsertMode::Abort).await.unwrap();
    let history = ledger.upload_history().unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].filename, "january.csv");
    assert_eq!(history[0].num_rows, 3);
    assert_eq!(history[0].file_size, JANUARY.len() as u64);
}

#[tokio::test]
async fn preview_does_not_store() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = file_ledger(dir.path());
    let csv = write_csv(dir.path(), "january.csv", JANUARY);

    let rows = ledger.preview(&csv).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].debit, "3.50");
    assert_eq!(ledger.store().count().unwrap(), 0);
}

#[tokio::test]
async fn statement_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "january.csv", JANUARY);

    let ledger = file_ledger(dir.path());
    ledger.import_file(&csv, InsertMode::Abort).await.unwrap();
    ledger.close().unwrap();

    let ledger = file_ledger(dir.path());
    let statement = ledger.statement().unwrap();
    assert_eq!(statement.len(), 3);
    assert_eq!(statement.total_income(), 100.0);
    assert_eq!(statement.total_expense(), 53.5);
    assert_eq!(statement.closing_balance(), 46.5);
}

use ichef_ledger::SyncError;
use ichef_ledger::io::workbook::{WorkbookStore, read_sheets};
use ichef_ledger::store::{TableStore, TargetTable};
use tempfile::tempdir;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn ensure_worksheet_creates_sheet_with_header() {
    let temp_dir = tempdir().expect("temporary directory");
    let store = WorkbookStore::new(temp_dir.path().join("tables"));
    let header = strings(&["Data_Date", "會員卡號", "點數"]);

    let table = store
        .ensure_worksheet("rewards", "cards", &header)
        .expect("worksheet created");
    let snapshot = table.snapshot().expect("snapshot read");

    assert_eq!(snapshot.header, header);
    assert!(snapshot.rows.is_empty());
    assert!(store.path_for("rewards").exists());
}

#[test]
fn appended_rows_survive_a_reopen() {
    let temp_dir = tempdir().expect("temporary directory");
    let store = WorkbookStore::new(temp_dir.path());
    let mut table = store
        .ensure_worksheet("orders", "工作表1", &strings(&["發票號碼", "結帳時間"]))
        .expect("worksheet created");

    table
        .append_rows(&[
            strings(&["AB-001", "2026/02/18 11:00"]),
            strings(&["AB-002", "2026/02/18 11:30"]),
        ])
        .expect("rows appended");

    let reopened = store.worksheet("orders", "工作表1").expect("worksheet reopened");
    let snapshot = reopened.snapshot().expect("snapshot read");
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[1].cells(), strings(&["AB-002", "2026/02/18 11:30"]).as_slice());
}

#[test]
fn other_sheets_are_preserved_on_write() {
    let temp_dir = tempdir().expect("temporary directory");
    let store = WorkbookStore::new(temp_dir.path());
    store
        .ensure_worksheet("rewards", "cards", &strings(&["Data_Date", "卡號"]))
        .expect("cards created");
    let mut points = store
        .ensure_worksheet("rewards", "points", &strings(&["Data_Date", "點數"]))
        .expect("points created");

    points
        .append_rows(&[strings(&["20260218", "10"])])
        .expect("rows appended");

    let sheets = read_sheets(&store.path_for("rewards")).expect("workbook read");
    let names: Vec<&str> = sheets.iter().map(|sheet| sheet.name.as_str()).collect();
    assert_eq!(names, vec!["cards", "points"]);
    assert_eq!(sheets[0].values, vec![strings(&["Data_Date", "卡號"])]);
}

#[test]
fn missing_worksheet_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let store = WorkbookStore::new(temp_dir.path());

    let error = store.worksheet("orders", "工作表1").expect_err("no workbook yet");
    assert!(matches!(error, SyncError::WorksheetNotFound { .. }));

    store
        .ensure_worksheet("orders", "工作表1", &[])
        .expect("empty sheet created");
    let error = store.worksheet("orders", "工作表2").expect_err("sheet absent");
    assert!(matches!(
        error,
        SyncError::WorksheetNotFound { sheet, .. } if sheet == "工作表2"
    ));
}

#[test]
fn replace_all_rewrites_the_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let store = WorkbookStore::new(temp_dir.path());
    let header = strings(&["顧客電話"]);
    let mut table = store
        .ensure_worksheet("orders", "工作表1", &header)
        .expect("worksheet created");
    table
        .append_rows(&[strings(&["0912"]), strings(&["0933"])])
        .expect("rows appended");

    table
        .replace_all(&header, &[strings(&["912"])])
        .expect("sheet rewritten");

    let snapshot = table.snapshot().expect("snapshot read");
    assert_eq!(snapshot.header, header);
    assert_eq!(snapshot.rows.len(), 1);
    assert_eq!(snapshot.rows[0].get(0), Some("912"));
}

use cubik::export::export_to_path;
use cubik::session::GraphConfig;
use cubik::solve::{Solve, SolveStatus};
use cubik::store::{SessionPatch, SessionStore, SolvePatch, SqliteStore, DEFAULT_SESSION_ID};
use tempfile::tempdir;

#[test]
fn first_open_seeds_example_and_default() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("sessions.db")).unwrap();

    let names: Vec<&str> = store.sessions().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Example session", "Default"]);
    assert_eq!(store.current().name, "Example session");
    assert_eq!(store.current().solves.len(), 50);
}

#[test]
fn solves_and_sessions_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("sessions.db");

    let (session_id, kept_id) = {
        let mut store = SqliteStore::open(&path).unwrap();
        let id = store.add_session("OH").unwrap();
        store
            .add_solve(Solve::new(21_000, "R U R'", vec![9_000]))
            .unwrap();
        let kept = Solve::new(19_500, "F2 B2", vec![]);
        let kept_id = kept.id.clone();
        store.add_solve(kept).unwrap();
        store
            .update_solve(&kept_id, SolvePatch::status(SolveStatus::Plus2))
            .unwrap();
        store
            .update_session(
                &id,
                SessionPatch {
                    graphs: Some(vec![GraphConfig { kind: 5, last: 50 }]),
                    ..Default::default()
                },
            )
            .unwrap();
        (id, kept_id)
    };

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.current().id, session_id);
    let solves = &store.current().solves;
    assert_eq!(solves.len(), 2);
    assert_eq!(solves[0].id, kept_id);
    assert_eq!(solves[0].status, SolveStatus::Plus2);
    assert_eq!(solves[0].effective_ms(), Some(21_500));
    assert_eq!(solves[1].splits, vec![9_000]);
    assert_eq!(store.current().graphs, vec![GraphConfig { kind: 5, last: 50 }]);
}

#[test]
fn deleting_every_session_leaves_a_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sessions.db");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        let ids: Vec<String> = store.sessions().iter().map(|s| s.id.clone()).collect();
        for id in ids {
            store.delete_session(&id).unwrap();
        }
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.sessions().len(), 1);
    assert_eq!(store.current().id, DEFAULT_SESSION_ID);
    assert!(store.current().solves.is_empty());
}

#[test]
fn export_writes_header_and_newest_first_rows() {
    let dir = tempdir().unwrap();
    let mut store = SqliteStore::open(dir.path().join("sessions.db")).unwrap();
    store.add_session("Export").unwrap();
    store.add_solve(Solve::new(12_000, "U", vec![])).unwrap();
    store
        .add_solve(Solve::new(10_000, "D", vec![4_000]).with_status(SolveStatus::Dnf))
        .unwrap();

    let out = dir.path().join("export.csv");
    let rows = export_to_path(store.current(), &out).unwrap();
    assert_eq!(rows, 2);

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "index");
    assert_eq!(&headers[3], "status");

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(&records[0][0], "2");
    assert_eq!(&records[0][3], "DNF");
    assert_eq!(&records[0][4], "");
    assert_eq!(&records[0][7], "4000");
    assert_eq!(&records[1][0], "1");
    assert_eq!(&records[1][4], "12000");
}

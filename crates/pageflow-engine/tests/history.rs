use pageflow_engine::{
    ALREADY_AT_NEWEST, ALREADY_AT_OLDEST, DEFAULT_CAPACITY, FileStore, HistoryConfig,
    HistoryManager, HistoryStore, MemoryStore, NO_HISTORY, RedoPolicy,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn contents<S: HistoryStore>(manager: &HistoryManager<S>) -> Vec<String> {
    manager
        .snapshots()
        .into_iter()
        .map(|snapshot| snapshot.content)
        .collect()
}

#[test]
fn undo_after_one_edit_restores_the_initial_state() {
    let mut manager = HistoryManager::new(MemoryStore::new());
    manager.initialize_history("<p>A</p>");
    manager.save_to_history("<p>AB</p>");

    let outcome = manager.undo();
    assert_eq!(outcome.content.as_deref(), Some("<p>A</p>"));
    assert!(outcome.status.can_redo);
}

#[test]
fn undo_on_fresh_history_has_nothing() {
    let mut manager = HistoryManager::new(MemoryStore::new());

    let outcome = manager.undo();
    assert_eq!(outcome.content, None);
    assert_eq!(outcome.message.as_deref(), Some(NO_HISTORY));
    assert!(!outcome.status.can_undo);
    assert!(!outcome.status.can_redo);
}

#[test]
fn overflowing_the_ring_keeps_the_newest_states() {
    let mut manager = HistoryManager::new(MemoryStore::new());
    for n in 0..DEFAULT_CAPACITY + 5 {
        manager.save_to_history(&format!("<p>{n}</p>"));
    }

    let status = manager.status();
    assert_eq!(status.total_states, DEFAULT_CAPACITY);

    let mut undos = 0;
    while manager.undo().is_applied() {
        undos += 1;
    }
    assert_eq!(undos, DEFAULT_CAPACITY - 1);
    assert_eq!(manager.current_content().as_deref(), Some("<p>5</p>"));
    assert!(!contents(&manager).contains(&"<p>4</p>".to_string()));
}

#[test]
fn boundaries_report_without_moving() {
    let mut manager = HistoryManager::new(MemoryStore::new());
    manager.initialize_history("only");

    let undo = manager.undo();
    assert_eq!(undo.message.as_deref(), Some(ALREADY_AT_OLDEST));
    let redo = manager.redo();
    assert_eq!(redo.message.as_deref(), Some(ALREADY_AT_NEWEST));
    assert_eq!(manager.current_content().as_deref(), Some("only"));
    assert_eq!(undo.status, redo.status);
}

#[test]
fn undo_then_redo_returns_to_the_same_state() {
    let mut manager = HistoryManager::new(MemoryStore::new());
    for state in ["one", "two", "three", "four"] {
        manager.save_to_history(state);
    }
    manager.undo();
    let before = (manager.status(), manager.current_content());

    manager.undo();
    manager.redo();
    assert_eq!((manager.status(), manager.current_content()), before);

    manager.redo();
    manager.undo();
    assert_eq!((manager.status(), manager.current_content()), before);
}

#[test]
fn history_survives_a_restart_on_disk() {
    let dir = TempDir::new().unwrap();
    let config = HistoryConfig {
        namespace: "quarterly".to_string(),
        ..HistoryConfig::default()
    };

    {
        let mut manager = HistoryManager::open(FileStore::new(dir.path()), config.clone());
        manager.initialize_history("<p>draft 1</p>");
        manager.save_to_history("<p>draft 2</p>");
        manager.save_to_history("<p>draft 3</p>");
        manager.undo();
    }

    assert!(dir.path().join("quarterly.meta.json").exists());
    let mut manager = HistoryManager::open(FileStore::new(dir.path()), config);
    assert_eq!(manager.current_content().as_deref(), Some("<p>draft 2</p>"));
    assert_eq!(
        contents(&manager),
        vec!["<p>draft 1</p>", "<p>draft 2</p>", "<p>draft 3</p>"]
    );
    assert_eq!(manager.redo().content.as_deref(), Some("<p>draft 3</p>"));
}

#[test]
fn stored_meta_is_camel_case_json() {
    let mut manager = HistoryManager::new(MemoryStore::new());
    manager.save_to_history("x");
    let meta = manager.store().get("report_history:meta").unwrap().unwrap();

    assert_eq!(
        meta,
        r#"{"currentIndex":0,"headIndex":0,"tailIndex":0,"size":1,"schemaVersion":1}"#
    );
    let slot = manager.store().get("report_history:slot:0").unwrap().unwrap();
    assert!(slot.contains(r#""slotIndex":0"#));
    assert!(slot.contains(r#""content":"x""#));
}

#[test]
fn redo_policies_differ_after_undo_and_edit() {
    let mut keep = HistoryManager::new(MemoryStore::new());
    let mut truncate = HistoryManager::open(
        MemoryStore::new(),
        HistoryConfig {
            redo_policy: RedoPolicy::TruncateOnEdit,
            ..HistoryConfig::default()
        },
    );

    for manager in [&mut keep, &mut truncate] {
        for state in ["A", "B", "C"] {
            manager.save_to_history(state);
        }
        manager.undo();
        manager.save_to_history("D");
    }

    assert_eq!(contents(&keep), vec!["A", "B", "C", "D"]);
    assert_eq!(contents(&truncate), vec!["A", "B", "D"]);
}

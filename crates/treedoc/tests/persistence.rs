use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use treedoc::autosave::NoopAutosave;
use treedoc::config::EngineConfig;
use treedoc::format::DocumentFile;
use treedoc::store::{DocumentStore, FileStore};
use treedoc::{NodeStatus, TreeDocApi, TreeDocError};

const LEGACY_OUTLINE: &str = r#"{
    "format": "treedoc",
    "version": "0.9",
    "created": "2022-05-01T08:00:00Z",
    "updated": "2022-05-03T17:30:00Z",
    "author": "someone",
    "rootNodeId": "root",
    "nodes": {
        "root": {"id": "root", "content": "", "children": ["todo", "done"], "metadata": {}},
        "todo": {"id": "todo", "content": "Write report", "children": ["sub"], "metadata": {"status": "☐", "color": "red"}},
        "sub":  {"id": "sub", "content": "Collect numbers", "children": [], "metadata": {"status": "✗"}},
        "done": {"id": "done", "content": "Book flights", "children": [], "metadata": {"status": "✓", "collapsed": true}}
    }
}"#;

fn setup() -> (TempDir, FileStore) {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("outline.json"));
    (dir, store)
}

#[test]
fn test_legacy_file_loads_and_saves_in_current_format() {
    let (_dir, store) = setup();
    fs::write(store.path(), LEGACY_OUTLINE).unwrap();

    let mut api = TreeDocApi::load(&store, EngineConfig::default(), NoopAutosave).unwrap();
    let doc = api.document();
    assert!(doc.get("root").unwrap().metadata.is_root);
    assert_eq!(doc.get("todo").unwrap().metadata.status, Some(NodeStatus::Pending));
    assert_eq!(doc.get("sub").unwrap().metadata.status, Some(NodeStatus::Abandoned));
    assert_eq!(doc.get("done").unwrap().metadata.status, Some(NodeStatus::Completed));
    assert_eq!(doc.ancestors("sub"), &["root".to_string(), "todo".to_string()]);

    api.save(&store).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["nodes"]["todo"]["metadata"]["status"], "pending");
    assert_eq!(raw["nodes"]["root"]["metadata"]["isRoot"], true);
    // Unknown metadata keys survive the round trip
    assert_eq!(raw["nodes"]["todo"]["metadata"]["color"], "red");
    assert_eq!(raw["created"], "2022-05-01T08:00:00Z");
}

#[test]
fn test_edits_survive_reopen() {
    let (_dir, store) = setup();
    let mut api = TreeDocApi::load(&store, EngineConfig::default(), NoopAutosave).unwrap();

    let root = api.document().root_id().to_string();
    let first = api.document().children(&root)[0].clone();
    api.update_content(&first, "Groceries");
    let second = api.split_node(&first, "Groceries\nMilk", 10, false).unwrap();
    api.indent_node(&second);
    api.add_to_blueprint(&second).unwrap();
    api.save(&store).unwrap();

    let reopened = TreeDocApi::load(&store, EngineConfig::default(), NoopAutosave).unwrap();
    assert_eq!(reopened.document(), api.document());
    assert_eq!(reopened.document().children(&first), &[second.clone()]);
    assert_eq!(reopened.document().get(&second).unwrap().content, "Milk");
}

#[test]
fn test_debounced_autosave_writes_file() {
    let (_dir, store) = setup();
    let config = EngineConfig {
        autosave_debounce_ms: 10,
        author: "tester".to_string(),
        ..Default::default()
    };
    let mut api = TreeDocApi::debounced(treedoc::Document::blank(), config);
    let root = api.document().root_id().to_string();
    let first = api.document().children(&root)[0].clone();

    api.update_content(&first, "autosaved");
    assert!(store.load().unwrap().is_none());

    let deadline = api.autosave().deadline().unwrap();
    assert!(api.poll_autosave(deadline + Duration::from_millis(1), &store).unwrap());

    let saved: DocumentFile = store.load().unwrap().unwrap();
    assert_eq!(saved.author, "tester");
    assert_eq!(saved.nodes[&first].content, "autosaved");
}

#[test]
fn test_foreign_file_is_refused() {
    let (_dir, store) = setup();
    fs::write(store.path(), LEGACY_OUTLINE.replace("\"treedoc\"", "\"otherapp\"")).unwrap();

    let result = TreeDocApi::load(&store, EngineConfig::default(), NoopAutosave);
    assert!(matches!(result, Err(TreeDocError::InvalidDocument(_))));
}

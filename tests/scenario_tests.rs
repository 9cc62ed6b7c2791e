use doc_tree::config::Config;
use doc_tree::dialog::DraftField;
use doc_tree::session::SessionState;
use doc_tree::store::TreeStore;
use doc_tree::tree::{DocumentTree, FileFields, FileKind};
use doc_tree::TreeError;
use assert_matches::assert_matches;
use maplit::btreeset;

fn sample_store() -> TreeStore {
    TreeStore::from_session(SessionState::default(), Config::default())
}

#[test]
fn test_file_under_new_root_directory() {
    let mut tree = DocumentTree::new();
    let root = tree.create_directory(None, "Documentos").unwrap();
    assert_eq!(root, Some(1));

    let file = tree
        .create_file(1, &FileFields::new("Report.pdf", "pdf"))
        .unwrap();
    assert_eq!(file, 2);

    let children = tree.children_of(Some(1));
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, 2);
    assert_eq!(children[0].name, "Report.pdf");
    assert_eq!(children[0].order, 1);
    assert_eq!(children[0].kind(), Some(&FileKind::Pdf));
}

#[test]
fn test_delete_sample_subtree_keeps_unrelated_root() {
    let mut tree = DocumentTree::sample();
    let removed = tree.delete_subtree(1);
    assert_eq!(removed, btreeset! {1, 2, 3, 4});
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(5).unwrap().name, "Plantillas");
    assert!(tree.validate().is_ok());
}

#[test]
fn test_empty_directory_name_allocates_nothing() {
    let mut tree = DocumentTree::sample();
    let before = tree.clone();
    assert_eq!(tree.create_directory(None, "").unwrap(), None);
    assert_eq!(tree, before);
    assert_eq!(tree.next_id(), 6);

    // The next real create still gets the next id
    assert_eq!(tree.create_directory(None, "Actas").unwrap(), Some(6));
}

#[test]
fn test_rename_touches_only_the_name() {
    let mut tree = DocumentTree::sample();
    let before = tree.clone();
    assert!(tree.rename(2, "NewName").unwrap());

    let renamed = tree.get(2).unwrap();
    let original = before.get(2).unwrap();
    assert_eq!(renamed.name, "NewName");
    assert_eq!(renamed.order, original.order);
    assert_eq!(renamed.parent_id, original.parent_id);
    assert_eq!(renamed.entry, original.entry);
    for id in [1, 3, 4, 5] {
        assert_eq!(tree.get(id), before.get(id));
    }
}

#[test]
fn test_toggle_empty_directory() {
    let mut store = sample_store();
    assert!(!store.is_expanded(5));
    assert!(store.children(Some(5)).is_empty());

    assert!(store.toggle_expanded(5));
    assert!(store.is_expanded(5));
    assert!(store.children(Some(5)).is_empty());
    assert!(store.visible().all(|(node, _)| node.parent_id != Some(5)));

    assert!(store.toggle_expanded(5));
    assert!(!store.is_expanded(5));
    assert!(store.children(Some(5)).is_empty());
}

#[test]
fn test_create_under_file_is_rejected() {
    let mut store = sample_store();
    let before = store.tree().clone();
    assert_matches!(
        store.create_directory(Some(2), "Anexos"),
        Err(TreeError::InvalidParent(2))
    );
    assert_matches!(
        store.create_file(99, &FileFields::new("x.pdf", "pdf")),
        Err(TreeError::InvalidParent(99))
    );
    assert_eq!(store.tree(), &before);
}

#[test]
fn test_delete_of_missing_node_is_silent() {
    let mut store = sample_store();
    assert!(store.delete(42).is_empty());
    assert_eq!(store.tree().len(), 5);
}

#[test]
fn test_dialog_lifecycle() {
    let mut store = sample_store();

    // Cancel leaves the tree alone
    store.open_create_dialog(5).unwrap();
    store.edit_dialog(DraftField::Name, "Borrador.doc");
    assert!(store.cancel_dialog());
    assert_eq!(store.tree().len(), 5);
    assert!(!store.dialog().is_open());

    // Confirm with an empty name stays open
    store.open_create_dialog(5).unwrap();
    assert_matches!(
        store.confirm_dialog(),
        Err(TreeError::ValidationFailed("name"))
    );
    assert!(store.dialog().is_open());

    // Fill it in and confirm
    store.edit_dialog(DraftField::Name, "Acta.doc");
    store.edit_dialog(DraftField::Kind, "DOC");
    store.edit_dialog(DraftField::Code, "ACT-7");
    assert_eq!(store.confirm_dialog().unwrap(), Some(6));
    assert!(!store.dialog().is_open());

    let node = store.tree().get(6).unwrap();
    assert_eq!(node.parent_id, Some(5));
    assert_eq!(node.kind(), Some(&FileKind::Doc));
    assert_eq!(node.file_meta().unwrap().code.as_deref(), Some("ACT-7"));

    // Edit shows what was stored
    store.open_edit_dialog(6).unwrap();
    let draft = store.dialog().draft().unwrap();
    assert_eq!(draft.kind, "doc");
    assert_eq!(draft.code, "ACT-7");
    store.edit_dialog(DraftField::Name, "Acta final.doc");
    assert_eq!(store.confirm_dialog().unwrap(), Some(6));
    assert_eq!(store.tree().get(6).unwrap().name, "Acta final.doc");
    assert_eq!(store.tree().len(), 6);
}

#[test]
fn test_deleting_open_menu_and_dialog_target() {
    let mut store = sample_store();
    store.toggle_menu(4).unwrap();
    store.open_edit_dialog(4).unwrap();
    store.delete(3);
    assert_eq!(store.active_menu(), None);
    assert!(!store.dialog().is_open());
    assert!(!store.is_expanded(3));
}

#[test]
fn test_move_and_reorder() {
    let mut store = sample_store();
    store.move_node(5, Some(3)).unwrap();
    let ids: Vec<_> = store.children(Some(3)).iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![4, 5]);

    store.reorder(5, 1).unwrap();
    let ids: Vec<_> = store.children(Some(3)).iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![5, 4]);

    assert_matches!(
        store.move_node(1, Some(3)),
        Err(TreeError::Cycle { id: 1, parent: 3 })
    );
}

#[test]
fn test_search_finds_documents() {
    let store = sample_store();
    let hits = store.search("informe");
    assert_eq!(hits.first().map(|(node, _)| node.id), Some(2));
    assert!(store.search("   ").is_empty());
}

//! Draft lifecycle against a real data directory

use onboard_record::RecordId;
use onboard_store::{DraftIndexEntry, IndexRepository, JsonIndexFile};
use onboard_test_utils::{sample_record, FlakyIndex, TestData};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fs;
use std::sync::Arc;

#[test]
fn create_then_list_and_load() {
    let data = TestData::new();
    let store = data.store();

    let record = store.create("Jane", "Smith", 0).unwrap();
    let listed = store.list_all().unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].record_id, record.id());

    let loaded = store.load(record.id()).unwrap().unwrap();
    assert_eq!(loaded.employee.first_name, "Jane");
    assert_eq!(loaded.employee.last_name, "Smith");
}

#[test]
fn create_leaves_no_file_when_the_index_write_fails() {
    let data = TestData::new();
    let index = Arc::new(FlakyIndex::<DraftIndexEntry>::new());
    let store = data.store_with_index(index.clone());

    index.fail_saves(true);
    assert!(store.create("Bob", "Beta", 0).is_err());

    let leftovers = fs::read_dir(data.layout().drafts_dir()).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[test]
fn delete_removes_file_and_entry() {
    let data = TestData::new();
    let store = data.store();
    let record = store.create("Jane", "Smith", 0).unwrap();

    store.delete(record.id()).unwrap();

    assert!(store.list_all().unwrap().is_empty());
    assert!(store.load(record.id()).unwrap().is_none());
    assert!(!store.has_any().unwrap());
}

#[test]
fn out_of_band_deletion_self_heals_and_persists() {
    let data = TestData::new();
    let store = data.store();
    let kept = store.create("Kept", "Draft", 0).unwrap();
    let lost = store.create("Lost", "Draft", 0).unwrap();

    fs::remove_file(store.draft_path(lost.id())).unwrap();

    let first: Vec<RecordId> = store.list_all().unwrap().iter().map(|e| e.record_id).collect();
    assert_eq!(first, vec![kept.id()]);

    // a fresh reader of the index file sees the pruned document
    let on_disk: JsonIndexFile<DraftIndexEntry> =
        JsonIndexFile::new(data.layout().draft_index_path());
    let doc = on_disk.load().unwrap();
    assert!(!doc.contains(lost.id()));
    assert!(doc.contains(kept.id()));

    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn corrupt_draft_is_pruned_from_listing_but_load_reports_format() {
    let data = TestData::new();
    let store = data.store();
    let record = store.create("Jane", "Smith", 0).unwrap();
    fs::write(store.draft_path(record.id()), b"\x00\x01garbage").unwrap();

    assert!(store.list_all().unwrap().is_empty());
    assert!(store.load(record.id()).unwrap_err().is_format());
}

#[test]
fn repeated_saves_keep_one_entry() {
    let data = TestData::new();
    let store = data.store();
    let mut record = sample_record("Jane", "Smith");

    store.save(&mut record, Some(2)).unwrap();
    store.save(&mut record, Some(2)).unwrap();
    store.save(&mut record, None).unwrap();

    let listed = store.list_all().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].last_page_index, 2);

    let loaded = store.load(record.id()).unwrap().unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn rebuild_adopts_files_dropped_from_the_index() {
    let data = TestData::new();
    let store = data.store();
    let record = store.create("Jane", "Smith", 4).unwrap();

    fs::remove_file(data.layout().draft_index_path()).unwrap();
    assert!(store.list_all().unwrap().is_empty());

    assert_eq!(store.rebuild_index().unwrap(), 1);
    let listed = store.list_all().unwrap();
    assert_eq!(listed[0].record_id, record.id());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn last_modified_never_decreases_and_last_given_page_wins(
        pages in prop::collection::vec(prop::option::of(0usize..13), 1..8)
    ) {
        let data = TestData::new();
        let store = data.store();
        let mut record = store.create("Jane", "Smith", 0).unwrap();
        let mut previous = record.last_modified();
        let mut expected_page = 0;

        for page in &pages {
            store.save(&mut record, *page).unwrap();
            prop_assert!(record.last_modified() >= previous);
            previous = record.last_modified();
            if let Some(page) = page {
                expected_page = *page;
            }
        }

        let entry = store.entry(record.id()).unwrap().unwrap();
        prop_assert_eq!(entry.last_page_index, expected_page);
        prop_assert_eq!(entry.last_modified, record.last_modified());
    }
}

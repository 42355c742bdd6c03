//! Controller navigation, auto-save and teardown against a real store

use onboard_record::{EmployeeName, RecordId, Requestor, RequestorProfile};
use onboard_store::DraftIndexEntry;
use onboard_test_utils::{scripted_pages, FlakyIndex, TestData};
use onboard_wizard::{
    SaveStatus, UserDetails, WizardConfig, WizardController, WizardError, STANDARD_PAGE_COUNT,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn config() -> WizardConfig {
    WizardConfig::new().with_auto_save_interval(Duration::from_millis(750))
}

async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn validation_failure_blocks_next_without_saving() {
    let data = TestData::new();
    let store = data.store();
    let (pages, probes) = scripted_pages(3);
    let wizard =
        WizardController::start_new_with_pages(Arc::clone(&store), "Jane", "Smith", pages, &config())
            .unwrap();
    let before = store.load(wizard.record_id()).unwrap().unwrap();

    probes[0].lock().validation_error = Some("first name required".to_string());
    let err = wizard.next().unwrap_err();

    assert!(matches!(err, WizardError::Validation(ref m) if m == "first name required"));
    assert!(err.is_refusal());
    assert_eq!(wizard.current_index(), 0);
    assert_eq!(probes[0].lock().saves, 0);
    let after = store.load(wizard.record_id()).unwrap().unwrap();
    assert_eq!(after.last_modified(), before.last_modified());
}

#[tokio::test(start_paused = true)]
async fn back_ignores_validation() {
    let data = TestData::new();
    let (pages, probes) = scripted_pages(3);
    let wizard =
        WizardController::start_new_with_pages(data.store(), "Jane", "Smith", pages, &config())
            .unwrap();

    wizard.next().unwrap();
    probes[1].lock().validation_error = Some("broken".to_string());

    let nav = wizard.back().unwrap();
    assert_eq!(nav.index, 0);
    assert_eq!(probes[1].lock().saves, 1);
    assert_eq!(probes[0].lock().loads, 2);
}

#[tokio::test(start_paused = true)]
async fn navigation_persists_page_and_index() {
    let data = TestData::new();
    let store = data.store();
    let (pages, _probes) = scripted_pages(4);
    let wizard =
        WizardController::start_new_with_pages(Arc::clone(&store), "Jane", "Smith", pages, &config())
            .unwrap();

    wizard.next().unwrap();
    wizard.next().unwrap();

    let saved = store.load(wizard.record_id()).unwrap().unwrap();
    assert_eq!(saved.notes.misc_notes, "P0;P1;");
    let entry = store.entry(wizard.record_id()).unwrap().unwrap();
    assert_eq!(entry.last_page_index, 1);

    let summary: DraftIndexEntry = wizard.save_and_close().unwrap();
    assert_eq!(summary.last_page_index, 2);
    assert_eq!(store.entry(wizard.record_id()).unwrap().unwrap().last_page_index, 2);
}

#[tokio::test(start_paused = true)]
async fn edit_burst_auto_saves_once() {
    let data = TestData::new();
    let (pages, probes) = scripted_pages(2);
    let wizard =
        WizardController::start_new_with_pages(data.store(), "Jane", "Smith", pages, &config())
            .unwrap();
    let status = wizard.save_status();

    for _ in 0..4 {
        wizard.notify_changed();
        wait(200).await;
    }
    assert_eq!(probes[0].lock().saves, 0);
    assert_eq!(*status.borrow(), SaveStatus::Pending);

    wait(1_000).await;
    assert_eq!(probes[0].lock().saves, 1);
    assert!(matches!(*status.borrow(), SaveStatus::Saved(_)));
}

#[tokio::test(start_paused = true)]
async fn close_and_drop_flush_pending_edits() {
    let data = TestData::new();
    let store = data.store();

    let (pages, probes) = scripted_pages(2);
    let wizard =
        WizardController::start_new_with_pages(Arc::clone(&store), "Jane", "Smith", pages, &config())
            .unwrap();
    let id = wizard.record_id();
    wizard.notify_changed();
    wizard.close().unwrap();
    assert_eq!(probes[0].lock().saves, 1);
    assert_eq!(store.load(id).unwrap().unwrap().notes.misc_notes, "P0;");

    let (pages, probes) = scripted_pages(2);
    let wizard = WizardController::resume_with_pages(Arc::clone(&store), id, None, pages, &config())
        .unwrap();
    wizard.notify_changed();
    drop(wizard);
    assert_eq!(probes[0].lock().saves, 1);
    assert_eq!(store.load(id).unwrap().unwrap().notes.misc_notes, "P0;P0;");
}

#[tokio::test(start_paused = true)]
async fn resume_clamps_page_and_reports_missing_drafts() {
    let data = TestData::new();
    let store = data.store();
    let record = store.create("Jane", "Smith", 0).unwrap();

    let wizard =
        WizardController::resume(Arc::clone(&store), record.id(), Some(99), &config()).unwrap();
    assert_eq!(wizard.current_index(), STANDARD_PAGE_COUNT - 1);
    drop(wizard);

    let missing = WizardController::resume(store, RecordId::new(), None, &config());
    assert!(matches!(missing, Err(WizardError::NotFound(_))));
}

#[tokio::test(start_paused = true)]
async fn resume_without_page_uses_the_index() {
    let data = TestData::new();
    let store = data.store();
    let record = store.create("Jane", "Smith", 4).unwrap();

    let wizard = WizardController::resume(store, record.id(), None, &config()).unwrap();
    assert_eq!(wizard.current_index(), 4);
    assert_eq!(wizard.navigation().title, "Account Setup");
}

#[tokio::test(start_paused = true)]
async fn email_follows_name_until_overridden() {
    let data = TestData::new();
    let store = data.store();
    let wizard =
        WizardController::start_new(Arc::clone(&store), "Jane", "Smith", &config()).unwrap();

    wizard.edit_section::<EmployeeName, _>(|name| name.last_name = "Jones".to_string());
    wizard.next().unwrap();
    wizard.next().unwrap();
    let record = wizard.record();
    assert_eq!(record.user_info.email_address, "jjones@arnotrealty.com");
    assert_eq!(record.account.domain_username, "jsmith");

    wizard.edit_section::<UserDetails, _>(|details| details.override_email("jane@custom.test"));
    wizard.back().unwrap();
    wizard.back().unwrap();
    wizard.edit_section::<EmployeeName, _>(|name| name.last_name = "Brown".to_string());
    wizard.next().unwrap();

    let record = wizard.record();
    assert_eq!(record.employee.last_name, "Brown");
    assert_eq!(record.user_info.email_address, "jane@custom.test");
    assert!(record.user_info.email_overridden);
    wizard.close().unwrap();

    let saved = store.load(record.id()).unwrap().unwrap();
    assert_eq!(saved.user_info.email_address, "jane@custom.test");
}

#[tokio::test(start_paused = true)]
async fn auto_save_failures_are_reported_and_navigation_surfaces_them() {
    let data = TestData::new();
    let index = Arc::new(FlakyIndex::<DraftIndexEntry>::new());
    let store = data.store_with_index(index.clone());
    let (pages, _probes) = scripted_pages(3);
    let wizard =
        WizardController::start_new_with_pages(store, "Jane", "Smith", pages, &config()).unwrap();
    let status = wizard.save_status();

    index.fail_saves(true);
    wizard.notify_changed();
    wait(1_000).await;
    assert!(matches!(*status.borrow(), SaveStatus::Failed(_)));

    let err = wizard.next().unwrap_err();
    assert!(matches!(err, WizardError::Store(_)));
    assert_eq!(wizard.current_index(), 0);

    index.fail_saves(false);
    assert_eq!(wizard.next().unwrap().index, 1);
}

#[tokio::test(start_paused = true)]
async fn saved_requestor_fills_only_empty_requestor_sections() {
    let data = TestData::new();
    let store = data.store();
    let profile = RequestorProfile {
        name: "Pat Manager".to_string(),
        title: "Property Manager".to_string(),
        phone: "555-0100".to_string(),
        email: "pat@arnotrealty.com".to_string(),
        ..RequestorProfile::default()
    };
    let with_profile = config().with_requestor(profile);

    let wizard =
        WizardController::start_new(Arc::clone(&store), "Jane", "Smith", &with_profile).unwrap();
    for _ in 0..3 {
        wizard.next().unwrap();
    }
    assert_eq!(wizard.navigation().title, "Requestor Information");
    let shown = wizard.edit_section::<Requestor, _>(|fields| fields.clone()).unwrap();
    assert_eq!(shown.requestor_name, "Pat Manager");
    assert_eq!(shown.requestor_phone, "555-0100");
    let id = wizard.record_id();
    wizard.close().unwrap();
    let saved = store.load(id).unwrap().unwrap();
    assert_eq!(saved.requestor.requestor_email, "pat@arnotrealty.com");

    let other = store.create("Bob", "Beta", 3).unwrap();
    let mut record = store.load(other.id()).unwrap().unwrap();
    record.requestor.requestor_name = "Someone Else".to_string();
    store.save(&mut record, None).unwrap();

    let wizard = WizardController::resume(Arc::clone(&store), other.id(), None, &with_profile)
        .unwrap();
    let shown = wizard.edit_section::<Requestor, _>(|fields| fields.clone()).unwrap();
    assert_eq!(shown.requestor_name, "Someone Else");
    assert_eq!(shown.requestor_phone, "");
}

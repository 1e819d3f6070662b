//! Integration tests for dialog creation and message submission

mod common;

use common::Harness;
use parley::model::field;
use parley::SendOutcome;

#[tokio::test]
async fn full_flow_from_sign_up_to_text_message() {
    let harness = Harness::spawn();
    let identity = harness.sign_up_and_wait("ada@example.com", "s3cret!").await;

    let dialog_ref = harness.dialogs.create_dialog("uid-peer").await.unwrap();
    assert_eq!(
        harness.session.active_dialog_ref().await.unwrap(),
        dialog_ref
    );

    let outcome = harness
        .composer
        .send_text(dialog_ref.id(), "hello")
        .await
        .unwrap();
    assert!(outcome.is_sent());

    let messages = harness
        .store
        .documents(&dialog_ref.subcollection("messages"));
    assert_eq!(messages.len(), 1);
    let (_, fields) = &messages[0];
    assert_eq!(fields[field::TYPE].as_str(), Some("text"));
    assert_eq!(fields[field::TEXT].as_str(), Some("hello"));
    assert!(fields[field::DATE].as_timestamp().is_some());

    // The dialog document itself holds exactly the two participants.
    let dialogs = harness
        .store
        .documents(dialog_ref.collection());
    assert_eq!(dialogs.len(), 1);
    assert_eq!(
        dialogs[0].1[field::PARTICIPANTS]
            .as_string_list()
            .unwrap()
            .to_vec(),
        vec![identity.uid, "uid-peer".to_string()]
    );

    harness.sync.unsubscribe().await;
}

#[tokio::test]
async fn dialog_creation_failure_leaves_active_ref_unchanged() {
    let harness = Harness::spawn();
    harness.sign_up_and_wait("ada@example.com", "s3cret!").await;

    let first = harness.dialogs.create_dialog("uid-peer").await.unwrap();

    harness.store.set_fail_writes(true);
    assert!(harness.dialogs.create_dialog("uid-other").await.is_none());
    harness.store.set_fail_writes(false);

    assert_eq!(harness.session.active_dialog_ref().await.unwrap(), first);

    harness.sync.unsubscribe().await;
}

#[tokio::test]
async fn image_message_defaults_caption_and_keeps_link() {
    let harness = Harness::spawn();
    harness.sign_up_and_wait("ada@example.com", "s3cret!").await;
    let dialog_ref = harness.dialogs.create_dialog("uid-peer").await.unwrap();

    let outcome = harness
        .composer
        .send_image(dialog_ref.id(), None, "http://x/y.png")
        .await
        .unwrap();
    assert!(outcome.is_sent());

    let messages = harness
        .store
        .documents(&dialog_ref.subcollection("messages"));
    let (_, fields) = &messages[0];
    assert_eq!(fields[field::TYPE].as_str(), Some("image"));
    assert_eq!(fields[field::TEXT].as_str(), Some(""));
    assert_eq!(fields[field::LINK_ON_FILE].as_str(), Some("http://x/y.png"));

    harness.sync.unsubscribe().await;
}

#[tokio::test]
async fn invalid_submissions_are_skipped_without_insertion() {
    let harness = Harness::spawn();
    harness.sign_up_and_wait("ada@example.com", "s3cret!").await;
    let dialog_ref = harness.dialogs.create_dialog("uid-peer").await.unwrap();

    let no_dialog = harness.composer.send_text("", "hello").await.unwrap();
    let no_text = harness.composer.send_text(dialog_ref.id(), "").await.unwrap();
    let no_link = harness
        .composer
        .send_document(dialog_ref.id(), Some("caption"), "")
        .await
        .unwrap();

    for outcome in [no_dialog, no_text, no_link] {
        assert!(matches!(outcome, SendOutcome::Skipped { .. }));
    }
    assert!(harness
        .store
        .documents(&dialog_ref.subcollection("messages"))
        .is_empty());

    harness.sync.unsubscribe().await;
}

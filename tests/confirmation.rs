// Account confirmation trigger and admin promotion tests.
//
// Both side effects of the trigger are independent: each failure case
// checks that the other step still ran and the trigger still completed.

mod common;

use std::sync::Arc;

use common::{FakeIdentity, FakeProfiles};
use lostfound::error::GroupError;
use lostfound::pipeline::admin::GroupAdmin;
use lostfound::pipeline::confirmation::{
    ConfirmationOutcome, GroupAssignmentTrigger, PostConfirmationEvent,
};
use lostfound::runtime::handlers::ConfirmationHandler;
use lostfound::runtime::InvocationHandler;

fn event_json() -> serde_json::Value {
    serde_json::json!({
        "version": "1",
        "region": "us-east-1",
        "userPoolId": "us-east-1_Pool",
        "userName": "jdoe",
        "triggerSource": "PostConfirmation_ConfirmSignUp",
        "callerContext": { "clientId": "abc" },
        "request": {
            "userAttributes": {
                "sub": "5468d468-4061-70ed-8870-45c766d26225",
                "email": "jdoe@campus.edu",
                "email_verified": "true"
            }
        },
        "response": {}
    })
}

fn event() -> PostConfirmationEvent {
    serde_json::from_value(event_json()).unwrap()
}

fn trigger(identity: &Arc<FakeIdentity>, profiles: &Arc<FakeProfiles>) -> GroupAssignmentTrigger {
    GroupAssignmentTrigger::new(identity.clone(), profiles.clone(), "User")
}

// ============================================================
// Group-assignment trigger
// ============================================================

#[tokio::test]
async fn confirmation_assigns_group_and_creates_profile() {
    let identity = Arc::new(FakeIdentity::default());
    let profiles = Arc::new(FakeProfiles::default());

    let outcome = trigger(&identity, &profiles).on_confirmed(&event()).await;

    assert_eq!(
        outcome,
        ConfirmationOutcome {
            group_assigned: true,
            profile_created: true
        }
    );
    let calls = identity.calls.lock().unwrap();
    assert_eq!(
        calls[0],
        (
            "us-east-1_Pool".to_string(),
            "jdoe".to_string(),
            "User".to_string()
        )
    );
    let created = profiles.created.lock().unwrap();
    assert_eq!(
        created[0].profile_owner,
        "5468d468-4061-70ed-8870-45c766d26225::jdoe"
    );
    assert_eq!(created[0].email, "jdoe@campus.edu");
}

#[tokio::test]
async fn group_failure_still_creates_profile() {
    let identity = Arc::new(FakeIdentity {
        fail: true,
        ..Default::default()
    });
    let profiles = Arc::new(FakeProfiles::default());

    let outcome = trigger(&identity, &profiles).on_confirmed(&event()).await;

    assert!(!outcome.group_assigned);
    assert!(outcome.profile_created);
    assert_eq!(profiles.created.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn profile_failure_still_assigns_group() {
    let identity = Arc::new(FakeIdentity::default());
    let profiles = Arc::new(FakeProfiles {
        fail: true,
        ..Default::default()
    });

    let outcome = trigger(&identity, &profiles).on_confirmed(&event()).await;

    assert!(outcome.group_assigned);
    assert!(!outcome.profile_created);
}

#[tokio::test]
async fn missing_sub_fails_only_the_profile_step() {
    let identity = Arc::new(FakeIdentity::default());
    let profiles = Arc::new(FakeProfiles::default());
    let mut event = event();
    event.request.user_attributes.remove("sub");

    let outcome = trigger(&identity, &profiles).on_confirmed(&event).await;

    assert!(outcome.group_assigned);
    assert!(!outcome.profile_created);
    assert!(profiles.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn replayed_confirmation_keeps_one_profile() {
    let identity = Arc::new(FakeIdentity::default());
    let profiles = Arc::new(FakeProfiles::default());
    let trigger = trigger(&identity, &profiles);

    trigger.on_confirmed(&event()).await;
    let second = trigger.on_confirmed(&event()).await;

    assert!(second.profile_created);
    assert_eq!(profiles.created.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn forgot_password_confirmation_provisions_nothing() {
    let identity = Arc::new(FakeIdentity::default());
    let profiles = Arc::new(FakeProfiles::default());
    let mut event = event();
    event.trigger_source = Some("PostConfirmation_ConfirmForgotPassword".to_string());

    let outcome = trigger(&identity, &profiles).on_confirmed(&event).await;

    assert_eq!(outcome, ConfirmationOutcome::default());
    assert!(identity.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn handler_echoes_event_even_when_both_steps_fail() {
    let identity = Arc::new(FakeIdentity {
        fail: true,
        ..Default::default()
    });
    let profiles = Arc::new(FakeProfiles {
        fail: true,
        ..Default::default()
    });
    let handler = ConfirmationHandler {
        trigger: trigger(&identity, &profiles),
    };

    let response = handler.invoke(event_json()).await.unwrap();
    assert_eq!(response, event_json());
}

// ============================================================
// Admin promotion
// ============================================================

fn admin(identity: &Arc<FakeIdentity>) -> GroupAdmin {
    GroupAdmin::new(
        identity.clone(),
        "us-east-1_Pool",
        vec!["User".to_string(), "Admin".to_string()],
    )
}

#[tokio::test]
async fn promote_adds_user_to_requested_group() {
    let identity = Arc::new(FakeIdentity::default());
    admin(&identity).promote("user-123", "Admin").await.unwrap();

    let calls = identity.calls.lock().unwrap();
    assert_eq!(calls[0].1, "user-123");
    assert_eq!(calls[0].2, "Admin");
}

#[tokio::test]
async fn promote_rejects_unknown_group_and_empty_user() {
    let identity = Arc::new(FakeIdentity::default());
    let admin = admin(&identity);

    let err = admin.promote("user-123", "Superuser").await.unwrap_err();
    assert!(matches!(err, GroupError::Validation(_)));
    let err = admin.promote(" ", "Admin").await.unwrap_err();
    assert_eq!(err.kind(), "ValidationError");
    assert!(identity.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn promote_wraps_transport_failure() {
    let identity = Arc::new(FakeIdentity {
        fail: true,
        ..Default::default()
    });
    let err = admin(&identity).promote("user-123", "Admin").await.unwrap_err();
    assert!(matches!(err, GroupError::Transport(_)));
}

use gatehouse::{
    AuthError, Credentials, Handler, Hook, LocationChange, Navigator, PasswordReset, SessionEvent,
    SignUpFailure, User,
    testing::{MockAccountService, MockSessionService, Reply},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

mod common;
use common::Fixture;

fn credentials() -> Credentials {
    Credentials::new("ada@example.com", "hunter2")
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_sign_in_sets_user_and_broadcasts_success() {
    let fx = Fixture::new();
    fx.sessions.set_sign_in(Reply::Ok(User::new("1")));

    let user = fx.gatehouse.sign_in(&credentials()).await.unwrap();

    assert_eq!(user.id(), Some("1"));
    assert!(fx.gatehouse.is_signed_in());
    assert_eq!(fx.events.names(), vec!["signInSuccess"]);
    assert_eq!(
        fx.sessions.last_credentials().map(|c| c.email),
        Some("ada@example.com".to_string())
    );
    // Default signInSuccess without a redirect query goes home.
    assert_eq!(fx.navigator.history(), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_sign_in_without_identifier_fails() {
    let fx = Fixture::new();
    fx.sessions
        .set_sign_in(Reply::Ok(User::builder().email("ada@example.com").build()));

    let err = fx.gatehouse.sign_in(&credentials()).await.unwrap_err();

    assert!(matches!(err, AuthError::Unidentified(_)));
    assert!(fx.gatehouse.current_user().is_none());
    assert_eq!(fx.events.count("signInFailure"), 1);
    assert_eq!(fx.events.count("signInSuccess"), 0);
}

#[tokio::test]
async fn test_sign_in_rejection_broadcasts_message() {
    let fx = Fixture::new();

    let err = fx.gatehouse.sign_in(&credentials()).await.unwrap_err();

    assert_eq!(err.message(), "invalid credentials");
    assert_eq!(
        fx.events.events(),
        vec![SessionEvent::SignInFailure {
            message: "invalid credentials".into()
        }]
    );
}

#[tokio::test]
async fn test_sign_in_retry_after_failure() {
    let fx = Fixture::new();
    assert!(fx.gatehouse.sign_in(&credentials()).await.is_err());

    fx.sessions.set_sign_in(Reply::Ok(User::new("2")));
    assert!(fx.gatehouse.sign_in(&credentials()).await.is_ok());

    assert_eq!(fx.events.names(), vec!["signInFailure", "signInSuccess"]);
    assert_eq!(fx.sessions.sign_in_calls(), 2);
}

#[tokio::test]
async fn test_sign_in_success_resumes_redirect_target() {
    let fx = Fixture::new();
    fx.gatehouse
        .on_location_change(LocationChange::to("/users/42"))
        .await;
    assert_eq!(fx.navigator.path(), "/signIn");

    fx.sessions.set_sign_in(Reply::Ok(User::new("42")));
    fx.gatehouse.sign_in(&credentials()).await.unwrap();

    assert_eq!(fx.navigator.path(), "/users/42");
    assert!(fx.navigator.query().is_empty());
}

// ============================================================================
// Sign-out
// ============================================================================

#[tokio::test]
async fn test_sign_out_when_signed_out_makes_no_remote_call() {
    let fx = Fixture::new();

    fx.gatehouse.sign_out().await.unwrap();

    assert_eq!(fx.events.names(), vec!["signOutSuccess"]);
    assert_eq!(fx.sessions.sign_out_calls(), 0);
    assert_eq!(
        fx.notifier.successes(),
        vec!["User has successfully signed out.".to_string()]
    );
}

#[tokio::test]
async fn test_sign_out_closes_remote_session() {
    let fx = Fixture::new();
    fx.gatehouse.authenticate(User::new("1")).await.unwrap();
    fx.events.clear();

    fx.gatehouse.sign_out().await.unwrap();

    assert_eq!(fx.sessions.sign_out_calls(), 1);
    assert!(fx.gatehouse.current_user().is_none());
    assert_eq!(fx.events.names(), vec!["signOutSuccess"]);
}

#[tokio::test]
async fn test_sign_out_failure_still_clears_user() {
    let fx = Fixture::new();
    fx.gatehouse.authenticate(User::new("1")).await.unwrap();
    fx.sessions.set_sign_out(Reply::rejected("session store down"));

    let err = fx.gatehouse.sign_out().await.unwrap_err();

    assert_eq!(err.message(), "session store down");
    assert!(fx.gatehouse.current_user().is_none());
}

// ============================================================================
// Authenticate
// ============================================================================

#[tokio::test]
async fn test_authenticate_emits_success_then_authenticated() {
    let fx = Fixture::new();

    fx.gatehouse.authenticate(User::new("9")).await.unwrap();

    assert_eq!(fx.events.names(), vec!["signInSuccess", "authenticated"]);
    assert_eq!(fx.gatehouse.current_user(), Some(User::new("9")));
}

#[tokio::test]
async fn test_authenticate_rejects_unidentified_user() {
    let fx = Fixture::new();

    let err = fx
        .gatehouse
        .authenticate(User::builder().name("Ada").build())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidUser));
    assert!(fx.events.events().is_empty());
    assert!(!fx.gatehouse.is_logged_in());
}

// ============================================================================
// Sign-up
// ============================================================================

#[tokio::test]
async fn test_sign_up_success_broadcasts_user() {
    let fx = Fixture::new();
    fx.accounts.set_create(Reply::Ok(User::new("5")));

    fx.gatehouse.sign_up(&credentials()).await;

    assert_eq!(
        fx.events.events(),
        vec![SessionEvent::SignUpSuccess {
            user: User::new("5")
        }]
    );
    assert!(fx.gatehouse.current_user().is_none());
}

#[tokio::test]
async fn test_sign_up_unidentified_response_is_failure() {
    let fx = Fixture::new();
    let pending = User::builder().email("ada@example.com").build();
    fx.accounts.set_create(Reply::Ok(pending.clone()));

    fx.gatehouse.sign_up(&credentials()).await;

    assert_eq!(
        fx.events.events(),
        vec![SessionEvent::SignUpFailure(SignUpFailure::Unidentified(
            pending
        ))]
    );
}

#[tokio::test]
async fn test_sign_up_rejection_clears_user() {
    let fx = Fixture::new();
    fx.gatehouse.authenticate(User::new("1")).await.unwrap();
    fx.events.clear();
    fx.accounts.set_create(Reply::rejected("email taken"));

    fx.gatehouse.sign_up(&credentials()).await;

    assert!(fx.gatehouse.current_user().is_none());
    assert_eq!(
        fx.events.events(),
        vec![SessionEvent::SignUpFailure(SignUpFailure::Rejected {
            message: "email taken".into()
        })]
    );
}

#[tokio::test]
async fn test_sign_up_hooks_receive_current_user() {
    let fx = Fixture::new();
    fx.gatehouse.authenticate(User::new("admin")).await.unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    fx.gatehouse
        .set_handler(
            "signUpSuccess",
            Handler::SignUp(Hook::sync(move |_, response: gatehouse::SignUpResponse| {
                assert_eq!(response.current, Some(User::new("admin")));
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();

    fx.gatehouse.sign_up(&credentials()).await;

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(fx.accounts.create_calls(), 1);
}

// ============================================================================
// Confirmation and password reset
// ============================================================================

#[tokio::test]
async fn test_confirm_sign_up_pairs() {
    let fx = Fixture::new();
    fx.gatehouse.confirm_sign_up("tok-1").await.unwrap();

    fx.accounts.set_confirm(Reply::rejected("token expired"));
    let err = fx.gatehouse.confirm_sign_up("tok-2").await.unwrap_err();

    assert_eq!(err.message(), "token expired");
    assert_eq!(
        fx.events.names(),
        vec!["signUpConfirmationSuccess", "signUpConfirmationFailure"]
    );
    assert_eq!(fx.events.failures(), vec!["signUpConfirmationFailure"]);
    assert_eq!(fx.accounts.last_token().as_deref(), Some("tok-2"));
}

#[tokio::test]
async fn test_password_reset_pairs() {
    let fx = Fixture::new();

    fx.gatehouse
        .request_password_reset("ada@example.com")
        .await
        .unwrap();
    fx.sessions
        .set_submit_password_reset(Reply::rejected("passwords differ"));
    let err = fx
        .gatehouse
        .submit_password_reset(&PasswordReset::new("tok", "s3cret"))
        .await
        .unwrap_err();

    assert_eq!(err.message(), "passwords differ");
    assert_eq!(
        fx.events.names(),
        vec!["requestPasswordResetSuccess", "submitPasswordResetFailure"]
    );
    assert_eq!(fx.events.failures(), vec!["submitPasswordResetFailure"]);
    assert_eq!(
        fx.sessions.last_reset_email().as_deref(),
        Some("ada@example.com")
    );
    assert!(fx.gatehouse.current_user().is_none());
}

// ============================================================================
// Reload and expired sessions
// ============================================================================

#[tokio::test]
async fn test_reload_user_overwrites_current_user() {
    let sessions = Arc::new(MockSessionService::new());
    let accounts = Arc::new(MockAccountService::new());
    accounts.set_current_user(Reply::Ok(User::builder().id("1").name("Ada").build()));
    let fx = Fixture::from_services(sessions, accounts, |b| b);
    fx.gatehouse.authenticate(User::new("1")).await.unwrap();

    fx.gatehouse.reload_user().await;

    let user = fx.gatehouse.current_user().unwrap();
    assert_eq!(user.name.as_deref(), Some("Ada"));
    assert_eq!(fx.accounts.last_force_reload(), Some(true));
}

#[tokio::test]
async fn test_reload_failure_keeps_current_user() {
    let fx = Fixture::new();
    fx.gatehouse.authenticate(User::new("1")).await.unwrap();

    fx.gatehouse.reload_user().await;

    assert_eq!(fx.gatehouse.current_user(), Some(User::new("1")));
    assert_eq!(fx.accounts.current_user_calls(), 1);
}

#[tokio::test]
async fn test_require_sign_in_notifies_and_redirects() {
    let fx = Fixture::new();

    fx.gatehouse.require_sign_in();

    assert_eq!(
        fx.notifier.errors(),
        vec!["User is not authenticated, please sign in to continue.".to_string()]
    );
    assert_eq!(fx.navigator.path(), "/signIn");
}

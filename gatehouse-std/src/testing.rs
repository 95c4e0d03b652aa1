//! Testing utilities for gatehouse.
//!
//! This module provides scriptable back-ends and recorders to make testing
//! guards, flows and custom handlers easier.
//!
//! # Features
//!
//! - [`MockSessionService`]: A session service with scripted replies, call
//!   counters and an optional gate that holds session probes
//! - [`MockAccountService`]: An account service with scripted replies
//! - [`RecordingSubscriber`]: A subscriber that records every broadcast event
//! - [`RecordingNotifier`]: A notifier that records every notice

use crate::bus::Subscriber;
use async_trait::async_trait;
use gatehouse_core::{
    AccountService, Credentials, Notifier, PasswordReset, ServiceError, SessionEvent,
    SessionService, User,
};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Semaphore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Scripted replies
// ============================================================================

/// A cloneable stand-in for `Result<T, ServiceError>`.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Resolve with a value.
    Ok(T),
    /// Fail with [`ServiceError::Rejected`].
    Rejected {
        /// Optional status code.
        status: Option<u16>,
        /// Rejection message.
        message: String,
    },
    /// Fail with [`ServiceError::Transport`].
    Transport(String),
}

impl<T: Clone> Reply<T> {
    /// A rejection without status code.
    pub fn rejected(message: impl Into<String>) -> Self {
        Reply::Rejected {
            status: None,
            message: message.into(),
        }
    }

    fn to_result(&self) -> Result<T, ServiceError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Rejected { status, message } => Err(ServiceError::Rejected {
                status: *status,
                message: message.clone(),
            }),
            Reply::Transport(message) => Err(ServiceError::transport(message.clone())),
        }
    }
}

/// Holds session probes until released.
///
/// # Example
///
/// ```rust,ignore
/// let service = MockSessionService::new();
/// let gate = service.hold_session();
///
/// // ... start navigations; probes wait ...
/// gate.release();
/// ```
#[derive(Debug, Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    fn new() -> Self {
        Self(Arc::new(Semaphore::new(0)))
    }

    /// Let every held and future probe through.
    pub fn release(&self) {
        self.0.close();
    }

    async fn pass(&self) {
        // A closed semaphore fails every acquire immediately.
        if let Ok(permit) = self.0.acquire().await {
            permit.forget();
        }
    }
}

// ============================================================================
// Mock Session Service
// ============================================================================

struct SessionScript {
    session: Reply<User>,
    sign_in: Reply<User>,
    sign_out: Reply<()>,
    request_password_reset: Reply<()>,
    submit_password_reset: Reply<()>,
}

/// A session service whose replies are scripted by the test.
///
/// Defaults: no session (401), sign-in rejected, everything else succeeds.
///
/// # Example
///
/// ```rust,ignore
/// let service = Arc::new(MockSessionService::new());
/// service.set_sign_in(Reply::Ok(User::new("1")));
///
/// // ... drive the flow ...
/// assert_eq!(service.sign_in_calls(), 1);
/// ```
pub struct MockSessionService {
    script: Mutex<SessionScript>,
    gate: Mutex<Option<Gate>>,
    session_calls: AtomicUsize,
    sign_in_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
    request_password_reset_calls: AtomicUsize,
    submit_password_reset_calls: AtomicUsize,
    last_credentials: Mutex<Option<Credentials>>,
    last_reset_email: Mutex<Option<String>>,
}

impl MockSessionService {
    /// Create a service with default replies.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(SessionScript {
                session: Reply::Rejected {
                    status: Some(401),
                    message: "no active session".into(),
                },
                sign_in: Reply::rejected("invalid credentials"),
                sign_out: Reply::Ok(()),
                request_password_reset: Reply::Ok(()),
                submit_password_reset: Reply::Ok(()),
            }),
            gate: Mutex::new(None),
            session_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            request_password_reset_calls: AtomicUsize::new(0),
            submit_password_reset_calls: AtomicUsize::new(0),
            last_credentials: Mutex::new(None),
            last_reset_email: Mutex::new(None),
        }
    }

    /// Create a service whose probe finds a session for `user`.
    pub fn with_session(user: User) -> Self {
        let service = Self::new();
        service.set_session(Reply::Ok(user));
        service
    }

    /// Script the session probe.
    pub fn set_session(&self, reply: Reply<User>) {
        lock(&self.script).session = reply;
    }

    /// Script sign-in.
    pub fn set_sign_in(&self, reply: Reply<User>) {
        lock(&self.script).sign_in = reply;
    }

    /// Script sign-out.
    pub fn set_sign_out(&self, reply: Reply<()>) {
        lock(&self.script).sign_out = reply;
    }

    /// Script the password reset request.
    pub fn set_request_password_reset(&self, reply: Reply<()>) {
        lock(&self.script).request_password_reset = reply;
    }

    /// Script the password reset submission.
    pub fn set_submit_password_reset(&self, reply: Reply<()>) {
        lock(&self.script).submit_password_reset = reply;
    }

    /// Hold every session probe until the returned gate is released.
    pub fn hold_session(&self) -> Gate {
        let gate = Gate::new();
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    /// Number of session probes received.
    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    /// Number of sign-in calls received.
    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    /// Number of remote sign-out calls received.
    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    /// Number of password reset requests received.
    pub fn request_password_reset_calls(&self) -> usize {
        self.request_password_reset_calls.load(Ordering::SeqCst)
    }

    /// Number of password reset submissions received.
    pub fn submit_password_reset_calls(&self) -> usize {
        self.submit_password_reset_calls.load(Ordering::SeqCst)
    }

    /// Credentials of the latest sign-in call.
    pub fn last_credentials(&self) -> Option<Credentials> {
        lock(&self.last_credentials).clone()
    }

    /// Address of the latest password reset request.
    pub fn last_reset_email(&self) -> Option<String> {
        lock(&self.last_reset_email).clone()
    }
}

impl Default for MockSessionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionService for MockSessionService {
    async fn session(&self) -> Result<User, ServiceError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let reply = lock(&self.script).session.clone();
        reply.to_result()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User, ServiceError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_credentials) = Some(credentials.clone());
        let reply = lock(&self.script).sign_in.clone();
        reply.to_result()
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        let reply = lock(&self.script).sign_out.clone();
        reply.to_result()
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), ServiceError> {
        self.request_password_reset_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_reset_email) = Some(email.to_string());
        let reply = lock(&self.script).request_password_reset.clone();
        reply.to_result()
    }

    async fn submit_password_reset(&self, _reset: &PasswordReset) -> Result<(), ServiceError> {
        self.submit_password_reset_calls.fetch_add(1, Ordering::SeqCst);
        let reply = lock(&self.script).submit_password_reset.clone();
        reply.to_result()
    }
}

// ============================================================================
// Mock Account Service
// ============================================================================

struct AccountScript {
    create: Reply<User>,
    confirm: Reply<()>,
    current_user: Reply<User>,
}

/// An account service whose replies are scripted by the test.
///
/// Defaults: create answers with user `"1"`, confirm succeeds, reload is
/// rejected.
pub struct MockAccountService {
    script: Mutex<AccountScript>,
    create_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
    current_user_calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
    last_force_reload: Mutex<Option<bool>>,
}

impl MockAccountService {
    /// Create a service with default replies.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(AccountScript {
                create: Reply::Ok(User::new("1")),
                confirm: Reply::Ok(()),
                current_user: Reply::rejected("not signed in"),
            }),
            create_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
            current_user_calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
            last_force_reload: Mutex::new(None),
        }
    }

    /// Script account creation.
    pub fn set_create(&self, reply: Reply<User>) {
        lock(&self.script).create = reply;
    }

    /// Script confirmation.
    pub fn set_confirm(&self, reply: Reply<()>) {
        lock(&self.script).confirm = reply;
    }

    /// Script the current-user fetch.
    pub fn set_current_user(&self, reply: Reply<User>) {
        lock(&self.script).current_user = reply;
    }

    /// Number of create calls received.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of confirm calls received.
    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    /// Number of current-user fetches received.
    pub fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    /// Token of the latest confirm call.
    pub fn last_token(&self) -> Option<String> {
        lock(&self.last_token).clone()
    }

    /// `force_reload` flag of the latest current-user fetch.
    pub fn last_force_reload(&self) -> Option<bool> {
        *lock(&self.last_force_reload)
    }
}

impl Default for MockAccountService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountService for MockAccountService {
    async fn create(&self, _credentials: &Credentials) -> Result<User, ServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let reply = lock(&self.script).create.clone();
        reply.to_result()
    }

    async fn confirm(&self, token: &str) -> Result<(), ServiceError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_token) = Some(token.to_string());
        let reply = lock(&self.script).confirm.clone();
        reply.to_result()
    }

    async fn current_user(&self, force_reload: bool) -> Result<User, ServiceError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_force_reload) = Some(force_reload);
        let reply = lock(&self.script).current_user.clone();
        reply.to_result()
    }
}

// ============================================================================
// Recording Subscriber
// ============================================================================

/// A subscriber that records all events it receives.
///
/// Useful for verifying which notifications a workflow broadcast.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingSubscriber::new();
/// bus.subscribe(recorder.clone());
///
/// // ... drive the flow ...
/// assert_eq!(recorder.count("signInSuccess"), 1);
/// ```
#[derive(Clone, Default)]
pub struct RecordingSubscriber {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl RecordingSubscriber {
    /// Create a new recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<SessionEvent> {
        lock(&self.events).clone()
    }

    /// Broadcast names of the recorded events, in order.
    pub fn names(&self) -> Vec<&'static str> {
        lock(&self.events).iter().map(|e| e.name()).collect()
    }

    /// How many recorded events carry the given broadcast name.
    pub fn count(&self, name: &str) -> usize {
        lock(&self.events)
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    /// Broadcast names of the recorded failure events, in order.
    pub fn failures(&self) -> Vec<&'static str> {
        lock(&self.events)
            .iter()
            .filter(|e| e.is_failure())
            .map(|e| e.name())
            .collect()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl Subscriber for RecordingSubscriber {
    fn on_event(&self, event: &SessionEvent) {
        lock(&self.events).push(event.clone());
    }
}

// ============================================================================
// Recording Notifier
// ============================================================================

/// A notifier that records every notice.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    successes: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Create a new recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Success notices, oldest first.
    pub fn successes(&self) -> Vec<String> {
        lock(&self.successes).clone()
    }

    /// Error notices, oldest first.
    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        lock(&self.successes).push(message.to_string());
    }

    fn error(&self, message: &str) {
        lock(&self.errors).push(message.to_string());
    }
}

//! Default handlers, installed by [`HandlerRegistry::new`](super::HandlerRegistry::new).

use super::{Hook, LocationChange, Navigation, SignUpError, SignUpResponse};
use crate::context::SessionContext;
use gatehouse_core::{SessionEvent, SignUpFailure, identified};

const SIGNED_OUT_NOTICE: &str = "User has successfully signed out.";

pub(super) fn sign_in_start() -> Hook<String> {
    Hook::sync(|ctx, redirect: String| {
        let config = ctx.config();
        let encoded = urlencoding::encode(&redirect);
        tracing::debug!(to = %config.sign_in_path, %redirect, "sending guest to sign-in");
        ctx.navigator().navigate(&config.sign_in_path);
        ctx.navigator()
            .set_query(&[(config.redirect_param.as_str(), encoded.as_ref())]);
    })
}

pub(super) fn sign_in_success() -> Hook<()> {
    Hook::sync(|ctx, ()| {
        let config = ctx.config();
        let navigator = ctx.navigator();
        let redirect = navigator
            .query_param(&config.redirect_param)
            .filter(|target| !target.is_empty());

        match redirect {
            Some(raw) => {
                let decoded = urlencoding::decode(&raw)
                    .map(|target| target.into_owned())
                    .unwrap_or_else(|_| raw.clone());
                let target = if decoded.starts_with('/') {
                    decoded
                } else {
                    format!("/{decoded}")
                };
                tracing::debug!(%target, "resuming after sign-in");
                navigator.navigate(&target);
                navigator.set_query(&[]);
            }
            None => navigator.navigate(&config.root_path),
        }
    })
}

pub(super) fn sign_out_success() -> Hook<()> {
    Hook::sync(|ctx, ()| {
        ctx.notifier().success(SIGNED_OUT_NOTICE);
        ctx.navigator().navigate(&ctx.config().root_path);
    })
}

pub(super) fn sign_up_success() -> Hook<SignUpResponse> {
    Hook::new(|ctx: SessionContext, response: SignUpResponse| async move {
        let event = match identified(response.user) {
            Ok(user) => SessionEvent::SignUpSuccess { user },
            Err(user) => {
                tracing::debug!("sign-up response carries no user id");
                SessionEvent::SignUpFailure(SignUpFailure::Unidentified(user))
            }
        };
        ctx.emit(event).await;
    })
}

pub(super) fn sign_up_failure() -> Hook<SignUpError> {
    Hook::new(|ctx: SessionContext, failure: SignUpError| async move {
        ctx.session().clear();
        ctx.emit(SessionEvent::SignUpFailure(SignUpFailure::Rejected {
            message: failure.error.message(),
        }))
        .await;
    })
}

pub(super) fn user_reload() -> Hook<()> {
    Hook::new(|ctx: SessionContext, ()| async move {
        match ctx.account_service().current_user(true).await {
            Ok(user) => {
                tracing::debug!(user = ?user.id(), "user reloaded");
                ctx.session().set(user);
            }
            Err(error) => tracing::warn!(%error, "user reload failed, keeping current user"),
        }
    })
}

pub(super) fn location_change() -> Hook<LocationChange, Navigation> {
    Hook::new(|ctx: SessionContext, change: LocationChange| async move {
        let path = normalize_path(&change.next, &ctx.config().base_path);

        if ctx.session().is_signed_in() {
            return Navigation::Proceed;
        }

        let Some(route) = ctx.routes().first_match(&path) else {
            tracing::debug!(%path, "no route restricts this path");
            return Navigation::Proceed;
        };
        if route.entry.is_public() {
            tracing::debug!(%path, template = %route.entry.template(), "guest on public route");
            return Navigation::Proceed;
        }

        let redirect = path.strip_prefix('/').unwrap_or(&path).to_string();
        tracing::debug!(%path, template = %route.entry.template(), "guest on private route");
        ctx.emit(SessionEvent::SignInRequired {
            redirect: redirect.clone(),
        })
        .await;
        ctx.emit(SessionEvent::SignInStart {
            redirect: redirect.clone(),
        })
        .await;

        let sign_in_start = ctx.hooks().sign_in_start();
        sign_in_start.call(ctx.clone(), redirect.clone()).await;
        Navigation::Challenged { redirect }
    })
}

/// Reduce a navigation target to the application path used for route
/// matching.
///
/// Drops `scheme://host` (or a protocol-relative `//host`), then
/// `base_path` when it prefixes a whole segment, then the query string and
/// fragment. A `://` inside the path, query or fragment is not an origin.
/// The result always starts with `/` and has no trailing `/` unless it is
/// the root.
///
/// ```rust
/// use gatehouse::normalize_path;
///
/// assert_eq!(normalize_path("https://app.test/users/42?tab=1", ""), "/users/42");
/// assert_eq!(normalize_path("/#/admin/", "/#"), "/admin");
/// assert_eq!(normalize_path("/users?next=https://evil.test/", ""), "/users");
/// assert_eq!(normalize_path("", ""), "/");
/// ```
pub fn normalize_path(next: &str, base_path: &str) -> String {
    let mut rest = strip_origin(next);

    let base = base_path.trim_end_matches('/');
    if !base.is_empty() {
        if let Some(after) = rest.strip_prefix(base) {
            if after.is_empty() || after.starts_with(['/', '?', '#']) {
                rest = after;
            }
        }
    }

    if let Some(end) = rest.find(['?', '#']) {
        rest = &rest[..end];
    }

    let mut path = if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{rest}")
    };
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

fn strip_origin(next: &str) -> &str {
    let authority = match next.split_once("://") {
        Some((scheme, authority)) if is_scheme(scheme) => authority,
        _ => match next.strip_prefix("//") {
            Some(authority) => authority,
            None => return next,
        },
    };
    authority
        .find(['/', '?', '#'])
        .map_or("", |start| &authority[start..])
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_paths() {
        assert_eq!(normalize_path("/users", ""), "/users");
        assert_eq!(normalize_path("users", ""), "/users");
        assert_eq!(normalize_path("/users/", ""), "/users");
        assert_eq!(normalize_path("/", ""), "/");
        assert_eq!(normalize_path("", ""), "/");
    }

    #[test]
    fn test_normalize_drops_origin_query_and_fragment() {
        assert_eq!(
            normalize_path("http://localhost:8080/users/42?tab=profile#top", ""),
            "/users/42"
        );
        assert_eq!(normalize_path("https://app.test", ""), "/");
        assert_eq!(normalize_path("https://app.test?x=1", ""), "/");
        assert_eq!(normalize_path("/reports#summary", ""), "/reports");
    }

    #[test]
    fn test_normalize_strips_base_at_segment_boundary() {
        assert_eq!(normalize_path("/app/users", "/app"), "/users");
        assert_eq!(normalize_path("/app/users", "/app/"), "/users");
        assert_eq!(normalize_path("/app", "/app"), "/");
        assert_eq!(normalize_path("/application", "/app"), "/application");
    }

    #[test]
    fn test_normalize_hash_routing() {
        assert_eq!(
            normalize_path("http://localhost/#/users/42?x=1", "/#"),
            "/users/42"
        );
        assert_eq!(normalize_path("/#/", "/#"), "/");
    }

    #[test]
    fn test_normalize_ignores_urls_after_the_path() {
        assert_eq!(normalize_path("/users?next=https://example.com/", ""), "/users");
        assert_eq!(normalize_path("/users#https://example.com/", ""), "/users");
        assert_eq!(
            normalize_path("users/42?back=http://localhost/", ""),
            "/users/42"
        );
        assert_eq!(
            normalize_path("https://app.test/users?next=https://example.com/", ""),
            "/users"
        );
        assert_eq!(
            normalize_path("/proxy/http://example.com/a", ""),
            "/proxy/http://example.com/a"
        );
    }

    #[test]
    fn test_normalize_protocol_relative_origin() {
        assert_eq!(normalize_path("//app.test/users/7", ""), "/users/7");
        assert_eq!(normalize_path("//app.test", ""), "/");
    }

    #[test]
    fn test_normalize_keeps_single_trailing_slash_only() {
        assert_eq!(normalize_path("/users//", ""), "/users/");
    }
}

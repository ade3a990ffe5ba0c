//! Auth middleware.
//!
//! A bearer token identifies a user. Without one, an `X-Session-Id` header
//! identifies a guest.

use std::sync::Arc;

use folio_app::auth::{AuthServiceError, Identity, SessionKey};
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use crate::{extensions::*, state::State};

pub(crate) const SESSION_ID_HEADER: &str = "x-session-id";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let identity = match resolve_identity(req, depot).await {
        Ok(identity) => identity,
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();

            return;
        }
    };

    depot.insert_identity(identity);

    ctrl.call_next(req, depot, res).await;
}

/// Like [`handler`], but a request carrying neither header continues
/// anonymously. Credentials that are present must still be valid.
#[salvo::handler]
pub(crate) async fn optional(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let anonymous = !req.headers().contains_key(AUTHORIZATION)
        && !req.headers().contains_key(SESSION_ID_HEADER);

    if !anonymous {
        match resolve_identity(req, depot).await {
            Ok(identity) => depot.insert_identity(identity),
            Err(status) => {
                res.render(status);
                ctrl.skip_rest();

                return;
            }
        }
    }

    ctrl.call_next(req, depot, res).await;
}

async fn resolve_identity(req: &Request, depot: &Depot) -> Result<Identity, StatusError> {
    if req.headers().contains_key(AUTHORIZATION) {
        let token = extract_bearer_token(req)
            .ok_or_else(|| StatusError::unauthorized().brief("Malformed Authorization header"))?;

        let state = depot.obtain_or_500::<Arc<State>>()?;

        return match state.app.auth.authenticate_bearer(token).await {
            Ok(actor) => Ok(Identity::User(actor)),
            Err(AuthServiceError::NotFound | AuthServiceError::Token(_)) => {
                Err(StatusError::unauthorized().brief("Invalid API token"))
            }
            Err(source) => {
                error!("failed to validate api token: {source}");

                Err(StatusError::internal_server_error())
            }
        };
    }

    let session = req
        .headers()
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            StatusError::unauthorized().brief("Missing Authorization or X-Session-Id header")
        })?;

    SessionKey::parse(session)
        .map(Identity::Guest)
        .map_err(|_ignored| StatusError::unauthorized().brief("Invalid X-Session-Id header"))
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

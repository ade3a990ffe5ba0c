//! Depot helper extensions.

use std::any::Any;

use folio_app::auth::{Actor, Identity};
use salvo::prelude::{Depot, StatusError};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_identity(&mut self, identity: Identity);

    /// The caller, user or guest.
    fn identity_or_401(&self) -> Result<&Identity, StatusError>;

    /// The caller, which must be a signed-in user.
    fn actor_or_401(&self) -> Result<Actor, StatusError>;

    /// The signed-in caller, if any. Guests and anonymous requests yield `None`.
    fn optional_actor(&self) -> Option<Actor>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_identity(&mut self, identity: Identity) {
        self.inject(identity);
    }

    fn identity_or_401(&self) -> Result<&Identity, StatusError> {
        self.obtain::<Identity>()
            .map_err(|_ignored| StatusError::unauthorized().brief("Authentication required"))
    }

    fn actor_or_401(&self) -> Result<Actor, StatusError> {
        self.identity_or_401()?
            .actor()
            .copied()
            .ok_or_else(|| StatusError::unauthorized().brief("Sign in required"))
    }

    fn optional_actor(&self) -> Option<Actor> {
        self.obtain::<Identity>()
            .ok()
            .and_then(Identity::actor)
            .copied()
    }
}

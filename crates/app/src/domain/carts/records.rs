//! Cart Records

use folio::{TurnaroundTier, VariantTerms};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{Identity, UserUuid},
    domain::catalog::records::VariantUuid,
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Whoever a cart belongs to. Exactly one per cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    User(UserUuid),
    Session(String),
}

impl CartOwner {
    pub(crate) fn user_uuid(&self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(*user),
            Self::Session(_) => None,
        }
    }

    pub(crate) fn session_key(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(key) => Some(key),
        }
    }
}

impl From<&Identity> for CartOwner {
    fn from(identity: &Identity) -> Self {
        match identity {
            Identity::User(actor) => Self::User(actor.user),
            Identity::Guest(key) => Self::Session(key.as_str().to_string()),
        }
    }
}

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub owner: CartOwner,
    pub created_at: Timestamp,
}

/// Options chosen when a variant was put in the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemMeta {
    #[serde(default)]
    pub turnaround: TurnaroundTier,

    #[serde(default)]
    pub add_ons: Vec<String>,
}

/// A stored cart item joined with its variant.
#[derive(Debug, Clone)]
pub struct CartLineRecord {
    pub variant_uuid: VariantUuid,
    pub service_title: String,
    pub variant_title: String,
    pub quantity: u32,
    pub meta: CartItemMeta,
    pub terms: VariantTerms,
    pub is_available: bool,
}

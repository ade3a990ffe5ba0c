//! Orders Repositories

mod events;
mod items;
mod orders;

pub(crate) use events::PgOrderEventsRepository;
pub(crate) use items::PgOrderItemsRepository;
pub(crate) use orders::{OrderScope, PgOrdersRepository};

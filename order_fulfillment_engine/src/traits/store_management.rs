use crate::{
    db_types::{Store, UserId},
    traits::OrderQueryError,
};

/// Resolves authenticated identities to the stores they own. Every seller-facing mutation starts here.
#[allow(async_fn_in_trait)]
pub trait StoreManagement {
    /// The store owned by the given user, if any. A user without a store is not a seller.
    async fn fetch_store_for_owner(&self, owner: &UserId) -> Result<Option<Store>, OrderQueryError>;
}

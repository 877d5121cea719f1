use std::fmt::Debug;

use log::*;

use crate::{
    ofe_api::order_objects::{TrackedOrder, TrackingQuery},
    traits::{OrderManagement, OrderQueryError},
};

/// `TrackingApi` serves the public, unauthenticated tracking lookup.
pub struct TrackingApi<B> {
    db: B,
}

impl<B> Debug for TrackingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrackingApi")
    }
}

impl<B> TrackingApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> TrackingApi<B>
where B: OrderManagement
{
    /// Looks up an order by the customer's phone number and/or the courier AWB number, returning the customer-safe
    /// projection. Supplying neither is a client error, rejected before any storage query is issued.
    pub async fn track(&self, phone: Option<&str>, awb: Option<&str>) -> Result<Option<TrackedOrder>, OrderQueryError> {
        let query = TrackingQuery::new(phone, awb);
        if query.is_empty() {
            return Err(OrderQueryError::EmptyQuery);
        }
        trace!("🔍️ Tracking lookup for phone {:?} / awb {:?}", query.phone, query.awb);
        let order = self.db.fetch_order_by_phone_or_tracking(query).await?;
        Ok(order.map(TrackedOrder::from))
    }
}

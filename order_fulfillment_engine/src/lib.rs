//! Order Fulfillment Engine
//!
//! The engine holds the core logic of the order-fulfillment backend: authoritative order records, the shipping
//! lifecycle state machine, inventory adjustment and the event hooks that drive customer notifications. It is
//! provider-agnostic; the HTTP surface lives in the companion server crate.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend (a `postgres` feature slot
//!    exists). You should never need to access the database directly. Instead, use the public APIs provided by the
//!    engine. The exception is the data types used in the database, which are defined in the `db_types` module and
//!    are public.
//! 2. The engine public API ([`OrderFlowApi`], [`FulfillmentApi`], [`TrackingApi`]). These provide the public-facing
//!    functionality: verified order creation, seller-authorized mutation, and the public tracking lookup. Specific
//!    backends need to implement the traits in [`mod@traits`] in order to act as a backend for the server.
//! 3. A set of events that fire when orders are created or updated. A simple hook framework ([`mod@events`]) lets the
//!    server subscribe to these and trigger notification fan-out without gating the request cycle.

pub mod db_types;
pub mod events;
pub mod helpers;
mod ofe_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use ofe_api::{
    fulfillment_api::FulfillmentApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    tracking_api::TrackingApi,
};

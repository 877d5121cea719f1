//! # Order fulfillment server
//! This module hosts the HTTP surface of the order-fulfillment backend. It is responsible for:
//! Accepting signed payment confirmations from the payment gateway and turning them into orders.
//! Serving the seller dashboard's order mutations (status, tracking, address, deletion) behind bearer-token auth.
//! Serving the public order-tracking lookup.
//! Triggering customer notifications as a side effect of fulfillment updates, without ever gating a response on them.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/payments/verify`: The payment-gateway confirmation endpoint.
//! * `/api/store/orders/...`: The seller mutation and read surface.
//! * `/api/track-order`: The public tracking lookup.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;

//! Outbound customer notifications.
//!
//! Fulfillment updates fan out to two delivery endpoints hosted by the main application: an email workflow and,
//! when the order carries a phone number, an SMS workflow. Delivery is strictly best-effort: the [`NotificationClient`]
//! runs inside the engine's event-hook tasks, each channel is attempted independently, every request carries the
//! configured timeout, and failures are logged at warn and swallowed. Nothing here can fail or delay the seller's
//! mutation response.

use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use order_fulfillment_engine::events::{EventHooks, OrderUpdatedEvent};
use serde_json::json;

use crate::config::NotificationConfig;

const ORDER_STATUS_PATH: &str = "/api/notifications/order-status";
const ORDER_SMS_PATH: &str = "/api/notifications/order-sms";

#[derive(Clone)]
pub struct NotificationClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotificationClient {
    pub fn new(config: &NotificationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Could not construct the notification HTTP client");
        Self { client, base_url: config.base_url.trim_end_matches('/').to_string() }
    }

    /// Sends the email and SMS notifications for an order update. The event only fires when status or tracking
    /// changed, so the email channel is always attempted (when an address is known); SMS additionally needs a phone
    /// number.
    pub async fn dispatch_order_update(&self, event: OrderUpdatedEvent) {
        let order = &event.order;
        match &event.contact.email {
            Some(email) => {
                let payload = json!({
                    "orderId": order.order_id.as_str(),
                    "email": email,
                    "customerName": event.contact.name,
                    "status": order.status,
                    "trackingId": order.tracking_id,
                    "trackingUrl": order.tracking_url,
                    "courier": order.courier,
                    "orderItems": order.items,
                });
                self.post(ORDER_STATUS_PATH, &payload, "email").await;
            },
            None => debug!("📨️ No email address known for order {}; skipping email notification", order.order_id),
        }
        if let Some(phone) = &event.contact.phone {
            let payload = json!({
                "phoneNumber": phone,
                "orderId": order.order_id.as_str(),
                "customerName": event.contact.name,
                "status": order.status,
                "totalAmount": order.total,
                "trackingId": order.tracking_id,
                "trackingUrl": order.tracking_url,
                "courier": order.courier,
            });
            self.post(ORDER_SMS_PATH, &payload, "SMS").await;
        }
    }

    async fn post(&self, path: &str, payload: &serde_json::Value, channel: &str) {
        let url = format!("{}{path}", self.base_url);
        match self.client.post(&url).json(payload).send().await {
            Ok(res) if res.status().is_success() => {
                debug!("📨️ {channel} notification accepted by {url}");
            },
            Ok(res) => {
                warn!("📨️ {channel} notification endpoint {url} answered {}", res.status());
            },
            Err(e) => {
                warn!("📨️ Could not deliver {channel} notification to {url}: {e}");
            },
        }
    }
}

/// Wires the notification client into the engine's event hooks. This is the only place the request cycle and the
/// notification workflow touch, and the coupling is one bounded channel send.
pub fn notification_hooks(client: NotificationClient) -> EventHooks {
    let client = Arc::new(client);
    let mut hooks = EventHooks::default();
    hooks.on_order_updated(move |event| {
        let client = Arc::clone(&client);
        Box::pin(async move {
            client.dispatch_order_update(event).await;
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the storage traits so the endpoint tests can drive them against mock backends; the
//! concrete `SqliteDatabase` is named once, in `server.rs`, when the routes are registered.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use ofg_common::Money;
use order_fulfillment_engine::{
    db_types::{CustomerIdentity, GuestInfo, NewOrder, OrderId, Store},
    helpers::verify_signature,
    order_objects::{OrderUpdate, SellerOrder},
    traits::{FulfillmentDatabase, FulfillmentError, OrderManagement, OrderQueryError, StoreManagement},
    FulfillmentApi,
    OrderFlowApi,
    TrackingApi,
};
use serde_json::json;

use crate::{
    auth::{AuthenticatedUser, TokenVerifier},
    config::GatewayConfig,
    data_objects::{AddressUpdateRequest, JsonResponse, PaymentConfirmation, PaymentPayload, TrackingQueryParams},
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//------------------------------------------   Payment confirmation  -------------------------------------------
/// Route handler for the payment-gateway confirmation endpoint.
///
/// The gateway's signature is checked first; everything else only happens for authentic confirmations. A mismatch
/// is a business failure (400 with a `success: false` body), never a 500. Replayed confirmations return the
/// already-created order without touching stock again.
pub async fn verify_payment<B>(
    gateway: web::Data<GatewayConfig>,
    verifier: web::Data<TokenVerifier>,
    api: web::Data<OrderFlowApi<B>>,
    body: web::Json<PaymentConfirmation>,
) -> HttpResponse
where
    B: FulfillmentDatabase + 'static,
{
    trace!("💻️ Received payment confirmation");
    let confirmation = body.into_inner();
    let authentic = verify_signature(
        &confirmation.razorpay_order_id,
        &confirmation.razorpay_payment_id,
        &confirmation.razorpay_signature,
        gateway.secret.reveal(),
    );
    if !authentic {
        warn!("💻️ Signature mismatch on payment confirmation for {}", confirmation.razorpay_payment_id);
        return HttpResponse::BadRequest().json(JsonResponse::failure("Payment verification failed"));
    }
    let order = match new_order_from_payload(
        confirmation.payment_payload,
        confirmation.razorpay_payment_id,
        confirmation.razorpay_order_id,
        verifier.as_ref(),
    ) {
        Ok(order) => order,
        Err(message) => {
            debug!("💻️ Rejecting confirmed payment: {message}");
            return HttpResponse::BadRequest().json(JsonResponse::failure(message));
        },
    };
    match api.process_confirmed_payment(order).await {
        Ok(placed) => {
            info!("💻️ Order {} recorded for payment confirmation", placed.order.order_id);
            HttpResponse::Ok().json(json!({
                "success": true,
                "_id": placed.order.order_id,
                "orderId": placed.order.order_id,
                "message": "Payment verified and order created successfully",
            }))
        },
        Err(
            e @ (FulfillmentError::InvalidOrder(_)
            | FulfillmentError::ProductNotFound(_)
            | FulfillmentError::MixedStoreItems),
        ) => {
            debug!("💻️ Confirmed payment carried an unusable order payload. {e}");
            HttpResponse::BadRequest().json(JsonResponse::failure(e))
        },
        Err(e) => {
            error!("💻️ Could not record order for a verified payment. {e}");
            HttpResponse::InternalServerError().json(json!({ "success": false, "error": e.to_string() }))
        },
    }
}

/// Assembles a `NewOrder` from the confirmation payload, resolving the customer identity on the way.
///
/// A bearer token wins over a guest block: if it verifies, the order belongs to the registered customer and any
/// `guestInfo` is dropped. A token that fails verification is treated as absent (anonymous checkout is acceptable
/// on this path) and the guest block is used instead. Neither is a validation failure.
fn new_order_from_payload(
    payload: PaymentPayload,
    payment_id: String,
    gateway_order_id: String,
    verifier: &TokenVerifier,
) -> Result<NewOrder, String> {
    let customer = resolve_identity(verifier, payload.token.as_deref(), payload.guest_info)?;
    let items = payload
        .items
        .into_iter()
        .map(|item| item.into_order_item().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    let shipping_fee = Money::try_from_paise(payload.shipping_fee).map_err(|e| e.to_string())?;
    let mut order = NewOrder::new(customer, items, payload.payment_method);
    order.shipping_fee = shipping_fee;
    order.razorpay_payment_id = payment_id;
    order.razorpay_order_id = gateway_order_id;
    order.address_id = payload.address_id;
    Ok(order)
}

fn resolve_identity(
    verifier: &TokenVerifier,
    token: Option<&str>,
    guest_info: Option<GuestInfo>,
) -> Result<CustomerIdentity, String> {
    if let Some(token) = token {
        match verifier.verify(token) {
            Ok(claims) => return Ok(CustomerIdentity::Registered { user_id: claims.user_id() }),
            Err(e) => debug!("💻️ Checkout token could not be verified ({e}). Falling back to guest checkout."),
        }
    }
    match guest_info {
        Some(guest) if guest.is_complete() => Ok(CustomerIdentity::Guest(guest)),
        Some(_) => Err("Guest checkout requires a name, email and phone number".to_string()),
        None => Err("An order requires either a signed-in customer or guest details".to_string()),
    }
}

//----------------------------------------------   Seller orders  ----------------------------------------------

/// Resolves the acting seller's store, or rejects the request. Unresolved identity never reaches this point (the
/// `AuthenticatedUser` extractor already returned 401); a resolved identity without a store is a 403.
async fn resolve_seller_store<B>(api: &FulfillmentApi<B>, user: &AuthenticatedUser) -> Result<Store, ServerError>
where B: StoreManagement {
    api.store_for_owner(&user.user_id)
        .await
        .map_err(ServerError::from)?
        .ok_or_else(|| ServerError::InsufficientPermissions("Unauthorized - not a seller".to_string()))
}

/// Route handler for the seller order-list endpoint.
pub async fn store_orders<B>(
    user: AuthenticatedUser,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase + OrderManagement + StoreManagement + 'static,
{
    let store = resolve_seller_store(api.as_ref(), &user).await?;
    debug!("💻️ GET orders for store {}", store.store_id);
    let orders = api.orders_for_store(&store.store_id).await.map_err(|e| {
        debug!("💻️ Could not fetch orders. {e}");
        ServerError::from(e)
    })?;
    let orders = orders.into_iter().map(SellerOrder::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

/// Route handler for the seller single-order read.
pub async fn store_order_by_id<B>(
    user: AuthenticatedUser,
    path: web::Path<OrderId>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase + OrderManagement + StoreManagement + 'static,
{
    let order_id = path.into_inner();
    let store = resolve_seller_store(api.as_ref(), &user).await?;
    debug!("💻️ GET order {order_id} for store {}", store.store_id);
    let order = api
        .order_for_store(&store.store_id, &order_id)
        .await
        .map_err(ServerError::from)?
        .ok_or_else(|| ServerError::NoRecordFound("Order not found or unauthorized".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "order": SellerOrder::from(order) })))
}

/// Route handler for the seller status/tracking mutation.
///
/// The body is the allow-listed patch; anything else a client sends is ignored. On success the updated order comes
/// back immediately; notification fan-out happens behind the response via the event hooks.
pub async fn update_order<B>(
    user: AuthenticatedUser,
    path: web::Path<OrderId>,
    body: web::Json<OrderUpdate>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase + OrderManagement + StoreManagement + 'static,
{
    let order_id = path.into_inner();
    let store = resolve_seller_store(api.as_ref(), &user).await?;
    let update = body.into_inner();
    debug!("💻️ PUT order {order_id} for store {}", store.store_id);
    let updated = api.update_order(&store.store_id, &order_id, update).await.map_err(|e| {
        debug!("💻️ Could not update order {order_id}. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "order": SellerOrder::from(updated),
        "message": "Order updated successfully",
    })))
}

/// Route handler for the seller shipping-address update.
pub async fn update_address<B>(
    user: AuthenticatedUser,
    path: web::Path<OrderId>,
    body: web::Json<AddressUpdateRequest>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase + OrderManagement + StoreManagement + 'static,
{
    let order_id = path.into_inner();
    let store = resolve_seller_store(api.as_ref(), &user).await?;
    let address = body.into_inner().shipping_address.ok_or_else(|| {
        ServerError::ValidationError("Invalid address - street, city, and country are required".to_string())
    })?;
    debug!("💻️ PATCH address on order {order_id} for store {}", store.store_id);
    let updated = api.update_shipping_address(&store.store_id, &order_id, address).await.map_err(|e| {
        debug!("💻️ Could not update shipping address on {order_id}. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Shipping address added successfully",
        "order": {
            "_id": updated.order_id,
            "shippingAddress": updated.shipping_address,
        },
    })))
}

/// Route handler for the seller order deletion. Hard delete; there is no tombstone to resurrect.
pub async fn delete_order<B>(
    user: AuthenticatedUser,
    path: web::Path<OrderId>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase + OrderManagement + StoreManagement + 'static,
{
    let order_id = path.into_inner();
    let store = resolve_seller_store(api.as_ref(), &user).await?;
    info!("💻️ DELETE order {order_id} requested by store {}", store.store_id);
    api.delete_order(&store.store_id, &order_id).await.map_err(|e| {
        debug!("💻️ Could not delete order {order_id}. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Order deleted successfully")))
}

//----------------------------------------------   Tracking  ----------------------------------------------------
/// Route handler for the public tracking endpoint. Unauthenticated; serves the customer-safe projection only.
pub async fn track_order<B>(
    query: web::Query<TrackingQueryParams>,
    api: web::Data<TrackingApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + 'static,
{
    let params = query.into_inner();
    debug!("💻️ GET track-order");
    match api.track(params.phone.as_deref(), params.awb.as_deref()).await {
        Ok(Some(order)) => Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order }))),
        Ok(None) => Err(ServerError::NoRecordFound("Order not found".to_string())),
        Err(e @ OrderQueryError::EmptyQuery) => Err(ServerError::ValidationError(e.to_string())),
        Err(e) => {
            debug!("💻️ Tracking lookup failed. {e}");
            Err(ServerError::from(e))
        },
    }
}

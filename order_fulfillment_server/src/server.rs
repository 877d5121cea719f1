use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use order_fulfillment_engine::{
    events::{EventHandlers, EventProducers},
    FulfillmentApi,
    OrderFlowApi,
    SqliteDatabase,
    TrackingApi,
};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    integrations::notifications::{notification_hooks, NotificationClient},
    routes::{
        delete_order,
        health,
        store_order_by_id,
        store_orders,
        track_order,
        update_address,
        update_order,
        verify_payment,
    },
};

const EVENT_BUFFER_SIZE: usize = 100;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let notifications = NotificationClient::new(&config.notifications);
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, notification_hooks(notifications));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let ServerConfig { host, port, auth, gateway, .. } = config;
    // One verifier for the whole process, built before any traffic is served.
    let verifier = web::Data::new(TokenVerifier::new(&auth));
    let gateway = web::Data::new(gateway);
    let srv = HttpServer::new(move || {
        let order_flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let fulfillment_api = FulfillmentApi::new(db.clone(), producers.clone());
        let tracking_api = TrackingApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ofs::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(fulfillment_api))
            .app_data(web::Data::new(tracking_api))
            .app_data(verifier.clone())
            .app_data(gateway.clone())
            .service(health)
            .service(
                web::scope("/api")
                    .route("/payments/verify", web::post().to(verify_payment::<SqliteDatabase>))
                    .route("/track-order", web::get().to(track_order::<SqliteDatabase>))
                    .service(
                        web::scope("/store/orders")
                            .route("", web::get().to(store_orders::<SqliteDatabase>))
                            .route("/{order_id}", web::get().to(store_order_by_id::<SqliteDatabase>))
                            .route("/{order_id}", web::put().to(update_order::<SqliteDatabase>))
                            .route("/{order_id}", web::delete().to(delete_order::<SqliteDatabase>))
                            .route("/{order_id}/address", web::patch().to(update_address::<SqliteDatabase>)),
                    ),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

use mockall::mock;
use order_fulfillment_engine::{
    db_types::{NewOrder, Order, OrderId, ShippingAddress, StockFault, Store, StoreId, UserContact, UserId},
    order_objects::{OrderUpdate, TrackingQuery},
    traits::{FulfillmentDatabase, FulfillmentError, OrderManagement, OrderQueryError, StoreManagement},
};

mock! {
    pub Backend {}

    impl Clone for Backend {
        fn clone(&self) -> Self;
    }

    impl FulfillmentDatabase for Backend {
        fn url(&self) -> &str;
        async fn resolve_store_for_products(&self, product_ids: &[String]) -> Result<StoreId, FulfillmentError>;
        async fn insert_order(&self, order: NewOrder, store_id: &StoreId) -> Result<(Order, bool), FulfillmentError>;
        async fn adjust_stock_for_order(&self, order: &Order) -> Result<Vec<StockFault>, FulfillmentError>;
        async fn update_order(&self, store_id: &StoreId, order_id: &OrderId, update: OrderUpdate) -> Result<Option<Order>, FulfillmentError>;
        async fn set_shipping_address(&self, store_id: &StoreId, order_id: &OrderId, address: ShippingAddress) -> Result<Option<Order>, FulfillmentError>;
        async fn delete_order(&self, store_id: &StoreId, order_id: &OrderId) -> Result<bool, FulfillmentError>;
    }

    impl OrderManagement for Backend {
        async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_for_store(&self, store_id: &StoreId, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_orders_for_store(&self, store_id: &StoreId) -> Result<Vec<Order>, OrderQueryError>;
        async fn fetch_order_by_phone_or_tracking(&self, query: TrackingQuery) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_user_contact(&self, user_id: &UserId) -> Result<Option<UserContact>, OrderQueryError>;
    }

    impl StoreManagement for Backend {
        async fn fetch_store_for_owner(&self, owner: &UserId) -> Result<Option<Store>, OrderQueryError>;
    }
}

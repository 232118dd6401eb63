use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, ProductId, TenantId};
use tokio::sync::RwLock;

use crate::{
    Order, OrderStatus, Product, Result, StoreError,
    store::{OrderStore, ProductStore},
};

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<ProductId, Product>,
    // Failure injection: number of decrements that still succeed before
    // the store starts rejecting them. None disables injection.
    decrements_until_failure: Option<usize>,
}

/// In-memory product catalog.
///
/// Backs the default deployment and the test suites; provides the same
/// interface as the PostgreSQL implementation. The conditional decrement
/// holds the write lock across check and mutation, so it is atomic per
/// product just like the SQL `WHERE stock >= $n` form.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product, replacing any existing record with the same id.
    pub async fn insert(&self, product: Product) {
        self.state
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    /// Returns the number of products stored.
    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    /// Returns the current stock for a product, if it exists.
    pub async fn stock_of(&self, id: ProductId) -> Option<i64> {
        self.state.read().await.products.get(&id).map(|p| p.stock)
    }

    /// Configures decrement failure injection: the next `n` decrements
    /// succeed, every one after that fails with a backend error.
    pub async fn fail_decrements_after(&self, n: usize) {
        self.state.write().await.decrements_until_failure = Some(n);
    }
}

#[async_trait]
impl ProductStore for InMemoryCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_many_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn list(&self, tenant_id: TenantId) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn save(&self, product: &Product) -> Result<()> {
        self.state
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<i64> {
        let mut state = self.state.write().await;

        if let Some(remaining) = state.decrements_until_failure {
            if remaining == 0 {
                return Err(StoreError::Backend(
                    "injected decrement failure".to_string(),
                ));
            }
            state.decrements_until_failure = Some(remaining - 1);
        }

        let product = state
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;

        if product.stock < quantity {
            return Err(StoreError::InsufficientStock {
                product_id: id,
                available: product.stock,
            });
        }

        product.stock -= quantity;
        Ok(product.stock)
    }
}

#[derive(Debug, Default)]
struct OrdersState {
    orders: HashMap<OrderId, Order>,
    fail_on_create: bool,
}

/// In-memory order collection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrders {
    state: Arc<RwLock<OrdersState>>,
}

impl InMemoryOrders {
    /// Creates a new empty order collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Configures the store to reject the next create call.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }
}

#[async_trait]
impl OrderStore for InMemoryOrders {
    async fn create(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_create {
            return Err(StoreError::Backend("injected create failure".to_string()));
        }
        state.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn mark_paid(&self, id: OrderId) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&id) {
            Some(order) if order.status != OrderStatus::Paid => {
                order.status = OrderStatus::Paid;
                Ok(true)
            }
            // Absent order and already-paid order look the same to the
            // caller: nothing was modified.
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrderItem;
    use common::Money;

    fn product(stock: i64) -> Product {
        Product::new(TenantId::new(), "Widget", Money::from_cents(1000), stock)
    }

    #[tokio::test]
    async fn decrement_reduces_stock() {
        let catalog = InMemoryCatalog::new();
        let p = product(5);
        let id = p.id;
        catalog.insert(p).await;

        let remaining = catalog.decrement_stock(id, 2).await.unwrap();
        assert_eq!(remaining, 3);
        assert_eq!(catalog.stock_of(id).await, Some(3));
    }

    #[tokio::test]
    async fn decrement_never_goes_negative() {
        let catalog = InMemoryCatalog::new();
        let p = product(1);
        let id = p.id;
        catalog.insert(p).await;

        let err = catalog.decrement_stock(id, 2).await.unwrap_err();
        match err {
            StoreError::InsufficientStock {
                product_id,
                available,
            } => {
                assert_eq!(product_id, id);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The failed write must not have touched stock.
        assert_eq!(catalog.stock_of(id).await, Some(1));
    }

    #[tokio::test]
    async fn decrement_unknown_product_fails() {
        let catalog = InMemoryCatalog::new();
        let err = catalog.decrement_stock(ProductId::new(), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn decrement_failure_injection_counts_down() {
        let catalog = InMemoryCatalog::new();
        let a = product(10);
        let b = product(10);
        let (id_a, id_b) = (a.id, b.id);
        catalog.insert(a).await;
        catalog.insert(b).await;
        catalog.fail_decrements_after(1).await;

        assert!(catalog.decrement_stock(id_a, 1).await.is_ok());
        let err = catalog.decrement_stock(id_b, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(catalog.stock_of(id_b).await, Some(10));
    }

    #[tokio::test]
    async fn save_overwrites_full_document() {
        let catalog = InMemoryCatalog::new();
        let mut p = product(5);
        let id = p.id;
        catalog.insert(p.clone()).await;

        p.name = "Widget Mk2".to_string();
        p.stock = 8;
        catalog.save(&p).await.unwrap();

        let loaded = catalog.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Widget Mk2");
        assert_eq!(loaded.stock, 8);
    }

    #[tokio::test]
    async fn find_many_skips_unknown_ids() {
        let catalog = InMemoryCatalog::new();
        let p = product(5);
        let id = p.id;
        catalog.insert(p).await;

        let found = catalog
            .find_many_by_id(&[id, ProductId::new()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[tokio::test]
    async fn list_filters_by_tenant() {
        let catalog = InMemoryCatalog::new();
        let tenant = TenantId::new();
        catalog
            .insert(Product::new(tenant, "B", Money::from_cents(100), 1))
            .await;
        catalog
            .insert(Product::new(tenant, "A", Money::from_cents(100), 1))
            .await;
        catalog.insert(product(1)).await;

        let listed = catalog.list(tenant).await.unwrap();
        assert_eq!(listed.len(), 2);
        // Sorted by name for a stable storefront listing.
        assert_eq!(listed[0].name, "A");
    }

    fn order() -> Order {
        Order::new(
            TenantId::new(),
            vec![OrderItem::new(
                ProductId::new(),
                "Widget",
                Money::from_cents(1000),
                2,
            )],
            Money::from_cents(2000),
            OrderStatus::Pending,
            "1 Main St",
            "credit_card",
        )
    }

    #[tokio::test]
    async fn create_and_point_read() {
        let orders = InMemoryOrders::new();
        let o = order();
        orders.create(&o).await.unwrap();

        let loaded = orders.find_by_id(o.id).await.unwrap().unwrap();
        assert_eq!(loaded, o);
        assert!(orders.find_by_id(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mark_paid_is_conditional() {
        let orders = InMemoryOrders::new();
        let o = order();
        orders.create(&o).await.unwrap();

        assert!(orders.mark_paid(o.id).await.unwrap());
        // Second transition matches nothing.
        assert!(!orders.mark_paid(o.id).await.unwrap());
        let loaded = orders.find_by_id(o.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn mark_paid_missing_order_is_noop() {
        let orders = InMemoryOrders::new();
        assert!(!orders.mark_paid(OrderId::new()).await.unwrap());
    }
}

//! The checkout orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use cart::CartStore;
use common::{Money, ProductId, SessionId, Tenant};
use store::{Order, OrderItem, OrderStatus, OrderStore, ProductStore};

use crate::error::{AppliedDecrement, CheckoutError};
use crate::payment::PaymentGateway;

/// Client-supplied checkout parameters.
///
/// Prices are deliberately absent: totals come from the catalog, never
/// from the client.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_method: String,
}

/// The result handed back to the caller on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order_id: common::OrderId,
    pub status: OrderStatus,
}

/// Orchestrates the synchronous checkout pipeline.
///
/// The pipeline is a strict sequence: session → cart → catalog resolve →
/// stock validation → pricing → simulated payment → stock commit → order
/// persist → cart clear. Everything before the stock commit is
/// side-effect free, so those failures are safe to retry; the commit
/// itself is applied one product at a time with no cross-product
/// atomicity, and a failure inside that window is reported as a
/// consistency error carrying the decrements already applied.
pub struct CheckoutService<C, O, K, G>
where
    C: ProductStore,
    O: OrderStore,
    K: CartStore,
    G: PaymentGateway,
{
    catalog: Arc<C>,
    orders: Arc<O>,
    carts: Arc<K>,
    gateway: G,
}

impl<C, O, K, G> CheckoutService<C, O, K, G>
where
    C: ProductStore,
    O: OrderStore,
    K: CartStore,
    G: PaymentGateway,
{
    /// Creates a new checkout service over the given stores and gateway.
    pub fn new(catalog: Arc<C>, orders: Arc<O>, carts: Arc<K>, gateway: G) -> Self {
        Self {
            catalog,
            orders,
            carts,
            gateway,
        }
    }

    /// Runs one checkout for the given tenant and session.
    #[tracing::instrument(skip(self, tenant, request), fields(tenant = %tenant.slug))]
    pub async fn checkout(
        &self,
        tenant: &Tenant,
        session: Option<&SessionId>,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.run(tenant, session, request).await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(order_id = %receipt.order_id, "checkout completed");
            }
            Err(err) => {
                metrics::counter!("checkout_failed").increment(1);
                if err.is_consistency_failure() {
                    metrics::counter!("checkout_consistency_failures").increment(1);
                }
            }
        }

        result
    }

    async fn run(
        &self,
        tenant: &Tenant,
        session: Option<&SessionId>,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        // 1. A session is required before anything else.
        let session = session.ok_or(CheckoutError::MissingSession)?;

        // 2. Load the cart.
        let cart_contents = self.carts.get(&tenant.slug, session).await?;
        if cart_contents.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 3. Parse every id up front; a single malformed id fails the
        //    whole request.
        let mut entries: Vec<(ProductId, i64)> = Vec::with_capacity(cart_contents.len());
        for (raw, &quantity) in &cart_contents {
            let product_id = ProductId::parse(raw)
                .map_err(|e| CheckoutError::MalformedProductId(e.raw().to_string()))?;
            entries.push((product_id, quantity));
        }

        // Batch-resolve against the catalog. Well-formed ids that match
        // nothing are dropped from the order, not treated as a hard error.
        let ids: Vec<ProductId> = entries.iter().map(|(id, _)| *id).collect();
        let products = self.catalog.find_many_by_id(&ids).await?;
        let by_id: HashMap<ProductId, _> = products.into_iter().map(|p| (p.id, p)).collect();

        // 4/5. Validate stock fail-fast and stage the priced snapshot.
        //      No reservation has been applied yet, so the first shortage
        //      aborts with nothing to roll back.
        let mut items: Vec<OrderItem> = Vec::with_capacity(entries.len());
        let mut staged: Vec<AppliedDecrement> = Vec::with_capacity(entries.len());
        let mut total = Money::zero();

        for (product_id, quantity) in &entries {
            let Some(product) = by_id.get(product_id) else {
                tracing::debug!(%product_id, "dropping unresolved cart entry");
                continue;
            };

            if !product.can_fulfill(*quantity) {
                return Err(CheckoutError::InsufficientStock {
                    product_name: product.name.clone(),
                    available: product.stock,
                });
            }

            total += product.price.multiply(*quantity);
            items.push(OrderItem::new(
                product.id,
                product.name.clone(),
                product.price,
                *quantity,
            ));
            staged.push(AppliedDecrement {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: *quantity,
            });
        }

        if items.is_empty() {
            return Err(CheckoutError::NoValidItems);
        }

        // 6. Simulated payment. Declines abort before any durable write.
        self.gateway
            .authorize(&request.payment_method, total)
            .await?;

        // 7. Commit the stock decrements, one conditional write per
        //    product. There is no cross-product transaction here: a
        //    failure partway leaves earlier decrements in place, which is
        //    exactly what the error must say.
        let mut applied: Vec<AppliedDecrement> = Vec::with_capacity(staged.len());
        for decrement in staged {
            match self
                .catalog
                .decrement_stock(decrement.product_id, decrement.quantity)
                .await
            {
                Ok(_) => applied.push(decrement),
                Err(source) => {
                    tracing::error!(
                        tenant = %tenant.slug,
                        failed_product = %decrement.product_id,
                        applied = ?applied,
                        attempted_items = ?items,
                        error = %source,
                        "stock commit failed partway through checkout; \
                         decremented stock has no matching order"
                    );
                    return Err(CheckoutError::StockCommitFailed {
                        applied,
                        product_id: decrement.product_id,
                        source,
                    });
                }
            }
        }

        // 8. Persist the order, already settled on the synchronous path.
        let order = Order::new(
            tenant.id,
            items,
            total,
            OrderStatus::Paid,
            request.shipping_address,
            request.payment_method,
        );

        if let Err(source) = self.orders.create(&order).await {
            tracing::error!(
                tenant = %tenant.slug,
                order_id = %order.id,
                applied = ?applied,
                error = %source,
                "order persist failed after stock was decremented"
            );
            return Err(CheckoutError::OrderPersistFailed { applied, source });
        }

        // 9. Clear the cart. The order exists at this point, so a failure
        //    here must surface loudly: a surviving cart could be checked
        //    out again.
        if let Err(err) = self.carts.clear(&tenant.slug, session).await {
            tracing::error!(
                tenant = %tenant.slug,
                order_id = %order.id,
                error = %err,
                "cart clear failed after order was persisted"
            );
            return Err(err.into());
        }

        metrics::counter!("orders_created_total").increment(1);

        // 10. Hand back the identifier and status.
        Ok(CheckoutReceipt {
            order_id: order.id,
            status: order.status,
        })
    }
}

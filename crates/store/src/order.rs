//! Order records and their status machine.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, TenantId};
use serde::{Deserialize, Serialize};

/// Persisted payment status of an order.
///
/// `Pending` is reserved for asynchronous payment flows; the synchronous
/// checkout path creates orders directly as `Paid`. Status is the only
/// field of an order that changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Payment outcome not yet settled.
    #[default]
    Pending,

    /// Payment settled successfully (terminal).
    Paid,

    /// Payment settlement failed (terminal).
    Failed,
}

impl OrderStatus {
    /// Returns the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Failed => "FAILED",
        }
    }

    /// Parses the wire representation back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "PAID" => Some(OrderStatus::Paid),
            "FAILED" => Some(OrderStatus::Failed),
            _ => None,
        }
    }

    /// Returns true once the payment outcome is final.
    pub fn is_settled(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Failed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A frozen line-item snapshot inside an order.
///
/// Decoupled from the live product so historical totals survive later
/// price or name changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl OrderItem {
    /// Creates a line item.
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            unit_price,
            quantity,
        }
    }

    /// Cost of this line: unit price times quantity.
    pub fn cost(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A durable order. Created once by checkout; the item list is immutable
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub tenant_id: TenantId,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates an order with a fresh ID, stamped with the current time.
    pub fn new(
        tenant_id: TenantId,
        items: Vec<OrderItem>,
        total: Money,
        status: OrderStatus,
        shipping_address: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            tenant_id,
            items,
            total,
            status,
            shipping_address: shipping_address.into(),
            payment_method: payment_method.into(),
            created_at: Utc::now(),
        }
    }
}

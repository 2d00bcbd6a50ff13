use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{
    CustomerId, DomainError, DomainResult, Entity, OrderId, ProductId, Totals, round_currency,
};
use shopkeep_store::{Direction, Query, RemoteStore};

use crate::repo::{self, CatalogError, NewRecord, RemoteEntity};

/// Customer name recorded for sales rung up without one.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Other,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Other => "Other",
        }
    }
}

/// Order line. Stored inline on the order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl OrderItem {
    pub fn new(
        product_id: Option<ProductId>,
        name: impl Into<String>,
        quantity: i64,
        unit_price: Decimal,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            quantity,
            unit_price,
            line_total: round_currency(unit_price * Decimal::from(quantity)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_rate_percent: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &OrderId {
        &self.id
    }
}

impl RemoteEntity for Order {
    const TABLE: &'static str = "orders";
    const DEFAULT_ORDER: Option<(&'static str, Direction)> = Some(("created_at", Direction::Desc));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub tax_rate_percent: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Price a cart: totals are derived from the items, never supplied.
    /// A blank customer name is recorded as [`WALK_IN_CUSTOMER`].
    pub fn from_cart(
        customer_id: Option<CustomerId>,
        customer_name: impl Into<String>,
        items: Vec<OrderItem>,
        discount_percent: Decimal,
        tax_rate_percent: Decimal,
        payment_method: PaymentMethod,
        created_at: DateTime<Utc>,
    ) -> Self {
        let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
        let totals = Totals::compute(subtotal, discount_percent, tax_rate_percent);
        let customer_name = customer_name.into();
        let customer_name = if customer_name.trim().is_empty() {
            WALK_IN_CUSTOMER.to_string()
        } else {
            customer_name
        };
        Self {
            customer_id,
            customer_name,
            items,
            subtotal: totals.subtotal,
            discount_percent,
            tax_rate_percent,
            tax_amount: totals.tax_amount,
            total: totals.grand_total,
            payment_method,
            created_at,
        }
    }
}

impl NewRecord for NewOrder {
    type Entity = Order;

    fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("order must contain at least one item"));
        }
        for item in &self.items {
            if item.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity of {} must be positive",
                    item.name
                )));
            }
        }
        let out_of_range = |p: Decimal| p.is_sign_negative() || p > Decimal::ONE_HUNDRED;
        if out_of_range(self.discount_percent) {
            return Err(DomainError::validation("discount must be between 0 and 100 percent"));
        }
        if self.tax_rate_percent.is_sign_negative() {
            return Err(DomainError::validation("tax rate cannot be negative"));
        }
        Ok(())
    }
}

pub async fn list<S: RemoteStore + ?Sized>(store: &S) -> Result<Vec<Order>, CatalogError> {
    repo::list(store, Query::all()).await
}

pub async fn list_for_customer<S: RemoteStore + ?Sized>(
    store: &S,
    customer_id: CustomerId,
) -> Result<Vec<Order>, CatalogError> {
    repo::list(store, Query::all().eq("customer_id", customer_id.to_string())).await
}

pub async fn create<S: RemoteStore + ?Sized>(
    store: &S,
    new: &NewOrder,
) -> Result<Order, CatalogError> {
    let order = repo::create(store, new).await?;
    tracing::info!("recorded order {} total {}", order.id, order.total);
    Ok(order)
}

pub async fn delete<S: RemoteStore + ?Sized>(store: &S, id: OrderId) -> Result<(), CatalogError> {
    repo::delete::<Order, S>(store, &id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopkeep_store::InMemoryRemoteStore;

    fn cart() -> Vec<OrderItem> {
        vec![
            OrderItem::new(Some(ProductId::new()), "Rice 5kg", 2, dec!(320)),
            OrderItem::new(None, "Carry bag", 1, dec!(10)),
        ]
    }

    fn cash_sale(name: &str, items: Vec<OrderItem>, at: DateTime<Utc>) -> NewOrder {
        NewOrder::from_cart(None, name, items, dec!(0), dec!(0), PaymentMethod::Cash, at)
    }

    #[test]
    fn from_cart_derives_totals() {
        let method = PaymentMethod::Cash;
        let order = NewOrder::from_cart(None, "Asha", cart(), dec!(5), dec!(5), method, Utc::now());
        assert_eq!(order.subtotal, dec!(650));
        // 650 - 32.5 = 617.5; tax 30.875 -> 30.88; total 648.375 -> 648.38
        assert_eq!(order.tax_amount, dec!(30.88));
        assert_eq!(order.total, dec!(648.38));
    }

    #[test]
    fn empty_cart_is_invalid() {
        let order = cash_sale("Asha", vec![], Utc::now());
        assert!(order.validate().is_err());
    }

    #[test]
    fn blank_customer_name_becomes_walk_in() {
        let order = cash_sale("  ", cart(), Utc::now());
        assert_eq!(order.customer_name, WALK_IN_CUSTOMER);
        assert!(order.validate().is_ok());
    }

    #[tokio::test]
    async fn walk_in_sale_is_accepted_by_the_store() {
        let store = InMemoryRemoteStore::new();
        let new = cash_sale("", cart(), Utc::now());
        let order = create(&store, &new).await.unwrap();
        assert_eq!(order.customer_name, WALK_IN_CUSTOMER);
    }

    #[tokio::test]
    async fn orders_list_newest_first() {
        let store = InMemoryRemoteStore::new();
        let earlier = Utc::now() - chrono::Duration::hours(2);
        let first = cash_sale("A", cart(), earlier);
        let second = cash_sale("B", cart(), Utc::now());
        create(&store, &first).await.unwrap();
        create(&store, &second).await.unwrap();

        let orders = list(&store).await.unwrap();
        assert_eq!(orders[0].customer_name, "B");
        assert_eq!(orders[1].customer_name, "A");
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{CategoryId, DomainError, DomainResult, Entity, ProductId};
use shopkeep_store::{Direction, Query, RemoteStore};

use crate::repo::{self, CatalogError, NewRecord, RemoteEntity};

fn default_low_stock_threshold() -> i64 {
    5
}

/// Product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Selling price in rupees.
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockState {
    InStock,
    Low,
    Out,
}

impl Product {
    pub fn stock_state(&self) -> StockState {
        if self.stock <= 0 {
            StockState::Out
        } else if self.stock <= self.low_stock_threshold {
            StockState::Low
        } else {
            StockState::InStock
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

impl RemoteEntity for Product {
    const TABLE: &'static str = "products";
    const DEFAULT_ORDER: Option<(&'static str, Direction)> = Some(("name", Direction::Asc));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price: Decimal,
    pub stock: i64,
    pub low_stock_threshold: i64,
}

impl NewRecord for NewProduct {
    type Entity = Product;

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if self.price.is_sign_negative() {
            return Err(DomainError::validation("product price cannot be negative"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("product stock cannot be negative"));
        }
        if self.low_stock_threshold < 0 {
            return Err(DomainError::validation("low-stock threshold cannot be negative"));
        }
        Ok(())
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
}

impl ProductPatch {
    fn validate(&self) -> DomainResult<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DomainError::validation("product name is required"));
        }
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(DomainError::validation("product price cannot be negative"));
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(DomainError::validation("product stock cannot be negative"));
        }
        Ok(())
    }
}

pub async fn list<S: RemoteStore + ?Sized>(store: &S) -> Result<Vec<Product>, CatalogError> {
    repo::list(store, Query::all()).await
}

pub async fn list_by_category<S: RemoteStore + ?Sized>(
    store: &S,
    category_id: CategoryId,
) -> Result<Vec<Product>, CatalogError> {
    repo::list(store, Query::all().eq("category_id", category_id.to_string())).await
}

pub async fn create<S: RemoteStore + ?Sized>(
    store: &S,
    new: &NewProduct,
) -> Result<Product, CatalogError> {
    let product = repo::create(store, new).await?;
    tracing::info!("created product {} ({})", product.id, product.name);
    Ok(product)
}

pub async fn update<S: RemoteStore + ?Sized>(
    store: &S,
    id: ProductId,
    patch: &ProductPatch,
) -> Result<Product, CatalogError> {
    patch.validate()?;
    repo::update(store, &id, patch).await
}

pub async fn delete<S: RemoteStore + ?Sized>(store: &S, id: ProductId) -> Result<(), CatalogError> {
    repo::delete::<Product, S>(store, &id).await
}

/// Add `delta` (negative to remove) to a product's stock.
pub async fn adjust_stock<S: RemoteStore + ?Sized>(
    store: &S,
    id: ProductId,
    delta: i64,
) -> Result<Product, CatalogError> {
    let product = repo::get::<Product, S>(store, &id)
        .await?
        .ok_or(CatalogError::Domain(DomainError::not_found()))?;

    let new_stock = product
        .stock
        .checked_add(delta)
        .ok_or_else(|| DomainError::invariant("stock overflow"))?;
    if new_stock < 0 {
        return Err(DomainError::validation(format!(
            "cannot remove {} unit(s) of {}: only {} in stock",
            -delta, product.name, product.stock
        ))
        .into());
    }

    let patch = ProductPatch {
        stock: Some(new_stock),
        ..ProductPatch::default()
    };
    repo::update(store, &id, &patch).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopkeep_store::InMemoryRemoteStore;

    fn new_product(name: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            sku: None,
            category_id: None,
            price: dec!(49.50),
            stock,
            low_stock_threshold: 5,
        }
    }

    #[tokio::test]
    async fn create_then_list_sorted_by_name() {
        let store = InMemoryRemoteStore::new();
        create(&store, &new_product("Sugar", 10)).await.unwrap();
        create(&store, &new_product("Atta", 3)).await.unwrap();

        let products = list(&store).await.unwrap();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Atta", "Sugar"]);
        assert_eq!(products[0].stock_state(), StockState::Low);
        assert_eq!(products[0].price, dec!(49.50));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_reaching_store() {
        let store = InMemoryRemoteStore::new();
        let err = create(&store, &new_product("  ", 1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Validation(_))));
        assert!(store.insert_log().is_empty());
    }

    #[tokio::test]
    async fn adjust_stock_refuses_to_go_negative() {
        let store = InMemoryRemoteStore::new();
        let product = create(&store, &new_product("Ghee", 2)).await.unwrap();

        let updated = adjust_stock(&store, product.id, 8).await.unwrap();
        assert_eq!(updated.stock, 10);

        let err = adjust_stock(&store, product.id, -11).await.unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn patch_only_touches_given_fields() {
        let store = InMemoryRemoteStore::new();
        let product = create(&store, &new_product("Tea", 7)).await.unwrap();

        let patch = ProductPatch {
            price: Some(dec!(55)),
            ..ProductPatch::default()
        };
        let updated = update(&store, product.id, &patch).await.unwrap();
        assert_eq!(updated.price, dec!(55));
        assert_eq!(updated.stock, 7);
        assert_eq!(updated.name, "Tea");

        delete(&store, product.id).await.unwrap();
        assert!(list(&store).await.unwrap().is_empty());
    }

    #[test]
    fn stock_state_thresholds() {
        let mut product = Product {
            id: ProductId::new(),
            name: "Salt".to_string(),
            sku: None,
            category_id: None,
            price: dec!(20),
            stock: 0,
            low_stock_threshold: 5,
            created_at: None,
        };
        assert_eq!(product.stock_state(), StockState::Out);
        product.stock = 5;
        assert_eq!(product.stock_state(), StockState::Low);
        product.stock = 6;
        assert_eq!(product.stock_state(), StockState::InStock);
    }
}

//! List loaders for the views.
//!
//! A failed fetch never aborts the caller: it yields an empty list plus a
//! [`Notice`] to show the user.

use std::future::Future;

use tracing::warn;

use shopkeep_catalog::{
    Category, CategoryTree, CatalogError, Customer, Order, Product, ProductFilter, category,
    customer, filter_products, order, product,
};
use shopkeep_store::{ErrorClass, RemoteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A short user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub notice: Option<Notice>,
}

impl<T> Loaded<T> {
    pub fn ok(items: Vec<T>) -> Self {
        Self { items, notice: None }
    }

    pub fn failed(notice: Notice) -> Self {
        Self {
            items: Vec::new(),
            notice: Some(notice),
        }
    }
}

fn notice_for(what: &str, err: &CatalogError) -> Notice {
    match err {
        CatalogError::Store(store) if store.class() == ErrorClass::Network => {
            Notice::error(format!("Could not load {what}. Check your connection and try again."))
        }
        _ => Notice::error(format!("Could not load {what}: {err}")),
    }
}

async fn load<T, F>(what: &str, fetch: F) -> Loaded<T>
where
    F: Future<Output = Result<Vec<T>, CatalogError>>,
{
    match fetch.await {
        Ok(items) => Loaded::ok(items),
        Err(err) => {
            warn!(error = %err, "failed to load {what}");
            Loaded::failed(notice_for(what, &err))
        }
    }
}

pub async fn load_products(store: &dyn RemoteStore) -> Loaded<Product> {
    load("products", product::list(store)).await
}

pub async fn load_customers(store: &dyn RemoteStore) -> Loaded<Customer> {
    load("customers", customer::list(store)).await
}

/// Customers whose name contains `text`; blank text lists everyone.
pub async fn search_customers(store: &dyn RemoteStore, text: &str) -> Loaded<Customer> {
    load("customers", customer::search(store, text)).await
}

pub async fn load_orders(store: &dyn RemoteStore) -> Loaded<Order> {
    load("orders", order::list(store)).await
}

pub async fn load_categories(store: &dyn RemoteStore) -> Loaded<Category> {
    load("categories", category::list(store)).await
}

/// Products matching `filter`, with category filters covering subcategories.
///
/// If only the category fetch fails the products are still filtered, by
/// exact category, and a warning is attached.
pub async fn load_filtered_products(
    store: &dyn RemoteStore,
    filter: &ProductFilter,
) -> Loaded<Product> {
    let products = load_products(store).await;
    if products.notice.is_some() || filter.category.is_none() {
        let items = filter_products(&products.items, filter, None)
            .into_iter()
            .cloned()
            .collect();
        return Loaded {
            items,
            notice: products.notice,
        };
    }

    let categories = load_categories(store).await;
    let tree = categories.notice.is_none().then(|| CategoryTree::build(categories.items));
    let items = filter_products(&products.items, filter, tree.as_ref())
        .into_iter()
        .cloned()
        .collect();
    Loaded {
        items,
        notice: categories
            .notice
            .map(|_| Notice::warning("Subcategories could not be loaded; showing exact matches only.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopkeep_catalog::{NewCategory, NewProduct};
    use shopkeep_store::InMemoryRemoteStore;

    fn new_product(name: &str, category_id: Option<shopkeep_core::CategoryId>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            sku: None,
            category_id,
            price: dec!(10),
            stock: 20,
            low_stock_threshold: 5,
        }
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_list_and_notice() {
        let store = InMemoryRemoteStore::new();
        store.set_unavailable("products");

        let loaded = load_products(&store).await;

        assert!(loaded.items.is_empty());
        let notice = loaded.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("Check your connection"));
    }

    #[tokio::test]
    async fn other_tables_still_load_after_a_failure() {
        let store = InMemoryRemoteStore::new();
        store.set_unavailable("orders");
        product::create(&store, &new_product("Soap", None)).await.unwrap();

        assert!(load_orders(&store).await.notice.is_some());
        let products = load_products(&store).await;
        assert!(products.notice.is_none());
        assert_eq!(products.items.len(), 1);
    }

    #[tokio::test]
    async fn category_filter_includes_subcategories() {
        let store = InMemoryRemoteStore::new();
        let grocery = category::create(&store, &NewCategory { name: "Grocery".into(), parent_id: None })
            .await
            .unwrap();
        let grains = category::create(
            &store,
            &NewCategory {
                name: "Grains".into(),
                parent_id: Some(grocery.id),
            },
        )
        .await
        .unwrap();
        product::create(&store, &new_product("Rice", Some(grains.id))).await.unwrap();
        product::create(&store, &new_product("Pen", None)).await.unwrap();

        let filter = ProductFilter {
            category: Some(grocery.id),
            ..ProductFilter::default()
        };
        let loaded = load_filtered_products(&store, &filter).await;

        assert!(loaded.notice.is_none());
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].name, "Rice");
    }

    #[tokio::test]
    async fn missing_categories_degrade_to_exact_match() {
        let store = InMemoryRemoteStore::new();
        let grocery = category::create(&store, &NewCategory { name: "Grocery".into(), parent_id: None })
            .await
            .unwrap();
        product::create(&store, &new_product("Sugar", Some(grocery.id))).await.unwrap();
        store.set_unavailable("categories");

        let filter = ProductFilter {
            category: Some(grocery.id),
            ..ProductFilter::default()
        };
        let loaded = load_filtered_products(&store, &filter).await;

        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.notice.unwrap().level, NoticeLevel::Warning);
    }
}

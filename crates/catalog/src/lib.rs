//! Catalog records (products, customers, orders, categories) and the pure
//! data-access functions that read and write them through a [`RemoteStore`].
//!
//! Functions here take the store as an argument and return records; mirroring
//! results into view state is the caller's concern.
//!
//! [`RemoteStore`]: shopkeep_store::RemoteStore

pub mod category;
pub mod customer;
pub mod filter;
pub mod order;
pub mod product;
pub mod repo;

pub use category::{Category, CategoryTree, NewCategory};
pub use customer::{Customer, CustomerPatch, NewCustomer};
pub use filter::{ProductFilter, StockFilter, filter_products};
pub use order::{NewOrder, Order, OrderItem, PaymentMethod, WALK_IN_CUSTOMER};
pub use product::{NewProduct, Product, ProductPatch, StockState};
pub use repo::{CatalogError, NewRecord, RemoteEntity};

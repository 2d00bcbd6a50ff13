//! In-memory product filtering for list views.

use rust_decimal::Decimal;

use shopkeep_core::CategoryId;

use crate::category::CategoryTree;
use crate::product::{Product, StockState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockFilter {
    #[default]
    All,
    InStock,
    Low,
    Out,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive match against name or SKU.
    pub search: Option<String>,
    /// Restrict to a category and (given a tree) its descendants.
    pub category: Option<CategoryId>,
    pub stock: StockFilter,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Products passing every criterion of `filter`, in input order.
///
/// Without a `tree`, the category criterion matches the exact category only.
pub fn filter_products<'a>(
    products: &'a [Product],
    filter: &ProductFilter,
    tree: Option<&CategoryTree>,
) -> Vec<&'a Product> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let categories = filter.category.map(|id| match tree {
        Some(tree) if tree.get(id).is_some() => tree.subtree_ids(id),
        _ => std::iter::once(id).collect(),
    });

    products
        .iter()
        .filter(|p| match &needle {
            Some(n) => {
                p.name.to_lowercase().contains(n)
                    || p.sku.as_deref().is_some_and(|s| s.to_lowercase().contains(n))
            }
            None => true,
        })
        .filter(|p| match &categories {
            Some(set) => p.category_id.is_some_and(|c| set.contains(&c)),
            None => true,
        })
        .filter(|p| match filter.stock {
            StockFilter::All => true,
            StockFilter::InStock => p.stock_state() != StockState::Out,
            StockFilter::Low => p.stock_state() == StockState::Low,
            StockFilter::Out => p.stock_state() == StockState::Out,
        })
        .filter(|p| filter.min_price.is_none_or(|min| p.price >= min))
        .filter(|p| filter.max_price.is_none_or(|max| p.price <= max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use rust_decimal_macros::dec;
    use shopkeep_core::ProductId;

    fn product(name: &str, sku: Option<&str>, category: Option<CategoryId>, price: Decimal, stock: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            sku: sku.map(str::to_string),
            category_id: category,
            price,
            stock,
            low_stock_threshold: 5,
            created_at: None,
        }
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let products = vec![product("A", None, None, dec!(1), 0), product("B", None, None, dec!(2), 10)];
        assert!(ProductFilter::default().is_empty());
        assert_eq!(filter_products(&products, &ProductFilter::default(), None).len(), 2);
    }

    #[test]
    fn search_matches_name_or_sku() {
        let products = vec![
            product("Green Tea", Some("BEV-01"), None, dec!(120), 10),
            product("Coffee", Some("bev-02"), None, dec!(300), 10),
            product("Soap", Some("HYG-01"), None, dec!(40), 10),
        ];
        let filter = ProductFilter {
            search: Some("BEV".to_string()),
            ..ProductFilter::default()
        };
        let names: Vec<_> = filter_products(&products, &filter, None).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Green Tea", "Coffee"]);
    }

    #[test]
    fn category_filter_includes_descendants_when_tree_is_given() {
        let grocery = Category {
            id: CategoryId::new(),
            name: "Grocery".to_string(),
            parent_id: None,
        };
        let rice = Category {
            id: CategoryId::new(),
            name: "Rice".to_string(),
            parent_id: Some(grocery.id),
        };
        let tree = CategoryTree::build(vec![grocery.clone(), rice.clone()]);
        let products = vec![
            product("Basmati", None, Some(rice.id), dec!(90), 10),
            product("Salt", None, Some(grocery.id), dec!(20), 10),
            product("Pen", None, None, dec!(10), 10),
        ];
        let filter = ProductFilter {
            category: Some(grocery.id),
            ..ProductFilter::default()
        };

        assert_eq!(filter_products(&products, &filter, Some(&tree)).len(), 2);
        assert_eq!(filter_products(&products, &filter, None).len(), 1);
    }

    #[test]
    fn stock_and_price_criteria_combine() {
        let products = vec![
            product("A", None, None, dec!(50), 0),
            product("B", None, None, dec!(150), 3),
            product("C", None, None, dec!(250), 30),
        ];
        let low = ProductFilter {
            stock: StockFilter::Low,
            ..ProductFilter::default()
        };
        assert_eq!(filter_products(&products, &low, None)[0].name, "B");

        let priced = ProductFilter {
            stock: StockFilter::InStock,
            min_price: Some(dec!(100)),
            max_price: Some(dec!(200)),
            ..ProductFilter::default()
        };
        let names: Vec<_> = filter_products(&products, &priced, None).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B"]);
    }
}

//! # Derived Views
//!
//! Read-only projections over cached entity collections.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Resource Context items ──► view function ──► what the screen renders  │
//! │                                                                         │
//! │  • Pure: same slice in, same answer out                                │
//! │  • No cached state: re-run on every render                             │
//! │  • Staleness follows the owning context's async state                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::{Customer, Identified, Product, PurchaseOrder, PurchaseOrderStatus};
use crate::DEFAULT_LOW_STOCK_THRESHOLD;

// =============================================================================
// Generic
// =============================================================================

/// Finds an entity by identifier.
pub fn find_by_id<'a, T: Identified>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

// =============================================================================
// Products / Stock
// =============================================================================

/// Quantity of a product available in a store.
///
/// ## Fallback
/// ```text
/// store given, key present in stock_by_store  → that override
/// store given, key absent                     → product.stock (total)
/// no store                                    → product.stock (total)
/// ```
pub fn effective_stock(product: &Product, store_id: Option<&str>) -> i64 {
    store_id
        .and_then(|store| product.stock_by_store.get(store).copied())
        .unwrap_or(product.stock)
}

/// Sum of all per-store overrides, or the total when none are set.
pub fn total_store_stock(product: &Product) -> i64 {
    if product.stock_by_store.is_empty() {
        product.stock
    } else {
        product.stock_by_store.values().sum()
    }
}

/// Threshold a product is compared against in [`low_stock`].
pub fn low_stock_threshold(product: &Product, default_threshold: i64) -> i64 {
    product.low_stock_threshold.unwrap_or(default_threshold)
}

/// Active products at or below their low-stock threshold.
///
/// A product's own `low_stock_threshold` wins over `default_threshold`.
/// Sorted by effective stock ascending (most urgent first), then by name.
pub fn low_stock<'a>(
    products: &'a [Product],
    default_threshold: i64,
    store_id: Option<&str>,
) -> Vec<&'a Product> {
    let mut low: Vec<&Product> = products
        .iter()
        .filter(|p| p.is_active)
        .filter(|p| effective_stock(p, store_id) <= low_stock_threshold(p, default_threshold))
        .collect();

    low.sort_by(|a, b| {
        effective_stock(a, store_id)
            .cmp(&effective_stock(b, store_id))
            .then_with(|| a.name.cmp(&b.name))
    });
    low
}

/// [`low_stock`] with [`DEFAULT_LOW_STOCK_THRESHOLD`].
pub fn low_stock_default<'a>(products: &'a [Product], store_id: Option<&str>) -> Vec<&'a Product> {
    low_stock(products, DEFAULT_LOW_STOCK_THRESHOLD, store_id)
}

/// Value of stock on hand at cost. Products without a cost count as zero.
pub fn inventory_value(products: &[Product], store_id: Option<&str>) -> Money {
    products
        .iter()
        .filter(|p| p.is_active)
        .map(|p| Money::from_cents(p.cost_cents.unwrap_or(0)).times(effective_stock(p, store_id)))
        .sum()
}

/// Case-insensitive match on name, SKU or barcode. Empty query matches all.
pub fn search_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }

    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.sku.to_lowercase().contains(&needle)
                || p.barcode
                    .as_deref()
                    .is_some_and(|b| b.to_lowercase().contains(&needle))
        })
        .collect()
}

// =============================================================================
// Customers
// =============================================================================

/// Customers with the highest loyalty balance first (ties by name).
pub fn top_customers(customers: &[Customer], limit: usize) -> Vec<&Customer> {
    let mut ranked: Vec<&Customer> = customers.iter().collect();
    ranked.sort_by(|a, b| {
        b.loyalty_points
            .cmp(&a.loyalty_points)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Purchase Orders
// =============================================================================

pub fn orders_with_status(
    orders: &[PurchaseOrder],
    status: PurchaseOrderStatus,
) -> Vec<&PurchaseOrder> {
    orders.iter().filter(|o| o.status == status).collect()
}

/// Draft or ordered purchase orders for one supplier.
pub fn open_orders_for_supplier<'a>(
    orders: &'a [PurchaseOrder],
    supplier_id: &str,
) -> Vec<&'a PurchaseOrder> {
    orders
        .iter()
        .filter(|o| o.supplier_id == supplier_id && o.status.is_open())
        .collect()
}

pub fn purchase_order_total(order: &PurchaseOrder) -> Money {
    order.lines.iter().map(|line| line.total()).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, name: &str, stock: i64) -> Product {
        let mut p = Product::new(sku, name, 100);
        p.stock = stock;
        p
    }

    #[test]
    fn test_effective_stock_fallback() {
        let mut p = product("A", "Apple", 20);
        p.stock_by_store.insert("s1".to_string(), 4);

        assert_eq!(effective_stock(&p, Some("s1")), 4);
        assert_eq!(effective_stock(&p, Some("s2")), 20);
        assert_eq!(effective_stock(&p, None), 20);
    }

    #[test]
    fn test_total_store_stock() {
        let mut p = product("A", "Apple", 20);
        assert_eq!(total_store_stock(&p), 20);

        p.stock_by_store.insert("s1".to_string(), 4);
        p.stock_by_store.insert("s2".to_string(), 6);
        assert_eq!(total_store_stock(&p), 10);
    }

    #[test]
    fn test_low_stock_filters_and_sorts() {
        let mut own_threshold = product("C", "Cherry", 8);
        own_threshold.low_stock_threshold = Some(10);
        let mut inactive = product("D", "Date", 0);
        inactive.is_active = false;

        let products = vec![
            product("A", "Apple", 3),
            product("B", "Banana", 50),
            own_threshold,
            inactive,
            product("E", "Elderberry", 3),
            product("F", "Fig", 0),
        ];

        let names: Vec<&str> = low_stock(&products, 5, None)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Fig", "Apple", "Elderberry", "Cherry"]);
    }

    #[test]
    fn test_low_stock_per_store() {
        let mut p = product("A", "Apple", 100);
        p.stock_by_store.insert("s1".to_string(), 1);
        let products = vec![p];

        assert_eq!(low_stock(&products, 5, Some("s1")).len(), 1);
        assert!(low_stock(&products, 5, Some("s2")).is_empty());
        assert!(low_stock_default(&products, None).is_empty());
    }

    #[test]
    fn test_inventory_value() {
        let mut a = product("A", "Apple", 10);
        a.cost_cents = Some(50);
        let b = product("B", "Banana", 10);
        assert_eq!(inventory_value(&[a, b], None).cents(), 500);
    }

    #[test]
    fn test_inventory_value_saturates() {
        let mut a = product("A", "Apple", i64::MAX);
        a.cost_cents = Some(2);
        let mut b = product("B", "Banana", i64::MAX);
        b.cost_cents = Some(2);
        assert_eq!(inventory_value(&[a, b], None).cents(), i64::MAX);
    }

    #[test]
    fn test_search_products() {
        let mut p = product("COKE-330", "Coca-Cola", 1);
        p.barcode = Some("5449000000996".to_string());
        let products = vec![p, product("WATER-1L", "Still Water", 1)];

        assert_eq!(search_products(&products, "coke").len(), 1);
        assert_eq!(search_products(&products, "water").len(), 1);
        assert_eq!(search_products(&products, "54490").len(), 1);
        assert_eq!(search_products(&products, "  ").len(), 2);

        let mut tagged = product("TAG-1", "Gift Card", 1);
        tagged.barcode = Some("GC-ABC123".to_string());
        let products = vec![tagged];
        assert_eq!(search_products(&products, "abc123").len(), 1);
        assert_eq!(search_products(&products, "gc-ABC").len(), 1);
    }

    #[test]
    fn test_find_by_id() {
        let products = vec![product("A", "Apple", 1)];
        let id = products[0].id.clone();
        assert!(find_by_id(&products, &id).is_some());
        assert!(find_by_id(&products, "missing").is_none());
    }

    #[test]
    fn test_top_customers() {
        let mut a = Customer::new("Ana");
        a.loyalty_points = 10;
        let mut b = Customer::new("Ben");
        b.loyalty_points = 30;
        let c = Customer::new("Cid");

        let customers = [a, b, c];
        let ranked: Vec<&str> = top_customers(&customers, 2)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(ranked, vec!["Ben", "Ana"]);
    }

    #[test]
    fn test_purchase_order_views() {
        let draft = PurchaseOrder::new("sup-1")
            .with_line("p1", 2, 150)
            .with_line("p2", 1, 700);
        let mut received = PurchaseOrder::new("sup-1");
        received.status = PurchaseOrderStatus::Received;
        let other = PurchaseOrder::new("sup-2");

        let orders = vec![draft, received, other];
        assert_eq!(purchase_order_total(&orders[0]).cents(), 1000);
        assert_eq!(open_orders_for_supplier(&orders, "sup-1").len(), 1);
        assert_eq!(orders_with_status(&orders, PurchaseOrderStatus::Draft).len(), 2);
    }
}

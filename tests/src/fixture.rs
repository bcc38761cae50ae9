//! The shop fixture: schema and seed data.

use crate::error::{FixtureError, FixtureResult};
use relgraph_catalog::{CatalogBuilder, NavigationDef, PropertyDef, SchemaCatalog};
use relgraph_core::{datetime_to_millis, parse_datetime, Field, Record, RecordKey, Value, ValueType};
use relgraph_producer::{Producer, ProducerConfig};
use relgraph_store::MemoryStore;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const NAMESPACE: &str = "Shop";

/// Suppliers, categories, products, orders and order lines.
///
/// Order lines have a composite key (`OrderId`, `LineNo`) stored in an
/// embedded `id` sub-record. Product release dates are stored as epoch
/// milliseconds in the `released_at` column.
pub fn shop_catalog() -> FixtureResult<Arc<SchemaCatalog>> {
    let mut builder = CatalogBuilder::new(NAMESPACE);
    builder
        .add_type("Supplier")
        .property(PropertyDef::new("Id", ValueType::Int))
        .property(PropertyDef::new("Name", ValueType::String))
        .property(PropertyDef::new("Country", ValueType::String).nullable())
        .key("Id")
        .navigation(NavigationDef::many("Products", "Product").mapped_by("supplier"))
        .done()?;
    builder
        .add_type("Category")
        .property(PropertyDef::new("Id", ValueType::Int))
        .property(PropertyDef::new("Name", ValueType::String))
        .key("Id")
        .navigation(
            NavigationDef::many("Products", "Product")
                .mapped_by("category")
                .roles("Category", "Products"),
        )
        .navigation(NavigationDef::many("Featured", "Product").owned("featured"))
        .done()?;
    builder
        .add_type("Product")
        .property(PropertyDef::new("Id", ValueType::Int))
        .property(PropertyDef::new("Name", ValueType::String))
        .property(PropertyDef::new("Price", ValueType::Float).nullable())
        .property(
            PropertyDef::new("Released", ValueType::DateTime)
                .nullable()
                .column("released_at")
                .epoch_millis(),
        )
        .property(PropertyDef::new("Discontinued", ValueType::Bool))
        .key("Id")
        .navigation(NavigationDef::optional("Category", "Category").owned("category"))
        .navigation(NavigationDef::optional("Supplier", "Supplier").owned("supplier"))
        .navigation(NavigationDef::many("Lines", "OrderLine").mapped_by("product"))
        .done()?;
    builder
        .add_type("Order")
        .property(PropertyDef::new("Id", ValueType::Int))
        .property(PropertyDef::new("Customer", ValueType::String))
        .property(PropertyDef::new("Placed", ValueType::DateTime).nullable())
        .key("Id")
        .navigation(NavigationDef::many("Lines", "OrderLine").mapped_by("order"))
        .done()?;
    builder
        .add_type("OrderLine")
        .property(PropertyDef::new("OrderId", ValueType::Int))
        .property(PropertyDef::new("LineNo", ValueType::Int))
        .property(PropertyDef::new("Quantity", ValueType::Int))
        .embedded_key("id", ["OrderId", "LineNo"])
        .navigation(NavigationDef::one("Order", "Order").owned("order"))
        .navigation(NavigationDef::one("Product", "Product").owned("product"))
        .done()?;

    builder.add_entity_set("Suppliers", "Supplier")?;
    builder.add_entity_set("Categories", "Category")?;
    builder.add_entity_set("Products", "Product")?;
    builder.add_entity_set("Orders", "Order")?;
    builder.add_entity_set("OrderLines", "OrderLine")?;
    Ok(Arc::new(builder.build()?))
}

/// A store seeded with the shop data:
///
/// | product | name       | price | category | supplier | discontinued |
/// |---------|------------|-------|----------|----------|--------------|
/// | 1       | Earl Grey  | 4.5   | Tea      | Twinings | no           |
/// | 2       | Assam      | 3.0   | Tea      | Twinings | no           |
/// | 3       | Espresso   | 2.5   | Coffee   | Lavazza  | no           |
/// | 4       | Chai       | -     | Tea      | Lavazza  | no           |
/// | 5       | Darjeeling | 6.0   | Tea      | Twinings | yes          |
///
/// Tea features products 5, 1 and 2, stored in that order. Category 3
/// (Cocoa) has no products. Order 100 (Ann) has lines 1..=3 for
/// products 1, 3 and 5; order 101 (Bo) has one line for product 2.
pub fn seeded_store() -> FixtureResult<MemoryStore> {
    let store = MemoryStore::new(shop_catalog()?);

    for (id, name, country) in [(1i64, "Twinings", "UK"), (2, "Lavazza", "IT")] {
        store.insert(
            Record::new("Supplier")
                .with("Id", id)
                .with("Name", name)
                .with("Country", country),
        )?;
    }
    for (id, name) in [(1i64, "Tea"), (2, "Coffee"), (3, "Cocoa")] {
        let mut category = Record::new("Category").with("Id", id).with("Name", name);
        if id == 1 {
            let featured = [5i64, 1, 2].into_iter().map(RecordKey::single).collect();
            category = category.with_field("featured", Field::References(featured));
        }
        store.insert(category)?;
    }

    let products = [
        (1i64, "Earl Grey", Some(4.5), 1i64, 1i64, false, "2019-03-01T00:00:00"),
        (2, "Assam", Some(3.0), 1, 1, false, "2020-06-15T00:00:00"),
        (3, "Espresso", Some(2.5), 2, 2, false, "2018-01-10T00:00:00"),
        (4, "Chai", None, 1, 2, false, "2021-09-30T00:00:00"),
        (5, "Darjeeling", Some(6.0), 1, 1, true, "2017-11-05T00:00:00"),
    ];
    for (id, name, price, category, supplier, discontinued, released) in products {
        store.insert(
            Record::new("Product")
                .with("Id", id)
                .with("Name", name)
                .with("Price", price.map_or(Value::Null, Value::Float))
                .with("released_at", Value::Timestamp(millis(released)?))
                .with("Discontinued", discontinued)
                .with_field("category", reference(category))
                .with_field("supplier", reference(supplier)),
        )?;
    }

    for (id, customer, placed) in [(100i64, "Ann", "2022-02-01T10:00:00"), (101, "Bo", "2022-02-03T12:30:00")] {
        let placed = parse_datetime(placed).ok_or_else(|| FixtureError::InvalidSeed(placed.to_string()))?;
        store.insert(
            Record::new("Order")
                .with("Id", id)
                .with("Customer", customer)
                .with("Placed", placed),
        )?;
    }
    for (order, line, quantity, product) in [
        (100i64, 1i64, 2i64, 1i64),
        (100, 2, 1, 3),
        (100, 3, 5, 5),
        (101, 1, 3, 2),
    ] {
        store.insert(
            Record::new("OrderLine")
                .with_field("id", line_key(order, line))
                .with("Quantity", quantity)
                .with_field("order", reference(order))
                .with_field("product", reference(product)),
        )?;
    }
    Ok(store)
}

/// A producer over a freshly seeded store.
pub fn shop(max_results: usize) -> FixtureResult<Producer<MemoryStore>> {
    let store = seeded_store()?;
    let catalog = store.catalog().clone();
    let config = ProducerConfig {
        namespace: NAMESPACE.to_string(),
        max_results,
    };
    Ok(Producer::new(catalog, store, config))
}

pub fn reference(id: i64) -> Field {
    Field::Reference(Some(RecordKey::single(id)))
}

pub fn line_key(order: i64, line: i64) -> Field {
    Field::Embedded(BTreeMap::from([
        ("OrderId".to_string(), Value::Int(order)),
        ("LineNo".to_string(), Value::Int(line)),
    ]))
}

fn millis(text: &str) -> FixtureResult<i64> {
    parse_datetime(text)
        .map(|dt| datetime_to_millis(&dt))
        .ok_or_else(|| FixtureError::InvalidSeed(text.to_string()))
}

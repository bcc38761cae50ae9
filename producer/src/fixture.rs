use relgraph_catalog::{CatalogBuilder, NavigationDef, PropertyDef, SchemaCatalog};
use relgraph_core::{parse_datetime, datetime_to_millis, Field, Record, RecordKey, Value, ValueType};
use relgraph_store::MemoryStore;
use std::collections::BTreeMap;
use std::sync::Arc;

pub(crate) fn catalog() -> Arc<SchemaCatalog> {
    let mut builder = CatalogBuilder::new("Shop");
    builder
        .add_type("Category")
        .property(PropertyDef::new("Id", ValueType::Int))
        .property(PropertyDef::new("Name", ValueType::String))
        .key("Id")
        .navigation(NavigationDef::many("Products", "Product").mapped_by("category"))
        .done()
        .unwrap();
    builder
        .add_type("Product")
        .property(PropertyDef::new("Id", ValueType::Int))
        .property(PropertyDef::new("Name", ValueType::String))
        .property(PropertyDef::new("Price", ValueType::Float).nullable())
        .property(
            PropertyDef::new("Released", ValueType::DateTime)
                .nullable()
                .column("released")
                .epoch_millis(),
        )
        .key("Id")
        .navigation(NavigationDef::optional("Category", "Category").owned("category"))
        .navigation(NavigationDef::many("Lines", "OrderLine").mapped_by("product"))
        .done()
        .unwrap();
    builder
        .add_type("Order")
        .property(PropertyDef::new("Id", ValueType::Int))
        .property(PropertyDef::new("Customer", ValueType::String))
        .key("Id")
        .navigation(NavigationDef::many("Lines", "OrderLine").mapped_by("order"))
        .done()
        .unwrap();
    builder
        .add_type("OrderLine")
        .property(PropertyDef::new("OrderId", ValueType::Int))
        .property(PropertyDef::new("LineNo", ValueType::Int))
        .property(PropertyDef::new("Quantity", ValueType::Int))
        .embedded_key("id", ["OrderId", "LineNo"])
        .navigation(NavigationDef::one("Product", "Product").owned("product"))
        .navigation(NavigationDef::one("Order", "Order").owned("order"))
        .done()
        .unwrap();
    builder.add_entity_set("Categories", "Category").unwrap();
    builder.add_entity_set("Products", "Product").unwrap();
    builder.add_entity_set("Orders", "Order").unwrap();
    builder.add_entity_set("OrderLines", "OrderLine").unwrap();
    Arc::new(builder.build().unwrap())
}

pub(crate) fn reference(id: i64) -> Field {
    Field::Reference(Some(RecordKey::single(id)))
}

pub(crate) fn line_key(order: i64, line: i64) -> Field {
    Field::Embedded(BTreeMap::from([
        ("OrderId".to_string(), Value::Int(order)),
        ("LineNo".to_string(), Value::Int(line)),
    ]))
}

/// Two categories, four products (one without category or price), one order with two lines.
pub(crate) fn store() -> MemoryStore {
    let store = MemoryStore::new(catalog());
    let released = datetime_to_millis(&parse_datetime("2020-02-02T00:00:00").unwrap());

    for (id, name) in [(1i64, "Tea"), (2, "Coffee")] {
        store
            .insert(Record::new("Category").with("Id", id).with("Name", name))
            .unwrap();
    }
    for (id, name, price, category) in [
        (1i64, "Earl Grey", 4.5, Some(1i64)),
        (2, "Assam", 3.0, Some(1)),
        (3, "Espresso", 2.5, Some(2)),
    ] {
        let mut record = Record::new("Product")
            .with("Id", id)
            .with("Name", name)
            .with("Price", price)
            .with("released", Value::Timestamp(released));
        if let Some(category) = category {
            record.set_field("category", reference(category));
        }
        store.insert(record).unwrap();
    }
    store
        .insert(Record::new("Product").with("Id", 4i64).with("Name", "Decaf"))
        .unwrap();

    store
        .insert(Record::new("Order").with("Id", 10i64).with("Customer", "Ann"))
        .unwrap();
    for (line, quantity, product) in [(1i64, 2i64, 1i64), (2, 1, 3)] {
        store
            .insert(
                Record::new("OrderLine")
                    .with_field("id", line_key(10, line))
                    .with("Quantity", quantity)
                    .with_field("product", reference(product))
                    .with_field("order", reference(10)),
            )
            .unwrap();
    }
    store
}

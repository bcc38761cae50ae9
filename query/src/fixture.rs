use relgraph_catalog::{CatalogBuilder, PropertyDef, SchemaCatalog};
use relgraph_core::ValueType;

pub(crate) fn catalog() -> SchemaCatalog {
    let mut builder = CatalogBuilder::new("Shop");
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
        .property(PropertyDef::new("Discontinued", ValueType::Bool))
        .key("Id")
        .done()
        .unwrap();
    builder
        .add_type("OrderLine")
        .property(PropertyDef::new("OrderId", ValueType::Int))
        .property(PropertyDef::new("LineNo", ValueType::Int))
        .property(PropertyDef::new("Quantity", ValueType::Int))
        .embedded_key("id", ["OrderId", "LineNo"])
        .done()
        .unwrap();
    builder
        .add_type("Tag")
        .property(PropertyDef::new("Code", ValueType::String))
        .property(PropertyDef::new("N", ValueType::Int))
        .embedded_key("id", ["Code", "N"])
        .done()
        .unwrap();
    builder
        .add_type("Label")
        .property(PropertyDef::new("Code", ValueType::String))
        .key("Code")
        .done()
        .unwrap();
    builder.add_entity_set("Products", "Product").unwrap();
    builder.add_entity_set("OrderLines", "OrderLine").unwrap();
    builder.build().unwrap()
}

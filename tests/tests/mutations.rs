//! Create, update, merge and delete integration tests.

use pretty_assertions::assert_eq;
use relgraph_tests::prelude::*;
use serde_json::json;

fn product(id: i64, name: &str) -> Entity {
    Entity::new("Products", "Product")
        .with_property(Property::new("Id", ValueType::Int, id))
        .with_property(Property::new("Name", ValueType::String, name))
}

fn key(id: i64) -> EntityKey {
    EntityKey::single(id)
}

mod create {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: create_round_trip ==========
    #[test]
    fn test_create_round_trip() {
        // GIVEN a new product with every property supplied
        init_logging();
        let shop = shop(50).unwrap();
        let released = parse_datetime("2023-04-05T06:07:08").unwrap();
        let supplied = vec![
            Property::new("Id", ValueType::Int, 6i64),
            Property::new("Name", ValueType::String, "Sencha"),
            Property::new("Price", ValueType::Float, 7.25),
            Property::new("Released", ValueType::DateTime, released),
            Property::new("Discontinued", ValueType::Bool, false),
        ];
        let mut entity = Entity::new("Products", "Product");
        entity.properties = supplied.clone();

        // WHEN creating it
        let created = shop.create_entity("Products", &entity, &NoLinks).unwrap();

        // THEN it reads back with the same values, the key tagged
        let mut expected = supplied;
        expected[0].key = true;
        assert_eq!(created.properties, expected);
        assert_eq!(created.key, Some(key(6)));
        assert_eq!(shop.get_entity("Products", &key(6), None).unwrap(), created);
        assert_eq!(shop.store().len("Product"), 6);
    }

    // ========== TEST: create_with_deferred_links ==========
    #[test]
    fn test_create_with_deferred_links() {
        // GIVEN links resolved through served representations
        let shop = shop(50).unwrap();
        let links = StaticLinks::new()
            .with(
                "http://shop/Categories(2)",
                json!({"type": "Shop.Category", "properties": {"Id": 2, "Name": "Coffee"}}),
            )
            .with(
                "http://shop/Suppliers(2)",
                json!({"type": "Shop.Supplier", "properties": {"Id": 2}}),
            );
        let entity = product(6, "Lungo")
            .with_link(Link::deferred("Category", "http://shop/Categories(2)"))
            .with_link(Link::deferred("Supplier", "http://shop/Suppliers(2)"));

        // WHEN creating the product
        shop.create_entity("Products", &entity, &links).unwrap();

        // THEN both relationships are wired
        assert_eq!(
            links.requests(),
            vec!["http://shop/Categories(2)", "http://shop/Suppliers(2)"]
        );
        let coffee = shop
            .get_nav_property("Products", &key(6), "Category", &QueryDescriptor::new())
            .unwrap()
            .into_entity()
            .unwrap();
        assert_eq!(coffee.value("Name"), Some(&Value::from("Coffee")));
        let page = shop
            .get_nav_property("Suppliers", &key(2), "Products", &QueryDescriptor::new())
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(ids(&page.entities), vec![3, 4, 6]);
    }

    // ========== TEST: create_composite_through_own_links ==========
    #[test]
    fn test_create_composite_through_own_links() {
        // GIVEN an order line whose links point at this producer's own sets
        let shop = shop(50).unwrap();
        let line = Entity::new("OrderLines", "OrderLine")
            .with_property(Property::new("OrderId", ValueType::Int, 101i64))
            .with_property(Property::new("LineNo", ValueType::Int, 2i64))
            .with_property(Property::new("Quantity", ValueType::Int, 4i64))
            .with_link(Link::deferred("Order", "Orders(101)"))
            .with_link(Link::deferred("Product", "Products(3)"));

        // WHEN creating it with the producer as the link follower
        let created = shop.create_entity("OrderLines", &line, &shop).unwrap();

        // THEN it is reachable from its order
        assert_eq!(created.key, Some(EntityKey::parse("(OrderId=101,LineNo=2)").unwrap()));
        let espresso = shop
            .get_nav_property(
                "Orders",
                &key(101),
                "Lines(OrderId=101,LineNo=2)/Product",
                &QueryDescriptor::new(),
            )
            .unwrap()
            .into_entity()
            .unwrap();
        assert_eq!(espresso.value("Name"), Some(&Value::from("Espresso")));
    }

    // ========== TEST: create_claims_inverse_side ==========
    #[test]
    fn test_create_claims_inverse_side() {
        // GIVEN a new order claiming Bo's only line inline
        let shop = shop(50).unwrap();
        let line = Entity::new("OrderLines", "OrderLine")
            .with_property(Property::new("OrderId", ValueType::Int, 101i64))
            .with_property(Property::new("LineNo", ValueType::Int, 1i64));
        let order = Entity::new("Orders", "Order")
            .with_property(Property::new("Id", ValueType::Int, 102i64))
            .with_property(Property::new("Customer", ValueType::String, "Cy"))
            .with_link(Link::entities("Lines", vec![line]));

        // WHEN creating the order
        shop.create_entity("Orders", &order, &NoLinks).unwrap();

        // THEN the line now points at the new order
        let lines = |id: i64| {
            shop.get_nav_property("Orders", &key(id), "Lines", &QueryDescriptor::new())
                .unwrap()
                .into_page()
                .unwrap()
                .entities
        };
        assert_eq!(lines(102).len(), 1);
        assert_eq!(lines(102)[0].value("Quantity"), Some(&Value::Int(3)));
        assert_eq!(lines(101), Vec::<Entity>::new());
    }

    // ========== TEST: failed_link_rolls_back ==========
    #[test]
    fn test_failed_link_rolls_back() {
        // GIVEN a supplier whose first link would succeed and second cannot be followed
        let shop = shop(50).unwrap();
        let links = StaticLinks::new();
        let espresso = product(3, "Espresso");
        let supplier = Entity::new("Suppliers", "Supplier")
            .with_property(Property::new("Id", ValueType::Int, 3i64))
            .with_property(Property::new("Name", ValueType::String, "Illy"))
            .with_link(Link::entities("Products", vec![espresso]))
            .with_link(Link::deferred("Products", "http://shop/Products(99)"));
        let commits = shop.store().stats().commits();

        // WHEN creating it
        let err = shop.create_entity("Suppliers", &supplier, &links).unwrap_err();

        // THEN nothing was written
        assert_eq!(err.kind(), ErrorKind::LinkResolution);
        assert!(!err.is_client_error());
        assert_eq!(links.requests(), vec!["http://shop/Products(99)"]);
        assert_eq!(shop.store().len("Supplier"), 2);
        assert_eq!(shop.store().stats().commits(), commits);
        assert_eq!(
            shop.store()
                .get("Product", &RecordKey::single(3i64))
                .unwrap()
                .field("supplier"),
            Some(&reference(2))
        );
    }

    // ========== TEST: link_of_wrong_type ==========
    #[test]
    fn test_link_of_wrong_type() {
        let shop = shop(50).unwrap();
        let links = StaticLinks::new().with(
            "http://shop/Suppliers(1)",
            json!({"type": "Shop.Supplier", "properties": {"Id": 1}}),
        );
        let entity = product(6, "Oolong").with_link(Link::deferred("Category", "http://shop/Suppliers(1)"));

        let err = shop.create_entity("Products", &entity, &links).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LinkResolution);
        assert_eq!(shop.store().len("Product"), 5);
    }

    // ========== TEST: invalid_creates ==========
    #[test]
    fn test_invalid_creates() {
        let shop = shop(50).unwrap();
        let no_key = Entity::new("Products", "Product")
            .with_property(Property::new("Name", ValueType::String, "Nameless"));
        let null_name = product(6, "x").with_property(Property::new("Name", ValueType::String, Value::Null));
        let unknown = product(6, "Mate").with_property(Property::new("Caffeine", ValueType::Int, 80i64));
        let bad_type = product(6, "Mate").with_property(Property::new("Price", ValueType::String, "cheap"));

        let kinds: Vec<ErrorKind> = [no_key, null_name, unknown, bad_type]
            .iter()
            .map(|e| shop.create_entity("Products", e, &NoLinks).unwrap_err().kind())
            .collect();

        assert_eq!(
            kinds,
            vec![
                ErrorKind::KeyConversion,
                ErrorKind::InvalidProperty,
                ErrorKind::InvalidProperty,
                ErrorKind::InvalidProperty,
            ]
        );
        assert_eq!(shop.store().len("Product"), 5);
    }

    // ========== TEST: duplicate_key ==========
    #[test]
    fn test_duplicate_key() {
        let shop = shop(50).unwrap();

        let err = shop
            .create_entity("Products", &product(1, "Earl Grey again"), &NoLinks)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StoreFailure);
        let earl = shop.get_entity("Products", &key(1), None).unwrap();
        assert_eq!(earl.value("Name"), Some(&Value::from("Earl Grey")));
    }
}

mod update {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: update_replaces_everything ==========
    #[test]
    fn test_update_replaces_everything() {
        // GIVEN Assam, in the Tea category, and a replacement body with a different key
        let shop = shop(50).unwrap();
        let body = product(99, "Assam Gold")
            .with_property(Property::new("Price", ValueType::Float, 3.5))
            .with_property(Property::new("Discontinued", ValueType::Bool, true))
            .with_link(Link::entity(
                "Supplier",
                Some(
                    Entity::new("Suppliers", "Supplier")
                        .with_property(Property::new("Id", ValueType::Int, 2i64)),
                ),
            ));

        // WHEN updating product 2
        shop.update_entity("Products", &key(2), &body, &NoLinks).unwrap();

        // THEN the path key wins and unsupplied fields are gone
        let assam = shop.get_entity("Products", &key(2), None).unwrap();
        assert_eq!(assam.value("Id"), Some(&Value::Int(2)));
        assert_eq!(assam.value("Name"), Some(&Value::from("Assam Gold")));
        assert_eq!(assam.value("Released"), Some(&Value::Null));
        assert_eq!(shop.get_entity("Products", &key(99), None).unwrap_err().kind(), ErrorKind::EntityNotFound);

        let supplier = shop
            .get_nav_property("Products", &key(2), "Supplier/Name", &QueryDescriptor::new())
            .unwrap()
            .into_entity()
            .unwrap();
        assert_eq!(supplier.value("Name"), Some(&Value::from("Lavazza")));
        let category = shop
            .get_nav_property("Products", &key(2), "Category", &QueryDescriptor::new())
            .unwrap_err();
        assert_eq!(category.kind(), ErrorKind::EntityNotFound);
    }

    // ========== TEST: update_missing ==========
    #[test]
    fn test_update_missing() {
        let shop = shop(50).unwrap();

        let err = shop
            .update_entity("Products", &key(42), &product(42, "Ghost"), &NoLinks)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EntityNotFound);
        assert_eq!(shop.store().len("Product"), 5);
    }
}

mod merge {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: merge_touches_only_supplied ==========
    #[test]
    fn test_merge_touches_only_supplied() {
        // GIVEN Earl Grey and a body with a new price and a different key
        let shop = shop(50).unwrap();
        let before = shop.get_entity("Products", &key(1), None).unwrap();
        let body = Entity::new("Products", "Product")
            .with_property(Property::new("Id", ValueType::Int, 77i64))
            .with_property(Property::new("Price", ValueType::Float, 5.0));

        // WHEN merging
        shop.merge_entity("Products", &key(1), &body).unwrap();

        // THEN only the price changed
        let after = shop.get_entity("Products", &key(1), None).unwrap();
        assert_eq!(after.value("Price"), Some(&Value::Float(5.0)));
        for name in ["Id", "Name", "Released", "Discontinued"] {
            assert_eq!(after.value(name), before.value(name), "{}", name);
        }
        let category = shop
            .get_nav_property("Products", &key(1), "Category/Name", &QueryDescriptor::new())
            .unwrap()
            .into_entity()
            .unwrap();
        assert_eq!(category.value("Name"), Some(&Value::from("Tea")));
    }

    // ========== TEST: merge_missing_leaves_store_unchanged ==========
    #[test]
    fn test_merge_missing_leaves_store_unchanged() {
        // GIVEN a key with no record
        let shop = shop(50).unwrap();
        let commits = shop.store().stats().commits();
        let body = Entity::new("Products", "Product")
            .with_property(Property::new("Price", ValueType::Float, 1.0));

        // WHEN merging into it
        let err = shop.merge_entity("Products", &key(42), &body).unwrap_err();

        // THEN it is reported missing and nothing was committed
        assert_eq!(err.kind(), ErrorKind::EntityNotFound);
        assert!(err.is_client_error());
        assert_eq!(shop.store().len("Product"), 5);
        assert_eq!(shop.store().stats().commits(), commits);
    }

    // ========== TEST: merge_rejects_bad_values ==========
    #[test]
    fn test_merge_rejects_bad_values() {
        let shop = shop(50).unwrap();
        let body = Entity::new("Products", "Product")
            .with_property(Property::new("Price", ValueType::Float, 9.0))
            .with_property(Property::new("Name", ValueType::String, Value::Null));

        let err = shop.merge_entity("Products", &key(1), &body).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidProperty);
        let earl = shop.get_entity("Products", &key(1), None).unwrap();
        assert_eq!(earl.value("Price"), Some(&Value::Float(4.5)));
    }
}

mod delete {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: delete_then_missing ==========
    #[test]
    fn test_delete_then_missing() {
        // GIVEN Chai
        let shop = shop(50).unwrap();

        // WHEN deleting it
        shop.delete_entity("Products", &key(4)).unwrap();

        // THEN it is gone, and a second delete reports it missing
        assert_eq!(shop.store().len("Product"), 4);
        let err = shop.get_entity("Products", &key(4), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EntityNotFound);
        let err = shop.delete_entity("Products", &key(4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EntityNotFound);

        let page = shop
            .get_nav_property("Categories", &key(1), "Products", &QueryDescriptor::new())
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(ids(&page.entities), vec![1, 2, 5]);
    }

    // ========== TEST: delete_composite ==========
    #[test]
    fn test_delete_composite() {
        let shop = shop(50).unwrap();
        let key = EntityKey::parse("(OrderId=100,LineNo=2)").unwrap();

        shop.delete_entity("OrderLines", &key).unwrap();

        assert_eq!(shop.store().len("OrderLine"), 3);
        assert_eq!(
            shop.get_entity("OrderLines", &key, None).unwrap_err().kind(),
            ErrorKind::EntityNotFound
        );
    }
}

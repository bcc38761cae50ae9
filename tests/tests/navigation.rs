//! Navigation path integration tests.

use pretty_assertions::assert_eq;
use relgraph_tests::prelude::*;

fn key(id: i64) -> EntityKey {
    EntityKey::single(id)
}

mod collections {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: category_products ==========
    #[test]
    fn test_category_products() {
        // GIVEN the Tea category with four products
        init_logging();
        let shop = shop(50).unwrap();

        // WHEN navigating to its products
        let result = shop
            .get_nav_property("Categories", &key(1), "Products", &QueryDescriptor::new())
            .unwrap();

        // THEN a page of products comes back in key order
        let page = result.into_page().unwrap();
        assert_eq!(ids(&page.entities), vec![1, 2, 4, 5]);
        assert!(page.entities.iter().all(|e| e.entity_set == "Products"));
        assert_eq!(page.continuation, None);
    }

    // ========== TEST: collection_is_paged ==========
    #[test]
    fn test_collection_is_paged() {
        let shop = shop(2).unwrap();
        let base = QueryDescriptor::new();

        let first = shop
            .get_nav_property("Categories", &key(1), "Products", &base)
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(ids(&first.entities), vec![1, 2]);
        let token = first.continuation.unwrap();
        assert_eq!(token, "2");

        let second = shop
            .get_nav_property("Categories", &key(1), "Products", &base.clone().skip_token(token))
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(ids(&second.entities), vec![4, 5]);
        assert_eq!(second.continuation, None);
    }

    fn walk_featured(base: &QueryDescriptor) -> Vec<i64> {
        let shop = shop(2).unwrap();
        let mut seen = Vec::new();
        let mut query = base.clone();
        loop {
            let page = shop
                .get_nav_property("Categories", &key(1), "Featured", &query)
                .unwrap()
                .into_page()
                .unwrap();
            seen.extend(ids(&page.entities));
            match page.continuation {
                Some(token) => query = base.clone().skip_token(token),
                None => break,
            }
        }
        seen
    }

    // ========== TEST: owned_collection_pages_in_key_order ==========
    #[test]
    fn test_owned_collection_pages_in_key_order() {
        // GIVEN Tea's featured products stored as 5, 1, 2
        // WHEN walking them two at a time
        let seen = walk_featured(&QueryDescriptor::new());

        // THEN each product appears once, in key order
        assert_eq!(seen, vec![1, 2, 5]);
    }

    // ========== TEST: collection_order_ties_break_on_key ==========
    #[test]
    fn test_collection_order_ties_break_on_key() {
        // GIVEN products 1 and 2 tie on Discontinued, product 5 is discontinued
        // WHEN walking discontinued first, so a page ends inside the tie
        let seen = walk_featured(&QueryDescriptor::new().order_by_desc("Discontinued"));

        // THEN the tie is ordered by key and nothing repeats
        assert_eq!(seen, vec![5, 1, 2]);
        assert_eq!(walk_featured(&QueryDescriptor::new().order_by("Discontinued")), vec![1, 2, 5]);
    }

    // ========== TEST: collection_filter_order_and_count ==========
    #[test]
    fn test_collection_filter_order_and_count() {
        // GIVEN a filter the store could not run natively
        let shop = shop(50).unwrap();
        let query = QueryDescriptor::new()
            .filter(
                FilterExpr::call(relgraph_query::Function::Length, vec![FilterExpr::prop("Name")])
                    .gt(FilterExpr::lit(5i64)),
            )
            .order_by_desc("Name")
            .inline_count();

        // WHEN applying it to a navigated collection
        let page = shop
            .get_nav_property("Categories", &key(1), "Products", &query)
            .unwrap()
            .into_page()
            .unwrap();

        // THEN it is evaluated in memory
        assert_eq!(texts(&page.entities, "Name"), vec!["Earl Grey", "Darjeeling"]);
        assert_eq!(page.inline_count, Some(2));
    }

    // ========== TEST: empty_collection ==========
    #[test]
    fn test_empty_collection() {
        let shop = shop(50).unwrap();

        let page = shop
            .get_nav_property("Categories", &key(3), "Products", &QueryDescriptor::new().inline_count())
            .unwrap()
            .into_page()
            .unwrap();

        assert_eq!(page.entities, Vec::<Entity>::new());
        assert_eq!(page.inline_count, Some(0));
    }
}

mod single {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: keyed_segment_then_relation ==========
    #[test]
    fn test_keyed_segment_then_relation() {
        // GIVEN order 100 whose second line is for Espresso
        let shop = shop(50).unwrap();

        // WHEN selecting the line by its composite key and following Product
        let entity = shop
            .get_nav_property(
                "Orders",
                &key(100),
                "Lines(OrderId=100,LineNo=2)/Product",
                &QueryDescriptor::new(),
            )
            .unwrap()
            .into_entity()
            .unwrap();

        // THEN the product is materialized
        assert_eq!(entity.entity_type, "Product");
        assert_eq!(entity.value("Name"), Some(&Value::from("Espresso")));
        assert_eq!(entity.key, Some(EntityKey::single(3i64)));
    }

    // ========== TEST: relation_chain_with_expand ==========
    #[test]
    fn test_relation_chain_with_expand() {
        let shop = shop(50).unwrap();

        let supplier = shop
            .get_nav_property(
                "OrderLines",
                &EntityKey::parse("(OrderId=101,LineNo=1)").unwrap(),
                "Product/Supplier",
                &QueryDescriptor::new().expand("Products").select("Name"),
            )
            .unwrap()
            .into_entity()
            .unwrap();

        assert_eq!(supplier.property_names().collect::<Vec<_>>(), vec!["Name"]);
        assert_eq!(supplier.value("Name"), Some(&Value::from("Twinings")));
        let Some(Link { related: Related::Entities(products), .. }) = supplier.link("Products") else {
            panic!("expected expanded products, got {:?}", supplier.links);
        };
        assert_eq!(ids(products), vec![1, 2, 5]);
    }

    // ========== TEST: scalar_path ==========
    #[test]
    fn test_scalar_path() {
        // GIVEN Earl Grey in the Tea category
        let shop = shop(50).unwrap();

        // WHEN navigating to the category's name
        let entity = shop
            .get_nav_property("Products", &key(1), "Category/Name", &QueryDescriptor::new())
            .unwrap()
            .into_entity()
            .unwrap();

        // THEN a property-only entity of the owning type comes back
        assert_eq!(entity.entity_set, "Categories");
        assert_eq!(entity.entity_type, "Category");
        assert_eq!(
            entity.properties,
            vec![Property::new("Name", ValueType::String, "Tea")]
        );
    }

    // ========== TEST: scalar_key_path ==========
    #[test]
    fn test_scalar_key_path() {
        let shop = shop(50).unwrap();

        let entity = shop
            .get_nav_property("Products", &key(3), "Supplier/Id", &QueryDescriptor::new())
            .unwrap()
            .into_entity()
            .unwrap();

        assert_eq!(
            entity.properties,
            vec![Property::new("Id", ValueType::Int, 2i64).as_key()]
        );
    }
}

mod failures {
    use super::*;
    use pretty_assertions::assert_eq;

    fn navigate(set: &str, id: i64, path: &str) -> ProducerError {
        shop(50)
            .unwrap()
            .get_nav_property(set, &key(id), path, &QueryDescriptor::new())
            .unwrap_err()
    }

    // ========== TEST: not_found ==========
    #[test]
    fn test_not_found() {
        // missing root
        assert_eq!(navigate("Products", 42, "Category").kind(), ErrorKind::EntityNotFound);
        // key that is not in the collection
        assert_eq!(navigate("Categories", 3, "Products(1)").kind(), ErrorKind::EntityNotFound);
        // null scalar
        assert_eq!(navigate("Products", 4, "Price").kind(), ErrorKind::EntityNotFound);
    }

    // ========== TEST: invalid_segments ==========
    #[test]
    fn test_invalid_segments() {
        // GIVEN paths that cannot be walked
        let cases = [
            ("Categories", 1, "Products/Supplier"),
            ("Products", 1, "Name/Length"),
            ("Products", 1, "Nope"),
            ("Products", 1, "Category(1)"),
            ("Products", 1, "Lines(1"),
        ];

        // THEN each is rejected as an invalid segment
        for (set, id, path) in cases {
            let err = navigate(set, id, path);
            assert_eq!(err.kind(), ErrorKind::InvalidPathSegment, "{}", path);
            assert!(err.is_client_error());
        }
    }
}

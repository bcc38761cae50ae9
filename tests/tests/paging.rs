//! Paging integration tests: server page cap, continuation tokens, inline count.

use pretty_assertions::assert_eq;
use relgraph_tests::prelude::*;

/// Follow continuation tokens until the last page, collecting each page's ids.
fn walk(shop: &Producer<MemoryStore>, base: &QueryDescriptor) -> Vec<(Vec<i64>, Option<String>)> {
    let mut pages = Vec::new();
    let mut query = base.clone();
    loop {
        let page = shop.get_entities("Products", &query).unwrap();
        let token = page.continuation.clone();
        pages.push((ids(&page.entities), token.clone()));
        match token {
            Some(token) => query = base.clone().skip_token(token),
            None => return pages,
        }
    }
}

mod server_cap {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: five_rows_pages_of_two ==========
    #[test]
    fn test_five_rows_pages_of_two() {
        // GIVEN five products and a server cap of 2
        init_logging();
        let shop = shop(2).unwrap();

        // WHEN paging without top
        let pages = walk(&shop, &QueryDescriptor::new());

        // THEN pages of 2, 2 and 1, tokens on all but the last
        assert_eq!(
            pages,
            vec![
                (vec![1, 2], Some("2".to_string())),
                (vec![3, 4], Some("4".to_string())),
                (vec![5], None),
            ]
        );
    }

    // ========== TEST: ordered_walk_covers_everything_once ==========
    #[test]
    fn test_ordered_walk_covers_everything_once() {
        let shop = shop(2).unwrap();

        let pages = walk(&shop, &QueryDescriptor::new().order_by("Name"));

        // Assam, Chai, Darjeeling, Earl Grey, Espresso
        let seen: Vec<i64> = pages.iter().flat_map(|(ids, _)| ids.clone()).collect();
        assert_eq!(seen, vec![2, 4, 5, 1, 3]);
        assert_eq!(pages[0].1.as_deref(), Some("'Chai',4"));
        assert_eq!(pages.len(), 3);
    }

    // ========== TEST: descending_with_nulls ==========
    #[test]
    fn test_descending_with_nulls() {
        // GIVEN a descending sort on a nullable property
        let shop = shop(2).unwrap();

        // WHEN walking all pages
        let pages = walk(&shop, &QueryDescriptor::new().order_by_desc("Price"));

        // THEN the null price comes last and no row is skipped or repeated
        let seen: Vec<i64> = pages.iter().flat_map(|(ids, _)| ids.clone()).collect();
        assert_eq!(seen, vec![5, 1, 2, 3, 4]);
    }

    // ========== TEST: top_and_cap ==========
    #[test]
    fn test_top_and_cap() {
        let shop = shop(2).unwrap();

        // top below the cap: the caller's own limit, no token
        let page = shop
            .get_entities("Products", &QueryDescriptor::new().top(1))
            .unwrap();
        assert_eq!(ids(&page.entities), vec![1]);
        assert_eq!(page.continuation, None);

        // top above the cap: the cap truncates and says so
        let page = shop
            .get_entities("Products", &QueryDescriptor::new().top(10).skip(1))
            .unwrap();
        assert_eq!(ids(&page.entities), vec![2, 3]);
        assert_eq!(page.continuation.as_deref(), Some("3"));
    }
}

mod empty_page {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: top_zero_skips_the_store ==========
    #[test]
    fn test_top_zero_skips_the_store() {
        // GIVEN a producer and its store's round-trip counter
        let shop = shop(2).unwrap();
        let before = shop.store().stats().round_trips();

        // WHEN asking for zero rows with an inline count
        let page = shop
            .get_entities("Products", &QueryDescriptor::new().top(0).inline_count())
            .unwrap();

        // THEN the page is empty, carries nothing, and the store was not touched
        assert_eq!(page, Page::default());
        assert_eq!(shop.store().stats().round_trips(), before);
    }
}

mod filtering {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: inline_count_ignores_window ==========
    #[test]
    fn test_inline_count_ignores_window() {
        let shop = shop(2).unwrap();
        let query = QueryDescriptor::new()
            .filter(FilterExpr::prop("Price").gt(FilterExpr::lit(3i64)))
            .top(1)
            .inline_count();

        let page = shop.get_entities("Products", &query).unwrap();

        assert_eq!(ids(&page.entities), vec![1]);
        assert_eq!(page.inline_count, Some(2));
        assert_eq!(page.continuation, None);
    }

    // ========== TEST: date_and_text_filters ==========
    #[test]
    fn test_date_and_text_filters() {
        let shop = shop(50).unwrap();
        let before_2019 = parse_datetime("2019-01-01T00:00:00").unwrap();

        let old = shop
            .get_entities(
                "Products",
                &QueryDescriptor::new().filter(FilterExpr::prop("Released").lt(FilterExpr::lit(before_2019))),
            )
            .unwrap();
        assert_eq!(ids(&old.entities), vec![3, 5]);

        let named = shop
            .get_entities(
                "Products",
                &QueryDescriptor::new()
                    .filter(FilterExpr::starts_with("Name", "E").and(FilterExpr::prop("Price").ne(FilterExpr::null())))
                    .order_by_desc("Name"),
            )
            .unwrap();
        assert_eq!(texts(&named.entities, "Name"), vec!["Espresso", "Earl Grey"]);

        let active = shop
            .get_entities(
                "Products",
                &QueryDescriptor::new().filter(FilterExpr::prop("Discontinued").not()),
            )
            .unwrap();
        assert_eq!(ids(&active.entities), vec![1, 2, 3, 4]);
    }

    // ========== TEST: select_after_token ==========
    #[test]
    fn test_select_after_token() {
        // GIVEN a projection that drops the sort key's companion Id
        let shop = shop(2).unwrap();
        let query = QueryDescriptor::new().order_by("Name").select("Name");

        // WHEN fetching the first page
        let page = shop.get_entities("Products", &query).unwrap();

        // THEN only Name survives, yet the token still carries the key
        assert_eq!(
            page.entities[0].property_names().collect::<Vec<_>>(),
            vec!["Name"]
        );
        assert_eq!(page.continuation.as_deref(), Some("'Chai',4"));
    }

    // ========== TEST: rejected_queries ==========
    #[test]
    fn test_rejected_queries() {
        let shop = shop(2).unwrap();
        let arithmetic = QueryDescriptor::new().filter(
            FilterExpr::binary(
                relgraph_query::BinaryOp::Add,
                FilterExpr::prop("Price"),
                FilterExpr::lit(1i64),
            )
            .gt(FilterExpr::lit(5i64)),
        );
        let bad_token = QueryDescriptor::new().order_by("Name").skip_token("Chai");

        let err = shop.get_entities("Products", &arithmetic).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);
        let err = shop.get_entities("Products", &bad_token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSkipToken);
        assert!(err.is_client_error());
    }
}

// List Query Test
// Filtering, sorting, offset and cursor pagination through AsyncCrud

use crudbase::{AsyncCrud, FilterOperator, ListQuery, SortDirection};
use serde_json::json;
use shared_models::User;

mod common;
use common::{setup_test_db, user};

/// 15 users named "Ana" (ana00..ana14) and 5 others.
async fn seeded() -> AsyncCrud<User> {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let users = AsyncCrud::new(db);
    for i in 0..15 {
        let mut input = user(&format!("ana{i:02}"), &format!("ana{i:02}@x.com"));
        input.full_name = Some("Ana".to_string());
        users.create(input).await.expect("Failed to seed user");
    }
    for name in ["bruno", "carla", "diego", "elisa", "fabio"] {
        let mut input = user(name, &format!("{name}@x.com"));
        input.full_name = Some(name.to_uppercase());
        input.is_active = Some(false);
        users.create(input).await.expect("Failed to seed user");
    }
    users
}

fn anas() -> ListQuery {
    ListQuery::new().filter("full_name", FilterOperator::Eq, "Ana")
}

#[tokio::test]
async fn test_limit_truncates_but_total_counts_all_matches() {
    let users = seeded().await;

    let page = users.list(&anas().offset(0).limit(10)).await.unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_count, 15);
    assert!(page.has_more);
    assert!(page.items.iter().all(|u| u.full_name.as_deref() == Some("Ana")));
}

#[tokio::test]
async fn test_offset_past_the_end_is_empty() {
    let users = seeded().await;

    let page = users.list(&anas().offset(30).limit(10)).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 15);
    assert!(!page.has_more);
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn test_default_order_is_identity() {
    let users = seeded().await;

    let page = users.list(&ListQuery::new()).await.unwrap();

    assert_eq!(page.items.len(), 20);
    let ids: Vec<i32> = page.items.iter().map(|u| u.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_sort_descending_by_username() {
    let users = seeded().await;

    let page = users
        .list(&ListQuery::new().sort_by("username", SortDirection::Desc))
        .await
        .unwrap();

    let names: Vec<&str> = page.items.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names.first(), Some(&"fabio"));
    assert!(names.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_ties_break_on_identity() {
    let users = seeded().await;

    let page = users
        .list(&ListQuery::new().sort_by("full_name", SortDirection::Asc).limit(15))
        .await
        .unwrap();

    // Every "Ana" shares the key, so identity decides their order.
    let ana_ids: Vec<i32> = page
        .items
        .iter()
        .filter(|u| u.full_name.as_deref() == Some("Ana"))
        .map(|u| u.id)
        .collect();
    assert!(ana_ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_filters_are_and_combined() {
    let users = seeded().await;

    let query = ListQuery::new()
        .filter("is_active", FilterOperator::Eq, false)
        .filter("username", FilterOperator::In, json!(["bruno", "carla", "ana00"]));
    let page = users.list(&query).await.unwrap();

    let mut names: Vec<String> = page.items.into_iter().map(|u| u.username).collect();
    names.sort();
    assert_eq!(names, vec!["bruno", "carla"]);
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn test_range_and_like_operators() {
    let users = seeded().await;

    let range = ListQuery::new()
        .filter("id", FilterOperator::Gt, 5)
        .filter("id", FilterOperator::Lte, 8);
    assert_eq!(users.count(&range).await.unwrap(), 3);

    let like = ListQuery::new().filter("username", FilterOperator::Like, "ANA1");
    let page = users.list(&like).await.unwrap();
    assert_eq!(page.total_count, 5, "ana10..ana14, matched case-insensitively");
}

#[tokio::test]
async fn test_null_equality_uses_is_null() {
    let users = seeded().await;

    let never_updated = ListQuery::new().filter("updated_at", FilterOperator::Eq, json!(null));
    assert_eq!(users.count(&never_updated).await.unwrap(), 20);

    let with_bio = ListQuery::new().filter("bio", FilterOperator::Ne, json!(null));
    assert_eq!(users.count(&with_bio).await.unwrap(), 0);
}

#[tokio::test]
async fn test_filter_by_example() {
    let users = seeded().await;

    let example = json!({ "full_name": "Ana", "is_active": true, "bio": null });
    let page = users
        .list(&ListQuery::matching(&example).unwrap().limit(5))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_count, 15);
}

#[tokio::test]
async fn test_cursor_walks_every_row_once() {
    let users = seeded().await;
    let base = anas().sort_by("username", SortDirection::Asc).limit(4);

    let mut seen = Vec::new();
    let mut query = base.clone();
    loop {
        let page = users.list(&query).await.unwrap();
        assert_eq!(page.total_count, 15);
        seen.extend(page.items.into_iter().map(|u| u.username));
        match page.next_cursor {
            Some(cursor) => query = base.clone().after(cursor),
            None => {
                assert!(!page.has_more);
                break;
            }
        }
    }

    let expected: Vec<String> = (0..15).map(|i| format!("ana{i:02}")).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_cursor_descending_by_identity() {
    let users = seeded().await;
    let base = ListQuery::new().sort_by("id", SortDirection::Desc).limit(7);

    let first = users.list(&base).await.unwrap();
    let cursor = first.next_cursor.clone().expect("more rows remain");
    let second = users.list(&base.clone().after(cursor)).await.unwrap();

    assert_eq!(first.items.first().map(|u| u.id), Some(20));
    assert_eq!(second.items.first().map(|u| u.id), Some(13));
    assert!(second.has_more);
}

#[tokio::test]
async fn test_invalid_criteria_are_rejected() {
    let users = seeded().await;

    let cases = [
        ListQuery::new().filter("password", FilterOperator::Eq, "x"),
        ListQuery::new().filter("id", FilterOperator::Eq, "not a number"),
        ListQuery::new().filter("is_active", FilterOperator::Gt, true),
        ListQuery::new().filter("id", FilterOperator::Like, "1"),
        ListQuery::new().filter("username", FilterOperator::In, "ana00"),
        ListQuery::new().sort_by("bio", SortDirection::Asc),
        ListQuery::new().limit(0),
        ListQuery::new().limit(1001),
        ListQuery::new().offset(1).after("anything"),
        ListQuery::new().after("not-a-cursor"),
    ];
    for query in cases {
        let err = users.list(&query).await.expect_err("criteria must be refused");
        assert!(err.is_invalid_filter(), "{query:?} gave {err:?}");
    }
}

#[tokio::test]
async fn test_cursor_must_match_the_sort() {
    let users = seeded().await;
    let page = users
        .list(&ListQuery::new().sort_by("username", SortDirection::Asc).limit(3))
        .await
        .unwrap();
    let cursor = page.next_cursor.unwrap();

    let err = users
        .list(&ListQuery::new().sort_by("email", SortDirection::Asc).after(cursor))
        .await
        .unwrap_err();
    assert!(err.is_invalid_filter());
}

#[tokio::test]
async fn test_cursor_walk_reaches_users_without_full_name() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let users: AsyncCrud<User> = AsyncCrud::new(db);
    for (name, full_name) in [("u1", None), ("u2", Some("Bea")), ("u3", None), ("u4", Some("Ana"))] {
        let mut input = user(name, &format!("{name}@x.com"));
        input.full_name = full_name.map(str::to_string);
        users.create(input).await.expect("Failed to seed user");
    }

    for (direction, expected) in [
        (SortDirection::Asc, ["u4", "u2", "u1", "u3"]),
        (SortDirection::Desc, ["u2", "u4", "u3", "u1"]),
    ] {
        let base = ListQuery::new().sort_by("full_name", direction).limit(1);
        let mut seen = Vec::new();
        let mut query = base.clone();
        loop {
            let page = users.list(&query).await.unwrap();
            seen.extend(page.items.into_iter().map(|u| u.username));
            match page.next_cursor {
                Some(cursor) => query = base.clone().after(cursor),
                None => break,
            }
        }
        assert_eq!(seen, expected, "{direction:?}");
    }
}

mod common;

use common::{category, category_input, new_location, new_post, services};
use portal_core::DomainError;
use portal_core::domain::{CategoryType, DeletePolicy};
use uuid::Uuid;

#[tokio::test]
async fn test_duplicate_name_and_type_is_rejected() {
    let s = services();
    let created = category(&s, "Y tế", CategoryType::Location).await;

    let result = s
        .categories
        .create(category_input("Y tế", CategoryType::Location))
        .await;
    assert!(matches!(result, Err(DomainError::Duplicate(_))));

    let fetched = s.categories.get(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_same_name_with_other_type_is_allowed() {
    let s = services();
    category(&s, "Văn hóa", CategoryType::Location).await;
    let post_category = category(&s, "Văn hóa", CategoryType::Post).await;

    assert!(
        s.categories
            .exists_by_name_and_type("Văn hóa", CategoryType::Post)
            .await
            .unwrap()
    );
    assert_eq!(post_category.category_type, CategoryType::Post);
}

#[tokio::test]
async fn test_update_into_existing_pair_is_duplicate() {
    let s = services();
    category(&s, "Y tế", CategoryType::Location).await;
    let other = category(&s, "Giáo dục", CategoryType::Location).await;

    let result = s
        .categories
        .update(other.id, category_input("Y tế", CategoryType::Location))
        .await;
    assert!(matches!(result, Err(DomainError::Duplicate(_))));

    // Renaming a category to its own name is not a collision.
    let result = s
        .categories
        .update(other.id, category_input("Giáo dục", CategoryType::Location))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_missing_category_is_not_found() {
    let s = services();
    let result = s
        .categories
        .update(Uuid::new_v4(), category_input("Y tế", CategoryType::Location))
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_restricted_delete_fails_while_referenced() {
    let s = services();
    let cat = category(&s, "Chợ", CategoryType::Location).await;
    let location = s
        .locations
        .create(new_location("Chợ Trung tâm", cat.id))
        .await
        .unwrap();
    s.locations.soft_delete(location.id).await.unwrap();

    // Inactive locations still count as references.
    let result = s.categories.delete(cat.id, DeletePolicy::Restrict).await;
    assert!(matches!(result, Err(DomainError::Conflict(_))));
    assert!(s.categories.exists(cat.id).await.unwrap());
}

#[tokio::test]
async fn test_cascade_delete_removes_dependents() {
    let s = services();
    let cat = category(&s, "Tin tức", CategoryType::Post).await;
    let post = s.posts.create(new_post("Thông báo", cat.id)).await.unwrap();

    s.categories
        .delete(cat.id, DeletePolicy::Cascade)
        .await
        .unwrap();

    assert!(!s.categories.exists(cat.id).await.unwrap());
    assert!(!s.posts.exists(post.id).await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_category_is_not_found() {
    let s = services();
    for policy in [DeletePolicy::Restrict, DeletePolicy::Cascade] {
        let result = s.categories.delete(Uuid::new_v4(), policy).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_blank_lists_all() {
    let s = services();
    category(&s, "Trường học", CategoryType::Location).await;
    category(&s, "Bệnh viện", CategoryType::Location).await;

    let hits = s.categories.search("TRƯỜNG", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Trường học");

    let all = s.categories.search("   ", None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Bệnh viện");
}

#[tokio::test]
async fn test_with_entries_only_lists_used_categories() {
    let s = services();
    let used = category(&s, "Chợ", CategoryType::Location).await;
    category(&s, "Công viên", CategoryType::Location).await;
    s.locations
        .create(new_location("Chợ Trung tâm", used.id))
        .await
        .unwrap();

    let with_entries = s
        .categories
        .with_entries(CategoryType::Location)
        .await
        .unwrap();
    assert_eq!(with_entries.len(), 1);
    assert_eq!(with_entries[0].id, used.id);

    let listed = s
        .categories
        .list(Some(CategoryType::Location))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

use crate::models::{CreateReviewRequest, UpdateReviewRequest};
use crate::services::{RecommendationService, ReviewService};
use crate::tests::common::{create_book, create_review, create_test_db, create_user, memory_cache};
use crate::utils::{ApiError, Pagination};

const PAGE: Pagination = Pagination { skip: 0, limit: 10 };

fn create_test_review_service(pool: sqlx::SqlitePool) -> ReviewService {
    let recommendations = RecommendationService::new(pool.clone(), memory_cache());
    ReviewService::new(pool, recommendations)
}

fn review(text: &str, rating: i32) -> CreateReviewRequest {
    CreateReviewRequest { review_text: text.to_string(), rating }
}

#[tokio::test]
async fn test_create_review() {
    let pool = create_test_db().await;
    let service = create_test_review_service(pool.clone());
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let user_id = create_user(&pool, "alice").await;

    let created = service
        .create_review(book_id, user_id, review("Loved the world building.", 5))
        .await
        .unwrap();
    assert_eq!(created.book_id, book_id);
    assert_eq!(created.user_id, user_id);
    assert_eq!(created.rating, 5);

    let fetched = service.get_review(created.id).await.unwrap();
    assert_eq!(fetched.review_text, "Loved the world building.");
}

#[tokio::test]
async fn test_one_review_per_user_per_book() {
    let pool = create_test_db().await;
    let service = create_test_review_service(pool.clone());
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let user_id = create_user(&pool, "alice").await;

    service
        .create_review(book_id, user_id, review("Loved the world building.", 5))
        .await
        .unwrap();

    match service
        .create_review(book_id, user_id, review("Changed my mind entirely.", 1))
        .await
    {
        Err(ApiError::AlreadyExists(msg)) => assert_eq!(msg, "You have already reviewed this book"),
        other => panic!("expected AlreadyExists, got {:?}", other.map(|r| r.id)),
    }
}

#[tokio::test]
async fn test_review_missing_book() {
    let pool = create_test_db().await;
    let service = create_test_review_service(pool.clone());
    let user_id = create_user(&pool, "alice").await;

    let result = service
        .create_review(404, user_id, review("Loved the world building.", 5))
        .await;
    assert!(matches!(result, Err(ApiError::BookNotFound { book_id: 404 })));

    let result = service.list_reviews(404, PAGE).await;
    assert!(matches!(result, Err(ApiError::BookNotFound { .. })));
}

#[tokio::test]
async fn test_list_reviews_newest_first() {
    let pool = create_test_db().await;
    let service = create_test_review_service(pool.clone());
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let other_book = create_book(&pool, "Emma", "Romance").await;

    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let first = create_review(&pool, book_id, alice, 4).await;
    let second = create_review(&pool, book_id, bob, 2).await;
    create_review(&pool, other_book, alice, 3).await;

    let reviews = service.list_reviews(book_id, PAGE).await.unwrap();
    let ids: Vec<i64> = reviews.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first]);

    let latest = service.latest_reviews(book_id, 1).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, second);
}

#[tokio::test]
async fn test_only_author_may_update_or_delete() {
    let pool = create_test_db().await;
    let service = create_test_review_service(pool.clone());
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let review_id = create_review(&pool, book_id, alice, 4).await;

    let update = UpdateReviewRequest { rating: Some(1), ..Default::default() };
    match service.update_review(review_id, bob, update).await {
        Err(ApiError::Forbidden(msg)) => assert_eq!(msg, "You can only update your own reviews"),
        other => panic!("expected Forbidden, got {:?}", other.map(|r| r.id)),
    }

    match service.delete_review(review_id, bob).await {
        Err(ApiError::Forbidden(msg)) => assert_eq!(msg, "You can only delete your own reviews"),
        other => panic!("expected Forbidden, got {:?}", other),
    }

    let update = UpdateReviewRequest { rating: Some(2), ..Default::default() };
    let updated = service.update_review(review_id, alice, update).await.unwrap();
    assert_eq!(updated.rating, 2);
    assert_eq!(updated.review_text, "A perfectly fine read.");

    service.delete_review(review_id, alice).await.unwrap();
    let result = service.get_review(review_id).await;
    assert!(matches!(result, Err(ApiError::ReviewNotFound { .. })));
}

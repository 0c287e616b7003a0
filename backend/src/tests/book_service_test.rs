use crate::models::{BookFilter, UpdateBookRequest};
use crate::services::{BookService, RecommendationService};
use crate::tests::common::{
    book_request, create_book, create_review, create_test_db, create_user, memory_cache,
};
use crate::utils::{ApiError, Pagination};

const PAGE: Pagination = Pagination { skip: 0, limit: 10 };

fn create_test_book_service(pool: sqlx::SqlitePool) -> BookService {
    let recommendations = RecommendationService::new(pool.clone(), memory_cache());
    BookService::new(pool, recommendations)
}

#[tokio::test]
async fn test_create_and_get_book() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool);

    let created = service
        .create_book(book_request("Dune", "Frank Herbert", "Science Fiction"))
        .await
        .unwrap();
    assert_eq!(created.title, "Dune");
    assert_eq!(created.year_published, 1965);
    assert!(created.summary.is_none());

    let fetched = service.get_book(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.author, "Frank Herbert");
}

#[tokio::test]
async fn test_get_missing_book() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool);

    let result = service.get_book(42).await;
    assert!(matches!(result, Err(ApiError::BookNotFound { book_id: 42 })));
}

#[tokio::test]
async fn test_list_books_newest_first_with_pagination() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool.clone());

    let first = create_book(&pool, "First", "Fantasy").await;
    let second = create_book(&pool, "Second", "Fantasy").await;
    let third = create_book(&pool, "Third", "Fantasy").await;

    let books = service.list_books(&BookFilter::default(), PAGE).await.unwrap();
    let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![third, second, first]);

    let page = Pagination { skip: 1, limit: 1 };
    let books = service.list_books(&BookFilter::default(), page).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, second);
}

#[tokio::test]
async fn test_list_books_filters_are_case_insensitive() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool.clone());

    service
        .create_book(book_request("Dune", "Frank Herbert", "Science Fiction"))
        .await
        .unwrap();
    service
        .create_book(book_request("Emma", "Jane Austen", "Romance"))
        .await
        .unwrap();
    service
        .create_book(book_request("Hyperion", "Dan Simmons", "science fiction"))
        .await
        .unwrap();

    let filter = BookFilter { genre: Some("SCIENCE".to_string()), ..Default::default() };
    assert_eq!(service.list_books(&filter, PAGE).await.unwrap().len(), 2);

    let filter = BookFilter {
        genre: Some("fiction".to_string()),
        author: Some("herbert".to_string()),
        ..Default::default()
    };
    let books = service.list_books(&filter, PAGE).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");

    let filter = BookFilter { title: Some("%".to_string()), ..Default::default() };
    assert!(service.list_books(&filter, PAGE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_books_filters_match_non_ascii_text() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool.clone());

    create_book(&pool, "Émile, ou De l'éducation", "Littérature").await;
    create_book(&pool, "Dune", "Science Fiction").await;

    let filter = BookFilter { title: Some("Émile".to_string()), ..Default::default() };
    let books = service.list_books(&filter, PAGE).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].genre, "Littérature");

    // ASCII letters still fold around the accented ones
    let filter = BookFilter { genre: Some("LITTéRATURE".to_string()), ..Default::default() };
    assert_eq!(service.list_books(&filter, PAGE).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_partial_update() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool);

    let book = service
        .create_book(book_request("Dune", "Frank Herbert", "Science Fiction"))
        .await
        .unwrap();

    let update = UpdateBookRequest {
        genre: Some("Classic".to_string()),
        summary: Some("Spice and sand.".to_string()),
        ..Default::default()
    };
    let updated = service.update_book(book.id, update).await.unwrap();
    assert_eq!(updated.title, "Dune");
    assert_eq!(updated.genre, "Classic");
    assert_eq!(updated.summary.as_deref(), Some("Spice and sand."));

    let result = service.update_book(999, UpdateBookRequest::default()).await;
    assert!(matches!(result, Err(ApiError::BookNotFound { .. })));
}

#[tokio::test]
async fn test_delete_cascades_to_reviews() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool.clone());

    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let user_id = create_user(&pool, "alice").await;
    create_review(&pool, book_id, user_id, 5).await;

    service.delete_book(book_id).await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE book_id = ?")
        .bind(book_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    let result = service.delete_book(book_id).await;
    assert!(matches!(result, Err(ApiError::BookNotFound { .. })));
}

#[tokio::test]
async fn test_book_summary_aggregates_ratings() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool.clone());

    let book_id = create_book(&pool, "Dune", "Science Fiction").await;

    let summary = service.get_book_summary(book_id).await.unwrap();
    assert_eq!(summary.total_reviews, 0);
    assert_eq!(summary.average_rating, 0.0);

    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    create_review(&pool, book_id, alice, 4).await;
    create_review(&pool, book_id, bob, 5).await;

    let summary = service.get_book_summary(book_id).await.unwrap();
    assert_eq!(summary.total_reviews, 2);
    assert!((summary.average_rating - 4.5).abs() < f64::EPSILON);

    let result = service.get_book_summary(999).await;
    assert!(matches!(result, Err(ApiError::BookNotFound { .. })));
}

#[tokio::test]
async fn test_set_summary() {
    let pool = create_test_db().await;
    let service = create_test_book_service(pool.clone());
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;

    let book = service.set_summary(book_id, "A desert epic.").await.unwrap();
    assert_eq!(book.summary.as_deref(), Some("A desert epic."));
}

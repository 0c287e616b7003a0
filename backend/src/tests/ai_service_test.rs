use crate::models::GenerateSummaryRequest;
use crate::tests::common::{StubLLM, create_book, create_review, create_test_state, create_user};
use crate::utils::ApiError;

const CONTENT: &str = "Paul Atreides moves with his family to the desert planet Arrakis, \
the only source of the spice melange.";

fn summary_request(book_id: i64) -> GenerateSummaryRequest {
    GenerateSummaryRequest { book_id, content: CONTENT.to_string() }
}

#[tokio::test]
async fn test_generate_summary_stores_result() {
    let llm = StubLLM::replying("A young heir survives betrayal on a desert world.");
    let (state, pool) = create_test_state(llm.clone()).await;
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;

    let response = state
        .ai_service
        .generate_summary(summary_request(book_id))
        .await
        .unwrap();
    assert_eq!(response.summary, "A young heir survives betrayal on a desert world.");
    assert_eq!(response.word_count, 9);

    let book = state.book_service.get_book(book_id).await.unwrap();
    assert_eq!(book.summary.as_deref(), Some(response.summary.as_str()));

    let prompt = llm.last_user_prompt().unwrap();
    assert!(prompt.contains("\"Dune\""));
    assert!(prompt.contains("desert planet Arrakis"));
}

#[tokio::test]
async fn test_generate_summary_checks_book_before_calling_llm() {
    let llm = StubLLM::replying("unused");
    let (state, _pool) = create_test_state(llm.clone()).await;

    let result = state.ai_service.generate_summary(summary_request(77)).await;
    assert!(matches!(result, Err(ApiError::BookNotFound { book_id: 77 })));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_generate_summary_provider_errors() {
    let (state, pool) = create_test_state(StubLLM::unavailable()).await;
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let result = state.ai_service.generate_summary(summary_request(book_id)).await;
    assert!(matches!(result, Err(ApiError::AiUnavailable)));

    let (state, pool) = create_test_state(StubLLM::failing()).await;
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let result = state.ai_service.generate_summary(summary_request(book_id)).await;
    assert!(matches!(result, Err(ApiError::AiProviderFailed(_))));

    let book = state.book_service.get_book(book_id).await.unwrap();
    assert!(book.summary.is_none());

    let (state, pool) = create_test_state(StubLLM::rate_limited()).await;
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;
    let result = state.ai_service.generate_summary(summary_request(book_id)).await;
    assert!(matches!(result, Err(ApiError::AiRateLimited(_))));
}

#[tokio::test]
async fn test_review_digest() {
    let llm = StubLLM::replying("Readers admire the scope but find the pacing uneven.");
    let (state, pool) = create_test_state(llm.clone()).await;
    let book_id = create_book(&pool, "Dune", "Science Fiction").await;

    let result = state.ai_service.review_digest(book_id).await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    assert_eq!(llm.calls(), 0);

    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    create_review(&pool, book_id, alice, 5).await;
    create_review(&pool, book_id, bob, 3).await;

    let digest = state.ai_service.review_digest(book_id).await.unwrap();
    assert_eq!(digest.book_id, book_id);
    assert_eq!(digest.review_count, 2);
    assert_eq!(digest.word_count, 9);
    assert!(llm.last_user_prompt().unwrap().contains("[3/5]"));

    let result = state.ai_service.review_digest(999).await;
    assert!(matches!(result, Err(ApiError::BookNotFound { .. })));
}

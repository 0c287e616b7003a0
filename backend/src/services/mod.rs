pub mod ai_service;
pub mod auth_service;
pub mod book_service;
pub mod cache_service;
pub mod llm;
pub mod recommendation_service;
pub mod review_service;

pub use ai_service::AiService;
pub use auth_service::AuthService;
pub use book_service::BookService;
pub use cache_service::{CacheBackend, CacheService, MemoryCache, NoOpCache, RedisCache};
pub use recommendation_service::RecommendationService;
pub use review_service::ReviewService;

mod common;

mod ai_service_test;
mod book_service_test;
mod review_service_test;

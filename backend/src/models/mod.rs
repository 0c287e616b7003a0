pub mod book;
pub mod recommendation;
pub mod review;
pub mod summary;
pub mod user;

pub use book::*;
pub use recommendation::*;
pub use review::*;
pub use summary::*;
pub use user::*;

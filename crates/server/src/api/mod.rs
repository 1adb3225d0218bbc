pub mod convert;
pub mod files;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::ErrorResponse;
pub use routes::create_router;

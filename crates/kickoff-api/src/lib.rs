//! JSON REST API for the Kickoff prediction board.
//!
//! Exposes an axum [`Router`] backed by any [`kickoff_core::store::BoardStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kickoff_api::api_router(store.clone()))
//! ```

pub mod blog_posts;
pub mod error;
pub mod json;
pub mod predictions;
pub mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use kickoff_core::store::BoardStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: BoardStore + 'static,
{
  Router::new()
    // Predictions
    .route(
      "/predictions",
      get(predictions::list::<S>).post(predictions::submit::<S>),
    )
    .route("/predictions/batch", post(predictions::submit_batch::<S>))
    .route("/predictions/current", get(predictions::current::<S>))
    // Blog
    .route("/blog-posts", post(blog_posts::create::<S>))
    .with_state(store)
}

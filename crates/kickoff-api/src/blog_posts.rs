//! Handler for `POST /blog-posts`. Posts are append-only.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use kickoff_core::{blog::NewBlogPost, store::BoardStore};
use serde_json::json;

use crate::{
  error::ApiError,
  json::BlogPostJson,
  validate::{BlogPostBody, validated},
};

/// `POST /blog-posts`, body: `{"title","date","author","text"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<BlogPostBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore,
{
  let Json(body) = body?;
  let input = NewBlogPost::from(validated(body)?);

  let post = store
    .create_blog_post(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(id = post.id, author = %post.author, "blog post created");
  Ok((
    StatusCode::CREATED,
    Json(json!({ "blogPost": BlogPostJson::from(post) })),
  ))
}

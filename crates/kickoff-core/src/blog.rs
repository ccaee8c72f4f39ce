//! Blog posts: short append-only write-ups published alongside predictions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A validated blog post submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlogPost {
  pub title:  String,
  pub date:   NaiveDate,
  pub author: String,
  pub text:   String,
}

/// A persisted blog post. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
  pub id:         i64,
  pub title:      String,
  pub date:       NaiveDate,
  pub author:     String,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

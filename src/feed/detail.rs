use super::item::{format_date_pt_br, ItemMapper};
use crate::api::{ContentClient, RemotePost};

/// A single post resolved by slug, ready for the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub id: u64,
    pub slug: String,
    /// Title markup as sent by the server.
    pub title: String,
    pub content_html: String,
    pub published_at: String,
    pub category: String,
    /// Featured image, only when the post has one.
    pub image_url: Option<String>,
    pub link: Option<String>,
}

impl PostDetail {
    pub fn from_post(post: &RemotePost, mapper: &ItemMapper) -> Self {
        Self {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.rendered.clone(),
            content_html: post.content.rendered.clone(),
            published_at: format_date_pt_br(&post.date),
            category: mapper.category(post),
            image_url: post.featured_image().map(str::to_string),
            link: post.link.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading {
        slug: String,
    },
    Loaded(PostDetail),
    /// The server answered but no post has this slug.
    NotFound {
        slug: String,
    },
    Failed {
        slug: String,
        error: String,
    },
}

impl DetailState {
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { slug } | Self::NotFound { slug } | Self::Failed { slug, .. } => {
                Some(slug)
            }
            Self::Loaded(detail) => Some(&detail.slug),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Resolve one post by slug. Errors become [`DetailState::Failed`].
pub async fn load_detail(client: &ContentClient, slug: &str, mapper: &ItemMapper) -> DetailState {
    let slug = slug.trim();
    if slug.is_empty() {
        return DetailState::NotFound {
            slug: String::new(),
        };
    }

    match client.fetch_post_by_slug(slug).await {
        Ok(Some(post)) => DetailState::Loaded(PostDetail::from_post(&post, mapper)),
        Ok(None) => {
            tracing::info!(slug, "No post with this slug");
            DetailState::NotFound {
                slug: slug.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!(slug, error = %e, "Failed to load post");
            DetailState::Failed {
                slug: slug.to_string(),
                error: e.to_string(),
            }
        }
    }
}

use serde::Deserialize;

/// A post object as returned by the content API (`/wp/v2/posts`).
///
/// Only the fields the reader consumes are modelled; everything else in the
/// payload is ignored by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePost {
    pub id: u64,
    /// Publish timestamp. The API sends site-local time without an offset.
    pub date: String,
    pub slug: String,
    #[serde(default)]
    pub link: Option<String>,
    pub title: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<Embedded>,
}

/// The `{ "rendered": "<p>...</p>" }` wrapper used for rich-text fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// Related data inlined by the `_embed` query flag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Embedded {
    #[serde(default, rename = "wp:featuredmedia")]
    pub featured_media: Vec<FeaturedMedia>,
    /// Term groups, one per taxonomy (categories first, then tags).
    #[serde(default, rename = "wp:term")]
    pub terms: Vec<Vec<Term>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedMedia {
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
}

impl RemotePost {
    /// Source URL of the leading featured media, if any.
    pub fn featured_image(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .featured_media
            .first()?
            .source_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// The leading term of the leading taxonomy group.
    pub fn leading_term(&self) -> Option<&Term> {
        self.embedded.as_ref()?.terms.first()?.first()
    }
}

/// One page of posts plus the pagination metadata sent in response headers.
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub posts: Vec<RemotePost>,
    /// `X-WP-TotalPages`, when the server sent a parseable value.
    pub total_pages: Option<u32>,
    /// `X-WP-Total`, when the server sent a parseable value.
    pub total_posts: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_post() {
        let json = r#"{
            "id": 42,
            "date": "2024-05-10T14:30:00",
            "slug": "nova-diretoria",
            "link": "https://example.com/nova-diretoria/",
            "title": {"rendered": "Nova &#8211; Diretoria"},
            "excerpt": {"rendered": "<p>Resumo</p>"},
            "content": {"rendered": "<p>Corpo</p>", "protected": false},
            "_embedded": {
                "wp:featuredmedia": [{"source_url": "https://example.com/a.jpg"}],
                "wp:term": [[{"id": 7, "name": "Institucional"}], [{"id": 9, "name": "tag"}]]
            }
        }"#;

        let post: RemotePost = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, 42);
        assert_eq!(post.slug, "nova-diretoria");
        assert_eq!(post.featured_image(), Some("https://example.com/a.jpg"));
        let term = post.leading_term().unwrap();
        assert_eq!(term.id, Some(7));
        assert_eq!(term.name, "Institucional");
    }

    #[test]
    fn test_deserialize_without_embedded() {
        let json = r#"{
            "id": 1,
            "date": "2024-01-01T00:00:00",
            "slug": "a",
            "title": {"rendered": "A"}
        }"#;

        let post: RemotePost = serde_json::from_str(json).unwrap();
        assert!(post.embedded.is_none());
        assert!(post.featured_image().is_none());
        assert!(post.leading_term().is_none());
        assert_eq!(post.excerpt.rendered, "");
    }

    #[test]
    fn test_empty_embedded_arrays() {
        let json = r#"{
            "id": 1,
            "date": "2024-01-01T00:00:00",
            "slug": "a",
            "title": {"rendered": "A"},
            "_embedded": {"wp:featuredmedia": [{}], "wp:term": [[]]}
        }"#;

        let post: RemotePost = serde_json::from_str(json).unwrap();
        assert!(post.featured_image().is_none());
        assert!(post.leading_term().is_none());
    }
}

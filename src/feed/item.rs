use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::api::RemotePost;
use crate::util::{html_to_plain, truncate_chars, ELLIPSIS};

/// Default excerpt budget, in characters.
pub const DEFAULT_EXCERPT_MAX_CHARS: usize = 100;
/// Image shown when a post has no featured media.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";
/// Category label used when a post carries no taxonomy term.
pub const DEFAULT_FALLBACK_CATEGORY: &str = "Geral";
/// Path prefix of the in-app detail route.
pub const DETAIL_ROUTE_PREFIX: &str = "/publicacao/";

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// A post normalized for display in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub id: u64,
    /// Title markup as sent by the server. Converted to text at render time.
    pub title: String,
    pub excerpt: String,
    pub image_url: String,
    pub published_at: String,
    pub category: String,
    pub category_id: Option<u64>,
    pub detail_url: String,
    pub link: Option<String>,
}

impl DisplayItem {
    /// Slug of the post, taken from the detail route.
    pub fn slug(&self) -> &str {
        self.detail_url
            .strip_prefix(DETAIL_ROUTE_PREFIX)
            .unwrap_or(&self.detail_url)
    }
}

/// Maps [`RemotePost`]s into [`DisplayItem`]s.
///
/// Carries the excerpt budget and the fallbacks for missing media and
/// taxonomy, so the same mapping is applied to every page.
#[derive(Debug, Clone)]
pub struct ItemMapper {
    excerpt_max_chars: usize,
    placeholder_image: String,
    fallback_category: String,
}

impl Default for ItemMapper {
    fn default() -> Self {
        Self {
            excerpt_max_chars: DEFAULT_EXCERPT_MAX_CHARS,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
        }
    }
}

impl ItemMapper {
    pub fn new(
        excerpt_max_chars: usize,
        placeholder_image: impl Into<String>,
        fallback_category: impl Into<String>,
    ) -> Self {
        Self {
            excerpt_max_chars,
            placeholder_image: placeholder_image.into(),
            fallback_category: fallback_category.into(),
        }
    }

    pub fn excerpt_max_chars(&self) -> usize {
        self.excerpt_max_chars
    }

    pub fn placeholder_image(&self) -> &str {
        &self.placeholder_image
    }

    pub fn fallback_category(&self) -> &str {
        &self.fallback_category
    }

    pub fn map(&self, post: &RemotePost) -> DisplayItem {
        let term = post.leading_term();
        DisplayItem {
            id: post.id,
            title: post.title.rendered.clone(),
            excerpt: self.excerpt(&post.excerpt.rendered),
            image_url: post
                .featured_image()
                .unwrap_or(&self.placeholder_image)
                .to_string(),
            published_at: format_date_pt_br(&post.date),
            category: self.category(post),
            category_id: term.and_then(|t| t.id),
            detail_url: detail_url(&post.slug),
            link: post.link.clone(),
        }
    }

    pub fn map_all(&self, posts: &[RemotePost]) -> Vec<DisplayItem> {
        posts.iter().map(|p| self.map(p)).collect()
    }

    /// Plain-text excerpt cut to the character budget.
    ///
    /// The ellipsis marker is appended whether or not anything was cut.
    pub fn excerpt(&self, html: &str) -> String {
        let plain = html_to_plain(html);
        let mut out = truncate_chars(&plain, self.excerpt_max_chars).to_string();
        out.push_str(ELLIPSIS);
        out
    }

    /// Name of the leading taxonomy term, or the fallback label.
    pub fn category(&self, post: &RemotePost) -> String {
        post.leading_term()
            .map(|t| html_to_plain(&t.name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.fallback_category.clone())
    }
}

pub fn detail_url(slug: &str) -> String {
    format!("{}{}", DETAIL_ROUTE_PREFIX, slug)
}

/// Format a publish timestamp as a pt-BR long date ("10 de maio de 2024").
///
/// Accepts the offset-less form the API sends, RFC 3339 and bare dates.
/// Anything else is returned unchanged.
pub fn format_date_pt_br(raw: &str) -> String {
    let trimmed = raw.trim();
    let date = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"));

    match date {
        Ok(d) => format!(
            "{} de {} de {}",
            d.day(),
            MONTHS_PT_BR[d.month0() as usize],
            d.year()
        ),
        Err(_) => {
            tracing::debug!(raw, "Unparseable publish date, showing raw value");
            raw.to_string()
        }
    }
}

use thiserror::Error;
use url::Url;

/// Why a configured API base URL was refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    /// Endpoint paths are joined onto the base, so it cannot carry its own
    /// query string or fragment.
    #[error("Base URL must not contain a query or fragment")]
    QueryOrFragment,
    #[error("Base URL must not contain credentials")]
    Credentials,
}

/// Parse the content API base URL.
///
/// The URL must be `http` or `https` with a host, and free of credentials,
/// query and fragment. The path always ends in `/` on return so that
/// `posts` joins as `<base>/posts`. Local and LAN hosts are accepted, which
/// covers a WordPress running on a development machine. Plain `http` to any
/// other host is allowed with a warning.
///
/// # Examples
///
/// ```
/// use crfnews::util::validate_url;
///
/// let url = validate_url("https://wordpress.crf-al.org.br/wp-json/wp/v2").unwrap();
/// assert_eq!(url.as_str(), "https://wordpress.crf-al.org.br/wp-json/wp/v2/");
///
/// assert!(validate_url("http://localhost:8080/wp-json/wp/v2/").is_ok());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_owned(),
        _ => return Err(UrlValidationError::MissingHost),
    };
    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::QueryOrFragment);
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(UrlValidationError::Credentials);
    }

    if url.scheme() == "http" && !is_local_host(&host) {
        tracing::warn!(host = %host, "Content API is reached over plain http");
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Validate a post link before handing it to the system browser.
///
/// Only plain `http`/`https` URLs are opened; anything else (including
/// `javascript:`, `file:` and strings with embedded whitespace or control
/// characters) is refused with a user-facing message.
pub fn validate_url_for_open(url_str: &str) -> Result<(), String> {
    if url_str.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err("Refusing to open link with invalid characters".to_string());
    }
    let url = Url::parse(url_str).map_err(|e| format!("Invalid link: {}", e))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(format!("Refusing to open {} link", scheme)),
    }
    if url.host_str().is_none() {
        return Err("Refusing to open link without host".to_string());
    }
    Ok(())
}

fn is_local_host(host: &str) -> bool {
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    match bare.parse::<std::net::IpAddr>() {
        Ok(std::net::IpAddr::V4(ip)) => ip.is_loopback() || ip.is_private(),
        Ok(std::net::IpAddr::V6(ip)) => ip.is_loopback(),
        Err(_) => false,
    }
}

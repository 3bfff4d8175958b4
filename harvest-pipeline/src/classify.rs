//! URL → [`Category`] classification. Pure and total: every input gets a
//! category, unparseable ones included.

use harvest_common::Category;
use url::Url;

/// Hostnames that only ever serve the social network.
const SOCIAL_SHORT_HOSTS: &[&str] = &["fb.com", "fb.watch", "fb.me"];

pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf",
];

/// Cloud storage hosts whose share links rarely end in the file extension.
const DRIVE_HOSTS: &[&str] = &[
    "drive.google.com",
    "docs.google.com",
    "dropbox.com",
    "onedrive.live.com",
    "1drv.ms",
    "sharepoint.com",
];

/// Assign the retrieval strategy for `url`.
///
/// First match wins: social network marker, then document signals, then
/// [`Category::GenericWeb`].
///
/// ```
/// use harvest_common::Category;
/// use harvest_pipeline::classify;
///
/// assert_eq!(classify("https://m.facebook.com/story.php?id=1"), Category::Social);
/// assert_eq!(classify("https://example.com/report.pdf?v=2"), Category::Document);
/// assert_eq!(classify("https://example.com/news/1"), Category::GenericWeb);
/// ```
pub fn classify(url: &str) -> Category {
    match Url::parse(url.trim()) {
        Ok(parsed) => classify_parsed(&parsed),
        Err(_) => classify_loose(url),
    }
}

fn classify_parsed(url: &Url) -> Category {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let path = url.path().to_ascii_lowercase();

    if is_social_host(&host) || path.contains("facebook") {
        return Category::Social;
    }

    let query_names_document = url.query_pairs().any(|(_, value)| {
        let value = value.to_ascii_lowercase();
        DOCUMENT_EXTENSIONS
            .iter()
            .any(|ext| value == *ext || has_extension(&value, ext))
    });
    if ends_with_document_extension(&path)
        || query_names_document
        || (is_drive_host(&host) && has_extension_token(url.as_str()))
    {
        return Category::Document;
    }

    Category::GenericWeb
}

/// Best effort for strings the URL parser rejects (missing scheme and the like).
fn classify_loose(raw: &str) -> Category {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.contains("facebook") {
        return Category::Social;
    }
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    if ends_with_document_extension(path) {
        return Category::Document;
    }
    Category::GenericWeb
}

fn is_social_host(host: &str) -> bool {
    host.contains("facebook")
        || SOCIAL_SHORT_HOSTS
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{h}")))
}

fn is_drive_host(host: &str) -> bool {
    DRIVE_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{h}")))
}

fn ends_with_document_extension(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    DOCUMENT_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}

fn has_extension(value: &str, ext: &str) -> bool {
    value
        .rsplit_once('.')
        .is_some_and(|(stem, suffix)| !stem.is_empty() && suffix == ext)
}

/// An extension appearing as a standalone alphanumeric token anywhere in the URL.
fn has_extension_token(url: &str) -> bool {
    url.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| DOCUMENT_EXTENSIONS.contains(&token))
}

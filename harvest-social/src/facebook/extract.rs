use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::facebook::types::FacebookPost;

pub const DATE_LABEL: &str = "Ngày đăng";
pub const AUTHOR_LABEL: &str = "Tác giả";
pub const PERMALINK_LABEL: &str = "Link bài viết";
pub const LINKS_HEADER: &str = "Các liên kết trong bài:";
pub const IMAGES_HEADER: &str = "Link ảnh:";

static URL_IN_TEXT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]{}]+"#).ok());

/// Render one post into text.
///
/// Layout: post text, metadata lines, then the optional link and image
/// manifests. A manifest with no entries is left out entirely.
pub fn render_post(post: &FacebookPost, requested_url: &str) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(body) = post.body() {
        sections.push(body.to_string());
    }

    let mut meta = Vec::new();
    if let Some(date) = post.published().and_then(format_post_date) {
        meta.push(format!("{DATE_LABEL}: {date}"));
    }
    if let Some(author) = post.author() {
        meta.push(format!("{AUTHOR_LABEL}: {author}"));
    }
    meta.push(format!(
        "{PERMALINK_LABEL}: {}",
        post.permalink().unwrap_or(requested_url)
    ));
    sections.push(meta.join("\n"));

    if let Some(manifest) = numbered(LINKS_HEADER, &collect_links(post)) {
        sections.push(manifest);
    }
    if let Some(manifest) = numbered(IMAGES_HEADER, &collect_images(post)) {
        sections.push(manifest);
    }

    sections.join("\n\n")
}

fn numbered(header: &str, items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let mut out = String::from(header);
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, item));
    }
    Some(out)
}

/// RFC 3339 and `YYYY-MM-DD HH:MM:SS` strings and unix timestamps (seconds
/// or milliseconds) become `dd/mm/YYYY HH:MM`; anything else prints as-is.
pub fn format_post_date(raw: &Value) -> Option<String> {
    const OUT: &str = "%d/%m/%Y %H:%M";
    match raw {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.format(OUT).to_string());
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.format(OUT).to_string());
            }
            Some(s.to_string())
        }
        Value::Number(n) => {
            let n = n.as_i64()?;
            let secs = if n > 100_000_000_000 { n / 1000 } else { n };
            DateTime::from_timestamp(secs, 0).map(|dt| dt.format(OUT).to_string())
        }
        _ => None,
    }
}

/// Alternate post URLs, explicit link fields and URLs found in the text.
///
/// The permalink is already printed with the metadata and is left out.
pub fn collect_links(post: &FacebookPost) -> Vec<String> {
    let mut links = Vec::new();
    for alt in [&post.url, &post.post_url, &post.top_level_url, &post.facebook_url] {
        if let Some(u) = alt.as_deref() {
            push_url(&mut links, u);
        }
    }
    for field in [&post.link, &post.links, &post.external_url] {
        if let Some(v) = field {
            urls_in_value(v, &mut links);
        }
    }
    if let (Some(body), Some(re)) = (post.body(), URL_IN_TEXT.as_ref()) {
        for m in re.find_iter(body) {
            push_url(&mut links, m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']));
        }
    }
    if let Some(permalink) = post.permalink() {
        links.retain(|l| l != permalink);
    }
    links
}

/// Thumbnails (single or list), media thumbnails and generic image fields.
pub fn collect_images(post: &FacebookPost) -> Vec<String> {
    let mut images = Vec::new();
    for field in [&post.thumbnail, &post.thumbnails] {
        if let Some(v) = field {
            urls_in_value(v, &mut images);
        }
    }
    for media in post.media.iter().flatten() {
        if let Some(v) = &media.thumbnail {
            urls_in_value(v, &mut images);
        }
        if let Some(uri) = media.photo_image.as_ref().and_then(|p| p.uri.as_deref()) {
            push_url(&mut images, uri);
        }
    }
    for field in [&post.image, &post.image_url, &post.images] {
        if let Some(v) = field {
            urls_in_value(v, &mut images);
        }
    }
    images
}

/// Pull URLs out of a string, a list, or an object carrying `url`/`uri`/`src`.
fn urls_in_value(v: &Value, out: &mut Vec<String>) {
    match v {
        Value::String(s) => push_url(out, s),
        Value::Array(items) => items.iter().for_each(|item| urls_in_value(item, out)),
        Value::Object(map) => {
            for key in ["url", "uri", "src", "href"] {
                if let Some(Value::String(s)) = map.get(key) {
                    push_url(out, s);
                    return;
                }
            }
        }
        _ => {}
    }
}

fn push_url(out: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if !(candidate.starts_with("http://") || candidate.starts_with("https://")) {
        return;
    }
    if !out.iter().any(|seen| seen == candidate) {
        out.push(candidate.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(v: Value) -> FacebookPost {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn renders_text_then_metadata_then_manifests() {
        let p = post(json!({
            "text": "Thông báo mới https://example.vn/tin-tuc.",
            "postDate": "2024-03-05T08:30:00+07:00",
            "user": { "name": "Trang tin" },
            "url": "https://www.facebook.com/page/posts/1",
            "thumbnail": "https://scontent.example/a.jpg",
            "media": [{ "thumbnail": "https://scontent.example/b.jpg" }]
        }));
        let out = render_post(&p, "https://facebook.com/x");

        let text_at = out.find("Thông báo mới").unwrap();
        let date_at = out.find("Ngày đăng: 05/03/2024 08:30").unwrap();
        let author_at = out.find("Tác giả: Trang tin").unwrap();
        let link_at = out
            .find("Link bài viết: https://www.facebook.com/page/posts/1")
            .unwrap();
        assert!(text_at < date_at && date_at < author_at && author_at < link_at);

        assert!(out.contains(
            "Các liên kết trong bài:\n1. https://example.vn/tin-tuc\n\nLink ảnh:"
        ));
        assert!(out.ends_with(
            "Link ảnh:\n1. https://scontent.example/a.jpg\n2. https://scontent.example/b.jpg"
        ));
    }

    #[test]
    fn permalink_is_not_repeated_among_alternate_links() {
        let p = post(json!({
            "text": "Xem lại bài https://www.facebook.com/page/posts/1",
            "url": "https://www.facebook.com/page/posts/1",
            "postUrl": "https://m.facebook.com/page/posts/1",
            "facebookUrl": "https://www.facebook.com/page/posts/1"
        }));
        assert_eq!(collect_links(&p), vec!["https://m.facebook.com/page/posts/1"]);

        let only_permalink = post(json!({ "url": "https://www.facebook.com/page/posts/2" }));
        let out = render_post(&only_permalink, "https://facebook.com/x");
        assert!(!out.contains(LINKS_HEADER));
    }

    #[test]
    fn empty_manifests_are_omitted() {
        let p = post(json!({ "text": "chỉ có chữ" }));
        let out = render_post(&p, "https://m.facebook.com/story.php?id=1");
        assert!(!out.contains(LINKS_HEADER));
        assert!(!out.contains(IMAGES_HEADER));
        assert!(out.ends_with("Link bài viết: https://m.facebook.com/story.php?id=1"));
    }

    #[test]
    fn duplicate_images_across_fields_collapse() {
        let p = post(json!({
            "thumbnail": "https://cdn.example/1.jpg",
            "thumbnails": ["https://cdn.example/1.jpg", { "url": "https://cdn.example/2.jpg" }],
            "image": "https://cdn.example/2.jpg",
            "imageUrl": "not a url"
        }));
        assert_eq!(
            collect_images(&p),
            vec!["https://cdn.example/1.jpg", "https://cdn.example/2.jpg"]
        );
    }

    #[test]
    fn dates_fall_back_to_raw_text() {
        assert_eq!(
            format_post_date(&json!("2023-12-31T23:05:00Z")).as_deref(),
            Some("31/12/2023 23:05")
        );
        assert_eq!(
            format_post_date(&json!(1_704_067_200)).as_deref(),
            Some("01/01/2024 00:00")
        );
        assert_eq!(
            format_post_date(&json!(1_704_067_200_000_i64)).as_deref(),
            Some("01/01/2024 00:00")
        );
        assert_eq!(format_post_date(&json!("3 giờ trước")).as_deref(), Some("3 giờ trước"));
        assert_eq!(format_post_date(&json!(null)), None);
    }
}

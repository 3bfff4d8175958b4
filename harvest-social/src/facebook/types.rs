use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dataset item from the post-scraping actor.
///
/// The actor's output shape drifts between versions, so every field is
/// optional and the polymorphic ones (dates, link and image collections)
/// stay as raw JSON until rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacebookPost {
    pub text: Option<String>,
    pub post_text: Option<String>,
    pub message: Option<String>,

    pub post_date: Option<Value>,
    pub time: Option<Value>,
    pub date: Option<Value>,
    pub timestamp: Option<Value>,

    pub user: Option<PostUser>,
    pub page_name: Option<String>,
    pub author_name: Option<String>,

    pub url: Option<String>,
    pub post_url: Option<String>,
    pub top_level_url: Option<String>,
    pub facebook_url: Option<String>,

    pub link: Option<Value>,
    pub links: Option<Value>,
    pub external_url: Option<Value>,

    pub thumbnail: Option<Value>,
    pub thumbnails: Option<Value>,
    pub media: Option<Vec<PostMedia>>,
    pub image: Option<Value>,
    pub image_url: Option<Value>,
    pub images: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostUser {
    pub id: Option<String>,
    pub name: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostMedia {
    pub thumbnail: Option<Value>,
    pub photo_image: Option<PhotoImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoImage {
    pub uri: Option<String>,
}

impl FacebookPost {
    /// Primary post text, whichever field carried it.
    pub fn body(&self) -> Option<&str> {
        [&self.text, &self.post_text, &self.message]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    pub fn published(&self) -> Option<&Value> {
        [&self.post_date, &self.time, &self.date, &self.timestamp]
            .into_iter()
            .filter_map(Option::as_ref)
            .find(|v| !v.is_null() && v.as_str().is_none_or(|s| !s.trim().is_empty()))
    }

    pub fn author(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .or(self.page_name.as_deref())
            .or(self.author_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Canonical permalink reported by the actor.
    pub fn permalink(&self) -> Option<&str> {
        [&self.url, &self.post_url, &self.top_level_url, &self.facebook_url]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

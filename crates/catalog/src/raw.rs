use serde::{Deserialize, Serialize};

/// Backend identifier: numeric on most endpoints, string on a few.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Str(String),
}

impl RawId {
    /// Stable string key, or `None` for blank string ids.
    pub fn to_key(&self) -> Option<String> {
        match self {
            RawId::Int(n) => Some(n.to_string()),
            RawId::Str(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }

    pub fn to_int(&self) -> Option<i64> {
        match self {
            RawId::Int(n) => Some(*n),
            RawId::Str(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for RawId {
    fn from(value: i64) -> Self {
        RawId::Int(value)
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        RawId::Str(value.to_string())
    }
}

/// Thumbnail as sent by the backend: a bare url or a file object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawThumbnail {
    Url(String),
    File {
        #[serde(default, alias = "fileUrl", alias = "path")]
        url: Option<String>,
        #[serde(default, rename = "fileId", alias = "id")]
        file_id: Option<RawId>,
    },
}

/// One record of a category/device tree response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCategory {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub depth: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<RawId>,
    #[serde(default)]
    pub thumbnail: Option<RawThumbnail>,
    #[serde(default)]
    pub thumbnail_file: Option<RawThumbnail>,
    #[serde(default)]
    pub children: Option<Vec<RawCategory>>,
}

impl RawCategory {
    pub fn new(id: impl Into<RawId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<RawId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_children(mut self, children: Vec<RawCategory>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn key(&self) -> Option<String> {
        self.id.as_ref().and_then(RawId::to_key)
    }

    pub fn parent_key(&self) -> Option<String> {
        self.parent_id.as_ref().and_then(RawId::to_key)
    }

    /// First thumbnail field that carries a url.
    pub fn thumbnail_source(&self) -> Option<&RawThumbnail> {
        [self.thumbnail.as_ref(), self.thumbnail_file.as_ref()]
            .into_iter()
            .flatten()
            .find(|t| t.url().is_some())
    }
}

impl RawThumbnail {
    pub fn url(&self) -> Option<&str> {
        let url = match self {
            RawThumbnail::Url(url) => Some(url.as_str()),
            RawThumbnail::File { url, .. } => url.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn file_id(&self) -> Option<String> {
        match self {
            RawThumbnail::Url(_) => None,
            RawThumbnail::File { file_id, .. } => file_id.as_ref().and_then(RawId::to_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RawCategory, RawId, RawThumbnail};

    #[test]
    fn ids_accept_numbers_and_strings() {
        let a: RawCategory = serde_json::from_str(r#"{"id": 12, "name": "Pumps"}"#).unwrap();
        let b: RawCategory = serde_json::from_str(r#"{"id": " 12 ", "name": "Pumps"}"#).unwrap();
        assert_eq!(a.key().as_deref(), Some("12"));
        assert_eq!(b.key().as_deref(), Some("12"));
        assert_eq!(RawId::from("").to_key(), None);
        assert_eq!(RawId::from("x").to_int(), None);
    }

    #[test]
    fn thumbnail_field_variants() {
        let raw: RawCategory = serde_json::from_str(
            r#"{"id": 1, "thumbnailFile": {"fileUrl": "/img/a.png", "id": 77}}"#,
        )
        .unwrap();
        let thumb = raw.thumbnail_source().expect("thumbnail");
        assert_eq!(thumb.url(), Some("/img/a.png"));
        assert_eq!(thumb.file_id().as_deref(), Some("77"));

        let raw: RawCategory =
            serde_json::from_str(r#"{"id": 1, "thumbnail": "/img/b.png"}"#).unwrap();
        assert_eq!(
            raw.thumbnail,
            Some(RawThumbnail::Url("/img/b.png".to_string()))
        );
        assert!(raw.thumbnail_source().unwrap().file_id().is_none());
    }

    #[test]
    fn empty_thumbnail_falls_through_to_next_field() {
        let raw: RawCategory = serde_json::from_str(
            r#"{"id": 1, "thumbnail": {"url": ""}, "thumbnailFile": {"url": "/c.png", "fileId": "f-3"}}"#,
        )
        .unwrap();
        let thumb = raw.thumbnail_source().unwrap();
        assert_eq!(thumb.url(), Some("/c.png"));
        assert_eq!(thumb.file_id().as_deref(), Some("f-3"));
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether an item is a playable video or a rendered blog article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentKind {
    #[default]
    #[serde(rename = "VIDEO")]
    Video,
    #[serde(rename = "BLOG")]
    Blog,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "VIDEO",
            Self::Blog => "BLOG",
        }
    }
}

impl FromStr for ContentKind {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIDEO" => Ok(Self::Video),
            "BLOG" => Ok(Self::Blog),
            other => Err(UnknownValue {
                field: "type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed catalog categories. Wire values keep the original spaced spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "EMOTIONAL")]
    Emotional,
    #[serde(rename = "TECHNOLOGY")]
    Technology,
    #[serde(rename = "SCIENCE")]
    Science,
    #[serde(rename = "PERSONAL FINANCE")]
    PersonalFinance,
    #[default]
    #[serde(rename = "INFORMATIONAL BRIEFING")]
    InformationalBriefing,
    #[serde(rename = "NEWS")]
    News,
    #[serde(rename = "TECH INFO")]
    TechInfo,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Emotional,
        Self::Technology,
        Self::Science,
        Self::PersonalFinance,
        Self::InformationalBriefing,
        Self::News,
        Self::TechInfo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emotional => "EMOTIONAL",
            Self::Technology => "TECHNOLOGY",
            Self::Science => "SCIENCE",
            Self::PersonalFinance => "PERSONAL FINANCE",
            Self::InformationalBriefing => "INFORMATIONAL BRIEFING",
            Self::News => "NEWS",
            Self::TechInfo => "TECH INFO",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownValue {
                field: "category",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that is not part of a fixed enum.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid {field}: {value:?}")]
pub struct UnknownValue {
    pub field: &'static str,
    pub value: String,
}

/// A catalog entry: one video or blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub blog_content: Option<String>,
    /// Relative storage path under the uploads tree, `None` when absent.
    pub video_path: Option<String>,
    pub thumbnail_path: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub category: Category,
    /// Id of the admin that created the item.
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An administrator account. The hash never leaves the server.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

/// Server-side catalog filter.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Exact category match; `None` means no filter ("All").
    pub category: Option<String>,
    /// Restrict to items created on this UTC calendar day.
    pub day: Option<NaiveDate>,
}

/// createdAt ordering for list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Latest,
    Oldest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_spaced_names() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
        assert!("FINANCE".parse::<Category>().is_err());
    }

    #[test]
    fn wire_shape_uses_original_field_names() {
        let item = ContentItem {
            id: "abc".into(),
            title: "Border Patrol Report".into(),
            description: None,
            blog_content: Some("Troops conducted...".into()),
            video_path: None,
            thumbnail_path: None,
            kind: ContentKind::Blog,
            category: Category::News,
            uploaded_by: Some("admin-1".into()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "BLOG");
        assert_eq!(json["category"], "NEWS");
        assert_eq!(json["blogContent"], "Troops conducted...");
        assert!(json["videoPath"].is_null());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn defaults_match_the_model() {
        assert_eq!(ContentKind::default(), ContentKind::Video);
        assert_eq!(Category::default(), Category::InformationalBriefing);
        assert_eq!(SortOrder::default(), SortOrder::Latest);
    }
}

use serde::{Deserialize, Serialize};

/// One item as returned by `GET /api/v2/items`.
///
/// Timestamps are kept as the upstream strings and parsed when the feed is
/// rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub user: AuthorRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: String,
    #[serde(default)]
    pub profile_image_url: String,
}

/// The Qiita:Team a deployment aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    team: String,
}

impl Channel {
    pub fn new(team: impl Into<String>) -> Self {
        Self { team: team.into() }
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn base_url(&self) -> String {
        format!("https://{}.qiita.com", self.team)
    }

    pub fn title(&self) -> String {
        format!("{} Qiita:Team", self.team)
    }

    pub fn author_uri(&self, author_id: &str) -> String {
        format!("{}/{}/items", self.base_url(), author_id)
    }
}

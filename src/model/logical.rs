use serde::{Deserialize, Serialize};

// Listing models. The backend owns these shapes, so most fields are optional
// and anything unknown is dropped.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub registered_players: u32,
    #[serde(default)]
    pub max_players: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub game: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TournamentList {
    pub tournaments: Vec<Tournament>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i64,
    pub team_a: String,
    pub team_b: String,
    #[serde(default)]
    pub winner: Option<Side>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub players: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default, rename = "formatted_date")]
    pub formatted_date: Option<String>,
}

impl Match {
    pub fn winner_name(&self) -> Option<&str> {
        match self.winner? {
            Side::A => Some(&self.team_a),
            Side::B => Some(&self.team_b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub more_link: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStats {
    pub total_members: u64,
    pub online_members: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Join code players use to enter the team.
    pub code: String,
}

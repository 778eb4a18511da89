use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: &'static str,
    pub points: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Fixed placeholder rows shown with the initial data. No ranking is computed.
pub fn mock_leaderboard() -> Vec<LeaderboardEntry> {
    vec![
        LeaderboardEntry { rank: 1, name: "Abel (You)", points: 3500, kind: "points" },
        LeaderboardEntry { rank: 2, name: "Bethlehem", points: 3200, kind: "points" },
        LeaderboardEntry { rank: 3, name: "Kaleb.T", points: 2950, kind: "points" },
    ]
}

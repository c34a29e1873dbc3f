//! Challenge catalog published as `challenges.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChallengeCatalog {
    #[serde(default)]
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rom: Option<String>,
    #[serde(default)]
    pub challenges: Vec<Challenge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub name: String,
    /// Script path relative to the challenges directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lua: Option<String>,
}

impl Challenge {
    fn new(name: &str, lua: &str) -> Self {
        Self {
            name: name.to_string(),
            lua: Some(lua.to_string()),
        }
    }
}

impl ChallengeCatalog {
    /// Catalog served when the remote one cannot be fetched.
    pub fn fallback() -> Self {
        Self {
            games: vec![
                Game {
                    name: "Castlevania".to_string(),
                    rom: Some("castlevania.nes".to_string()),
                    challenges: vec![
                        Challenge::new("Get 5000 points!", "castlevania_5000pts.lua"),
                        Challenge::new("Kill Dracula!", "castlevania_dracula.lua"),
                    ],
                },
                Game {
                    name: "Super Mario Bros".to_string(),
                    rom: Some("super_mario_bros.nes".to_string()),
                    challenges: vec![
                        Challenge::new("Get 5 1ups!", "mario_5_1ups.lua"),
                        Challenge::new("Speed Run Level 1", "mario_speedrun.lua"),
                    ],
                },
            ],
        }
    }

    /// Case-insensitive game lookup.
    pub fn find_game(&self, name: &str) -> Option<&Game> {
        self.games
            .iter()
            .find(|game| game.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn challenge_count(&self) -> usize {
        self.games.iter().map(|game| game.challenges.len()).sum()
    }
}

impl Game {
    /// Finds a challenge by case-insensitive name, or by 1-based position.
    pub fn find_challenge(&self, selector: &str) -> Option<&Challenge> {
        let selector = selector.trim();
        if let Ok(index) = selector.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| self.challenges.get(i));
        }
        self.challenges
            .iter()
            .find(|challenge| challenge.name.eq_ignore_ascii_case(selector))
    }
}

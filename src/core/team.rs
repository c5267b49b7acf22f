//! Team identification and per-team data storage.
//!
//! ## Team
//!
//! The game is always HOME versus AWAY. `Team::opponent` gives the
//! defending side of an action.
//!
//! ## TeamMap
//!
//! Per-team storage indexed by `Team`, the two-sided analogue of a
//! per-player map.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One side of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The home side.
    Home,
    /// The away side.
    Away,
}

impl Team {
    /// Both teams, home first.
    pub const ALL: [Team; 2] = [Team::Home, Team::Away];

    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Team::Home => Team::Away,
            Team::Away => Team::Home,
        }
    }

    /// Lowercase tag used in documents and expressions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Team::Home => "home",
            Team::Away => "away",
        }
    }

    /// Parse a team tag (case-insensitive).
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("home") {
            Some(Team::Home)
        } else if tag.eq_ignore_ascii_case("away") {
            Some(Team::Away)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-team data storage with O(1) access.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMap<T> {
    home: T,
    away: T,
}

impl<T> TeamMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(factory: impl Fn(Team) -> T) -> Self {
        Self {
            home: factory(Team::Home),
            away: factory(Team::Away),
        }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            home: value.clone(),
            away: value,
        }
    }

    /// Get a reference to a team's data.
    #[must_use]
    pub fn get(&self, team: Team) -> &T {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }

    /// Get a mutable reference to a team's data.
    pub fn get_mut(&mut self, team: Team) -> &mut T {
        match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        }
    }

    /// Iterate over (Team, &T) pairs, home first.
    pub fn iter(&self) -> impl Iterator<Item = (Team, &T)> {
        [(Team::Home, &self.home), (Team::Away, &self.away)].into_iter()
    }
}

impl<T> Index<Team> for TeamMap<T> {
    type Output = T;

    fn index(&self, team: Team) -> &Self::Output {
        self.get(team)
    }
}

impl<T> IndexMut<Team> for TeamMap<T> {
    fn index_mut(&mut self, team: Team) -> &mut Self::Output {
        self.get_mut(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Team::Home.opponent(), Team::Away);
        assert_eq!(Team::Away.opponent(), Team::Home);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Team::parse("HOME"), Some(Team::Home));
        assert_eq!(Team::parse("away"), Some(Team::Away));
        assert_eq!(Team::parse("bench"), None);
        assert_eq!(format!("{}", Team::Away), "away");
    }

    #[test]
    fn test_team_map_mutation() {
        let mut map: TeamMap<i32> = TeamMap::with_value(0);
        map[Team::Home] = 4;
        map[Team::Away] += 2;

        assert_eq!(map[Team::Home], 4);
        assert_eq!(map[Team::Away], 2);

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(Team::Home, &4), (Team::Away, &2)]);
    }

    #[test]
    fn test_team_serialization() {
        let json = serde_json::to_string(&Team::Home).unwrap();
        assert_eq!(json, "\"home\"");
        let map: TeamMap<u8> = TeamMap::new(|t| if t == Team::Home { 1 } else { 2 });
        let json = serde_json::to_string(&map).unwrap();
        let back: TeamMap<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}

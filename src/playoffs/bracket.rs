//! Playoff bracket arena.
//!
//! Matches live in a vector and refer to each other through [`PlayoffId`]
//! handles. [`Bracket::add`] only accepts participants that point at
//! matches already in the arena, so every reference resolves and the
//! dependency graph is acyclic by construction: ids only ever point
//! backwards.

use serde::{Deserialize, Serialize};

use crate::models::{group_label, ordinal_suffix, Locale, MatchPhase, Placeholder};

/// Handle of a match inside a [`Bracket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayoffId(pub usize);

/// A seed coming out of the group stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Seed {
    /// Team finishing `place` in the group at index `group` (0 = A).
    GroupPlace { group: usize, place: u8 },
    /// Best runner-up across all groups.
    BestSecond,
}

/// One side of a playoff match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Participant {
    Seed(Seed),
    Winner(PlayoffId),
    Loser(PlayoffId),
}

impl Participant {
    /// Group-place seed shorthand.
    pub fn group(group: usize, place: u8) -> Self {
        Self::Seed(Seed::GroupPlace { group, place })
    }

    /// Match this participant comes from, if any.
    pub fn source(&self) -> Option<PlayoffId> {
        match self {
            Self::Seed(_) => None,
            Self::Winner(id) | Self::Loser(id) => Some(*id),
        }
    }
}

/// Knockout round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayoffRound {
    RoundOf16,
    Quarterfinal,
    Semifinal,
    /// 5th-8th place matches between quarterfinal losers.
    PlacementSemifinal,
    /// Match deciding two adjacent places (5/6, 7/8, ...).
    Placement,
    ThirdPlace,
    Final,
}

impl PlayoffRound {
    /// Phase the round is reported under.
    pub fn phase(self) -> MatchPhase {
        match self {
            Self::RoundOf16 => MatchPhase::RoundOf16,
            Self::Quarterfinal => MatchPhase::Quarterfinal,
            Self::Semifinal | Self::PlacementSemifinal => MatchPhase::Semifinal,
            Self::Placement | Self::ThirdPlace | Self::Final => MatchPhase::Final,
        }
    }

    /// Chronological position, used as slot hint.
    pub fn ordinal(self) -> u32 {
        match self {
            Self::RoundOf16 => 1,
            Self::Quarterfinal => 2,
            Self::Semifinal | Self::PlacementSemifinal => 3,
            Self::Placement | Self::ThirdPlace => 4,
            Self::Final => 5,
        }
    }
}

/// Places decided by a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rank {
    Single(u32),
    /// Inclusive range `(low, high)`.
    Range(u32, u32),
}

/// A node of the bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffMatch {
    pub id: PlayoffId,
    /// Stable match key (`semi1`, `qf3`, `r16-4`, `third-place`, ...).
    pub key: String,
    pub round: PlayoffRound,
    /// Position within its round (1-based).
    pub number: u32,
    pub home: Participant,
    pub away: Participant,
    pub rank: Option<Rank>,
    /// Matches that must finish first, ascending.
    pub depends_on: Vec<PlayoffId>,
}

impl PlayoffMatch {
    /// Display label.
    pub fn label(&self, locale: Locale) -> String {
        let n = self.number;
        match (locale, self.round) {
            (Locale::De, PlayoffRound::RoundOf16) => format!("Achtelfinale {n}"),
            (Locale::De, PlayoffRound::Quarterfinal) => format!("Viertelfinale {n}"),
            (Locale::De, PlayoffRound::Semifinal) => format!("Halbfinale {n}"),
            (Locale::De, PlayoffRound::PlacementSemifinal) => format!("Platzierung 5-8 ({n})"),
            (Locale::De, PlayoffRound::Placement) => match self.rank {
                Some(Rank::Range(low, _)) | Some(Rank::Single(low)) => {
                    format!("Spiel um Platz {low}")
                }
                None => format!("Platzierungsspiel {n}"),
            },
            (Locale::De, PlayoffRound::ThirdPlace) => "Spiel um Platz 3".to_string(),
            (Locale::De, PlayoffRound::Final) => "Finale".to_string(),
            (Locale::En, PlayoffRound::RoundOf16) => format!("Round of 16 {n}"),
            (Locale::En, PlayoffRound::Quarterfinal) => format!("Quarterfinal {n}"),
            (Locale::En, PlayoffRound::Semifinal) => format!("Semifinal {n}"),
            (Locale::En, PlayoffRound::PlacementSemifinal) => format!("Placement 5-8 ({n})"),
            (Locale::En, PlayoffRound::Placement) => match self.rank {
                Some(Rank::Range(low, _)) | Some(Rank::Single(low)) => {
                    format!("{low}{} place match", ordinal_suffix(low))
                }
                None => format!("Placement match {n}"),
            },
            (Locale::En, PlayoffRound::ThirdPlace) => "3rd place match".to_string(),
            (Locale::En, PlayoffRound::Final) => "Final".to_string(),
        }
    }
}

/// Arena of playoff matches in insertion (= dependency) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    matches: Vec<PlayoffMatch>,
}

impl Bracket {
    /// Creates an empty bracket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a match and returns its handle.
    ///
    /// `depends_on` is derived from the participants.
    ///
    /// # Panics
    /// Panics if a participant points at a match not yet in the bracket.
    /// Presets only build on earlier rounds, so this is a programming error.
    pub fn add(
        &mut self,
        key: impl Into<String>,
        round: PlayoffRound,
        home: Participant,
        away: Participant,
        rank: Option<Rank>,
    ) -> PlayoffId {
        let id = PlayoffId(self.matches.len());
        let mut depends_on: Vec<PlayoffId> =
            [home, away].iter().filter_map(|p| p.source()).collect();
        assert!(
            depends_on.iter().all(|d| d.0 < id.0),
            "bracket participants must reference earlier matches"
        );
        depends_on.sort();
        depends_on.dedup();

        let number = self.matches.iter().filter(|m| m.round == round).count() as u32 + 1;
        self.matches.push(PlayoffMatch {
            id,
            key: key.into(),
            round,
            number,
            home,
            away,
            rank,
            depends_on,
        });
        id
    }

    /// Adds an ordering-only dependency (`id` waits for `on`).
    ///
    /// Ignored unless `on` is an earlier match, which keeps the graph acyclic.
    pub fn add_dependency(&mut self, id: PlayoffId, on: PlayoffId) -> bool {
        if on.0 >= id.0 {
            return false;
        }
        match self.matches.get_mut(id.0) {
            Some(m) => {
                if !m.depends_on.contains(&on) {
                    m.depends_on.push(on);
                    m.depends_on.sort();
                }
                true
            }
            None => false,
        }
    }

    /// Match by handle.
    pub fn get(&self, id: PlayoffId) -> Option<&PlayoffMatch> {
        self.matches.get(id.0)
    }

    /// Match by key.
    pub fn by_key(&self, key: &str) -> Option<&PlayoffMatch> {
        self.matches.iter().find(|m| m.key == key)
    }

    /// All matches in dependency order.
    pub fn matches(&self) -> &[PlayoffMatch] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Keys of the matches `id` depends on.
    pub fn depends_on_keys(&self, id: PlayoffId) -> Vec<&str> {
        self.get(id)
            .map(|m| {
                m.depends_on
                    .iter()
                    .filter_map(|d| self.get(*d).map(|dm| dm.key.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// String form of a participant, with groups named A, B, ...
    pub fn reference(&self, participant: &Participant) -> Placeholder {
        self.reference_with(participant, &[])
    }

    /// String form of a participant using the given group labels.
    ///
    /// Group indices beyond `labels` fall back to A, B, ...
    pub fn reference_with(&self, participant: &Participant, labels: &[String]) -> Placeholder {
        match participant {
            Participant::Seed(Seed::GroupPlace { group, place }) => Placeholder::group_place(
                labels
                    .get(*group)
                    .cloned()
                    .unwrap_or_else(|| group_label(*group)),
                *place,
            ),
            Participant::Seed(Seed::BestSecond) => Placeholder::BestSecond,
            Participant::Winner(id) => self
                .get(*id)
                .map_or(Placeholder::Tbd, |m| Placeholder::Winner(m.key.clone())),
            Participant::Loser(id) => self
                .get(*id)
                .map_or(Placeholder::Tbd, |m| Placeholder::Loser(m.key.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn semis() -> Bracket {
        let mut b = Bracket::new();
        let s1 = b.add(
            "semi1",
            PlayoffRound::Semifinal,
            Participant::group(0, 2),
            Participant::group(1, 1),
            None,
        );
        let s2 = b.add(
            "semi2",
            PlayoffRound::Semifinal,
            Participant::group(0, 1),
            Participant::group(1, 2),
            None,
        );
        b.add(
            "final",
            PlayoffRound::Final,
            Participant::Winner(s1),
            Participant::Winner(s2),
            Some(Rank::Range(1, 2)),
        );
        b
    }

    #[test]
    fn test_add_derives_dependencies() {
        let b = semis();
        assert_eq!(b.len(), 3);
        let f = b.by_key("final").unwrap();
        assert_eq!(f.depends_on, vec![PlayoffId(0), PlayoffId(1)]);
        assert_eq!(b.depends_on_keys(f.id), vec!["semi1", "semi2"]);
        assert_eq!(b.get(PlayoffId(1)).unwrap().number, 2);
    }

    #[test]
    #[should_panic(expected = "earlier matches")]
    fn test_forward_reference_panics() {
        let mut b = Bracket::new();
        b.add(
            "x",
            PlayoffRound::Final,
            Participant::Winner(PlayoffId(5)),
            Participant::group(0, 1),
            None,
        );
    }

    #[test]
    fn test_reference_strings() {
        let b = semis();
        let f = b.by_key("final").unwrap();
        assert_eq!(b.reference(&f.home).to_string(), "semi1-winner");
        let s1 = b.by_key("semi1").unwrap();
        assert_eq!(b.reference(&s1.home).to_string(), "group-a-2nd");
        assert_eq!(
            b.reference(&Participant::Loser(PlayoffId(1))).to_string(),
            "semi2-loser"
        );
        let labels = vec!["Nord".to_string()];
        assert_eq!(
            b.reference_with(&s1.away, &labels).to_string(),
            "group-b-1st"
        );
        assert_eq!(
            b.reference_with(&s1.home, &labels).to_string(),
            "group-nord-2nd"
        );
    }

    #[test]
    fn test_add_dependency_keeps_order() {
        let mut b = semis();
        assert!(!b.add_dependency(PlayoffId(0), PlayoffId(2)));
        assert!(b.add_dependency(PlayoffId(2), PlayoffId(0)));
        assert_eq!(b.get(PlayoffId(2)).unwrap().depends_on.len(), 2);
    }

    #[test]
    fn test_labels() {
        let b = semis();
        assert_eq!(b.by_key("semi1").unwrap().label(Locale::De), "Halbfinale 1");
        assert_eq!(b.by_key("semi2").unwrap().label(Locale::En), "Semifinal 2");
        assert_eq!(b.by_key("final").unwrap().label(Locale::De), "Finale");
    }

    #[test]
    fn test_round_phases() {
        assert_eq!(PlayoffRound::PlacementSemifinal.phase(), MatchPhase::Semifinal);
        assert_eq!(PlayoffRound::ThirdPlace.phase(), MatchPhase::Final);
        assert!(PlayoffRound::Quarterfinal.ordinal() < PlayoffRound::Semifinal.ordinal());
        assert!(PlayoffRound::ThirdPlace.ordinal() < PlayoffRound::Final.ordinal());
    }
}

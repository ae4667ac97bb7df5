//! Playoff presets.
//!
//! Each preset is a pure mapping from group count (and group sizes) to a
//! fixed bracket shape. Presets that need more groups than exist fall back
//! to the largest shape that fits:
//!
//! | Requested | Groups | Generated |
//! |-----------|--------|-----------|
//! | any | < 2 | none |
//! | top-16 | < 8 | top-8 rules |
//! | top-8 | < 4 | top-4 |
//! | all-places | 2 | all-places |
//! | all-places | 3 | top-4 |
//! | all-places | ≥ 4 | top-8 |

use serde::{Deserialize, Serialize};

use super::{Bracket, Participant, PlayoffId, PlayoffRound, Rank};
use crate::models::FinalsPreset;

/// Group size assumed when no size is known.
pub const ASSUMED_GROUP_SIZE: usize = 4;

/// Generated bracket plus the preset that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketOutcome {
    pub bracket: Bracket,
    pub requested: FinalsPreset,
    pub effective: FinalsPreset,
}

impl BracketOutcome {
    /// Whether the requested preset had to fall back.
    pub fn downgraded(&self) -> bool {
        self.requested != self.effective
    }
}

/// Preset actually generated for `groups` groups.
pub fn effective_preset(preset: FinalsPreset, groups: usize) -> FinalsPreset {
    if groups < 2 {
        return FinalsPreset::None;
    }
    match preset {
        FinalsPreset::None => FinalsPreset::None,
        FinalsPreset::FinalOnly => FinalsPreset::FinalOnly,
        FinalsPreset::Top4 => FinalsPreset::Top4,
        FinalsPreset::Top8 if groups >= 4 => FinalsPreset::Top8,
        FinalsPreset::Top8 => FinalsPreset::Top4,
        FinalsPreset::Top16 if groups >= 8 => FinalsPreset::Top16,
        FinalsPreset::Top16 => effective_preset(FinalsPreset::Top8, groups),
        FinalsPreset::AllPlaces if groups == 2 => FinalsPreset::AllPlaces,
        FinalsPreset::AllPlaces if groups == 3 => FinalsPreset::Top4,
        FinalsPreset::AllPlaces => FinalsPreset::Top8,
    }
}

/// Builds the playoff bracket for `groups` groups.
///
/// `sizes[i]` is the team count of group `i`; missing entries count as
/// [`ASSUMED_GROUP_SIZE`]. Sizes only gate placement matches.
///
/// # Example
/// ```
/// use u_tournament::models::FinalsPreset;
/// use u_tournament::playoffs::generate_bracket;
///
/// let outcome = generate_bracket(FinalsPreset::Top4, 2, &[]);
/// let keys: Vec<&str> = outcome.bracket.matches().iter().map(|m| m.key.as_str()).collect();
/// assert_eq!(keys, vec!["semi1", "semi2", "third-place", "final"]);
/// ```
pub fn generate_bracket(preset: FinalsPreset, groups: usize, sizes: &[usize]) -> BracketOutcome {
    let effective = effective_preset(preset, groups);
    let mut bracket = Bracket::new();

    match effective {
        FinalsPreset::None => {}
        FinalsPreset::FinalOnly => {
            bracket.add(
                "final",
                PlayoffRound::Final,
                Participant::group(0, 1),
                Participant::group(1, 1),
                Some(Rank::Range(1, 2)),
            );
        }
        FinalsPreset::Top4 => {
            let semis = top4_semis(&mut bracket, groups);
            finish(&mut bracket, semis, &[]);
        }
        FinalsPreset::Top8 => top8(&mut bracket),
        FinalsPreset::Top16 => top16(&mut bracket),
        FinalsPreset::AllPlaces => all_places(&mut bracket, sizes),
    }

    if effective != preset {
        tracing::warn!(
            requested = preset.as_str(),
            effective = effective.as_str(),
            groups,
            "finals preset downgraded"
        );
    }
    tracing::debug!(preset = effective.as_str(), matches = bracket.len(), "bracket generated");

    BracketOutcome {
        bracket,
        requested: preset,
        effective,
    }
}

/// Number of playoff matches a preset yields.
pub fn expected_match_count(preset: FinalsPreset, groups: usize, sizes: &[usize]) -> usize {
    generate_bracket(preset, groups, sizes).bracket.len()
}

fn size_of(sizes: &[usize], group: usize) -> usize {
    sizes.get(group).copied().unwrap_or(ASSUMED_GROUP_SIZE)
}

fn top4_semis(bracket: &mut Bracket, groups: usize) -> [PlayoffId; 2] {
    let g = Participant::group;
    // winners of A and B meet the other group's runner-up
    let (s1, s2) = match groups {
        2 => ((g(0, 2), g(1, 1)), (g(0, 1), g(1, 2))),
        _ => ((g(0, 1), g(1, 2)), (g(1, 1), g(0, 2))),
    };
    [
        bracket.add("semi1", PlayoffRound::Semifinal, s1.0, s1.1, None),
        bracket.add("semi2", PlayoffRound::Semifinal, s2.0, s2.1, None),
    ]
}

/// Third-place match and final on top of two semifinals.
///
/// The final additionally waits for every match in `extra`.
fn finish(bracket: &mut Bracket, [s1, s2]: [PlayoffId; 2], extra: &[PlayoffId]) {
    bracket.add(
        "third-place",
        PlayoffRound::ThirdPlace,
        Participant::Loser(s1),
        Participant::Loser(s2),
        Some(Rank::Range(3, 4)),
    );
    let fin = bracket.add(
        "final",
        PlayoffRound::Final,
        Participant::Winner(s1),
        Participant::Winner(s2),
        Some(Rank::Range(1, 2)),
    );
    for &e in extra {
        bracket.add_dependency(fin, e);
    }
}

/// Four quarterfinals from the given pairs, then semis, optional 5-8
/// places, third place and final.
fn from_quarterfinals(
    bracket: &mut Bracket,
    pairs: [(Participant, Participant); 4],
    placements: bool,
) {
    let qf: Vec<PlayoffId> = pairs
        .iter()
        .enumerate()
        .map(|(i, (home, away))| {
            bracket.add(
                format!("qf{}", i + 1),
                PlayoffRound::Quarterfinal,
                *home,
                *away,
                None,
            )
        })
        .collect();

    let s1 = bracket.add(
        "semi1",
        PlayoffRound::Semifinal,
        Participant::Winner(qf[0]),
        Participant::Winner(qf[1]),
        None,
    );
    let s2 = bracket.add(
        "semi2",
        PlayoffRound::Semifinal,
        Participant::Winner(qf[2]),
        Participant::Winner(qf[3]),
        None,
    );
    if placements {
        bracket.add(
            "place5-8-1",
            PlayoffRound::PlacementSemifinal,
            Participant::Loser(qf[0]),
            Participant::Loser(qf[1]),
            Some(Rank::Range(5, 8)),
        );
        bracket.add(
            "place5-8-2",
            PlayoffRound::PlacementSemifinal,
            Participant::Loser(qf[2]),
            Participant::Loser(qf[3]),
            Some(Rank::Range(5, 8)),
        );
    }
    finish(bracket, [s1, s2], &[]);
}

fn top8(bracket: &mut Bracket) {
    let g = Participant::group;
    // A1-D2, B1-C2, C1-B2, D1-A2
    from_quarterfinals(
        bracket,
        [
            (g(0, 1), g(3, 2)),
            (g(1, 1), g(2, 2)),
            (g(2, 1), g(1, 2)),
            (g(3, 1), g(0, 2)),
        ],
        true,
    );
}

fn top16(bracket: &mut Bracket) {
    // 1st of group i vs 2nd of group 7 - i
    let r16: Vec<PlayoffId> = (0..8)
        .map(|i| {
            bracket.add(
                format!("r16-{}", i + 1),
                PlayoffRound::RoundOf16,
                Participant::group(i, 1),
                Participant::group(7 - i, 2),
                None,
            )
        })
        .collect();
    let w = |i: usize| Participant::Winner(r16[i]);
    from_quarterfinals(
        bracket,
        [(w(0), w(1)), (w(2), w(3)), (w(4), w(5)), (w(6), w(7))],
        false,
    );
}

fn all_places(bracket: &mut Bracket, sizes: &[usize]) {
    let semis = top4_semis(bracket, 2);
    let deepest = size_of(sizes, 0).min(size_of(sizes, 1));

    let mut placements = Vec::new();
    for place in 3..=deepest {
        let low = 2 * place as u32 - 1;
        placements.push(bracket.add(
            format!("place-{}-{}", low, low + 1),
            PlayoffRound::Placement,
            Participant::group(0, place as u8),
            Participant::group(1, place as u8),
            Some(Rank::Range(low, low + 1)),
        ));
    }
    finish(bracket, semis, &placements);
}

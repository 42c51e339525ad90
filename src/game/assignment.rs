//! Role assignment: core roles first, then the special-role overlay
//!
//! Core roles are dealt by shuffling seat indices rather than shuffling a
//! pre-built list of role slots, so every seat is equally likely to receive
//! every role regardless of when the seat was created.

use super::player::{PlayerId, Role, Roster, SpecialRole};
use super::random::{pick, pick_pair, shuffled_indices};
use super::setup::{SpecialRoleConfig, SpecialToggle};
use super::words::WordPair;
use rand::Rng;
use std::collections::BTreeSet;

/// How many of each infiltrator role to deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCounts {
    pub undercover: usize,
    pub mr_white: usize,
}

/// Who ended up with which special tag this game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialAssignment {
    pub goddess: Option<PlayerId>,
    pub lovers: Option<(PlayerId, PlayerId)>,
    pub revenger: Option<PlayerId>,
    pub ghost: Option<PlayerId>,
    pub falafel_vendor: Option<PlayerId>,
}

/// Deal civilian, undercover and Mr. White roles with their words.
///
/// Callers must have validated `undercover + mr_white < roster.len()`.
pub fn assign_core_roles<R: Rng + ?Sized>(
    roster: &mut Roster,
    counts: RoleCounts,
    pair: &WordPair,
    rng: &mut R,
) {
    debug_assert!(
        counts.undercover + counts.mr_white < roster.len(),
        "role counts leave no civilian"
    );

    let order = shuffled_indices(roster.len(), rng);
    let undercover: BTreeSet<usize> = order.iter().take(counts.undercover).copied().collect();
    let mr_white: BTreeSet<usize> = order
        .iter()
        .skip(counts.undercover)
        .take(counts.mr_white)
        .copied()
        .collect();

    for (seat, player) in roster.players_mut().iter_mut().enumerate() {
        if undercover.contains(&seat) {
            player.role = Role::Undercover;
            player.word = Some(pair.undercover.clone());
        } else if mr_white.contains(&seat) {
            player.role = Role::MrWhite;
            player.word = None;
        } else {
            player.role = Role::Civilian;
            player.word = Some(pair.civilian.clone());
        }
    }

    tracing::debug!(
        "dealt {} undercover, {} mr white, {} civilians",
        counts.undercover,
        counts.mr_white,
        roster.len() - counts.undercover - counts.mr_white
    );
}

/// Layer the enabled special roles on top of the core roles.
///
/// Goddess, revenger, ghost and falafel vendor each go to a player no
/// earlier step tagged. Lovers are drawn from the whole roster and do not
/// mark anyone as taken.
pub fn assign_special_roles<R: Rng + ?Sized>(
    roster: &mut Roster,
    config: &SpecialRoleConfig,
    rng: &mut R,
) -> SpecialAssignment {
    let players = roster.len();
    let mut taken: BTreeSet<PlayerId> = BTreeSet::new();
    let mut result = SpecialAssignment::default();

    if config.is_active(SpecialToggle::Goddess, players) {
        result.goddess = tag_untagged(roster, &mut taken, SpecialRole::Goddess, rng);
    }

    if config.is_active(SpecialToggle::Lovers, players) {
        if let Some((a, b)) = pick_pair(&roster.ids(), rng) {
            for (me, partner) in [(a, b), (b, a)] {
                let player = roster.player_mut(me);
                player.special_roles.insert(SpecialRole::Lover);
                player.lover = Some(partner);
            }
            tracing::debug!("lovers: {} and {}", a, b);
            result.lovers = Some((a, b));
        }
    }

    if config.is_active(SpecialToggle::Revenger, players) {
        result.revenger = tag_untagged(roster, &mut taken, SpecialRole::Revenger, rng);
    }

    if config.is_active(SpecialToggle::Ghost, players) {
        result.ghost = tag_untagged(roster, &mut taken, SpecialRole::Ghost, rng);
    }

    if config.is_active(SpecialToggle::FalafelVendor, players) {
        result.falafel_vendor = tag_untagged(roster, &mut taken, SpecialRole::FalafelVendor, rng);
    }

    roster.assert_lovers_symmetric();
    result
}

fn tag_untagged<R: Rng + ?Sized>(
    roster: &mut Roster,
    taken: &mut BTreeSet<PlayerId>,
    role: SpecialRole,
    rng: &mut R,
) -> Option<PlayerId> {
    let candidates: Vec<PlayerId> = roster
        .ids()
        .into_iter()
        .filter(|id| !taken.contains(id))
        .collect();

    let Some(id) = pick(&candidates, rng) else {
        tracing::warn!("no untagged player left for {}", role.label());
        return None;
    };

    taken.insert(id);
    roster.player_mut(id).special_roles.insert(role);
    tracing::debug!("{} is {}", id, role.label());
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pair() -> WordPair {
        WordPair::new("Tea", "Coffee", "Both are hot drinks")
    }

    fn all_specials() -> SpecialRoleConfig {
        SpecialRoleConfig {
            goddess: true,
            lovers: true,
            meme: true,
            revenger: true,
            ghost: true,
            falafel_vendor: true,
        }
    }

    fn count_role(roster: &Roster, role: Role) -> usize {
        roster.players().iter().filter(|p| p.role == role).count()
    }

    #[test]
    fn test_role_counts_and_words_for_all_sizes() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 3..=12 {
            for undercover in 0..n {
                for mr_white in 0..(n - undercover) {
                    let mut roster = Roster::new(n);
                    let counts = RoleCounts { undercover, mr_white };
                    assign_core_roles(&mut roster, counts, &pair(), &mut rng);

                    assert_eq!(count_role(&roster, Role::Undercover), undercover);
                    assert_eq!(count_role(&roster, Role::MrWhite), mr_white);
                    assert_eq!(count_role(&roster, Role::Civilian), n - undercover - mr_white);

                    for p in roster.players() {
                        match p.role {
                            Role::Civilian => assert_eq!(p.word.as_deref(), Some("Tea")),
                            Role::Undercover => assert_eq!(p.word.as_deref(), Some("Coffee")),
                            Role::MrWhite => assert_eq!(p.word, None),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_each_seat_equally_likely_to_be_undercover() {
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 5000;
        let mut undercover_hits = [0u32; 5];
        let mut mr_white_hits = [0u32; 5];
        let counts = RoleCounts {
            undercover: 1,
            mr_white: 1,
        };

        for _ in 0..trials {
            let mut roster = Roster::new(5);
            assign_core_roles(&mut roster, counts, &pair(), &mut rng);
            for p in roster.players() {
                match p.role {
                    Role::Undercover => undercover_hits[p.id.0] += 1,
                    Role::MrWhite => mr_white_hits[p.id.0] += 1,
                    Role::Civilian => {}
                }
            }
        }

        // Expected 1000 per seat for each role
        for seat in 0..5 {
            assert!(
                (850..1150).contains(&undercover_hits[seat]),
                "seat {} undercover {} times",
                seat,
                undercover_hits[seat]
            );
            assert!(
                (850..1150).contains(&mr_white_hits[seat]),
                "seat {} mr white {} times",
                seat,
                mr_white_hits[seat]
            );
        }
    }

    #[test]
    fn test_special_roles_one_each_when_enabled() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let mut roster = Roster::new(8);
            let assigned = assign_special_roles(&mut roster, &all_specials(), &mut rng);

            let tagged = |role: SpecialRole| {
                roster
                    .players()
                    .iter()
                    .filter(|p| p.has_special(role))
                    .count()
            };
            assert_eq!(tagged(SpecialRole::Goddess), 1);
            assert_eq!(tagged(SpecialRole::Lover), 2);
            assert_eq!(tagged(SpecialRole::Revenger), 1);
            assert_eq!(tagged(SpecialRole::Ghost), 1);
            assert_eq!(tagged(SpecialRole::FalafelVendor), 1);

            let (a, b) = assigned.lovers.unwrap();
            assert_ne!(a, b);
            assert_eq!(roster.player(a).lover, Some(b));
            assert_eq!(roster.player(b).lover, Some(a));
            assert_eq!(roster.find_special(SpecialRole::FalafelVendor), assigned.falafel_vendor);
        }
    }

    #[test]
    fn test_excluded_specials_never_share_a_player() {
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..200 {
            let mut roster = Roster::new(5);
            let assigned = assign_special_roles(&mut roster, &all_specials(), &mut rng);
            let singles: BTreeSet<PlayerId> = [
                assigned.goddess,
                assigned.revenger,
                assigned.ghost,
                assigned.falafel_vendor,
            ]
            .into_iter()
            .flatten()
            .collect();
            assert_eq!(singles.len(), 4);
        }
    }

    #[test]
    fn test_lovers_may_overlap_other_tags() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut overlapped = false;
        for _ in 0..500 {
            let mut roster = Roster::new(5);
            assign_special_roles(&mut roster, &all_specials(), &mut rng);
            overlapped |= roster
                .players()
                .iter()
                .any(|p| p.has_special(SpecialRole::Lover) && p.special_roles.len() > 1);
        }
        assert!(overlapped, "lovers should be drawn from the whole roster");
    }

    #[test]
    fn test_gates_rechecked_for_small_tables() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut roster = Roster::new(3);
        let assigned = assign_special_roles(&mut roster, &all_specials(), &mut rng);
        assert!(assigned.goddess.is_some());
        assert!(assigned.ghost.is_some());
        assert_eq!(assigned.lovers, None);
        assert_eq!(assigned.revenger, None);
        assert_eq!(assigned.falafel_vendor, None);
    }

    #[test]
    fn test_disabled_config_tags_nobody() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut roster = Roster::new(10);
        let assigned = assign_special_roles(&mut roster, &SpecialRoleConfig::default(), &mut rng);
        assert_eq!(assigned, SpecialAssignment::default());
        assert!(roster.players().iter().all(|p| p.special_roles.is_empty()));
    }
}

//! Elimination and special-effect resolution
//!
//! One call resolves one elimination request completely: falafel check,
//! the elimination itself, and the whole chain of consequences (lover
//! deaths, ghost conversion, revenger and Mr. White flags). Nothing is left
//! half-applied for the caller to finish.
//!
//! Eliminating a player who is already out is engine misuse and panics.

use super::player::{FalafelEffect, PlayerId, Role, Roster, SpecialRole};
use std::collections::VecDeque;

/// Result of asking for one player to be eliminated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elimination {
    /// The target's falafel saved them. Nobody was eliminated; the caller
    /// must pick a different target.
    Protected { target: PlayerId },
    /// The elimination went through, with everything it set off.
    Resolved(ChainReport),
}

/// Everything one elimination set in motion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// The player voted out (or picked by the revenger)
    pub primary: PlayerId,
    /// A sabotage falafel was consumed on the way
    pub sabotaged: bool,
    /// Everyone eliminated, primary first, in resolution order
    pub eliminated: Vec<PlayerId>,
    /// Players converted to ghosts by this chain
    pub new_ghosts: Vec<PlayerId>,
    /// A revenger fell and must pick a victim before anything else happens
    pub revenger: Option<PlayerId>,
    /// The Mr. White who gets the one-shot guess for this event
    pub mr_white_guess: Option<PlayerId>,
}

impl ChainReport {
    pub fn chained(&self) -> &[PlayerId] {
        &self.eliminated[1..]
    }
}

/// Resolve a vote against `target`.
pub fn eliminate(roster: &mut Roster, target: PlayerId) -> Elimination {
    let player = roster.player_mut(target);
    assert!(
        player.is_alive,
        "{} is already eliminated and cannot be voted out",
        target
    );

    let mut sabotaged = false;
    if let Some(effect) = player.unused_falafel() {
        if let Some(falafel) = player.falafel.as_mut() {
            falafel.used = true;
        }
        match effect {
            FalafelEffect::Protect => {
                tracing::info!("{} was protected by a falafel", target);
                return Elimination::Protected { target };
            }
            FalafelEffect::Sabotage => {
                tracing::info!("{} ate a sabotaged falafel", target);
                sabotaged = true;
            }
        }
    }

    let mut report = resolve_chain(roster, target);
    report.sabotaged = sabotaged;
    Elimination::Resolved(report)
}

/// Eliminate the revenger's chosen victim. Falafel does not apply.
pub fn take_revenge(roster: &mut Roster, revenger: PlayerId, target: PlayerId) -> ChainReport {
    let avenger = roster.player(revenger);
    assert!(
        avenger.has_special(SpecialRole::Revenger) && !avenger.is_alive,
        "{} is not a fallen revenger",
        revenger
    );
    assert_ne!(revenger, target, "a revenger cannot take revenge on themselves");

    tracing::info!("{} takes revenge on {}", revenger, target);
    resolve_chain(roster, target)
}

/// Eliminate `primary` and everything that follows from it.
fn resolve_chain(roster: &mut Roster, primary: PlayerId) -> ChainReport {
    let mut report = ChainReport {
        primary,
        sabotaged: false,
        eliminated: Vec::new(),
        new_ghosts: Vec::new(),
        revenger: None,
        mr_white_guess: None,
    };

    let mut queue = VecDeque::from([primary]);
    while let Some(id) = queue.pop_front() {
        let player = roster.player_mut(id);
        assert!(player.is_alive, "{} is already eliminated", id);
        player.is_alive = false;
        report.eliminated.push(id);
        tracing::debug!("{} eliminated", id);

        if player.has_special(SpecialRole::Revenger) {
            if report.revenger.is_none() {
                report.revenger = Some(id);
            } else {
                tracing::warn!("second revenger {} in one chain ignored", id);
            }
        }

        let partner = player.lover;
        if player.has_special(SpecialRole::Ghost) {
            player.is_ghost = true;
            report.new_ghosts.push(id);
            tracing::debug!("{} returns as a ghost", id);
        }

        if let Some(partner) = partner {
            let partner_alive = roster.player(partner).is_alive;
            if partner_alive && !queue.contains(&partner) {
                tracing::info!("{} dies of heartbreak after {}", partner, id);
                queue.push_back(partner);
            }
        }
    }

    // One guess per event; a chained Mr. White takes precedence over the primary
    report.mr_white_guess = report
        .eliminated
        .iter()
        .rev()
        .copied()
        .find(|id| roster.player(*id).role == Role::MrWhite);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Falafel;

    fn roster(size: usize) -> Roster {
        Roster::new(size)
    }

    fn give_falafel(roster: &mut Roster, id: PlayerId, effect: FalafelEffect) {
        roster.player_mut(id).falafel = Some(Falafel {
            holder: id,
            effect,
            used: false,
        });
    }

    fn make_lovers(roster: &mut Roster, a: PlayerId, b: PlayerId) {
        for (me, partner) in [(a, b), (b, a)] {
            let p = roster.player_mut(me);
            p.special_roles.insert(SpecialRole::Lover);
            p.lover = Some(partner);
        }
    }

    fn tag(roster: &mut Roster, id: PlayerId, role: SpecialRole) {
        roster.player_mut(id).special_roles.insert(role);
    }

    fn alive_flags(roster: &Roster) -> Vec<bool> {
        roster.players().iter().map(|p| p.is_alive).collect()
    }

    fn resolved(outcome: Elimination) -> ChainReport {
        match outcome {
            Elimination::Resolved(report) => report,
            other => panic!("expected a resolved elimination, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_elimination() {
        let mut r = roster(4);
        let report = resolved(eliminate(&mut r, PlayerId(2)));
        assert_eq!(report.eliminated, vec![PlayerId(2)]);
        assert!(report.chained().is_empty());
        assert!(!r.player(PlayerId(2)).is_alive);
        assert_eq!(report.revenger, None);
        assert_eq!(report.mr_white_guess, None);
        assert!(!report.sabotaged);
    }

    #[test]
    fn test_protection_changes_nothing_then_redirect_eliminates() {
        let mut r = roster(5);
        give_falafel(&mut r, PlayerId(1), FalafelEffect::Protect);
        let before = alive_flags(&r);

        let outcome = eliminate(&mut r, PlayerId(1));
        assert_eq!(outcome, Elimination::Protected { target: PlayerId(1) });
        assert_eq!(alive_flags(&r), before);
        assert!(r.player(PlayerId(1)).falafel.unwrap().used);

        let report = resolved(eliminate(&mut r, PlayerId(3)));
        assert_eq!(report.eliminated, vec![PlayerId(3)]);
        assert!(!r.player(PlayerId(3)).is_alive);
    }

    #[test]
    fn test_protection_is_single_use() {
        let mut r = roster(5);
        give_falafel(&mut r, PlayerId(1), FalafelEffect::Protect);
        assert!(matches!(eliminate(&mut r, PlayerId(1)), Elimination::Protected { .. }));
        let report = resolved(eliminate(&mut r, PlayerId(1)));
        assert_eq!(report.primary, PlayerId(1));
    }

    #[test]
    fn test_sabotage_eliminates_normally() {
        let mut r = roster(5);
        give_falafel(&mut r, PlayerId(0), FalafelEffect::Sabotage);
        let report = resolved(eliminate(&mut r, PlayerId(0)));
        assert!(report.sabotaged);
        assert_eq!(report.eliminated, vec![PlayerId(0)]);
        assert!(r.player(PlayerId(0)).falafel.unwrap().used);
    }

    #[test]
    fn test_lover_partner_dies_despite_falafel() {
        let mut r = roster(6);
        make_lovers(&mut r, PlayerId(0), PlayerId(4));
        give_falafel(&mut r, PlayerId(4), FalafelEffect::Protect);

        let report = resolved(eliminate(&mut r, PlayerId(0)));
        assert_eq!(report.eliminated, vec![PlayerId(0), PlayerId(4)]);
        assert!(!r.player(PlayerId(0)).is_alive);
        assert!(!r.player(PlayerId(4)).is_alive);
        // The partner's falafel was never touched
        assert!(!r.player(PlayerId(4)).falafel.unwrap().used);
    }

    #[test]
    fn test_dead_lover_partner_is_not_chained() {
        let mut r = roster(6);
        make_lovers(&mut r, PlayerId(1), PlayerId(2));
        resolved(eliminate(&mut r, PlayerId(1)));
        // Partner already gone; nothing more to do on a later elimination
        let report = resolved(eliminate(&mut r, PlayerId(3)));
        assert_eq!(report.eliminated, vec![PlayerId(3)]);
    }

    #[test]
    fn test_revenger_flag_raised() {
        let mut r = roster(5);
        tag(&mut r, PlayerId(2), SpecialRole::Revenger);
        let report = resolved(eliminate(&mut r, PlayerId(2)));
        assert_eq!(report.revenger, Some(PlayerId(2)));

        let revenge = take_revenge(&mut r, PlayerId(2), PlayerId(0));
        assert_eq!(revenge.eliminated, vec![PlayerId(0)]);
        assert!(!r.player(PlayerId(0)).is_alive);
    }

    #[test]
    fn test_revenge_bypasses_protection() {
        let mut r = roster(5);
        tag(&mut r, PlayerId(2), SpecialRole::Revenger);
        give_falafel(&mut r, PlayerId(3), FalafelEffect::Protect);
        resolved(eliminate(&mut r, PlayerId(2)));

        let revenge = take_revenge(&mut r, PlayerId(2), PlayerId(3));
        assert_eq!(revenge.eliminated, vec![PlayerId(3)]);
        assert!(!r.player(PlayerId(3)).falafel.unwrap().used);
    }

    #[test]
    fn test_revenge_target_chains_to_lover_and_ghost() {
        let mut r = roster(7);
        tag(&mut r, PlayerId(0), SpecialRole::Revenger);
        make_lovers(&mut r, PlayerId(3), PlayerId(5));
        tag(&mut r, PlayerId(5), SpecialRole::Ghost);
        resolved(eliminate(&mut r, PlayerId(0)));

        let revenge = take_revenge(&mut r, PlayerId(0), PlayerId(3));
        assert_eq!(revenge.eliminated, vec![PlayerId(3), PlayerId(5)]);
        assert_eq!(revenge.new_ghosts, vec![PlayerId(5)]);
        assert!(r.player(PlayerId(5)).is_ghost);
        assert!(!r.player(PlayerId(5)).is_alive);
    }

    #[test]
    fn test_lover_partner_revenger_raises_flag() {
        let mut r = roster(6);
        make_lovers(&mut r, PlayerId(1), PlayerId(2));
        tag(&mut r, PlayerId(2), SpecialRole::Revenger);
        let report = resolved(eliminate(&mut r, PlayerId(1)));
        assert_eq!(report.eliminated, vec![PlayerId(1), PlayerId(2)]);
        assert_eq!(report.revenger, Some(PlayerId(2)));
    }

    #[test]
    fn test_ghost_conversion() {
        let mut r = roster(4);
        tag(&mut r, PlayerId(3), SpecialRole::Ghost);
        let report = resolved(eliminate(&mut r, PlayerId(3)));
        let ghost = r.player(PlayerId(3));
        assert!(ghost.is_ghost);
        assert!(!ghost.is_alive);
        assert_eq!(report.new_ghosts, vec![PlayerId(3)]);
        assert!(!r.active_ids().contains(&PlayerId(3)));
    }

    #[test]
    fn test_mr_white_primary_gets_guess() {
        let mut r = roster(5);
        r.player_mut(PlayerId(4)).role = Role::MrWhite;
        let report = resolved(eliminate(&mut r, PlayerId(4)));
        assert_eq!(report.mr_white_guess, Some(PlayerId(4)));
    }

    #[test]
    fn test_chained_mr_white_gets_guess() {
        let mut r = roster(6);
        r.player_mut(PlayerId(5)).role = Role::MrWhite;
        make_lovers(&mut r, PlayerId(0), PlayerId(5));
        let report = resolved(eliminate(&mut r, PlayerId(0)));
        assert_eq!(report.mr_white_guess, Some(PlayerId(5)));
    }

    #[test]
    fn test_two_mr_whites_surface_only_the_chained_guess() {
        let mut r = roster(6);
        r.player_mut(PlayerId(0)).role = Role::MrWhite;
        r.player_mut(PlayerId(5)).role = Role::MrWhite;
        make_lovers(&mut r, PlayerId(0), PlayerId(5));
        let report = resolved(eliminate(&mut r, PlayerId(0)));
        assert_eq!(report.mr_white_guess, Some(PlayerId(5)));
    }

    #[test]
    #[should_panic(expected = "already eliminated")]
    fn test_eliminating_dead_player_panics() {
        let mut r = roster(4);
        resolved(eliminate(&mut r, PlayerId(1)));
        eliminate(&mut r, PlayerId(1));
    }

    #[test]
    #[should_panic(expected = "not a fallen revenger")]
    fn test_revenge_without_revenger_panics() {
        let mut r = roster(4);
        take_revenge(&mut r, PlayerId(0), PlayerId(1));
    }
}

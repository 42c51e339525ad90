//! Speaking order for a round and the role-reveal order for a game

use super::player::{PlayerId, Role, Roster};
use super::random::shuffled;
use rand::Rng;

/// Shuffle the active players for one round.
///
/// Mr. White never opens: if the shuffle put one first, position 0 is swapped
/// with the first non-Mr. White further down. No reshuffle.
pub fn round_order<R: Rng + ?Sized>(roster: &Roster, rng: &mut R) -> Vec<PlayerId> {
    let mut order = shuffled(&roster.active_ids(), rng);

    let opens_with_mr_white = order
        .first()
        .is_some_and(|id| roster.player(*id).role == Role::MrWhite);

    if opens_with_mr_white {
        if let Some(swap) = order
            .iter()
            .position(|id| roster.player(*id).role != Role::MrWhite)
        {
            order.swap(0, swap);
        }
    }

    order
}

/// Seats in the order players privately view their cards, starting at
/// `start` and going around the table.
pub fn reveal_order(seats: usize, start: usize) -> Vec<PlayerId> {
    if seats == 0 {
        return Vec::new();
    }
    (0..seats).map(|i| PlayerId((start + i) % seats)).collect()
}

/// Reveal start seat for the given 1-based game number.
pub fn reveal_start(game_number: u32, seats: usize) -> usize {
    if seats == 0 {
        return 0;
    }
    (game_number.saturating_sub(1) as usize) % seats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster_with_mr_whites(size: usize, mr_whites: &[usize]) -> Roster {
        let mut roster = Roster::new(size);
        for seat in mr_whites {
            roster.player_mut(PlayerId(*seat)).role = Role::MrWhite;
        }
        roster
    }

    #[test]
    fn test_mr_white_never_first() {
        let mut rng = StdRng::seed_from_u64(77);
        let roster = roster_with_mr_whites(6, &[0, 3]);
        for _ in 0..1000 {
            let order = round_order(&roster, &mut rng);
            assert_eq!(order.len(), 6);
            assert_ne!(roster.player(order[0]).role, Role::MrWhite);
        }
    }

    #[test]
    fn test_order_skips_dead_and_ghosts() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut roster = Roster::new(5);
        roster.player_mut(PlayerId(1)).is_alive = false;
        {
            let ghost = roster.player_mut(PlayerId(4));
            ghost.is_alive = false;
            ghost.is_ghost = true;
        }
        let mut order = round_order(&roster, &mut rng);
        order.sort();
        assert_eq!(order, vec![PlayerId(0), PlayerId(2), PlayerId(3)]);
    }

    #[test]
    fn test_only_mr_whites_left_keeps_order() {
        let mut rng = StdRng::seed_from_u64(6);
        let roster = roster_with_mr_whites(2, &[0, 1]);
        let order = round_order(&roster, &mut rng);
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_swap_preserves_members() {
        let mut rng = StdRng::seed_from_u64(8);
        let roster = roster_with_mr_whites(4, &[2]);
        for _ in 0..200 {
            let mut order = round_order(&roster, &mut rng);
            order.sort();
            assert_eq!(order, roster.ids());
        }
    }

    #[test]
    fn test_reveal_order_rotates_per_game() {
        assert_eq!(reveal_start(1, 4), 0);
        assert_eq!(reveal_start(2, 4), 1);
        assert_eq!(reveal_start(5, 4), 0);
        assert_eq!(
            reveal_order(4, reveal_start(3, 4)),
            vec![PlayerId(2), PlayerId(3), PlayerId(0), PlayerId(1)]
        );
        assert!(reveal_order(0, 3).is_empty());
    }
}

//! Deterministic deck construction, shuffling, and draw-with-rebuild.

use crate::domain::cards::Card;
use crate::domain::state::GameState;

pub const DECK_SIZE: usize = 45;

/// The 45-card multiset in composition order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for card in Card::ALL {
        for _ in 0..card.copies() {
            deck.push(card);
        }
    }
    deck
}

/// Golden-ratio increment stepping the SplitMix64 counter.
const SHUFFLE_STEP: u64 = 0x9E3779B97F4A7C15;

/// SplitMix64 finalizer: one well-mixed word per counter value.
fn mix(mut z: u64) -> u64 {
    z ^= z >> 30;
    z = z.wrapping_mul(0xBF58476D1CE4E5B9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Map a uniform word onto `0..n` by widening multiply. A 45-card deck
/// needs swap indices of at most 44, so the multiply bias (on the order of
/// n / 2^64) is unobservable here.
fn bounded(x: u64, n: usize) -> usize {
    (((x as u128) * (n as u128)) >> 64) as usize
}

/// Build a freshly shuffled 45-card deck.
///
/// Fisher-Yates driven by a seeded SplitMix64 counter: the game's stored
/// seed fully determines the deal, so rebuilds and preview simulations can
/// replay the exact same order from persisted state alone.
pub fn new_deck(seed: u64) -> Vec<Card> {
    let mut deck = full_deck();
    let mut counter = seed;
    for i in (1..deck.len()).rev() {
        counter = counter.wrapping_add(SHUFFLE_STEP);
        let j = bounded(mix(counter), i + 1);
        deck.swap(i, j);
    }
    deck
}

/// Derive the shuffle seed for the Nth deck rebuild of a game.
///
/// Rebuild 0 is the initial shuffle. Domain separation keeps rebuild N
/// independent of rebuild N+1 while both stay reproducible from the game's
/// base seed, so preview simulations match real draws.
pub fn derive_shuffle_seed(base_seed: u64, epoch: u32) -> u64 {
    if epoch == 0 {
        return base_seed;
    }
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"losiento/deck/v1");
    hasher.update(&base_seed.to_le_bytes());
    hasher.update(&epoch.to_le_bytes());
    let hash = hasher.finalize();
    let bytes: [u8; 8] = hash.as_bytes()[..8]
        .try_into()
        .unwrap_or([0; 8]);
    u64::from_le_bytes(bytes)
}

/// Pop the top card, rebuilding an exhausted deck first.
///
/// A rebuild reshuffles the full composition with the next derived seed and
/// clears the discard pile; by the time the deck empties every card has been
/// discarded, so this is equivalent to reshuffling the discards.
pub fn draw(state: &mut GameState, base_seed: u64) -> Card {
    if state.deck.is_empty() {
        state.deck_epoch += 1;
        state.deck = new_deck(derive_shuffle_seed(base_seed, state.deck_epoch));
        state.discard_pile.clear();
    }
    state.deck.remove(0)
}

/// Append a drawn card to the discard pile.
pub fn discard(state: &mut GameState, card: Card) {
    state.discard_pile.push(card);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::GameResult;

    fn empty_state(deck: Vec<Card>, discard_pile: Vec<Card>) -> GameState {
        GameState {
            turn_number: 0,
            current_seat_index: 0,
            deck,
            discard_pile,
            pawns: Vec::new(),
            winner_seat_index: None,
            result: GameResult::Active,
            deck_epoch: 0,
        }
    }

    #[test]
    fn composition_counts_match_the_rules() {
        let deck = full_deck();
        assert_eq!(deck.len(), 45);
        let count = |c: Card| deck.iter().filter(|&&x| x == c).count();
        assert_eq!(count(Card::One), 5);
        for card in [
            Card::Sorry,
            Card::Two,
            Card::Three,
            Card::Four,
            Card::Five,
            Card::Seven,
            Card::Eight,
            Card::Ten,
            Card::Eleven,
            Card::Twelve,
        ] {
            assert_eq!(count(card), 4, "wrong count for card {card}");
        }
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        assert_eq!(new_deck(12345), new_deck(12345));
        assert_ne!(new_deck(12345), new_deck(54321));
    }

    #[test]
    fn shuffle_preserves_the_multiset() {
        let mut shuffled = new_deck(99);
        let mut reference = full_deck();
        shuffled.sort_by_key(|c| c.as_str());
        reference.sort_by_key(|c| c.as_str());
        assert_eq!(shuffled, reference);
    }

    #[test]
    fn draw_pops_the_top_card() {
        let mut state = empty_state(new_deck(7), Vec::new());
        let expected = state.deck[0];
        let card = draw(&mut state, 7);
        assert_eq!(card, expected);
        assert_eq!(state.deck.len(), 44);
        discard(&mut state, card);
        assert_eq!(state.deck.len() + state.discard_pile.len(), 45);
    }

    #[test]
    fn exhausted_deck_rebuilds_deterministically() {
        let mut discards = full_deck();
        discards.rotate_left(3);
        let mut a = empty_state(Vec::new(), discards.clone());
        let mut b = empty_state(Vec::new(), discards);

        let card_a = draw(&mut a, 42);
        let card_b = draw(&mut b, 42);

        assert_eq!(card_a, card_b);
        assert_eq!(a.deck, b.deck);
        assert_eq!(a.deck_epoch, 1);
        assert!(a.discard_pile.is_empty());
        assert_eq!(a.deck.len() + a.discard_pile.len() + 1, 45);
    }

    #[test]
    fn rebuild_order_differs_from_initial_shuffle() {
        let initial = new_deck(derive_shuffle_seed(42, 0));
        let rebuilt = new_deck(derive_shuffle_seed(42, 1));
        assert_ne!(initial, rebuilt);
    }

    #[test]
    fn derived_seeds_are_stable_and_distinct() {
        assert_eq!(derive_shuffle_seed(1, 1), derive_shuffle_seed(1, 1));
        assert_ne!(derive_shuffle_seed(1, 1), derive_shuffle_seed(1, 2));
        assert_ne!(derive_shuffle_seed(1, 1), derive_shuffle_seed(2, 1));
        assert_eq!(derive_shuffle_seed(9, 0), 9);
    }
}

//! Board geometry: the 60-space loop, slide segments, and per-seat
//! safety-zone paths.
//!
//! Everything here is pure path math. Occupancy, bumping, and legality live
//! in [`crate::domain::moves`].

use crate::domain::state::Position;

pub const NUM_SEATS: usize = 4;
/// Per color: first slide (4) + 5 normal + second slide (5) + 1 normal.
pub const SEGMENT_LEN: u8 = 15;
pub const TRACK_LEN: u8 = 60;
pub const SAFETY_LEN: u8 = 5;
pub const FIRST_SLIDE_LEN: u8 = 4;
pub const SECOND_SLIDE_LEN: u8 = 5;

/// Starting track index of the given seat's color segment.
pub fn segment_offset(seat: u8) -> u8 {
    (seat % NUM_SEATS as u8) * SEGMENT_LEN
}

/// Track index where the seat's first slide begins.
pub fn first_slide_start(seat: u8) -> u8 {
    (segment_offset(seat) + 1) % TRACK_LEN
}

/// Track index where the seat's second slide begins.
pub fn second_slide_start(seat: u8) -> u8 {
    (segment_offset(seat) + 1 + FIRST_SLIDE_LEN + 5) % TRACK_LEN
}

/// Track index at which a forward-moving pawn of this seat diverts into its
/// Safety Zone: the second space of the seat's first slide.
pub fn safety_entry(seat: u8) -> u8 {
    (segment_offset(seat) + 2) % TRACK_LEN
}

/// Track index where a pawn leaving Start is placed: the space immediately
/// after the seat's first slide.
pub fn start_exit(seat: u8) -> u8 {
    (segment_offset(seat) + 5) % TRACK_LEN
}

/// One slide segment of the outer track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    /// Seat whose color segment carries this slide.
    pub owner_seat: u8,
    pub start: u8,
    pub len: u8,
    /// True only for each color's first slide, which passes the owner's
    /// safety entry; the house rule extends it into Safety\[0\] for the owner.
    pub into_safety: bool,
}

impl Slide {
    pub fn end(&self) -> u8 {
        (self.start + self.len - 1) % TRACK_LEN
    }

    /// Ordered track indices covered by the slide, start through end.
    pub fn spaces(&self) -> Vec<u8> {
        (0..self.len).map(|i| (self.start + i) % TRACK_LEN).collect()
    }

    pub fn contains(&self, index: u8) -> bool {
        (0..self.len).any(|i| (self.start + i) % TRACK_LEN == index)
    }
}

/// Slide whose first space is `index`, if any.
pub fn slide_at(index: u8) -> Option<Slide> {
    for seat in 0..NUM_SEATS as u8 {
        if index == first_slide_start(seat) {
            return Some(Slide {
                owner_seat: seat,
                start: index,
                len: FIRST_SLIDE_LEN,
                into_safety: true,
            });
        }
        if index == second_slide_start(seat) {
            return Some(Slide {
                owner_seat: seat,
                start: index,
                len: SECOND_SLIDE_LEN,
                into_safety: false,
            });
        }
    }
    None
}

/// Forward track distance from `from` to `to`, wrapping modulo the loop.
pub fn forward_distance(from: u8, to: u8) -> u8 {
    (to + TRACK_LEN - from) % TRACK_LEN
}

pub fn advance_track(index: u8, steps: u8) -> u8 {
    ((index as u16 + steps as u16) % TRACK_LEN as u16) as u8
}

pub fn retreat_track(index: u8, steps: u8) -> u8 {
    ((index as u16 + TRACK_LEN as u16 - (steps as u16 % TRACK_LEN as u16))
        % TRACK_LEN as u16) as u8
}

/// Raw landing spot of a forward walk, before slide and occupancy rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardLanding {
    /// Lands on the outer track (may still slide).
    Track(u8),
    /// Diverts into the mover's own Safety Zone.
    Safety(u8),
    /// Reaches Home by exact count.
    Home,
}

/// Walk a pawn of `seat` forward `steps` spaces from `pos`.
///
/// Returns every geometric outcome: when the walk passes the seat's own
/// safety entry, the pawn may either divert into Safety (listed first) or
/// stay on the track and pass through. Overshooting Home yields no outcome
/// for that path. Pawns in Start or Home cannot walk forward.
pub fn forward_landings(seat: u8, pos: Position, steps: u8) -> Vec<ForwardLanding> {
    debug_assert!(steps >= 1);
    match pos {
        Position::Start | Position::Home => Vec::new(),
        Position::Safety { index } => {
            let new_index = index + steps;
            if new_index < SAFETY_LEN {
                vec![ForwardLanding::Safety(new_index)]
            } else if new_index == SAFETY_LEN {
                vec![ForwardLanding::Home]
            } else {
                Vec::new()
            }
        }
        Position::Track { index } => {
            let to_entry = forward_distance(index, safety_entry(seat));
            if steps <= to_entry {
                return vec![ForwardLanding::Track(advance_track(index, steps))];
            }
            let mut outcomes = Vec::with_capacity(2);
            let into_safety = steps - to_entry - 1;
            if into_safety < SAFETY_LEN {
                outcomes.push(ForwardLanding::Safety(into_safety));
            } else if into_safety == SAFETY_LEN {
                outcomes.push(ForwardLanding::Home);
            }
            outcomes.push(ForwardLanding::Track(advance_track(index, steps)));
            outcomes
        }
    }
}

/// Walk a pawn of `seat` backward `steps` spaces from `pos`.
///
/// From Safety the pawn exits onto the track through its safety entry and
/// keeps retreating; from the track it wraps the loop. Pawns in Start or
/// Home cannot move backward.
pub fn backward_landing(seat: u8, pos: Position, steps: u8) -> Option<BackwardLanding> {
    debug_assert!(steps >= 1);
    match pos {
        Position::Start | Position::Home => None,
        Position::Track { index } => Some(BackwardLanding::Track(retreat_track(index, steps))),
        Position::Safety { index } => {
            if steps <= index {
                Some(BackwardLanding::Safety(index - steps))
            } else {
                let remaining = steps - (index + 1);
                Some(BackwardLanding::Track(retreat_track(
                    safety_entry(seat),
                    remaining,
                )))
            }
        }
    }
}

/// Raw landing spot of a backward walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackwardLanding {
    Track(u8),
    Safety(u8),
}

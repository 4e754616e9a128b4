use crate::domain::board::*;
use crate::domain::state::Position;

#[test]
fn slide_layout_per_color_segment() {
    for seat in 0..NUM_SEATS as u8 {
        let off = seat * SEGMENT_LEN;
        assert_eq!(first_slide_start(seat), (off + 1) % TRACK_LEN);
        assert_eq!(second_slide_start(seat), (off + 10) % TRACK_LEN);
        assert_eq!(safety_entry(seat), (off + 2) % TRACK_LEN);
        assert_eq!(start_exit(seat), (off + 5) % TRACK_LEN);
    }
}

#[test]
fn slide_at_finds_both_slides_with_correct_lengths() {
    let first = slide_at(first_slide_start(1)).expect("first slide");
    assert_eq!(first.owner_seat, 1);
    assert_eq!(first.len, FIRST_SLIDE_LEN);
    assert!(first.into_safety);
    assert_eq!(first.end(), 19);
    assert_eq!(first.spaces(), vec![16, 17, 18, 19]);

    let second = slide_at(second_slide_start(3)).expect("second slide");
    assert_eq!(second.owner_seat, 3);
    assert_eq!(second.len, SECOND_SLIDE_LEN);
    assert!(!second.into_safety);
    assert_eq!(second.spaces(), vec![55, 56, 57, 58, 59]);

    assert!(slide_at(0).is_none());
    assert!(slide_at(start_exit(0)).is_none());
}

#[test]
fn second_slide_wraps_the_loop_for_seat_three() {
    let slide = slide_at(55).expect("seat 3 second slide");
    assert_eq!(slide.end(), 59);
    assert!(slide.contains(59));
    assert!(!slide.contains(0));
}

#[test]
fn forward_stays_on_track_short_of_the_entry() {
    let landings = forward_landings(0, Position::Track { index: 55 }, 5);
    assert_eq!(landings, vec![ForwardLanding::Track(0)]);

    // Landing exactly on the entry does not divert.
    let landings = forward_landings(0, Position::Track { index: 59 }, 3);
    assert_eq!(landings, vec![ForwardLanding::Track(2)]);
}

#[test]
fn forward_past_the_entry_offers_divert_and_stay() {
    // Entry for seat 0 is track 2; from 59, 4 steps passes it by one.
    let landings = forward_landings(0, Position::Track { index: 59 }, 4);
    assert_eq!(
        landings,
        vec![ForwardLanding::Safety(0), ForwardLanding::Track(3)]
    );

    // Exactly enough to reach Home: 2 -> entry consumed 0 -> safety walk.
    let landings = forward_landings(0, Position::Track { index: 59 }, 9);
    assert_eq!(
        landings,
        vec![ForwardLanding::Home, ForwardLanding::Track(8)]
    );

    // One step further overshoots Home; only the track option remains.
    let landings = forward_landings(0, Position::Track { index: 59 }, 10);
    assert_eq!(landings, vec![ForwardLanding::Track(9)]);
}

#[test]
fn forward_through_safety_requires_exact_count() {
    assert_eq!(
        forward_landings(2, Position::Safety { index: 3 }, 1),
        vec![ForwardLanding::Safety(4)]
    );
    assert_eq!(
        forward_landings(2, Position::Safety { index: 3 }, 2),
        vec![ForwardLanding::Home]
    );
    assert!(forward_landings(2, Position::Safety { index: 3 }, 3).is_empty());
}

#[test]
fn forward_from_start_or_home_yields_nothing() {
    assert!(forward_landings(0, Position::Start, 5).is_empty());
    assert!(forward_landings(0, Position::Home, 1).is_empty());
}

#[test]
fn backward_wraps_the_track() {
    assert_eq!(
        backward_landing(0, Position::Track { index: 2 }, 4),
        Some(BackwardLanding::Track(58))
    );
}

#[test]
fn backward_exits_safety_through_the_entry() {
    // Safety[0] one step back lands on the entry space itself.
    assert_eq!(
        backward_landing(0, Position::Safety { index: 0 }, 1),
        Some(BackwardLanding::Track(2))
    );
    assert_eq!(
        backward_landing(0, Position::Safety { index: 2 }, 1),
        Some(BackwardLanding::Safety(1))
    );
    assert_eq!(
        backward_landing(0, Position::Safety { index: 2 }, 4),
        Some(BackwardLanding::Track(1))
    );
    assert!(backward_landing(0, Position::Start, 1).is_none());
    assert!(backward_landing(0, Position::Home, 1).is_none());
}

#[test]
fn forward_distance_is_cyclic() {
    assert_eq!(forward_distance(58, 2), 4);
    assert_eq!(forward_distance(2, 2), 0);
    assert_eq!(forward_distance(2, 1), 59);
}

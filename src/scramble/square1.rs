//! Square-1 twist sequences.
//!
//! Each layer is twelve 30° slots; a slot is `true` where a piece starts.
//! Corners span two slots and edges one. A `/` is only legal when both
//! layers have piece boundaries at slots 0 and 6.

use rand::Rng;

const SLOTS: usize = 12;
const TWISTS: usize = 13;

type Layer = [bool; SLOTS];

/// Corner, edge, corner, edge... starting at slot 0
fn solved_layer() -> Layer {
    let mut layer = [false; SLOTS];
    for start in [0, 2, 3, 5, 6, 8, 9, 11] {
        layer[start] = true;
    }
    layer
}

fn rotate(layer: &Layer, by: i32) -> Layer {
    let mut out = [false; SLOTS];
    for (i, slot) in out.iter_mut().enumerate() {
        let from = (i as i32 - by).rem_euclid(SLOTS as i32) as usize;
        *slot = layer[from];
    }
    out
}

fn sliceable(layer: &Layer) -> bool {
    layer[0] && layer[6]
}

/// Turns the right half of both layers 180° about the slice axis.
fn slash(top: &Layer, bottom: &Layer) -> (Layer, Layer) {
    let mut new_top = *top;
    let mut new_bottom = *bottom;
    for j in 0..6 {
        // a boundary at offset k inside the half lands at 6 - k
        let from = (6 - j) % 6;
        new_top[j] = bottom[from];
        new_bottom[j] = top[from];
    }
    (new_top, new_bottom)
}

pub(super) fn scramble<R: Rng>(rng: &mut R) -> String {
    let mut top = solved_layer();
    let mut bottom = solved_layer();
    let mut twists = Vec::with_capacity(TWISTS);

    while twists.len() < TWISTS {
        let candidates: Vec<(i32, i32)> = (-5..=6)
            .flat_map(|u| (-5..=6).map(move |d| (u, d)))
            .filter(|&(u, d)| (u, d) != (0, 0))
            .filter(|&(u, d)| sliceable(&rotate(&top, u)) && sliceable(&rotate(&bottom, d)))
            .collect();
        let (u, d) = candidates[rng.gen_range(0..candidates.len())];

        let (t, b) = slash(&rotate(&top, u), &rotate(&bottom, d));
        top = t;
        bottom = b;
        twists.push(format!("({u},{d}) /"));
    }

    twists.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn pieces(layer: &Layer) -> usize {
        layer.iter().filter(|s| **s).count()
    }

    #[test]
    fn solved_layer_is_sliceable() {
        assert!(sliceable(&solved_layer()));
        assert!(!sliceable(&rotate(&solved_layer(), 2)));
        assert!(sliceable(&rotate(&solved_layer(), 3)));
    }

    #[test]
    fn slash_preserves_piece_count() {
        let top = solved_layer();
        let bottom = rotate(&solved_layer(), 3);
        let (t, b) = slash(&top, &bottom);
        assert_eq!(pieces(&t) + pieces(&b), 16);
        assert!(sliceable(&t) && sliceable(&b));
    }

    #[test]
    fn thirteen_twists() {
        let mut rng = StdRng::seed_from_u64(12);
        let s = scramble(&mut rng);
        assert_eq!(s.matches('/').count(), 13);
        assert!(s.starts_with('('));
        assert!(!s.contains("(0,0)"));
    }
}

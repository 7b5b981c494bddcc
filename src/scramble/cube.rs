use rand::Rng;

const FACES: [[&str; 2]; 3] = [["U", "D"], ["R", "L"], ["F", "B"]];
const SUFFIXES: [&str; 3] = ["", "'", "2"];

pub(super) fn length_for(size: usize) -> usize {
    match size {
        2 => 11,
        3 => 20,
        n => (n - 2) * 20,
    }
}

/// Random-move NxN scramble.
///
/// Turns on one axis commute, so within a run of same-axis turns each
/// (face, depth) layer appears at most once.
pub(super) fn scramble<R: Rng>(rng: &mut R, size: usize) -> String {
    let len = length_for(size);
    let max_depth = (size / 2).max(1);
    let mut moves = Vec::with_capacity(len);
    let mut last_axis = None;
    let mut run: Vec<(usize, usize)> = Vec::new();

    while moves.len() < len {
        let axis = rng.gen_range(0..3);
        let face = rng.gen_range(0..2);
        // on even cubes the deepest turn from the far side mirrors a near one
        let face_depth = if size % 2 == 0 && face == 1 {
            (max_depth - 1).max(1)
        } else {
            max_depth
        };
        let depth = rng.gen_range(1..=face_depth);

        if last_axis != Some(axis) {
            run.clear();
            last_axis = Some(axis);
        }
        if run.contains(&(face, depth)) {
            continue;
        }
        run.push((face, depth));

        let letter = FACES[axis][face];
        let suffix = SUFFIXES[rng.gen_range(0..SUFFIXES.len())];
        moves.push(match depth {
            1 => format!("{letter}{suffix}"),
            2 => format!("{letter}w{suffix}"),
            d => format!("{d}{letter}w{suffix}"),
        });
    }

    moves.join(" ")
}

use rand::Rng;

/// Picks `len` faces from `faces`, never the same one twice in a row.
fn random_faces<R: Rng>(rng: &mut R, faces: &[&'static str], len: usize) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::with_capacity(len);
    while out.len() < len {
        let face = faces[rng.gen_range(0..faces.len())];
        if out.last() != Some(&face) {
            out.push(face);
        }
    }
    out
}

fn with_direction<R: Rng>(rng: &mut R, face: &str) -> String {
    if rng.gen_bool(0.5) {
        face.to_string()
    } else {
        format!("{face}'")
    }
}

pub(super) fn pyraminx<R: Rng>(rng: &mut R) -> String {
    let mut moves: Vec<String> = random_faces(rng, &["U", "L", "R", "B"], 11)
        .into_iter()
        .map(|face| with_direction(rng, face))
        .collect();

    for tip in ["u", "l", "r", "b"] {
        match rng.gen_range(0..3) {
            0 => {}
            1 => moves.push(tip.to_string()),
            _ => moves.push(format!("{tip}'")),
        }
    }
    moves.join(" ")
}

pub(super) fn skewb<R: Rng>(rng: &mut R) -> String {
    random_faces(rng, &["R", "U", "L", "B"], 11)
        .into_iter()
        .map(|face| with_direction(rng, face))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Seven lines of ten `R`/`D` moves, each closed by a `U` turn.
pub(super) fn megaminx<R: Rng>(rng: &mut R) -> String {
    let mut lines = Vec::with_capacity(7);
    for _ in 0..7 {
        let mut line = Vec::with_capacity(11);
        let mut last_d_up = true;
        for i in 0..10 {
            let up = rng.gen_bool(0.5);
            let face = if i % 2 == 0 { "R" } else { "D" };
            line.push(format!("{face}{}", if up { "++" } else { "--" }));
            if face == "D" {
                last_d_up = up;
            }
        }
        line.push(if last_d_up { "U" } else { "U'" }.to_string());
        lines.push(line.join(" "));
    }
    lines.join("\n")
}

fn dial(turn: i32) -> String {
    if turn >= 0 {
        format!("{turn}+")
    } else {
        format!("{}-", -turn)
    }
}

/// WCA clock notation: front pin settings, `y2`, back settings, then the
/// pins left up.
pub(super) fn clock<R: Rng>(rng: &mut R) -> String {
    let mut moves = Vec::with_capacity(18);
    for pin in ["UR", "DR", "DL", "UL", "U", "R", "D", "L", "ALL"] {
        moves.push(format!("{pin}{}", dial(rng.gen_range(-5..=6))));
    }
    moves.push("y2".to_string());
    for pin in ["U", "R", "D", "L", "ALL"] {
        moves.push(format!("{pin}{}", dial(rng.gen_range(-5..=6))));
    }
    for pin in ["UR", "DR", "DL", "UL"] {
        if rng.gen_bool(0.5) {
            moves.push(pin.to_string());
        }
    }
    moves.join(" ")
}

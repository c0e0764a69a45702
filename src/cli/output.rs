//! Output formatting for CLI

use shakmaty::fen::Fen;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Side to move and fullmove number, the two things move text numbering
/// depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveClock {
    pub white_to_move: bool,
    pub fullmove: u32,
}

impl MoveClock {
    /// Read the clock from a FEN, or `None` if `position` is not one.
    pub fn from_fen(position: &str) -> Option<Self> {
        let setup = position.trim().parse::<Fen>().ok()?.into_setup();
        Some(Self {
            white_to_move: setup.turn.is_white(),
            fullmove: setup.fullmoves.get(),
        })
    }

    /// Clock for a game that started from a white-to-move first move, `ply`
    /// half-moves in.
    pub fn from_ply(ply: u32) -> Self {
        Self {
            white_to_move: ply.is_multiple_of(2),
            fullmove: ply / 2 + 1,
        }
    }

    /// Prefer the position's own clock, falling back to counting plies.
    pub fn for_position(position: &str, ply: u32) -> Self {
        Self::from_fen(position).unwrap_or_else(|| Self::from_ply(ply))
    }

    fn advance(&mut self) {
        if !self.white_to_move {
            self.fullmove += 1;
        }
        self.white_to_move = !self.white_to_move;
    }
}

/// Render a line of play as numbered move text, e.g. `1. e4 e5 2. Nf3`.
///
/// `clock` is the position the first move in `sans` is played from.
pub fn format_line<S: AsRef<str>>(mut clock: MoveClock, sans: &[S]) -> String {
    let mut out = String::new();
    for (offset, san) in sans.iter().enumerate() {
        if !out.is_empty() {
            out.push(' ');
        }
        if clock.white_to_move {
            out.push_str(&format!("{}. ", clock.fullmove));
        } else if offset == 0 {
            out.push_str(&format!("{}... ", clock.fullmove));
        }
        out.push_str(san.as_ref());
        clock.advance();
    }
    out
}

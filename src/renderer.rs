use colored::{Color, Colorize};

use crate::gameplay::GameEngine;
use crate::model::BoxPiece;

/// Terminal colors for the box palette, indexed by color id. The first four
/// mirror the classic deal (green, red, yellow, magenta).
pub const BOX_COLORS: [Color; 8] = [
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Cyan,
    Color::White,
    Color::BrightBlack,
];

/// Renders the engine's snapshot as colored text columns. Purely a
/// presentation collaborator: it reads state and never mutates it.
#[derive(Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_game(&self, engine: &GameEngine) -> String {
        let containers = engine.get_containers();
        let height = containers
            .iter()
            .map(|c| c.get_capacity())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for level in (0..height).rev() {
            for container in containers {
                let selected = engine
                    .get_selection()
                    .is_some_and(|s| {
                        s.container_id == container.get_id() && s.indices.contains(&level)
                    });
                out.push_str(&self.render_cell(
                    container.get_boxes().get(level),
                    level < container.get_capacity(),
                    selected,
                ));
            }
            out.push('\n');
        }
        for container in containers {
            let completed = engine
                .get_completed_containers()
                .contains(&container.get_id());
            let label = format!("{}{}", container.get_id(), if completed { '*' } else { ' ' });
            out.push_str(&format!("{label:^4}"));
        }
        out.push('\n');

        let budget = engine.get_config().max_take_backs - engine.get_take_backs_used();
        out.push_str(&format!(
            "mode: {}   take-backs left: {}\n",
            if engine.is_hard_mode() { "hard" } else { "normal" },
            budget
        ));
        if engine.is_game_complete() {
            out.push_str("all colors sorted!\n");
        }
        out
    }

    fn render_cell(&self, piece: Option<&BoxPiece>, in_capacity: bool, selected: bool) -> String {
        let glyph = match piece {
            Some(piece) if piece.is_hidden() => "?".bright_black().to_string(),
            Some(piece) => {
                let color = BOX_COLORS[piece.get_color_id() % BOX_COLORS.len()];
                piece.get_letter_representation().to_string().color(color).bold().to_string()
            }
            None if in_capacity => ".".to_string(),
            None => " ".to_string(),
        };
        if selected {
            format!(" [{glyph}]")
        } else {
            format!("  {glyph} ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::EngineConfig;
    use crate::model::Board;

    #[test]
    fn renders_ids_and_footer() {
        colored::control::set_override(false);
        let mut engine = GameEngine::with_seed(EngineConfig::default(), 1);
        engine.load_board(Board::new_from_repr("AAAA;B...;...."));
        let text = Renderer::new().render_game(&engine);
        assert!(text.contains("1*"));
        assert!(text.contains("take-backs left: 3"));
        assert!(text.contains("mode: normal"));
    }
}

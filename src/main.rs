use std::io::{self, BufRead, Write};

use box_sort::gameplay::{EngineConfig, GameEngine};
use box_sort::renderer::Renderer;

fn main() {
    let mut engine = GameEngine::new(EngineConfig::default());
    let renderer = Renderer::new();
    let stdin = io::stdin();

    println!("box sort — click a container by number, u = undo, n = new game, h = hard mode, q = quit");
    loop {
        print!("{}", renderer.render_game(&engine));
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        match line.trim() {
            "q" => break,
            "n" => engine.new_game(engine.is_hard_mode()),
            "h" => engine.toggle_hard_mode(),
            "u" => {
                let outcome = engine.undo();
                if let Some(token) = outcome.pending_undo {
                    // No animation delay on a terminal; settle right away.
                    engine.settle(token);
                } else {
                    println!("nothing to undo");
                }
            }
            input => {
                if let Ok(id) = input.parse::<usize>() {
                    let outcome = engine.handle_container_click(id);
                    if let Some(token) = outcome.pending_move {
                        engine.settle(token);
                    }
                }
            }
        }
    }
}

//! Terminal hint board.
//!
//! Reads commands from stdin, plays them through the rules engine and asks a
//! UCI engine for hints and analysis.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use hintboard::config::HintConfig;
use hintboard::engine::{ChessRules, TextBoard, UciEngine};
use hintboard::session::{Hint, Session, SessionBuilder, Status, SuggestionSource};
use tracing::info;

type HintSession = Session<ChessRules, TextBoard, UciEngine>;

const HELP: &str = "\
commands:
  move <from><to>[q|r|b|n]  play a move, e.g. move e2e4
  hint                      highlight the engine's best move
  analyze                   evaluation and top moves
  play                      let the engine move
  auto [n]                  engine plays both sides for n plies (default 20)
  history                   move list
  save | games | load <n>   saved games
  reset | board | flip | help | quit";

/// Parse `--engine <path>` from CLI args
fn parse_engine_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--engine")
        .and_then(|i| args.get(i + 1).cloned())
}

fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = HintConfig::from_env();
    if let Some(path) = parse_engine_arg() {
        config.engine_path = path;
    }
    info!(engine = %config.engine_path, save_dir = %config.save_dir.display(), "Config loaded");

    // Without an engine there is nothing to hint with
    let engine = UciEngine::new(&config.engine_path)
        .with_context(|| format!("starting engine at {}", config.engine_path))?;

    let mut session = SessionBuilder::with_config(&config)
        .rules(ChessRules::new())
        .display(TextBoard::new())
        .search(engine)
        .build()?;

    println!("{}", session.display().render());
    println!("{HELP}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else { continue };
        let arg = parts.next();

        match cmd {
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "board" => println!("{}", session.display().render()),
            "flip" => {
                session.display_mut().flip();
                println!("{}", session.display().render());
            }
            "move" => play_user_move(&mut session, arg),
            "hint" => show_hint(&mut session),
            "analyze" => match session.analyze(config.top_moves) {
                Ok(analysis) => {
                    println!("{}", session.display().render());
                    println!("{}", analysis.evaluation);
                    for line in &analysis.top_moves {
                        println!("  {line}");
                    }
                }
                Err(e) => println!("Analysis error: {e}"),
            },
            "play" => match session.play_engine_move() {
                Ok(Some(record)) => {
                    println!("Engine played {}", record.san);
                    println!("{}", session.display().render());
                }
                Ok(None) => println!("No move to make"),
                Err(e) => println!("Engine error: {e}"),
            },
            "auto" => {
                let plies = arg.and_then(|a| a.parse().ok()).unwrap_or(20);
                match session.auto_play(plies, config.auto_play_delay) {
                    Ok(played) => {
                        println!("Auto-play made {} moves", played.len());
                        println!("{}", session.display().render());
                    }
                    Err(e) => println!("Auto-play error: {e}"),
                }
            }
            "history" => println!("{}", session.move_history()),
            "reset" => {
                session.reset();
                println!("{}", session.display().render());
            }
            "save" => match session.save_game() {
                Ok(index) => println!("Game saved as #{}", index + 1),
                Err(e) => println!("Error saving game: {e}"),
            },
            "games" => {
                let games = session.saved_games();
                if games.is_empty() {
                    println!("No saved games yet.");
                }
                for (i, game) in games.iter().enumerate() {
                    println!("{}", game.label(i));
                }
            }
            "load" => {
                // Games are listed from 1
                let index = arg.and_then(|a| a.parse::<usize>().ok()).filter(|n| *n > 0);
                match index {
                    Some(n) => match session.load_game(n - 1) {
                        Ok(_) => println!("{}", session.display().render()),
                        Err(e) => println!("Error loading game: {e}"),
                    },
                    None => println!("usage: load <n>"),
                }
            }
            other => println!("Unknown command '{other}'; try help"),
        }
        io::stdout().flush()?;
    }

    Ok(())
}

fn play_user_move(session: &mut HintSession, arg: Option<&str>) {
    let Some(mv) = arg.and_then(hintboard::engine::uci::parse_uci_move) else {
        println!("usage: move e2e4");
        return;
    };
    match session.try_move_with(mv.get_source(), mv.get_dest(), mv.get_promotion()) {
        Some(record) => {
            println!("{}", record.san);
            println!("{}", session.display().render());
        }
        None => println!("Illegal move"),
    }
}

fn show_hint(session: &mut HintSession) {
    let hint = session.show_best_move(|status| match status {
        Status::Thinking => println!("Engine thinking..."),
        Status::Done => {}
    });
    match hint {
        Hint::GameOver => println!("Game is over - no moves to make"),
        Hint::Suggested(s) => {
            println!("{}", session.display().render());
            let label = match s.source {
                SuggestionSource::Engine => "Best move",
                SuggestionSource::Cache => "Best move (cached)",
                SuggestionSource::RandomFallback => "Suggested move",
            };
            print!("{label}: {} to {}", s.from, s.to);
            match s.evaluation {
                Some(eval) => println!(" | {eval}"),
                None => println!(),
            }
        }
    }
}

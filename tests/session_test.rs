//! Session command handlers driven with scripted search engines.

mod common;

use std::time::Duration;

use chess::{Color, Square};
use common::{
    session, session_at, start_fen, FirstLegalSearch, ScriptedSearch, BARE_KINGS_FEN,
    MATE_IN_ONE_FEN,
};
use hintboard::engine::{Mark, RulesEngine, ScoredMove};
use hintboard::session::{Hint, Status, Suggestion, SuggestionSource};
use hintboard_core::codec::{encode, PackedMove};

fn suggestion(hint: Hint) -> Suggestion {
    match hint {
        Hint::Suggested(s) => s,
        Hint::GameOver => panic!("expected a suggestion, got GameOver"),
    }
}

fn is_legal(s: &Suggestion, moves: &[chess::ChessMove]) -> bool {
    moves
        .iter()
        .any(|m| m.get_source() == s.from && m.get_dest() == s.to)
}

#[test]
fn test_hint_highlights_engine_move() {
    let mut session = session(ScriptedSearch::playing(Square::E2, Square::E4, 150));

    let mut statuses = Vec::new();
    let s = suggestion(session.show_best_move(|st| statuses.push(st)));

    assert_eq!(statuses, vec![Status::Thinking, Status::Done]);
    assert_eq!((s.from, s.to), (Square::E2, Square::E4));
    assert_eq!(s.source, SuggestionSource::Engine);
    assert_eq!(s.evaluation.as_deref(), Some("Evaluation: +1.5 (White is better)"));

    assert_eq!(session.highlighted(), Some((Square::E2, Square::E4)));
    assert_eq!(
        session.display().marks(),
        vec![(Square::E2, Mark::Source), (Square::E4, Mark::Destination)]
    );

    let search = session.search();
    assert_eq!(search.positions.last(), Some(&start_fen()));
    assert_eq!(search.budget, Some(3));
}

#[test]
fn test_repeat_hint_uses_cache() {
    let mut session = session(ScriptedSearch::playing(Square::G1, Square::F3, -30));

    let first = suggestion(session.show_best_move(|_| {}));
    let second = suggestion(session.show_best_move(|_| {}));

    assert_eq!(first.source, SuggestionSource::Engine);
    assert_eq!(second.source, SuggestionSource::Cache);
    assert_eq!((second.from, second.to), (Square::G1, Square::F3));
    assert_eq!(second.evaluation, first.evaluation);
    assert_eq!(session.search().searches, 1);
    assert_eq!(session.cached_positions(), 1);
}

#[test]
fn test_move_clears_highlight_and_cache() {
    let mut session = session(ScriptedSearch::playing(Square::E2, Square::E4, 20));
    session.show_best_move(|_| {});
    assert!(session.highlighted().is_some());

    let record = session.try_move(Square::E2, Square::E4).unwrap();
    assert_eq!(record.san, "e4");
    assert_eq!(session.highlighted(), None);
    assert!(session.display().marks().is_empty());
    assert_eq!(session.cached_positions(), 0);
    assert_eq!(session.rules().current_turn(), Color::Black);
}

#[test]
fn test_illegal_move_keeps_state() {
    let mut session = session(ScriptedSearch::default());
    assert!(session.try_move(Square::E2, Square::E5).is_none());
    assert_eq!(session.rules().position_string(), start_fen());
    assert_eq!(session.move_history(), "");
}

#[test]
fn test_out_of_range_move_falls_back_to_random_legal() {
    // Source index 100 is off the board
    let mut session = session(ScriptedSearch::raw(100 | (36 << 7)));
    let legal = session.rules().legal_moves();

    let s = suggestion(session.show_best_move(|_| {}));
    assert_eq!(s.source, SuggestionSource::RandomFallback);
    assert!(is_legal(&s, &legal));
    assert_eq!(s.evaluation.as_deref(), Some("Material is even"));
    assert_eq!(session.highlighted(), Some((s.from, s.to)));
}

#[test]
fn test_illegal_engine_move_falls_back() {
    let mut session = session(ScriptedSearch::playing(Square::E2, Square::E5, 0));
    let legal = session.rules().legal_moves();

    let s = suggestion(session.show_best_move(|_| {}));
    assert_eq!(s.source, SuggestionSource::RandomFallback);
    assert!(is_legal(&s, &legal));
}

#[test]
fn test_illegal_engine_move_is_not_cached() {
    let mut session = session(ScriptedSearch::playing(Square::E2, Square::E5, 0));

    let first = suggestion(session.show_best_move(|_| {}));
    let second = suggestion(session.show_best_move(|_| {}));

    assert_eq!(first.source, SuggestionSource::RandomFallback);
    assert_eq!(second.source, SuggestionSource::RandomFallback);
    assert_eq!(session.search().searches, 2);
    assert_eq!(session.cached_positions(), 0);
}

#[test]
fn test_search_failure_falls_back() {
    let mut session = session(ScriptedSearch::failing());
    let legal = session.rules().legal_moves();

    let mut statuses = Vec::new();
    let s = suggestion(session.show_best_move(|st| statuses.push(st)));
    assert_eq!(statuses, vec![Status::Thinking, Status::Done]);
    assert_eq!(s.source, SuggestionSource::RandomFallback);
    assert!(is_legal(&s, &legal));
    assert_eq!(session.cached_positions(), 0);
}

#[test]
fn test_no_hint_when_game_over() {
    let mut session = session_at(MATE_IN_ONE_FEN, ScriptedSearch::playing(Square::H5, Square::F7, 0));
    session.try_move(Square::H5, Square::F7).unwrap();
    assert!(session.rules().is_game_over());

    let mut statuses = Vec::new();
    let hint = session.show_best_move(|st| statuses.push(st));
    assert_eq!(hint, Hint::GameOver);
    assert_eq!(statuses, vec![Status::Thinking, Status::Done]);
    assert_eq!(session.highlighted(), None);
    assert!(session.try_move(Square::E8, Square::E7).is_none());
}

#[test]
fn test_latest_highlight_wins() {
    let mut session = session(ScriptedSearch::playing(Square::E2, Square::E4, 0));
    session.analyze(1).unwrap();
    assert_eq!(session.highlighted(), Some((Square::E2, Square::E4)));

    session.search_mut().best = encode(Square::D2, Square::D4);
    session.analyze(1).unwrap();
    assert_eq!(session.highlighted(), Some((Square::D2, Square::D4)));
    assert_eq!(
        session.display().marks(),
        vec![(Square::D2, Mark::Source), (Square::D4, Mark::Destination)]
    );
}

#[test]
fn test_analyze_lists_top_moves() {
    let mut search = ScriptedSearch::playing(Square::E2, Square::E4, 30);
    search.top = vec![
        ScoredMove { mv: encode(Square::E2, Square::E4), score: 30 },
        ScoredMove { mv: PackedMove(127), score: 10 },
        ScoredMove { mv: encode(Square::G1, Square::F3), score: -5 },
    ];
    let mut session = session(search);

    let analysis = session.analyze(3).unwrap();
    assert_eq!(analysis.score, 30);
    assert_eq!(analysis.evaluation, "Evaluation: +0.3 (Even)");
    assert_eq!(analysis.top_moves, vec!["1. e2e4 (+0.3)", "3. g1f3 (-0.1)"]);
    assert_eq!(analysis.best.map(|m| m.to_string()).as_deref(), Some("e2e4"));
}

#[test]
fn test_analyze_reports_engine_failure() {
    let mut session = session(ScriptedSearch::failing());
    assert!(session.analyze(3).is_err());
    assert_eq!(session.highlighted(), None);
}

#[test]
fn test_engine_move_stays_highlighted() {
    let mut session = session(ScriptedSearch::playing(Square::E2, Square::E4, 0));
    let record = session.play_engine_move().unwrap().unwrap();

    assert_eq!(record.san, "e4");
    assert_eq!(session.rules().current_turn(), Color::Black);
    assert_eq!(session.highlighted(), Some((Square::E2, Square::E4)));
    assert_eq!(
        session.display().marks(),
        vec![(Square::E2, Mark::Source), (Square::E4, Mark::Destination)]
    );
}

#[test]
fn test_bare_kings_end_the_game() {
    let mut session = session_at(BARE_KINGS_FEN, FirstLegalSearch::default());
    assert!(session.rules().is_game_over());

    assert_eq!(session.show_best_move(|_| {}), Hint::GameOver);
    assert!(session.auto_play(10, Duration::ZERO).unwrap().is_empty());
    assert!(session.try_move(Square::E1, Square::E2).is_none());
}

#[test]
fn test_auto_play_alternates_sides() {
    let mut session = session(FirstLegalSearch::default());
    let played = session.auto_play(4, Duration::ZERO).unwrap();

    assert_eq!(played.len(), 4);
    let colors: Vec<Color> = played.iter().map(|r| r.color).collect();
    assert_eq!(colors, vec![Color::White, Color::Black, Color::White, Color::Black]);
    assert_eq!(session.rules().history().len(), 4);
}

#[test]
fn test_auto_play_stops_at_mate() {
    let mut session = session_at(MATE_IN_ONE_FEN, ScriptedSearch::playing(Square::H5, Square::F7, 0));
    let played = session.auto_play(5, Duration::ZERO).unwrap();

    assert_eq!(played.len(), 1);
    assert_eq!(played[0].san, "Qxf7#");
    assert!(session.rules().is_game_over());
    assert_eq!(session.highlighted(), Some((Square::H5, Square::F7)));
}

#[test]
fn test_move_history_transcript() {
    let mut session = session(ScriptedSearch::default());
    session.try_move(Square::E2, Square::E4).unwrap();
    session.try_move(Square::E7, Square::E5).unwrap();
    session.try_move(Square::G1, Square::F3).unwrap();
    assert_eq!(session.move_history(), "1. e4 e5 2. Nf3");
}

#[test]
fn test_save_reset_and_load() {
    let mut session = session(ScriptedSearch::default());
    session.try_move(Square::E2, Square::E4).unwrap();
    session.try_move(Square::E7, Square::E5).unwrap();
    let saved_fen = session.rules().position_string();

    assert_eq!(session.save_game().unwrap(), 0);
    session.reset();
    assert_eq!(session.rules().position_string(), start_fen());

    let record = session.load_game(0).unwrap();
    assert_eq!(record.fen, saved_fen);
    assert_eq!(record.pgn, "1. e4 e5");
    assert_eq!(session.rules().position_string(), saved_fen);
    assert_eq!(session.search().positions.last(), Some(&saved_fen));
    assert_eq!(session.highlighted(), None);

    assert_eq!(session.saved_games().len(), 1);
    assert!(session.load_game(1).is_err());
}

#[test]
fn test_load_updates_board_when_engine_rejects_position() {
    let mut session = session(ScriptedSearch::default());
    session.try_move(Square::E2, Square::E4).unwrap();
    let saved_fen = session.rules().position_string();
    session.save_game().unwrap();
    session.reset();
    session.show_best_move(|_| {});
    assert!(session.highlighted().is_some());

    session.search_mut().reject_positions = true;
    assert!(session.load_game(0).is_err());

    assert_eq!(session.rules().position_string(), saved_fen);
    assert!(session.display().render().trim_end().ends_with("Black to move"));
    assert_eq!(session.highlighted(), None);
    assert_eq!(session.cached_positions(), 0);
}

use std::time::{Duration, Instant};

use solitaire_gym::adapter::{EngineConfig, EngineError, EngineSession, SessionState, StepOutcome};
use solitaire_gym::core::{DecodeError, DumpLayout, LineKind};
use solitaire_gym::types::ActionId;

fn fixture_config(args: &[&str]) -> EngineConfig {
    let mut config = EngineConfig::new(env!("CARGO_BIN_EXE_fixture-engine"));
    config.args = args.iter().map(|s| s.to_string()).collect();
    config.read_timeout = Duration::from_secs(5);
    config
}

fn draw() -> ActionId {
    ActionId::new(0).unwrap()
}

async fn started(args: &[&str]) -> EngineSession {
    let mut session = EngineSession::start(fixture_config(args)).await.expect("spawn fixture");
    session.initial_turn().await.expect("initial turn");
    session
}

#[tokio::test]
async fn initial_turn_is_opening_deal() {
    let mut session = EngineSession::start(fixture_config(&[])).await.unwrap();
    assert_eq!(session.state(), SessionState::NotStarted);

    let turn = session.initial_turn().await.unwrap();
    assert_eq!(session.state(), SessionState::Running);

    assert_eq!(turn.board.draw_hidden, 24);
    assert!(turn.board.draw.is_empty());
    assert!(turn.board.waste.is_empty());
    for (i, pile) in turn.board.tableau.iter().enumerate() {
        assert_eq!(pile.face_down as usize, i);
        assert_eq!(pile.face_up.len(), 1);
    }
    assert!(turn.board.foundations.iter().all(|f| f.is_empty()));
    assert!(turn.legal.contains(draw()));
    assert!(!turn.is_terminal());
    assert_eq!(session.last_turn(), Some(&turn));

    session.close().await;
}

#[tokio::test]
async fn draw_moves_one_card_to_waste() {
    let mut session = started(&[]).await;

    let outcome = session.step(draw()).await.unwrap();
    let turn = match outcome {
        StepOutcome::Turn(turn) => turn,
        StepOutcome::Terminal(_) => panic!("opening draw should not end the game"),
    };
    assert_eq!(turn.board.draw_hidden, 23);
    assert_eq!(turn.board.waste.len(), 1);
    assert_eq!(session.steps(), 1);

    session.close().await;
}

#[tokio::test]
async fn out_of_range_id_is_recoverable() {
    let mut session = started(&["--crash-on-illegal"]).await;

    match session.step_raw(615).await {
        Err(EngineError::ActionIdOutOfRange(615)) => {}
        other => panic!("expected ActionIdOutOfRange, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(session.steps(), 0);

    let outcome = session.step_raw(0).await.unwrap();
    assert!(!outcome.is_terminal());
    session.close().await;
}

#[tokio::test]
async fn illegal_id_is_refused_before_reaching_engine() {
    // The fixture exits on any illegal id it receives.
    let mut session = started(&["--crash-on-illegal"]).await;
    let legal = session.last_turn().unwrap().legal.clone();
    let illegal = ActionId::all().find(|id| !legal.contains(*id)).unwrap();

    let err = session.step(illegal).await.unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(id) if id == illegal));
    assert!(err.is_recoverable());
    assert_eq!(session.state(), SessionState::Running);

    session.step(draw()).await.unwrap();
    session.close().await;
}

#[tokio::test]
async fn unenforced_illegal_id_reaches_engine() {
    let mut config = fixture_config(&["--crash-on-illegal"]);
    config.enforce_legal = false;
    let mut session = EngineSession::start(config).await.unwrap();
    let turn = session.initial_turn().await.unwrap();
    let illegal = ActionId::all().find(|id| !turn.legal.contains(*id)).unwrap();

    match session.step(illegal).await {
        Err(EngineError::ProcessExited { code }) => assert_eq!(code, Some(3)),
        other => panic!("expected ProcessExited, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Crashed);
}

#[tokio::test]
async fn step_after_engine_exit_does_not_block() {
    let mut session = started(&["--exit-after", "1"]).await;
    session.step(draw()).await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(2), session.step(draw()))
        .await
        .expect("step after exit blocked")
        .unwrap_err();
    assert!(matches!(err, EngineError::ProcessExited { code: Some(0) }), "{:?}", err);
    assert!(!err.is_recoverable());

    let start = Instant::now();
    let again = session.step(draw()).await.unwrap_err();
    assert!(matches!(again, EngineError::ProcessExited { .. }));
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn engine_exiting_before_first_step() {
    let mut session = started(&["--exit-after", "0"]).await;
    let err = session.step(draw()).await.unwrap_err();
    assert!(matches!(err, EngineError::ProcessExited { .. }), "{:?}", err);
    assert_eq!(session.state(), SessionState::Crashed);
}

#[tokio::test]
async fn truncated_turn_is_protocol_desync() {
    let mut session = started(&["--truncate-after", "1"]).await;

    match session.step(draw()).await {
        Err(EngineError::Decode(DecodeError::ProtocolDesync { read, expected })) => {
            assert_eq!(read, 7);
            assert_eq!(expected, 14);
        }
        other => panic!("expected ProtocolDesync, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Crashed);
    assert!(matches!(
        session.step(draw()).await,
        Err(EngineError::ProcessExited { .. })
    ));
}

#[tokio::test]
async fn malformed_token_mid_session_is_fatal() {
    let mut session = started(&["--garble-after", "1"]).await;

    match session.step(draw()).await {
        Err(EngineError::Decode(DecodeError::MalformedToken { line, kind, token, .. })) => {
            assert_eq!(line, 1);
            assert_eq!(kind, LineKind::Waste);
            assert_eq!(token, "52");
        }
        other => panic!("expected MalformedToken, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Crashed);

    let err = tokio::time::timeout(Duration::from_secs(1), session.step(draw()))
        .await
        .expect("step after a fatal decode error blocked")
        .unwrap_err();
    assert!(matches!(err, EngineError::ProcessExited { .. }), "{:?}", err);
}

#[tokio::test]
async fn stalled_engine_times_out_and_is_killed() {
    let mut config = fixture_config(&["--stall-after", "1"]);
    config.read_timeout = Duration::from_millis(300);
    let mut session = EngineSession::start(config).await.unwrap();
    session.initial_turn().await.unwrap();

    let start = Instant::now();
    match session.step(draw()).await {
        Err(EngineError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(300)),
        other => panic!("expected Timeout, got {:?}", other),
    }
    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(session.state(), SessionState::Crashed);
}

#[tokio::test]
async fn empty_legal_set_is_terminal() {
    let mut session = started(&["--terminal-after", "2"]).await;

    let first = session.step(draw()).await.unwrap();
    assert!(!first.is_terminal());

    let second = session.step(draw()).await.unwrap();
    assert!(second.is_terminal());
    assert!(second.turn().legal.is_empty());
    assert!(second.turn().is_terminal());

    // Nothing is legal on a terminal turn.
    let err = session.step(draw()).await.unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
    assert_eq!(session.state(), SessionState::Running);
    session.close().await;
}

#[tokio::test]
async fn lifecycle_misuse_is_invalid_state() {
    let mut session = EngineSession::start(fixture_config(&[])).await.unwrap();

    match session.step(draw()).await {
        Err(EngineError::InvalidState { op, state }) => {
            assert_eq!(op, "step");
            assert_eq!(state, SessionState::NotStarted);
        }
        other => panic!("expected InvalidState, got {:?}", other),
    }

    session.initial_turn().await.unwrap();
    assert!(matches!(
        session.initial_turn().await,
        Err(EngineError::InvalidState {
            op: "initial_turn",
            state: SessionState::Running
        })
    ));

    session.close().await;
    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(
        session.step(draw()).await,
        Err(EngineError::InvalidState {
            state: SessionState::Closed,
            ..
        })
    ));
}

#[tokio::test]
async fn sessions_are_independent() {
    let mut a = started(&["--seed", "1"]).await;
    let mut b = started(&["--seed", "2"]).await;
    assert_ne!(a.pid(), b.pid());
    assert_ne!(a.last_turn().unwrap().board, b.last_turn().unwrap().board);

    a.step(draw()).await.unwrap();
    b.step(draw()).await.unwrap();
    a.step(draw()).await.unwrap();

    assert_eq!(a.last_turn().unwrap().board.waste.len(), 2);
    assert_eq!(b.last_turn().unwrap().board.waste.len(), 1);

    a.close().await;
    assert_eq!(b.state(), SessionState::Running);
    b.step(draw()).await.unwrap();
    b.close().await;
}

#[tokio::test]
async fn both_layouts_decode_to_the_same_board() {
    let mut standard = started(&["--seed", "9"]).await;

    let mut config = fixture_config(&["--seed", "9", "--layout", "facedown-counts"]);
    config.layout = DumpLayout::FaceDownCounts;
    let mut counts = EngineSession::start(config).await.unwrap();
    counts.initial_turn().await.unwrap();

    assert_eq!(standard.last_turn(), counts.last_turn());

    let a = standard.step(draw()).await.unwrap();
    let b = counts.step(draw()).await.unwrap();
    assert_eq!(a, b);

    standard.close().await;
    counts.close().await;
}

#[tokio::test]
async fn wire_log_records_both_directions() {
    let path = std::env::temp_dir().join(format!("solitaire-wire-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut config = fixture_config(&[]);
    config.wire_log = Some(path.clone());
    let mut session = EngineSession::start(config).await.unwrap();
    session.initial_turn().await.unwrap();
    session.step(draw()).await.unwrap();
    session.close().await;

    let log = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(log.lines().next().unwrap().starts_with("# start"));
    assert_eq!(log.lines().filter(|l| *l == "> 0").count(), 1);
    assert_eq!(log.lines().filter(|l| l.starts_with('<')).count(), 28);
    assert!(log.lines().last().unwrap().starts_with("# close"));
}

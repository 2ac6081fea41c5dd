use std::sync::Arc;

use quiz_core::model::{Difficulty, Entry, EntryId, GameConfig, GameKind, GameStatus};
use quiz_core::time::fixed_clock;
use services::{GameController, NullAudio, ScoreHistoryService, StaticCatalog};
use storage::repository::InMemoryScoreHistory;

fn build_catalog(count: u64) -> Arc<StaticCatalog> {
    let entries: Vec<Entry> = (1..=count)
        .map(|id| {
            Entry::new(
                EntryId::new(id),
                format!("Entry {id}"),
                format!("https://img.example/{id}.png"),
            )
            .unwrap()
        })
        .collect();
    Arc::new(StaticCatalog::new(entries))
}

#[tokio::test]
async fn game_flow_persists_score_record() {
    let records = Arc::new(InMemoryScoreHistory::new());
    let config =
        GameConfig::new(GameKind::WhosThatPokemon, Difficulty::Easy, 5, None).unwrap();

    let (mut controller, _timer_events) = GameController::new(
        fixed_clock(),
        build_catalog(30),
        Arc::clone(&records) as Arc<dyn storage::repository::ScoreHistoryRepository>,
        Arc::new(NullAudio),
    );

    controller.start_game(config).await.unwrap();
    assert_eq!(controller.snapshot().status, GameStatus::InProgress);
    assert_eq!(controller.snapshot().total_questions, 5);

    while controller.snapshot().status == GameStatus::InProgress {
        let correct = controller
            .session()
            .expect("active session")
            .current_question()
            .expect("current question")
            .correct_option();
        controller.answer(correct);
        controller.next().await;
    }

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.status, GameStatus::Completed);
    let results = snapshot.results.expect("completed results");
    assert_eq!(results.correct_answers, 5);

    let history = ScoreHistoryService::new(fixed_clock(), records);
    let items = history.list_recent(10).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].total_questions, 5);
    assert_eq!(items[0].correct_answers, 5);
    assert_eq!(items[0].kind, GameKind::WhosThatPokemon);
    assert_eq!(items[0].score, results.score);
}

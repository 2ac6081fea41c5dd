use chrono::Duration;
use quiz_core::model::{GameKind, ScoreRecord};
use quiz_core::time::fixed_now;
use storage::repository::{ScoreHistoryRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn build_record(minutes_ago: i64, kind: GameKind) -> ScoreRecord {
    ScoreRecord::new(
        fixed_now() - Duration::minutes(minutes_ago),
        750,
        10,
        6,
        kind,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_score_records() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_records?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = build_record(1, GameKind::WhosThatPokemon);
    repo.append_record(&record).await.unwrap();

    let fetched = repo.get_record(record.id()).await.unwrap();
    assert_eq!(fetched, record);
}

#[tokio::test]
async fn sqlite_lists_recent_first_and_filters_by_kind() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_listing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let older = build_record(30, GameKind::WhosThatPokemon);
    let newer = build_record(5, GameKind::WhosThatPokemon);
    let other_kind = build_record(1, GameKind::PokemonTypes);
    repo.append_record(&older).await.unwrap();
    repo.append_record(&newer).await.unwrap();
    repo.append_record(&other_kind).await.unwrap();

    let listed = repo.list_records(10).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id(), other_kind.id());
    assert_eq!(listed[1].id(), newer.id());
    assert_eq!(listed[2].id(), older.id());

    let limited = repo.list_records(1).await.unwrap();
    assert_eq!(limited.len(), 1);

    let filtered = repo
        .list_records_for_kind(GameKind::WhosThatPokemon, 10)
        .await
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(
        filtered
            .iter()
            .all(|record| record.kind() == GameKind::WhosThatPokemon)
    );
}

#[tokio::test]
async fn sqlite_rejects_duplicate_record_ids() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_dupes?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = build_record(1, GameKind::WhosThatPokemon);
    repo.append_record(&record).await.unwrap();
    let err = repo.append_record(&record).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

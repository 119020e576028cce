use rank_engine::{
    database::{db::DbClient, db_structs::UserRatingChange},
    leaderboard::{self, LeaderboardError},
    model::ranking_engine::RankingEngine
};
use serial_test::serial;

use super::test_helpers::TestDatabase;
use crate::common::init_test_env;

async fn seeded_database() -> (TestDatabase, DbClient) {
    init_test_env();
    let test_db = TestDatabase::new().await.expect("Failed to create test database");
    test_db.seed_test_data().await.expect("Failed to seed test data");

    let db_client = DbClient::connect(&test_db.connection_string)
        .await
        .expect("Failed to connect");

    (test_db, db_client)
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    init_test_env();

    let result = DbClient::connect("host=127.0.0.1 port=1 user=postgres password=wrong dbname=nonexistent").await;

    assert!(result.is_err());
}

#[tokio::test]
#[serial]
async fn test_get_rating_counts() {
    let (_test_db, db_client) = seeded_database().await;

    let counts = db_client.get_rating_counts().await.expect("Failed to fetch rating counts");

    assert_eq!(counts.len(), 5);
    assert_eq!(counts.get(&5000), Some(&2));
    assert_eq!(counts.get(&4999), Some(&1));
    assert_eq!(counts.get(&1000), Some(&3));
    assert_eq!(counts.get(&6000), Some(&1));
    assert_eq!(counts.get(&50), Some(&1));
    assert_eq!(db_client.count_users().await.unwrap(), 8);
}

#[tokio::test]
#[serial]
async fn test_initialize_engine_from_database() {
    let (_test_db, db_client) = seeded_database().await;

    let engine = RankingEngine::initialize(&db_client)
        .await
        .expect("Failed to initialize ranking engine");
    let stats = engine.get_stats();

    // The users rated 6000 and 50 are outside the domain
    assert_eq!(stats.total_users, 6);
    assert_eq!(stats.unique_ratings, 3);
    assert_eq!(stats.min_rating_with_users, Some(1000));
    assert_eq!(stats.max_rating_with_users, Some(5000));
    assert_eq!(engine.get_rank_batch(&[5000, 4999, 1000, 6000]), vec![Some(1), Some(2), Some(3), None]);
}

#[tokio::test]
#[serial]
async fn test_get_users_page() {
    let (_test_db, db_client) = seeded_database().await;

    let first = db_client.get_users_page(3, 0).await.unwrap();
    let second = db_client.get_users_page(3, 3).await.unwrap();

    assert_eq!(
        first.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
        vec!["overflow", "alice", "bob"]
    );
    assert_eq!(
        second.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
        vec!["carol", "dave", "erin"]
    );
}

#[tokio::test]
#[serial]
async fn test_get_user() {
    let (test_db, db_client) = seeded_database().await;
    let carol_id = test_db.user_id("carol").await.unwrap();

    let carol = db_client.get_user(carol_id).await.unwrap().expect("Expected carol to exist");

    assert_eq!(carol.username, "carol");
    assert_eq!(carol.rating, 4999);
    assert!(db_client.get_user(-1).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_sample_users() {
    let (_test_db, db_client) = seeded_database().await;

    assert_eq!(db_client.sample_users(5).await.unwrap().len(), 5);
    assert_eq!(db_client.sample_users(100).await.unwrap().len(), 8);
}

#[tokio::test]
#[serial]
async fn test_update_ratings_last_change_wins() {
    let (test_db, db_client) = seeded_database().await;
    let dave_id = test_db.user_id("dave").await.unwrap();
    let alice_id = test_db.user_id("alice").await.unwrap();

    let changes = vec![
        UserRatingChange {
            user_id: dave_id,
            old_rating: 1000,
            new_rating: 1500
        },
        UserRatingChange {
            user_id: alice_id,
            old_rating: 5000,
            new_rating: 4000
        },
        UserRatingChange {
            user_id: dave_id,
            old_rating: 1500,
            new_rating: 1600
        },
    ];

    let updated = db_client.update_ratings(&changes).await.unwrap();

    assert_eq!(updated, 2);
    assert_eq!(test_db.rating_of("dave").await.unwrap(), 1600);
    assert_eq!(test_db.rating_of("alice").await.unwrap(), 4000);
    assert_eq!(db_client.update_ratings(&[]).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_apply_rating_changes_updates_engine_and_database() {
    let (test_db, db_client) = seeded_database().await;
    let engine = RankingEngine::initialize(&db_client).await.unwrap();
    let dave_id = test_db.user_id("dave").await.unwrap();

    let changes = [UserRatingChange {
        user_id: dave_id,
        old_rating: 1000,
        new_rating: 1500
    }];

    let persisted = leaderboard::apply_rating_changes(&engine, &db_client, &changes)
        .await
        .unwrap();

    assert_eq!(persisted, 1);
    assert_eq!(test_db.rating_of("dave").await.unwrap(), 1500);
    assert_eq!(engine.get_rank(1500), 3);
    assert_eq!(engine.get_rank(1000), 4);
    assert_eq!(engine.count(1000), 2);

    // A fresh engine built from storage agrees with the in-memory one
    let reloaded = RankingEngine::initialize(&db_client).await.unwrap();
    assert_eq!(reloaded.snapshot(), engine.snapshot());
}

#[tokio::test]
#[serial]
async fn test_apply_rating_changes_repeated_user_matches_storage() {
    let (test_db, db_client) = seeded_database().await;
    let engine = RankingEngine::initialize(&db_client).await.unwrap();
    let dave_id = test_db.user_id("dave").await.unwrap();

    let changes = [
        UserRatingChange {
            user_id: dave_id,
            old_rating: 1000,
            new_rating: 1500
        },
        UserRatingChange {
            user_id: dave_id,
            old_rating: 1000,
            new_rating: 1600
        },
    ];

    let persisted = leaderboard::apply_rating_changes(&engine, &db_client, &changes)
        .await
        .unwrap();

    assert_eq!(persisted, 1);
    assert_eq!(test_db.rating_of("dave").await.unwrap(), 1600);
    assert_eq!(engine.count(1000), 2);
    assert_eq!(engine.count(1500), 0);
    assert_eq!(engine.count(1600), 1);
    assert_eq!(engine.get_stats().total_users, 6);

    let reloaded = RankingEngine::initialize(&db_client).await.unwrap();
    assert_eq!(reloaded.snapshot(), engine.snapshot());
}

#[tokio::test]
#[serial]
async fn test_apply_rating_changes_rejects_out_of_domain_batch() {
    let (test_db, db_client) = seeded_database().await;
    let engine = RankingEngine::initialize(&db_client).await.unwrap();
    let before = engine.snapshot();
    let dave_id = test_db.user_id("dave").await.unwrap();
    let erin_id = test_db.user_id("erin").await.unwrap();

    let changes = [
        UserRatingChange {
            user_id: dave_id,
            old_rating: 1000,
            new_rating: 1500
        },
        UserRatingChange {
            user_id: erin_id,
            old_rating: 1000,
            new_rating: 9999
        },
    ];

    let result = leaderboard::apply_rating_changes(&engine, &db_client, &changes).await;

    assert!(matches!(result, Err(LeaderboardError::InvalidRating(9999))));
    assert_eq!(engine.snapshot(), before);
    assert_eq!(test_db.rating_of("dave").await.unwrap(), 1000);
}

#[tokio::test]
#[serial]
async fn test_leaderboard_page() {
    let (_test_db, db_client) = seeded_database().await;
    let engine = RankingEngine::initialize(&db_client).await.unwrap();

    let page = leaderboard::leaderboard_page(&engine, &db_client, 1, 4).await.unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 4);
    assert_eq!(page.stats.total_users, 6);
    assert_eq!(
        page.users.iter().map(|u| (u.username.as_str(), u.rank)).collect::<Vec<_>>(),
        vec![("overflow", None), ("alice", Some(1)), ("bob", Some(1)), ("carol", Some(2))]
    );

    let last = leaderboard::leaderboard_page(&engine, &db_client, 2, 4).await.unwrap();
    assert_eq!(
        last.users.iter().map(|u| (u.username.as_str(), u.rank)).collect::<Vec<_>>(),
        vec![("dave", Some(3)), ("erin", Some(3)), ("frank", Some(3)), ("underflow", None)]
    );
}

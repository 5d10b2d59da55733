//! End-to-end pipeline tests over an on-disk SQLite database: import
//! profiles, build vectors, rank neighbors, assemble recommendation pages.

use std::sync::Arc;

use peermatch::config::EngineConfig;
use peermatch::profile::{
    AvailabilityEntry, RelationshipStatus, SportPreference, WeeklyAvailability,
};
use peermatch::recommend::assembler::{RecommendOptions, Recommender};
use peermatch::similarity::cache::PairwiseCache;
use peermatch::similarity::knn::KnnSearch;
use peermatch::storage::sqlite::{SqliteStore, StoredUser};
use peermatch::storage::SimilarityCacheStore;
use peermatch::vector::builder::VectorBuilder;

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<SqliteStore>,
    builder: Arc<VectorBuilder>,
    knn: Arc<KnnSearch>,
    recommender: Recommender,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("peermatch.db")).unwrap());

    let config = EngineConfig::default();
    let builder = Arc::new(VectorBuilder::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let cache = Arc::new(PairwiseCache::new(
        store.clone() as Arc<dyn SimilarityCacheStore>
    ));
    let knn = Arc::new(KnnSearch::new(
        builder.clone(),
        store.clone(),
        cache,
        config.clone(),
    ));
    let recommender = Recommender::new(
        knn.clone(),
        builder.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        config,
    );
    Harness {
        _dir: dir,
        store,
        builder,
        knn,
        recommender,
    }
}

fn weekday_mornings() -> WeeklyAvailability {
    WeeklyAvailability::from([
        (
            "monday".to_string(),
            vec![
                AvailabilityEntry::Label("9-11".to_string()),
                AvailabilityEntry::Label("11-13".to_string()),
            ],
        ),
        (
            "tuesday".to_string(),
            vec![
                AvailabilityEntry::Label("9-11".to_string()),
                AvailabilityEntry::Label("11-13".to_string()),
            ],
        ),
        (
            "wednesday".to_string(),
            vec![
                AvailabilityEntry::Label("9-11".to_string()),
                AvailabilityEntry::Label("11-13".to_string()),
            ],
        ),
    ])
}

fn player(id: &str, name: &str, sports: &[(&str, &str)], campus: Option<&str>) -> StoredUser {
    StoredUser {
        id: id.to_string(),
        full_name: Some(name.to_string()),
        campus: campus.map(String::from),
        sport_preferences: sports
            .iter()
            .map(|(n, l)| SportPreference {
                name: n.to_string(),
                level: l.to_string(),
            })
            .collect(),
        available_hours: weekday_mornings(),
        ..Default::default()
    }
}

async fn seed(h: &Harness, users: &[StoredUser]) {
    for u in users {
        h.store.upsert_user(u).await.unwrap();
        h.builder.build(&u.id).await.unwrap();
    }
}

#[tokio::test]
async fn identical_profiles_rank_highest_and_disjoint_lowest() {
    let h = harness();
    seed(
        &h,
        &[
            player("me", "Me", &[("Basketball", "Beginner")], Some("SELANGOR")),
            player("twin", "Twin", &[("Basketball", "Beginner")], Some("SELANGOR")),
            player("near", "Near", &[("Basketball", "Beginner")], Some("JOHOR")),
            player("far", "Far", &[("Squash", "Advanced")], None),
        ],
    )
    .await;

    let result = h.knn.find_neighbors("me", 10).await.unwrap();
    let ids: Vec<_> = result.neighbors.iter().map(|n| n.user_id.as_str()).collect();
    assert_eq!(ids[0], "twin");
    assert_eq!(*ids.last().unwrap(), "far");
    assert_eq!(result.neighbors[0].similarity, 1.0);
    assert!(result.neighbors.last().unwrap().similarity < 1.0);
}

#[tokio::test]
async fn second_query_serves_from_pairwise_cache_without_new_rows() {
    let h = harness();
    seed(
        &h,
        &[
            player("me", "Me", &[("Futsal", "Beginner")], None),
            player("a", "A", &[("Futsal", "Beginner")], Some("PERAK")),
            player("b", "B", &[("Hockey", "Advanced")], Some("SABAH")),
        ],
    )
    .await;

    let first = h.knn.find_neighbors("me", 10).await.unwrap();
    let rows_after_first = h.store.cache_len().await.unwrap();
    assert_eq!(rows_after_first, 2);

    let second = h.knn.find_neighbors("me", 10).await.unwrap();
    assert_eq!(h.store.cache_len().await.unwrap(), rows_after_first);
    for (x, y) in first.neighbors.iter().zip(&second.neighbors) {
        assert_eq!(x.user_id, y.user_id);
        assert_eq!(x.similarity, y.similarity);
    }
}

#[tokio::test]
async fn profile_edit_invalidates_cached_pairs_through_fingerprints() {
    let h = harness();
    seed(
        &h,
        &[
            player("me", "Me", &[("Tennis", "Beginner")], None),
            player("pal", "Pal", &[("Tennis", "Beginner")], None),
        ],
    )
    .await;

    let before = h.knn.find_neighbors("me", 10).await.unwrap();
    assert_eq!(before.neighbors[0].similarity, 1.0);

    // Pal switches sports; the cached pair must not survive.
    h.store
        .upsert_user(&player("pal", "Pal", &[("Rugby", "Advanced")], None))
        .await
        .unwrap();
    h.builder.build("pal").await.unwrap();

    let after = h.knn.find_neighbors("me", 10).await.unwrap();
    assert!(after.neighbors[0].similarity < 1.0);
}

#[tokio::test]
async fn recommendation_page_excludes_active_relationships() {
    let h = harness();
    seed(
        &h,
        &[
            player("me", "Me", &[("Volleyball", "Beginner")], Some("PAHANG")),
            player("friend", "Friend", &[("Volleyball", "Beginner")], Some("PAHANG")),
            player("pending", "Pending", &[("Volleyball", "Beginner")], Some("PAHANG")),
            player("declined", "Declined", &[("Volleyball", "Beginner")], Some("PAHANG")),
            player("stranger", "Stranger", &[("Volleyball", "Beginner")], None),
        ],
    )
    .await;
    h.store
        .set_relationship("me", "friend", RelationshipStatus::Accepted)
        .await
        .unwrap();
    h.store
        .set_relationship("pending", "me", RelationshipStatus::Pending)
        .await
        .unwrap();
    h.store
        .set_relationship("me", "declined", RelationshipStatus::Declined)
        .await
        .unwrap();

    let options = RecommendOptions::from_config(&EngineConfig::default());
    let page = h.recommender.recommend("me", &options).await.unwrap();

    let ids: Vec<_> = page
        .recommendations
        .iter()
        .map(|r| r.user_id.as_str())
        .collect();
    assert!(!ids.contains(&"friend"));
    assert!(!ids.contains(&"pending"));
    assert!(ids.contains(&"declined"));
    assert!(ids.contains(&"stranger"));
    assert_eq!(page.metadata.filtered_active_relationships, 2);
    for rec in &page.recommendations {
        assert!(rec.similarity >= 0.3);
        assert!(!rec.explanation.is_empty());
    }
}

#[tokio::test]
async fn incomplete_profiles_never_enter_the_pool() {
    let h = harness();
    seed(
        &h,
        &[
            player("me", "Me", &[("Badminton", "Beginner")], None),
            player("full", "Full", &[("Badminton", "Beginner")], None),
        ],
    )
    .await;
    // One bit out of 137 is below the 0.05 floor.
    h.store
        .upsert_user(&StoredUser {
            id: "ghosty".to_string(),
            gender: Some("Other".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    h.builder.build("ghosty").await.unwrap();

    let result = h.knn.find_neighbors("me", 10).await.unwrap();
    let ids: Vec<_> = result.neighbors.iter().map(|n| n.user_id.as_str()).collect();
    assert_eq!(ids, vec!["full"]);
    assert_eq!(result.candidates_considered, 1);
}

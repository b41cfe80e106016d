//! Integration tests for `MovieRepo` against a real PostgreSQL database.
//!
//! `#[sqlx::test]` creates a fresh database per test on the server named by
//! `DATABASE_URL`.

use assert_matches::assert_matches;
use movies_core::filters::{Filters, PageRequest};
use movies_core::movie::SORT_SAFELIST;
use movies_db::models::movie::{CreateMovie, UpdateMovie};
use movies_db::repositories::MovieRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_movie(title: &str, year: i32, genres: &[&str]) -> CreateMovie {
    CreateMovie {
        title: title.to_string(),
        year,
        runtime: 100,
        genres: Some(genres.iter().map(|g| g.to_string()).collect()),
    }
}

fn page(page: i64, page_size: i64, sort: &str) -> PageRequest {
    Filters::new(page, page_size, sort, SORT_SAFELIST)
        .page_request()
        .expect("test filters must be valid")
}

fn titles(movies: &[movies_db::models::movie::Movie]) -> Vec<&str> {
    movies.iter().map(|m| m.title.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Create / find
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_then_find_round_trips(pool: PgPool) {
    let input = new_movie("Moana", 2016, &["animation", "adventure"]);
    let created = MovieRepo::create(&pool, &input).await.unwrap();

    assert!(created.id > 0);
    assert_eq!(created.version, 1);

    let found = MovieRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("movie should exist");
    assert_eq!(found.title, "Moana");
    assert_eq!(found.year, 2016);
    assert_eq!(found.runtime, 100);
    assert_eq!(found.genres, vec!["animation", "adventure"]);
    assert_eq!(found, created);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_missing_returns_none(pool: PgPool) {
    let found = MovieRepo::find_by_id(&pool, 999_999).await.unwrap();
    assert!(found.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_constraint_violation_is_database_error(pool: PgPool) {
    let err = MovieRepo::create(&pool, &new_movie("Too Early", 1700, &["drama"]))
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(_));
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_bumps_version(pool: PgPool) {
    let mut movie = MovieRepo::create(&pool, &new_movie("Alien", 1979, &["horror"]))
        .await
        .unwrap();

    movie.apply(UpdateMovie {
        genres: Some(vec!["horror".into(), "sci-fi".into()]),
        ..UpdateMovie::default()
    });
    let updated = MovieRepo::update(&pool, &movie)
        .await
        .unwrap()
        .expect("version should match");

    assert_eq!(updated.version, 2);
    assert_eq!(updated.genres, vec!["horror", "sci-fi"]);
    assert_eq!(updated.created_at, movie.created_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_version_update_is_rejected(pool: PgPool) {
    let original = MovieRepo::create(&pool, &new_movie("Heat", 1995, &["crime"]))
        .await
        .unwrap();

    let mut first = original.clone();
    first.runtime = 170;
    assert!(MovieRepo::update(&pool, &first).await.unwrap().is_some());

    let mut second = original;
    second.runtime = 171;
    assert!(MovieRepo::update(&pool, &second).await.unwrap().is_none());

    let stored = MovieRepo::find_by_id(&pool, first.id).await.unwrap().unwrap();
    assert_eq!(stored.runtime, 170);
    assert_eq!(stored.version, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_reports_whether_row_existed(pool: PgPool) {
    let movie = MovieRepo::create(&pool, &new_movie("Jaws", 1975, &["thriller"]))
        .await
        .unwrap();

    assert!(MovieRepo::delete(&pool, movie.id).await.unwrap());
    assert!(!MovieRepo::delete(&pool, movie.id).await.unwrap());
    assert!(MovieRepo::find_by_id(&pool, movie.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_genre_containment(pool: PgPool) {
    MovieRepo::create(&pool, &new_movie("Dunkirk", 2017, &["drama", "war"]))
        .await
        .unwrap();
    MovieRepo::create(&pool, &new_movie("Up", 2009, &["animation"]))
        .await
        .unwrap();
    MovieRepo::create(&pool, &new_movie("1917", 2019, &["war", "drama", "thriller"]))
        .await
        .unwrap();

    let genres = vec!["drama".to_string(), "war".to_string()];
    let (movies, metadata) = MovieRepo::list(&pool, "", &genres, &page(1, 20, "year"))
        .await
        .unwrap();

    assert_eq!(titles(&movies), vec!["Dunkirk", "1917"]);
    assert_eq!(metadata.total_records, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_title_words(pool: PgPool) {
    MovieRepo::create(&pool, &new_movie("The Breakfast Club", 1985, &["comedy"]))
        .await
        .unwrap();
    MovieRepo::create(&pool, &new_movie("Fight Club", 1999, &["drama"]))
        .await
        .unwrap();
    MovieRepo::create(&pool, &new_movie("Black Panther", 2018, &["action"]))
        .await
        .unwrap();

    let (movies, metadata) = MovieRepo::list(&pool, "CLUB", &[], &page(1, 20, "title"))
        .await
        .unwrap();

    assert_eq!(titles(&movies), vec!["Fight Club", "The Breakfast Club"]);
    assert_eq!(metadata.total_records, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_paginates_with_stable_tie_break(pool: PgPool) {
    // Twelve rows, four per year, so the year sort has ties.
    let mut ids = Vec::new();
    for i in 0..12 {
        let year = 2000 + (i % 3);
        let movie = MovieRepo::create(&pool, &new_movie(&format!("M{i}"), year, &["drama", "war"]))
            .await
            .unwrap();
        ids.push((year, movie.id));
    }
    ids.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let genres = vec!["drama".to_string(), "war".to_string()];
    let mut seen = Vec::new();
    for p in 1..=3 {
        let (movies, metadata) = MovieRepo::list(&pool, "", &genres, &page(p, 5, "-year"))
            .await
            .unwrap();
        assert_eq!(metadata.current_page, p);
        assert_eq!(metadata.last_page, 3);
        assert_eq!(metadata.total_records, 12);
        seen.extend(movies.iter().map(|m| (m.year, m.id)));
    }

    assert_eq!(seen, ids);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_past_last_page_is_empty(pool: PgPool) {
    MovieRepo::create(&pool, &new_movie("Solo", 2018, &["sci-fi"]))
        .await
        .unwrap();

    let (movies, metadata) = MovieRepo::list(&pool, "", &[], &page(5, 20, "id"))
        .await
        .unwrap();

    assert!(movies.is_empty());
    assert_eq!(metadata, Default::default());
}

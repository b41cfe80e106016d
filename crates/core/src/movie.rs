//! Movie field rules.

use chrono::Datelike;

use crate::validator::{unique, Validator};

/// Sort tokens accepted by `GET /v1/movies?sort=`.
pub const SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Default sort token for movie listings.
pub const DEFAULT_SORT: &str = "id";

/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;

/// Year of the first known motion picture; valid years must be later.
pub const FIRST_FILM_YEAR: i32 = 1888;

pub const MIN_GENRES: usize = 1;
pub const MAX_GENRES: usize = 5;

/// Borrowed view of the client-controlled movie fields.
#[derive(Debug, Clone, Copy)]
pub struct MovieDraft<'a> {
    pub title: &'a str,
    pub year: i32,
    pub runtime: i32,
    /// `None` when the client omitted the field entirely.
    pub genres: Option<&'a [String]>,
}

/// Check `movie` against the current calendar year.
pub fn validate_movie(v: &mut Validator, movie: &MovieDraft<'_>) {
    validate_movie_at(v, movie, chrono::Utc::now().year());
}

/// Check `movie`, treating `current_year` as the latest allowed year.
pub fn validate_movie_at(v: &mut Validator, movie: &MovieDraft<'_>, current_year: i32) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(movie.year > FIRST_FILM_YEAR, "year", "must be greater than 1888");
    v.check(movie.year <= current_year, "year", "must not be in the future");

    v.check(movie.runtime != 0, "runtime", "must be provided");
    v.check(movie.runtime > 0, "runtime", "must be a positive integer");

    match movie.genres {
        None => v.add_error("genres", "must be provided"),
        Some(genres) => {
            v.check(
                genres.len() >= MIN_GENRES,
                "genres",
                "must contain at least 1 genre",
            );
            v.check(
                genres.len() <= MAX_GENRES,
                "genres",
                "must contain at most 5 genres",
            );
            v.check(
                genres.iter().all(|g| !g.trim().is_empty()),
                "genres",
                "must not contain empty values",
            );
            v.check(unique(genres), "genres", "must not contain duplicate values");
        }
    }
}

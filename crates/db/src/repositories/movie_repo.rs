//! Repository for the `movies` table.

use movies_core::filters::{Metadata, PageRequest};
use movies_core::types::DbId;
use sqlx::PgPool;

use crate::models::movie::{CreateMovie, Movie, MovieListRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

/// Provides CRUD and filtered listing for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// List one page of movies matching `title` and `genres`.
    ///
    /// - `title` is matched with `simple` full-text search; empty matches all.
    /// - `genres` must all be present on the movie; empty matches all.
    ///
    /// The total match count comes from a window function in the same query,
    /// so a page past the end yields no rows and empty metadata.
    pub async fn list(
        pool: &PgPool,
        title: &str,
        genres: &[String],
        page: &PageRequest,
    ) -> Result<(Vec<Movie>, Metadata), sqlx::Error> {
        // Only safelisted column names reach this format string.
        let query = format!(
            "SELECT count(*) OVER() AS total_records, {COLUMNS}
             FROM movies
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
               AND (genres @> $2 OR $2 = '{{}}')
             ORDER BY {}
             LIMIT $3 OFFSET $4",
            page.order_by()
        );

        tracing::debug!(
            title,
            genres = ?genres,
            order_by = %page.order_by(),
            limit = page.limit(),
            offset = page.offset(),
            "Listing movies"
        );

        let rows = sqlx::query_as::<_, MovieListRow>(&query)
            .bind(title)
            .bind(genres)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let movies = rows.into_iter().map(|row| row.movie).collect();

        Ok((movies, page.metadata(total_records)))
    }

    /// Insert a new movie, returning the stored row with its id,
    /// `created_at` and initial `version`.
    pub async fn create(pool: &PgPool, input: &CreateMovie) -> Result<Movie, sqlx::Error> {
        let query = format!(
            "INSERT INTO movies (title, year, runtime, genres)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(&input.title)
            .bind(input.year)
            .bind(input.runtime)
            .bind(input.genres.as_deref().unwrap_or_default())
            .fetch_one(pool)
            .await
    }

    /// Find a movie by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Persist every editable field of `movie` and bump its version.
    ///
    /// The write only applies while the stored version still equals
    /// `movie.version`. Returns `None` when it does not (the row changed or
    /// was deleted since it was read).
    pub async fn update(pool: &PgPool, movie: &Movie) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!(
            "UPDATE movies SET
                title = $3,
                year = $4,
                runtime = $5,
                genres = $6,
                version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(movie.id)
            .bind(movie.version)
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime)
            .bind(&movie.genres)
            .fetch_optional(pool)
            .await
    }

    /// Delete a movie by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Movie entity model and DTOs.

use movies_core::movie::MovieDraft;
use movies_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `movies` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
    pub version: i32,
}

impl Movie {
    /// Borrow the client-editable fields for validation.
    pub fn draft(&self) -> MovieDraft<'_> {
        MovieDraft {
            title: &self.title,
            year: self.year,
            runtime: self.runtime,
            genres: Some(&self.genres),
        }
    }

    /// Overwrite every field present in `input`.
    pub fn apply(&mut self, input: UpdateMovie) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(year) = input.year {
            self.year = year;
        }
        if let Some(runtime) = input.runtime {
            self.runtime = runtime;
        }
        if let Some(genres) = input.genres {
            self.genres = genres;
        }
    }
}

/// A list row: the movie plus the window count of all matching rows.
#[derive(Debug, FromRow)]
pub(crate) struct MovieListRow {
    pub total_records: i64,
    #[sqlx(flatten)]
    pub movie: Movie,
}

/// DTO for creating a movie.
///
/// Missing fields decode to their zero value so that validation can report
/// them all at once instead of failing on the first absent key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateMovie {
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Option<Vec<String>>,
}

impl CreateMovie {
    pub fn draft(&self) -> MovieDraft<'_> {
        MovieDraft {
            title: &self.title,
            year: self.year,
            runtime: self.runtime,
            genres: self.genres.as_deref(),
        }
    }
}

/// DTO for updating a movie. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovie {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<i32>,
    pub genres: Option<Vec<String>>,
}

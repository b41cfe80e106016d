//! Handlers for the `/movies` resource.

use std::collections::HashMap;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use movies_core::error::CoreError;
use movies_core::filters::{validate_filters, Filters, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use movies_core::movie::{validate_movie, DEFAULT_SORT, SORT_SAFELIST};
use movies_core::types::DbId;
use movies_core::validator::Validator;
use movies_db::models::movie::{CreateMovie, UpdateMovie};
use movies_db::repositories::MovieRepo;

use crate::error::{AppError, AppResult};
use crate::json::StrictJson;
use crate::query::QueryReader;
use crate::response::{MovieListResponse, MovieResponse, Pretty};
use crate::state::AppState;

/// Request header carrying the version a client expects to overwrite.
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// Parse a `{id}` path segment. Anything other than a positive integer is
/// treated as a missing resource.
fn parse_id(raw: &str) -> AppResult<DbId> {
    match raw.parse::<DbId>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::NotFound),
    }
}

/// Resolve the `{id}` segment, including segments that are not valid UTF-8
/// once percent-decoded.
fn path_id(path: Result<Path<String>, PathRejection>) -> AppResult<DbId> {
    match path {
        Ok(Path(raw)) => parse_id(&raw),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Undecodable movie id");
            Err(AppError::NotFound)
        }
    }
}

fn movie_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Movie", id })
}

/// GET /v1/movies
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> AppResult<Pretty<MovieListResponse>> {
    let Query(params) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let qs = QueryReader::new(params);
    let mut v = Validator::new();

    let title = qs.read_string("title", "");
    let genres = qs.read_csv("genres", &[]);
    let filters = Filters::new(
        qs.read_int("page", DEFAULT_PAGE, &mut v),
        qs.read_int("page_size", DEFAULT_PAGE_SIZE, &mut v),
        qs.read_string("sort", DEFAULT_SORT),
        SORT_SAFELIST,
    );

    validate_filters(&mut v, &filters);
    v.finish().map_err(CoreError::Validation)?;

    let page = filters.page_request().ok_or_else(|| {
        AppError::InternalError(format!("validated filters have no page request: {filters:?}"))
    })?;

    let (movies, metadata) = MovieRepo::list(&state.pool, &title, &genres, &page).await?;
    Ok(Pretty(MovieListResponse { movies, metadata }))
}

/// POST /v1/movies
pub async fn create(
    State(state): State<AppState>,
    StrictJson(input): StrictJson<CreateMovie>,
) -> AppResult<impl IntoResponse> {
    let mut v = Validator::new();
    validate_movie(&mut v, &input.draft());
    v.finish().map_err(CoreError::Validation)?;

    let movie = MovieRepo::create(&state.pool, &input).await?;
    tracing::info!(movie_id = movie.id, title = %movie.title, "Movie created");

    let location = HeaderValue::from_str(&format!("/v1/movies/{}", movie.id))
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Pretty(MovieResponse { movie }),
    ))
}

/// GET /v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Pretty<MovieResponse>> {
    let id = path_id(path)?;
    let movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| movie_not_found(id))?;
    Ok(Pretty(MovieResponse { movie }))
}

/// PUT /v1/movies/{id}
///
/// Partial update: only the fields present in the body change. When the
/// `X-Expected-Version` header is sent it must equal the stored version.
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    StrictJson(input): StrictJson<UpdateMovie>,
) -> AppResult<Pretty<MovieResponse>> {
    let id = path_id(path)?;
    let mut movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| movie_not_found(id))?;

    if let Some(expected) = headers.get(EXPECTED_VERSION_HEADER) {
        let matches = expected
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<i32>().ok())
            == Some(movie.version);
        if !matches {
            return Err(CoreError::Conflict(format!(
                "movie {id} is at version {}, client expected {expected:?}",
                movie.version
            ))
            .into());
        }
    }

    movie.apply(input);

    let mut v = Validator::new();
    validate_movie(&mut v, &movie.draft());
    v.finish().map_err(CoreError::Validation)?;

    let updated = MovieRepo::update(&state.pool, &movie)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!(
                "movie {id} changed after version {} was read",
                movie.version
            ))
        })?;
    tracing::info!(movie_id = id, version = updated.version, "Movie updated");

    Ok(Pretty(MovieResponse { movie: updated }))
}

/// DELETE /v1/movies/{id}
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = path_id(path)?;
    if MovieRepo::delete(&state.pool, id).await? {
        tracing::info!(movie_id = id, "Movie deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(movie_not_found(id))
    }
}

//! Manual result-trigger endpoints.
//!
//! These are the same routes the scheduler fires when a session's delay
//! elapses; exposing them over HTTP means an operator can re-run any
//! ingestion after fixing a bad artifact or a missed timer.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::events::EventDetail;
use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::ingest::{self, IngestError};
use crate::middleware::RequestId;

pub(super) async fn trigger_practices(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((year, round)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<EventDetail>>, ApiError> {
    let event = ingest::ingest_practices(&state.pool, &state.config, year, round)
        .await
        .map_err(|e| map_ingest_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: EventDetail::from(event),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn trigger_qualifying(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((year, round)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<EventDetail>>, ApiError> {
    let event = ingest::ingest_qualifying(&state.pool, &state.config, year, round)
        .await
        .map_err(|e| map_ingest_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: EventDetail::from(event),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn trigger_race(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((year, round)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<EventDetail>>, ApiError> {
    let event = ingest::ingest_race(&state.pool, &state.config, year, round)
        .await
        .map_err(|e| map_ingest_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: EventDetail::from(event),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_ingest_error(request_id: String, error: &IngestError) -> ApiError {
    let code = error.code();
    if code == "internal_error" {
        tracing::error!(error = %error, "result ingestion failed");
    } else {
        tracing::warn!(error = %error, code, "result ingestion rejected");
    }
    ApiError::new(request_id, code, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{build_app, default_rate_limit_state};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::json;
    use sqlx::PgPool;
    use std::path::Path;
    use tower::ServiceExt;

    fn test_app(pool: PgPool, results_dir: &Path) -> Router {
        let config = crate::test_support::app_config(results_dir, "true");
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        build_app(AppState { pool, config }, auth, default_rate_limit_state())
    }

    async fn post_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    async fn seed_team(pool: &PgPool, id: &str) {
        sqlx::query("INSERT INTO teams (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(format!("Team {id}"))
            .execute(pool)
            .await
            .expect("insert team");
    }

    async fn seed_driver(pool: &PgPool, id: &str, team: &str) {
        sqlx::query("INSERT INTO drivers (id, name, team) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(format!("Driver {id}"))
            .bind(team)
            .execute(pool)
            .await
            .expect("insert driver");
    }

    async fn seed_event(pool: &PgPool, id: &str, round: i32, sessions: serde_json::Value) {
        sqlx::query(
            "INSERT INTO events (id, name, circuit, season, round, date, time_zone, sessions) \
             VALUES ($1, $2, $3, 2025, $4, '2025-04-13', 'Asia/Bahrain', $5)",
        )
        .bind(id)
        .bind(format!("Grand Prix {round}"))
        .bind(format!("circuit-{round}"))
        .bind(round)
        .bind(sessions)
        .execute(pool)
        .await
        .expect("insert event");
    }

    fn session(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "date": "2025-04-13",
            "start_time": "15:00:00",
            "end_time": "17:00:00",
            "session_result": {}
        })
    }

    fn write_artifact(dir: &Path, round: i32, file: &str, content: &serde_json::Value) {
        let round_dir = dir.join("2025").join(round.to_string());
        std::fs::create_dir_all(&round_dir).expect("round dir");
        std::fs::write(
            round_dir.join(file),
            serde_json::to_string(content).expect("encode"),
        )
        .expect("write artifact");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn race_trigger_stores_classification_winner_and_stats(pool: PgPool) {
        seed_team(&pool, "mclaren").await;
        seed_team(&pool, "ferrari").await;
        seed_driver(&pool, "norris", "mclaren").await;
        seed_driver(&pool, "piastri", "mclaren").await;
        seed_driver(&pool, "leclerc", "ferrari").await;
        seed_event(
            &pool,
            "gp-2025-sakhir",
            4,
            json!([session("Qualifying"), session("Race")]),
        )
        .await;

        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(
            dir.path(),
            4,
            "race.json",
            &json!({
                "session": "Race",
                "results": {
                    "first": {
                        "driver": "norris",
                        "position": { "Position": 1 },
                        "points": 25.0,
                        "time": "1:31:44.742"
                    },
                    "second": {
                        "driver": "piastri",
                        "position": { "$numberInt": "2" },
                        "points": 18.0,
                        "time": "+2.499"
                    },
                    "fourth": {
                        "driver": "leclerc",
                        "position": 4,
                        "points": 12.0,
                        "time": "+19.826"
                    }
                }
            }),
        );

        let app = test_app(pool.clone(), dir.path());
        let (status, body) = post_json(app, "/api/results/race/2025/4").await;

        assert_eq!(status, StatusCode::OK, "body: {body}");
        assert_eq!(body["data"]["finished"].as_bool(), Some(true));
        assert_eq!(body["data"]["winner"].as_str(), Some("norris"));
        let ranked = body["data"]["race_results"].as_array().expect("ranked");
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0]["driver"].as_str(), Some("norris"));
        assert_eq!(ranked[2]["position"].as_i64(), Some(4));
        // The Race session keeps the raw artifact object.
        let sessions = body["data"]["sessions"].as_array().expect("sessions");
        assert_eq!(
            sessions[1]["session_result"]["first"]["driver"].as_str(),
            Some("norris")
        );
        assert_eq!(sessions[0]["session_result"], json!({}));

        let norris = paddock_db::get_driver(&pool, "norris")
            .await
            .expect("query")
            .expect("driver");
        assert_eq!(norris.total_points, 25.0);
        assert_eq!(norris.victories, 1);
        assert_eq!(norris.podiums, 1);
        assert_eq!(norris.gp_entered, 1);

        let leclerc = paddock_db::get_driver(&pool, "leclerc")
            .await
            .expect("query")
            .expect("driver");
        assert_eq!(leclerc.victories, 0);
        assert_eq!(leclerc.podiums, 0);
        assert_eq!(leclerc.gp_entered, 1);

        let mclaren = paddock_db::get_team(&pool, "mclaren")
            .await
            .expect("query")
            .expect("team");
        assert_eq!(mclaren.points, Some(43.0), "both drivers fold into one delta");
        let ferrari = paddock_db::get_team(&pool, "ferrari")
            .await
            .expect("query")
            .expect("team");
        assert_eq!(ferrari.points, Some(12.0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn practices_trigger_ingests_only_present_artifacts(pool: PgPool) {
        seed_event(
            &pool,
            "gp-2025-suzuka",
            3,
            json!([
                session("Practice 1"),
                session("Practice 2"),
                session("Practice 3"),
                session("Qualifying"),
                session("Race")
            ]),
        )
        .await;

        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(
            dir.path(),
            3,
            "practice_fp1.json",
            &json!({
                "session": "Practice 1",
                "results": {
                    "first": { "driver": "norris", "position": 1, "time": "1:27.965" }
                }
            }),
        );

        let app = test_app(pool, dir.path());
        let (status, body) = post_json(app, "/api/results/practices/2025/3").await;

        assert_eq!(status, StatusCode::OK, "body: {body}");
        let sessions = body["data"]["sessions"].as_array().expect("sessions");
        assert_eq!(
            sessions[0]["session_result"]["first"]["driver"].as_str(),
            Some("norris"),
            "Practice 1 took the artifact"
        );
        assert_eq!(sessions[1]["session_result"], json!({}), "Practice 2 untouched");
        assert_eq!(sessions[3]["session_result"], json!({}), "Qualifying untouched");
        assert_eq!(body["data"]["finished"].as_bool(), Some(false));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn qualifying_trigger_404_for_unknown_round(pool: PgPool) {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(pool, dir.path());
        let (status, body) = post_json(app, "/api/results/qualifying/2025/9").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"].as_str(), Some("not_found"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn race_without_a_rank_one_entry_persists_nothing(pool: PgPool) {
        seed_team(&pool, "ferrari").await;
        seed_driver(&pool, "leclerc", "ferrari").await;
        seed_event(&pool, "gp-2025-sakhir", 4, json!([session("Race")])).await;

        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(
            dir.path(),
            4,
            "race.json",
            &json!({
                "session": "Race",
                "results": {
                    "second": { "driver": "leclerc", "position": 2, "points": 18.0 }
                }
            }),
        );

        let app = test_app(pool.clone(), dir.path());
        let (status, body) = post_json(app, "/api/results/race/2025/4").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"].as_str(), Some("validation_error"));

        let event = paddock_db::get_event(&pool, "gp-2025-sakhir")
            .await
            .expect("query")
            .expect("event");
        assert!(!event.finished, "a rejected race leaves the event untouched");
        assert!(event.winner.is_none());
        let sessions = event.sessions.as_array().expect("sessions");
        assert_eq!(sessions[0]["session_result"], json!({}));

        let leclerc = paddock_db::get_driver(&pool, "leclerc")
            .await
            .expect("query")
            .expect("driver");
        assert_eq!(leclerc.gp_entered, 0, "stats only move with a stored result");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn race_trigger_400_when_results_is_not_an_object(pool: PgPool) {
        seed_event(&pool, "gp-2025-sakhir", 4, json!([session("Race")])).await;

        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(
            dir.path(),
            4,
            "race.json",
            &json!({ "session": "Race", "results": [1, 2, 3] }),
        );

        let app = test_app(pool, dir.path());
        let (status, body) = post_json(app, "/api/results/race/2025/4").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"].as_str(), Some("validation_error"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn repeated_race_trigger_conflicts_without_double_crediting(pool: PgPool) {
        seed_team(&pool, "mclaren").await;
        seed_driver(&pool, "norris", "mclaren").await;
        seed_event(&pool, "gp-2025-sakhir", 4, json!([session("Race")])).await;

        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(
            dir.path(),
            4,
            "race.json",
            &json!({
                "session": "Race",
                "results": {
                    "first": { "driver": "norris", "position": 1, "points": 25.0 }
                }
            }),
        );

        let app = test_app(pool.clone(), dir.path());
        let (status, body) = post_json(app, "/api/results/race/2025/4").await;
        assert_eq!(status, StatusCode::OK, "body: {body}");

        let app = test_app(pool.clone(), dir.path());
        let (status, body) = post_json(app, "/api/results/race/2025/4").await;
        assert_eq!(status, StatusCode::CONFLICT, "body: {body}");
        assert_eq!(body["error"]["code"].as_str(), Some("conflict"));

        let norris = paddock_db::get_driver(&pool, "norris")
            .await
            .expect("query")
            .expect("driver");
        assert_eq!(norris.total_points, 25.0, "second trigger must not re-credit");
        assert_eq!(norris.season_points, Some(25.0));
        assert_eq!(norris.gp_entered, 1);
        assert_eq!(norris.victories, 1);
        assert_eq!(norris.podiums, 1);

        let mclaren = paddock_db::get_team(&pool, "mclaren")
            .await
            .expect("query")
            .expect("team");
        assert_eq!(mclaren.points, Some(25.0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn qualifying_trigger_conflicts_when_results_already_stored(pool: PgPool) {
        let mut qualifying = session("Qualifying");
        qualifying["session_result"] =
            json!({ "first": { "driver": "norris", "position": 1 } });
        seed_event(
            &pool,
            "gp-2025-sakhir",
            4,
            json!([qualifying, session("Race")]),
        )
        .await;

        // No artifact on disk: the guard must answer before the scraper run
        // or the artifact read gets a chance to fail.
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(pool.clone(), dir.path());
        let (status, body) = post_json(app, "/api/results/qualifying/2025/4").await;

        assert_eq!(status, StatusCode::CONFLICT, "body: {body}");
        assert_eq!(body["error"]["code"].as_str(), Some("conflict"));

        let event = paddock_db::get_event(&pool, "gp-2025-sakhir")
            .await
            .expect("query")
            .expect("event");
        let sessions = event.sessions.as_array().expect("sessions");
        assert_eq!(
            sessions[0]["session_result"]["first"]["driver"].as_str(),
            Some("norris"),
            "stored qualifying result survives the re-trigger"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn practices_trigger_skips_stored_sessions_then_conflicts(pool: PgPool) {
        let mut fp1 = session("Practice 1");
        fp1["session_result"] = json!({ "first": { "driver": "piastri", "position": 1 } });
        seed_event(
            &pool,
            "gp-2025-suzuka",
            3,
            json!([fp1, session("Practice 2"), session("Race")]),
        )
        .await;

        let dir = tempfile::tempdir().expect("tempdir");
        write_artifact(
            dir.path(),
            3,
            "practice_fp1.json",
            &json!({
                "session": "Practice 1",
                "results": { "first": { "driver": "someone-else", "position": 1 } }
            }),
        );
        write_artifact(
            dir.path(),
            3,
            "practice_fp2.json",
            &json!({
                "session": "Practice 2",
                "results": { "first": { "driver": "norris", "position": 1 } }
            }),
        );

        let app = test_app(pool.clone(), dir.path());
        let (status, body) = post_json(app, "/api/results/practices/2025/3").await;

        assert_eq!(status, StatusCode::OK, "body: {body}");
        let sessions = body["data"]["sessions"].as_array().expect("sessions");
        assert_eq!(
            sessions[0]["session_result"]["first"]["driver"].as_str(),
            Some("piastri"),
            "stored Practice 1 survives even with a fresh artifact on disk"
        );
        assert_eq!(
            sessions[1]["session_result"]["first"]["driver"].as_str(),
            Some("norris"),
            "empty Practice 2 takes its artifact"
        );

        // Every practice session now holds results, so a re-trigger is refused.
        let app = test_app(pool, dir.path());
        let (status, body) = post_json(app, "/api/results/practices/2025/3").await;
        assert_eq!(status, StatusCode::CONFLICT, "body: {body}");
        assert_eq!(body["error"]["code"].as_str(), Some("conflict"));
    }
}

use crate::{
    routes::{
        import_export::{get_export_students, put_import_students},
        sse::sse_feed,
        students::{delete_student, get_student, get_students, post_student, put_student},
    },
    state::AppState,
};
use axum::{Router, routing::get};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub mod import_export;
pub mod sse;
pub mod students;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/students", get(get_students).post(post_student))
        .route(
            "/students/{id}",
            get(get_student).put(put_student).delete(delete_student),
        )
        .route(
            "/import_export/students",
            get(get_export_students).put(put_import_students),
        )
        .route("/sse_feed", get(sse_feed))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStudentStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn sse_feed_is_an_event_stream() {
        let app = router(AppState::with_store(Arc::new(
            InMemoryStudentStore::default(),
        )));

        let response = app
            .oneshot(Request::builder().uri("/sse_feed").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let app = router(AppState::with_store(Arc::new(
            InMemoryStudentStore::default(),
        )));

        let response = app
            .oneshot(Request::builder().uri("/teachers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

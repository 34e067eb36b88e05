// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, analytics_handlers, attendance_handlers, auth_handlers, leave_handlers,
        mw_admin, mw_auth, user_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public ---
    let public_routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/login", post(auth_handlers::handle_login))
        .route("/api/logout", post(auth_handlers::handle_logout))
        .route("/api/register", post(auth_handlers::handle_register));

    // --- Admin only ---
    let admin_routes = Router::new()
        .route("/api/teachers/", post(admin_handlers::create_teacher))
        .route(
            "/api/teachers/{id}",
            put(admin_handlers::update_teacher).delete(admin_handlers::delete_teacher),
        )
        .route("/api/students/", post(admin_handlers::create_student))
        .route(
            "/api/students/{id}",
            put(admin_handlers::update_student).delete(admin_handlers::delete_student),
        )
        .route("/api/students/{id}/face", put(admin_handlers::update_face_data))
        .route("/api/subjects/", post(admin_handlers::create_subject))
        .route(
            "/api/subjects/{id}",
            put(admin_handlers::update_subject).delete(admin_handlers::delete_subject),
        )
        .route(
            "/api/subjects/{id}/students/{student_id}",
            post(admin_handlers::enroll_student).delete(admin_handlers::unenroll_student),
        )
        .route("/api/timetable/", post(admin_handlers::create_timetable_entry))
        .route(
            "/api/timetable/{id}",
            put(admin_handlers::update_timetable_entry)
                .delete(admin_handlers::delete_timetable_entry),
        )
        .route("/api/seed-demo-students", post(admin_handlers::seed_demo_students))
        .route("/api/seed-attendance", post(admin_handlers::seed_attendance))
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Admin or teacher ---
    let staff_routes = Router::new()
        .route("/api/attendance/mark", post(attendance_handlers::mark))
        .route("/api/attendance/recognize", post(attendance_handlers::recognize))
        .route("/api/attendance/capture/{id}", get(attendance_handlers::capture_status))
        .route("/api/attendance/capture/{id}/start", post(attendance_handlers::start_capture))
        .route("/api/attendance/capture/{id}/frame", post(attendance_handlers::submit_frame))
        .route("/api/attendance/capture/{id}/stop", post(attendance_handlers::stop_capture))
        .route("/api/leaves/", post(leave_handlers::create_leave))
        .route("/api/leaves/{id}/resolve", put(leave_handlers::resolve_leave))
        .route("/api/leaves/{id}/reject", put(leave_handlers::reject_leave))
        .route_layer(middleware::from_fn(mw_admin::require_staff));

    // --- Any logged-in user ---
    // require_auth wraps everything above, including the admin and staff routes
    let authenticated_routes = Router::new()
        .route("/api/me", get(auth_handlers::me))
        .route("/api/teachers/", get(user_handlers::list_teachers))
        .route("/api/teachers/{id}/on-leave", get(leave_handlers::teacher_on_leave))
        .route("/api/students/", get(user_handlers::list_students))
        .route("/api/students/{id}/subjects", get(user_handlers::student_subjects))
        .route("/api/subjects/", get(user_handlers::list_subjects))
        .route("/api/subjects/{id}/students", get(user_handlers::subject_students))
        .route("/api/timetable/", get(user_handlers::list_timetable))
        .route("/api/timetable/conflicts", get(user_handlers::timetable_conflicts))
        .route("/api/stats", get(user_handlers::stats))
        .route("/api/attendance/class/{id}", get(attendance_handlers::class_attendance))
        .route("/api/attendance/counts", get(attendance_handlers::counts))
        .route("/api/analytics/forecast", get(analytics_handlers::forecast))
        .route("/api/analytics/timeslots", get(analytics_handlers::timeslots))
        .route("/api/leaves/", get(leave_handlers::list_leaves))
        .route("/api/substitutions/", get(leave_handlers::list_substitutions))
        .route("/api/substitutions/lookup", get(leave_handlers::lookup_substitution))
        .merge(admin_routes)
        .merge(staff_routes)
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}

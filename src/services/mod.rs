// src/services/mod.rs
pub mod analytics_service;
pub mod attendance_service;
pub mod auth_service;
pub mod capture_service;
pub mod leave_service;
pub mod recognition_service;
pub mod replacement;
pub mod seed_service;
pub mod store;
pub mod student_service;
pub mod subject_service;
pub mod teacher_service;
pub mod timetable_service;

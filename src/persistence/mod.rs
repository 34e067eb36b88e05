// src/persistence/mod.rs
//! Durable key-value layer. Every collection lives under one key as a JSON array.

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use crate::error::AppResult;
use async_trait::async_trait;

pub const TEACHERS_KEY: &str = "attendify-teachers";
pub const STUDENTS_KEY: &str = "attendify-students";
pub const SUBJECTS_KEY: &str = "attendify-subjects";
pub const TIMETABLE_KEY: &str = "attendify-timetable";
pub const ATTENDANCE_KEY: &str = "attendify-attendance";
pub const LEAVES_KEY: &str = "attendify-leaves";
pub const SUBSTITUTIONS_KEY: &str = "attendify-substitutions";
/// Per-collection id high-water marks.
pub const SEQUENCES_KEY: &str = "attendify-sequences";

#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Overwrites the whole value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

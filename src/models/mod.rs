// src/models/mod.rs
pub mod attendance;
pub mod leave;
pub mod student;
pub mod subject;
pub mod teacher;
pub mod timetable;
pub mod user;

/// Identifier assigned by the store, unique per collection.
pub type Id = i64;

/// Anything the store keeps in an id-addressed collection.
pub trait Record {
    fn id(&self) -> Id;
}

// src/services/store.rs
//! The attendance store: every collection held in memory, flushed to the
//! key-value backend after each mutation (whole-collection overwrite).
//!
//! Operations are split by concern over the `*_service` modules, each adding
//! an `impl AttendanceStore` block. A single `AttendanceStore` is shared behind
//! a `tokio::sync::Mutex`, so every mutation runs to completion before the next.

use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::AttendanceRecord,
        leave::{LeaveRequest, Substitution},
        student::Student,
        subject::Subject,
        teacher::Teacher,
        timetable::TimetableEntry,
        Id, Record,
    },
    persistence::{
        KvBackend, ATTENDANCE_KEY, LEAVES_KEY, SEQUENCES_KEY, STUDENTS_KEY, SUBJECTS_KEY,
        SUBSTITUTIONS_KEY, TEACHERS_KEY, TIMETABLE_KEY,
    },
    services::{auth_service::hash_password, replacement::ReplacementPolicy},
};
use chrono::{Local, NaiveDate};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

/// The current calendar day, local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// An id-addressed collection that remembers the highest id it ever handed out.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    last_id: Id,
}

impl<T: Record> Collection<T> {
    fn new(items: Vec<T>, last_id: Id) -> Self {
        let max_existing = items.iter().map(Record::id).max().unwrap_or(0);
        Self {
            items,
            last_id: last_id.max(max_existing),
        }
    }

    /// Next id, never reused even after the record holding it is deleted.
    pub fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn remove(&mut self, id: Id) -> Option<T> {
        let pos = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(pos))
    }

    /// Keeps the items matching `keep`, returns how many were dropped.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn last_id(&self) -> Id {
        self.last_id
    }
}

/// Id high-water marks, persisted under `SEQUENCES_KEY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Sequences {
    teachers: Id,
    students: Id,
    subjects: Id,
    timetable: Id,
    attendance: Id,
    leaves: Id,
    substitutions: Id,
}

/// The collections, named by persistence slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Teachers,
    Students,
    Subjects,
    Timetable,
    Attendance,
    Leaves,
    Substitutions,
}

impl Slot {
    fn key(self) -> &'static str {
        match self {
            Slot::Teachers => TEACHERS_KEY,
            Slot::Students => STUDENTS_KEY,
            Slot::Subjects => SUBJECTS_KEY,
            Slot::Timetable => TIMETABLE_KEY,
            Slot::Attendance => ATTENDANCE_KEY,
            Slot::Leaves => LEAVES_KEY,
            Slot::Substitutions => SUBSTITUTIONS_KEY,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// bcrypt cost for passwords set through the store.
    pub password_cost: u32,
}

pub struct AttendanceStore {
    backend: Arc<dyn KvBackend>,
    pub(crate) options: StoreOptions,
    pub(crate) policy: Box<dyn ReplacementPolicy>,
    pub(crate) teachers: Collection<Teacher>,
    pub(crate) students: Collection<Student>,
    pub(crate) subjects: Collection<Subject>,
    pub(crate) timetable: Collection<TimetableEntry>,
    pub(crate) attendance: Collection<AttendanceRecord>,
    pub(crate) leaves: Collection<LeaveRequest>,
    pub(crate) substitutions: Collection<Substitution>,
}

impl AttendanceStore {
    /// Loads every collection from the backend. Missing collections are seeded
    /// with demo data and written back; unparsable ones abort with `CorruptState`.
    pub async fn load(
        backend: Arc<dyn KvBackend>,
        options: StoreOptions,
        policy: Box<dyn ReplacementPolicy>,
    ) -> AppResult<Self> {
        tracing::info!("Loading attendance store (replacement policy: {})", policy.name());
        let kv = backend.as_ref();
        let cost = options.password_cost;

        let teachers = match read_collection(kv, TEACHERS_KEY).await? {
            Some(items) => items,
            None => seed_collection(kv, TEACHERS_KEY, demo_teachers(cost).await?).await?,
        };
        let students = match read_collection(kv, STUDENTS_KEY).await? {
            Some(items) => items,
            None => seed_collection(kv, STUDENTS_KEY, demo_students(cost).await?).await?,
        };
        let subjects = match read_collection(kv, SUBJECTS_KEY).await? {
            Some(items) => items,
            None => seed_collection(kv, SUBJECTS_KEY, demo_subjects()).await?,
        };
        let timetable = match read_collection(kv, TIMETABLE_KEY).await? {
            Some(items) => items,
            None => seed_collection(kv, TIMETABLE_KEY, demo_timetable()).await?,
        };
        let attendance = load_or_empty(kv, ATTENDANCE_KEY).await?;
        let leaves = load_or_empty(kv, LEAVES_KEY).await?;
        let substitutions = load_or_empty(kv, SUBSTITUTIONS_KEY).await?;

        let seq: Sequences = match kv.get(SEQUENCES_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| AppError::CorruptState {
                key: SEQUENCES_KEY.to_string(),
                source,
            })?,
            None => Sequences::default(),
        };

        let store = Self {
            backend,
            options,
            policy,
            teachers: Collection::new(teachers, seq.teachers),
            students: Collection::new(students, seq.students),
            subjects: Collection::new(subjects, seq.subjects),
            timetable: Collection::new(timetable, seq.timetable),
            attendance: Collection::new(attendance, seq.attendance),
            leaves: Collection::new(leaves, seq.leaves),
            substitutions: Collection::new(substitutions, seq.substitutions),
        };
        store.persist_sequences().await?;

        tracing::info!(
            "Store ready: {} teachers, {} students, {} subjects, {} timetable entries, {} attendance records, {} leaves",
            store.teachers.len(),
            store.students.len(),
            store.subjects.len(),
            store.timetable.len(),
            store.attendance.len(),
            store.leaves.len(),
        );
        Ok(store)
    }

    pub(crate) async fn hash(&self, raw_password: &str) -> AppResult<String> {
        hash_password(raw_password, self.options.password_cost).await
    }

    /// Writes the given collections (full overwrite) and the id marks.
    pub(crate) async fn persist(&self, slots: &[Slot]) -> AppResult<()> {
        for slot in slots {
            let json = match slot {
                Slot::Teachers => serde_json::to_string(self.teachers.all())?,
                Slot::Students => serde_json::to_string(self.students.all())?,
                Slot::Subjects => serde_json::to_string(self.subjects.all())?,
                Slot::Timetable => serde_json::to_string(self.timetable.all())?,
                Slot::Attendance => serde_json::to_string(self.attendance.all())?,
                Slot::Leaves => serde_json::to_string(self.leaves.all())?,
                Slot::Substitutions => serde_json::to_string(self.substitutions.all())?,
            };
            self.backend.set(slot.key(), &json).await?;
        }
        self.persist_sequences().await
    }

    async fn persist_sequences(&self) -> AppResult<()> {
        let seq = Sequences {
            teachers: self.teachers.last_id(),
            students: self.students.last_id(),
            subjects: self.subjects.last_id(),
            timetable: self.timetable.last_id(),
            attendance: self.attendance.last_id(),
            leaves: self.leaves.last_id(),
            substitutions: self.substitutions.last_id(),
        };
        self.backend.set(SEQUENCES_KEY, &serde_json::to_string(&seq)?).await
    }
}

async fn read_collection<T: DeserializeOwned>(
    kv: &dyn KvBackend,
    key: &str,
) -> AppResult<Option<Vec<T>>> {
    let Some(raw) = kv.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| AppError::CorruptState {
            key: key.to_string(),
            source,
        })
}

async fn seed_collection<T: Serialize>(
    kv: &dyn KvBackend,
    key: &str,
    items: Vec<T>,
) -> AppResult<Vec<T>> {
    tracing::info!("🌱 No data under '{}', seeding {} demo records", key, items.len());
    kv.set(key, &serde_json::to_string(&items)?).await?;
    Ok(items)
}

async fn load_or_empty<T: DeserializeOwned + Serialize>(
    kv: &dyn KvBackend,
    key: &str,
) -> AppResult<Vec<T>> {
    match read_collection(kv, key).await? {
        Some(items) => Ok(items),
        None => seed_collection(kv, key, Vec::new()).await,
    }
}

// --- Demo data (first run only) ---

async fn demo_teachers(cost: u32) -> AppResult<Vec<Teacher>> {
    let rows = [
        (1, "John Smith", "john@gmail.com", "johnsmith", "password123", "Mathematics"),
        (2, "Sarah Johnson", "sarah@gmail.com", "sarahj", "password456", "Science"),
        (3, "Mike Wilson", "mike@gmail.com", "mikew", "password789", "English"),
    ];
    let mut teachers = Vec::with_capacity(rows.len());
    for (id, name, email, username, password, subject) in rows {
        teachers.push(Teacher {
            id,
            name: name.into(),
            email: email.into(),
            username: username.into(),
            password_hash: hash_password(password, cost).await?,
            subject: Some(subject.into()),
            address: None,
        });
    }
    Ok(teachers)
}

async fn demo_students(cost: u32) -> AppResult<Vec<Student>> {
    let rows = [
        (1, "Manoj Raj", "manoj@gmail.com", "@manojRaj", "manoj", "First", 10, 2),
        (2, "mario Dil", "mario@gmail.com", "@parakas", "parakas", "First", 8, 10),
        (3, "Kiara Advani", "kiara@gmail.com", "@kiara", "Manag", "Second", 15, 3),
    ];
    let mut students = Vec::with_capacity(rows.len());
    for (id, name, email, username, password, semester, present, absent) in rows {
        students.push(Student {
            id,
            name: name.into(),
            email: email.into(),
            username: username.into(),
            password_hash: hash_password(password, cost).await?,
            course: "BIT".into(),
            semester: semester.into(),
            total_present_day: present,
            total_absence_day: absent,
            face_data: None,
        });
    }
    Ok(students)
}

fn demo_subjects() -> Vec<Subject> {
    let rows: [(Id, &str, &str, Id, &[Id]); 4] = [
        (1, "Advanced Java", "CS301", 1, &[1, 2]),
        (2, "Data Structures", "CS201", 2, &[1, 3]),
        (3, "Database Management", "CS401", 3, &[2, 3]),
        (4, "Web Development", "CS501", 1, &[1]),
    ];
    rows.into_iter()
        .map(|(id, name, code, teacher_id, enrolled)| Subject {
            id,
            name: name.into(),
            code: code.into(),
            course: "Computer Science".into(),
            teacher_id: Some(teacher_id),
            enrolled_students: enrolled.iter().copied().collect::<BTreeSet<_>>(),
        })
        .collect()
}

fn demo_timetable() -> Vec<TimetableEntry> {
    let rows = [
        (1, "Monday", "09:00 - 10:00", 1, 1, "Room 101"),
        (2, "Monday", "10:00 - 11:00", 2, 2, "Room 102"),
        (3, "Tuesday", "09:00 - 10:00", 3, 3, "Room 103"),
        (4, "Tuesday", "10:00 - 11:00", 4, 1, "Room 104"),
        (5, "Wednesday", "09:00 - 10:00", 1, 1, "Room 101"),
    ];
    rows.into_iter()
        .map(|(id, day, slot, subject_id, teacher_id, room)| TimetableEntry {
            id,
            day: day.into(),
            time_slot: slot.into(),
            subject_id,
            teacher_id,
            room: room.into(),
            course: "Computer Science".into(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::{persistence::MemoryKv, services::replacement::FirstOtherTeacher};

    /// Lowest cost bcrypt accepts.
    pub const TEST_COST: u32 = 4;

    pub fn fast_options() -> StoreOptions {
        StoreOptions {
            password_cost: TEST_COST,
        }
    }

    pub async fn store_on(kv: MemoryKv) -> AttendanceStore {
        AttendanceStore::load(Arc::new(kv), fast_options(), Box::new(FirstOtherTeacher))
            .await
            .unwrap()
    }

    /// Store seeded with the demo teachers, students, subjects and timetable.
    pub async fn demo_store() -> AttendanceStore {
        store_on(MemoryKv::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::persistence::MemoryKv;

    #[tokio::test]
    async fn first_run_seeds_and_persists_demo_data() {
        let kv = MemoryKv::new();
        let store = store_on(kv.clone()).await;

        assert_eq!(store.teachers.len(), 3);
        assert_eq!(store.students.len(), 3);
        assert_eq!(store.subjects.len(), 4);
        assert_eq!(store.timetable.len(), 5);
        assert!(store.attendance.is_empty());

        let raw = kv.get(TEACHERS_KEY).await.unwrap().unwrap();
        let persisted: Vec<Teacher> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.len(), 3);
        assert!(!raw.contains("password123"), "passwords are stored hashed");
        assert_eq!(kv.get(ATTENDANCE_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn stored_collections_win_over_demo_data() {
        let kv = MemoryKv::new();
        kv.set(TEACHERS_KEY, "[]").await.unwrap();

        let store = store_on(kv).await;
        assert!(store.teachers.is_empty());
        assert_eq!(store.students.len(), 3);
    }

    #[tokio::test]
    async fn corrupt_collection_aborts_loading() {
        let kv = MemoryKv::new();
        kv.set(SUBJECTS_KEY, "{ definitely not an array").await.unwrap();

        let policy = Box::new(crate::services::replacement::FirstOtherTeacher);
        let result = AttendanceStore::load(Arc::new(kv), fast_options(), policy).await;
        match result {
            Err(AppError::CorruptState { key, .. }) => assert_eq!(key, SUBJECTS_KEY),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("corrupt state must not load"),
        }
    }

    #[test]
    fn collection_never_reuses_ids() {
        let mut c = Collection::new(demo_timetable(), 0);
        assert_eq!(c.next_id(), 6);
        c.remove(5);
        assert_eq!(c.next_id(), 7);
        assert_eq!(Collection::new(Vec::<TimetableEntry>::new(), 12).next_id(), 13);
    }
}

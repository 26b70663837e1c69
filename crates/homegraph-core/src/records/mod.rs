//! Household records and how they are loaded

pub mod loader;
pub mod memory;
pub mod model;
pub mod store;

pub use loader::{LoaderConfig, RecordCaps, RecordLoader};
pub use memory::MemoryRecordStore;
pub use model::{
    CalendarEvent, HouseholdRecord, HouseholdRecords, ImportantDate, LearnedPreference, Location,
    Person, Preference, RecordKind, ServiceVisit, SpendingItem, Task, Vendor,
};
pub use store::{HouseholdRecordStore, ReadWindow};

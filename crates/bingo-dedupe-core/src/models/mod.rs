pub mod entity;
pub mod ignores;
pub mod records;
pub mod registry;

pub use entity::{
    Author, Book, DEFAULT_TITLE_AUTHOR_SEPARATOR, Entity, EntityKind, MULTI_AUTHOR_SEPARATOR,
    TitleAuthor,
};
pub use ignores::IgnoreRegistry;
pub use records::{Recorded, RecordedDupes, RecordedIgnores};
pub use registry::{DuplicateRegistry, ValueOverlap};

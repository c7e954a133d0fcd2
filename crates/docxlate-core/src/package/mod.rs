pub mod ooxml;
pub mod relationships;

pub use ooxml::{relationships_part_for, OoxmlPackage};
pub use relationships::{Relationship, RelationshipIdAllocator, RelationshipsPart, TargetMode};

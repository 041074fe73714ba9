//! Java classfile decoding: identities, constant pool, members and
//! whole-class analysis

pub mod analysis;
pub mod annotation;
pub mod class_id;
pub mod constant_pool;
pub mod defs;
pub mod member;
pub mod reader;
pub mod visibility;

pub use analysis::{ClassAnalysis, InnerInfo};
pub use class_id::{ClassId, FileKind};
pub use constant_pool::{Constant, ConstantPool, MemberRef, NameAndType, PoolEntry, RawPool};
pub use member::{MemberEntry, MemberKind};
pub use reader::ByteReader;
pub use visibility::Visibility;

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

#[macro_use]
mod constant_pool;
mod access_flags;
pub mod attributes;
mod class_file;
pub mod codec;
pub mod descriptor;
mod error;
mod parser;
mod writer;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use attributes::{AttributeInfo, Attributes, TypedAttribute};
pub use constant_pool::{
    ClassInfo, ConstantPool, CpInfo, CpTag, DynamicInfo, MethodHandleInfo, MethodTypeInfo,
    ModuleInfo, NameAndTypeInfo, PackageInfo, RefInfo, StringInfo,
};
pub use error::ClassFileError;
pub use parser::Parser;
pub use writer::Serialize;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

use std::io::Write;

use byteorder::BigEndian;

use crate::{
    attributes::{
        Annotation, AttributeInfo, Attributes, CodeAttribute, ElementValue, ElementValuePair,
        ExceptionTableEntry, ExceptionsAttribute, InnerClass, InnerClassesAttribute,
        LocalVariable, LocalVariableTableAttribute, SignatureAttribute,
    },
    class_file::{FieldInfo, MethodInfo},
    codec,
    constant_pool::CpInfo,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, Result,
};

/// Encodes a class file construct in its wire format.
///
/// Sequences are prefixed by their length as a `u16`, which is how almost
/// every table in a class file is laid out.
pub trait Serialize {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()>;
}

macro_rules! serialize_primitive {
    ($($t:ty),*) => {
        $(
            impl Serialize for $t {
                fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
                    codec::write::<$t, BigEndian>(writer, *self)
                }
            }
        )*
    };
}

serialize_primitive!(u8, u16, u32, u64);

/// Converts a table length into the width of its prefix.
pub(crate) fn length_prefix<L: TryFrom<usize>>(length: usize) -> Result<L> {
    L::try_from(length).map_err(|_| ClassFileError::TableTooLarge { length })
}

impl<A: Serialize> Serialize for Vec<A> {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        length_prefix::<u16>(self.len())?.serialize(writer)?;
        for elem in self {
            elem.serialize(writer)?;
        }
        Ok(())
    }
}

impl Serialize for AccessFlags {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

/// Writes `bytes` prefixed by their length as an `L`.
fn write_bytes<W: Write, L: Serialize + TryFrom<usize>>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    length_prefix::<L>(bytes.len())?.serialize(writer)?;
    writer.write_all(bytes)?;
    Ok(())
}

impl Serialize for CpInfo {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        (self.tag() as u8).serialize(writer)?;
        match self {
            CpInfo::Utf8(s) => write_bytes::<_, u16>(writer, &cesu8::to_java_cesu8(s)),
            CpInfo::Integer(i) => (*i as u32).serialize(writer),
            CpInfo::Float(f) => f.to_bits().serialize(writer),
            CpInfo::Long(l) => (*l as u64).serialize(writer),
            CpInfo::Double(d) => d.to_bits().serialize(writer),
            CpInfo::Class(c) => c.name_index.serialize(writer),
            CpInfo::String(s) => s.string_index.serialize(writer),
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                r.class_index.serialize(writer)?;
                r.name_and_type_index.serialize(writer)
            }
            CpInfo::NameAndType(n) => {
                n.name_index.serialize(writer)?;
                n.descriptor_index.serialize(writer)
            }
            CpInfo::MethodHandle(m) => {
                m.reference_kind.serialize(writer)?;
                m.reference_index.serialize(writer)
            }
            CpInfo::MethodType(m) => m.descriptor_index.serialize(writer),
            CpInfo::Dynamic(d) | CpInfo::InvokeDynamic(d) => {
                d.bootstrap_method_attr_index.serialize(writer)?;
                d.name_and_type_index.serialize(writer)
            }
            CpInfo::Module(m) => m.name_index.serialize(writer),
            CpInfo::Package(p) => p.name_index.serialize(writer),
        }
    }
}

impl Serialize for ConstantPool {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.count().serialize(writer)?;
        for (_, cp_info) in self.iter() {
            cp_info.serialize(writer)?;
        }
        Ok(())
    }
}

impl Serialize for AttributeInfo {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.attribute_name_index.serialize(writer)?;
        write_bytes::<_, u32>(writer, &self.info)
    }
}

impl Serialize for Attributes {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.0.serialize(writer)
    }
}

impl Serialize for FieldInfo {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)
    }
}

impl Serialize for MethodInfo {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)
    }
}

impl Serialize for ClassFile {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        0xCAFEBABEu32.serialize(writer)?;
        self.minor_version.serialize(writer)?;
        self.major_version.serialize(writer)?;
        self.constant_pool.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        self.this_class.serialize(writer)?;
        self.super_class.serialize(writer)?;
        self.interfaces.serialize(writer)?;
        self.fields.serialize(writer)?;
        self.methods.serialize(writer)?;
        self.attributes.serialize(writer)
    }
}

impl Serialize for ExceptionTableEntry {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.start_pc.serialize(writer)?;
        self.end_pc.serialize(writer)?;
        self.handler_pc.serialize(writer)?;
        self.catch_type.serialize(writer)
    }
}

impl Serialize for CodeAttribute {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.max_stack.serialize(writer)?;
        self.max_locals.serialize(writer)?;
        write_bytes::<_, u32>(writer, &self.code)?;
        self.exception_table.serialize(writer)?;
        self.attributes.serialize(writer)
    }
}

impl Serialize for ExceptionsAttribute {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.exception_index_table.serialize(writer)
    }
}

impl Serialize for SignatureAttribute {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.signature_index.serialize(writer)
    }
}

impl Serialize for InnerClass {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.inner_class_info_index.serialize(writer)?;
        self.outer_class_info_index.serialize(writer)?;
        self.inner_name_index.serialize(writer)?;
        self.inner_class_access_flags.serialize(writer)
    }
}

impl Serialize for InnerClassesAttribute {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.classes.serialize(writer)
    }
}

impl Serialize for LocalVariable {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.start_pc.serialize(writer)?;
        self.length.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.index.serialize(writer)
    }
}

impl Serialize for LocalVariableTableAttribute {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.local_variable_table.serialize(writer)
    }
}

impl Serialize for Annotation {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.type_index.serialize(writer)?;
        self.element_value_pairs.serialize(writer)
    }
}

impl Serialize for ElementValuePair {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.element_name_index.serialize(writer)?;
        self.value.serialize(writer)
    }
}

impl Serialize for ElementValue {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            ElementValue::Const {
                tag,
                const_value_index,
            } => {
                tag.serialize(writer)?;
                const_value_index.serialize(writer)
            }
            ElementValue::Enum {
                type_name_index,
                const_name_index,
            } => {
                b'e'.serialize(writer)?;
                type_name_index.serialize(writer)?;
                const_name_index.serialize(writer)
            }
            ElementValue::Class { class_info_index } => {
                b'c'.serialize(writer)?;
                class_info_index.serialize(writer)
            }
            ElementValue::Annotation(annotation) => {
                b'@'.serialize(writer)?;
                annotation.serialize(writer)
            }
            ElementValue::Array(values) => {
                b'['.serialize(writer)?;
                values.serialize(writer)
            }
        }
    }
}

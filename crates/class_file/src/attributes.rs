// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7

use std::{fmt, io::Write};

use crate::{
    writer::{length_prefix, Serialize},
    AccessFlags, ClassFileError, ConstantPool, Parser, Result,
};

/// An attribute as it appears in a class file: a name and an opaque payload.
#[derive(PartialEq, Clone)]
pub struct AttributeInfo {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl AttributeInfo {
    pub fn from_typed<A: TypedAttribute>(attribute_name_index: u16, attribute: &A) -> Result<Self> {
        let mut info = Vec::new();
        attribute.serialize(&mut info)?;

        Ok(AttributeInfo {
            attribute_name_index,
            info,
        })
    }

    pub fn attribute_length(&self) -> u32 {
        self.info.len() as u32
    }

    pub fn name<'cp>(&self, constant_pool: &'cp ConstantPool) -> Result<&'cp str> {
        constant_pool.utf8_at(self.attribute_name_index)
    }

    /// Interprets the payload as `A`. The attribute's name must be `A::NAME`
    /// and the payload must be consumed entirely.
    pub fn view<A: TypedAttribute>(&self, constant_pool: &ConstantPool) -> Result<A> {
        let name = self.name(constant_pool)?;
        if name != A::NAME {
            return Err(ClassFileError::AttributeNameMismatch {
                expected: A::NAME,
                found: name.to_owned(),
            });
        }

        let mut parser = Parser::new(&self.info);
        let attribute = A::parse(&mut parser)?;
        parser.finish()?;

        Ok(attribute)
    }
}
impl fmt::Debug for AttributeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeInfo")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Attributes(pub Vec<AttributeInfo>);
impl Attributes {
    pub fn iter(&self) -> std::slice::Iter<'_, AttributeInfo> {
        self.0.iter()
    }

    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&AttributeInfo> {
        self.0
            .iter()
            .find(|a| a.name(constant_pool).map_or(false, |n| n == name))
    }

    pub fn get<A: TypedAttribute>(&self, constant_pool: &ConstantPool) -> Result<Option<A>> {
        self.find_by_name(A::NAME, constant_pool)
            .map(|a| a.view(constant_pool))
            .transpose()
    }

    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
        self.get(constant_pool)
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a AttributeInfo;
    type IntoIter = std::slice::Iter<'a, AttributeInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A structured reading of an attribute's payload.
pub trait TypedAttribute: Sized + Serialize {
    const NAME: &'static str;

    fn parse(parser: &mut Parser<'_>) -> Result<Self>;
}

#[derive(Debug, PartialEq, Clone)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl TypedAttribute for CodeAttribute {
    const NAME: &'static str = "Code";

    fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        parser.parse_code_attribute()
    }
}

/// Checked exceptions a method may throw, as `Class` constant indices.
#[derive(Debug, PartialEq, Clone)]
pub struct ExceptionsAttribute {
    pub exception_index_table: Vec<u16>,
}
impl TypedAttribute for ExceptionsAttribute {
    const NAME: &'static str = "Exceptions";

    fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(Self {
            exception_index_table: parser.parse_u16_table()?,
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct SignatureAttribute {
    pub signature_index: u16,
}
impl SignatureAttribute {
    pub fn signature<'cp>(&self, constant_pool: &'cp ConstantPool) -> Result<&'cp str> {
        constant_pool.utf8_at(self.signature_index)
    }
}
impl TypedAttribute for SignatureAttribute {
    const NAME: &'static str = "Signature";

    fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        Ok(Self {
            signature_index: parser.read_u16()?,
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    // Zero when the inner class is not a member.
    pub outer_class_info_index: u16,
    // Zero when the inner class is anonymous.
    pub inner_name_index: u16,
    pub inner_class_access_flags: AccessFlags,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InnerClassesAttribute {
    pub classes: Vec<InnerClass>,
}
impl TypedAttribute for InnerClassesAttribute {
    const NAME: &'static str = "InnerClasses";

    fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        let number_of_classes = parser.read_u16()?;
        let classes = (0..number_of_classes)
            .map(|_| parser.parse_inner_class())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { classes })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct LocalVariableTableAttribute {
    pub local_variable_table: Vec<LocalVariable>,
}
impl TypedAttribute for LocalVariableTableAttribute {
    const NAME: &'static str = "LocalVariableTable";

    fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        let local_variable_table_length = parser.read_u16()?;
        let local_variable_table = (0..local_variable_table_length)
            .map(|_| parser.parse_local_variable())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            local_variable_table,
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Annotation {
    // A field descriptor naming the annotation interface.
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ElementValuePair {
    pub element_name_index: u16,
    pub value: ElementValue,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ElementValue {
    /// Primitive and `String` constants; `tag` is one of `BCDFIJSZs`.
    Const { tag: u8, const_value_index: u16 },
    Enum {
        // A field descriptor naming the enum class.
        type_name_index: u16,
        const_name_index: u16,
    },
    Class {
        // A return descriptor, `V` standing for `void.class`.
        class_info_index: u16,
    },
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct ParameterAnnotation {
    pub annotations: Vec<Annotation>,
}

macro_rules! annotations_attribute {
    ($name:ident) => {
        #[derive(Debug, PartialEq, Clone)]
        pub struct $name {
            pub annotations: Vec<Annotation>,
        }
        impl TypedAttribute for $name {
            const NAME: &'static str = stringify!($name);

            fn parse(parser: &mut Parser<'_>) -> Result<Self> {
                Ok(Self {
                    annotations: parser.parse_annotations()?,
                })
            }
        }
        impl Serialize for $name {
            fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
                self.annotations.serialize(writer)
            }
        }
    };
}

macro_rules! parameter_annotations_attribute {
    ($name:ident) => {
        #[derive(Debug, PartialEq, Clone)]
        pub struct $name {
            // The i'th entry holds the annotations of the i'th formal parameter.
            pub parameter_annotations: Vec<ParameterAnnotation>,
        }
        impl $name {
            pub fn num_parameters(&self) -> usize {
                self.parameter_annotations.len()
            }
        }
        impl TypedAttribute for $name {
            const NAME: &'static str = stringify!($name);

            fn parse(parser: &mut Parser<'_>) -> Result<Self> {
                Ok(Self {
                    parameter_annotations: parser.parse_parameter_annotations()?,
                })
            }
        }
        impl Serialize for $name {
            fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
                length_prefix::<u8>(self.num_parameters())?.serialize(writer)?;
                for parameter_annotation in &self.parameter_annotations {
                    parameter_annotation.annotations.serialize(writer)?;
                }
                Ok(())
            }
        }
    };
}

annotations_attribute!(RuntimeVisibleAnnotations);
annotations_attribute!(RuntimeInvisibleAnnotations);
parameter_annotations_attribute!(RuntimeVisibleParameterAnnotations);
parameter_annotations_attribute!(RuntimeInvisibleParameterAnnotations);

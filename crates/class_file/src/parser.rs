use std::{
    borrow::Cow,
    io::{Cursor, Read},
    marker::PhantomData,
};

use byteorder::{BigEndian, ByteOrder};

use crate::{
    attributes::{
        Annotation, AttributeInfo, Attributes, CodeAttribute, ElementValue, ElementValuePair,
        ExceptionTableEntry, InnerClass, LocalVariable, ParameterAnnotation,
    },
    class_file::{FieldInfo, MethodInfo},
    codec::{self, Primitive},
    constant_pool::{
        ClassInfo, CpInfo, CpTag, DynamicInfo, MethodHandleInfo, MethodTypeInfo, ModuleInfo,
        NameAndTypeInfo, PackageInfo, RefInfo, StringInfo,
    },
    AccessFlags, ClassFile, ClassFileError, ConstantPool, Result,
};

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;
// JDK 1.0.2 through JDK 25.
const SUPPORTED_MAJOR_VERSIONS: std::ops::RangeInclusive<u16> = 45..=69;
// Nested arrays and annotations inside one element value.
const MAX_ELEMENT_VALUE_DEPTH: usize = 64;

pub struct Parser<'a, E: ByteOrder = BigEndian> {
    r: Cursor<&'a [u8]>,
    phantom: PhantomData<E>,
}

impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_byte_order(buf)
    }
}

impl<'a, E: ByteOrder> Parser<'a, E> {
    pub fn with_byte_order(buf: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(buf),
            phantom: PhantomData,
        }
    }

    pub fn position(&self) -> u64 {
        self.r.position()
    }

    fn remaining(&self) -> usize {
        self.r.get_ref().len().saturating_sub(self.r.position() as usize)
    }

    /// Fails unless every byte of the input has been consumed.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            _ => Err(ClassFileError::TrailingBytes {
                offset: self.position(),
            }),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;
        let interfaces = (0..interfaces_count)
            .map(|_| self.read_u16())
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes()?;
        self.finish()?;

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        if !SUPPORTED_MAJOR_VERSIONS.contains(&major) {
            return Err(ClassFileError::UnsupportedVersion { major, minor });
        }
        Ok((major, minor))
    }

    pub fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        let slots = (constant_pool_count as usize).saturating_sub(1);
        let mut constant_pool = ConstantPool::new();
        while constant_pool.slots() < slots {
            let cp_info = self.parse_cp_info()?;
            if cp_info.is_wide() && constant_pool.slots() + 2 > slots {
                return Err(ClassFileError::ConstantPoolOverrun);
            }
            constant_pool.push(cp_info)?;
        }
        Ok(constant_pool)
    }

    pub fn parse_cp_info(&mut self) -> Result<CpInfo> {
        let offset = self.position();
        let tag = self.read_u8()?;
        let tag = CpTag::try_from(tag).map_err(|tag| ClassFileError::UnknownTag { tag, offset })?;

        Ok(match tag {
            CpTag::Utf8 => CpInfo::Utf8(self.parse_utf8()?),
            CpTag::Integer => CpInfo::Integer(self.read_u32()? as i32),
            CpTag::Float => CpInfo::Float(f32::from_bits(self.read_u32()?)),
            CpTag::Long => CpInfo::Long(self.read_u64()? as i64),
            CpTag::Double => CpInfo::Double(f64::from_bits(self.read_u64()?)),
            CpTag::Class => CpInfo::Class(ClassInfo {
                name_index: self.read_u16()?,
            }),
            CpTag::String => CpInfo::String(StringInfo {
                string_index: self.read_u16()?,
            }),
            CpTag::FieldRef => CpInfo::FieldRef(self.parse_ref_info()?),
            CpTag::MethodRef => CpInfo::MethodRef(self.parse_ref_info()?),
            CpTag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            CpTag::NameAndType => CpInfo::NameAndType(NameAndTypeInfo {
                name_index: self.read_u16()?,
                descriptor_index: self.read_u16()?,
            }),
            CpTag::MethodHandle => CpInfo::MethodHandle(MethodHandleInfo {
                reference_kind: self.read_u8()?,
                reference_index: self.read_u16()?,
            }),
            CpTag::MethodType => CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: self.read_u16()?,
            }),
            CpTag::Dynamic => CpInfo::Dynamic(self.parse_dynamic_info()?),
            CpTag::InvokeDynamic => CpInfo::InvokeDynamic(self.parse_dynamic_info()?),
            CpTag::Module => CpInfo::Module(ModuleInfo {
                name_index: self.read_u16()?,
            }),
            CpTag::Package => CpInfo::Package(PackageInfo {
                name_index: self.read_u16()?,
            }),
        })
    }

    fn parse_utf8(&mut self) -> Result<String> {
        let length = self.read_u16()?;
        let offset = self.position();
        let bytes = self.read_bytes(length as usize)?;

        cesu8::from_java_cesu8(&bytes)
            .map(Cow::into_owned)
            .map_err(|_| ClassFileError::InvalidModifiedUtf8 { offset })
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_dynamic_info(&mut self) -> Result<DynamicInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    pub fn parse_attribute(&mut self) -> Result<AttributeInfo> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let info = self.read_bytes(attribute_length as usize)?;

        Ok(AttributeInfo {
            attribute_name_index,
            info,
        })
    }

    pub fn parse_attributes(&mut self) -> Result<Attributes> {
        let attributes_count = self.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub fn parse_code_attribute(&mut self) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes()?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    pub fn parse_u16_table(&mut self) -> Result<Vec<u16>> {
        let length = self.read_u16()?;
        (0..length).map(|_| self.read_u16()).collect()
    }

    pub fn parse_inner_class(&mut self) -> Result<InnerClass> {
        let inner_class_info_index = self.read_u16()?;
        let outer_class_info_index = self.read_u16()?;
        let inner_name_index = self.read_u16()?;
        let inner_class_access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);

        Ok(InnerClass {
            inner_class_info_index,
            outer_class_info_index,
            inner_name_index,
            inner_class_access_flags,
        })
    }

    pub fn parse_local_variable(&mut self) -> Result<LocalVariable> {
        let start_pc = self.read_u16()?;
        let length = self.read_u16()?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let index = self.read_u16()?;

        Ok(LocalVariable {
            start_pc,
            length,
            name_index,
            descriptor_index,
            index,
        })
    }

    pub fn parse_annotations(&mut self) -> Result<Vec<Annotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_annotation(0))
            .collect()
    }

    pub fn parse_parameter_annotations(&mut self) -> Result<Vec<ParameterAnnotation>> {
        let num_parameters = self.read_u8()?;
        (0..num_parameters)
            .map(|_| {
                Ok(ParameterAnnotation {
                    annotations: self.parse_annotations()?,
                })
            })
            .collect()
    }

    fn parse_annotation(&mut self, depth: usize) -> Result<Annotation> {
        let type_index = self.read_u16()?;
        let num_element_value_pairs = self.read_u16()?;
        let element_value_pairs = (0..num_element_value_pairs)
            .map(|_| {
                Ok(ElementValuePair {
                    element_name_index: self.read_u16()?,
                    value: self.parse_element_value(depth)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Annotation {
            type_index,
            element_value_pairs,
        })
    }

    fn parse_element_value(&mut self, depth: usize) -> Result<ElementValue> {
        let offset = self.position();
        if depth == MAX_ELEMENT_VALUE_DEPTH {
            return Err(ClassFileError::NestingTooDeep { offset });
        }
        let tag = self.read_u8()?;

        Ok(match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
                tag,
                const_value_index: self.read_u16()?,
            },
            b'e' => ElementValue::Enum {
                type_name_index: self.read_u16()?,
                const_name_index: self.read_u16()?,
            },
            b'c' => ElementValue::Class {
                class_info_index: self.read_u16()?,
            },
            b'@' => ElementValue::Annotation(self.parse_annotation(depth + 1)?),
            b'[' => {
                let num_values = self.read_u16()?;
                ElementValue::Array(
                    (0..num_values)
                        .map(|_| self.parse_element_value(depth + 1))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            _ => return Err(ClassFileError::UnknownElementValueTag { tag, offset }),
        })
    }

    fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let offset = self.position();
        if self.remaining() < length {
            return Err(ClassFileError::EndOfInput { offset });
        }

        let mut bytes = vec![0u8; length];
        self.r.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read<T: Primitive>(&mut self) -> Result<T> {
        codec::read::<T, E>(&mut self.r)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }
}




#[cfg(test)]
mod parse_attribute_tests {
    use super::*;

    #[test]
    fn it_should_consume_exactly_the_declared_length() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x02,                                  // two attributes
            0x00, 0x07, 0x00, 0x00, 0x00, 0x03, 1, 2, 3, // name #7, 3 bytes
            0x00, 0x08, 0x00, 0x00, 0x00, 0x00,          // name #8, empty
            0xde, 0xad,                                  // sentinel
        ];
        let mut parser = Parser::new(&bytes);
        let attributes = parser.parse_attributes().unwrap();

        assert_eq!(attributes.0.len(), 2);
        assert_eq!(attributes.0[0].info, [1, 2, 3]);
        assert_eq!(attributes.0[1].attribute_length(), 0);
        assert_eq!(parser.position(), 17);
        assert_eq!(parser.read_u16().unwrap(), 0xdead);
    }

    #[test]
    fn it_should_fail_if_the_payload_is_short() {
        let bytes = [0x00, 0x07, 0xff, 0xff, 0xff, 0xff, 1, 2];

        assert!(matches!(
            Parser::new(&bytes).parse_attribute(),
            Err(ClassFileError::EndOfInput { offset: 6 })
        ));
    }

    #[test]
    fn it_should_reject_unknown_element_value_tags() {
        let bytes = [0x00, 0x01, 0x00, 0x02, 0x00, 0x01, 0x00, 0x03, b'?'];

        assert!(matches!(
            Parser::new(&bytes).parse_annotations(),
            Err(ClassFileError::UnknownElementValueTag { tag: b'?', offset: 8 })
        ));
    }

    fn nested_arrays(depth: usize) -> Vec<u8> {
        // One annotation with one pair whose value is `depth` nested arrays.
        let mut bytes = vec![0x00, 0x01, 0x00, 0x02, 0x00, 0x01, 0x00, 0x03];
        for _ in 0..depth {
            bytes.extend_from_slice(&[b'[', 0x00, 0x01]);
        }
        bytes.extend_from_slice(&[b'c', 0x00, 0x04]);
        bytes
    }

    #[test]
    fn it_should_parse_nested_element_values_up_to_the_limit() {
        let bytes = nested_arrays(MAX_ELEMENT_VALUE_DEPTH - 1);
        let mut parser = Parser::new(&bytes);

        assert_eq!(parser.parse_annotations().unwrap().len(), 1);
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn it_should_reject_element_values_nested_too_deeply() {
        for depth in [MAX_ELEMENT_VALUE_DEPTH, 60_000] {
            let bytes = nested_arrays(depth);

            assert!(matches!(
                Parser::new(&bytes).parse_annotations(),
                Err(ClassFileError::NestingTooDeep { offset }) if offset == 8 + 3 * MAX_ELEMENT_VALUE_DEPTH as u64
            ));
        }
    }

    #[test]
    fn it_should_count_nested_annotations_towards_the_limit() {
        let mut bytes = vec![0x00, 0x01];
        for _ in 0..=MAX_ELEMENT_VALUE_DEPTH {
            // type #2, one pair named #3, value is an annotation
            bytes.extend_from_slice(&[0x00, 0x02, 0x00, 0x01, 0x00, 0x03, b'@']);
        }

        assert!(matches!(
            Parser::new(&bytes).parse_annotations(),
            Err(ClassFileError::NestingTooDeep { .. })
        ));
    }
}

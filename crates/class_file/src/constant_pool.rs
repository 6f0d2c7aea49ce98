use crate::{descriptor, ClassFileError, Result};

macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index: u16 = $index;
        match $cp.get(index)? {
            $crate::constant_pool::CpInfo::$i(ref n) => Ok(n),
            c => Err($crate::ClassFileError::TagMismatch {
                index,
                expected: $crate::constant_pool::CpTag::$i,
                found: c.tag(),
            }),
        }
    }};
}

// `constant_pool_count` is a u2 and counts the unused slot 0.
const MAX_SLOTS: usize = u16::MAX as usize - 1;

/// The constant pool of a class file. Indices are 1-based; slot 0 and the
/// slot following each `Long`/`Double` entry hold no entry.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct ConstantPool {
    cp_infos: Vec<Option<CpInfo>>,
}
impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its index.
    pub fn push(&mut self, cp_info: CpInfo) -> Result<u16> {
        let wide = cp_info.is_wide();
        let width = if wide { 2 } else { 1 };
        if self.cp_infos.len() + width > MAX_SLOTS {
            return Err(ClassFileError::ConstantPoolFull);
        }

        let index = self.count();
        self.cp_infos.push(Some(cp_info));
        if wide {
            self.cp_infos.push(None);
        }
        Ok(index)
    }

    pub(crate) fn slots(&self) -> usize {
        self.cp_infos.len()
    }

    /// The `constant_pool_count` value as written in the class file.
    pub fn count(&self) -> u16 {
        // `push` keeps the slot count at or below `MAX_SLOTS`.
        self.cp_infos.len() as u16 + 1
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        index
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get(i as usize))
            .and_then(Option::as_ref)
            .ok_or(ClassFileError::IndexOutOfRange(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        self.cp_infos
            .iter()
            .enumerate()
            .filter_map(|(i, cp_info)| Some((i as u16 + 1, cp_info.as_ref()?)))
    }

    pub fn utf8_at(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    pub fn class_at(&self, index: u16) -> Result<&ClassInfo> {
        matches_cp_info!(self, index, Class)
    }

    pub fn class_name_at(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = self.class_at(index)?;
        self.utf8_at(*name_index)
    }

    /// Like [`ConstantPool::class_name_at`], but array classes resolve to
    /// their element class. Arrays of primitives resolve to `None`.
    pub fn referenced_class_at(&self, index: u16) -> Result<Option<&str>> {
        let name = self.class_name_at(index)?;
        if !name.starts_with('[') {
            return Ok(Some(name));
        }

        descriptor::element_class_name(name)
    }

    pub fn string_at(&self, index: u16) -> Result<&str> {
        let StringInfo { string_index } = matches_cp_info!(self, index, String)?;
        self.utf8_at(*string_index)
    }

    pub fn integer_at(&self, index: u16) -> Result<i32> {
        matches_cp_info!(self, index, Integer).copied()
    }

    pub fn float_at(&self, index: u16) -> Result<f32> {
        matches_cp_info!(self, index, Float).copied()
    }

    pub fn long_at(&self, index: u16) -> Result<i64> {
        matches_cp_info!(self, index, Long).copied()
    }

    pub fn double_at(&self, index: u16) -> Result<f64> {
        matches_cp_info!(self, index, Double).copied()
    }

    pub fn field_ref_at(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, FieldRef)
    }

    pub fn method_ref_at(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, MethodRef)
    }

    pub fn interface_method_ref_at(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, InterfaceMethodRef)
    }

    /// Any of the three member reference kinds.
    pub fn member_ref_at(&self, index: u16) -> Result<&RefInfo> {
        match self.get(index)? {
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => Ok(r),
            c => Err(ClassFileError::TagMismatch {
                index,
                expected: CpTag::MethodRef,
                found: c.tag(),
            }),
        }
    }

    pub fn name_and_type_at(&self, index: u16) -> Result<&NameAndTypeInfo> {
        matches_cp_info!(self, index, NameAndType)
    }

    pub fn method_handle_at(&self, index: u16) -> Result<&MethodHandleInfo> {
        matches_cp_info!(self, index, MethodHandle)
    }

    pub fn method_type_at(&self, index: u16) -> Result<&MethodTypeInfo> {
        matches_cp_info!(self, index, MethodType)
    }

    pub fn dynamic_at(&self, index: u16) -> Result<&DynamicInfo> {
        matches_cp_info!(self, index, Dynamic)
    }

    pub fn invoke_dynamic_at(&self, index: u16) -> Result<&DynamicInfo> {
        matches_cp_info!(self, index, InvokeDynamic)
    }

    pub fn module_name_at(&self, index: u16) -> Result<&str> {
        let ModuleInfo { name_index } = matches_cp_info!(self, index, Module)?;
        self.utf8_at(*name_index)
    }

    pub fn package_name_at(&self, index: u16) -> Result<&str> {
        let PackageInfo { name_index } = matches_cp_info!(self, index, Package)?;
        self.utf8_at(*name_index)
    }
}
impl TryFrom<Vec<CpInfo>> for ConstantPool {
    type Error = ClassFileError;

    fn try_from(cp_infos: Vec<CpInfo>) -> Result<Self> {
        let mut constant_pool = ConstantPool::new();
        for cp_info in cp_infos {
            constant_pool.push(cp_info)?;
        }
        Ok(constant_pool)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum CpTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}
impl TryFrom<u8> for CpTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(CpTag::Utf8),
            3 => Ok(CpTag::Integer),
            4 => Ok(CpTag::Float),
            5 => Ok(CpTag::Long),
            6 => Ok(CpTag::Double),
            7 => Ok(CpTag::Class),
            8 => Ok(CpTag::String),
            9 => Ok(CpTag::FieldRef),
            10 => Ok(CpTag::MethodRef),
            11 => Ok(CpTag::InterfaceMethodRef),
            12 => Ok(CpTag::NameAndType),
            15 => Ok(CpTag::MethodHandle),
            16 => Ok(CpTag::MethodType),
            17 => Ok(CpTag::Dynamic),
            18 => Ok(CpTag::InvokeDynamic),
            19 => Ok(CpTag::Module),
            20 => Ok(CpTag::Package),
            _ => Err(value),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module(ModuleInfo),
    Package(PackageInfo),
}
impl CpInfo {
    pub fn tag(&self) -> CpTag {
        match self {
            CpInfo::Utf8(_) => CpTag::Utf8,
            CpInfo::Integer(_) => CpTag::Integer,
            CpInfo::Float(_) => CpTag::Float,
            CpInfo::Long(_) => CpTag::Long,
            CpInfo::Double(_) => CpTag::Double,
            CpInfo::Class(_) => CpTag::Class,
            CpInfo::String(_) => CpTag::String,
            CpInfo::FieldRef(_) => CpTag::FieldRef,
            CpInfo::MethodRef(_) => CpTag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => CpTag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => CpTag::NameAndType,
            CpInfo::MethodHandle(_) => CpTag::MethodHandle,
            CpInfo::MethodType(_) => CpTag::MethodType,
            CpInfo::Dynamic(_) => CpTag::Dynamic,
            CpInfo::InvokeDynamic(_) => CpTag::InvokeDynamic,
            CpInfo::Module(_) => CpTag::Module,
            CpInfo::Package(_) => CpTag::Package,
        }
    }

    /// `Long` and `Double` take up two constant pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, CpInfo::Long(_) | CpInfo::Double(_))
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClassInfo {
    // The value of the name_index item must be a valid index into the constant_pool table.
    // The constant_pool entry at that index must be a CONSTANT_Utf8_info structure (§4.4.7)
    // representing a valid binary class or interface name encoded in internal form (§4.2.1).
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StringInfo {
    pub string_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodHandleInfo {
    // 1 through 4 point at a CONSTANT_Fieldref_info, 5 through 9 at a method
    // or interface method reference.
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModuleInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PackageInfo {
    pub name_index: u16,
}

#[cfg(test)]
mod constant_pool_tests {
    use super::*;

    fn constant_pool() -> ConstantPool {
        ConstantPool::try_from(vec![
            CpInfo::Utf8("java/lang/String".into()),
            CpInfo::Class(ClassInfo { name_index: 1 }),
            CpInfo::Long(-1),
            CpInfo::Utf8("[[Ljava/util/List;".into()),
            CpInfo::Class(ClassInfo { name_index: 5 }),
            CpInfo::Utf8("[I".into()),
            CpInfo::Class(ClassInfo { name_index: 7 }),
        ])
        .unwrap()
    }

    #[test]
    fn it_should_skip_the_slot_after_a_wide_entry() {
        let constant_pool = constant_pool();

        assert_eq!(constant_pool.count(), 9);
        assert_eq!(constant_pool.long_at(3).unwrap(), -1);
        assert_eq!(constant_pool.utf8_at(5).unwrap(), "[[Ljava/util/List;");
        assert!(matches!(
            constant_pool.get(4),
            Err(ClassFileError::IndexOutOfRange(4))
        ));
    }

    #[test]
    fn it_should_reject_indices_outside_the_pool() {
        let constant_pool = constant_pool();

        for index in [0, 9, 10, u16::MAX] {
            assert!(matches!(
                constant_pool.get(index),
                Err(ClassFileError::IndexOutOfRange(i)) if i == index
            ));
        }
    }

    #[test]
    fn it_should_reject_accessors_on_the_wrong_tag() {
        let constant_pool = constant_pool();

        assert!(matches!(
            constant_pool.utf8_at(2),
            Err(ClassFileError::TagMismatch {
                index: 2,
                expected: CpTag::Utf8,
                found: CpTag::Class
            })
        ));
        assert!(matches!(
            constant_pool.class_name_at(1),
            Err(ClassFileError::TagMismatch { .. })
        ));
    }

    #[test]
    fn it_should_resolve_class_names() {
        let constant_pool = constant_pool();

        assert_eq!(constant_pool.class_name_at(2).unwrap(), "java/lang/String");
        assert_eq!(
            constant_pool.referenced_class_at(2).unwrap(),
            Some("java/lang/String")
        );
        assert_eq!(
            constant_pool.referenced_class_at(6).unwrap(),
            Some("java/util/List")
        );
        assert_eq!(constant_pool.referenced_class_at(8).unwrap(), None);
    }

    #[test]
    fn it_should_iterate_over_present_entries_only() {
        let indices = constant_pool()
            .iter()
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        assert_eq!(indices, [1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn it_should_refuse_entries_past_the_last_index() {
        let mut constant_pool = ConstantPool::new();
        for _ in 0..MAX_SLOTS - 1 {
            constant_pool.push(CpInfo::Integer(0)).unwrap();
        }

        assert!(matches!(
            constant_pool.push(CpInfo::Long(0)),
            Err(ClassFileError::ConstantPoolFull)
        ));
        assert_eq!(constant_pool.push(CpInfo::Integer(0)).unwrap(), 65534);
        assert_eq!(constant_pool.count(), u16::MAX);
        assert!(matches!(
            constant_pool.push(CpInfo::Integer(0)),
            Err(ClassFileError::ConstantPoolFull)
        ));
    }
}

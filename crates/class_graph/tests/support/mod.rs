#![allow(dead_code)]

use javelin_class_file::{
    AccessFlags, AttributeInfo, Attributes, ClassFile, ClassInfo, ConstantPool, CpInfo,
    FieldInfo, MethodInfo, NameAndTypeInfo, RefInfo, TypedAttribute,
};

/// Assembles small class files for the tests.
pub struct TestClass {
    pub constant_pool: ConstantPool,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    attributes: Vec<AttributeInfo>,
}
impl TestClass {
    /// A class without a superclass, so it references nothing by itself.
    pub fn new(name: &str) -> Self {
        let mut class = Self {
            constant_pool: ConstantPool::new(),
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        class.this_class = class.class(name);
        class
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        self.constant_pool.push(CpInfo::Utf8(s.to_owned())).unwrap()
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.constant_pool.push(CpInfo::Class(ClassInfo { name_index })).unwrap()
    }

    pub fn extends(mut self, name: &str) -> Self {
        self.super_class = self.class(name);
        self
    }

    pub fn implements(mut self, name: &str) -> Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.fields.push(FieldInfo {
            access_flags: AccessFlags::PRIVATE,
            name_index,
            descriptor_index,
            attributes: Attributes::default(),
        });
        self
    }

    pub fn method(mut self, name: &str, descriptor: &str, attributes: Vec<AttributeInfo>) -> Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.methods.push(MethodInfo {
            access_flags: AccessFlags::PUBLIC,
            name_index,
            descriptor_index,
            attributes: Attributes(attributes),
        });
        self
    }

    /// Adds a `Methodref` constant, as an `invoke*` instruction would need.
    pub fn calls(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        let class_index = self.class(owner);
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let name_and_type_index = self.constant_pool
            .push(CpInfo::NameAndType(NameAndTypeInfo {
                name_index,
                descriptor_index,
            }))
            .unwrap();
        self.constant_pool
            .push(CpInfo::MethodRef(RefInfo {
                class_index,
                name_and_type_index,
            }))
            .unwrap();
        self
    }

    pub fn attribute<A: TypedAttribute>(&mut self, attribute: &A) -> AttributeInfo {
        let name_index = self.utf8(A::NAME);
        AttributeInfo::from_typed(name_index, attribute).unwrap()
    }

    pub fn with_attribute(mut self, attribute: AttributeInfo) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> ClassFile {
        ClassFile {
            minor_version: 0,
            major_version: 61,
            constant_pool: self.constant_pool,
            access_flags: AccessFlags::PUBLIC | AccessFlags::SUPER,
            this_class: self.this_class,
            super_class: self.super_class,
            interfaces: self.interfaces,
            fields: self.fields,
            methods: self.methods,
            attributes: Attributes(self.attributes),
        }
    }

    pub fn bytes(self) -> Vec<u8> {
        self.build().to_bytes().unwrap()
    }
}

use std::collections::HashSet;

use javelin_class_file::{
    attributes::{
        Annotation, CodeAttribute, ElementValue, ExceptionsAttribute, InnerClassesAttribute,
        LocalVariableTableAttribute, RuntimeInvisibleAnnotations,
        RuntimeInvisibleParameterAnnotations, RuntimeVisibleAnnotations,
        RuntimeVisibleParameterAnnotations, SignatureAttribute,
    },
    descriptor::{descriptor_class_names, signature_class_names},
    Attributes, ClassFile, ConstantPool, CpInfo, Result,
};

/// Every class `class_file` refers to, in order of discovery and without
/// duplicates. Array classes contribute their element class.
///
/// Looks at the superclass and interfaces, the constant pool, field and
/// method descriptors, and the attributes that name types: signatures,
/// annotations, thrown exceptions, inner classes and local variables.
pub fn referenced_classes(class_file: &ClassFile) -> Result<Vec<String>> {
    let mut references = References::new(&class_file.constant_pool);

    if let Some(super_class) = class_file.super_class()? {
        references.add(super_class);
    }
    for interface in class_file.interface_names()? {
        references.add(interface);
    }

    references.constant_pool()?;

    for field in &class_file.fields {
        references.descriptor(field.descriptor_index)?;
        references.attributes(&field.attributes)?;
    }
    for method in &class_file.methods {
        references.descriptor(method.descriptor_index)?;
        references.attributes(&method.attributes)?;
    }
    references.attributes(&class_file.attributes)?;

    Ok(references.names)
}

struct References<'a> {
    constant_pool: &'a ConstantPool,
    names: Vec<String>,
    seen: HashSet<String>,
}
impl<'a> References<'a> {
    fn new(constant_pool: &'a ConstantPool) -> Self {
        Self {
            constant_pool,
            names: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn add(&mut self, name: &str) {
        if !self.seen.contains(name) {
            self.seen.insert(name.to_owned());
            self.names.push(name.to_owned());
        }
    }

    fn class(&mut self, index: u16) -> Result<()> {
        if let Some(name) = self.constant_pool.referenced_class_at(index)? {
            self.add(name);
        }
        Ok(())
    }

    fn descriptor(&mut self, index: u16) -> Result<()> {
        let descriptor = self.constant_pool.utf8_at(index)?;
        for name in descriptor_class_names(descriptor)? {
            self.add(&name);
        }
        Ok(())
    }

    fn signature(&mut self, index: u16) -> Result<()> {
        let signature = self.constant_pool.utf8_at(index)?;
        for name in signature_class_names(signature)? {
            self.add(&name);
        }
        Ok(())
    }

    fn name_and_type(&mut self, index: u16) -> Result<()> {
        let name_and_type = self.constant_pool.name_and_type_at(index)?;
        self.descriptor(name_and_type.descriptor_index)
    }

    fn constant_pool(&mut self) -> Result<()> {
        let constant_pool = self.constant_pool;
        for (index, cp_info) in constant_pool.iter() {
            match cp_info {
                CpInfo::Class(_) => self.class(index)?,
                CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                    self.class(r.class_index)?;
                    self.name_and_type(r.name_and_type_index)?;
                }
                CpInfo::NameAndType(n) => self.descriptor(n.descriptor_index)?,
                CpInfo::MethodHandle(m) => {
                    let r = constant_pool.member_ref_at(m.reference_index)?;
                    self.class(r.class_index)?;
                }
                CpInfo::MethodType(m) => self.descriptor(m.descriptor_index)?,
                CpInfo::Dynamic(d) | CpInfo::InvokeDynamic(d) => {
                    self.name_and_type(d.name_and_type_index)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn attributes(&mut self, attributes: &Attributes) -> Result<()> {
        let constant_pool = self.constant_pool;
        for attribute in attributes {
            // Attributes without a resolvable name are never interpreted.
            let Ok(name) = attribute.name(constant_pool) else {
                continue;
            };

            match name {
                "Signature" => {
                    let signature = attribute.view::<SignatureAttribute>(constant_pool)?;
                    self.signature(signature.signature_index)?;
                }
                "Exceptions" => {
                    let exceptions = attribute.view::<ExceptionsAttribute>(constant_pool)?;
                    for index in exceptions.exception_index_table {
                        self.class(index)?;
                    }
                }
                "InnerClasses" => {
                    let inner_classes = attribute.view::<InnerClassesAttribute>(constant_pool)?;
                    for inner_class in inner_classes.classes {
                        self.class(inner_class.inner_class_info_index)?;
                        if inner_class.outer_class_info_index != 0 {
                            self.class(inner_class.outer_class_info_index)?;
                        }
                    }
                }
                "Code" => {
                    let code = attribute.view::<CodeAttribute>(constant_pool)?;
                    for entry in &code.exception_table {
                        if entry.catch_type != 0 {
                            self.class(entry.catch_type)?;
                        }
                    }
                    self.attributes(&code.attributes)?;
                }
                "LocalVariableTable" => {
                    let table = attribute.view::<LocalVariableTableAttribute>(constant_pool)?;
                    for local_variable in table.local_variable_table {
                        self.descriptor(local_variable.descriptor_index)?;
                    }
                }
                "RuntimeVisibleAnnotations" => {
                    let annotations = attribute.view::<RuntimeVisibleAnnotations>(constant_pool)?;
                    self.annotations(&annotations.annotations)?;
                }
                "RuntimeInvisibleAnnotations" => {
                    let annotations =
                        attribute.view::<RuntimeInvisibleAnnotations>(constant_pool)?;
                    self.annotations(&annotations.annotations)?;
                }
                "RuntimeVisibleParameterAnnotations" => {
                    let annotations =
                        attribute.view::<RuntimeVisibleParameterAnnotations>(constant_pool)?;
                    for parameter in &annotations.parameter_annotations {
                        self.annotations(&parameter.annotations)?;
                    }
                }
                "RuntimeInvisibleParameterAnnotations" => {
                    let annotations =
                        attribute.view::<RuntimeInvisibleParameterAnnotations>(constant_pool)?;
                    for parameter in &annotations.parameter_annotations {
                        self.annotations(&parameter.annotations)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn annotations(&mut self, annotations: &[Annotation]) -> Result<()> {
        for annotation in annotations {
            self.annotation(annotation)?;
        }
        Ok(())
    }

    fn annotation(&mut self, annotation: &Annotation) -> Result<()> {
        self.descriptor(annotation.type_index)?;
        for pair in &annotation.element_value_pairs {
            self.element_value(&pair.value)?;
        }
        Ok(())
    }

    fn element_value(&mut self, element_value: &ElementValue) -> Result<()> {
        match element_value {
            ElementValue::Const { .. } => Ok(()),
            ElementValue::Enum {
                type_name_index, ..
            } => self.descriptor(*type_name_index),
            ElementValue::Class { class_info_index } => {
                // `void.class` is encoded as the return descriptor "V".
                if self.constant_pool.utf8_at(*class_info_index)? == "V" {
                    return Ok(());
                }
                self.descriptor(*class_info_index)
            }
            ElementValue::Annotation(annotation) => self.annotation(annotation),
            ElementValue::Array(values) => {
                for value in values {
                    self.element_value(value)?;
                }
                Ok(())
            }
        }
    }
}

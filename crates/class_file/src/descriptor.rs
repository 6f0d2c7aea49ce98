// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.3

use std::fmt;

use crate::{ClassFileError, Result};

const MAX_ARRAY_DIMENSIONS: usize = 255;
// Reference types nested inside one another, array dimensions included.
const MAX_SIGNATURE_DEPTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Object(String),
    Array(Box<FieldType>),
}
impl FieldType {
    pub fn parse(descriptor: &str) -> Result<FieldType> {
        match parse_field_type(descriptor, 0) {
            Some((field_type, "")) => Ok(field_type),
            _ => Err(malformed(descriptor)),
        }
    }

    /// The class named by this type once array dimensions are stripped.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            FieldType::Object(class_name) => Some(class_name),
            FieldType::Array(component) => component.class_name(),
            _ => None,
        }
    }
}
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Byte => write!(f, "B"),
            FieldType::Char => write!(f, "C"),
            FieldType::Double => write!(f, "D"),
            FieldType::Float => write!(f, "F"),
            FieldType::Int => write!(f, "I"),
            FieldType::Long => write!(f, "J"),
            FieldType::Short => write!(f, "S"),
            FieldType::Boolean => write!(f, "Z"),
            FieldType::Object(class_name) => write!(f, "L{};", class_name),
            FieldType::Array(component) => write!(f, "[{}", component),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameter_types: Vec<FieldType>,
    /// `None` for `void`.
    pub return_type: Option<FieldType>,
}
impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<MethodDescriptor> {
        parse_method_descriptor(descriptor).ok_or_else(|| malformed(descriptor))
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.parameter_types
            .iter()
            .chain(self.return_type.iter())
            .filter_map(FieldType::class_name)
    }
}

/// Class names mentioned by a field or method descriptor, in order of
/// appearance.
pub fn descriptor_class_names(descriptor: &str) -> Result<Vec<String>> {
    if descriptor.starts_with('(') {
        let method_descriptor = MethodDescriptor::parse(descriptor)?;
        Ok(method_descriptor.class_names().map(str::to_owned).collect())
    } else {
        let field_type = FieldType::parse(descriptor)?;
        Ok(field_type.class_name().map(str::to_owned).into_iter().collect())
    }
}

/// Strips the dimensions off an array descriptor and borrows the element
/// class name from it. Arrays of primitives yield `None`.
pub fn element_class_name(descriptor: &str) -> Result<Option<&str>> {
    let element = descriptor.trim_start_matches('[');
    if descriptor.len() - element.len() > MAX_ARRAY_DIMENSIONS {
        return Err(malformed(descriptor));
    }

    match parse_field_type(element, 0) {
        Some((FieldType::Object(_), "")) => Ok(Some(&element[1..element.len() - 1])),
        Some((_, "")) => Ok(None),
        _ => Err(malformed(descriptor)),
    }
}

fn malformed(descriptor: &str) -> ClassFileError {
    ClassFileError::MalformedDescriptor(descriptor.to_owned())
}

fn parse_field_type(s: &str, dimensions: usize) -> Option<(FieldType, &str)> {
    let field_type = match s.as_bytes().first()? {
        b'B' => FieldType::Byte,
        b'C' => FieldType::Char,
        b'D' => FieldType::Double,
        b'F' => FieldType::Float,
        b'I' => FieldType::Int,
        b'J' => FieldType::Long,
        b'S' => FieldType::Short,
        b'Z' => FieldType::Boolean,
        b'L' => return parse_object_type(&s[1..]),
        b'[' => {
            if dimensions == MAX_ARRAY_DIMENSIONS {
                return None;
            }
            let (component, rest) = parse_field_type(&s[1..], dimensions + 1)?;
            return Some((FieldType::Array(Box::new(component)), rest));
        }
        _ => return None,
    };

    Some((field_type, &s[1..]))
}

fn parse_object_type(s: &str) -> Option<(FieldType, &str)> {
    let end = s.find(';')?;
    let class_name = &s[..end];
    if class_name.is_empty() || class_name.contains(&['.', '['][..]) {
        return None;
    }

    Some((FieldType::Object(class_name.to_owned()), &s[end + 1..]))
}

fn parse_method_descriptor(s: &str) -> Option<MethodDescriptor> {
    let mut rest = s.strip_prefix('(')?;
    let mut parameter_types = Vec::new();
    while !rest.starts_with(')') {
        let (parameter_type, r) = parse_field_type(rest, 0)?;
        parameter_types.push(parameter_type);
        rest = r;
    }

    let return_type = match &rest[1..] {
        "V" => None,
        r => match parse_field_type(r, 0)? {
            (return_type, "") => Some(return_type),
            _ => return None,
        },
    };

    Some(MethodDescriptor {
        parameter_types,
        return_type,
    })
}

/// Class names mentioned by a generic `Signature` attribute value. Handles
/// class, method and field signatures; nested classes come out joined by `$`.
pub fn signature_class_names(signature: &str) -> Result<Vec<String>> {
    SignatureReader {
        signature,
        pos: 0,
        depth: 0,
        class_names: Vec::new(),
    }
    .read()
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.9.1
struct SignatureReader<'a> {
    signature: &'a str,
    pos: usize,
    depth: usize,
    class_names: Vec<String>,
}
impl<'a> SignatureReader<'a> {
    fn read(mut self) -> Result<Vec<String>> {
        if self.peek() == Some(b'<') {
            self.type_parameters()?;
        }

        if self.peek() == Some(b'(') {
            self.method_signature()?;
        } else {
            // A superclass followed by superinterfaces, or a single field type.
            if self.peek().is_none() {
                return Err(self.malformed());
            }
            while self.peek().is_some() {
                self.reference_type()?;
            }
        }

        if self.pos != self.signature.len() {
            return Err(self.malformed());
        }

        Ok(self.class_names)
    }

    fn method_signature(&mut self) -> Result<()> {
        self.expect(b'(')?;
        loop {
            match self.peek() {
                Some(b')') => break,
                Some(_) => self.java_type()?,
                None => return Err(self.malformed()),
            }
        }
        self.pos += 1;

        if self.peek() == Some(b'V') {
            self.pos += 1;
        } else {
            self.java_type()?;
        }

        while self.peek() == Some(b'^') {
            self.pos += 1;
            self.reference_type()?;
        }

        Ok(())
    }

    fn type_parameters(&mut self) -> Result<()> {
        self.expect(b'<')?;
        loop {
            match self.peek() {
                Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.malformed()),
            }

            self.identifier()?;
            self.expect(b':')?;
            // The class bound may be empty, interface bounds follow as ':'-prefixed types.
            if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                self.reference_type()?;
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                self.reference_type()?;
            }
        }
        self.pos += 1;

        Ok(())
    }

    fn java_type(&mut self) -> Result<()> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.pos += 1;
                Ok(())
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<()> {
        if self.depth == MAX_SIGNATURE_DEPTH {
            return Err(self.malformed());
        }
        self.depth += 1;
        let result = self.nested_reference_type();
        self.depth -= 1;
        result
    }

    fn nested_reference_type(&mut self) -> Result<()> {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => {
                self.pos += 1;
                self.identifier()?;
                self.expect(b';')
            }
            Some(b'[') => {
                self.pos += 1;
                self.java_type()
            }
            _ => Err(self.malformed()),
        }
    }

    fn class_type(&mut self) -> Result<()> {
        self.expect(b'L')?;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'<' | b';' | b'.') {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.malformed());
        }

        let mut class_name = self.signature[start..self.pos].to_owned();
        if self.peek() == Some(b'<') {
            self.type_arguments()?;
        }

        while self.peek() == Some(b'.') {
            self.pos += 1;
            self.class_names.push(class_name.clone());
            let inner = self.identifier()?;
            class_name.push('$');
            class_name.push_str(inner);
            if self.peek() == Some(b'<') {
                self.type_arguments()?;
            }
        }
        self.expect(b';')?;

        self.class_names.push(class_name);
        Ok(())
    }

    fn type_arguments(&mut self) -> Result<()> {
        self.expect(b'<')?;
        loop {
            match self.peek() {
                Some(b'>') => break,
                Some(b'*') => self.pos += 1,
                Some(b'+' | b'-') => {
                    self.pos += 1;
                    self.reference_type()?;
                }
                Some(_) => self.reference_type()?,
                None => return Err(self.malformed()),
            }
        }
        self.pos += 1;

        Ok(())
    }

    fn identifier(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'.' | b';' | b'[' | b'/' | b'<' | b'>' | b':') {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.malformed());
        }

        let signature = self.signature;
        Ok(&signature[start..self.pos])
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        if self.peek() != Some(expected) {
            return Err(self.malformed());
        }
        self.pos += 1;
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.signature.as_bytes().get(self.pos).copied()
    }

    fn malformed(&self) -> ClassFileError {
        malformed(self.signature)
    }
}

#[cfg(test)]
mod descriptor_tests {
    use super::*;

    #[test]
    fn it_should_parse_field_descriptors() {
        assert_eq!(FieldType::parse("I").unwrap(), FieldType::Int);
        assert_eq!(
            FieldType::parse("[[Ljava/lang/String;").unwrap(),
            FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Object(
                "java/lang/String".into()
            )))))
        );
    }

    #[test]
    fn it_should_reject_malformed_field_descriptors() {
        for descriptor in ["", "V", "Q", "L;", "Ljava/lang/String", "II", "La.b;", "["] {
            assert!(
                matches!(
                    FieldType::parse(descriptor),
                    Err(ClassFileError::MalformedDescriptor(_))
                ),
                "{descriptor:?}"
            );
        }
    }

    #[test]
    fn it_should_limit_array_dimensions() {
        let ok = format!("{}I", "[".repeat(255));
        let too_deep = format!("{}I", "[".repeat(256));

        assert!(FieldType::parse(&ok).is_ok());
        assert!(FieldType::parse(&too_deep).is_err());
        assert!(element_class_name(&too_deep).is_err());
    }

    #[test]
    fn it_should_parse_method_descriptors() {
        let method_descriptor =
            MethodDescriptor::parse("(I[JLjava/util/Map;)Ljava/lang/Object;").unwrap();

        assert_eq!(method_descriptor.parameter_types.len(), 3);
        assert_eq!(
            method_descriptor.class_names().collect::<Vec<_>>(),
            ["java/util/Map", "java/lang/Object"]
        );
        assert_eq!(MethodDescriptor::parse("()V").unwrap().return_type, None);
    }

    #[test]
    fn it_should_reject_malformed_method_descriptors() {
        for descriptor in ["()", "(V)V", "I)V", "(I", "()VV", "()Ljava/lang/Object"] {
            assert!(MethodDescriptor::parse(descriptor).is_err(), "{descriptor:?}");
        }
    }

    #[test]
    fn it_should_strip_arrays_from_element_names() {
        assert_eq!(
            element_class_name("[[Ljava/lang/String;").unwrap(),
            Some("java/lang/String")
        );
        assert_eq!(element_class_name("[B").unwrap(), None);
        assert!(element_class_name("[Ljava/lang/String").is_err());
    }

    #[test]
    fn it_should_round_trip_through_display() {
        let descriptor = "[Ljava/lang/Runnable;";
        assert_eq!(FieldType::parse(descriptor).unwrap().to_string(), descriptor);
    }

    #[test]
    fn it_should_collect_names_from_class_signatures() {
        assert_eq!(
            signature_class_names(
                "<K:Ljava/lang/Object;V::Ljava/lang/Comparable<-TV;>;>Ljava/util/AbstractMap<TK;TV;>;Ljava/io/Serializable;"
            )
            .unwrap(),
            [
                "java/lang/Object",
                "java/lang/Comparable",
                "java/util/AbstractMap",
                "java/io/Serializable"
            ]
        );
    }

    #[test]
    fn it_should_collect_names_from_method_signatures() {
        assert_eq!(
            signature_class_names(
                "<T:Ljava/lang/Object;>(Ljava/util/List<+TT;>;[TT;I)Ljava/util/Optional<*>;^Ljava/io/IOException;^TT;"
            )
            .unwrap(),
            [
                "java/lang/Object",
                "java/util/List",
                "java/util/Optional",
                "java/io/IOException"
            ]
        );
    }

    #[test]
    fn it_should_join_inner_classes_with_a_dollar() {
        assert_eq!(
            signature_class_names("Lmy/Outer<Ljava/lang/String;>.Inner<TT;>;").unwrap(),
            ["java/lang/String", "my/Outer", "my/Outer$Inner"]
        );
    }

    #[test]
    fn it_should_reject_malformed_signatures() {
        for signature in ["", "<T:>", "Ljava/util/List<", "(TT;", "TT", "Ljava/lang/Object;X"] {
            assert!(
                matches!(
                    signature_class_names(signature),
                    Err(ClassFileError::MalformedDescriptor(_))
                ),
                "{signature:?}"
            );
        }
    }

    #[test]
    fn it_should_reject_signatures_nested_too_deeply() {
        let too_deep = [
            "La<".repeat(20_000),
            format!("{}I", "[".repeat(20_000)),
            format!("{}Ljava/lang/Object;", "[".repeat(MAX_SIGNATURE_DEPTH)),
            format!("Ljava/util/List<{}Ljava/lang/Object;>;", "[".repeat(MAX_SIGNATURE_DEPTH)),
        ];
        for signature in too_deep {
            assert!(matches!(
                signature_class_names(&signature),
                Err(ClassFileError::MalformedDescriptor(_))
            ));
        }
    }

    #[test]
    fn it_should_accept_signatures_at_the_nesting_limit() {
        let signature = format!("{}Ljava/lang/String;", "[".repeat(MAX_SIGNATURE_DEPTH - 1));

        assert_eq!(
            signature_class_names(&signature).unwrap(),
            ["java/lang/String"]
        );
    }
}

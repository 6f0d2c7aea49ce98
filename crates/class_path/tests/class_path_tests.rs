use std::{env, fs, io::Write, path::Path};

use javelin_class_path::{ClassPath, ClassPathError, ClassProvider, Directory, InMemory, Jar};
use tempfile::TempDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

fn write_class(root: &Path, binary_name: &str, bytes: &[u8]) {
    let path = root.join(format!("{}.class", binary_name));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let mut jar = ZipWriter::new(fs::File::create(path).unwrap());
    jar.add_directory("my/", FileOptions::default()).unwrap();
    for (name, bytes) in entries {
        jar.start_file(*name, FileOptions::default()).unwrap();
        jar.write_all(bytes).unwrap();
    }
    jar.finish().unwrap();
}

#[test]
fn test_directory_resolves_by_package_path() {
    let dir = TempDir::new().unwrap();
    write_class(dir.path(), "my/pkg/MyClass", &[0xca, 0xfe]);
    let directory = Directory::new(dir.path());

    assert_eq!(directory.resolve("my/pkg/MyClass").unwrap(), [0xca, 0xfe]);
    assert!(matches!(
        directory.resolve("my/pkg/Missing"),
        Err(ClassPathError::ClassNotFound(name)) if name == "my/pkg/Missing"
    ));
}

#[test]
fn test_directory_does_not_escape_its_root() {
    let dir = TempDir::new().unwrap();
    write_class(dir.path(), "Outside", &[1]);
    let inner = dir.path().join("inner");
    fs::create_dir(&inner).unwrap();

    assert!(matches!(
        Directory::new(&inner).resolve("../Outside"),
        Err(ClassPathError::ClassNotFound(_))
    ));
}

#[test]
fn test_jar_resolves_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lib.jar");
    write_jar(&path, &[("my/MyClass.class", &[1, 2, 3])]);
    let jar = Jar::open(&path).unwrap();

    assert_eq!(jar.path(), path);
    assert_eq!(jar.resolve("my/MyClass").unwrap(), [1, 2, 3]);
    assert!(matches!(
        jar.resolve("my/Other"),
        Err(ClassPathError::ClassNotFound(_))
    ));
}

#[test]
fn test_jar_ignores_a_bogus_declared_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bogus.jar");
    let mut jar = ZipWriter::new(fs::File::create(&path).unwrap());
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    jar.start_file("my/Big.class", stored).unwrap();
    jar.write_all(&[0xca, 0xfe, 0xba, 0xbe]).unwrap();
    jar.finish().unwrap();

    // Claim an uncompressed size of almost 4 GiB in the central directory.
    let mut bytes = fs::read(&path).unwrap();
    let header = bytes
        .windows(4)
        .rposition(|w| w == b"PK\x01\x02")
        .unwrap();
    bytes[header + 24..header + 28].copy_from_slice(&0xffff_fff0u32.to_le_bytes());
    fs::write(&path, bytes).unwrap();

    let jar = Jar::open(&path).unwrap();
    assert_eq!(jar.resolve("my/Big").unwrap(), [0xca, 0xfe, 0xba, 0xbe]);
}

#[test]
fn test_jar_rejects_non_archives() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.jar");
    fs::write(&path, b"definitely not a zip archive").unwrap();

    assert!(matches!(Jar::open(&path), Err(ClassPathError::Zip(_))));
}

#[test]
fn test_class_path_takes_the_first_match() {
    let _ = pretty_env_logger::try_init();

    let first: InMemory = [("my/A", vec![1])].into_iter().collect();
    let second: InMemory = [("my/A", vec![2]), ("my/B", vec![3])]
        .into_iter()
        .collect();
    let class_path = ClassPath::new().with(first).with(second);

    assert_eq!(class_path.len(), 2);
    assert_eq!(class_path.resolve("my/A").unwrap(), [1]);
    assert_eq!(class_path.resolve("my/B").unwrap(), [3]);
    assert!(matches!(
        class_path.resolve("my/C"),
        Err(ClassPathError::ClassNotFound(_))
    ));
}

#[test]
fn test_class_path_from_path_list() {
    let dir = TempDir::new().unwrap();
    let classes = dir.path().join("classes");
    write_class(&classes, "my/FromDirectory", &[1]);
    let jar = dir.path().join("lib.JAR");
    write_jar(&jar, &[("my/FromJar.class", &[2])]);

    let path_list = env::join_paths([classes, jar]).unwrap();
    let class_path = ClassPath::from_path_list(&path_list).unwrap();

    assert_eq!(class_path.len(), 2);
    assert_eq!(class_path.resolve("my/FromDirectory").unwrap(), [1]);
    assert_eq!(class_path.resolve("my/FromJar").unwrap(), [2]);
}

#[test]
fn test_empty_class_path_finds_nothing() {
    let class_path = ClassPath::from_path_list("").unwrap();

    assert!(class_path.is_empty());
    assert!(matches!(
        class_path.resolve("java/lang/Object"),
        Err(ClassPathError::ClassNotFound(_))
    ));
}

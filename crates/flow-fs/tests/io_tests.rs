use flow_fs::{NormalizedPath, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("nested/dir/package.json"));

    io::write_atomic(&path, b"{}").unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "{}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("descriptor.json");
    fs::write(&file_path, "original").unwrap();

    let path = NormalizedPath::new(&file_path);
    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("out.txt"));

    io::write_text(&path, "content").unwrap();

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["out.txt".to_string()]);
}

#[test]
fn test_concurrent_writers_to_one_target_never_mix() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("Order_Flow/META-INF/MANIFEST.MF"));
    let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![b'a' + i; 64 * 1024]).collect();

    std::thread::scope(|scope| {
        for payload in &payloads {
            let path = &path;
            scope.spawn(move || {
                for _ in 0..5 {
                    io::write_atomic(path, payload).unwrap();
                }
            });
        }
    });

    let written = io::read_bytes(&path).unwrap();
    assert!(payloads.contains(&written), "content is a mix of writers");
    let names: Vec<String> = fs::read_dir(temp.path().join("Order_Flow/META-INF"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["MANIFEST.MF".to_string()]);
}

#[test]
fn test_read_bytes_roundtrips_binary() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("blob.bin"));
    io::write_atomic(&path, &[0xff, 0x00, 0x7f]).unwrap();

    assert_eq!(io::read_bytes(&path).unwrap(), vec![0xff, 0x00, 0x7f]);
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = NormalizedPath::new("/nonexistent/file.txt");
    let err = io::read_text(&path).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/file.txt"));
}

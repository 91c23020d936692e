use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "photoframe_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn in_memory_sink_keeps_everything() {
    let mut sink = InMemorySink::new();
    sink.save("a.png", &[1, 2]).unwrap();
    sink.save("b.png", &[3]).unwrap();
    assert_eq!(sink.saved().len(), 2);
    assert_eq!(sink.last(), Some(&("b.png".to_owned(), vec![3])));
}

#[test]
fn dir_sink_writes_files() {
    let tmp = temp_dir("dir_sink");
    let mut sink = DirSink::new(tmp.join("out"));
    sink.save("framed_image.png", b"png bytes").unwrap();

    let path = sink.last_path().unwrap().to_path_buf();
    assert_eq!(path, tmp.join("out").join("framed_image.png"));
    assert_eq!(std::fs::read(&path).unwrap(), b"png bytes");

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn dir_sink_rejects_paths() {
    let mut sink = DirSink::new(temp_dir("dir_sink_reject"));
    for bad in ["../escape.png", "sub/x.png", "", ".."] {
        let err = sink.save(bad, b"x").unwrap_err();
        assert!(matches!(err, PhotoframeError::InvalidInput(_)), "{bad}");
    }
    assert!(sink.last_path().is_none());
}

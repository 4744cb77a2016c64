use std::io::Write;

use artparse_core::config_file::load_from_path;
use artparse_core::{PageSource, PageSourceError, TextFilePageSource};

#[test]
fn reads_form_feed_separated_pages() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "Title page\nAbstract\n\x0cBody text\n\x0cReferences\nSmith, A. (2020).\n\x0c").unwrap();

    let pages = TextFilePageSource::new().read_pages(file.path()).unwrap();
    assert_eq!(pages.len(), 3);
    assert!(pages[0].starts_with("Title page"));
    assert!(pages[2].contains("Smith, A. (2020)."));
}

#[test]
fn missing_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    let err = TextFilePageSource::new().read_pages(&path).unwrap_err();
    assert!(matches!(err, PageSourceError::Unavailable(p) if p == path));
}

#[test]
fn invalid_utf8_is_not_readable() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xff, 0xfe, 0x00, 0xc3]).unwrap();
    let err = TextFilePageSource::new().read_pages(file.path()).unwrap_err();
    assert!(matches!(err, PageSourceError::NotReadable(_)));
}

#[test]
fn loads_config_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".artparse.toml");
    std::fs::write(&path, "[style]\ntrailing_year_threshold = 0.65\n").unwrap();
    let config = load_from_path(&path).unwrap();
    assert_eq!(config.style.unwrap().trailing_year_threshold, Some(0.65));

    std::fs::write(&path, "[style\nbroken").unwrap();
    assert!(load_from_path(&path).is_none());
}

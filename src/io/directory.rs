use crate::entry::{ElementDescriptor, EntryKind};
use std::fs;
use std::io::Read;
use std::path::Path;

pub fn read_directory(path: &Path, show_hidden: bool) -> Result<Vec<ElementDescriptor>, std::io::Error> {
    let mut entries = Vec::new();
    let read_dir = fs::read_dir(path)?;

    for entry in read_dir.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if !show_hidden && name.starts_with('.') {
            continue;
        }
        entries.push(ElementDescriptor::new(name, entry_kind(&entry.path())));
    }
    entries.sort_by(|a, b| {
        if a.is_dir() != b.is_dir() {
            return b.is_dir().cmp(&a.is_dir());
        }
        a.name.to_lowercase().cmp(&b.name.to_lowercase())
    });
    Ok(entries)
}

fn entry_kind(path: &Path) -> EntryKind {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => EntryKind::Directory,
        Ok(meta) if meta.is_file() => EntryKind::File,
        Ok(_) => EntryKind::Unknown("Special".to_string()),
        // Dangling symlink
        Err(_) => EntryKind::Unknown("BrokenLink".to_string()),
    }
}

pub fn is_likely_binary(path: &Path) -> bool {
    let mut buf = [0u8; 8192];
    if let Ok(mut f) = fs::File::open(path) {
        if let Ok(n) = f.read(&mut buf) {
            if n == 0 {
                return false;
            }
            let null_count = buf[..n].iter().filter(|&&b| b == 0).count();
            return null_count > (n / 100).max(1);
        }
    }
    false
}

/// Read a file for preview, keeping at most `limit` characters.
pub fn load_file_content(path: &Path, limit: usize) -> Result<String, String> {
    if is_likely_binary(path) {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        return Ok(format!("<binary file, {} bytes>", size));
    }
    let data = fs::read(path).map_err(|e| format!("Read error: {}", e))?;
    let content = String::from_utf8_lossy(&data);
    if content.chars().count() > limit {
        Ok(content.chars().take(limit).collect())
    } else {
        Ok(content.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::create_dir(dir.path().join("Alpha")).unwrap();
        File::create(dir.path().join("zeta.txt")).unwrap();
        File::create(dir.path().join("apple.rs")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        dir
    }

    #[test]
    fn test_directories_first_then_case_insensitive() {
        let dir = setup_test_dir();
        let names: Vec<String> = read_directory(dir.path(), false)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "apple.rs", "zeta.txt"]);
    }

    #[test]
    fn test_hidden_entries() {
        let dir = setup_test_dir();
        let with_hidden = read_directory(dir.path(), true).unwrap();
        assert!(with_hidden.iter().any(|e| e.name == ".hidden"));
        assert_eq!(with_hidden.len(), 5);
    }

    #[test]
    fn test_load_file_content_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"abcdefghij").unwrap();

        assert_eq!(load_file_content(&path, 4).unwrap(), "abcd");
        assert_eq!(load_file_content(&path, 100).unwrap(), "abcdefghij");
    }

    #[test]
    fn test_binary_detection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0u8; 64]).unwrap();

        assert!(is_likely_binary(&path));
        assert_eq!(load_file_content(&path, 100).unwrap(), "<binary file, 64 bytes>");
    }
}

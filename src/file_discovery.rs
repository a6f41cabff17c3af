use ignore::{DirEntry, WalkBuilder};
use std::path::{Component, Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::error::CorpusError;

const COMPONENT: &str = "file_discovery";

/// Version-control metadata directory that is never descended into
pub const VCS_METADATA_DIR: &str = ".git";

/// Separator placed between path components in a document title
pub const TITLE_SEPARATOR: &str = ": ";

/// A file selected for loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub path: PathBuf,
    /// Root-relative path with components joined by `": "`
    pub title: String,
}

/// Corpus file collector
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// Required file name suffix
    extension: String,
    /// File names containing this substring are skipped
    exclude_substring: String,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            extension: ".xml".to_string(),
            exclude_substring: "template".to_string(),
        }
    }

    /// Collect every matching file below `root`, in file-name order.
    ///
    /// Walk errors are reported as warnings and skipped, so a missing root
    /// produces an empty corpus.
    pub fn discover_files(&self, root: &Path, diagnostics: &mut Diagnostics) -> Vec<CorpusFile> {
        diagnostics.debug(COMPONENT, format!("called with root: {}", root.display()));

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| !is_vcs_metadata_dir(entry))
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    let error = CorpusError::FileSystemTraversal {
                        path: root.to_path_buf(),
                        reason: e.to_string(),
                    };
                    diagnostics.warning(COMPONENT, error.to_string());
                    continue;
                }
            };

            if entry.file_type().is_none_or(|t| t.is_dir()) {
                continue;
            }

            let path = entry.path();
            if self.should_process(path) {
                files.push(CorpusFile {
                    path: path.to_path_buf(),
                    title: title_for(root, path),
                });
            }
        }

        diagnostics.debug(COMPONENT, format!("collected {} candidate files", files.len()));
        files
    }

    /// Check the file name against the extension and exclusion rules
    pub fn should_process(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        name.ends_with(&self.extension) && !name.contains(&self.exclude_substring)
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn is_vcs_metadata_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|t| t.is_dir())
        && entry.file_name() == VCS_METADATA_DIR
}

/// Build a document title from a path below `root`
pub fn title_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LogLevel;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("ias")).unwrap();
        fs::create_dir_all(root.join("ias/nested")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();

        fs::write(root.join("001.xml"), "<TEI/>").unwrap();
        fs::write(root.join("notes.txt"), "text file").unwrap();
        fs::write(root.join("ias/002.xml"), "<TEI/>").unwrap();
        fs::write(root.join("ias/nested/003.xml"), "<TEI/>").unwrap();
        fs::write(root.join("ias/template-foo.xml"), "<TEI/>").unwrap();
        fs::write(root.join(".git/objects/hidden.xml"), "<TEI/>").unwrap();

        temp_dir
    }

    #[test]
    fn test_discover_xml_files() {
        let temp_dir = create_test_directory();
        let mut diagnostics = Diagnostics::recording(LogLevel::default());
        let files = FileDiscovery::new().discover_files(temp_dir.path(), &mut diagnostics);

        let titles: Vec<&str> = files.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["001.xml", "ias: 002.xml", "ias: nested: 003.xml"]);
        assert!(diagnostics.emitted().is_empty());
    }

    #[test]
    fn test_should_process() {
        let discovery = FileDiscovery::new();

        assert!(discovery.should_process(Path::new("a/b/test.xml")));
        assert!(!discovery.should_process(Path::new("test.txt")));
        assert!(!discovery.should_process(Path::new("test")));
        assert!(!discovery.should_process(Path::new("template-foo.xml")));
        assert!(!discovery.should_process(Path::new("my_template.xml")));
        assert!(!discovery.should_process(Path::new("upper.XML")));
    }

    #[test]
    fn test_title_for_nested_path() {
        let root = Path::new("/corpus");
        assert_eq!(
            title_for(root, Path::new("/corpus/ias/001.xml")),
            "ias: 001.xml"
        );
        assert_eq!(title_for(root, Path::new("/corpus/001.xml")), "001.xml");
    }

    #[test]
    fn test_nonexistent_directory() {
        let mut diagnostics = Diagnostics::recording(LogLevel::default());
        let files =
            FileDiscovery::new().discover_files(Path::new("/nonexistent/path"), &mut diagnostics);

        assert!(files.is_empty());
        assert!(diagnostics.count_at(LogLevel::Warning) >= 1);
    }
}

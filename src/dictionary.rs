use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::store::IgnoreListStore;

/// Immutable per-language word lists, loaded once at startup and replaced
/// only by a process restart.
#[derive(Debug, Default)]
pub struct DictionaryCatalog {
    dictionaries: BTreeMap<String, Vec<String>>,
}

impl DictionaryCatalog {
    /// Loads every `(language, path)` pair. Words are one per line,
    /// trailing whitespace trimmed; empty lines and ignored words are
    /// dropped at load time. An unreadable file yields an empty language,
    /// not an error.
    pub fn load_all(
        dictionary_files: &[(String, PathBuf)],
        ignore_list: &IgnoreListStore,
    ) -> Self {
        let mut dictionaries = BTreeMap::new();

        for (language, path) in dictionary_files {
            let words = match fs::read_to_string(path) {
                Ok(raw) => raw
                    .lines()
                    .map(|line| line.trim_end())
                    .filter(|line| !line.is_empty() && !ignore_list.contains(line))
                    .map(str::to_string)
                    .collect(),
                Err(error) => {
                    warn!(
                        language = %language,
                        path = %path.display(),
                        "failed to read dictionary: {error}"
                    );
                    Vec::new()
                }
            };
            info!(language = %language, words = words.len(), "loaded dictionary");
            dictionaries.insert(language.clone(), words);
        }

        Self { dictionaries }
    }

    pub fn words(&self, language: &str) -> Option<&[String]> {
        self.dictionaries.get(language).map(Vec::as_slice)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &[String])> {
        self.dictionaries
            .iter()
            .map(|(language, words)| (language, words.as_slice()))
    }

    pub fn languages(&self) -> impl Iterator<Item = &String> {
        self.dictionaries.keys()
    }
}

/// Scans a dictionary directory for `*.txt` files; the filename stem is the
/// language name. Sorted by name so load order is stable.
pub fn discover_dictionary_files(dir: &Path) -> Vec<(String, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(dir = %dir.display(), "failed to list dictionaries: {error}");
            return Vec::new();
        }
    };

    let mut files: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .filter_map(|path| {
            let language = path.file_stem()?.to_str()?.to_string();
            Some((language, path))
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn empty_ignore_list(dir: &Path) -> IgnoreListStore {
        IgnoreListStore::load(dir.join("ignore.json")).unwrap()
    }

    #[test]
    fn loads_words_in_file_order() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("English.txt");
        fs::write(&dict_path, "hello\nhelp \nhelmet\n\n").unwrap();

        let ignore = empty_ignore_list(dir.path());
        let catalog =
            DictionaryCatalog::load_all(&[("English".to_string(), dict_path)], &ignore);

        assert_eq!(
            catalog.words("English").unwrap(),
            ["hello", "help", "helmet"]
        );
    }

    #[test]
    fn drops_ignored_words_at_load_time() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("English.txt");
        fs::write(&dict_path, "hello\nhelp\nhelmet\n").unwrap();

        let mut ignore = empty_ignore_list(dir.path());
        ignore.add("help").unwrap();

        let catalog =
            DictionaryCatalog::load_all(&[("English".to_string(), dict_path)], &ignore);
        assert_eq!(catalog.words("English").unwrap(), ["hello", "helmet"]);
    }

    #[test]
    fn missing_dictionary_yields_empty_language() {
        let dir = tempdir().unwrap();
        let ignore = empty_ignore_list(dir.path());

        let catalog = DictionaryCatalog::load_all(
            &[("Nope".to_string(), dir.path().join("Nope.txt"))],
            &ignore,
        );
        assert!(catalog.words("Nope").unwrap().is_empty());
        assert!(catalog.words("English").is_none());
    }

    #[test]
    fn discovers_txt_files_by_stem() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("English.txt"), "hello\n").unwrap();
        fs::write(dir.path().join("German.txt"), "hallo\n").unwrap();
        fs::write(dir.path().join("notes.md"), "not a dictionary\n").unwrap();

        let files = discover_dictionary_files(dir.path());
        let languages: Vec<&str> = files.iter().map(|(lang, _)| lang.as_str()).collect();
        assert_eq!(languages, ["English", "German"]);
    }
}

use std::time::Instant;

use anyhow::Result;
use tracing::debug;

use crate::dictionary::DictionaryCatalog;
use crate::fuzzy::fuzzy_match;
use crate::processor::ProcessorRegistry;
use crate::store::{CustomWordStore, HistoryStore, IgnoreListStore};

/// Ranks words from the loaded dictionaries and the custom-word store,
/// biased by usage history, and owns every store mutation.
pub struct SuggestionEngine {
    catalog: DictionaryCatalog,
    custom_words: CustomWordStore,
    history: HistoryStore,
    ignore_list: IgnoreListStore,
    registry: ProcessorRegistry,
}

impl SuggestionEngine {
    pub fn new(
        catalog: DictionaryCatalog,
        custom_words: CustomWordStore,
        history: HistoryStore,
        ignore_list: IgnoreListStore,
        registry: ProcessorRegistry,
    ) -> Self {
        Self {
            catalog,
            custom_words,
            history,
            ignore_list,
            registry,
        }
    }

    /// Fuzzy-matches `query` against every word of the selected languages
    /// plus every non-ignored custom word, ranked descending by
    /// `match score + history score`. Stable: ties keep scan order.
    pub fn get_suggestions(&self, query: &str, languages: &[String]) -> Vec<String> {
        let started = Instant::now();
        let mut scored: Vec<(String, i64)> = Vec::new();

        for (language, words) in self.catalog.entries() {
            if !languages.contains(language) {
                continue;
            }
            for word in words {
                if let Some(score) = fuzzy_match(query, word) {
                    scored.push((word.clone(), i64::from(score) + self.history_score(word)));
                }
            }
        }

        for word in self.custom_words.words() {
            if self.ignore_list.contains(word) {
                continue;
            }
            if let Some(score) = fuzzy_match(query, word) {
                scored.push((word.clone(), i64::from(score) + self.history_score(word)));
            }
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        let suggestions: Vec<String> = scored.into_iter().map(|(word, _)| word).collect();

        debug!(
            query,
            languages = ?languages,
            results = suggestions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "get_suggestions"
        );
        suggestions
    }

    /// Like `get_suggestions` restricted to custom words. An empty query
    /// lists every non-ignored custom word at match score 0, so ordering is
    /// purely by history.
    pub fn get_custom_words_only(&self, query: &str) -> Vec<String> {
        let mut scored: Vec<(String, i64)> = Vec::new();

        for word in self.custom_words.words() {
            if self.ignore_list.contains(word) {
                continue;
            }
            if let Some(score) = fuzzy_match(query, word) {
                scored.push((word.clone(), i64::from(score) + self.history_score(word)));
            }
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(word, _)| word).collect()
    }

    /// Every non-ignored custom word followed by the selected dictionaries,
    /// the whole sequence sorted descending by history score alone. Custom
    /// words lead only among equal scores; a well-used dictionary word can
    /// outrank them.
    pub fn get_all_words(&self, languages: &[String]) -> Vec<String> {
        let started = Instant::now();
        let mut words: Vec<String> = self
            .custom_words
            .words()
            .filter(|word| !self.ignore_list.contains(word))
            .cloned()
            .collect();

        for (language, dictionary) in self.catalog.entries() {
            if languages.contains(language) {
                words.extend_from_slice(dictionary);
            }
        }

        words.sort_by(|a, b| self.history_score(b).cmp(&self.history_score(a)));

        debug!(
            languages = ?languages,
            results = words.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "get_all_words"
        );
        words
    }

    pub fn history_score(&self, word: &str) -> i64 {
        self.history.count(word) as i64
    }

    /// A word already tracked (in history, or seeded as a custom word) gets
    /// its count bumped. A brand-new word is instead seeded into the
    /// custom-word store with itself as expansion; acceptances after that
    /// are counted in history.
    pub fn history_increment(&mut self, word: &str) -> Result<()> {
        if self.history.contains(word) || self.custom_words.contains(word) {
            self.history.increment(word)
        } else {
            self.custom_words.insert(word, word)
        }
    }

    pub fn history_remove(&mut self, word: &str) -> Result<()> {
        self.history.remove(word)
    }

    /// Appends to the ignore list. Already-loaded dictionaries keep the
    /// word until the next restart; ranked output filters custom words at
    /// query time.
    pub fn ignore_list_add(&mut self, word: &str) -> Result<()> {
        self.ignore_list.add(word)
    }

    /// Re-reads custom words and the ignore list from disk. Dictionaries
    /// and history are not touched.
    pub fn reload_configs(&mut self) -> Result<()> {
        self.custom_words.reload()?;
        self.ignore_list.reload()
    }

    /// Expands a custom word to its stored expansion, then chains the text
    /// through every matching processor.
    pub async fn process_suggestion(&self, suggestion: &str) -> String {
        let expanded = match self.custom_words.expansion(suggestion) {
            Some(expansion) => expansion.to_string(),
            None => suggestion.to_string(),
        };
        self.registry.apply(&expanded).await
    }
}

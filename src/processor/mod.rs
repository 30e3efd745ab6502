mod command;
mod external;
mod math;

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
pub use command::CommandProcessor;
pub use external::ExternalProcessor;
pub use math::MathExpressionProcessor;
use tracing::{info, warn};

/// A processor can claim a chosen suggestion and rewrite it before it is
/// typed back into the active window.
#[async_trait]
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;
    async fn matches(&self, text: &str) -> Result<bool>;
    async fn process(&self, text: &str) -> Result<String>;
}

pub struct ProcessorRegistry {
    processor_dirs: Vec<PathBuf>,
    timeout_ms: u64,
}

impl ProcessorRegistry {
    pub fn new(processor_dirs: Vec<PathBuf>, timeout_ms: u64) -> Self {
        Self {
            processor_dirs,
            timeout_ms,
        }
    }

    /// Runs `text` through every matching processor in order, each one
    /// transforming the running result. A processor that fails to spawn,
    /// exits nonzero, or times out leaves the text as it was.
    pub async fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();

        for processor in self.assemble() {
            match processor.matches(&result).await {
                Ok(true) => match processor.process(&result).await {
                    Ok(output) => {
                        info!(processor = processor.name(), "applied processor");
                        result = output;
                    }
                    Err(error) => {
                        warn!(processor = processor.name(), "processor failed: {error:#}");
                    }
                },
                Ok(false) => {}
                Err(error) => {
                    warn!(processor = processor.name(), "match check failed: {error:#}");
                }
            }
        }

        result
    }

    /// Built-ins first, then discovered executables sorted by basename.
    /// Re-assembled on every call so newly installed processors take effect
    /// without a restart.
    fn assemble(&self) -> Vec<Box<dyn Processor>> {
        let mut processors: Vec<Box<dyn Processor>> = vec![
            Box::new(CommandProcessor::new(self.timeout_ms)),
            Box::new(MathExpressionProcessor::new(self.timeout_ms)),
        ];

        let builtin_names: Vec<String> = processors
            .iter()
            .map(|processor| processor.name().to_string())
            .collect();

        for (name, path) in self.discover() {
            if builtin_names.iter().any(|builtin| *builtin == name) {
                warn!(name = %name, "external processor shadows a built-in, skipping");
                continue;
            }
            processors.push(Box::new(ExternalProcessor::new(name, path, self.timeout_ms)));
        }

        processors
    }

    /// Scans the processor directories in priority order for executable
    /// regular files; the first directory providing a basename wins.
    fn discover(&self) -> BTreeMap<String, PathBuf> {
        let mut processors = BTreeMap::new();

        for dir in &self.processor_dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.filter_map(|entry| entry.ok()) {
                let path = entry.path();
                let name = match path.file_name().and_then(|name| name.to_str()) {
                    Some(name) => name.to_string(),
                    None => continue,
                };
                if processors.contains_key(&name) {
                    continue;
                }
                let is_executable_file = fs::metadata(&path)
                    .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
                    .unwrap_or(false);
                if is_executable_file {
                    processors.insert(name, path);
                }
            }
        }

        processors
    }
}

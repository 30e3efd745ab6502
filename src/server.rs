use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::engine::SuggestionEngine;
use crate::injector::InputInjector;
use crate::layout;
use crate::protocol::{
    DaemonRequest, DaemonResponse, ErrorCode, ErrorResponse, RequestBody, ResponseBody,
};

/// Everything a request handler needs, constructed once at startup and
/// shared by every connection. The engine mutex serializes store mutations
/// across connections.
pub struct DaemonContext {
    pub engine: Mutex<SuggestionEngine>,
    pub injector: Box<dyn InputInjector>,
    pub exec_timeout_ms: u64,
}

pub struct SuggestionServer {
    config: ServerConfig,
    context: Arc<DaemonContext>,
}

impl SuggestionServer {
    pub fn new(config: ServerConfig, context: DaemonContext) -> Self {
        Self {
            config,
            context: Arc::new(context),
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.prepare_socket_path().await?;
        if self.config.socket_path.exists() {
            fs::remove_file(&self.config.socket_path)
                .await
                .with_context(|| {
                    format!(
                        "failed to cleanup stale socket {}",
                        self.config.socket_path.display()
                    )
                })?;
        }

        let listener = UnixListener::bind(&self.config.socket_path).with_context(|| {
            format!(
                "failed to bind unix socket at {}",
                self.config.socket_path.display()
            )
        })?;
        info!(
            "suggestd listening on {}",
            self.config.socket_path.display()
        );

        loop {
            let (stream, _) = listener.accept().await?;
            let context = self.context.clone();
            let timeout_ms = self.config.request_timeout_ms;
            tokio::spawn(async move {
                if let Err(error) = handle_connection(stream, context, timeout_ms).await {
                    warn!("connection closed with error: {error:#}");
                }
            });
        }
    }

    async fn prepare_socket_path(&self) -> Result<()> {
        if let Some(parent) = self.config.socket_path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create socket directory {}", parent.display())
            })?;
        }
        Ok(())
    }
}

async fn handle_connection(
    stream: UnixStream,
    context: Arc<DaemonContext>,
    timeout_ms: u64,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = process_line(line, context.clone(), timeout_ms).await;
        let payload = serde_json::to_string(&response)?;
        writer.write_all(payload.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    Ok(())
}

async fn process_line(
    line: String,
    context: Arc<DaemonContext>,
    timeout_ms: u64,
) -> DaemonResponse {
    let request = match serde_json::from_str::<DaemonRequest>(&line) {
        Ok(request) => request,
        Err(error) => {
            error!("invalid request JSON: {error}");
            return DaemonResponse {
                id: String::new(),
                body: ResponseBody::Error(ErrorResponse {
                    code: ErrorCode::InvalidRequest,
                    message: format!("invalid JSON payload: {error}"),
                }),
            };
        }
    };

    let id = request.id.clone();
    match timeout(
        Duration::from_millis(timeout_ms.max(1)),
        handle_request(request, context),
    )
    .await
    {
        Ok(response) => response,
        Err(_) => DaemonResponse {
            id,
            body: ResponseBody::Error(ErrorResponse {
                code: ErrorCode::Timeout,
                message: format!("request exceeded {timeout_ms}ms"),
            }),
        },
    }
}

async fn handle_request(request: DaemonRequest, context: Arc<DaemonContext>) -> DaemonResponse {
    let id = request.id;
    match request.body {
        RequestBody::Ping => DaemonResponse {
            id,
            body: ResponseBody::Pong,
        },
        RequestBody::GetSuggestions { word, languages } => {
            let words = context.engine.lock().await.get_suggestions(&word, &languages);
            words_response(id, words)
        }
        RequestBody::GetCustomWordsOnly { word } => {
            let words = context.engine.lock().await.get_custom_words_only(&word);
            words_response(id, words)
        }
        RequestBody::GetAllWords { languages } => {
            let words = context.engine.lock().await.get_all_words(&languages);
            words_response(id, words)
        }
        RequestBody::ProcessSuggestion { suggestion } => {
            let text = context
                .engine
                .lock()
                .await
                .process_suggestion(&suggestion)
                .await;
            text_response(id, text)
        }
        RequestBody::HistoryIncrement { word } => {
            ack_or_error(id, context.engine.lock().await.history_increment(&word))
        }
        RequestBody::HistoryRemove { word } => {
            ack_or_error(id, context.engine.lock().await.history_remove(&word))
        }
        RequestBody::IgnoreListAdd { word } => {
            ack_or_error(id, context.engine.lock().await.ignore_list_add(&word))
        }
        RequestBody::ReloadConfigs => {
            ack_or_error(id, context.engine.lock().await.reload_configs())
        }
        RequestBody::TypeText { text } => {
            ack_or_error(id, context.injector.type_text(&text).await)
        }
        RequestBody::GetSelectedWord => match context.injector.selected_word().await {
            Ok(word) => text_response(id, word),
            Err(error) => internal_error(id, error),
        },
        RequestBody::AutoselectCurrentWord { mode } => {
            ack_or_error(id, context.injector.select_word_under_cursor(mode).await)
        }
        RequestBody::DetermineLanguageFromKeyboardLayout => {
            match layout::determine_language_from_keyboard_layout(context.exec_timeout_ms).await {
                Ok(language) => text_response(id, language),
                Err(error) => internal_error(id, error),
            }
        }
    }
}

fn words_response(id: String, words: Vec<String>) -> DaemonResponse {
    DaemonResponse {
        id,
        body: ResponseBody::Words { words },
    }
}

fn text_response(id: String, text: String) -> DaemonResponse {
    DaemonResponse {
        id,
        body: ResponseBody::Text { text },
    }
}

fn ack_or_error(id: String, result: Result<()>) -> DaemonResponse {
    match result {
        Ok(()) => DaemonResponse {
            id,
            body: ResponseBody::Ack,
        },
        Err(error) => internal_error(id, error),
    }
}

fn internal_error(id: String, error: anyhow::Error) -> DaemonResponse {
    warn!("request failed: {error:#}");
    DaemonResponse {
        id,
        body: ResponseBody::Error(ErrorResponse {
            code: ErrorCode::Internal,
            message: format!("{error:#}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryCatalog;
    use crate::injector::SelectMode;
    use crate::processor::ProcessorRegistry;
    use crate::store::{CustomWordStore, HistoryStore, IgnoreListStore};
    use async_trait::async_trait;
    use std::fs as std_fs;
    use tempfile::{tempdir, TempDir};

    struct MockInjector {
        typed: Arc<std::sync::Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl InputInjector for MockInjector {
        async fn clipboard(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn set_clipboard(&self, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn type_text(&self, text: &str) -> Result<()> {
            self.typed.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn focused_window_id(&self) -> Result<String> {
            Ok("0".to_string())
        }

        async fn select_word_under_cursor(&self, _mode: SelectMode) -> Result<()> {
            Ok(())
        }

        async fn selected_word(&self) -> Result<String> {
            Ok("selected".to_string())
        }
    }

    type TypedLog = Arc<std::sync::Mutex<Vec<String>>>;

    fn context_fixture(dict_words: &[&str]) -> (TempDir, Arc<DaemonContext>, TypedLog) {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("English.txt");
        std_fs::write(&dict_path, dict_words.join("\n")).unwrap();

        let ignore_list = IgnoreListStore::load(dir.path().join("ignore.json")).unwrap();
        let custom_words = CustomWordStore::load(dir.path().join("custom-words.json")).unwrap();
        let history = HistoryStore::load(dir.path().join("history.json")).unwrap();
        let catalog =
            DictionaryCatalog::load_all(&[("English".to_string(), dict_path)], &ignore_list);

        let typed: TypedLog = Arc::new(std::sync::Mutex::new(Vec::new()));
        let context = DaemonContext {
            engine: Mutex::new(SuggestionEngine::new(
                catalog,
                custom_words,
                history,
                ignore_list,
                ProcessorRegistry::new(Vec::new(), 2000),
            )),
            injector: Box::new(MockInjector {
                typed: typed.clone(),
            }),
            exec_timeout_ms: 2000,
        };
        (dir, Arc::new(context), typed)
    }

    #[tokio::test]
    async fn handles_ping() {
        let (_dir, context, _typed) = context_fixture(&[]);
        let request = DaemonRequest {
            id: "1".to_string(),
            body: RequestBody::Ping,
        };

        let response = handle_request(request, context).await;
        assert!(matches!(response.body, ResponseBody::Pong));
        assert_eq!(response.id, "1");
    }

    #[tokio::test]
    async fn handles_get_suggestions() {
        let (_dir, context, _typed) = context_fixture(&["hello", "help", "helmet"]);
        let request = DaemonRequest {
            id: "2".to_string(),
            body: RequestBody::GetSuggestions {
                word: "hel".to_string(),
                languages: vec!["English".to_string()],
            },
        };

        let response = handle_request(request, context).await;
        match response.body {
            ResponseBody::Words { words } => {
                assert_eq!(words.len(), 3);
                assert_eq!(words[0], "help");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn type_text_reaches_the_injector() {
        let (_dir, context, typed) = context_fixture(&[]);
        let request = DaemonRequest {
            id: "3".to_string(),
            body: RequestBody::TypeText {
                text: "hello there".to_string(),
            },
        };

        let response = handle_request(request, context).await;
        assert!(matches!(response.body, ResponseBody::Ack));
        assert_eq!(typed.lock().unwrap().as_slice(), ["hello there"]);
    }

    #[tokio::test]
    async fn get_selected_word_delegates_to_injector() {
        let (_dir, context, _typed) = context_fixture(&[]);
        let request = DaemonRequest {
            id: "4".to_string(),
            body: RequestBody::GetSelectedWord,
        };

        let response = handle_request(request, context).await;
        match response.body {
            ResponseBody::Text { text } => assert_eq!(text, "selected"),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn history_increment_persists_between_requests() {
        let (_dir, context, _typed) = context_fixture(&[]);

        for _ in 0..2 {
            let request = DaemonRequest {
                id: "5".to_string(),
                body: RequestBody::HistoryIncrement {
                    word: "banana".to_string(),
                },
            };
            let response = handle_request(request, context.clone()).await;
            assert!(matches!(response.body, ResponseBody::Ack));
        }

        let engine = context.engine.lock().await;
        assert_eq!(engine.history_score("banana"), 1);
    }

    #[tokio::test]
    async fn malformed_json_yields_invalid_request() {
        let (_dir, context, _typed) = context_fixture(&[]);
        let response = process_line("{not json".to_string(), context, 1000).await;
        match response.body {
            ResponseBody::Error(error) => assert_eq!(error.code, ErrorCode::InvalidRequest),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_method_yields_invalid_request() {
        let (_dir, context, _typed) = context_fixture(&[]);
        let response =
            process_line(r#"{"type":"frobnicate"}"#.to_string(), context, 1000).await;
        assert!(matches!(response.body, ResponseBody::Error(_)));
    }
}

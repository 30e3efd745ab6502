use serde::{Deserialize, Serialize};

use crate::injector::SelectMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: RequestBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    GetSuggestions {
        word: String,
        #[serde(default)]
        languages: Vec<String>,
    },
    GetCustomWordsOnly {
        #[serde(default)]
        word: String,
    },
    GetAllWords {
        #[serde(default)]
        languages: Vec<String>,
    },
    ProcessSuggestion {
        suggestion: String,
    },
    HistoryIncrement {
        word: String,
    },
    HistoryRemove {
        word: String,
    },
    IgnoreListAdd {
        word: String,
    },
    ReloadConfigs,
    TypeText {
        text: String,
    },
    GetSelectedWord,
    AutoselectCurrentWord {
        #[serde(default)]
        mode: SelectMode,
    },
    DetermineLanguageFromKeyboardLayout,
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    Words { words: Vec<String> },
    Text { text: String },
    Ack,
    Pong,
    Error(ErrorResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    Timeout,
    Internal,
}

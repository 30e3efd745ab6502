use anyhow::Result;
use tracing::info;

use crate::exec::run_command;

/// Asks the X server for the active keyboard layout and maps it to a
/// dictionary language name. Unknown or undetectable layouts fall back to
/// English.
pub async fn determine_language_from_keyboard_layout(timeout_ms: u64) -> Result<String> {
    let output = run_command("setxkbmap", &["-print"], timeout_ms).await?;
    let layout = parse_xkb_layout(&output.stdout);

    match layout.as_deref().and_then(language_for_layout) {
        Some(language) => Ok(language.to_string()),
        None => {
            info!(layout = ?layout, "could not map keyboard layout, defaulting to English");
            Ok("English".to_string())
        }
    }
}

/// Extracts the layout token from `setxkbmap -print` output: the second
/// `+`-separated element of the `xkb_symbols` include string, with any
/// parenthesized variant stripped (`de(nodeadkeys)` -> `de`).
fn parse_xkb_layout(xkb_map: &str) -> Option<String> {
    let mut layout = None;

    for line in xkb_map.lines() {
        if !line.contains("xkb_symbols") {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(include_idx) = tokens.iter().position(|token| *token == "include") else {
            continue;
        };
        let Some(value) = tokens.get(include_idx + 1).map(|token| token.trim_matches('"'))
        else {
            continue;
        };
        if let Some(token) = value.split('+').nth(1) {
            let token = match token.find('(') {
                Some(open) => &token[..open],
                None => token,
            };
            layout = Some(token.to_string());
        }
    }

    layout
}

fn language_for_layout(layout: &str) -> Option<&'static str> {
    Some(match layout {
        "bd" => "Bangla",
        "us" | "uk" | "gb" => "English",
        "ara" => "Arabic",
        "cn" | "tw" => "Chinese",
        "de" => "German",
        "jp" => "Japanese",
        "ru" => "Russian",
        "es" => "Spanish",
        "se" => "Swedish",
        "fi" => "Finnish",
        "kr" => "Korean",
        "pk" => "Urdu",
        "fr" => "French",
        "gr" => "Greek",
        "ua" => "Ukrainian",
        _ => return None,
    })
}

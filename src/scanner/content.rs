// SPDX-License-Identifier: GPL-3.0-only

//! Decoded payload classification
//!
//! Used only to pick notification and acknowledgment wording. The raw
//! payload is never altered: submit and display always carry the exact
//! decoded text.

/// Recognized payload kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrContent {
    /// Web link
    Url(String),
    /// WiFi credential payload (WIFI:S:<ssid>;T:<security>;P:<password>;;)
    Wifi { ssid: String },
    /// Anything else
    Text(String),
}

impl QrContent {
    /// Classify a decoded payload.
    pub fn classify(content: &str) -> Self {
        let trimmed = content.trim();

        if trimmed.starts_with("WIFI:") {
            return Self::Wifi {
                ssid: parse_wifi_ssid(trimmed),
            };
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Self::Url(trimmed.to_string());
        }

        Self::Text(trimmed.to_string())
    }

    /// Short kind label for notification titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Url(_) => "Link",
            Self::Wifi { .. } => "WiFi network",
            Self::Text(_) => "QR code",
        }
    }

    /// One-line description for notification bodies
    pub fn summary(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Wifi { ssid } if !ssid.is_empty() => format!("\"{}\"", ssid),
            Self::Wifi { .. } => String::from("WiFi credentials"),
            Self::Text(text) => text.clone(),
        }
    }
}

/// Pull the SSID out of a WiFi QR payload.
///
/// Field values escape `;`, `:`, `,` and `\` with a backslash.
fn parse_wifi_ssid(content: &str) -> String {
    let content = content.strip_prefix("WIFI:").unwrap_or(content);
    let content = content.trim_end_matches(';');

    for part in split_unescaped(content, ';') {
        if let Some(value) = part.strip_prefix("S:") {
            return value
                .replace("\\;", ";")
                .replace("\\:", ":")
                .replace("\\,", ",")
                .replace("\\\\", "\\");
        }
    }

    String::new()
}

/// Split on a separator, honoring backslash escapes.
fn split_unescaped(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_url() {
        assert_eq!(
            QrContent::classify("https://example.com/page"),
            QrContent::Url("https://example.com/page".to_string())
        );
        assert!(matches!(
            QrContent::classify("http://example.com"),
            QrContent::Url(_)
        ));
    }

    #[test]
    fn test_classify_wifi() {
        let content = QrContent::classify("WIFI:S:MyNetwork;T:WPA;P:secret;;");
        assert_eq!(
            content,
            QrContent::Wifi {
                ssid: "MyNetwork".to_string()
            }
        );
        assert_eq!(content.summary(), "\"MyNetwork\"");
    }

    #[test]
    fn test_classify_wifi_escaped_ssid() {
        let content = QrContent::classify("WIFI:T:WPA;S:Cafe\\;Bar;P:x;;");
        assert_eq!(
            content,
            QrContent::Wifi {
                ssid: "Cafe;Bar".to_string()
            }
        );
    }

    #[test]
    fn test_classify_plain_text() {
        let content = QrContent::classify("hello world");
        assert_eq!(content, QrContent::Text("hello world".to_string()));
        assert_eq!(content.label(), "QR code");
    }

    #[test]
    fn test_classification_preserves_payload() {
        // Classification only affects wording, the raw text is intact
        let raw = "  https://example.com  ";
        match QrContent::classify(raw) {
            QrContent::Url(url) => assert_eq!(url, raw.trim()),
            other => panic!("expected Url, got {:?}", other),
        }
    }
}

//! # engine::adapter
//!
//! **Source adapters**: one variant per response shape we know how to read.
//!
//! ```text
//! response body
//!     │
//!     ├─ decodes as JSON → Payload::Json ─▶ kind's field path (e.g. /rates/USD)
//!     │
//!     └─ anything else   → Payload::Text ─▶ <body> text, tags and &refs; undone, scan "1 BRL = <n>"
//! ```
//!
//! Every path ends in the same gate: only finite, strictly positive prices
//! come out. Zero / negative / garbage is `None` and the fetcher mocks it.

use serde_json::Value;

// ─── Payload ──────────────────────────────────────────────────────────────────

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// JSON if the body parses as JSON, raw text otherwise.
    pub fn decode(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body),
        }
    }
}

// ─── SourceKind ───────────────────────────────────────────────────────────────

/// Known source shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `api.exchangerate.host/convert` — `{ "result": 0.18 }`
    ExchangeRateHost,
    /// `open.er-api.com/v6/latest/BRL` — `{ "rates": { "USD": 0.18 } }`
    OpenErApi,
    /// `v6.exchangerate-api.com/.../latest/BRL` — `{ "conversion_rates": { "USD": 0.18 } }`
    ExchangeRateApiV6,
    /// Plain web page; price is scraped out of the visible text.
    HtmlPage,
}

impl SourceKind {
    /// Pick the adapter for a URL by host.
    pub fn for_url(url: &str) -> Self {
        if url.contains("exchangerate.host") {
            SourceKind::ExchangeRateHost
        } else if url.contains("open.er-api") {
            SourceKind::OpenErApi
        } else if url.contains("v6.exchangerate-api") {
            SourceKind::ExchangeRateApiV6
        } else {
            SourceKind::HtmlPage
        }
    }

    /// JSON pointer to the buy price, if this kind speaks JSON.
    pub fn json_pointer(self) -> Option<&'static str> {
        match self {
            SourceKind::ExchangeRateHost  => Some("/result"),
            SourceKind::OpenErApi         => Some("/rates/USD"),
            SourceKind::ExchangeRateApiV6 => Some("/conversion_rates/USD"),
            SourceKind::HtmlPage          => None,
        }
    }

    /// Pull a buy price out of `payload`.
    ///
    /// Text bodies are scanned for the `1 BRL = <n>` pattern whatever the
    /// kind, so a JSON API that answers with an HTML error page can still be
    /// read if the page happens to carry the rate.
    pub fn extract(self, payload: &Payload) -> Option<f64> {
        let price = match payload {
            Payload::Json(value) => self
                .json_pointer()
                .and_then(|ptr| value.pointer(ptr))
                .and_then(json_number),
            Payload::Text(text) => scan_brl_rate(&visible_text(text)),
        };

        price.filter(|p| p.is_finite() && *p > 0.0)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::ExchangeRateHost  => write!(f, "exchangerate.host"),
            SourceKind::OpenErApi         => write!(f, "open.er-api"),
            SourceKind::ExchangeRateApiV6 => write!(f, "exchangerate-api v6"),
            SourceKind::HtmlPage          => write!(f, "html"),
        }
    }
}

// ─── PriceSource ──────────────────────────────────────────────────────────────

/// A configured source: where to GET and how to read the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSource {
    pub url: String,
    pub kind: SourceKind,
}

impl PriceSource {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = SourceKind::for_url(&url);
        Self { url, kind }
    }
}

// ─── Parsing helpers ──────────────────────────────────────────────────────────

/// Numbers, or strings that hold one (some APIs quote rates as strings).
fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text of the `<body>` (the whole document when there is none), tags
/// dropped so inline markup doesn't split the pattern (`1 <b>BRL</b> = 0.18`),
/// then character references decoded (`1&nbsp;BRL`).
fn visible_text(html: &str) -> String {
    let body = body_section(html);
    let mut out = String::with_capacity(body.len());
    let mut in_tag = false;

    for ch in body.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    decode_entities(&out)
}

/// Slice between `<body ...>` and `</body`, case-insensitive.
fn body_section(html: &str) -> &str {
    // ASCII lowercasing keeps byte offsets valid for `html`
    let lower = html.to_ascii_lowercase();
    let Some(open) = lower.find("<body") else {
        return html;
    };

    let start = lower[open..].find('>').map_or(html.len(), |i| open + i + 1);
    let end = lower[start..].find("</body").map_or(html.len(), |i| start + i);
    &html[start..end]
}

/// Decode `&name;`, `&#NNN;` and `&#xHH;`. Unknown references stay as-is.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&rest[1..=end]).map(|ch| (ch, end + 2)));

        match decoded {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "nbsp" => Some('\u{a0}'),
        "amp"  => Some('&'),
        "lt"   => Some('<'),
        "gt"   => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Find `1 BRL = <number>` (whitespace optional around `BRL` and `=`) and
/// parse the number. Either `.` or `,` may be the decimal separator.
fn scan_brl_rate(text: &str) -> Option<f64> {
    let mut from = 0;

    while let Some(pos) = text[from..].find("BRL") {
        let at = from + pos;
        from = at + "BRL".len();

        // "1" right before, allowing whitespace in between
        if !text[..at].trim_end().ends_with('1') {
            continue;
        }

        let rest = text[from..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();

        let token: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .collect();
        if token.is_empty() {
            continue;
        }

        // first comma is the decimal point
        return parse_decimal_prefix(&token.replacen(',', ".", 1));
    }

    None
}

/// Parse the longest leading `digits[.digits]` run; trailing junk is ignored.
fn parse_decimal_prefix(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;

    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }

    if end == 0 {
        return None;
    }
    s[..end].parse().ok()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_for_url() {
        assert_eq!(
            SourceKind::for_url("https://api.exchangerate.host/convert?from=BRL&to=USD"),
            SourceKind::ExchangeRateHost
        );
        assert_eq!(
            SourceKind::for_url("https://open.er-api.com/v6/latest/BRL"),
            SourceKind::OpenErApi
        );
        assert_eq!(
            SourceKind::for_url("https://v6.exchangerate-api.com/v6/KEY/latest/BRL"),
            SourceKind::ExchangeRateApiV6
        );
        assert_eq!(
            SourceKind::for_url("https://nubank.com.br/taxas-conversao/"),
            SourceKind::HtmlPage
        );
    }

    #[test]
    fn test_json_shapes() {
        let host = Payload::Json(json!({ "success": true, "result": 0.1834 }));
        assert_eq!(SourceKind::ExchangeRateHost.extract(&host), Some(0.1834));

        let er = Payload::Json(json!({ "result": "success", "rates": { "USD": 0.18, "EUR": 0.17 } }));
        assert_eq!(SourceKind::OpenErApi.extract(&er), Some(0.18));

        let v6 = Payload::Json(json!({ "conversion_rates": { "USD": 0.1801 } }));
        assert_eq!(SourceKind::ExchangeRateApiV6.extract(&v6), Some(0.1801));
    }

    #[test]
    fn test_json_wrong_shape_is_none() {
        let er = Payload::Json(json!({ "rates": { "EUR": 0.17 } }));
        assert_eq!(SourceKind::OpenErApi.extract(&er), None);

        let any = Payload::Json(json!({ "result": 0.18 }));
        assert_eq!(SourceKind::HtmlPage.extract(&any), None);
    }

    #[test]
    fn test_json_numeric_string() {
        let host = Payload::Json(json!({ "result": "0.1834" }));
        assert_eq!(SourceKind::ExchangeRateHost.extract(&host), Some(0.1834));
    }

    #[test]
    fn test_json_numeric_string_parsed_whole() {
        let sci = Payload::Json(json!({ "result": "1e-3" }));
        assert_eq!(SourceKind::ExchangeRateHost.extract(&sci), Some(0.001));

        let junk = Payload::Json(json!({ "result": "0.18 USD" }));
        assert_eq!(SourceKind::ExchangeRateHost.extract(&junk), None);
    }

    #[test]
    fn test_non_positive_rejected() {
        let zero = Payload::Json(json!({ "result": 0 }));
        assert_eq!(SourceKind::ExchangeRateHost.extract(&zero), None);

        let neg = Payload::Json(json!({ "result": -0.5 }));
        assert_eq!(SourceKind::ExchangeRateHost.extract(&neg), None);

        let text = Payload::Text("1 BRL = 0,00 USD".into());
        assert_eq!(SourceKind::HtmlPage.extract(&text), None);
    }

    #[test]
    fn test_html_dot_separator() {
        let page = Payload::Text(
            "<html><body><div class=\"rate\">1 BRL = 0.1834 USD</div></body></html>".into(),
        );
        assert_eq!(SourceKind::HtmlPage.extract(&page), Some(0.1834));
    }

    #[test]
    fn test_html_comma_separator() {
        let page = Payload::Text("<p>Hoje: 1 BRL=0,1834 USD</p>".into());
        assert_eq!(SourceKind::HtmlPage.extract(&page), Some(0.1834));
    }

    #[test]
    fn test_html_pattern_split_by_tags() {
        let page = Payload::Text("<span>1</span> <b>BRL</b> = <i>5.4321</i>".into());
        assert_eq!(SourceKind::HtmlPage.extract(&page), Some(5.4321));
    }

    #[test]
    fn test_html_skips_non_matching_occurrences() {
        let page = Payload::Text("Convert BRL to USD. Rate: 1 BRL = 0.19".into());
        assert_eq!(SourceKind::HtmlPage.extract(&page), Some(0.19));
    }

    #[test]
    fn test_html_nbsp_separated() {
        let page = Payload::Text(
            "<body><p>1&nbsp;BRL&nbsp;=&nbsp;0,1834&nbsp;USD</p></body>".into(),
        );
        assert_eq!(SourceKind::HtmlPage.extract(&page), Some(0.1834));
    }

    #[test]
    fn test_html_numeric_references() {
        let dec = Payload::Text("<p>1&#160;BRL&#160;=&#160;0.1834</p>".into());
        assert_eq!(SourceKind::HtmlPage.extract(&dec), Some(0.1834));

        let hex = Payload::Text("<p>1&#xA0;BRL&#xa0;=&#xA0;0.1834</p>".into());
        assert_eq!(SourceKind::HtmlPage.extract(&hex), Some(0.1834));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("AT&T &unknown; &"), "AT&T &unknown; &");
        assert_eq!(decode_entities("&#39;x&#x27;"), "'x'");
    }

    #[test]
    fn test_html_only_body_scanned() {
        let page = Payload::Text(
            "<html><head><title>1 BRL = 9.99</title></head>\
             <BODY class=\"main\"><p>1 BRL = 0.18</p></BODY></html>"
                .into(),
        );
        assert_eq!(SourceKind::HtmlPage.extract(&page), Some(0.18));
    }

    #[test]
    fn test_html_head_ignored_without_body_match() {
        let page = Payload::Text(
            "<html><head><title>1 BRL = 9.99</title></head><body>no rate</body></html>".into(),
        );
        assert_eq!(SourceKind::HtmlPage.extract(&page), None);
    }

    #[test]
    fn test_html_without_pattern() {
        let page = Payload::Text("<html><body>Service unavailable</body></html>".into());
        assert_eq!(SourceKind::HtmlPage.extract(&page), None);
    }

    #[test]
    fn test_text_fallback_for_json_kind() {
        let page = Payload::Text("1 BRL = 0.18".into());
        assert_eq!(SourceKind::OpenErApi.extract(&page), Some(0.18));
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            Payload::decode(r#"{"result": 1.5}"#.to_string()),
            Payload::Json(json!({ "result": 1.5 }))
        );
        assert_eq!(
            Payload::decode("<html></html>".to_string()),
            Payload::Text("<html></html>".into())
        );
    }

    #[test]
    fn test_parse_decimal_prefix() {
        assert_eq!(parse_decimal_prefix("5.12"), Some(5.12));
        assert_eq!(parse_decimal_prefix("1.234.56"), Some(1.234));
        assert_eq!(parse_decimal_prefix("7."), Some(7.0));
        assert_eq!(parse_decimal_prefix(".5"), Some(0.5));
        assert_eq!(parse_decimal_prefix("."), None);
        assert_eq!(parse_decimal_prefix("abc"), None);
    }
}

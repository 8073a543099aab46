//! Translation lookup for newly added words.
//!
//! Calls a MyMemory-compatible API (`GET {base}/get?q=word&langpair=en|he`) and
//! collects the main translation plus the alternative matches.

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Looks up translations of an English word.
///
/// An empty result means the service answered but knows no translation;
/// `TranslationLookupFailed` means the service could not be asked.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, word: &str) -> AppResult<Vec<String>>;
}

#[derive(Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: Option<MyMemoryData>,
    #[serde(rename = "responseStatus")]
    response_status: Option<serde_json::Value>,
    #[serde(default)]
    matches: Vec<MyMemoryMatch>,
}

#[derive(Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

#[derive(Deserialize)]
struct MyMemoryMatch {
    translation: Option<String>,
}

pub struct MyMemoryTranslator {
    client: reqwest::Client,
    base_url: String,
    lang_pair: String,
}

impl MyMemoryTranslator {
    pub fn new(base_url: impl Into<String>, lang_pair: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config::translate::timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            lang_pair: lang_pair.into(),
        })
    }

    /// Translator configured from `TRANSLATE_API_URL` / `TRANSLATE_LANG_PAIR`.
    pub fn from_env() -> AppResult<Self> {
        Self::new(config::translate::API_URL.as_str(), config::translate::LANG_PAIR.as_str())
    }
}

fn status_ok(status: &Option<serde_json::Value>) -> bool {
    match status {
        None => true,
        Some(serde_json::Value::Number(n)) => n.as_u64() == Some(200),
        Some(serde_json::Value::String(s)) => s == "200",
        Some(_) => false,
    }
}

/// Keeps usable candidates: non-empty, not an echo of the word, no repeats.
fn collect_translations(word: &str, candidates: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for candidate in candidates {
        let text = candidate.trim().trim_end_matches('.').trim().to_string();
        if text.is_empty() || text.eq_ignore_ascii_case(word) || result.contains(&text) {
            continue;
        }
        result.push(text);
        if result.len() >= config::translate::MAX_TRANSLATIONS {
            break;
        }
    }
    result
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(&self, word: &str) -> AppResult<Vec<String>> {
        let url = format!(
            "{}/get?q={}&langpair={}",
            self.base_url,
            urlencoding::encode(word),
            urlencoding::encode(&self.lang_pair)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::TranslationLookupFailed(e.to_string()))?;

        if !response.status().is_success() {
            log::warn!("Translation API returned status {} for '{}'", response.status(), word);
            return Err(AppError::TranslationLookupFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let data: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| AppError::TranslationLookupFailed(format!("bad response: {}", e)))?;

        if !status_ok(&data.response_status) {
            return Err(AppError::TranslationLookupFailed(format!(
                "service status {:?}",
                data.response_status
            )));
        }

        let main = data.response_data.and_then(|d| d.translated_text);
        let alternatives = data.matches.into_iter().filter_map(|m| m.translation);
        let translations = collect_translations(word, main.into_iter().chain(alternatives));

        log::debug!("Translations for '{}': {:?}", word, translations);
        Ok(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_collect_translations_filters() {
        let got = collect_translations(
            "cat",
            vec![
                "חתול".to_string(),
                " חתול ".to_string(),
                "CAT".to_string(),
                "".to_string(),
                "חתולה.".to_string(),
            ],
        );
        assert_eq!(got, vec!["חתול".to_string(), "חתולה".to_string()]);
    }

    #[test]
    fn test_collect_translations_limit() {
        let many = (0..20).map(|i| format!("t{}", i));
        assert_eq!(
            collect_translations("x", many).len(),
            config::translate::MAX_TRANSLATIONS
        );
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("q", "cat"))
            .and(query_param("langpair", "en|he"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseData": {"translatedText": "חתול"},
                "responseStatus": 200,
                "matches": [
                    {"translation": "חתול"},
                    {"translation": "חתולה"}
                ]
            })))
            .mount(&server)
            .await;

        let translator = MyMemoryTranslator::new(server.uri(), "en|he").unwrap();
        let got = translator.translate("cat").await.unwrap();
        assert_eq!(got, vec!["חתול".to_string(), "חתולה".to_string()]);
    }

    #[tokio::test]
    async fn test_translate_no_results_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseData": {"translatedText": "blorf"},
                "responseStatus": 200,
                "matches": []
            })))
            .mount(&server)
            .await;

        let translator = MyMemoryTranslator::new(server.uri(), "en|he").unwrap();
        assert!(translator.translate("blorf").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_translate_http_error_is_lookup_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let translator = MyMemoryTranslator::new(server.uri(), "en|he").unwrap();
        let err = translator.translate("cat").await.unwrap_err();
        assert!(matches!(err, AppError::TranslationLookupFailed(_)));
    }

    #[tokio::test]
    async fn test_translate_service_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseData": {"translatedText": "QUOTA EXCEEDED"},
                "responseStatus": "429",
                "matches": []
            })))
            .mount(&server)
            .await;

        let translator = MyMemoryTranslator::new(server.uri(), "en|he").unwrap();
        assert!(matches!(
            translator.translate("cat").await,
            Err(AppError::TranslationLookupFailed(_))
        ));
    }
}

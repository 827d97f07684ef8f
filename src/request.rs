use std::fmt;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::{Record, Result};

/// Everything that identifies one page request, minus the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey<'a> {
    pub region: &'a str,
    pub municipality: &'a str,
    pub bracket: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> QueryKey<'a> {
    /// The window of `page_size` records starting at `start` (1-based, inclusive).
    pub fn window(
        region: &'a str,
        municipality: &'a str,
        bracket: &'a str,
        start: usize,
        page_size: usize,
    ) -> Self {
        QueryKey {
            region,
            municipality,
            bracket,
            start,
            end: start + page_size - 1,
        }
    }
}

impl fmt::Display for QueryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{} [{}..={}]",
            self.region, self.municipality, self.bracket, self.start, self.end
        )
    }
}

/// Builds the positional `BuscarAreaActEstr` target for one page.
/// The zeros stand for the filters this tool never narrows on.
pub fn build_url(base_url: &str, key: &QueryKey<'_>, token: &str) -> String {
    format!(
        "{}/{}/{}/0/0/0/0/0/0/0/0/{}/{}/0/{}/{}",
        base_url.trim_end_matches('/'),
        key.region,
        key.municipality,
        key.start,
        key.end,
        key.bracket,
        token
    )
}

/// Where pages of records come from.
#[async_trait]
pub trait PageSource {
    /// Fetches one window. An empty `Vec` means the source had nothing there.
    async fn fetch_page(&self, key: &QueryKey<'_>) -> Result<Vec<Record>>;
}

/// The live DENUE endpoint.
pub struct HttpSource {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(HttpSource {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch_page(&self, key: &QueryKey<'_>) -> Result<Vec<Record>> {
        debug!("Requesting page {key}");
        let url = build_url(&self.base_url, key, &self.token);
        // The token is part of the path, so errors must not carry the URL.
        let objects = async {
            self.client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<Map<String, Value>>>()
                .await
        }
        .await
        .map_err(reqwest::Error::without_url)?;

        Ok(objects.into_iter().map(Record::from_json_object).collect())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::Error;

    const BASE: &str = "https://www.inegi.org.mx/app/api/denue/v1/consulta/BuscarAreaActEstr";

    #[test]
    fn url_follows_positional_layout() {
        let key = QueryKey::window("09", "0", "6", 1, 1000);
        assert_eq!(key.end, 1000);
        assert_eq!(
            build_url(BASE, &key, "tok"),
            format!("{BASE}/09/0/0/0/0/0/0/0/0/0/1/1000/0/6/tok")
        );
    }

    #[test]
    fn url_is_a_pure_function_of_its_inputs() {
        let a = QueryKey::window("32", "0", "7", 2001, 1000);
        let b = QueryKey::window("32", "0", "7", 2001, 1000);
        assert_eq!(build_url(BASE, &a, "tok"), build_url(BASE, &b, "tok"));
        assert!(build_url(BASE, &a, "tok").ends_with("/2001/3000/0/7/tok"));
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let key = QueryKey::window("01", "0", "6", 1, 10);
        assert_eq!(
            build_url("http://localhost:3000/", &key, "t"),
            "http://localhost:3000/01/0/0/0/0/0/0/0/0/0/1/10/0/6/t"
        );
    }

    #[test]
    fn display_never_shows_token() {
        let key = QueryKey::window("09", "0", "6", 1001, 1000);
        assert_eq!(key.to_string(), "09-0-6 [1001..=2000]");
    }

    fn source_for(base_url: String) -> HttpSource {
        let config = Config {
            token: "tok".into(),
            base_url,
            request_timeout_secs: 5,
            ..Config::default()
        };
        HttpSource::new(&config).unwrap()
    }

    #[tokio::test]
    async fn decodes_array_into_lowercased_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/09/0/0/0/0/0/0/0/0/0/1/10/0/6/tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "Id": "6250",
                    "Nombre": "Laboratorios Norte",
                    "Clase_actividad": "Fabricación de preparaciones farmacéuticas",
                    "Latitud": 19.43
                },
                { "Id": "6251", "Clase_actividad": "Comercio al por menor" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(server.uri());
        let key = QueryKey::window("09", "0", "6", 1, 10);
        let page = source.fetch_page(&key).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id(), Some("6250"));
        assert_eq!(page[0].get("nombre"), Some("Laboratorios Norte"));
        assert_eq!(
            page[0].industry_class(),
            Some("Fabricación de preparaciones farmacéuticas")
        );
        assert_eq!(page[0].get("latitud"), Some("19.43"));
        assert_eq!(page[1].id(), Some("6251"));
    }

    #[tokio::test]
    async fn empty_array_is_an_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let source = source_for(server.uri());
        let key = QueryKey::window("32", "0", "7", 1001, 1000);
        assert!(source.fetch_page(&key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("[]"))
            .mount(&server)
            .await;

        let source = source_for(server.uri());
        let key = QueryKey::window("09", "0", "6", 1, 10);
        let err = source.fetch_page(&key).await.unwrap_err();

        match &err {
            Error::Reqwest(e) => assert_eq!(e.status(), Some(StatusCode::INTERNAL_SERVER_ERROR)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!err.to_string().contains("tok"));
    }

    #[tokio::test]
    async fn body_that_is_not_an_array_of_objects_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("No hay resultados"))
            .mount(&server)
            .await;

        let source = source_for(server.uri());
        let key = QueryKey::window("09", "0", "6", 1, 10);
        assert!(matches!(
            source.fetch_page(&key).await,
            Err(Error::Reqwest(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error_without_token() {
        let config = Config {
            token: "very-secret-token".into(),
            base_url: "http://127.0.0.1:9".into(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let source = HttpSource::new(&config).unwrap();
        let key = QueryKey::window("09", "0", "6", 1, 10);

        let err = source.fetch_page(&key).await.unwrap_err();
        assert!(!err.to_string().contains("very-secret-token"));
    }
}

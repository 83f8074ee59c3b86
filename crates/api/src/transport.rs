use crate::Error;
use serde_json::Value;

/// Transport moves JSON documents to and from the platform API.
/// Paths are CIDs (`/check_bundle/123`) or collections (`/check_bundle`).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, Error>;
    async fn post(&self, path: &str, body: Value) -> Result<Value, Error>;
    async fn put(&self, path: &str, body: Value) -> Result<Value, Error>;
    async fn delete(&self, path: &str) -> Result<(), Error>;
}

/// HttpTransport calls the platform REST API.
#[derive(Clone)]
pub struct HttpTransport {
    // Base URL of the API, such as https://api.circonus.com/v2
    base: url::Url,
    // HTTP client to use for REST requests.
    http_client: reqwest::Client,
    // API token sent with every request.
    token: String,
    // Application name which the token is registered to.
    app_name: String,
}

impl HttpTransport {
    pub fn new(base: url::Url, token: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            base,
            http_client: reqwest::Client::new(),
            token: token.into(),
            app_name: app_name.into(),
        }
    }

    fn url(&self, path: &str) -> Result<url::Url, Error> {
        // Url::join would discard the base path (`/v2`) of an absolute path.
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url::Url::parse(&joined).map_err(|err| Error::Url(joined, err))
    }

    async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;

        let mut builder = self
            .http_client
            .request(method.clone(), url.clone())
            .header("X-Circonus-Auth-Token", &self.token)
            .header("X-Circonus-App-Name", &self.app_name)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(body) = &body {
            builder = builder.json(body);
        }
        tracing::debug!(%method, %url, "calling platform API");

        let request_err = |source| Error::Request {
            method: method.to_string(),
            url: url.to_string(),
            source,
        };
        let response = builder.send().await.map_err(request_err)?;
        let status = response.status();
        let text = response.text().await.map_err(request_err)?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| Error::Decode {
            what: path.to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value, Error> {
        self.call(reqwest::Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, Error> {
        self.call(reqwest::Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, Error> {
        self.call(reqwest::Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        self.call(reqwest::Method::DELETE, path, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::HttpTransport;

    #[test]
    fn test_url_keeps_base_path() {
        let transport = HttpTransport::new(
            url::Url::parse("https://api.circonus.com/v2/").unwrap(),
            "token",
            "app",
        );
        for (case, expect) in [
            ("/check_bundle/1", "https://api.circonus.com/v2/check_bundle/1"),
            ("check_bundle", "https://api.circonus.com/v2/check_bundle"),
            ("/account/current", "https://api.circonus.com/v2/account/current"),
        ] {
            assert_eq!(transport.url(case).unwrap().as_str(), expect);
        }
    }
}

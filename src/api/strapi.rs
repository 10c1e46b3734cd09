use async_trait::async_trait;
use log::{debug, log_enabled, trace};
use reqwest::{header, StatusCode};
use reqwest_middleware::RequestBuilder;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::Config,
    error::{Error, Result},
    post::{Post, PostId, PostUpdate},
};

use super::{ContentClient, PostApi};

pub type APIPostList = StrapiResponse<Vec<Post>>;
pub type APIPost = StrapiResponse<Post>;

#[derive(Debug, Clone)]
pub struct StrapiClient {
    inner: ContentClient,
    api_url: String,
    collection: String,
    authorization: Option<String>,
}

impl StrapiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            inner: ContentClient::new(config)?,
            api_url: config.api_url().to_string(),
            collection: config.collection().to_string(),
            authorization: config.authorization(),
        })
    }

    fn wrap_request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(header::ACCEPT, "application/json");
        match &self.authorization {
            Some(authorization) => builder.header(header::AUTHORIZATION, authorization),
            None => builder,
        }
    }

    pub fn post_list_url(&self, slug: &str) -> String {
        format!(
            "{}/api/{}?filters[slug][$eq]={}&populate=*",
            self.api_url,
            self.collection,
            urlencoding::encode(slug)
        )
    }

    pub fn post_url(&self, id: &PostId) -> String {
        format!(
            "{}/api/{}/{}",
            self.api_url,
            self.collection,
            urlencoding::encode(id.as_str())
        )
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.wrap_request(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if log_enabled!(log::Level::Trace) {
            if let Ok(body) = serde_json::from_slice::<Value>(&body) {
                trace!("{}", serde_json::to_string_pretty(&body)?);
            }
        }

        decode(status, &body)
    }
}

#[async_trait]
impl PostApi for StrapiClient {
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let url = self.post_list_url(slug);
        debug!("GET {}", url);

        let request = self.inner.client().get(&url);
        let response: APIPostList = self.send(request).await?;
        Ok(response.data.into_iter().next())
    }

    async fn update_post(&self, id: &PostId, update: &PostUpdate) -> Result<Post> {
        let url = self.post_url(id);
        debug!("PUT {}", url);

        let request = self.inner.client().put(&url).json(&StrapiRequest { data: update });
        let response: APIPost = self.send(request).await?;
        Ok(response.data)
    }
}

/// Parse a response body, preferring the API's own error payload on failure.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if status.is_success() {
        if let Ok(value) = serde_json::from_slice(body) {
            return Ok(value);
        }
    }

    // try to parse as error
    match serde_json::from_slice::<StrapiErrorResponse>(body) {
        Ok(StrapiErrorResponse { error }) => Err(Error::Api {
            status: error.status.unwrap_or(status.as_u16()),
            name: error.name,
            message: error.message,
        }),
        Err(_) if !status.is_success() => Err(Error::Api {
            status: status.as_u16(),
            name: status.canonical_reason().unwrap_or("HttpError").to_string(),
            message: String::from_utf8_lossy(body).chars().take(200).collect(),
        }),
        Err(_) => Err(serde_json::from_slice::<T>(body).err().map_or_else(
            || Error::Api {
                status: status.as_u16(),
                name: "DecodeError".to_string(),
                message: "unreadable response".to_string(),
            },
            Error::Json,
        )),
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StrapiResponse<T> {
    pub data: T,
}

#[derive(Serialize, Debug)]
struct StrapiRequest<'a, T> {
    data: &'a T,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StrapiErrorResponse {
    pub error: StrapiError,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StrapiError {
    pub status: Option<u16>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    fn client(args: &[&str]) -> StrapiClient {
        let config =
            Config::try_parse_from(std::iter::once("strapi-post").chain(args.iter().copied()))
                .unwrap();
        StrapiClient::new(&config).unwrap()
    }

    #[test]
    fn builds_urls() {
        let client = client(&["x", "--api-url", "https://cms.example.com/", "-c", "posts"]);
        assert_eq!(
            client.post_list_url("hello world"),
            "https://cms.example.com/api/posts?filters[slug][$eq]=hello%20world&populate=*"
        );
        assert_eq!(
            client.post_url(&PostId::new("12")),
            "https://cms.example.com/api/posts/12"
        );
    }

    #[test]
    fn decodes_post_list() {
        let body = json!({
            "data": [{
                "id": 1,
                "slug": "a",
                "title": "A",
                "description": "d",
                "content": "c",
                "createdAt": "2024-01-01T00:00:00Z"
            }],
            "meta": { "pagination": { "total": 1 } }
        });
        let list: APIPostList = decode(StatusCode::OK, body.to_string().as_bytes()).unwrap();
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].title, "A");
    }

    #[test]
    fn decodes_api_error() {
        let body = json!({
            "data": null,
            "error": {
                "status": 404,
                "name": "NotFoundError",
                "message": "Not Found",
                "details": {}
            }
        });
        let result: Result<APIPost> = decode(StatusCode::NOT_FOUND, body.to_string().as_bytes());
        match result {
            Err(Error::Api { status, name, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(name, "NotFoundError");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_json_failure_keeps_status() {
        let result: Result<APIPost> = decode(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert!(matches!(result, Err(Error::Api { status: 502, .. })));
    }

    #[test]
    fn malformed_success_is_json_error() {
        let result: Result<APIPost> = decode(StatusCode::OK, b"{\"data\": 3}");
        assert!(matches!(result, Err(Error::Json(_))));
    }
}

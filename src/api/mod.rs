pub mod strapi;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::{
    config::Config,
    error::Result,
    post::{Post, PostId, PostUpdate},
};

/// Content store holding the posts.
#[async_trait]
pub trait PostApi: Send + Sync {
    /// `None` when no post carries the slug.
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>>;
    /// Returns the stored post after the update.
    async fn update_post(&self, id: &PostId, update: &PostUpdate) -> Result<Post>;
}

#[derive(Debug, Clone)]
pub struct ContentClient {
    client: ClientWithMiddleware,
}

impl ContentClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.retries());
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }
    fn client(&self) -> &ClientWithMiddleware {
        &self.client
    }
}

/// Instagram business account publishing
///
/// Instagram only accepts image posts, published in two steps: create a
/// media container from the image URL, then publish the container. The
/// permalink is looked up afterwards; if that lookup fails the post is still
/// reported as published with the generic Instagram URL.

use async_trait::async_trait;
use serde::Deserialize;

use super::graph::{GraphClient, GraphError};
use super::{Post, PublishError, PublishedPost, Publisher};
use crate::models::social_account::{Platform, SocialAccount};

/// Used when the permalink cannot be fetched
pub const FALLBACK_URL: &str = "https://www.instagram.com/";

#[derive(Debug, Deserialize)]
struct Created {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Permalink {
    permalink: Option<String>,
}

fn require_id(created: Created, step: &str) -> Result<String, GraphError> {
    created
        .id
        .ok_or_else(|| GraphError::UnexpectedResponse(format!("{} returned no id", step)))
}

#[derive(Debug, Clone)]
pub struct InstagramPublisher {
    graph: GraphClient,
}

impl InstagramPublisher {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }

    async fn permalink(&self, media_id: &str, token: &str) -> String {
        let result: Result<Permalink, GraphError> = self
            .graph
            .get(media_id, &[("fields", "permalink"), ("access_token", token)])
            .await;

        match result {
            Ok(Permalink {
                permalink: Some(url),
            }) => url,
            Ok(_) => FALLBACK_URL.to_string(),
            Err(e) => {
                tracing::debug!(media_id = %media_id, error = %e, "Permalink lookup failed");
                FALLBACK_URL.to_string()
            }
        }
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn publish(
        &self,
        account: &SocialAccount,
        post: Post<'_>,
    ) -> Result<PublishedPost, PublishError> {
        let image_url = post
            .image_url
            .ok_or(PublishError::Unsupported("Instagram requires an image"))?;

        let ig_user = account.account_id.as_str();
        let token = account.access_token.as_str();

        let container: Created = self
            .graph
            .post_form(
                &format!("{}/media", ig_user),
                &[("image_url", image_url), ("caption", post.text), ("access_token", token)],
            )
            .await?;
        let creation_id = require_id(container, "media container")?;

        let published: Created = self
            .graph
            .post_form(
                &format!("{}/media_publish", ig_user),
                &[("creation_id", creation_id.as_str()), ("access_token", token)],
            )
            .await?;
        let media_id = require_id(published, "media publish")?;

        let url = self.permalink(&media_id, token).await;

        Ok(PublishedPost {
            post_id: media_id,
            url,
        })
    }
}

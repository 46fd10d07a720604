/// Facebook page publishing
///
/// Text posts go to `/{page_id}/feed`; posts with an image go to
/// `/{page_id}/photos` with the image URL and the text as caption.

use async_trait::async_trait;
use serde::Deserialize;

use super::graph::{GraphClient, GraphError};
use super::{Post, PublishError, PublishedPost, Publisher};
use crate::models::social_account::{Platform, SocialAccount};

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: Option<String>,
    post_id: Option<String>,
}

/// Public URL of a page post
pub fn post_url(post_id: &str) -> String {
    format!("https://www.facebook.com/{}", post_id)
}

#[derive(Debug, Clone)]
pub struct FacebookPublisher {
    graph: GraphClient,
}

impl FacebookPublisher {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl Publisher for FacebookPublisher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn publish(
        &self,
        account: &SocialAccount,
        post: Post<'_>,
    ) -> Result<PublishedPost, PublishError> {
        let page_id = account.target_page_id();
        let token = account.access_token.as_str();

        let created: CreatedPost = match post.image_url {
            Some(image_url) => {
                self.graph
                    .post_form(
                        &format!("{}/photos", page_id),
                        &[("url", image_url), ("caption", post.text), ("access_token", token)],
                    )
                    .await?
            }
            None => {
                self.graph
                    .post_form(
                        &format!("{}/feed", page_id),
                        &[("message", post.text), ("access_token", token)],
                    )
                    .await?
            }
        };

        // Photo uploads return the photo as `id` and the feed story as `post_id`
        let post_id = created.post_id.or(created.id).ok_or_else(|| {
            GraphError::UnexpectedResponse("post created without an id".to_string())
        })?;

        Ok(PublishedPost {
            url: post_url(&post_id),
            post_id,
        })
    }
}

/// Social platform integration
///
/// # Modules
///
/// - [`graph`]: Versioned Graph API client
/// - [`oauth`]: Facebook authorization URL, code exchange and page listing
/// - [`facebook`]: Page feed and photo publishing
/// - [`instagram`]: Two-step container publishing
///
/// Publishing goes through the [`Publisher`] trait, one implementation per
/// [`Platform`]. [`PublishDispatcher`] picks the implementation and folds the
/// result into a [`PublishOutcome`], so callers never handle platform errors
/// directly.

use async_trait::async_trait;

use crate::models::content::Content;
use crate::models::social_account::{Platform, SocialAccount};

pub mod facebook;
pub mod graph;
pub mod instagram;
pub mod oauth;

use facebook::FacebookPublisher;
use graph::{GraphClient, GraphError};
use instagram::InstagramPublisher;

/// What gets posted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Post<'a> {
    pub text: &'a str,
    pub image_url: Option<&'a str>,
}

impl<'a> From<&'a Content> for Post<'a> {
    fn from(content: &'a Content) -> Self {
        Self {
            text: &content.body,
            image_url: content
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty()),
        }
    }
}

/// A post the platform accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub post_id: String,
    pub url: String,
}

/// Why a publish attempt failed
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The platform cannot post this content
    #[error("{0}")]
    Unsupported(&'static str),
}

/// Normalized result of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { post_id: String, url: String },
    Failed { error: String },
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

impl From<Result<PublishedPost, PublishError>> for PublishOutcome {
    fn from(result: Result<PublishedPost, PublishError>) -> Self {
        match result {
            Ok(post) => PublishOutcome::Published {
                post_id: post.post_id,
                url: post.url,
            },
            Err(e) => PublishOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// A platform that can publish content
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Platform this publisher targets
    fn platform(&self) -> Platform;

    /// Publishes `post` with the stored account credentials
    async fn publish(
        &self,
        account: &SocialAccount,
        post: Post<'_>,
    ) -> Result<PublishedPost, PublishError>;
}

/// Routes publish requests to the platform implementation
#[derive(Debug, Clone)]
pub struct PublishDispatcher {
    facebook: FacebookPublisher,
    instagram: InstagramPublisher,
}

impl PublishDispatcher {
    pub fn new(graph: GraphClient) -> Self {
        Self {
            facebook: FacebookPublisher::new(graph.clone()),
            instagram: InstagramPublisher::new(graph),
        }
    }

    pub fn publisher(&self, platform: Platform) -> &dyn Publisher {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Instagram => &self.instagram,
        }
    }

    /// Publishes through the account's platform; never returns an error
    pub async fn dispatch(&self, account: &SocialAccount, post: Post<'_>) -> PublishOutcome {
        let publisher = self.publisher(account.platform);
        let outcome = PublishOutcome::from(publisher.publish(account, post).await);

        match &outcome {
            PublishOutcome::Published { post_id, .. } => {
                tracing::info!(platform = %account.platform, post_id = %post_id, "Published post");
            }
            PublishOutcome::Failed { error } => {
                tracing::warn!(platform = %account.platform, error = %error, "Publish failed");
            }
        }

        outcome
    }
}

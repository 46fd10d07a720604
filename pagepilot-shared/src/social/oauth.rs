/// Facebook OAuth: authorization URL, code exchange and page discovery
///
/// Instagram business accounts are reached through the Facebook page they
/// are linked to, so a single Facebook authorization connects both.
///
/// # Example
///
/// ```
/// use pagepilot_shared::social::oauth::FacebookOAuth;
///
/// let oauth = FacebookOAuth::new(
///     "1234",
///     "app-secret",
///     "https://app.example.com/api/social/facebook/callback",
///     "v19.0",
/// );
/// let url = oauth.authorization_url("random-state").unwrap();
/// assert!(url.as_str().starts_with("https://www.facebook.com/v19.0/dialog/oauth?"));
/// ```

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::graph::{GraphClient, GraphError};
use crate::db::rows::normalize_rows_as;
use crate::models::social_account::{Platform, UpsertSocialAccount};

/// Permissions requested at authorization, in request order
pub const SCOPES: [&str; 6] = [
    "pages_show_list",
    "pages_read_engagement",
    "pages_manage_posts",
    "instagram_basic",
    "instagram_content_publish",
    "business_management",
];

/// Host serving the login dialog
const DIALOG_HOST: &str = "https://www.facebook.com";

/// Facebook app credentials and callback location
#[derive(Clone)]
pub struct FacebookOAuth {
    pub client_id: String,
    client_secret: String,
    pub redirect_uri: String,
    pub version: String,
}

impl fmt::Debug for FacebookOAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookOAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Linked Instagram business account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstagramRef {
    pub id: String,
}

/// A page the authorizing user manages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacebookPage {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub instagram_business_account: Option<InstagramRef>,
}

impl FacebookPage {
    /// Accounts to persist when this page is connected
    ///
    /// The Facebook account always targets the page itself. A linked
    /// Instagram account publishes with the page token and keeps the page
    /// as its `page_id`.
    pub fn into_accounts(self, user_id: Uuid) -> Vec<UpsertSocialAccount> {
        let mut accounts = Vec::with_capacity(2);

        if let Some(instagram) = &self.instagram_business_account {
            accounts.push(UpsertSocialAccount {
                user_id,
                platform: Platform::Instagram,
                account_id: instagram.id.clone(),
                page_id: Some(self.id.clone()),
                account_name: self.name.clone(),
                access_token: self.access_token.clone(),
            });
        }

        accounts.insert(
            0,
            UpsertSocialAccount {
                user_id,
                platform: Platform::Facebook,
                account_id: self.id.clone(),
                page_id: Some(self.id),
                account_name: self.name,
                access_token: self.access_token,
            },
        );

        accounts
    }
}

impl FacebookOAuth {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            version: version.into(),
        }
    }

    /// Login dialog URL carrying `state` and the fixed scope list
    pub fn authorization_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let base = format!("{}/{}/dialog/oauth", DIALOG_HOST, self.version);
        let scope = SCOPES.join(",");

        Url::parse_with_params(
            &base,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
                ("response_type", "code"),
                ("scope", scope.as_str()),
            ],
        )
    }

    /// Exchanges an authorization code for a user access token
    pub async fn exchange_code(&self, graph: &GraphClient, code: &str) -> Result<String, GraphError> {
        let token: TokenResponse = graph
            .get(
                "oauth/access_token",
                &[
                    ("client_id", self.client_id.as_str()),
                    ("redirect_uri", self.redirect_uri.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("code", code),
                ],
            )
            .await?;

        Ok(token.access_token)
    }

    /// Pages the user manages, with page tokens and linked Instagram accounts
    pub async fn fetch_pages(
        &self,
        graph: &GraphClient,
        user_token: &str,
    ) -> Result<Vec<FacebookPage>, GraphError> {
        let body: Value = graph
            .get(
                "me/accounts",
                &[
                    ("fields", "id,name,access_token,instagram_business_account"),
                    ("access_token", user_token),
                ],
            )
            .await?;

        Ok(normalize_rows_as(Some(&body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oauth() -> FacebookOAuth {
        FacebookOAuth::new(
            "1234",
            "app-secret",
            "http://localhost:3000/api/social/facebook/callback",
            "v19.0",
        )
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = oauth().authorization_url("state-abc").unwrap();
        assert_eq!(url.host_str(), Some("www.facebook.com"));
        assert_eq!(url.path(), "/v19.0/dialog/oauth");

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "1234");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:3000/api/social/facebook/callback"
        );
        assert_eq!(params["state"], "state-abc");
        assert_eq!(params["response_type"], "code");

        let scopes: Vec<&str> = params["scope"].split(',').collect();
        assert_eq!(scopes, SCOPES.to_vec());
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let debug = format!("{:?}", oauth());
        assert!(debug.contains("1234"));
        assert!(!debug.contains("app-secret"));
    }

    #[test]
    fn test_page_with_instagram_yields_two_accounts() {
        let user_id = Uuid::new_v4();
        let page = FacebookPage {
            id: "p1".to_string(),
            name: Some("Bakery".to_string()),
            access_token: "page-token".to_string(),
            instagram_business_account: Some(InstagramRef {
                id: "ig1".to_string(),
            }),
        };

        let accounts = page.into_accounts(user_id);
        assert_eq!(accounts.len(), 2);

        assert_eq!(accounts[0].platform, Platform::Facebook);
        assert_eq!(accounts[0].account_id, "p1");
        assert_eq!(accounts[0].page_id.as_deref(), Some("p1"));

        assert_eq!(accounts[1].platform, Platform::Instagram);
        assert_eq!(accounts[1].account_id, "ig1");
        assert_eq!(accounts[1].page_id.as_deref(), Some("p1"));
        assert_eq!(accounts[1].access_token, "page-token");
    }

    #[test]
    fn test_page_without_instagram_yields_facebook_only() {
        let page = FacebookPage {
            id: "p1".to_string(),
            name: None,
            access_token: "page-token".to_string(),
            instagram_business_account: None,
        };

        let accounts = page.into_accounts(Uuid::new_v4());
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].platform, Platform::Facebook);
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v19.0/oauth/access_token"))
            .and(query_param("client_id", "1234"))
            .and(query_param("client_secret", "app-secret"))
            .and(query_param("code", "the-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "user-token",
                "token_type": "bearer",
                "expires_in": 5183944
            })))
            .expect(1)
            .mount(&server)
            .await;

        let graph = GraphClient::new(server.uri(), "v19.0").unwrap();
        let token = oauth().exchange_code(&graph, "the-code").await.unwrap();
        assert_eq!(token, "user-token");
    }

    #[tokio::test]
    async fn test_exchange_failure_does_not_leak_secret() {
        let graph = GraphClient::new("http://127.0.0.1:1", "v19.0").unwrap();
        let err = oauth().exchange_code(&graph, "the-code").await.unwrap_err();

        let text = err.to_string();
        assert!(text.starts_with("Graph request failed"), "{text}");
        assert!(!text.contains("app-secret"), "{text}");
        assert!(!text.contains("the-code"), "{text}");
    }

    #[tokio::test]
    async fn test_fetch_pages_skips_malformed_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v19.0/me/accounts"))
            .and(query_param("access_token", "user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "p1", "name": "Bakery", "access_token": "t1",
                     "instagram_business_account": {"id": "ig1"}},
                    {"id": "p2"}
                ],
                "paging": {}
            })))
            .mount(&server)
            .await;

        let graph = GraphClient::new(server.uri(), "v19.0").unwrap();
        let pages = oauth().fetch_pages(&graph, "user-token").await.unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id, "p1");
        assert_eq!(
            pages[0].instagram_business_account,
            Some(InstagramRef { id: "ig1".to_string() })
        );
    }

    #[tokio::test]
    async fn test_fetch_pages_empty_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v19.0/me/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let graph = GraphClient::new(server.uri(), "v19.0").unwrap();
        assert!(oauth().fetch_pages(&graph, "t").await.unwrap().is_empty());
    }
}

//! AWS credential resolution for SES signing.
//!
//! Explicit `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` from [`Config`] win.
//! Otherwise the standard AWS provider chain is used: environment, shared
//! credentials/config files and profiles, web identity, ECS container
//! credentials and the EC2 instance role.
//!
//! [`Config`]: crate::config::Config

use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::Region;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use tracing::warn;

use super::DeliveryError;
use crate::config::AwsCredentials;

const STATIC_PROVIDER_NAME: &str = "NotifierConfig";

/// Provider that always hands out the given static keys.
pub fn static_provider(credentials: &AwsCredentials) -> SharedCredentialsProvider {
    SharedCredentialsProvider::new(Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        credentials.session_token.clone(),
        None,
        STATIC_PROVIDER_NAME,
    ))
}

/// The standard AWS credential chain for `region`.
pub async fn default_chain(region: &str) -> SharedCredentialsProvider {
    let chain = DefaultCredentialsChain::builder()
        .region(Region::new(region.to_string()))
        .build()
        .await;
    SharedCredentialsProvider::new(chain)
}

/// Ask `provider` for the current keys.
///
/// Providers cache and refresh on their own, so this is called once per send.
pub async fn resolve(
    provider: &SharedCredentialsProvider,
) -> Result<AwsCredentials, DeliveryError> {
    match provider.provide_credentials().await {
        Ok(credentials) => Ok(AwsCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().map(str::to_string),
        }),
        Err(CredentialsError::CredentialsNotLoaded(_)) => Err(DeliveryError::MissingCredentials),
        Err(e) => {
            warn!(error = %e, "aws_credentials_unavailable");
            Err(DeliveryError::Credentials(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[tokio::test]
    async fn test_static_provider_round_trips_keys() {
        let provider = static_provider(&AwsCredentials {
            access_key_id: "AKIDSTATIC".to_string(),
            secret_access_key: "static-secret".to_string(),
            session_token: Some("session".to_string()),
        });

        let resolved = resolve(&provider).await.unwrap();
        assert_eq!(resolved.access_key_id, "AKIDSTATIC");
        assert_eq!(resolved.secret_access_key, "static-secret");
        assert_eq!(resolved.session_token.as_deref(), Some("session"));
    }

    #[tokio::test]
    async fn test_default_chain_reads_shared_credentials_file() {
        let dir = env::temp_dir().join(format!("notifier-aws-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let credentials_file = dir.join("credentials");
        fs::write(
            &credentials_file,
            "[default]\naws_access_key_id = AKIDFROMFILE\naws_secret_access_key = file-secret\n",
        )
        .unwrap();

        // Only this test touches the AWS_* variables.
        env::remove_var("AWS_ACCESS_KEY_ID");
        env::remove_var("AWS_SECRET_ACCESS_KEY");
        env::remove_var("AWS_SESSION_TOKEN");
        env::remove_var("AWS_PROFILE");
        env::set_var("AWS_SHARED_CREDENTIALS_FILE", &credentials_file);
        env::set_var("AWS_CONFIG_FILE", dir.join("config"));
        env::set_var("AWS_EC2_METADATA_DISABLED", "true");

        let provider = default_chain("us-east-1").await;
        let resolved = resolve(&provider).await;

        env::remove_var("AWS_SHARED_CREDENTIALS_FILE");
        env::remove_var("AWS_CONFIG_FILE");
        env::remove_var("AWS_EC2_METADATA_DISABLED");
        let _ = fs::remove_dir_all(&dir);

        let resolved = resolved.unwrap();
        assert_eq!(resolved.access_key_id, "AKIDFROMFILE");
        assert_eq!(resolved.secret_access_key, "file-secret");
        assert_eq!(resolved.session_token, None);
    }
}

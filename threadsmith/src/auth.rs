//! `login` / `logout`: the out-of-band OAuth dance from a terminal.

use anyhow::{Context, Result, bail};
use mastodon_client::{Config, OAuthClient, PendingAuth, normalize_instance};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Start a login, or finish one when `code` is given.
pub async fn login(instance: &str, code: Option<&str>) -> Result<()> {
    let instance = normalize_instance(instance);
    if instance.is_empty() {
        bail!("Instance name is required, e.g. `threadsmith login mastodon.social`");
    }

    let mut config = Config::load().context("Failed to load credentials")?;
    let client = OAuthClient::new(&instance);

    let pending = match (code, pending_for(&config, &instance)) {
        (Some(_), Some(pending)) => pending,
        (Some(_), None) => bail!(
            "No login in progress for {}. Run `threadsmith login {}` without --code first.",
            instance,
            instance
        ),
        (None, _) => {
            eprintln!("Registering threadsmith with {}...", instance);
            let (pending, url) = client.start().await?;
            config.pending = Some(pending.clone());
            config.save().context("Failed to save pending login")?;

            eprintln!("Open this URL in your browser and approve access:\n\n  {}\n", url);
            pending
        }
    };

    let code = match code {
        Some(code) => code.to_string(),
        None => {
            eprint!("Paste the authorization code: ");
            let mut line = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut line)
                .await
                .context("Failed to read authorization code")?;
            line
        }
    };

    let credentials = client.exchange_code(&pending, &code).await?;
    config.credentials = Some(credentials);
    config.pending = None;
    config.save().context("Failed to save credentials")?;

    eprintln!("Logged in to {}", instance);
    Ok(())
}

/// Forget stored credentials and any half-finished login.
pub fn logout() -> Result<()> {
    let mut config = Config::load().context("Failed to load credentials")?;
    match config.credentials.take() {
        Some(credentials) => eprintln!("Logged out of {}", credentials.instance),
        None => eprintln!("Not logged in"),
    }
    config.pending = None;
    config.save().context("Failed to save credentials")?;
    Ok(())
}

fn pending_for(config: &Config, instance: &str) -> Option<PendingAuth> {
    config
        .pending
        .as_ref()
        .filter(|p| p.instance == instance)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(instance: &str) -> PendingAuth {
        PendingAuth {
            instance: instance.to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            code_verifier: "verifier".to_string(),
        }
    }

    #[test]
    fn test_pending_for_matching_instance() {
        let config = Config {
            credentials: None,
            pending: Some(pending("mastodon.social")),
        };
        assert!(pending_for(&config, "mastodon.social").is_some());
        assert!(pending_for(&config, "fosstodon.org").is_none());
        assert!(pending_for(&Config::default(), "mastodon.social").is_none());
    }
}

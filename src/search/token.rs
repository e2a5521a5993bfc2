//! Bearer token cache with single-flight refresh
//!
//! Amortizes a costly, rate-limited login exchange across many search
//! requests within the token's validity window. The slot mutex is held
//! across the exchange, so concurrent callers that find the token expired
//! or absent await the first caller's in-flight login instead of issuing
//! redundant exchanges.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// TVDB tokens are valid for a month; re-login well before that
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(23 * 60 * 60);

/// A cached bearer credential. In-process only, never persisted;
/// a restart always starts empty.
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Single-slot cache for a login-exchanged bearer token
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
    validity: Duration,
}

impl TokenCache {
    pub fn new(validity: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            validity,
        }
    }

    /// Return the cached token, or run `login` to obtain a fresh one.
    ///
    /// A token is valid while `now < expires_at`. A failed exchange caches
    /// nothing and surfaces the error to the caller.
    pub async fn get_or_refresh<F, Fut, E>(&self, login: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        // Held across the login call: concurrent callers block here and
        // find the fresh token once the first exchange completes
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if Instant::now() < cached.expires_at {
                debug!("Using cached provider token");
                return Ok(cached.token.clone());
            }
            debug!("Cached provider token expired");
        }

        let token = login().await?;
        *slot = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + self.validity,
        });
        debug!(validity_secs = self.validity.as_secs(), "Cached fresh provider token");
        Ok(token)
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(TOKEN_VALIDITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_token_reused_within_validity() {
        let cache = TokenCache::new(Duration::from_secs(3600));
        let logins = AtomicUsize::new(0);

        for _ in 0..3 {
            let token = cache
                .get_or_refresh(|| async {
                    logins.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("tok-1".to_string())
                })
                .await
                .unwrap();
            assert_eq!(token, "tok-1");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_triggers_one_new_exchange() {
        let cache = TokenCache::new(Duration::ZERO);
        let logins = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_refresh(|| async {
                    let n = logins.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(format!("tok-{}", n))
                })
                .await
                .unwrap();
        }
        // Zero validity: each call finds the token expired and logs in again
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_exchange_caches_nothing() {
        let cache = TokenCache::new(Duration::from_secs(3600));

        let err = cache
            .get_or_refresh(|| async { Err::<String, _>("login rejected".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "login rejected");

        // The next caller performs its own exchange
        let logins = AtomicUsize::new(0);
        let token = cache
            .get_or_refresh(|| async {
                logins.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("tok-after-failure".to_string())
            })
            .await
            .unwrap();
        assert_eq!(token, "tok-after-failure");
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let cache = Arc::new(TokenCache::new(Duration::from_secs(3600)));
        let logins = Arc::new(AtomicUsize::new(0));

        let make_login = |logins: Arc<AtomicUsize>| {
            move || async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                logins.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("shared-tok".to_string())
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_refresh(make_login(logins.clone())),
            cache.get_or_refresh(make_login(logins.clone()))
        );
        assert_eq!(a.unwrap(), "shared-tok");
        assert_eq!(b.unwrap(), "shared-tok");
        // The second caller awaited the first exchange instead of its own
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }
}

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, error, info, trace, warn};
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use tokio::sync::Mutex;

use crate::core::subtitles::detector;
use crate::core::subtitles::parsers::{default_parsers, Parser, TIME_INDICATOR};
use crate::core::subtitles::{
    NormalizedSubtitle, Result, SubtitleError, SubtitleFetcher, SubtitleType,
};

type PendingSubtitle = Shared<BoxFuture<'static, Result<Arc<NormalizedSubtitle>>>>;

/// The subtitle manager fetches, normalizes and caches subtitles per source location.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait SubtitleManager: Debug + Send + Sync {
    /// Fetch the subtitle at the given location and normalize it into a WebVTT document.
    ///
    /// A cached subtitle is returned as-is without fetching it again.
    /// It returns [None] when the given location is empty, else the normalized subtitle
    /// or the [SubtitleError] which prevented the conversion.
    async fn fetch_and_cache_subtitle(&self, location: &str) -> Result<Option<Arc<NormalizedSubtitle>>>;

    /// Retrieve the cached subtitle of the given location, this never fetches the subtitle.
    async fn subtitle_from_cache(&self, location: &str) -> Option<Arc<NormalizedSubtitle>>;

    /// Remove the cached subtitle of the given location, if present.
    async fn remove_from_cache(&self, location: &str);

    /// Remove all cached subtitles.
    async fn clear_cache(&self);
}

/// The default subtitle manager which keeps the normalized subtitles in memory for its lifetime.
///
/// Concurrent requests for the same uncached location share a single fetch.
#[derive(Debug)]
pub struct DefaultSubtitleManager {
    inner: Arc<InnerSubtitleManager>,
}

impl DefaultSubtitleManager {
    /// Returns a builder instance to create a new manager.
    pub fn builder() -> DefaultSubtitleManagerBuilder {
        DefaultSubtitleManagerBuilder::default()
    }

    /// Retrieve the number of cached subtitles.
    pub async fn len(&self) -> usize {
        self.inner.cache.lock().await.len()
    }

    /// Verify if no subtitles are cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn pending(&self, location: &str) -> PendingSubtitle {
        let inner = self.inner.clone();
        let location = location.to_string();

        async move {
            let result = inner.load(location.as_str()).await;
            inner.in_flight.lock().await.remove(&location);
            result
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl SubtitleManager for DefaultSubtitleManager {
    async fn fetch_and_cache_subtitle(&self, location: &str) -> Result<Option<Arc<NormalizedSubtitle>>> {
        if location.is_empty() {
            trace!("Subtitle location is empty, nothing to fetch");
            return Ok(None);
        }
        if let Some(subtitle) = self.inner.cached(location).await {
            debug!("Returning cached subtitle for {}", location);
            return Ok(Some(subtitle));
        }

        let pending = {
            let mut in_flight = self.inner.in_flight.lock().await;
            // the subtitle might have been stored while waiting for the lock
            if let Some(subtitle) = self.inner.cached(location).await {
                debug!("Returning cached subtitle for {}", location);
                return Ok(Some(subtitle));
            }

            match in_flight.get(location) {
                Some(pending) => {
                    debug!("Awaiting in-flight subtitle request for {}", location);
                    pending.clone()
                }
                None => {
                    let pending = self.pending(location);
                    in_flight.insert(location.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await.map(Some)
    }

    async fn subtitle_from_cache(&self, location: &str) -> Option<Arc<NormalizedSubtitle>> {
        self.inner.cached(location).await
    }

    async fn remove_from_cache(&self, location: &str) {
        if self.inner.cache.lock().await.remove(location).is_some() {
            info!("Removed subtitle {} from cache", location);
        }
    }

    async fn clear_cache(&self) {
        let mut cache = self.inner.cache.lock().await;
        let len = cache.len();
        cache.clear();
        info!("Subtitle cache has been cleared, removed {} subtitles", len);
    }
}

/// The builder of the [DefaultSubtitleManager].
#[derive(Debug, Default)]
pub struct DefaultSubtitleManagerBuilder {
    fetcher: Option<Box<dyn SubtitleFetcher>>,
    parsers: Vec<Box<dyn Parser>>,
}

impl DefaultSubtitleManagerBuilder {
    /// Set the network collaborator which fetches the raw subtitle text.
    pub fn fetcher(mut self, fetcher: Box<dyn SubtitleFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Register the given parser for its subtitle type.
    /// This replaces the default parser of the same subtitle type.
    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Build the subtitle manager.
    ///
    /// # Panics
    ///
    /// Panics when no fetcher has been set.
    pub fn build(self) -> DefaultSubtitleManager {
        let fetcher = self
            .fetcher
            .expect("Fetcher has not been set for DefaultSubtitleManager");
        let mut parsers = HashMap::new();
        for parser in default_parsers().into_iter().chain(self.parsers) {
            parsers.insert(parser.subtitle_type(), parser);
        }

        DefaultSubtitleManager {
            inner: Arc::new(InnerSubtitleManager {
                fetcher,
                parsers,
                cache: Default::default(),
                in_flight: Default::default(),
            }),
        }
    }
}

struct InnerSubtitleManager {
    fetcher: Box<dyn SubtitleFetcher>,
    parsers: HashMap<SubtitleType, Box<dyn Parser>>,
    cache: Mutex<HashMap<String, Arc<NormalizedSubtitle>>>,
    in_flight: Mutex<HashMap<String, PendingSubtitle>>,
}

impl InnerSubtitleManager {
    async fn cached(&self, location: &str) -> Option<Arc<NormalizedSubtitle>> {
        self.cache.lock().await.get(location).cloned()
    }

    /// Fetch, normalize and store the subtitle of the given location.
    async fn load(&self, location: &str) -> Result<Arc<NormalizedSubtitle>> {
        let subtitle = self.normalize(location).await.map_err(|e| {
            error!("Failed to load subtitle {}, {}", location, e);
            e
        })?;
        let subtitle = Arc::new(subtitle);

        self.cache
            .lock()
            .await
            .insert(location.to_string(), subtitle.clone());
        info!("Cached subtitle {}", subtitle);
        Ok(subtitle)
    }

    async fn normalize(&self, location: &str) -> Result<NormalizedSubtitle> {
        let subtitle_type = detector::classify(location)?;
        let name = detector::display_name(location);
        let parser = self
            .parsers
            .get(&subtitle_type)
            .ok_or_else(|| SubtitleError::UnsupportedFormat(subtitle_type.to_string()))?;

        debug!("Fetching {} subtitle {} from {}", subtitle_type, name, location);
        let text = self
            .fetcher
            .fetch_text(location)
            .await
            .map_err(|reason| SubtitleError::FetchFailed {
                name: name.clone(),
                reason,
            })?;

        trace!("Normalizing {} subtitle {}", subtitle_type, name);
        let content = parser.normalize(text.as_str());
        if content.is_empty() || !content.contains(TIME_INDICATOR) {
            warn!("Subtitle {} doesn't contain any valid cue", name);
            return Err(SubtitleError::ParseFailed(name));
        }

        Ok(NormalizedSubtitle::new(
            content,
            name,
            subtitle_type,
            location.to_string(),
        ))
    }
}

impl Debug for InnerSubtitleManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InnerSubtitleManager")
            .field("fetcher", &self.fetcher)
            .field("parsers", &self.parsers)
            .finish()
    }
}

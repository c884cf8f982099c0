use log::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

use crate::api::{ApiResult, FeedApi};
use crate::cache::{Clock, TtlCache, MATCHES_KEY, MEMBER_STATS_KEY, NEWS_KEY, TOURNAMENTS_KEY};
use crate::model::logical::{Match, MemberStats, NewsItem, Tournament};
use crate::storage::Storage;

async fn read_through<T, S, C, F, Fut>(cache: &TtlCache<S, C>, key: &str, fetch: F) -> ApiResult<T>
where
    T: Serialize + DeserializeOwned,
    S: Storage,
    C: Clock,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    if let Some(hit) = cache.get_as::<T>(key) {
        debug!("Serving {} from cache", key);
        return Ok(hit);
    }
    let fresh = fetch().await?;
    if let Err(e) = cache.put(key, &fresh) {
        warn!("Could not cache {}: {:#}", key, e);
    }
    Ok(fresh)
}

pub async fn upcoming_tournaments<A, S, C>(api: &A, cache: &TtlCache<S, C>) -> ApiResult<Vec<Tournament>>
where
    A: FeedApi + ?Sized,
    S: Storage,
    C: Clock,
{
    read_through(cache, TOURNAMENTS_KEY, || api.upcoming_tournaments()).await
}

pub async fn matches<A, S, C>(api: &A, cache: &TtlCache<S, C>) -> ApiResult<Vec<Match>>
where
    A: FeedApi + ?Sized,
    S: Storage,
    C: Clock,
{
    read_through(cache, MATCHES_KEY, || api.matches()).await
}

pub async fn news<A, S, C>(api: &A, cache: &TtlCache<S, C>) -> ApiResult<Vec<NewsItem>>
where
    A: FeedApi + ?Sized,
    S: Storage,
    C: Clock,
{
    read_through(cache, NEWS_KEY, || api.news()).await
}

pub async fn member_stats<A, S, C>(api: &A, cache: &TtlCache<S, C>) -> ApiResult<MemberStats>
where
    A: FeedApi + ?Sized,
    S: Storage,
    C: Clock,
{
    read_through(cache, MEMBER_STATS_KEY, || api.member_stats()).await
}

pub mod types;

use async_graphql::{Context, Object, Result, Schema, Subscription};
use futures::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

use tubesignal_common::{keyword_key, TubeSignalError};
use tubesignal_engine::Engine;

use types::*;

pub type ApiSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

pub fn build_schema(engine: Engine) -> ApiSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(engine)
        .finish()
}

fn gql_err(e: TubeSignalError) -> async_graphql::Error {
    async_graphql::Error::new(e.to_string())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The raw fanned-out signal bundle for a keyword.
    async fn research_keyword(&self, ctx: &Context<'_>, keyword: String) -> Result<ResearchResult> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .research_keyword(&keyword)
            .await
            .map_err(gql_err)?
            .into())
    }

    /// The pre-warmed trending digest for a region.
    async fn get_trending_keywords(
        &self,
        ctx: &Context<'_>,
        #[graphql(default_with = "String::from(\"US\")")] region: String,
    ) -> Result<Vec<TrendingKeyword>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .trending_keywords(&region)
            .await
            .map_err(gql_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn get_trending_videos(
        &self,
        ctx: &Context<'_>,
        #[graphql(default_with = "String::from(\"US\")")] region: String,
    ) -> Result<Vec<TrendingVideo>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .trending_videos(&region)
            .await
            .map_err(gql_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn search_videos(&self, ctx: &Context<'_>, query: String) -> Result<SearchResults> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine.search_videos(&query).await.map_err(gql_err)?.into())
    }

    /// Full enrichment of one video: details, transcript, comments, channel.
    async fn get_video(&self, ctx: &Context<'_>, video_id: String) -> Result<EnrichedVideo> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine.get_video(&video_id).await.map_err(gql_err)?.into())
    }

    async fn get_channel(&self, ctx: &Context<'_>, channel_id: String) -> Result<Option<Channel>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .get_channel(&channel_id)
            .await
            .map_err(gql_err)?
            .map(Into::into))
    }

    async fn get_channel_videos(
        &self,
        ctx: &Context<'_>,
        channel_id: String,
    ) -> Result<Vec<Video>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .get_channel_videos(&channel_id)
            .await
            .map_err(gql_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn get_autocomplete(
        &self,
        ctx: &Context<'_>,
        keyword: String,
        provider: SuggestProvider,
    ) -> Result<Vec<String>> {
        let engine = ctx.data_unchecked::<Engine>();
        engine
            .get_autocomplete(&keyword, provider.into())
            .await
            .map_err(gql_err)
    }

    async fn get_transcript(
        &self,
        ctx: &Context<'_>,
        video_id: String,
    ) -> Result<Option<Transcript>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .get_transcript(&video_id)
            .await
            .map_err(gql_err)?
            .map(Into::into))
    }

    async fn get_comments(&self, ctx: &Context<'_>, video_id: String) -> Result<Vec<Comment>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .get_comments(&video_id)
            .await
            .map_err(gql_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn search_reddit(&self, ctx: &Context<'_>, query: String) -> Result<Vec<ForumPost>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .search_reddit(&query)
            .await
            .map_err(gql_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn get_trends(
        &self,
        ctx: &Context<'_>,
        keyword: String,
        region: Option<String>,
    ) -> Result<Option<TrendData>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .get_trends(&keyword, region.as_deref())
            .await
            .map_err(gql_err)?
            .map(Into::into))
    }

    async fn search_google_video(
        &self,
        ctx: &Context<'_>,
        query: String,
    ) -> Result<Vec<WebVideoResult>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .search_google_video(&query)
            .await
            .map_err(gql_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn get_keyword_metrics(
        &self,
        ctx: &Context<'_>,
        keyword: String,
    ) -> Result<Option<KeywordMetrics>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .get_keyword_metrics(&keyword)
            .await
            .map_err(gql_err)?
            .map(Into::into))
    }

    async fn get_keyword_ideas(
        &self,
        ctx: &Context<'_>,
        keyword: String,
        #[graphql(default = 25)] limit: u32,
    ) -> Result<Vec<KeywordMetrics>> {
        let engine = ctx.data_unchecked::<Engine>();
        Ok(engine
            .get_keyword_ideas(&keyword, limit)
            .await
            .map_err(gql_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Analyse a keyword and return the verdict. As a side effect, a
    /// streaming long-tail run starts in the background, publishing onto
    /// the keyword's topic for subscribers.
    async fn analyse_keyword(
        &self,
        ctx: &Context<'_>,
        keyword: String,
        #[graphql(default = 10)] max_long_tails: u32,
    ) -> Result<AnalysisResult> {
        let engine = ctx.data_unchecked::<Engine>();
        let analysis = engine.analyse_keyword(&keyword).await.map_err(gql_err)?;

        if let Err(e) = engine
            .spawn_long_tail_stream(&keyword, max_long_tails as usize)
            .await
        {
            warn!(keyword = keyword.as_str(), error = %e, "long-tail stream failed to start");
        }

        Ok(analysis.into())
    }

    /// Kick off the durable batched long-tail analysis; progress arrives on
    /// the keyword's subscription topic.
    async fn start_long_tail_analysis(
        &self,
        ctx: &Context<'_>,
        keyword: String,
        #[graphql(default = 10)] max: u32,
    ) -> Result<LongTailStartAck> {
        let engine = ctx.data_unchecked::<Engine>();
        engine
            .start_long_tail_analysis(&keyword, max as usize)
            .await
            .map_err(gql_err)?;
        Ok(LongTailStartAck {
            topic: keyword_key(&keyword),
            started: true,
        })
    }
}

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Long-tail progress for a parent keyword. Slow consumers may miss
    /// intermediate updates; each update carries the cumulative list.
    async fn on_long_tail_analysed(
        &self,
        ctx: &Context<'_>,
        parent_keyword: String,
    ) -> impl Stream<Item = LongTailUpdate> {
        let engine = ctx.data_unchecked::<Engine>();
        let receiver = engine.subscribe_long_tails(&parent_keyword);
        BroadcastStream::new(receiver).filter_map(|update| match update {
            Ok(update) => Some(update.into()),
            Err(lagged) => {
                warn!(error = %lagged, "subscriber lagged, dropping updates");
                None
            }
        })
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::warn;

use tubesignal_common::{EnrichedVideo, TubeSignalError, Video};
use tubesignal_runtime::{Actor, ActorFactory, ActorHost};

use crate::adapters::VideoApi;
use crate::hosts::{ChannelActor, ChannelMsg, CommentsHost, TranscriptHost};
use crate::source_actor::SourceMsg;

/// Comments attached to a fully enriched video.
const FULL_COMMENT_LIMIT: usize = 50;
/// Comments attached in the fast path used by research phase 2.
const FAST_COMMENT_LIMIT: usize = 20;

pub enum EnrichmentMsg {
    /// Details + transcript + top-50 comments, then best-effort channel.
    Full {
        reply: oneshot::Sender<Result<EnrichedVideo, TubeSignalError>>,
    },
    /// Details + top-20 comments + best-effort channel; no transcript.
    Fast {
        reply: oneshot::Sender<Result<EnrichedVideo, TubeSignalError>>,
    },
}

/// Keyed by video id. Videos are effectively immutable, so both results
/// cache for the lifetime of the actor.
pub struct EnrichmentActor {
    video_id: String,
    api: Arc<dyn VideoApi>,
    transcripts: TranscriptHost,
    comments: CommentsHost,
    channels: ActorHost<ChannelActor>,
    full: Option<EnrichedVideo>,
    fast: Option<EnrichedVideo>,
}

#[async_trait]
impl Actor for EnrichmentActor {
    type Msg = EnrichmentMsg;

    async fn handle(&mut self, msg: EnrichmentMsg) {
        match msg {
            EnrichmentMsg::Full { reply } => {
                if let Some(enriched) = &self.full {
                    let _ = reply.send(Ok(enriched.clone()));
                    return;
                }
                let result = self.enrich_full().await;
                if let Ok(enriched) = &result {
                    self.full = Some(enriched.clone());
                }
                let _ = reply.send(result);
            }
            EnrichmentMsg::Fast { reply } => {
                if let Some(enriched) = &self.fast {
                    let _ = reply.send(Ok(enriched.clone()));
                    return;
                }
                // A full enrichment already carries everything the fast
                // shape needs.
                if let Some(full) = &self.full {
                    let mut enriched = full.clone();
                    enriched.transcript = None;
                    enriched.comments.truncate(FAST_COMMENT_LIMIT);
                    self.fast = Some(enriched.clone());
                    let _ = reply.send(Ok(enriched));
                    return;
                }
                let result = self.enrich_fast().await;
                if let Ok(enriched) = &result {
                    self.fast = Some(enriched.clone());
                }
                let _ = reply.send(result);
            }
        }
    }
}

impl EnrichmentActor {
    async fn enrich_full(&self) -> Result<EnrichedVideo, TubeSignalError> {
        let (details, transcript, comments) = tokio::join!(
            self.api.video(&self.video_id),
            self.transcripts
                .call(&self.video_id, |reply| SourceMsg::Get { reply }),
            self.comments
                .call(&self.video_id, |reply| SourceMsg::Get { reply }),
        );

        let video = self.require_details(details)?;
        let mut comments = comments.unwrap_or_default();
        comments.truncate(FULL_COMMENT_LIMIT);

        Ok(EnrichedVideo {
            channel: self.best_effort_channel(&video).await,
            video,
            transcript: transcript.unwrap_or_default(),
            comments,
            ranking_signals: None,
        })
    }

    async fn enrich_fast(&self) -> Result<EnrichedVideo, TubeSignalError> {
        let (details, comments) = tokio::join!(
            self.api.video(&self.video_id),
            self.comments
                .call(&self.video_id, |reply| SourceMsg::Get { reply }),
        );

        let video = self.require_details(details)?;
        let mut comments = comments.unwrap_or_default();
        comments.truncate(FAST_COMMENT_LIMIT);

        Ok(EnrichedVideo {
            channel: self.best_effort_channel(&video).await,
            video,
            transcript: None,
            comments,
            ranking_signals: None,
        })
    }

    fn require_details(
        &self,
        details: anyhow::Result<Option<Video>>,
    ) -> Result<Video, TubeSignalError> {
        match details {
            Ok(Some(video)) => Ok(video),
            Ok(None) => Err(TubeSignalError::NotFound(format!(
                "video {}",
                self.video_id
            ))),
            Err(e) => {
                warn!(video_id = self.video_id.as_str(), error = %e, "Video details fetch failed");
                Err(TubeSignalError::NotFound(format!(
                    "video {}",
                    self.video_id
                )))
            }
        }
    }

    async fn best_effort_channel(
        &self,
        video: &Video,
    ) -> Option<tubesignal_common::Channel> {
        if video.channel_id.is_empty() {
            return None;
        }
        match self
            .channels
            .call(&video.channel_id, |reply| ChannelMsg::Details { reply })
            .await
        {
            Ok(channel) => channel,
            Err(e) => {
                warn!(video_id = self.video_id.as_str(), error = %e, "Channel lookup failed");
                None
            }
        }
    }
}

pub struct EnrichmentFactory {
    api: Arc<dyn VideoApi>,
    transcripts: TranscriptHost,
    comments: CommentsHost,
    channels: ActorHost<ChannelActor>,
}

impl EnrichmentFactory {
    pub fn new(
        api: Arc<dyn VideoApi>,
        transcripts: TranscriptHost,
        comments: CommentsHost,
        channels: ActorHost<ChannelActor>,
    ) -> Self {
        Self {
            api,
            transcripts,
            comments,
            channels,
        }
    }
}

#[async_trait]
impl ActorFactory<EnrichmentActor> for EnrichmentFactory {
    async fn activate(&self, key: &str) -> Result<EnrichmentActor, TubeSignalError> {
        Ok(EnrichmentActor {
            video_id: key.to_string(),
            api: self.api.clone(),
            transcripts: self.transcripts.clone(),
            comments: self.comments.clone(),
            channels: self.channels.clone(),
            full: None,
            fast: None,
        })
    }
}

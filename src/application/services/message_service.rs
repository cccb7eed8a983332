//! Message Service
//!
//! Message persistence, history pagination, and pinning. Messages are
//! immutable except for the pin flag, and every ordering decision uses
//! the database-assigned id, never timestamps.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ChannelMessage, MessageRepository, ProfileRepository, UserProfile};
use crate::shared::error::AppError;
use crate::shared::validation::require_nonempty_content;

/// Default history page size when the client sends no limit.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
/// Hard cap on a single history page.
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// A message joined with the sender's display identity.
#[derive(Debug, Clone)]
pub struct EnrichedMessage {
    pub message: ChannelMessage,
    pub sender: Option<UserProfile>,
}

/// One page of channel history, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub messages: Vec<EnrichedMessage>,
    /// Cursor for the next (older) page: the smallest id returned.
    pub next_before_id: Option<i64>,
    /// True when the page came back full. Off by one when the total
    /// count is an exact multiple of the page size; treated as a hint,
    /// not a guarantee.
    pub has_more: bool,
}

/// Message operations. Channel visibility is checked by the caller
/// through the access service before any of these run.
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Persist a message and return it enriched for broadcast.
    async fn create_message(
        &self,
        channel_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<EnrichedMessage, AppError>;

    /// Fetch a history page ending just before `before_id` (exclusive).
    async fn history(
        &self,
        channel_id: i64,
        before_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<HistoryPage, AppError>;

    /// Flip the pin flag on a message that belongs to the channel.
    async fn set_pinned(
        &self,
        channel_id: i64,
        message_id: i64,
        pinned: bool,
    ) -> Result<EnrichedMessage, AppError>;
}

/// MessageService implementation.
pub struct MessageServiceImpl<R, P>
where
    R: MessageRepository,
    P: ProfileRepository,
{
    message_repo: Arc<R>,
    profile_repo: Arc<P>,
}

impl<R, P> MessageServiceImpl<R, P>
where
    R: MessageRepository,
    P: ProfileRepository,
{
    pub fn new(message_repo: Arc<R>, profile_repo: Arc<P>) -> Self {
        Self {
            message_repo,
            profile_repo,
        }
    }

    async fn enrich(&self, message: ChannelMessage) -> Result<EnrichedMessage, AppError> {
        let sender = self.profile_repo.find_profile(message.sender_id).await?;
        Ok(EnrichedMessage { message, sender })
    }
}

#[async_trait]
impl<R, P> MessageService for MessageServiceImpl<R, P>
where
    R: MessageRepository + 'static,
    P: ProfileRepository + 'static,
{
    async fn create_message(
        &self,
        channel_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<EnrichedMessage, AppError> {
        let content = require_nonempty_content(content)?;
        let message = self
            .message_repo
            .insert(channel_id, sender_id, content)
            .await?;
        self.enrich(message).await
    }

    async fn history(
        &self,
        channel_id: i64,
        before_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<HistoryPage, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);

        // Newest-first from the store, re-sorted ascending for delivery.
        let mut rows = self
            .message_repo
            .find_page(channel_id, before_id, limit)
            .await?;
        let has_more = rows.len() as i64 == limit;
        rows.reverse();
        let next_before_id = rows.first().map(|m| m.id);

        let sender_ids: Vec<i64> = rows.iter().map(|m| m.sender_id).collect();
        let profiles: HashMap<i64, UserProfile> = self
            .profile_repo
            .find_profiles(&sender_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        let messages = rows
            .into_iter()
            .map(|message| {
                let sender = profiles.get(&message.sender_id).cloned();
                EnrichedMessage { message, sender }
            })
            .collect();

        Ok(HistoryPage {
            messages,
            next_before_id,
            has_more,
        })
    }

    async fn set_pinned(
        &self,
        channel_id: i64,
        message_id: i64,
        pinned: bool,
    ) -> Result<EnrichedMessage, AppError> {
        let message = self
            .message_repo
            .find_by_id(message_id)
            .await?
            .filter(|m| m.channel_id == channel_id)
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        let updated = self.message_repo.set_pinned(message.id, pinned).await?;
        self.enrich(updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessageRepository, MockProfileRepository, UserType};
    use chrono::Utc;

    fn message(id: i64, channel_id: i64) -> ChannelMessage {
        ChannelMessage {
            id,
            channel_id,
            sender_id: 42,
            content: format!("message {id}"),
            pinned: false,
            created_at: Utc::now(),
        }
    }

    fn profile_repo() -> MockProfileRepository {
        let mut repo = MockProfileRepository::new();
        repo.expect_find_profile().returning(|id| {
            Ok(Some(UserProfile {
                user_id: id,
                email: "creator@example.com".to_string(),
                user_type: UserType::Creator,
                display_name: Some("Creator".to_string()),
                avatar_url: None,
            }))
        });
        repo.expect_find_profiles().returning(|ids| {
            Ok(ids
                .iter()
                .map(|&id| UserProfile {
                    user_id: id,
                    email: "creator@example.com".to_string(),
                    user_type: UserType::Creator,
                    display_name: Some("Creator".to_string()),
                    avatar_url: None,
                })
                .collect())
        });
        repo
    }

    #[tokio::test]
    async fn create_message_rejects_whitespace_content() {
        let mut message_repo = MockMessageRepository::new();
        message_repo.expect_insert().never();

        let svc = MessageServiceImpl::new(Arc::new(message_repo), Arc::new(profile_repo()));

        let err = svc.create_message(7, 42, "   \n\t ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_message_trims_before_persisting() {
        let mut message_repo = MockMessageRepository::new();
        message_repo
            .expect_insert()
            .withf(|_, _, content| content == "hello")
            .returning(|channel_id, sender_id, content| {
                Ok(ChannelMessage {
                    id: 1,
                    channel_id,
                    sender_id,
                    content: content.to_string(),
                    pinned: false,
                    created_at: Utc::now(),
                })
            });

        let svc = MessageServiceImpl::new(Arc::new(message_repo), Arc::new(profile_repo()));

        let enriched = svc.create_message(7, 42, "  hello  ").await.unwrap();
        assert_eq!(enriched.message.content, "hello");
        assert!(enriched.sender.is_some());
    }

    #[tokio::test]
    async fn history_clamps_limit_and_reports_cursor() {
        let mut message_repo = MockMessageRepository::new();
        message_repo
            .expect_find_page()
            .withf(|_, before, limit| *before == Some(500) && *limit == MAX_HISTORY_LIMIT)
            .returning(|channel_id, _, limit| {
                // A full page, newest first.
                Ok((0..limit).map(|i| message(499 - i, channel_id)).collect())
            });

        let svc = MessageServiceImpl::new(Arc::new(message_repo), Arc::new(profile_repo()));

        let page = svc.history(7, Some(500), Some(9999)).await.unwrap();
        assert!(page.has_more);
        assert_eq!(page.next_before_id, Some(300));
        // Ascending delivery order.
        assert_eq!(page.messages.first().unwrap().message.id, 300);
        assert_eq!(page.messages.last().unwrap().message.id, 499);
    }

    #[tokio::test]
    async fn history_defaults_limit_and_handles_short_page() {
        let mut message_repo = MockMessageRepository::new();
        message_repo
            .expect_find_page()
            .withf(|_, before, limit| before.is_none() && *limit == DEFAULT_HISTORY_LIMIT)
            .returning(|channel_id, _, _| Ok(vec![message(3, channel_id), message(2, channel_id)]));

        let svc = MessageServiceImpl::new(Arc::new(message_repo), Arc::new(profile_repo()));

        let page = svc.history(7, None, None).await.unwrap();
        assert!(!page.has_more);
        assert_eq!(page.next_before_id, Some(2));
    }

    #[tokio::test]
    async fn pin_rejects_message_from_other_channel() {
        let mut message_repo = MockMessageRepository::new();
        message_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(message(id, 8))));
        message_repo.expect_set_pinned().never();

        let svc = MessageServiceImpl::new(Arc::new(message_repo), Arc::new(profile_repo()));

        let err = svc.set_pinned(7, 100, true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

//! # Matrix Service Adapter
//!
//! Implements `ChatProvider` and `Presence` for one Matrix room using `matrix_sdk`.
//! Items and reaction summaries are posted as markdown; the typing indicator
//! shows while the poll loop is working.

use crate::domain::config::MatrixConfig;
use crate::domain::traits::{ChatProvider, Presence};
use anyhow::{Context, Result};
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::RoomId;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }

    /// Logs in and joins the configured room.
    pub async fn connect(config: &MatrixConfig) -> Result<Self> {
        let client = Client::builder()
            .homeserver_url(&config.homeserver)
            .build()
            .await
            .with_context(|| format!("Failed to reach homeserver {}", config.homeserver))?;

        client
            .matrix_auth()
            .login_username(&config.username, &config.password)
            .send()
            .await
            .with_context(|| format!("Failed to log in as {}", config.username))?;

        tracing::info!("Logged in as {}", config.username);

        let room_id = <&RoomId>::try_from(config.room.as_str())
            .with_context(|| format!("Invalid room id {}", config.room))?;
        let room = client
            .join_room_by_id(room_id)
            .await
            .with_context(|| format!("Failed to join {}", config.room))?;

        Ok(Self::new(room))
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::debug!("Sending message to {}", self.room_id());
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.room
            .send(RoomMessageEventContent::notice_markdown(content))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Presence for MatrixService {
    async fn set_active(&self) -> Result<(), String> {
        self.room.typing_notice(true).await.map_err(|e| e.to_string())
    }

    async fn clear_active(&self) -> Result<(), String> {
        self.room.typing_notice(false).await.map_err(|e| e.to_string())
    }
}

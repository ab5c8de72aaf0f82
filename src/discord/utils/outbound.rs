// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use miette::Diagnostic;
use std::fmt;
use twilight_http::client::Client;
use twilight_http::error::Error;
use twilight_http::response::DeserializeBodyError;
use twilight_model::channel::message::Embed;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

/// Error data for a request made to a ticket channel
#[derive(Debug, Diagnostic)]
pub enum OutboundError {
	Http(Error),
	Deserialize(DeserializeBodyError),
}

impl From<Error> for OutboundError {
	fn from(error: Error) -> Self {
		Self::Http(error)
	}
}

impl From<DeserializeBodyError> for OutboundError {
	fn from(error: DeserializeBodyError) -> Self {
		Self::Deserialize(error)
	}
}

impl std::error::Error for OutboundError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Http(error) => Some(error),
			Self::Deserialize(error) => Some(error),
		}
	}
}

impl fmt::Display for OutboundError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Http(error) => write!(f, "HTTP error: {}", error),
			Self::Deserialize(error) => write!(f, "deserialization error: {}", error),
		}
	}
}

/// The requests countdowns make against a ticket channel after the interaction that started them is over
#[async_trait]
pub trait TicketChannelOps: Send + Sync {
	async fn send_embed(&self, channel_id: Id<ChannelMarker>, embed: Embed) -> Result<Id<MessageMarker>, OutboundError>;

	async fn edit_embed(
		&self,
		channel_id: Id<ChannelMarker>,
		message_id: Id<MessageMarker>,
		embed: Embed,
	) -> Result<(), OutboundError>;

	async fn remove_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), OutboundError>;
}

#[async_trait]
impl TicketChannelOps for Client {
	async fn send_embed(&self, channel_id: Id<ChannelMarker>, embed: Embed) -> Result<Id<MessageMarker>, OutboundError> {
		let embeds = [embed];
		let message = self.create_message(channel_id).embeds(&embeds).await?.model().await?;
		Ok(message.id)
	}

	async fn edit_embed(
		&self,
		channel_id: Id<ChannelMarker>,
		message_id: Id<MessageMarker>,
		embed: Embed,
	) -> Result<(), OutboundError> {
		let embeds = [embed];
		self.update_message(channel_id, message_id)
			.embeds(Some(&embeds))
			.await?;
		Ok(())
	}

	async fn remove_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), OutboundError> {
		self.delete_channel(channel_id).await?;
		Ok(())
	}
}

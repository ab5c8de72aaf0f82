// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::embeds::UNKNOWN_OWNER;
use super::outbound::OutboundError;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

/// Gets the mention text for a ticket owner, falling back to a placeholder if the owner is no longer a guild member.
pub async fn owner_mention(http_client: &Client, guild_id: Id<GuildMarker>, owner: Id<UserMarker>) -> String {
	match get_member_id(http_client, guild_id, owner).await {
		Ok(user_id) => user_id.mention().to_string(),
		Err(error) => {
			tracing::debug!(source = ?error, %owner, "couldn't look up ticket owner");
			String::from(UNKNOWN_OWNER)
		}
	}
}

async fn get_member_id(
	http_client: &Client,
	guild_id: Id<GuildMarker>,
	user_id: Id<UserMarker>,
) -> Result<Id<UserMarker>, OutboundError> {
	let member_response = http_client.guild_member(guild_id, user_id).await?;
	let member = member_response.model().await?;
	Ok(member.user.id)
}

// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::BotState;
use crate::discord::state::tickets::TicketKind;
use crate::discord::utils::timestamp::datetime_from_id;
use chrono::Utc;
use tokio::sync::RwLock;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_model::channel::ChannelType;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

/// A ticket channel found in a guild's channel list
#[derive(Debug, Eq, PartialEq)]
struct FoundTicket {
	kind: TicketKind,
	number: u64,
	owner: Id<UserMarker>,
}

/// Reads a ticket from a channel's name and topic. Ticket channels carry their owner's ID as the topic.
fn parse_ticket_channel(name: &str, topic: Option<&str>) -> Option<FoundTicket> {
	let (kind, number) = TicketKind::from_channel_name(name)?;
	let owner = topic?.trim().parse().ok().and_then(Id::new_checked)?;
	Some(FoundTicket { kind, number, owner })
}

/// Registers the ticket channels of a guild that just became available, so that tickets opened before a restart can
/// still be claimed and closed.
pub async fn recover_tickets(guild_id: Id<GuildMarker>, cache: &DefaultInMemoryCache, bot_state: &RwLock<BotState>) {
	let channel_ids: Vec<Id<ChannelMarker>> = match cache.guild_channels(guild_id) {
		Some(channel_ids) => channel_ids.iter().copied().collect(),
		None => return,
	};

	let mut found_tickets = Vec::new();
	for channel_id in channel_ids {
		let Some(channel) = cache.channel(channel_id) else {
			continue;
		};
		if channel.kind != ChannelType::GuildText {
			continue;
		}
		let Some(name) = channel.name.as_deref() else {
			continue;
		};
		if let Some(found) = parse_ticket_channel(name, channel.topic.as_deref()) {
			found_tickets.push((channel_id, found));
		}
	}

	if found_tickets.is_empty() {
		return;
	}

	let mut state = bot_state.write().await;
	let mut recovered = 0;
	for (channel_id, found) in found_tickets {
		let created_at = datetime_from_id(channel_id).unwrap_or_else(Utc::now);
		if state
			.tickets
			.restore(found.kind, found.number, found.owner, channel_id, created_at)
		{
			recovered += 1;
		}
	}
	tracing::info!(%guild_id, recovered, open = state.tickets.open_count(), "recovered open tickets");
}

/// Forgets everything tied to a deleted channel and stops its timers.
pub async fn forget_channel(channel_id: Id<ChannelMarker>, bot_state: &RwLock<BotState>) {
	let mut state = bot_state.write().await;
	if let Some(mut ticket) = state.tickets.remove(channel_id) {
		ticket.cancel_countdown();
		tracing::info!(%channel_id, number = ticket.number, "ticket channel deleted");
	}
	state.faq_sessions.cancel(channel_id);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::TicketConfig;

	#[test]
	fn ticket_channels_are_recognized() {
		assert_eq!(
			parse_ticket_channel("ticket-8830-🛒", Some("1234")),
			Some(FoundTicket {
				kind: TicketKind::Purchase,
				number: 8830,
				owner: Id::new(1234),
			})
		);
		assert_eq!(
			parse_ticket_channel("support-3-❓", Some(" 99 ")).map(|found| found.kind),
			Some(TicketKind::Support)
		);
	}

	#[test]
	fn channels_without_owner_are_skipped() {
		assert_eq!(parse_ticket_channel("ticket-8830-🛒", None), None);
		assert_eq!(parse_ticket_channel("ticket-8830-🛒", Some("not an id")), None);
		assert_eq!(parse_ticket_channel("ticket-8830-🛒", Some("0")), None);
		assert_eq!(parse_ticket_channel("general", Some("1234")), None);
	}

	#[tokio::test]
	async fn deleted_channels_are_forgotten() {
		let bot_state = RwLock::new(BotState::new(&TicketConfig::default()));
		let channel_id = Id::new(50);
		{
			let mut state = bot_state.write().await;
			assert!(state.tickets.restore(TicketKind::Purchase, 8829, Id::new(7), channel_id, Utc::now()));
		}
		forget_channel(channel_id, &bot_state).await;
		let state = bot_state.read().await;
		assert!(state.tickets.get(channel_id).is_none());
		assert_eq!(state.tickets.open_ticket_for(Id::new(7)), None);
	}
}

// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::discord::state::BotState;
use crate::discord::state::tickets::{CreateRejection, TicketKind, TicketReservation};
use crate::discord::utils::embeds::{faq_menu_embed, purchase_intro_embed, support_intro_embed, ticket_created_embed};
use crate::discord::utils::permissions::{handler_mention, handler_role, is_premium, ticket_channel_overwrites};
use crate::discord::utils::responses::{CREATION_FAILED, CREATION_IN_PROGRESS, already_open_message, ephemeral_message};
use crate::discord::utils::shared_components::{go_to_ticket_button, support_faq_select, ticket_action_buttons};
use crate::discord::utils::timestamp::{datetime_from_id, timestamp_from_id};
use chrono::Utc;
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::channel::{Channel, ChannelType};
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_util::builder::InteractionResponseDataBuilder;

pub async fn handle_create_ticket(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigData,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Create Ticket button used outside of a guild");
	};
	let Some(interaction_member) = &interaction.member else {
		bail!("Interaction isn't from a user");
	};
	let Some(requester) = interaction.author_id() else {
		bail!("Interaction member is not a user");
	};

	let kind = if is_premium(&config.roles, &interaction_member.roles) {
		TicketKind::Support
	} else {
		TicketKind::Purchase
	};

	let interaction_client = http_client.interaction(application_id);

	let reservation = bot_state.write().await.tickets.begin_creation(requester, kind);
	let reservation = match reservation {
		Ok(reservation) => reservation,
		Err(rejection) => {
			let content = match rejection {
				CreateRejection::AlreadyOpen(channel_id) => already_open_message(channel_id.mention()),
				CreateRejection::CreationInProgress => String::from(CREATION_IN_PROGRESS),
			};
			interaction_client
				.create_response(interaction.id, &interaction.token, &ephemeral_message(content))
				.await
				.into_diagnostic()?;
			return Ok(());
		}
	};
	let number = reservation.number;

	let channel = match create_ticket_channel(http_client, guild_id, config, &reservation).await {
		Ok(channel) => channel,
		Err(error) => {
			bot_state.write().await.tickets.abandon_creation(reservation);
			tracing::error!(source = ?error, %requester, "failed to create ticket channel");
			interaction_client
				.create_response(interaction.id, &interaction.token, &ephemeral_message(CREATION_FAILED))
				.await
				.into_diagnostic()?;
			return Ok(());
		}
	};
	let channel_id = channel.id;

	{
		let created_at = datetime_from_id(channel_id).unwrap_or_else(Utc::now);
		let mut state = bot_state.write().await;
		state.tickets.finish_creation(reservation, channel_id, created_at);
	}
	tracing::info!(%channel_id, %requester, number, %kind, "ticket created");

	let timestamp = timestamp_from_id(interaction.id).ok();
	let response = InteractionResponseDataBuilder::new()
		.embeds([ticket_created_embed(&config.appearance, channel_id, timestamp)])
		.components([go_to_ticket_button(guild_id, channel_id)])
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	let intro_embed = match kind {
		TicketKind::Purchase => purchase_intro_embed(
			&config.appearance,
			&config.purchase,
			number,
			requester,
			&handler_mention(&config.roles, kind),
			timestamp,
		),
		TicketKind::Support => support_intro_embed(&config.appearance, number, requester, timestamp),
	};
	let intro_components = [ticket_action_buttons()];
	http_client
		.create_message(channel_id)
		.embeds(&[intro_embed])
		.components(&intro_components)
		.await
		.into_diagnostic()?;

	if kind == TicketKind::Support {
		let faq_items = bot_state.read().await.faq.list().to_vec();
		let menu_embed = faq_menu_embed(&config.appearance, !faq_items.is_empty());
		let menu_components = [support_faq_select(&faq_items)];
		http_client
			.create_message(channel_id)
			.embeds(&[menu_embed])
			.components(&menu_components)
			.await
			.into_diagnostic()?;
	}

	Ok(())
}

async fn create_ticket_channel(
	http_client: &Client,
	guild_id: Id<GuildMarker>,
	config: &ConfigData,
	reservation: &TicketReservation,
) -> miette::Result<Channel> {
	let channel_name = reservation.channel_name();
	let topic = reservation.owner.to_string();
	let overwrites = ticket_channel_overwrites(
		guild_id,
		reservation.owner,
		handler_role(&config.roles, reservation.kind),
	);

	let mut request = http_client
		.create_guild_channel(guild_id, &channel_name)
		.kind(ChannelType::GuildText)
		.topic(&topic)
		.permission_overwrites(&overwrites);
	if let Some(category) = config.tickets.category {
		request = request.parent_id(category);
	}
	let channel = request.await.into_diagnostic()?.model().await.into_diagnostic()?;
	Ok(channel)
}

// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::discord::countdown::{CLOSE_COUNTDOWN_SECONDS, start_claim_countdown, start_closing_countdown};
use crate::discord::state::BotState;
use crate::discord::state::tickets::TicketKind;
use crate::discord::utils::embeds::{claimed_embed, closed_embed, closing_embed, done_countdown_embed};
use crate::discord::utils::permissions::can_handle;
use crate::discord::utils::responses::{NO_HANDLE_PERMISSION, NOT_A_TICKET, TICKET_CLOSING, ephemeral_message};
use crate::discord::utils::timestamp::{current_timestamp, timestamp_from_id};
use crate::discord::utils::users::owner_mention;
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, ChannelMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;

/// A ticket action that passed the channel and role checks
struct CheckedAction {
	channel_id: Id<ChannelMarker>,
	kind: TicketKind,
	owner: Id<UserMarker>,
	actor: Id<UserMarker>,
}

/// Checks that an interaction happened in a ticket channel and that its user may handle the ticket. Responds to the
/// interaction and returns `None` if not.
async fn check_ticket_action(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigData,
	bot_state: &RwLock<BotState>,
) -> miette::Result<Option<CheckedAction>> {
	let Some(channel) = interaction.channel.as_ref() else {
		bail!("Ticket action used without a channel");
	};
	let Some(interaction_member) = &interaction.member else {
		bail!("Interaction isn't from a user");
	};
	let Some(actor) = interaction.author_id() else {
		bail!("Interaction member is not a user");
	};
	let interaction_client = http_client.interaction(application_id);

	let ticket = bot_state
		.read()
		.await
		.tickets
		.get(channel.id)
		.map(|ticket| (ticket.kind, ticket.owner, ticket.is_closing()));
	let Some((kind, owner, closing)) = ticket else {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NOT_A_TICKET))
			.await
			.into_diagnostic()?;
		return Ok(None);
	};

	if !can_handle(&config.roles, kind, &interaction_member.roles) {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_HANDLE_PERMISSION))
			.await
			.into_diagnostic()?;
		return Ok(None);
	}
	if closing {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(TICKET_CLOSING))
			.await
			.into_diagnostic()?;
		return Ok(None);
	}

	Ok(Some(CheckedAction {
		channel_id: channel.id,
		kind,
		owner,
		actor,
	}))
}

pub async fn handle_claim(
	interaction: &InteractionCreate,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &Arc<ConfigData>,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Claim button used outside of a guild");
	};
	let Some(action) = check_ticket_action(interaction, http_client, application_id, config, &bot_state).await? else {
		return Ok(());
	};
	let channel_id = action.channel_id;
	let interaction_client = http_client.interaction(application_id);

	let claimed = bot_state.write().await.tickets.claim(channel_id).is_some();
	if !claimed {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NOT_A_TICKET))
			.await
			.into_diagnostic()?;
		return Ok(());
	}
	tracing::info!(%channel_id, claimed_by = %action.actor, "ticket claimed");

	let owner_mention = owner_mention(http_client, guild_id, action.owner).await;
	let timestamp = timestamp_from_id(interaction.id).ok();
	let embed = claimed_embed(&config.appearance, action.kind, action.actor, &owner_mention, timestamp);
	http_client
		.create_message(channel_id)
		.embeds(&[embed])
		.await
		.into_diagnostic()?;

	interaction_client
		.create_response(
			interaction.id,
			&interaction.token,
			&ephemeral_message("✅ You have claimed this ticket."),
		)
		.await
		.into_diagnostic()?;

	let countdown_config = Arc::clone(config);
	let done_embed = move |remaining| {
		done_countdown_embed(
			&countdown_config.appearance,
			&countdown_config.purchase,
			&owner_mention,
			remaining,
			current_timestamp(),
		)
	};
	let closed = closed_embed(&config.appearance, current_timestamp());
	let auto_close = start_claim_countdown(
		bot_state,
		Arc::clone(http_client),
		channel_id,
		action.kind,
		done_embed,
		closed,
	)
	.await;
	if auto_close {
		tracing::debug!(%channel_id, "purchase ticket will close automatically");
	}

	Ok(())
}

pub async fn handle_close(
	interaction: &InteractionCreate,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &Arc<ConfigData>,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	let Some(action) = check_ticket_action(interaction, http_client, application_id, config, &bot_state).await? else {
		return Ok(());
	};
	let channel_id = action.channel_id;
	let interaction_client = http_client.interaction(application_id);

	tracing::info!(%channel_id, closed_by = %action.actor, "ticket closing");

	let timestamp = timestamp_from_id(interaction.id).ok();
	let response = InteractionResponseDataBuilder::new()
		.embeds([closing_embed(&config.appearance, CLOSE_COUNTDOWN_SECONDS, timestamp)])
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	let response_message = interaction_client
		.response(&interaction.token)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;
	let message_id = response_message.id;

	let countdown_config = Arc::clone(config);
	let closing = move |remaining| closing_embed(&countdown_config.appearance, remaining, current_timestamp());
	start_closing_countdown(bot_state, Arc::clone(http_client), channel_id, message_id, closing).await;

	Ok(())
}

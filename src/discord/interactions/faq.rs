// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::discord::countdown::{FAQ_SESSION_SECONDS, start_faq_session};
use crate::discord::state::BotState;
use crate::discord::state::tickets::TicketKind;
use crate::discord::utils::embeds::faq_answer_embed;
use crate::discord::utils::permissions::{follow_up_role, is_administrator};
use crate::discord::utils::responses::{
	FAQ_NOT_FOUND, FAQ_UNDISPLAYABLE, NO_ADMIN_PERMISSION, NOT_A_SUPPORT_TICKET, ephemeral_message,
};
use crate::discord::utils::shared_components::FAQ_OTHER_VALUE;
use crate::discord::utils::timestamp::{current_timestamp, timestamp_from_id};
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;

pub async fn handle_answer(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &Arc<ConfigData>,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	let Some(channel) = interaction.channel.as_ref() else {
		bail!("FAQ menu used without a channel");
	};
	let channel_id = channel.id;
	let Some(selected) = interaction_data.values.first() else {
		bail!("FAQ menu submitted without a selection");
	};
	let interaction_client = http_client.interaction(application_id);

	let (in_support_ticket, item) = {
		let state = bot_state.read().await;
		let in_support_ticket = state
			.tickets
			.get(channel_id)
			.is_some_and(|ticket| ticket.kind == TicketKind::Support);
		(in_support_ticket, state.faq.get(selected).cloned())
	};
	if !in_support_ticket {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NOT_A_SUPPORT_TICKET))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	if selected == FAQ_OTHER_VALUE {
		let mut allowed_mentions = AllowedMentions::default();
		let team_mention = match follow_up_role(&config.roles) {
			Some(role) => {
				allowed_mentions.roles.push(role);
				role.mention().to_string()
			}
			None => String::from("Staff"),
		};
		let response = InteractionResponseDataBuilder::new()
			.content(format!(
				"📢 {}, a member needs help with a question that isn't in the FAQ.",
				team_mention
			))
			.allowed_mentions(allowed_mentions)
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::ChannelMessageWithSource,
			data: Some(response),
		};
		interaction_client
			.create_response(interaction.id, &interaction.token, &response)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let Some(item) = item else {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(FAQ_NOT_FOUND))
			.await
			.into_diagnostic()?;
		return Ok(());
	};

	let first_embed = match faq_answer_embed(
		&config.appearance,
		&item,
		FAQ_SESSION_SECONDS,
		timestamp_from_id(interaction.id).ok(),
	) {
		Ok(embed) => embed,
		Err(error) => {
			tracing::warn!(source = ?error, faq_id = %item.id, "FAQ answer doesn't fit in an embed");
			interaction_client
				.create_response(interaction.id, &interaction.token, &ephemeral_message(FAQ_UNDISPLAYABLE))
				.await
				.into_diagnostic()?;
			return Ok(());
		}
	};
	let response = InteractionResponseDataBuilder::new()
		.embeds([first_embed.clone()])
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

	let config = Arc::clone(config);
	let answer_embed = move |remaining| {
		match faq_answer_embed(&config.appearance, &item, remaining, current_timestamp()) {
			Ok(embed) => embed,
			Err(_) => first_embed.clone(),
		}
	};
	start_faq_session(
		bot_state,
		Arc::clone(http_client),
		channel_id,
		response_message.id,
		answer_embed,
	)
	.await;

	Ok(())
}

pub async fn handle_remove(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	let interaction_client = http_client.interaction(application_id);

	let member_permissions = interaction.member.as_ref().and_then(|member| member.permissions);
	if !is_administrator(member_permissions) {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_ADMIN_PERMISSION))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let Some(selected) = interaction_data.values.first() else {
		bail!("FAQ remove menu submitted without a selection");
	};
	let removed = bot_state.write().await.faq.remove(selected);

	let content = match removed {
		Some(item) => {
			tracing::info!(faq_id = %item.id, "FAQ entry removed");
			format!("✅ FAQ entry `#{}` ({}) has been removed.", item.id, item.question)
		}
		None => String::from(FAQ_NOT_FOUND),
	};
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.components(Vec::new())
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::UpdateMessage,
		data: Some(response),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

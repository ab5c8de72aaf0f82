// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::discord::utils::embeds::panel_embed;
use crate::discord::utils::permissions::is_administrator;
use crate::discord::utils::responses::{NO_ADMIN_PERMISSION, ephemeral_message};
use crate::discord::utils::shared_components::new_ticket_button;
use crate::discord::utils::timestamp::timestamp_from_id;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::CommandBuilder;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"setup",
		"Post the ticket panel in this channel",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::ADMINISTRATOR)
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigData,
) -> miette::Result<()> {
	let Some(channel) = interaction.channel.as_ref() else {
		bail!("Setup command was used without a channel");
	};
	let interaction_client = http_client.interaction(application_id);

	let member_permissions = interaction.member.as_ref().and_then(|member| member.permissions);
	if !is_administrator(member_permissions) {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_ADMIN_PERMISSION))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let embeds = vec![panel_embed(&config.appearance, timestamp_from_id(interaction.id).ok())];
	let components = vec![new_ticket_button()];
	http_client
		.create_message(channel.id)
		.embeds(&embeds)
		.components(&components)
		.await
		.into_diagnostic()?;

	interaction_client
		.create_response(
			interaction.id,
			&interaction.token,
			&ephemeral_message("✅ The ticket panel has been posted."),
		)
		.await
		.into_diagnostic()?;

	tracing::info!(channel_id = %channel.id, "ticket panel posted");
	Ok(())
}

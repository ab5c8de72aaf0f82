// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::discord::state::BotState;
use crate::discord::utils::embeds::faq_list_embed;
use crate::discord::utils::permissions::is_administrator;
use crate::discord::utils::responses::{FAQ_EMPTY, FAQ_UNDISPLAYABLE, NO_ADMIN_PERMISSION, ephemeral_message};
use crate::discord::utils::shared_components::faq_remove_select;
use crate::discord::utils::timestamp::timestamp_from_id;
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{
	CommandData, CommandDataOption, CommandOptionValue,
};
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, StringBuilder, SubCommandBuilder};

pub fn command_definition() -> Command {
	let question = StringBuilder::new("question", "The question as shown in the FAQ menu")
		.required(true)
		.build();
	let answer = StringBuilder::new("answer", "The answer shown when the question is picked")
		.required(true)
		.build();

	let set = SubCommandBuilder::new("set", "Adds a question to the FAQ").option(question).option(answer);
	let list = SubCommandBuilder::new("list", "Lists the FAQ questions");
	let remove = SubCommandBuilder::new("remove", "Removes a question from the FAQ");

	CommandBuilder::new("faq", "Manage the support FAQ", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::ADMINISTRATOR)
		.option(set)
		.option(list)
		.option(remove)
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigData,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	let Some(subcommand_data) = command_data.options.first() else {
		bail!("FAQ command invoked with no subcommand");
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

	let response = match subcommand_data.name.as_str() {
		"set" => {
			let CommandOptionValue::SubCommand(options) = &subcommand_data.value else {
				bail!("FAQ set subcommand didn't carry subcommand options");
			};
			let Some(question) = string_option(options, "question") else {
				bail!("FAQ set subcommand received without required option question");
			};
			let Some(answer) = string_option(options, "answer") else {
				bail!("FAQ set subcommand received without required option answer");
			};

			let id = {
				let mut state = bot_state.write().await;
				state.faq.add(question, answer).id.clone()
			};
			tracing::info!(faq_id = %id, "FAQ entry added");
			ephemeral_message(format!("✅ FAQ entry `#{}` has been added.", id))
		}
		"list" => {
			let items = bot_state.read().await.faq.list().to_vec();
			if items.is_empty() {
				ephemeral_message(FAQ_EMPTY)
			} else {
				match faq_list_embed(&config.appearance, &items, timestamp_from_id(interaction.id).ok()) {
					Ok(embed) => {
						let response = InteractionResponseDataBuilder::new()
							.embeds([embed])
							.flags(MessageFlags::EPHEMERAL)
							.build();
						InteractionResponse {
							kind: InteractionResponseType::ChannelMessageWithSource,
							data: Some(response),
						}
					}
					Err(error) => {
						tracing::warn!(source = ?error, "FAQ list doesn't fit in an embed");
						ephemeral_message(FAQ_UNDISPLAYABLE)
					}
				}
			}
		}
		"remove" => {
			let items = bot_state.read().await.faq.list().to_vec();
			if items.is_empty() {
				ephemeral_message(FAQ_EMPTY)
			} else {
				let response = InteractionResponseDataBuilder::new()
					.content("Pick the FAQ entry to remove:")
					.components([faq_remove_select(&items)])
					.flags(MessageFlags::EPHEMERAL)
					.build();
				InteractionResponse {
					kind: InteractionResponseType::ChannelMessageWithSource,
					data: Some(response),
				}
			}
		}
		_ => bail!("Unknown FAQ subcommand encountered: {}", subcommand_data.name),
	};

	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

fn string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
	options.iter().find(|option| option.name == name).and_then(|option| match &option.value {
		CommandOptionValue::String(value) => Some(value.clone()),
		_ => None,
	})
}

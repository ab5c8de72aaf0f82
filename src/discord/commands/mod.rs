// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::discord::state::BotState;
use miette::bail;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

mod faq;
mod setup;

pub fn command_definitions() -> Vec<Command> {
	vec![faq::command_definition(), setup::command_definition()]
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigData,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	match command_data.name.as_str() {
		"faq" => faq::handle_command(interaction, command_data, http_client, application_id, config, bot_state).await,
		"setup" => setup::handle_command(interaction, http_client, application_id, config).await,
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn commands_are_registered_with_distinct_names() {
		let definitions = command_definitions();
		let names: Vec<&str> = definitions.iter().map(|command| command.name.as_str()).collect();
		assert_eq!(names, vec!["faq", "setup"]);
	}
}

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
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

mod create_ticket;
mod faq;
mod ticket_actions;

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &Arc<ConfigData>,
	bot_state: Arc<RwLock<BotState>>,
) -> miette::Result<()> {
	let custom_id_path: Vec<String> = interaction_data.custom_id.split('/').map(|s| s.to_string()).collect();

	match (
		custom_id_path.first().map(|s| s.as_str()),
		custom_id_path.get(1).map(|s| s.as_str()),
	) {
		(Some("ticket"), Some("create")) => {
			create_ticket::handle_create_ticket(interaction, http_client, application_id, config, bot_state).await
		}
		(Some("ticket"), Some("claim")) => {
			ticket_actions::handle_claim(interaction, http_client, application_id, config, bot_state).await
		}
		(Some("ticket"), Some("close")) => {
			ticket_actions::handle_close(interaction, http_client, application_id, config, bot_state).await
		}
		(Some("faq"), Some("answer")) => {
			faq::handle_answer(
				interaction,
				interaction_data,
				http_client,
				application_id,
				config,
				bot_state,
			)
			.await
		}
		(Some("faq"), Some("remove")) => {
			faq::handle_remove(interaction, interaction_data, http_client, application_id, bot_state).await
		}
		_ => bail!(
			"Unexpected interaction encountered: {}\n{:?}",
			interaction_data.custom_id,
			interaction_data
		),
	}
}

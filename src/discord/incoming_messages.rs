// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::BotState;
use super::state::tickets::TicketKind;
use super::utils::embeds::{done_tutorial_embed, queue_embed};
use super::utils::permissions::can_mark_done;
use super::utils::responses::DONE_NOT_ALLOWED;
use super::utils::timestamp::timestamp_from_id;
use crate::config::ConfigData;
use miette::IntoDiagnostic;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_model::channel::message::Message;

const DONE_COMMAND: &str = ".done";
const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".webp", ".gif"];

pub async fn handle_message(
	message: &Message,
	http_client: &Client,
	config: &ConfigData,
	bot_state: &RwLock<BotState>,
) -> miette::Result<()> {
	if message.author.bot || message.guild_id.is_none() {
		return Ok(());
	}
	let channel_id = message.channel_id;

	let ticket = bot_state
		.read()
		.await
		.tickets
		.get(channel_id)
		.map(|ticket| (ticket.kind, ticket.claimed));
	let Some((TicketKind::Purchase, claimed)) = ticket else {
		return Ok(());
	};

	if is_done_command(&message.content) {
		let member_roles = message.member.as_ref().map(|member| member.roles.as_slice()).unwrap_or_default();
		if !can_mark_done(&config.roles, member_roles) {
			http_client
				.create_message(channel_id)
				.content(DONE_NOT_ALLOWED)
				.reply(message.id)
				.await
				.into_diagnostic()?;
			return Ok(());
		}

		bot_state.write().await.tickets.claim(channel_id);
		tracing::info!(%channel_id, done_by = %message.author.id, "ticket marked done");

		let embed = done_tutorial_embed(&config.appearance, &config.purchase, timestamp_from_id(message.id).ok());
		http_client
			.create_message(channel_id)
			.embeds(&[embed])
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let has_image = message
		.attachments
		.iter()
		.any(|attachment| is_image(attachment.content_type.as_deref(), &attachment.url));
	if claimed || !has_image {
		return Ok(());
	}

	let queue_position = bot_state.read().await.tickets.queue_position(channel_id);
	let Some(queue_position) = queue_position else {
		return Ok(());
	};
	tracing::debug!(%channel_id, position = queue_position.position, total = queue_position.total, "proof of payment received");

	let embed = queue_embed(
		&config.appearance,
		message.author.id,
		&queue_position,
		timestamp_from_id(message.id).ok(),
	);
	http_client
		.create_message(channel_id)
		.embeds(&[embed])
		.await
		.into_diagnostic()?;

	Ok(())
}

fn is_done_command(content: &str) -> bool {
	content.trim().eq_ignore_ascii_case(DONE_COMMAND)
}

fn is_image(content_type: Option<&str>, url: &str) -> bool {
	if content_type.is_some_and(|content_type| content_type.starts_with("image/")) {
		return true;
	}
	let url = url.to_ascii_lowercase();
	IMAGE_EXTENSIONS.iter().any(|extension| url.ends_with(extension))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn done_command_ignores_case_and_whitespace() {
		assert!(is_done_command(".done"));
		assert!(is_done_command("  .DONE \n"));
		assert!(!is_done_command(".done please"));
		assert!(!is_done_command("done"));
	}

	#[test]
	fn images_are_detected_by_type_or_extension() {
		assert!(is_image(Some("image/png"), "https://cdn.example/a"));
		assert!(is_image(None, "https://cdn.example/proof.JPG"));
		assert!(is_image(None, "https://cdn.example/proof.webp"));
		assert!(!is_image(Some("application/pdf"), "https://cdn.example/proof.pdf"));
		assert!(!is_image(None, "https://cdn.example/proof.txt"));
	}
}

// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

pub const NOT_A_TICKET: &str = "❌ This channel isn't an open ticket.";
pub const NOT_A_SUPPORT_TICKET: &str = "❌ The FAQ can only be used inside support tickets.";
pub const NO_HANDLE_PERMISSION: &str = "❌ You don't have permission to handle this ticket.";
pub const NO_ADMIN_PERMISSION: &str = "❌ Only administrators can manage the FAQ.";
pub const TICKET_CLOSING: &str = "⏳ This ticket is already closing.";
pub const DONE_NOT_ALLOWED: &str = "❌ Only the ticket handlers can mark a ticket as done.";
pub const FAQ_NOT_FOUND: &str = "❌ That FAQ entry doesn't exist anymore.";
pub const FAQ_UNDISPLAYABLE: &str = "❌ That FAQ entry can't be displayed. Ask staff to shorten it.";
pub const FAQ_EMPTY: &str = "There are no FAQ entries yet. Add one with `/faq set`.";
pub const CREATION_IN_PROGRESS: &str = "⏳ Your ticket is already being created. Please wait a moment.";
pub const CREATION_FAILED: &str = "❌ The ticket couldn't be created. Please try again later or contact the staff.";

pub fn already_open_message(channel_mention: impl std::fmt::Display) -> String {
	format!("❌ You already have an open ticket: {}", channel_mention)
}

/// Builds an ephemeral text reply to an interaction
pub fn ephemeral_message(content: impl Into<String>) -> InteractionResponse {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.build();
	InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ephemeral_messages_are_hidden() {
		let response = ephemeral_message(NOT_A_TICKET);
		let data = response.data.unwrap();
		assert_eq!(data.flags, Some(MessageFlags::EPHEMERAL));
		assert_eq!(data.content.as_deref(), Some(NOT_A_TICKET));
	}

	#[test]
	fn already_open_message_links_channel() {
		assert_eq!(
			already_open_message("<#5>"),
			"❌ You already have an open ticket: <#5>"
		);
	}
}

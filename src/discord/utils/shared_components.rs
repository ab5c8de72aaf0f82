// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::faq::FaqItem;
use twilight_model::channel::message::component::{
	ActionRow, Button, ButtonStyle, Component, SelectMenu, SelectMenuOption, SelectMenuType,
};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker};

pub const CREATE_TICKET_ID: &str = "ticket/create";
pub const CLAIM_TICKET_ID: &str = "ticket/claim";
pub const CLOSE_TICKET_ID: &str = "ticket/close";
pub const FAQ_ANSWER_ID: &str = "faq/answer";
pub const FAQ_REMOVE_ID: &str = "faq/remove";

/// Value of the support FAQ option asking for a person instead of an answer
pub const FAQ_OTHER_VALUE: &str = "other";

pub const MAX_SELECT_LABEL_LENGTH: usize = 100;
pub const MAX_SELECT_OPTIONS: usize = 25;

/// Shortens a select menu label to the length Discord accepts
pub fn select_label(text: &str) -> String {
	text.chars().take(MAX_SELECT_LABEL_LENGTH).collect()
}

pub fn ticket_url(guild_id: Id<GuildMarker>, channel_id: Id<ChannelMarker>) -> String {
	format!("https://discord.com/channels/{}/{}", guild_id, channel_id)
}

fn action_button(custom_id: &str, label: &str, style: ButtonStyle) -> Component {
	Component::Button(Button {
		custom_id: Some(String::from(custom_id)),
		disabled: false,
		emoji: None,
		label: Some(String::from(label)),
		style,
		url: None,
		sku_id: None,
	})
}

pub fn new_ticket_button() -> Component {
	Component::ActionRow(ActionRow {
		components: vec![action_button(CREATE_TICKET_ID, "Create Ticket", ButtonStyle::Success)],
	})
}

pub fn ticket_action_buttons() -> Component {
	Component::ActionRow(ActionRow {
		components: vec![
			action_button(CLAIM_TICKET_ID, "Claim Ticket", ButtonStyle::Primary),
			action_button(CLOSE_TICKET_ID, "Close Ticket", ButtonStyle::Danger),
		],
	})
}

pub fn go_to_ticket_button(guild_id: Id<GuildMarker>, channel_id: Id<ChannelMarker>) -> Component {
	let link_button = Button {
		custom_id: None,
		disabled: false,
		emoji: None,
		label: Some(String::from("Go to ticket")),
		style: ButtonStyle::Link,
		url: Some(ticket_url(guild_id, channel_id)),
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(link_button)],
	})
}

fn text_select(custom_id: &str, placeholder: &str, options: Vec<SelectMenuOption>) -> Component {
	let select_menu = SelectMenu {
		channel_types: None,
		custom_id: String::from(custom_id),
		default_values: None,
		disabled: false,
		kind: SelectMenuType::Text,
		max_values: None,
		min_values: None,
		options: Some(options),
		placeholder: Some(String::from(placeholder)),
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::SelectMenu(select_menu)],
	})
}

/// The FAQ menu posted in support tickets. The last option always asks for a team member.
pub fn support_faq_select(items: &[FaqItem]) -> Component {
	let mut options: Vec<SelectMenuOption> = items
		.iter()
		.take(MAX_SELECT_OPTIONS - 1)
		.map(|item| SelectMenuOption {
			default: false,
			description: None,
			emoji: None,
			label: select_label(&item.question),
			value: item.id.clone(),
		})
		.collect();
	options.push(SelectMenuOption {
		default: false,
		description: None,
		emoji: None,
		label: String::from("Other options (contact the team)"),
		value: String::from(FAQ_OTHER_VALUE),
	});
	text_select(FAQ_ANSWER_ID, "Pick an FAQ question here", options)
}

pub fn faq_remove_select(items: &[FaqItem]) -> Component {
	let options = items
		.iter()
		.take(MAX_SELECT_OPTIONS)
		.map(|item| SelectMenuOption {
			default: false,
			description: Some(format!("ID #{}", item.id)),
			emoji: None,
			label: select_label(&item.question),
			value: item.id.clone(),
		})
		.collect();
	text_select(FAQ_REMOVE_ID, "Pick the FAQ question to remove", options)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn items(count: usize) -> Vec<FaqItem> {
		(1..=count)
			.map(|id| FaqItem {
				id: id.to_string(),
				question: format!("Question {}", id),
				answer: String::from("Answer"),
			})
			.collect()
	}

	fn select_options(component: Component) -> Vec<SelectMenuOption> {
		let Component::ActionRow(row) = component else {
			panic!("expected an action row");
		};
		let Some(Component::SelectMenu(menu)) = row.components.into_iter().next() else {
			panic!("expected a select menu");
		};
		menu.options.unwrap()
	}

	#[test]
	fn labels_are_cut_at_one_hundred_characters() {
		let long = "é".repeat(150);
		assert_eq!(select_label(&long).chars().count(), 100);
		assert_eq!(select_label("short"), "short");
	}

	#[test]
	fn support_menu_always_ends_with_other() {
		let options = select_options(support_faq_select(&[]));
		assert_eq!(options.len(), 1);
		assert_eq!(options[0].value, FAQ_OTHER_VALUE);

		let options = select_options(support_faq_select(&items(40)));
		assert_eq!(options.len(), MAX_SELECT_OPTIONS);
		assert_eq!(options[0].value, "1");
		assert_eq!(options[MAX_SELECT_OPTIONS - 1].value, FAQ_OTHER_VALUE);
	}

	#[test]
	fn remove_menu_describes_ids() {
		let options = select_options(faq_remove_select(&items(2)));
		assert_eq!(options[1].description.as_deref(), Some("ID #2"));
	}

	#[test]
	fn ticket_link_points_at_the_channel() {
		assert_eq!(
			ticket_url(Id::new(1), Id::new(2)),
			"https://discord.com/channels/1/2"
		);
	}
}

// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use tokio::task::AbortHandle;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FaqItem {
	pub id: String,
	pub question: String,
	pub answer: String,
}

/// FAQ entries in the order they were added. IDs are sequential and never reused.
#[derive(Debug, Default)]
pub struct FaqRegistry {
	last_id: u64,
	items: Vec<FaqItem>,
}

impl FaqRegistry {
	pub fn add(&mut self, question: String, answer: String) -> &FaqItem {
		self.last_id += 1;
		let id = self.last_id.to_string();
		self.items.push(FaqItem { id, question, answer });
		&self.items[self.items.len() - 1]
	}

	pub fn list(&self) -> &[FaqItem] {
		&self.items
	}

	pub fn get(&self, id: &str) -> Option<&FaqItem> {
		self.items.iter().find(|item| item.id == id)
	}

	pub fn remove(&mut self, id: &str) -> Option<FaqItem> {
		let index = self.items.iter().position(|item| item.id == id)?;
		Some(self.items.remove(index))
	}
}

/// Running FAQ answer countdowns, at most one per channel
#[derive(Debug, Default)]
pub struct FaqSessions {
	last_session_id: u64,
	sessions: HashMap<Id<ChannelMarker>, (u64, AbortHandle)>,
}

impl FaqSessions {
	pub fn next_session_id(&mut self) -> u64 {
		self.last_session_id += 1;
		self.last_session_id
	}

	/// Records the session as the channel's active one, aborting the session it replaces.
	pub fn start(&mut self, channel_id: Id<ChannelMarker>, session_id: u64, handle: AbortHandle) {
		if let Some((_, previous)) = self.sessions.insert(channel_id, (session_id, handle)) {
			previous.abort();
		}
	}

	/// Forgets a session that ran to completion. A newer session for the channel is left in place.
	pub fn finish(&mut self, channel_id: Id<ChannelMarker>, session_id: u64) {
		if self.active_session(channel_id) == Some(session_id) {
			self.sessions.remove(&channel_id);
		}
	}

	pub fn cancel(&mut self, channel_id: Id<ChannelMarker>) {
		if let Some((_, handle)) = self.sessions.remove(&channel_id) {
			handle.abort();
		}
	}

	pub fn active_session(&self, channel_id: Id<ChannelMarker>) -> Option<u64> {
		self.sessions.get(&channel_id).map(|(session_id, _)| *session_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn items_keep_insertion_order_and_sequential_ids() {
		let mut faq = FaqRegistry::default();
		assert!(faq.list().is_empty());
		faq.add(String::from("How do I pay?"), String::from("With QRIS."));
		faq.add(String::from("How do I pay?"), String::from("Duplicates are allowed."));
		let third = faq.add(String::from("Where is my script?"), String::from("In the panel."));
		assert_eq!(third.id, "3");
		let ids: Vec<&str> = faq.list().iter().map(|item| item.id.as_str()).collect();
		assert_eq!(ids, ["1", "2", "3"]);
	}

	#[test]
	fn removed_item_is_no_longer_found() {
		let mut faq = FaqRegistry::default();
		faq.add(String::from("Q1"), String::from("A1"));
		faq.add(String::from("Q2"), String::from("A2"));
		let removed = faq.remove("1").unwrap();
		assert_eq!(removed.question, "Q1");
		assert!(faq.get("1").is_none());
		assert!(faq.remove("1").is_none());
		assert_eq!(faq.get("2").unwrap().answer, "A2");
	}

	#[test]
	fn ids_are_not_reused_after_removal() {
		let mut faq = FaqRegistry::default();
		faq.add(String::from("Q1"), String::from("A1"));
		faq.remove("1");
		assert_eq!(faq.add(String::from("Q2"), String::from("A2")).id, "2");
	}

	#[tokio::test]
	async fn new_session_aborts_the_previous_one() {
		let mut sessions = FaqSessions::default();
		let channel = Id::new(5);
		let first = tokio::spawn(std::future::pending::<()>());
		let first_id = sessions.next_session_id();
		sessions.start(channel, first_id, first.abort_handle());

		let second = tokio::spawn(std::future::pending::<()>());
		let second_id = sessions.next_session_id();
		sessions.start(channel, second_id, second.abort_handle());

		assert!(first.await.unwrap_err().is_cancelled());
		assert_eq!(sessions.active_session(channel), Some(second_id));

		sessions.finish(channel, first_id);
		assert_eq!(sessions.active_session(channel), Some(second_id));
		sessions.finish(channel, second_id);
		assert_eq!(sessions.active_session(channel), None);
		second.abort();
	}
}

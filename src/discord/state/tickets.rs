// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::task::AbortHandle;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TicketKind {
	Purchase,
	Support,
}

impl TicketKind {
	pub fn channel_prefix(&self) -> &'static str {
		match self {
			Self::Purchase => "ticket-",
			Self::Support => "support-",
		}
	}

	pub fn channel_suffix(&self) -> &'static str {
		match self {
			Self::Purchase => "🛒",
			Self::Support => "❓",
		}
	}

	pub fn channel_name(&self, number: u64) -> String {
		format!("{}{}-{}", self.channel_prefix(), number, self.channel_suffix())
	}

	/// Reads the kind and ticket number back out of a channel name made by [TicketKind::channel_name].
	pub fn from_channel_name(name: &str) -> Option<(Self, u64)> {
		let (kind, rest) = if let Some(rest) = name.strip_prefix(Self::Purchase.channel_prefix()) {
			(Self::Purchase, rest)
		} else if let Some(rest) = name.strip_prefix(Self::Support.channel_prefix()) {
			(Self::Support, rest)
		} else {
			return None;
		};
		let number = match rest.split_once('-') {
			Some((number, _)) => number,
			None => rest,
		};
		number.parse().ok().map(|number| (kind, number))
	}
}

impl fmt::Display for TicketKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Purchase => write!(f, "Purchase"),
			Self::Support => write!(f, "Support"),
		}
	}
}

#[derive(Debug)]
pub struct TicketCounter {
	purchase: u64,
	support: u64,
}

impl TicketCounter {
	pub fn new(purchase_start: u64, support_start: u64) -> Self {
		Self {
			purchase: purchase_start,
			support: support_start,
		}
	}

	pub fn next(&mut self, kind: TicketKind) -> u64 {
		let counter = self.counter_mut(kind);
		*counter += 1;
		*counter
	}

	/// Makes sure the next number handed out for the kind is above `number`.
	pub fn observe(&mut self, kind: TicketKind, number: u64) {
		let counter = self.counter_mut(kind);
		*counter = (*counter).max(number);
	}

	fn counter_mut(&mut self, kind: TicketKind) -> &mut u64 {
		match kind {
			TicketKind::Purchase => &mut self.purchase,
			TicketKind::Support => &mut self.support,
		}
	}
}

/// What a ticket's running countdown ends in
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketCountdown {
	/// The done countdown started by claiming a purchase ticket
	AutoClose,
	/// The short countdown started by the close button
	Closing,
}

#[derive(Debug)]
pub struct Ticket {
	pub number: u64,
	pub kind: TicketKind,
	pub owner: Id<UserMarker>,
	pub channel_id: Id<ChannelMarker>,
	pub claimed: bool,
	pub created_at: DateTime<Utc>,
	countdown: Option<(TicketCountdown, AbortHandle)>,
}

impl Ticket {
	pub fn running_countdown(&self) -> Option<TicketCountdown> {
		match &self.countdown {
			Some((countdown, handle)) if !handle.is_finished() => Some(*countdown),
			_ => None,
		}
	}

	pub fn has_countdown(&self) -> bool {
		self.running_countdown().is_some()
	}

	/// Whether the close button was already used. An automatic close after a claim doesn't count.
	pub fn is_closing(&self) -> bool {
		self.running_countdown() == Some(TicketCountdown::Closing)
	}

	pub fn cancel_countdown(&mut self) {
		if let Some((_, handle)) = self.countdown.take() {
			handle.abort();
		}
	}
}

/// A ticket number held for a requester while their channel is being created
#[derive(Debug)]
pub struct TicketReservation {
	pub kind: TicketKind,
	pub number: u64,
	pub owner: Id<UserMarker>,
}

impl TicketReservation {
	pub fn channel_name(&self) -> String {
		self.kind.channel_name(self.number)
	}
}

#[derive(Debug, Eq, PartialEq)]
pub enum CreateRejection {
	AlreadyOpen(Id<ChannelMarker>),
	CreationInProgress,
}

#[derive(Debug, Eq, PartialEq)]
pub struct QueuePosition {
	pub position: usize,
	pub total: usize,
}

#[derive(Debug)]
pub struct TicketRegistry {
	counter: TicketCounter,
	tickets: HashMap<Id<ChannelMarker>, Ticket>,
	owners: HashMap<Id<UserMarker>, Id<ChannelMarker>>,
	pending_owners: HashSet<Id<UserMarker>>,
}

impl TicketRegistry {
	pub fn new(purchase_start: u64, support_start: u64) -> Self {
		Self {
			counter: TicketCounter::new(purchase_start, support_start),
			tickets: HashMap::new(),
			owners: HashMap::new(),
			pending_owners: HashSet::new(),
		}
	}

	/// Reserves the next ticket number for a requester. Only one ticket per requester may be open or in creation.
	pub fn begin_creation(
		&mut self,
		owner: Id<UserMarker>,
		kind: TicketKind,
	) -> Result<TicketReservation, CreateRejection> {
		if let Some(channel_id) = self.open_ticket_for(owner) {
			return Err(CreateRejection::AlreadyOpen(channel_id));
		}
		if !self.pending_owners.insert(owner) {
			return Err(CreateRejection::CreationInProgress);
		}
		let number = self.counter.next(kind);
		Ok(TicketReservation { kind, number, owner })
	}

	pub fn finish_creation(
		&mut self,
		reservation: TicketReservation,
		channel_id: Id<ChannelMarker>,
		created_at: DateTime<Utc>,
	) -> &Ticket {
		self.pending_owners.remove(&reservation.owner);
		self.insert(Ticket {
			number: reservation.number,
			kind: reservation.kind,
			owner: reservation.owner,
			channel_id,
			claimed: false,
			created_at,
			countdown: None,
		})
	}

	/// Releases the requester after a failed creation. The reserved number stays used.
	pub fn abandon_creation(&mut self, reservation: TicketReservation) {
		self.pending_owners.remove(&reservation.owner);
	}

	/// Registers a ticket whose channel already exists, such as one found when the guild became available.
	pub fn restore(
		&mut self,
		kind: TicketKind,
		number: u64,
		owner: Id<UserMarker>,
		channel_id: Id<ChannelMarker>,
		created_at: DateTime<Utc>,
	) -> bool {
		if self.tickets.contains_key(&channel_id) || self.owners.contains_key(&owner) {
			return false;
		}
		self.counter.observe(kind, number);
		self.insert(Ticket {
			number,
			kind,
			owner,
			channel_id,
			claimed: false,
			created_at,
			countdown: None,
		});
		true
	}

	fn insert(&mut self, ticket: Ticket) -> &Ticket {
		let channel_id = ticket.channel_id;
		self.owners.insert(ticket.owner, channel_id);
		self.tickets.entry(channel_id).or_insert(ticket)
	}

	pub fn get(&self, channel_id: Id<ChannelMarker>) -> Option<&Ticket> {
		self.tickets.get(&channel_id)
	}

	pub fn open_ticket_for(&self, owner: Id<UserMarker>) -> Option<Id<ChannelMarker>> {
		self.owners.get(&owner).copied()
	}

	pub fn open_count(&self) -> usize {
		self.tickets.len()
	}

	/// Marks the ticket as claimed, taking it out of the queue. Returns the ticket if it exists.
	pub fn claim(&mut self, channel_id: Id<ChannelMarker>) -> Option<&Ticket> {
		let ticket = self.tickets.get_mut(&channel_id)?;
		ticket.claimed = true;
		Some(ticket)
	}

	/// Puts the ticket back into the unclaimed state, as done when a ticket starts closing.
	pub fn release(&mut self, channel_id: Id<ChannelMarker>) -> Option<&Ticket> {
		let ticket = self.tickets.get_mut(&channel_id)?;
		ticket.claimed = false;
		Some(ticket)
	}

	/// Stores the handle of the countdown running for the ticket, aborting any countdown it replaces.
	pub fn set_countdown(
		&mut self,
		channel_id: Id<ChannelMarker>,
		countdown: TicketCountdown,
		handle: AbortHandle,
	) -> bool {
		match self.tickets.get_mut(&channel_id) {
			Some(ticket) => {
				ticket.cancel_countdown();
				ticket.countdown = Some((countdown, handle));
				true
			}
			None => {
				handle.abort();
				false
			}
		}
	}

	/// Removes the ticket record. Any countdown is left running; use [Ticket::cancel_countdown] on the result to stop it.
	pub fn remove(&mut self, channel_id: Id<ChannelMarker>) -> Option<Ticket> {
		let ticket = self.tickets.remove(&channel_id)?;
		if self.owners.get(&ticket.owner) == Some(&channel_id) {
			self.owners.remove(&ticket.owner);
		}
		Some(ticket)
	}

	/// Gets the position of an unclaimed ticket among the unclaimed tickets of the same kind, ordered by creation.
	pub fn queue_position(&self, channel_id: Id<ChannelMarker>) -> Option<QueuePosition> {
		let ticket = self.tickets.get(&channel_id)?;
		if ticket.claimed {
			return None;
		}
		let mut queue: Vec<&Ticket> = self
			.tickets
			.values()
			.filter(|other| other.kind == ticket.kind && !other.claimed)
			.collect();
		queue.sort_by_key(|other| (other.created_at, other.channel_id));
		let index = queue.iter().position(|other| other.channel_id == channel_id)?;
		Some(QueuePosition {
			position: index + 1,
			total: queue.len(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn at(seconds: i64) -> DateTime<Utc> {
		Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
	}

	fn open(registry: &mut TicketRegistry, owner: u64, channel: u64, created: i64) -> u64 {
		let reservation = registry.begin_creation(Id::new(owner), TicketKind::Purchase).unwrap();
		registry.finish_creation(reservation, Id::new(channel), at(created)).number
	}

	#[test]
	fn channel_names_round_trip_through_parsing() {
		assert_eq!(TicketKind::Purchase.channel_name(8829), "ticket-8829-🛒");
		assert_eq!(TicketKind::Support.channel_name(1), "support-1-❓");
		assert_eq!(
			TicketKind::from_channel_name("ticket-8829-🛒"),
			Some((TicketKind::Purchase, 8829))
		);
		assert_eq!(TicketKind::from_channel_name("support-12-❓"), Some((TicketKind::Support, 12)));
		assert_eq!(TicketKind::from_channel_name("general"), None);
		assert_eq!(TicketKind::from_channel_name("ticket-abc"), None);
	}

	#[test]
	fn counters_are_independent_and_seeded() {
		let mut counter = TicketCounter::new(8828, 0);
		assert_eq!(counter.next(TicketKind::Purchase), 8829);
		assert_eq!(counter.next(TicketKind::Support), 1);
		assert_eq!(counter.next(TicketKind::Purchase), 8830);
		assert_eq!(counter.next(TicketKind::Support), 2);
	}

	#[test]
	fn observed_numbers_raise_the_counter() {
		let mut counter = TicketCounter::new(10, 0);
		counter.observe(TicketKind::Purchase, 50);
		counter.observe(TicketKind::Purchase, 20);
		assert_eq!(counter.next(TicketKind::Purchase), 51);
		assert_eq!(counter.next(TicketKind::Support), 1);
	}

	#[test]
	fn first_purchase_ticket_gets_next_number_and_name() {
		let mut registry = TicketRegistry::new(8828, 0);
		let reservation = registry.begin_creation(Id::new(1), TicketKind::Purchase).unwrap();
		assert_eq!(reservation.channel_name(), "ticket-8829-🛒");
		let ticket = registry.finish_creation(reservation, Id::new(100), at(0));
		assert_eq!(ticket.number, 8829);
		assert!(!ticket.claimed);
		assert_eq!(registry.open_ticket_for(Id::new(1)), Some(Id::new(100)));
	}

	#[test]
	fn one_open_ticket_per_requester() {
		let mut registry = TicketRegistry::new(0, 0);
		open(&mut registry, 1, 100, 0);
		assert_eq!(
			registry.begin_creation(Id::new(1), TicketKind::Purchase).unwrap_err(),
			CreateRejection::AlreadyOpen(Id::new(100))
		);
		assert_eq!(
			registry.begin_creation(Id::new(1), TicketKind::Support).unwrap_err(),
			CreateRejection::AlreadyOpen(Id::new(100))
		);
		assert!(registry.begin_creation(Id::new(2), TicketKind::Purchase).is_ok());
	}

	#[test]
	fn concurrent_creation_for_same_requester_is_rejected() {
		let mut registry = TicketRegistry::new(0, 0);
		let first = registry.begin_creation(Id::new(1), TicketKind::Purchase).unwrap();
		assert_eq!(
			registry.begin_creation(Id::new(1), TicketKind::Purchase).unwrap_err(),
			CreateRejection::CreationInProgress
		);
		registry.abandon_creation(first);
		let retry = registry.begin_creation(Id::new(1), TicketKind::Purchase).unwrap();
		assert_eq!(retry.number, 2);
	}

	#[test]
	fn removing_a_ticket_frees_the_requester() {
		let mut registry = TicketRegistry::new(0, 0);
		open(&mut registry, 1, 100, 0);
		let removed = registry.remove(Id::new(100)).unwrap();
		assert_eq!(removed.owner, Id::new(1));
		assert!(registry.open_ticket_for(Id::new(1)).is_none());
		assert!(registry.begin_creation(Id::new(1), TicketKind::Purchase).is_ok());
		assert!(registry.remove(Id::new(100)).is_none());
	}

	#[test]
	fn queue_position_counts_earlier_unclaimed_tickets() {
		let mut registry = TicketRegistry::new(0, 0);
		open(&mut registry, 1, 100, 0);
		open(&mut registry, 2, 101, 10);
		open(&mut registry, 3, 102, 20);
		assert_eq!(
			registry.queue_position(Id::new(102)),
			Some(QueuePosition { position: 3, total: 3 })
		);
		assert_eq!(
			registry.queue_position(Id::new(100)),
			Some(QueuePosition { position: 1, total: 3 })
		);
	}

	#[test]
	fn claiming_moves_every_later_ticket_up_by_one() {
		let mut registry = TicketRegistry::new(0, 0);
		open(&mut registry, 1, 100, 0);
		open(&mut registry, 2, 101, 10);
		open(&mut registry, 3, 102, 20);
		open(&mut registry, 4, 103, 30);

		registry.claim(Id::new(101));
		assert_eq!(registry.queue_position(Id::new(101)), None);
		assert_eq!(registry.queue_position(Id::new(100)).unwrap().position, 1);
		assert_eq!(registry.queue_position(Id::new(102)).unwrap().position, 2);
		assert_eq!(registry.queue_position(Id::new(103)).unwrap().position, 3);
		assert_eq!(registry.queue_position(Id::new(103)).unwrap().total, 3);

		registry.release(Id::new(101));
		assert_eq!(registry.queue_position(Id::new(103)).unwrap().position, 4);
	}

	#[test]
	fn support_tickets_do_not_share_the_purchase_queue() {
		let mut registry = TicketRegistry::new(0, 0);
		let support = registry.begin_creation(Id::new(1), TicketKind::Support).unwrap();
		registry.finish_creation(support, Id::new(100), at(0));
		open(&mut registry, 2, 101, 10);
		assert_eq!(
			registry.queue_position(Id::new(101)),
			Some(QueuePosition { position: 1, total: 1 })
		);
	}

	#[test]
	fn equal_creation_times_are_ordered_by_channel() {
		let mut registry = TicketRegistry::new(0, 0);
		open(&mut registry, 1, 200, 0);
		open(&mut registry, 2, 100, 0);
		assert_eq!(registry.queue_position(Id::new(100)).unwrap().position, 1);
		assert_eq!(registry.queue_position(Id::new(200)).unwrap().position, 2);
	}

	#[test]
	fn restore_skips_known_channels_and_owners() {
		let mut registry = TicketRegistry::new(0, 0);
		assert!(registry.restore(TicketKind::Support, 7, Id::new(1), Id::new(100), at(0)));
		assert!(!registry.restore(TicketKind::Support, 7, Id::new(1), Id::new(100), at(0)));
		assert!(!registry.restore(TicketKind::Purchase, 3, Id::new(1), Id::new(101), at(0)));
		assert_eq!(registry.open_count(), 1);
		let next = registry.begin_creation(Id::new(2), TicketKind::Support).unwrap();
		assert_eq!(next.number, 8);
	}

	#[tokio::test]
	async fn removing_then_cancelling_stops_the_countdown() {
		let mut registry = TicketRegistry::new(0, 0);
		open(&mut registry, 1, 100, 0);
		let task = tokio::spawn(std::future::pending::<()>());
		assert!(registry.set_countdown(Id::new(100), TicketCountdown::Closing, task.abort_handle()));
		assert!(registry.get(Id::new(100)).unwrap().has_countdown());

		let mut ticket = registry.remove(Id::new(100)).unwrap();
		ticket.cancel_countdown();
		assert!(task.await.unwrap_err().is_cancelled());
	}

	#[tokio::test]
	async fn countdown_for_unknown_ticket_is_aborted() {
		let mut registry = TicketRegistry::new(0, 0);
		let task = tokio::spawn(std::future::pending::<()>());
		assert!(!registry.set_countdown(Id::new(100), TicketCountdown::AutoClose, task.abort_handle()));
		assert!(task.await.unwrap_err().is_cancelled());
	}

	#[tokio::test]
	async fn only_the_close_button_countdown_counts_as_closing() {
		let mut registry = TicketRegistry::new(0, 0);
		open(&mut registry, 1, 100, 0);
		registry.claim(Id::new(100));
		let auto_close = tokio::spawn(std::future::pending::<()>());
		registry.set_countdown(Id::new(100), TicketCountdown::AutoClose, auto_close.abort_handle());
		let ticket = registry.get(Id::new(100)).unwrap();
		assert!(ticket.has_countdown());
		assert!(!ticket.is_closing());

		let closing = tokio::spawn(std::future::pending::<()>());
		registry.set_countdown(Id::new(100), TicketCountdown::Closing, closing.abort_handle());
		assert!(registry.get(Id::new(100)).unwrap().is_closing());
		assert!(auto_close.await.unwrap_err().is_cancelled());
	}
}

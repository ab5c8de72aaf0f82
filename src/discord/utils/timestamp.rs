// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, TimeZone, Utc};
use twilight_model::util::datetime::{Timestamp, TimestampParseError};
use twilight_util::snowflake::Snowflake;

/// Gets the timestamp from the ID snowflake. If any failures occur in the conversion, returns `None`.
pub fn datetime_from_id(id: impl Snowflake) -> Option<DateTime<Utc>> {
	let timestamp = id.timestamp();
	Utc.timestamp_millis_opt(timestamp).single()
}

/// Gets a [Timestamp] object from the ID snowflake.
pub fn timestamp_from_id(id: impl Snowflake) -> Result<Timestamp, TimestampParseError> {
	Timestamp::from_micros(id.timestamp() * 1000)
}

/// Gets a [Timestamp] for the current time, for messages re-rendered outside of an interaction.
pub fn current_timestamp() -> Option<Timestamp> {
	Timestamp::from_micros(Utc::now().timestamp_micros()).ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_model::id::Id;
	use twilight_model::id::marker::ChannelMarker;

	// 2015-01-01T00:00:00Z, the Discord epoch, shifted into the ID's timestamp bits
	const ONE_SECOND_AFTER_EPOCH: u64 = 1000 << 22;

	#[test]
	fn snowflake_creation_time_is_read() {
		let id: Id<ChannelMarker> = Id::new(ONE_SECOND_AFTER_EPOCH);
		let datetime = datetime_from_id(id).unwrap();
		assert_eq!(datetime.timestamp(), 1_420_070_401);
		let timestamp = timestamp_from_id(id).unwrap();
		assert_eq!(timestamp.as_secs(), 1_420_070_401);
	}

	#[test]
	fn later_ids_are_created_later() {
		let earlier: Id<ChannelMarker> = Id::new(ONE_SECOND_AFTER_EPOCH);
		let later: Id<ChannelMarker> = Id::new(ONE_SECOND_AFTER_EPOCH * 2);
		assert!(datetime_from_id(earlier) < datetime_from_id(later));
	}
}

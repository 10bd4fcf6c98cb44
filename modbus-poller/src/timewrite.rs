use chrono::{Datelike, Local, Timelike};
use tracing::debug;

use crate::block::RegisterBlock;
use crate::codec::{self, Address, Quantity, Word};
use crate::error::PollerResult;
use crate::session::LinkSession;

/// Registers occupied by the six time-field pairs.
pub const TIME_WORD_COUNT: Quantity = 12;

/// Host local time decomposed into the six fields the device expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFields {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl TimeFields {
    pub fn now_local() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<T: Datelike + Timelike>(datetime: &T) -> Self {
        Self {
            year: datetime.year() as u16,
            month: datetime.month() as u16,
            day: datetime.day() as u16,
            hour: datetime.hour() as u16,
            minute: datetime.minute() as u16,
            second: datetime.second() as u16,
        }
    }

    /// Six (value, 0) register pairs in field order, year first.
    pub fn encode(&self) -> [Word; TIME_WORD_COUNT as usize] {
        let mut words = [0; TIME_WORD_COUNT as usize];
        let fields = [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ];
        for (pair, field) in words.chunks_exact_mut(2).zip(fields) {
            pair.copy_from_slice(&codec::pair_from_u16(field));
        }
        words
    }
}

/// Writes the wall clock to the device's time registers, followed by the
/// acknowledgement register.
///
/// Both writes go through the session so failures surface uniformly; a
/// failure here is the caller's to report and does not touch the link state.
#[derive(Debug, Clone, Copy)]
pub struct TimeWriter {
    base_addr: Address,
    ack_addr: Address,
    ack_value: Word,
}

impl TimeWriter {
    pub fn new(base_addr: Address, ack_addr: Address, ack_value: Word) -> Self {
        Self {
            base_addr,
            ack_addr,
            ack_value,
        }
    }

    pub async fn write_time(
        &self,
        session: &mut LinkSession,
        block: &mut RegisterBlock,
        fields: TimeFields,
    ) -> PollerResult<()> {
        debug!(?fields, base_addr = self.base_addr, "writing device clock");
        block
            .words_mut(self.base_addr, TIME_WORD_COUNT)
            .copy_from_slice(&fields.encode());
        session
            .write_registers(block, self.base_addr, TIME_WORD_COUNT)
            .await?;
        session.write_single(self.ack_addr, self.ack_value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn encodes_six_pairs_with_zero_high_words() {
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let fields = TimeFields::from_datetime(&datetime);
        assert_eq!(
            fields,
            TimeFields {
                year: 2024,
                month: 1,
                day: 2,
                hour: 3,
                minute: 4,
                second: 5,
            }
        );
        assert_eq!(fields.encode(), [2024, 0, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0]);
    }

    #[test]
    fn midnight_new_year_encodes_cleanly() {
        let datetime = NaiveDate::from_ymd_opt(2026, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(
            TimeFields::from_datetime(&datetime).encode(),
            [2026, 0, 12, 0, 31, 0, 23, 0, 59, 0, 59, 0]
        );
    }
}

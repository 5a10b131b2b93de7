//! Timestamp scheduler.
//!
//! Drafts get a plausible posting time drawn from their situation's time
//! band, on today's date in a fixed timezone.
//!
//! The store hands timestamps back in UTC, so every clock-time reading goes
//! through [`Scheduler::local`] first.

use castroom_db::entities::situation::TimeBand;
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use rand::Rng;

/// Draw a time of day inside `band`: uniform hour, uniform minute, second 0.
pub fn draw_time<R: Rng + ?Sized>(band: TimeBand, rng: &mut R) -> NaiveTime {
    let hour = rng.gen_range(band.hour_range());
    let minute = rng.gen_range(0..=59);
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Draw a timestamp on `today` inside `band`, localized to `tz`.
pub fn stamp<R: Rng + ?Sized>(
    band: TimeBand,
    today: NaiveDate,
    tz: Tz,
    rng: &mut R,
) -> DateTime<FixedOffset> {
    localize(today.and_time(draw_time(band, rng)), tz)
}

fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
        // Skipped by a DST jump; move past the gap
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive))
            .fixed_offset(),
    }
}

/// Clock and timezone used to stamp drafts.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    tz: Tz,
}

impl Scheduler {
    /// Create a scheduler for a timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Configured timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Today's date in the configured timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Draw a timestamp for a draft created now.
    pub fn stamp_today<R: Rng + ?Sized>(&self, band: TimeBand, rng: &mut R) -> DateTime<FixedOffset> {
        stamp(band, self.today(), self.tz, rng)
    }

    /// The same instant on the configured wall clock.
    #[must_use]
    pub fn local(&self, at: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.tz).fixed_offset()
    }

    /// Time of day a post goes out: its creation time on the local clock.
    #[must_use]
    pub fn posted_at_for(&self, created_at: &DateTime<FixedOffset>) -> NaiveTime {
        self.local(created_at).time()
    }

    /// Move a timestamp to another local date, keeping its local clock time.
    #[must_use]
    pub fn reschedule(&self, created_at: &DateTime<FixedOffset>, date: NaiveDate) -> DateTime<FixedOffset> {
        localize(date.and_time(self.posted_at_for(created_at)), self.tz)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Tokyo)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_draw_time_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for band in [TimeBand::Morning, TimeBand::Midday, TimeBand::Evening] {
            let range = band.hour_range();
            for _ in 0..1000 {
                let time = draw_time(band, &mut rng);
                assert!(range.contains(&time.hour()), "{band:?} drew {time}");
                assert!(time.minute() <= 59);
                assert_eq!(time.second(), 0);
            }
        }
    }

    #[test]
    fn test_anytime_covers_every_hour() {
        let mut rng = StdRng::seed_from_u64(42);
        let hours: HashSet<u32> = (0..1000)
            .map(|_| draw_time(TimeBand::Anytime, &mut rng).hour())
            .collect();
        assert_eq!(hours.len(), 24);
    }

    #[test]
    fn test_stamp_uses_given_date_and_zone() {
        let mut rng = StdRng::seed_from_u64(1);
        let today = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let stamped = stamp(TimeBand::Evening, today, chrono_tz::Asia::Tokyo, &mut rng);

        assert_eq!(stamped.date_naive(), today);
        assert_eq!(stamped.offset().local_minus_utc(), 9 * 3600);
        assert!((18..=23).contains(&stamped.hour()));
    }

    #[test]
    fn test_reschedule_keeps_local_clock_time() {
        let scheduler = Scheduler::default();
        // 08:15 in Tokyo, as read back from the store
        let stored = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 31, 23, 15, 0)
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        let moved = scheduler.reschedule(&stored, date);

        assert_eq!(moved.date_naive(), date);
        assert_eq!(moved.time(), NaiveTime::from_hms_opt(8, 15, 0).unwrap());
        assert_eq!(moved.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(
            scheduler.posted_at_for(&stored),
            NaiveTime::from_hms_opt(8, 15, 0).unwrap()
        );
        assert_eq!(scheduler.local(&stored).date_naive(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn test_skipped_wall_time_moves_forward() {
        let tz = chrono_tz::America::New_York;
        // 02:30 does not exist on the spring-forward date
        let naive = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let stamped = localize(naive, tz);

        assert_eq!(stamped.date_naive(), naive.date());
        assert_eq!(stamped.hour(), 3);
        assert_eq!(stamped.minute(), 30);
        assert_eq!(stamped.offset().local_minus_utc(), -4 * 3600);
    }
}

/*!
Core time data types on plain integers.

This crate answers questions about instants and wall clock readings, so it
needs just enough calendrical machinery to convert between the two at second
precision: Unix timestamps, Gregorian civil datetimes and UTC offsets. The
conversions are implemented directly on primitive integers. Notably, the
epoch day conversions use the Neri-Schneider algorithms, which have no
branching and no divisions.

Nothing here knows anything about time zones. The types in this module are
the vocabulary that the TZif and POSIX TZ machinery is written in.
*/

/// The range of years supported by [`DateTime`].
pub(crate) const YEAR_MIN: i16 = -9999;
pub(crate) const YEAR_MAX: i16 = 9999;

/// The limits, in seconds, on a UTC offset imposed by TZif (RFC 8536).
pub(crate) const OFFSET_MIN: i32 = -89_999;
pub(crate) const OFFSET_MAX: i32 = 93_599;

/// Timestamps corresponding to the edges of the supported year range.
///
/// Transition times found in TZif data are clamped to this range, and year
/// extraction clamps too, so pathological instants can't push the civil
/// conversions out of range.
pub(crate) const TIMESTAMP_MIN: i64 = -377_705_023_201;
pub(crate) const TIMESTAMP_MAX: i64 = 253_402_207_200;

/// An instant in time represented as the number of seconds elapsed since
/// the Unix epoch, `1970-01-01T00:00:00Z`.
///
/// TZif data is limited to second precision, so this crate is too. Negative
/// values are instants before the epoch.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    second: i64,
}

impl Timestamp {
    /// Creates a timestamp from a number of seconds since the Unix epoch.
    #[inline]
    pub const fn from_second(second: i64) -> Timestamp {
        Timestamp { second }
    }

    /// Returns this timestamp as a number of seconds since the Unix epoch.
    #[inline]
    pub const fn as_second(self) -> i64 {
        self.second
    }
}

impl From<i64> for Timestamp {
    fn from(second: i64) -> Timestamp {
        Timestamp::from_second(second)
    }
}

/// A civil datetime: a Gregorian calendar date and a wall clock reading, to
/// second precision, with no time zone attached.
///
/// The ordering derived here is chronological, since the fields are ordered
/// from most to least significant.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DateTime {
    year: i16,
    month: i8,
    day: i8,
    hour: i8,
    minute: i8,
    second: i8,
}

impl DateTime {
    /// Creates a new civil datetime from its components.
    ///
    /// This returns an error when any component is out of range. Years must
    /// be in `-9999..=9999` and the day must exist in the given month.
    pub fn new(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
    ) -> Result<DateTime, crate::Error> {
        if year < YEAR_MIN || year > YEAR_MAX {
            return Err(crate::error::err!(
                "year {year} is not in the supported range \
                 {YEAR_MIN}..={YEAR_MAX}"
            ));
        }
        if month < 1 || month > 12 {
            return Err(crate::error::err!(
                "month {month} is not in the range 1..=12"
            ));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(crate::error::err!(
                "day {day} does not exist in year {year} month {month}"
            ));
        }
        if hour < 0 || hour > 23 {
            return Err(crate::error::err!(
                "hour {hour} is not in the range 0..=23"
            ));
        }
        if minute < 0 || minute > 59 {
            return Err(crate::error::err!(
                "minute {minute} is not in the range 0..=59"
            ));
        }
        if second < 0 || second > 59 {
            return Err(crate::error::err!(
                "second {second} is not in the range 0..=59"
            ));
        }
        Ok(DateTime { year, month, day, hour, minute, second })
    }

    /// Creates a new civil datetime in a `const` context.
    ///
    /// # Panics
    ///
    /// When any component is out of range. Use [`DateTime::new`] for a
    /// fallible constructor.
    pub const fn constant(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
    ) -> DateTime {
        assert!(YEAR_MIN <= year && year <= YEAR_MAX, "year out of range");
        assert!(1 <= month && month <= 12, "month out of range");
        assert!(1 <= day && day <= days_in_month(year, month), "day invalid");
        assert!(0 <= hour && hour <= 23, "hour out of range");
        assert!(0 <= minute && minute <= 59, "minute out of range");
        assert!(0 <= second && second <= 59, "second out of range");
        DateTime { year, month, day, hour, minute, second }
    }

    /// Returns the year. Guaranteed to be in `-9999..=9999`.
    #[inline]
    pub fn year(self) -> i16 {
        self.year
    }

    /// Returns the month. Guaranteed to be in `1..=12`.
    #[inline]
    pub fn month(self) -> i8 {
        self.month
    }

    /// Returns the day of the month. Guaranteed to be in `1..=31`.
    #[inline]
    pub fn day(self) -> i8 {
        self.day
    }

    /// Returns the hour. Guaranteed to be in `0..=23`.
    #[inline]
    pub fn hour(self) -> i8 {
        self.hour
    }

    /// Returns the minute. Guaranteed to be in `0..=59`.
    #[inline]
    pub fn minute(self) -> i8 {
        self.minute
    }

    /// Returns the second. Guaranteed to be in `0..=59`.
    #[inline]
    pub fn second(self) -> i8 {
        self.second
    }

    /// Converts this datetime to "seconds since the epoch," taking the wall
    /// clock reading at face value.
    ///
    /// When `self` is a reading of UTC, this is a real Unix timestamp. When
    /// it is a reading of some local clock, the result is denominated in
    /// that local time, which is exactly the currency the wall-indexed
    /// transition arrays trade in.
    pub(crate) fn to_epoch_second(self) -> i64 {
        let epoch_day =
            i64::from(days_from_civil(self.year, self.month, self.day));
        epoch_day * 86_400
            + i64::from(self.hour) * 3_600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// The inverse of [`DateTime::to_epoch_second`].
    ///
    /// This expects `second` to correspond to a datetime within this type's
    /// supported range. Every value derived from a parsed TZif file or a
    /// POSIX TZ rule satisfies that.
    pub(crate) fn from_epoch_second(second: i64) -> DateTime {
        let epoch_day = second.div_euclid(86_400) as i32;
        let mut rest = second.rem_euclid(86_400) as i32;
        let (year, month, day) = civil_from_days(epoch_day);
        let hour = (rest / 3_600) as i8;
        rest %= 3_600;
        let minute = (rest / 60) as i8;
        let second = (rest % 60) as i8;
        DateTime { year, month, day, hour, minute, second }
    }
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.year < 0 {
            write!(f, "-{:04}", -i32::from(self.year))?;
        } else {
            write!(f, "{:04}", self.year)?;
        }
        write!(
            f,
            "-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.month, self.day, self.hour, self.minute, self.second,
        )
    }
}

/// An offset from UTC, in seconds.
///
/// Positive offsets are east of the prime meridian, so `civil - offset =
/// UTC` everywhere in this crate. (POSIX TZ strings use the opposite sign
/// convention on the wire; the parser flips it on the way in.)
///
/// The supported range is the one TZif admits for a `utoff` field:
/// `-89999..=93599` seconds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Offset {
    seconds: i32,
}

impl Offset {
    /// The zero offset, i.e., UTC itself.
    pub const UTC: Offset = Offset { seconds: 0 };

    /// Creates an offset from a number of seconds east of UTC.
    ///
    /// Returns an error when the value is outside `-89999..=93599`.
    pub fn from_seconds(seconds: i32) -> Result<Offset, crate::Error> {
        if seconds < OFFSET_MIN || seconds > OFFSET_MAX {
            return Err(crate::error::err!(
                "offset of {seconds} seconds is not in the \
                 range {OFFSET_MIN}..={OFFSET_MAX}"
            ));
        }
        Ok(Offset { seconds })
    }

    /// Creates an offset in a `const` context.
    ///
    /// # Panics
    ///
    /// When the value is outside `-89999..=93599`.
    pub const fn constant_seconds(seconds: i32) -> Offset {
        assert!(
            OFFSET_MIN <= seconds && seconds <= OFFSET_MAX,
            "offset seconds out of range",
        );
        Offset { seconds }
    }

    /// Returns this offset as a number of seconds east of UTC.
    #[inline]
    pub const fn seconds(self) -> i32 {
        self.seconds
    }

    /// Returns true when this is the zero offset.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.seconds == 0
    }
}

impl core::fmt::Display for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        let mut rest = self.seconds.unsigned_abs();
        let hours = rest / 3_600;
        rest %= 3_600;
        let minutes = rest / 60;
        let seconds = rest % 60;
        write!(f, "{sign}{hours:02}:{minutes:02}")?;
        if seconds != 0 {
            write!(f, ":{seconds:02}")?;
        }
        Ok(())
    }
}

/// Disambiguates a wall clock reading that occurs twice (or not at all)
/// around a transition.
///
/// At an overlap, `Earlier` selects the first occurrence of the repeated
/// reading and `Later` the second. At a gap, `Earlier` projects the
/// nonexistent reading with the offset in effect before the jump and
/// `Later` with the offset after it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Fold {
    /// The first interpretation of an ambiguous reading. The default.
    #[default]
    Earlier,
    /// The second interpretation of an ambiguous reading.
    Later,
}

impl Fold {
    /// Returns this fold as an index into a pair of wall transition arrays.
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Fold::Earlier => 0,
            Fold::Later => 1,
        }
    }
}

/// Converts a Gregorian date to days since the Unix epoch.
///
/// This is Neri-Schneider. There's no branching or divisions.
///
/// Ref: <https://github.com/cassioneri/eaf/blob/684d3cc32d14eee371d0abe4f683d6d6a49ed5c1/algorithms/neri_schneider.hpp#L83>
#[inline]
#[allow(non_upper_case_globals, non_snake_case)] // to mimic source
pub(crate) const fn days_from_civil(year: i16, month: i8, day: i8) -> i32 {
    const s: u32 = 82;
    const K: u32 = 719468 + 146097 * s;
    const L: u32 = 400 * s;

    let year = year as u32;
    let month = month as u32;
    let day = day as u32;

    let J = month <= 2;
    let Y = year.wrapping_add(L).wrapping_sub(J as u32);
    let M = if J { month + 12 } else { month };
    let D = day - 1;
    let C = Y / 100;

    let y_star = 1461 * Y / 4 - C + C / 4;
    let m_star = (979 * M - 2919) / 32;
    let N = y_star + m_star + D;

    N.wrapping_sub(K) as i32
}

/// Converts days since the Unix epoch to a Gregorian `(year, month, day)`.
///
/// This is Neri-Schneider. There's no branching or divisions.
///
/// Ref: <https://github.com/cassioneri/eaf/blob/684d3cc32d14eee371d0abe4f683d6d6a49ed5c1/algorithms/neri_schneider.hpp#L40C3-L40C34>
#[inline]
#[allow(non_upper_case_globals, non_snake_case)] // to mimic source
pub(crate) const fn civil_from_days(epoch_day: i32) -> (i16, i8, i8) {
    const s: u32 = 82;
    const K: u32 = 719468 + 146097 * s;
    const L: u32 = 400 * s;

    let N_U = epoch_day as u32;
    let N = N_U.wrapping_add(K);

    let N_1 = 4 * N + 3;
    let C = N_1 / 146097;
    let N_C = (N_1 % 146097) / 4;

    let N_2 = 4 * N_C + 3;
    let P_2 = 2939745 * (N_2 as u64);
    let Z = (P_2 / 4294967296) as u32;
    let N_Y = (P_2 % 4294967296) as u32 / 2939745 / 4;
    let Y = 100 * C + Z;

    let N_3 = 2141 * N_Y + 197913;
    let M = N_3 / 65536;
    let D = (N_3 % 65536) / 2141;

    let J = N_Y >= 306;
    let year = Y.wrapping_sub(L).wrapping_add(J as u32) as i16;
    let month = (if J { M - 12 } else { M }) as i8;
    let day = (D + 1) as i8;
    (year, month, day)
}

/// Returns true if and only if the given year is a leap year.
#[inline]
pub(crate) const fn is_leap_year(year: i16) -> bool {
    let d = if year % 25 != 0 { 4 } else { 16 };
    (year % d) == 0
}

/// Return the number of days in the given month.
#[inline]
pub(crate) const fn days_in_month(year: i16, month: i8) -> i8 {
    if month == 2 {
        if is_leap_year(year) {
            29
        } else {
            28
        }
    } else {
        30 | (month ^ month >> 3)
    }
}

/// Returns the day of the week for the given epoch day, with `0`
/// corresponding to Sunday (the POSIX rule convention).
#[inline]
pub(crate) const fn weekday_from_days(epoch_day: i32) -> i8 {
    // The epoch, 1970-01-01, was a Thursday.
    let r = (epoch_day + 4) % 7;
    (if r < 0 { r + 7 } else { r }) as i8
}

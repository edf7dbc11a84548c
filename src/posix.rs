/*!
Support for POSIX time zone strings.

A TZif v2+ file ends with a footer holding a rule string in the POSIX `TZ`
format, e.g. `EST5EDT,M3.2.0,M11.1.0`. The stored transition table covers
recorded history; the footer rule extrapolates past its final entry. This
module parses such strings (including the IANA v3+ extensions: quoted
abbreviations like `<-0330>` and transition hours in `-167..=167`) and
evaluates them for arbitrary instants.

Two conventions deserve a warning. First, POSIX offsets are written west
positive, so `EST5` means `-05:00`; the parser flips the sign on the way in
and everything downstream of it speaks "seconds east of UTC." Second, the
rule's transition times are wall clock readings: the start of DST is read
off the standard clock and the end of DST off the DST clock. The evaluators
below account for that when converting to UTC.
*/

use std::cell::Cell;

use crate::{
    civil::{self, Fold},
    error::{err, Error},
    util::escape::{Byte, Bytes},
};

/// A parsed POSIX time zone string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PosixTz {
    /// The standard time abbreviation, e.g. `EST`.
    std_abbrev: String,
    /// The standard offset in seconds east of UTC.
    std_offset: i32,
    /// The DST half, if the string has one.
    dst: Option<PosixDst>,
}

/// The DST portion of a POSIX time zone string.
#[derive(Clone, Debug, Eq, PartialEq)]
struct PosixDst {
    abbrev: String,
    /// The DST offset in seconds east of UTC. Defaults to one hour east of
    /// the standard offset when the string omits it.
    offset: i32,
    rule: Rule,
}

/// When DST starts and ends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Rule {
    start: DateTimeSpec,
    end: DateTimeSpec,
}

/// A day-of-year plus a time-of-day at which a transition occurs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct DateTimeSpec {
    date: DateSpec,
    /// Seconds after midnight, possibly negative or beyond one day with the
    /// IANA v3+ extension. Defaults to `02:00:00`.
    time: i32,
}

/// The day at which a transition occurs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DateSpec {
    /// `Jn`: day of a 365-day year, `1..=365`. February 29 is never
    /// selected, even in leap years.
    JulianOne(i16),
    /// `n`: zero-based day of the year, `0..=365`, counting February 29.
    JulianZero(i16),
    /// `Mm.w.d`: the `w`-th occurrence of weekday `d` in month `m`, where
    /// `w = 5` means the last occurrence.
    WeekdayOfMonth { month: i8, week: i8, weekday: i8 },
}

/// The record a tail rule lookup resolves to.
///
/// This is the rule-evaluated analogue of a TZif local time type: an offset,
/// a DST magnitude, an abbreviation borrowed from the parsed string and a
/// DST flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TailRecord<'a> {
    pub(crate) offset: i32,
    pub(crate) save: i32,
    pub(crate) abbrev: &'a str,
    pub(crate) is_dst: bool,
}

impl PosixTz {
    /// Parses a POSIX time zone from the given bytes, requiring the whole
    /// input to be consumed.
    pub(crate) fn parse(bytes: &[u8]) -> Result<PosixTz, Error> {
        let parser = Parser::new(bytes);
        let tz = parser.parse_posix_time_zone()?;
        if !parser.remaining().is_empty() {
            return Err(err!(
                "expected entire TZ string to be a valid POSIX \
                 time zone, but found `{}` after what would otherwise \
                 be a valid POSIX TZ string",
                Bytes(parser.remaining()),
            ));
        }
        Ok(tz)
    }

    /// Returns the record for standard time.
    pub(crate) fn std_record(&self) -> TailRecord<'_> {
        TailRecord {
            offset: self.std_offset,
            save: 0,
            abbrev: &self.std_abbrev,
            is_dst: false,
        }
    }

    fn dst_record<'a>(&'a self, dst: &'a PosixDst) -> TailRecord<'a> {
        TailRecord {
            offset: dst.offset,
            save: dst.offset - self.std_offset,
            abbrev: &dst.abbrev,
            is_dst: true,
        }
    }

    /// Returns the two transition instants for the given year, in UTC, as
    /// `(start_of_dst, end_of_dst)`.
    ///
    /// `start > end` means DST spans the year boundary (common in the
    /// southern hemisphere); the interval then wraps around.
    ///
    /// Returns `None` when there is no DST rule.
    pub(crate) fn transitions_utc(&self, year: i16) -> Option<(i64, i64)> {
        let dst = self.dst.as_ref()?;
        let (start, end) = self.transitions_wall(dst, year);
        // The start of DST happens on the standard clock and the end of DST
        // on the DST clock.
        Some((
            start - i64::from(self.std_offset),
            end - i64::from(dst.offset),
        ))
    }

    /// The raw rule evaluation for a year: `(start, end)` as local
    /// wall-denominated epoch seconds, start read off the standard clock
    /// and end off the DST clock.
    fn transitions_wall(&self, dst: &PosixDst, year: i16) -> (i64, i64) {
        (dst.rule.start.to_wall_epoch(year), dst.rule.end.to_wall_epoch(year))
    }

    /// Looks up the record in effect at the given UTC instant.
    pub(crate) fn lookup_utc(&self, ts: i64) -> TailRecord<'_> {
        self.lookup_utc_with_fold(ts).0
    }

    /// Looks up the record in effect at the given UTC instant, and reports
    /// whether the corresponding wall reading is the repeated occurrence of
    /// an ambiguous time.
    pub(crate) fn lookup_utc_with_fold(
        &self,
        ts: i64,
    ) -> (TailRecord<'_>, Fold) {
        let Some(dst) = self.dst.as_ref() else {
            return (self.std_record(), Fold::Earlier);
        };
        let year = year_of_epoch_second(ts);
        let (start, end) = self
            .transitions_utc(year)
            .expect("transitions exist whenever a DST rule exists");
        let is_dst = in_span(ts, start, end);
        let diff = i64::from(dst.offset - self.std_offset);
        // For positive DST the ambiguous period is one `diff` after the end
        // of DST. (Negative DST is rare enough that no fold is reported for
        // it here, matching how the wall projection of the recorded table
        // behaves at its own negative transitions.)
        let fold = if diff > 0 && end <= ts && ts < end + diff {
            Fold::Later
        } else {
            Fold::Earlier
        };
        let record = if is_dst {
            self.dst_record(dst)
        } else {
            self.std_record()
        };
        (record, fold)
    }

    /// Looks up the record in effect at the given wall reading, taken as
    /// local-denominated epoch seconds, with the given fold.
    pub(crate) fn lookup_wall(&self, ws: i64, fold: Fold) -> TailRecord<'_> {
        let Some(dst) = self.dst.as_ref() else {
            return self.std_record();
        };
        let year = year_of_epoch_second(ws);
        let (mut start, mut end) = self.transitions_wall(dst, year);
        let diff = i64::from(dst.offset - self.std_offset);
        // With fold = 0, the period (denominated in local time) with the
        // smaller offset starts at the end of the gap and ends at the end
        // of the fold; with fold = 1, it runs from the start of the gap to
        // the beginning of the fold. Which boundary moves boils down to
        // fold XOR whether DST is positive.
        if (fold == Fold::Later) == (diff >= 0) {
            end -= diff;
        } else {
            start += diff;
        }
        if in_span(ws, start, end) {
            self.dst_record(dst)
        } else {
            self.std_record()
        }
    }
}

/// Half-open interval membership, wrapping around when `start > end`.
fn in_span(ts: i64, start: i64, end: i64) -> bool {
    if start < end {
        start <= ts && ts < end
    } else {
        !(end <= ts && ts < start)
    }
}

/// Returns the Gregorian year containing the given epoch second.
fn year_of_epoch_second(s: i64) -> i16 {
    let s = s.clamp(civil::TIMESTAMP_MIN, civil::TIMESTAMP_MAX);
    civil::civil_from_days(s.div_euclid(86_400) as i32).0
}

impl DateTimeSpec {
    /// Evaluates this spec in the given year to local-denominated epoch
    /// seconds.
    fn to_wall_epoch(&self, year: i16) -> i64 {
        let jan1 = civil::days_from_civil(year, 1, 1);
        let epoch_day = match self.date {
            DateSpec::JulianOne(n) => {
                let mut doy = i32::from(n) - 1;
                // Day 59 of a 365-day year is March 1. In a leap year the
                // real day-of-year for March 1 and everything after it is
                // one greater, since `Jn` never counts February 29.
                if doy >= 59 && civil::is_leap_year(year) {
                    doy += 1;
                }
                jan1 + doy
            }
            DateSpec::JulianZero(n) => jan1 + i32::from(n),
            DateSpec::WeekdayOfMonth { month, week, weekday } => {
                let first = civil::days_from_civil(year, month, 1);
                let first_weekday = civil::weekday_from_days(first);
                let mut day = (i32::from(weekday)
                    - i32::from(first_weekday))
                .rem_euclid(7)
                    + 1;
                day += (i32::from(week) - 1) * 7;
                // Week 5 means "the last occurrence," so back up when the
                // arithmetic overshoots the month.
                if day > i32::from(civil::days_in_month(year, month)) {
                    day -= 7;
                }
                first + day - 1
            }
        };
        i64::from(epoch_day) * 86_400 + i64::from(self.time)
    }
}

/// A parser for POSIX time zones.
#[derive(Debug)]
struct Parser<'s> {
    /// The `TZ` string that we're parsing.
    tz: &'s [u8],
    /// The parser's current position in `tz`.
    pos: Cell<usize>,
}

impl<'s> Parser<'s> {
    fn new<B: ?Sized + AsRef<[u8]>>(tz: &'s B) -> Parser<'s> {
        Parser { tz: tz.as_ref(), pos: Cell::new(0) }
    }

    /// Parse a POSIX time zone from the current position of the parser.
    ///
    /// Upon success, the parser will be positioned immediately following
    /// the TZ string.
    fn parse_posix_time_zone(&self) -> Result<PosixTz, Error> {
        let std_abbrev = self
            .parse_abbreviation()
            .map_err(|e| err!("failed to parse standard abbreviation: {e}"))?;
        let std_offset = self
            .parse_posix_offset()
            .map_err(|e| err!("failed to parse standard offset: {e}"))?;
        let mut dst = None;
        if !self.is_done()
            && (self.byte().is_ascii_alphabetic() || self.byte() == b'<')
        {
            dst = Some(self.parse_posix_dst(std_offset)?);
        }
        Ok(PosixTz { std_abbrev, std_offset, dst })
    }

    /// Parse a DST zone with an explicit transition rule.
    ///
    /// This assumes the parser is positioned at the first byte of the DST
    /// abbreviation.
    fn parse_posix_dst(&self, std_offset: i32) -> Result<PosixDst, Error> {
        let abbrev = self
            .parse_abbreviation()
            .map_err(|e| err!("failed to parse DST abbreviation: {e}"))?;
        // The default: one hour ahead of standard time. We may override
        // this if the DST portion specifies an offset. (But it usually
        // doesn't.)
        let mut offset = std_offset + 3600;
        if self.is_done() {
            return Err(err!(
                "found DST abbreviation `{abbrev}` in POSIX time zone \
                 string, but no transition rule after it",
            ));
        }
        if self.byte() != b',' {
            offset = self
                .parse_posix_offset()
                .map_err(|e| err!("failed to parse DST offset: {e}"))?;
            if self.is_done() {
                return Err(err!(
                    "found DST abbreviation `{abbrev}` in POSIX time zone \
                     string, but no transition rule after its offset",
                ));
            }
        }
        if self.byte() != b',' {
            return Err(err!(
                "after parsing DST offset in POSIX time zone string, \
                 found `{}` but expected a ','",
                Byte(self.byte()),
            ));
        }
        if !self.bump() {
            return Err(err!(
                "after parsing DST offset in POSIX time zone string, \
                 found end of string after a trailing ','",
            ));
        }
        let rule = self.parse_rule()?;
        Ok(PosixDst { abbrev, offset, rule })
    }

    /// Parse a time zone abbreviation, either unquoted (letters only) or
    /// inside `<...>` quotes (letters, digits and signs).
    ///
    /// The abbreviation must be at least 3 bytes and at most 30.
    fn parse_abbreviation(&self) -> Result<String, Error> {
        if !self.is_done() && self.byte() == b'<' {
            if !self.bump() {
                return Err(err!(
                    "found opening '<' quote for abbreviation in \
                     POSIX time zone string, and expected a name \
                     following it, but found the end of string instead"
                ));
            }
            self.parse_quoted_abbreviation()
        } else {
            self.parse_unquoted_abbreviation()
        }
    }

    fn parse_unquoted_abbreviation(&self) -> Result<String, Error> {
        const MAX_LEN: usize = 30;

        let start = self.pos();
        for i in 0.. {
            if self.is_done() || !self.byte().is_ascii_alphabetic() {
                break;
            }
            if i >= MAX_LEN {
                return Err(err!(
                    "expected abbreviation with at most {MAX_LEN} bytes, \
                     but found a longer abbreviation beginning with `{}`",
                    Bytes(&self.tz[start..start + i]),
                ));
            }
            self.bump();
        }
        let end = self.pos();
        // The loop above only accepts ASCII, so this cannot fail.
        let abbrev = core::str::from_utf8(&self.tz[start..end])
            .expect("abbreviation is ASCII");
        if abbrev.len() < 3 {
            return Err(err!(
                "expected abbreviation with 3 or more bytes, but found \
                 abbreviation {abbrev:?} with {} bytes",
                abbrev.len(),
            ));
        }
        Ok(String::from(abbrev))
    }

    /// Parses a quoted abbreviation, assuming the parser is positioned
    /// immediately after the opening `<`.
    fn parse_quoted_abbreviation(&self) -> Result<String, Error> {
        const MAX_LEN: usize = 30;

        let start = self.pos();
        for i in 0.. {
            if self.is_done()
                || (!self.byte().is_ascii_alphanumeric()
                    && self.byte() != b'+'
                    && self.byte() != b'-')
            {
                break;
            }
            if i >= MAX_LEN {
                return Err(err!(
                    "expected abbreviation with at most {MAX_LEN} bytes, \
                     but found a longer abbreviation beginning with `{}`",
                    Bytes(&self.tz[start..start + i]),
                ));
            }
            self.bump();
        }
        let end = self.pos();
        let abbrev = core::str::from_utf8(&self.tz[start..end])
            .expect("abbreviation is ASCII");
        if self.is_done() {
            return Err(err!(
                "found non-empty quoted abbreviation {abbrev:?}, but \
                 did not find expected end-of-quoted abbreviation \
                 '>' character",
            ));
        }
        if self.byte() != b'>' {
            return Err(err!(
                "found non-empty quoted abbreviation {abbrev:?}, but \
                 found `{}` instead of end-of-quoted abbreviation '>' \
                 character",
                Byte(self.byte()),
            ));
        }
        self.bump();
        if abbrev.len() < 3 {
            return Err(err!(
                "expected abbreviation with 3 or more bytes, but found \
                 abbreviation {abbrev:?} with {} bytes",
                abbrev.len(),
            ));
        }
        Ok(String::from(abbrev))
    }

    /// Parse a POSIX time offset, returning seconds east of UTC.
    ///
    /// Remember that POSIX writes offsets west positive; the sign is
    /// flipped here. `EST5` yields `-18000`.
    fn parse_posix_offset(&self) -> Result<i32, Error> {
        let sign = self
            .parse_optional_sign()
            .map_err(|e| {
                err!(
                    "failed to parse sign for time offset \
                     in POSIX time zone string: {e}",
                )
            })?
            .unwrap_or(1);
        let hour = self.parse_hour_offset()?;
        let (mut minute, mut second) = (0, 0);
        if self.maybe_byte() == Some(b':') {
            if !self.bump() {
                return Err(err!(
                    "incomplete time in POSIX time zone (missing minutes)",
                ));
            }
            minute = self.parse_minute()?;
            if self.maybe_byte() == Some(b':') {
                if !self.bump() {
                    return Err(err!(
                        "incomplete time in POSIX time zone \
                         (missing seconds)",
                    ));
                }
                second = self.parse_second()?;
            }
        }
        let mut seconds = i32::from(hour) * 3600;
        seconds += i32::from(minute) * 60;
        seconds += i32::from(second);
        // Yes, we flip the sign, because POSIX is backwards.
        seconds *= i32::from(-sign);
        Ok(seconds)
    }

    /// Parses a POSIX DST transition rule, i.e., `start[/time],end[/time]`.
    fn parse_rule(&self) -> Result<Rule, Error> {
        let start = self.parse_posix_datetime_spec().map_err(|e| {
            err!("failed to parse start of DST transition rule: {e}")
        })?;
        if self.maybe_byte() != Some(b',') || !self.bump() {
            return Err(err!(
                "expected end of DST rule after parsing the start \
                 of the DST rule"
            ));
        }
        let end = self.parse_posix_datetime_spec().map_err(|e| {
            err!("failed to parse end of DST transition rule: {e}")
        })?;
        Ok(Rule { start, end })
    }

    /// Parses a date specification with an optional `/time` suffix.
    fn parse_posix_datetime_spec(&self) -> Result<DateTimeSpec, Error> {
        let date = self.parse_posix_date_spec()?;
        // The default when the time is absent.
        let mut spec = DateTimeSpec { date, time: 2 * 3600 };
        if self.maybe_byte() != Some(b'/') {
            return Ok(spec);
        }
        if !self.bump() {
            return Err(err!(
                "expected time specification after '/' following a date \
                 specification in a POSIX time zone DST transition rule",
            ));
        }
        spec.time = self.parse_posix_time_spec()?;
        Ok(spec)
    }

    /// Parses a date specification: `J<n>`, `<n>` or `M<m>.<w>.<d>`.
    fn parse_posix_date_spec(&self) -> Result<DateSpec, Error> {
        if self.is_done() {
            return Err(err!(
                "expected a date specification in a POSIX time zone DST \
                 transition rule, but got the end of the string instead",
            ));
        }
        match self.byte() {
            b'J' => {
                if !self.bump() {
                    return Err(err!(
                        "expected one-based Julian day after 'J' in date \
                         specification of a POSIX time zone DST \
                         transition rule, but got the end of the string \
                         instead"
                    ));
                }
                Ok(DateSpec::JulianOne(self.parse_posix_julian_day_no_leap()?))
            }
            b'0'..=b'9' => Ok(DateSpec::JulianZero(
                self.parse_posix_julian_day_with_leap()?,
            )),
            b'M' => {
                if !self.bump() {
                    return Err(err!(
                        "expected month-week-weekday after 'M' in date \
                         specification of a POSIX time zone DST \
                         transition rule, but got the end of the string \
                         instead"
                    ));
                }
                let (month, week, weekday) = self.parse_weekday_of_month()?;
                Ok(DateSpec::WeekdayOfMonth { month, week, weekday })
            }
            _ => Err(err!(
                "expected 'J', a digit or 'M' at the beginning of a date \
                 specification of a POSIX time zone DST transition rule, \
                 but got `{}` instead",
                Byte(self.byte()),
            )),
        }
    }

    fn parse_posix_julian_day_no_leap(&self) -> Result<i16, Error> {
        let number = self
            .parse_number_with_upto_n_digits(3)
            .map_err(|e| err!("invalid one-based Julian day: {e}"))?;
        if !(1..=365).contains(&number) {
            return Err(err!(
                "parsed one-based Julian day `{number}`, \
                 but one-based Julian day in POSIX time zone \
                 must be in range 1..=365",
            ));
        }
        Ok(number as i16)
    }

    fn parse_posix_julian_day_with_leap(&self) -> Result<i16, Error> {
        let number = self
            .parse_number_with_upto_n_digits(3)
            .map_err(|e| err!("invalid zero-based Julian day: {e}"))?;
        if !(0..=365).contains(&number) {
            return Err(err!(
                "parsed zero-based Julian day `{number}`, \
                 but zero-based Julian day in POSIX time zone \
                 must be in range 0..=365",
            ));
        }
        Ok(number as i16)
    }

    /// Parses `m.w.d`, assuming the parser is positioned just after the
    /// `M`. The tuple returned is month (1..=12), week (1..=5) and weekday
    /// (0..=6 with 0=Sunday).
    fn parse_weekday_of_month(&self) -> Result<(i8, i8, i8), Error> {
        let month = self.parse_month()?;
        if self.maybe_byte() != Some(b'.') {
            return Err(err!(
                "expected '.' after month `{month}` in \
                 POSIX time zone rule"
            ));
        }
        if !self.bump() {
            return Err(err!(
                "expected week after month `{month}` in \
                 POSIX time zone rule"
            ));
        }
        let week = self.parse_week()?;
        if self.maybe_byte() != Some(b'.') {
            return Err(err!(
                "expected '.' after week `{week}` in POSIX time zone rule"
            ));
        }
        if !self.bump() {
            return Err(err!(
                "expected day-of-week after week `{week}` in \
                 POSIX time zone rule"
            ));
        }
        let weekday = self.parse_weekday()?;
        Ok((month, week, weekday))
    }

    /// This parses a transition time specification in the format
    /// `[+/-]hh?[:mm[:ss]]`.
    ///
    /// Hours may be signed and range over `-167..=167`, per the IANA v3+
    /// extension to POSIX. (The extension is a strict superset, and GNU
    /// tooling accepts it for plain `TZ` values too, so it is simply always
    /// enabled here.)
    fn parse_posix_time_spec(&self) -> Result<i32, Error> {
        let sign = self
            .parse_optional_sign()
            .map_err(|e| {
                err!(
                    "failed to parse sign for transition time \
                     in POSIX time zone string: {e}",
                )
            })?
            .unwrap_or(1);
        let hour = self.parse_hour_transition()?;
        let (mut minute, mut second) = (0, 0);
        if self.maybe_byte() == Some(b':') {
            if !self.bump() {
                return Err(err!(
                    "incomplete transition time in \
                     POSIX time zone string (missing minutes)",
                ));
            }
            minute = self.parse_minute()?;
            if self.maybe_byte() == Some(b':') {
                if !self.bump() {
                    return Err(err!(
                        "incomplete transition time in \
                         POSIX time zone string (missing seconds)",
                    ));
                }
                second = self.parse_second()?;
            }
        }
        let mut seconds = i32::from(hour) * 3600;
        seconds += i32::from(minute) * 60;
        seconds += i32::from(second);
        seconds *= i32::from(sign);
        Ok(seconds)
    }

    fn parse_month(&self) -> Result<i8, Error> {
        let number = self.parse_number_with_upto_n_digits(2)?;
        if !(1..=12).contains(&number) {
            return Err(err!(
                "parsed month `{number}`, but month in \
                 POSIX time zone must be in range 1..=12",
            ));
        }
        Ok(number as i8)
    }

    fn parse_week(&self) -> Result<i8, Error> {
        let number = self.parse_number_with_exactly_n_digits(1)?;
        if !(1..=5).contains(&number) {
            return Err(err!(
                "parsed week `{number}`, but week in \
                 POSIX time zone must be in range 1..=5"
            ));
        }
        Ok(number as i8)
    }

    fn parse_weekday(&self) -> Result<i8, Error> {
        let number = self.parse_number_with_exactly_n_digits(1)?;
        if !(0..=6).contains(&number) {
            return Err(err!(
                "parsed weekday `{number}`, but weekday in \
                 POSIX time zone must be in range `0..=6` \
                 (with `0` corresponding to Sunday)",
            ));
        }
        Ok(number as i8)
    }

    /// Parses an hour in an offset, `0..=24`. Note that this is stricter
    /// than the hours of a transition time; the v3+ extension applies only
    /// to the latter.
    fn parse_hour_offset(&self) -> Result<i8, Error> {
        let number = self
            .parse_number_with_upto_n_digits(2)
            .map_err(|e| err!("invalid hour digits: {e}"))?;
        if !(0..=24).contains(&number) {
            return Err(err!(
                "parsed hour `{number}`, but hour in \
                 POSIX time zone offset must be in range `0..=24`",
            ));
        }
        Ok(number as i8)
    }

    /// Parses an hour in a transition time, `0..=167`. The sign is parsed
    /// by the caller.
    fn parse_hour_transition(&self) -> Result<i16, Error> {
        let number = self
            .parse_number_with_upto_n_digits(3)
            .map_err(|e| err!("invalid hour digits: {e}"))?;
        if !(0..=167).contains(&number) {
            // The error message says -167 but the check above uses 0. This
            // is because the caller is responsible for parsing the sign.
            return Err(err!(
                "parsed hour `{number}`, but hour in a POSIX time zone \
                 transition time must be in range `-167..=167`",
            ));
        }
        Ok(number as i16)
    }

    fn parse_minute(&self) -> Result<i8, Error> {
        let number = self
            .parse_number_with_exactly_n_digits(2)
            .map_err(|e| err!("invalid minute digits: {e}"))?;
        if !(0..=59).contains(&number) {
            return Err(err!(
                "parsed minute `{number}`, but minute in \
                 POSIX time zone must be in range `0..=59`",
            ));
        }
        Ok(number as i8)
    }

    fn parse_second(&self) -> Result<i8, Error> {
        let number = self
            .parse_number_with_exactly_n_digits(2)
            .map_err(|e| err!("invalid second digits: {e}"))?;
        if !(0..=59).contains(&number) {
            return Err(err!(
                "parsed second `{number}`, but second in \
                 POSIX time zone must be in range `0..=59`",
            ));
        }
        Ok(number as i8)
    }

    /// Parses an integer expressed in exactly `n` digits.
    fn parse_number_with_exactly_n_digits(
        &self,
        n: usize,
    ) -> Result<i32, Error> {
        assert!(n >= 1, "numbers must have at least 1 digit");
        let mut number: i32 = 0;
        for i in 0..n {
            if self.is_done() {
                return Err(err!("expected {n} digits, but found {i}"));
            }
            let byte = self.byte();
            if !byte.is_ascii_digit() {
                return Err(err!(
                    "invalid digit, expected 0-9 but got {}",
                    Byte(byte),
                ));
            }
            number = number * 10 + i32::from(byte - b'0');
            self.bump();
        }
        Ok(number)
    }

    /// Parses an integer expressed with up to `n` digits and at least 1
    /// digit.
    fn parse_number_with_upto_n_digits(&self, n: usize) -> Result<i32, Error> {
        assert!(n >= 1, "numbers must have at least 1 digit");
        let mut number: i32 = 0;
        for i in 0..n {
            if self.is_done() || !self.byte().is_ascii_digit() {
                if i == 0 {
                    return Err(err!("invalid number, no digits found"));
                }
                break;
            }
            number = number * 10 + i32::from(self.byte() - b'0');
            self.bump();
        }
        Ok(number)
    }

    /// Parses an optional sign.
    ///
    /// If one exists, it is consumed, and this guarantees that it is not
    /// the last byte in the input.
    fn parse_optional_sign(&self) -> Result<Option<i8>, Error> {
        if self.is_done() {
            return Ok(None);
        }
        Ok(match self.byte() {
            b'-' => {
                if !self.bump() {
                    return Err(err!(
                        "expected digit after '-' sign, \
                         but got end of input",
                    ));
                }
                Some(-1)
            }
            b'+' => {
                if !self.bump() {
                    return Err(err!(
                        "expected digit after '+' sign, \
                         but got end of input",
                    ));
                }
                Some(1)
            }
            _ => None,
        })
    }
}

/// Helper routines for moving through the TZ string.
impl<'s> Parser<'s> {
    /// Bump the parser to the next byte.
    ///
    /// If the end of the input has been reached, then `false` is returned.
    fn bump(&self) -> bool {
        if self.is_done() {
            return false;
        }
        self.pos.set(
            self.pos().checked_add(1).expect("pos cannot overflow usize"),
        );
        !self.is_done()
    }

    /// Returns true if all input has been consumed.
    fn is_done(&self) -> bool {
        self.pos() == self.tz.len()
    }

    /// Return the byte at the current position of the parser.
    ///
    /// This panics if the parser is positioned at the end of the TZ string.
    fn byte(&self) -> u8 {
        self.tz[self.pos()]
    }

    /// Return the byte at the current position of the parser. If the TZ
    /// string has been exhausted, then this returns `None`.
    fn maybe_byte(&self) -> Option<u8> {
        self.tz.get(self.pos()).copied()
    }

    /// Return the current byte offset of the parser.
    fn pos(&self) -> usize {
        self.pos.get()
    }

    /// Returns the remaining bytes of the TZ string.
    fn remaining(&self) -> &'s [u8] {
        &self.tz[self.pos()..]
    }
}

impl core::fmt::Display for PosixTz {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write_abbrev(f, &self.std_abbrev)?;
        write_posix_offset(f, self.std_offset)?;
        if let Some(ref dst) = self.dst {
            write_abbrev(f, &dst.abbrev)?;
            // One hour ahead of standard time is the default, so only an
            // unusual DST offset is written out.
            if dst.offset != self.std_offset + 3600 {
                write_posix_offset(f, dst.offset)?;
            }
            write!(f, ",{},{}", dst.rule.start, dst.rule.end)?;
        }
        Ok(())
    }
}

impl core::fmt::Display for DateTimeSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.date {
            DateSpec::JulianOne(n) => write!(f, "J{n}")?,
            DateSpec::JulianZero(n) => write!(f, "{n}")?,
            DateSpec::WeekdayOfMonth { month, week, weekday } => {
                write!(f, "M{month}.{week}.{weekday}")?
            }
        }
        if self.time != 2 * 3600 {
            let (sign, time) =
                if self.time < 0 { ("-", -self.time) } else { ("", self.time) };
            let (h, m, s) = (time / 3600, (time / 60) % 60, time % 60);
            write!(f, "/{sign}{h}")?;
            if m != 0 || s != 0 {
                write!(f, ":{m:02}")?;
                if s != 0 {
                    write!(f, ":{s:02}")?;
                }
            }
        }
        Ok(())
    }
}

fn write_abbrev(
    f: &mut core::fmt::Formatter,
    abbrev: &str,
) -> core::fmt::Result {
    if abbrev.chars().all(|c| c.is_ascii_alphabetic()) {
        write!(f, "{abbrev}")
    } else {
        write!(f, "<{abbrev}>")
    }
}

/// Writes an offset in the POSIX convention: sign flipped, minutes and
/// seconds only when nonzero.
fn write_posix_offset(
    f: &mut core::fmt::Formatter,
    offset: i32,
) -> core::fmt::Result {
    // Yes, this is backwards. Blame POSIX. `+` is the default and is
    // omitted.
    if offset > 0 {
        write!(f, "-")?;
    }
    let offset = offset.abs();
    let (h, m, s) = (offset / 3600, (offset / 60) % 60, offset % 60);
    write!(f, "{h}")?;
    if m != 0 || s != 0 {
        write!(f, ":{m:02}")?;
        if s != 0 {
            write!(f, ":{s:02}")?;
        }
    }
    Ok(())
}

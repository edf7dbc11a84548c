/*!
The [`TimeZone`] type and the lookups it answers.

A `TimeZone` is an immutable, cheaply cloneable handle to parsed TZif data.
It answers two questions. Given an instant, what offset, DST magnitude and
abbreviation apply? And given a wall clock reading plus a [`Fold`], the same
question in the other direction, where transitions make some readings
ambiguous and others nonexistent.

Both lookups are a binary search over precomputed arrays, followed by a
fall-through to the footer's POSIX rule for anything past the recorded
table. The [`TzInfo`] trait is the protocol surface a calendar library
would dispatch through; it is implemented for `TimeZone` and, for
fixed-offset zones, for [`Offset`] itself.
*/

use std::{
    hash::{Hash, Hasher},
    io::Read,
    path::PathBuf,
    sync::Arc,
};

use crate::{
    cache,
    civil::{DateTime, Fold, Offset, Timestamp, OFFSET_MAX, OFFSET_MIN},
    db,
    error::Error,
    posix::TailRecord,
    tzif::{LeapSecond, Tzif},
};

/// An IANA time zone.
///
/// A `TimeZone` is constructed from a key like `America/Chicago` (resolved
/// against the search path and cached, see [`TimeZone::get`]) or directly
/// from TZif bytes (see [`TimeZone::from_tzif`]). Once constructed it is
/// immutable: lookups never fail, never block and are safe to run from any
/// number of threads. Cloning is cheap and clones share the underlying
/// data.
///
/// ```no_run
/// use zoneinfo::{DateTime, Fold, TimeZone};
///
/// let tz = TimeZone::get("America/Chicago")?;
/// let info = tz.to_offset_info_wall(
///     DateTime::constant(2020, 11, 1, 1, 0, 0),
///     Fold::Earlier,
/// );
/// assert_eq!(info.offset().seconds(), -5 * 3600);
/// assert_eq!(info.abbreviation(), "CDT");
/// # Ok::<(), zoneinfo::Error>(())
/// ```
#[derive(Clone)]
pub struct TimeZone {
    inner: Arc<ZoneInner>,
}

/// The shared innards of a `TimeZone`.
///
/// The cache hands out `Arc`s of this directly, which is what makes "two
/// `get` calls for one key yield one zone" an identity guarantee and not
/// just an equality one.
pub(crate) struct ZoneInner {
    key: Option<String>,
    /// Where the data came from, when it came from a file.
    path: Option<PathBuf>,
    /// Whether this value was produced through the cached path.
    from_cache: bool,
    tzif: Tzif,
}

impl ZoneInner {
    /// Resolves `key` on the search path, reads the file and parses it.
    ///
    /// All I/O happens here, before anything is inserted anywhere, so a
    /// failed load leaves no trace.
    pub(crate) fn load(key: &str, from_cache: bool) -> Result<ZoneInner, Error> {
        let (path, bytes) = db::load(key)?;
        debug!("loaded time zone {key} from {}", path.display());
        let tzif = Tzif::parse(&bytes)
            .map_err(|e| e.context(&format!("{}", path.display())))?;
        Ok(ZoneInner {
            key: Some(key.to_string()),
            path: Some(path),
            from_cache,
            tzif,
        })
    }
}

impl TimeZone {
    /// Returns the time zone for the given key, e.g. `America/Chicago`.
    ///
    /// The key is resolved to a TZif file via the search path (see
    /// [`tzpath`](crate::tzpath)). Repeated calls with one key return the
    /// same underlying zone without re-reading the file, for as long as
    /// the cache retains it.
    pub fn get(key: &str) -> Result<TimeZone, Error> {
        Ok(TimeZone { inner: cache::get(key)? })
    }

    /// Like [`TimeZone::get`], but bypasses the cache in both directions:
    /// nothing is read from it and the freshly built zone is not inserted
    /// into it.
    pub fn no_cache(key: &str) -> Result<TimeZone, Error> {
        Ok(TimeZone { inner: Arc::new(ZoneInner::load(key, false)?) })
    }

    /// Parses the given bytes as TZif data.
    ///
    /// The key given is attached to the zone returned but is otherwise not
    /// significant; no search path or cache is involved. It is safe to
    /// pass arbitrary or even untrusted bytes to this function.
    pub fn from_tzif(key: Option<&str>, bytes: &[u8]) -> Result<TimeZone, Error> {
        let tzif = Tzif::parse(bytes)?;
        Ok(TimeZone {
            inner: Arc::new(ZoneInner {
                key: key.map(str::to_string),
                path: None,
                from_cache: false,
                tzif,
            }),
        })
    }

    /// Reads TZif data from the given stream and parses it.
    ///
    /// Like [`TimeZone::from_tzif`], this bypasses the search path and the
    /// cache.
    pub fn from_reader<R: Read>(
        key: Option<&str>,
        mut rdr: R,
    ) -> Result<TimeZone, Error> {
        let mut bytes = Vec::new();
        rdr.read_to_end(&mut bytes)
            .map_err(|e| Error::io("failed to read TZif stream", e))?;
        TimeZone::from_tzif(key, &bytes)
    }

    /// Empties both tiers of the zone cache.
    ///
    /// Zones already handed out are unaffected; the next [`TimeZone::get`]
    /// for any key re-reads its file.
    pub fn clear_cache() {
        cache::clear();
    }

    /// Removes only the given keys from the zone cache.
    pub fn clear_cache_only(keys: &[&str]) {
        cache::clear_only(keys);
    }

    /// Returns the key this zone was constructed with, if any.
    pub fn key(&self) -> Option<&str> {
        self.inner.key.as_deref()
    }

    /// Returns true when `self` and `other` are handles to the same
    /// underlying zone value, as opposed to merely comparing equal.
    ///
    /// Two [`TimeZone::get`] calls for one key return the same instance
    /// while the cache retains it; [`TimeZone::no_cache`] always builds a
    /// distinct one.
    pub fn same_instance(&self, other: &TimeZone) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the leap-second table recorded in the TZif data.
    ///
    /// The table is carried through verbatim; nothing in this crate
    /// applies it.
    pub fn leap_seconds(&self) -> &[LeapSecond] {
        &self.inner.tzif.leap_seconds
    }

    /// Returns the offset from UTC in effect at the given instant.
    pub fn to_offset(&self, timestamp: Timestamp) -> Offset {
        self.to_offset_info(timestamp).offset()
    }

    /// Returns the offset, DST magnitude and abbreviation in effect at
    /// the given instant.
    pub fn to_offset_info(&self, timestamp: Timestamp) -> OffsetInfo<'_> {
        let z = &self.inner.tzif;
        let t = timestamp.as_second();
        let n = z.trans_utc.len();
        if n > 0 && t < z.trans_utc[0] {
            return self.type_info(z.type_before);
        }
        if n == 0 || t >= z.trans_utc[n - 1] {
            if let Some(ref tz) = z.posix_tz {
                return self.record_info(tz.lookup_utc(t));
            }
            // RFC 8536 leaves instants past the last transition of a file
            // with no footer rule unspecified. The last recorded type is
            // the only reasonable answer.
            return match z.trans_types.last() {
                Some(&ti) => self.type_info(usize::from(ti)),
                None => self.type_info(z.type_before),
            };
        }
        let idx = z.trans_utc.partition_point(|&x| x <= t) - 1;
        self.type_info(usize::from(z.trans_types[idx]))
    }

    /// Returns the offset, DST magnitude and abbreviation in effect at
    /// the given wall clock reading, disambiguated by `fold`.
    ///
    /// Around a backward transition some readings occur twice: `fold`
    /// selects the first or the repeated occurrence. Around a forward
    /// transition some readings never occur: `fold` selects whether the
    /// nonexistent reading is interpreted with the offset in force before
    /// or after the jump.
    pub fn to_offset_info_wall(
        &self,
        dt: DateTime,
        fold: Fold,
    ) -> OffsetInfo<'_> {
        let z = &self.inner.tzif;
        let ws = dt.to_epoch_second();
        let lt = &z.trans_wall[fold.index()];
        let n = lt.len();
        if n > 0 && ws < lt[0] {
            return self.type_info(z.type_before);
        }
        if n == 0 || ws > lt[n - 1] {
            return match z.posix_tz {
                Some(ref tz) => self.record_info(tz.lookup_wall(ws, fold)),
                None => match z.trans_types.last() {
                    Some(&ti) => self.type_info(usize::from(ti)),
                    None => self.type_info(z.type_before),
                },
            };
        }
        let idx = lt.partition_point(|&x| x <= ws) - 1;
        self.type_info(usize::from(z.trans_types[idx]))
    }

    /// Converts a UTC-denominated wall reading into this zone's local
    /// wall reading, together with the fold that reading lands on.
    ///
    /// This is the operation a calendar library uses to turn "this
    /// datetime, which I promise is UTC" into local time: the produced
    /// fold is `Later` exactly when the local reading is the repeated
    /// occurrence of an ambiguous time, so converting the result back
    /// through [`TimeZone::to_offset_info_wall`] recovers the original
    /// instant.
    pub fn from_utc(&self, utc: DateTime) -> (DateTime, Fold) {
        let z = &self.inner.tzif;
        let t = utc.to_epoch_second();
        let n = z.trans_utc.len();
        let (offset, fold) = if n >= 1 && t < z.trans_utc[0] {
            (z.types[z.type_before].offset, Fold::Earlier)
        } else if (n == 0 || t > z.trans_utc[n - 1]) && z.posix_tz.is_some() {
            // Past the recorded table the footer rule answers, with or
            // without a DST clause, exactly as in the instant-indexed
            // lookup.
            let (rec, fold) = z
                .posix_tz
                .as_ref()
                .expect("checked above")
                .lookup_utc_with_fold(t);
            (rec.offset, fold)
        } else if n == 0 {
            (z.types[z.type_before].offset, Fold::Earlier)
        } else {
            let idx = z.trans_utc.partition_point(|&x| x <= t);
            // `idx >= 1` because `t >= trans_utc[0]` here.
            let this = usize::from(z.trans_types[idx - 1]);
            let prev_offset = if idx >= 2 {
                z.types[usize::from(z.trans_types[idx - 2])].offset
            } else {
                z.types[z.type_before].offset
            };
            // The reading is a repeat when it is still within one
            // backward-shift's worth of seconds after the transition.
            let shift = i64::from(prev_offset - z.types[this].offset);
            let fold = if shift > t - z.trans_utc[idx - 1] {
                Fold::Later
            } else {
                Fold::Earlier
            };
            (z.types[this].offset, fold)
        };
        (DateTime::from_epoch_second(t + i64::from(offset)), fold)
    }

    fn type_info(&self, type_index: usize) -> OffsetInfo<'_> {
        let z = &self.inner.tzif;
        let typ = &z.types[type_index];
        OffsetInfo {
            offset: clamped_offset(typ.offset),
            dst: clamped_offset(typ.save),
            abbreviation: z.designation(typ),
        }
    }

    fn record_info<'t>(&self, rec: TailRecord<'t>) -> OffsetInfo<'t> {
        OffsetInfo {
            offset: clamped_offset(rec.offset),
            dst: clamped_offset(rec.save),
            abbreviation: rec.abbrev,
        }
    }
}

/// `Offset` construction that cannot panic on adversarial data: derived
/// DST magnitudes are differences of two valid offsets and can exceed the
/// valid range themselves.
fn clamped_offset(seconds: i32) -> Offset {
    Offset::constant_seconds(seconds.clamp(OFFSET_MIN, OFFSET_MAX))
}

impl Eq for TimeZone {}

/// Two zones are equal when they have the same key and were parsed from
/// byte-for-byte identical data.
impl PartialEq for TimeZone {
    fn eq(&self, other: &TimeZone) -> bool {
        self.inner.key == other.inner.key
            && self.inner.tzif.checksum == other.inner.tzif.checksum
    }
}

impl Hash for TimeZone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.key.hash(state);
    }
}

impl core::fmt::Display for TimeZone {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.key().unwrap_or("<unnamed time zone>"))
    }
}

impl core::fmt::Debug for TimeZone {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut d = f.debug_struct("TimeZone");
        d.field("key", &self.inner.key);
        if let Some(ref path) = self.inner.path {
            d.field("path", path);
        }
        d.field("version", &self.inner.tzif.version);
        d.field("from_cache", &self.inner.from_cache);
        d.finish_non_exhaustive()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeZone {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self.key() {
            Some(key) => serializer.serialize_str(key),
            None => Err(serde::ser::Error::custom(
                "cannot serialize a time zone that has no key",
            )),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeZone {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<TimeZone, D::Error> {
        struct KeyVisitor;

        impl<'de> serde::de::Visitor<'de> for KeyVisitor {
            type Value = TimeZone;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("an IANA time zone key")
            }

            fn visit_str<E: serde::de::Error>(
                self,
                value: &str,
            ) -> Result<TimeZone, E> {
                TimeZone::get(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

/// The answer to a lookup: the offset from UTC, the DST magnitude and the
/// zone abbreviation in effect at the queried point.
///
/// The abbreviation borrows from the zone it came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OffsetInfo<'z> {
    offset: Offset,
    dst: Offset,
    abbreviation: &'z str,
}

impl<'z> OffsetInfo<'z> {
    /// The total offset from UTC, DST included when it applies.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// The DST component of the offset. Zero when standard time applies.
    ///
    /// TZif does not record this; see the crate documentation for how it
    /// is reconstructed.
    pub fn dst(&self) -> Offset {
        self.dst
    }

    /// Whether daylight saving time applies, equivalent to
    /// `self.dst() != 0`.
    pub fn is_dst(&self) -> bool {
        !self.dst.is_zero()
    }

    /// The zone abbreviation, e.g. `CDT`.
    pub fn abbreviation(&self) -> &'z str {
        self.abbreviation
    }
}

/// A time zone abbreviation, possibly borrowed from a zone.
///
/// Abbreviations from TZif-backed zones borrow from the zone's
/// designation pool; fixed-offset zones format theirs on demand.
/// Equality compares the text, not the representation.
#[derive(Clone, Debug)]
pub enum Abbreviation<'t> {
    /// An abbreviation borrowed out of a zone's data.
    Borrowed(&'t str),
    /// An abbreviation that had to be built, e.g. `UTC+05:30`.
    Owned(Box<str>),
}

impl<'t> Abbreviation<'t> {
    /// Returns this abbreviation as a string slice.
    pub fn as_str(&self) -> &str {
        match *self {
            Abbreviation::Borrowed(s) => s,
            Abbreviation::Owned(ref s) => s,
        }
    }
}

impl<'t> AsRef<str> for Abbreviation<'t> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<'t> Eq for Abbreviation<'t> {}

impl<'t> PartialEq for Abbreviation<'t> {
    fn eq(&self, other: &Abbreviation<'t>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<'t> PartialEq<str> for Abbreviation<'t> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<'t> PartialEq<&str> for Abbreviation<'t> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<'t> core::fmt::Display for Abbreviation<'t> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The time zone protocol: the capability set a calendar library
/// dispatches through.
///
/// Wall-denominated operations take the local reading plus a [`Fold`];
/// [`TzInfo::from_utc`] goes the other way and reports the fold itself.
/// Implemented by [`TimeZone`] and, for fixed-offset zones, by
/// [`Offset`].
pub trait TzInfo {
    /// The offset from UTC at the given wall reading.
    fn utc_offset(&self, dt: DateTime, fold: Fold) -> Offset;

    /// The DST component of the offset at the given wall reading. Zero
    /// when standard time applies.
    fn dst(&self, dt: DateTime, fold: Fold) -> Offset;

    /// The abbreviation at the given wall reading.
    fn tzname(&self, dt: DateTime, fold: Fold) -> Abbreviation<'_>;

    /// Converts a UTC-denominated wall reading to this zone's local
    /// reading and its fold.
    fn from_utc(&self, utc: DateTime) -> (DateTime, Fold);
}

impl TzInfo for TimeZone {
    fn utc_offset(&self, dt: DateTime, fold: Fold) -> Offset {
        self.to_offset_info_wall(dt, fold).offset()
    }

    fn dst(&self, dt: DateTime, fold: Fold) -> Offset {
        self.to_offset_info_wall(dt, fold).dst()
    }

    fn tzname(&self, dt: DateTime, fold: Fold) -> Abbreviation<'_> {
        Abbreviation::Borrowed(self.to_offset_info_wall(dt, fold).abbreviation)
    }

    fn from_utc(&self, utc: DateTime) -> (DateTime, Fold) {
        TimeZone::from_utc(self, utc)
    }
}

/// A fixed offset is itself a (trivial) time zone: no DST, no
/// transitions, an abbreviation in the `UTC±HH:MM` style.
impl TzInfo for Offset {
    fn utc_offset(&self, _dt: DateTime, _fold: Fold) -> Offset {
        *self
    }

    fn dst(&self, _dt: DateTime, _fold: Fold) -> Offset {
        Offset::UTC
    }

    fn tzname(&self, _dt: DateTime, _fold: Fold) -> Abbreviation<'_> {
        if self.is_zero() {
            Abbreviation::Borrowed("UTC")
        } else {
            Abbreviation::Owned(format!("UTC{self}").into_boxed_str())
        }
    }

    fn from_utc(&self, utc: DateTime) -> (DateTime, Fold) {
        let second = utc.to_epoch_second() + i64::from(self.seconds());
        (DateTime::from_epoch_second(second), Fold::Earlier)
    }
}

#[cfg(test)]
mod tests {
    use crate::testdata;

    use super::*;

    fn zone(key: &str, data: &testdata::TestZone) -> TimeZone {
        TimeZone::from_tzif(Some(key), &data.to_bytes()).unwrap()
    }

    fn dt(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
    ) -> DateTime {
        DateTime::constant(year, month, day, hour, minute, second)
    }

    #[test]
    fn minsk_1992() {
        let tz = zone("Europe/Minsk", &testdata::minsk());

        let info = tz.to_offset_info_wall(dt(1992, 3, 1, 0, 0, 0), Fold::Earlier);
        assert_eq!(info.offset().seconds(), 2 * 3600);
        assert_eq!(info.abbreviation(), "EET");
        assert!(!info.is_dst());

        // Ninety days later the clocks have sprung forward.
        let info = tz.to_offset_info_wall(dt(1992, 5, 30, 0, 0, 0), Fold::Earlier);
        assert_eq!(info.offset().seconds(), 3 * 3600);
        assert_eq!(info.abbreviation(), "EEST");
        assert_eq!(info.dst().seconds(), 3600);

        // And through the protocol trait.
        assert_eq!(
            tz.tzname(dt(1992, 3, 1, 0, 0, 0), Fold::Earlier),
            "EET",
        );
        assert_eq!(
            tz.utc_offset(dt(1992, 5, 30, 0, 0, 0), Fold::Earlier).seconds(),
            3 * 3600,
        );
    }

    #[test]
    fn before_any_transition() {
        let tz = zone("Europe/Minsk", &testdata::minsk());
        // 1985 predates the table; the first standard type (MSK) governs.
        let info = tz.to_offset_info(Timestamp::from_second(473385600));
        assert_eq!(info.abbreviation(), "MSK");
        assert_eq!(info.offset().seconds(), 3 * 3600);
        let info = tz.to_offset_info_wall(dt(1985, 1, 1, 0, 0, 0), Fold::Later);
        assert_eq!(info.abbreviation(), "MSK");
    }

    #[test]
    fn past_the_table_with_no_footer() {
        let tz = zone("Europe/Minsk", &testdata::minsk());
        // The synthetic Minsk table ends in late 1992 with EET and has an
        // empty footer, so everything after it answers EET.
        let info = tz.to_offset_info(Timestamp::from_second(1_600_000_000));
        assert_eq!(info.abbreviation(), "EET");
        let info = tz.to_offset_info_wall(dt(2021, 6, 1, 0, 0, 0), Fold::Earlier);
        assert_eq!(info.abbreviation(), "EET");
    }

    #[test]
    fn chicago_fall_back_folds() {
        let tz = zone("America/Chicago", &testdata::chicago());
        let reading = dt(2020, 11, 1, 1, 0, 0);

        let first = tz.to_offset_info_wall(reading, Fold::Earlier);
        assert_eq!(first.offset().seconds(), -5 * 3600);
        assert_eq!(first.abbreviation(), "CDT");
        assert_eq!(first.dst().seconds(), 3600);

        let second = tz.to_offset_info_wall(reading, Fold::Later);
        assert_eq!(second.offset().seconds(), -6 * 3600);
        assert_eq!(second.abbreviation(), "CST");
        assert!(!second.is_dst());

        // Converting each interpretation to UTC lands one hour apart.
        let wall = reading.to_epoch_second();
        assert_eq!(wall - i64::from(first.offset().seconds()), 1604210400);
        assert_eq!(wall - i64::from(second.offset().seconds()), 1604214000);
    }

    #[test]
    fn chicago_spring_forward_gap() {
        let tz = zone("America/Chicago", &testdata::chicago());
        // 2020-03-08T02:30 never happened.
        let reading = dt(2020, 3, 8, 2, 30, 0);
        let info = tz.to_offset_info_wall(reading, Fold::Earlier);
        assert_eq!(info.abbreviation(), "CST");
        let info = tz.to_offset_info_wall(reading, Fold::Later);
        assert_eq!(info.abbreviation(), "CDT");
    }

    #[test]
    fn chicago_from_utc() {
        let tz = zone("America/Chicago", &testdata::chicago());

        let (local, fold) = tz.from_utc(dt(2020, 11, 1, 6, 0, 0));
        assert_eq!(local, dt(2020, 11, 1, 1, 0, 0));
        assert_eq!(fold, Fold::Earlier);

        let (local, fold) = tz.from_utc(dt(2020, 11, 1, 7, 0, 0));
        assert_eq!(local, dt(2020, 11, 1, 1, 0, 0));
        assert_eq!(fold, Fold::Later);

        let (local, fold) = tz.from_utc(dt(2020, 11, 1, 7, 59, 59));
        assert_eq!(local, dt(2020, 11, 1, 1, 59, 59));
        assert_eq!(fold, Fold::Later);

        let (local, fold) = tz.from_utc(dt(2020, 11, 1, 8, 0, 0));
        assert_eq!(local, dt(2020, 11, 1, 2, 0, 0));
        assert_eq!(fold, Fold::Earlier);

        // The instant right at a spring-forward transition maps to the
        // post-jump reading unambiguously.
        let (local, fold) = tz.from_utc(dt(2020, 3, 8, 8, 0, 0));
        assert_eq!(local, dt(2020, 3, 8, 3, 0, 0));
        assert_eq!(fold, Fold::Earlier);
    }

    #[test]
    fn wall_utc_round_trips() {
        let tz = zone("America/Chicago", &testdata::chicago());
        // Unambiguous, first-of-a-fold, repeated and post-gap readings.
        let cases = [
            (dt(2020, 7, 4, 12, 0, 0), Fold::Earlier),
            (dt(2020, 11, 1, 1, 30, 0), Fold::Earlier),
            (dt(2020, 11, 1, 1, 30, 0), Fold::Later),
            (dt(2020, 3, 8, 3, 0, 0), Fold::Earlier),
            (dt(2019, 11, 3, 1, 15, 0), Fold::Later),
        ];
        for (reading, fold) in cases {
            let info = tz.to_offset_info_wall(reading, fold);
            let utc_second = reading.to_epoch_second()
                - i64::from(info.offset().seconds());
            let (back, back_fold) =
                tz.from_utc(DateTime::from_epoch_second(utc_second));
            assert_eq!((back, back_fold), (reading, fold), "via {info:?}");
        }
    }

    #[test]
    fn kiritimati_skips_a_day() {
        let tz = zone("Pacific/Kiritimati", &testdata::kiritimati());
        // December 31, 1994 never existed on Kiritimati. A reading on the
        // skipped day projects according to the fold.
        let reading = dt(1994, 12, 31, 12, 0, 0);
        let info = tz.to_offset_info_wall(reading, Fold::Earlier);
        assert_eq!(info.offset().seconds(), -38400);
        assert_eq!(info.abbreviation(), "-1040");
        let info = tz.to_offset_info_wall(reading, Fold::Later);
        assert_eq!(info.offset().seconds(), 50400);
        assert_eq!(info.abbreviation(), "+14");

        // Readings on either side of the skipped day are unambiguous.
        for fold in [Fold::Earlier, Fold::Later] {
            let info = tz.to_offset_info_wall(dt(1994, 12, 30, 23, 0, 0), fold);
            assert_eq!(info.offset().seconds(), -38400);
            let info = tz.to_offset_info_wall(dt(1995, 1, 1, 1, 0, 0), fold);
            assert_eq!(info.offset().seconds(), 50400);
        }

        // UTC-indexed lookups around the jump.
        let info = tz.to_offset_info(Timestamp::from_second(788870399));
        assert_eq!(info.abbreviation(), "-1040");
        let info = tz.to_offset_info(Timestamp::from_second(788870400));
        assert_eq!(info.abbreviation(), "+14");

        // Past the table, from_utc answers from the std-only footer rule.
        let (local, fold) = tz.from_utc(dt(1995, 6, 1, 0, 0, 0));
        assert_eq!(local, dt(1995, 6, 1, 14, 0, 0));
        assert_eq!(fold, Fold::Earlier);
    }

    #[test]
    fn std_only_tail_rule_governs_from_utc() {
        // A footer with no DST clause whose offset and abbreviation
        // disagree with the last recorded type. Nothing in the format
        // forbids this, and past the table the footer wins, on every
        // lookup path.
        let data = testdata::TestZone {
            types: &[(-3600, false, "OLD")],
            transitions: &[(0, 0)],
            footer: "NEWT-2",
        };
        let tz = TimeZone::from_tzif(Some("Test/Tail"), &data.to_bytes())
            .unwrap();

        let info = tz.to_offset_info(Timestamp::from_second(1_000_000));
        assert_eq!(info.offset().seconds(), 2 * 3600);
        assert_eq!(info.abbreviation(), "NEWT");

        let (local, fold) = tz.from_utc(dt(2024, 6, 1, 12, 0, 0));
        assert_eq!(local, dt(2024, 6, 1, 14, 0, 0));
        assert_eq!(fold, Fold::Earlier);

        // And the wall lookup agrees, so the round trip holds.
        let info = tz.to_offset_info_wall(local, fold);
        assert_eq!(info.offset().seconds(), 2 * 3600);
        assert_eq!(info.abbreviation(), "NEWT");
        let utc_second =
            local.to_epoch_second() - i64::from(info.offset().seconds());
        assert_eq!(utc_second, dt(2024, 6, 1, 12, 0, 0).to_epoch_second());

        // Before the last transition the recorded table still governs.
        let info = tz.to_offset_info(Timestamp::from_second(-1));
        assert_eq!(info.abbreviation(), "OLD");
    }

    #[test]
    fn utc_is_always_utc() {
        let tz = zone("Etc/UTC", &testdata::utc());
        for second in [i64::MIN / 4, -1, 0, 1, 1_600_000_000, i64::MAX / 4] {
            let info = tz.to_offset_info(Timestamp::from_second(second));
            assert_eq!(info.offset().seconds(), 0);
            assert_eq!(info.dst().seconds(), 0);
            assert_eq!(info.abbreviation(), "UTC");
        }
        for fold in [Fold::Earlier, Fold::Later] {
            let info = tz.to_offset_info_wall(dt(2024, 6, 1, 12, 0, 0), fold);
            assert_eq!(info.offset().seconds(), 0);
            assert_eq!(info.abbreviation(), "UTC");
        }
        let (local, fold) = tz.from_utc(dt(2024, 6, 1, 12, 0, 0));
        assert_eq!(local, dt(2024, 6, 1, 12, 0, 0));
        assert_eq!(fold, Fold::Earlier);
    }

    #[test]
    fn tail_rule_resolves_2050_gap() {
        let tz = zone("America/New_York", &testdata::est5edt());
        // 2050-03-13T02:00 local is a gap, far past the recorded table,
        // so only the footer rule can resolve it.
        let reading = dt(2050, 3, 13, 2, 30, 0);
        let info = tz.to_offset_info_wall(reading, Fold::Earlier);
        assert_eq!(info.offset().seconds(), -5 * 3600);
        assert_eq!(info.abbreviation(), "EST");
        let info = tz.to_offset_info_wall(reading, Fold::Later);
        assert_eq!(info.offset().seconds(), -4 * 3600);
        assert_eq!(info.abbreviation(), "EDT");
        assert_eq!(info.dst().seconds(), 3600);
    }

    #[test]
    fn tail_rule_resolves_2050_overlap() {
        let tz = zone("America/New_York", &testdata::est5edt());
        let reading = dt(2050, 11, 6, 1, 30, 0);
        let info = tz.to_offset_info_wall(reading, Fold::Earlier);
        assert_eq!(info.offset().seconds(), -4 * 3600);
        assert_eq!(info.abbreviation(), "EDT");
        let info = tz.to_offset_info_wall(reading, Fold::Later);
        assert_eq!(info.offset().seconds(), -5 * 3600);
        assert_eq!(info.abbreviation(), "EST");

        // And the corresponding UTC instants land on either side of the
        // repeated hour, with the fold reported by from_utc.
        let (local, fold) = tz.from_utc(dt(2050, 11, 6, 5, 30, 0));
        assert_eq!(local, dt(2050, 11, 6, 1, 30, 0));
        assert_eq!(fold, Fold::Earlier);
        let (local, fold) = tz.from_utc(dt(2050, 11, 6, 6, 30, 0));
        assert_eq!(local, dt(2050, 11, 6, 1, 30, 0));
        assert_eq!(fold, Fold::Later);
        let (local, fold) = tz.from_utc(dt(2050, 11, 6, 7, 0, 0));
        assert_eq!(local, dt(2050, 11, 6, 2, 0, 0));
        assert_eq!(fold, Fold::Earlier);
    }

    #[test]
    fn tail_rule_utc_lookups() {
        let tz = zone("America/New_York", &testdata::est5edt());
        // Midsummer and midwinter 2049, both far past the table.
        let info = tz.to_offset_info(Timestamp::from_second(2508000000));
        assert_eq!(info.abbreviation(), "EDT");
        assert_eq!(info.dst().seconds(), 3600);
        let info = tz.to_offset_info(Timestamp::from_second(2493000000));
        assert_eq!(info.abbreviation(), "EST");
        assert_eq!(info.dst().seconds(), 0);
    }

    #[test]
    fn offsets_stay_in_tzif_bounds() {
        for data in [
            testdata::minsk(),
            testdata::chicago(),
            testdata::kiritimati(),
            testdata::utc(),
            testdata::est5edt(),
        ] {
            let tz = zone("Test/Bounds", &data);
            for second in
                [-3_000_000_000, -1, 0, 800_000_000, 1_600_000_000, 2_600_000_000]
            {
                let info = tz.to_offset_info(Timestamp::from_second(second));
                let seconds = info.offset().seconds();
                assert!((-89_999..=93_599).contains(&seconds));
                assert_eq!(info.is_dst(), info.dst().seconds() != 0);
            }
        }
    }

    #[test]
    fn equality_is_key_plus_bytes() {
        let minsk = testdata::minsk().to_bytes();
        let a = TimeZone::from_tzif(Some("Europe/Minsk"), &minsk).unwrap();
        let b = TimeZone::from_tzif(Some("Europe/Minsk"), &minsk).unwrap();
        assert_eq!(a, b);
        assert!(!a.same_instance(&b));

        let renamed = TimeZone::from_tzif(Some("Else/Where"), &minsk).unwrap();
        assert_ne!(a, renamed);

        let other_bytes = testdata::chicago().to_bytes();
        let other = TimeZone::from_tzif(Some("Europe/Minsk"), &other_bytes);
        assert_ne!(a, other.unwrap());

        let clone = a.clone();
        assert!(a.same_instance(&clone));
        assert_eq!(a, clone);
    }

    #[test]
    fn display_and_debug() {
        let tz = zone("Europe/Minsk", &testdata::minsk());
        assert_eq!(tz.to_string(), "Europe/Minsk");
        let debug = format!("{tz:?}");
        assert!(debug.contains("Europe/Minsk"), "{debug}");

        let anon =
            TimeZone::from_tzif(None, &testdata::utc().to_bytes()).unwrap();
        assert_eq!(anon.to_string(), "<unnamed time zone>");
    }

    #[test]
    fn from_reader_matches_from_tzif() {
        let bytes = testdata::chicago().to_bytes();
        let a = TimeZone::from_tzif(Some("America/Chicago"), &bytes).unwrap();
        let b = TimeZone::from_reader(
            Some("America/Chicago"),
            std::io::Cursor::new(bytes),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_offset_zones() {
        let offset = Offset::constant_seconds(19800);
        assert_eq!(offset.utc_offset(dt(2024, 1, 1, 0, 0, 0), Fold::Earlier), offset);
        assert_eq!(offset.dst(dt(2024, 1, 1, 0, 0, 0), Fold::Earlier), Offset::UTC);
        assert_eq!(offset.tzname(dt(2024, 1, 1, 0, 0, 0), Fold::Earlier), "UTC+05:30");
        assert_eq!(Offset::UTC.tzname(dt(2024, 1, 1, 0, 0, 0), Fold::Earlier), "UTC");
        let (local, fold) = offset.from_utc(dt(2024, 1, 1, 0, 0, 0));
        assert_eq!(local, dt(2024, 1, 1, 5, 30, 0));
        assert_eq!(fold, Fold::Earlier);
    }

    #[test]
    fn protocol_objects_are_interchangeable() {
        let chicago = zone("America/Chicago", &testdata::chicago());
        let fixed = Offset::constant_seconds(-6 * 3600);
        let zones: [&dyn TzInfo; 2] = [&chicago, &fixed];
        for tz in zones {
            let off = tz.utc_offset(dt(2020, 1, 15, 12, 0, 0), Fold::Earlier);
            assert_eq!(off.seconds(), -6 * 3600);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_serializes_the_key() {
        let tz = zone("Europe/Minsk", &testdata::minsk());
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/Minsk\"");

        let anon =
            TimeZone::from_tzif(None, &testdata::utc().to_bytes()).unwrap();
        assert!(serde_json::to_string(&anon).is_err());
    }
}

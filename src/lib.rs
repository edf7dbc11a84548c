/*!
An IANA time zone library.

This crate reads compiled time zone data in the TZif format ([RFC 8536]),
the format of the files under `/usr/share/zoneinfo` on Unix systems, and
answers the two questions a calendar library needs answered: *at instant
T, what UTC offset, DST offset and abbreviation apply?* and *at wall clock
reading W with fold F, same question?*

```no_run
use zoneinfo::{DateTime, Fold, Timestamp, TimeZone, TzInfo};

let tz = TimeZone::get("America/Chicago")?;

// An instant-indexed lookup.
let info = tz.to_offset_info(Timestamp::from_second(1604210400));
assert_eq!(info.offset().seconds(), -5 * 3600);
assert_eq!(info.abbreviation(), "CDT");

// A wall-clock lookup. 2020-11-01T01:00 happened twice in Chicago; the
// fold picks the occurrence.
let reading = DateTime::constant(2020, 11, 1, 1, 0, 0);
assert_eq!(tz.utc_offset(reading, Fold::Earlier).seconds(), -5 * 3600);
assert_eq!(tz.utc_offset(reading, Fold::Later).seconds(), -6 * 3600);
# Ok::<(), zoneinfo::Error>(())
```

# Construction and caching

[`TimeZone::get`] resolves a key against the search path (see
[`tzpath`]), parses the file and caches the result. The cache has a weak
tier, so concurrent users of one key share one zone instance, and a small
strong tier (default 8 entries, see [`set_cache_capacity`]) so that
transiently dropping every handle to a popular zone doesn't force a
re-parse. [`TimeZone::no_cache`] bypasses the cache entirely, and
[`TimeZone::from_tzif`]/[`TimeZone::from_reader`] parse raw data without
touching the search path at all.

Zones are immutable once built: lookups never fail, never allocate beyond
handing out references and are freely usable across threads.

# Beyond the recorded table

TZif files record a finite transition table. For instants past the last
recorded transition, v2+ files carry a POSIX TZ rule string (e.g.
`EST5EDT,M3.2.0,M11.1.0`) in their footer, and lookups fall through to
evaluating that rule, gaps, folds and all.

# Derived data

Two things every lookup relies on are not in the file and are computed at
parse time:

* TZif stores, per local time type, only the total offset and a DST flag;
  the *magnitude* of the DST shift (what a `dst()` query reports) is
  reconstructed by comparing each DST type with a neighboring standard
  type at the transitions where they meet, falling back to one hour for
  the handful of historical zones where no such neighbor exists.
* Transition instants are projected into local wall time twice, once per
  fold, which turns ambiguous-reading disambiguation into a plain binary
  search.

# Crate features

* `logging`: emit diagnostics through the [`log`] crate facade, e.g. when
  TZif data is clamped or a search path entry is ignored.
* `serde`: serialize a [`TimeZone`] as its key and deserialize it back
  through the cache.

[RFC 8536]: https://datatracker.ietf.org/doc/html/rfc8536
*/

#![deny(missing_docs)]

#[macro_use]
mod logging;

mod cache;
mod civil;
mod db;
mod error;
mod posix;
#[cfg(test)]
mod testdata;
mod timezone;
mod tzif;
mod util;

pub use crate::{
    civil::{DateTime, Fold, Offset, Timestamp},
    db::{reset_tzpath, set_tzpath, tzpath},
    error::Error,
    timezone::{Abbreviation, OffsetInfo, TimeZone, TzInfo},
    tzif::LeapSecond,
};

/// Sets the capacity of the strong tier of the zone cache.
///
/// The default is 8. A capacity of 0 disables strong retention entirely,
/// leaving only weakly held entries; zones currently held elsewhere are
/// unaffected.
pub fn set_cache_capacity(capacity: usize) {
    cache::set_capacity(capacity);
}

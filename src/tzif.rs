/*!
Support for TZif binary files from the [Time Zone Database].

These binary files are the ones commonly found in Unix distributions in the
`/usr/share/zoneinfo` directory. The format is specified by RFC 8536.

Parsing happens in two stages. First, the file is decoded exactly as it is
laid out on disk: headers, transition times, local time type records, the
abbreviation pool, the leap-second table, the indicator bytes and the
footer. Second, two pieces of derived data are computed that the format
does not store: the DST magnitude of each DST type (recovered with a
heuristic, see [`Tzif::derive_dst_offsets`]) and the transition instants
projected into local wall time once per fold (see
[`Tzif::project_wall_times`]), which is what makes wall-clock lookups a
binary search instead of an arithmetic dance.

[Time Zone Database]: https://www.iana.org/time-zones
*/

use crate::{
    civil::{OFFSET_MAX, OFFSET_MIN, TIMESTAMP_MAX, TIMESTAMP_MIN},
    error::{err, Error},
    posix::PosixTz,
    util::{crc32, escape::Bytes},
};

/// A fully decoded TZif file, with derived data filled in.
#[derive(Debug)]
pub(crate) struct Tzif {
    /// The format version: 1, 2 or 3. Unrecognized version bytes are read
    /// as 2, with a warning.
    pub(crate) version: u8,
    /// CRC-32 of the bytes this value was parsed from. Zones parsed from
    /// identical bytes, and only those, compare equal.
    pub(crate) checksum: u32,
    /// The raw NUL-separated abbreviation pool.
    pub(crate) designations: String,
    pub(crate) types: Vec<LocalTimeType>,
    /// Transition instants in seconds since the epoch, strictly increasing.
    pub(crate) trans_utc: Vec<i64>,
    /// The local time type that takes effect at each transition.
    pub(crate) trans_types: Vec<u8>,
    /// The transitions projected into local wall seconds, one array per
    /// fold. Monotone non-decreasing; entries may tie around a gap or an
    /// overlap.
    pub(crate) trans_wall: [Vec<i64>; 2],
    /// Index of the type governing instants before the first transition.
    pub(crate) type_before: usize,
    pub(crate) leap_seconds: Vec<LeapSecond>,
    /// The footer rule, when the footer is nonempty.
    pub(crate) posix_tz: Option<PosixTz>,
}

/// A single local time type.
///
/// This is what transition times map to: an offset, a DST flag and an
/// abbreviation. The DST magnitude in `save` is not part of the file; it
/// is reconstructed after parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct LocalTimeType {
    /// Seconds east of UTC.
    pub(crate) offset: i32,
    /// The DST magnitude in seconds. Zero for standard types. For DST
    /// types this is derived, and the invariant `is_dst == (save != 0)`
    /// holds once derivation has run.
    pub(crate) save: i32,
    pub(crate) is_dst: bool,
    /// Byte range of this type's abbreviation in the designation pool.
    designation: (u8, u8),
    /// The std/wall and UT/local indicator. Parsed and validated, but
    /// otherwise ignored, which is what every implementation surveyed
    /// does with it.
    #[allow(dead_code)]
    indicator: Indicator,
}

/// One leap-second record: the occurrence instant and the total
/// correction in effect from it.
///
/// The table is carried on the zone but does not participate in any
/// arithmetic here.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LeapSecond {
    occurrence: i64,
    correction: i32,
}

impl LeapSecond {
    /// The instant, in seconds since the epoch, at which this correction
    /// takes effect.
    pub fn occurrence(&self) -> i64 {
        self.occurrence
    }

    /// The accumulated UTC-minus-TAI style correction, in seconds.
    pub fn correction(&self) -> i32 {
        self.correction
    }
}

/// The std/wall plus UT/local indicator combinations admitted by RFC 8536.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Indicator {
    LocalWall,
    LocalStandard,
    UTStandard,
}

impl Tzif {
    /// Parses the given data as a TZif formatted file.
    ///
    /// In general, callers may assume that it is safe to pass arbitrary or
    /// even untrusted data to this function and count on it not panicking
    /// or using resources that aren't limited to a small constant factor
    /// of the size of the data itself.
    pub(crate) fn parse(bytes: &[u8]) -> Result<Tzif, Error> {
        let (header32, rest) = Header::parse(4, bytes)
            .map_err(|e| e.context("invalid 32-bit TZif header"))?;
        let (mut tzif, rest) = if header32.version == 1 {
            Tzif::parse32(header32, rest)?
        } else {
            Tzif::parse64(header32, rest)?
        };
        tzif.check_transitions_sorted()?;
        tzif.clamp_transitions();
        tzif.derive_dst_offsets();
        tzif.type_before = tzif.select_type_before();
        tzif.project_wall_times();
        // Fingerprint everything that was actually consumed, so that
        // trailing junk doesn't distinguish otherwise identical data.
        let consumed = bytes.len() - rest.len();
        tzif.checksum = crc32::sum(&bytes[..consumed]);
        Ok(tzif)
    }

    fn empty(version: u8) -> Tzif {
        Tzif {
            version,
            checksum: 0,
            designations: String::new(),
            types: Vec::new(),
            trans_utc: Vec::new(),
            trans_types: Vec::new(),
            trans_wall: [Vec::new(), Vec::new()],
            type_before: 0,
            leap_seconds: Vec::new(),
            posix_tz: None,
        }
    }

    fn parse32(header: Header, bytes: &[u8]) -> Result<(Tzif, &[u8]), Error> {
        let mut tzif = Tzif::empty(header.version);
        let rest = tzif.parse_data_block(&header, bytes)?;
        Ok((tzif, rest))
    }

    fn parse64(
        header32: Header,
        bytes: &[u8],
    ) -> Result<(Tzif, &[u8]), Error> {
        // Skip the v1 data block; the 64-bit block is authoritative.
        let (_, rest) =
            try_split_at("v1 TZif", bytes, header32.data_block_len()?)?;
        let (header64, rest) = Header::parse(8, rest)
            .map_err(|e| e.context("invalid 64-bit TZif header"))?;
        let mut tzif = Tzif::empty(header64.version);
        let rest = tzif.parse_data_block(&header64, rest)?;
        let rest = tzif.parse_footer(rest)?;
        Ok((tzif, rest))
    }

    /// Parses all sections of one data block, in file order.
    fn parse_data_block<'b>(
        &mut self,
        header: &Header,
        bytes: &'b [u8],
    ) -> Result<&'b [u8], Error> {
        let rest = self.parse_transitions(header, bytes)?;
        let rest = self.parse_transition_types(header, rest)?;
        let rest = self.parse_local_time_types(header, rest)?;
        let rest = self.parse_time_zone_designations(header, rest)?;
        let rest = self.parse_leap_seconds(header, rest)?;
        let rest = self.parse_indicators(header, rest)?;
        Ok(rest)
    }

    fn parse_transitions<'b>(
        &mut self,
        header: &Header,
        bytes: &'b [u8],
    ) -> Result<&'b [u8], Error> {
        let (bytes, rest) = try_split_at(
            "transition times",
            bytes,
            header.transition_times_len()?,
        )?;
        let mut it = bytes.chunks_exact(header.time_size);
        while let Some(chunk) = it.next() {
            let timestamp = if header.is_32bit() {
                i64::from(from_be_bytes_i32(chunk))
            } else {
                from_be_bytes_i64(chunk)
            };
            self.trans_utc.push(timestamp);
        }
        assert!(it.remainder().is_empty());
        Ok(rest)
    }

    fn parse_transition_types<'b>(
        &mut self,
        header: &Header,
        bytes: &'b [u8],
    ) -> Result<&'b [u8], Error> {
        let (bytes, rest) = try_split_at(
            "transition types",
            bytes,
            header.transition_types_len(),
        )?;
        for &type_index in bytes {
            if usize::from(type_index) >= header.tzh_typecnt {
                return Err(err!(
                    "found time zone transition type index {type_index} \
                     that exceeds the number of local time types \
                     {typecnt}",
                    typecnt = header.tzh_typecnt,
                ));
            }
            self.trans_types.push(type_index);
        }
        Ok(rest)
    }

    fn parse_local_time_types<'b>(
        &mut self,
        header: &Header,
        bytes: &'b [u8],
    ) -> Result<&'b [u8], Error> {
        let (bytes, rest) = try_split_at(
            "local time types",
            bytes,
            header.local_time_types_len()?,
        )?;
        let mut it = bytes.chunks_exact(6);
        while let Some(chunk) = it.next() {
            let offset = from_be_bytes_i32(&chunk[..4]);
            if !(OFFSET_MIN <= offset && offset <= OFFSET_MAX) {
                return Err(err!(
                    "found local time type with out-of-bounds time zone \
                     offset: {offset}, the allowed range is \
                     `{OFFSET_MIN}..={OFFSET_MAX}`"
                ));
            }
            let is_dst = chunk[4] == 1;
            if usize::from(chunk[5]) >= header.tzh_charcnt {
                return Err(err!(
                    "found local time type whose abbreviation index \
                     {index} exceeds the size of the designation pool \
                     {charcnt}",
                    index = chunk[5],
                    charcnt = header.tzh_charcnt,
                ));
            }
            self.types.push(LocalTimeType {
                offset,
                save: 0,
                is_dst,
                designation: (chunk[5], chunk[5]),
                indicator: Indicator::LocalWall,
            });
        }
        assert!(it.remainder().is_empty());
        Ok(rest)
    }

    fn parse_time_zone_designations<'b>(
        &mut self,
        header: &Header,
        bytes: &'b [u8],
    ) -> Result<&'b [u8], Error> {
        let (bytes, rest) = try_split_at(
            "time zone designations",
            bytes,
            header.time_zone_designations_len(),
        )?;
        self.designations =
            String::from_utf8(bytes.to_vec()).map_err(|_| {
                err!("found invalid UTF-8 in time zone designations")
            })?;
        // Slice every type's abbreviation out of the pool now, so lookups
        // never have to think about NUL terminators again.
        for typ in self.types.iter_mut() {
            let start = usize::from(typ.designation.0);
            let suffix = self.designations.get(start..).ok_or_else(|| {
                err!(
                    "found time zone designator with invalid start {start}",
                )
            })?;
            let len = suffix.find('\x00').ok_or_else(|| {
                err!(
                    "could not find NUL terminator for time zone \
                     designator starting at offset {start}",
                )
            })?;
            let end = start + len;
            typ.designation.1 = u8::try_from(end).map_err(|_| {
                err!("found time zone designator with invalid end {end}")
            })?;
        }
        Ok(rest)
    }

    /// Parses the leap-second corrections.
    ///
    /// These are retained on the zone but never applied; this crate, like
    /// nearly everything else, does arithmetic in Unix time.
    fn parse_leap_seconds<'b>(
        &mut self,
        header: &Header,
        bytes: &'b [u8],
    ) -> Result<&'b [u8], Error> {
        let (bytes, rest) = try_split_at(
            "leap seconds",
            bytes,
            header.leap_second_len()?,
        )?;
        let chunk_len = header.time_size + 4;
        let mut it = bytes.chunks_exact(chunk_len);
        while let Some(chunk) = it.next() {
            let (occur_bytes, corr_bytes) = chunk.split_at(header.time_size);
            let occurrence = if header.is_32bit() {
                i64::from(from_be_bytes_i32(occur_bytes))
            } else {
                from_be_bytes_i64(occur_bytes)
            };
            let correction = from_be_bytes_i32(corr_bytes);
            self.leap_seconds.push(LeapSecond { occurrence, correction });
        }
        assert!(it.remainder().is_empty());
        Ok(rest)
    }

    fn parse_indicators<'b>(
        &mut self,
        header: &Header,
        bytes: &'b [u8],
    ) -> Result<&'b [u8], Error> {
        let (std_wall_bytes, rest) = try_split_at(
            "standard/wall indicators",
            bytes,
            header.standard_wall_len(),
        )?;
        let (ut_local_bytes, rest) = try_split_at(
            "UT/local indicators",
            rest,
            header.ut_local_len(),
        )?;
        if std_wall_bytes.is_empty() && !ut_local_bytes.is_empty() {
            // Only legal if every UT/local indicator is zero, since a 1
            // would require the corresponding std/wall indicator to be 1
            // too. And there aren't any.
            if ut_local_bytes.iter().any(|&byte| byte != 0) {
                return Err(err!(
                    "found non-zero UT/local indicator with no \
                     corresponding standard/wall indicators",
                ));
            }
        } else if !std_wall_bytes.is_empty() && ut_local_bytes.is_empty() {
            for (i, &byte) in std_wall_bytes.iter().enumerate() {
                // Indexing is OK because the header guarantees that the
                // number of indicators is 0 or equal to the number of
                // types.
                self.types[i].indicator = match byte {
                    0 => Indicator::LocalWall,
                    1 => Indicator::LocalStandard,
                    _ => {
                        return Err(err!(
                            "found invalid std/wall indicator, \
                             expected it to be 0 or 1",
                        ))
                    }
                };
            }
        } else if !std_wall_bytes.is_empty() && !ut_local_bytes.is_empty() {
            assert_eq!(std_wall_bytes.len(), ut_local_bytes.len());
            let it = std_wall_bytes.iter().zip(ut_local_bytes);
            for (i, (&stdwall, &utlocal)) in it.enumerate() {
                self.types[i].indicator = match (stdwall, utlocal) {
                    (0, 0) => Indicator::LocalWall,
                    (1, 0) => Indicator::LocalStandard,
                    (1, 1) => Indicator::UTStandard,
                    (0, 1) => {
                        return Err(err!(
                            "found invalid UT-wall combination for local \
                             time type, only local-wall, local-standard \
                             and UT-standard are allowed",
                        ))
                    }
                    _ => {
                        return Err(err!(
                            "found invalid std/wall or UT/local value \
                             for local time type, each must be 0 or 1",
                        ))
                    }
                };
            }
        }
        Ok(rest)
    }

    fn parse_footer<'b>(&mut self, bytes: &'b [u8]) -> Result<&'b [u8], Error> {
        if bytes.is_empty() {
            return Err(err!(
                "expected to find `\\n` at the beginning of the TZif \
                 file footer, but found unexpected end of data",
            ));
        }
        if bytes[0] != b'\n' {
            return Err(err!(
                "expected to find `\\n` at the beginning of the TZif \
                 file footer, but found `{}` instead",
                Bytes(&bytes[..1]),
            ));
        }
        let bytes = &bytes[1..];
        // Only scan up to 1KB for a terminator in case we somehow got
        // passed a huge block of bytes.
        let toscan = &bytes[..bytes.len().min(1024)];
        let nlat = toscan.iter().position(|&b| b == b'\n').ok_or_else(|| {
            err!(
                "expected to find `\\n` terminating the TZif file footer, \
                 but no line terminator could be found",
            )
        })?;
        let (tz_string, rest) = bytes.split_at(nlat);
        if !tz_string.is_empty() {
            // Strictly, the v3+ extensions are not allowed in a V2 footer,
            // but they are a strict superset of the POSIX rules and GNU
            // tooling accepts them everywhere, so no version check is
            // made here.
            let posix_tz = PosixTz::parse(tz_string)
                .map_err(|e| e.context("invalid POSIX TZ string in footer"))?;
            self.posix_tz = Some(posix_tz);
        }
        Ok(&rest[1..])
    }

    fn check_transitions_sorted(&self) -> Result<(), Error> {
        for window in self.trans_utc.windows(2) {
            if window[0] >= window[1] {
                return Err(err!(
                    "found transition time {next} that does not come \
                     strictly after its predecessor {prev}",
                    prev = window[0],
                    next = window[1],
                ));
            }
        }
        Ok(())
    }

    /// Clamps transition instants to the supported timestamp range.
    ///
    /// Some zones carry a sentinel first transition near the minimum
    /// 64-bit value. Rejecting such files outright would be useless
    /// strictness, so the instants are clamped instead.
    fn clamp_transitions(&mut self) {
        for timestamp in self.trans_utc.iter_mut() {
            if *timestamp < TIMESTAMP_MIN || *timestamp > TIMESTAMP_MAX {
                let clamped = (*timestamp).clamp(TIMESTAMP_MIN, TIMESTAMP_MAX);
                warn!(
                    "found Unix timestamp `{timestamp}` outside the \
                     supported range, clamping to `{clamped}`",
                );
                *timestamp = clamped;
            }
        }
    }

    /// Derives the DST magnitude of every DST type.
    ///
    /// TZif stores only the total offset and a DST flag per type; the
    /// magnitude of the shift has to be reconstructed by comparing a DST
    /// type's offset against a neighboring standard type at some
    /// transition where they meet. It is not sufficient to just compare
    /// against the zone's most recent standard offset, because
    /// occasionally a zone shifts both its DST offset and its base offset
    /// at once.
    ///
    /// So: for the first transition into each DST type, take the
    /// difference against the predecessor's type when that one is
    /// standard. Failing that (the predecessor is DST too, or the
    /// difference is zero), take the difference against the successor's
    /// type when that one is standard, and otherwise defer to a later
    /// transition into the same type. One pass only; any DST type still
    /// unresolved after it gets one hour, which is a far better guess
    /// than zero and keeps `is_dst == (save != 0)` observable.
    fn derive_dst_offsets(&mut self) {
        let dst_count =
            self.types.iter().filter(|typ| typ.is_dst).count();
        let mut dst_found = 0;
        for i in 1..self.trans_types.len() {
            if dst_found == dst_count {
                break;
            }
            let this = usize::from(self.trans_types[i]);
            if !self.types[this].is_dst {
                continue;
            }
            // Skip any types that have already been resolved.
            if self.types[this].save != 0 {
                continue;
            }
            let mut save = 0;
            let prev = usize::from(self.trans_types[i - 1]);
            if !self.types[prev].is_dst {
                save = self.types[this].offset - self.types[prev].offset;
            }
            if save == 0 && i + 1 < self.trans_types.len() {
                let next = usize::from(self.trans_types[i + 1]);
                if self.types[next].is_dst {
                    // Wedged between two DST types. Hope a later
                    // transition into this type is better positioned.
                    continue;
                }
                save = self.types[this].offset - self.types[next].offset;
            }
            if save != 0 {
                dst_found += 1;
                self.types[this].save = save;
            }
        }
        for typ in self.types.iter_mut() {
            if typ.is_dst && typ.save == 0 {
                typ.save = 3600;
            }
        }
    }

    /// Selects the type governing instants before the first transition:
    /// the type of the first transition into standard time, else the type
    /// of the first transition, else type 0.
    fn select_type_before(&self) -> usize {
        for &type_index in self.trans_types.iter() {
            if !self.types[usize::from(type_index)].is_dst {
                return usize::from(type_index);
            }
        }
        match self.trans_types.first() {
            Some(&type_index) => usize::from(type_index),
            None => 0,
        }
    }

    /// Projects every transition instant into local wall seconds, once
    /// per fold.
    ///
    /// Around a transition two offsets are in play, so a single instant
    /// has two candidate wall readings. Projecting with the larger offset
    /// gives the array for fold 0 and with the smaller the array for
    /// fold 1: at an overlap that makes fold 0 resolve to the first
    /// occurrence of a repeated reading and fold 1 to the repeat, and at
    /// a gap it makes fold 0 project a nonexistent reading with the
    /// pre-jump offset and fold 1 with the post-jump offset.
    fn project_wall_times(&mut self) {
        let n = self.trans_utc.len();
        let mut wall0 = Vec::with_capacity(n);
        let mut wall1 = Vec::with_capacity(n);
        for i in 0..n {
            let prev = if i == 0 {
                self.type_before
            } else {
                usize::from(self.trans_types[i - 1])
            };
            let this = usize::from(self.trans_types[i]);
            let prev_offset = i64::from(self.types[prev].offset);
            let this_offset = i64::from(self.types[this].offset);
            let timestamp = self.trans_utc[i];
            wall0.push(timestamp + prev_offset.max(this_offset));
            wall1.push(timestamp + prev_offset.min(this_offset));
        }
        self.trans_wall = [wall0, wall1];
    }

    /// Returns the abbreviation of the given local time type.
    pub(crate) fn designation(&self, typ: &LocalTimeType) -> &str {
        let (start, end) = typ.designation;
        // OK because designation ranges were validated against the pool
        // when the types were parsed.
        &self.designations[usize::from(start)..usize::from(end)]
    }
}

/// The header for a TZif formatted file.
///
/// V2+ TZif files have two: one describing the legacy 32-bit data block,
/// and a second following that block describing the 64-bit data block.
/// Both use the same layout.
#[derive(Debug)]
struct Header {
    /// The size in bytes of the timestamps in the data block this header
    /// describes. Guaranteed to be 4 or 8.
    time_size: usize,
    /// The decoded version: 1, 2 or 3.
    version: u8,
    /// Number of UT/local indicators. Zero or equal to `tzh_typecnt`.
    tzh_ttisutcnt: usize,
    /// Number of standard/wall indicators. Zero or equal to `tzh_typecnt`.
    tzh_ttisstdcnt: usize,
    tzh_leapcnt: usize,
    tzh_timecnt: usize,
    /// Number of local time types. At least 1.
    tzh_typecnt: usize,
    /// Bytes of abbreviation data. At least 1.
    tzh_charcnt: usize,
}

impl Header {
    /// Parse the header record from the given bytes.
    ///
    /// Upon success, return the header and all bytes after it.
    fn parse(time_size: usize, bytes: &[u8]) -> Result<(Header, &[u8]), Error> {
        assert!(time_size == 4 || time_size == 8, "time size must be 4 or 8");
        if bytes.len() < 44 {
            return Err(err!("too short"));
        }
        let (magic, rest) = bytes.split_at(4);
        if magic != b"TZif" {
            return Err(err!("magic bytes mismatch"));
        }
        let (version_byte, rest) = rest.split_at(1);
        let version = match version_byte[0] {
            0 => 1,
            b'2' => 2,
            b'3' => 3,
            _unknown => {
                // Newer versions are supersets of version 2, so reading
                // them as such beats failing the whole load.
                warn!(
                    "unsupported TZif version byte `{}`, reading as \
                     version 2",
                    crate::util::escape::Byte(_unknown),
                );
                2
            }
        };
        let (_reserved, rest) = rest.split_at(15);

        let (tzh_ttisutcnt_bytes, rest) = rest.split_at(4);
        let (tzh_ttisstdcnt_bytes, rest) = rest.split_at(4);
        let (tzh_leapcnt_bytes, rest) = rest.split_at(4);
        let (tzh_timecnt_bytes, rest) = rest.split_at(4);
        let (tzh_typecnt_bytes, rest) = rest.split_at(4);
        let (tzh_charcnt_bytes, rest) = rest.split_at(4);

        let tzh_ttisutcnt =
            from_be_bytes_count("tzh_ttisutcnt", tzh_ttisutcnt_bytes)?;
        let tzh_ttisstdcnt =
            from_be_bytes_count("tzh_ttisstdcnt", tzh_ttisstdcnt_bytes)?;
        let tzh_leapcnt =
            from_be_bytes_count("tzh_leapcnt", tzh_leapcnt_bytes)?;
        let tzh_timecnt =
            from_be_bytes_count("tzh_timecnt", tzh_timecnt_bytes)?;
        let tzh_typecnt =
            from_be_bytes_count("tzh_typecnt", tzh_typecnt_bytes)?;
        let tzh_charcnt =
            from_be_bytes_count("tzh_charcnt", tzh_charcnt_bytes)?;

        if tzh_ttisutcnt != 0 && tzh_ttisutcnt != tzh_typecnt {
            return Err(err!(
                "expected number of UT/local indicators to be zero or \
                 equal to the number of local time types",
            ));
        }
        if tzh_ttisstdcnt != 0 && tzh_ttisstdcnt != tzh_typecnt {
            return Err(err!(
                "expected number of standard/wall indicators to be zero \
                 or equal to the number of local time types",
            ));
        }
        if tzh_typecnt < 1 {
            return Err(err!(
                "expected number of local time types to be at least 1",
            ));
        }
        if tzh_charcnt < 1 {
            return Err(err!(
                "expected number of time zone abbreviation bytes to be \
                 at least 1",
            ));
        }

        let header = Header {
            time_size,
            version,
            tzh_ttisutcnt,
            tzh_ttisstdcnt,
            tzh_leapcnt,
            tzh_timecnt,
            tzh_typecnt,
            tzh_charcnt,
        };
        Ok((header, rest))
    }

    /// Returns true if this header is for a 32-bit data block.
    fn is_32bit(&self) -> bool {
        self.time_size == 4
    }

    /// Returns the size of the data block, in bytes, for this header.
    ///
    /// This returns an error if the arithmetic required to compute the
    /// length would overflow.
    fn data_block_len(&self) -> Result<usize, Error> {
        let a = self.transition_times_len()?;
        let b = self.transition_types_len();
        let c = self.local_time_types_len()?;
        let d = self.time_zone_designations_len();
        let e = self.leap_second_len()?;
        let f = self.standard_wall_len();
        let g = self.ut_local_len();
        a.checked_add(b)
            .and_then(|z| z.checked_add(c))
            .and_then(|z| z.checked_add(d))
            .and_then(|z| z.checked_add(e))
            .and_then(|z| z.checked_add(f))
            .and_then(|z| z.checked_add(g))
            .ok_or_else(|| err!("length of data block in TZif file is too big"))
    }

    fn transition_times_len(&self) -> Result<usize, Error> {
        self.tzh_timecnt
            .checked_mul(self.time_size)
            .ok_or_else(|| err!("number of transition times is too big"))
    }

    fn transition_types_len(&self) -> usize {
        self.tzh_timecnt
    }

    fn local_time_types_len(&self) -> Result<usize, Error> {
        self.tzh_typecnt
            .checked_mul(6)
            .ok_or_else(|| err!("number of local time types is too big"))
    }

    fn time_zone_designations_len(&self) -> usize {
        self.tzh_charcnt
    }

    fn leap_second_len(&self) -> Result<usize, Error> {
        let record_len = self.time_size + 4;
        self.tzh_leapcnt
            .checked_mul(record_len)
            .ok_or_else(|| err!("number of leap seconds is too big"))
    }

    fn standard_wall_len(&self) -> usize {
        self.tzh_ttisstdcnt
    }

    fn ut_local_len(&self) -> usize {
        self.tzh_ttisutcnt
    }
}

/// Splits the given slice of bytes at the index given, or errors when the
/// slice is too short. `what` names the data block being split, for the
/// error message.
fn try_split_at<'b>(
    what: &'static str,
    bytes: &'b [u8],
    at: usize,
) -> Result<(&'b [u8], &'b [u8]), Error> {
    if at > bytes.len() {
        Err(err!(
            "expected bytes for '{what}' data block, \
             but did not find enough bytes",
        ))
    } else {
        Ok(bytes.split_at(at))
    }
}

/// Interprets the given slice as an unsigned 32-bit big endian count and
/// converts it to `usize`.
///
/// # Panics
///
/// When `bytes.len() != 4`.
fn from_be_bytes_count(
    what: &'static str,
    bytes: &[u8],
) -> Result<usize, Error> {
    let n = u32::from_be_bytes(bytes.try_into().unwrap());
    usize::try_from(n)
        .map_err(|_| err!("failed to parse `{what}`: count is too big"))
}

/// Interprets the given slice as a signed 32-bit big endian integer.
///
/// # Panics
///
/// When `bytes.len() != 4`.
fn from_be_bytes_i32(bytes: &[u8]) -> i32 {
    i32::from_be_bytes(bytes.try_into().unwrap())
}

/// Interprets the given slice as a signed 64-bit big endian integer.
///
/// # Panics
///
/// When `bytes.len() != 8`.
fn from_be_bytes_i64(bytes: &[u8]) -> i64 {
    i64::from_be_bytes(bytes.try_into().unwrap())
}

/*!
Synthetic TZif images for tests.

Tests in this crate must not depend on a host tzdata installation, so the
zones they exercise are generated here, byte for byte, in the RFC 8536
layout. The interesting zones replicate real tzdata history (Minsk around
the end of the USSR, Chicago's 2020 fall-back, Kiritimati skipping a whole
day) with transition instants taken from zdump output, so the assertions in
the test suites are checking real-world values.
*/

/// A description of a time zone from which TZif bytes are generated.
pub(crate) struct TestZone {
    /// `(utc_offset_seconds, is_dst, abbreviation)` per local time type.
    pub(crate) types: &'static [(i32, bool, &'static str)],
    /// `(utc_instant, type_index)` per transition, in ascending order.
    pub(crate) transitions: &'static [(i64, u8)],
    /// The footer TZ string. Empty means an empty footer.
    pub(crate) footer: &'static str,
}

impl TestZone {
    /// Serializes this zone as a version 2 TZif file: a v1 stub block, the
    /// 64-bit block and a newline-framed footer.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_version(b'2')
    }

    /// Like `to_bytes`, but with an arbitrary version byte in both headers.
    pub(crate) fn to_bytes_version(&self, version: u8) -> Vec<u8> {
        let mut out = Vec::new();
        // The v1 block: no transitions, a single dummy type, one NUL of
        // abbreviation data. Readers skip it by computing its length from
        // the header.
        write_header(&mut out, version, 0, 0, 0, 0, 1, 1);
        out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        out.push(0);

        let pool = self.pool();
        write_header(
            &mut out,
            version,
            0,
            0,
            0,
            self.transitions.len() as u32,
            self.types.len() as u32,
            pool.len() as u32,
        );
        for &(when, _) in self.transitions {
            out.extend_from_slice(&when.to_be_bytes());
        }
        for &(_, type_index) in self.transitions {
            out.push(type_index);
        }
        for &(offset, is_dst, abbrev) in self.types {
            out.extend_from_slice(&offset.to_be_bytes());
            out.push(u8::from(is_dst));
            out.push(self.abbrev_index(&pool, abbrev));
        }
        out.extend_from_slice(pool.as_bytes());
        out.push(b'\n');
        out.extend_from_slice(self.footer.as_bytes());
        out.push(b'\n');
        out
    }

    /// Serializes this zone as a version 1 TZif file with 32-bit
    /// transition times and no footer.
    pub(crate) fn to_bytes_v1(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let pool = self.pool();
        write_header(
            &mut out,
            0,
            0,
            0,
            0,
            self.transitions.len() as u32,
            self.types.len() as u32,
            pool.len() as u32,
        );
        for &(when, _) in self.transitions {
            let when = i32::try_from(when).expect("v1 transition fits in i32");
            out.extend_from_slice(&when.to_be_bytes());
        }
        for &(_, type_index) in self.transitions {
            out.push(type_index);
        }
        for &(offset, is_dst, abbrev) in self.types {
            out.extend_from_slice(&offset.to_be_bytes());
            out.push(u8::from(is_dst));
            out.push(self.abbrev_index(&pool, abbrev));
        }
        out.extend_from_slice(pool.as_bytes());
        out
    }

    /// The NUL-terminated abbreviation pool, deduplicated in order of
    /// first use.
    fn pool(&self) -> String {
        let mut pool = String::new();
        for &(_, _, abbrev) in self.types {
            if find_terminated(&pool, abbrev).is_none() {
                pool.push_str(abbrev);
                pool.push('\0');
            }
        }
        pool
    }

    fn abbrev_index(&self, pool: &str, abbrev: &str) -> u8 {
        find_terminated(pool, abbrev).expect("abbreviation is in the pool")
    }
}

/// Finds `needle` as a NUL-terminated entry of `pool` and returns its
/// starting index.
fn find_terminated(pool: &str, needle: &str) -> Option<u8> {
    let mut start = 0;
    while let Some(len) = pool[start..].find('\0') {
        if &pool[start..start + len] == needle {
            return Some(u8::try_from(start).unwrap());
        }
        start += len + 1;
    }
    None
}

fn write_header(
    out: &mut Vec<u8>,
    version: u8,
    isutcnt: u32,
    isstdcnt: u32,
    leapcnt: u32,
    timecnt: u32,
    typecnt: u32,
    charcnt: u32,
) {
    out.extend_from_slice(b"TZif");
    out.push(version);
    out.extend_from_slice(&[0; 15]);
    for count in [isutcnt, isstdcnt, leapcnt, timecnt, typecnt, charcnt] {
        out.extend_from_slice(&count.to_be_bytes());
    }
}

/// Europe/Minsk around the dissolution of the USSR, per tzdata.
///
/// The 1991-03-31 entry is the interesting one: Minsk moved from MSK
/// (+03, standard) to EEST (+03, DST) with no change in UTC offset, so the
/// DST magnitude of EEST cannot be derived from its predecessor and must
/// come from the EET successor.
pub(crate) fn minsk() -> TestZone {
    TestZone {
        types: &[
            (3 * 3600, false, "MSK"),
            (4 * 3600, true, "MSD"),
            (3 * 3600, true, "EEST"),
            (2 * 3600, false, "EET"),
        ],
        transitions: &[
            (606870000, 1),  // 1989-03-25T23:00Z -> MSD
            (622594800, 0),  // 1989-09-23T23:00Z -> MSK
            (670374000, 2),  // 1991-03-30T23:00Z -> EEST
            (686102400, 3),  // 1991-09-29T00:00Z -> EET
            (701827200, 2),  // 1992-03-29T00:00Z -> EEST
            (717552000, 3),  // 1992-09-27T00:00Z -> EET
        ],
        footer: "",
    }
}

/// America/Chicago, 2019 through 2020, with the usual POSIX footer.
pub(crate) fn chicago() -> TestZone {
    TestZone {
        types: &[
            (-6 * 3600, false, "CST"),
            (-5 * 3600, true, "CDT"),
        ],
        transitions: &[
            (1552204800, 1), // 2019-03-10T08:00Z -> CDT
            (1572764400, 0), // 2019-11-03T07:00Z -> CST
            (1583654400, 1), // 2020-03-08T08:00Z -> CDT
            (1604214000, 0), // 2020-11-01T07:00Z -> CST
        ],
        footer: "CST6CDT,M3.2.0,M11.1.0",
    }
}

/// Pacific/Kiritimati: the Line Islands skipped 1994-12-31 entirely,
/// jumping from -10:40 to +14:00.
pub(crate) fn kiritimati() -> TestZone {
    TestZone {
        types: &[
            (-38400, false, "-1040"),
            (50400, false, "+14"),
        ],
        transitions: &[
            (-2208988800, 0), // 1900-01-01T00:00Z -> -1040
            (788870400, 1),   // 1994-12-31T10:40Z -> +14
        ],
        footer: "<+14>-14",
    }
}

/// A constant zone in the style of Etc/UTC: one type, no transitions.
pub(crate) fn utc() -> TestZone {
    TestZone {
        types: &[(0, false, "UTC")],
        transitions: &[],
        footer: "UTC0",
    }
}

/// An America/New_York style "slim" zone: the recorded table stops in
/// 2007, and everything after it comes from the footer rule.
pub(crate) fn est5edt() -> TestZone {
    TestZone {
        types: &[
            (-5 * 3600, false, "EST"),
            (-4 * 3600, true, "EDT"),
        ],
        transitions: &[
            (1173596400, 1), // 2007-03-11T07:00Z -> EDT
            (1194156000, 0), // 2007-11-04T06:00Z -> EST
        ],
        footer: "EST5EDT,M3.2.0,M11.1.0",
    }
}

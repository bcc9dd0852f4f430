//! UTCTime and GeneralizedTime codecs.
//!
//! Both decode to `DateTime<Utc>`; any offset in the input is applied and
//! dropped. Encoding always produces the canonical DER `Z` form.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};

use crate::Element;
use crate::error::{Error, Result};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

fn digits(data: &[u8], at: usize, count: usize) -> Option<u32> {
    let slice = data.get(at..at + count)?;
    slice.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

/// Parses the zone suffix: `Z`, `+hhmm`, `-hhmm`, plus `±hh` and an absent
/// zone where the caller allows them.
fn parse_zone(rest: &[u8], lenient: bool) -> Option<FixedOffset> {
    match rest {
        [] if lenient => FixedOffset::east_opt(0),
        [b'Z'] => FixedOffset::east_opt(0),
        [sign @ (b'+' | b'-'), tail @ ..] => {
            let hours = digits(tail, 0, 2)?;
            let minutes = match tail.len() {
                2 if lenient => 0,
                4 => digits(tail, 2, 2)?,
                _ => return None,
            };
            if hours > 23 || minutes > 59 {
                return None;
            }
            let seconds = (hours * 3600 + minutes * 60) as i32;
            if *sign == b'+' {
                FixedOffset::east_opt(seconds)
            } else {
                FixedOffset::west_opt(seconds)
            }
        }
        _ => None,
    }
}

fn to_utc(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decodes `YYMMDDhhmm[ss]` followed by `Z` or `±hhmm`.
pub fn parse_utc_time(data: &[u8]) -> Result<DateTime<Utc>> {
    let invalid = || Error::UtcTimeInvalidFormat(String::from_utf8_lossy(data).into_owned());

    let yy = digits(data, 0, 2).ok_or_else(invalid)?;
    let year = (if yy < 50 { 2000 + yy } else { 1900 + yy }) as i32;
    let month = digits(data, 2, 2).ok_or_else(invalid)?;
    let day = digits(data, 4, 2).ok_or_else(invalid)?;
    let hour = digits(data, 6, 2).ok_or_else(invalid)?;
    let minute = digits(data, 8, 2).ok_or_else(invalid)?;
    let (second, rest) = match digits(data, 10, 2) {
        Some(second) => (second, &data[12..]),
        None => (0, &data[10..]),
    };
    let offset = parse_zone(rest, false).ok_or_else(invalid)?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(invalid)?;
    to_utc(naive, offset).ok_or_else(invalid)
}

/// Encodes as `YYMMDDhhmmssZ`. UTCTime has no sub-second field, so any
/// fraction is dropped.
pub fn format_utc_time(dt: &DateTime<Utc>) -> Result<Vec<u8>> {
    if !(1950..=2049).contains(&dt.year()) {
        return Err(Error::UtcTimeYearOutOfRange(dt.year()));
    }
    Ok(dt.format("%y%m%d%H%M%SZ").to_string().into_bytes())
}

/// Decodes `YYYYMMDDhh[mm[ss]][(.|,)f]` with an optional `Z`, `±hh` or
/// `±hhmm` suffix. The fraction applies to the last unit present; a missing
/// zone is read as UTC.
pub fn parse_generalized_time(data: &[u8]) -> Result<DateTime<Utc>> {
    let invalid = || Error::GeneralizedTimeInvalidFormat(String::from_utf8_lossy(data).into_owned());

    let year = digits(data, 0, 4).ok_or_else(invalid)? as i32;
    let month = digits(data, 4, 2).ok_or_else(invalid)?;
    let day = digits(data, 6, 2).ok_or_else(invalid)?;
    let hour = digits(data, 8, 2).ok_or_else(invalid)?;

    let mut pos = 10;
    // seconds in the least significant unit present
    let mut unit: u128 = 3600;
    let mut minute = 0;
    let mut second = 0;
    if let Some(m) = digits(data, pos, 2) {
        minute = m;
        unit = 60;
        pos += 2;
        if let Some(s) = digits(data, pos, 2) {
            second = s;
            unit = 1;
            pos += 2;
        }
    }

    let mut fraction_nanos: u128 = 0;
    if let Some(b'.' | b',') = data.get(pos) {
        pos += 1;
        let count = data[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        if count == 0 || count > 9 {
            return Err(invalid());
        }
        let value = u128::from(digits(data, pos, count).ok_or_else(invalid)?);
        fraction_nanos = value * unit * NANOS_PER_SECOND / 10u128.pow(count as u32);
        pos += count;
    }
    let offset = parse_zone(&data[pos..], true).ok_or_else(invalid)?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(invalid)?;
    let extra = i64::try_from(fraction_nanos).map_err(|_| invalid())?;
    let naive = naive
        .checked_add_signed(TimeDelta::nanoseconds(extra))
        .ok_or_else(invalid)?;
    to_utc(naive, offset).ok_or_else(invalid)
}

/// Encodes as `YYYYMMDDhhmmss[.f]Z` with trailing fraction zeros removed.
pub fn format_generalized_time(dt: &DateTime<Utc>) -> Result<Vec<u8>> {
    if !(0..=9999).contains(&dt.year()) {
        return Err(Error::GeneralizedTimeYearOutOfRange(dt.year()));
    }
    let mut out = dt.format("%Y%m%d%H%M%S").to_string();
    let nanos = dt.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('Z');
    Ok(out.into_bytes())
}

/// The instant of a UTCTime or GeneralizedTime element.
impl TryFrom<&Element> for DateTime<Utc> {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::UTCTime(dt) | Element::GeneralizedTime(dt) => Ok(*dt),
            other => Err(other.unexpected("time")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
            .and_utc()
    }

    #[rstest(input, expected,
        case("500101000000Z", utc(1950, 1, 1, 0, 0, 0)),
        case("491231235959Z", utc(2049, 12, 31, 23, 59, 59)),
        case("230101120000Z", utc(2023, 1, 1, 12, 0, 0)),
        // seconds omitted
        case("2301011200Z", utc(2023, 1, 1, 12, 0, 0)),
        case("230101120000+0900", utc(2023, 1, 1, 3, 0, 0)),
        case("231231200000-0500", utc(2024, 1, 1, 1, 0, 0)),
    )]
    fn test_parse_utc_time(input: &str, expected: DateTime<Utc>) {
        assert_eq!(expected, parse_utc_time(input.as_bytes()).unwrap());
    }

    #[rstest(input,
        case(""),
        case("2301011200"),
        case("230101120000"),
        case("231301120000Z"),
        case("230101120000+09"),
        case("2301011200001Z"),
        case("23010112000Z"),
    )]
    fn test_parse_utc_time_invalid(input: &str) {
        assert!(matches!(
            parse_utc_time(input.as_bytes()),
            Err(Error::UtcTimeInvalidFormat(_))
        ));
    }

    #[rstest]
    fn test_format_utc_time() {
        assert_eq!(b"500101000000Z".to_vec(), format_utc_time(&utc(1950, 1, 1, 0, 0, 0)).unwrap());
        assert_eq!(b"491231235959Z".to_vec(), format_utc_time(&utc(2049, 12, 31, 23, 59, 59)).unwrap());
        assert!(matches!(
            format_utc_time(&utc(2050, 1, 1, 0, 0, 0)),
            Err(Error::UtcTimeYearOutOfRange(2050))
        ));
        assert!(matches!(
            format_utc_time(&utc(1949, 12, 31, 0, 0, 0)),
            Err(Error::UtcTimeYearOutOfRange(1949))
        ));
    }

    #[rstest(input, expected,
        case("20230101120000Z", utc(2023, 1, 1, 12, 0, 0)),
        case("20230101120000+0200", utc(2023, 1, 1, 10, 0, 0)),
        case("20230101120000-02", utc(2023, 1, 1, 14, 0, 0)),
        // no zone is read as UTC
        case("20230101120000", utc(2023, 1, 1, 12, 0, 0)),
        case("2023010112Z", utc(2023, 1, 1, 12, 0, 0)),
        case("202301011230Z", utc(2023, 1, 1, 12, 30, 0)),
        // fraction of an hour
        case("2023010112.5Z", utc(2023, 1, 1, 12, 30, 0)),
        // fraction of a minute
        case("202301011230,5Z", utc(2023, 1, 1, 12, 30, 30)),
        case("99991231235959Z", utc(9999, 12, 31, 23, 59, 59)),
    )]
    fn test_parse_generalized_time(input: &str, expected: DateTime<Utc>) {
        assert_eq!(expected, parse_generalized_time(input.as_bytes()).unwrap());
    }

    #[rstest]
    fn test_parse_generalized_time_fraction() {
        let dt = parse_generalized_time(b"20230101120000.123456789Z").unwrap();
        assert_eq!(123_456_789, dt.nanosecond());
        let dt = parse_generalized_time(b"20230101120000.5Z").unwrap();
        assert_eq!(500_000_000, dt.nanosecond());
    }

    #[rstest(input,
        case("2023010112000Z"),
        case("20230101120000.Z"),
        case("20230101120000.1234567891Z"),
        case("20230230120000Z"),
        case("20230101120000+2400"),
        case("20230101120000Zjunk"),
        case("2023"),
    )]
    fn test_parse_generalized_time_invalid(input: &str) {
        assert!(matches!(
            parse_generalized_time(input.as_bytes()),
            Err(Error::GeneralizedTimeInvalidFormat(_))
        ));
    }

    #[rstest]
    fn test_format_generalized_time() {
        assert_eq!(
            b"20230101120000Z".to_vec(),
            format_generalized_time(&utc(2023, 1, 1, 12, 0, 0)).unwrap()
        );
        let with_fraction = utc(2023, 1, 1, 12, 0, 0) + TimeDelta::milliseconds(250);
        assert_eq!(
            b"20230101120000.25Z".to_vec(),
            format_generalized_time(&with_fraction).unwrap()
        );
        let too_late = utc(9999, 12, 31, 0, 0, 0) + TimeDelta::days(1);
        assert!(matches!(
            format_generalized_time(&too_late),
            Err(Error::GeneralizedTimeYearOutOfRange(10000))
        ));
    }

    #[rstest]
    fn test_time_from_element() {
        let dt = utc(2023, 1, 1, 0, 0, 0);
        assert_eq!(dt, DateTime::<Utc>::try_from(&Element::UTCTime(dt)).unwrap());
        assert_eq!(dt, DateTime::<Utc>::try_from(&Element::GeneralizedTime(dt)).unwrap());
        assert!(DateTime::<Utc>::try_from(&Element::Null).is_err());
    }
}

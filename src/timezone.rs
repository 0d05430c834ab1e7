//! Resolves the local time from a canonical timezone name.

use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if the timezone name is not recognised.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current date and time in `canonical_timezone`.
///
/// # Errors
/// Returns an [Error::InvalidTimezone] if the timezone name is not recognised.
pub fn local_now(canonical_timezone: &str) -> Result<PrimitiveDateTime, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;
    let now = OffsetDateTime::now_utc().to_offset(offset);

    Ok(PrimitiveDateTime::new(now.date(), now.time()))
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        timezone::{get_local_offset, local_now},
    };

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(get_local_offset("Etc/UTC"), Some(UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_has_no_offset() {
        assert_eq!(get_local_offset("Not/AZone"), None);
    }

    #[test]
    fn local_now_in_utc_is_close_to_now() {
        let before = OffsetDateTime::now_utc();

        let now = local_now("Etc/UTC").unwrap().assume_utc();

        let after = OffsetDateTime::now_utc();
        assert!(before <= now && now <= after);
    }

    #[test]
    fn local_now_rejects_unknown_timezone() {
        assert_eq!(
            local_now("Not/AZone"),
            Err(Error::InvalidTimezone("Not/AZone".to_owned()))
        );
    }
}

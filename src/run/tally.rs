use crate::config::Zone;

const DAY: i64 = 24 * 60 * 60;
const HOUR: i64 = 60 * 60;
/// Weekly reset hour, local time.
const RESET_HOUR: i64 = 4;

/// Start of the tally week containing `now`: the latest Monday 04:00 in
/// `zone` at or before it. Both sides are Unix seconds.
pub fn week_start(now: i64, zone: Zone) -> i64 {
    let offset = zone.offset() * HOUR;
    let days = (now + offset - RESET_HOUR * HOUR).div_euclid(DAY);
    // 1970-01-01 was a Thursday
    let weekday = (days + 3).rem_euclid(7);
    (days - weekday) * DAY + RESET_HOUR * HOUR - offset
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2024-01-01 00:00 UTC, a Monday.
    const MONDAY: i64 = 1_704_067_200;

    #[test]
    fn resets_monday_four_am() {
        let reset = MONDAY + 4 * HOUR;
        assert_eq!(week_start(MONDAY + 5 * HOUR, Zone::Europe), reset);
        assert_eq!(week_start(reset, Zone::Europe), reset);
        assert_eq!(week_start(reset + 6 * DAY, Zone::Europe), reset);
        assert_eq!(week_start(MONDAY + 3 * HOUR, Zone::Europe), reset - 7 * DAY);
    }

    #[test]
    fn follows_the_zone() {
        let asia = MONDAY - 4 * HOUR;
        assert_eq!(week_start(asia, Zone::Asia), asia);
        assert_eq!(week_start(asia - 1, Zone::Asia), asia - 7 * DAY);
        let america = MONDAY + 10 * HOUR;
        assert_eq!(week_start(america + 1, Zone::America), america);
        assert_eq!(week_start(MONDAY + 5 * HOUR, Zone::America), MONDAY + 4 * HOUR - 7 * DAY + 6 * HOUR);
    }
}

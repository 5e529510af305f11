pub mod domain;
pub mod error;
pub mod roster;

#[cfg(test)]
mod tests {
    use crate::{domain::RoundLimit, error::RoundLimitParseError};

    #[test]
    fn parses_round_limits() {
        assert_eq!("all".parse::<RoundLimit>(), Ok(RoundLimit::Unbounded));
        assert_eq!(" Todos ".parse::<RoundLimit>(), Ok(RoundLimit::Unbounded));
        assert_eq!("3".parse::<RoundLimit>(), Ok(RoundLimit::bounded(3).unwrap()));
        assert_eq!(
            "0".parse::<RoundLimit>(),
            Err(RoundLimitParseError::NotPositive(0))
        );
        assert_eq!(
            "-2".parse::<RoundLimit>(),
            Err(RoundLimitParseError::NotPositive(-2))
        );
        assert!(matches!(
            "abc".parse::<RoundLimit>(),
            Err(RoundLimitParseError::Invalid(_))
        ));
        assert!(matches!(
            "".parse::<RoundLimit>(),
            Err(RoundLimitParseError::Invalid(_))
        ));
    }

    #[test]
    fn bounded_limit_is_reached_at_or_past_cap() {
        let limit = RoundLimit::bounded(3).unwrap();
        assert!(!limit.is_reached(2));
        assert!(limit.is_reached(3));
        assert!(limit.is_reached(4));
        assert!(!RoundLimit::Unbounded.is_reached(u32::MAX));
        assert_eq!(limit.to_string(), "3");
        assert_eq!(RoundLimit::Unbounded.to_string(), "all");
    }
}

/// Current UTC timestamp (milliseconds)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 4-digit numeric pickup code shared by all sub-orders of one checkout
pub fn generate_otp() -> String {
    use rand::Rng;
    let code: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{:04}", code)
}

/// Human-readable order number with a high-entropy suffix.
///
/// Layout: `FC-<yyMMdd>-<12 hex chars of a v4 uuid>` (48 random bits), so
/// concurrent checkouts never need a shared counter.
pub fn generate_order_number() -> String {
    let date = chrono::Utc::now().format("%y%m%d");
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("FC-{}-{}", date, uuid[..12].to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_otp_is_four_digits() {
        for _ in 0..200 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 4);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_order_numbers_unique() {
        let numbers: HashSet<String> = (0..1000).map(|_| generate_order_number()).collect();
        assert_eq!(numbers.len(), 1000);
        assert!(numbers.iter().all(|n| n.starts_with("FC-") && n.len() == 22));
    }
}

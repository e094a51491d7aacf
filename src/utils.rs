/// Round a money amount to cents.
///
/// Every dollar figure the engine emits goes through here so that additive
/// invariants (a schedule summing to its depreciable value, NPV terms) hold
/// without drift between call sites.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to a given number of decimal places (rates, percentages).
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_to_cents() {
        assert_eq!(round_money(14545.4545), 14545.45);
        assert_eq!(round_money(13939.3896), 13939.39);
        assert_eq!(round_money(0.005), 0.01);
    }

    #[test]
    fn rounds_rates_to_places() {
        assert_eq!(round_to(6.87654, 2), 6.88);
        assert_eq!(round_to(0.123456, 4), 0.1235);
    }
}

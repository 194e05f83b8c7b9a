pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Speed or sanity value without trailing zeros.
pub fn format_number(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn format_number_drops_trailing_zeros() {
        assert_eq!(format_number(1.7), "1.7");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.25), "2.25");
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(100.0), "100");
    }
}

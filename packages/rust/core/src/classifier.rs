//! Keyword classifier mapping free text to interest tags.
//!
//! Each tag has one pattern group, evaluated independently over the
//! lower-cased text. Matching is plain substring matching, so short keywords
//! such as `ice` or `hos` also fire inside longer words.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use leadfinder_shared::InterestTag;

/// Pattern groups in rule-evaluation order.
static RULES: LazyLock<Vec<(InterestTag, Regex)>> = LazyLock::new(|| {
    [
        (
            InterestTag::Parking,
            r"parking|parked|spot|spots|out of hours|oos|hours of service|hos",
        ),
        (InterestTag::FuelPrices, r"fuel|diesel|def|price|prices"),
        (
            InterestTag::WeighStations,
            r"weigh station|weigh stations|scale house|cat scale|cat scales|weighbridge|port of entry",
        ),
        (
            InterestTag::WeatherAlerts,
            r"weather|storm|radar|wind|ice|snow|alerts",
        ),
    ]
    .into_iter()
    .map(|(tag, pattern)| (tag, Regex::new(pattern).expect("classifier regex")))
    .collect()
});

/// Tags whose pattern group occurs anywhere in `text`.
pub fn classify(text: &str) -> BTreeSet<InterestTag> {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&lowered))
        .map(|(tag, _)| *tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[InterestTag]) -> BTreeSet<InterestTag> {
        list.iter().copied().collect()
    }

    #[test]
    fn weigh_station_question() {
        assert_eq!(
            classify("Weigh station near me open or closed?"),
            tags(&[InterestTag::WeighStations])
        );
    }

    #[test]
    fn each_group_fires_on_its_keywords() {
        assert_eq!(classify("Truck stop PARKED solid"), tags(&[InterestTag::Parking]));
        assert_eq!(classify("Cheapest diesel on I-40"), tags(&[InterestTag::FuelPrices]));
        assert_eq!(classify("CAT scale by exit 12"), tags(&[InterestTag::WeighStations]));
        assert_eq!(classify("Radar shows a storm"), tags(&[InterestTag::WeatherAlerts]));
    }

    #[test]
    fn groups_are_not_exclusive() {
        let all = classify("Parking, diesel, weigh station and snow. Help.");
        assert_eq!(all, InterestTag::ALL.into_iter().collect());
    }

    #[test]
    fn no_keywords_no_tags() {
        assert!(classify("Anyone hiring team drivers in Ohio?").is_empty());
        assert!(classify("").is_empty());
    }

    #[test]
    fn substring_matching_has_no_word_boundaries() {
        // "price" contains "ice"
        assert_eq!(
            classify("price"),
            tags(&[InterestTag::FuelPrices, InterestTag::WeatherAlerts])
        );
        // "ghost" contains "hos"
        assert_eq!(classify("ghost"), tags(&[InterestTag::Parking]));
    }

    #[test]
    fn classification_is_deterministic_and_bounded() {
        let samples = [
            "Out of hours and no spots left",
            "Port of entry closed for wind",
            "def gel in the cold",
            "nothing relevant here",
        ];
        for text in samples {
            let first = classify(text);
            assert_eq!(first, classify(text));
            assert!(first.iter().all(|t| InterestTag::ALL.contains(t)));
        }
    }
}

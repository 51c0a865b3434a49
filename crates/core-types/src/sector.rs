//! Static ticker-to-sector classification.
//!
//! The table covers the NIFTY constituents the store is expected to hold.
//! Any ticker not listed is classified as [`UNKNOWN_SECTOR`]; an unmapped
//! ticker is a normal case, never an error.

/// Sector label for tickers missing from [`SECTOR_MAP`].
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Ticker → sector, sorted by ticker so lookups can binary search.
pub const SECTOR_MAP: &[(&str, &str)] = &[
    ("adani_green", "Power"),
    ("adani_power", "Power"),
    ("adani_total_gas", "Oil & Gas"),
    ("adanienterprises", "Services"),
    ("adaniports", "Services"),
    ("asianpaints", "Consumer Goods"),
    ("axisbank", "Banking"),
    ("baidulifesciences", "Pharma"),
    ("bajaj_auto", "Auto"),
    ("bajaj_finance", "Finance"),
    ("bajaj_finserv", "Finance"),
    ("bharat_heavy_electricals", "Industrial"),
    ("bharat_pe", "Services"),
    ("bharat_petroleum", "Oil & Gas"),
    ("bharatforge", "Auto"),
    ("bharti_airtel", "Services"),
    ("bhp", "Mining"),
    ("bpcl", "Oil & Gas"),
    ("castrol_india", "Oil & Gas"),
    ("cipla", "Pharma"),
    ("coal_india", "Mining"),
    ("divis_labs", "Pharma"),
    ("dr_reddys", "Pharma"),
    ("eicher_motors", "Auto"),
    ("gail", "Oil & Gas"),
    ("grasim_industries", "Industrial"),
    ("hcl_technologies", "Technology"),
    ("hdfc", "Finance"),
    ("hdfc_bank", "Banking"),
    ("hero_motocorp", "Auto"),
    ("hindalco_industries", "Metals"),
    ("hindustan_unilever", "Consumer Goods"),
    ("icici_bank", "Banking"),
    ("indusind_bank", "Banking"),
    ("infosys", "Technology"),
    ("jsw_steel", "Metals"),
    ("kotak_mahindra_bank", "Banking"),
    ("larsen_toubro", "Industrial"),
    ("mahindra", "Auto"),
    ("maruti_suzuki", "Auto"),
    ("ntpc", "Power"),
    ("ongc", "Oil & Gas"),
    ("power_grid", "Power"),
    ("reliance", "Oil & Gas"),
    ("sbicard", "Finance"),
    ("state_bank_of_india", "Banking"),
    ("sun_pharma", "Pharma"),
    ("tata_consultancy_services", "Technology"),
    ("tata_motors", "Auto"),
    ("tata_steel", "Metals"),
    ("tech_mahindra", "Technology"),
    ("titans", "Consumer Goods"),
    ("ultratech_cement", "Cement"),
    ("wipro", "Technology"),
];

/// Returns the sector for a ticker, or [`UNKNOWN_SECTOR`] when unmapped.
///
/// Expects the normalized (lower-cased, trimmed) ticker the loader produces.
pub fn sector_for(ticker: &str) -> &'static str {
    SECTOR_MAP
        .binary_search_by(|(key, _)| (*key).cmp(ticker))
        .map(|idx| SECTOR_MAP[idx].1)
        .unwrap_or(UNKNOWN_SECTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_is_sorted_and_unique() {
        for pair in SECTOR_MAP.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} must sort before {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn known_tickers_resolve() {
        assert_eq!(sector_for("infosys"), "Technology");
        assert_eq!(sector_for("hdfc"), "Finance");
        assert_eq!(sector_for("hdfc_bank"), "Banking");
        assert_eq!(sector_for("adani_green"), "Power");
        assert_eq!(sector_for("wipro"), "Technology");
    }

    #[test]
    fn unmapped_tickers_default_to_unknown() {
        assert_eq!(sector_for("acme_widgets"), UNKNOWN_SECTOR);
        assert_eq!(sector_for(""), UNKNOWN_SECTOR);
        // Lookup is on the normalized form only.
        assert_eq!(sector_for("INFOSYS"), UNKNOWN_SECTOR);
    }
}

//! S1 Universe Builder: one exclusion rule wins per symbol,
//! evaluated in a fixed priority order that downstream reason histograms
//! depend on.

use chrono::NaiveDate;
use indexmap::IndexMap;
use quant_config::schema::UniverseConfig;
use quant_core::ids::StockCode;
use quant_core::money::Won;
use quant_core::universe::Universe;
use rust_decimal::prelude::ToPrimitive;

const EOK: i64 = 100_000_000;
const MM: i64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct SymbolAttributes {
    pub code: StockCode,
    pub is_halted: bool,
    pub is_admin_issue: bool,
    pub name: String,
    pub market_cap: Won,
    pub adtv20: Won,
    pub listing_days: u32,
    pub sector: String,
}

/// Matches the Korean/English SPAC naming convention named in the glossary.
pub fn is_spac_name(name: &str) -> bool {
    name.contains("스팩") || name.to_ascii_uppercase().contains("SPAC")
}

fn exclusion_reason(attrs: &SymbolAttributes, config: &UniverseConfig) -> Option<&'static str> {
    if config.exclude_halt && attrs.is_halted {
        return Some("거래정지");
    }
    if config.exclude_admin && attrs.is_admin_issue {
        return Some("관리종목");
    }
    if config.exclude_spac && is_spac_name(&attrs.name) {
        return Some("SPAC");
    }

    let min_market_cap = won_from_eok(config.min_market_cap_eok);
    if attrs.market_cap.0 < min_market_cap {
        return Some("시가총액 미달");
    }

    let min_volume = won_from_mm(config.min_volume_mm);
    if attrs.adtv20.0 < min_volume {
        return Some("거래대금 미달");
    }

    if attrs.listing_days < config.min_listing_days {
        return Some("상장일수 미달");
    }

    if config.excluded_sectors.iter().any(|s| s == &attrs.sector) {
        return Some("제외 업종");
    }

    None
}

fn won_from_eok(value: rust_decimal::Decimal) -> i64 {
    (value * rust_decimal::Decimal::from(EOK)).to_i64().unwrap_or(i64::MAX)
}

fn won_from_mm(value: rust_decimal::Decimal) -> i64 {
    (value * rust_decimal::Decimal::from(MM)).to_i64().unwrap_or(i64::MAX)
}

pub fn compute(date: NaiveDate, symbols: &[SymbolAttributes], config: &UniverseConfig) -> Universe {
    let mut stocks = Vec::new();
    let mut excluded = IndexMap::new();

    for attrs in symbols {
        match exclusion_reason(attrs, config) {
            Some(reason) => {
                excluded.insert(attrs.code.clone(), reason.to_string());
            }
            None => stocks.push(attrs.code.clone()),
        }
    }

    Universe {
        date,
        total_count: symbols.len() as u32,
        stocks,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> UniverseConfig {
        UniverseConfig {
            exclude_halt: true,
            exclude_admin: true,
            exclude_spac: true,
            min_market_cap_eok: dec!(1000),
            min_volume_mm: dec!(50),
            min_listing_days: 180,
            excluded_sectors: vec![],
        }
    }

    fn base(code: &str) -> SymbolAttributes {
        SymbolAttributes {
            code: StockCode::from(code),
            is_halted: false,
            is_admin_issue: false,
            name: "평범한종목".to_string(),
            market_cap: Won(1000 * EOK),
            adtv20: Won(100 * MM),
            listing_days: 1000,
            sector: "제조업".to_string(),
        }
    }

    /// Spec.md §8 scenario 1.
    #[test]
    fn exclusion_priority_matches_spec_scenario() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let mut a = base("A");
        a.is_halted = true;
        a.market_cap = Won(0);

        let mut b = base("B");
        b.name = "미래에셋스팩1호".to_string();
        b.market_cap = Won(500 * EOK);

        let mut c = base("C");
        c.market_cap = Won(50 * EOK);

        let d = base("D");

        let universe = compute(date, &[a, b, c, d], &config());

        assert_eq!(
            universe.excluded.get(&StockCode::from("A")).unwrap(),
            "거래정지"
        );
        assert_eq!(universe.excluded.get(&StockCode::from("B")).unwrap(), "SPAC");
        assert_eq!(
            universe.excluded.get(&StockCode::from("C")).unwrap(),
            "시가총액 미달"
        );
        assert_eq!(universe.stocks, vec![StockCode::from("D")]);
        assert!(universe.is_consistent());
    }

    #[test]
    fn halt_takes_priority_over_spac_when_both_match() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let mut x = base("X");
        x.is_halted = true;
        x.name = "어떤스팩".to_string();
        let universe = compute(date, &[x], &config());
        assert_eq!(
            universe.excluded.get(&StockCode::from("X")).unwrap(),
            "거래정지"
        );
    }

    #[test]
    fn sector_exclusion_is_last_priority() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let mut config = config();
        config.excluded_sectors = vec!["지주회사".to_string()];
        let mut s = base("S");
        s.sector = "지주회사".to_string();
        let universe = compute(date, &[s], &config);
        assert_eq!(
            universe.excluded.get(&StockCode::from("S")).unwrap(),
            "제외 업종"
        );
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let mut config = config();
        config.exclude_halt = false;
        let mut h = base("H");
        h.is_halted = true;
        let universe = compute(date, &[h], &config);
        assert!(universe.stocks.contains(&StockCode::from("H")));
    }
}

//! Terminal rendering of the dashboard with `comfy-table`.

use analytics::{
    CorrelationMatrix, CumulativeSeries, Dashboard, Kpis, MonthlySummary, MonthlyView,
    SectorSummary, TickerSummary, VolatilityEntry,
};
use comfy_table::{Cell, CellAlignment, Color, Table, presets::UTF8_FULL};

/// Formats a decimal fraction as a percentage with two decimals.
pub fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn signed_cell(value: f64) -> Cell {
    let color = if value > 0.0 { Color::Green } else { Color::Red };
    Cell::new(pct(value))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

fn number_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

pub fn kpi_table(kpis: &Kpis) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    table
        .add_row(vec![Cell::new("Tickers"), Cell::new(kpis.tickers)])
        .add_row(vec![
            Cell::new("Green stocks"),
            Cell::new(format!("{} ({:.1}% positive)", kpis.green_count, kpis.green_pct)).fg(Color::Green),
        ])
        .add_row(vec![
            Cell::new("Red stocks"),
            Cell::new(format!("{} ({:.1}% negative)", kpis.red_count, kpis.red_pct)).fg(Color::Red),
        ])
        .add_row(vec![
            Cell::new("Average latest close"),
            number_cell(kpis.average_latest_close),
        ])
        .add_row(vec![
            Cell::new("Average daily change"),
            match kpis.average_daily_change_pct {
                Some(change) => signed_cell(change / 100.0),
                None => Cell::new("n/a"),
            },
        ]);
    table
}

pub fn yearly_table(rows: &[TickerSummary]) -> Table {
    let mut table = new_table(vec!["Ticker", "Sector", "First close", "Last close", "Yearly return"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.ticker),
            Cell::new(&row.sector),
            number_cell(row.first_close),
            number_cell(row.last_close),
            signed_cell(row.yearly_return),
        ]);
    }
    table
}

pub fn volatility_table(rows: &[VolatilityEntry]) -> Table {
    let mut table = new_table(vec!["Ticker", "Sector", "Volatility", "Returns"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.ticker),
            Cell::new(&row.sector),
            Cell::new(format!("{:.4}", row.volatility)).set_alignment(CellAlignment::Right),
            Cell::new(row.observations).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn cumulative_table(series: &[CumulativeSeries]) -> Table {
    let mut table = new_table(vec!["Ticker", "From", "To", "Cumulative return"]);
    for line in series {
        let (Some(first), Some(last)) = (line.points.first(), line.points.last()) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(&line.ticker),
            Cell::new(first.date),
            Cell::new(last.date),
            signed_cell(last.value),
        ]);
    }
    table
}

pub fn sector_table(rows: &[SectorSummary]) -> Table {
    let mut table = new_table(vec!["Sector", "Tickers", "Average yearly return"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.sector),
            Cell::new(row.tickers).set_alignment(CellAlignment::Right),
            signed_cell(row.average_yearly_return),
        ]);
    }
    table
}

pub fn monthly_table(rows: &[MonthlySummary]) -> Table {
    let mut table = new_table(vec!["Ticker", "First close", "Last close", "Monthly return"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.ticker),
            number_cell(row.first),
            number_cell(row.last),
            signed_cell(row.monthly_return),
        ]);
    }
    table
}

/// `None` coefficients render as `-`.
pub fn correlation_table(matrix: &CorrelationMatrix) -> Table {
    let mut header = vec![""];
    header.extend(matrix.tickers.iter().map(String::as_str));
    let mut table = new_table(header);

    for (ticker, row) in matrix.tickers.iter().zip(&matrix.values) {
        let mut cells = vec![Cell::new(ticker)];
        cells.extend(row.iter().map(|value| match value {
            Some(v) => Cell::new(format!("{v:.2}")).set_alignment(CellAlignment::Right),
            None => Cell::new("-").set_alignment(CellAlignment::Center),
        }));
        table.add_row(cells);
    }
    table
}

fn monthly_section(view: &MonthlyView) -> String {
    format!(
        "Top gainers of {month}\n{gainers}\n\nTop losers of {month}\n{losers}",
        month = view.month,
        gainers = monthly_table(&view.gainers),
        losers = monthly_table(&view.losers),
    )
}

/// Renders every dashboard panel, one titled table after another.
pub fn render(dashboard: &Dashboard) -> String {
    let sections = [
        ("Key metrics".to_string(), kpi_table(&dashboard.kpis).to_string()),
        ("Top gainers (yearly)".to_string(), yearly_table(&dashboard.top_gainers).to_string()),
        ("Top losers (yearly)".to_string(), yearly_table(&dashboard.top_losers).to_string()),
        ("Most volatile".to_string(), volatility_table(&dashboard.most_volatile).to_string()),
        (
            "Cumulative return leaders".to_string(),
            cumulative_table(&dashboard.cumulative).to_string(),
        ),
        ("Sector performance".to_string(), sector_table(&dashboard.sectors).to_string()),
        (
            format!("Correlation of daily returns ({} aligned days)", dashboard.correlation.observations),
            correlation_table(&dashboard.correlation).to_string(),
        ),
        (
            format!("Monthly returns, {} of {} months", dashboard.monthly.month, dashboard.months.len()),
            monthly_section(&dashboard.monthly),
        ),
    ];

    sections
        .iter()
        .map(|(title, body)| format!("== {title} ==\n{body}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(ticker: &str, yearly_return: f64) -> TickerSummary {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TickerSummary {
            ticker: ticker.to_string(),
            sector: "Technology".to_string(),
            observations: 2,
            first_date: date,
            last_date: date,
            first_close: 100.0,
            last_close: 100.0 * (1.0 + yearly_return),
            yearly_return,
            final_cumulative_return: yearly_return,
        }
    }

    #[test]
    fn percentages_have_two_decimals() {
        assert_eq!(pct(0.12345), "12.35%");
        assert_eq!(pct(-0.01), "-1.00%");
        assert_eq!(pct(0.0), "0.00%");
    }

    #[test]
    fn yearly_table_lists_every_row() {
        let rendered = yearly_table(&[summary("infosys", 0.25), summary("wipro", -0.1)]).to_string();
        assert!(rendered.contains("infosys"));
        assert!(rendered.contains("25.00%"));
        assert!(rendered.contains("-10.00%"));
    }

    #[test]
    fn kpis_show_one_decimal_shares() {
        let kpis = Kpis {
            tickers: 3,
            green_count: 1,
            green_pct: 100.0 / 3.0,
            red_count: 2,
            red_pct: 200.0 / 3.0,
            average_latest_close: 42.0,
            average_daily_change_pct: None,
        };
        let rendered = kpi_table(&kpis).to_string();
        assert!(rendered.contains("1 (33.3% positive)"));
        assert!(rendered.contains("2 (66.7% negative)"));
        assert!(rendered.contains("n/a"));
    }

    #[test]
    fn undefined_correlations_render_as_dash() {
        let matrix = CorrelationMatrix {
            tickers: vec!["a".to_string(), "b".to_string()],
            values: vec![vec![Some(1.0), None], vec![None, Some(1.0)]],
            observations: 2,
        };
        let rendered = correlation_table(&matrix).to_string();
        assert!(rendered.contains("1.00"));
        assert!(rendered.contains('-'));
    }
}

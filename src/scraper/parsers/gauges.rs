//! Market gauge panel parser.
//!
//! The panel lives on the temperature page: a `td#idEpvDate` cell with the
//! 10-year bond yield and one or more `table#stock` blocks with valuation
//! rows. Values are returned as displayed text.

use scraper::{ElementRef, Html, Selector};

use crate::types::MarketGauges;

/// Header rows at the top of each `table#stock`
const HEADER_ROWS: usize = 2;

/// Data row holding PE TTM and EPV
const VALUATION_ROW: usize = 2;

const ATTRACTION_LABEL: &str = "股市吸引力";
const BUFFETT_LABEL: &str = "巴菲特指数";
const TURNOVER_LABEL: &str = "七日换手率";

/// Parser for the market gauge panel
pub struct GaugeParser;

impl GaugeParser {
    pub fn parse(html: &str) -> MarketGauges {
        let document = Html::parse_document(html);
        let rows = Self::data_rows(&document);

        let valuation = rows.get(VALUATION_ROW);

        MarketGauges {
            pe_ttm: valuation.and_then(|cells| cells.first().cloned()),
            bond_yield: Self::bond_yield(&document),
            epv: valuation.and_then(|cells| cells.get(2).cloned()),
            stock_attraction: Self::labeled(&rows, ATTRACTION_LABEL),
            buffett_index: Self::labeled(&rows, BUFFETT_LABEL),
            turnover_7d: Self::labeled(&rows, TURNOVER_LABEL),
        }
    }

    fn bond_yield(document: &Html) -> Option<String> {
        let selector = Selector::parse("td#idEpvDate").ok()?;
        let cell = document.select(&selector).next()?;
        Some(cell_text(cell))
    }

    /// Trimmed cell texts of every data row, across all stock tables
    fn data_rows(document: &Html) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let (Ok(table_selector), Ok(tr_selector), Ok(td_selector)) = (
            Selector::parse("table#stock"),
            Selector::parse("tr"),
            Selector::parse("td"),
        ) else {
            return rows;
        };

        for table in document.select(&table_selector) {
            for row in table.select(&tr_selector).skip(HEADER_ROWS) {
                let cells: Vec<String> = row.select(&td_selector).map(cell_text).collect();
                if !cells.is_empty() {
                    rows.push(cells);
                }
            }
        }
        rows
    }

    /// Second cell of the first row whose first cell contains `label`
    fn labeled(rows: &[Vec<String>], label: &str) -> Option<String> {
        rows.iter()
            .find(|cells| cells.first().is_some_and(|c| c.contains(label)))
            .and_then(|cells| cells.get(1).cloned())
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
